/// Numeric value of a price string
///
/// Currency symbols, codes and thousands separators are ignored:
/// `"$1,299.00"` gives `1299.0`. An empty string is `0.0`; text without a
/// parseable number is `None`.
#[must_use]
pub fn parse_price(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return Some(0.0);
    }

    let numeric: String = value
        .chars()
        .skip_while(|c| !c.is_ascii_digit() && *c != '-' && *c != '.')
        .take_while(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .filter(|c| *c != ',')
        .collect();

    numeric.parse::<f64>().ok().filter(|amount| amount.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_symbols_and_separators() {
        assert_eq!(parse_price("$1,299.00"), Some(1299.0));
        assert_eq!(parse_price("₹499"), Some(499.0));
        assert_eq!(parse_price("19.99 EUR"), Some(19.99));
        assert_eq!(parse_price(""), Some(0.0));
    }

    #[test]
    fn rejects_text_without_numbers() {
        assert_eq!(parse_price("Call for price"), None);
        assert_eq!(parse_price("Rs."), None);
    }
}
