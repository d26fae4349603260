//! Currency symbol and code resolution

use regex::Regex;
use std::sync::LazyLock;

/// Symbol to ISO 4217 code. Multi-character symbols come before the bare
/// symbols they contain so `R$` is never read as `$`.
const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("US$", "USD"),
    ("AU$", "AUD"),
    ("CA$", "CAD"),
    ("NZ$", "NZD"),
    ("HK$", "HKD"),
    ("R$", "BRL"),
    ("A$", "AUD"),
    ("C$", "CAD"),
    ("S$", "SGD"),
    ("Rs.", "INR"),
    ("₹", "INR"),
    ("€", "EUR"),
    ("£", "GBP"),
    ("¥", "JPY"),
    ("₩", "KRW"),
    ("₽", "RUB"),
    ("₺", "TRY"),
    ("₫", "VND"),
    ("฿", "THB"),
    ("₱", "PHP"),
    ("₦", "NGN"),
    ("₪", "ILS"),
    ("₴", "UAH"),
    ("zł", "PLN"),
    ("$", "USD"),
];

const CURRENCY_CODES: &[&str] = &[
    "USD", "EUR", "GBP", "INR", "JPY", "CNY", "AUD", "CAD", "NZD", "CHF", "SEK", "NOK", "DKK",
    "PLN", "BRL", "MXN", "KRW", "RUB", "TRY", "ZAR", "SGD", "HKD", "AED", "SAR", "THB", "VND",
    "PHP", "IDR", "MYR", "NGN", "ILS", "UAH",
];

static CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z]{3}\b").expect("BUG: hardcoded currency code regex is invalid")
});

/// Currency named by `text`, if any symbol or ISO code appears in it
///
/// `"₹499"` gives `INR`, `"499 EUR"` gives `EUR`, `"499"` gives `None`.
#[must_use]
pub fn detect_currency(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for candidate in CODE_RE.find_iter(text) {
        if CURRENCY_CODES.contains(&candidate.as_str()) {
            return Some(candidate.as_str().to_string());
        }
    }

    CURRENCY_SYMBOLS
        .iter()
        .find(|(symbol, _)| text.contains(symbol))
        .map(|(_, code)| (*code).to_string())
}

/// Resolve a symbol or code to its canonical 3-letter code
///
/// A bare three-letter code is uppercased; other unresolvable values pass
/// through verbatim (trimmed).
#[must_use]
pub fn resolve_currency(value: &str) -> String {
    let value = value.trim();
    if value.len() == 3 && value.chars().all(|c| c.is_ascii_alphabetic()) {
        return value.to_ascii_uppercase();
    }
    detect_currency(value).unwrap_or_else(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rupee_symbol_resolves_to_inr() {
        assert_eq!(detect_currency("₹499").as_deref(), Some("INR"));
        assert_eq!(detect_currency("Rs. 1,299").as_deref(), Some("INR"));
    }

    #[test]
    fn dollar_variants() {
        assert_eq!(detect_currency("$19.99").as_deref(), Some("USD"));
        assert_eq!(detect_currency("R$ 49,90").as_deref(), Some("BRL"));
        assert_eq!(detect_currency("C$25").as_deref(), Some("CAD"));
        assert_eq!(detect_currency("CA$25").as_deref(), Some("CAD"));
    }

    #[test]
    fn iso_codes_win_over_symbols() {
        assert_eq!(detect_currency("19.99 EUR").as_deref(), Some("EUR"));
        assert_eq!(detect_currency("$20 AUD").as_deref(), Some("AUD"));
    }

    #[test]
    fn unknown_values_pass_through() {
        assert_eq!(detect_currency("499"), None);
        assert_eq!(detect_currency("try 2 for 30"), None);
        assert_eq!(resolve_currency(" doubloons "), "doubloons");
        assert_eq!(resolve_currency("£5"), "GBP");
    }

    #[test]
    fn lowercase_codes_are_uppercased() {
        assert_eq!(resolve_currency("usd"), "USD");
        assert_eq!(resolve_currency(" eur "), "EUR");
        assert_eq!(resolve_currency("Inr"), "INR");
        assert_eq!(resolve_currency("USD"), "USD");
    }
}
