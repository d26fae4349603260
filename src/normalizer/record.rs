//! Loosely-typed product records as produced upstream

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{FIELD_MAP, is_blank};
use crate::page_extractor::schema::{Availability, ProductListing};

/// A product as handed over by an extractor or a model
///
/// Producers disagree on shape: some emit a JSON object, others a sequence
/// of `(key, value)` pairs. `into_mapping` is the one place the two meet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawProductRecord {
    Mapping(Map<String, Value>),
    Pairs(Vec<(String, Value)>),
}

impl Default for RawProductRecord {
    fn default() -> Self {
        Self::Mapping(Map::new())
    }
}

impl RawProductRecord {
    /// Collapse into a mapping. With pairs, a later duplicate key wins.
    #[must_use]
    pub fn into_mapping(self) -> Map<String, Value> {
        match self {
            Self::Mapping(map) => map,
            Self::Pairs(pairs) => {
                let mut map = Map::new();
                for (key, value) in pairs {
                    map.insert(key, value);
                }
                map
            }
        }
    }

    /// Overlay `fields` on this record
    ///
    /// A non-blank overlay value takes over its whole canonical field: every
    /// key of ours feeding that field is dropped, so a supplied `price` is not
    /// shadowed by our `sale_price`. Blank overlay values are ignored.
    #[must_use]
    pub fn merged_with(self, fields: Map<String, Value>) -> Self {
        let mut map = self.into_mapping();
        let fields: Map<String, Value> = fields
            .into_iter()
            .filter(|(_, value)| !is_blank(value))
            .collect();

        for (_, keys) in FIELD_MAP {
            if keys.iter().any(|key| fields.contains_key(*key)) {
                for key in *keys {
                    map.remove(*key);
                }
            }
        }
        map.extend(fields);
        Self::Mapping(map)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Mapping(map) => map.is_empty(),
            Self::Pairs(pairs) => pairs.is_empty(),
        }
    }

    /// Value of `key`. With pairs, the last occurrence wins.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Mapping(map) => map.get(key),
            Self::Pairs(pairs) => pairs.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v),
        }
    }
}

impl From<Map<String, Value>> for RawProductRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self::Mapping(map)
    }
}

impl From<Vec<(String, Value)>> for RawProductRecord {
    fn from(pairs: Vec<(String, Value)>) -> Self {
        Self::Pairs(pairs)
    }
}

impl From<ProductListing> for RawProductRecord {
    fn from(listing: ProductListing) -> Self {
        let mut map = Map::new();
        map.insert("id".into(), Value::String(listing.id));
        map.insert("title".into(), Value::String(listing.title));
        map.insert("price".into(), Value::String(listing.price));
        if let Some(sale) = listing.sale_price {
            map.insert("sale_price".into(), Value::String(sale));
        }
        if let Some(regular) = listing.regular_price {
            map.insert("regular_price".into(), Value::String(regular));
        }
        if let Some(currency) = listing.currency {
            map.insert("currency".into(), Value::String(currency));
        }
        map.insert("description".into(), Value::String(listing.description));
        map.insert("category".into(), Value::String(listing.category));
        map.insert("sku".into(), Value::String(listing.sku));
        if listing.availability != Availability::Unknown {
            map.insert(
                "availability".into(),
                Value::String(listing.availability.as_str().to_string()),
            );
        }
        map.insert(
            "variants".into(),
            Value::Array(
                listing
                    .variants
                    .into_iter()
                    .map(|variant| {
                        let mut entry = Map::new();
                        entry.insert("name".into(), Value::String(variant.name));
                        entry.insert("value".into(), Value::String(variant.value));
                        entry.insert("id".into(), Value::String(variant.id));
                        Value::Object(entry)
                    })
                    .collect(),
            ),
        );
        map.insert(
            "images".into(),
            Value::Array(listing.images.into_iter().map(Value::String).collect()),
        );
        if let Some(url) = listing.url {
            map.insert("url".into(), Value::String(url));
        }
        Self::Mapping(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn later_pairs_win() {
        let record = RawProductRecord::Pairs(vec![
            ("title".into(), json!("Old")),
            ("price".into(), json!("$5")),
            ("title".into(), json!("New")),
        ]);
        assert_eq!(record.get("title"), Some(&json!("New")));
        let map = record.into_mapping();
        assert_eq!(map.len(), 2);
        assert_eq!(map["title"], "New");
    }

    #[test]
    fn untagged_deserialization() {
        let mapping: RawProductRecord = serde_json::from_str(r#"{"title": "Mug"}"#).unwrap();
        assert!(matches!(mapping, RawProductRecord::Mapping(_)));

        let pairs: RawProductRecord = serde_json::from_str(r#"[["title", "Mug"]]"#).unwrap();
        assert!(matches!(pairs, RawProductRecord::Pairs(_)));
        assert_eq!(mapping.into_mapping(), pairs.into_mapping());
    }

    #[test]
    fn overlay_replaces_fields() {
        let record = RawProductRecord::from(ProductListing {
            id: "sku-1".into(),
            title: "Mug".into(),
            price: "$9".into(),
            ..ProductListing::default()
        });
        let mut overlay = Map::new();
        overlay.insert("price".into(), json!("$7"));
        overlay.insert("brand".into(), json!("Acme"));

        let merged = record.merged_with(overlay).into_mapping();
        assert_eq!(merged["price"], "$7");
        assert_eq!(merged["brand"], "Acme");
        assert_eq!(merged["title"], "Mug");
        assert!(!merged.contains_key("availability"));
        assert!(!merged.contains_key("sale_price"));
    }

    #[test]
    fn overlay_takes_over_whole_field() {
        let record = RawProductRecord::from(ProductListing {
            price: "$14.99".into(),
            sale_price: Some("$14.99".into()),
            regular_price: Some("$19.99".into()),
            availability: Availability::InStock,
            ..ProductListing::default()
        });
        let mut overlay = Map::new();
        overlay.insert("price".into(), json!("$12.00"));
        overlay.insert("stock".into(), json!({"out_of_stock": true}));
        overlay.insert("regular_price".into(), Value::Null);

        let merged = record.merged_with(overlay).into_mapping();
        assert_eq!(merged["price"], "$12.00");
        assert!(!merged.contains_key("sale_price"));
        assert!(!merged.contains_key("availability"));
        assert_eq!(merged["stock"], json!({"out_of_stock": true}));
        assert_eq!(merged["regular_price"], "$19.99");
    }
}
