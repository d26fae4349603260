//! Normalization properties and page fallbacks

use proptest::prelude::*;
use serde_json::{Map, Value, json};
use storefront_crawl::{
    Availability, CanonicalProduct, Headers, MetaTags, PageMetadata, RawProductRecord, normalize,
};

const UPSTREAM_KEYS: &[&str] = &[
    "id",
    "product_id",
    "title",
    "name",
    "product_name",
    "description",
    "product_description",
    "brand",
    "price",
    "sale_price",
    "regular_price",
    "offer",
    "currency",
    "priceCurrency",
    "sku",
    "gtin13",
    "mpn",
    "url",
    "category",
    "availability",
    "stock",
    "variants",
    "images",
    "product_features",
    "unrelated",
];

fn text_value() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 $€₹.,:-]{0,16}"
}

fn upstream_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => text_value().prop_map(Value::String),
        1 => any::<u16>().prop_map(|n| json!(n)),
        1 => any::<bool>().prop_map(Value::Bool),
        2 => prop::collection::vec(text_value(), 0..4)
            .prop_map(|items| Value::Array(items.into_iter().map(Value::String).collect())),
        1 => Just(Value::Null),
    ]
}

fn upstream_pairs() -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::vec(
        (prop::sample::select(UPSTREAM_KEYS), upstream_value())
            .prop_map(|(key, value)| (key.to_string(), value)),
        0..12,
    )
}

fn product_page() -> (Headers, PageMetadata) {
    let headers = Headers::from([("H1".to_string(), "Trail Runner".to_string())]);
    let metadata = PageMetadata {
        title: Some("Trail Runner | Shoe Store".into()),
        metadata: MetaTags {
            description: Some("Light trail shoe".into()),
            canonical: Some("https://shoes.test/p/trail-runner".into()),
            schema_org: Some(vec![json!({
                "@context": "https://schema.org",
                "@type": "Product",
                "name": "Trail Runner",
                "brand": {"@type": "Brand", "name": "Peak"},
                "gtin13": "0123456789012",
                "offers": {"price": "14.99", "priceCurrency": "USD", "availability": "https://schema.org/InStock"}
            })]),
            ..MetaTags::default()
        },
    };
    (headers, metadata)
}

fn as_record(product: &CanonicalProduct) -> RawProductRecord {
    match serde_json::to_value(product).unwrap() {
        Value::Object(map) => RawProductRecord::Mapping(map),
        other => panic!("canonical product serialized as {other}"),
    }
}

proptest! {
    #[test]
    fn normalizing_twice_changes_nothing(pairs in upstream_pairs(), with_page in any::<bool>()) {
        let (headers, metadata) = if with_page {
            product_page()
        } else {
            (Headers::new(), PageMetadata::default())
        };

        let once = normalize(RawProductRecord::Pairs(pairs), &headers, &metadata);
        let twice = normalize(as_record(&once), &headers, &metadata);

        prop_assert_eq!(
            serde_json::to_string(&once).unwrap(),
            serde_json::to_string(&twice).unwrap()
        );
    }

    #[test]
    fn pairs_and_mapping_agree(pairs in upstream_pairs()) {
        let (headers, metadata) = product_page();

        let mut mapping = Map::new();
        for (key, value) in pairs.clone() {
            mapping.insert(key, value);
        }

        prop_assert_eq!(
            normalize(RawProductRecord::Pairs(pairs), &headers, &metadata),
            normalize(RawProductRecord::Mapping(mapping), &headers, &metadata)
        );
    }
}

#[test]
fn test_page_fallbacks_fill_missing_fields() {
    let (headers, metadata) = product_page();
    let record: RawProductRecord = vec![
        ("id".to_string(), json!("tr-1")),
        ("description".to_string(), json!("  ")),
    ]
    .into();

    let product = normalize(record, &headers, &metadata);

    assert_eq!(product.product_id, "tr-1");
    assert_eq!(product.title, "Trail Runner");
    assert_eq!(product.name, "Trail Runner");
    assert_eq!(product.brand, "Peak");
    assert_eq!(product.gtin, "0123456789012");
    assert_eq!(product.price, "14.99");
    assert_eq!(product.currency, "USD");
    assert_eq!(product.availability, Availability::InStock);
    assert_eq!(product.description, "Light trail shoe");
    assert_eq!(product.product_url, "https://shoes.test/p/trail-runner");
}

#[test]
fn test_record_values_beat_page_values() {
    let (headers, metadata) = product_page();
    let record: RawProductRecord = serde_json::from_value::<Map<String, Value>>(json!({
        "title": "Trail Runner 2",
        "sale_price": "₹1,199",
        "price": "₹1,499",
        "regular_price": "₹1,499",
        "stock": {"items": 0, "out_of_stock": true},
        "product_features": "Grippy sole\n• Breathable mesh"
    }))
    .unwrap()
    .into();

    let product = normalize(record, &headers, &metadata);

    assert_eq!(product.title, "Trail Runner 2");
    assert_eq!(product.price, "₹1,199");
    assert_eq!(product.currency, "INR");
    assert_eq!(product.price_amount(), Some(1199.0));
    assert_eq!(product.regular_price_amount(), Some(1499.0));
    assert_eq!(product.availability, Availability::OutOfStock);
    assert_eq!(product.features, vec!["Grippy sole", "Breathable mesh"]);
}

#[test]
fn test_untagged_record_shapes_deserialize() {
    let mapping: RawProductRecord = serde_json::from_str(r#"{"title": "Mug"}"#).unwrap();
    let pairs: RawProductRecord = serde_json::from_str(r#"[["title", "Mug"]]"#).unwrap();

    assert!(matches!(mapping, RawProductRecord::Mapping(_)));
    assert!(matches!(pairs, RawProductRecord::Pairs(_)));

    let empty = (Headers::new(), PageMetadata::default());
    assert_eq!(
        normalize(mapping, &empty.0, &empty.1),
        normalize(pairs, &empty.0, &empty.1)
    );
}
