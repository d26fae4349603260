//! Product normalization
//!
//! Turns whatever shape the extractors and the vision model produced into a
//! `CanonicalProduct` with a fixed field set. Every canonical field is read
//! through `FIELD_MAP`; absent data becomes an empty value, never a missing key.

mod price;
mod record;
mod response;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use price::parse_price;
pub use record::RawProductRecord;
pub use response::CrawlResponse;

use crate::page_extractor::currency::{detect_currency, resolve_currency};
use crate::page_extractor::metadata::schema_org_products;
use crate::page_extractor::schema::{Availability, Headers, PageMetadata};

/// Canonical field to the upstream keys that feed it, highest priority first
///
/// Upstream `title` feeds only `title`; `name` comes from `name` or
/// `product_name`. Effective price prefers an explicit sale price.
pub const FIELD_MAP: &[(&str, &[&str])] = &[
    ("product_id", &["id", "product_id"]),
    ("title", &["title"]),
    ("description", &["description", "product_description"]),
    ("name", &["name", "product_name"]),
    ("brand", &["brand"]),
    ("price", &["sale_price", "price"]),
    ("regular_price", &["regular_price"]),
    ("offer", &["offer"]),
    ("currency", &["currency", "priceCurrency"]),
    ("sku", &["sku"]),
    ("gtin", &["gtin", "gtin13", "gtin12", "gtin14", "gtin8"]),
    ("mpn", &["mpn"]),
    ("product_url", &["product_url", "url"]),
    ("category", &["category"]),
    ("availability", &["availability", "stock"]),
    ("variants", &["variants"]),
    ("images", &["images", "product_images"]),
    ("features", &["features", "product_features"]),
];

/// The fixed-shape product record every downstream consumer reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalProduct {
    pub product_id: String,
    pub title: String,
    pub description: String,
    pub name: String,
    pub brand: String,
    pub price: String,
    pub regular_price: String,
    pub offer: String,
    pub currency: String,
    pub sku: String,
    pub gtin: String,
    pub mpn: String,
    pub product_url: String,
    pub category: String,
    pub availability: Availability,
    pub variants: Vec<Value>,
    pub images: Vec<String>,
    pub features: Vec<String>,
}

impl CanonicalProduct {
    /// Effective price as a number, when it parses
    #[must_use]
    pub fn price_amount(&self) -> Option<f64> {
        parse_price(&self.price)
    }

    #[must_use]
    pub fn regular_price_amount(&self) -> Option<f64> {
        parse_price(&self.regular_price)
    }

    /// Name to show for the product: `name`, else `title`
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.title
        } else {
            &self.name
        }
    }
}

/// Page-level values used where the product record has nothing
///
/// Keys are upstream keys, so they go through `FIELD_MAP` like the record.
fn page_fallbacks(headers: &Headers, metadata: &PageMetadata) -> Map<String, Value> {
    let mut fallback = Map::new();

    if let Some(product) = schema_org_products(metadata).into_iter().next() {
        for key in ["name", "description", "sku", "mpn", "gtin", "gtin13", "gtin12", "gtin14", "gtin8", "brand", "category", "url"] {
            if let Some(value) = product.get(key) {
                fallback.insert(key.to_string(), value.clone());
            }
        }
        if let Some(offers) = product.get("offers") {
            let offer = offers.as_array().and_then(|o| o.first()).unwrap_or(offers);
            for key in ["price", "priceCurrency", "availability"] {
                if let Some(value) = offer.get(key) {
                    fallback.insert(key.to_string(), value.clone());
                }
            }
        }
        if let Some(images) = product.get("image") {
            fallback.insert("images".into(), images.clone());
        }
    }

    let meta = &metadata.metadata;
    if let Some(h1) = headers.get("H1") {
        fallback.insert("title".into(), Value::String(h1.clone()));
    }
    if !fallback.contains_key("description")
        && let Some(description) = &meta.description
    {
        fallback.insert("description".into(), Value::String(description.clone()));
    }
    if !fallback.contains_key("url")
        && let Some(canonical) = &meta.canonical
    {
        fallback.insert("url".into(), Value::String(canonical.clone()));
    }

    fallback
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// First non-blank value for a canonical field, record before page fallbacks
fn lookup<'a>(
    field: &str,
    record: &'a Map<String, Value>,
    fallback: &'a Map<String, Value>,
) -> Option<&'a Value> {
    let keys = FIELD_MAP
        .iter()
        .find(|(canonical, _)| *canonical == field)
        .map_or(&[][..], |(_, keys)| *keys);

    [record, fallback].into_iter().find_map(|source| {
        keys.iter()
            .filter_map(|key| source.get(*key))
            .find(|value| !is_blank(value))
    })
}

/// First availability any source actually states, record before page fallbacks
///
/// Values that say nothing (`"unknown"`, unrecognized text) are skipped like
/// blanks so a later key or the page can still answer.
fn lookup_availability(record: &Map<String, Value>, fallback: &Map<String, Value>) -> Availability {
    let keys = FIELD_MAP
        .iter()
        .find(|(canonical, _)| *canonical == "availability")
        .map_or(&[][..], |(_, keys)| *keys);

    [record, fallback]
        .into_iter()
        .flat_map(|source| keys.iter().filter_map(|key| source.get(*key)))
        .map(render_availability)
        .find(|availability| *availability != Availability::Unknown)
        .unwrap_or_default()
}

/// Text form of a value: numbers and booleans print, objects give their name
fn render_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(render_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => ["name", "value", "url", "src", "@id"]
            .iter()
            .find_map(|key| map.get(*key))
            .map(render_text)
            .unwrap_or_default(),
    }
}

/// List form of a value: arrays item by item, strings split into lines/bullets
fn render_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(render_text)
            .filter(|text| !text.is_empty())
            .collect(),
        Value::String(s) => s
            .split(['\n', '•'])
            .map(|item| item.trim().trim_start_matches(['-', '*']).trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
        other => {
            let text = render_text(other);
            if text.is_empty() { Vec::new() } else { vec![text] }
        }
    }
}

fn render_variants(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.iter().filter(|item| !is_blank(item)).cloned().collect(),
        Value::Object(_) => vec![value.clone()],
        other => render_list(other).into_iter().map(Value::String).collect(),
    }
}

/// Tri-state availability from a string, enum name, count, flag or stock object
fn render_availability(value: &Value) -> Availability {
    match value {
        Value::String(s) => Availability::from_text(s),
        Value::Number(n) => match n.as_f64() {
            Some(count) if count > 0.0 => Availability::InStock,
            Some(_) => Availability::OutOfStock,
            None => Availability::Unknown,
        },
        Value::Bool(true) => Availability::InStock,
        Value::Bool(false) => Availability::OutOfStock,
        Value::Object(stock) => {
            if stock.get("out_of_stock").and_then(Value::as_bool) == Some(true) {
                Availability::OutOfStock
            } else {
                stock
                    .get("items")
                    .map_or(Availability::Unknown, render_availability)
            }
        }
        _ => Availability::Unknown,
    }
}

/// Build the canonical product from a raw record plus page headers and metadata
///
/// The record is coerced to a mapping once. Fields the record lacks are
/// taken from the page: `title` from the `H1`, identifiers and brand from
/// Schema.org `Product` JSON-LD, `description` and `product_url` from meta
/// tags. Currency is resolved to an ISO code and, when absent, detected from
/// the price text. Output is deterministic for a given input.
#[must_use]
pub fn normalize(
    product: RawProductRecord,
    headers: &Headers,
    metadata: &PageMetadata,
) -> CanonicalProduct {
    let record = product.into_mapping();
    let fallback = page_fallbacks(headers, metadata);

    let text = |field: &str| {
        lookup(field, &record, &fallback)
            .map(render_text)
            .unwrap_or_default()
    };
    let list = |field: &str| {
        lookup(field, &record, &fallback)
            .map(render_list)
            .unwrap_or_default()
    };

    let price = text("price");
    let currency = match text("currency") {
        c if c.is_empty() => detect_currency(&price).unwrap_or_default(),
        c => resolve_currency(&c),
    };

    CanonicalProduct {
        product_id: text("product_id"),
        title: text("title"),
        description: text("description"),
        name: text("name"),
        brand: text("brand"),
        price,
        regular_price: text("regular_price"),
        offer: text("offer"),
        currency,
        sku: text("sku"),
        gtin: text("gtin"),
        mpn: text("mpn"),
        product_url: text("product_url"),
        category: text("category"),
        availability: lookup_availability(&record, &fallback),
        variants: lookup("variants", &record, &fallback)
            .map(render_variants)
            .unwrap_or_default(),
        images: list("images"),
        features: list("features"),
    }
}
