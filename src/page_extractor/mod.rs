//! Storefront data extraction from a loaded page.
//!
//! Every extractor here is synchronous and best-effort: it reads a parsed
//! [`PageSnapshot`](crate::page_session::PageSnapshot) and returns whatever it
//! found, an empty value when nothing matched. Absence is never an error at
//! this level; the product agent decides which artifacts are mandatory.

pub mod branding;
pub mod color;
pub mod context;
pub mod currency;
pub mod inventory;
pub mod js_scripts;
pub mod metadata;
pub mod navigation;
pub mod products;
pub mod schema;
pub mod strategy;

use scraper::Selector;
use std::sync::LazyLock;
use tracing::debug;

pub use context::ExtractContext;
pub use schema::{
    Availability, Headers, PageExtraction, PageMetadata, PageProbe, ProductListing,
    StorefrontDetails,
};

use crate::page_session::PageSnapshot;

static PRICE_CURRENCY_META: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"meta[property="product:price:currency"], meta[property="og:price:currency"], meta[itemprop="priceCurrency"]"#,
    )
    .expect("BUG: hardcoded price currency selector is invalid")
});

/// Store currency: first product's currency, else price meta tags, else
/// JSON-LD `offers.priceCurrency`
#[must_use]
pub fn page_currency(
    ctx: &ExtractContext,
    products: &[ProductListing],
    metadata: Option<&PageMetadata>,
) -> Option<String> {
    if let Some(currency) = products.iter().find_map(|p| p.currency.clone()) {
        return Some(currency);
    }

    let from_meta = ctx
        .select_first(&PRICE_CURRENCY_META)
        .and_then(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(currency::resolve_currency);
    if from_meta.is_some() {
        return from_meta;
    }

    let metadata = metadata?;
    metadata::schema_org_products(metadata)
        .into_iter()
        .find_map(|product| {
            let offers = product.get("offers")?;
            let offer = offers.as_array().and_then(|o| o.first()).unwrap_or(offers);
            offer
                .get("priceCurrency")?
                .as_str()
                .map(currency::resolve_currency)
        })
}

/// Run every extractor over one snapshot
///
/// The document is parsed once and shared by all extractors.
#[must_use]
pub fn extract_page(snapshot: &PageSnapshot, product_limit: usize) -> PageExtraction {
    let ctx = ExtractContext::new(snapshot);

    let products = products::extract_products(&ctx, product_limit);
    let headers = metadata::extract_headers(&ctx);
    let page_metadata = metadata::extract_metadata(&ctx);

    let storefront = StorefrontDetails {
        logo: branding::extract_logo(&ctx),
        fonts: branding::extract_fonts(&ctx),
        theme: branding::extract_theme(&ctx),
        navigation: navigation::extract_navigation(&ctx),
        categories: navigation::extract_categories(&ctx),
        contact: navigation::extract_contact(&ctx),
        inventory: inventory::extract_inventory(&ctx),
        currency: page_currency(&ctx, &products, page_metadata.as_ref()),
    };

    debug!(
        products = products.len(),
        headers = headers.len(),
        has_metadata = page_metadata.is_some(),
        nav_links = storefront.navigation.len(),
        "Page extraction complete"
    );

    PageExtraction {
        products,
        headers,
        metadata: page_metadata,
        storefront,
    }
}
