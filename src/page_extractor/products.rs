//! Product listing extraction
//!
//! Product containers are located by an ordered cascade:
//!
//! 1. known product selectors (`.product`, `.product-card`, `[data-product-id]`, ...)
//! 2. class-name patterns (`product.*image`, `image.*container`, `product.*container`)
//! 3. structure: the innermost elements holding both an image and price-like text
//! 4. last resort: large images whose URL is not a placeholder, logo or icon,
//!    one listing per image
//!
//! The first strategy that finds anything wins. Listings keep document order
//! and are capped at `MAX_PRODUCTS_PER_PAGE`.

use regex::Regex;
use scraper::{ElementRef, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

use super::context::{ExtractContext, ImageCandidate, first_text, selector_list, text_of};
use super::currency::detect_currency;
use super::schema::{Availability, ProductListing, Variant};
use super::strategy::Cascade;
use crate::utils::constants::{
    MAX_PRODUCTS_PER_PAGE, MIN_CONTAINER_IMAGE_WIDTH, MIN_PRODUCT_IMAGE_EDGE,
};

/// Where a listing comes from: a product container or a lone image
#[derive(Debug, Clone)]
pub enum ProductSource<'a> {
    Container(ElementRef<'a>),
    Image(ImageCandidate),
}

static CONTAINER_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selector_list(&[
        ".product",
        ".product-card",
        ".product-item",
        ".product-container",
        "[data-product-id]",
        ".item-product",
        "[class*='ProductImage']",
        "[class*='product-image']",
        "[class*='productImage']",
        "[class*='imageContainer']",
        "[class*='image-container']",
    ])
});

static TITLE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selector_list(&[
        "h1",
        "h2",
        "h3",
        "h4",
        ".product-title",
        ".title",
        "[class*='product-name']",
        "[class*='productName']",
        "[class*='ProductTitle']",
        "[itemprop='name']",
    ])
});

static PRICE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selector_list(&[
        ".price",
        ".product-price",
        "[data-price]",
        "[itemprop='price']",
        "[class*='price']",
        "[class*='Price']",
    ])
});

static SALE_PRICE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selector_list(&[
        ".sale-price",
        ".special-price",
        "[class*='sale']",
        "[class*='Sale']",
    ])
});

static REGULAR_PRICE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selector_list(&[
        ".regular-price",
        ".original-price",
        ".old-price",
        "[class*='regular']",
        "[class*='original']",
    ])
});

static DESCRIPTION_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selector_list(&[
        ".description",
        ".product-description",
        "[itemprop='description']",
        "[class*='description']",
        "[class*='Description']",
    ])
});

static SKU_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selector_list(&["[itemprop='sku']", ".sku", "[class*='sku']", "[class*='SKU']"])
});

static AVAILABILITY_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selector_list(&[
        "[itemprop='availability']",
        ".availability",
        ".stock",
        "[class*='stock']",
        "[class*='Stock']",
    ])
});

static VARIANT_SELECT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("select.variant, select[name*='variant'], select.option, select[name*='option']")
        .expect("BUG: hardcoded variant select selector is invalid")
});

static SWATCH_CONTAINERS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".swatch, .color-swatch, .size-swatch, [class*='swatch'], [class*='Swatch']")
        .expect("BUG: hardcoded swatch selector is invalid")
});

static SWATCH_ITEMS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a, button, [role='button'], input[type='radio']")
        .expect("BUG: hardcoded swatch item selector is invalid")
});

static OPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("option").expect("BUG: hardcoded CSS selector 'option' is invalid"));

static IMG: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("BUG: hardcoded CSS selector 'img' is invalid"));

static PICTURE_SOURCE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("picture source[srcset]")
        .expect("BUG: hardcoded CSS selector 'picture source' is invalid")
});

static LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("BUG: hardcoded CSS selector 'a[href]' is invalid"));

static BREADCRUMB: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".breadcrumb, .breadcrumbs, [class*='breadcrumb']")
        .expect("BUG: hardcoded breadcrumb selector is invalid")
});

static ALL_ELEMENTS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body *").expect("BUG: hardcoded CSS selector 'body *' is invalid"));

static PRICE_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[$€£₹¥]|Rs\.?)\s?\d[\d,]*(?:\.\d{1,2})?|\d[\d,]*\.\d{2}")
        .expect("BUG: hardcoded price regex is invalid")
});

static CONTAINER_CLASS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)product.*image|image.*container|product.*container")
        .expect("BUG: hardcoded container class regex is invalid")
});

static QUANTITY_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:left|remaining|in stock)")
        .expect("BUG: hardcoded quantity regex is invalid")
});

const EXCLUDED_IMAGE_MARKERS: &[&str] = &["placeholder", "logo", "icon"];

// ============================================================================
// Container strategies
// ============================================================================

/// Elements matched by the first known product selector that matches anything
pub fn by_known_selectors(ctx: &ExtractContext) -> Vec<ProductSource<'_>> {
    CONTAINER_SELECTORS
        .iter()
        .map(|selector| ctx.document().select(selector).collect::<Vec<_>>())
        .find(|matches| !matches.is_empty())
        .unwrap_or_default()
        .into_iter()
        .map(ProductSource::Container)
        .collect()
}

/// Elements whose class attribute looks like a product or image container.
/// Nested matches collapse into their outermost ancestor.
pub fn by_class_patterns(ctx: &ExtractContext) -> Vec<ProductSource<'_>> {
    let matches: Vec<ElementRef<'_>> = ctx
        .document()
        .select(&ALL_ELEMENTS)
        .filter(|el| {
            el.value()
                .attr("class")
                .is_some_and(|class| CONTAINER_CLASS_PATTERN.is_match(class))
        })
        .collect();

    outermost(matches).into_iter().map(ProductSource::Container).collect()
}

/// Innermost elements that contain an image and price-like text
pub fn by_structure(ctx: &ExtractContext) -> Vec<ProductSource<'_>> {
    let qualifies = |el: &ElementRef<'_>| {
        el.select(&IMG).next().is_some()
            && (PRICE_TEXT.is_match(&el.text().collect::<String>())
                || PRICE_SELECTORS[0].matches(el)
                || el.select(&PRICE_SELECTORS[0]).next().is_some())
    };

    let candidates: Vec<ElementRef<'_>> = ctx.document().select(&ALL_ELEMENTS).filter(qualifies).collect();
    let candidate_ids: HashSet<_> = candidates.iter().map(|el| el.id()).collect();

    candidates
        .into_iter()
        .filter(|el| {
            !el.descendants()
                .skip(1)
                .any(|node| candidate_ids.contains(&node.id()))
        })
        .map(ProductSource::Container)
        .collect()
}

/// Images at least `MIN_PRODUCT_IMAGE_EDGE` on both edges whose URL is not a
/// placeholder, logo or icon. Images of unknown size are skipped.
pub fn by_large_images(ctx: &ExtractContext) -> Vec<ProductSource<'_>> {
    ctx.images()
        .filter_map(|img| ctx.image(img))
        .filter(|candidate| {
            let url = candidate.url.to_lowercase();
            !EXCLUDED_IMAGE_MARKERS.iter().any(|marker| url.contains(marker))
                && candidate.size.is_some_and(|(w, h)| {
                    w >= MIN_PRODUCT_IMAGE_EDGE && h >= MIN_PRODUCT_IMAGE_EDGE
                })
        })
        .map(ProductSource::Image)
        .collect()
}

/// The container cascade in precedence order
pub fn product_cascade<'a>() -> Cascade<'a, ExtractContext, ProductSource<'a>> {
    Cascade::new("products")
        .then("known_selectors", by_known_selectors)
        .then("class_patterns", by_class_patterns)
        .then("structure", by_structure)
        .then("large_images", by_large_images)
}

fn outermost(elements: Vec<ElementRef<'_>>) -> Vec<ElementRef<'_>> {
    let ids: HashSet<_> = elements.iter().map(|el| el.id()).collect();
    elements
        .into_iter()
        .filter(|el| !el.ancestors().any(|node| ids.contains(&node.id())))
        .collect()
}

// ============================================================================
// Listing fields
// ============================================================================

/// Up to `limit` product listings (never more than `MAX_PRODUCTS_PER_PAGE`)
#[must_use]
pub fn extract_products(ctx: &ExtractContext, limit: usize) -> Vec<ProductListing> {
    let limit = limit.min(MAX_PRODUCTS_PER_PAGE);
    let outcome = product_cascade().run(ctx);
    let category = breadcrumb_category(ctx);

    let listings: Vec<ProductListing> = outcome
        .items
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, source)| match source {
            ProductSource::Container(el) => listing_from_container(ctx, el, index, &category),
            ProductSource::Image(image) => listing_from_image(image, index),
        })
        .collect();

    debug!(
        "Extracted {} product listings via {:?}",
        listings.len(),
        outcome.strategy
    );
    listings
}

fn listing_from_image(image: ImageCandidate, index: usize) -> ProductListing {
    ProductListing {
        id: format!("product-{index}"),
        title: image.alt,
        images: vec![image.url],
        ..ProductListing::default()
    }
}

fn listing_from_container(
    ctx: &ExtractContext,
    el: ElementRef<'_>,
    index: usize,
    category: &str,
) -> ProductListing {
    let attrs = el.value();
    let sku = attrs
        .attr("data-product-id")
        .or_else(|| attrs.attr("data-sku"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| first_text(el, &SKU_SELECTORS).map(|text| strip_label(&text)))
        .unwrap_or_default();

    let id = if sku.is_empty() {
        format!("product-{index}")
    } else {
        sku.clone()
    };

    let listed_price = first_text(el, &PRICE_SELECTORS).or_else(|| {
        PRICE_TEXT
            .find(&text_of(el))
            .map(|m| m.as_str().to_string())
    });
    let (price, sale_price, regular_price) = reconcile_prices(el, listed_price);
    let currency = detect_currency(&price);

    ProductListing {
        id,
        title: first_text(el, &TITLE_SELECTORS).unwrap_or_default(),
        price,
        sale_price,
        regular_price,
        currency,
        description: first_text(el, &DESCRIPTION_SELECTORS).unwrap_or_default(),
        category: category.to_string(),
        sku,
        availability: availability(el),
        variants: variants(el),
        images: container_images(ctx, el),
        url: product_url(ctx, el),
    }
}

/// Returns `(price, sale_price, regular_price)`
///
/// With a sale marker present the effective price is the sale price and the
/// regular price comes from a regular/original marker, falling back to the
/// plain listed price.
fn reconcile_prices(
    el: ElementRef<'_>,
    listed_price: Option<String>,
) -> (String, Option<String>, Option<String>) {
    let listed_price = listed_price.unwrap_or_default();

    let Some(sale) = first_price(el, &SALE_PRICE_SELECTORS) else {
        return (listed_price, None, None);
    };

    let regular = first_price(el, &REGULAR_PRICE_SELECTORS)
        .or_else(|| price_fragment(&listed_price).filter(|p| *p != sale));

    (sale.clone(), Some(sale), regular)
}

/// The price-looking part of a text ("Sale: $14.99" -> "$14.99")
fn price_fragment(text: &str) -> Option<String> {
    PRICE_TEXT.find(text).map(|m| m.as_str().trim().to_string())
}

/// First price fragment among elements matching the selectors, in list order.
/// Markers without a price ("Sale!") are skipped.
fn first_price(el: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors
        .iter()
        .flat_map(|selector| el.select(selector))
        .find_map(|marker| price_fragment(&text_of(marker)))
}

/// "SKU: AB-12" -> "AB-12"
fn strip_label(text: &str) -> String {
    match text.split_once(':') {
        Some((label, value)) if label.trim().eq_ignore_ascii_case("sku") => value.trim().to_string(),
        _ => text.trim().to_string(),
    }
}

fn availability(el: ElementRef<'_>) -> Availability {
    AVAILABILITY_SELECTORS
        .iter()
        .find_map(|selector| el.select(selector).next())
        .map_or(Availability::Unknown, |found| {
            let attrs = found.value();
            let hint = attrs.attr("href").or_else(|| attrs.attr("content")).unwrap_or_default();
            match Availability::from_text(hint) {
                Availability::Unknown => Availability::from_text(&text_of(found)),
                known => known,
            }
        })
}

fn variants(el: ElementRef<'_>) -> Vec<Variant> {
    let mut variants = Vec::new();

    if let Some(select) = el.select(&VARIANT_SELECT).next() {
        let name = select.value().attr("name").unwrap_or("variant");
        for option in select.select(&OPTION) {
            let value = option.value().attr("value").unwrap_or_default().trim();
            let label = text_of(option);
            if value.is_empty() || value == "choose" || label == "Select" {
                continue;
            }
            variants.push(Variant {
                name: name.to_string(),
                value: label,
                id: value.to_string(),
            });
        }
    }

    for container in outermost(el.select(&SWATCH_CONTAINERS).collect()) {
        let kind = if container
            .value()
            .attr("class")
            .is_some_and(|c| c.to_lowercase().contains("color"))
        {
            "color"
        } else {
            "size"
        };

        for swatch in container.select(&SWATCH_ITEMS) {
            let attrs = swatch.value();
            let id = attrs
                .attr("value")
                .or_else(|| attrs.attr("data-value"))
                .unwrap_or_default()
                .to_string();
            let text = text_of(swatch);
            let value = [Some(text.as_str()), attrs.attr("title"), Some(id.as_str())]
                .into_iter()
                .flatten()
                .find(|v| !v.is_empty())
                .unwrap_or_default()
                .to_string();
            variants.push(Variant {
                name: kind.to_string(),
                value,
                id,
            });
        }
    }

    let mut seen = HashSet::new();
    variants.retain(|v| seen.insert((v.name.clone(), v.value.clone(), v.id.clone())));
    variants
}

fn container_images(ctx: &ExtractContext, el: ElementRef<'_>) -> Vec<String> {
    let is_usable = |candidate: &ImageCandidate| {
        !candidate.url.to_lowercase().contains("placeholder")
            && candidate.size.is_none_or(|(w, _)| w > MIN_CONTAINER_IMAGE_WIDTH)
    };

    let own = (el.value().name() == "img")
        .then(|| ctx.image(el))
        .flatten()
        .into_iter();
    let mut images: Vec<String> = own
        .chain(el.select(&IMG).filter_map(|img| ctx.image(img)))
        .filter(is_usable)
        .map(|candidate| candidate.url)
        .collect();

    if images.is_empty() {
        images = el
            .select(&PICTURE_SOURCE)
            .filter_map(|source| source.value().attr("srcset"))
            .filter_map(|srcset| srcset.split_whitespace().next())
            .filter_map(|src| ctx.resolve(src))
            .filter(|url| !url.to_lowercase().contains("placeholder"))
            .collect();
    }

    let mut seen = HashSet::new();
    images.retain(|url| seen.insert(url.clone()));
    images
}

fn product_url(ctx: &ExtractContext, el: ElementRef<'_>) -> Option<String> {
    let href = if el.value().name() == "a" {
        el.value().attr("href")
    } else {
        None
    };
    href.or_else(|| el.select(&LINK).next().and_then(|a| a.value().attr("href")))
        .and_then(|href| ctx.resolve(href))
}

/// Second-to-last breadcrumb link, the category of the page's product
fn breadcrumb_category(ctx: &ExtractContext) -> String {
    ctx.select_first(&BREADCRUMB)
        .map(|crumbs| crumbs.select(&LINK).map(text_of).collect::<Vec<_>>())
        .filter(|links| links.len() > 1)
        .and_then(|links| links.get(links.len() - 2).cloned())
        .unwrap_or_default()
}

/// Stock quantity stated in free text ("Only 3 left" -> 3)
#[must_use]
pub fn stated_quantity(text: &str) -> Option<u32> {
    QUANTITY_TEXT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
