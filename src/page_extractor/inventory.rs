//! Stock indicators keyed by product

use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

use super::context::{ExtractContext, selector_list, text_of};
use super::products::stated_quantity;
use super::schema::{Availability, Inventory, InventoryEntry};

static STOCK_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selector_list(&[
        ".stock",
        ".inventory",
        ".availability",
        ".quantity",
        "[data-stock]",
        ".in-stock",
        ".out-of-stock",
    ])
});

/// Product id of the nearest ancestor carrying one
fn owning_product_id(el: ElementRef<'_>) -> Option<String> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find_map(|ancestor| {
            let element = ancestor.value();
            element
                .attr("data-product-id")
                .or_else(|| element.attr("data-id"))
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
        })
}

/// Stock indicators from the first selector that matches anything
///
/// Entries are keyed by the owning product's id, or `product-{n}` in
/// document order when no ancestor names one.
#[must_use]
pub fn extract_inventory(ctx: &ExtractContext) -> Inventory {
    let Some(indicators) = STOCK_SELECTORS
        .iter()
        .map(|selector| ctx.document().select(selector).collect::<Vec<_>>())
        .find(|matches| !matches.is_empty())
    else {
        return Inventory::new();
    };

    indicators
        .into_iter()
        .enumerate()
        .map(|(index, el)| {
            let mut text = text_of(el);
            if text.is_empty()
                && let Some(stock) = el.value().attr("data-stock")
            {
                text = stock.trim().to_string();
            }

            let classes = el.value().attr("class").unwrap_or_default().replace('-', " ");
            let status = match Availability::from_text(&text) {
                Availability::Unknown => Availability::from_text(&classes),
                known => known,
            };

            let id = owning_product_id(el).unwrap_or_else(|| format!("product-{index}"));
            let entry = InventoryEntry {
                quantity: stated_quantity(&text)
                    .or_else(|| text.trim().parse().ok()),
                text,
                status,
            };
            (id, entry)
        })
        .collect()
}
