//! Document title, meta tags, Open Graph, Twitter cards and JSON-LD

use scraper::Selector;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

use super::context::{ExtractContext, text_of};
use super::schema::{Headers, MetaTags, PageMetadata};

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("BUG: hardcoded CSS selector 'title' is invalid"));

static META_DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[name="description"]"#)
        .expect("BUG: hardcoded CSS selector 'meta[name=description]' is invalid")
});

static META_KEYWORDS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[name="keywords"]"#)
        .expect("BUG: hardcoded CSS selector 'meta[name=keywords]' is invalid")
});

static META_AUTHOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[name="author"]"#)
        .expect("BUG: hardcoded CSS selector 'meta[name=author]' is invalid")
});

static CANONICAL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"link[rel="canonical"]"#)
        .expect("BUG: hardcoded CSS selector 'link[rel=canonical]' is invalid")
});

static OG_TAGS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[property^="og:"]"#)
        .expect("BUG: hardcoded CSS selector 'meta[property^=og:]' is invalid")
});

static TWITTER_TAGS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[name^="twitter:"]"#)
        .expect("BUG: hardcoded CSS selector 'meta[name^=twitter:]' is invalid")
});

static JSON_LD: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#)
        .expect("BUG: hardcoded CSS selector for JSON-LD scripts is invalid")
});

static HEADINGS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6")
        .expect("BUG: hardcoded CSS selector 'h1..h6' is invalid")
});

fn meta_content(ctx: &ExtractContext, selector: &Selector) -> Option<String> {
    ctx.select_first(selector)
        .and_then(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(str::to_string)
}

/// Prefixed meta tags (`og:title` -> `title`). Later duplicates win.
fn prefixed_tags(ctx: &ExtractContext, selector: &Selector, attr: &str, prefix: &str) -> BTreeMap<String, String> {
    ctx.document()
        .select(selector)
        .filter_map(|el| {
            let key = el.value().attr(attr)?.strip_prefix(prefix)?;
            let content = el.value().attr("content").unwrap_or_default();
            Some((key.to_string(), content.trim().to_string()))
        })
        .collect()
}

/// Parsed JSON-LD blocks. `None` when the page has no JSON-LD script at all;
/// blocks that are not valid JSON are skipped.
fn schema_org(ctx: &ExtractContext) -> Option<Vec<serde_json::Value>> {
    let mut scripts = ctx.document().select(&JSON_LD).peekable();
    scripts.peek()?;

    let blocks = scripts
        .filter_map(|script| {
            let raw: String = script.text().collect();
            match serde_json::from_str(raw.trim()) {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!("Skipping invalid JSON-LD block: {e}");
                    None
                }
            }
        })
        .collect();
    Some(blocks)
}

/// Page metadata, or `None` when the page has no title and no meta information
#[must_use]
pub fn extract_metadata(ctx: &ExtractContext) -> Option<PageMetadata> {
    let title = ctx
        .select_first(&TITLE)
        .map(text_of)
        .filter(|t| !t.is_empty());

    let canonical = ctx
        .select_first(&CANONICAL)
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| ctx.resolve(href));

    let metadata = PageMetadata {
        title,
        metadata: MetaTags {
            description: meta_content(ctx, &META_DESCRIPTION),
            keywords: meta_content(ctx, &META_KEYWORDS),
            author: meta_content(ctx, &META_AUTHOR),
            canonical,
            og_tags: prefixed_tags(ctx, &OG_TAGS, "property", "og:"),
            twitter_tags: prefixed_tags(ctx, &TWITTER_TAGS, "name", "twitter:"),
            schema_org: schema_org(ctx),
        },
    };

    if metadata.is_empty() {
        debug!("No metadata found on page");
        None
    } else {
        Some(metadata)
    }
}

/// `H1`..`H6` to heading text; the last non-empty heading of each level wins
#[must_use]
pub fn extract_headers(ctx: &ExtractContext) -> Headers {
    let mut headers = Headers::new();
    for heading in ctx.document().select(&HEADINGS) {
        let text = text_of(heading);
        if text.is_empty() {
            continue;
        }
        headers.insert(heading.value().name().to_ascii_uppercase(), text);
    }
    headers
}

/// Schema.org `Product` nodes from JSON-LD, including ones nested in `@graph`
#[must_use]
pub fn schema_org_products(metadata: &PageMetadata) -> Vec<&serde_json::Value> {
    fn is_product(value: &serde_json::Value) -> bool {
        match value.get("@type") {
            Some(serde_json::Value::String(t)) => t == "Product",
            Some(serde_json::Value::Array(types)) => types.iter().any(|t| t == "Product"),
            _ => false,
        }
    }

    fn collect<'v>(value: &'v serde_json::Value, out: &mut Vec<&'v serde_json::Value>) {
        match value {
            serde_json::Value::Array(items) => items.iter().for_each(|item| collect(item, out)),
            serde_json::Value::Object(map) => {
                if is_product(value) {
                    out.push(value);
                }
                if let Some(graph) = map.get("@graph") {
                    collect(graph, out);
                }
            }
            _ => {}
        }
    }

    let mut products = Vec::new();
    for block in metadata.metadata.schema_org.iter().flatten() {
        collect(block, &mut products);
    }
    products
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_session::PageSnapshot;

    fn ctx(html: &str) -> ExtractContext {
        ExtractContext::new(&PageSnapshot::from_html(Some("https://shoes.test/item"), html))
    }

    #[test]
    fn description_og_title_and_no_schema() {
        let page = ctx(r#"<html><head>
            <title>Runner 2</title>
            <meta name="description" content="Buy shoes">
            <meta property="og:title" content="Shoe Store">
            </head><body></body></html>"#);
        let meta = extract_metadata(&page).unwrap();
        assert_eq!(meta.metadata.description.as_deref(), Some("Buy shoes"));
        assert_eq!(meta.metadata.og_tags.get("title").map(String::as_str), Some("Shoe Store"));
        assert!(meta.metadata.schema_org.is_none());
    }

    #[test]
    fn invalid_json_ld_blocks_are_skipped() {
        let page = ctx(r#"<html><head>
            <script type="application/ld+json">{"@type": "Product", "name": "Runner"}</script>
            <script type="application/ld+json">{not json</script>
            <link rel="canonical" href="/item">
            <meta name="twitter:card" content="summary">
            </head></html>"#);
        let meta = extract_metadata(&page).unwrap();
        let blocks = meta.metadata.schema_org.as_ref().unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(meta.metadata.canonical.as_deref(), Some("https://shoes.test/item"));
        assert_eq!(meta.metadata.twitter_tags["card"], "summary");
        assert_eq!(schema_org_products(&meta).len(), 1);
    }

    #[test]
    fn bare_page_has_no_metadata() {
        assert!(extract_metadata(&ctx("<html><body><p>hi</p></body></html>")).is_none());
    }

    #[test]
    fn last_heading_per_level_wins() {
        let page = ctx("<h1>Shoes</h1><h2>First</h2><h2> Second \n pair </h2><h3></h3>");
        let headers = extract_headers(&page);
        assert_eq!(headers["H1"], "Shoes");
        assert_eq!(headers["H2"], "Second pair");
        assert!(!headers.contains_key("H3"));
    }
}
