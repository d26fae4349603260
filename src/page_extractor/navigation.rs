//! Navigation menu, category links and store contact details

use regex::Regex;
use scraper::Selector;
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

use super::context::{ExtractContext, selector_list, text_of};
use super::schema::{CategoryInfo, ContactInfo, NavLink};

/// Upper bound on navigation links kept from menu-heavy pages
const MAX_NAV_LINKS: usize = 50;

static NAV_LINKS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("nav a[href], header a[href], [role='navigation'] a[href]")
        .expect("BUG: hardcoded navigation selector is invalid")
});

static BREADCRUMB_ITEMS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selector_list(&[
        ".breadcrumb li",
        ".breadcrumbs li",
        "[aria-label='breadcrumb'] li",
        "nav.breadcrumb a",
        ".breadcrumb a",
        ".breadcrumbs a",
    ])
});

static CATEGORY_LINKS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "a[href*='/category'], a[href*='/categories'], a[href*='/collections'], \
         .category a[href], .categories a[href], [class*='category-nav'] a[href]",
    )
    .expect("BUG: hardcoded category selector is invalid")
});

static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("BUG: hardcoded CSS selector 'a[href]' is invalid"));

static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("BUG: hardcoded CSS selector 'body' is invalid"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
        .expect("BUG: hardcoded email regex is invalid")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+\d{1,3}[\s.-]?)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}")
        .expect("BUG: hardcoded phone regex is invalid")
});

const SOCIAL_HOSTS: &[(&str, &str)] = &[
    ("facebook.com", "facebook"),
    ("instagram.com", "instagram"),
    ("twitter.com", "twitter"),
    ("x.com", "twitter"),
    ("pinterest.com", "pinterest"),
    ("youtube.com", "youtube"),
    ("tiktok.com", "tiktok"),
    ("linkedin.com", "linkedin"),
];

fn is_followable(href: &str) -> bool {
    let href = href.trim();
    !(href.is_empty()
        || href.starts_with('#')
        || href.to_ascii_lowercase().starts_with("javascript:"))
}

/// Menu links from `<nav>`, `<header>` and ARIA navigation regions
///
/// Fragment and `javascript:` links are skipped and URLs are deduplicated.
#[must_use]
pub fn extract_navigation(ctx: &ExtractContext) -> Vec<NavLink> {
    let mut seen = HashSet::new();
    ctx.document()
        .select(&NAV_LINKS)
        .filter_map(|a| {
            let href = a.value().attr("href").filter(|h| is_followable(h))?;
            let text = text_of(a);
            if text.is_empty() {
                return None;
            }
            let url = ctx.resolve(href)?;
            seen.insert(url.clone()).then_some(NavLink { text, url })
        })
        .take(MAX_NAV_LINKS)
        .collect()
}

/// Breadcrumb trail and category links
#[must_use]
pub fn extract_categories(ctx: &ExtractContext) -> CategoryInfo {
    let breadcrumbs = BREADCRUMB_ITEMS
        .iter()
        .map(|selector| {
            ctx.document()
                .select(selector)
                .map(text_of)
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
        })
        .find(|crumbs| !crumbs.is_empty())
        .unwrap_or_default();

    let mut seen = HashSet::new();
    let categories = ctx
        .document()
        .select(&CATEGORY_LINKS)
        .filter_map(|a| {
            let text = text_of(a);
            let url = ctx.resolve(a.value().attr("href")?)?;
            (!text.is_empty() && seen.insert(url.clone())).then_some(NavLink { text, url })
        })
        .collect();

    CategoryInfo {
        breadcrumbs,
        categories,
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

fn social_network(url: &str) -> Option<&'static str> {
    let host = Url::parse(url).ok()?.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    SOCIAL_HOSTS
        .iter()
        .find(|(domain, _)| host == *domain || host.ends_with(&format!(".{domain}")))
        .map(|(_, network)| *network)
}

/// Emails, phone numbers and social profiles
///
/// `mailto:`/`tel:` links come first, then matches in the visible body text.
/// The first link per social network wins.
#[must_use]
pub fn extract_contact(ctx: &ExtractContext) -> ContactInfo {
    let mut contact = ContactInfo::default();

    for a in ctx.document().select(&ANCHORS) {
        let Some(href) = a.value().attr("href").map(str::trim) else {
            continue;
        };
        let lower = href.to_ascii_lowercase();
        if lower.starts_with("mailto:") {
            let address = href[7..].split('?').next().unwrap_or_default().trim();
            if !address.is_empty() {
                push_unique(&mut contact.emails, address.to_string());
            }
        } else if lower.starts_with("tel:") {
            let number = href[4..].trim();
            if !number.is_empty() {
                push_unique(&mut contact.phones, number.to_string());
            }
        } else if let Some(url) = ctx.resolve(href)
            && let Some(network) = social_network(&url)
        {
            contact.social.entry(network.to_string()).or_insert(url);
        }
    }

    if let Some(body) = ctx.select_first(&BODY) {
        let text = text_of(body);
        for m in EMAIL_RE.find_iter(&text) {
            push_unique(&mut contact.emails, m.as_str().to_string());
        }
        for m in PHONE_RE.find_iter(&text) {
            push_unique(&mut contact.phones, m.as_str().trim().to_string());
        }
    }

    contact
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_session::PageSnapshot;

    fn ctx(html: &str) -> ExtractContext {
        ExtractContext::new(&PageSnapshot::from_html(Some("https://shop.test/"), html))
    }

    #[test]
    fn nav_links_skip_fragments_and_duplicates() {
        let page = ctx(r##"<nav>
            <a href="/new">New</a>
            <a href="#top">Top</a>
            <a href="javascript:void(0)">Menu</a>
            <a href="/new">New again</a>
            <a href="/sale"> </a>
            </nav><header><a href="https://shop.test/about">About</a></header>"##);
        let links = extract_navigation(&page);
        assert_eq!(
            links,
            vec![
                NavLink { text: "New".into(), url: "https://shop.test/new".into() },
                NavLink { text: "About".into(), url: "https://shop.test/about".into() },
            ]
        );
    }

    #[test]
    fn breadcrumbs_and_category_links() {
        let page = ctx(r#"<ol class="breadcrumb"><li>Home</li><li>Shoes</li><li>Runner</li></ol>
            <a href="/collections/boots">Boots</a>
            <a href="/collections/boots">Boots</a>
            <a href="/about">About</a>"#);
        let info = extract_categories(&page);
        assert_eq!(info.breadcrumbs, ["Home", "Shoes", "Runner"]);
        assert_eq!(info.categories.len(), 1);
        assert_eq!(info.categories[0].url, "https://shop.test/collections/boots");
    }

    #[test]
    fn contact_from_links_and_text() {
        let page = ctx(r#"<body><footer>
            <a href="mailto:help@shop.test?subject=hi">Email us</a>
            <a href="tel:+1-555-010-9999">Call</a>
            <a href="https://www.instagram.com/shop">IG</a>
            <a href="https://instagram.com/other">IG 2</a>
            <p>Wholesale: sales@shop.test or 555-123-4567</p>
            </footer></body>"#);
        let contact = extract_contact(&page);
        assert_eq!(contact.emails, ["help@shop.test", "sales@shop.test"]);
        assert!(contact.phones.contains(&"+1-555-010-9999".to_string()));
        assert!(contact.phones.contains(&"555-123-4567".to_string()));
        assert_eq!(contact.social["instagram"], "https://www.instagram.com/shop");
        assert_eq!(contact.social.len(), 1);
    }
}
