use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Live-page probe (filled by PAGE_PROBE_SCRIPT)
// ============================================================================

/// Rendered geometry of one `<img>`, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageGeometry {
    pub src: String,
    pub current_src: String,
    pub alt: String,
    pub width: u32,
    pub height: u32,
}

/// Computed style of a single element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSample {
    pub family: Option<String>,
    pub size: Option<String>,
    pub weight: Option<String>,
    pub color: Option<String>,
    pub background_color: Option<String>,
    pub background_image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Typography {
    pub headings: Option<StyleSample>,
    pub body: Option<StyleSample>,
    pub buttons: Option<StyleSample>,
    pub prices: Option<StyleSample>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub primary: Option<StyleSample>,
    pub secondary: Option<StyleSample>,
    pub accent: Option<StyleSample>,
    pub text: Option<StyleSample>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutInfo {
    pub max_width: Option<String>,
    pub padding: Option<String>,
    pub margin: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleProbe {
    pub typography: Typography,
    pub font_families: Vec<String>,
    pub backgrounds: BTreeMap<String, StyleSample>,
    pub palette: Palette,
    pub layout: Option<LayoutInfo>,
}

/// Everything the extractors need from the live page besides its HTML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageProbe {
    pub images: Vec<ImageGeometry>,
    pub styles: StyleProbe,
}

// ============================================================================
// Extractor output
// ============================================================================

/// Heading tag (`H1`..`H6`) to heading text. The last heading of a level wins.
pub type Headers = BTreeMap<String, String>;

/// Meta tags of a page. Every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaTags {
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub author: Option<String>,
    pub canonical: Option<String>,
    pub og_tags: BTreeMap<String, String>,
    pub twitter_tags: BTreeMap<String, String>,
    /// `None` when the page carries no `application/ld+json` block
    pub schema_org: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub metadata: MetaTags,
}

impl PageMetadata {
    /// True when the page yielded no title and no meta information at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let meta = &self.metadata;
        self.title.is_none()
            && meta.description.is_none()
            && meta.keywords.is_none()
            && meta.author.is_none()
            && meta.canonical.is_none()
            && meta.og_tags.is_empty()
            && meta.twitter_tags.is_empty()
            && meta.schema_org.is_none()
    }
}

/// Tri-state stock status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    OutOfStock,
    #[default]
    Unknown,
}

impl Availability {
    /// Keyword match over free text. "out of stock" is checked first because
    /// it contains "in stock"-like fragments on some pages ("not in stock").
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("out of stock")
            || lower.contains("out_of_stock")
            || lower.contains("outofstock")
            || lower.contains("sold out")
            || lower.contains("unavailable")
            || lower.contains("not in stock")
        {
            Self::OutOfStock
        } else if lower.contains("in stock")
            || lower.contains("in_stock")
            || lower.contains("instock")
            || lower.contains("available")
        {
            Self::InStock
        } else {
            Self::Unknown
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InStock => "in_stock",
            Self::OutOfStock => "out_of_stock",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub name: String,
    pub value: String,
    pub id: String,
}

/// One product found on a page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductListing {
    pub id: String,
    pub title: String,
    pub price: String,
    pub sale_price: Option<String>,
    pub regular_price: Option<String>,
    pub currency: Option<String>,
    pub description: String,
    pub category: String,
    pub sku: String,
    pub availability: Availability,
    pub variants: Vec<Variant>,
    pub images: Vec<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Logo {
    Image {
        url: String,
        alt: String,
        width: Option<u32>,
        height: Option<u32>,
    },
    Svg {
        markup: String,
        width: Option<u32>,
        height: Option<u32>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontStyle {
    pub family: Option<String>,
    pub size: Option<String>,
    pub weight: Option<String>,
    pub color: Option<String>,
    pub color_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontInfo {
    pub headings: Option<FontStyle>,
    pub body: Option<FontStyle>,
    pub buttons: Option<FontStyle>,
    pub prices: Option<FontStyle>,
    pub all_detected_fonts: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeColor {
    pub color: Option<String>,
    pub color_name: Option<String>,
    pub background_color: Option<String>,
    pub background_name: Option<String>,
    pub background_image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeInfo {
    pub colors: BTreeMap<String, ThemeColor>,
    pub background: BTreeMap<String, ThemeColor>,
    pub layout: Option<LayoutInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub breadcrumbs: Vec<String>,
    pub categories: Vec<NavLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    /// Platform name (`facebook`, `instagram`, ...) to profile URL
    pub social: BTreeMap<String, String>,
}

impl ContactInfo {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.phones.is_empty() && self.social.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub quantity: Option<u32>,
    pub text: String,
    pub status: Availability,
}

/// Product id to stock information
pub type Inventory = BTreeMap<String, InventoryEntry>;

/// Storefront-level details gathered alongside the required artifacts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorefrontDetails {
    pub logo: Option<Logo>,
    pub fonts: Option<FontInfo>,
    pub theme: Option<ThemeInfo>,
    pub navigation: Vec<NavLink>,
    pub categories: CategoryInfo,
    pub contact: ContactInfo,
    pub inventory: Inventory,
    pub currency: Option<String>,
}

/// Result of running every extractor over one snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageExtraction {
    pub products: Vec<ProductListing>,
    pub headers: Headers,
    pub metadata: Option<PageMetadata>,
    pub storefront: StorefrontDetails,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_keywords() {
        assert_eq!(Availability::from_text("In Stock"), Availability::InStock);
        assert_eq!(Availability::from_text("Only 3 available"), Availability::InStock);
        assert_eq!(Availability::from_text("SOLD OUT"), Availability::OutOfStock);
        assert_eq!(Availability::from_text("Out of stock"), Availability::OutOfStock);
        assert_eq!(Availability::from_text("Ships in 2 weeks"), Availability::Unknown);
    }

    #[test]
    fn probe_tolerates_partial_json() {
        let probe: PageProbe = serde_json::from_value(serde_json::json!({
            "images": [{"src": "https://shop.test/a.jpg", "width": 300}]
        }))
        .unwrap();
        assert_eq!(probe.images[0].height, 0);
        assert!(probe.styles.font_families.is_empty());
    }

    #[test]
    fn missing_schema_org_serializes_as_null() {
        let meta = PageMetadata::default();
        let json = serde_json::to_value(&meta).unwrap();
        assert!(json["metadata"]["schema_org"].is_null());
        assert!(meta.is_empty());
    }
}
