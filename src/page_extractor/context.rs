//! Parsed view of a page snapshot shared by all extractors

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;
use url::Url;

use super::schema::{ImageGeometry, PageProbe};
use crate::page_session::PageSnapshot;
use crate::utils::{collapse_whitespace, resolve_url};

static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("BUG: hardcoded CSS selector 'img' is invalid"));

/// An `<img>` with its resolved URL and, when known, its rendered size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub url: String,
    pub alt: String,
    pub size: Option<(u32, u32)>,
}

pub struct ExtractContext {
    document: Html,
    page_url: Option<Url>,
    probe: PageProbe,
    /// Document-order index of every `<img>`, used to look up probe geometry
    img_positions: HashMap<NodeId, usize>,
    /// Probe geometry is only trusted when it saw the same number of images
    probe_matches_dom: bool,
}

impl ExtractContext {
    #[must_use]
    pub fn new(snapshot: &PageSnapshot) -> Self {
        let document = Html::parse_document(&snapshot.html);
        let page_url = snapshot.url.as_deref().and_then(|u| Url::parse(u).ok());

        let img_positions: HashMap<NodeId, usize> = document
            .select(&IMG_SELECTOR)
            .enumerate()
            .map(|(index, img)| (img.id(), index))
            .collect();
        let probe_matches_dom = img_positions.len() == snapshot.probe.images.len();
        if !probe_matches_dom && !snapshot.probe.images.is_empty() {
            tracing::debug!(
                "Probe saw {} images, snapshot has {}; using HTML attributes",
                snapshot.probe.images.len(),
                img_positions.len()
            );
        }

        Self {
            document,
            page_url,
            probe: snapshot.probe.clone(),
            img_positions,
            probe_matches_dom,
        }
    }

    pub fn document(&self) -> &Html {
        &self.document
    }

    pub fn page_url(&self) -> Option<&Url> {
        self.page_url.as_ref()
    }

    pub fn probe(&self) -> &PageProbe {
        &self.probe
    }

    /// Resolve a reference found in the page to an absolute URL
    pub fn resolve(&self, reference: &str) -> Option<String> {
        resolve_url(self.page_url.as_ref(), reference)
    }

    /// First element matching `selector`, anywhere in the document
    pub fn select_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.document.select(selector).next()
    }

    /// All `<img>` elements in document order
    pub fn images(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.document.select(&IMG_SELECTOR)
    }

    fn geometry(&self, img: ElementRef<'_>) -> Option<&ImageGeometry> {
        if !self.probe_matches_dom {
            return None;
        }
        self.img_positions
            .get(&img.id())
            .and_then(|index| self.probe.images.get(*index))
    }

    /// Resolved source and size of an `<img>`
    ///
    /// Rendered geometry wins when the probe is usable; otherwise the
    /// `width`/`height` attributes are used and the size may be unknown.
    pub fn image(&self, img: ElementRef<'_>) -> Option<ImageCandidate> {
        let element = img.value();
        let geometry = self.geometry(img);

        let url = geometry
            .and_then(|g| {
                [g.src.as_str(), g.current_src.as_str()]
                    .into_iter()
                    .find_map(|src| self.resolve(src))
            })
            .or_else(|| {
                ["src", "data-src", "data-lazy-src"]
                    .into_iter()
                    .filter_map(|attr| element.attr(attr))
                    .find_map(|src| self.resolve(src))
            })?;

        let size = match geometry {
            Some(g) if g.width > 0 || g.height > 0 => Some((g.width, g.height)),
            _ => element
                .attr("width")
                .and_then(parse_dimension)
                .zip(element.attr("height").and_then(parse_dimension)),
        };

        let alt = element.attr("alt").map(str::trim).unwrap_or_default().to_string();

        Some(ImageCandidate { url, alt, size })
    }
}

/// Parse `300`, `300px` or `300.5` into whole pixels
fn parse_dimension(value: &str) -> Option<u32> {
    let trimmed = value.trim().trim_end_matches("px").trim();
    trimmed
        .parse::<u32>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().filter(|v| *v >= 0.0).map(|v| v as u32))
}

/// Whitespace-collapsed text content of an element
pub fn text_of(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Text of the first descendant of `scope` matching any selector, in list order
pub fn first_text(scope: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors
        .iter()
        .find_map(|selector| scope.select(selector).next())
        .map(text_of)
        .filter(|text| !text.is_empty())
}

/// Parse a list of hardcoded selectors
///
/// # Panics
///
/// Panics on an invalid selector literal, which is a programming error.
pub fn selector_list(selectors: &[&str]) -> Vec<Selector> {
    selectors
        .iter()
        .map(|css| {
            Selector::parse(css)
                .unwrap_or_else(|e| panic!("BUG: hardcoded CSS selector '{css}' is invalid: {e}"))
        })
        .collect()
}
