//! Store logo, typography and theme colours

use scraper::Selector;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::color::color_name;
use super::context::{ExtractContext, selector_list};
use super::schema::{FontInfo, FontStyle, Logo, StyleSample, ThemeColor, ThemeInfo};

static LOGO_IMAGE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selector_list(&[
        "header img",
        ".logo img",
        "#logo img",
        ".site-logo img",
        ".header-logo img",
        ".navbar-brand img",
        "[aria-label='logo'] img",
        ".logo a img",
        "img.logo",
        "img[alt*='logo' i]",
    ])
});

static LOGO_SVG: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".logo svg, #logo svg, header svg")
        .expect("BUG: hardcoded logo svg selector is invalid")
});

/// First logo image with a usable source, else an inline SVG logo
#[must_use]
pub fn extract_logo(ctx: &ExtractContext) -> Option<Logo> {
    let image = LOGO_IMAGE_SELECTORS
        .iter()
        .flat_map(|selector| ctx.document().select(selector))
        .find_map(|img| ctx.image(img));

    if let Some(image) = image {
        let (width, height) = image.size.unzip();
        return Some(Logo::Image {
            url: image.url,
            alt: if image.alt.is_empty() {
                "Store logo".to_string()
            } else {
                image.alt
            },
            width,
            height,
        });
    }

    ctx.select_first(&LOGO_SVG).map(|svg| {
        let dimension = |attr: &str| {
            svg.value()
                .attr(attr)
                .and_then(|v| v.trim().trim_end_matches("px").parse::<u32>().ok())
        };
        Logo::Svg {
            markup: svg.html(),
            width: dimension("width"),
            height: dimension("height"),
        }
    })
}

fn font_style(sample: &StyleSample) -> FontStyle {
    FontStyle {
        family: sample.family.clone(),
        size: sample.size.clone(),
        weight: sample.weight.clone(),
        color: sample.color.clone(),
        color_name: sample.color.as_deref().map(color_name),
    }
}

/// Computed fonts of headings, body copy, buttons and prices
///
/// Needs the live-page probe; `None` when it captured no typography.
#[must_use]
pub fn extract_fonts(ctx: &ExtractContext) -> Option<FontInfo> {
    let styles = &ctx.probe().styles;
    let typography = &styles.typography;

    let fonts = FontInfo {
        headings: typography.headings.as_ref().map(font_style),
        body: typography.body.as_ref().map(font_style),
        buttons: typography.buttons.as_ref().map(font_style),
        prices: typography.prices.as_ref().map(font_style),
        all_detected_fonts: styles.font_families.clone(),
    };

    let empty = fonts.headings.is_none()
        && fonts.body.is_none()
        && fonts.buttons.is_none()
        && fonts.prices.is_none()
        && fonts.all_detected_fonts.is_empty();
    (!empty).then_some(fonts)
}

fn theme_color(sample: &StyleSample) -> ThemeColor {
    ThemeColor {
        color: sample.color.clone(),
        color_name: sample.color.as_deref().map(color_name),
        background_color: sample.background_color.clone(),
        background_name: sample.background_color.as_deref().map(color_name),
        background_image: sample
            .background_image
            .clone()
            .filter(|image| image != "none"),
    }
}

/// Palette, section backgrounds and main layout box, with colour names
#[must_use]
pub fn extract_theme(ctx: &ExtractContext) -> Option<ThemeInfo> {
    let styles = &ctx.probe().styles;
    let palette = &styles.palette;

    let colors: BTreeMap<String, ThemeColor> = [
        ("primary", &palette.primary),
        ("secondary", &palette.secondary),
        ("accent", &palette.accent),
        ("text", &palette.text),
    ]
    .into_iter()
    .filter_map(|(role, sample)| sample.as_ref().map(|s| (role.to_string(), theme_color(s))))
    .collect();

    let background: BTreeMap<String, ThemeColor> = styles
        .backgrounds
        .iter()
        .map(|(selector, sample)| (selector.clone(), theme_color(sample)))
        .collect();

    if colors.is_empty() && background.is_empty() && styles.layout.is_none() {
        return None;
    }

    Some(ThemeInfo {
        colors,
        background,
        layout: styles.layout.clone(),
    })
}
