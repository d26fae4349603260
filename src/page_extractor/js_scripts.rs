//! JavaScript evaluation scripts
//!
//! Only data that needs the live layout engine is read through JavaScript:
//! document readiness, rendered image geometry and computed styles.
//! Everything else is extracted from the HTML snapshot in Rust.

/// Reports `document.readyState` and whether `<body>` exists
pub const READY_STATE_SCRIPT: &str = r#"
    (() => ({
        readyState: document.readyState,
        bodyExists: document.body !== null
    }))()
"#;

/// Collects rendered geometry for every `<img>` in document order plus the
/// computed font and colour styles the branding extractors need.
pub const PAGE_PROBE_SCRIPT: &str = r#"
    (() => {
        const images = Array.from(document.querySelectorAll('img')).map(img => ({
            src: img.src || img.getAttribute('data-src') || img.getAttribute('data-lazy-src') || '',
            current_src: img.currentSrc || '',
            alt: img.alt || '',
            width: Math.round(img.width || 0),
            height: Math.round(img.height || 0)
        }));

        const styleOf = (el) => {
            const style = window.getComputedStyle(el);
            return {
                family: style.fontFamily,
                size: style.fontSize,
                weight: style.fontWeight,
                color: style.color,
                background_color: style.backgroundColor,
                background_image: style.backgroundImage
            };
        };

        const firstStyle = (selectors) => {
            for (const selector of selectors) {
                const el = document.querySelector(selector);
                if (el) {
                    return styleOf(el);
                }
            }
            return null;
        };

        const typography = {
            headings: firstStyle(['h1', 'h2', 'h3']),
            body: firstStyle(['p', '.product-description', '.product-details']),
            buttons: firstStyle(['button', '.btn', '.button']),
            prices: firstStyle(['.price', '.product-price', '.amount'])
        };

        const fontFamilies = new Set();
        for (const sheet of Array.from(document.styleSheets)) {
            let rules = [];
            try {
                rules = Array.from(sheet.cssRules || sheet.rules || []);
            } catch (e) {
                continue;
            }
            for (const rule of rules) {
                if (rule.style && rule.style.fontFamily) {
                    fontFamilies.add(rule.style.fontFamily);
                }
            }
        }

        const backgrounds = {};
        for (const selector of ['body', 'header', 'footer', '.main-content', '.product-container']) {
            const el = document.querySelector(selector);
            if (el) {
                backgrounds[selector] = styleOf(el);
            }
        }

        const palette = {
            primary: firstStyle(['a', '.btn-primary', '.primary-button']),
            secondary: firstStyle(['.btn-secondary', '.secondary-button']),
            accent: firstStyle(['.accent', '.highlight', '.featured']),
            text: firstStyle(['body', 'p', '.description'])
        };

        let layout = null;
        const main = document.querySelector('.main-content, #main, main');
        if (main) {
            const style = window.getComputedStyle(main);
            layout = { max_width: style.maxWidth, padding: style.padding, margin: style.margin };
        }

        return {
            images,
            styles: {
                typography,
                font_families: Array.from(fontFamilies),
                backgrounds,
                palette,
                layout
            }
        };
    })()
"#;
