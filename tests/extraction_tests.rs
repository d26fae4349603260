//! Page extraction over static snapshots

use serde_json::json;
use storefront_crawl::page_extractor::products::extract_products;
use storefront_crawl::{
    Availability, ExtractContext, ImageGeometry, PageProbe, PageSnapshot, extract_page,
};

mod common;
use common::{create_test_html, product_grid, product_page_html};

const STORE_URL: &str = "https://store.test/collections/all";

fn snapshot(html: String) -> PageSnapshot {
    PageSnapshot::from_html(Some(STORE_URL), html)
}

#[test]
fn test_product_listings_are_capped_in_document_order() {
    let html = create_test_html("All products", "", &product_grid(35));
    let extraction = extract_page(&snapshot(html), 20);

    assert_eq!(extraction.products.len(), 20);
    let titles: Vec<&str> = extraction.products.iter().map(|p| p.title.as_str()).collect();
    let expected: Vec<String> = (0..20).map(|i| format!("Item {i}")).collect();
    assert_eq!(titles, expected);
    assert_eq!(extraction.products[7].id, "sku-7");
    assert_eq!(extraction.products[7].price, "$7.99");
    assert_eq!(
        extraction.products[7].images,
        vec!["https://store.test/img/7.jpg".to_string()]
    );
}

#[test]
fn test_lower_limit_is_honored() {
    let html = create_test_html("All products", "", &product_grid(8));
    let ctx = ExtractContext::new(&snapshot(html));
    assert_eq!(extract_products(&ctx, 5).len(), 5);
    assert_eq!(extract_products(&ctx, 50).len(), 8);
}

#[test]
fn test_metadata_and_headers() {
    let html = create_test_html(
        "Winter Sale",
        r#"<meta name="description" content="Big discounts">
           <meta name="keywords" content="boots, coats">
           <meta property="og:title" content="Winter Sale at Store">
           <meta name="twitter:card" content="summary">
           <link rel="canonical" href="https://store.test/sale">"#,
        "<h1>First</h1><h1>Winter Sale</h1><h3>Boots</h3>",
    );
    let extraction = extract_page(&snapshot(html), 20);

    let metadata = extraction.metadata.expect("page has metadata");
    assert_eq!(metadata.title.as_deref(), Some("Winter Sale"));
    assert_eq!(metadata.metadata.description.as_deref(), Some("Big discounts"));
    assert_eq!(metadata.metadata.keywords.as_deref(), Some("boots, coats"));
    assert_eq!(metadata.metadata.canonical.as_deref(), Some("https://store.test/sale"));
    assert_eq!(metadata.metadata.og_tags["title"], "Winter Sale at Store");
    assert_eq!(metadata.metadata.twitter_tags["card"], "summary");
    assert_eq!(metadata.metadata.schema_org, None);

    assert_eq!(extraction.headers["H1"], "Winter Sale");
    assert_eq!(extraction.headers["H3"], "Boots");
    assert!(!extraction.headers.contains_key("H2"));
}

#[test]
fn test_json_ld_is_collected() {
    let html = create_test_html(
        "Runner",
        r#"<script type="application/ld+json">
            {"@context": "https://schema.org", "@type": "Product", "name": "Runner", "sku": "RN-1"}
           </script>"#,
        "<h1>Runner</h1>",
    );
    let extraction = extract_page(&snapshot(html), 20);

    let blocks = extraction.metadata.unwrap().metadata.schema_org.unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0]["sku"], json!("RN-1"));
}

#[test]
fn test_sale_and_regular_prices() {
    let extraction = extract_page(&snapshot(product_page_html()), 20);
    let product = &extraction.products[0];

    assert_eq!(product.price, "$14.99");
    assert_eq!(product.sale_price.as_deref(), Some("$14.99"));
    assert_eq!(product.regular_price.as_deref(), Some("$19.99"));
    assert_eq!(product.currency.as_deref(), Some("USD"));
    assert_eq!(product.availability, Availability::InStock);
    assert_eq!(extraction.storefront.inventory["tr-1"].quantity, Some(3));
}

#[test]
fn test_rupee_prices_resolve_to_inr() {
    let html = create_test_html(
        "Kurtas",
        "",
        r#"<div class="product-item">
               <img src="/kurta.jpg" width="400" height="400">
               <h3>Cotton Kurta</h3>
               <span class="price">₹499</span>
           </div>"#,
    );
    let extraction = extract_page(&snapshot(html), 20);

    assert_eq!(extraction.products[0].price, "₹499");
    assert_eq!(extraction.products[0].currency.as_deref(), Some("INR"));
    assert_eq!(extraction.storefront.currency.as_deref(), Some("INR"));
}

#[test]
fn test_large_image_fallback() {
    let html = create_test_html(
        "Lookbook",
        "",
        r#"<img src="/site-logo.png" width="400" height="200">
           <img src="/looks/one.jpg" width="600" height="800" alt="Look one">
           <img src="/spinner-placeholder.gif" width="400" height="400">
           <img src="/looks/two.jpg" width="600" height="800" alt="Look two">
           <img src="/icons/cart-icon.svg" width="400" height="400">
           <img src="/looks/thumb.jpg" width="60" height="60">
           <img src="/looks/three.jpg" width="100" height="100" alt="Look three">
           <img src="/looks/unsized.jpg">"#,
    );
    let extraction = extract_page(&snapshot(html), 20);

    let images: Vec<&str> = extraction
        .products
        .iter()
        .map(|p| p.images[0].as_str())
        .collect();
    assert_eq!(
        images,
        [
            "https://store.test/looks/one.jpg",
            "https://store.test/looks/two.jpg",
            "https://store.test/looks/three.jpg",
        ]
    );
    assert_eq!(extraction.products[1].title, "Look two");
    assert_eq!(extraction.products[2].id, "product-2");
}

#[test]
fn test_probe_geometry_overrides_attributes() {
    let html = create_test_html(
        "Lookbook",
        "",
        r#"<img src="/looks/one.jpg"><img src="/looks/two.jpg" width="600" height="600">"#,
    );
    let probe = PageProbe {
        images: vec![
            ImageGeometry {
                src: "https://cdn.store.test/looks/one.jpg".into(),
                width: 500,
                height: 700,
                ..ImageGeometry::default()
            },
            ImageGeometry {
                src: "https://cdn.store.test/looks/two.jpg".into(),
                width: 40,
                height: 40,
                ..ImageGeometry::default()
            },
        ],
        ..PageProbe::default()
    };
    let snapshot = PageSnapshot {
        probe,
        ..snapshot(html)
    };

    let extraction = extract_page(&snapshot, 20);

    assert_eq!(extraction.products.len(), 1);
    assert_eq!(
        extraction.products[0].images,
        vec!["https://cdn.store.test/looks/one.jpg".to_string()]
    );
}

#[test]
fn test_storefront_details() {
    let html = create_test_html(
        "Shoe Store",
        "",
        r##"<header>
               <img src="/brand.png" alt="Shoe Store">
               <nav><a href="/men">Men</a><a href="/women">Women</a><a href="#">Top</a></nav>
           </header>
           <div class="breadcrumb"><a href="/">Home</a><a href="/collections/boots">Boots</a><span>Hiker</span></div>
           <footer>
               <a href="mailto:help@shoes.test?subject=Hi">Email us</a>
               <a href="https://instagram.com/shoes">Instagram</a>
               Call 555-123-4567
           </footer>"##,
    );
    let extraction = extract_page(&snapshot(html), 20);
    let storefront = &extraction.storefront;

    assert!(matches!(
        &storefront.logo,
        Some(storefront_crawl::Logo::Image { url, .. }) if url == "https://store.test/brand.png"
    ));
    let nav: Vec<&str> = storefront.navigation.iter().map(|l| l.text.as_str()).collect();
    assert!(nav.contains(&"Men"));
    assert!(nav.contains(&"Women"));
    assert!(!nav.contains(&"Top"));
    assert!(storefront.categories.breadcrumbs.iter().any(|b| b == "Boots"));
    assert_eq!(storefront.contact.emails, vec!["help@shoes.test".to_string()]);
    assert!(storefront.contact.phones.iter().any(|p| p.contains("555-123-4567")));
    assert_eq!(
        storefront.contact.social.get("instagram").map(String::as_str),
        Some("https://instagram.com/shoes")
    );
}
