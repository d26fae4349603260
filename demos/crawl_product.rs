//! Crawl one product page and print the response payload
//!
//! Usage: cargo run --example crawl_product -- <URL> [--headed]
//! Example: RUST_LOG=storefront_crawl=debug cargo run --example crawl_product -- https://shop.example/p/mug

use storefront_crawl::{CrawlConfig, CrawlService};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,chromiumoxide=off")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(url) = args.iter().find(|a| !a.starts_with("--")) else {
        eprintln!("usage: crawl_product <URL> [--headed]");
        std::process::exit(2);
    };
    let headed = args.iter().any(|a| a == "--headed");

    let config = CrawlConfig::builder().headless(!headed).build()?;
    tracing::info!("Crawling {}", url);

    match CrawlService::new(config).crawl(url).await {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {e}");
            Err(e.into())
        }
    }
}
