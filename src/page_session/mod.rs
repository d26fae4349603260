//! Page session management
//!
//! A `PageSession` wraps one browser page for the lifetime of one crawl:
//! navigation with bounded exponential retry, a readiness poll that never
//! errors, and plain-data snapshots for the extractors.

mod chrome;
mod driver;
mod session;
mod timeout;

pub use chrome::{ChromeDriver, ChromeLauncher};
pub use driver::{DriverFactory, NavigationResponse, PageDriver};
pub use session::{PageSession, PageSnapshot};
pub use timeout::with_page_timeout;
