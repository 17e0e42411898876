//! Fetch strategies and the browser session lifecycle.

pub mod browser;
pub mod http;
pub mod session;

use async_trait::async_trait;

use crate::models::ScrapeResult;

pub use browser::BrowserFetcher;
pub use http::HttpFetcher;
pub use session::BrowserSessionManager;

/// One way of turning a URL into a [`ScrapeResult`].
///
/// Strategies never propagate errors: transport and navigation failures are
/// converted into failed results at this boundary, which is what lets the
/// orchestrator fall back purely on `result.success`.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    async fn fetch(&self, url: &str) -> ScrapeResult;
}
