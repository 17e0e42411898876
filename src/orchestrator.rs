//! Strategy fallback for one URL, and windowed batch processing for many.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::fetch::FetchStrategy;
use crate::models::{FetchMethod, ScrapeResult};

/// Tries the cheap HTTP strategy first and falls back to the browser
/// strategy only when it failed to produce a price. There is no third tier.
pub struct FetchOrchestrator {
    http: Arc<dyn FetchStrategy>,
    browser: Arc<dyn FetchStrategy>,
}

impl FetchOrchestrator {
    pub fn new(http: Arc<dyn FetchStrategy>, browser: Arc<dyn FetchStrategy>) -> Self {
        Self { http, browser }
    }

    pub async fn scrape(&self, url: &str) -> ScrapeResult {
        info!("scraping {url}");

        let http_result = self.http.fetch(url).await;
        if http_result.success {
            debug!("{url}: HTTP strategy succeeded");
            return http_result;
        }

        debug!(
            "{url}: HTTP strategy failed ({}), falling back to browser",
            http_result.error.as_deref().unwrap_or("no price found")
        );
        self.browser.fetch(url).await
    }
}

/// Runs the orchestrator over a URL list in fixed-size concurrent windows
/// with a pause between windows, isolating every per-URL failure.
pub struct BatchRunner {
    orchestrator: Arc<FetchOrchestrator>,
    window_size: usize,
    pause: Duration,
    currency: String,
}

impl BatchRunner {
    pub fn new(orchestrator: Arc<FetchOrchestrator>, config: &AppConfig) -> Self {
        Self {
            orchestrator,
            window_size: config.batch.window_size,
            pause: Duration::from_millis(config.batch.pause_ms),
            currency: config.currency.clone(),
        }
    }

    /// Exactly one result per input URL, in input order.
    pub async fn run(&self, urls: &[String]) -> Vec<ScrapeResult> {
        let mut results = Vec::with_capacity(urls.len());

        for (index, window) in urls.chunks(self.window_size).enumerate() {
            if index > 0 {
                // Rate limiting between windows
                tokio::time::sleep(self.pause).await;
            }

            let handles: Vec<_> = window
                .iter()
                .map(|url| {
                    let orchestrator = self.orchestrator.clone();
                    let url = url.clone();
                    tokio::spawn(async move { orchestrator.scrape(&url).await })
                })
                .collect();

            // Collecting by spawn order keeps output aligned with input even
            // though completions within the window interleave.
            for (url, joined) in window.iter().zip(join_all(handles).await) {
                match joined {
                    Ok(result) => results.push(result),
                    Err(e) => {
                        warn!("batch task for {url} failed: {e}");
                        results.push(ScrapeResult::failed(
                            url,
                            "Toplu İşlem Hatası",
                            &self.currency,
                            FetchMethod::Batch,
                            e.to_string(),
                            None,
                        ));
                    }
                }
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubStrategy {
        method: FetchMethod,
        succeed: bool,
        calls: AtomicUsize,
    }

    impl StubStrategy {
        fn new(method: FetchMethod, succeed: bool) -> Self {
            Self {
                method,
                succeed,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FetchStrategy for StubStrategy {
        async fn fetch(&self, url: &str) -> ScrapeResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                ScrapeResult::extracted(
                    url,
                    "Ürün".to_string(),
                    Some(Decimal::from(100)),
                    "TL",
                    self.method,
                    1,
                )
            } else {
                ScrapeResult::failed(url, "Hata", "TL", self.method, "boom".to_string(), Some(1))
            }
        }
    }

    /// Panics on a marked URL to model an unexpected internal error.
    struct PanickyStrategy;

    #[async_trait]
    impl FetchStrategy for PanickyStrategy {
        async fn fetch(&self, url: &str) -> ScrapeResult {
            if url.contains("boom") {
                panic!("internal error");
            }
            ScrapeResult::extracted(
                url,
                "Ürün".to_string(),
                Some(Decimal::from(50)),
                "TL",
                FetchMethod::Http,
                1,
            )
        }
    }

    #[tokio::test]
    async fn test_http_success_skips_browser() {
        let http = Arc::new(StubStrategy::new(FetchMethod::Http, true));
        let browser = Arc::new(StubStrategy::new(FetchMethod::Browser, true));
        let orchestrator = FetchOrchestrator::new(http.clone(), browser.clone());

        let result = orchestrator.scrape("https://example.com/p").await;
        assert!(result.success);
        assert_eq!(result.method, FetchMethod::Http);
        assert_eq!(http.calls(), 1);
        assert_eq!(browser.calls(), 0);
    }

    #[tokio::test]
    async fn test_http_failure_invokes_browser_exactly_once() {
        let http = Arc::new(StubStrategy::new(FetchMethod::Http, false));
        let browser = Arc::new(StubStrategy::new(FetchMethod::Browser, true));
        let orchestrator = FetchOrchestrator::new(http.clone(), browser.clone());

        let result = orchestrator.scrape("https://example.com/p").await;
        assert!(result.success);
        assert_eq!(result.method, FetchMethod::Browser);
        assert_eq!(http.calls(), 1);
        assert_eq!(browser.calls(), 1);
    }

    #[tokio::test]
    async fn test_browser_failure_is_final() {
        let http = Arc::new(StubStrategy::new(FetchMethod::Http, false));
        let browser = Arc::new(StubStrategy::new(FetchMethod::Browser, false));
        let orchestrator = FetchOrchestrator::new(http.clone(), browser.clone());

        let result = orchestrator.scrape("https://example.com/p").await;
        assert!(!result.success);
        assert_eq!(result.method, FetchMethod::Browser);
        assert_eq!(browser.calls(), 1);
    }

    fn test_runner(orchestrator: FetchOrchestrator) -> BatchRunner {
        let mut config = AppConfig::default();
        config.batch.pause_ms = 0;
        BatchRunner::new(Arc::new(orchestrator), &config)
    }

    #[tokio::test]
    async fn test_batch_preserves_input_order() {
        let http = Arc::new(StubStrategy::new(FetchMethod::Http, true));
        let browser = Arc::new(StubStrategy::new(FetchMethod::Browser, true));
        let runner = test_runner(FetchOrchestrator::new(http, browser));

        let urls: Vec<String> = (0..5)
            .map(|i| format!("https://example.com/p{i}"))
            .collect();
        let results = runner.run(&urls).await;

        assert_eq!(results.len(), 5);
        for (url, result) in urls.iter().zip(&results) {
            assert_eq!(&result.url, url);
        }
    }

    #[tokio::test]
    async fn test_batch_isolates_panicking_url() {
        let http = Arc::new(PanickyStrategy);
        let browser = Arc::new(StubStrategy::new(FetchMethod::Browser, false));
        let runner = test_runner(FetchOrchestrator::new(http, browser));

        let urls = vec![
            "https://example.com/ok1".to_string(),
            "https://example.com/boom".to_string(),
            "https://example.com/ok2".to_string(),
        ];
        let results = runner.run(&urls).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].success);
        assert!(!results[1].success);
        assert_eq!(results[1].method, FetchMethod::Batch);
        assert!(results[1].error.is_some());
        assert!(results[2].success);
    }

    #[tokio::test]
    async fn test_empty_batch_is_empty() {
        let http = Arc::new(StubStrategy::new(FetchMethod::Http, true));
        let browser = Arc::new(StubStrategy::new(FetchMethod::Browser, true));
        let runner = test_runner(FetchOrchestrator::new(http, browser));

        assert!(runner.run(&[]).await.is_empty());
    }
}
