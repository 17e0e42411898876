//! The heavy path: full page render in a managed headless-browser session.
//!
//! Exists for pages whose price is injected by client-side script after the
//! initial load, and for sites that refuse plain clients. After navigation
//! and a settle wait, the rendered DOM is snapshotted and run through the
//! same extraction pipeline as the HTTP path.

use async_trait::async_trait;
use headless_chrome::Tab;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;
use tracing::{debug, info};
use url::Url;

use crate::config::AppConfig;
use crate::document::StaticDocument;
use crate::error::{Result, ScrapeError};
use crate::extract::{check_stock, classify_not_found, extract_candidates, page_title};
use crate::fetch::{BrowserSessionManager, FetchStrategy};
use crate::models::{FetchMethod, ScrapeResult};
use crate::profiles::profile_for;
use crate::rank::select_price;

pub struct BrowserFetcher {
    manager: Arc<BrowserSessionManager>,
    user_agent: String,
    nav_attempts: usize,
    retry_delay: Duration,
    nav_timeout: Duration,
    settle: Duration,
    budget: Duration,
    currency: String,
}

impl BrowserFetcher {
    pub fn new(config: &AppConfig, manager: Arc<BrowserSessionManager>) -> Self {
        Self {
            manager,
            user_agent: config.http.user_agent.clone(),
            nav_attempts: config.browser.nav_attempts,
            retry_delay: Duration::from_millis(config.browser.retry_delay_ms),
            nav_timeout: Duration::from_secs(config.browser.nav_timeout_secs),
            settle: Duration::from_millis(config.browser.settle_ms),
            budget: Duration::from_secs(config.browser.wall_clock_budget_secs),
            currency: config.currency.clone(),
        }
    }

    async fn try_fetch(&self, url: &str, started: Instant) -> Result<ScrapeResult> {
        let tab = self.manager.acquire_page().await?;
        let outcome = self.drive(&tab, url, started).await;
        // The page context is released on every exit path.
        self.manager.release_page(tab).await;
        outcome
    }

    async fn drive(&self, tab: &Arc<Tab>, url: &str, started: Instant) -> Result<ScrapeResult> {
        tab.set_user_agent(&self.user_agent, None, None)?;
        tab.set_default_timeout(self.nav_timeout);

        self.navigate_with_retry(tab, url).await?;

        // Let client-side rendering finish before snapshotting the DOM.
        tokio::time::sleep(self.settle).await;
        if started.elapsed() > self.budget {
            return Err(ScrapeError::Timeout("browser scrape"));
        }

        let content = tab.get_content()?;
        debug!("{url}: rendered page is {} bytes", content.len());

        let host = Url::parse(url)?
            .host_str()
            .unwrap_or_default()
            .to_string();
        let profile = profile_for(&host);

        // Same shared pipeline as the HTTP path, fed the live DOM snapshot.
        let doc = StaticDocument::parse(&content);
        if classify_not_found(&doc) {
            debug!("{url}: rendered page marks product missing");
            return Ok(ScrapeResult::not_found(
                url,
                &self.currency,
                FetchMethod::Browser,
                started.elapsed().as_millis() as u64,
            ));
        }
        if let Some(profile) = profile {
            check_stock(&doc, profile);
        }

        let title = page_title(&doc);
        let candidates = extract_candidates(&doc, profile);
        let price = select_price(&candidates);

        Ok(ScrapeResult::extracted(
            url,
            title,
            price,
            &self.currency,
            FetchMethod::Browser,
            started.elapsed().as_millis() as u64,
        ))
    }

    async fn navigate_with_retry(&self, tab: &Arc<Tab>, url: &str) -> Result<()> {
        let attempt = std::sync::atomic::AtomicUsize::new(0);
        let strategy = FixedInterval::new(self.retry_delay).take(self.nav_attempts.saturating_sub(1));

        Retry::spawn(strategy, || {
            let n = attempt.fetch_add(1, std::sync::atomic::Ordering::Relaxed) + 1;
            async move {
                if n > 1 {
                    debug!("navigation retry {}/{} for {url}", n, self.nav_attempts);
                }
                tab.navigate_to(url)?;
                tab.wait_until_navigated()?;
                Ok::<(), anyhow::Error>(())
            }
        })
        .await
        .map_err(|e| ScrapeError::Navigation(e.to_string()))
    }
}

#[async_trait]
impl FetchStrategy for BrowserFetcher {
    async fn fetch(&self, url: &str) -> ScrapeResult {
        let started = Instant::now();
        debug!("browser scraping: {url}");

        match self.try_fetch(url, started).await {
            Ok(result) => result,
            Err(e) => {
                info!(
                    "browser scraping failed for {url} ({}ms): {e}",
                    started.elapsed().as_millis()
                );
                ScrapeResult::failed(
                    url,
                    "Tarayıcı Hatası",
                    &self.currency,
                    FetchMethod::Browser,
                    e.to_string(),
                    Some(started.elapsed().as_millis() as u64),
                )
            }
        }
    }
}
