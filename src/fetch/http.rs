//! The fast path: one plain request with a browser-identity header profile.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION};
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info};
use url::Url;

use crate::config::AppConfig;
use crate::document::StaticDocument;
use crate::error::{Result, ScrapeError};
use crate::extract::{check_stock, classify_not_found, extract_candidates, page_title};
use crate::fetch::FetchStrategy;
use crate::models::{FetchMethod, ScrapeResult};
use crate::profiles::profile_for;
use crate::rank::select_price;

pub struct HttpFetcher {
    client: reqwest::Client,
    wall_clock: Duration,
    currency: String,
}

impl HttpFetcher {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        if let Ok(lang) = HeaderValue::from_str(&config.http.accept_language) {
            headers.insert(ACCEPT_LANGUAGE, lang);
        }
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));

        let client = reqwest::Client::builder()
            .user_agent(config.http.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.http.request_timeout_secs))
            .redirect(Policy::limited(config.http.max_redirects))
            .build()?;

        Ok(Self {
            client,
            wall_clock: Duration::from_secs(config.http.wall_clock_timeout_secs),
            currency: config.currency.clone(),
        })
    }

    async fn try_fetch(&self, url: &str, started: Instant) -> Result<ScrapeResult> {
        let deadline = started + self.wall_clock;
        let remaining =
            |now: Instant| deadline.saturating_duration_since(now).max(Duration::from_millis(1));

        // The transport timeout should fire first; the outer race guards the
        // cases where it does not.
        let response = timeout(remaining(Instant::now()), self.client.get(url).send())
            .await
            .map_err(|_| ScrapeError::Timeout("HTTP request"))??;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("{url}: 404 at transport level");
            return Ok(ScrapeResult::not_found(
                url,
                &self.currency,
                FetchMethod::Http,
                started.elapsed().as_millis() as u64,
            ));
        }
        if !status.is_success() {
            return Err(ScrapeError::Status(status.as_u16()));
        }

        let body = timeout(remaining(Instant::now()), response.text())
            .await
            .map_err(|_| ScrapeError::Timeout("HTTP body read"))??;

        let host = Url::parse(url)?
            .host_str()
            .unwrap_or_default()
            .to_string();
        let profile = profile_for(&host);

        // Parsing and extraction are synchronous; no awaits past this point.
        let doc = StaticDocument::parse(&body);
        if classify_not_found(&doc) {
            debug!("{url}: page content marks product missing");
            return Ok(ScrapeResult::not_found(
                url,
                &self.currency,
                FetchMethod::Http,
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
            FetchMethod::Http,
            started.elapsed().as_millis() as u64,
        ))
    }
}

#[async_trait]
impl FetchStrategy for HttpFetcher {
    async fn fetch(&self, url: &str) -> ScrapeResult {
        let started = Instant::now();
        debug!("HTTP scraping: {url}");

        match self.try_fetch(url, started).await {
            Ok(result) => result,
            Err(e) => {
                info!(
                    "HTTP scraping failed for {url} ({}ms): {e}",
                    started.elapsed().as_millis()
                );
                ScrapeResult::failed(
                    url,
                    "HTTP Hatası",
                    &self.currency,
                    FetchMethod::Http,
                    e.to_string(),
                    Some(started.elapsed().as_millis() as u64),
                )
            }
        }
    }
}
