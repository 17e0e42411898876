//! Lifecycle of the single headless-browser session.
//!
//! The session is the one long-lived shared resource in the pipeline. All
//! state transitions happen inside this manager: callers only ever
//! acquire a page, release it, and eventually shut the manager down.

use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::BrowserConfig;
use crate::error::{Result, ScrapeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Absent,
    Starting,
    Ready,
    Disconnected,
    Closing,
}

struct SessionInner {
    state: SessionState,
    browser: Option<Browser>,
    shutdown_requested: bool,
}

pub struct BrowserSessionManager {
    inner: Mutex<SessionInner>,
    config: BrowserConfig,
}

impl BrowserSessionManager {
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            inner: Mutex::new(SessionInner {
                state: SessionState::Absent,
                browser: None,
                shutdown_requested: false,
            }),
            config,
        }
    }

    /// Hand out an isolated page context, starting or restarting the
    /// session as needed. Fails fast once shutdown has been requested.
    pub async fn acquire_page(&self) -> Result<Arc<Tab>> {
        let mut inner = self.inner.lock().await;

        if inner.shutdown_requested || inner.state == SessionState::Closing {
            return Err(ScrapeError::SessionUnavailable(
                "session manager is closing".to_string(),
            ));
        }

        // Disconnection shows up as a failing health probe; the engine gives
        // no out-of-band callback, so the transition is centralized here.
        if inner.state == SessionState::Ready {
            let healthy = inner
                .browser
                .as_ref()
                .is_some_and(|b| b.get_version().is_ok());
            if !healthy {
                warn!("browser session lost, will recreate");
                inner.state = SessionState::Disconnected;
            }
        }

        if inner.state != SessionState::Ready {
            if let Some(stale) = inner.browser.take() {
                // A broken handle may fail to close; that is tolerated.
                debug!("dropping stale browser handle");
                drop(stale);
            }
            inner.state = SessionState::Starting;
            info!("launching browser session");
            match self.launch() {
                Ok(browser) => {
                    inner.browser = Some(browser);
                    inner.state = SessionState::Ready;
                }
                Err(e) => {
                    inner.state = SessionState::Absent;
                    return Err(ScrapeError::SessionUnavailable(format!(
                        "failed to launch browser: {e}"
                    )));
                }
            }
        }

        let browser = inner.browser.as_ref().ok_or_else(|| {
            ScrapeError::SessionUnavailable("no browser session".to_string())
        })?;
        let tab = browser.new_tab()?;
        Ok(tab)
    }

    /// Close a page context within a bounded timeout, forcing the close if
    /// the graceful attempt hangs or fails. Best-effort on every path.
    pub async fn release_page(&self, tab: Arc<Tab>) {
        let close_timeout = Duration::from_secs(self.config.page_close_timeout_secs);
        let graceful = {
            let tab = tab.clone();
            tokio::time::timeout(
                close_timeout,
                tokio::task::spawn_blocking(move || tab.close(true)),
            )
            .await
        };

        let failed = match graceful {
            Ok(Ok(Ok(_))) => None,
            Ok(Ok(Err(e))) => Some(ScrapeError::Close(e.to_string())),
            Ok(Err(join)) => Some(ScrapeError::Close(join.to_string())),
            Err(_) => Some(ScrapeError::Close("page close timed out".to_string())),
        };

        if let Some(e) = failed {
            warn!("graceful page close failed: {e}");
            if let Err(e) = tab.close(false) {
                warn!("forced page close failed: {e:#}");
            }
        }
    }

    /// Idempotent shutdown: close open pages, then the session itself under
    /// a bounded timeout, and clear state unconditionally.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;

        if inner.shutdown_requested && inner.browser.is_none() {
            return;
        }
        inner.shutdown_requested = true;
        inner.state = SessionState::Closing;

        if let Some(browser) = inner.browser.take() {
            // Snapshot the tab list; the engine's event thread takes the same
            // lock when a target goes away.
            let tabs: Vec<Arc<Tab>> = browser
                .get_tabs()
                .lock()
                .map(|tabs| tabs.clone())
                .unwrap_or_default();
            for tab in tabs {
                if let Err(e) = tab.close(true) {
                    warn!("page close during shutdown failed: {e:#}");
                }
            }

            let close_timeout = Duration::from_secs(self.config.session_close_timeout_secs);
            let closed = tokio::time::timeout(
                close_timeout,
                tokio::task::spawn_blocking(move || drop(browser)),
            )
            .await;
            if closed.is_err() {
                warn!("browser session close timed out");
            }
        }

        inner.state = SessionState::Absent;
        info!("browser session manager shut down");
    }

    fn launch(&self) -> anyhow::Result<Browser> {
        let mut launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false) // Often needed in containerized environments
            .window_size(Some((self.config.window_width, self.config.window_height)))
            .idle_browser_timeout(Duration::from_secs(self.config.idle_timeout_secs))
            .args(vec![
                OsStr::new("--no-sandbox"),
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-extensions"),
                OsStr::new("--disable-background-timer-throttling"),
                OsStr::new("--disable-backgrounding-occluded-windows"),
                OsStr::new("--disable-renderer-backgrounding"),
            ])
            .build()
            .map_err(|e| anyhow::anyhow!("failed to create launch options: {e}"))?;

        if let Some(chrome_path) = &self.config.chrome_path {
            launch_options.path = Some(PathBuf::from(chrome_path));
        }

        Browser::new(launch_options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn manager() -> BrowserSessionManager {
        BrowserSessionManager::new(AppConfig::default().browser)
    }

    #[tokio::test]
    async fn test_acquire_after_shutdown_is_rejected() {
        let manager = manager();
        manager.shutdown().await;

        let result = manager.acquire_page().await;
        assert!(matches!(result, Err(ScrapeError::SessionUnavailable(_))));
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let manager = manager();
        manager.shutdown().await;
        manager.shutdown().await; // must be a no-op, not an error

        let result = manager.acquire_page().await;
        assert!(matches!(result, Err(ScrapeError::SessionUnavailable(_))));
    }

    #[tokio::test]
    async fn test_concurrent_acquires_after_shutdown_all_fail() {
        let manager = Arc::new(manager());
        manager.shutdown().await;

        let mut handles = Vec::new();
        for _ in 0..4 {
            let m = manager.clone();
            handles.push(tokio::spawn(async move { m.acquire_page().await.is_err() }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }
    }
}
