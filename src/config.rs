use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub browser: BrowserConfig,
    pub batch: BatchConfig,
    /// Fixed deployment currency attached to every result.
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub request_timeout_secs: u64,
    /// Hard guard raced against the whole request; must exceed the request
    /// timeout so the transport timeout fires first under normal conditions.
    pub wall_clock_timeout_secs: u64,
    pub max_redirects: usize,
    pub user_agent: String,
    pub accept_language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub nav_attempts: usize,
    pub retry_delay_ms: u64,
    pub nav_timeout_secs: u64,
    /// Post-navigation wait for client-side rendering to settle.
    pub settle_ms: u64,
    pub wall_clock_budget_secs: u64,
    pub page_close_timeout_secs: u64,
    pub session_close_timeout_secs: u64,
    /// Keep the session alive between uses; the engine kills idle browsers.
    pub idle_timeout_secs: u64,
    pub window_width: u32,
    pub window_height: u32,
    pub chrome_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    pub window_size: usize,
    pub pause_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig {
                request_timeout_secs: 20,
                wall_clock_timeout_secs: 25,
                max_redirects: 3,
                user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                             AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 \
                             Safari/537.36"
                    .to_string(),
                accept_language: "tr-TR,tr;q=0.9,en;q=0.8".to_string(),
            },
            browser: BrowserConfig {
                nav_attempts: 3,
                retry_delay_ms: 2000,
                nav_timeout_secs: 20,
                settle_ms: 2000,
                wall_clock_budget_secs: 25,
                page_close_timeout_secs: 5,
                session_close_timeout_secs: 10,
                idle_timeout_secs: 600,
                window_width: 1920,
                window_height: 1080,
                chrome_path: None,
            },
            batch: BatchConfig {
                window_size: 2,
                pause_ms: 1000,
            },
            currency: "TL".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::try_from(&AppConfig::default())?;

        let s = Config::builder()
            // Start with built-in defaults
            .add_source(defaults)
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix "FIYAT"
            .add_source(Environment::with_prefix("FIYAT").separator("__"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;

        // Add Chrome path from environment if not set
        if config.browser.chrome_path.is_none() {
            config.browser.chrome_path = env::var("CHROME_PATH").ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "HTTP request timeout must be greater than 0".into(),
            ));
        }

        if self.http.wall_clock_timeout_secs <= self.http.request_timeout_secs {
            return Err(ConfigError::Message(
                "HTTP wall-clock timeout must be strictly greater than the request timeout".into(),
            ));
        }

        if self.http.user_agent.trim().is_empty() {
            return Err(ConfigError::Message("HTTP user agent must not be empty".into()));
        }

        if self.browser.nav_attempts == 0 {
            return Err(ConfigError::Message(
                "Browser navigation attempts must be greater than 0".into(),
            ));
        }

        if self.browser.wall_clock_budget_secs == 0 {
            return Err(ConfigError::Message(
                "Browser wall-clock budget must be greater than 0".into(),
            ));
        }

        if self.batch.window_size == 0 {
            return Err(ConfigError::Message(
                "Batch window size must be greater than 0".into(),
            ));
        }

        if self.currency.trim().is_empty() {
            return Err(ConfigError::Message("Currency must not be empty".into()));
        }

        Ok(())
    }
}
