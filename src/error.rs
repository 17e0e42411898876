use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status: {0}")]
    Status(u16),

    #[error("wall-clock timeout during {0}")]
    Timeout(&'static str),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("browser session unavailable: {0}")]
    SessionUnavailable(String),

    #[error("browser error: {0}")]
    Browser(#[from] anyhow::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("resource close failed: {0}")]
    Close(String),
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ScrapeError>;
