pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod profiles;
pub mod rank;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::ScrapeError;
pub use fetch::{BrowserFetcher, BrowserSessionManager, FetchStrategy, HttpFetcher};
pub use models::{FetchMethod, PriceCandidate, Priority, ScrapeResult};
pub use orchestrator::{BatchRunner, FetchOrchestrator};

pub type Result<T> = std::result::Result<T, ScrapeError>;
