pub mod candidate;
pub mod result;

pub use candidate::{PriceCandidate, Priority};
pub use result::{FetchMethod, ScrapeResult};
