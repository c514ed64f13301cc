//! Upstream plumbing: HTTP client, envelope handling, cache, throttle.

pub mod cache;
pub mod envelope;
pub mod omi;
pub mod rate_limit;

pub use cache::ResponseCache;
pub use envelope::unwrap_envelope;
pub use omi::{OmiClient, OmiError};
pub use rate_limit::RateLimiter;
