//! Shared reqwest plumbing for the service clients
//!
//! - `ApiTransport`: bearer auth, timeout, URL building, JSON decoding
//! - `RateLimiter`: token bucket per service
//! - upstream error body parsing into `RemoteError`

pub mod rate_limiter;
pub mod transport;
pub mod upstream;

pub use rate_limiter::RateLimiter;
pub use transport::{ApiTransport, Query};
pub use upstream::parse_error_body;
