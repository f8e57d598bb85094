//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty output on stderr
//! - Rolling log files
//! - Secret scrubbing for upstream bodies

pub mod logger;
pub mod secret_scrubbing;

pub use logger::{parse_log_level, LogFormat, LoggerImpl};
pub use secret_scrubbing::SecretScrubber;
