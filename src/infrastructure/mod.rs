//! Infrastructure layer module
//!
//! Implementations of the domain ports and the process plumbing around them:
//! - HTTP clients for the workspace, calendar and mail services
//! - Shared HTTP transport (rate limiting, upstream error mapping)
//! - Credentials
//! - Configuration management
//! - Logging infrastructure
//! - Recording mocks for tests
//! - Startup wiring

pub mod calendar;
pub mod config;
pub mod credentials;
pub mod http;
pub mod logging;
pub mod mail;
pub mod mock;
pub mod setup;
pub mod workspace;
