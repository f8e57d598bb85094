//! actionbridge - line-delimited JSON-RPC action bridge
//!
//! One declared capability per external service (workspace, calendar,
//! mail), each multiplexing a closed set of actions selected by an
//! `action` discriminator.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): action tables, envelopes, config and the
//!   service ports
//! - **Service Layer** (`services`): dispatch, identifier resolution,
//!   enrichment and result shaping
//! - **Adapters** (`adapters`): the stdio transport and envelope router
//! - **Infrastructure Layer** (`infrastructure`): HTTP clients, config
//!   loading, logging
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use actionbridge::{ConfigLoader, StdioServer};
//! use actionbridge::infrastructure::setup::build_dispatcher;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load(None)?;
//!     let dispatcher = build_dispatcher(&config)?;
//!     StdioServer::new(Arc::new(dispatcher)).run().await
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::mcp::StdioServer;
pub use domain::errors::{DomainError, DomainResult, RemoteError, ValidationError};
pub use domain::models::{
    Capability, Config, ErrorObject, RequestEnvelope, ResponseEnvelope,
};
pub use domain::ports::{CalendarClient, CredentialProvider, MailClient, WorkspaceClient};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::ActionDispatcher;
