//! Domain layer for the action bridge
//!
//! Action contracts, typed requests, configuration model, error taxonomy and
//! the port traits that external service clients implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult, ErrorKind, RemoteError, ValidationError};
