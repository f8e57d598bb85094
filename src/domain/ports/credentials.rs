//! Credential port consumed by the HTTP clients.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// Supplies a valid bearer token for a service.
///
/// Implementations return [`DomainError::NotAuthenticated`] when no usable
/// credential exists. Token acquisition and refresh live behind this trait.
///
/// [`DomainError::NotAuthenticated`]: crate::domain::errors::DomainError::NotAuthenticated
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn bearer_token(&self) -> DomainResult<String>;
}
