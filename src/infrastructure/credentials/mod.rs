//! Credentials infrastructure
//!
//! Tokens are read from configuration once at startup. OAuth acquisition and
//! refresh happen outside this process; a refreshed token takes effect on
//! restart.

use async_trait::async_trait;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::CredentialProvider;

/// A fixed bearer token for one service.
#[derive(Clone)]
pub struct StaticCredential {
    service: &'static str,
    token: Option<String>,
}

impl StaticCredential {
    /// Blank tokens count as absent.
    pub fn new(service: &'static str, token: Option<String>) -> Self {
        Self {
            service,
            token: token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
        }
    }
}

impl std::fmt::Debug for StaticCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredential")
            .field("service", &self.service)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[async_trait]
impl CredentialProvider for StaticCredential {
    async fn bearer_token(&self) -> DomainResult<String> {
        self.token
            .clone()
            .ok_or_else(|| DomainError::NotAuthenticated(self.service.to_string()))
    }
}
