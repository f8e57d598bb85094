//! Authorized, rate-limited JSON requests against one service.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Url};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::domain::errors::{DomainError, DomainResult, RemoteError};
use crate::domain::models::HttpConfig;
use crate::domain::ports::CredentialProvider;
use crate::infrastructure::logging::SecretScrubber;

use super::rate_limiter::RateLimiter;
use super::upstream::parse_error_body;

/// Query string pairs; keys may repeat (e.g. `labelIds`).
pub type Query = Vec<(&'static str, String)>;

/// One service's HTTP plumbing: base URL, bearer credentials, timeout and a
/// shared token bucket. Every call performs exactly one request.
#[derive(Clone)]
pub struct ApiTransport {
    service: &'static str,
    http: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl std::fmt::Debug for ApiTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiTransport")
            .field("service", &self.service)
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiTransport {
    /// Build a transport. `headers` are sent with every request.
    pub fn new(
        service: &'static str,
        base_url: &str,
        http_config: &HttpConfig,
        credentials: Arc<dyn CredentialProvider>,
        headers: HeaderMap,
    ) -> DomainResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            DomainError::Internal(format!("Invalid {service} base URL `{base_url}`: {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(DomainError::Internal(format!(
                "Invalid {service} base URL `{base_url}`"
            )));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(http_config.timeout_secs))
            .default_headers(headers)
            .user_agent(concat!("actionbridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            service,
            http,
            base_url,
            credentials,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::per_minute(
                service,
                http_config.requests_per_minute,
            ))),
        })
    }

    /// Service label used in errors and logs.
    pub const fn service(&self) -> &'static str {
        self.service
    }

    /// Base URL with `segments` appended; each segment is percent-encoded.
    pub fn url(&self, segments: &[&str], query: &Query) -> DomainResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| DomainError::Internal(format!("{} base URL has no path", self.service)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// `GET` with query parameters.
    pub async fn get(&self, segments: &[&str], query: Query) -> DomainResult<Value> {
        self.send(Method::GET, segments, query, None).await
    }

    pub async fn post(&self, segments: &[&str], body: Option<&Value>) -> DomainResult<Value> {
        self.send(Method::POST, segments, Vec::new(), body).await
    }

    pub async fn patch(&self, segments: &[&str], body: &Value) -> DomainResult<Value> {
        self.send(Method::PATCH, segments, Vec::new(), Some(body))
            .await
    }

    pub async fn put(&self, segments: &[&str], body: &Value) -> DomainResult<Value> {
        self.send(Method::PUT, segments, Vec::new(), Some(body)).await
    }

    pub async fn delete(&self, segments: &[&str]) -> DomainResult<Value> {
        self.send(Method::DELETE, segments, Vec::new(), None).await
    }

    /// Perform one request and decode the JSON reply.
    ///
    /// Non-success statuses become [`RemoteError`]s; empty bodies decode to
    /// `null`.
    pub async fn send(
        &self,
        method: Method,
        segments: &[&str],
        query: Query,
        body: Option<&Value>,
    ) -> DomainResult<Value> {
        let url = self.url(segments, &query)?;
        let token = self.credentials.bearer_token().await?;

        self.rate_limiter.lock().await.acquire().await;

        tracing::debug!(service = self.service, %method, path = url.path(), "sending request");

        let mut request = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| self.request_failed(&e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.request_failed(&e))?;

        if !status.is_success() {
            let err = parse_error_body(self.service, status.as_u16(), &text);
            tracing::warn!(
                service = self.service,
                status = status.as_u16(),
                code = err.code.as_deref().unwrap_or(""),
                body = %SecretScrubber::global().scrub(&text),
                "upstream request failed"
            );
            return Err(err.into());
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            RemoteError::new(self.service, format!("Invalid JSON in response: {e}"))
                .with_status(status.as_u16())
                .into()
        })
    }

    fn request_failed(&self, err: &reqwest::Error) -> DomainError {
        if err.is_timeout() {
            tracing::warn!(service = self.service, "request timed out");
            return RemoteError::timeout(self.service).into();
        }
        let message = SecretScrubber::global().scrub(&err.to_string());
        tracing::warn!(service = self.service, error = %message, "request failed");
        RemoteError::new(self.service, format!("Request failed: {message}"))
            .with_code("network")
            .into()
    }
}
