//! Line-delimited JSON-RPC envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope version carried on every message.
pub const ENVELOPE_VERSION: &str = "2.0";

/// Error codes used in error envelopes.
pub mod codes {
    /// Envelope was valid JSON but not a valid request.
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method is not one the router recognizes.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Caller input violated an action contract.
    pub const INVALID_PARAMS: i32 = -32602;
    /// Unclassified failure.
    pub const INTERNAL_ERROR: i32 = -32603;
    /// The external service rejected or failed the call.
    pub const REMOTE_SERVICE_ERROR: i32 = -32001;
    /// No usable credential for the external service.
    pub const NOT_AUTHENTICATED: i32 = -32002;
}

/// Transport-level methods understood by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Initialize,
    ListCapabilities,
    InvokeCapability,
    /// Client notification; never answered.
    Notification,
}

impl Method {
    /// Maps a wire method name, including MCP-style aliases.
    pub fn parse(method: &str) -> Option<Self> {
        match method {
            "initialize" => Some(Self::Initialize),
            "list-capabilities" | "tools/list" => Some(Self::ListCapabilities),
            "invoke-capability" | "tools/call" => Some(Self::InvokeCapability),
            m if m.starts_with("notifications/") => Some(Self::Notification),
            _ => None,
        }
    }
}

/// An inbound request envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default, alias = "jsonrpc")]
    pub version: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// `params` of an `invoke-capability` request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InvokeParams {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Value,
}

/// Structured failure carried by an error envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorObject {
    /// Error object without `data`.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attaches structured detail such as `kind` and `reason`.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// An outbound response envelope: exactly one of `result` / `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub version: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

impl ResponseEnvelope {
    /// Result envelope for `id`.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            version: ENVELOPE_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Error envelope for `id`; `Null` when the request id was unreadable.
    pub fn failure(id: Value, error: ErrorObject) -> Self {
        Self {
            version: ENVELOPE_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
