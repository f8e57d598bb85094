//! Maps domain failures onto error envelopes.

use serde_json::{Map, Value};

use crate::domain::errors::{DomainError, ErrorKind};
use crate::domain::models::envelope::codes;
use crate::domain::models::ErrorObject;

/// JSON-RPC code for a domain error.
pub const fn error_code(err: &DomainError) -> i32 {
    match err {
        DomainError::Validation(_) => codes::INVALID_PARAMS,
        DomainError::Remote(_) => codes::REMOTE_SERVICE_ERROR,
        DomainError::NotAuthenticated(_) => codes::NOT_AUTHENTICATED,
        DomainError::Transport(_) => codes::INVALID_REQUEST,
        DomainError::Internal(_) => codes::INTERNAL_ERROR,
    }
}

/// Error object with `data: {kind, reason?, upstreamStatus?, upstreamCode?, service?}`.
pub fn to_error_object(err: &DomainError) -> ErrorObject {
    let mut data = Map::new();
    data.insert("kind".to_string(), Value::from(err.kind().as_str()));
    if let Some(reason) = err.reason() {
        data.insert("reason".to_string(), Value::from(reason));
    }
    match err {
        DomainError::Remote(remote) => {
            if let Some(status) = remote.status {
                data.insert("upstreamStatus".to_string(), Value::from(status));
            }
            if let Some(code) = &remote.code {
                data.insert("upstreamCode".to_string(), Value::from(code.as_str()));
            }
            data.insert("service".to_string(), Value::from(remote.service.as_str()));
        }
        DomainError::NotAuthenticated(service) => {
            data.insert("service".to_string(), Value::from(service.as_str()));
        }
        _ => {}
    }
    ErrorObject::new(error_code(err), err.to_string()).with_data(Value::Object(data))
}

/// Envelope-level failure that never reached the dispatcher.
pub fn transport_error(code: i32, message: impl Into<String>) -> ErrorObject {
    ErrorObject::new(code, message).with_data(serde_json::json!({
        "kind": ErrorKind::TransportError.as_str(),
    }))
}
