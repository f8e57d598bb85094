//! Upstream error bodies.
//!
//! The workspace service answers failures with
//! `{"object":"error","status":404,"code":"object_not_found","message":..}`;
//! Google APIs use `{"error":{"code":404,"message":..,"status":"NOT_FOUND",
//! "errors":[{"reason":"notFound"}]}}`. Both become a [`RemoteError`]
//! carrying the HTTP status and the most specific code available.

use serde::Deserialize;

use crate::domain::errors::RemoteError;
use crate::infrastructure::logging::SecretScrubber;

/// Longest body excerpt used as a message when the body is not structured.
const MAX_EXCERPT: usize = 200;

#[derive(Debug, Deserialize)]
struct WorkspaceErrorBody {
    object: String,
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    message: Option<String>,
    status: Option<String>,
    #[serde(default)]
    errors: Vec<GoogleErrorItem>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorItem {
    reason: Option<String>,
}

/// Build a [`RemoteError`] from a non-success response.
pub fn parse_error_body(service: &str, status: u16, body: &str) -> RemoteError {
    if let Ok(parsed) = serde_json::from_str::<WorkspaceErrorBody>(body) {
        if parsed.object == "error" {
            let mut err = RemoteError::new(service, parsed.message.unwrap_or_default())
                .with_status(status);
            if let Some(code) = parsed.code {
                err = err.with_code(code);
            }
            return err;
        }
    }

    if let Ok(parsed) = serde_json::from_str::<GoogleErrorBody>(body) {
        let code = parsed
            .error
            .errors
            .into_iter()
            .find_map(|item| item.reason)
            .or(parsed.error.status);
        let mut err = RemoteError::new(service, parsed.error.message.unwrap_or_default())
            .with_status(status);
        if let Some(code) = code {
            err = err.with_code(code);
        }
        return err;
    }

    RemoteError::new(service, excerpt(body, status)).with_status(status)
}

fn excerpt(body: &str, status: u16) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("request failed")
            .to_string();
    }
    let scrubbed = SecretScrubber::global().scrub(trimmed);
    match scrubbed.char_indices().nth(MAX_EXCERPT) {
        Some((idx, _)) => format!("{}...", &scrubbed[..idx]),
        None => scrubbed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_error_body() {
        let body = r#"{"object":"error","status":404,"code":"object_not_found","message":"Could not find page with ID: P1."}"#;
        let err = parse_error_body("workspace", 404, body);
        assert_eq!(err.status, Some(404));
        assert_eq!(err.code.as_deref(), Some("object_not_found"));
        assert_eq!(err.message, "Could not find page with ID: P1.");
    }

    #[test]
    fn test_google_error_prefers_reason() {
        let body = r#"{"error":{"code":403,"message":"Rate Limit Exceeded","status":"PERMISSION_DENIED","errors":[{"reason":"rateLimitExceeded","domain":"usageLimits"}]}}"#;
        let err = parse_error_body("calendar", 403, body);
        assert_eq!(err.code.as_deref(), Some("rateLimitExceeded"));
        assert_eq!(err.message, "Rate Limit Exceeded");
    }

    #[test]
    fn test_google_error_falls_back_to_status() {
        let body = r#"{"error":{"code":404,"message":"Requested entity was not found.","status":"NOT_FOUND"}}"#;
        let err = parse_error_body("mail", 404, body);
        assert_eq!(err.code.as_deref(), Some("NOT_FOUND"));
    }

    #[test]
    fn test_unstructured_body() {
        let err = parse_error_body("mail", 502, "<html>Bad Gateway</html>");
        assert_eq!(err.code, None);
        assert_eq!(err.message, "<html>Bad Gateway</html>");

        let err = parse_error_body("mail", 503, "");
        assert_eq!(err.message, "Service Unavailable");
    }
}
