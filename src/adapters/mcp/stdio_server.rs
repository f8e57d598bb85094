//! Line-delimited JSON-RPC server over stdin/stdout.
//!
//! Protocol: one request envelope per line in, at most one response
//! envelope per line out. Lines are handled strictly in order and every
//! response is flushed before the next line is read, so responses appear
//! in request order. Diagnostics go to stderr through `tracing`; stdout
//! carries nothing but envelopes.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::Instrument;

use crate::domain::errors::{DomainError, ValidationError};
use crate::domain::models::envelope::{codes, InvokeParams, ENVELOPE_VERSION};
use crate::domain::models::{Method, RequestEnvelope, ResponseEnvelope};
use crate::services::ActionDispatcher;

use super::error_translator::{to_error_object, transport_error};

/// MCP protocol revision reported by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Serialization fallback; a `ResponseEnvelope` only holds JSON values.
const SERIALIZATION_FAILURE: &str =
    r#"{"version":"2.0","id":null,"error":{"code":-32603,"message":"Failed to serialize response"}}"#;

/// Transport adapter and envelope router.
pub struct StdioServer {
    dispatcher: Arc<ActionDispatcher>,
}

impl StdioServer {
    /// Server routing `tools/call` to `dispatcher`.
    pub fn new(dispatcher: Arc<ActionDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Serve stdin/stdout until stdin closes.
    pub async fn run(&self) -> anyhow::Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve any line-oriented reader/writer pair until end of input.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!(
            capabilities = ?self
                .dispatcher
                .capabilities()
                .iter()
                .map(|c| c.name())
                .collect::<Vec<_>>(),
            "stdio server started"
        );

        let mut buf = Vec::new();
        let mut line_number: u64 = 0;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            line_number += 1;

            let Ok(line) = std::str::from_utf8(&buf) else {
                tracing::warn!(line_number, "request line is not valid UTF-8, skipping");
                continue;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(line).await {
                writer.write_all(response.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        tracing::info!(lines = line_number, "stdio server stopped");
        Ok(())
    }

    /// Handles one request line. `None` means nothing is written back
    /// (malformed JSON or a notification).
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "malformed request line, skipping");
                return None;
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let request: RequestEnvelope = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(error = %err, "request is not a valid envelope");
                return Some(render(&ResponseEnvelope::failure(
                    id,
                    transport_error(codes::INVALID_REQUEST, format!("Invalid request: {err}")),
                )));
            }
        };

        if let Some(version) = request.version.as_deref() {
            if version != ENVELOPE_VERSION {
                return Some(render(&ResponseEnvelope::failure(
                    id,
                    transport_error(
                        codes::INVALID_REQUEST,
                        format!("Unsupported envelope version: {version}"),
                    ),
                )));
            }
        }

        let Some(method) = Method::parse(&request.method) else {
            tracing::warn!(method = %request.method, "unknown method");
            return Some(render(&ResponseEnvelope::failure(
                id,
                transport_error(
                    codes::METHOD_NOT_FOUND,
                    format!("Method not found: {}", request.method),
                ),
            )));
        };

        let span = tracing::info_span!("request", request_id = %id, method = %request.method);
        let response = match method {
            Method::Notification => {
                tracing::debug!(method = %request.method, "notification received");
                return None;
            }
            Method::Initialize => ResponseEnvelope::success(id, self.initialize()),
            Method::ListCapabilities => ResponseEnvelope::success(
                id,
                json!({ "capabilities": self.dispatcher.descriptors() }),
            ),
            Method::InvokeCapability => self.invoke(id, request.params).instrument(span).await,
        };
        Some(render(&response))
    }

    fn initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    async fn invoke(&self, id: Value, params: Value) -> ResponseEnvelope {
        let params = if params.is_null() { json!({}) } else { params };
        let params: InvokeParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(err) => {
                let err = ValidationError::InvalidArguments {
                    action: "invoke-capability".to_string(),
                    reason: err.to_string(),
                };
                return ResponseEnvelope::failure(id, to_error_object(&DomainError::from(err)));
            }
        };
        let Some(name) = params.name.filter(|n| !n.trim().is_empty()) else {
            let err = ValidationError::missing("name", "invoke-capability");
            return ResponseEnvelope::failure(id, to_error_object(&DomainError::from(err)));
        };

        match self.dispatcher.invoke(name.trim(), params.arguments).await {
            Ok(result) => ResponseEnvelope::success(id, result),
            Err(err) => ResponseEnvelope::failure(id, to_error_object(&err)),
        }
    }
}

fn render(envelope: &ResponseEnvelope) -> String {
    serde_json::to_string(envelope).unwrap_or_else(|err| {
        tracing::error!(error = %err, "failed to serialize response envelope");
        SERIALIZATION_FAILURE.to_string()
    })
}
