//! RFC 2822 message construction for the mail capability.
//!
//! Output is a pure function of the input: headers are emitted in a fixed
//! order with fixed separators, so identical parts give byte-identical
//! encodings.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde_json::Value;

const CRLF: &str = "\r\n";

/// Structured parts of an outgoing message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageParts {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub html: bool,
    /// Message-ID being answered; also written as `References`.
    pub in_reply_to: Option<String>,
}

/// Header values must stay on one line.
fn header_value(value: &str) -> String {
    value
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// RFC 2047 encoded-word for non-ASCII header text.
fn encode_header_text(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(value.as_bytes()))
    }
}

fn address_list(addresses: &[String]) -> String {
    addresses
        .iter()
        .map(|a| header_value(a))
        .collect::<Vec<_>>()
        .join(", ")
}

impl MessageParts {
    /// Render the message as RFC 2822 text with CRLF line endings.
    pub fn render(&self) -> String {
        let mut headers: Vec<String> = Vec::new();

        if !self.to.is_empty() {
            headers.push(format!("To: {}", address_list(&self.to)));
        }
        if !self.cc.is_empty() {
            headers.push(format!("Cc: {}", address_list(&self.cc)));
        }
        if !self.bcc.is_empty() {
            headers.push(format!("Bcc: {}", address_list(&self.bcc)));
        }
        if let Some(subject) = &self.subject {
            headers.push(format!(
                "Subject: {}",
                encode_header_text(&header_value(subject))
            ));
        }
        if let Some(reply_to) = self.in_reply_to.as_deref().map(header_value) {
            if !reply_to.is_empty() {
                headers.push(format!("In-Reply-To: {reply_to}"));
                headers.push(format!("References: {reply_to}"));
            }
        }
        headers.push("MIME-Version: 1.0".to_string());
        let content_type = if self.html { "text/html" } else { "text/plain" };
        headers.push(format!("Content-Type: {content_type}; charset=\"UTF-8\""));
        headers.push("Content-Transfer-Encoding: 8bit".to_string());

        let body = self.body.as_deref().unwrap_or_default();
        format!("{}{CRLF}{CRLF}{body}", headers.join(CRLF))
    }

    /// base64url (unpadded) encoding of [`render`](Self::render).
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.render().as_bytes())
    }

    /// Recovers the parts of a stored message from its `full` format
    /// payload (`headers`, `body.data`, nested `parts`). Header values are
    /// kept as stored, so encoded words survive a re-render unchanged.
    pub fn from_payload(payload: &Value) -> Self {
        let header = |name: &str| {
            payload
                .get("headers")
                .and_then(Value::as_array)
                .and_then(|headers| {
                    headers.iter().find(|h| {
                        h.get("name")
                            .and_then(Value::as_str)
                            .is_some_and(|n| n.eq_ignore_ascii_case(name))
                    })
                })
                .and_then(|h| h.get("value"))
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let addresses = |name: &str| {
            header(name)
                .map(|value| {
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|a| !a.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default()
        };

        let text = text_part(payload);
        Self {
            to: addresses("To"),
            cc: addresses("Cc"),
            bcc: addresses("Bcc"),
            subject: header("Subject"),
            body: text.as_ref().map(|(body, _)| body.clone()),
            html: text.is_some_and(|(_, html)| html),
            in_reply_to: header("In-Reply-To"),
        }
    }
}

/// First decodable text body, preferring `text/plain`; the flag is set for
/// `text/html`.
fn text_part(part: &Value) -> Option<(String, bool)> {
    let mime = part.get("mimeType").and_then(Value::as_str).unwrap_or("text/plain");
    if let Some(children) = part.get("parts").and_then(Value::as_array) {
        return children
            .iter()
            .filter_map(text_part)
            .min_by_key(|(_, html)| *html);
    }
    if !mime.starts_with("text/") {
        return None;
    }
    let data = part.get("body")?.get("data")?.as_str()?;
    let bytes = URL_SAFE_NO_PAD.decode(data.trim_end_matches('=')).ok()?;
    Some((
        String::from_utf8_lossy(&bytes).into_owned(),
        mime.eq_ignore_ascii_case("text/html"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple() -> MessageParts {
        MessageParts {
            to: vec!["a@x.com".to_string()],
            subject: Some("S".to_string()),
            body: Some("B".to_string()),
            ..MessageParts::default()
        }
    }

    #[test]
    fn test_render_fixed_header_order() {
        let parts = MessageParts {
            to: vec!["a@x.com".to_string(), "b@x.com".to_string()],
            cc: vec!["c@x.com".to_string()],
            in_reply_to: Some("<abc@mail>".to_string()),
            ..simple()
        };
        assert_eq!(
            parts.render(),
            "To: a@x.com, b@x.com\r\n\
             Cc: c@x.com\r\n\
             Subject: S\r\n\
             In-Reply-To: <abc@mail>\r\n\
             References: <abc@mail>\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: text/plain; charset=\"UTF-8\"\r\n\
             Content-Transfer-Encoding: 8bit\r\n\
             \r\n\
             B"
        );
    }

    #[test]
    fn test_encode_is_deterministic() {
        assert_eq!(simple().encode(), simple().encode());
        let decoded = URL_SAFE_NO_PAD.decode(simple().encode()).unwrap();
        assert!(String::from_utf8(decoded).unwrap().starts_with("To: a@x.com\r\n"));
    }

    #[test]
    fn test_non_ascii_subject_is_encoded_word() {
        let parts = MessageParts {
            subject: Some("Grüße".to_string()),
            ..simple()
        };
        let rendered = parts.render();
        let expected = format!("Subject: =?UTF-8?B?{}?=", STANDARD.encode("Grüße"));
        assert!(rendered.contains(&expected));
    }

    #[test]
    fn test_header_injection_is_flattened() {
        let parts = MessageParts {
            subject: Some("Hi\r\nBcc: evil@x.com".to_string()),
            ..simple()
        };
        let rendered = parts.render();
        assert!(rendered.contains("Subject: Hi  Bcc: evil@x.com\r\n"));
        assert!(!rendered.contains("\r\nBcc:"));
    }

    #[test]
    fn test_from_payload_reads_headers_and_plain_part() {
        let payload = serde_json::json!({
            "mimeType": "multipart/alternative",
            "headers": [
                { "name": "To", "value": "a@x.com, b@x.com" },
                { "name": "subject", "value": "Plan" },
                { "name": "In-Reply-To", "value": "<abc@mail>" }
            ],
            "parts": [
                { "mimeType": "text/html", "body": { "data": URL_SAFE_NO_PAD.encode("<p>Hi</p>") } },
                { "mimeType": "text/plain", "body": { "data": "SGk=" } }
            ]
        });

        let parts = MessageParts::from_payload(&payload);
        assert_eq!(parts.to, vec!["a@x.com", "b@x.com"]);
        assert_eq!(parts.subject.as_deref(), Some("Plan"));
        assert_eq!(parts.in_reply_to.as_deref(), Some("<abc@mail>"));
        assert_eq!(parts.body.as_deref(), Some("Hi"));
        assert!(!parts.html);
        assert!(parts.cc.is_empty());
    }

    #[test]
    fn test_html_content_type() {
        let parts = MessageParts {
            html: true,
            ..simple()
        };
        assert!(parts
            .render()
            .contains("Content-Type: text/html; charset=\"UTF-8\""));
    }
}
