use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static SCRUBBER: LazyLock<SecretScrubber> = LazyLock::new(SecretScrubber::new);

/// Redacts credentials from text before it reaches the logs.
///
/// Upstream error bodies and request failures are passed through this before
/// being logged; workspace integration tokens (`secret_...`, `ntn_...`) and
/// Google access tokens (`ya29....`) are recognised in addition to generic
/// bearer headers and token fields.
#[derive(Clone)]
pub struct SecretScrubber {
    integration_token_pattern: Regex,
    access_token_pattern: Regex,
    token_field_pattern: Regex,
    bearer_pattern: Regex,
}

impl SecretScrubber {
    pub fn new() -> Self {
        Self {
            integration_token_pattern: Regex::new(r"\b(?:secret|ntn)_[A-Za-z0-9]{16,}")
                .expect("valid integration token pattern"),
            access_token_pattern: Regex::new(r"\bya29\.[A-Za-z0-9\-_\.]+")
                .expect("valid access token pattern"),
            token_field_pattern: Regex::new(
                r#"["']?(?:access_token|refresh_token|api_key|token|client_secret)["']?\s*[:=]\s*["']?[A-Za-z0-9\-_\.]{8,}["']?"#,
            )
            .expect("valid token field pattern"),
            bearer_pattern: Regex::new(r"Bearer\s+[A-Za-z0-9\-_\.]+")
                .expect("valid bearer pattern"),
        }
    }

    /// Shared instance.
    pub fn global() -> &'static Self {
        &SCRUBBER
    }

    /// Scrub a message of sensitive data
    pub fn scrub(&self, message: &str) -> String {
        let scrubbed = self
            .bearer_pattern
            .replace_all(message, "Bearer [TOKEN_REDACTED]");
        let scrubbed = self
            .integration_token_pattern
            .replace_all(&scrubbed, "[TOKEN_REDACTED]");
        let scrubbed = self
            .access_token_pattern
            .replace_all(&scrubbed, "[TOKEN_REDACTED]");
        self.token_field_pattern
            .replace_all(&scrubbed, |caps: &regex::Captures| {
                let full_match = &caps[0];
                match full_match.find([':', '=']) {
                    Some(pos) => format!("{}[REDACTED]", &full_match[..=pos]),
                    None => "[REDACTED]".to_string(),
                }
            })
            .into_owned()
    }
}

impl Default for SecretScrubber {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber").finish()
    }
}
