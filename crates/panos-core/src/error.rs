// ── Core error types ──
//
// User-facing errors from panos-core. Consumers never see raw XML envelopes
// or HTTP failures directly; the `From<panos_api::Error>` impl translates
// transport-layer errors into domain-appropriate variants.

use thiserror::Error;

use crate::model::CommitSummary;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// An HTTP request hit the client timeout after the session was open.
    #[error("Request to {url} timed out")]
    RequestTimedOut { url: String },

    // ── Lookup errors ────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    /// The operation needs a Panorama but the target is a firewall.
    #[error("This operation is only supported on Panorama")]
    UnsupportedTarget { operation: String },

    // ── Commit errors ────────────────────────────────────────────────
    /// A commit job finished with `FAIL`.
    ///
    /// `completed` holds the results that succeeded before the failure.
    #[error("Commit failed")]
    CommitFailed {
        summary: Box<CommitSummary>,
        completed: Vec<CommitSummary>,
    },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api { message: String, code: Option<u16> },

    // ── Input errors ─────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn not_found(entity_type: &str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_owned(),
            identifier: identifier.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<panos_api::Error> for CoreError {
    fn from(err: panos_api::Error) -> Self {
        match err {
            panos_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            panos_api::Error::MissingApiKey => CoreError::AuthenticationFailed {
                message: "No API key available".into(),
            },
            panos_api::Error::Transport(ref e) => {
                let url = e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string);
                if e.is_timeout() {
                    CoreError::RequestTimedOut { url }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url,
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                    }
                }
            }
            panos_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            panos_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            panos_api::Error::Http { status, message } => CoreError::Api {
                message: format!("HTTP {status}: {message}"),
                code: None,
            },
            panos_api::Error::Api { message, code } => CoreError::Api { message, code },
            panos_api::Error::JobTimeout {
                job_id,
                waited_secs,
            } => {
                tracing::warn!(job_id, "gave up waiting for job");
                CoreError::Timeout {
                    timeout_secs: waited_secs,
                }
            }
            panos_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
