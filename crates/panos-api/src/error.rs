use thiserror::Error;

/// Top-level error type for the `panos-api` crate.
///
/// Covers every failure mode of the XML API surface: authentication,
/// transport, the `<response status="error">` envelope, job polling and
/// malformed payloads. `panos-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Key generation or request authentication was rejected.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// A request needing an API key was made before one was configured.
    #[error("No API key configured -- call keygen() or set_api_key() first")]
    MissingApiKey,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Non-success HTTP status without a parseable XML envelope.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── XML API ─────────────────────────────────────────────────────
    /// `<response status="error">` returned by the device.
    #[error("PAN-OS API error{}: {message}", code_suffix(.code))]
    Api { message: String, code: Option<u16> },

    // ── Jobs ────────────────────────────────────────────────────────
    /// A job did not reach `FIN` within the allowed wait.
    #[error("Job {job_id} did not finish within {waited_secs}s")]
    JobTimeout { job_id: u64, waited_secs: u64 },

    // ── Data ────────────────────────────────────────────────────────
    /// The response body could not be interpreted, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

fn code_suffix(code: &Option<u16>) -> String {
    code.map(|c| format!(" (code {c})")).unwrap_or_default()
}

impl Error {
    /// Returns `true` if re-authenticating might resolve this error.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::MissingApiKey)
    }

    /// The PAN-OS response code, if the device returned one.
    pub fn api_code(&self) -> Option<u16> {
        match self {
            Self::Api { code, .. } => *code,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_code() {
        let err = Error::Api {
            message: "Object doesn't exist".into(),
            code: Some(7),
        };
        assert_eq!(
            err.to_string(),
            "PAN-OS API error (code 7): Object doesn't exist"
        );

        let err = Error::Api {
            message: "bad xpath".into(),
            code: None,
        };
        assert_eq!(err.to_string(), "PAN-OS API error: bad xpath");
    }

    #[test]
    fn auth_classification() {
        assert!(Error::MissingApiKey.is_auth());
        assert!(
            Error::Authentication {
                message: "Invalid Credential".into()
            }
            .is_auth()
        );
        assert!(!Error::Tls("x".into()).is_auth());
        assert_eq!(Error::Tls("x".into()).api_code(), None);
    }
}
