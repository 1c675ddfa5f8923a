//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use panos_config::ConfigError;
use panos_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const UNSUPPORTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(panosctl::connection_failed),
        help(
            "Check that the management interface is reachable.\n\
             Reason: {reason}\n\
             Self-signed certificate? Try --insecure (-k) or --ca-cert."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(panosctl::auth_failed),
        help(
            "Verify the username/password or API key.\n\
             Store a secret with: panosctl config set-secret"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for {origin}")]
    #[diagnostic(
        code(panosctl::no_credentials),
        help("Pass --password or --api-key, or set PANOS_PASSWORD / PANOS_API_KEY.")
    )]
    NoCredentials { origin: String },

    // ── Lookup ───────────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    #[diagnostic(code(panosctl::not_found))]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("This operation is only supported on Panorama")]
    #[diagnostic(
        code(panosctl::unsupported_target),
        help("`{operation}` manages firewalls through Panorama. Point --host at Panorama.")
    )]
    UnsupportedTarget { operation: String },

    // ── Commit ───────────────────────────────────────────────────────
    #[error("Commit failed (job {job_id})")]
    #[diagnostic(
        code(panosctl::commit_failed),
        help("{details}")
    )]
    CommitFailed { job_id: u64, details: String },

    #[error("Timed out after {seconds}s")]
    #[diagnostic(
        code(panosctl::timeout),
        help("Increase --timeout or --job-timeout, or check device load.")
    )]
    Timeout { seconds: u64 },

    #[error("Request to {url} timed out")]
    #[diagnostic(
        code(panosctl::request_timeout),
        help("Increase --timeout, or check device load.")
    )]
    RequestTimedOut { url: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error{}: {message}", code.map(|c| format!(" (code {c})")).unwrap_or_default())]
    #[diagnostic(code(panosctl::api_error))]
    Api { message: String, code: Option<u16> },

    // ── Input ────────────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(panosctl::validation))]
    Validation { field: String, reason: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(panosctl::profile_not_found),
        help("List profiles with: panosctl config profiles")
    )]
    ProfileNotFound { name: String },

    #[error(transparent)]
    #[diagnostic(code(panosctl::config))]
    Config(Box<figment::Error>),

    #[error("{0}")]
    #[diagnostic(code(panosctl::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(panosctl::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(panosctl::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::UnsupportedTarget { .. } => exit_code::UNSUPPORTED,
            Self::Timeout { .. } | Self::RequestTimedOut { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            CoreError::RequestTimedOut { url } => Self::RequestTimedOut { url },
            CoreError::NotFound {
                entity_type,
                identifier,
            } => Self::NotFound {
                entity_type,
                identifier,
            },
            CoreError::UnsupportedTarget { operation } => Self::UnsupportedTarget { operation },
            CoreError::CommitFailed { summary, .. } => {
                let mut details = summary.messages.clone();
                details.extend(summary.devices.iter().flat_map(|d| {
                    d.messages
                        .iter()
                        .map(move |m| format!("{}: {m}", d.name.as_deref().unwrap_or(&d.serial)))
                }));
                Self::CommitFailed {
                    job_id: summary.job_id,
                    details: if details.is_empty() {
                        "The device returned no details.".into()
                    } else {
                        details.join("\n")
                    },
                }
            }
            CoreError::Api { message, code } => Self::Api { message, code },
            CoreError::Config { message } | CoreError::Validation { message } => {
                Self::Validation {
                    field: "input".into(),
                    reason: message,
                }
            }
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { origin } => Self::NoCredentials { origin },
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound { name },
            ConfigError::Figment(err) => Self::Config(err),
            ConfigError::Io(err) => Self::Io(err),
            ConfigError::Serialization(err) => Self::Internal(err.to_string()),
        }
    }
}
