// ── Runtime connection configuration ──
//
// These types describe *how* to reach a PAN-OS device. They carry
// credential data and connection tuning, but never touch disk.
// The CLI constructs a `ConnectionConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

pub const DEFAULT_USERNAME: &str = "admin";

/// How to authenticate with the device.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// A pre-generated XML API key.
    ApiKey(SecretString),
    /// Username and password, exchanged for a key at connect time.
    Credentials {
        username: String,
        password: SecretString,
    },
}

impl AuthCredentials {
    /// Pick the auth method from loosely-specified parts.
    ///
    /// Exactly one of `password` and `api_key` must be present.
    pub fn from_parts(
        username: Option<String>,
        password: Option<SecretString>,
        api_key: Option<SecretString>,
    ) -> Result<Self, CoreError> {
        match (password, api_key) {
            (Some(_), Some(_)) => Err(CoreError::Config {
                message: "password and API key are mutually exclusive".into(),
            }),
            (None, Some(key)) => Ok(Self::ApiKey(key)),
            (Some(password), None) => Ok(Self::Credentials {
                username: username.unwrap_or_else(|| DEFAULT_USERNAME.into()),
                password,
            }),
            (None, None) => Err(CoreError::Config {
                message: "one of password or API key is required".into(),
            }),
        }
    }
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. Management interfaces ship with self-signed certs.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for connecting to a single firewall or Panorama.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Hostname, IP address or full `https://` URL of the management interface.
    pub host: String,
    pub port: Option<u16>,
    pub auth: AuthCredentials,
    pub tls: TlsVerification,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// Delay between `show jobs` polls while a commit runs.
    pub job_poll_interval: Duration,
    /// Upper bound on waiting for a commit job; `None` waits indefinitely.
    pub job_timeout: Option<Duration>,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>, auth: AuthCredentials) -> Self {
        Self {
            host: host.into(),
            port: None,
            auth,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            job_poll_interval: Duration::from_secs(2),
            job_timeout: None,
        }
    }

    /// The management interface URL, `https://host[:port]`.
    pub fn base_url(&self) -> Result<Url, CoreError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(CoreError::Config {
                message: "no host specified".into(),
            });
        }

        let raw = if host.starts_with("https://") || host.starts_with("http://") {
            host.to_owned()
        } else if host.contains(':') && !host.starts_with('[') {
            format!("https://[{host}]")
        } else {
            format!("https://{host}")
        };

        let mut url = Url::parse(&raw).map_err(|e| CoreError::Config {
            message: format!("invalid host '{host}': {e}"),
        })?;
        if let Some(port) = self.port {
            url.set_port(Some(port)).map_err(|()| CoreError::Config {
                message: format!("cannot set port on '{host}'"),
            })?;
        }
        Ok(url)
    }
}
