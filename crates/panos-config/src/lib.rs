//! Shared configuration for panosctl.
//!
//! TOML profiles, credential resolution (flags, env, keyring, plaintext),
//! and translation to `panos_core::ConnectionConfig`. Flat connection flags
//! and named profiles resolve through the same `ConnectionSource`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use panos_core::{AuthCredentials, ConnectionConfig, CoreError, TlsVerification};

const KEYRING_SERVICE: &str = "panosctl";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for {origin}")]
    NoCredentials { origin: String },

    #[error("unknown profile '{name}'")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when neither `--profile` nor `--host` is given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds between commit job polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    /// Give up on a commit job after this many seconds.
    pub job_timeout: Option<u64>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
            job_timeout: None,
        }
    }
}

fn default_output() -> String {
    "json".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_poll_interval() -> u64 {
    2
}

/// A named firewall or Panorama profile.
#[derive(Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Management hostname, IP address or `https://` URL.
    pub host: Option<String>,

    pub port: Option<u16>,

    pub username: Option<String>,

    /// Password (plaintext, prefer keyring).
    pub password: Option<String>,

    /// API key (plaintext, prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    pub insecure: Option<bool>,

    pub timeout: Option<u64>,
}

/// Plaintext secrets print as a marker.
impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let secret = |set: bool| set.then_some("<redacted>");
        f.debug_struct("Profile")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &secret(self.password.is_some()))
            .field("api_key", &secret(self.api_key.is_some()))
            .field("api_key_env", &self.api_key_env)
            .field("ca_cert", &self.ca_cert)
            .field("insecure", &self.insecure)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "panosctl", "panosctl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("panosctl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from `path` + environment (`PANOS_DEFAULTS__TIMEOUT=60`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PANOS_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

// ── Connection resolution ───────────────────────────────────────────

/// Connection settings given directly on the command line (or via `PANOS_*`).
///
/// Every field takes priority over the profile it is combined with.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub api_key: Option<SecretString>,
    pub ca_cert: Option<PathBuf>,
    pub insecure: bool,
    pub timeout: Option<u64>,
    pub poll_interval: Option<u64>,
    pub job_timeout: Option<u64>,
}

/// Where connection parameters come from.
#[derive(Debug, Clone, Copy)]
pub enum ConnectionSource<'a> {
    /// Flat flags only.
    Direct,
    /// A named profile, with flags layered on top.
    Profile { name: &'a str, profile: &'a Profile },
}

impl<'a> ConnectionSource<'a> {
    /// Pick the source for an invocation.
    ///
    /// An explicit profile must exist. Without one, a `--host` flag means
    /// direct mode; otherwise the default profile is used when configured.
    pub fn select(
        config: &'a Config,
        requested: Option<&'a str>,
        overrides: &ConnectionOverrides,
    ) -> Result<Self, ConfigError> {
        if let Some(name) = requested {
            return config
                .profiles
                .get(name)
                .map(|profile| Self::Profile { name, profile })
                .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() });
        }
        if overrides.host.is_some() {
            return Ok(Self::Direct);
        }
        Ok(config
            .default_profile
            .as_deref()
            .and_then(|name| {
                config
                    .profiles
                    .get_key_value(name)
                    .map(|(name, profile)| Self::Profile {
                        name: name.as_str(),
                        profile,
                    })
            })
            .unwrap_or(Self::Direct))
    }

    /// Human-readable origin, safe to log.
    pub fn describe(&self) -> String {
        match self {
            Self::Direct => "command-line connection".into(),
            Self::Profile { name, .. } => format!("profile '{name}'"),
        }
    }

    fn profile(&self) -> Option<&'a Profile> {
        match self {
            Self::Direct => None,
            Self::Profile { profile, .. } => Some(profile),
        }
    }

    /// Build a `ConnectionConfig`.
    ///
    /// `prompt` is asked for a password when username auth is implied but
    /// no secret was found; return `None` to decline.
    pub fn resolve<F>(
        &self,
        overrides: &ConnectionOverrides,
        defaults: &Defaults,
        prompt: F,
    ) -> Result<ConnectionConfig, ConfigError>
    where
        F: FnOnce(&str) -> Option<SecretString>,
    {
        let profile = self.profile();

        // 1. Host (flag > profile)
        let host = overrides
            .host
            .clone()
            .or_else(|| profile.and_then(|p| p.host.clone()))
            .ok_or_else(|| ConfigError::Validation {
                field: "host".into(),
                reason: format!("no host given for {}", self.describe()),
            })?;

        // 2. Credentials
        let username = overrides
            .username
            .clone()
            .or_else(|| profile.and_then(|p| p.username.clone()));
        let (mut password, api_key) = self.secrets(overrides);
        if password.is_none() && api_key.is_none() {
            let user = username.as_deref().unwrap_or(panos_core::config::DEFAULT_USERNAME);
            password = prompt(user);
        }
        if password.is_none() && api_key.is_none() {
            return Err(ConfigError::NoCredentials {
                origin: self.describe(),
            });
        }
        let auth = AuthCredentials::from_parts(username, password, api_key)
            .map_err(|e| auth_error(&e))?;

        // 3. TLS verification
        let insecure = overrides.insecure
            || profile.and_then(|p| p.insecure).unwrap_or(defaults.insecure);
        let ca_cert = overrides
            .ca_cert
            .clone()
            .or_else(|| profile.and_then(|p| p.ca_cert.clone()));
        let tls = if insecure {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(path) = ca_cert {
            TlsVerification::CustomCa(path)
        } else {
            TlsVerification::SystemDefaults
        };

        // 4. Timeouts
        let timeout = overrides
            .timeout
            .or_else(|| profile.and_then(|p| p.timeout))
            .unwrap_or(defaults.timeout);
        let poll_interval = overrides.poll_interval.unwrap_or(defaults.poll_interval);
        let job_timeout = overrides
            .job_timeout
            .or(defaults.job_timeout)
            .filter(|secs| *secs > 0);

        let mut config = ConnectionConfig::new(host, auth);
        config.port = overrides.port.or_else(|| profile.and_then(|p| p.port));
        config.tls = tls;
        config.timeout = Duration::from_secs(timeout);
        config.job_poll_interval = Duration::from_secs(poll_interval.max(1));
        config.job_timeout = job_timeout.map(Duration::from_secs);
        Ok(config)
    }

    /// Password and API key, each from the first step of its chain that has one.
    ///
    /// Flags win outright; a profile is only consulted when neither flag is set.
    fn secrets(
        &self,
        overrides: &ConnectionOverrides,
    ) -> (Option<SecretString>, Option<SecretString>) {
        if overrides.password.is_some() || overrides.api_key.is_some() {
            return (overrides.password.clone(), overrides.api_key.clone());
        }
        match self {
            Self::Direct => (None, None),
            Self::Profile { name, profile } => (
                resolve_password(profile, name),
                resolve_api_key(profile, name),
            ),
        }
    }
}

fn auth_error(err: &CoreError) -> ConfigError {
    ConfigError::Validation {
        field: "credentials".into(),
        reason: match err {
            CoreError::Config { message } => message.clone(),
            other => other.to_string(),
        },
    }
}

// ── Credential chains ───────────────────────────────────────────────

fn keyring_secret(profile_name: &str, kind: &str) -> Option<SecretString> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{kind}")).ok()?;
    match entry.get_password() {
        Ok(secret) => Some(SecretString::from(secret)),
        Err(e) => {
            debug!(profile = profile_name, kind, error = %e, "no keyring secret");
            None
        }
    }
}

/// API key: profile's env var → system keyring → plaintext in config.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    if let Some(val) = profile
        .api_key_env
        .as_ref()
        .and_then(|name| std::env::var(name).ok())
    {
        return Some(SecretString::from(val));
    }
    if profile.password.is_none() {
        if let Some(secret) = keyring_secret(profile_name, "api-key") {
            return Some(secret);
        }
    }
    profile.api_key.clone().map(SecretString::from)
}

/// Password: system keyring → plaintext in config.
///
/// The keyring is only consulted for profiles that name a user and carry
/// no API key, so key-based profiles never pick up a stray password.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    if profile.username.is_some() && profile.api_key.is_none() && profile.api_key_env.is_none() {
        if let Some(secret) = keyring_secret(profile_name, "password") {
            return Some(secret);
        }
    }
    profile.password.clone().map(SecretString::from)
}

/// Store a secret for `profile_name` in the system keyring.
pub fn store_secret(profile_name: &str, kind: &str, secret: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{kind}"))
        .and_then(|entry| entry.set_password(secret))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    const SAMPLE: &str = r#"
default_profile = "lab"

[defaults]
timeout = 45
poll_interval = 5

[profiles.lab]
host = "pano.lab.example"
port = 8443
api_key = "lab-key"
insecure = true

[profiles.edge]
host = "10.1.1.1"
username = "ops"
password = "s3cret"
api_key = "also-a-key"
"#;

    fn load_sample() -> Config {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        load_config_from(&path).unwrap()
    }

    fn no_prompt(_: &str) -> Option<SecretString> {
        None
    }

    #[test]
    fn loads_profiles_and_defaults() {
        let config = load_sample();
        assert_eq!(config.default_profile.as_deref(), Some("lab"));
        assert_eq!(config.defaults.poll_interval, 5);
        assert_eq!(config.profiles["lab"].port, Some(8443));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert!(config.profiles.is_empty());
        assert_eq!(config.defaults.poll_interval, 2);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.profiles.insert(
            "fw".into(),
            Profile {
                host: Some("fw1".into()),
                api_key_env: Some("FW1_KEY".into()),
                ..Profile::default()
            },
        );
        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles["fw"].host.as_deref(), Some("fw1"));
    }

    #[test]
    fn default_profile_used_without_host_flag() {
        let config = load_sample();
        let overrides = ConnectionOverrides::default();
        let source = ConnectionSource::select(&config, None, &overrides).unwrap();
        let resolved = source
            .resolve(&overrides, &config.defaults, no_prompt)
            .unwrap();
        assert_eq!(resolved.base_url().unwrap().as_str(), "https://pano.lab.example:8443/");
        assert_eq!(resolved.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(resolved.timeout, Duration::from_secs(45));
        assert_eq!(resolved.job_poll_interval, Duration::from_secs(5));
        assert!(matches!(resolved.auth, AuthCredentials::ApiKey(_)));
    }

    #[test]
    fn flags_override_profile() {
        let config = load_sample();
        let overrides = ConnectionOverrides {
            host: Some("10.9.9.9".into()),
            password: Some(SecretString::from("pw".to_owned())),
            timeout: Some(5),
            ..ConnectionOverrides::default()
        };
        let source = ConnectionSource::select(&config, Some("lab"), &overrides).unwrap();
        let resolved = source
            .resolve(&overrides, &config.defaults, no_prompt)
            .unwrap();
        assert_eq!(resolved.host, "10.9.9.9");
        assert_eq!(resolved.port, Some(8443));
        assert_eq!(resolved.timeout, Duration::from_secs(5));
        match resolved.auth {
            AuthCredentials::Credentials { username, password } => {
                assert_eq!(username, "admin");
                assert_eq!(password.expose_secret(), "pw");
            }
            AuthCredentials::ApiKey(_) => panic!("flag password should win"),
        }
    }

    #[test]
    fn host_flag_selects_direct_mode() {
        let config = load_sample();
        let overrides = ConnectionOverrides {
            host: Some("192.0.2.1".into()),
            api_key: Some(SecretString::from("k".to_owned())),
            ..ConnectionOverrides::default()
        };
        let source = ConnectionSource::select(&config, None, &overrides).unwrap();
        assert!(matches!(source, ConnectionSource::Direct));
        let resolved = source
            .resolve(&overrides, &Defaults::default(), no_prompt)
            .unwrap();
        assert_eq!(resolved.tls, TlsVerification::SystemDefaults);
        assert_eq!(resolved.job_timeout, None);
    }

    #[test]
    fn password_and_key_flags_conflict() {
        let overrides = ConnectionOverrides {
            host: Some("fw".into()),
            password: Some(SecretString::from("pw".to_owned())),
            api_key: Some(SecretString::from("key".to_owned())),
            ..ConnectionOverrides::default()
        };
        let err = ConnectionSource::Direct
            .resolve(&overrides, &Defaults::default(), no_prompt)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "credentials"));
    }

    #[test]
    fn profile_with_both_secrets_is_rejected() {
        let config = load_sample();
        let overrides = ConnectionOverrides::default();
        let source = ConnectionSource::select(&config, Some("edge"), &overrides).unwrap();
        let err = source
            .resolve(&overrides, &config.defaults, no_prompt)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn prompt_supplies_missing_password() {
        let overrides = ConnectionOverrides {
            host: Some("fw".into()),
            username: Some("ops".into()),
            ..ConnectionOverrides::default()
        };
        let resolved = ConnectionSource::Direct
            .resolve(&overrides, &Defaults::default(), |user| {
                assert_eq!(user, "ops");
                Some(SecretString::from("typed".to_owned()))
            })
            .unwrap();
        assert!(matches!(resolved.auth, AuthCredentials::Credentials { .. }));
    }

    #[test]
    fn direct_without_host_or_secret_fails() {
        let err = ConnectionSource::Direct
            .resolve(&ConnectionOverrides::default(), &Defaults::default(), no_prompt)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "host"));

        let overrides = ConnectionOverrides {
            host: Some("fw".into()),
            ..ConnectionOverrides::default()
        };
        let err = ConnectionSource::Direct
            .resolve(&overrides, &Defaults::default(), no_prompt)
            .unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { .. }));
    }

    #[test]
    fn secrets_stay_out_of_debug_and_describe() {
        let profile = Profile {
            host: Some("pano.example".into()),
            password: Some("hunter2".into()),
            api_key: Some("LUFRPT1".into()),
            ..Profile::default()
        };
        let source = ConnectionSource::Profile {
            name: "lab",
            profile: &profile,
        };
        assert_eq!(source.describe(), "profile 'lab'");

        let debug = format!("{source:?}");
        assert!(debug.contains("pano.example"));
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("LUFRPT1"));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let config = load_sample();
        let err =
            ConnectionSource::select(&config, Some("nope"), &ConnectionOverrides::default())
                .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile { .. }));
    }
}
