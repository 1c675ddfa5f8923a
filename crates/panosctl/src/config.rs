//! Glue between CLI flags and `panos_config`.
//!
//! Flags become `ConnectionOverrides`; the profile layer and credential
//! chains live in `panos_config`. Core only ever sees a `ConnectionConfig`.

use std::io::IsTerminal;

use clap::ValueEnum;
use secrecy::SecretString;
use tracing::debug;

use panos_config::{Config, ConnectionOverrides, ConnectionSource};
use panos_core::ConnectionConfig;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Collect connection flags into overrides for the profile layer.
pub fn overrides(global: &GlobalOpts) -> ConnectionOverrides {
    ConnectionOverrides {
        host: global.host.clone(),
        port: global.port,
        username: global.username.clone(),
        password: global.password.clone().map(SecretString::from),
        api_key: global.api_key.clone().map(SecretString::from),
        ca_cert: global.ca_cert.clone(),
        insecure: global.insecure,
        timeout: global.timeout,
        poll_interval: None,
        job_timeout: None,
    }
}

/// Resolve the connection for a device-bound command.
pub fn resolve_connection(
    global: &GlobalOpts,
    cfg: &Config,
    overrides: &ConnectionOverrides,
) -> Result<ConnectionConfig, CliError> {
    let source = ConnectionSource::select(cfg, global.profile.as_deref(), overrides)?;
    debug!(source = %source.describe(), "resolved connection source");
    let connection = source.resolve(overrides, &cfg.defaults, prompt_password)?;
    Ok(connection)
}

/// Ask for a password on an interactive terminal; decline otherwise.
fn prompt_password(username: &str) -> Option<SecretString> {
    if !std::io::stdin().is_terminal() {
        return None;
    }
    rpassword::prompt_password(format!("Password for {username}: "))
        .ok()
        .filter(|p| !p.is_empty())
        .map(SecretString::from)
}

/// Output format: `--output` flag, then `defaults.output`, then JSON.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&cfg.defaults.output, true).unwrap_or(OutputFormat::Json)
    })
}

/// Name of the profile `config` subcommands act on.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}
