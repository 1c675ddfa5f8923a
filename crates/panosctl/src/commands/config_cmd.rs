//! Config subcommand handlers.

use std::io::{BufRead, IsTerminal};
use std::path::PathBuf;

use panos_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

// ── Helpers ─────────────────────────────────────────────────────────

fn invalid(field: &str, reason: impl Into<String>) -> CliError {
    CliError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

/// Replace plaintext secrets before showing a config.
fn redact(cfg: &mut Config) {
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(REDACTED.into());
        }
        if profile.api_key.is_some() {
            profile.api_key = Some(REDACTED.into());
        }
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, CliError> {
    value
        .parse()
        .map_err(|_| invalid(key, format!("'{value}' is not a valid {key}")))
}

/// Apply `key = value` to a profile. Secrets go through `set-secret`.
fn set_field(profile: &mut Profile, key: &str, value: &str) -> Result<(), CliError> {
    let value = value.trim();
    match key {
        "host" => profile.host = Some(value.to_owned()),
        "port" => profile.port = Some(parse(key, value)?),
        "username" => profile.username = Some(value.to_owned()),
        "api_key_env" => profile.api_key_env = Some(value.to_owned()),
        "ca_cert" => profile.ca_cert = Some(PathBuf::from(value)),
        "insecure" => profile.insecure = Some(parse(key, value)?),
        "timeout" => profile.timeout = Some(parse(key, value)?),
        "password" | "api_key" => {
            return Err(invalid(
                key,
                "secrets are not stored in plaintext here; use `panosctl config set-secret`",
            ));
        }
        other => return Err(invalid("key", format!("unknown profile field '{other}'"))),
    }
    Ok(())
}

/// Read a secret from the terminal, or the first line of piped stdin.
fn read_secret(prompt: &str) -> Result<String, CliError> {
    let secret = if std::io::stdin().is_terminal() {
        rpassword::prompt_password(prompt)?
    } else {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        line.trim_end_matches(['\r', '\n']).to_owned()
    };
    if secret.is_empty() {
        return Err(invalid("secret", "cannot be empty"));
    }
    Ok(secret)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = panos_config::load_config()?;
    let format = config::output_format(global, &cfg);

    match args.command {
        ConfigCommand::Path => {
            output::print_output(
                &panos_config::config_path().display().to_string(),
                global.quiet,
            );
        }

        ConfigCommand::Show => {
            redact(&mut cfg);
            let out = output::render_single(
                format,
                &cfg,
                |c| serde_yaml::to_string(c).unwrap_or_default(),
                |c| c.default_profile.clone().unwrap_or_default(),
            )?;
            output::print_output(&out, global.quiet);
        }

        ConfigCommand::Profiles => {
            let default = cfg.default_profile.as_deref();
            let mut names: Vec<&String> = cfg.profiles.keys().collect();
            names.sort();
            let lines: Vec<String> = names
                .into_iter()
                .map(|name| {
                    let marker = if Some(name.as_str()) == default { "*" } else { " " };
                    format!("{marker} {name}")
                })
                .collect();
            output::print_output(&lines.join("\n"), global.quiet);
        }

        ConfigCommand::Use { name } => {
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound { name });
            }
            cfg.default_profile = Some(name.clone());
            panos_config::save_config(&cfg)?;
            eprintln!("Default profile set to '{name}'");
        }

        ConfigCommand::Set { key, value } => {
            let name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(name.clone()).or_default();
            set_field(profile, &key, &value)?;
            panos_config::save_config(&cfg)?;
            eprintln!("Set {key} for profile '{name}'");
        }

        ConfigCommand::SetSecret { api_key } => {
            let name = config::active_profile_name(global, &cfg);
            let (kind, prompt) = if api_key {
                ("api-key", "API key: ")
            } else {
                ("password", "Password: ")
            };
            let secret = read_secret(prompt)?;
            panos_config::store_secret(&name, kind, &secret)?;
            eprintln!("Stored {kind} for profile '{name}' in the system keyring");
        }
    }
    Ok(())
}
