//! Clap derive structures for the `panosctl` CLI.
//!
//! Defines the command tree, global connection flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// panosctl -- configuration adapters for PAN-OS firewalls and Panorama
#[derive(Debug, Parser)]
#[command(
    name = "panosctl",
    version,
    about = "Commit, list and onboard PAN-OS firewalls and Panorama",
    long_about = "Declarative adapters over the PAN-OS XML API.\n\n\
        Each subcommand connects to one firewall or Panorama, converges it toward\n\
        the requested state and prints a report with a `changed` flag.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Connection profile to use
    #[arg(long, short = 'p', env = "PANOS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Firewall or Panorama address (overrides profile)
    #[arg(
        long,
        short = 'H',
        visible_alias = "ip-address",
        env = "PANOS_HOST",
        global = true
    )]
    pub host: Option<String>,

    /// Management port
    #[arg(long, env = "PANOS_PORT", global = true)]
    pub port: Option<u16>,

    /// Username for key generation [default: admin]
    #[arg(long, short = 'u', env = "PANOS_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password (mutually exclusive with --api-key)
    #[arg(
        long,
        env = "PANOS_PASSWORD",
        global = true,
        hide_env_values = true,
        conflicts_with = "api_key"
    )]
    pub password: Option<String>,

    /// XML API key
    #[arg(long, env = "PANOS_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// CA certificate (PEM) for verifying the management interface
    #[arg(long, env = "PANOS_CA_CERT", global = true)]
    pub ca_cert: Option<PathBuf>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "PANOS_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "PANOS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format [default: json, or `defaults.output` from the config file]
    #[arg(long, short = 'o', env = "PANOS_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Value Enums ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON (default)
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Pretty table
    Table,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StateArg {
    /// Firewall should be managed and a member of the named group/stack
    Present,
    /// Firewall should be removed from the group/stack and inventory
    Absent,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Commit the candidate configuration, then optionally push a device group
    Commit(CommitArgs),

    /// List firewalls managed by Panorama
    #[command(alias = "dev")]
    Devices(DevicesArgs),

    /// Add or remove a firewall in Panorama's inventory, device group and template stack
    Onboard(OnboardArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Commit ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CommitArgs {
    /// Device group to push after the local commit (`shared` means none)
    #[arg(long, short = 'g', visible_alias = "device-group")]
    pub devicegroup: Option<String>,

    /// Include template configuration in the push
    #[arg(long)]
    pub include_template: bool,

    /// Only push to these firewall serials
    #[arg(long, value_delimiter = ',', requires = "devicegroup")]
    pub devices: Vec<String>,

    /// Seconds between job status polls
    #[arg(long, env = "PANOS_POLL_INTERVAL")]
    pub poll_interval: Option<u64>,

    /// Give up waiting for a commit job after this many seconds
    #[arg(long, env = "PANOS_JOB_TIMEOUT")]
    pub job_timeout: Option<u64>,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Only list firewalls currently connected to Panorama
    #[arg(long)]
    pub only_connected: bool,

    /// Show hostname, address, model and version instead of bare serials
    #[arg(long)]
    pub details: bool,
}

// ── Onboard ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct OnboardArgs {
    /// Firewall serial number
    #[arg(long, visible_alias = "serial")]
    pub serialnum: String,

    /// Device group the firewall should (not) belong to
    #[arg(long, short = 'g', visible_alias = "device-group")]
    pub devicegroup: Option<String>,

    /// Template stack the firewall should (not) belong to
    #[arg(long, short = 't', visible_alias = "template-stack")]
    pub templatestack: Option<String>,

    /// Desired state
    #[arg(long, value_enum, default_value = "present")]
    pub state: StateArg,

    /// Report what would change without changing anything
    #[arg(long)]
    pub check: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Show the current configuration (secrets redacted)
    Show,

    /// List profile names (the default is marked with *)
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Set a profile field (host, port, username, api_key_env, ca_cert, insecure, timeout)
    Set {
        /// Field name
        key: String,
        /// New value
        value: String,
    },

    /// Store the active profile's password or API key in the system keyring
    SetSecret {
        /// Store an API key instead of a password
        #[arg(long)]
        api_key: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
