//! Command dispatch: bridges CLI args -> core adapters -> output formatting.

pub mod commit;
pub mod config_cmd;
pub mod devices;
pub mod onboard;

use panos_config::{Config, ConnectionOverrides};
use panos_core::{CoreError, Failure, Target};

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

/// What every device-bound handler needs besides its own arguments.
pub struct Context<'a> {
    pub global: &'a GlobalOpts,
    pub cfg: &'a Config,
    pub format: OutputFormat,
}

impl Context<'_> {
    /// Resolve the connection and open a session to the device.
    pub async fn connect(&self, overrides: &ConnectionOverrides) -> Result<Target, CliError> {
        let connection = config::resolve_connection(self.global, self.cfg, overrides)?;
        panos_core::connect(&connection)
            .await
            .map_err(|e| self.fail(e))
    }

    /// Print a structured failure report for automation, then convert.
    ///
    /// Human formats leave the diagnostic on stderr as the only output.
    pub fn fail(&self, err: CoreError) -> CliError {
        if let Ok(Some(rendered)) = output::render_machine(self.format, &Failure::from(&err)) {
            output::print_output(&rendered, self.global.quiet);
        }
        err.into()
    }
}

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    let ctx = Context {
        global,
        cfg,
        format: config::output_format(global, cfg),
    };
    match cmd {
        Command::Commit(args) => commit::handle(&ctx, &args).await,
        Command::Devices(args) => devices::handle(&ctx, &args).await,
        Command::Onboard(args) => onboard::handle(&ctx, args).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are handled before dispatch".into(),
        )),
    }
}
