//! Commit command handler.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Tabled;

use panos_core::{CommitRequest, CommitSummary, Serial};

use crate::cli::CommitArgs;
use crate::config;
use crate::error::CliError;
use crate::output;

use super::Context;

#[derive(Tabled)]
struct CommitRow {
    #[tabled(rename = "Job")]
    job_id: u64,
    #[tabled(rename = "Result")]
    outcome: String,
    #[tabled(rename = "Devices")]
    devices: usize,
    #[tabled(rename = "Messages")]
    messages: String,
}

impl From<&CommitSummary> for CommitRow {
    fn from(s: &CommitSummary) -> Self {
        Self {
            job_id: s.job_id,
            outcome: s.outcome.to_string(),
            devices: s.devices.len(),
            messages: s.messages.join("\n"),
        }
    }
}

fn request(args: &CommitArgs) -> Result<CommitRequest, CliError> {
    let devices = if args.devices.is_empty() {
        None
    } else {
        Some(
            args.devices
                .iter()
                .map(|raw| Serial::new(raw))
                .collect::<Result<Vec<_>, _>>()?,
        )
    };
    Ok(CommitRequest {
        device_group: args.devicegroup.clone(),
        include_template: args.include_template,
        devices,
    })
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} ({elapsed})") {
        bar.set_style(style);
    }
    bar.set_message("Waiting for commit job");
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

pub async fn handle(ctx: &Context<'_>, args: &CommitArgs) -> Result<(), CliError> {
    let request = request(args)?;

    let mut overrides = config::overrides(ctx.global);
    overrides.poll_interval = args.poll_interval;
    overrides.job_timeout = args.job_timeout;
    let target = ctx.connect(&overrides).await?;

    let bar = spinner(ctx.global.quiet);
    let outcome = panos_core::commit(&target, &request).await;
    bar.finish_and_clear();

    let report = outcome.map_err(|e| ctx.fail(e))?;
    let out = output::render_report(
        ctx.format,
        &report,
        |s| CommitRow::from(s),
        |s| s.job_id.to_string(),
    )?;
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}
