//! Device listing handler.

use tabled::Tabled;

use panos_core::{ManagedFirewall, Serial};

use crate::cli::DevicesArgs;
use crate::config;
use crate::error::CliError;
use crate::output;

use super::Context;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct SerialRow {
    #[tabled(rename = "Serial")]
    serial: String,
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Connected")]
    connected: String,
}

impl From<&ManagedFirewall> for DeviceRow {
    fn from(d: &ManagedFirewall) -> Self {
        let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".into());
        Self {
            serial: d.serial.to_string(),
            hostname: or_dash(&d.hostname),
            ip: or_dash(&d.ip_address),
            model: or_dash(&d.model),
            version: or_dash(&d.sw_version),
            connected: if d.connected { "yes" } else { "no" }.into(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context<'_>, args: &DevicesArgs) -> Result<(), CliError> {
    let target = ctx.connect(&config::overrides(ctx.global)).await?;

    let out = if args.details {
        let report = panos_core::list_device_details(&target, args.only_connected)
            .await
            .map_err(|e| ctx.fail(e))?;
        output::render_report(ctx.format, &report, |d| DeviceRow::from(d), |d| {
            d.serial.to_string()
        })?
    } else {
        let report = panos_core::list_devices(&target, args.only_connected)
            .await
            .map_err(|e| ctx.fail(e))?;
        output::render_report(
            ctx.format,
            &report,
            |s: &Serial| SerialRow {
                serial: s.to_string(),
            },
            ToString::to_string,
        )?
    };

    output::print_output(&out, ctx.global.quiet);
    Ok(())
}
