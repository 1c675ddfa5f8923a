//! Onboarding command handler.

use tabled::Tabled;

use panos_core::{DesiredState, OnboardAction, OnboardRequest, Serial};

use crate::cli::{OnboardArgs, StateArg};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::Context;

impl From<StateArg> for DesiredState {
    fn from(arg: StateArg) -> Self {
        match arg {
            StateArg::Present => Self::Present,
            StateArg::Absent => Self::Absent,
        }
    }
}

#[derive(Tabled)]
struct ActionRow {
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Target")]
    target: String,
}

impl From<&OnboardAction> for ActionRow {
    fn from(a: &OnboardAction) -> Self {
        let (action, target) = describe(a);
        Self {
            action: action.into(),
            target,
        }
    }
}

fn describe(action: &OnboardAction) -> (&'static str, String) {
    match action {
        OnboardAction::Register { serial } => ("register", serial.to_string()),
        OnboardAction::Unregister { serial } => ("unregister", serial.to_string()),
        OnboardAction::JoinDeviceGroup { device_group, .. } => {
            ("join device group", device_group.clone())
        }
        OnboardAction::LeaveDeviceGroup { device_group, .. } => {
            ("leave device group", device_group.clone())
        }
        OnboardAction::JoinTemplateStack { template_stack, .. } => {
            ("join template stack", template_stack.clone())
        }
        OnboardAction::LeaveTemplateStack { template_stack, .. } => {
            ("leave template stack", template_stack.clone())
        }
    }
}

pub async fn handle(ctx: &Context<'_>, args: OnboardArgs) -> Result<(), CliError> {
    let request = OnboardRequest {
        serial: Serial::new(&args.serialnum)?,
        device_group: args.devicegroup,
        template_stack: args.templatestack,
        state: args.state.into(),
        check_mode: args.check,
    };

    let target = ctx.connect(&config::overrides(ctx.global)).await?;
    let report = panos_core::onboard(&target, &request)
        .await
        .map_err(|e| ctx.fail(e))?;

    let out = output::render_report(ctx.format, &report, |a| ActionRow::from(a), |a| {
        let (action, target) = describe(a);
        format!("{action}\t{target}")
    })?;
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}
