// ── Onboarding adapter ──
//
// Converges a firewall's presence in Panorama's inventory, one device
// group and one template stack toward a desired state. Lookups all happen
// before the first mutation; removal from the inventory always comes last.

use std::future::Future;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::model::{DesiredState, Serial};
use crate::report::Report;
use crate::session::Target;

/// Parameters for an onboarding run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardRequest {
    pub serial: Serial,
    pub device_group: Option<String>,
    pub template_stack: Option<String>,
    pub state: DesiredState,
    /// Compute `changed` without issuing mutations.
    pub check_mode: bool,
}

/// A mutation the adapter performed (or would have, in check mode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OnboardAction {
    Register { serial: Serial },
    JoinDeviceGroup { device_group: String, serial: Serial },
    LeaveDeviceGroup { device_group: String, serial: Serial },
    JoinTemplateStack { template_stack: String, serial: Serial },
    LeaveTemplateStack { template_stack: String, serial: Serial },
    Unregister { serial: Serial },
}

/// Accumulates the outcome of each convergence step.
#[derive(Debug, Default)]
pub struct Convergence {
    check_mode: bool,
    changed: bool,
    actions: Vec<OnboardAction>,
}

impl Convergence {
    pub fn new(check_mode: bool) -> Self {
        Self {
            check_mode,
            ..Self::default()
        }
    }

    /// Record `action`, running `mutation` unless in check mode.
    pub async fn apply<F, Fut>(
        &mut self,
        action: OnboardAction,
        mutation: F,
    ) -> Result<(), CoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), CoreError>>,
    {
        if self.check_mode {
            debug!(?action, "check mode: skipping");
        } else {
            mutation().await?;
        }
        self.changed = true;
        self.actions.push(action);
        Ok(())
    }

    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn into_report(self) -> Report<Vec<OnboardAction>> {
        Report::new(self.changed, self.actions)
    }
}

/// Run the onboarding adapter against a connected target.
pub async fn onboard(
    target: &Target,
    request: &OnboardRequest,
) -> Result<Report<Vec<OnboardAction>>, CoreError> {
    let pano = target.manager("onboard")?;
    let serial = &request.serial;
    let present = request.state == DesiredState::Present;

    let registered = pano.is_registered(serial).await?;

    let group = match &request.device_group {
        Some(name) => Some(
            pano.device_group(name)
                .await?
                .ok_or_else(|| CoreError::not_found("Device group", name.as_str()))?,
        ),
        None => None,
    };
    let stack = match &request.template_stack {
        Some(name) => Some(
            pano.template_stack(name)
                .await?
                .ok_or_else(|| CoreError::not_found("Template stack", name.as_str()))?,
        ),
        None => None,
    };
    debug!(%serial, registered, state = %request.state, "resolved onboarding state");

    let mut conv = Convergence::new(request.check_mode);

    if present && !registered {
        conv.apply(
            OnboardAction::Register {
                serial: serial.clone(),
            },
            || pano.register_firewall(serial),
        )
        .await?;
    }

    if let Some(group) = &group {
        let member = group.contains(serial);
        if present && !member {
            conv.apply(
                OnboardAction::JoinDeviceGroup {
                    device_group: group.name.clone(),
                    serial: serial.clone(),
                },
                || pano.add_to_device_group(&group.name, serial),
            )
            .await?;
        } else if !present && member {
            conv.apply(
                OnboardAction::LeaveDeviceGroup {
                    device_group: group.name.clone(),
                    serial: serial.clone(),
                },
                || pano.remove_from_device_group(&group.name, serial),
            )
            .await?;
        }
    }

    if let Some(stack) = &stack {
        let member = stack.contains(serial);
        if present && !member {
            conv.apply(
                OnboardAction::JoinTemplateStack {
                    template_stack: stack.name.clone(),
                    serial: serial.clone(),
                },
                || pano.add_to_template_stack(&stack.name, serial),
            )
            .await?;
        } else if !present && member {
            conv.apply(
                OnboardAction::LeaveTemplateStack {
                    template_stack: stack.name.clone(),
                    serial: serial.clone(),
                },
                || pano.remove_from_template_stack(&stack.name, serial),
            )
            .await?;
        }
    }

    if !present && registered {
        conv.apply(
            OnboardAction::Unregister {
                serial: serial.clone(),
            },
            || pano.unregister_firewall(serial),
        )
        .await?;
    }

    info!(%serial, changed = conv.changed(), check_mode = request.check_mode, "onboarding converged");
    Ok(conv.into_report())
}
