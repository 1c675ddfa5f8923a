// ── Domain model ──
//
// Types the adapters reason about. They are built from panos-api's XML
// views and serialized into reports; nothing here talks to the network.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::CoreError;

// ── Serial ───────────────────────────────────────────────────────────

/// A firewall serial number: the identity key for inventory, device-group
/// membership and template-stack membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Serial(String);

impl Serial {
    pub fn new(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation {
                message: "serial number must not be empty".into(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Serial {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl PartialEq<str> for Serial {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

// ── Inventory ────────────────────────────────────────────────────────

/// A firewall as Panorama currently sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagedFirewall {
    pub serial: Serial,
    pub hostname: Option<String>,
    pub ip_address: Option<String>,
    pub model: Option<String>,
    pub sw_version: Option<String>,
    pub connected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceGroup {
    pub name: String,
    pub devices: Vec<Serial>,
}

impl DeviceGroup {
    pub fn contains(&self, serial: &Serial) -> bool {
        self.devices.contains(serial)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateStack {
    pub name: String,
    pub templates: Vec<String>,
    /// `None` when the stack has never had a device list.
    pub devices: Option<Vec<Serial>>,
}

impl TemplateStack {
    /// Member serials; a missing device list reads as empty.
    pub fn members(&self) -> &[Serial] {
        self.devices.as_deref().unwrap_or_default()
    }

    pub fn contains(&self, serial: &Serial) -> bool {
        self.members().contains(serial)
    }
}

/// Whether a firewall should be onboarded or removed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    #[default]
    Present,
    Absent,
}

// ── Commits ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum CommitOutcome {
    Success,
    Fail,
}

/// A device-group push request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitAllRequest {
    pub device_group: String,
    pub include_template: bool,
    /// Restrict the push to these firewalls; `None` pushes to every member.
    pub serials: Option<Vec<Serial>>,
}

impl From<&CommitAllRequest> for panos_api::CommitAllRequest {
    fn from(req: &CommitAllRequest) -> Self {
        Self {
            device_group: req.device_group.clone(),
            include_template: req.include_template,
            serials: req
                .serials
                .as_ref()
                .map(|s| s.iter().map(|s| s.as_str().to_owned()).collect()),
        }
    }
}

/// Per-firewall result of a push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DevicePush {
    pub serial: String,
    pub name: Option<String>,
    pub result: Option<String>,
    pub status: Option<String>,
    pub messages: Vec<String>,
}

/// The full result of a finished commit job, including the raw XML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
    pub outcome: CommitOutcome,
    pub job_id: u64,
    pub success: bool,
    pub messages: Vec<String>,
    pub devices: Vec<DevicePush>,
    pub xml: String,
}

/// A `CommitResult` without its XML payload; what reports carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    #[serde(rename = "result")]
    pub outcome: CommitOutcome,
    #[serde(rename = "jobid")]
    pub job_id: u64,
    pub success: bool,
    pub messages: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub devices: Vec<DevicePush>,
}

impl CommitResult {
    /// Drop the diagnostic XML payload.
    pub fn sanitized(self) -> CommitSummary {
        CommitSummary {
            outcome: self.outcome,
            job_id: self.job_id,
            success: self.success,
            messages: self.messages,
            devices: self.devices,
        }
    }
}

impl From<panos_api::Job> for CommitResult {
    fn from(job: panos_api::Job) -> Self {
        let outcome = if job.result.as_deref() == Some("FAIL") || job.any_device_failed() {
            CommitOutcome::Fail
        } else {
            CommitOutcome::Success
        };
        Self {
            outcome,
            job_id: job.id,
            success: job.is_ok(),
            messages: job.messages,
            devices: job
                .devices
                .into_iter()
                .map(|d| DevicePush {
                    serial: d.serial,
                    name: d.name,
                    result: d.result,
                    status: d.status,
                    messages: d.messages,
                })
                .collect(),
            xml: job.xml,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn serial_is_trimmed_and_non_empty() {
        assert_eq!(Serial::new(" 0072 ").unwrap().as_str(), "0072");
        assert!(Serial::new("   ").is_err());
    }

    #[test]
    fn template_stack_without_devices_reads_empty() {
        let ts = TemplateStack {
            name: "ts".into(),
            templates: vec![],
            devices: None,
        };
        assert!(ts.members().is_empty());
        assert!(!ts.contains(&Serial::new("001").unwrap()));
    }

    #[test]
    fn desired_state_parses_case_insensitively() {
        assert_eq!("Absent".parse::<DesiredState>().unwrap(), DesiredState::Absent);
        assert_eq!(DesiredState::Present.to_string(), "present");
    }

    #[test]
    fn sanitized_summary_has_no_xml() {
        let result = CommitResult {
            outcome: CommitOutcome::Fail,
            job_id: 3,
            success: false,
            messages: vec!["bad".into()],
            devices: vec![],
            xml: "<job><id>3</id></job>".into(),
        };
        let json = serde_json::to_value(result.sanitized()).unwrap();
        assert_eq!(json["result"], "FAIL");
        assert_eq!(json["jobid"], 3);
        assert!(json.get("xml").is_none());
        assert!(!json.to_string().contains("<job>"));
    }

    #[test]
    fn failed_firewall_fails_the_push() {
        let job = panos_api::Job {
            id: 9,
            job_type: Some("CommitAll".into()),
            state: panos_api::JobState::Finished,
            result: Some("OK".into()),
            progress: Some("100".into()),
            messages: vec![],
            devices: vec![
                panos_api::JobDevice {
                    serial: "001".into(),
                    result: Some("OK".into()),
                    ..Default::default()
                },
                panos_api::JobDevice {
                    serial: "002".into(),
                    result: Some("FAIL".into()),
                    messages: vec!["bad ref".into()],
                    ..Default::default()
                },
            ],
            xml: String::new(),
        };
        let result = CommitResult::from(job);
        assert_eq!(result.outcome, CommitOutcome::Fail);
        assert!(!result.success);
        assert_eq!(result.devices[1].result.as_deref(), Some("FAIL"));
    }
}
