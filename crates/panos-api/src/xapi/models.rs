// XML API response models
//
// Typed views over the handful of PAN-OS documents the client consumes.
// Each model is built from an owned `Element` and tolerates missing
// optional nodes, because field sets vary across PAN-OS releases.

use crate::xml::Element;

/// Output of `show system info`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemInfo {
    pub hostname: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub sw_version: Option<String>,
    pub ip_address: Option<String>,
    /// `panorama`, `management-only`, `logger`, or absent on firewalls.
    pub system_mode: Option<String>,
}

impl SystemInfo {
    pub(crate) fn from_system(system: &Element) -> Self {
        let text = |name: &str| system.find_text(&[name]).map(str::to_owned);
        Self {
            hostname: text("hostname"),
            model: text("model"),
            serial: text("serial"),
            sw_version: text("sw-version"),
            ip_address: text("ip-address"),
            system_mode: text("system-mode"),
        }
    }

    /// Whether the device is a Panorama manager rather than a firewall.
    pub fn is_panorama(&self) -> bool {
        let model_says = self
            .model
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case("panorama") || m.starts_with("M-"));
        let mode_says = self
            .system_mode
            .as_deref()
            .is_some_and(|m| matches!(m, "panorama" | "management-only"));
        model_says || mode_says
    }
}

/// One firewall entry from `show devices all|connected` on Panorama.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceEntry {
    pub serial: String,
    pub hostname: Option<String>,
    pub ip_address: Option<String>,
    pub model: Option<String>,
    pub sw_version: Option<String>,
    pub connected: bool,
}

impl DeviceEntry {
    pub(crate) fn from_entry(entry: &Element) -> Option<Self> {
        let serial = entry
            .find_text(&["serial"])
            .or_else(|| entry.attr("name"))?
            .to_owned();
        let text = |name: &str| entry.find_text(&[name]).map(str::to_owned);
        Some(Self {
            serial,
            hostname: text("hostname"),
            ip_address: text("ip-address"),
            model: text("model"),
            sw_version: text("sw-version"),
            connected: entry.find_text(&["connected"]) == Some("yes"),
        })
    }
}

/// A device group as stored in Panorama's candidate configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceGroupEntry {
    pub name: String,
    /// Member firewall serials, in configuration order.
    pub devices: Vec<String>,
}

impl DeviceGroupEntry {
    pub(crate) fn from_entry(entry: &Element) -> Option<Self> {
        Some(Self {
            name: entry.attr("name")?.to_owned(),
            devices: entry_names(entry.child("devices")),
        })
    }
}

/// A template stack as stored in Panorama's candidate configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateStackEntry {
    pub name: String,
    pub templates: Vec<String>,
    /// `None` when the stack has no `<devices>` node at all.
    pub devices: Option<Vec<String>>,
}

impl TemplateStackEntry {
    pub(crate) fn from_entry(entry: &Element) -> Option<Self> {
        Some(Self {
            name: entry.attr("name")?.to_owned(),
            templates: entry.members("templates"),
            devices: entry.child("devices").map(|d| entry_names(Some(d))),
        })
    }
}

fn entry_names(list: Option<&Element>) -> Vec<String> {
    list.map(|l| {
        l.entries()
            .filter_map(|e| e.attr("name"))
            .map(str::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

// ── Jobs ─────────────────────────────────────────────────────────────

/// Lifecycle state of a PAN-OS job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Active,
    Finished,
    Unknown,
}

impl JobState {
    fn parse(raw: &str) -> Self {
        match raw {
            "PEND" => Self::Pending,
            "ACT" => Self::Active,
            "FIN" => Self::Finished,
            _ => Self::Unknown,
        }
    }
}

/// Per-firewall outcome of a commit-all push.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobDevice {
    pub serial: String,
    pub name: Option<String>,
    pub result: Option<String>,
    pub status: Option<String>,
    pub messages: Vec<String>,
}

impl JobDevice {
    fn from_entry(entry: &Element) -> Option<Self> {
        let serial = entry
            .find_text(&["serial-no"])
            .or_else(|| entry.attr("name"))?
            .to_owned();
        Some(Self {
            serial,
            name: entry.find_text(&["devicename"]).map(str::to_owned),
            result: entry.find_text(&["result"]).map(str::to_owned),
            status: entry.find_text(&["status"]).map(str::to_owned),
            messages: entry
                .child("details")
                .map(Element::collect_text)
                .unwrap_or_default(),
        })
    }
}

/// A job as reported by `show jobs id N`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: u64,
    pub job_type: Option<String>,
    pub state: JobState,
    /// `OK`, `FAIL` or `PEND`.
    pub result: Option<String>,
    pub progress: Option<String>,
    pub messages: Vec<String>,
    pub devices: Vec<JobDevice>,
    /// The raw `<job>` subtree. Can be large for commit-all jobs.
    pub xml: String,
}

impl Job {
    pub(crate) fn from_job(job: &Element, fallback_id: u64) -> Self {
        let mut messages = job
            .child("details")
            .map(Element::collect_text)
            .unwrap_or_default();
        if let Some(warnings) = job.child("warnings") {
            messages.extend(warnings.collect_text());
        }
        Self {
            id: job
                .find_text(&["id"])
                .and_then(|id| id.parse().ok())
                .unwrap_or(fallback_id),
            job_type: job.find_text(&["type"]).map(str::to_owned),
            state: JobState::parse(job.find_text(&["status"]).unwrap_or_default()),
            result: job.find_text(&["result"]).map(str::to_owned),
            progress: job.find_text(&["progress"]).map(str::to_owned),
            messages,
            devices: job
                .child("devices")
                .map(|d| d.entries().filter_map(JobDevice::from_entry).collect())
                .unwrap_or_default(),
            xml: job.to_xml(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == JobState::Finished
    }

    pub fn is_ok(&self) -> bool {
        self.result.as_deref() == Some("OK") && !self.any_device_failed()
    }

    /// True once every firewall in a push has a final result.
    ///
    /// Panorama can mark a commit-all job `FIN` while device entries still
    /// read `PEND` or carry no result yet.
    pub fn devices_settled(&self) -> bool {
        self.devices
            .iter()
            .all(|d| d.result.as_deref().is_some_and(|r| r != "PEND"))
    }

    pub fn any_device_failed(&self) -> bool {
        self.devices
            .iter()
            .any(|d| d.result.as_deref() == Some("FAIL"))
    }
}

// ── Commit requests ──────────────────────────────────────────────────

/// Parameters for a Panorama `commit-all` push to a device group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitAllRequest {
    pub device_group: String,
    pub include_template: bool,
    /// Restrict the push to these serials; `None` pushes to every member.
    pub serials: Option<Vec<String>>,
}
