// XML API operational commands
//
// `type=op` requests: system identity, Panorama's managed-device view and
// job status. Commands are sent in their XML form.

use tracing::debug;

use crate::error::Error;
use crate::xapi::client::{XapiClient, XapiResponse};
use crate::xapi::models::{DeviceEntry, Job, SystemInfo};
use crate::xml::Element;

impl XapiClient {
    /// Run an arbitrary operational command.
    ///
    /// `POST /api/` with `type=op&cmd=<...>`
    pub async fn op(&self, cmd: &str) -> Result<XapiResponse, Error> {
        debug!(cmd, "op command");
        self.request(&[("type", "op"), ("cmd", cmd)]).await
    }

    /// `show system info`
    pub async fn system_info(&self) -> Result<SystemInfo, Error> {
        let resp = self.op("<show><system><info/></system></show>").await?;
        let system = resp
            .root()
            .find(&["result", "system"])
            .ok_or_else(|| missing("result/system", &resp))?;
        Ok(SystemInfo::from_system(system))
    }

    /// `show devices all` or `show devices connected` (Panorama only).
    pub async fn show_devices(&self, only_connected: bool) -> Result<Vec<DeviceEntry>, Error> {
        let cmd = if only_connected {
            "<show><devices><connected/></devices></show>"
        } else {
            "<show><devices><all/></devices></show>"
        };
        let resp = self.op(cmd).await?;
        let devices = resp
            .root()
            .find(&["result", "devices"])
            .map(|d| d.entries().filter_map(DeviceEntry::from_entry).collect())
            .unwrap_or_default();
        Ok(devices)
    }

    /// `show jobs id N`
    pub async fn show_job(&self, id: u64) -> Result<Job, Error> {
        let cmd = format!("<show><jobs><id>{id}</id></jobs></show>");
        let resp = self.op(&cmd).await?;
        let job = resp
            .root()
            .find(&["result", "job"])
            .ok_or_else(|| missing("result/job", &resp))?;
        Ok(Job::from_job(job, id))
    }
}

pub(crate) fn missing(path: &str, resp: &XapiResponse) -> Error {
    Error::Deserialization {
        message: format!("response has no <{path}>"),
        body: resp.body().to_owned(),
    }
}

/// Parse a job id out of a commit reply's `result/job` text.
pub(crate) fn job_id(result: Option<&Element>) -> Option<u64> {
    result
        .and_then(|r| r.find_text(&["job"]))
        .and_then(|id| id.parse().ok())
}
