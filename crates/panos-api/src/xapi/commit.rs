// XML API commit endpoints
//
// `type=commit` requests and job polling. A commit reply carries the job id
// in `result/job`; when there is nothing to commit PAN-OS replies with a
// success message and no job, which surfaces here as `None`.

use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::error::Error;
use crate::xapi::client::XapiClient;
use crate::xapi::models::{CommitAllRequest, Job};
use crate::xapi::op::job_id;
use crate::xml;

impl XapiClient {
    /// Commit the candidate configuration of the connected device.
    ///
    /// `POST /api/` with `type=commit&cmd=<commit></commit>`.
    /// Returns the job id, or `None` if there were no changes to commit.
    pub async fn commit(&self) -> Result<Option<u64>, Error> {
        debug!("requesting commit");
        let resp = self
            .request(&[("type", "commit"), ("cmd", "<commit></commit>")])
            .await?;
        let id = job_id(resp.result());
        match id {
            Some(id) => info!(job = id, "commit enqueued"),
            None => info!(messages = ?resp.messages(), "nothing to commit"),
        }
        Ok(id)
    }

    /// Push device-group configuration from Panorama to member firewalls.
    ///
    /// `POST /api/` with `type=commit&action=all&cmd=<commit-all>...`.
    /// Returns the job id, or `None` if Panorama reported nothing to push.
    pub async fn commit_all(&self, request: &CommitAllRequest) -> Result<Option<u64>, Error> {
        let cmd = commit_all_cmd(request);
        debug!(device_group = %request.device_group, "requesting commit-all");
        let resp = self
            .request(&[("type", "commit"), ("action", "all"), ("cmd", &cmd)])
            .await?;
        let id = job_id(resp.result());
        if let Some(id) = id {
            info!(job = id, device_group = %request.device_group, "commit-all enqueued");
        }
        Ok(id)
    }

    /// Poll `show jobs id N` until the job reports `FIN`.
    ///
    /// `limit` bounds the total wait; `None` waits indefinitely.
    pub async fn wait_for_job(
        &self,
        id: u64,
        poll_interval: Duration,
        limit: Option<Duration>,
    ) -> Result<Job, Error> {
        self.poll_job(id, poll_interval, limit, Job::is_finished)
            .await
    }

    /// Poll a commit-all job until it is `FIN` and every firewall entry has
    /// a final result.
    pub async fn wait_for_push(
        &self,
        id: u64,
        poll_interval: Duration,
        limit: Option<Duration>,
    ) -> Result<Job, Error> {
        self.poll_job(id, poll_interval, limit, |job| {
            job.is_finished() && job.devices_settled()
        })
        .await
    }

    async fn poll_job(
        &self,
        id: u64,
        poll_interval: Duration,
        limit: Option<Duration>,
        done: impl Fn(&Job) -> bool,
    ) -> Result<Job, Error> {
        let started = Instant::now();
        loop {
            let job = self.show_job(id).await?;
            if done(&job) {
                debug!(job = id, result = ?job.result, "job finished");
                return Ok(job);
            }
            debug!(
                job = id,
                progress = ?job.progress,
                finished = job.is_finished(),
                "job pending"
            );

            if let Some(limit) = limit {
                if started.elapsed() + poll_interval > limit {
                    return Err(Error::JobTimeout {
                        job_id: id,
                        waited_secs: started.elapsed().as_secs(),
                    });
                }
            }
            sleep(poll_interval).await;
        }
    }
}

/// Build the `<commit-all>` command for a device-group push.
fn commit_all_cmd(request: &CommitAllRequest) -> String {
    let mut cmd = String::from("<commit-all><shared-policy><device-group>");
    cmd.push_str(&format!(
        "<entry name=\"{}\">",
        xml::escape(&request.device_group)
    ));
    if let Some(serials) = &request.serials {
        cmd.push_str("<devices>");
        for serial in serials {
            cmd.push_str(&xml::entry(serial));
        }
        cmd.push_str("</devices>");
    }
    cmd.push_str("</entry></device-group>");
    if request.include_template {
        cmd.push_str("<include-template>yes</include-template>");
    }
    cmd.push_str("</shared-policy></commit-all>");
    cmd
}
