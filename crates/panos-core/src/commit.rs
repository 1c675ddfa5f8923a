// ── Commit adapter ──
//
// Commits the connected device and, on Panorama with a device group named,
// pushes that group to its firewalls. Each commit is issued once and checked
// before the next one starts.

use tracing::{debug, info};

use crate::error::CoreError;
use crate::model::{CommitAllRequest, CommitOutcome, CommitResult, CommitSummary, Serial};
use crate::report::Report;
use crate::session::Target;

/// The `shared` pseudo device group: no group-scoped push.
const SHARED: &str = "shared";

/// Parameters for a commit run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitRequest {
    pub device_group: Option<String>,
    pub include_template: bool,
    /// Restrict the push to these firewalls.
    pub devices: Option<Vec<Serial>>,
}

impl CommitRequest {
    /// The device group to push, with `shared` meaning none.
    pub fn scoped_group(&self) -> Option<&str> {
        self.device_group
            .as_deref()
            .filter(|g| !g.eq_ignore_ascii_case(SHARED))
    }
}

/// Run the commit adapter against a connected target.
pub async fn commit(
    target: &Target,
    request: &CommitRequest,
) -> Result<Report<Vec<CommitSummary>>, CoreError> {
    let group = request.scoped_group();

    if let Some(name) = group {
        let exists = match target {
            Target::Manager(pano) => pano.device_group(name).await?.is_some(),
            Target::Standalone(_) => false,
        };
        if !exists {
            return Err(CoreError::not_found("Device group", name));
        }
    }

    let mut results = Vec::new();

    debug!(target = target.kind(), "committing local configuration");
    if let Some(local) = target.commit_local().await? {
        results.push(checked(local, &results)?);
    } else {
        info!("no local changes to commit");
    }

    if let (Target::Manager(pano), Some(name)) = (target, group) {
        let push = CommitAllRequest {
            device_group: name.to_owned(),
            include_template: request.include_template,
            serials: request.devices.clone(),
        };
        debug!(device_group = name, include_template = push.include_template, "pushing device group");
        if let Some(pushed) = pano.commit_all(&push).await? {
            results.push(checked(pushed, &results)?);
        }
    }

    Ok(Report::new(!results.is_empty(), results))
}

/// Sanitize a result, turning a `FAIL` outcome into `CommitFailed`.
fn checked(result: CommitResult, completed: &[CommitSummary]) -> Result<CommitSummary, CoreError> {
    let summary = result.sanitized();
    if summary.outcome == CommitOutcome::Fail {
        return Err(CoreError::CommitFailed {
            summary: Box::new(summary),
            completed: completed.to_vec(),
        });
    }
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::DeviceGroup;
    use crate::session::{MockFirewallSession, MockPanoramaSession};
    use pretty_assertions::assert_eq;

    fn result(job_id: u64, outcome: CommitOutcome) -> CommitResult {
        CommitResult {
            outcome,
            job_id,
            success: outcome == CommitOutcome::Success,
            messages: vec![],
            devices: vec![],
            xml: format!("<job><id>{job_id}</id></job>"),
        }
    }

    fn group(name: &str) -> DeviceGroup {
        DeviceGroup {
            name: name.into(),
            devices: vec![],
        }
    }

    #[tokio::test]
    async fn firewall_commits_once() {
        let mut fw = MockFirewallSession::new();
        fw.expect_commit()
            .times(1)
            .returning(|| Ok(Some(result(11, CommitOutcome::Success))));
        let target = Target::Standalone(Box::new(fw));

        let report = commit(&target, &CommitRequest::default()).await.unwrap();
        assert!(report.changed);
        assert_eq!(report.result.len(), 1);
        assert_eq!(report.result[0].job_id, 11);
    }

    #[tokio::test]
    async fn nothing_to_commit_is_unchanged() {
        let mut fw = MockFirewallSession::new();
        fw.expect_commit().times(1).returning(|| Ok(None));
        let target = Target::Standalone(Box::new(fw));

        let report = commit(&target, &CommitRequest::default()).await.unwrap();
        assert!(!report.changed);
        assert!(report.result.is_empty());
    }

    #[tokio::test]
    async fn shared_group_never_pushes() {
        let mut pano = MockPanoramaSession::new();
        pano.expect_device_group().never();
        pano.expect_commit_all().never();
        pano.expect_commit()
            .times(1)
            .returning(|| Ok(Some(result(1, CommitOutcome::Success))));
        let target = Target::Manager(Box::new(pano));

        let request = CommitRequest {
            device_group: Some("SHARED".into()),
            ..CommitRequest::default()
        };
        let report = commit(&target, &request).await.unwrap();
        assert_eq!(report.result.len(), 1);
    }

    #[tokio::test]
    async fn manager_commits_then_pushes_group() {
        let mut seq = mockall::Sequence::new();
        let mut pano = MockPanoramaSession::new();
        pano.expect_device_group()
            .withf(|name| name == "Cloud-Edge")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|name| Ok(Some(group(name))));
        pano.expect_commit()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(Some(result(20, CommitOutcome::Success))));
        pano.expect_commit_all()
            .withf(|req| {
                req.device_group == "Cloud-Edge" && req.include_template && req.serials.is_none()
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(result(21, CommitOutcome::Success))));
        let target = Target::Manager(Box::new(pano));

        let request = CommitRequest {
            device_group: Some("Cloud-Edge".into()),
            include_template: true,
            devices: None,
        };
        let report = commit(&target, &request).await.unwrap();
        assert!(report.changed);
        let jobs: Vec<_> = report.result.iter().map(|r| r.job_id).collect();
        assert_eq!(jobs, vec![20, 21]);
    }

    #[tokio::test]
    async fn missing_group_fails_before_commit() {
        let mut pano = MockPanoramaSession::new();
        pano.expect_device_group().returning(|_| Ok(None));
        pano.expect_commit().never();
        pano.expect_commit_all().never();
        let target = Target::Manager(Box::new(pano));

        let request = CommitRequest {
            device_group: Some("Nope".into()),
            ..CommitRequest::default()
        };
        let err = commit(&target, &request).await.unwrap_err();
        assert_eq!(err.to_string(), "Device group not found: Nope");
    }

    #[tokio::test]
    async fn named_group_on_firewall_is_not_found() {
        let mut fw = MockFirewallSession::new();
        fw.expect_commit().never();
        let target = Target::Standalone(Box::new(fw));

        let request = CommitRequest {
            device_group: Some("Branch".into()),
            ..CommitRequest::default()
        };
        let err = commit(&target, &request).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn failed_local_commit_stops_before_push() {
        let mut pano = MockPanoramaSession::new();
        pano.expect_device_group()
            .returning(|name| Ok(Some(group(name))));
        pano.expect_commit()
            .returning(|| Ok(Some(result(30, CommitOutcome::Fail))));
        pano.expect_commit_all().never();
        let target = Target::Manager(Box::new(pano));

        let request = CommitRequest {
            device_group: Some("Branch".into()),
            ..CommitRequest::default()
        };
        match commit(&target, &request).await.unwrap_err() {
            CoreError::CommitFailed { summary, completed } => {
                assert_eq!(summary.job_id, 30);
                assert!(completed.is_empty());
            }
            other => panic!("expected CommitFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_push_is_reported_with_earlier_success() {
        let mut pano = MockPanoramaSession::new();
        pano.expect_device_group()
            .returning(|name| Ok(Some(group(name))));
        pano.expect_commit()
            .returning(|| Ok(Some(result(40, CommitOutcome::Success))));
        pano.expect_commit_all()
            .withf(|req| {
                req.serials.as_deref().map(<[Serial]>::len) == Some(1) && !req.include_template
            })
            .returning(|_| Ok(Some(result(41, CommitOutcome::Fail))));
        let target = Target::Manager(Box::new(pano));

        let request = CommitRequest {
            device_group: Some("Branch".into()),
            include_template: false,
            devices: Some(vec![Serial::new("007200004214").unwrap()]),
        };
        match commit(&target, &request).await.unwrap_err() {
            CoreError::CommitFailed { summary, completed } => {
                assert_eq!(summary.job_id, 41);
                assert_eq!(completed.len(), 1);
                assert_eq!(completed[0].job_id, 40);
            }
            other => panic!("expected CommitFailed, got {other:?}"),
        }
    }
}
