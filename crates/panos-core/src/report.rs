// ── Adapter reports ──
//
// Every adapter ends in a `Report` on success or a `Failure` on error.
// Both serialize to the shape automation tooling expects:
// `{changed, result}` and `{failed, changed, msg, result?}`.

use serde::Serialize;
use serde_json::Value;

use crate::error::CoreError;

/// Outcome of a successful adapter run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report<T> {
    pub changed: bool,
    pub result: T,
}

impl<T> Report<T> {
    pub fn new(changed: bool, result: T) -> Self {
        Self { changed, result }
    }

    /// A read-only report.
    pub fn unchanged(result: T) -> Self {
        Self::new(false, result)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Report<U> {
        Report {
            changed: self.changed,
            result: f(self.result),
        }
    }
}

/// Outcome of a failed adapter run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    pub failed: bool,
    pub changed: bool,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl From<&CoreError> for Failure {
    fn from(err: &CoreError) -> Self {
        let result = match err {
            CoreError::CommitFailed { summary, .. } => serde_json::to_value(summary).ok(),
            _ => None,
        };
        Self {
            failed: true,
            changed: false,
            msg: err.to_string(),
            result,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{CommitOutcome, CommitSummary};

    #[test]
    fn failure_carries_sanitized_commit() {
        let err = CoreError::CommitFailed {
            summary: Box::new(CommitSummary {
                outcome: CommitOutcome::Fail,
                job_id: 5,
                success: false,
                messages: vec!["Validation Error".into()],
                devices: vec![],
            }),
            completed: vec![],
        };
        let failure = Failure::from(&err);
        assert!(failure.failed);
        assert!(!failure.changed);
        assert_eq!(failure.msg, "Commit failed");
        let result = failure.result.unwrap();
        assert_eq!(result["result"], "FAIL");
        assert!(result.get("xml").is_none());
    }

    #[test]
    fn plain_failure_omits_result() {
        let failure = Failure::from(&CoreError::not_found("Device group", "Branch"));
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["msg"], "Device group not found: Branch");
        assert!(json.get("result").is_none());
    }

    #[test]
    fn map_preserves_changed() {
        let report = Report::new(true, vec![1, 2]).map(|v| v.len());
        assert_eq!(report, Report::new(true, 2));
    }
}
