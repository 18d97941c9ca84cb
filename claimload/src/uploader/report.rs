//! Summary of an upload run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{OutcomeRecord, OutcomeStatus, RowState};
use crate::utils::{format_timestamp, now_utc, Timestamp};

/// Outcomes of one `run`, split by ledger, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Identifier attached to this run's log markers.
    pub run_id: Uuid,
    /// Rows that ended in the success ledger.
    pub successes: Vec<OutcomeRecord>,
    /// Rows that ended in the failure ledger.
    pub failures: Vec<OutcomeRecord>,
    /// When the run started.
    pub started_at: Timestamp,
    /// When the last row finished.
    pub finished_at: Option<Timestamp>,
}

impl RunReport {
    /// Creates an empty report starting now.
    #[must_use]
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            successes: Vec::new(),
            failures: Vec::new(),
            started_at: now_utc(),
            finished_at: None,
        }
    }

    /// Files an outcome under its status.
    pub fn push(&mut self, outcome: OutcomeRecord) {
        match outcome.status {
            OutcomeStatus::Success => self.successes.push(outcome),
            OutcomeStatus::Failure => self.failures.push(outcome),
        }
    }

    /// Marks the run as finished.
    pub fn finish(&mut self) {
        self.finished_at = Some(now_utc());
    }

    /// Number of rows processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Number of rows whose value was already present.
    #[must_use]
    pub fn already_present(&self) -> usize {
        self.count_state(RowState::Skipped)
    }

    /// Number of claims created.
    #[must_use]
    pub fn added(&self) -> usize {
        self.count_state(RowState::WriteSucceeded)
    }

    /// Number of rows found to be redirects.
    #[must_use]
    pub fn redirected(&self) -> usize {
        self.count_state(RowState::Redirected)
    }

    /// Number of rows that got as far as a write request.
    #[must_use]
    pub fn writes_attempted(&self) -> usize {
        self.successes
            .iter()
            .chain(self.failures.iter())
            .filter(|o| o.state.wrote())
            .count()
    }

    fn count_state(&self, state: RowState) -> usize {
        self.successes
            .iter()
            .chain(self.failures.iter())
            .filter(|o| o.state == state)
            .count()
    }

    /// Returns true if any row failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Fraction of rows that succeeded.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.successes.len() as f64 / total as f64
    }

    /// Compact JSON summary for logs and the CLI.
    #[must_use]
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "run_id": self.run_id.to_string(),
            "total": self.total(),
            "succeeded": self.successes.len(),
            "failed": self.failures.len(),
            "added": self.added(),
            "already_present": self.already_present(),
            "redirected": self.redirected(),
            "writes_attempted": self.writes_attempted(),
            "success_rate": self.success_rate(),
            "started_at": format_timestamp(&self.started_at),
            "finished_at": self.finished_at.as_ref().map(format_timestamp),
        })
    }
}
