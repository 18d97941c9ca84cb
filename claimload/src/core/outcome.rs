//! Outcome status, per-row states and the outcome record.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::row::UploadRow;
use crate::utils::{now_utc, Timestamp};

/// Detail recorded when the item already carries the value.
pub const DETAIL_ALREADY_PRESENT: &str = "already present";

/// Detail recorded when the claim was created.
pub const DETAIL_CLAIM_ADDED: &str = "claim added";

/// Which ledger an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The item carries the claim after this row.
    Success,
    /// The claim was not written; the row belongs in the retry file.
    Failure,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// Where a row is in its pipeline.
///
/// `Pending -> Checked -> {Skipped | TokenFetched -> {WriteSucceeded |
/// WriteFailed} | TokenFailed}`; `Rejected`, `CheckFailed` and `Redirected`
/// end the row before a token is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowState {
    /// Row has not been looked at yet.
    #[default]
    Pending,
    /// Existing claims were read and the value is absent.
    Checked,
    /// The value was already present; nothing written.
    Skipped,
    /// An edit token is in hand.
    TokenFetched,
    /// The claim was created.
    WriteSucceeded,
    /// The write request did not create a claim.
    WriteFailed,
    /// No usable edit token could be obtained.
    TokenFailed,
    /// Row failed local validation; no remote call made.
    Rejected,
    /// Reading the existing claims failed.
    CheckFailed,
    /// The item is a redirect to another item.
    Redirected,
}

impl fmt::Display for RowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Checked => "checked",
            Self::Skipped => "skipped",
            Self::TokenFetched => "token_fetched",
            Self::WriteSucceeded => "write_succeeded",
            Self::WriteFailed => "write_failed",
            Self::TokenFailed => "token_failed",
            Self::Rejected => "rejected",
            Self::CheckFailed => "check_failed",
            Self::Redirected => "redirected",
        };
        f.write_str(s)
    }
}

impl RowState {
    /// Returns true if the row cannot advance any further.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Checked | Self::TokenFetched)
    }

    /// The ledger a terminal state is recorded in.
    ///
    /// Returns `None` for non-terminal states.
    #[must_use]
    pub fn outcome_status(&self) -> Option<OutcomeStatus> {
        match self {
            Self::Skipped | Self::WriteSucceeded => Some(OutcomeStatus::Success),
            Self::WriteFailed
            | Self::TokenFailed
            | Self::Rejected
            | Self::CheckFailed
            | Self::Redirected => Some(OutcomeStatus::Failure),
            Self::Pending | Self::Checked | Self::TokenFetched => None,
        }
    }

    /// Returns true if a write request was sent for the row.
    #[must_use]
    pub fn wrote(&self) -> bool {
        matches!(self, Self::WriteSucceeded | Self::WriteFailed)
    }
}

/// The single result recorded for an input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// Target item identifier.
    pub item_id: String,
    /// External URI from the input row.
    pub external_uri: String,
    /// Which ledger the record belongs to.
    pub status: OutcomeStatus,
    /// Terminal state that produced the record.
    pub state: RowState,
    /// Human-readable explanation.
    pub detail: String,
    /// When the outcome was decided.
    pub timestamp: Timestamp,
}

impl OutcomeRecord {
    /// Creates the record for `row` ending in `state`.
    ///
    /// # Panics
    ///
    /// Panics if `state` is not terminal.
    #[must_use]
    pub fn new(row: &UploadRow, state: RowState, detail: impl Into<String>) -> Self {
        let status = state
            .outcome_status()
            .unwrap_or_else(|| panic!("row state {state} is not terminal"));
        Self {
            item_id: row.item_id.clone(),
            external_uri: row.external_uri.clone(),
            status,
            state,
            detail: detail.into(),
            timestamp: now_utc(),
        }
    }

    /// Record for a row whose value was already on the item.
    #[must_use]
    pub fn already_present(row: &UploadRow) -> Self {
        Self::new(row, RowState::Skipped, DETAIL_ALREADY_PRESENT)
    }

    /// Record for a row whose claim was created.
    #[must_use]
    pub fn claim_added(row: &UploadRow) -> Self {
        Self::new(row, RowState::WriteSucceeded, DETAIL_CLAIM_ADDED)
    }

    /// Returns true if this is a success record.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }

    /// The row this record was produced for.
    #[must_use]
    pub fn row(&self) -> UploadRow {
        UploadRow {
            item_id: self.item_id.clone(),
            external_uri: self.external_uri.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> UploadRow {
        UploadRow::new("Q100", "https://lux.example/data/person/1")
    }

    #[test]
    fn test_outcome_status_display() {
        assert_eq!(OutcomeStatus::Success.to_string(), "success");
        assert_eq!(OutcomeStatus::Failure.to_string(), "failure");
    }

    #[test]
    fn test_terminal_states_map_to_one_ledger() {
        let terminal = [
            RowState::Skipped,
            RowState::WriteSucceeded,
            RowState::WriteFailed,
            RowState::TokenFailed,
            RowState::Rejected,
            RowState::CheckFailed,
            RowState::Redirected,
        ];
        for state in terminal {
            assert!(state.is_terminal(), "{state}");
            assert!(state.outcome_status().is_some(), "{state}");
        }

        for state in [RowState::Pending, RowState::Checked, RowState::TokenFetched] {
            assert!(!state.is_terminal());
            assert_eq!(state.outcome_status(), None);
        }
    }

    #[test]
    fn test_wrote_only_after_write() {
        assert!(RowState::WriteSucceeded.wrote());
        assert!(RowState::WriteFailed.wrote());
        assert!(!RowState::Skipped.wrote());
        assert!(!RowState::TokenFailed.wrote());
    }

    #[test]
    fn test_constructors() {
        let added = OutcomeRecord::claim_added(&row());
        assert!(added.is_success());
        assert_eq!(added.detail, "claim added");
        assert_eq!(added.state, RowState::WriteSucceeded);

        let present = OutcomeRecord::already_present(&row());
        assert!(present.is_success());
        assert_eq!(present.detail, "already present");

        let failed = OutcomeRecord::new(&row(), RowState::TokenFailed, "403 Forbidden");
        assert_eq!(failed.status, OutcomeStatus::Failure);
        assert_eq!(failed.row(), row());
    }

    #[test]
    #[should_panic(expected = "not terminal")]
    fn test_non_terminal_state_panics() {
        let _ = OutcomeRecord::new(&row(), RowState::Checked, "");
    }

    #[test]
    fn test_row_state_serialize() {
        let json = serde_json::to_string(&RowState::TokenFailed).unwrap();
        assert_eq!(json, r#""token_failed""#);
    }
}
