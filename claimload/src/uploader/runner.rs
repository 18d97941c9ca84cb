//! The sequential upload loop.

use tracing::{debug, info, warn};

use super::report::RunReport;
use crate::api::ClaimApi;
use crate::config::UploaderConfig;
use crate::core::{OutcomeRecord, RowState, UploadRow};
use crate::errors::Result;
use crate::ledger::OutcomeSink;
use crate::observability::CallTimer;
use crate::utils::generate_run_id;

/// A row's outcome plus what the loop needs to know about how it ended.
#[derive(Debug, Clone)]
pub struct ProcessedRow {
    /// The outcome to record.
    pub record: OutcomeRecord,
    /// Redirect target, when the item turned out to be a redirect.
    pub redirect_to: Option<String>,
    /// Whether any remote call was made for the row.
    pub contacted_remote: bool,
}

impl ProcessedRow {
    fn local(record: OutcomeRecord) -> Self {
        Self {
            record,
            redirect_to: None,
            contacted_remote: false,
        }
    }

    fn remote(record: OutcomeRecord) -> Self {
        Self {
            record,
            redirect_to: None,
            contacted_remote: true,
        }
    }
}

/// Drives rows through check, token fetch and write, one at a time.
#[derive(Debug)]
pub struct Uploader<A> {
    api: A,
    config: UploaderConfig,
}

impl<A: ClaimApi> Uploader<A> {
    /// Creates an uploader over `api`.
    #[must_use]
    pub fn new(api: A, config: UploaderConfig) -> Self {
        Self { api, config }
    }

    /// The API client in use.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    /// Processes every row in order and records each outcome in `sink`.
    ///
    /// Row-level errors never stop the loop. An error from `sink` does,
    /// since the outcome it was carrying would be lost.
    pub async fn run<S>(&self, rows: &[UploadRow], sink: &mut S) -> Result<RunReport>
    where
        S: OutcomeSink + ?Sized,
    {
        let run_id = generate_run_id();
        let total = rows.len();
        let pacing = self.config.pacing();
        let mut report = RunReport::new(run_id);

        info!(
            %run_id,
            rows = total,
            property = %self.config.property_id,
            api_base = %self.config.api_base,
            pacing_seconds = self.config.pacing_seconds,
            "Upload run started"
        );

        for (idx, row) in rows.iter().enumerate() {
            let timer = CallTimer::start(row.item_id.as_str());
            let processed = self.process_row(row).await;

            if let Some(ref target) = processed.redirect_to {
                sink.record_redirect(&row.item_id, target)?;
            }
            sink.record(&processed.record)?;
            log_outcome(idx + 1, total, &processed.record, timer.finish());
            report.push(processed.record);

            let more_rows = idx + 1 < total;
            if more_rows && processed.contacted_remote && !pacing.is_zero() {
                tokio::time::sleep(pacing).await;
            }
        }

        report.finish();
        info!(
            %run_id,
            total = report.total(),
            succeeded = report.successes.len(),
            failed = report.failures.len(),
            added = report.added(),
            already_present = report.already_present(),
            "Upload run finished"
        );
        Ok(report)
    }

    /// Takes one row to a terminal state.
    pub async fn process_row(&self, row: &UploadRow) -> ProcessedRow {
        let item_id = row.item_id.as_str();
        let property_id = self.config.property_id.as_str();

        let value = match row.claim_value(self.config.value_format) {
            Ok(value) => value,
            Err(rejection) => {
                return ProcessedRow::local(OutcomeRecord::new(
                    row,
                    RowState::Rejected,
                    rejection.to_string(),
                ));
            }
        };

        let claims = match self.api.existing_claims(item_id, property_id).await {
            Ok(claims) => claims,
            Err(e) => {
                // Pacing only applies if the request could have reached the API.
                return ProcessedRow {
                    contacted_remote: e.is_remote(),
                    ..ProcessedRow::local(OutcomeRecord::new(
                        row,
                        RowState::CheckFailed,
                        format!("claim check failed: {e}"),
                    ))
                };
            }
        };

        if let Some(target) = claims.redirect_to {
            return ProcessedRow {
                record: OutcomeRecord::new(row, RowState::Redirected, format!("redirected to {target}")),
                redirect_to: Some(target),
                contacted_remote: true,
            };
        }
        if claims.missing {
            return ProcessedRow::remote(OutcomeRecord::new(
                row,
                RowState::CheckFailed,
                "item does not exist",
            ));
        }
        if claims.contains(&value) {
            return ProcessedRow::remote(OutcomeRecord::already_present(row));
        }
        debug!(item_id, state = %RowState::Checked, existing = claims.values.len(), "Value absent");

        let token = match self.api.edit_token().await {
            Ok(token) => token,
            Err(e) => {
                return ProcessedRow::remote(OutcomeRecord::new(
                    row,
                    RowState::TokenFailed,
                    e.to_string(),
                ));
            }
        };
        debug!(item_id, state = %RowState::TokenFetched, "Edit token obtained");

        match self.api.create_claim(item_id, property_id, &value, &token).await {
            Ok(created) => {
                debug!(
                    item_id,
                    claim_id = %created.claim_id,
                    revision = ?created.last_revision,
                    "Claim created"
                );
                ProcessedRow::remote(OutcomeRecord::claim_added(row))
            }
            Err(e) => ProcessedRow::remote(OutcomeRecord::new(row, RowState::WriteFailed, e.to_string())),
        }
    }
}

fn log_outcome(position: usize, total: usize, record: &OutcomeRecord, duration_ms: f64) {
    let progress = format!("{position}/{total}");
    if record.is_success() {
        info!(
            %progress,
            item_id = %record.item_id,
            outcome = %record.status,
            state = %record.state,
            detail = %record.detail,
            duration_ms,
            "Row succeeded"
        );
    } else {
        warn!(
            %progress,
            item_id = %record.item_id,
            outcome = %record.status,
            state = %record.state,
            detail = %record.detail,
            duration_ms,
            "Row failed"
        );
    }
}
