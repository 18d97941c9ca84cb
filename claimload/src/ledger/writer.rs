//! Outcome sinks: the CSV ledgers and an in-memory collector.

use csv::{Writer, WriterBuilder};
use std::fs::File;
use std::path::Path;

use crate::config::RunPaths;
use crate::core::{OutcomeRecord, OutcomeStatus};
use crate::errors::Result;
use crate::observability::open_append;
use crate::utils::format_timestamp;

/// Header of the success and failure ledgers.
pub const OUTCOME_HEADER: [&str; 4] = ["item_id", "external_uri", "detail", "timestamp"];

/// Header of the redirect ledger.
pub const REDIRECT_HEADER: [&str; 2] = ["item_id", "redirect_target"];

/// Destination for outcome records as they are decided.
///
/// A failed `record` call is fatal for the run: the outcome it carried
/// would otherwise be lost.
pub trait OutcomeSink {
    /// Appends one outcome to the matching ledger.
    fn record(&mut self, outcome: &OutcomeRecord) -> Result<()>;

    /// Notes that `item_id` redirects to `target`.
    fn record_redirect(&mut self, item_id: &str, target: &str) -> Result<()>;
}

/// Append-mode CSV writer that emits its header only into empty files.
struct LedgerFile {
    writer: Writer<File>,
}

impl LedgerFile {
    fn open(path: &Path, header: &[&str]) -> Result<Self> {
        let file = open_append(path)?;
        let is_empty = file.metadata()?.len() == 0;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        if is_empty {
            writer.write_record(header)?;
            writer.flush()?;
        }
        Ok(Self { writer })
    }

    fn append(&mut self, record: &[&str]) -> Result<()> {
        self.writer.write_record(record)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// The success, failure and optional redirect ledgers of one run.
pub struct CsvLedger {
    success: LedgerFile,
    failure: LedgerFile,
    redirects: Option<LedgerFile>,
}

impl std::fmt::Debug for CsvLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvLedger")
            .field("redirects", &self.redirects.is_some())
            .finish_non_exhaustive()
    }
}

impl CsvLedger {
    /// Opens (or creates) every ledger named in `paths`.
    pub fn open(paths: &RunPaths) -> Result<Self> {
        Ok(Self {
            success: LedgerFile::open(&paths.success_log, &OUTCOME_HEADER)?,
            failure: LedgerFile::open(&paths.failure_log, &OUTCOME_HEADER)?,
            redirects: paths
                .redirect_log
                .as_deref()
                .map(|path| LedgerFile::open(path, &REDIRECT_HEADER))
                .transpose()?,
        })
    }
}

impl OutcomeSink for CsvLedger {
    fn record(&mut self, outcome: &OutcomeRecord) -> Result<()> {
        let timestamp = format_timestamp(&outcome.timestamp);
        let fields = [
            outcome.item_id.as_str(),
            outcome.external_uri.as_str(),
            outcome.detail.as_str(),
            timestamp.as_str(),
        ];
        match outcome.status {
            OutcomeStatus::Success => self.success.append(&fields),
            OutcomeStatus::Failure => self.failure.append(&fields),
        }
    }

    fn record_redirect(&mut self, item_id: &str, target: &str) -> Result<()> {
        match self.redirects {
            Some(ref mut ledger) => ledger.append(&[item_id, target]),
            None => Ok(()),
        }
    }
}

/// A sink that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    outcomes: Vec<OutcomeRecord>,
    redirects: Vec<(String, String)>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All outcomes in the order they were recorded.
    #[must_use]
    pub fn outcomes(&self) -> &[OutcomeRecord] {
        &self.outcomes
    }

    /// Outcomes with the given status.
    #[must_use]
    pub fn with_status(&self, status: OutcomeStatus) -> Vec<&OutcomeRecord> {
        self.outcomes.iter().filter(|o| o.status == status).collect()
    }

    /// Recorded `(item_id, target)` redirect pairs.
    #[must_use]
    pub fn redirects(&self) -> &[(String, String)] {
        &self.redirects
    }
}

impl OutcomeSink for MemoryLedger {
    fn record(&mut self, outcome: &OutcomeRecord) -> Result<()> {
        self.outcomes.push(outcome.clone());
        Ok(())
    }

    fn record_redirect(&mut self, item_id: &str, target: &str) -> Result<()> {
        self.redirects.push((item_id.to_string(), target.to_string()));
        Ok(())
    }
}
