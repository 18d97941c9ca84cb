//! CSV input and outcome ledgers.

mod reader;
mod writer;

pub use reader::{parse_rows, read_rows, recorded_item_ids, without_recorded};
pub use writer::{CsvLedger, MemoryLedger, OutcomeSink, OUTCOME_HEADER, REDIRECT_HEADER};
