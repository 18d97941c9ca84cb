//! The per-row upload pipeline and its run report.

mod report;
mod runner;

pub use report::RunReport;
pub use runner::{ProcessedRow, Uploader};
