//! Ready-made rows, configs and input files for tests.

use std::io::Write;
use std::path::Path;

use crate::config::{RunPaths, UploaderConfig};
use crate::core::UploadRow;
use crate::errors::Result;

/// A row for item `Q<n>` pointing at a LUX person record.
#[must_use]
pub fn lux_row(n: u32) -> UploadRow {
    UploadRow::new(format!("Q{n}"), format!("https://lux.example/data/person/{n}"))
}

/// Rows `Q1..=Qcount`.
#[must_use]
pub fn lux_rows(count: u32) -> Vec<UploadRow> {
    (1..=count).map(lux_row).collect()
}

/// Default configuration with pacing switched off.
#[must_use]
pub fn unpaced_config() -> UploaderConfig {
    UploaderConfig::new().with_pacing(0.0)
}

/// Writes `rows` as a `QID,LUX_URI` input table at `path`.
pub fn write_input(path: &Path, rows: &[UploadRow]) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "QID,LUX_URI")?;
    for row in rows {
        writeln!(file, "{},{}", row.item_id, row.external_uri)?;
    }
    Ok(())
}

/// Standard file layout inside `dir`.
#[must_use]
pub fn run_paths(dir: &Path) -> RunPaths {
    RunPaths::new(
        dir.join("lux_uris.csv"),
        dir.join("lux_upload_success.csv"),
        dir.join("lux_upload_failures.csv"),
    )
    .with_redirect_log(dir.join("wikidata_redirects.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::read_rows;

    #[test]
    fn test_lux_rows() {
        let rows = lux_rows(3);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], UploadRow::new("Q3", "https://lux.example/data/person/3"));
    }

    #[test]
    fn test_write_input_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let paths = run_paths(dir.path());
        write_input(&paths.input, &lux_rows(2)).unwrap();
        assert_eq!(read_rows(&paths.input).unwrap(), lux_rows(2));
    }
}
