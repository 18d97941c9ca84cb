//! Reading the input table and previously written ledgers.

use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::core::{is_item_id, UploadRow};
use crate::errors::{ClaimloadError, Result};

fn looks_like_item_id(cell: &str) -> bool {
    let mut chars = cell.chars();
    matches!(chars.next(), Some('Q' | 'q')) && chars.next().is_some_and(|c| c.is_ascii_digit())
}

const KNOWN_ID_COLUMNS: [&str; 4] = ["qid", "item_id", "item", "id"];

/// A header names its columns; a data row, even a bad one, carries a URI.
fn looks_like_header(record: &StringRecord) -> bool {
    !looks_like_item_id(cell(record, 0)) && !cell(record, 1).contains("://")
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader)
}

fn cell(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or_default()
}

/// Parses rows from any two-column CSV source.
///
/// A first record is taken as the header when its first cell does not look
/// like an item ID and its second cell is not a URI. Columns past the
/// second are ignored, so a failure ledger is valid input. Every other
/// record becomes a row, even a malformed one, so that it gets an outcome.
pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<UploadRow>> {
    let mut rdr = csv_reader(reader);
    let mut rows = Vec::new();

    for (idx, record) in rdr.records().enumerate() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let item_id = cell(&record, 0);
        if idx == 0 && looks_like_header(&record) {
            if KNOWN_ID_COLUMNS.contains(&item_id.to_ascii_lowercase().as_str()) {
                debug!(header = ?record, "Skipping header row");
            } else {
                warn!(cells = ?record, "First row treated as header and skipped");
            }
            continue;
        }
        rows.push(UploadRow::new(item_id, cell(&record, 1)));
    }

    Ok(rows)
}

/// Reads all rows from the input file at `path`.
pub fn read_rows(path: &Path) -> Result<Vec<UploadRow>> {
    let file = File::open(path).map_err(|e| ClaimloadError::input(path.display(), e.to_string()))?;
    parse_rows(file).map_err(|e| ClaimloadError::input(path.display(), e.to_string()))
}

/// Collects the item IDs already recorded in a ledger file.
///
/// A ledger that does not exist yet has recorded nothing.
pub fn recorded_item_ids(path: &Path) -> Result<HashSet<String>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Ledger not found; nothing recorded yet");
            return Ok(HashSet::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut ids = HashSet::new();
    for record in csv_reader(file).records() {
        let record = record?;
        let item_id = cell(&record, 0);
        if is_item_id(item_id) {
            ids.insert(item_id.to_string());
        }
    }
    Ok(ids)
}

/// Drops rows whose item is in `recorded`, keeping input order.
///
/// Returns the remaining rows and how many were dropped.
#[must_use]
pub fn without_recorded(rows: Vec<UploadRow>, recorded: &HashSet<String>) -> (Vec<UploadRow>, usize) {
    let before = rows.len();
    let remaining: Vec<UploadRow> = rows
        .into_iter()
        .filter(|row| !recorded.contains(&row.item_id))
        .collect();
    let dropped = before - remaining.len();
    (remaining, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_parse_rows_with_header() {
        let input = "QID,LUX_URI\nQ100,https://lux.example/data/person/1\nQ200,https://lux.example/data/place/2\n";
        let rows = parse_rows(input.as_bytes()).unwrap();
        assert_eq!(
            rows,
            vec![
                UploadRow::new("Q100", "https://lux.example/data/person/1"),
                UploadRow::new("Q200", "https://lux.example/data/place/2"),
            ]
        );
    }

    #[test]
    fn test_parse_rows_without_header() {
        let input = "Q100,https://lux.example/data/person/1\n";
        let rows = parse_rows(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].item_id, "Q100");
    }

    #[test]
    fn test_parse_rows_malformed_first_row_is_not_a_header() {
        let input = "X7,https://lux.example/data/person/7\nQ2,https://lux.example/data/person/2\n";
        let rows = parse_rows(input.as_bytes()).unwrap();
        assert_eq!(
            rows,
            vec![
                UploadRow::new("X7", "https://lux.example/data/person/7"),
                UploadRow::new("Q2", "https://lux.example/data/person/2"),
            ]
        );
    }

    #[test]
    fn test_parse_rows_custom_header_names() {
        let input = "wikidata,lux\nQ2,https://lux.example/data/person/2\n";
        let rows = parse_rows(input.as_bytes()).unwrap();
        assert_eq!(rows, vec![UploadRow::new("Q2", "https://lux.example/data/person/2")]);
    }

    #[test]
    fn test_parse_rows_accepts_failure_ledger() {
        let input = "item_id,external_uri,detail,timestamp\n\
                     Q5,https://lux.example/data/person/5,403 Forbidden,2024-05-01T09:30:00+00:00\n";
        let rows = parse_rows(input.as_bytes()).unwrap();
        assert_eq!(rows, vec![UploadRow::new("Q5", "https://lux.example/data/person/5")]);
    }

    #[test]
    fn test_parse_rows_keeps_malformed_rows() {
        let input = "QID,LUX_URI\nQ1\nnot-an-id,https://lux.example/data/x\n\nQ3 , https://lux.example/data/y \n";
        let rows = parse_rows(input.as_bytes()).unwrap();
        assert_eq!(
            rows,
            vec![
                UploadRow::new("Q1", ""),
                UploadRow::new("not-an-id", "https://lux.example/data/x"),
                UploadRow::new("Q3", "https://lux.example/data/y"),
            ]
        );
    }

    #[test]
    fn test_read_rows_missing_file_is_input_error() {
        let err = read_rows(Path::new("/nonexistent/claimload/rows.csv")).unwrap_err();
        assert!(matches!(err, ClaimloadError::Input { .. }));
    }

    #[test]
    fn test_recorded_item_ids() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "item_id,external_uri,detail,timestamp").unwrap();
        writeln!(file, "Q1,https://lux.example/data/a,claim added,2024-05-01T09:30:00+00:00").unwrap();
        writeln!(file, "Q2,https://lux.example/data/b,already present,2024-05-01T09:30:05+00:00").unwrap();
        file.flush().unwrap();

        let ids = recorded_item_ids(file.path()).unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("Q1"));
        assert!(ids.contains("Q2"));
    }

    #[test]
    fn test_recorded_item_ids_missing_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let ids = recorded_item_ids(&dir.path().join("none.csv")).unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn test_without_recorded() {
        let rows = vec![
            UploadRow::new("Q1", "a"),
            UploadRow::new("Q2", "b"),
            UploadRow::new("Q3", "c"),
        ];
        let recorded: HashSet<String> = ["Q2".to_string()].into_iter().collect();
        let (remaining, dropped) = without_recorded(rows, &recorded);
        assert_eq!(dropped, 1);
        assert_eq!(
            remaining.iter().map(|r| r.item_id.as_str()).collect::<Vec<_>>(),
            vec!["Q1", "Q3"]
        );
    }
}
