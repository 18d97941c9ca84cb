//! Utility functions for run identifiers and timestamps.

pub mod timestamps;

pub use timestamps::{format_timestamp, now_utc, Timestamp};

use uuid::Uuid;

/// Generates a new run identifier (UUID v4).
#[must_use]
pub fn generate_run_id() -> Uuid {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_run_id_is_v4() {
        let id = generate_run_id();
        assert_eq!(id.get_version_num(), 4);
    }

    #[test]
    fn test_run_ids_differ() {
        assert_ne!(generate_run_id(), generate_run_id());
    }
}
