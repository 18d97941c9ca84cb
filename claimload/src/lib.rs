//! # Claimload
//!
//! Batch uploader that adds one external-identifier claim per row to
//! Wikibase items through the OAuth1-signed Action API.
//!
//! Each row goes through a fixed sequence:
//!
//! - **Check**: read the item's current values for the property
//! - **Token**: fetch a fresh CSRF edit token
//! - **Write**: create the claim with `wbcreateclaim`
//! - **Record**: append the outcome to the success or failure ledger
//!
//! Rows are processed one at a time with a fixed pause between them.
//! Rows that already carry the value are recorded as successes without a
//! write, so a run can be repeated over the same input.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use claimload::prelude::*;
//!
//! let config = UploaderConfig::new();
//! let paths = RunPaths::new("lux_uris.csv", "lux_upload_success.csv", "lux_upload_failures.csv");
//! let client = WikibaseClient::new(&config, &Credentials::from_env()?)?;
//!
//! let rows = read_rows(&paths.input)?;
//! let mut ledger = CsvLedger::open(&paths)?;
//! let report = Uploader::new(client, config).run(&rows, &mut ledger).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cast_precision_loss
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod api;
pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod observability;
pub mod testing;
pub mod uploader;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::api::{ClaimApi, CreatedClaim, EditToken, EntityClaims, WikibaseClient};
    pub use crate::config::{Credentials, RunPaths, UploaderConfig};
    pub use crate::core::{OutcomeRecord, OutcomeStatus, RowState, UploadRow, ValueFormat};
    pub use crate::errors::{ClaimloadError, Result};
    pub use crate::ledger::{
        read_rows, recorded_item_ids, without_recorded, CsvLedger, MemoryLedger, OutcomeSink,
    };
    pub use crate::observability::{init_logging, LogFormat};
    pub use crate::uploader::{RunReport, Uploader};
    pub use crate::utils::{format_timestamp, generate_run_id, Timestamp};
}
