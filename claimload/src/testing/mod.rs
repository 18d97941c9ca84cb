//! Testing utilities for upload runs.
//!
//! This module provides:
//! - A scripted, stateful API double
//! - Row, config and file fixtures

mod fixtures;
mod mocks;

pub use fixtures::{lux_row, lux_rows, run_paths, unpaced_config, write_input};
pub use mocks::{ApiCall, ApiFailure, ScriptedClaimApi};
