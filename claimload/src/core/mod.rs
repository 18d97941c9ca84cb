//! Core row and outcome types.

mod outcome;
mod row;

pub use outcome::{
    OutcomeRecord, OutcomeStatus, RowState, DETAIL_ALREADY_PRESENT, DETAIL_CLAIM_ADDED,
};
pub use row::{is_item_id, is_property_id, RowRejection, UploadRow, ValueFormat};
