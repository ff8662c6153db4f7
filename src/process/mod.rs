// src/process/mod.rs
pub mod convert;
pub mod date_parser;
pub mod load;
pub mod schema;
pub mod utils;

use arrow::record_batch::RecordBatch;
use tracing::info;

use crate::error::Result;

pub const LOCATION: &str = "location";
pub const DATE: &str = "date";

/// Integer columns of a projected table.
pub const COUNT_COLUMNS: &[&str] = &[
    "total_cases",
    "total_deaths",
    "new_cases",
    "new_deaths",
    "population",
];

/// Columns kept from the raw table, in output order.
pub const REQUIRED_COLUMNS: &[&str] = &[
    LOCATION,
    DATE,
    "total_cases",
    "total_deaths",
    "new_cases",
    "new_deaths",
    "population",
];

/// Project the raw table onto [`REQUIRED_COLUMNS`] and type it: `date`
/// becomes `Date32`, the count columns become `Int64`.
pub fn prepare_table(raw: &RecordBatch) -> Result<RecordBatch> {
    let projected = schema::project_columns(raw, REQUIRED_COLUMNS, DATE)?;
    let typed = convert::convert_counts(&projected, COUNT_COLUMNS)?;
    info!(rows = typed.num_rows(), "prepared table");
    Ok(typed)
}
