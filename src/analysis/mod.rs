pub mod aggregate;
pub mod top_n;

use arrow::{
    array::{Array, AsArray, Date32Array, Int64Array, StringArray},
    datatypes::{Date32Type, Int64Type},
    record_batch::RecordBatch,
};

use crate::error::{Result, TrackerError};

pub use aggregate::{
    death_rate, death_rates, location_series, ComputationWarning, DeathRate, DeathRates,
    LocationSeries, SeriesPoint, UndefinedRate,
};
pub use top_n::{latest_snapshot, rank_locations, select_top_n, RankedLocation, Snapshot};

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a dyn Array> {
    batch
        .column_by_name(name)
        .map(|c| c.as_ref())
        .ok_or_else(|| TrackerError::MissingColumns(vec![name.to_string()]))
}

fn type_error(name: &str, expected: &'static str, col: &dyn Array) -> TrackerError {
    TrackerError::ColumnType {
        column: name.to_string(),
        expected,
        found: col.data_type().to_string(),
    }
}

pub(crate) fn text_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    let col = column(batch, name)?;
    col.as_string_opt::<i32>()
        .ok_or_else(|| type_error(name, "Utf8", col))
}

pub(crate) fn date_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Date32Array> {
    let col = column(batch, name)?;
    col.as_primitive_opt::<Date32Type>()
        .ok_or_else(|| type_error(name, "Date32", col))
}

pub(crate) fn int_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Int64Array> {
    let col = column(batch, name)?;
    col.as_primitive_opt::<Int64Type>()
        .ok_or_else(|| type_error(name, "Int64", col))
}
