use std::sync::Arc;

use arrow::{
    array::{Array, ArrayRef, Int64Builder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};

use crate::error::{Result, TrackerError};
use crate::process::{schema::string_column, utils};

/// Convert the named text columns into nullable `Int64` columns.
/// Columns not listed are passed through untouched.
pub fn convert_counts(batch: &RecordBatch, count_columns: &[&str]) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields = Vec::with_capacity(batch.num_columns());
    let mut out = Vec::with_capacity(batch.num_columns());

    for (arr, fld) in batch.columns().iter().zip(schema.fields()) {
        let name = fld.name().as_str();
        if !count_columns.contains(&name) {
            fields.push(fld.as_ref().clone());
            out.push(arr.clone());
            continue;
        }

        let sarr = string_column(batch, name)?;
        let mut b = Int64Builder::with_capacity(sarr.len());
        for (row, raw) in sarr.iter().enumerate() {
            match utils::non_empty(raw) {
                None => b.append_null(),
                Some(v) => {
                    let n = utils::parse_count(v).ok_or_else(|| TrackerError::InvalidNumber {
                        column: name.to_string(),
                        row,
                        value: v.to_string(),
                    })?;
                    b.append_value(n);
                }
            }
        }
        fields.push(Field::new(name, DataType::Int64, true));
        out.push(Arc::new(b.finish()) as ArrayRef);
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), out).map_err(Into::into)
}
