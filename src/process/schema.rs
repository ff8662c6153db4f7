use std::sync::Arc;

use arrow::{
    array::{Array, ArrayRef, AsArray, Date32Array, StringArray},
    datatypes::{DataType, Date32Type, Field, Schema},
    record_batch::RecordBatch,
};
use tracing::debug;

use crate::error::{Result, TrackerError};
use crate::process::{date_parser, utils};

/// Per-column summary of a raw table, as inferred from its text values.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub position: usize,
    pub name: String,
    pub non_null: usize,
    pub dtype: DataType,
}

/// Borrow a column as text, failing with a schema error otherwise.
pub fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| TrackerError::MissingColumns(vec![name.to_string()]))?;
    col.as_string_opt::<i32>()
        .ok_or_else(|| TrackerError::ColumnType {
            column: name.to_string(),
            expected: "Utf8",
            found: col.data_type().to_string(),
        })
}

/// Infer each column's type from every non-empty value it holds.
pub fn analyze_columns(batch: &RecordBatch) -> Vec<ColumnInfo> {
    let schema = batch.schema();
    schema
        .fields()
        .iter()
        .enumerate()
        .map(|(position, field)| {
            let col = batch.column(position);
            let (non_null, dtype) = match col.as_string_opt::<i32>() {
                Some(sarr) => {
                    let mut non_null = 0;
                    let mut dtype = DataType::Null;
                    for v in sarr.iter().filter_map(utils::non_empty) {
                        non_null += 1;
                        if dtype != DataType::Utf8 {
                            dtype = utils::widen(&dtype, &utils::infer_dtype_from_str(v));
                        }
                    }
                    if dtype == DataType::Null {
                        dtype = DataType::Utf8;
                    }
                    (non_null, dtype)
                }
                None => (col.len() - col.null_count(), col.data_type().clone()),
            };
            ColumnInfo {
                position,
                name: field.name().clone(),
                non_null,
                dtype,
            }
        })
        .collect()
}

/// Missing (null or blank) value count for the first `limit` columns.
pub fn missing_counts(batch: &RecordBatch, limit: usize) -> Vec<(String, usize)> {
    analyze_columns(batch)
        .into_iter()
        .take(limit)
        .map(|info| (info.name, batch.num_rows() - info.non_null))
        .collect()
}

/// Restrict `batch` to `columns` (in that order) and parse `date_column`
/// into `Date32`. The date column is appended when `columns` omits it.
///
/// Every absent column is reported at once. A blank or unparseable date
/// fails the whole projection.
pub fn project_columns(
    batch: &RecordBatch,
    columns: &[&str],
    date_column: &str,
) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut wanted: Vec<&str> = columns.to_vec();
    if !wanted.contains(&date_column) {
        wanted.push(date_column);
    }

    let missing: Vec<String> = wanted
        .iter()
        .filter(|c| schema.index_of(c).is_err())
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(TrackerError::MissingColumns(missing));
    }

    let mut fields = Vec::with_capacity(wanted.len());
    let mut out: Vec<ArrayRef> = Vec::with_capacity(wanted.len());
    for name in wanted {
        let idx = schema.index_of(name)?;
        if name == date_column {
            let dates = parse_date_column(batch, name)?;
            fields.push(Field::new(name, DataType::Date32, false));
            out.push(Arc::new(dates) as ArrayRef);
        } else {
            fields.push(schema.field(idx).clone());
            out.push(batch.column(idx).clone());
        }
    }
    debug!(columns = fields.len(), rows = batch.num_rows(), "projected");

    RecordBatch::try_new(Arc::new(Schema::new(fields)), out).map_err(Into::into)
}

fn parse_date_column(batch: &RecordBatch, name: &str) -> Result<Date32Array> {
    let sarr = string_column(batch, name)?;
    let mut days = Vec::with_capacity(sarr.len());
    for (row, raw) in sarr.iter().enumerate() {
        let date = utils::non_empty(raw)
            .and_then(date_parser::parse_date)
            .ok_or_else(|| TrackerError::InvalidDate {
                column: name.to_string(),
                row,
                value: raw.unwrap_or_default().to_string(),
            })?;
        days.push(Date32Type::from_naive_date(date));
    }
    Ok(Date32Array::from(days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::NaiveDate;

    fn raw_batch(cols: &[(&str, Vec<Option<&str>>)]) -> RecordBatch {
        let fields: Vec<Field> = cols
            .iter()
            .map(|(n, _)| Field::new(*n, DataType::Utf8, true))
            .collect();
        let arrays: Vec<ArrayRef> = cols
            .iter()
            .map(|(_, v)| Arc::new(StringArray::from(v.clone())) as ArrayRef)
            .collect();
        RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).unwrap()
    }

    #[test]
    fn projects_requested_columns_and_types_date() {
        let batch = raw_batch(&[
            ("iso_code", vec![Some("PER"), Some("CHL")]),
            ("date", vec![Some("2021-01-02"), Some("2021/01/03")]),
            ("location", vec![Some("Peru"), Some("Chile")]),
            ("total_cases", vec![Some("10"), None]),
        ]);
        let out = project_columns(&batch, &["location", "date", "total_cases"], "date").unwrap();

        let names: Vec<&str> = out
            .schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect();
        assert_eq!(names, vec!["location", "date", "total_cases"]);
        assert_eq!(out.schema().field(1).data_type(), &DataType::Date32);
        assert_eq!(out.schema().field(2).data_type(), &DataType::Utf8);

        let dates = out.column(1).as_primitive::<Date32Type>();
        assert_eq!(
            dates.value_as_date(1),
            NaiveDate::from_ymd_opt(2021, 1, 3)
        );
    }

    #[test]
    fn reports_every_missing_column() {
        let batch = raw_batch(&[("location", vec![Some("Peru")])]);
        let err =
            project_columns(&batch, &["location", "total_cases", "date"], "date").unwrap_err();
        match &err {
            TrackerError::MissingColumns(cols) => {
                assert_eq!(cols, &vec!["total_cases".to_string(), "date".to_string()])
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn bad_date_fails_fast() {
        let batch = raw_batch(&[
            ("location", vec![Some("Peru"), Some("Peru")]),
            ("date", vec![Some("2021-01-02"), Some("soon")]),
        ]);
        let err = project_columns(&batch, &["location", "date"], "date").unwrap_err();
        match err {
            TrackerError::InvalidDate { row, value, .. } => {
                assert_eq!(row, 1);
                assert_eq!(value, "soon");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_date_fails_fast() {
        let batch = raw_batch(&[("date", vec![None])]);
        let err = project_columns(&batch, &["date"], "date").unwrap_err();
        assert!(matches!(err, TrackerError::InvalidDate { row: 0, .. }));
    }

    #[test]
    fn infers_column_info_and_missing_counts() {
        let batch = raw_batch(&[
            ("location", vec![Some("Peru"), Some("Chile"), Some("Peru")]),
            ("date", vec![Some("2021-01-01"), Some("2021-01-01"), Some("2021-01-02")]),
            ("total_cases", vec![Some("1"), None, Some("3")]),
            ("reproduction_rate", vec![Some("1.1"), Some("2"), Some(" ")]),
            ("tests_units", vec![None, None, None]),
        ]);
        let info = analyze_columns(&batch);
        let dtypes: Vec<DataType> = info.iter().map(|c| c.dtype.clone()).collect();
        assert_eq!(
            dtypes,
            vec![
                DataType::Utf8,
                DataType::Date32,
                DataType::Int64,
                DataType::Float64,
                DataType::Utf8
            ]
        );
        assert_eq!(info[2].non_null, 2);

        let missing = missing_counts(&batch, 4);
        assert_eq!(missing.len(), 4);
        assert_eq!(missing[2], ("total_cases".to_string(), 1));
        assert_eq!(missing[3], ("reproduction_rate".to_string(), 1));
    }
}
