use std::{fs, io::Cursor, path::Path, sync::Arc, time::Instant};

use arrow::{
    compute::concat_batches,
    csv::ReaderBuilder,
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use tracing::{debug, info};

use crate::error::{Result, TrackerError};

const BATCH_ROWS: usize = 8192;

/// Read a delimited text table with a header row into one all-`Utf8` batch.
///
/// The whole file is buffered first; the handle is closed before parsing.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<RecordBatch> {
    let path = path.as_ref();
    let start = Instant::now();

    let data = fs::read(path).map_err(|source| TrackerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let malformed = |reason: String| TrackerError::Malformed {
        path: path.to_path_buf(),
        reason,
    };

    // 1) header row → column names
    let headers: Vec<String> = {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(Cursor::new(&data));
        rdr.headers()
            .map_err(|e| malformed(e.to_string()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect()
    };
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(malformed("no header row".into()));
    }
    debug!(columns = headers.len(), "parsed header");

    // 2) every column as nullable text; typing happens after projection
    let fields: Vec<Field> = headers
        .iter()
        .map(|h| Field::new(h, DataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_batch_size(BATCH_ROWS)
        .build(Cursor::new(data))
        .map_err(|e| malformed(e.to_string()))?;

    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch.map_err(|e| malformed(e.to_string()))?);
    }
    let table = concat_batches(&schema, &batches)?;

    info!(
        rows = table.num_rows(),
        columns = table.num_columns(),
        elapsed = ?start.elapsed(),
        "loaded table"
    );
    Ok(table)
}
