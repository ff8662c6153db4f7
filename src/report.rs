use std::io::{self, Write};

use arrow::{record_batch::RecordBatch, util::pretty::pretty_format_batches};

use crate::analysis::RankedLocation;
use crate::error::{Result, TrackerError};
use crate::process::schema::{analyze_columns, missing_counts};

pub const PREVIEW_ROWS: usize = 5;
pub const MISSING_COLUMNS_SHOWN: usize = 20;

pub const INSIGHTS: [&str; 2] = [
    "Death rate varies between countries despite similar case counts.",
    "New cases trends reveal peaks and declines that may match lockdown or vaccination periods.",
];

fn io_err(e: io::Error) -> TrackerError {
    TrackerError::Report(e)
}

/// `total_cases` → `Total Cases`
pub fn column_title(column: &str) -> String {
    column
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// First rows, schema info and missing-value counts of the raw table.
pub fn write_exploration(out: &mut dyn Write, raw: &RecordBatch) -> Result<()> {
    let head = raw.slice(0, raw.num_rows().min(PREVIEW_ROWS));
    let grid = pretty_format_batches(&[head])?;
    writeln!(out, "\nFirst {PREVIEW_ROWS} rows:\n{grid}").map_err(io_err)?;

    let info = analyze_columns(raw);
    let width = info.iter().map(|c| c.name.len()).max().unwrap_or(0).max(6);
    writeln!(out, "\nDataset Info:").map_err(io_err)?;
    writeln!(out, "{} entries", raw.num_rows()).map_err(io_err)?;
    writeln!(out, "Data columns (total {} columns):", info.len()).map_err(io_err)?;
    writeln!(out, " #   {:<width$}  Non-Null Count  Dtype", "Column").map_err(io_err)?;
    writeln!(out, "---  {:<width$}  --------------  -----", "------").map_err(io_err)?;
    for c in &info {
        writeln!(
            out,
            " {:<3} {:<width$}  {:<14}  {}",
            c.position,
            c.name,
            format!("{} non-null", c.non_null),
            c.dtype
        )
        .map_err(io_err)?;
    }

    writeln!(out, "\nMissing Values:").map_err(io_err)?;
    for (name, missing) in missing_counts(raw, MISSING_COLUMNS_SHOWN) {
        writeln!(out, "{name:<width$}  {missing}").map_err(io_err)?;
    }
    Ok(())
}

pub fn write_top(
    out: &mut dyn Write,
    ranked: &[RankedLocation],
    n: usize,
    ranking_column: &str,
) -> Result<()> {
    let names: Vec<String> = ranked
        .iter()
        .map(|r| format!("'{}'", r.location))
        .collect();
    writeln!(
        out,
        "\nTop {n} Countries by {}: [{}]",
        column_title(ranking_column),
        names.join(", ")
    )
    .map_err(io_err)
}

pub fn write_insights(out: &mut dyn Write, ranked: &[RankedLocation]) -> Result<()> {
    let names: Vec<&str> = ranked.iter().map(|r| r.location.as_str()).collect();
    writeln!(out, "\n📊 Key Insights:").map_err(io_err)?;
    writeln!(
        out,
        "- Countries with the highest cases are {}",
        names.join(", ")
    )
    .map_err(io_err)?;
    for line in INSIGHTS {
        writeln!(out, "- {line}").map_err(io_err)?;
    }
    Ok(())
}
