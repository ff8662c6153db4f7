use std::{io::Write, time::Instant};

use chrono::NaiveDate;
use tracing::info;

use crate::analysis::{
    death_rates, location_series, select_top_n, DeathRates, LocationSeries, RankedLocation,
};
use crate::config::Config;
use crate::error::{Result, TrackerError};
use crate::process::{load::load_csv, prepare_table};
use crate::render::{render_all, ChartSink};
use crate::report;

/// Everything the run derived, returned for callers that want more than
/// the printed report and the charts.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub latest_date: NaiveDate,
    pub ranked: Vec<RankedLocation>,
    pub series: Vec<LocationSeries>,
    pub death_rates: DeathRates,
}

/// load → explore → project → rank → aggregate → render → report.
///
/// Stops at the first failing stage; whatever was already written to `out`
/// or `sink` stays there.
pub fn run(
    config: &Config,
    sink: &mut dyn ChartSink,
    out: &mut dyn Write,
) -> Result<RunSummary> {
    config.validate()?;
    let start = Instant::now();

    // ─── 1) load ────────────────────────────────────────────────────
    writeln!(out, "Loading data... This may take a few seconds.")
        .map_err(TrackerError::Report)?;
    let raw = load_csv(&config.input)?;
    report::write_exploration(out, &raw)?;

    // ─── 2) project + type ──────────────────────────────────────────
    let table = prepare_table(&raw)?;
    drop(raw);

    // ─── 3) top-N at the latest date ────────────────────────────────
    let (snapshot, ranked) = select_top_n(&table, &config.ranking_column, config.top_n)?;
    report::write_top(out, &ranked, config.top_n, &config.ranking_column)?;

    // ─── 4) aggregate + render ──────────────────────────────────────
    let series = location_series(&table, &ranked)?;
    let rates = death_rates(&snapshot, &ranked)?;
    render_all(sink, &series, &rates, config.top_n)?;

    // ─── 5) insights ────────────────────────────────────────────────
    report::write_insights(out, &ranked)?;

    info!(
        latest = %snapshot.date,
        locations = ranked.len(),
        warnings = rates.warnings.len(),
        elapsed = ?start.elapsed(),
        "run complete"
    );
    Ok(RunSummary {
        latest_date: snapshot.date,
        ranked,
        series,
        death_rates: rates,
    })
}
