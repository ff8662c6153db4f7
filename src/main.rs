use std::{env, io};

use anyhow::{Context, Result};
use covidtrack::{render::SvgSink, Config};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    // stdout carries the report, so logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .with_writer(io::stderr)
        .init();

    // ─── 2) config: optional YAML path as the only argument ─────────
    let config = match env::args().nth(1) {
        Some(path) => Config::from_yaml_file(&path)
            .with_context(|| format!("loading config from {}", path))?,
        None => Config::default(),
    };
    info!(input = %config.input.display(), output = %config.output_dir.display(), "startup");

    // ─── 3) run ──────────────────────────────────────────────────────
    let mut sink = SvgSink::new(&config.output_dir, config.chart_width, config.chart_height);
    let stdout = io::stdout();
    let summary = covidtrack::run(&config, &mut sink, &mut stdout.lock())
        .with_context(|| format!("processing {}", config.input.display()))?;

    info!(
        latest = %summary.latest_date,
        charts = sink.written().len(),
        "all done"
    );
    Ok(())
}
