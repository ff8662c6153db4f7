pub mod svg;

use chrono::NaiveDate;

use crate::analysis::{DeathRates, LocationSeries, SeriesPoint};
use crate::error::Result;

pub use svg::SvgSink;

/// One named line of a time-series chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub label: String,
    pub points: Vec<(NaiveDate, i64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    /// Short identifier, used as the output file stem.
    pub name: &'static str,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    /// `None` is drawn as an empty, labelled slot.
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub name: &'static str,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<Bar>,
}

/// Destination for rendered charts.
pub trait ChartSink {
    fn line_chart(&mut self, chart: &LineChart) -> Result<()>;
    fn bar_chart(&mut self, chart: &BarChart) -> Result<()>;
}

fn lines_of(series: &[LocationSeries], pick: fn(&SeriesPoint) -> Option<i64>) -> Vec<Line> {
    series
        .iter()
        .map(|s| Line {
            label: s.location.clone(),
            points: s
                .points
                .iter()
                .filter_map(|p| pick(p).map(|v| (p.date, v)))
                .collect(),
        })
        .collect()
}

pub fn total_cases_chart(series: &[LocationSeries], n: usize) -> LineChart {
    LineChart {
        name: "total_cases",
        title: format!("Total COVID-19 Cases Over Time - Top {n} Countries"),
        x_label: "Date".into(),
        y_label: "Total Cases".into(),
        lines: lines_of(series, |p| p.total_cases),
    }
}

pub fn new_cases_chart(series: &[LocationSeries], n: usize) -> LineChart {
    LineChart {
        name: "new_cases",
        title: format!("Daily New COVID-19 Cases - Top {n} Countries"),
        x_label: "Date".into(),
        y_label: "New Cases".into(),
        lines: lines_of(series, |p| p.new_cases),
    }
}

pub fn death_rate_chart(rates: &DeathRates, n: usize) -> BarChart {
    BarChart {
        name: "death_rate",
        title: format!("COVID-19 Death Rate (%) - Top {n} Countries"),
        x_label: "Country".into(),
        y_label: "Death Rate (%)".into(),
        bars: rates
            .rates
            .iter()
            .map(|r| Bar {
                label: r.location.clone(),
                value: r.rate,
            })
            .collect(),
    }
}

/// Build and emit the three charts in order.
pub fn render_all(
    sink: &mut dyn ChartSink,
    series: &[LocationSeries],
    rates: &DeathRates,
    n: usize,
) -> Result<()> {
    sink.line_chart(&total_cases_chart(series, n))?;
    sink.line_chart(&new_cases_chart(series, n))?;
    sink.bar_chart(&death_rate_chart(rates, n))?;
    Ok(())
}
