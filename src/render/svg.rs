use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
};

use arrow::datatypes::Date32Type;
use plotters::prelude::*;
use tracing::info;

use crate::error::{Result, TrackerError};
use crate::render::{BarChart, ChartSink, LineChart};

const BAR_SIZE: (u32, u32) = (800, 500);

type DrawResult = std::result::Result<(), Box<dyn Error>>;

/// Writes each chart to `<out_dir>/<name>.svg`. The directory is created
/// when the first chart is written.
pub struct SvgSink {
    out_dir: PathBuf,
    line_size: (u32, u32),
    written: Vec<PathBuf>,
}

impl SvgSink {
    pub fn new<P: AsRef<Path>>(out_dir: P, width: u32, height: u32) -> Self {
        Self {
            out_dir: out_dir.as_ref().to_path_buf(),
            line_size: (width, height),
            written: Vec::new(),
        }
    }

    /// Files produced so far, in render order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn target(&self, name: &str) -> Result<PathBuf> {
        if self.written.is_empty() {
            fs::create_dir_all(&self.out_dir).map_err(|e| TrackerError::Render {
                chart: self.out_dir.display().to_string(),
                reason: e.to_string(),
            })?;
        }
        Ok(self.out_dir.join(format!("{name}.svg")))
    }

    fn finish(&mut self, name: &str, path: PathBuf, res: DrawResult) -> Result<()> {
        res.map_err(|e| TrackerError::Render {
            chart: name.to_string(),
            reason: e.to_string(),
        })?;
        info!(chart = name, path = %path.display(), "chart written");
        self.written.push(path);
        Ok(())
    }
}

impl ChartSink for SvgSink {
    fn line_chart(&mut self, chart: &LineChart) -> Result<()> {
        let path = self.target(chart.name)?;
        let res = draw_line_chart(&path, self.line_size, chart);
        self.finish(chart.name, path, res)
    }

    fn bar_chart(&mut self, chart: &BarChart) -> Result<()> {
        let path = self.target(chart.name)?;
        let res = draw_bar_chart(&path, BAR_SIZE, chart);
        self.finish(chart.name, path, res)
    }
}

/// Axis bounds over every point; degenerate ranges are widened by one unit.
fn line_bounds(chart: &LineChart) -> ((i32, i32), (f64, f64)) {
    let mut days = chart
        .lines
        .iter()
        .flat_map(|l| l.points.iter())
        .map(|(d, _)| Date32Type::from_naive_date(*d));
    let first = days.next();
    let (x_min, x_max) = days.fold(
        first.map_or((0, 1), |d| (d, d)),
        |(lo, hi), d| (lo.min(d), hi.max(d)),
    );

    let (y_min, y_max) = chart
        .lines
        .iter()
        .flat_map(|l| l.points.iter())
        .fold((0i64, 0i64), |(lo, hi), (_, v)| (lo.min(*v), hi.max(*v)));

    let x_max = if x_max > x_min { x_max } else { x_min + 1 };
    let (y_min, y_max) = (y_min as f64, y_max as f64);
    let pad = ((y_max - y_min) * 0.05).max(1.0);
    let y_min = if y_min < 0.0 { y_min - pad } else { 0.0 };
    ((x_min, x_max), (y_min, y_max + pad))
}

fn draw_line_chart(path: &Path, size: (u32, u32), chart: &LineChart) -> DrawResult {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let ((x_min, x_max), (y_min, y_max)) = line_bounds(chart);
    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, ("sans-serif", 28.0))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(90)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    ctx.configure_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .x_labels(8)
        .x_label_formatter(&|d: &i32| {
            Date32Type::to_naive_date(*d)
                .format("%Y-%m-%d")
                .to_string()
        })
        .y_label_formatter(&|v: &f64| format!("{:.0}", v))
        .draw()?;

    for (i, line) in chart.lines.iter().enumerate() {
        let color = Palette99::pick(i).mix(0.9);
        ctx.draw_series(LineSeries::new(
            line.points
                .iter()
                .map(|(d, v)| (Date32Type::from_naive_date(*d), *v as f64)),
            color.stroke_width(2),
        ))?
        .label(line.label.as_str())
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
        });
    }

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_bar_chart(path: &Path, size: (u32, u32), chart: &BarChart) -> DrawResult {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let slots = chart.bars.len().max(1) as u32;
    let top = chart
        .bars
        .iter()
        .filter_map(|b| b.value)
        .fold(0.0f64, f64::max);
    let y_max = if top > 0.0 { top * 1.15 } else { 1.0 };
    let labels: Vec<String> = chart.bars.iter().map(|b| b.label.clone()).collect();

    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, ("sans-serif", 24.0))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..slots).into_segmented(), 0f64..y_max)?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .x_label_formatter(&|v: &SegmentValue<u32>| match v {
            SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
                labels.get(*i as usize).cloned().unwrap_or_default()
            }
            SegmentValue::Last => String::new(),
        })
        .y_label_formatter(&|v: &f64| format!("{:.1}", v))
        .draw()?;

    ctx.draw_series(
        Histogram::vertical(&ctx)
            .style(BLUE.mix(0.7).filled())
            .margin(12)
            .data(
                chart
                    .bars
                    .iter()
                    .enumerate()
                    .filter_map(|(i, b)| b.value.map(|v| (i as u32, v))),
            ),
    )?;

    // undefined rates get a marker instead of a zero-height bar
    ctx.draw_series(
        chart
            .bars
            .iter()
            .enumerate()
            .filter(|(_, b)| b.value.is_none())
            .map(|(i, _)| {
                Text::new(
                    "n/a",
                    (SegmentValue::CenterOf(i as u32), y_max * 0.03),
                    ("sans-serif", 16.0).into_font(),
                )
            }),
    )?;

    root.present()?;
    Ok(())
}
