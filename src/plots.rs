use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::path::Path;

use tracing::info;

use crate::comparison::ComparisonRow;
use crate::error::{AnalysisError, Result};

pub const DISTRIBUTION_FILE: &str = "pagerank_distribution.svg";
pub const COMPARISON_FILE: &str = "top_comparison.svg";

const PLOT_SIZE: (u32, u32) = (1280, 800);
const BAR_WIDTH: f64 = 0.3;
const NEW_COLOR: RGBColor = RGBColor(0x7f, 0x6d, 0x5f);
const OLD_COLOR: RGBColor = RGBColor(0x55, 0x7f, 0x2d);

fn plot_err<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> AnalysisError {
    AnalysisError::Plot(e.to_string())
}

/// Range with some headroom so points never sit on the frame.
fn padded(min: f64, max: f64) -> std::ops::Range<f64> {
    if (max - min).abs() < f64::EPSILON {
        return (min - 0.5)..(max + 0.5);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

/// Line plot of `log10(score)` against rank order.
pub fn draw_distribution<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    points: &[(usize, f64)],
) -> Result<()> {
    root.fill(&WHITE).map_err(plot_err)?;

    let min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let (min, max) = if points.is_empty() { (0.0, 0.0) } else { (min, max) };
    let x_max = points.len().max(2) as f64 - 1.0;

    let mut chart = ChartBuilder::on(root)
        .caption("Distribution of PageRank scores", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..x_max, padded(min, max))
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Rank order from top1")
        .y_desc("Log of PageRank score")
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(
            points.iter().map(|&(x, y)| (x as f64, y)),
            BLUE.stroke_width(2),
        ))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

/// Grouped bars: for each top page the new score, then the old one.
pub fn draw_comparison<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    rows: &[ComparisonRow],
    new_label: &str,
    old_label: &str,
) -> Result<()> {
    root.fill(&WHITE).map_err(plot_err)?;

    let groups = rows.len().max(1);
    let y_max = rows
        .iter()
        .flat_map(|r| [r.new_score, r.old_score])
        .fold(0.0, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let caption = format!(
        "Comparison of top {} PageRank's sites after {} and {}",
        rows.len(),
        old_label,
        new_label
    );

    let mut chart = ChartBuilder::on(root)
        .caption(caption, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(220)
        .y_label_area_size(90)
        .build_cartesian_2d(0f64..groups as f64, 0f64..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .x_desc(format!("Top {} pages", rows.len()))
        .y_desc("PageRank score")
        .draw()
        .map_err(plot_err)?;

    let label_style = ("sans-serif", 13)
        .into_font()
        .transform(FontTransform::Rotate90);
    // Group i spans [i, i + 1); its label sits between the two bars.
    for (i, row) in rows.iter().enumerate() {
        let (x, y) = chart.backend_coord(&(i as f64 + 0.5, 0.0));
        root.draw(&Text::new(row.label.clone(), (x - 6, y + 8), label_style.clone()))
            .map_err(plot_err)?;
    }

    for (offset, color, label, score) in [
        (0.5 - BAR_WIDTH, NEW_COLOR, new_label, true),
        (0.5, OLD_COLOR, old_label, false),
    ] {
        chart
            .draw_series(rows.iter().enumerate().map(|(i, row)| {
                let x0 = i as f64 + offset;
                let y = if score { row.new_score } else { row.old_score };
                Rectangle::new([(x0, 0.0), (x0 + BAR_WIDTH, y)], color.filled())
            }))
            .map_err(plot_err)?
            .label(label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

pub fn render_distribution(path: &Path, points: &[(usize, f64)]) -> Result<()> {
    let root = SVGBackend::new(path, PLOT_SIZE).into_drawing_area();
    draw_distribution(&root, points)?;
    info!(path = %path.display(), points = points.len(), "wrote distribution plot");
    Ok(())
}

pub fn render_comparison(
    path: &Path,
    rows: &[ComparisonRow],
    new_label: &str,
    old_label: &str,
) -> Result<()> {
    let root = SVGBackend::new(path, PLOT_SIZE).into_drawing_area();
    draw_comparison(&root, rows, new_label, old_label)?;
    info!(path = %path.display(), pages = rows.len(), "wrote comparison plot");
    Ok(())
}
