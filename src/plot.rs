//! RLI chart: one line per taxonomic group over its 5th to 95th percentile
//! band, rendered as SVG with Plotters
//!
//! SVG text is emitted as markup, so no system font is needed to draw
//! labels or the legend.

use crate::error::{Result, RliError};
use crate::output::ResultRow;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const CHART_SIZE: (u32, u32) = (960, 600);
const CHART_TITLE: &str = "RLI by Group Over Time";

/// Plot path that sits next to the result table: `rli.csv` -> `rli.svg`
pub fn plot_path(output: &Path) -> PathBuf {
    output.with_extension("svg")
}

/// Render the result rows as an SVG document
///
/// Groups are drawn in name order, each with its own palette colour. Rows
/// without quantiles (`AggregateMode::RliOnly`) get a line but no band.
///
/// # Errors
/// `Plot` when there are no rows or Plotters fails to draw
pub fn render_svg(rows: &[ResultRow]) -> Result<String> {
    let years = rows.iter().map(|r| r.year);
    let (Some(first), Some(last)) = (years.clone().min(), years.max()) else {
        return Err(RliError::Plot("no result rows to plot".to_string()));
    };

    let mut series: BTreeMap<&str, Vec<&ResultRow>> = BTreeMap::new();
    for row in rows {
        series.entry(row.taxonomic_group.as_str()).or_default().push(row);
    }

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(plot_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(CHART_TITLE, ("sans-serif", 22))
            .margin(16)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(first..last.max(first + 1), 0.0f64..1.0f64)
            .map_err(plot_error)?;

        chart
            .configure_mesh()
            .x_desc("Year")
            .y_desc("RLI")
            .draw()
            .map_err(plot_error)?;

        for (i, (group, group_rows)) in series.into_iter().enumerate() {
            let (r, g, b) = Palette99::COLORS[i % Palette99::COLORS.len()];
            let color = RGBColor(r, g, b);

            // Upper edge left to right, then lower edge back
            let band: Vec<(i64, f64)> = group_rows
                .iter()
                .filter_map(|row| Some((row.year, row.qn_95?)))
                .chain(group_rows.iter().rev().filter_map(|row| Some((row.year, row.qn_05?))))
                .collect();
            if band.len() >= 3 {
                chart
                    .draw_series(std::iter::once(Polygon::new(band, color.mix(0.2).filled())))
                    .map_err(plot_error)?;
            }

            chart
                .draw_series(LineSeries::new(
                    group_rows.iter().map(|row| (row.year, row.rli)),
                    color.stroke_width(2),
                ))
                .map_err(plot_error)?
                .label(group)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(plot_error)?;

        root.present().map_err(plot_error)?;
    }

    Ok(svg)
}

/// Render and save the chart, creating parent directories as needed
pub fn write_plot(rows: &[ResultRow], path: &Path) -> Result<()> {
    let svg = render_svg(rows)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, svg)?;

    info!("Saved plot to {:?}", path);
    Ok(())
}

fn plot_error<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> RliError {
    RliError::Plot(e.to_string())
}
