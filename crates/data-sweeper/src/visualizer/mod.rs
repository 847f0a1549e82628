//! Bar charts of a single numeric column, rendered to SVG with `plotters`.
//!
//! Each non-null value becomes one bar at its row index. Values are drawn
//! as-is: no aggregation, binning or scaling.

use plotters::prelude::*;
use tracing::{debug, warn};

use crate::config::SweeperConfig;
use crate::error::{Result, SweeperError};
use crate::types::{ScalarType, TabularData};
use crate::utils::file_stem;

const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Bars for one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub column: String,
    /// `(row_index, value)` for each finite value, in row order.
    pub points: Vec<(usize, f64)>,
    pub row_count: usize,
}

impl BarChart {
    /// Collect the bars for `column`.
    ///
    /// Nulls and non-finite values get no bar. Fails if the column does not
    /// exist or is not numeric.
    pub fn from_column(data: &TabularData, column: &str) -> Result<Self> {
        let scalar_type = data.column_type(column)?;
        if scalar_type != ScalarType::Number {
            return Err(SweeperError::NotNumeric {
                column: column.to_string(),
                actual: scalar_type.to_string(),
            });
        }

        let series = data.frame().column(column)?.as_materialized_series();
        let floats = series.cast(&polars::prelude::DataType::Float64)?;
        let points = floats
            .f64()?
            .into_iter()
            .enumerate()
            .filter_map(|(row, value)| value.filter(|v| v.is_finite()).map(|v| (row, v)))
            .collect();

        Ok(Self {
            column: column.to_string(),
            points,
            row_count: data.height(),
        })
    }

    /// Value range of the y axis. Always contains zero.
    pub fn y_range(&self) -> (f64, f64) {
        let (min, max) = self
            .points
            .iter()
            .fold((0.0f64, 0.0f64), |(lo, hi), &(_, v)| (lo.min(v), hi.max(v)));
        if min == max {
            return (0.0, 1.0);
        }
        let pad = (max - min) * 0.05;
        (
            if min < 0.0 { min - pad } else { 0.0 },
            if max > 0.0 { max + pad } else { 0.0 },
        )
    }

    /// Render the chart as an SVG document.
    pub fn render_svg(&self, config: &SweeperConfig) -> Result<String> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (config.chart_width, config.chart_height))
                .into_drawing_area();
            root.fill(&WHITE).map_err(render_error)?;

            let x_max = self.row_count.max(1) as f64 - 0.5;
            let (y_min, y_max) = self.y_range();

            let mut chart = ChartBuilder::on(&root)
                .caption(&self.column, ("sans-serif", 20))
                .margin(10)
                .x_label_area_size(35)
                .y_label_area_size(60)
                .build_cartesian_2d(-0.5f64..x_max, y_min..y_max)
                .map_err(render_error)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_desc("Row")
                .y_desc(self.column.as_str())
                .x_label_formatter(&|x| format!("{:.0}", x))
                .draw()
                .map_err(render_error)?;

            chart
                .draw_series(self.points.iter().map(|&(row, value)| {
                    let x = row as f64;
                    Rectangle::new([(x - 0.4, 0.0), (x + 0.4, value)], BAR_COLOR.filled())
                }))
                .map_err(render_error)?;

            root.present().map_err(render_error)?;
        }

        debug!(
            "Rendered {} bars for '{}' ({} bytes of SVG)",
            self.points.len(),
            self.column,
            svg.len()
        );
        Ok(svg)
    }
}

fn render_error(err: impl std::fmt::Display) -> SweeperError {
    SweeperError::ChartRender(err.to_string())
}

/// Picks columns to chart and names chart files.
pub struct Visualizer;

impl Visualizer {
    /// The first numeric column, if any.
    pub fn default_column(data: &TabularData) -> Option<String> {
        data.numeric_columns().into_iter().next()
    }

    /// Chart the first numeric column.
    ///
    /// Returns `None` with a warning when the table has no numeric column.
    pub fn chart_default(data: &TabularData) -> Result<Option<BarChart>> {
        match Self::default_column(data) {
            Some(column) => BarChart::from_column(data, &column).map(Some),
            None => {
                warn!("No numeric columns available for visualization.");
                Ok(None)
            }
        }
    }

    /// `<file stem>_<column>_chart.svg`
    pub fn chart_file_name(file_name: &str, column: &str) -> String {
        format!("{}_{}_chart.svg", file_stem(file_name), column)
    }

    /// Summary line for a chart: column name, bar count and value span.
    pub fn describe(chart: &BarChart) -> String {
        if chart.points.is_empty() {
            return format!("'{}': no values to plot", chart.column);
        }
        let lo = chart.points.iter().map(|&(_, v)| v).fold(f64::INFINITY, f64::min);
        let hi = chart.points.iter().map(|&(_, v)| v).fold(f64::NEG_INFINITY, f64::max);
        format!(
            "'{}': {} bars, values {} to {}",
            chart.column,
            chart.points.len(),
            lo,
            hi
        )
    }
}
