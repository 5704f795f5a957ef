//! Interest-over-time line chart
//!
//! Drawn with plotters into an SVG string, one line per keyword.

use anyhow::{anyhow, Result};
use plotters::prelude::*;
use serde::Serialize;

use crate::models::TimeSeriesResult;

/// One keyword's line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<i64>,
}

/// Multi-line chart: x = date, y = interest (0-100)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub x_labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

impl LineChart {
    /// Build a chart with a line for each keyword present in the result
    pub fn from_time_series(result: &TimeSeriesResult, keywords: &[String]) -> Self {
        let table = result.to_table();
        let x_labels = table.rows.iter().map(|r| r[0].to_string()).collect();

        let series = keywords
            .iter()
            .filter_map(|kw| {
                result.series(kw).map(|points| ChartSeries {
                    name: kw.clone(),
                    values: points.into_iter().map(|(_, v)| v).collect(),
                })
            })
            .collect();

        Self { x_labels, series }
    }

    /// Render to an SVG document
    pub fn render_svg(&self, width: u32, height: u32) -> Result<String> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(|e| anyhow!("{e}"))?;

            let max_x = self.x_labels.len().saturating_sub(1).max(1);
            let mut chart = ChartBuilder::on(&root)
                .margin(12)
                .x_label_area_size(40)
                .y_label_area_size(48)
                .build_cartesian_2d(0usize..max_x, 0i64..100i64)
                .map_err(|e| anyhow!("{e}"))?;

            let labels = &self.x_labels;
            let format_x = |idx: &usize| labels.get(*idx).cloned().unwrap_or_default();
            chart
                .configure_mesh()
                .x_desc("Date")
                .y_desc("Interest (0-100)")
                .x_labels(6)
                .x_label_formatter(&format_x)
                .draw()
                .map_err(|e| anyhow!("{e}"))?;

            for (idx, series) in self.series.iter().enumerate() {
                let color = Palette99::pick(idx).to_rgba();
                chart
                    .draw_series(LineSeries::new(
                        series.values.iter().enumerate().map(|(x, y)| (x, *y)),
                        color.stroke_width(2),
                    ))
                    .map_err(|e| anyhow!("{e}"))?
                    .label(series.name.clone())
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                    });
            }

            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(|e| anyhow!("{e}"))?;

            root.present().map_err(|e| anyhow!("{e}"))?;
        }
        Ok(svg)
    }
}
