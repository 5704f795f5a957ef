use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use trendscope::config::Config;
use trendscope::dashboard::{self, render_text, AnalysisForm, Stage};
use trendscope::trends::{self, ClientCache};

/// Chart file written next to the CSV downloads
const CHART_FILE_NAME: &str = "interest_over_time.svg";

/// Arguments of the `analyze` command
#[derive(Debug, Clone)]
pub struct AnalyzeParams {
    pub keywords: String,
    pub timeframe: String,
    pub geo: String,
    pub resolution: String,
    pub category: u32,
    pub out: Option<PathBuf>,
}

/// Run one analysis, print the report and optionally save its files
pub async fn analyze(config: Config, params: AnalyzeParams) -> Result<()> {
    let form = AnalysisForm {
        keywords: params.keywords,
        timeframe: params.timeframe,
        geo: params.geo,
        resolution: params.resolution,
        category: params.category.to_string(),
    };

    let mut cache = ClientCache::new(config.trends.handle_ttl());
    let report = dashboard::analyze(&form, || trends::initialize(&mut cache, &config.trends)).await;

    println!("{}", render_text(&report));

    if let Some(err) = &report.validation_error {
        anyhow::bail!("{err}");
    }
    if let Some(err) = &report.fatal_error {
        anyhow::bail!("{err}");
    }

    let Some(out) = params.out else {
        return Ok(());
    };

    for download in report.downloads() {
        let path = download.save(&out)?;
        println!("Saved {}", path.display());
    }

    if let Some(Stage::Ready(view)) = &report.time_series {
        match view.chart.render_svg(1000, 400) {
            Ok(svg) => {
                let path = out.join(CHART_FILE_NAME);
                fs::write(&path, svg)
                    .with_context(|| format!("Failed to write chart: {}", path.display()))?;
                println!("Saved {}", path.display());
            }
            Err(e) => tracing::warn!(error = %e, "Failed to render chart"),
        }
    }

    Ok(())
}
