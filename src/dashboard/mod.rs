//! Presentation controller
//!
//! Turns a submitted form into a [`Report`]: validates the parameters, gets
//! a client handle, then runs the three lookups one after another. Each
//! lookup returns its own `Result`, and [`present_time_series`],
//! [`present_regions`] and [`present_related`] decide independently how the
//! outcome is shown, so one failing stage never hides the others.

pub mod chart;
pub mod map;
pub mod render;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::export::{numbered_file_name, related_file_name, time_series_file_name, Download};
use crate::models::{
    QueryParameters, RankedList, RegionResult, RelatedQueryResult, Resolution, Table, Timeframe,
    TimeSeriesResult,
};
use crate::trends::{ClientHandle, TrendsSource};
use crate::utils::error::{FetchError, ValidationError};
use crate::utils::split_keywords;

pub use chart::LineChart;
pub use map::ChoroplethFigure;
pub use render::{render_text, PageRenderer};

/// Number of regions shown in the region table
pub const TOP_REGIONS: usize = 20;

/// Number of related queries shown per list
pub const RELATED_ROWS: usize = 10;

pub const NO_TIME_SERIES_WARNING: &str =
    "No data returned for the chosen parameters. Try a different timeframe or keywords.";
pub const NO_REGION_WARNING: &str = "No region data available.";
pub const NO_RELATED_NOTE: &str = "No related queries returned.";
pub const MAP_FALLBACK_NOTE: &str = "Could not render world map - showing table instead.";
pub const COMPLETE_NOTE: &str = "Analysis complete.";
pub const FATAL_TIP: &str = "Tip: make sure you have internet access and the trends service is reachable.";

/// Notes shown above every report
pub const USAGE_NOTES: &[&str] = &[
    "This app uses an unofficial Google Trends API. If Google blocks requests, try later or reduce frequency.",
    "For very large keyword lists or frequent queries, Google may throttle you.",
];

/// Raw user input, as submitted by the dashboard form
///
/// Every field arrives as text. A field missing from the submission is
/// blank, so a bare submission fails on the keyword check instead of
/// running the prefilled defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisForm {
    /// Comma-separated keywords
    #[serde(default)]
    pub keywords: String,
    /// Timeframe token; blank means the default
    #[serde(default)]
    pub timeframe: String,
    /// Country code, empty for worldwide
    #[serde(default)]
    pub geo: String,
    /// Resolution name; blank means the default
    #[serde(default)]
    pub resolution: String,
    /// Category id as typed
    #[serde(default)]
    pub category: String,
}

impl Default for AnalysisForm {
    fn default() -> Self {
        Self {
            keywords: String::from("python, java, javascript"),
            timeframe: Timeframe::default().as_token().to_string(),
            geo: String::new(),
            resolution: Resolution::default().as_str().to_string(),
            category: String::from("0"),
        }
    }
}

impl AnalysisForm {
    /// Validate the form into query parameters
    ///
    /// Keywords are checked first.
    pub fn to_parameters(&self) -> Result<QueryParameters, ValidationError> {
        let keywords = split_keywords(&self.keywords);
        if keywords.is_empty() {
            return Err(ValidationError::NoKeywords);
        }

        let timeframe = match self.timeframe.trim() {
            "" => Timeframe::default(),
            token => Timeframe::parse(token)?,
        };
        let resolution = match self.resolution.trim() {
            "" => Resolution::default(),
            name => Resolution::parse(name)?,
        };
        let category = self
            .category
            .trim()
            .parse::<u32>()
            .map_err(|_| ValidationError::InvalidCategory(self.category.clone()))?;

        QueryParameters::new(keywords, timeframe, self.geo.clone(), resolution, category)
    }
}

/// Outcome of one stage
#[derive(Debug, Clone, PartialEq)]
pub enum Stage<T> {
    /// Data to display
    Ready(T),
    /// No data; not an error
    Empty(String),
    /// Lookup failed; message carries the cause
    Failed(String),
}

impl<T> Stage<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::Empty(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesView {
    pub table: Table,
    pub chart: LineChart,
    pub download: Download,
}

/// How the region stage shows its map
#[derive(Debug, Clone, PartialEq)]
pub enum MapView {
    /// Resolution is not country, or region names are missing
    NotApplicable,
    Rendered(ChoroplethFigure),
    /// Map could not be built; table only
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionView {
    /// Top regions by the first keyword
    pub table: Table,
    pub map: MapView,
}

/// One related-query list: first rows for display, full list for download
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedSection {
    pub table: Table,
    pub download: Download,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRelatedView {
    pub keyword: String,
    pub top: Option<RelatedSection>,
    pub rising: Option<RelatedSection>,
}

impl KeywordRelatedView {
    /// Whether the service returned no related query for this keyword
    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.rising.is_none()
    }
}

/// Everything one run produces
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    /// Info line naming keywords, timeframe and geography
    pub summary: Option<String>,
    pub validation_error: Option<String>,
    /// The run could not start (no client handle)
    pub fatal_error: Option<String>,
    pub time_series: Option<Stage<TimeSeriesView>>,
    pub regions: Option<Stage<RegionView>>,
    pub related: Option<Stage<Vec<KeywordRelatedView>>>,
    pub complete: bool,
}

impl Report {
    fn invalid(err: &ValidationError) -> Self {
        Self {
            validation_error: Some(err.to_string()),
            ..Default::default()
        }
    }

    /// Every download the report offers, in display order
    pub fn downloads(&self) -> Vec<&Download> {
        let mut downloads = Vec::new();

        if let Some(view) = self.time_series.as_ref().and_then(Stage::ready) {
            downloads.push(&view.download);
        }

        if let Some(views) = self.related.as_ref().and_then(Stage::ready) {
            for view in views {
                for section in [&view.top, &view.rising].into_iter().flatten() {
                    downloads.push(&section.download);
                }
            }
        }

        downloads
    }
}

fn summary(params: &QueryParameters) -> String {
    format!(
        "Fetching Trends data for: {} | timeframe: {} | geo: {}",
        params.keywords().join(", "),
        params.timeframe(),
        params.geo_label()
    )
}

/// Validate the form, obtain a handle with `acquire`, and run all stages
///
/// No handle is requested and nothing is fetched when validation fails.
pub async fn analyze<F>(form: &AnalysisForm, acquire: F) -> Report
where
    F: FnOnce() -> Result<ClientHandle, FetchError>,
{
    let params = match form.to_parameters() {
        Ok(params) => params,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected analysis parameters");
            return Report::invalid(&e);
        }
    };

    let handle = match acquire() {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize trends client");
            return Report {
                summary: Some(summary(&params)),
                fatal_error: Some(format!("An error occurred: {e}")),
                ..Default::default()
            };
        }
    };

    run_stages(handle.as_ref(), &params).await
}

/// Run the three lookups in order and present each outcome
pub async fn run_stages(source: &dyn TrendsSource, params: &QueryParameters) -> Report {
    tracing::info!(
        keywords = ?params.keywords(),
        timeframe = %params.timeframe(),
        geo = %params.geo_label(),
        resolution = %params.resolution(),
        category = params.category(),
        "Starting analysis"
    );

    let time_series = present_time_series(params, source.fetch_time_series(params).await);

    let regions = present_regions(
        params,
        source.fetch_by_region(params, params.resolution()).await,
    );

    let related = present_related(params, source.fetch_related_queries(params).await);

    tracing::info!("Analysis complete");

    Report {
        summary: Some(summary(params)),
        validation_error: None,
        fatal_error: None,
        time_series: Some(time_series),
        regions: Some(regions),
        related: Some(related),
        complete: true,
    }
}

/// Table, chart and download for the interest-over-time stage
pub fn present_time_series(
    params: &QueryParameters,
    outcome: Result<TimeSeriesResult, FetchError>,
) -> Stage<TimeSeriesView> {
    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(error = %e, "Interest over time failed");
            return Stage::Failed(format!("Error fetching interest over time: {e}"));
        }
    };

    if result.is_empty() {
        return Stage::Empty(NO_TIME_SERIES_WARNING.to_string());
    }

    let table = result.to_table();
    let chart = LineChart::from_time_series(&result, params.keywords());
    let download = Download::csv(
        "Download interest_over_time CSV",
        time_series_file_name(),
        &table,
    );

    Stage::Ready(TimeSeriesView {
        table,
        chart,
        download,
    })
}

/// Top-region table and, for country resolution, the world map
pub fn present_regions(
    params: &QueryParameters,
    outcome: Result<RegionResult, FetchError>,
) -> Stage<RegionView> {
    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(error = %e, "Interest by region failed");
            return Stage::Failed(format!("Error fetching region data: {e}"));
        }
    };

    if result.is_empty() {
        return Stage::Empty(NO_REGION_WARNING.to_string());
    }

    let top = result.top_by_first_keyword(TOP_REGIONS);

    let map = if params.resolution() == Resolution::Country && top.has_region_names() {
        match ChoroplethFigure::build(&top, params.primary_keyword()) {
            Ok(figure) => MapView::Rendered(figure),
            Err(e) => {
                tracing::warn!(error = %e, "World map unavailable, showing table only");
                MapView::Unavailable(MAP_FALLBACK_NOTE.to_string())
            }
        }
    } else {
        MapView::NotApplicable
    };

    Stage::Ready(RegionView {
        table: top.to_table(),
        map,
    })
}

/// Hands out related-query file names, numbering repeats so that no two
/// downloads of one report share a name
#[derive(Default)]
struct FileNames {
    seen: HashMap<String, usize>,
}

impl FileNames {
    fn next(&mut self, keyword: &str, kind: &str) -> String {
        let name = related_file_name(keyword, kind);
        let count = self.seen.entry(name.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            name
        } else {
            numbered_file_name(&name, *count)
        }
    }
}

fn related_section(
    keyword: &str,
    kind: &str,
    list: Option<&RankedList>,
    names: &mut FileNames,
) -> Option<RelatedSection> {
    let list = list.filter(|l| !l.is_empty())?;
    let full = list.to_table();

    Some(RelatedSection {
        table: full.head(RELATED_ROWS),
        download: Download::csv(
            format!("Download {keyword} {kind} related CSV"),
            names.next(keyword, kind),
            &full,
        ),
    })
}

/// Top and rising lists for each requested keyword
pub fn present_related(
    params: &QueryParameters,
    outcome: Result<RelatedQueryResult, FetchError>,
) -> Stage<Vec<KeywordRelatedView>> {
    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(error = %e, "Related queries failed");
            return Stage::Failed(format!("Error fetching related queries: {e}"));
        }
    };

    let mut names = FileNames::default();
    let views = params
        .keywords()
        .iter()
        .map(|keyword| {
            let entry = result.get(keyword);
            KeywordRelatedView {
                keyword: keyword.clone(),
                top: related_section(
                    keyword,
                    "top",
                    entry.and_then(|e| e.top.as_ref()),
                    &mut names,
                ),
                rising: related_section(
                    keyword,
                    "rising",
                    entry.and_then(|e| e.rising.as_ref()),
                    &mut names,
                ),
            }
        })
        .collect();

    Stage::Ready(views)
}
