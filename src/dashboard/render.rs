//! Report rendering: HTML page and terminal text

use handlebars::Handlebars;
use serde::Serialize;
use std::fmt::Write as _;

use crate::error::Result;
use crate::export::Download;
use crate::models::{Resolution, Table, Timeframe};

use super::{
    AnalysisForm, KeywordRelatedView, MapView, RegionView, RelatedSection, Report, Stage,
    TimeSeriesView, COMPLETE_NOTE, FATAL_TIP, NO_RELATED_NOTE, USAGE_NOTES,
};

/// Dashboard page template
const PAGE_TEMPLATE: &str = include_str!("../../templates/dashboard.hbs");

const CHART_WIDTH: u32 = 1000;
const CHART_HEIGHT: u32 = 400;

#[derive(Debug, Serialize)]
struct TableData {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl From<&Table> for TableData {
    fn from(table: &Table) -> Self {
        Self {
            columns: table.columns.clone(),
            rows: table
                .rows
                .iter()
                .map(|r| r.iter().map(ToString::to_string).collect())
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DownloadData {
    label: String,
    file_name: String,
    href: String,
}

impl From<&Download> for DownloadData {
    fn from(download: &Download) -> Self {
        Self {
            label: download.label.clone(),
            file_name: download.file_name.clone(),
            href: download.data_uri(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StageData<T: Serialize> {
    warning: Option<String>,
    error: Option<String>,
    content: Option<T>,
}

impl<T: Serialize> StageData<T> {
    fn from_stage<V>(stage: &Stage<V>, convert: impl FnOnce(&V) -> T) -> Self {
        Self {
            warning: stage.warning().map(str::to_string),
            error: stage.error().map(str::to_string),
            content: stage.ready().map(convert),
        }
    }
}

#[derive(Debug, Serialize)]
struct TimeSeriesData {
    table: TableData,
    chart_svg: Option<String>,
    download: DownloadData,
}

impl From<&TimeSeriesView> for TimeSeriesData {
    fn from(view: &TimeSeriesView) -> Self {
        let chart_svg = match view.chart.render_svg(CHART_WIDTH, CHART_HEIGHT) {
            Ok(svg) => Some(svg),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to draw interest-over-time chart");
                None
            }
        };

        Self {
            table: TableData::from(&view.table),
            chart_svg,
            download: DownloadData::from(&view.download),
        }
    }
}

#[derive(Debug, Serialize)]
struct RegionData {
    table: TableData,
    map_json: Option<String>,
    map_note: Option<String>,
}

impl From<&RegionView> for RegionData {
    fn from(view: &RegionView) -> Self {
        let (map_json, map_note) = match &view.map {
            MapView::Rendered(figure) => (Some(figure.to_script_json()), None),
            MapView::Unavailable(note) => (None, Some(note.clone())),
            MapView::NotApplicable => (None, None),
        };

        Self {
            table: TableData::from(&view.table),
            map_json,
            map_note,
        }
    }
}

#[derive(Debug, Serialize)]
struct SectionData {
    table: TableData,
    download: DownloadData,
}

impl From<&RelatedSection> for SectionData {
    fn from(section: &RelatedSection) -> Self {
        Self {
            table: TableData::from(&section.table),
            download: DownloadData::from(&section.download),
        }
    }
}

#[derive(Debug, Serialize)]
struct KeywordData {
    keyword: String,
    top: Option<SectionData>,
    rising: Option<SectionData>,
    note: Option<&'static str>,
}

impl From<&KeywordRelatedView> for KeywordData {
    fn from(view: &KeywordRelatedView) -> Self {
        Self {
            keyword: view.keyword.clone(),
            top: view.top.as_ref().map(SectionData::from),
            rising: view.rising.as_ref().map(SectionData::from),
            note: view.is_empty().then_some(NO_RELATED_NOTE),
        }
    }
}

#[derive(Debug, Serialize)]
struct ReportData {
    summary: Option<String>,
    validation_error: Option<String>,
    fatal_error: Option<String>,
    fatal_tip: Option<&'static str>,
    time_series: Option<StageData<TimeSeriesData>>,
    regions: Option<StageData<RegionData>>,
    related: Option<StageData<Vec<KeywordData>>>,
    complete: Option<&'static str>,
}

impl From<&Report> for ReportData {
    fn from(report: &Report) -> Self {
        Self {
            summary: report.summary.clone(),
            validation_error: report.validation_error.clone(),
            fatal_error: report.fatal_error.clone(),
            fatal_tip: report.fatal_error.as_ref().map(|_| FATAL_TIP),
            time_series: report
                .time_series
                .as_ref()
                .map(|s| StageData::from_stage(s, |v: &TimeSeriesView| TimeSeriesData::from(v))),
            regions: report
                .regions
                .as_ref()
                .map(|s| StageData::from_stage(s, |v: &RegionView| RegionData::from(v))),
            related: report.related.as_ref().map(|s| {
                StageData::from_stage(s, |views: &Vec<KeywordRelatedView>| {
                    views.iter().map(KeywordData::from).collect()
                })
            }),
            complete: report.complete.then_some(COMPLETE_NOTE),
        }
    }
}

#[derive(Debug, Serialize)]
struct OptionData {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct FormData {
    keywords: String,
    geo: String,
    category: String,
    timeframes: Vec<OptionData>,
    resolutions: Vec<OptionData>,
}

impl From<&AnalysisForm> for FormData {
    fn from(form: &AnalysisForm) -> Self {
        Self {
            keywords: form.keywords.clone(),
            geo: form.geo.clone(),
            category: form.category.clone(),
            timeframes: Timeframe::all()
                .into_iter()
                .map(|t| OptionData {
                    value: t.as_token(),
                    label: t.label(),
                    selected: t.as_token() == form.timeframe,
                })
                .collect(),
            resolutions: Resolution::all()
                .into_iter()
                .map(|r| OptionData {
                    value: r.as_str(),
                    label: r.as_str(),
                    selected: r.as_str() == form.resolution.to_uppercase(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PageData {
    title: &'static str,
    version: &'static str,
    notes: &'static [&'static str],
    form: FormData,
    report: Option<ReportData>,
}

/// Dashboard page renderer backed by Handlebars
pub struct PageRenderer {
    handlebars: Handlebars<'static>,
}

impl PageRenderer {
    /// Create a renderer with the built-in page template
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_template_string("dashboard", PAGE_TEMPLATE)?;
        Ok(Self { handlebars })
    }

    /// Render the page: the form, plus the report when a run happened
    pub fn render(&self, form: &AnalysisForm, report: Option<&Report>) -> Result<String> {
        let data = PageData {
            title: "Google Search Analysis (Google Trends)",
            version: env!("CARGO_PKG_VERSION"),
            notes: USAGE_NOTES,
            form: FormData::from(form),
            report: report.map(ReportData::from),
        };
        Ok(self.handlebars.render("dashboard", &data)?)
    }
}

/// Render a table as aligned plain text
fn text_table(table: &Table) -> String {
    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|r| r.iter().map(ToString::to_string).collect())
        .collect();

    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let mut out = String::new();
    let line = |values: &[String], out: &mut String| {
        let padded: Vec<String> = values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{v:<width$}", width = widths.get(i).copied().unwrap_or(0)))
            .collect();
        let _ = writeln!(out, "  {}", padded.join("  ").trim_end());
    };

    line(&table.columns, &mut out);
    for row in &cells {
        line(row, &mut out);
    }
    out
}

fn text_stage<T>(out: &mut String, heading: &str, stage: &Stage<T>, body: impl FnOnce(&T, &mut String)) {
    let _ = writeln!(out, "\n== {heading} ==");
    match stage {
        Stage::Ready(view) => body(view, out),
        Stage::Empty(msg) => {
            let _ = writeln!(out, "WARNING: {msg}");
        }
        Stage::Failed(msg) => {
            let _ = writeln!(out, "ERROR: {msg}");
        }
    }
}

/// Render a report for the terminal
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();

    if let Some(err) = &report.validation_error {
        let _ = writeln!(out, "ERROR: {err}");
        return out;
    }

    if let Some(summary) = &report.summary {
        let _ = writeln!(out, "{summary}");
    }

    if let Some(err) = &report.fatal_error {
        let _ = writeln!(out, "ERROR: {err}");
        let _ = writeln!(out, "{FATAL_TIP}");
        return out;
    }

    if let Some(stage) = &report.time_series {
        text_stage(&mut out, "Interest over time", stage, |view, out| {
            out.push_str(&text_table(&view.table));
            let _ = writeln!(out, "Lines: {}", view.chart.series.len());
        });
    }

    if let Some(stage) = &report.regions {
        text_stage(&mut out, "Interest by region", stage, |view, out| {
            out.push_str(&text_table(&view.table));
            if let MapView::Unavailable(note) = &view.map {
                let _ = writeln!(out, "{note}");
            }
        });
    }

    if let Some(stage) = &report.related {
        text_stage(&mut out, "Related queries", stage, |views, out| {
            for view in views {
                let _ = writeln!(out, "\n[{}]", view.keyword);
                if view.is_empty() {
                    let _ = writeln!(out, "{NO_RELATED_NOTE}");
                    continue;
                }
                if let Some(top) = &view.top {
                    let _ = writeln!(out, "Top related queries");
                    out.push_str(&text_table(&top.table));
                }
                if let Some(rising) = &view.rising {
                    let _ = writeln!(out, "Rising related queries");
                    out.push_str(&text_table(&rising.table));
                }
            }
        });
    }

    if report.complete {
        let _ = writeln!(out, "\n{COMPLETE_NOTE}");
    }

    out
}
