//! Common test utilities

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use trendscope::models::{
    QueryParameters, RankedList, RankedQuery, RegionResult, RegionRow, RelatedQueryEntry,
    RelatedQueryResult, Resolution, TimeSeriesResult, TimeSeriesRow,
};
use trendscope::trends::TrendsSource;
use trendscope::utils::error::FetchError;

/// Explore response prefix (4 characters)
pub const EXPLORE_PREFIX: &str = ")]}'";

/// Widget data response prefix (5 characters)
pub const WIDGET_PREFIX: &str = ")]}',";

/// Explore response with one widget per view and a related-queries
/// widget per keyword
#[allow(dead_code)]
pub fn explore_body(keywords: &[&str]) -> String {
    let mut widgets = vec![
        json!({
            "id": "TIMESERIES",
            "token": "ts-token",
            "request": { "time": "2024-01-01 2024-12-31", "resolution": "WEEK" }
        }),
        json!({
            "id": "GEO_MAP",
            "token": "geo-token",
            "request": { "geo": {}, "resolution": "COUNTRY" }
        }),
    ];

    for (idx, keyword) in keywords.iter().enumerate() {
        widgets.push(json!({
            "id": "RELATED_QUERIES",
            "token": format!("rq-{idx}"),
            "request": {
                "restriction": {
                    "complexKeywordsRestriction": {
                        "keyword": [{ "type": "BROAD", "value": keyword }]
                    }
                }
            }
        }));
    }

    format!("{EXPLORE_PREFIX}{}", json!({ "widgets": widgets }))
}

/// Prefix a widget data payload
#[allow(dead_code)]
pub fn widget_body(payload: Value) -> String {
    format!("{WIDGET_PREFIX}{payload}")
}

/// Canned trends source that records what it was asked
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeSource {
    pub time_series: Option<Result<TimeSeriesResult, String>>,
    pub regions: Option<Result<RegionResult, String>>,
    pub related: Option<Result<RelatedQueryResult, String>>,
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<QueryParameters>>,
    pub resolutions: Mutex<Vec<Resolution>>,
}

#[allow(dead_code)]
impl FakeSource {
    /// Source answering every stage with data for `keywords`
    pub fn with_data(keywords: &[&str]) -> Self {
        Self {
            time_series: Some(Ok(time_series(keywords))),
            regions: Some(Ok(regions(keywords))),
            related: Some(Ok(related(keywords))),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self, params: &QueryParameters) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(params.clone());
    }
}

#[allow(dead_code)]
fn answer<T: Clone + Default>(canned: &Option<Result<T, String>>) -> Result<T, FetchError> {
    match canned {
        Some(Ok(value)) => Ok(value.clone()),
        Some(Err(msg)) => Err(FetchError::new(msg.clone())),
        None => Ok(T::default()),
    }
}

#[async_trait]
impl TrendsSource for FakeSource {
    async fn fetch_time_series(
        &self,
        params: &QueryParameters,
    ) -> Result<TimeSeriesResult, FetchError> {
        self.record(params);
        answer(&self.time_series)
    }

    async fn fetch_by_region(
        &self,
        params: &QueryParameters,
        resolution: Resolution,
    ) -> Result<RegionResult, FetchError> {
        self.record(params);
        self.resolutions.lock().unwrap().push(resolution);
        answer(&self.regions)
    }

    async fn fetch_related_queries(
        &self,
        params: &QueryParameters,
    ) -> Result<RelatedQueryResult, FetchError> {
        self.record(params);
        answer(&self.related)
    }
}

/// Three weekly points per keyword
#[allow(dead_code)]
pub fn time_series(keywords: &[&str]) -> TimeSeriesResult {
    let rows = (0..3)
        .map(|week| TimeSeriesRow {
            date: Utc.with_ymd_and_hms(2024, 1, 1 + week * 7, 0, 0, 0).unwrap(),
            values: (0..keywords.len())
                .map(|k| i64::from(week) * 10 + k as i64)
                .collect(),
        })
        .collect();

    TimeSeriesResult {
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        rows,
    }
}

/// Two named countries
#[allow(dead_code)]
pub fn regions(keywords: &[&str]) -> RegionResult {
    let row = |name: &str, code: &str, base: i64| RegionRow {
        geo_name: Some(name.to_string()),
        geo_code: Some(code.to_string()),
        values: (0..keywords.len()).map(|k| base - k as i64).collect(),
    };

    RegionResult {
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        rows: vec![row("India", "IN", 60), row("United States", "US", 100)],
    }
}

/// Top list only for the first keyword, nothing for the rest
#[allow(dead_code)]
pub fn related(keywords: &[&str]) -> RelatedQueryResult {
    let mut result = RelatedQueryResult::default();
    if let Some(first) = keywords.first() {
        result.insert(
            *first,
            RelatedQueryEntry {
                top: Some(RankedList {
                    rows: vec![RankedQuery {
                        query: format!("{first} tutorial"),
                        value: 100,
                        formatted_value: "100".to_string(),
                    }],
                }),
                rising: Some(RankedList::default()),
            },
        );
    }
    result
}
