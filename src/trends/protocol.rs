//! Wire types of the trends web protocol
//!
//! An analysis starts with one *explore* call that returns a widget per view
//! (token + request object). Each view is then fetched from a *widgetdata*
//! endpoint with that widget's request and token.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{
    QueryParameters, RankedList, RankedQuery, RegionResult, RegionRow, RelatedQueryEntry,
    Resolution, TimeSeriesResult, TimeSeriesRow,
};
use crate::utils::error::FetchError;

/// Characters of anti-JSON prefix on explore responses
pub const EXPLORE_TRIM: usize = 4;

/// Characters of anti-JSON prefix on widgetdata responses
pub const WIDGET_TRIM: usize = 5;

pub const TIMESERIES_WIDGET: &str = "TIMESERIES";
pub const GEO_MAP_WIDGET: &str = "GEO_MAP";
pub const RELATED_QUERIES_WIDGET: &str = "RELATED_QUERIES";

/// One keyword entry of the explore payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonItem {
    pub keyword: String,
    pub time: String,
    pub geo: String,
}

/// Body of the explore `req` parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplorePayload {
    #[serde(rename = "comparisonItem")]
    pub comparison_item: Vec<ComparisonItem>,
    pub category: u32,
    pub property: String,
}

impl ExplorePayload {
    /// Build the payload for a set of query parameters
    pub fn from_params(params: &QueryParameters) -> Self {
        let comparison_item = params
            .keywords()
            .iter()
            .map(|keyword| ComparisonItem {
                keyword: keyword.clone(),
                time: params.timeframe().as_token().to_string(),
                geo: params.geo().to_string(),
            })
            .collect();

        Self {
            comparison_item,
            category: params.category(),
            property: String::new(),
        }
    }
}

/// View descriptor returned by explore
#[derive(Debug, Clone, Deserialize)]
pub struct Widget {
    pub id: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub request: Value,
}

impl Widget {
    /// Keyword a related-queries widget is restricted to
    pub fn restricted_keyword(&self) -> Option<&str> {
        self.request
            .pointer("/restriction/complexKeywordsRestriction/keyword/0/value")
            .and_then(Value::as_str)
    }
}

#[derive(Debug, Deserialize)]
pub struct ExploreResponse {
    #[serde(default)]
    pub widgets: Vec<Widget>,
}

impl ExploreResponse {
    /// Widget with exactly this id
    pub fn widget(&self, id: &str) -> Result<&Widget, FetchError> {
        self.widgets
            .iter()
            .find(|w| w.id == id)
            .ok_or_else(|| FetchError::new(format!("Explore response has no {id} widget")))
    }

    /// Widgets whose id starts with `prefix`, in response order
    pub fn widgets_with_prefix(&self, prefix: &str) -> Vec<&Widget> {
        self.widgets
            .iter()
            .filter(|w| w.id.starts_with(prefix))
            .collect()
    }
}

/// Adjust a GEO_MAP widget request for the requested resolution
///
/// The service only honors a resolution for worldwide queries, or for
/// sub-country resolutions within the US.
pub fn apply_resolution(request: &mut Value, geo: &str, resolution: Resolution) {
    let Some(obj) = request.as_object_mut() else {
        return;
    };

    if geo.is_empty() || (geo == "US" && resolution != Resolution::Country) {
        obj.insert(
            "resolution".to_string(),
            Value::String(resolution.as_str().to_string()),
        );
    }
    obj.insert("includeLowSearchVolumeGeos".to_string(), Value::Bool(false));
}

// ============================================================================
// Widget data responses
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct MultilineResponse {
    pub default: MultilineData,
}

#[derive(Debug, Deserialize)]
pub struct MultilineData {
    #[serde(rename = "timelineData", default)]
    pub timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
pub struct TimelinePoint {
    /// Unix seconds, as a string
    pub time: String,
    #[serde(default)]
    pub value: Vec<i64>,
    #[serde(rename = "isPartial", default)]
    pub is_partial: bool,
}

impl MultilineResponse {
    /// Convert to a time series, dropping the partial-period flag
    pub fn into_result(self, keywords: &[String]) -> Result<TimeSeriesResult, FetchError> {
        let partial = self
            .default
            .timeline_data
            .iter()
            .filter(|p| p.is_partial)
            .count();
        if partial > 0 {
            tracing::debug!(partial, "Timeline carries partial-period points");
        }

        let rows = self
            .default
            .timeline_data
            .into_iter()
            .map(|point| {
                let secs: i64 = point.time.parse().map_err(|_| {
                    FetchError::new(format!("Invalid timeline timestamp: {}", point.time))
                })?;
                let date = DateTime::from_timestamp(secs, 0).ok_or_else(|| {
                    FetchError::new(format!("Timeline timestamp out of range: {secs}"))
                })?;

                let mut values = point.value;
                values.resize(keywords.len(), 0);
                Ok(TimeSeriesRow { date, values })
            })
            .collect::<Result<Vec<_>, FetchError>>()?;

        Ok(TimeSeriesResult {
            keywords: keywords.to_vec(),
            rows,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ComparedGeoResponse {
    pub default: ComparedGeoData,
}

#[derive(Debug, Deserialize)]
pub struct ComparedGeoData {
    #[serde(rename = "geoMapData", default)]
    pub geo_map_data: Vec<GeoMapEntry>,
}

#[derive(Debug, Deserialize)]
pub struct GeoMapEntry {
    #[serde(rename = "geoName")]
    pub geo_name: Option<String>,
    #[serde(rename = "geoCode")]
    pub geo_code: Option<String>,
    #[serde(default)]
    pub value: Vec<i64>,
}

impl ComparedGeoResponse {
    pub fn into_result(self, keywords: &[String]) -> RegionResult {
        let rows = self
            .default
            .geo_map_data
            .into_iter()
            .map(|entry| {
                let mut values = entry.value;
                values.resize(keywords.len(), 0);
                RegionRow {
                    geo_name: entry.geo_name,
                    geo_code: entry.geo_code,
                    values,
                }
            })
            .collect();

        RegionResult {
            keywords: keywords.to_vec(),
            rows,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RelatedSearchesResponse {
    pub default: RelatedSearchesData,
}

#[derive(Debug, Deserialize)]
pub struct RelatedSearchesData {
    #[serde(rename = "rankedList", default)]
    pub ranked_list: Vec<RankedListData>,
}

#[derive(Debug, Deserialize)]
pub struct RankedListData {
    #[serde(rename = "rankedKeyword", default)]
    pub ranked_keyword: Vec<RankedKeywordData>,
}

#[derive(Debug, Deserialize)]
pub struct RankedKeywordData {
    pub query: String,
    #[serde(default)]
    pub value: i64,
    #[serde(rename = "formattedValue", default)]
    pub formatted_value: String,
}

impl From<RankedListData> for RankedList {
    fn from(list: RankedListData) -> Self {
        Self {
            rows: list
                .ranked_keyword
                .into_iter()
                .map(|k| RankedQuery {
                    query: k.query,
                    value: k.value,
                    formatted_value: k.formatted_value,
                })
                .collect(),
        }
    }
}

impl RelatedSearchesResponse {
    /// Split into the top (first) and rising (second) lists
    pub fn into_entry(self) -> RelatedQueryEntry {
        let mut lists = self.default.ranked_list.into_iter();
        RelatedQueryEntry {
            top: lists.next().map(RankedList::from),
            rising: lists.next().map(RankedList::from),
        }
    }
}

/// Strip the first `n` characters of a response body
pub fn trim_prefix(body: &str, n: usize) -> &str {
    match body.char_indices().nth(n) {
        Some((idx, _)) => &body[idx..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Timeframe;
    use serde_json::json;

    fn params(keywords: &[&str], geo: &str) -> QueryParameters {
        QueryParameters::new(
            keywords.iter().map(|k| k.to_string()).collect(),
            Timeframe::Past12Months,
            geo,
            Resolution::Country,
            0,
        )
        .unwrap()
    }

    #[test]
    fn test_explore_payload_shape() {
        let payload = ExplorePayload::from_params(&params(&["python", "java"], ""));
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "comparisonItem": [
                    {"keyword": "python", "time": "today 12-m", "geo": ""},
                    {"keyword": "java", "time": "today 12-m", "geo": ""}
                ],
                "category": 0,
                "property": ""
            })
        );
    }

    #[test]
    fn test_trim_prefix() {
        assert_eq!(trim_prefix(")]}'{\"a\":1}", EXPLORE_TRIM), "{\"a\":1}");
        assert_eq!(trim_prefix(")]}',\n{}", WIDGET_TRIM), "\n{}");
        assert_eq!(trim_prefix("abc", 5), "");
    }

    #[test]
    fn test_apply_resolution_worldwide() {
        let mut request = json!({"geo": {}});
        apply_resolution(&mut request, "", Resolution::City);
        assert_eq!(request["resolution"], "CITY");
        assert_eq!(request["includeLowSearchVolumeGeos"], false);
    }

    #[test]
    fn test_apply_resolution_country_scoped() {
        let mut request = json!({"geo": {"country": "DE"}});
        apply_resolution(&mut request, "DE", Resolution::Subregion);
        assert!(request.get("resolution").is_none());

        let mut request = json!({"geo": {"country": "US"}});
        apply_resolution(&mut request, "US", Resolution::Subregion);
        assert_eq!(request["resolution"], "REGION");

        let mut request = json!({"geo": {"country": "US"}});
        apply_resolution(&mut request, "US", Resolution::Country);
        assert!(request.get("resolution").is_none());
    }

    #[test]
    fn test_multiline_into_result() {
        let response: MultilineResponse = serde_json::from_value(json!({
            "default": {
                "timelineData": [
                    {"time": "1704585600", "value": [40, 60]},
                    {"time": "1705190400", "value": [45], "isPartial": true}
                ]
            }
        }))
        .unwrap();

        let keywords = vec!["python".to_string(), "java".to_string()];
        let result = response.into_result(&keywords).unwrap();
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[1].values, vec![45, 0]);
        assert_eq!(result.to_table().columns, vec!["date", "python", "java"]);
        assert_eq!(result.to_table().rows[0][0].to_string(), "2024-01-07");
    }

    #[test]
    fn test_multiline_bad_timestamp() {
        let response: MultilineResponse = serde_json::from_value(json!({
            "default": {"timelineData": [{"time": "yesterday", "value": [1]}]}
        }))
        .unwrap();
        assert!(response.into_result(&["a".to_string()]).is_err());
    }

    #[test]
    fn test_related_entry_split() {
        let response: RelatedSearchesResponse = serde_json::from_value(json!({
            "default": {
                "rankedList": [
                    {"rankedKeyword": [{"query": "python list", "value": 100, "formattedValue": "100"}]},
                    {"rankedKeyword": [{"query": "python 3.13", "value": 250, "formattedValue": "+250%"}]}
                ]
            }
        }))
        .unwrap();

        let entry = response.into_entry();
        assert_eq!(entry.top.unwrap().rows[0].query, "python list");
        assert_eq!(entry.rising.unwrap().rows[0].formatted_value, "+250%");
    }

    #[test]
    fn test_related_entry_missing_lists() {
        let response: RelatedSearchesResponse =
            serde_json::from_value(json!({"default": {}})).unwrap();
        let entry = response.into_entry();
        assert!(entry.top.is_none());
        assert!(entry.rising.is_none());
    }

    #[test]
    fn test_widget_keyword_restriction() {
        let widget: Widget = serde_json::from_value(json!({
            "id": "RELATED_QUERIES_1",
            "token": "t",
            "request": {"restriction": {"complexKeywordsRestriction": {"keyword": [{"type": "BROAD", "value": "java"}]}}}
        }))
        .unwrap();
        assert_eq!(widget.restricted_keyword(), Some("java"));
    }
}
