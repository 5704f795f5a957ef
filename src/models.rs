// Core data structures for trendscope

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::error::ValidationError;

/// Highest category id accepted by the trends service
pub const MAX_CATEGORY: u32 = 700;

/// Relative date range understood by the trends service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[default]
    #[serde(rename = "today 12-m")]
    Past12Months,
    #[serde(rename = "today 3-m")]
    Past3Months,
    #[serde(rename = "today 1-m")]
    PastMonth,
    #[serde(rename = "now 7-d")]
    Past7Days,
    #[serde(rename = "all")]
    All,
}

impl Timeframe {
    /// Wire token sent in the explore payload
    pub fn as_token(&self) -> &'static str {
        match self {
            Self::Past12Months => "today 12-m",
            Self::Past3Months => "today 3-m",
            Self::PastMonth => "today 1-m",
            Self::Past7Days => "now 7-d",
            Self::All => "all",
        }
    }

    /// Label for selectors
    pub fn label(&self) -> &'static str {
        match self {
            Self::Past12Months => "Past 12 months",
            Self::Past3Months => "Past 3 months",
            Self::PastMonth => "Past month",
            Self::Past7Days => "Past 7 days",
            Self::All => "2004 - present",
        }
    }

    /// Parse a wire token
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        Self::all()
            .into_iter()
            .find(|t| t.as_token() == s.trim())
            .ok_or_else(|| ValidationError::UnknownTimeframe(s.to_string()))
    }

    /// Get all timeframes in selector order
    pub fn all() -> Vec<Self> {
        vec![
            Self::Past12Months,
            Self::Past3Months,
            Self::PastMonth,
            Self::Past7Days,
            Self::All,
        ]
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_token())
    }
}

/// Granularity of geographic aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    #[serde(rename = "COUNTRY")]
    Country,
    #[serde(rename = "REGION")]
    Subregion,
    #[serde(rename = "CITY")]
    City,
}

impl Resolution {
    /// Wire name used by the trends service
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Country => "COUNTRY",
            Self::Subregion => "REGION",
            Self::City => "CITY",
        }
    }

    /// Parse a wire name (case-insensitive)
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_uppercase().as_str() {
            "COUNTRY" => Ok(Self::Country),
            "REGION" | "SUBREGION" => Ok(Self::Subregion),
            "CITY" => Ok(Self::City),
            _ => Err(ValidationError::UnknownResolution(s.to_string())),
        }
    }

    /// Get all resolutions in selector order
    pub fn all() -> Vec<Self> {
        vec![Self::Country, Self::Subregion, Self::City]
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parameters of a single analysis request
///
/// Validated on construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryParameters {
    keywords: Vec<String>,
    timeframe: Timeframe,
    geo: String,
    resolution: Resolution,
    category: u32,
}

impl QueryParameters {
    /// Create validated parameters
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NoKeywords` when `keywords` is empty and
    /// `ValidationError::CategoryOutOfRange` when `category` exceeds
    /// [`MAX_CATEGORY`].
    pub fn new(
        keywords: Vec<String>,
        timeframe: Timeframe,
        geo: impl Into<String>,
        resolution: Resolution,
        category: u32,
    ) -> Result<Self, ValidationError> {
        if keywords.is_empty() {
            return Err(ValidationError::NoKeywords);
        }
        if category > MAX_CATEGORY {
            return Err(ValidationError::CategoryOutOfRange {
                value: category,
                max: MAX_CATEGORY,
            });
        }

        Ok(Self {
            keywords,
            timeframe,
            geo: geo.into().trim().to_uppercase(),
            resolution,
            category,
        })
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// First keyword, used for ranking and map coloring
    pub fn primary_keyword(&self) -> &str {
        &self.keywords[0]
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Geography code, empty for worldwide
    pub fn geo(&self) -> &str {
        &self.geo
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn category(&self) -> u32 {
        self.category
    }

    /// Geography label for display
    pub fn geo_label(&self) -> &str {
        if self.geo.is_empty() {
            "WORLDWIDE"
        } else {
            &self.geo
        }
    }
}

/// A single table cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Int(i64),
}

impl Cell {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Int(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

/// Generic result table: named columns and rows of cells
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// First `n` rows, keeping the header
    #[must_use]
    pub fn head(&self, n: usize) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

/// One date of the interest-over-time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRow {
    pub date: DateTime<Utc>,
    /// Interest per keyword, in keyword order
    pub values: Vec<i64>,
}

/// Interest over time, one column per keyword
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesResult {
    pub keywords: Vec<String>,
    pub rows: Vec<TimeSeriesRow>,
}

impl TimeSeriesResult {
    pub fn empty(keywords: Vec<String>) -> Self {
        Self {
            keywords,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values for one keyword, paired with their dates
    pub fn series(&self, keyword: &str) -> Option<Vec<(DateTime<Utc>, i64)>> {
        let idx = self.keywords.iter().position(|k| k == keyword)?;
        Some(
            self.rows
                .iter()
                .filter_map(|r| r.values.get(idx).map(|v| (r.date, *v)))
                .collect(),
        )
    }

    /// Whether every timestamp falls on midnight (daily or coarser data)
    fn is_daily(&self) -> bool {
        self.rows
            .iter()
            .all(|r| r.date.hour() == 0 && r.date.minute() == 0 && r.date.second() == 0)
    }

    /// Convert to a `date` + keyword-columns table
    pub fn to_table(&self) -> Table {
        let daily = self.is_daily();
        let mut columns = vec!["date".to_string()];
        columns.extend(self.keywords.iter().cloned());

        let mut table = Table::new(columns);
        for row in &self.rows {
            let date = if daily {
                row.date.format("%Y-%m-%d").to_string()
            } else {
                row.date.format("%Y-%m-%d %H:%M:%S").to_string()
            };
            let mut cells = vec![Cell::Text(date)];
            cells.extend(row.values.iter().map(|v| Cell::Int(*v)));
            table.push_row(cells);
        }
        table
    }
}

/// One region of the aggregated interest result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRow {
    pub geo_name: Option<String>,
    pub geo_code: Option<String>,
    /// Interest per keyword, in keyword order
    pub values: Vec<i64>,
}

/// Interest aggregated by region, one column per keyword
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionResult {
    pub keywords: Vec<String>,
    pub rows: Vec<RegionRow>,
}

impl RegionResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether every row carries a region name
    pub fn has_region_names(&self) -> bool {
        !self.rows.is_empty() && self.rows.iter().all(|r| r.geo_name.is_some())
    }

    /// Top `n` regions by the first keyword's interest, descending
    ///
    /// Ties keep the source order.
    #[must_use]
    pub fn top_by_first_keyword(&self, n: usize) -> Self {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| {
            let av = a.values.first().copied().unwrap_or(i64::MIN);
            let bv = b.values.first().copied().unwrap_or(i64::MIN);
            bv.cmp(&av)
        });
        rows.truncate(n);

        Self {
            keywords: self.keywords.clone(),
            rows,
        }
    }

    /// Convert to a `geoName` + keyword-columns table
    pub fn to_table(&self) -> Table {
        let mut columns = vec!["geoName".to_string()];
        columns.extend(self.keywords.iter().cloned());

        let mut table = Table::new(columns);
        for row in &self.rows {
            let mut cells = vec![Cell::Text(row.geo_name.clone().unwrap_or_default())];
            cells.extend(row.values.iter().map(|v| Cell::Int(*v)));
            table.push_row(cells);
        }
        table
    }
}

/// One related query with its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedQuery {
    pub query: String,
    pub value: i64,
    /// Score as shown by the service, e.g. "+250%" or "Breakout"
    pub formatted_value: String,
}

/// Ranked list of related queries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedList {
    pub rows: Vec<RankedQuery>,
}

impl RankedList {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Convert to a `query` + `value` table
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(vec!["query".to_string(), "value".to_string()]);
        for row in &self.rows {
            table.push_row(vec![Cell::Text(row.query.clone()), Cell::Int(row.value)]);
        }
        table
    }
}

/// Related queries for one keyword
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelatedQueryEntry {
    pub top: Option<RankedList>,
    pub rising: Option<RankedList>,
}

impl RelatedQueryEntry {
    /// Whether neither list carries any row
    pub fn is_empty(&self) -> bool {
        self.top.as_ref().map_or(true, RankedList::is_empty)
            && self.rising.as_ref().map_or(true, RankedList::is_empty)
    }
}

/// Related queries per keyword, in request order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelatedQueryResult {
    pub entries: Vec<(String, RelatedQueryEntry)>,
}

impl RelatedQueryResult {
    pub fn insert(&mut self, keyword: impl Into<String>, entry: RelatedQueryEntry) {
        self.entries.push((keyword.into(), entry));
    }

    /// Entry for a keyword, if the service returned one
    pub fn get(&self, keyword: &str) -> Option<&RelatedQueryEntry> {
        self.entries
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, e)| e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn region(name: &str, value: i64) -> RegionRow {
        RegionRow {
            geo_name: Some(name.to_string()),
            geo_code: None,
            values: vec![value],
        }
    }

    #[test]
    fn test_timeframe_tokens() {
        assert_eq!(Timeframe::default().as_token(), "today 12-m");
        assert_eq!(Timeframe::parse("now 7-d").unwrap(), Timeframe::Past7Days);
        assert!(Timeframe::parse("today 5-y").is_err());
        assert_eq!(Timeframe::all().len(), 5);
    }

    #[test]
    fn test_resolution_parse() {
        assert_eq!(Resolution::parse("country").unwrap(), Resolution::Country);
        assert_eq!(Resolution::parse("REGION").unwrap(), Resolution::Subregion);
        assert_eq!(Resolution::Subregion.as_str(), "REGION");
        assert!(Resolution::parse("DMA").is_err());
    }

    #[test]
    fn test_query_parameters_validation() {
        let err = QueryParameters::new(vec![], Timeframe::All, "", Resolution::Country, 0);
        assert_eq!(err.unwrap_err(), ValidationError::NoKeywords);

        let err = QueryParameters::new(
            vec!["rust".into()],
            Timeframe::All,
            "",
            Resolution::Country,
            701,
        );
        assert!(matches!(
            err.unwrap_err(),
            ValidationError::CategoryOutOfRange { value: 701, .. }
        ));

        let params = QueryParameters::new(
            vec!["rust".into()],
            Timeframe::All,
            " us ",
            Resolution::City,
            700,
        )
        .unwrap();
        assert_eq!(params.geo(), "US");
        assert_eq!(params.geo_label(), "US");
    }

    #[test]
    fn test_geo_label_worldwide() {
        let params = QueryParameters::new(
            vec!["rust".into()],
            Timeframe::default(),
            "",
            Resolution::default(),
            0,
        )
        .unwrap();
        assert_eq!(params.geo_label(), "WORLDWIDE");
    }

    #[test]
    fn test_time_series_table_daily_dates() {
        let result = TimeSeriesResult {
            keywords: vec!["a".into(), "b".into()],
            rows: vec![TimeSeriesRow {
                date: Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 0).unwrap(),
                values: vec![40, 60],
            }],
        };
        let table = result.to_table();
        assert_eq!(table.columns, vec!["date", "a", "b"]);
        assert_eq!(table.rows[0][0], Cell::Text("2024-01-07".into()));
        assert_eq!(table.rows[0][2], Cell::Int(60));
    }

    #[test]
    fn test_time_series_table_hourly_dates() {
        let result = TimeSeriesResult {
            keywords: vec!["a".into()],
            rows: vec![TimeSeriesRow {
                date: Utc.with_ymd_and_hms(2024, 1, 7, 13, 0, 0).unwrap(),
                values: vec![40],
            }],
        };
        assert_eq!(
            result.to_table().rows[0][0],
            Cell::Text("2024-01-07 13:00:00".into())
        );
    }

    #[test]
    fn test_top_regions_sorted_and_truncated() {
        let result = RegionResult {
            keywords: vec!["rust".into()],
            rows: (0..30).map(|i| region(&format!("R{i}"), i)).collect(),
        };
        let top = result.top_by_first_keyword(20);
        assert_eq!(top.rows.len(), 20);
        assert_eq!(top.rows[0].values[0], 29);
        assert_eq!(top.rows[19].values[0], 10);
        assert!(top
            .rows
            .windows(2)
            .all(|w| w[0].values[0] >= w[1].values[0]));
    }

    #[test]
    fn test_top_regions_fewer_than_limit() {
        let result = RegionResult {
            keywords: vec!["rust".into()],
            rows: vec![region("A", 5), region("B", 50), region("C", 5)],
        };
        let top = result.top_by_first_keyword(20);
        let names: Vec<_> = top
            .rows
            .iter()
            .map(|r| r.geo_name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_region_names_presence() {
        let mut result = RegionResult {
            keywords: vec!["rust".into()],
            rows: vec![region("A", 5)],
        };
        assert!(result.has_region_names());
        result.rows[0].geo_name = None;
        assert!(!result.has_region_names());
        assert!(!RegionResult::default().has_region_names());
    }

    #[test]
    fn test_related_entry_lookup() {
        let mut related = RelatedQueryResult::default();
        related.insert("rust", RelatedQueryEntry::default());
        assert!(related.get("rust").unwrap().is_empty());
        assert!(related.get("go").is_none());
    }

    #[test]
    fn test_table_head() {
        let mut table = Table::new(vec!["query".into()]);
        for i in 0..15 {
            table.push_row(vec![Cell::Int(i)]);
        }
        assert_eq!(table.head(10).len(), 10);
        assert_eq!(table.head(100).len(), 15);
    }

    #[test]
    fn test_cell_display_and_json() {
        let cells = vec![Cell::Text("python".into()), Cell::Int(42)];
        let shown: Vec<String> = cells.iter().map(ToString::to_string).collect();
        assert_eq!(shown, vec!["python", "42"]);
        assert_eq!(serde_json::to_string(&cells).unwrap(), r#"["python",42]"#);
        assert_eq!(cells[1].as_int(), Some(42));
        assert_eq!(cells[0].as_int(), None);
    }
}
