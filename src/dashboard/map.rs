//! World choropleth of regional interest
//!
//! The map is a Plotly figure built server-side and drawn by plotly.js in
//! the page. Regions are located by country name.

use serde::Serialize;
use serde_json::{json, Value};

use crate::models::RegionResult;
use crate::utils::error::MapError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethFigure {
    pub title: String,
    pub column: String,
    pub locations: Vec<String>,
    pub values: Vec<i64>,
}

impl ChoroplethFigure {
    /// Build a figure colored by `column`, or by the last keyword column
    /// when `column` is not part of the result
    pub fn build(result: &RegionResult, column: &str) -> Result<Self, MapError> {
        if result.is_empty() {
            return Err(MapError::NoRegions);
        }

        let missing = result.rows.iter().filter(|r| r.geo_name.is_none()).count();
        if missing > 0 {
            return Err(MapError::MissingNames(missing));
        }

        let idx = match result.keywords.iter().position(|k| k == column) {
            Some(idx) => idx,
            None => result
                .keywords
                .len()
                .checked_sub(1)
                .ok_or_else(|| MapError::ColumnNotFound(column.to_string()))?,
        };
        let column = result.keywords[idx].clone();

        let mut locations = Vec::with_capacity(result.rows.len());
        let mut values = Vec::with_capacity(result.rows.len());
        for row in &result.rows {
            let value = row
                .values
                .get(idx)
                .copied()
                .ok_or_else(|| MapError::ColumnNotFound(column.clone()))?;
            locations.push(row.geo_name.clone().unwrap_or_default());
            values.push(value);
        }

        Ok(Self {
            title: format!("Top regions for {column}"),
            column,
            locations,
            values,
        })
    }

    /// Plotly figure JSON (`{data, layout}`)
    pub fn to_plotly(&self) -> Value {
        json!({
            "data": [{
                "type": "choropleth",
                "locationmode": "country names",
                "locations": self.locations,
                "z": self.values,
                "text": self.locations,
                "hoverinfo": "text+z",
                "colorscale": "Plasma",
                "colorbar": {"title": {"text": self.column}}
            }],
            "layout": {
                "title": {"text": self.title},
                "geo": {"showframe": false, "projection": {"type": "natural earth"}},
                "margin": {"l": 0, "r": 0, "t": 48, "b": 0}
            }
        })
    }

    /// Figure JSON safe to embed inside a `<script>` element
    pub fn to_script_json(&self) -> String {
        self.to_plotly().to_string().replace("</", "<\\/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RegionRow;

    fn result(names: &[Option<&str>]) -> RegionResult {
        RegionResult {
            keywords: vec!["python".into(), "java".into()],
            rows: names
                .iter()
                .enumerate()
                .map(|(i, n)| RegionRow {
                    geo_name: n.map(str::to_string),
                    geo_code: None,
                    values: vec![100 - i as i64, 10 + i as i64],
                })
                .collect(),
        }
    }

    #[test]
    fn test_build_by_primary_keyword() {
        let fig = ChoroplethFigure::build(&result(&[Some("India"), Some("Kenya")]), "python")
            .unwrap();
        assert_eq!(fig.locations, vec!["India", "Kenya"]);
        assert_eq!(fig.values, vec![100, 99]);
        assert_eq!(fig.title, "Top regions for python");
    }

    #[test]
    fn test_unknown_column_falls_back_to_last() {
        let fig = ChoroplethFigure::build(&result(&[Some("India")]), "rust").unwrap();
        assert_eq!(fig.column, "java");
        assert_eq!(fig.values, vec![10]);
    }

    #[test]
    fn test_missing_names_fail() {
        let err = ChoroplethFigure::build(&result(&[Some("India"), None]), "python");
        assert_eq!(err.unwrap_err(), MapError::MissingNames(1));
    }

    #[test]
    fn test_empty_fails() {
        let err = ChoroplethFigure::build(&result(&[]), "python");
        assert_eq!(err.unwrap_err(), MapError::NoRegions);
    }

    #[test]
    fn test_script_json_escapes_closing_tags() {
        let fig = ChoroplethFigure::build(&result(&[Some("</script>")]), "python").unwrap();
        let json = fig.to_script_json();
        assert!(!json.contains("</script>"));
        assert_eq!(fig.to_plotly()["data"][0]["type"], "choropleth");
    }
}
