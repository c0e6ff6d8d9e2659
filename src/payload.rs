//! Typed views over the backend's loosely-typed JSON payloads.
//!
//! The backend owns these shapes; the views only rearrange what arrives into
//! something a widget can draw, keeping key order as received. Shape
//! mismatches are reported as `Err(String)` for inline display.

use serde_json::{Map, Value};

/// Display form of a scalar: strings unquoted, everything else as JSON.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn expect_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, String> {
    value
        .as_object()
        .ok_or_else(|| format!("{}: expected a JSON object, got {}", what, describe(value)))
}

/// Numeric reading of a cell; numeric strings count, anything else is a gap.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn push_unique(keys: &mut Vec<String>, key: &str) {
    if !keys.iter().any(|k| k == key) {
        keys.push(key.to_string());
    }
}

// =============================================================================
// Flat mappings (scorecard, study summary)
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FieldMap {
    pub entries: Vec<(String, Value)>,
}

impl FieldMap {
    pub fn from_json(value: &Value, what: &str) -> Result<Self, String> {
        let map = expect_object(value, what)?;
        Ok(Self {
            entries: map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        })
    }
}

// =============================================================================
// Records table (high-risk subjects)
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Records {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<Value>>>,
}

impl Records {
    /// Accepts a list of records (`[{..}, {..}]`), a column-oriented
    /// mapping (`{"col": [..], ..}`) or a column-to-index mapping
    /// (`{"col": {"0": v, ..}, ..}`). Columns appear in order of first sight.
    pub fn from_json(value: &Value) -> Result<Self, String> {
        match value {
            Value::Array(items) => Self::from_records(items),
            Value::Object(map) if map.values().all(Value::is_array) => Ok(Self::from_columns(map)),
            Value::Object(map) if map.values().all(Value::is_object) => Ok(Self::from_indexed(map)),
            other => Err(format!(
                "high-risk list: expected an array of records, got {}",
                describe(other)
            )),
        }
    }

    fn from_records(items: &[Value]) -> Result<Self, String> {
        let mut columns = Vec::new();
        for (i, item) in items.iter().enumerate() {
            let rec = item
                .as_object()
                .ok_or_else(|| format!("high-risk list: record {} is {}, not an object", i, describe(item)))?;
            for key in rec.keys() {
                push_unique(&mut columns, key);
            }
        }
        let rows = items
            .iter()
            .filter_map(Value::as_object)
            .map(|rec| columns.iter().map(|c| rec.get(c).cloned()).collect())
            .collect();
        Ok(Self { columns, rows })
    }

    fn from_columns(map: &Map<String, Value>) -> Self {
        let columns: Vec<String> = map.keys().cloned().collect();
        let height = map
            .values()
            .filter_map(Value::as_array)
            .map(Vec::len)
            .max()
            .unwrap_or(0);
        let rows = (0..height)
            .map(|r| {
                map.values()
                    .map(|col| col.as_array().and_then(|a| a.get(r)).cloned())
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    fn from_indexed(map: &Map<String, Value>) -> Self {
        let mut index = Vec::new();
        for col in map.values().filter_map(Value::as_object) {
            for key in col.keys() {
                push_unique(&mut index, key);
            }
        }
        let columns: Vec<String> = map.keys().cloned().collect();
        let rows = index
            .iter()
            .map(|row| {
                map.values()
                    .map(|col| col.get(row.as_str()).cloned())
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    /// First `n` rows, like a dataframe head.
    pub fn head(mut self, n: usize) -> Self {
        self.rows.truncate(n);
        self
    }

    pub fn cell_text(cell: &Option<Value>) -> String {
        match cell {
            None | Some(Value::Null) => String::new(),
            Some(v) => format_value(v),
        }
    }
}

// =============================================================================
// Bar chart series (benchmarks)
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarData {
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

impl BarData {
    /// `{category: number}` is one series; `{series: {category: number}}`
    /// is one series per outer key over the union of categories.
    pub fn from_json(value: &Value) -> Result<Self, String> {
        let map = expect_object(value, "benchmarks")?;
        if !map.is_empty() && map.values().all(Value::is_object) {
            let mut categories = Vec::new();
            for inner in map.values().filter_map(Value::as_object) {
                for key in inner.keys() {
                    push_unique(&mut categories, key);
                }
            }
            let series = map
                .iter()
                .map(|(name, inner)| Series {
                    name: name.clone(),
                    values: categories
                        .iter()
                        .map(|c| inner.get(c).and_then(as_number))
                        .collect(),
                })
                .collect();
            return Ok(Self { categories, series });
        }
        Ok(Self {
            categories: map.keys().cloned().collect(),
            series: vec![Series {
                name: "value".to_string(),
                values: map.values().map(as_number).collect(),
            }],
        })
    }

    /// Largest absolute value across all series, for bar scaling.
    pub fn max_abs(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().flatten())
            .fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }
}

// =============================================================================
// Correlation matrix (heatmap)
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub columns: Vec<String>,
    pub rows: Vec<String>,
    /// `cells[row][col]`
    pub cells: Vec<Vec<Option<f64>>>,
}

impl Matrix {
    /// Outer keys are columns, inner keys are row labels.
    pub fn from_json(value: &Value) -> Result<Self, String> {
        let map = expect_object(value, "heatmap")?;
        let mut rows = Vec::new();
        for (col, inner) in map {
            let inner = inner.as_object().ok_or_else(|| {
                format!("heatmap: column {:?} is {}, not an object", col, describe(inner))
            })?;
            for key in inner.keys() {
                push_unique(&mut rows, key);
            }
        }
        let columns: Vec<String> = map.keys().cloned().collect();
        let cells = rows
            .iter()
            .map(|r| {
                map.values()
                    .map(|inner| inner.get(r).and_then(as_number))
                    .collect()
            })
            .collect();
        Ok(Self { columns, rows, cells })
    }

    /// Min and max of one column, ignoring gaps.
    pub fn column_range(&self, col: usize) -> Option<(f64, f64)> {
        let mut values = self.cells.iter().filter_map(|row| row.get(col).copied().flatten());
        let first = values.next()?;
        Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// Position of a cell within its column's range, 0.0..=1.0. A constant
    /// column sits at the midpoint.
    pub fn normalized(&self, row: usize, col: usize) -> Option<f64> {
        let v = self.cells.get(row)?.get(col).copied().flatten()?;
        let (lo, hi) = self.column_range(col)?;
        if (hi - lo).abs() < f64::EPSILON {
            return Some(0.5);
        }
        Some((v - lo) / (hi - lo))
    }
}

// =============================================================================
// AI payloads
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeatmapInsight {
    Analysis(String),
    Error(String),
}

impl HeatmapInsight {
    pub fn from_json(value: &Value) -> Result<Self, String> {
        let map = expect_object(value, "heatmap insight")?;
        if let Some(analysis) = map.get("analysis") {
            return Ok(HeatmapInsight::Analysis(format_value(analysis)));
        }
        Ok(HeatmapInsight::Error(
            map.get("error")
                .map(format_value)
                .unwrap_or_else(|| "Unknown error".to_string()),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CraEmail {
    Drafted { prompt: String, email: String },
    Failed { error: String, prompt: String },
}

impl CraEmail {
    pub fn from_json(value: &Value) -> Result<Self, String> {
        let map = expect_object(value, "CRA email")?;
        if let Some(error) = map.get("error") {
            return Ok(CraEmail::Failed {
                error: format_value(error),
                prompt: map.get("prompt").map(format_value).unwrap_or_default(),
            });
        }
        let field = |name: &str| {
            map.get(name)
                .map(format_value)
                .ok_or_else(|| format!("CRA email: missing field `{}`", name))
        };
        Ok(CraEmail::Drafted {
            prompt: field("prompt")?,
            email: field("email")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&json!("Open")), "Open");
        assert_eq!(format_value(&json!(0.875)), "0.875");
        assert_eq!(format_value(&json!(12)), "12");
        assert_eq!(format_value(&json!(null)), "null");
        assert_eq!(format_value(&json!(true)), "true");
    }

    #[test]
    fn test_field_map_keeps_order() {
        let v = json!({"total_subjects": 1200, "avg_dqi": 81.5, "open_queries": 43});
        let fm = FieldMap::from_json(&v, "scorecard").unwrap();
        let keys: Vec<&str> = fm.entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["total_subjects", "avg_dqi", "open_queries"]);
    }

    #[test]
    fn test_field_map_rejects_array() {
        let err = FieldMap::from_json(&json!([1, 2]), "scorecard").unwrap_err();
        assert!(err.contains("expected a JSON object"));
        assert!(err.contains("an array"));
    }

    #[test]
    fn test_records_union_columns_and_gaps() {
        let v = json!([
            {"subject": "S-001", "site": 4, "dqi": 41.0},
            {"subject": "S-002", "risk": "High"},
        ]);
        let recs = Records::from_json(&v).unwrap();
        assert_eq!(recs.columns, vec!["subject", "site", "dqi", "risk"]);
        assert_eq!(Records::cell_text(&recs.rows[1][1]), "");
        assert_eq!(Records::cell_text(&recs.rows[1][3]), "High");
    }

    #[test]
    fn test_records_column_oriented() {
        let v = json!({"subject": ["A", "B", "C"], "dqi": [10, 20]});
        let recs = Records::from_json(&v).unwrap();
        assert_eq!(recs.rows.len(), 3);
        assert_eq!(Records::cell_text(&recs.rows[2][1]), "");
    }

    #[test]
    fn test_records_index_oriented() {
        let v = json!({
            "subject": {"0": "S-001", "1": "S-002"},
            "dqi": {"0": 41.0, "2": 12.5}
        });
        let recs = Records::from_json(&v).unwrap();
        assert_eq!(recs.columns, vec!["subject", "dqi"]);
        assert_eq!(recs.rows.len(), 3);
        assert_eq!(Records::cell_text(&recs.rows[0][1]), "41.0");
        assert_eq!(Records::cell_text(&recs.rows[1][1]), "");
        assert_eq!(Records::cell_text(&recs.rows[2][0]), "");
    }

    #[test]
    fn test_records_head() {
        let items: Vec<Value> = (0..250).map(|i| json!({"n": i})).collect();
        let recs = Records::from_json(&Value::Array(items)).unwrap().head(100);
        assert_eq!(recs.rows.len(), 100);
        assert_eq!(Records::cell_text(&recs.rows[99][0]), "99");
    }

    #[test]
    fn test_bar_flat_and_nested() {
        let flat = BarData::from_json(&json!({"1": 88.0, "2": "71.5", "3": null})).unwrap();
        assert_eq!(flat.series.len(), 1);
        assert_eq!(flat.series[0].values, vec![Some(88.0), Some(71.5), None]);
        assert_eq!(flat.max_abs(), 88.0);

        let nested =
            BarData::from_json(&json!({"dqi": {"1": 90, "2": 80}, "queries": {"2": 5, "3": 7}}))
                .unwrap();
        assert_eq!(nested.categories, vec!["1", "2", "3"]);
        assert_eq!(nested.series[1].name, "queries");
        assert_eq!(nested.series[1].values, vec![None, Some(5.0), Some(7.0)]);
    }

    #[test]
    fn test_matrix_orientation_and_normalization() {
        let v = json!({
            "dqi":     {"dqi": 1.0, "queries": -0.6, "missing": -0.2},
            "queries": {"dqi": -0.6, "queries": 1.0, "missing": 0.4},
        });
        let m = Matrix::from_json(&v).unwrap();
        assert_eq!(m.columns, vec!["dqi", "queries"]);
        assert_eq!(m.rows, vec!["dqi", "queries", "missing"]);
        assert_eq!(m.cells[1][0], Some(-0.6));
        assert_eq!(m.column_range(0), Some((-0.6, 1.0)));
        assert_eq!(m.normalized(0, 0), Some(1.0));
        assert_eq!(m.normalized(1, 0), Some(0.0));
    }

    #[test]
    fn test_matrix_constant_column_midpoint() {
        let m = Matrix::from_json(&json!({"a": {"x": 0.3, "y": 0.3}})).unwrap();
        assert_eq!(m.normalized(0, 0), Some(0.5));
    }

    #[test]
    fn test_insight_variants() {
        assert_eq!(
            HeatmapInsight::from_json(&json!({"analysis": "DQI falls as queries rise."})).unwrap(),
            HeatmapInsight::Analysis("DQI falls as queries rise.".to_string())
        );
        assert_eq!(
            HeatmapInsight::from_json(&json!({"error": "model offline"})).unwrap(),
            HeatmapInsight::Error("model offline".to_string())
        );
        assert_eq!(
            HeatmapInsight::from_json(&json!({})).unwrap(),
            HeatmapInsight::Error("Unknown error".to_string())
        );
    }

    #[test]
    fn test_cra_email_variants() {
        assert_eq!(
            CraEmail::from_json(&json!({"error": "quota", "prompt": "Draft..."})).unwrap(),
            CraEmail::Failed {
                error: "quota".to_string(),
                prompt: "Draft...".to_string()
            }
        );
        assert_eq!(
            CraEmail::from_json(&json!({"error": "quota"})).unwrap(),
            CraEmail::Failed {
                error: "quota".to_string(),
                prompt: String::new()
            }
        );
        let err = CraEmail::from_json(&json!({"prompt": "Draft..."})).unwrap_err();
        assert_eq!(err, "CRA email: missing field `email`");
    }
}
