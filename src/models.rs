use crate::breakdown::BreakdownLine;
use crate::filters::{DropdownSpec, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub label: String,
    pub value: f64,
}

impl Point {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Series {
    Categorical { points: Vec<Point> },
    TimeSeries { points: Vec<Point> },
    Scalar { value: f64 },
}

impl Series {
    pub fn points(&self) -> Option<&[Point]> {
        match self {
            Series::Categorical { points } | Series::TimeSeries { points } => Some(points),
            Series::Scalar { .. } => None,
        }
    }

    pub fn scalar(&self) -> Option<f64> {
        match self {
            Series::Scalar { value } => Some(*value),
            _ => None,
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            Series::Categorical { .. } => "categorical",
            Series::TimeSeries { .. } => "a time series",
            Series::Scalar { .. } => "a scalar",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct StatisticsSnapshot {
    pub series: BTreeMap<String, Series>,
    pub customers: Vec<OptionItem>,
    pub regions: Vec<OptionItem>,
    pub terminals: Vec<OptionItem>,
}

impl StatisticsSnapshot {
    pub fn series(&self, name: &str) -> Option<&Series> {
        self.series.get(name)
    }

    pub fn with_series(mut self, name: impl Into<String>, series: Series) -> Self {
        self.series.insert(name.into(), series);
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct FilterChangeRequest {
    pub filter: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub role: Role,
    pub filters: BTreeMap<&'static str, String>,
    pub dropdowns: Vec<DropdownSpec>,
    pub charts: BTreeMap<String, Value>,
    pub breakdown: Vec<BreakdownLine>,
    pub last_error: Option<String>,
    pub refreshed_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub charts: BTreeMap<String, Value>,
    pub loaded_at: String,
}
