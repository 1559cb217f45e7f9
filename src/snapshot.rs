//! Decoding of the helpdesk statistics payload.
//!
//! The endpoint mixes several layouts in one object: `{labels, data}` pairs,
//! lists of `{branch_name, count}` rows, bare numbers, and label/value arrays
//! that travel under two separate keys (`months` + `ticketsPerMonth`).

use crate::errors::SnapshotError;
use crate::models::{OptionItem, Point, Series, StatisticsSnapshot};
use serde_json::{Map, Value};
use std::collections::HashSet;

pub const PAIRED_SERIES: &[(&str, &str)] = &[
    ("days", "ticketsPerDay"),
    ("weekdays", "ticketsPerWeekday"),
    ("hours", "ticketsPerHour"),
    ("months", "ticketsPerMonth"),
    ("years", "ticketsPerYear"),
];

const ROW_LABEL_KEYS: [&str; 3] = ["label", "branch_name", "name"];

impl TryFrom<Value> for StatisticsSnapshot {
    type Error = SnapshotError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = value else {
            return Err(SnapshotError::NotAnObject);
        };

        let mut snapshot = StatisticsSnapshot::default();
        for (key, entry) in &map {
            match key.as_str() {
                "customers" => snapshot.customers = option_items(entry, "name"),
                "regions" => snapshot.regions = option_items(entry, "name"),
                "terminals" => snapshot.terminals = option_items(entry, "branch_name"),
                name if is_period_key(name) => {}
                name => {
                    if let Some(series) = decode_entry(&map, name, entry)? {
                        snapshot.series.insert(name.to_string(), series);
                    }
                }
            }
        }
        Ok(snapshot)
    }
}

/// Page data of the overview dashboard: `(key, label field, count field)`.
/// Rows are already grouped upstream, so repeated labels are kept.
pub const OVERVIEW_ROWS: &[(&str, &str, &str)] = &[
    ("status_data", "status", "count"),
    ("priority_data", "priority", "count"),
    ("monthly_data", "month", "count"),
    ("terminal_data", "terminal", "count"),
    ("region_data", "region", "count"),
    ("category_data", "category", "count"),
    ("customer_data", "customer", "count"),
    ("overview_data", "label", "count"),
    ("category_time_data", "category", "daily_count"),
];

const TIME_BUCKETS: [(&str, &str); 4] = [("day", "Day"), ("week", "Week"), ("month", "Month"), ("year", "Year")];

pub fn overview_snapshot(value: Value) -> Result<StatisticsSnapshot, SnapshotError> {
    let Value::Object(map) = value else {
        return Err(SnapshotError::NotAnObject);
    };

    let mut snapshot = StatisticsSnapshot::default();
    for (key, label_key, count_key) in OVERVIEW_ROWS {
        let Some(Value::Array(rows)) = map.get(*key) else {
            continue;
        };
        let mut points = Vec::with_capacity(rows.len());
        for row in rows {
            let label = overview_label(key, row.get(*label_key).unwrap_or(&Value::Null));
            let value = numeric(key, row.get(*count_key).unwrap_or(&Value::Null))?;
            points.push(Point::new(label, value));
        }
        snapshot
            .series
            .insert(key.to_string(), Series::Categorical { points });
    }

    if let Some(Value::Object(buckets)) = map.get("time_data") {
        let points = TIME_BUCKETS
            .iter()
            .map(|(key, label)| {
                let count = buckets.get(*key).unwrap_or(&Value::Null);
                Ok(Point::new(*label, numeric("time_data", count)?))
            })
            .collect::<Result<Vec<_>, SnapshotError>>()?;
        snapshot
            .series
            .insert("time_data".to_string(), Series::TimeSeries { points });
    }

    Ok(snapshot)
}

fn overview_label(key: &str, value: &Value) -> String {
    match (key, value) {
        ("terminal_data" | "region_data", Value::Null) => "Unnamed".to_string(),
        ("status_data", Value::String(status)) => title_case(&status.replacen('_', " ", 1)),
        ("priority_data", Value::String(priority)) => title_case(priority),
        _ => label_text(value),
    }
}

// Upper-cases the first letter of every word and leaves the rest alone.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if at_word_start && ch.is_alphanumeric() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = !(ch.is_alphanumeric() || ch == '_');
    }
    out
}

fn is_period_key(key: &str) -> bool {
    PAIRED_SERIES.iter().any(|(periods, _)| *periods == key)
}

fn decode_entry(
    map: &Map<String, Value>,
    name: &str,
    entry: &Value,
) -> Result<Option<Series>, SnapshotError> {
    if let Some((periods_key, _)) = PAIRED_SERIES.iter().find(|(_, values)| *values == name) {
        let (Some(Value::Array(periods)), Value::Array(values)) = (map.get(*periods_key), entry)
        else {
            return Ok(None);
        };
        let points = zip_points(name, periods, values)?;
        return Ok(Some(Series::TimeSeries { points }));
    }

    match entry {
        Value::Number(number) => Ok(number.as_f64().map(|value| Series::Scalar { value })),
        Value::Object(object) => match (object.get("labels"), object.get("data")) {
            (Some(Value::Array(labels)), Some(Value::Array(values))) => {
                let points = zip_points(name, labels, values)?;
                Ok(Some(Series::Categorical { points }))
            }
            _ => Ok(None),
        },
        Value::Array(rows) if rows.iter().all(is_count_row) => {
            let mut points = Vec::with_capacity(rows.len());
            for row in rows {
                let label = ROW_LABEL_KEYS
                    .iter()
                    .find_map(|key| row.get(*key))
                    .map(label_text)
                    .unwrap_or_else(|| "N/A".to_string());
                let value = numeric(name, &row["count"])?;
                points.push(Point::new(label, value));
            }
            check_unique(name, &points)?;
            Ok(Some(Series::Categorical { points }))
        }
        _ => Ok(None),
    }
}

fn is_count_row(row: &Value) -> bool {
    row.as_object().is_some_and(|object| object.contains_key("count"))
}

fn zip_points(name: &str, labels: &[Value], values: &[Value]) -> Result<Vec<Point>, SnapshotError> {
    if labels.len() != values.len() {
        return Err(SnapshotError::LengthMismatch {
            series: name.to_string(),
            labels: labels.len(),
            values: values.len(),
        });
    }

    let points = labels
        .iter()
        .zip(values)
        .map(|(label, value)| Ok(Point::new(label_text(label), numeric(name, value)?)))
        .collect::<Result<Vec<_>, SnapshotError>>()?;
    check_unique(name, &points)?;
    Ok(points)
}

fn check_unique(name: &str, points: &[Point]) -> Result<(), SnapshotError> {
    let mut seen = HashSet::with_capacity(points.len());
    for point in points {
        if !seen.insert(point.label.as_str()) {
            return Err(SnapshotError::DuplicateLabel {
                series: name.to_string(),
                label: point.label.clone(),
            });
        }
    }
    Ok(())
}

fn numeric(name: &str, value: &Value) -> Result<f64, SnapshotError> {
    value.as_f64().ok_or_else(|| SnapshotError::NonNumeric {
        series: name.to_string(),
    })
}

fn label_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "N/A".to_string(),
        other => other.to_string(),
    }
}

fn option_items(entry: &Value, name_key: &str) -> Vec<OptionItem> {
    let Some(rows) = entry.as_array() else {
        return Vec::new();
    };

    rows.iter()
        .filter_map(|row| {
            let id = row.get("id").filter(|id| !id.is_null()).map(label_text)?;
            let name = row
                .get(name_key)
                .or_else(|| row.get("name"))
                .map(label_text)
                .unwrap_or_else(|| id.clone());
            let region_id = row
                .get("region_id")
                .filter(|region| !region.is_null())
                .map(label_text);
            Some(OptionItem {
                id,
                name,
                region_id,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_each_payload_layout() {
        let payload = json!({
            "ticketStatuses": { "labels": ["Open", "Closed"], "data": [3, 1] },
            "ticketsPerTerminal": [
                { "branch_name": "Harbour", "count": 4 },
                { "branch_name": "Airport", "count": 2 }
            ],
            "months": ["Jan", "Feb"],
            "ticketsPerMonth": [5, 7],
            "years": [2024, 2025],
            "ticketsPerYear": [10, 12],
            "resolvedTickets": 9,
            "data_json": "{}",
            "customers": [{ "id": 1, "name": "Acme" }],
            "terminals": [{ "id": 7, "branch_name": "Harbour", "region_id": 3 }]
        });

        let snapshot = StatisticsSnapshot::try_from(payload).unwrap();

        let statuses = snapshot.series("ticketStatuses").unwrap();
        assert_eq!(
            statuses.points().unwrap(),
            &[Point::new("Open", 3.0), Point::new("Closed", 1.0)]
        );
        assert!(matches!(
            snapshot.series("ticketsPerTerminal"),
            Some(Series::Categorical { points }) if points[1] == Point::new("Airport", 2.0)
        ));
        assert!(matches!(
            snapshot.series("ticketsPerMonth"),
            Some(Series::TimeSeries { points }) if points[0] == Point::new("Jan", 5.0)
        ));
        assert_eq!(
            snapshot.series("ticketsPerYear").unwrap().points().unwrap()[1].label,
            "2025"
        );
        assert_eq!(snapshot.series("resolvedTickets").unwrap().scalar(), Some(9.0));
        assert!(snapshot.series("months").is_none());
        assert!(snapshot.series("data_json").is_none());

        assert_eq!(snapshot.customers[0].id, "1");
        assert_eq!(snapshot.customers[0].name, "Acme");
        assert_eq!(snapshot.terminals[0].name, "Harbour");
        assert_eq!(snapshot.terminals[0].region_id.as_deref(), Some("3"));
    }

    #[test]
    fn null_labels_become_placeholder() {
        let payload = json!({
            "ticketsByCreator": { "labels": [null, "ana"], "data": [2, 1] }
        });
        let snapshot = StatisticsSnapshot::try_from(payload).unwrap();
        let points = snapshot.series("ticketsByCreator").unwrap().points().unwrap();
        assert_eq!(points[0].label, "N/A");
    }

    #[test]
    fn rejects_duplicate_labels() {
        let payload = json!({
            "ticketStatuses": { "labels": ["Open", "Open"], "data": [1, 2] }
        });
        assert_eq!(
            StatisticsSnapshot::try_from(payload),
            Err(SnapshotError::DuplicateLabel {
                series: "ticketStatuses".to_string(),
                label: "Open".to_string(),
            })
        );
    }

    #[test]
    fn rejects_mismatched_pairs() {
        let payload = json!({ "hours": ["0-1", "1-2"], "ticketsPerHour": [4] });
        assert!(matches!(
            StatisticsSnapshot::try_from(payload),
            Err(SnapshotError::LengthMismatch { labels: 2, values: 1, .. })
        ));
    }

    #[test]
    fn rejects_non_objects() {
        assert_eq!(
            StatisticsSnapshot::try_from(json!([1, 2])),
            Err(SnapshotError::NotAnObject)
        );
    }

    #[test]
    fn deserializes_through_serde() {
        let snapshot: StatisticsSnapshot =
            serde_json::from_str(r#"{"unresolvedTickets": 4}"#).unwrap();
        assert_eq!(snapshot.series("unresolvedTickets").unwrap().scalar(), Some(4.0));
    }

    #[test]
    fn decodes_overview_page_data() {
        let payload = json!({
            "status_data": [
                { "status": "in_progress", "count": 4 },
                { "status": "open", "count": 2 }
            ],
            "priority_data": [{ "priority": "high", "count": 3 }],
            "monthly_data": [
                { "month": "Jan", "count": 1 },
                { "month": "Jan", "count": 5 }
            ],
            "terminal_data": [{ "terminal": null, "count": 2 }],
            "category_time_data": [{ "category": "Printer", "daily_count": 7 }],
            "time_data": { "day": 1, "week": 4, "month": 9, "year": 30 }
        });

        let snapshot = overview_snapshot(payload).unwrap();
        let labels = |key: &str| -> Vec<String> {
            snapshot.series(key).unwrap().points().unwrap().iter().map(|p| p.label.clone()).collect()
        };

        assert_eq!(labels("status_data"), vec!["In Progress", "Open"]);
        assert_eq!(labels("priority_data"), vec!["High"]);
        assert_eq!(labels("monthly_data"), vec!["Jan", "Jan"]);
        assert_eq!(labels("terminal_data"), vec!["Unnamed"]);
        assert_eq!(
            snapshot.series("category_time_data").unwrap().points().unwrap(),
            &[Point::new("Printer", 7.0)]
        );
        assert!(matches!(
            snapshot.series("time_data"),
            Some(Series::TimeSeries { points }) if points[3] == Point::new("Year", 30.0)
        ));
        assert!(snapshot.series("region_data").is_none());
    }

    #[test]
    fn overview_counts_must_be_numbers() {
        let payload = json!({ "customer_data": [{ "customer": "Acme", "count": "many" }] });
        assert_eq!(
            overview_snapshot(payload),
            Err(SnapshotError::NonNumeric {
                series: "customer_data".to_string(),
            })
        );
    }
}
