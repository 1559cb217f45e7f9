use crate::models::Point;
use crate::ui::escape_html;
use serde::Serialize;
use std::fmt;

pub const STATUS_SERIES: &str = "ticketStatuses";

/// `value / total * 100` rounded to two decimals; zero when the total is zero.
pub fn percentage(value: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    round_to(value / total * 100.0, 2)
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn share_label(value: f64, total: f64) -> String {
    if total == 0.0 {
        return "0%".to_string();
    }
    format!("{:.1}%", value / total * 100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownLine {
    pub label: String,
    pub count: f64,
    pub percentage: f64,
}

impl fmt::Display for BreakdownLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} tickets ({:.2}%)",
            self.label, self.count, self.percentage
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusBreakdown {
    pub lines: Vec<BreakdownLine>,
}

impl StatusBreakdown {
    pub fn from_points(points: &[Point]) -> Self {
        let total: f64 = points.iter().map(|point| point.value).sum();
        let lines = points
            .iter()
            .map(|point| BreakdownLine {
                label: point.label.clone(),
                count: point.value,
                percentage: percentage(point.value, total),
            })
            .collect();
        Self { lines }
    }

    pub fn total(&self) -> f64 {
        self.lines.iter().map(|line| line.count).sum()
    }

    pub fn to_html(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                format!(
                    "<p><strong>{}:</strong> {} tickets ({:.2}%)</p>",
                    escape_html(&line.label),
                    line.count,
                    line.percentage
                )
            })
            .collect()
    }
}
