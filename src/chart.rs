use crate::breakdown::{percentage, share_label};
use crate::errors::ConfigurationError;
use crate::models::StatisticsSnapshot;
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
    Radar,
    Line,
    Doughnut,
}

pub const PALETTE: [&str; 8] = [
    "#007bff", "#28a745", "#ffc107", "#dc3545", "#17a2b8", "#6f42c1", "#fd7e14", "#20c997",
];

const PASS_FAIL: [&str; 2] = ["#28a745", "#dc3545"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Solid {
        background: &'static str,
        border: Option<&'static str>,
    },
    Gradient {
        start: &'static str,
        end: &'static str,
    },
    Palette(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeriesSource {
    Named(&'static str),
    Scalars(&'static [(&'static str, &'static str)]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotDefinition {
    pub target: &'static str,
    pub source: SeriesSource,
    pub kind: ChartKind,
    pub label: &'static str,
    pub fill: Fill,
    pub segment_labels: bool,
}

const fn gradient(start: &'static str, end: &'static str) -> Fill {
    Fill::Gradient { start, end }
}

const fn solid(background: &'static str) -> Fill {
    Fill::Solid {
        background,
        border: None,
    }
}

const fn slot(
    target: &'static str,
    series: &'static str,
    kind: ChartKind,
    label: &'static str,
    fill: Fill,
) -> SlotDefinition {
    SlotDefinition {
        target,
        source: SeriesSource::Named(series),
        kind,
        label,
        fill,
        segment_labels: matches!(kind, ChartKind::Pie | ChartKind::Doughnut),
    }
}

const fn plain(
    target: &'static str,
    series: &'static str,
    kind: ChartKind,
    label: &'static str,
    fill: Fill,
) -> SlotDefinition {
    SlotDefinition {
        segment_labels: false,
        ..slot(target, series, kind, label, fill)
    }
}

#[rustfmt::skip]
pub const DASHBOARD_SLOTS: &[SlotDefinition] = &[
    slot("ticketsPerDayChart", "ticketsPerDay", ChartKind::Bar, "Tickets per Day", gradient("#007bff", "#00b0ff")),
    slot("ticketsPerWeekdayChart", "ticketsPerWeekday", ChartKind::Bar, "Tickets per Weekday", gradient("#28a745", "#32e52f")),
    slot("ticketsPerHourChart", "ticketsPerHour", ChartKind::Bar, "Tickets per Hour", gradient("#ffc107", "#ffcc00")),
    slot("ticketsPerMonthChart", "ticketsPerMonth", ChartKind::Bar, "Tickets per Month", gradient("#dc3545", "#e02f3a")),
    slot("ticketsPerYearChart", "ticketsPerYear", ChartKind::Bar, "Tickets per Year", gradient("#17a2b8", "#20c1d7")),
    slot("ticketStatusChart", "ticketStatuses", ChartKind::Pie, "Ticket Statuses", Fill::Palette(&["#007bff", "#28a745", "#ffc107", "#dc3545"])),
    slot("ticketsPerTerminalChart", "ticketsPerTerminal", ChartKind::Bar, "Tickets per Terminal", gradient("#007bff", "#00b0ff")),
    slot("ticketsByCategoryChart", "ticketCategories", ChartKind::Radar, "Tickets by Category", Fill::Solid { background: "rgba(0, 123, 255, 0.3)", border: Some("#007bff") }),
    slot("monthlyTicketTrendsChart", "ticketsPerMonth", ChartKind::Line, "Monthly Ticket Trends", Fill::Solid { background: "#007bff", border: Some("#0056b3") }),
    slot("slaComplianceChart", "slaStats", ChartKind::Doughnut, "SLA Compliance", Fill::Palette(&PASS_FAIL)),
    slot("ticketsByCreatorChart", "ticketsByCreator", ChartKind::Bar, "Tickets Created", solid("#007bff")),
    slot("ticketsByAssigneeChart", "ticketsByAssignee", ChartKind::Bar, "Tickets Assigned", Fill::Palette(&PALETTE)),
    slot("ticketsByResolverChart", "ticketsByResolver", ChartKind::Bar, "Tickets Resolved", solid("#17a2b8")),
    SlotDefinition {
        target: "unresolvedTicketsChart",
        source: SeriesSource::Scalars(&[("Resolved", "resolvedTickets"), ("Unresolved", "unresolvedTickets")]),
        kind: ChartKind::Doughnut,
        label: "Ticket Resolution",
        fill: Fill::Palette(&PASS_FAIL),
        segment_labels: true,
    },
];

const GRADIENT_SET: [&str; 8] = [
    "#007ACC", "#673AB7", "#FF8C00", "#00BCD4", "#8BC34A", "#FF5722", "#9C27B0", "#FFD700",
];

#[rustfmt::skip]
pub const OVERVIEW_SLOTS: &[SlotDefinition] = &[
    plain("ticketReportChart", "status_data", ChartKind::Bar, "Tickets by Status", Fill::Palette(&["#007ACC", "#FFC107", "#4CAF50", "#DC3545"])),
    plain("monthlyTrendChart", "monthly_data", ChartKind::Line, "Monthly Tickets", Fill::Solid { background: "rgba(0, 122, 204, 0.15)", border: Some("#007ACC") }),
    plain("terminalChart", "terminal_data", ChartKind::Bar, "Top Terminals", Fill::Palette(&GRADIENT_SET)),
    plain("regionChart", "region_data", ChartKind::Bar, "Tickets per Region", Fill::Palette(&GRADIENT_SET)),
    plain("priorityChart", "priority_data", ChartKind::Pie, "Tickets by Priority", Fill::Palette(&["#DC3545", "#FFC107", "#4CAF50", "#007ACC"])),
    plain("statusChart", "status_data", ChartKind::Pie, "Status Share", Fill::Palette(&["#4CAF50", "#FFC107", "#007ACC", "#34495E"])),
    plain("timeTrendChart", "time_data", ChartKind::Line, "Ticket Volume", Fill::Solid { background: "rgba(23, 162, 184, 0.15)", border: Some("#17A2B8") }),
    plain("categoryChart", "category_data", ChartKind::Bar, "Top Categories", solid("#673AB7")),
    plain("categoryTimeChart", "category_time_data", ChartKind::Bar, "Tickets by Category", solid("#FF8C00")),
    plain("overviewChart", "overview_data", ChartKind::Bar, "Ticket Counts", Fill::Palette(&["#007ACC", "#673AB7", "#FF8C00", "#00BCD4"])),
    plain("customerChart", "customer_data", ChartKind::Bar, "Top Customers", solid("#FF8C00")),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: Value,
    pub options: Value,
}

impl ChartConfig {
    pub fn to_value(&self) -> Value {
        json!({ "type": self.kind, "data": self.data, "options": self.options })
    }
}

impl SlotDefinition {
    pub fn resolve(&self, snapshot: &StatisticsSnapshot) -> Result<ChartData, ConfigurationError> {
        match self.source {
            SeriesSource::Named(name) => {
                let series = snapshot
                    .series(name)
                    .ok_or_else(|| ConfigurationError::MissingSeries {
                        series: name.to_string(),
                    })?;
                let points = series.points().ok_or(ConfigurationError::WrongShape {
                    series: name.to_string(),
                    found: series.shape(),
                    expected: "labelled points",
                })?;
                Ok(ChartData {
                    labels: points.iter().map(|point| point.label.clone()).collect(),
                    values: points.iter().map(|point| point.value).collect(),
                })
            }
            SeriesSource::Scalars(parts) => {
                let mut data = ChartData {
                    labels: Vec::with_capacity(parts.len()),
                    values: Vec::with_capacity(parts.len()),
                };
                for (label, name) in parts {
                    let series = snapshot
                        .series(name)
                        .ok_or_else(|| ConfigurationError::MissingSeries {
                            series: name.to_string(),
                        })?;
                    let value = series.scalar().ok_or(ConfigurationError::WrongShape {
                        series: name.to_string(),
                        found: series.shape(),
                        expected: "a scalar",
                    })?;
                    data.labels.push(label.to_string());
                    data.values.push(value);
                }
                Ok(data)
            }
        }
    }

    pub fn config(&self, data: &ChartData) -> ChartConfig {
        let mut dataset = json!({ "label": self.label, "data": data.values });
        match self.fill {
            Fill::Solid { background, border } => {
                dataset["backgroundColor"] = json!(background);
                if let Some(border) = border {
                    dataset["borderColor"] = json!(border);
                    dataset["borderWidth"] = json!(2);
                }
            }
            Fill::Gradient { start, end } => {
                dataset["gradient"] = json!({ "from": start, "to": end });
            }
            Fill::Palette(colours) => {
                let cycled: Vec<&str> = (0..data.values.len())
                    .map(|index| colours[index % colours.len()])
                    .collect();
                dataset["backgroundColor"] = json!(cycled);
            }
        }
        if self.kind == ChartKind::Line {
            dataset["fill"] = json!(true);
        }
        if let Some(labels) = data_labels(self.kind, &data.values).filter(|_| self.segment_labels) {
            dataset["dataLabels"] = json!(labels);
        }

        ChartConfig {
            kind: self.kind,
            data: json!({ "labels": data.labels, "datasets": [dataset] }),
            options: options_for(self.kind, self.fill),
        }
    }
}

fn data_labels(kind: ChartKind, values: &[f64]) -> Option<Vec<String>> {
    let total: f64 = values.iter().sum();
    match kind {
        ChartKind::Pie => Some(
            values
                .iter()
                .map(|value| format!("{value} ({:.2}%)", percentage(*value, total)))
                .collect(),
        ),
        ChartKind::Doughnut => Some(values.iter().map(|value| share_label(*value, total)).collect()),
        _ => None,
    }
}

fn options_for(kind: ChartKind, fill: Fill) -> Value {
    let tooltip = match fill {
        Fill::Gradient { start, .. } => json!({ "enabled": true, "backgroundColor": start }),
        _ => json!({ "enabled": true }),
    };
    match kind {
        ChartKind::Bar | ChartKind::Line => json!({
            "responsive": true,
            "animation": { "duration": 1000, "easing": "easeOutQuart" },
            "plugins": { "tooltip": tooltip },
        }),
        ChartKind::Pie => json!({
            "responsive": true,
            "animation": { "animateRotate": true, "animateScale": true, "duration": 1000 },
            "plugins": { "tooltip": tooltip },
        }),
        ChartKind::Doughnut => json!({
            "responsive": true,
            "cutout": "70%",
            "plugins": { "legend": { "position": "bottom" }, "tooltip": tooltip },
        }),
        ChartKind::Radar => json!({
            "responsive": true,
            "scales": { "r": { "beginAtZero": true } },
        }),
    }
}
