use crate::chart::{DASHBOARD_SLOTS, OVERVIEW_SLOTS, SlotDefinition};
use crate::errors::SettingsError;
use crate::filters::{Assignments, Role};
use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub port: u16,
    pub upstream_url: String,
    pub role: Role,
    pub assignments: Assignments,
    pub snapshot_path: Option<PathBuf>,
    pub overview_path: Option<PathBuf>,
    pub hidden_charts: Vec<String>,
    pub timeout: Duration,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let port = parse_or(&lookup, "PORT", 8080)?;
        let timeout_secs = parse_or(&lookup, "STATS_TIMEOUT_SECS", 10u64)?;

        let role = match lookup("STATS_ROLE") {
            Some(value) => value.parse().map_err(|_| SettingsError::Invalid {
                key: "STATS_ROLE",
                value,
            })?,
            None => Role::Internal,
        };

        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            port,
            upstream_url: non_empty("STATS_UPSTREAM_URL")
                .unwrap_or_else(|| "http://127.0.0.1:8000".to_string()),
            role,
            assignments: Assignments {
                customer: non_empty("STATS_CUSTOMER_ID"),
                region: non_empty("STATS_REGION_ID"),
                terminal: non_empty("STATS_TERMINAL_ID"),
            },
            snapshot_path: non_empty("STATS_SNAPSHOT_PATH").map(PathBuf::from),
            overview_path: non_empty("STATS_OVERVIEW_PATH").map(PathBuf::from),
            hidden_charts: lookup("STATS_HIDDEN_CHARTS")
                .map(|value| {
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|target| !target.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn visible_targets(&self) -> Vec<&'static str> {
        self.visible(DASHBOARD_SLOTS)
    }

    pub fn visible_overview_targets(&self) -> Vec<&'static str> {
        self.visible(OVERVIEW_SLOTS)
    }

    fn visible(&self, slots: &'static [SlotDefinition]) -> Vec<&'static str> {
        slots
            .iter()
            .map(|slot| slot.target)
            .filter(|target| !self.hidden_charts.iter().any(|hidden| hidden == target))
            .collect()
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, SettingsError> {
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| SettingsError::Invalid { key, value }),
        None => Ok(default),
    }
}
