use crate::breakdown::StatusBreakdown;
use crate::chart::ChartConfig;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChartHandle(u64);

pub trait ChartBackend: Send {
    fn has_target(&self, target: &str) -> bool;

    fn create(&mut self, target: &str, config: &ChartConfig) -> ChartHandle;

    fn destroy(&mut self, handle: ChartHandle);

    fn show_breakdown(&mut self, breakdown: &StatusBreakdown);
}

#[derive(Debug, Clone)]
struct LiveChart {
    target: String,
    config: ChartConfig,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigBackend {
    targets: BTreeSet<String>,
    live: BTreeMap<ChartHandle, LiveChart>,
    breakdown: StatusBreakdown,
    next_handle: u64,
    created: u64,
    destroyed: u64,
}

impl ConfigBackend {
    pub fn with_targets<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn chart(&self, target: &str) -> Option<&ChartConfig> {
        self.live
            .values()
            .find(|chart| chart.target == target)
            .map(|chart| &chart.config)
    }

    pub fn charts(&self) -> BTreeMap<String, Value> {
        self.live
            .values()
            .map(|chart| (chart.target.clone(), chart.config.to_value()))
            .collect()
    }

    pub fn breakdown(&self) -> &StatusBreakdown {
        &self.breakdown
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn created(&self) -> u64 {
        self.created
    }

    pub fn destroyed(&self) -> u64 {
        self.destroyed
    }
}

impl ChartBackend for ConfigBackend {
    fn has_target(&self, target: &str) -> bool {
        self.targets.contains(target)
    }

    fn create(&mut self, target: &str, config: &ChartConfig) -> ChartHandle {
        self.next_handle += 1;
        let handle = ChartHandle(self.next_handle);
        self.live.insert(
            handle,
            LiveChart {
                target: target.to_string(),
                config: config.clone(),
            },
        );
        self.created += 1;
        debug!(chart = target, ?handle, "chart created");
        handle
    }

    fn destroy(&mut self, handle: ChartHandle) {
        if self.live.remove(&handle).is_some() {
            self.destroyed += 1;
        }
    }

    fn show_breakdown(&mut self, breakdown: &StatusBreakdown) {
        self.breakdown = breakdown.clone();
    }
}
