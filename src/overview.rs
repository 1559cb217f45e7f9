use crate::backend::{ChartBackend, ConfigBackend};
use crate::chart::{OVERVIEW_SLOTS, SlotDefinition};
use crate::models::StatisticsSnapshot;
use crate::view::{RenderReport, draw_slots};
use chrono::{DateTime, Local};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::info;

pub struct OverviewBoard {
    backend: ConfigBackend,
    report: RenderReport,
    loaded_at: DateTime<Local>,
}

impl OverviewBoard {
    pub fn build<I, S>(snapshot: &StatisticsSnapshot, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut backend = ConfigBackend::with_targets(targets);
        let mut live = HashMap::new();
        let report = draw_slots(&mut backend, &mut live, OVERVIEW_SLOTS, snapshot);
        info!(
            rendered = report.rendered.len(),
            skipped = report.skipped.len(),
            "overview dashboard drawn"
        );

        Self {
            backend,
            report,
            loaded_at: Local::now(),
        }
    }

    pub fn empty() -> Self {
        Self::build(&StatisticsSnapshot::default(), Vec::<String>::new())
    }

    pub fn charts(&self) -> BTreeMap<String, Value> {
        self.backend.charts()
    }

    pub fn report(&self) -> &RenderReport {
        &self.report
    }

    pub fn loaded_at(&self) -> DateTime<Local> {
        self.loaded_at
    }

    pub fn slots(&self) -> Vec<&'static SlotDefinition> {
        OVERVIEW_SLOTS
            .iter()
            .filter(|slot| self.backend.has_target(slot.target))
            .collect()
    }
}
