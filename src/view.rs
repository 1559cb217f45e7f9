//! The filtered statistics view: a set of chart slots kept in step with the
//! latest snapshot for the current filter selection.
//!
//! Filter changes may overlap. Every request takes the next sequence number
//! and only the response to the most recently issued request is rendered;
//! anything older is dropped when it arrives.

use crate::backend::{ChartBackend, ChartHandle};
use crate::breakdown::{STATUS_SERIES, StatusBreakdown};
use crate::chart::{DASHBOARD_SLOTS, SlotDefinition};
use crate::errors::{ConfigurationError, FetchError, FilterError, ViewError};
use crate::filters::{Assignments, FilterKind, FilterPanel, FilterState, Role};
use crate::models::StatisticsSnapshot;
use crate::source::StatisticsSource;
use chrono::{DateTime, Local};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ViewConfig {
    pub snapshot: StatisticsSnapshot,
    pub role: Role,
    pub assignments: Assignments,
    pub slots: Vec<SlotDefinition>,
}

impl ViewConfig {
    pub fn new(snapshot: StatisticsSnapshot, role: Role, assignments: Assignments) -> Self {
        Self {
            snapshot,
            role,
            assignments,
            slots: DASHBOARD_SLOTS.to_vec(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterChange {
    pub filter: FilterKind,
    pub value: String,
}

impl FilterChange {
    pub fn new(filter: FilterKind, value: impl Into<String>) -> Self {
        Self {
            filter,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    pub rendered: Vec<&'static str>,
    pub skipped: Vec<(&'static str, ConfigurationError)>,
    pub breakdown: bool,
}

#[derive(Debug)]
pub enum RefreshOutcome {
    Applied(RenderReport),
    Stale { sequence: u64, latest: u64 },
    Failed(FetchError),
    Rejected(FilterError),
}

impl RefreshOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RefreshOutcome::Applied(_) => "applied",
            RefreshOutcome::Stale { .. } => "stale",
            RefreshOutcome::Failed(_) => "failed",
            RefreshOutcome::Rejected(_) => "rejected",
        }
    }
}

struct ViewState<B> {
    backend: B,
    panel: FilterPanel,
    live: HashMap<&'static str, ChartHandle>,
    snapshot: StatisticsSnapshot,
    issued: u64,
    last_error: Option<String>,
    refreshed_at: DateTime<Local>,
}

pub struct ViewRead<'a, B> {
    pub backend: &'a B,
    pub panel: &'a FilterPanel,
    pub snapshot: &'a StatisticsSnapshot,
    pub last_error: Option<&'a str>,
    pub refreshed_at: DateTime<Local>,
}

pub struct FilteredStatisticsView<S, B> {
    source: S,
    slots: Vec<SlotDefinition>,
    inner: Mutex<ViewState<B>>,
}

impl<S, B> FilteredStatisticsView<S, B>
where
    S: StatisticsSource,
    B: ChartBackend,
{
    pub fn initialize(config: ViewConfig, source: S, backend: B) -> Result<Self, ViewError> {
        let panel = FilterPanel::new(&config.snapshot, config.role, &config.assignments)?;
        let mut state = ViewState {
            backend,
            panel,
            live: HashMap::new(),
            snapshot: StatisticsSnapshot::default(),
            issued: 0,
            last_error: None,
            refreshed_at: Local::now(),
        };

        let report = render_into(&mut state, &config.slots, config.snapshot);
        info!(
            role = %config.role,
            rendered = report.rendered.len(),
            skipped = report.skipped.len(),
            "statistics view initialized"
        );

        Ok(Self {
            source,
            slots: config.slots,
            inner: Mutex::new(state),
        })
    }

    pub async fn render(&self, snapshot: StatisticsSnapshot) -> RenderReport {
        let mut state = self.inner.lock().await;
        render_into(&mut state, &self.slots, snapshot)
    }

    /// Applies a selection and re-fetches statistics for the full filter state.
    ///
    /// Never fails outward: rejected selections, stale responses and fetch
    /// errors are reported through the outcome while the previous render stays.
    pub async fn on_filter_change(&self, change: FilterChange) -> RefreshOutcome {
        let (sequence, filters) = {
            let mut state = self.inner.lock().await;
            if let Err(err) = state.panel.select(change.filter, &change.value) {
                warn!(filter = %change.filter, value = %change.value, "filter change rejected: {err}");
                return RefreshOutcome::Rejected(err);
            }
            state.issued += 1;
            (state.issued, state.panel.state().clone())
        };

        debug!(sequence, ?filters, "requesting filtered statistics");
        let result = self.source.fetch(&filters).await;

        let mut state = self.inner.lock().await;
        if sequence != state.issued {
            debug!(sequence, latest = state.issued, "discarding stale statistics response");
            return RefreshOutcome::Stale {
                sequence,
                latest: state.issued,
            };
        }

        match result {
            Ok(snapshot) => {
                state.last_error = None;
                RefreshOutcome::Applied(render_into(&mut state, &self.slots, snapshot))
            }
            Err(err) => {
                warn!(sequence, "statistics refresh failed, keeping previous charts: {err}");
                state.last_error = Some(err.to_string());
                RefreshOutcome::Failed(err)
            }
        }
    }

    pub async fn filters(&self) -> FilterState {
        self.inner.lock().await.panel.state().clone()
    }

    pub async fn read<R>(&self, f: impl FnOnce(ViewRead<'_, B>) -> R) -> R {
        let state = self.inner.lock().await;
        f(ViewRead {
            backend: &state.backend,
            panel: &state.panel,
            snapshot: &state.snapshot,
            last_error: state.last_error.as_deref(),
            refreshed_at: state.refreshed_at,
        })
    }
}

fn render_into<B: ChartBackend>(
    state: &mut ViewState<B>,
    slots: &[SlotDefinition],
    snapshot: StatisticsSnapshot,
) -> RenderReport {
    let mut report = draw_slots(&mut state.backend, &mut state.live, slots, &snapshot);

    let breakdown = match snapshot.series(STATUS_SERIES).and_then(|series| series.points()) {
        Some(points) => {
            report.breakdown = true;
            StatusBreakdown::from_points(points)
        }
        None => StatusBreakdown::default(),
    };
    state.backend.show_breakdown(&breakdown);

    state.snapshot = snapshot;
    state.refreshed_at = Local::now();
    report
}

// Slots without data in `snapshot` are cleared.
pub(crate) fn draw_slots<B: ChartBackend>(
    backend: &mut B,
    live: &mut HashMap<&'static str, ChartHandle>,
    slots: &[SlotDefinition],
    snapshot: &StatisticsSnapshot,
) -> RenderReport {
    let mut report = RenderReport::default();

    for slot in slots {
        if !backend.has_target(slot.target) {
            debug!(slot = slot.target, "render target absent, skipping");
            report.skipped.push((
                slot.target,
                ConfigurationError::MissingTarget {
                    target: slot.target.to_string(),
                },
            ));
            continue;
        }

        if let Some(previous) = live.remove(slot.target) {
            backend.destroy(previous);
        }

        match slot.resolve(snapshot) {
            Ok(data) => {
                let handle = backend.create(slot.target, &slot.config(&data));
                live.insert(slot.target, handle);
                report.rendered.push(slot.target);
            }
            Err(err) => {
                warn!(slot = slot.target, "skipping chart: {err}");
                report.skipped.push((slot.target, err));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ConfigBackend;
    use crate::filters::FilterValue;
    use crate::models::{OptionItem, Point, Series};
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::oneshot;

    type Reply = Result<StatisticsSnapshot, FetchError>;

    #[derive(Default)]
    struct ScriptedSource {
        replies: StdMutex<VecDeque<oneshot::Receiver<Reply>>>,
        requests: StdMutex<Vec<FilterState>>,
    }

    impl ScriptedSource {
        fn with_replies(count: usize) -> (Self, Vec<oneshot::Sender<Reply>>) {
            let (senders, receivers): (Vec<_>, VecDeque<_>) =
                (0..count).map(|_| oneshot::channel()).unzip();
            let source = Self {
                replies: StdMutex::new(receivers),
                requests: StdMutex::default(),
            };
            (source, senders)
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl StatisticsSource for ScriptedSource {
        async fn fetch(&self, filters: &FilterState) -> Reply {
            let reply = {
                self.requests.lock().unwrap().push(filters.clone());
                self.replies.lock().unwrap().pop_front()
            };
            match reply {
                Some(receiver) => receiver
                    .await
                    .unwrap_or_else(|_| Err(FetchError::Unavailable("reply dropped".into()))),
                None => Err(FetchError::Unavailable("no scripted reply".into())),
            }
        }
    }

    fn item(id: &str, name: &str) -> OptionItem {
        OptionItem {
            id: id.to_string(),
            name: name.to_string(),
            region_id: None,
        }
    }

    fn snapshot(open: f64, closed: f64) -> StatisticsSnapshot {
        StatisticsSnapshot {
            customers: vec![item("1", "Acme"), item("2", "Globex")],
            regions: vec![item("10", "North")],
            terminals: vec![item("100", "Harbour")],
            ..StatisticsSnapshot::default()
        }
        .with_series(
            "ticketStatuses",
            Series::Categorical {
                points: vec![Point::new("Open", open), Point::new("Closed", closed)],
            },
        )
        .with_series(
            "ticketsPerDay",
            Series::TimeSeries {
                points: vec![Point::new("2026-10-16", open), Point::new("2026-10-17", closed)],
            },
        )
    }

    fn backend() -> ConfigBackend {
        ConfigBackend::with_targets(["ticketStatusChart", "ticketsPerDayChart", "ticketsPerHourChart"])
    }

    fn internal_view(
        source: ScriptedSource,
        initial: StatisticsSnapshot,
    ) -> FilteredStatisticsView<ScriptedSource, ConfigBackend> {
        let config = ViewConfig::new(initial, Role::Internal, Assignments::default());
        FilteredStatisticsView::initialize(config, source, backend()).unwrap()
    }

    async fn status_values(view: &FilteredStatisticsView<ScriptedSource, ConfigBackend>) -> serde_json::Value {
        view.read(|read| read.backend.charts()["ticketStatusChart"]["data"]["datasets"][0]["data"].clone())
            .await
    }

    #[tokio::test]
    async fn initialize_renders_present_slots_and_skips_the_rest() {
        let view = internal_view(ScriptedSource::default(), snapshot(3.0, 1.0));

        view.read(|read| {
            let charts = read.backend.charts();
            assert_eq!(charts.len(), 2);
            assert!(charts.contains_key("ticketStatusChart"));
            assert!(charts.contains_key("ticketsPerDayChart"));
            let lines: Vec<String> = read
                .backend
                .breakdown()
                .lines
                .iter()
                .map(ToString::to_string)
                .collect();
            assert_eq!(lines, vec!["Open: 3 tickets (75.00%)", "Closed: 1 tickets (25.00%)"]);
        })
        .await;

        let report = view.render(snapshot(1.0, 1.0)).await;
        assert_eq!(report.rendered, vec!["ticketsPerDayChart", "ticketStatusChart"]);
        assert!(report.breakdown);
        assert!(report.skipped.iter().any(|(slot, err)| {
            *slot == "ticketsPerHourChart"
                && *err
                    == ConfigurationError::MissingSeries {
                        series: "ticketsPerHour".to_string(),
                    }
        }));
        assert!(report.skipped.iter().any(|(slot, err)| {
            *slot == "slaComplianceChart"
                && matches!(err, ConfigurationError::MissingTarget { .. })
        }));
    }

    #[tokio::test]
    async fn every_render_recreates_charts() {
        let view = internal_view(ScriptedSource::default(), snapshot(3.0, 1.0));
        view.render(snapshot(2.0, 2.0)).await;
        view.render(snapshot(5.0, 0.0)).await;

        view.read(|read| {
            assert_eq!(read.backend.live_count(), 2);
            assert_eq!(read.backend.created(), 6);
            assert_eq!(read.backend.destroyed(), 4);
        })
        .await;
        assert_eq!(status_values(&view).await, serde_json::json!([5.0, 0.0]));
    }

    #[tokio::test]
    async fn filter_change_fetches_full_state_and_renders() {
        let (source, mut senders) = ScriptedSource::with_replies(1);
        senders.remove(0).send(Ok(snapshot(1.0, 3.0))).unwrap();
        let view = internal_view(source, snapshot(3.0, 1.0));

        let outcome = view
            .on_filter_change(FilterChange::new(FilterKind::Customer, "2"))
            .await;
        assert!(matches!(outcome, RefreshOutcome::Applied(_)));
        assert_eq!(status_values(&view).await, serde_json::json!([1.0, 3.0]));

        let requests = view.source.requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].customer, FilterValue::Id("2".to_string()));
        assert_eq!(requests[0].region, FilterValue::All);
        assert_eq!(requests[0].terminal, FilterValue::All);
    }

    #[tokio::test]
    async fn latest_request_wins_when_responses_arrive_out_of_order() {
        let (source, mut senders) = ScriptedSource::with_replies(2);
        let second_reply = senders.pop().unwrap();
        let first_reply = senders.pop().unwrap();
        let view = Arc::new(internal_view(source, snapshot(3.0, 1.0)));

        let change = |value: &'static str| {
            let view = Arc::clone(&view);
            async move {
                view.on_filter_change(FilterChange::new(FilterKind::Customer, value))
                    .await
            }
        };

        let first = tokio::spawn(change("1"));
        while view.source.request_count() < 1 {
            tokio::task::yield_now().await;
        }
        let second = tokio::spawn(change("2"));
        while view.source.request_count() < 2 {
            tokio::task::yield_now().await;
        }

        second_reply.send(Ok(snapshot(8.0, 2.0))).unwrap();
        let second = second.await.unwrap();
        assert!(matches!(second, RefreshOutcome::Applied(_)));

        first_reply.send(Ok(snapshot(1.0, 1.0))).unwrap();
        let first = first.await.unwrap();
        assert!(matches!(first, RefreshOutcome::Stale { sequence: 1, latest: 2 }));

        assert_eq!(status_values(&view).await, serde_json::json!([8.0, 2.0]));
        view.read(|read| {
            assert_eq!(read.backend.breakdown().lines[0].percentage, 80.0);
        })
        .await;
        assert_eq!(view.filters().await.customer, FilterValue::Id("2".to_string()));
    }

    #[tokio::test]
    async fn fetch_failure_keeps_previous_charts() {
        let (source, mut senders) = ScriptedSource::with_replies(1);
        senders.remove(0).send(Err(FetchError::Status(502))).unwrap();
        let view = internal_view(source, snapshot(3.0, 1.0));
        let before = view.read(|read| read.backend.charts()).await;

        let outcome = view
            .on_filter_change(FilterChange::new(FilterKind::TimePeriod, "lastweek"))
            .await;
        assert!(matches!(outcome, RefreshOutcome::Failed(FetchError::Status(502))));

        view.read(|read| {
            assert_eq!(read.backend.charts(), before);
            assert_eq!(read.last_error, Some("statistics endpoint answered HTTP 502"));
        })
        .await;
    }

    #[tokio::test]
    async fn custodian_selections_are_rejected_without_fetching() {
        let assignments = Assignments {
            customer: Some("2".to_string()),
            region: Some("10".to_string()),
            terminal: Some("100".to_string()),
        };
        let config = ViewConfig::new(snapshot(3.0, 1.0), Role::Custodian, assignments);
        let view =
            FilteredStatisticsView::initialize(config, ScriptedSource::default(), backend()).unwrap();

        for filter in [FilterKind::Customer, FilterKind::Region, FilterKind::Terminal] {
            let outcome = view.on_filter_change(FilterChange::new(filter, "all")).await;
            assert!(matches!(outcome, RefreshOutcome::Rejected(FilterError::Locked { .. })));
        }

        let filters = view.filters().await;
        assert_eq!(filters.customer, FilterValue::Id("2".to_string()));
        assert_eq!(filters.region, FilterValue::Id("10".to_string()));
        assert_eq!(filters.terminal, FilterValue::Id("100".to_string()));
        assert_eq!(view.source.request_count(), 0);
    }

    #[test]
    fn custodian_without_assignments_cannot_initialize() {
        let config = ViewConfig::new(snapshot(1.0, 1.0), Role::Custodian, Assignments::default());
        let result = FilteredStatisticsView::initialize(config, ScriptedSource::default(), backend());
        assert!(matches!(result, Err(ViewError::MissingAssignment { .. })));
    }

    #[tokio::test]
    async fn empty_status_series_renders_zero_breakdown() {
        let view = internal_view(ScriptedSource::default(), snapshot(0.0, 0.0));
        view.read(|read| {
            for line in &read.backend.breakdown().lines {
                assert_eq!(line.percentage, 0.0);
            }
        })
        .await;
    }

    #[tokio::test]
    async fn refresh_without_series_clears_charts_and_breakdown() {
        let (source, mut senders) = ScriptedSource::with_replies(1);
        let bare = StatisticsSnapshot {
            customers: vec![item("1", "Acme")],
            ..StatisticsSnapshot::default()
        };
        senders.remove(0).send(Ok(bare)).unwrap();
        let view = internal_view(source, snapshot(3.0, 1.0));

        let outcome = view
            .on_filter_change(FilterChange::new(FilterKind::Customer, "1"))
            .await;
        let report = match outcome {
            RefreshOutcome::Applied(report) => report,
            other => panic!("expected applied, got {}", other.label()),
        };
        assert!(report.rendered.is_empty());
        assert!(!report.breakdown);

        view.read(|read| {
            assert!(read.backend.charts().is_empty());
            assert_eq!(read.backend.live_count(), 0);
            assert!(read.backend.breakdown().lines.is_empty());
            assert!(read.snapshot.series("ticketStatuses").is_none());
        })
        .await;
    }
}
