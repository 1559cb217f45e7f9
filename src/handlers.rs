use crate::backend::{ChartBackend, ConfigBackend};
use crate::chart::{SlotDefinition, DASHBOARD_SLOTS};
use crate::errors::AppError;
use crate::filters::FilterKind;
use crate::models::{DashboardResponse, FilterChangeRequest, OverviewResponse, StatisticsSnapshot};
use crate::state::AppState;
use crate::overview::OverviewBoard;
use crate::ui::{render_index, render_overview};
use crate::view::{FilterChange, RefreshOutcome, ViewRead};
use axum::{extract::State, response::Html, Json};

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let (dashboard, slots) = state
        .view
        .read(|read| (dashboard_response(&read, None), page_slots(read.backend)))
        .await;
    let page = render_index(&dashboard, &slots).map_err(AppError::internal)?;
    Ok(Html(page))
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    Json(state.view.read(|read| dashboard_response(&read, None)).await)
}

pub async fn get_snapshot(State(state): State<AppState>) -> Json<StatisticsSnapshot> {
    Json(state.view.read(|read| read.snapshot.clone()).await)
}

pub async fn change_filter(
    State(state): State<AppState>,
    Json(payload): Json<FilterChangeRequest>,
) -> Result<Json<DashboardResponse>, AppError> {
    let filter: FilterKind = payload.filter.parse()?;
    let outcome = state
        .view
        .on_filter_change(FilterChange::new(filter, payload.value))
        .await;

    if let RefreshOutcome::Rejected(err) = outcome {
        return Err(err.into());
    }

    let label = outcome.label();
    Ok(Json(
        state
            .view
            .read(|read| dashboard_response(&read, Some(label)))
            .await,
    ))
}

pub async fn overview(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let board = &state.overview;
    let page = render_overview(&overview_response(board), &board.slots()).map_err(AppError::internal)?;
    Ok(Html(page))
}

pub async fn get_overview(State(state): State<AppState>) -> Json<OverviewResponse> {
    Json(overview_response(&state.overview))
}

fn overview_response(board: &OverviewBoard) -> OverviewResponse {
    OverviewResponse {
        charts: board.charts(),
        loaded_at: board.loaded_at().to_rfc3339(),
    }
}

fn dashboard_response(
    read: &ViewRead<'_, ConfigBackend>,
    outcome: Option<&'static str>,
) -> DashboardResponse {
    let selection = read.panel.state();
    DashboardResponse {
        role: read.panel.role(),
        filters: FilterKind::ALL
            .into_iter()
            .map(|filter| (filter.param(), selection.value(filter).to_string()))
            .collect(),
        dropdowns: read.panel.dropdowns().to_vec(),
        charts: read.backend.charts(),
        breakdown: read.backend.breakdown().lines.clone(),
        last_error: read.last_error.map(str::to_string),
        refreshed_at: read.refreshed_at.to_rfc3339(),
        outcome,
    }
}

fn page_slots(backend: &ConfigBackend) -> Vec<&'static SlotDefinition> {
    DASHBOARD_SLOTS
        .iter()
        .filter(|slot| backend.has_target(slot.target))
        .collect()
}
