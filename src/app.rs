use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/snapshot", get(handlers::get_snapshot))
        .route("/api/filters", post(handlers::change_filter))
        .route("/overview", get(handlers::overview))
        .route("/api/overview", get(handlers::get_overview))
        .with_state(state)
}
