pub mod app;
pub mod backend;
pub mod breakdown;
pub mod chart;
pub mod config;
pub mod errors;
pub mod filters;
pub mod handlers;
pub mod models;
pub mod overview;
pub mod snapshot;
pub mod source;
pub mod state;
pub mod storage;
pub mod ui;
pub mod view;

pub use app::router;
pub use config::DashboardConfig;
pub use state::{AppState, DashboardView};
pub use overview::OverviewBoard;
pub use storage::{load_overview, load_snapshot};
pub use view::{FilterChange, FilteredStatisticsView, RefreshOutcome, ViewConfig};
