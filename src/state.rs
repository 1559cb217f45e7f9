use crate::backend::ConfigBackend;
use crate::overview::OverviewBoard;
use crate::source::HttpSource;
use crate::view::FilteredStatisticsView;
use std::sync::Arc;

pub type DashboardView = FilteredStatisticsView<HttpSource, ConfigBackend>;

#[derive(Clone)]
pub struct AppState {
    pub view: Arc<DashboardView>,
    pub overview: Arc<OverviewBoard>,
}

impl AppState {
    pub fn new(view: DashboardView, overview: OverviewBoard) -> Self {
        Self {
            view: Arc::new(view),
            overview: Arc::new(overview),
        }
    }
}
