use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::error::AppError;
use crate::export::CalendarSink;
use crate::models::IsoWeek;
use crate::models::ScheduleWeek;
use crate::models::grid::GridRow;
use crate::services::sync_service::{ExportOutcome, LoadOutcome, ScheduleView, SyncManager, WeekState};

/// UI-facing façade over the sync manager.
pub struct SchedulePresenter {
    sync: Arc<SyncManager>,
    sink: Arc<dyn CalendarSink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleSnapshot {
    pub week: IsoWeek,
    pub current_week: IsoWeek,
    pub state: WeekState,
    pub rows: Vec<GridRow>,
}

impl SchedulePresenter {
    pub fn new(sync: Arc<SyncManager>, sink: Arc<dyn CalendarSink>) -> Self {
        Self { sync, sink }
    }

    pub fn sync(&self) -> &Arc<SyncManager> {
        &self.sync
    }

    pub fn current_grid(&self) -> Arc<ScheduleWeek> {
        self.sync.view().grid
    }

    pub fn selected_week(&self) -> IsoWeek {
        self.sync.selected_week()
    }

    pub fn current_week(&self) -> IsoWeek {
        self.sync.current_week()
    }

    pub fn state(&self) -> WeekState {
        self.sync.view().state
    }

    pub fn rows(&self) -> Vec<GridRow> {
        self.current_grid().display_rows()
    }

    pub fn snapshot(&self) -> ScheduleSnapshot {
        let view = self.sync.view();
        ScheduleSnapshot {
            week: view.week,
            current_week: self.sync.current_week(),
            state: view.state,
            rows: view.grid.display_rows(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ScheduleView> {
        self.sync.subscribe()
    }

    pub async fn change_week(&self, week: IsoWeek) -> Result<LoadOutcome, AppError> {
        self.sync.set_selected_week(week).await
    }

    pub async fn refresh(&self) -> Result<LoadOutcome, AppError> {
        self.sync.load(self.sync.selected_week(), true).await
    }

    pub async fn export(&self, week: IsoWeek) -> Result<ExportOutcome, AppError> {
        self.sync.export_calendar(week, self.sink.as_ref()).await
    }
}
