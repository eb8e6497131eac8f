use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::{Mutex as AsyncMutex, watch};
use tracing::{error, info, warn};

use crate::calendar::{self, EXPORT_FILE_NAME};
use crate::clock::Clock;
use crate::db::{Preferences, SessionStore};
use crate::error::AppError;
use crate::export::CalendarSink;
use crate::models::grid::organize;
use crate::models::{ClassSession, IsoWeek, ScheduleWeek};
use crate::notify::Notifier;
use crate::source::{ScheduleSource, parse_schedule_response};

pub const NOTIFICATION_TITLE: &str = "Schedule Update";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekState {
    Unfetched,
    CachedOnly,
    Fresh,
    Fetching,
    Error,
}

/// What the UI currently shows: the selected week and its grid.
///
/// `grid` is derived from `sessions` and only rebuilt when the session list
/// actually changes.
#[derive(Debug, Clone)]
pub struct ScheduleView {
    pub week: IsoWeek,
    pub state: WeekState,
    pub sessions: Arc<Vec<ClassSession>>,
    pub grid: Arc<ScheduleWeek>,
}

impl ScheduleView {
    fn empty(week: IsoWeek, state: WeekState) -> Self {
        Self {
            week,
            state,
            sessions: Arc::new(Vec::new()),
            grid: Arc::new(ScheduleWeek::default()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum LoadOutcome {
    Cached { sessions: usize },
    Fetched { sessions: usize, changed: bool, notified: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Saved(PathBuf),
    NothingToExport,
}

pub struct SyncManager {
    store: SessionStore,
    prefs: Preferences,
    source: Arc<dyn ScheduleSource>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    permission_requested: AtomicBool,
    states: Mutex<HashMap<IsoWeek, WeekState>>,
    in_flight: Mutex<HashMap<IsoWeek, Arc<AsyncMutex<()>>>>,
    view: watch::Sender<ScheduleView>,
}

impl SyncManager {
    pub fn new(
        store: SessionStore,
        prefs: Preferences,
        source: Arc<dyn ScheduleSource>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let week = clock.current_week();
        let (view, _) = watch::channel(ScheduleView::empty(week, WeekState::Unfetched));
        Self {
            store,
            prefs,
            source,
            notifier,
            clock,
            permission_requested: AtomicBool::new(false),
            states: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            view,
        }
    }

    pub fn current_week(&self) -> IsoWeek {
        self.clock.current_week()
    }

    /// The current week followed by the next `count - 1` weeks.
    pub fn upcoming_weeks(&self, count: usize) -> Vec<IsoWeek> {
        IsoWeek::upcoming(self.clock.today(), count)
    }

    pub fn selected_week(&self) -> IsoWeek {
        self.view.borrow().week
    }

    pub fn week_state(&self, week: IsoWeek) -> WeekState {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&week)
            .copied()
            .unwrap_or(WeekState::Unfetched)
    }

    pub fn view(&self) -> ScheduleView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScheduleView> {
        self.view.subscribe()
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// Make `week` the displayed week and load it cache-first.
    pub async fn set_selected_week(&self, week: IsoWeek) -> Result<LoadOutcome, AppError> {
        let state = self.week_state(week);
        self.view.send_if_modified(|view| {
            if view.week == week {
                return false;
            }
            *view = ScheduleView::empty(week, state);
            true
        });
        self.load(week, false).await
    }

    /// Serve `week` from cache, or fetch it when missing or when forced.
    ///
    /// On failure the previously shown data stays in place and the week is
    /// marked [`WeekState::Error`].
    pub async fn load(&self, week: IsoWeek, force_refresh: bool) -> Result<LoadOutcome, AppError> {
        let guard = self.week_guard(week);
        let _in_flight = guard.lock().await;

        if !force_refresh {
            if let Some(sessions) = self.store.get(week).await {
                info!("Using cached schedule for week {}", week);
                let count = sessions.len();
                self.publish(week, sessions, WeekState::CachedOnly);
                return Ok(LoadOutcome::Cached { sessions: count });
            }
        }

        self.set_state(week, WeekState::Fetching);
        match self.fetch_and_store(week).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!("Loading schedule for week {} failed (forced: {}): {}", week, force_refresh, e);
                self.set_state(week, WeekState::Error);
                Err(e)
            }
        }
    }

    /// Write the cached sessions for `week` as an `.ics` document. Never
    /// touches the network.
    pub async fn export_calendar(
        &self,
        week: IsoWeek,
        sink: &dyn CalendarSink,
    ) -> Result<ExportOutcome, AppError> {
        let Some(sessions) = self.store.get(week).await else {
            info!("Nothing to export for week {}", week);
            return Ok(ExportOutcome::NothingToExport);
        };

        let document = calendar::encode(&sessions).map_err(|e| {
            error!("Calendar export for week {} failed: {}", week, e);
            e
        })?;

        let path = sink.save(EXPORT_FILE_NAME, &document.content).await?;
        info!("Exported {} events for week {}", document.event_count, week);
        Ok(ExportOutcome::Saved(path))
    }

    async fn fetch_and_store(&self, week: IsoWeek) -> Result<LoadOutcome, AppError> {
        let school_id = self
            .prefs
            .selected_school_id()
            .await?
            .ok_or_else(|| AppError::BadRequest("No school selected".to_string()))?;

        let body = self.source.fetch_week(&school_id, week).await?;
        let sessions = parse_schedule_response(&body)?;

        let previous = self.store.get(week).await;
        let changed = previous.as_ref() != Some(&sessions);

        self.store.set(week, &sessions).await?;

        let notified = if changed && week == self.current_week() {
            self.notify_update(week).await
        } else {
            false
        };

        let count = sessions.len();
        info!(
            "Fetched schedule for week {}: {} sessions (changed: {})",
            week, count, changed
        );
        self.publish(week, sessions, WeekState::Fresh);

        Ok(LoadOutcome::Fetched {
            sessions: count,
            changed,
            notified,
        })
    }

    async fn notify_update(&self, week: IsoWeek) -> bool {
        let granted = self.permission_granted().await;

        if !granted {
            info!("Notification permission denied, not announcing week {}", week);
            return false;
        }

        let body = format!("Schedule updated for week {}", week);
        match self.notifier.send(NOTIFICATION_TITLE, &body).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to post update notification for week {}: {}", week, e);
                false
            }
        }
    }

    /// Checked on every update; the user is only prompted the first time.
    async fn permission_granted(&self) -> bool {
        if self.notifier.is_permission_granted().await {
            return true;
        }
        if self.permission_requested.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.notifier.request_permission().await
    }

    fn week_guard(&self, week: IsoWeek) -> Arc<AsyncMutex<()>> {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(week)
            .or_default()
            .clone()
    }

    fn record_state(&self, week: IsoWeek, state: WeekState) {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(week, state);
    }

    fn set_state(&self, week: IsoWeek, state: WeekState) {
        self.record_state(week, state);
        self.view.send_if_modified(|view| {
            if view.week != week || view.state == state {
                return false;
            }
            view.state = state;
            true
        });
    }

    /// Show `sessions` if `week` is the displayed week. Other weeks (e.g.
    /// pre-warmed ones) only update their state.
    fn publish(&self, week: IsoWeek, sessions: Vec<ClassSession>, state: WeekState) {
        self.record_state(week, state);
        self.view.send_if_modified(|view| {
            if view.week != week {
                return false;
            }
            if *view.sessions != sessions {
                view.grid = Arc::new(organize(&sessions));
                view.sessions = Arc::new(sessions);
            }
            view.state = state;
            true
        });
    }
}
