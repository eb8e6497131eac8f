pub mod sync_service;
pub mod scheduler;
pub mod presenter;

pub use sync_service::{ExportOutcome, LoadOutcome, ScheduleView, SyncManager, WeekState};
pub use scheduler::{RefreshHandle, RefreshScheduler, RefreshStats};
pub use presenter::{SchedulePresenter, ScheduleSnapshot};
