use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::LoginState;
use crate::services::SchedulePresenter;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub schedule: Arc<SchedulePresenter>,
    pub login: Arc<LoginState>,
}
