use std::sync::Arc;

use tracing::{error, warn};

use crate::db::kv::KeyValueStore;
use crate::error::AppError;
use crate::models::{ClassSession, IsoWeek};

pub const SELECTED_SCHOOL_KEY: &str = "selectedSchoolId";
pub const THEME_KEY: &str = "theme";
pub const LOGGED_IN_KEY: &str = "isLoggedIn";

pub fn schedule_key(week: IsoWeek) -> String {
    format!("schedule_{}", week)
}

/// Week-keyed cache of raw (pre-organization) session lists.
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Cached sessions for `week`. A missing, unreadable or corrupt entry is a
    /// cache miss.
    pub async fn get(&self, week: IsoWeek) -> Option<Vec<ClassSession>> {
        let key = schedule_key(week);
        let raw = match self.kv.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                error!("failed to read cache entry {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str::<Vec<ClassSession>>(&raw) {
            Ok(sessions) => Some(sessions),
            Err(e) => {
                warn!("ignoring corrupt cache entry {}: {}", key, e);
                None
            }
        }
    }

    pub async fn set(&self, week: IsoWeek, sessions: &[ClassSession]) -> Result<(), AppError> {
        let raw = serde_json::to_string(sessions)?;
        self.kv.set(&schedule_key(week), &raw).await
    }
}

/// Simple user preferences kept next to the cache.
#[derive(Clone)]
pub struct Preferences {
    kv: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub async fn selected_school_id(&self) -> Result<Option<String>, AppError> {
        let school_id = self.kv.get(SELECTED_SCHOOL_KEY).await?;
        Ok(school_id.filter(|id| !id.trim().is_empty()))
    }

    pub async fn set_selected_school_id(&self, school_id: &str) -> Result<(), AppError> {
        self.kv.set(SELECTED_SCHOOL_KEY, school_id).await
    }

    pub async fn theme(&self) -> Result<Option<String>, AppError> {
        self.kv.get(THEME_KEY).await
    }

    pub async fn set_theme(&self, theme: &str) -> Result<(), AppError> {
        self.kv.set(THEME_KEY, theme).await
    }

    pub async fn is_logged_in(&self) -> Result<bool, AppError> {
        let raw = self.kv.get(LOGGED_IN_KEY).await?;
        Ok(raw.as_deref() == Some("true"))
    }

    pub async fn set_logged_in(&self, logged_in: bool) -> Result<(), AppError> {
        self.kv
            .set(LOGGED_IN_KEY, if logged_in { "true" } else { "false" })
            .await
    }

    pub async fn clear_session(&self) -> Result<(), AppError> {
        self.kv.remove(LOGGED_IN_KEY).await?;
        self.kv.remove(SELECTED_SCHOOL_KEY).await
    }
}
