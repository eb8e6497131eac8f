#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Value, json};
use skema::clock::FixedClock;
use skema::db::{MemoryKvStore, Preferences, SessionStore};
use skema::error::AppError;
use skema::export::CalendarSink;
use skema::models::IsoWeek;
use skema::notify::Notifier;
use skema::services::SyncManager;
use skema::source::ScheduleSource;

pub const SCHOOL_ID: &str = "517";

/// 2024-03-18, a Monday in ISO week 12.
pub fn week_12_monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 18).unwrap()
}

pub fn week(n: u32) -> IsoWeek {
    IsoWeek::new(n).unwrap()
}

pub fn session_json(day: &str, time: &str, class_name: &str, status: &str) -> Value {
    json!({
        "status": status,
        "class_name": class_name,
        "teacher": "AB",
        "room": "101",
        "description": "",
        "time": time,
        "day": day,
        "date_time": "18/03/2024 08:00",
        "homework": "",
        "resources": "",
        "notes": "",
        "detailed_link": "/lectio/517/aktivitet/1"
    })
}

pub fn body(sessions: &[Value]) -> String {
    serde_json::to_string(sessions).unwrap()
}

/// Scripted schedule source that records every request.
#[derive(Default)]
pub struct FakeSource {
    responses: Mutex<HashMap<IsoWeek, Result<String, String>>>,
    requests: Mutex<Vec<(String, IsoWeek)>>,
    delay: Mutex<Option<Duration>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl FakeSource {
    pub fn respond(&self, week: IsoWeek, body: String) {
        self.responses.lock().unwrap().insert(week, Ok(body));
    }

    pub fn fail(&self, week: IsoWeek, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(week, Err(message.to_string()));
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<(String, IsoWeek)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScheduleSource for FakeSource {
    async fn fetch_week(&self, school_id: &str, week: IsoWeek) -> Result<String, AppError> {
        self.requests
            .lock()
            .unwrap()
            .push((school_id.to_string(), week));

        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let response = self.responses.lock().unwrap().get(&week).cloned();
        self.active.fetch_sub(1, Ordering::SeqCst);

        match response {
            Some(Ok(body)) => Ok(body),
            Some(Err(message)) => Err(AppError::Network(message)),
            None => Err(AppError::Network(format!("no response scripted for week {}", week))),
        }
    }
}

pub struct FakeNotifier {
    granted: AtomicBool,
    grant_on_request: bool,
    pub permission_requests: AtomicUsize,
    sent: Mutex<Vec<(String, String)>>,
}

impl FakeNotifier {
    pub fn granted() -> Self {
        Self::new(true, true)
    }

    pub fn denied() -> Self {
        Self::new(false, false)
    }

    pub fn new(granted: bool, grant_on_request: bool) -> Self {
        Self {
            granted: AtomicBool::new(granted),
            grant_on_request,
            permission_requests: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Simulates the user changing the permission outside the app.
    pub fn set_granted(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn is_permission_granted(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    async fn request_permission(&self) -> bool {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
        self.grant_on_request
    }

    async fn send(&self, title: &str, body: &str) -> Result<(), AppError> {
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySink {
    saved: Mutex<Vec<(String, String)>>,
}

impl MemorySink {
    pub fn saved(&self) -> Vec<(String, String)> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarSink for MemorySink {
    async fn save(&self, suggested_name: &str, contents: &str) -> Result<PathBuf, AppError> {
        self.saved
            .lock()
            .unwrap()
            .push((suggested_name.to_string(), contents.to_string()));
        Ok(PathBuf::from(suggested_name))
    }
}

pub struct Harness {
    pub kv: Arc<MemoryKvStore>,
    pub store: SessionStore,
    pub prefs: Preferences,
    pub source: Arc<FakeSource>,
    pub notifier: Arc<FakeNotifier>,
    pub clock: Arc<FixedClock>,
    pub sync: Arc<SyncManager>,
}

pub async fn harness_with(today: NaiveDate, notifier: FakeNotifier) -> Harness {
    let kv = Arc::new(MemoryKvStore::new());
    let store = SessionStore::new(kv.clone());
    let prefs = Preferences::new(kv.clone());
    prefs.set_selected_school_id(SCHOOL_ID).await.unwrap();

    let source = Arc::new(FakeSource::default());
    let notifier = Arc::new(notifier);
    let clock = Arc::new(FixedClock::new(today));

    let sync = Arc::new(SyncManager::new(
        store.clone(),
        prefs.clone(),
        source.clone(),
        notifier.clone(),
        clock.clone(),
    ));

    Harness {
        kv,
        store,
        prefs,
        source,
        notifier,
        clock,
        sync,
    }
}

pub async fn harness() -> Harness {
    harness_with(week_12_monday(), FakeNotifier::granted()).await
}
