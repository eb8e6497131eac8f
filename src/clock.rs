use std::sync::Mutex;

use chrono::{Local, NaiveDate};

use crate::models::IsoWeek;

/// Source of "today", so the current real-world week can be pinned in tests.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;

    fn current_week(&self) -> IsoWeek {
        IsoWeek::of(self.today())
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock frozen at a given date until moved with [`FixedClock::set`].
pub struct FixedClock {
    today: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        *self.today.lock().unwrap_or_else(|e| e.into_inner()) = today;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock().unwrap_or_else(|e| e.into_inner())
    }
}
