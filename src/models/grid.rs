use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::models::{ClassSession, SchoolDay};

/// Time-slot × weekday presentation grid for one week.
///
/// Rows are keyed by the session's `time` label ("HH:MM - HH:MM"), so row
/// iteration is lexicographic on the start time. A missing day in a row is a
/// free period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScheduleWeek {
    rows: BTreeMap<String, BTreeMap<SchoolDay, ClassSession>>,
}

/// One display row: a time slot and its five weekday cells.
#[derive(Debug, Clone, Serialize)]
pub struct GridRow {
    pub time: String,
    pub cells: Vec<Option<ClassSession>>,
}

impl ScheduleWeek {
    pub fn get(&self, time: &str, day: SchoolDay) -> Option<&ClassSession> {
        self.rows.get(time).and_then(|row| row.get(&day))
    }

    pub fn row(&self, time: &str) -> Option<&BTreeMap<SchoolDay, ClassSession>> {
        self.rows.get(time)
    }

    pub fn time_slots(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in display order with one cell per weekday, Monday first.
    pub fn display_rows(&self) -> Vec<GridRow> {
        self.rows
            .iter()
            .map(|(time, row)| GridRow {
                time: time.clone(),
                cells: SchoolDay::ALL
                    .iter()
                    .map(|day| row.get(day).cloned())
                    .collect(),
            })
            .collect()
    }
}

/// Reshape a flat list of sessions into the weekly grid.
///
/// Two sessions sharing a time slot and day cannot both be shown; the later
/// one in input order is kept.
pub fn organize(sessions: &[ClassSession]) -> ScheduleWeek {
    let mut grid = ScheduleWeek::default();

    for session in sessions {
        let row = grid.rows.entry(session.time.clone()).or_default();
        if let Some(replaced) = row.insert(session.day, session.clone()) {
            warn!(
                "duplicate session at {} {}: '{}' replaced by '{}'",
                session.day.code(),
                session.time,
                replaced.class_name,
                session.class_name
            );
        }
    }

    grid
}
