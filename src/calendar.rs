//! `.ics` export of a week's class sessions.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use icalendar::{Calendar, Component, EventLike};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{ClassSession, ClassStatus};

pub const EXPORT_FILE_NAME: &str = "Skema.ics";

/// Serialized calendar ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDocument {
    pub content: String,
    pub event_count: usize,
}

/// Wall-clock length of a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonDuration {
    pub hours: i64,
    pub minutes: i64,
}

impl LessonDuration {
    /// RFC 5545 DURATION value, e.g. `PT1H30M`.
    pub fn to_ics(&self) -> String {
        format!("PT{}H{}M", self.hours, self.minutes)
    }
}

/// Encode all sessions into one calendar. Fails as a whole if any session
/// cannot be represented.
pub fn encode(sessions: &[ClassSession]) -> Result<CalendarDocument, AppError> {
    let mut cal = Calendar::new();

    for session in sessions {
        cal.push(build_event(session)?);
    }

    let cal = cal.done();
    Ok(CalendarDocument {
        content: cal.to_string(),
        event_count: sessions.len(),
    })
}

fn build_event(session: &ClassSession) -> Result<icalendar::Event, AppError> {
    let date = parse_date(&session.date_time)?;
    let (start, end) = parse_interval(&session.time)?;
    let duration = lesson_duration(start, end)?;
    let starts_at = NaiveDateTime::new(date, start);

    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&format!("{}@skema", Uuid::new_v4()));
    ics_event.summary(&session.class_name);
    ics_event.description(&session.description);
    if !session.room.is_empty() {
        ics_event.location(&session.room);
    }

    // Floating local time, lessons follow the school's wall clock.
    ics_event.add_property("DTSTART", starts_at.format("%Y%m%dT%H%M%S").to_string());
    ics_event.add_property("DURATION", duration.to_ics());
    ics_event.add_property("STATUS", event_status(session.status));

    Ok(ics_event.done())
}

pub fn event_status(status: ClassStatus) -> &'static str {
    match status {
        ClassStatus::Cancelled => "CANCELLED",
        ClassStatus::Changed => "TENTATIVE",
        ClassStatus::Normal => "CONFIRMED",
    }
}

/// Calendar date from a `"DD/MM/YYYY HH:MM"` value; only the date part is used.
fn parse_date(date_time: &str) -> Result<NaiveDate, AppError> {
    let date_part = date_time
        .split_whitespace()
        .next()
        .ok_or_else(|| AppError::Encoding(format!("missing date in '{}'", date_time)))?;

    let parts: Vec<u32> = date_part
        .split('/')
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|_| AppError::Encoding(format!("invalid date '{}'", date_part)))?;

    match parts.as_slice() {
        [day, month, year] => NaiveDate::from_ymd_opt(*year as i32, *month, *day)
            .ok_or_else(|| AppError::Encoding(format!("invalid date '{}'", date_part))),
        _ => Err(AppError::Encoding(format!("invalid date '{}'", date_part))),
    }
}

/// Start and end of a `"HH:MM - HH:MM"` interval.
pub fn parse_interval(time: &str) -> Result<(NaiveTime, NaiveTime), AppError> {
    let (start, end) = time
        .split_once('-')
        .ok_or_else(|| AppError::Encoding(format!("invalid time interval '{}'", time)))?;

    let parse = |raw: &str| {
        NaiveTime::parse_from_str(raw.trim(), "%H:%M")
            .map_err(|_| AppError::Encoding(format!("invalid time '{}' in '{}'", raw.trim(), time)))
    };

    Ok((parse(start)?, parse(end)?))
}

pub fn lesson_duration(start: NaiveTime, end: NaiveTime) -> Result<LessonDuration, AppError> {
    let minutes = (end - start).num_minutes();
    if minutes < 0 {
        return Err(AppError::Encoding(format!(
            "lesson ends ({}) before it starts ({})",
            end.format("%H:%M"),
            start.format("%H:%M")
        )));
    }

    Ok(LessonDuration {
        hours: minutes / 60,
        minutes: minutes % 60,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SchoolDay;

    fn session(status: ClassStatus, time: &str, date_time: &str) -> ClassSession {
        ClassSession {
            status,
            class_name: "Math".to_string(),
            teacher: "AB".to_string(),
            room: "101".to_string(),
            description: "Chapter 4".to_string(),
            time: time.to_string(),
            day: SchoolDay::Tuesday,
            date_time: date_time.to_string(),
            homework: String::new(),
            resources: String::new(),
            notes: String::new(),
            detailed_link: String::new(),
        }
    }

    #[test]
    fn cancelled_lesson_is_exported_as_cancelled() {
        let doc = encode(&[session(
            ClassStatus::Cancelled,
            "08:00 - 09:30",
            "30/01/2024 08:00",
        )])
        .unwrap();

        assert_eq!(doc.event_count, 1);
        assert!(doc.content.contains("STATUS:CANCELLED"), "ICS:\n{}", doc.content);
        assert!(doc.content.contains("DURATION:PT1H30M"), "ICS:\n{}", doc.content);
        assert!(doc.content.contains("DTSTART:20240130T080000"), "ICS:\n{}", doc.content);
        assert!(doc.content.contains("SUMMARY:Math"));
        assert!(doc.content.contains("DESCRIPTION:Chapter 4"));
        assert!(doc.content.contains("LOCATION:101"));
    }

    #[test]
    fn status_mapping_covers_every_variant() {
        assert_eq!(event_status(ClassStatus::Cancelled), "CANCELLED");
        assert_eq!(event_status(ClassStatus::Changed), "TENTATIVE");
        assert_eq!(event_status(ClassStatus::Normal), "CONFIRMED");
    }

    #[test]
    fn one_event_per_session() {
        let doc = encode(&[
            session(ClassStatus::Normal, "08:00 - 09:30", "29/01/2024 08:00"),
            session(ClassStatus::Changed, "10:00 - 10:45", "29/01/2024 10:00"),
        ])
        .unwrap();

        assert_eq!(doc.event_count, 2);
        assert_eq!(doc.content.matches("BEGIN:VEVENT").count(), 2);
        assert!(doc.content.contains("STATUS:TENTATIVE"));
        assert!(doc.content.contains("DURATION:PT0H45M"));
    }

    #[test]
    fn end_before_start_is_an_error() {
        let result = encode(&[session(ClassStatus::Normal, "10:00 - 09:00", "29/01/2024 10:00")]);
        assert!(matches!(result, Err(AppError::Encoding(_))));
    }

    #[test]
    fn malformed_date_fails_the_whole_document() {
        let result = encode(&[
            session(ClassStatus::Normal, "08:00 - 09:30", "29/01/2024 08:00"),
            session(ClassStatus::Normal, "10:00 - 11:00", "not a date"),
        ]);
        assert!(matches!(result, Err(AppError::Encoding(_))));

        let result = encode(&[session(ClassStatus::Normal, "08:00 - 09:30", "31/02/2024 08:00")]);
        assert!(matches!(result, Err(AppError::Encoding(_))));
    }

    #[test]
    fn malformed_time_is_an_error() {
        assert!(parse_interval("Time not found").is_err());
        assert!(parse_interval("8 - 9").is_err());
    }

    #[test]
    fn duration_splits_hours_and_minutes() {
        let (start, end) = parse_interval("08:15 - 10:00").unwrap();
        assert_eq!(
            lesson_duration(start, end).unwrap(),
            LessonDuration { hours: 1, minutes: 45 }
        );
    }
}
