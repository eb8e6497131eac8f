use serde::{Deserialize, Serialize};

/// Lesson status as reported by the schedule source.
///
/// The source uses Danish marker strings: `"Aflyst!"` for a cancelled lesson,
/// `"Ændret!"` for a changed one. Anything else is a normal lesson.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClassStatus {
    #[default]
    Normal,
    Cancelled,
    Changed,
}

impl ClassStatus {
    pub const CANCELLED_MARKER: &'static str = "Aflyst!";
    pub const CHANGED_MARKER: &'static str = "Ændret!";
    pub const NORMAL_MARKER: &'static str = "normal";

    pub fn from_raw(raw: &str) -> Self {
        match raw.trim() {
            Self::CANCELLED_MARKER => ClassStatus::Cancelled,
            Self::CHANGED_MARKER => ClassStatus::Changed,
            _ => ClassStatus::Normal,
        }
    }

    pub fn as_raw(&self) -> &'static str {
        match self {
            ClassStatus::Normal => Self::NORMAL_MARKER,
            ClassStatus::Cancelled => Self::CANCELLED_MARKER,
            ClassStatus::Changed => Self::CHANGED_MARKER,
        }
    }
}

impl From<String> for ClassStatus {
    fn from(raw: String) -> Self {
        ClassStatus::from_raw(&raw)
    }
}

impl From<ClassStatus> for String {
    fn from(status: ClassStatus) -> Self {
        status.as_raw().to_string()
    }
}

/// Weekday codes used by the schedule source, Monday through Friday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SchoolDay {
    #[serde(rename = "ma")]
    Monday,
    #[serde(rename = "ti")]
    Tuesday,
    #[serde(rename = "on")]
    Wednesday,
    #[serde(rename = "to")]
    Thursday,
    #[serde(rename = "fr")]
    Friday,
}

impl SchoolDay {
    pub const ALL: [SchoolDay; 5] = [
        SchoolDay::Monday,
        SchoolDay::Tuesday,
        SchoolDay::Wednesday,
        SchoolDay::Thursday,
        SchoolDay::Friday,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            SchoolDay::Monday => "ma",
            SchoolDay::Tuesday => "ti",
            SchoolDay::Wednesday => "on",
            SchoolDay::Thursday => "to",
            SchoolDay::Friday => "fr",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SchoolDay::Monday => "Mandag",
            SchoolDay::Tuesday => "Tirsdag",
            SchoolDay::Wednesday => "Onsdag",
            SchoolDay::Thursday => "Torsdag",
            SchoolDay::Friday => "Fredag",
        }
    }
}

/// One scheduled lesson occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSession {
    #[serde(default)]
    pub status: ClassStatus,
    #[serde(alias = "className")]
    pub class_name: String,
    #[serde(default)]
    pub teacher: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub description: String,
    /// "HH:MM - HH:MM"
    pub time: String,
    pub day: SchoolDay,
    /// "DD/MM/YYYY HH:MM"
    #[serde(default, alias = "dateTime")]
    pub date_time: String,
    #[serde(default)]
    pub homework: String,
    #[serde(default)]
    pub resources: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, alias = "detailedLink")]
    pub detailed_link: String,
}
