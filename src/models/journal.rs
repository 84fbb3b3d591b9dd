use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalKind {
    Intake,
    Checkin,
    Evidence,
    Experiment,
    IfThen,
    SmallWin,
    QuarterlyReview,
}

/// Завершённая запись дневника: ответы в порядке вопросов.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub kind: JournalKind,
    pub entries: Vec<String>,
    pub recorded_at: DateTime<Utc>,
}

impl JournalEntry {
    pub fn new(kind: JournalKind, entries: Vec<String>) -> Self {
        Self {
            kind,
            entries,
            recorded_at: Utc::now(),
        }
    }
}
