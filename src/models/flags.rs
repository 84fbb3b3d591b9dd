use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};

pub const PURCHASED: &str = "purchased";
pub const ONBOARDING_COMPLETE: &str = "onboarding_complete";
pub const PDF_COMPLETED: &str = "pdf_completed";
pub const PROGRAM_COMPLETE: &str = "program_complete";
pub const REMINDERS_DISABLED: &str = "reminders_disabled";

/// Значение вехи: булево или время, когда она была достигнута.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    At(DateTime<Utc>),
}

impl Flag {
    pub fn is_set(&self) -> bool {
        match self {
            Flag::Bool(value) => *value,
            Flag::At(_) => true,
        }
    }
}
