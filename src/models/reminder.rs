use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};

/// Куда отправлять напоминание.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPayload {
    pub chat_id: i64,
}

/// Следующее запланированное напоминание пользователя (не больше одного).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledReminder {
    pub due_at: DateTime<Utc>,
    pub sequence: u32,
    pub chat_id: i64,
}

impl ScheduledReminder {
    pub fn payload(&self) -> ReminderPayload {
        ReminderPayload { chat_id: self.chat_id }
    }
}
