use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use std::fmt;
use chrono::{DateTime, Utc};

use crate::engine::flows::{FlowId, State};
use super::{Flag, JournalEntry, ScheduledReminder};

/// Идентификатор пользователя мессенджера.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<teloxide::types::UserId> for UserId {
    fn from(id: teloxide::types::UserId) -> Self {
        UserId(id.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    pub id: UserId,
    #[serde(default)]
    pub flow: FlowId,
    #[serde(default)]
    pub state: State,
    #[serde(default)]
    pub answers: Vec<String>,
    #[serde(default)]
    pub flags: BTreeMap<String, Flag>,
    #[serde(default)]
    pub scheduled_reminder: Option<ScheduledReminder>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub payment_reference: Option<String>,
    /// Ссылка на checkout для повторного показа кнопки оплаты.
    #[serde(default)]
    pub checkout_url: Option<String>,
    #[serde(default)]
    pub program_day: u32,
    #[serde(default)]
    pub journal: Vec<JournalEntry>,
    pub created_at: DateTime<Utc>,
    pub last_interaction_at: DateTime<Utc>,
}

impl UserSession {
    pub fn new(id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id,
            flow: FlowId::default(),
            state: State::default(),
            answers: Vec::new(),
            flags: BTreeMap::new(),
            scheduled_reminder: None,
            email: None,
            payment_reference: None,
            checkout_url: None,
            program_day: 0,
            journal: Vec::new(),
            created_at: now,
            last_interaction_at: now,
        }
    }

    /// Флаг считается выставленным, если это `true` или отметка времени.
    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.get(name).is_some_and(Flag::is_set)
    }

    /// Отмечает веху текущим временем.
    pub fn mark(&mut self, name: &str) {
        self.flags.insert(name.to_string(), Flag::At(Utc::now()));
    }

    pub fn set_flag(&mut self, name: &str, value: bool) {
        self.flags.insert(name.to_string(), Flag::Bool(value));
    }

    pub fn clear_flag(&mut self, name: &str) {
        self.flags.remove(name);
    }

    /// Ответ по индексу для подстановки в следующие вопросы.
    pub fn answer(&self, index: usize) -> &str {
        self.answers.get(index).map(String::as_str).unwrap_or("")
    }
}
