//! Повторяющиеся напоминания для купивших.
//!
//! Каждое напоминание это tokio-задача со своим `CancellationToken`: она ждёт
//! `due_at`, отправляет сообщение и сама перевзводится на тот же интервал.
//! Описание следующего срабатывания хранится в записи пользователя, так что
//! после перезапуска `restore()` поднимает задачи заново.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::database::Store;
use crate::engine::reply::{Button, Reply};
use crate::models::flags::REMINDERS_DISABLED;
use crate::models::{ReminderPayload, ScheduledReminder, UserId};

/// `callback_data` кнопки в напоминании.
pub const START_CHECKIN: &str = "start_checkin";

pub const MAX_SEND_ATTEMPTS: u32 = 3;
pub const RETRY_BACKOFF: Duration = Duration::from_secs(30);
/// Самый длинный допустимый интервал между напоминаниями.
pub const MAX_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);
/// Через сколько срабатывает напоминание, просроченное за время простоя.
pub const OVERDUE_GRACE: Duration = Duration::from_secs(15);

pub const VARIANTS: [&str; 5] = [
    "👋 Quick check-in! How did your first few days with the mindset plan go?",
    "🌱 Small steps still count. What's one win you had since we last talked?",
    "🔁 Consistency beats intensity. Ready for today's check-in?",
    "💪 You've been showing up for a while now. Let's review how your energy is trending.",
    "⭐ Keep the streak alive: two minutes, one check-in.",
];

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("recipient blocked the bot")]
    Blocked,
    #[error("send failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chat_id: i64, reply: &Reply) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// Отправлено, следующее срабатывание через указанную задержку.
    Rearmed(Duration),
    /// Напоминание снято или выключено, делать нечего.
    Stopped,
    /// Все попытки отправки провалились, напоминания выключены до /start.
    Disabled,
}

/// Текст напоминания по номеру; после последнего варианта повторяется он.
pub fn reminder_reply(sequence: u32) -> Reply {
    let index = (sequence as usize).min(VARIANTS.len() - 1);
    Reply::text(VARIANTS[index])
        .with_row(vec![Button::callback("📝 Start check-in", START_CHECKIN)])
}

/// Сколько ждать до `due_at`. Просроченное срабатывает через `OVERDUE_GRACE`.
pub fn remaining_delay(due_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    match (due_at - now).to_std() {
        Ok(delay) if !delay.is_zero() => delay,
        _ => OVERDUE_GRACE,
    }
}

struct Job {
    generation: u64,
    token: CancellationToken,
}

struct Inner {
    store: Store,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    jobs: Mutex<HashMap<UserId, Job>>,
    generation: AtomicU64,
}

#[derive(Clone)]
pub struct Reminders {
    inner: Arc<Inner>,
}

impl Reminders {
    pub fn new(store: Store, notifier: Arc<dyn Notifier>, interval: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                notifier,
                interval: interval.min(MAX_INTERVAL),
                jobs: Mutex::new(HashMap::new()),
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    /// Описание следующего напоминания; счётчик продолжается с предыдущего.
    pub fn next_descriptor(
        &self,
        previous: Option<&ScheduledReminder>,
        delay: Duration,
        payload: ReminderPayload,
    ) -> ScheduledReminder {
        // после ограничения MAX_INTERVAL переполнения быть не может
        let delay = chrono::Duration::from_std(delay.min(MAX_INTERVAL))
            .unwrap_or_else(|_| chrono::Duration::days(365));
        ScheduledReminder {
            due_at: Utc::now() + delay,
            sequence: previous.map(|r| r.sequence).unwrap_or(0),
            chat_id: payload.chat_id,
        }
    }

    /// Снимает текущее напоминание пользователя и ставит новое через `delay`.
    pub async fn schedule_once(
        &self,
        user_id: UserId,
        delay: Duration,
        payload: ReminderPayload,
    ) -> ScheduledReminder {
        self.cancel(user_id).await;

        let previous = self.inner.store.get(user_id).await.scheduled_reminder;
        let reminder = self.next_descriptor(previous.as_ref(), delay, payload);

        let stored = reminder.clone();
        if let Err(e) = self
            .inner
            .store
            .upsert(user_id, move |session| {
                session.scheduled_reminder = Some(stored);
                session.clear_flag(REMINDERS_DISABLED);
            })
            .await
        {
            log::error!("❌ Reminder for user {} not persisted: {}", user_id, e);
        }

        self.arm(user_id, &reminder).await;
        reminder
    }

    /// Взводит задачу по уже сохранённому описанию (без записи в хранилище).
    pub async fn arm(&self, user_id: UserId, reminder: &ScheduledReminder) {
        let delay = remaining_delay(reminder.due_at, Utc::now());
        let token = CancellationToken::new();
        let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed);

        {
            let mut jobs = self.inner.jobs.lock().await;
            // сначала отменяем старую задачу, потом регистрируем новую
            if let Some(previous) = jobs.remove(&user_id) {
                previous.token.cancel();
            }
            jobs.insert(user_id, Job { generation, token: token.clone() });
        }

        log::info!("⏰ Reminder #{} for user {} armed in {:?}", reminder.sequence, user_id, delay);

        let this = self.clone();
        let payload = reminder.payload();
        tokio::spawn(async move {
            this.run_job(user_id, payload, delay, token, generation).await;
        });
    }

    pub async fn cancel(&self, user_id: UserId) -> bool {
        let mut jobs = self.inner.jobs.lock().await;
        match jobs.remove(&user_id) {
            Some(job) => {
                job.token.cancel();
                true
            }
            None => false,
        }
    }

    pub async fn is_armed(&self, user_id: UserId) -> bool {
        self.inner.jobs.lock().await.contains_key(&user_id)
    }

    pub async fn armed_count(&self) -> usize {
        self.inner.jobs.lock().await.len()
    }

    /// Поднимает задачи по сохранённым описаниям после перезапуска.
    pub async fn restore(&self) -> usize {
        let mut restored = 0;
        for session in self.inner.store.all().await {
            if session.has_flag(REMINDERS_DISABLED) {
                continue;
            }
            if let Some(reminder) = &session.scheduled_reminder {
                self.arm(session.id, reminder).await;
                restored += 1;
            }
        }
        log::info!("🔁 Restored {} pending reminders", restored);
        restored
    }

    /// Одно срабатывание. Отменённый `token` значит, что задачу уже
    /// заменили: такое срабатывание ничего не пишет в хранилище.
    pub async fn on_fire(
        &self,
        user_id: UserId,
        payload: ReminderPayload,
        token: &CancellationToken,
    ) -> FireOutcome {
        if token.is_cancelled() {
            return FireOutcome::Stopped;
        }
        let session = self.inner.store.get(user_id).await;
        if session.has_flag(REMINDERS_DISABLED) {
            return FireOutcome::Stopped;
        }
        let Some(current) = session.scheduled_reminder else {
            return FireOutcome::Stopped;
        };

        let reply = reminder_reply(current.sequence);

        let mut delivered = false;
        for attempt in 1..=MAX_SEND_ATTEMPTS {
            match self.inner.notifier.send(payload.chat_id, &reply).await {
                Ok(()) => {
                    delivered = true;
                    break;
                }
                Err(NotifyError::Blocked) => {
                    log::warn!("🚫 User {} blocked the bot, reminder dropped", user_id);
                    break;
                }
                Err(e) => {
                    log::warn!(
                        "⚠️ Reminder for user {} failed (attempt {}/{}): {}",
                        user_id, attempt, MAX_SEND_ATTEMPTS, e
                    );
                    if attempt < MAX_SEND_ATTEMPTS {
                        tokio::select! {
                            _ = token.cancelled() => return FireOutcome::Stopped,
                            _ = tokio::time::sleep(RETRY_BACKOFF * attempt) => {}
                        }
                    }
                }
            }
        }

        if !delivered {
            // новое напоминание отменяет задачу до записи своего описания,
            // поэтому проверка под замком хранилища достаточна
            let live = token.clone();
            if let Err(e) = self
                .inner
                .store
                .upsert(user_id, move |session| {
                    if !live.is_cancelled() {
                        session.mark(REMINDERS_DISABLED);
                    }
                })
                .await
            {
                log::error!("❌ Could not persist disabled reminders for user {}: {}", user_id, e);
            }
            if token.is_cancelled() {
                return FireOutcome::Stopped;
            }
            log::info!("🔕 Reminders disabled for user {}", user_id);
            return FireOutcome::Disabled;
        }

        let interval = self.inner.interval;
        let mut next = self.next_descriptor(Some(&current), interval, payload);
        next.sequence = current.sequence + 1;

        let live = token.clone();
        if let Err(e) = self
            .inner
            .store
            .upsert(user_id, move |session| {
                if !live.is_cancelled() {
                    session.scheduled_reminder = Some(next);
                }
            })
            .await
        {
            log::error!("❌ Reminder progress for user {} not persisted: {}", user_id, e);
        }

        log::info!("📨 Reminder #{} sent to user {}", current.sequence, user_id);
        FireOutcome::Rearmed(interval)
    }

    async fn run_job(
        self,
        user_id: UserId,
        payload: ReminderPayload,
        first_delay: Duration,
        token: CancellationToken,
        generation: u64,
    ) {
        let mut delay = first_delay;
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }

            match self.on_fire(user_id, payload, &token).await {
                FireOutcome::Rearmed(next) if !token.is_cancelled() => delay = next,
                _ => break,
            }
        }

        let mut jobs = self.inner.jobs.lock().await;
        if jobs.get(&user_id).is_some_and(|job| job.generation == generation) {
            jobs.remove(&user_id);
        }
    }
}
