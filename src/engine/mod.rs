//! Движок диалога: загружает запись пользователя, находит обработчик для
//! `(диалог, состояние)`, применяет результат и сохраняет запись одной записью
//! в хранилище за ход.

pub mod checkin;
pub mod classify;
pub mod content;
pub mod flows;
pub mod funnel;
pub mod journal;
pub mod program;
pub mod reply;

use std::sync::Arc;

use chrono::Utc;

use crate::database::Store;
use crate::llm::Assistant;
use crate::models::flags::{PURCHASED, REMINDERS_DISABLED};
use crate::models::{ReminderPayload, ScheduledReminder, UserId, UserSession};
use crate::payments::PaymentGateway;
use crate::reminders::Reminders;

use flows::{FlowId, HandlerId, State, StepDef};
use reply::Reply;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no handler registered for flow {flow} in state {state}")]
    MissingHandler { flow: FlowId, state: State },
    #[error("flow {flow} cannot move from {from} to {to}")]
    UndeclaredTransition { flow: FlowId, from: State, to: State },
}

/// Текст сообщения или `callback_data` нажатой кнопки.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Text(String),
    Callback(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub chat_id: i64,
    pub input: Input,
}

impl Inbound {
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self { chat_id, input: Input::Text(text.into()) }
    }

    pub fn callback(chat_id: i64, data: impl Into<String>) -> Self {
        Self { chat_id, input: Input::Callback(data.into()) }
    }
}

/// Результат хода: что ответить и куда перешёл пользователь.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub reply: Reply,
    pub next_state: State,
}

/// Ответ обработчика.
#[derive(Debug, Clone)]
pub struct Step {
    pub reply: Reply,
    pub next: State,
}

impl Step {
    pub fn to(next: State, reply: Reply) -> Self {
        Self { reply, next }
    }
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Цена в минимальных единицах валюты.
    pub offer_amount: u64,
    pub currency: String,
    pub support_contact: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            offer_amount: 500_000,
            currency: "NGN".to_string(),
            support_contact: "@support".to_string(),
        }
    }
}

/// Всё, что видит обработчик за один ход.
pub struct Ctx<'a> {
    pub user_id: UserId,
    pub chat_id: i64,
    pub session: &'a mut UserSession,
    pub input: &'a Input,
    pub engine: &'a Engine,
    reminder: Option<ScheduledReminder>,
}

impl Ctx<'_> {
    /// Текст или данные кнопки как есть.
    pub fn raw(&self) -> &str {
        match self.input {
            Input::Text(text) | Input::Callback(text) => text.trim(),
        }
    }

    /// Осмысленный свободный текст: не пустой, не команда и не кнопка.
    pub fn free_text(&self) -> Option<&str> {
        match self.input {
            Input::Text(text) => {
                let text = text.trim();
                (!text.is_empty() && !text.starts_with('/')).then_some(text)
            }
            Input::Callback(_) => None,
        }
    }

    pub fn current(&self) -> State {
        self.session.state
    }

    /// Повторить вопрос, оставаясь в текущем состоянии.
    pub fn stay(&self, reply: Reply) -> Step {
        Step::to(self.session.state, reply)
    }

    /// Запросить напоминание через интервал; пишется вместе с ходом.
    pub fn request_reminder(&mut self) {
        let reminders = &self.engine.reminders;
        let reminder = reminders.next_descriptor(
            self.session.scheduled_reminder.as_ref(),
            reminders.interval(),
            ReminderPayload { chat_id: self.chat_id },
        );
        self.session.scheduled_reminder = Some(reminder.clone());
        self.session.clear_flag(REMINDERS_DISABLED);
        self.reminder = Some(reminder);
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.engine.settings
    }
}

#[derive(Clone)]
pub struct Engine {
    store: Store,
    reminders: Reminders,
    payments: Arc<dyn PaymentGateway>,
    assistant: Option<Arc<dyn Assistant>>,
    settings: EngineSettings,
}

impl Engine {
    pub fn new(
        store: Store,
        reminders: Reminders,
        payments: Arc<dyn PaymentGateway>,
        assistant: Option<Arc<dyn Assistant>>,
        settings: EngineSettings,
    ) -> Self {
        Self { store, reminders, payments, assistant, settings }
    }

    pub fn payments(&self) -> &dyn PaymentGateway {
        self.payments.as_ref()
    }

    pub fn assistant(&self) -> Option<&dyn Assistant> {
        self.assistant.as_deref()
    }

    pub async fn session(&self, user_id: UserId) -> UserSession {
        self.store.get(user_id).await
    }

    /// Один ход диалога в текущем состоянии пользователя.
    pub async fn handle_message(
        &self,
        user_id: UserId,
        flow_id: FlowId,
        message: Inbound,
    ) -> Result<Turn, EngineError> {
        self.run_turn(user_id, flow_id, message, false).await
    }

    /// Сбрасывает ответы и состояние диалога, вехи остаются.
    pub async fn restart_session(&self, user_id: UserId, flow_id: FlowId) -> UserSession {
        let restart = move |session: &mut UserSession| reset(session, flow_id);

        match self.store.upsert(user_id, restart).await {
            Ok(session) => session,
            Err(e) => {
                log::error!("❌ Restart for user {} not persisted: {}", user_id, e);
                self.store.get(user_id).await
            }
        }
    }

    /// Вход в диалог по команде: закрытые диалоги только для купивших.
    /// Сброс и первый шаг диалога сохраняются одной записью.
    pub async fn begin(
        &self,
        user_id: UserId,
        flow_id: FlowId,
        message: Inbound,
    ) -> Result<Turn, EngineError> {
        let session = self.store.get(user_id).await;
        if flow_id.members_only() && !session.has_flag(PURCHASED) {
            log::info!("🔒 User {} tried {} before purchase", user_id, flow_id);
            return Ok(Turn {
                reply: Reply::text(content::MEMBERS_ONLY),
                next_state: session.state,
            });
        }

        self.run_turn(user_id, flow_id, message, true).await
    }

    async fn run_turn(
        &self,
        user_id: UserId,
        flow_id: FlowId,
        message: Inbound,
        restart: bool,
    ) -> Result<Turn, EngineError> {
        let mut session = self.store.get(user_id).await;
        if restart {
            reset(&mut session, flow_id);
        }
        let from = session.state;

        let step_def = flows::lookup(flow_id, from)
            .ok_or(EngineError::MissingHandler { flow: flow_id, state: from })?;

        let mut ctx = Ctx {
            user_id,
            chat_id: message.chat_id,
            session: &mut session,
            input: &message.input,
            engine: self,
            reminder: None,
        };
        let step = dispatch(step_def.handler, &mut ctx).await;
        let reminder = ctx.reminder.take();

        check_transition(flow_id, step_def, step.next)?;

        session.flow = flow_id;
        session.state = step.next;
        session.last_interaction_at = Utc::now();

        log::debug!("🧭 User {} {}: {} -> {}", user_id, flow_id, from, step.next);

        // старая задача снимается до записи нового описания
        if reminder.is_some() {
            self.reminders.cancel(user_id).await;
        }

        let armed = reminder.clone();
        if let Err(e) = self
            .store
            .upsert(user_id, move |stored| merge_turn(stored, session, reminder))
            .await
        {
            log::error!("❌ Turn for user {} not persisted: {}", user_id, e);
        }

        if let Some(reminder) = &armed {
            self.reminders.arm(user_id, reminder).await;
        }

        Ok(Turn { reply: step.reply.fit(), next_state: step.next })
    }
}

fn reset(session: &mut UserSession, flow_id: FlowId) {
    session.flow = flow_id;
    session.state = flows::flow(flow_id).initial;
    session.answers.clear();
    session.last_interaction_at = Utc::now();
}

/// Переход допустим, если это повтор шага или объявленный преемник.
fn check_transition(flow: FlowId, step_def: &StepDef, to: State) -> Result<(), EngineError> {
    if to == step_def.state || step_def.next.contains(&to) {
        Ok(())
    } else {
        Err(EngineError::UndeclaredTransition { flow, from: step_def.state, to })
    }
}

/// Переносит результат хода в сохранённую запись. Флаг выключенных
/// напоминаний принадлежит планировщику: ход снимает его только вместе
/// с новым напоминанием.
fn merge_turn(stored: &mut UserSession, turn: UserSession, reminder: Option<ScheduledReminder>) {
    let disabled = stored.flags.get(REMINDERS_DISABLED).cloned();

    stored.flow = turn.flow;
    stored.state = turn.state;
    stored.answers = turn.answers;
    stored.flags = turn.flags;
    stored.email = turn.email;
    stored.payment_reference = turn.payment_reference;
    stored.checkout_url = turn.checkout_url;
    stored.program_day = turn.program_day;
    stored.journal = turn.journal;
    stored.last_interaction_at = turn.last_interaction_at;

    match reminder {
        Some(reminder) => {
            stored.scheduled_reminder = Some(reminder);
            stored.clear_flag(REMINDERS_DISABLED);
        }
        None => match disabled {
            Some(flag) => {
                stored.flags.insert(REMINDERS_DISABLED.to_string(), flag);
            }
            None => stored.clear_flag(REMINDERS_DISABLED),
        },
    }
}

async fn dispatch(handler: HandlerId, ctx: &mut Ctx<'_>) -> Step {
    use HandlerId as H;
    match handler {
        H::FunnelEntry => funnel::entry(ctx),
        H::FunnelFeeling => funnel::feeling(ctx).await,
        H::FunnelObstacle => funnel::obstacle(ctx),
        H::FunnelEnergy => funnel::energy(ctx),
        H::FunnelFocus => funnel::focus(ctx),
        H::FunnelCommit => funnel::commit(ctx),
        H::FunnelEmail => funnel::email(ctx).await,
        H::FunnelOffer => funnel::offer(ctx).await,
        H::ProgramEntry => program::entry(ctx),
        H::ProgramConfirmPdf => program::confirm_pdf(ctx),
        H::ProgramExercise => program::exercise(ctx),
        H::CheckinEntry => checkin::entry(ctx),
        H::CheckinEnergy => checkin::energy(ctx),
        H::CheckinHighlight => checkin::highlight(ctx),
        H::EvidenceEntry => journal::evidence_entry(ctx),
        H::EvidenceBelief => journal::evidence_belief(ctx),
        H::EvidenceCounterexamples => journal::evidence_counterexamples(ctx),
        H::EvidenceRewrite => journal::evidence_rewrite(ctx),
        H::ExperimentEntry => journal::experiment_entry(ctx),
        H::ExperimentGoal => journal::experiment_goal(ctx),
        H::ExperimentWorst => journal::experiment_worst(ctx),
        H::ExperimentLearning => journal::experiment_learning(ctx),
        H::IfThenEntry => journal::if_then_entry(ctx),
        H::IfThenPlan => journal::if_then_plan(ctx),
        H::SmallWinEntry => journal::small_win_entry(ctx),
        H::SmallWinWin => journal::small_win(ctx),
        H::ReviewEntry => journal::review_entry(ctx),
        H::ReviewAnswers => journal::review_answers(ctx),
        H::Idle => idle(ctx),
    }
}

fn idle(ctx: &mut Ctx<'_>) -> Step {
    let text = if ctx.session.has_flag(PURCHASED) {
        content::MENU
    } else {
        content::IDLE_GUEST
    };
    ctx.stay(Reply::text(text))
}

#[cfg(test)]
mod tests;
