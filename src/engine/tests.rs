use std::sync::Arc;

use chrono::Utc;

use super::classify::Category;
use super::content;
use super::flows::{self, FlowId, State};
use super::funnel::{CHANGE_EMAIL, CONFIRM_PAYMENT};
use super::reply::MAX_MESSAGE_CHARS;
use super::{check_transition, EngineError, Inbound};
use crate::models::flags::{PDF_COMPLETED, PROGRAM_COMPLETE, PURCHASED, REMINDERS_DISABLED};
use crate::models::{JournalKind, UserId};
use crate::test_support::{
    harness, harness_with, FailingAssistant, FakePayments, FixedAssistant, Harness,
};

const CHAT: i64 = 555;
const USER: UserId = UserId(42);

async fn say(h: &Harness, text: &str) -> super::Turn {
    let flow = h.engine.session(USER).await.flow;
    h.engine
        .handle_message(USER, flow, Inbound::text(CHAT, text))
        .await
        .unwrap()
}

async fn press(h: &Harness, data: &str) -> super::Turn {
    let flow = h.engine.session(USER).await.flow;
    h.engine
        .handle_message(USER, flow, Inbound::callback(CHAT, data))
        .await
        .unwrap()
}

async fn start(h: &Harness) -> super::Turn {
    h.engine
        .begin(USER, FlowId::Funnel, Inbound::text(CHAT, "/start"))
        .await
        .unwrap()
}

/// Проводит пользователя до шага оплаты.
async fn reach_offer(h: &Harness) {
    start(h).await;
    say(h, "I feel stuck").await;
    say(h, "Procrastination").await;
    say(h, "7").await;
    say(h, "c").await;
    say(h, "yes").await;
    let turn = say(h, "Ada@Example.com").await;
    assert_eq!(turn.next_state, State::Offer);
}

async fn make_member(h: &Harness) {
    reach_offer(h).await;
    let turn = press(h, CONFIRM_PAYMENT).await;
    assert_eq!(turn.next_state, State::Idle);
}

#[tokio::test]
async fn test_full_funnel_to_purchase() {
    let h = harness();

    let turn = start(&h).await;
    assert_eq!(turn.next_state, State::Q1);
    assert!(turn.reply.text.contains(content::Q1_PROMPT));

    let turn = say(&h, "I feel stuck").await;
    assert_eq!(turn.next_state, State::Q2);
    assert!(turn.reply.text.contains(Category::Stuck.follow_up()));
    assert_eq!(h.engine.session(USER).await.answers, vec!["I feel stuck"]);

    let turn = say(&h, "Fear of failure").await;
    assert_eq!(turn.next_state, State::Q3);
    assert!(turn.reply.text.contains("Fear of failure"));

    for bad in ["0", "11", "abc"] {
        let turn = say(&h, bad).await;
        assert_eq!(turn.next_state, State::Q3, "{bad} must be rejected");
        assert_eq!(turn.reply.text, content::Q3_RETRY);
    }

    let turn = say(&h, "10").await;
    assert_eq!(turn.next_state, State::Q4);
    assert!(turn.reply.has_callback("focus_a"));

    let turn = say(&h, "c").await;
    assert_eq!(turn.next_state, State::Q5);
    assert!(turn.reply.has_callback("yes"));

    let turn = say(&h, "yes").await;
    assert_eq!(turn.next_state, State::Email);

    let turn = say(&h, "not-an-email").await;
    assert_eq!(turn.next_state, State::Email);
    assert_eq!(turn.reply.text, content::EMAIL_RETRY);

    let turn = say(&h, "Ada@Example.com").await;
    assert_eq!(turn.next_state, State::Offer);
    assert!(turn.reply.has_callback(CONFIRM_PAYMENT));

    let session = h.engine.session(USER).await;
    assert_eq!(session.email.as_deref(), Some("ada@example.com"));
    assert_eq!(
        session.answers,
        vec!["I feel stuck", "Fear of failure", "10", content::FOCUS_AREAS[2], "yes"]
    );
    let reference = session.payment_reference.clone().unwrap();
    assert!(reference.starts_with("mindset-42-"));
    {
        let initialized = h.payments.initialized.lock().unwrap();
        assert_eq!(initialized.len(), 1);
        assert_eq!(initialized[0].amount, 500_000);
        assert_eq!(initialized[0].currency, "NGN");
    }

    let turn = press(&h, CONFIRM_PAYMENT).await;
    assert_eq!(turn.next_state, State::Idle);
    assert_eq!(turn.reply.text, content::PURCHASE_CONFIRMED);
    assert_eq!(*h.payments.verified.lock().unwrap(), vec![reference]);

    let session = h.engine.session(USER).await;
    assert!(session.has_flag(PURCHASED));
    assert_eq!(session.journal.len(), 1);
    assert_eq!(session.journal[0].kind, JournalKind::Intake);

    let reminder = session.scheduled_reminder.unwrap();
    assert_eq!(reminder.chat_id, CHAT);
    assert_eq!(reminder.sequence, 0);
    let hours = (reminder.due_at - Utc::now()).num_hours();
    assert!((71..=72).contains(&hours), "due in {hours} hours");
    assert!(h.reminders.is_armed(USER).await);
}

#[tokio::test]
async fn test_energy_accepts_lower_bound() {
    let h = harness();
    start(&h).await;
    say(&h, "I feel stuck").await;
    say(&h, "Money").await;
    let turn = say(&h, "1").await;
    assert_eq!(turn.next_state, State::Q4);
    assert!(turn.reply.text.contains(content::energy_reply(1)));
}

#[tokio::test]
async fn test_focus_accepts_button_data() {
    let h = harness();
    start(&h).await;
    say(&h, "meh").await;
    say(&h, "Money").await;
    say(&h, "5").await;

    let turn = say(&h, "z").await;
    assert_eq!(turn.next_state, State::Q4);

    let turn = press(&h, "focus_e").await;
    assert_eq!(turn.next_state, State::Q5);
    assert_eq!(h.engine.session(USER).await.answers[3], content::FOCUS_AREAS[4]);
}

#[tokio::test]
async fn test_declining_commitment_closes_softly() {
    let h = harness();
    start(&h).await;
    say(&h, "fine").await;
    say(&h, "Time").await;
    say(&h, "6").await;
    say(&h, "a").await;

    let turn = say(&h, "maybe?").await;
    assert_eq!(turn.next_state, State::Q5);

    let turn = say(&h, "no").await;
    assert_eq!(turn.next_state, State::Idle);
    assert_eq!(turn.reply.text, content::SOFT_CLOSE);

    let turn = say(&h, "hello?").await;
    assert_eq!(turn.next_state, State::Idle);
    assert_eq!(turn.reply.text, content::IDLE_GUEST);
    assert!(h.engine.session(USER).await.scheduled_reminder.is_none());
}

#[tokio::test]
async fn test_empty_feeling_is_asked_again() {
    let h = harness();
    start(&h).await;

    let turn = say(&h, "   ").await;
    assert_eq!(turn.next_state, State::Q1);
    assert!(h.engine.session(USER).await.answers.is_empty());
}

#[tokio::test]
async fn test_restart_clears_answers_but_keeps_flags() {
    let h = harness();
    h.store
        .upsert(USER, |session| {
            session.set_flag(PURCHASED, true);
            session.answers = vec!["a".to_string(), "b".to_string()];
            session.state = State::Q5;
        })
        .await
        .unwrap();

    let session = h.engine.restart_session(USER, FlowId::Funnel).await;
    assert_eq!(session.state, State::Entry);
    assert!(session.answers.is_empty());
    assert!(session.has_flag(PURCHASED));

    let stored = h.engine.session(USER).await;
    assert_eq!(stored, session);
}

#[tokio::test]
async fn test_missing_handler_is_an_error() {
    let h = harness();
    h.store
        .upsert(USER, |session| session.state = State::Q3)
        .await
        .unwrap();

    let result = h
        .engine
        .handle_message(USER, FlowId::Review, Inbound::text(CHAT, "hi"))
        .await;
    assert!(matches!(
        result,
        Err(EngineError::MissingHandler { flow: FlowId::Review, state: State::Q3 })
    ));
    assert_eq!(h.engine.session(USER).await.state, State::Q3);
}

#[tokio::test]
async fn test_payment_initialize_failure_stays_on_email() {
    let h = harness_with(FakePayments { fail_initialize: true, ..Default::default() }, None);
    start(&h).await;
    for text in ["ok", "Money", "4", "b", "yes"] {
        say(&h, text).await;
    }

    let turn = say(&h, "ada@example.com").await;
    assert_eq!(turn.next_state, State::Email);
    assert!(turn.reply.text.contains("@support"));
    assert!(h.engine.session(USER).await.payment_reference.is_none());
}

#[tokio::test]
async fn test_unpaid_verification_keeps_offer_open() {
    let h = harness_with(FakePayments { unpaid: true, ..Default::default() }, None);
    reach_offer(&h).await;

    let turn = press(&h, CONFIRM_PAYMENT).await;
    assert_eq!(turn.next_state, State::Offer);
    assert!(turn.reply.text.contains(content::PAYMENT_PENDING));
    assert!(turn.reply.has_callback(CONFIRM_PAYMENT));

    let session = h.engine.session(USER).await;
    assert!(!session.has_flag(PURCHASED));
    assert!(session.scheduled_reminder.is_none());
    assert!(!h.reminders.is_armed(USER).await);
}

#[tokio::test]
async fn test_verify_error_keeps_offer_open() {
    let h = harness_with(FakePayments { fail_verify: true, ..Default::default() }, None);
    reach_offer(&h).await;

    let turn = press(&h, CONFIRM_PAYMENT).await;
    assert_eq!(turn.next_state, State::Offer);
    assert!(!h.engine.session(USER).await.has_flag(PURCHASED));
}

#[tokio::test]
async fn test_change_email_goes_back() {
    let h = harness();
    reach_offer(&h).await;

    let turn = press(&h, CHANGE_EMAIL).await;
    assert_eq!(turn.next_state, State::Email);

    let turn = say(&h, "grace@example.org").await;
    assert_eq!(turn.next_state, State::Offer);
    assert_eq!(h.payments.initialized.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_assistant_reply_is_used() {
    let h = harness_with(
        FakePayments::default(),
        Some(Arc::new(FixedAssistant("You are not alone in this."))),
    );
    start(&h).await;

    let turn = say(&h, "I feel stuck").await;
    assert!(turn.reply.text.starts_with("You are not alone in this."));
    assert!(turn.reply.text.contains(content::Q2_PROMPT));
}

#[tokio::test]
async fn test_assistant_failure_falls_back() {
    let h = harness_with(FakePayments::default(), Some(Arc::new(FailingAssistant)));
    start(&h).await;

    let turn = say(&h, "so much anxiety lately").await;
    assert_eq!(turn.next_state, State::Q2);
    assert!(turn.reply.text.contains(Category::Anxious.follow_up()));
}

#[tokio::test]
async fn test_members_only_flows_are_gated() {
    let h = harness();
    start(&h).await;

    for flow in [FlowId::Program, FlowId::Checkin, FlowId::Review] {
        let turn = h
            .engine
            .begin(USER, flow, Inbound::text(CHAT, "/go"))
            .await
            .unwrap();
        assert_eq!(turn.reply.text, content::MEMBERS_ONLY);
        assert_eq!(turn.next_state, State::Q1);
    }
    assert_eq!(h.engine.session(USER).await.flow, FlowId::Funnel);
}

#[tokio::test]
async fn test_returning_member_gets_menu() {
    let h = harness();
    make_member(&h).await;

    let turn = start(&h).await;
    assert_eq!(turn.next_state, State::Idle);
    assert!(turn.reply.text.contains(content::MENU));
}

#[tokio::test]
async fn test_start_reenables_disabled_reminders() {
    let h = harness();
    make_member(&h).await;
    h.reminders.cancel(USER).await;
    h.store
        .upsert(USER, |session| {
            session.mark(REMINDERS_DISABLED);
            if let Some(reminder) = session.scheduled_reminder.as_mut() {
                reminder.sequence = 3;
            }
        })
        .await
        .unwrap();

    start(&h).await;

    let session = h.engine.session(USER).await;
    assert!(!session.has_flag(REMINDERS_DISABLED));
    assert_eq!(session.scheduled_reminder.unwrap().sequence, 3);
    assert!(h.reminders.is_armed(USER).await);
}

#[tokio::test]
async fn test_turn_keeps_scheduler_disabled_flag() {
    let h = harness();
    make_member(&h).await;
    h.engine
        .begin(USER, FlowId::SmallWin, Inbound::text(CHAT, "/smallwin"))
        .await
        .unwrap();

    // Планировщик выключил напоминания посреди диалога.
    h.store
        .upsert(USER, |session| session.mark(REMINDERS_DISABLED))
        .await
        .unwrap();

    say(&h, "Went for a run").await;
    assert!(h.engine.session(USER).await.has_flag(REMINDERS_DISABLED));
}

#[tokio::test]
async fn test_program_walkthrough() {
    let h = harness();
    make_member(&h).await;

    let turn = h
        .engine
        .begin(USER, FlowId::Program, Inbound::text(CHAT, "/program"))
        .await
        .unwrap();
    assert_eq!(turn.next_state, State::ConfirmPdf);

    let turn = say(&h, "later").await;
    assert_eq!(turn.next_state, State::ConfirmPdf);

    let turn = press(&h, "done").await;
    assert_eq!(turn.next_state, State::Exercise);
    assert!(h.engine.session(USER).await.has_flag(PDF_COMPLETED));

    let turn = say(&h, "next").await;
    assert!(turn.reply.text.starts_with(content::EXERCISES[0]));

    say(&h, "done").await;
    let turn = say(&h, "next").await;
    assert!(turn.reply.text.starts_with(content::EXERCISES[1]));
    assert_eq!(h.engine.session(USER).await.program_day, 2);

    let turn = say(&h, "what now").await;
    assert_eq!(turn.reply.text, content::PROGRAM_HINT);
}

#[tokio::test]
async fn test_program_completes_after_last_day() {
    let h = harness();
    make_member(&h).await;
    h.store
        .upsert(USER, |session| {
            session.mark(PDF_COMPLETED);
            session.program_day = content::EXERCISES.len() as u32;
        })
        .await
        .unwrap();

    let turn = h
        .engine
        .begin(USER, FlowId::Program, Inbound::text(CHAT, "/program"))
        .await
        .unwrap();
    assert_eq!(turn.next_state, State::Exercise);

    let turn = say(&h, "done").await;
    assert_eq!(turn.next_state, State::Idle);
    assert_eq!(turn.reply.text, content::PROGRAM_COMPLETE);
    assert!(h.engine.session(USER).await.has_flag(PROGRAM_COMPLETE));

    let turn = h
        .engine
        .begin(USER, FlowId::Program, Inbound::text(CHAT, "/program"))
        .await
        .unwrap();
    assert_eq!(turn.next_state, State::Idle);
}

#[tokio::test]
async fn test_checkin_records_journal() {
    let h = harness();
    make_member(&h).await;

    let turn = h
        .engine
        .begin(USER, FlowId::Checkin, Inbound::callback(CHAT, "start_checkin"))
        .await
        .unwrap();
    assert_eq!(turn.next_state, State::Energy);

    say(&h, "3").await;
    let turn = say(&h, "Called my sister").await;
    assert_eq!(turn.next_state, State::Idle);
    assert_eq!(turn.reply.text, content::CHECKIN_LOW);

    let journal = h.engine.session(USER).await.journal;
    let last = journal.last().unwrap();
    assert_eq!(last.kind, JournalKind::Checkin);
    assert_eq!(last.entries, vec!["3", "Called my sister"]);
}

#[tokio::test]
async fn test_evidence_needs_three_counterexamples() {
    let h = harness();
    make_member(&h).await;
    h.engine
        .begin(USER, FlowId::Evidence, Inbound::text(CHAT, "/evidence"))
        .await
        .unwrap();

    say(&h, "I'm bad at public speaking").await;
    let turn = say(&h, "the toast, the demo").await;
    assert_eq!(turn.next_state, State::Counterexamples);

    let turn = say(&h, "the toast, the demo, the standup").await;
    assert_eq!(turn.next_state, State::Rewrite);
    assert!(turn.reply.text.contains("I'm bad at public speaking"));

    let turn = say(&h, "I can speak well when prepared").await;
    assert_eq!(turn.next_state, State::Idle);

    let session = h.engine.session(USER).await;
    let last = session.journal.last().unwrap();
    assert_eq!(last.kind, JournalKind::Evidence);
    assert_eq!(last.entries.len(), 3);
}

#[tokio::test]
async fn test_if_then_requires_both_parts() {
    let h = harness();
    make_member(&h).await;
    h.engine
        .begin(USER, FlowId::IfThen, Inbound::text(CHAT, "/ifthen"))
        .await
        .unwrap();

    let turn = say(&h, "I will read more").await;
    assert_eq!(turn.next_state, State::Plan);
    assert_eq!(turn.reply.text, content::IF_THEN_RETRY);

    let turn = say(&h, "If I finish dinner, then I will read 10 pages").await;
    assert_eq!(turn.next_state, State::Idle);
    assert_eq!(
        h.engine.session(USER).await.journal.last().unwrap().kind,
        JournalKind::IfThen
    );
}

#[tokio::test]
async fn test_review_needs_four_answers() {
    let h = harness();
    make_member(&h).await;
    h.engine
        .begin(USER, FlowId::Review, Inbound::text(CHAT, "/review"))
        .await
        .unwrap();

    let turn = say(&h, "yes; sleep; time").await;
    assert_eq!(turn.next_state, State::ReviewAnswers);

    let turn = say(&h, "yes; sleep; time; walk at lunch").await;
    assert_eq!(turn.next_state, State::Idle);

    let last = h.engine.session(USER).await.journal.last().cloned().unwrap();
    assert_eq!(last.kind, JournalKind::QuarterlyReview);
    assert_eq!(last.entries, vec!["yes", "sleep", "time", "walk at lunch"]);
}

#[tokio::test]
async fn test_experiment_and_small_win() {
    let h = harness();
    make_member(&h).await;

    h.engine
        .begin(USER, FlowId::Experiment, Inbound::text(CHAT, "/experiment"))
        .await
        .unwrap();
    say(&h, "Pitch my idea").await;
    say(&h, "They say no").await;
    let turn = say(&h, "How to pitch better").await;
    assert_eq!(turn.next_state, State::Idle);

    h.engine
        .begin(USER, FlowId::SmallWin, Inbound::text(CHAT, "/smallwin"))
        .await
        .unwrap();
    let turn = say(&h, "/oops").await;
    assert_eq!(turn.next_state, State::Win);
    say(&h, "Drank water all day").await;

    let kinds: Vec<JournalKind> = h
        .engine
        .session(USER)
        .await
        .journal
        .iter()
        .map(|entry| entry.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![JournalKind::Intake, JournalKind::Experiment, JournalKind::SmallWin]
    );
}

#[test]
fn test_check_transition() {
    let q1 = flows::lookup(FlowId::Funnel, State::Q1).unwrap();
    assert!(check_transition(FlowId::Funnel, q1, State::Q1).is_ok());
    assert!(check_transition(FlowId::Funnel, q1, State::Q2).is_ok());

    let err = check_transition(FlowId::Funnel, q1, State::Offer).unwrap_err();
    assert!(matches!(
        err,
        EngineError::UndeclaredTransition { flow: FlowId::Funnel, from: State::Q1, to: State::Offer }
    ));

    let offer = flows::lookup(FlowId::Funnel, State::Offer).unwrap();
    assert!(check_transition(FlowId::Funnel, offer, State::Idle).is_ok());
    assert!(check_transition(FlowId::Funnel, offer, State::Q1).is_err());
}

#[tokio::test]
async fn test_each_turn_is_one_write() {
    let h = harness();

    let before = h.store.revision().await;
    start(&h).await;
    assert_eq!(h.store.revision().await, before + 1);

    say(&h, "I feel stuck").await;
    assert_eq!(h.store.revision().await, before + 2);

    make_member(&h).await;
    let before = h.store.revision().await;
    h.engine
        .begin(USER, FlowId::Checkin, Inbound::text(CHAT, "/checkin"))
        .await
        .unwrap();
    assert_eq!(h.store.revision().await, before + 1);
    assert_eq!(h.engine.session(USER).await.state, State::Energy);

    // закрытый диалог без оплаты ничего не пишет
    let other = UserId(7);
    let before = h.store.revision().await;
    h.engine
        .begin(other, FlowId::Review, Inbound::text(CHAT, "/review"))
        .await
        .unwrap();
    assert_eq!(h.store.revision().await, before);
}

#[tokio::test]
async fn test_long_answers_fit_in_a_message() {
    let long = "x".repeat(MAX_MESSAGE_CHARS);
    let fits = |turn: &super::Turn| turn.reply.text.chars().count() <= MAX_MESSAGE_CHARS;

    let h = harness_with(
        FakePayments::default(),
        Some(Arc::new(FixedAssistant("y".repeat(2 * MAX_MESSAGE_CHARS).leak()))),
    );
    start(&h).await;

    let turn = say(&h, &long).await;
    assert_eq!(turn.next_state, State::Q2);
    assert!(fits(&turn));

    let turn = say(&h, &long).await;
    assert_eq!(turn.next_state, State::Q3);
    assert!(fits(&turn));

    make_member(&h).await;
    h.engine
        .begin(USER, FlowId::Evidence, Inbound::text(CHAT, "/evidence"))
        .await
        .unwrap();
    say(&h, &long).await;
    let turn = say(&h, &format!("{long}, b, c")).await;
    assert_eq!(turn.next_state, State::Rewrite);
    assert!(fits(&turn));

    h.engine
        .begin(USER, FlowId::IfThen, Inbound::text(CHAT, "/ifthen"))
        .await
        .unwrap();
    let turn = say(&h, &format!("If {long} then I will {long}")).await;
    assert_eq!(turn.next_state, State::Idle);
    assert!(fits(&turn));
}

#[tokio::test]
async fn test_pending_offer_keeps_pay_link() {
    let h = harness_with(FakePayments { unpaid: true, ..Default::default() }, None);
    reach_offer(&h).await;

    let turn = press(&h, CONFIRM_PAYMENT).await;
    assert_eq!(turn.next_state, State::Offer);
    assert!(turn.reply.has_url());

    let turn = say(&h, "how do I pay?").await;
    assert_eq!(turn.next_state, State::Offer);
    assert!(turn.reply.has_url());
    assert!(turn.reply.has_callback(CHANGE_EMAIL));

    let session = h.engine.session(USER).await;
    let reference = session.payment_reference.unwrap();
    assert_eq!(
        session.checkout_url.as_deref(),
        Some(format!("https://checkout.example/{reference}").as_str())
    );
}
