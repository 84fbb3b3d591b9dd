//! Поддельные внешние сервисы для тестов.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use crate::database::Store;
use crate::engine::reply::Reply;
use crate::engine::{Engine, EngineSettings};
use crate::llm::{Assistant, AssistantError};
use crate::payments::{ChargeRequest, Checkout, PaymentError, PaymentGateway, Verification};
use crate::reminders::{Notifier, NotifyError, Reminders};

pub fn temp_store() -> (Store, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = Store::load(dir.path().join("user_data.json")).unwrap();
    (store, dir)
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(i64, Reply)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(i64, Reply)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, chat_id: i64, reply: &Reply) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push((chat_id, reply.clone()));
        Ok(())
    }
}

pub struct FailingNotifier {
    blocked: bool,
    attempts: AtomicU32,
}

impl FailingNotifier {
    pub fn network() -> Self {
        Self { blocked: false, attempts: AtomicU32::new(0) }
    }

    pub fn blocked() -> Self {
        Self { blocked: true, attempts: AtomicU32::new(0) }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _chat_id: i64, _reply: &Reply) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.blocked {
            Err(NotifyError::Blocked)
        } else {
            Err(NotifyError::Failed("connection reset".to_string()))
        }
    }
}

#[derive(Default)]
pub struct FakePayments {
    pub fail_initialize: bool,
    pub fail_verify: bool,
    pub unpaid: bool,
    pub initialized: Mutex<Vec<ChargeRequest>>,
    pub verified: Mutex<Vec<String>>,
}

#[async_trait]
impl PaymentGateway for FakePayments {
    async fn initialize(&self, request: ChargeRequest) -> Result<Checkout, PaymentError> {
        if self.fail_initialize {
            return Err(PaymentError::Transport("timed out".to_string()));
        }
        let checkout = Checkout {
            authorization_url: format!("https://checkout.example/{}", request.reference),
            reference: request.reference.clone(),
        };
        self.initialized.lock().unwrap().push(request);
        Ok(checkout)
    }

    async fn verify(&self, reference: &str) -> Result<Verification, PaymentError> {
        self.verified.lock().unwrap().push(reference.to_string());
        if self.fail_verify {
            return Err(PaymentError::Transport("timed out".to_string()));
        }
        Ok(Verification {
            success: !self.unpaid,
            amount: 500_000,
            metadata: serde_json::Value::Null,
        })
    }
}

pub struct FixedAssistant(pub &'static str);

#[async_trait]
impl Assistant for FixedAssistant {
    async fn complete(&self, _prompt: &str, _system_prompt: &str) -> Result<String, AssistantError> {
        Ok(self.0.to_string())
    }
}

pub struct FailingAssistant;

#[async_trait]
impl Assistant for FailingAssistant {
    async fn complete(&self, _prompt: &str, _system_prompt: &str) -> Result<String, AssistantError> {
        Err(AssistantError("503 from provider".to_string()))
    }
}

pub const REMINDER_INTERVAL: Duration = Duration::from_secs(3 * 24 * 60 * 60);

pub struct Harness {
    pub engine: Engine,
    pub store: Store,
    pub reminders: Reminders,
    pub payments: Arc<FakePayments>,
    pub notifier: Arc<RecordingNotifier>,
    _dir: TempDir,
}

pub fn harness_with(payments: FakePayments, assistant: Option<Arc<dyn Assistant>>) -> Harness {
    let (store, dir) = temp_store();
    let notifier = Arc::new(RecordingNotifier::default());
    let payments = Arc::new(payments);
    let reminders = Reminders::new(store.clone(), notifier.clone(), REMINDER_INTERVAL);
    let engine = Engine::new(
        store.clone(),
        reminders.clone(),
        payments.clone(),
        assistant,
        EngineSettings::default(),
    );
    Harness { engine, store, reminders, payments, notifier, _dir: dir }
}

pub fn harness() -> Harness {
    harness_with(FakePayments::default(), None)
}
