//! Настройки из переменных окружения (`.env` подхватывается через dotenvy).

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::engine::EngineSettings;
use crate::reminders::MAX_INTERVAL;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: String,
    pub paystack_secret_key: String,
    pub paystack_base_url: String,
    /// Без хоста ответы на первый вопрос берутся из заготовок.
    pub llm_service_host: Option<String>,
    pub llm_model: String,
    pub store_path: PathBuf,
    pub reminder_interval: Duration,
    pub offer_amount: u64,
    pub offer_currency: String,
    pub http_timeout: Duration,
    pub support_contact: String,
}

const DAY: u64 = 24 * 60 * 60;

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // пустая строка считается отсутствующим значением
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let interval_days: u64 = parsed(&get, "REMINDER_INTERVAL_DAYS", 3)?;
        let reminder_interval = interval_days
            .checked_mul(DAY)
            .map(Duration::from_secs)
            .filter(|interval| !interval.is_zero() && *interval <= MAX_INTERVAL)
            .ok_or_else(|| ConfigError::Invalid {
                name: "REMINDER_INTERVAL_DAYS",
                value: interval_days.to_string(),
            })?;

        Ok(Self {
            telegram_token: required("TELEGRAM_BOT_TOKEN")?,
            paystack_secret_key: required("PAYSTACK_SECRET_KEY")?,
            paystack_base_url: get("PAYSTACK_BASE_URL")
                .unwrap_or_else(|| "https://api.paystack.co".to_string()),
            llm_service_host: get("LLM_SERVICE_HOST"),
            llm_model: get("LLM_MODEL").unwrap_or_else(|| "GigaChat-2-Max".to_string()),
            store_path: get("STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("user_data.json")),
            reminder_interval,
            offer_amount: parsed(&get, "OFFER_AMOUNT", 500_000)?,
            offer_currency: get("OFFER_CURRENCY").unwrap_or_else(|| "NGN".to_string()),
            http_timeout: Duration::from_secs(parsed(&get, "HTTP_TIMEOUT_SECS", 15)?),
            support_contact: get("SUPPORT_CONTACT").unwrap_or_else(|| "@support".to_string()),
        })
    }
}

fn parsed<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

impl From<&Config> for EngineSettings {
    fn from(config: &Config) -> Self {
        Self {
            offer_amount: config.offer_amount,
            currency: config.offer_currency.clone(),
            support_contact: config.support_contact.clone(),
        }
    }
}
