use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use mindset_bot::config::Config;
use mindset_bot::database::Store;
use mindset_bot::engine::{Engine, EngineSettings};
use mindset_bot::handlers::{callback_handler, command_handler, message_handler, Command, TelegramNotifier};
use mindset_bot::llm::{Assistant, LlmService};
use mindset_bot::payments::Paystack;
use mindset_bot::reminders::Reminders;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Загружаем .env и инициализируем логирование
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ Configuration error: {}", e);
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    log::info!("Starting mindset bot, store at {}", config.store_path.display());

    let store = Store::load(&config.store_path)?;
    log::info!("✅ Store loaded");

    let bot = Bot::new(&config.telegram_token);
    bot.set_my_commands(Command::bot_commands()).await?;

    let notifier = Arc::new(TelegramNotifier::new(bot.clone()));
    let reminders = Reminders::new(store.clone(), notifier, config.reminder_interval);

    let payments = Arc::new(Paystack::new(
        &config.paystack_base_url,
        &config.paystack_secret_key,
        config.http_timeout,
    )?);

    let assistant: Option<Arc<dyn Assistant>> = match &config.llm_service_host {
        Some(host) => {
            log::info!("🤖 Using LLM service {} ({})", host, config.llm_model);
            Some(Arc::new(LlmService::new(host, &config.llm_model, config.http_timeout)))
        }
        None => {
            log::info!("🤖 LLM_SERVICE_HOST not set, using prepared replies");
            None
        }
    };

    let engine = Engine::new(
        store.clone(),
        reminders.clone(),
        payments,
        assistant,
        EngineSettings::from(&config),
    );

    let restored = reminders.restore().await;
    log::info!("⏰ Restored {} reminders", restored);

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler)
        )
        .branch(Update::filter_callback_query().endpoint(callback_handler))
        .branch(Update::filter_message().endpoint(message_handler));

    log::info!("🚀 Starting dispatcher...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![engine])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    if let Err(e) = store.persist().await {
        log::error!("❌ Final store flush failed: {}", e);
    }

    Ok(())
}
