use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::engine::content;
use crate::engine::flows::FlowId;
use crate::engine::reply::Reply;
use crate::engine::{Engine, Inbound};
use crate::handlers::utils::send_reply;
use crate::handlers::HandlerResult;
use crate::models::UserId;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "begin, or continue where you left off")]
    Start,
    #[command(description = "show help")]
    Help,
    #[command(description = "stop the current conversation")]
    Cancel,
    #[command(description = "30-day mindset plan")]
    Program,
    #[command(description = "daily energy check-in")]
    Checkin,
    #[command(description = "rewrite a limiting belief")]
    Evidence,
    #[command(description = "plan a minimum viable experiment")]
    Experiment,
    #[command(description = "build an if-then plan")]
    Ifthen,
    #[command(description = "log a small win")]
    Smallwin,
    #[command(description = "quarterly mindset review")]
    Review,
}

impl Command {
    /// Диалог, который запускает команда.
    pub fn flow(&self) -> Option<FlowId> {
        match self {
            Command::Start => Some(FlowId::Funnel),
            Command::Program => Some(FlowId::Program),
            Command::Checkin => Some(FlowId::Checkin),
            Command::Evidence => Some(FlowId::Evidence),
            Command::Experiment => Some(FlowId::Experiment),
            Command::Ifthen => Some(FlowId::IfThen),
            Command::Smallwin => Some(FlowId::SmallWin),
            Command::Review => Some(FlowId::Review),
            Command::Help | Command::Cancel => None,
        }
    }
}

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    engine: Engine,
) -> HandlerResult {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = UserId::from(user.id);
    let chat_id = msg.chat.id;
    let text = msg.text().unwrap_or_default().to_string();

    log::info!("📨 /{:?} from user {}", cmd, user_id);

    let turn = match cmd {
        Command::Help => {
            send_reply(&bot, chat_id, &Reply::text(content::HELP)).await?;
            return Ok(());
        }
        Command::Cancel => {
            engine.restart_session(user_id, FlowId::Funnel).await;
            send_reply(&bot, chat_id, &Reply::text(content::GOODBYE)).await?;
            return Ok(());
        }
        // команда всегда начинает свой диалог заново
        other => {
            let Some(flow) = other.flow() else {
                return Ok(());
            };
            engine.begin(user_id, flow, Inbound::text(chat_id.0, text)).await
        }
    };

    match turn {
        Ok(turn) => {
            send_reply(&bot, chat_id, &turn.reply).await?;
            Ok(())
        }
        Err(e) => {
            log::error!("❌ Command failed for user {}: {}", user_id, e);
            send_reply(&bot, chat_id, &Reply::text(content::SOMETHING_WENT_WRONG)).await?;
            Err(e.into())
        }
    }
}
