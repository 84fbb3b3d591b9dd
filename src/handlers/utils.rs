use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::{ApiError, RequestError};

use crate::engine::reply::{Button, Reply};
use crate::reminders::{Notifier, NotifyError};

/// Inline-клавиатура из рядов кнопок ответа.
pub fn make_keyboard(reply: &Reply) -> Option<InlineKeyboardMarkup> {
    if reply.buttons.is_empty() {
        return None;
    }

    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    for row in &reply.buttons {
        let mut buttons = Vec::with_capacity(row.len());
        for button in row {
            match button {
                Button::Callback { label, data } => {
                    buttons.push(InlineKeyboardButton::callback(label.clone(), data.clone()));
                }
                Button::Url { label, url } => match reqwest::Url::parse(url) {
                    Ok(url) => buttons.push(InlineKeyboardButton::url(label.clone(), url)),
                    Err(e) => log::warn!("⚠️ Skipping button with bad url {}: {}", url, e),
                },
            }
        }
        if !buttons.is_empty() {
            keyboard.push(buttons);
        }
    }

    Some(InlineKeyboardMarkup::new(keyboard))
}

pub async fn send_reply(bot: &Bot, chat_id: ChatId, reply: &Reply) -> Result<Message, RequestError> {
    let request = bot.send_message(chat_id, reply.text.clone());
    match make_keyboard(reply) {
        Some(keyboard) => request.reply_markup(keyboard).await,
        None => request.await,
    }
}

/// Отправка напоминаний через Telegram.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, chat_id: i64, reply: &Reply) -> Result<(), NotifyError> {
        match send_reply(&self.bot, ChatId(chat_id), reply).await {
            Ok(_) => Ok(()),
            Err(RequestError::Api(
                ApiError::BotBlocked | ApiError::UserDeactivated | ApiError::ChatNotFound,
            )) => Err(NotifyError::Blocked),
            Err(e) => Err(NotifyError::Failed(e.to_string())),
        }
    }
}
