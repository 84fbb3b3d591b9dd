use teloxide::prelude::*;

use crate::engine::content;
use crate::engine::reply::Reply;
use crate::engine::{Engine, Inbound};
use crate::handlers::utils::send_reply;
use crate::handlers::HandlerResult;
use crate::models::UserId;

pub async fn message_handler(bot: Bot, msg: Message, engine: Engine) -> HandlerResult {
    let (Some(text), Some(user)) = (msg.text(), msg.from.as_ref()) else {
        return Ok(());
    };
    let user_id = UserId::from(user.id);

    // текущий диалог пользователя определяет обработчик
    let flow = engine.session(user_id).await.flow;
    match engine
        .handle_message(user_id, flow, Inbound::text(msg.chat.id.0, text))
        .await
    {
        Ok(turn) => {
            send_reply(&bot, msg.chat.id, &turn.reply).await?;
            Ok(())
        }
        Err(e) => {
            log::error!("❌ Message from user {} not handled: {}", user_id, e);
            send_reply(&bot, msg.chat.id, &Reply::text(content::SOMETHING_WENT_WRONG)).await?;
            Err(e.into())
        }
    }
}
