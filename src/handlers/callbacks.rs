use teloxide::prelude::*;

use crate::engine::content;
use crate::engine::flows::FlowId;
use crate::engine::reply::Reply;
use crate::engine::{Engine, Inbound};
use crate::handlers::utils::send_reply;
use crate::handlers::HandlerResult;
use crate::models::UserId;
use crate::reminders::START_CHECKIN;

pub async fn callback_handler(bot: Bot, q: CallbackQuery, engine: Engine) -> HandlerResult {
    // убираем "часики" на кнопке
    bot.answer_callback_query(q.id.clone()).await?;

    let (Some(data), Some(message)) = (q.data.as_deref(), q.message.as_ref()) else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    let user_id = UserId::from(q.from.id);
    let inbound = Inbound::callback(chat_id.0, data);

    let turn = match data {
        START_CHECKIN => engine.begin(user_id, FlowId::Checkin, inbound).await,
        _ => {
            let flow = engine.session(user_id).await.flow;
            engine.handle_message(user_id, flow, inbound).await
        }
    };

    match turn {
        Ok(turn) => {
            send_reply(&bot, chat_id, &turn.reply).await?;
            Ok(())
        }
        Err(e) => {
            log::error!("❌ Callback {} from user {} not handled: {}", data, user_id, e);
            send_reply(&bot, chat_id, &Reply::text(content::SOMETHING_WENT_WRONG)).await?;
            Err(e.into())
        }
    }
}
