//! Воронка продаж: пять вопросов, email, оплата.

use serde_json::json;
use uuid::Uuid;

use super::classify::{classify, is_email, parse_choice, parse_scale, yes_no, YesNo};
use super::content;
use super::flows::State;
use super::reply::{clip, Button, Reply};
use super::{Ctx, Step};
use crate::llm::{fallback_reply, COACH_PROMPT};
use crate::models::flags::{ONBOARDING_COMPLETE, PURCHASED, REMINDERS_DISABLED};
use crate::models::{JournalEntry, JournalKind};
use crate::payments::ChargeRequest;

pub const CONFIRM_PAYMENT: &str = "confirm_payment";
pub const CHANGE_EMAIL: &str = "change_email";

fn focus_reply(text: &str) -> Reply {
    let letters = ['A', 'B', 'C', 'D', 'E'];
    let options = content::FOCUS_AREAS
        .iter()
        .zip(letters)
        .map(|(area, letter)| format!("{}) {}", letter, area))
        .collect::<Vec<_>>()
        .join("\n");

    let mut reply = Reply::text(format!("{}\n\n{}", text, options));
    for (area, letter) in content::FOCUS_AREAS.iter().zip(letters) {
        reply = reply.with_row(vec![Button::callback(
            format!("{}) {}", letter, area),
            format!("focus_{}", letter.to_ascii_lowercase()),
        )]);
    }
    reply
}

fn commit_reply(text: &str) -> Reply {
    Reply::text(text).with_row(vec![
        Button::callback("✅ Yes, I'm in", "yes"),
        Button::callback("Not now", "no"),
    ])
}

/// Повтор шага оплаты: ссылка на checkout, если она уже есть, и кнопки.
fn pending_offer_reply(ctx: &Ctx<'_>, text: &str) -> Reply {
    let mut reply = Reply::text(text);
    if let Some(url) = &ctx.session.checkout_url {
        reply = reply.with_row(vec![Button::url("💳 Pay now", url.clone())]);
    }
    reply
        .with_row(vec![Button::callback("✅ I've paid", CONFIRM_PAYMENT)])
        .with_row(vec![Button::callback("✉️ Change email", CHANGE_EMAIL)])
}

pub fn entry(ctx: &mut Ctx<'_>) -> Step {
    if ctx.session.has_flag(PURCHASED) {
        if ctx.session.has_flag(REMINDERS_DISABLED) {
            log::info!("🔔 Re-enabling reminders for user {}", ctx.user_id);
            ctx.request_reminder();
        }
        let text = format!("{}\n\n{}", content::WELCOME_BACK, content::MENU);
        return Step::to(State::Idle, Reply::text(text));
    }

    Step::to(
        State::Q1,
        Reply::text(format!("{}\n\n{}", content::WELCOME, content::Q1_PROMPT)),
    )
}

pub async fn feeling(ctx: &mut Ctx<'_>) -> Step {
    let Some(text) = ctx.free_text().map(str::to_string) else {
        return ctx.stay(Reply::text(content::Q1_PROMPT));
    };

    let category = classify(&text);
    log::info!("🏷️ User {} feels {}", ctx.user_id, category.as_str());
    ctx.session.answers.push(text.clone());

    let reflection = match ctx.engine.assistant() {
        Some(assistant) => match assistant.complete(&text, COACH_PROMPT).await {
            Ok(reflection) => reflection,
            Err(e) => {
                log::warn!("⚠️ Assistant failed for user {}: {}", ctx.user_id, e);
                fallback_reply(category).to_string()
            }
        },
        None => fallback_reply(category).to_string(),
    };

    Step::to(
        State::Q2,
        Reply::text(format!(
            "{}\n\n{}",
            clip(&reflection, content::REFLECTION_CHARS),
            content::Q2_PROMPT
        )),
    )
}

pub fn obstacle(ctx: &mut Ctx<'_>) -> Step {
    let Some(text) = ctx.free_text().map(str::to_string) else {
        return ctx.stay(Reply::text(content::EMPTY_ANSWER));
    };

    let prompt = format!(
        "Thank you. On a scale of 1 to 10, how much energy do you have right now to tackle \"{}\"?",
        clip(&text, content::ECHO_CHARS)
    );
    ctx.session.answers.push(text);
    Step::to(State::Q3, Reply::text(prompt))
}

pub fn energy(ctx: &mut Ctx<'_>) -> Step {
    let Some(level) = parse_scale(ctx.raw(), 1, 10) else {
        return ctx.stay(Reply::text(content::Q3_RETRY));
    };

    ctx.session.answers.push(level.to_string());
    let text = format!("{}\n\n{}", content::energy_reply(level), content::Q4_PROMPT);
    Step::to(State::Q4, focus_reply(&text))
}

pub fn focus(ctx: &mut Ctx<'_>) -> Step {
    let Some(index) = parse_choice(ctx.raw(), content::FOCUS_AREAS.len()) else {
        return ctx.stay(focus_reply(content::Q4_RETRY));
    };

    let area = content::FOCUS_AREAS[index];
    ctx.session.answers.push(area.to_string());
    let text = format!("{} it is. 🎯\n\n{}", area, content::Q5_PROMPT);
    Step::to(State::Q5, commit_reply(&text))
}

pub fn commit(ctx: &mut Ctx<'_>) -> Step {
    match yes_no(ctx.raw()) {
        Some(YesNo::Yes) => {
            ctx.session.answers.push("yes".to_string());
            Step::to(State::Email, Reply::text(content::EMAIL_PROMPT))
        }
        Some(YesNo::No) => {
            log::info!("👋 User {} declined the offer", ctx.user_id);
            Step::to(State::Idle, Reply::text(content::SOFT_CLOSE))
        }
        None => ctx.stay(commit_reply(content::Q5_RETRY)),
    }
}

pub async fn email(ctx: &mut Ctx<'_>) -> Step {
    let Some(email) = ctx.free_text().filter(|text| is_email(text)).map(str::to_lowercase) else {
        return ctx.stay(Reply::text(content::EMAIL_RETRY));
    };
    ctx.session.email = Some(email.clone());

    let settings = ctx.settings().clone();
    let reference = format!("mindset-{}-{}", ctx.user_id, Uuid::new_v4().simple());
    let request = ChargeRequest {
        email,
        amount: settings.offer_amount,
        currency: settings.currency.clone(),
        reference,
        metadata: json!({
            "user_id": ctx.user_id.0,
            "chat_id": ctx.chat_id,
            "focus": ctx.session.answer(3),
        }),
    };

    match ctx.engine.payments().initialize(request).await {
        Ok(checkout) => {
            log::info!("💳 Checkout {} created for user {}", checkout.reference, ctx.user_id);
            ctx.session.payment_reference = Some(checkout.reference);
            ctx.session.checkout_url = Some(checkout.authorization_url.clone());

            let text = format!(
                "Here's your secure checkout for the Mindset Blueprint ({} {:.2}).\n\n{}",
                settings.currency,
                settings.offer_amount as f64 / 100.0,
                content::OFFER_HINT
            );
            let reply = Reply::text(text)
                .with_row(vec![Button::url("💳 Pay now", checkout.authorization_url)])
                .with_row(vec![Button::callback("✅ I've paid", CONFIRM_PAYMENT)]);
            Step::to(State::Offer, reply)
        }
        Err(e) => {
            log::error!("❌ Payment initialize failed for user {}: {}", ctx.user_id, e);
            ctx.stay(Reply::text(content::retry_later(&settings.support_contact)))
        }
    }
}

pub async fn offer(ctx: &mut Ctx<'_>) -> Step {
    if ctx.session.has_flag(PURCHASED) {
        return Step::to(State::Idle, Reply::text(content::ALREADY_MEMBER));
    }

    match ctx.raw() {
        CHANGE_EMAIL => return Step::to(State::Email, Reply::text(content::EMAIL_PROMPT)),
        CONFIRM_PAYMENT => {}
        _ => return ctx.stay(pending_offer_reply(ctx, content::OFFER_HINT)),
    }

    let Some(reference) = ctx.session.payment_reference.clone() else {
        log::warn!("⚠️ User {} confirmed payment without a reference", ctx.user_id);
        return Step::to(State::Email, Reply::text(content::EMAIL_PROMPT));
    };

    match ctx.engine.payments().verify(&reference).await {
        Ok(verification) if verification.success => {
            log::info!("🎉 Payment {} confirmed for user {}", reference, ctx.user_id);

            ctx.session.set_flag(PURCHASED, true);
            ctx.session.mark(ONBOARDING_COMPLETE);
            let intake = ctx.session.answers.clone();
            ctx.session.journal.push(JournalEntry::new(JournalKind::Intake, intake));
            ctx.request_reminder();

            Step::to(State::Idle, Reply::text(content::PURCHASE_CONFIRMED))
        }
        Ok(_) => {
            log::info!("⏳ Payment {} for user {} not successful yet", reference, ctx.user_id);
            ctx.stay(pending_offer_reply(ctx, content::PAYMENT_PENDING))
        }
        Err(e) => {
            log::error!("❌ Payment verify failed for user {}: {}", ctx.user_id, e);
            let support = ctx.settings().support_contact.clone();
            ctx.stay(pending_offer_reply(ctx, &content::retry_later(&support)))
        }
    }
}
