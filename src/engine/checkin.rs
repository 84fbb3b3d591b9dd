use super::classify::parse_scale;
use super::content;
use super::flows::State;
use super::reply::Reply;
use super::{Ctx, Step};
use crate::models::{JournalEntry, JournalKind};

pub fn entry(_ctx: &mut Ctx<'_>) -> Step {
    Step::to(State::Energy, Reply::text(content::CHECKIN_ENERGY))
}

pub fn energy(ctx: &mut Ctx<'_>) -> Step {
    let Some(level) = parse_scale(ctx.raw(), 1, 10) else {
        return ctx.stay(Reply::text(content::Q3_RETRY));
    };

    ctx.session.answers.push(level.to_string());
    Step::to(State::Highlight, Reply::text(content::CHECKIN_HIGHLIGHT))
}

pub fn highlight(ctx: &mut Ctx<'_>) -> Step {
    let Some(text) = ctx.free_text().map(str::to_string) else {
        return ctx.stay(Reply::text(content::EMPTY_ANSWER));
    };

    ctx.session.answers.push(text);
    let entries = ctx.session.answers.clone();
    let low = entries
        .first()
        .and_then(|level| level.parse::<u8>().ok())
        .is_some_and(|level| level <= 4);
    ctx.session.journal.push(JournalEntry::new(JournalKind::Checkin, entries));

    let text = if low { content::CHECKIN_LOW } else { content::CHECKIN_DONE };
    Step::to(State::Idle, Reply::text(text))
}
