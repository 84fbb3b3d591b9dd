//! Короткие дневниковые диалоги: убеждения, эксперименты, if-then планы,
//! маленькие победы и квартальный обзор.

use regex::Regex;
use std::sync::LazyLock;

use super::content;
use super::flows::State;
use super::reply::{clip, Reply};
use super::{Ctx, Step};
use crate::models::{JournalEntry, JournalKind};

const MIN_COUNTEREXAMPLES: usize = 3;
const REVIEW_QUESTIONS: usize = 4;

static IF_THEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bif\b.+\bthen\b.+").expect("valid regex")
});

/// Записывает свободный ответ и переходит дальше, пустой ввод переспрашивается.
fn capture(ctx: &mut Ctx<'_>, next: State, reply: Reply) -> Step {
    match ctx.free_text().map(str::to_string) {
        Some(text) => {
            ctx.session.answers.push(text);
            Step::to(next, reply)
        }
        None => ctx.stay(Reply::text(content::EMPTY_ANSWER)),
    }
}

/// Сохраняет накопленные ответы в дневник и завершает диалог.
fn finish(ctx: &mut Ctx<'_>, kind: JournalKind, text: &str) -> Step {
    let entries = ctx.session.answers.clone();
    log::info!("📓 User {} saved a {:?} entry", ctx.user_id, kind);
    ctx.session.journal.push(JournalEntry::new(kind, entries));
    Step::to(State::Idle, Reply::text(text))
}

pub fn evidence_entry(_ctx: &mut Ctx<'_>) -> Step {
    Step::to(State::Belief, Reply::text(content::EVIDENCE_START))
}

pub fn evidence_belief(ctx: &mut Ctx<'_>) -> Step {
    capture(ctx, State::Counterexamples, Reply::text(content::EVIDENCE_COUNTER))
}

pub fn evidence_counterexamples(ctx: &mut Ctx<'_>) -> Step {
    let Some(text) = ctx.free_text() else {
        return ctx.stay(Reply::text(content::EVIDENCE_COUNTER));
    };

    let examples: Vec<&str> = text
        .split(',')
        .map(str::trim)
        .filter(|example| !example.is_empty())
        .collect();

    if examples.len() < MIN_COUNTEREXAMPLES {
        let reply = format!(
            "I counted {} so far. {}",
            examples.len(),
            content::EVIDENCE_COUNTER
        );
        return ctx.stay(Reply::text(reply));
    }

    let joined = examples.join(", ");
    ctx.session.answers.push(joined);
    let prompt = format!(
        "Now rewrite \"{}\" based on that evidence.",
        clip(ctx.session.answer(0), content::ECHO_CHARS)
    );
    Step::to(State::Rewrite, Reply::text(prompt))
}

pub fn evidence_rewrite(ctx: &mut Ctx<'_>) -> Step {
    let Some(text) = ctx.free_text().map(str::to_string) else {
        return ctx.stay(Reply::text(content::EMPTY_ANSWER));
    };
    ctx.session.answers.push(text);
    finish(ctx, JournalKind::Evidence, content::EVIDENCE_DONE)
}

pub fn experiment_entry(_ctx: &mut Ctx<'_>) -> Step {
    Step::to(State::Goal, Reply::text(content::EXPERIMENT_START))
}

pub fn experiment_goal(ctx: &mut Ctx<'_>) -> Step {
    capture(ctx, State::Worst, Reply::text(content::EXPERIMENT_WORST))
}

pub fn experiment_worst(ctx: &mut Ctx<'_>) -> Step {
    capture(ctx, State::Learning, Reply::text(content::EXPERIMENT_LEARNING))
}

pub fn experiment_learning(ctx: &mut Ctx<'_>) -> Step {
    let Some(text) = ctx.free_text().map(str::to_string) else {
        return ctx.stay(Reply::text(content::EMPTY_ANSWER));
    };
    ctx.session.answers.push(text);
    finish(ctx, JournalKind::Experiment, content::EXPERIMENT_DONE)
}

pub fn if_then_entry(_ctx: &mut Ctx<'_>) -> Step {
    Step::to(State::Plan, Reply::text(content::IF_THEN_START))
}

pub fn if_then_plan(ctx: &mut Ctx<'_>) -> Step {
    let Some(plan) = ctx.free_text().filter(|text| IF_THEN.is_match(text)).map(str::to_string) else {
        return ctx.stay(Reply::text(content::IF_THEN_RETRY));
    };

    let text = format!(
        "Saved your If-Then plan:\n{}\nUse /ifthen anytime to add more.",
        clip(&plan, content::ECHO_CHARS)
    );
    ctx.session.answers.push(plan);
    finish(ctx, JournalKind::IfThen, &text)
}

pub fn small_win_entry(_ctx: &mut Ctx<'_>) -> Step {
    Step::to(State::Win, Reply::text(content::SMALL_WIN_START))
}

pub fn small_win(ctx: &mut Ctx<'_>) -> Step {
    let Some(text) = ctx.free_text().map(str::to_string) else {
        return ctx.stay(Reply::text(content::EMPTY_ANSWER));
    };
    ctx.session.answers.push(text);
    finish(ctx, JournalKind::SmallWin, content::SMALL_WIN_DONE)
}

pub fn review_entry(_ctx: &mut Ctx<'_>) -> Step {
    Step::to(State::ReviewAnswers, Reply::text(content::REVIEW_START))
}

pub fn review_answers(ctx: &mut Ctx<'_>) -> Step {
    let answers: Vec<String> = ctx
        .free_text()
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|answer| !answer.is_empty())
        .map(str::to_string)
        .collect();

    if answers.len() < REVIEW_QUESTIONS {
        return ctx.stay(Reply::text(content::REVIEW_RETRY));
    }

    ctx.session.answers.extend(answers.into_iter().take(REVIEW_QUESTIONS));
    finish(ctx, JournalKind::QuarterlyReview, content::REVIEW_DONE)
}
