//! 30-дневная программа: подтверждение PDF и упражнения по дням.

use super::content::{self, EXERCISES};
use super::flows::State;
use super::reply::{Button, Reply};
use super::{Ctx, Step};
use crate::models::flags::{PDF_COMPLETED, PROGRAM_COMPLETE};

fn exercise_buttons(text: &str) -> Reply {
    Reply::text(text).with_row(vec![
        Button::callback("▶️ Next", "next"),
        Button::callback("✅ Done", "done"),
    ])
}

fn is_finished(day: u32) -> bool {
    day as usize > EXERCISES.len()
}

pub fn entry(ctx: &mut Ctx<'_>) -> Step {
    if !ctx.session.has_flag(PDF_COMPLETED) {
        let reply = Reply::text(content::PDF_QUESTION)
            .with_row(vec![Button::callback("✅ Done", "done")]);
        return Step::to(State::ConfirmPdf, reply);
    }

    if is_finished(ctx.session.program_day) {
        return Step::to(State::Idle, Reply::text(content::PROGRAM_COMPLETE));
    }

    Step::to(State::Exercise, exercise_buttons(content::PROGRAM_CONTINUE))
}

pub fn confirm_pdf(ctx: &mut Ctx<'_>) -> Step {
    if !ctx.raw().eq_ignore_ascii_case("done") {
        return ctx.stay(Reply::text(content::PDF_RETRY));
    }

    log::info!("📘 User {} finished the PDF", ctx.user_id);
    ctx.session.mark(PDF_COMPLETED);
    ctx.session.program_day = 1;
    Step::to(State::Exercise, exercise_buttons(content::PROGRAM_START))
}

pub fn exercise(ctx: &mut Ctx<'_>) -> Step {
    let day = ctx.session.program_day.max(1);
    ctx.session.program_day = day;

    match ctx.raw().to_lowercase().as_str() {
        "next" => {
            let text = format!(
                "{}\nType 'done' when you complete this exercise.",
                EXERCISES[day as usize - 1]
            );
            ctx.stay(exercise_buttons(&text))
        }
        "done" => {
            ctx.session.program_day = day + 1;
            if is_finished(ctx.session.program_day) {
                log::info!("🏆 User {} completed the program", ctx.user_id);
                ctx.session.mark(PROGRAM_COMPLETE);
                return Step::to(State::Idle, Reply::text(content::PROGRAM_COMPLETE));
            }
            ctx.stay(exercise_buttons(content::PROGRAM_ADVANCE))
        }
        _ => ctx.stay(exercise_buttons(content::PROGRAM_HINT)),
    }
}
