//! Таблица переходов: для каждого диалога строки `(состояние, обработчик,
//! допустимые следующие состояния)`. Отсутствующая строка считается ошибкой
//! конфигурации, а не поводом молча вернуться к началу.

use serde::{Serialize, Deserialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowId {
    #[default]
    Funnel,
    Program,
    Checkin,
    Evidence,
    Experiment,
    IfThen,
    SmallWin,
    Review,
}

impl FlowId {
    pub const ALL: [FlowId; 8] = [
        FlowId::Funnel,
        FlowId::Program,
        FlowId::Checkin,
        FlowId::Evidence,
        FlowId::Experiment,
        FlowId::IfThen,
        FlowId::SmallWin,
        FlowId::Review,
    ];

    /// Диалоги, доступные только после оплаты.
    pub fn members_only(self) -> bool {
        !matches!(self, FlowId::Funnel)
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowId::Funnel => "funnel",
            FlowId::Program => "program",
            FlowId::Checkin => "checkin",
            FlowId::Evidence => "evidence",
            FlowId::Experiment => "experiment",
            FlowId::IfThen => "ifthen",
            FlowId::SmallWin => "smallwin",
            FlowId::Review => "review",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    /// Начальное состояние любого диалога: показать первый вопрос.
    #[default]
    Entry,
    /// Как вы себя чувствуете (классифицируется по ключевым словам).
    Q1,
    /// Что вас сдерживает.
    Q2,
    /// Уровень энергии 1–10.
    Q3,
    /// Область фокуса A–E.
    Q4,
    /// Готовы ли взять обязательство (да/нет).
    Q5,
    Email,
    Offer,
    ConfirmPdf,
    Exercise,
    Energy,
    Highlight,
    Belief,
    Counterexamples,
    Rewrite,
    Goal,
    Worst,
    Learning,
    Plan,
    Win,
    ReviewAnswers,
    /// Общий конечный state: диалог закончен, показываем меню.
    Idle,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerId {
    FunnelEntry,
    FunnelFeeling,
    FunnelObstacle,
    FunnelEnergy,
    FunnelFocus,
    FunnelCommit,
    FunnelEmail,
    FunnelOffer,
    ProgramEntry,
    ProgramConfirmPdf,
    ProgramExercise,
    CheckinEntry,
    CheckinEnergy,
    CheckinHighlight,
    EvidenceEntry,
    EvidenceBelief,
    EvidenceCounterexamples,
    EvidenceRewrite,
    ExperimentEntry,
    ExperimentGoal,
    ExperimentWorst,
    ExperimentLearning,
    IfThenEntry,
    IfThenPlan,
    SmallWinEntry,
    SmallWinWin,
    ReviewEntry,
    ReviewAnswers,
    Idle,
}

#[derive(Debug)]
pub struct StepDef {
    pub state: State,
    pub handler: HandlerId,
    pub next: &'static [State],
}

#[derive(Debug)]
pub struct FlowDef {
    pub id: FlowId,
    pub initial: State,
    pub steps: &'static [StepDef],
}

impl FlowDef {
    pub fn step(&self, state: State) -> Option<&StepDef> {
        self.steps.iter().find(|step| step.state == state)
    }
}

const fn step(state: State, handler: HandlerId, next: &'static [State]) -> StepDef {
    StepDef { state, handler, next }
}

use HandlerId as H;
use State as S;

static FUNNEL: FlowDef = FlowDef {
    id: FlowId::Funnel,
    initial: S::Entry,
    steps: &[
        step(S::Entry, H::FunnelEntry, &[S::Q1, S::Idle]),
        step(S::Q1, H::FunnelFeeling, &[S::Q2]),
        step(S::Q2, H::FunnelObstacle, &[S::Q3]),
        step(S::Q3, H::FunnelEnergy, &[S::Q4]),
        step(S::Q4, H::FunnelFocus, &[S::Q5]),
        step(S::Q5, H::FunnelCommit, &[S::Email, S::Idle]),
        step(S::Email, H::FunnelEmail, &[S::Offer]),
        step(S::Offer, H::FunnelOffer, &[S::Email, S::Idle]),
        step(S::Idle, H::Idle, &[]),
    ],
};

static PROGRAM: FlowDef = FlowDef {
    id: FlowId::Program,
    initial: S::Entry,
    steps: &[
        step(S::Entry, H::ProgramEntry, &[S::ConfirmPdf, S::Exercise, S::Idle]),
        step(S::ConfirmPdf, H::ProgramConfirmPdf, &[S::Exercise]),
        step(S::Exercise, H::ProgramExercise, &[S::Idle]),
        step(S::Idle, H::Idle, &[]),
    ],
};

static CHECKIN: FlowDef = FlowDef {
    id: FlowId::Checkin,
    initial: S::Entry,
    steps: &[
        step(S::Entry, H::CheckinEntry, &[S::Energy]),
        step(S::Energy, H::CheckinEnergy, &[S::Highlight]),
        step(S::Highlight, H::CheckinHighlight, &[S::Idle]),
        step(S::Idle, H::Idle, &[]),
    ],
};

static EVIDENCE: FlowDef = FlowDef {
    id: FlowId::Evidence,
    initial: S::Entry,
    steps: &[
        step(S::Entry, H::EvidenceEntry, &[S::Belief]),
        step(S::Belief, H::EvidenceBelief, &[S::Counterexamples]),
        step(S::Counterexamples, H::EvidenceCounterexamples, &[S::Rewrite]),
        step(S::Rewrite, H::EvidenceRewrite, &[S::Idle]),
        step(S::Idle, H::Idle, &[]),
    ],
};

static EXPERIMENT: FlowDef = FlowDef {
    id: FlowId::Experiment,
    initial: S::Entry,
    steps: &[
        step(S::Entry, H::ExperimentEntry, &[S::Goal]),
        step(S::Goal, H::ExperimentGoal, &[S::Worst]),
        step(S::Worst, H::ExperimentWorst, &[S::Learning]),
        step(S::Learning, H::ExperimentLearning, &[S::Idle]),
        step(S::Idle, H::Idle, &[]),
    ],
};

static IF_THEN: FlowDef = FlowDef {
    id: FlowId::IfThen,
    initial: S::Entry,
    steps: &[
        step(S::Entry, H::IfThenEntry, &[S::Plan]),
        step(S::Plan, H::IfThenPlan, &[S::Idle]),
        step(S::Idle, H::Idle, &[]),
    ],
};

static SMALL_WIN: FlowDef = FlowDef {
    id: FlowId::SmallWin,
    initial: S::Entry,
    steps: &[
        step(S::Entry, H::SmallWinEntry, &[S::Win]),
        step(S::Win, H::SmallWinWin, &[S::Idle]),
        step(S::Idle, H::Idle, &[]),
    ],
};

static REVIEW: FlowDef = FlowDef {
    id: FlowId::Review,
    initial: S::Entry,
    steps: &[
        step(S::Entry, H::ReviewEntry, &[S::ReviewAnswers]),
        step(S::ReviewAnswers, H::ReviewAnswers, &[S::Idle]),
        step(S::Idle, H::Idle, &[]),
    ],
};

pub fn flow(id: FlowId) -> &'static FlowDef {
    match id {
        FlowId::Funnel => &FUNNEL,
        FlowId::Program => &PROGRAM,
        FlowId::Checkin => &CHECKIN,
        FlowId::Evidence => &EVIDENCE,
        FlowId::Experiment => &EXPERIMENT,
        FlowId::IfThen => &IF_THEN,
        FlowId::SmallWin => &SMALL_WIN,
        FlowId::Review => &REVIEW,
    }
}

pub fn lookup(id: FlowId, state: State) -> Option<&'static StepDef> {
    flow(id).step(state)
}
