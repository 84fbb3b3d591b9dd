use regex::Regex;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Stuck,
    Overwhelmed,
    Anxious,
    Unmotivated,
    Lost,
    Hopeful,
    General,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Stuck => "stuck",
            Category::Overwhelmed => "overwhelmed",
            Category::Anxious => "anxious",
            Category::Unmotivated => "unmotivated",
            Category::Lost => "lost",
            Category::Hopeful => "hopeful",
            Category::General => "general",
        }
    }

    /// Заготовленный ответ на первый вопрос воронки.
    pub fn follow_up(self) -> &'static str {
        match self {
            Category::Stuck => "Feeling stuck usually means you've outgrown the way you've been operating. \
                That's not failure, it's a signal that a new mindset is due.",
            Category::Overwhelmed => "When everything feels urgent, nothing gets your best energy. \
                We'll shrink the pile to one next step.",
            Category::Anxious => "That worry is your mind trying to protect you. \
                We'll give it evidence instead of what-ifs.",
            Category::Unmotivated => "Motivation follows action, not the other way around. \
                Small wins will rebuild the spark.",
            Category::Lost => "Not knowing the direction is where every real reinvention starts. \
                We'll find your North Star first.",
            Category::Hopeful => "Love that energy! Let's turn it into a system so it lasts longer than a good week.",
            Category::General => "Thank you for being honest about where you are. That's the first step most people skip.",
        }
    }
}

// Порядок важен: побеждает первое совпадение.
static RULES: LazyLock<Vec<(Regex, Category)>> = LazyLock::new(|| {
    [
        (r"\b(stuck|trapped|plateau|going nowhere|can'?t move|same place)\b", Category::Stuck),
        (r"\b(overwhelm\w*|too much|drowning|burn(ed|t)? ?out|exhausted|swamped)\b", Category::Overwhelmed),
        (r"\b(anxious|anxiety|worr\w*|scared|afraid|fear\w*|nervous|panic\w*)\b", Category::Anxious),
        (r"\b(unmotivated|no motivation|lazy|procrastinat\w*|can'?t be bothered|bored)\b", Category::Unmotivated),
        (r"\b(lost|confused|directionless|no direction|purpose|don'?t know)\b", Category::Lost),
        (r"\b(hopeful|excited|ready|motivated|great|good|optimistic)\b", Category::Hopeful),
    ]
    .into_iter()
    .map(|(pattern, category)| (Regex::new(pattern).expect("valid classifier regex"), category))
    .collect()
});

/// Относит свободный текст к категории. Всегда что-то возвращает.
pub fn classify(text: &str) -> Category {
    let lowered = text.to_lowercase();
    RULES
        .iter()
        .find(|(re, _)| re.is_match(&lowered))
        .map(|(_, category)| *category)
        .unwrap_or(Category::General)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YesNo {
    Yes,
    No,
}

static YES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(y|yes|yeah|yep|sure|ok(ay)?|absolutely|definitely|i'?m in|let'?s do it|ready)\b")
        .expect("valid regex")
});

static NO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(n|no|nope|nah|not (now|yet|really)|maybe later|later)\b")
        .expect("valid regex")
});

pub fn yes_no(text: &str) -> Option<YesNo> {
    let lowered = text.to_lowercase();
    if YES.is_match(&lowered) {
        Some(YesNo::Yes)
    } else if NO.is_match(&lowered) {
        Some(YesNo::No)
    } else {
        None
    }
}

/// Целое число в диапазоне `min..=max`, иначе `None`.
pub fn parse_scale(text: &str, min: u8, max: u8) -> Option<u8> {
    text.trim()
        .parse::<u8>()
        .ok()
        .filter(|value| (min..=max).contains(value))
}

/// Буква варианта A–E: "c", "C)", "c. Health" или кнопка `focus_c`.
pub fn parse_choice(text: &str, options: usize) -> Option<usize> {
    let trimmed = text.trim();
    let raw = trimmed.strip_prefix("focus_").unwrap_or(trimmed);
    let mut chars = raw.chars();
    let letter = chars.next()?.to_ascii_lowercase();
    if chars.next().is_some_and(|c| c.is_alphanumeric()) {
        return None;
    }
    let index = (letter as usize).checked_sub('a' as usize)?;
    (index < options).then_some(index)
}

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$")
        .expect("valid regex")
});

pub fn is_email(text: &str) -> bool {
    EMAIL.is_match(text.trim())
}
