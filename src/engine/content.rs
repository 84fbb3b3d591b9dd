// Тексты диалогов.

/// Сколько символов ответа пользователя цитируется в следующем вопросе.
pub const ECHO_CHARS: usize = 200;
/// Предел для ответа ассистента.
pub const REFLECTION_CHARS: usize = 1000;

pub const WELCOME: &str = "👋 Welcome! I'm your mindset coach.\n\
    In a few quick questions we'll find what's holding you back and what to do about it.";

pub const Q1_PROMPT: &str = "First, be honest with me: how do you feel about where your life is right now?";

pub const Q2_PROMPT: &str = "What do you think has been holding you back the most?";

pub const Q3_RETRY: &str = "Please send a whole number from 1 to 10.";

pub const Q4_PROMPT: &str = "Which area do you want to transform first?";

pub const FOCUS_AREAS: [&str; 5] = [
    "Career & money",
    "Health & energy",
    "Relationships",
    "Confidence & self-belief",
    "Purpose & direction",
];

pub const Q4_RETRY: &str = "Please pick one of the options A–E.";

pub const Q5_PROMPT: &str = "The Mindset Blueprint is a 30-day guided plan with daily exercises, \
    check-ins and reminders that keep you accountable.\n\nAre you ready to commit to the next 30 days?";

pub const Q5_RETRY: &str = "Just a simple yes or no 🙂 Are you ready to commit?";

pub const SOFT_CLOSE: &str = "No pressure at all. Whenever you're ready, send /start and we'll pick up from here. 💛";

pub const EMAIL_PROMPT: &str = "Great decision! 🎉\nWhat email should I send your Mindset Blueprint and receipt to?";

pub const EMAIL_RETRY: &str = "That doesn't look like an email address. Please send something like name@example.com.";

pub const OFFER_HINT: &str = "Tap \"Pay now\" to complete your payment, then press \"I've paid\" so I can confirm it.";

pub const PAYMENT_PENDING: &str = "I couldn't confirm your payment yet. \
    If you've just paid, give it a minute and press \"I've paid\" again.";

pub const ALREADY_MEMBER: &str = "You're already in! 🙌";

pub const PURCHASE_CONFIRMED: &str = "✅ Payment confirmed. Welcome to the Mindset Blueprint!\n\n\
    Your PDF is on its way to your inbox. Once you've read it, send /program to start day 1.\n\
    I'll check in with you every few days to keep you on track.";

pub const WELCOME_BACK: &str = "Welcome back! 👋 Your membership is active.";

pub const MENU: &str = "What would you like to do?\n\
    /program – your 30-day mindset plan\n\
    /checkin – quick daily check-in\n\
    /evidence – rewrite a limiting belief\n\
    /experiment – plan a minimum viable experiment\n\
    /ifthen – build an if-then plan\n\
    /smallwin – log a small win\n\
    /review – quarterly mindset review\n\
    /help – all commands";

pub const IDLE_GUEST: &str = "Send /start whenever you want to begin again.";

pub const MEMBERS_ONLY: &str = "🔒 This is part of the Mindset Blueprint. Send /start to join first.";

pub const HELP: &str = "Commands:\n\
    /start – begin, or continue where you left off\n\
    /program – 30-day mindset installation plan\n\
    /checkin – daily energy check-in\n\
    /evidence – Evidence Inventory to rewire a belief\n\
    /experiment – log a Minimum Viable Experiment\n\
    /ifthen – create an If-Then plan\n\
    /smallwin – celebrate a small win\n\
    /review – Quarterly Mindset Review\n\
    /cancel – stop the current conversation\n\
    'done' – confirm the current exercise\n\
    'next' – get today's exercise";

pub const GOODBYE: &str = "Goodbye! Come back anytime to continue your mindset growth.";

pub const SOMETHING_WENT_WRONG: &str = "Sorry, something went wrong on my side. Please try again in a moment.";

pub fn retry_later(support: &str) -> String {
    format!(
        "😔 I couldn't reach the payment service just now. Please try again in a minute, \
        or contact {} if it keeps happening.",
        support
    )
}

pub fn energy_reply(level: u8) -> &'static str {
    match level {
        1..=4 => "Thanks for being honest. Low energy isn't a character flaw, it's data, and we can work with it.",
        5..=7 => "Solid middle ground. A few small habits can tip that into momentum.",
        _ => "That's real fuel! Let's make sure it goes somewhere that matters.",
    }
}

pub const PDF_QUESTION: &str = "Have you finished reading the Mindset Blueprint PDF?\n\
    Type 'done' when you've completed it to start your mindset journey.";

pub const PDF_RETRY: &str = "Please type 'done' when you finish reading the PDF.";

pub const PROGRAM_START: &str = "Fantastic! Let's start your 30-day mindset installation plan.\n\
    Type 'next' anytime to get today's exercise.";

pub const PROGRAM_CONTINUE: &str = "Welcome back! Ready to continue your mindset growth? \
    Type 'next' to get your next mindset exercise.";

pub const PROGRAM_HINT: &str = "Type 'next' for today's exercise or 'done' once you've completed it.";

pub const PROGRAM_ADVANCE: &str = "Great! Type 'next' for your next exercise.";

pub const PROGRAM_COMPLETE: &str = "🏆 You've completed the 30-day mindset installation! Great work.\n\
    Keep the systems running with /evidence, /experiment, /ifthen, /smallwin and /review.";

pub const EXERCISES: [&str; 30] = [
    "Day 1: Define your North Star. What's your purpose?",
    "Day 2: Identify your core values.",
    "Day 3: Write your identity statements (I am someone who...).",
    "Day 4: Align your current goals with your identity.",
    "Day 5: Start your Evidence Inventory: name one limiting belief.",
    "Day 6: List 3 examples that disprove that belief.",
    "Day 7: Rewrite the belief with an evidence-based truth.",
    "Day 8: Notice your self-talk today and write down three phrases you repeat.",
    "Day 9: Turn one of those phrases into a supportive version.",
    "Day 10: Pick one goal you've been avoiding and name the fear behind it.",
    "Day 11: Design a Minimum Viable Experiment for that goal.",
    "Day 12: Run the experiment, however small.",
    "Day 13: Write what you learned, regardless of the result.",
    "Day 14: Weekly reflection: what changed in how you think?",
    "Day 15: Find one friction point in your day and remove it.",
    "Day 16: Write your first If-Then plan.",
    "Day 17: Stack a new two-minute habit onto an existing one.",
    "Day 18: Log three small wins from the past week.",
    "Day 19: Celebrate a win out loud or share it with someone.",
    "Day 20: Audit your environment: what supports you, what drains you?",
    "Day 21: Weekly reflection: which habit stuck, which didn't, and why?",
    "Day 22: Reframe a recent setback as feedback.",
    "Day 23: Identify your biggest constraint right now.",
    "Day 24: Plan the smallest step that loosens that constraint.",
    "Day 25: Spend 10 minutes visualising your identity one year from now.",
    "Day 26: Write a letter from that future self to today's self.",
    "Day 27: Choose the three habits you'll keep after this program.",
    "Day 28: Weekly reflection: what evidence do you now have about yourself?",
    "Day 29: Schedule your first Quarterly Mindset Review.",
    "Day 30: Complete your first Quarterly Mindset Review with /review.",
];

pub const CHECKIN_ENERGY: &str = "Daily check-in ⚡\nHow's your energy today on a scale of 1 to 10?";

pub const CHECKIN_HIGHLIGHT: &str = "What's one highlight or win from today, however small?";

pub const CHECKIN_DONE: &str = "Logged ✅ Showing up is the habit. See you at the next check-in!";

pub const CHECKIN_LOW: &str = "Logged ✅ Rough days count too. Tomorrow, just aim for one tiny step.";

pub const EVIDENCE_START: &str = "Let's work on your limiting belief.\nWhat is one limiting belief holding you back?";

pub const EVIDENCE_COUNTER: &str = "List 3 instances that prove this belief wrong (separate them by commas).";

pub const EVIDENCE_DONE: &str = "Amazing! You've added a new rewired belief to your Evidence Inventory.\n\
    Work on another belief with /evidence or continue your exercises with /program.";

pub const EXPERIMENT_START: &str = "Let's set a Minimum Viable Experiment (MVE).\nWhat's one goal you've been avoiding?";

pub const EXPERIMENT_WORST: &str = "What's the worst that can happen if this experiment fails?";

pub const EXPERIMENT_LEARNING: &str = "Even if it fails, what will you learn from it?";

pub const EXPERIMENT_DONE: &str = "Great! Your experiment is logged. Take action and come back for a check-in anytime.";

pub const IF_THEN_START: &str = "Let's build an If-Then plan to eliminate friction.\n\
    Complete this sentence: If [trigger], then I will [action].";

pub const IF_THEN_RETRY: &str = "Please phrase it as \"If ..., then I will ...\".";

pub const SMALL_WIN_START: &str = "What's a small win you achieved today? Small wins keep momentum going!";

pub const SMALL_WIN_DONE: &str = "Awesome! Celebrate that win fully. Share more anytime with /smallwin.";

pub const REVIEW_START: &str = "Let's do your Quarterly Mindset Review.\n\
    1. Are you still aligned with your purpose?\n\
    2. What habits need adjustment?\n\
    3. What is your biggest constraint right now?\n\
    4. What's your next smallest experiment?\n\
    Please send your answers separated by semicolons (;).";

pub const REVIEW_RETRY: &str = "Please provide all 4 review answers separated by semicolons (;).";

pub const REVIEW_DONE: &str = "Quarterly Review saved! Remember to keep maintaining your mindset systems.";

pub const EMPTY_ANSWER: &str = "I didn't catch that. Could you answer in a few words?";
