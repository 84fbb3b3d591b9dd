pub mod flags;
pub mod journal;
pub mod reminder;
pub mod session;

pub use flags::Flag;
pub use journal::{JournalEntry, JournalKind};
pub use reminder::{ReminderPayload, ScheduledReminder};
pub use session::{UserId, UserSession};
