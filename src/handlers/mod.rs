pub mod commands;
pub mod messages;
pub mod callbacks;
pub mod utils;

pub use commands::{command_handler, Command};
pub use messages::message_handler;
pub use callbacks::callback_handler;
pub use utils::TelegramNotifier;

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
