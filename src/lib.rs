pub mod config;
pub mod database;
pub mod engine;
pub mod handlers;
pub mod llm;
pub mod models;
pub mod payments;
pub mod reminders;

#[cfg(test)]
pub mod test_support;
