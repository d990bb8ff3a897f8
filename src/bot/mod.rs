/// Command definitions and per-command helpers
pub mod commands;
/// Telegram update handlers and the dispatcher schema
pub mod handlers;
