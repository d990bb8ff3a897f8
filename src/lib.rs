//! # Capitals Quiz Bot
//!
//! A Telegram bot for countries and capitals trivia.
//!
//! ## Features
//! - Cooperative matches: two players against a team of bots, taking turns
//! - Solo training with flash cards, timed sprints and short tests
//! - `/capital` lookups by country or capital under any known spelling
//! - Cached facts about each place, refreshed on a schedule

/// Routing of commands, button presses and timers to the game engines
pub mod app;
/// Bot command handlers and message processing
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Game tuning constants
pub mod constants;
/// Cooperative match engine
pub mod coop;
/// Country and capital reference tables
pub mod data;
/// Outbound directives, inbound callback payloads and their delivery
pub mod delivery;
/// Domain error type
pub mod error;
/// Cached and generated facts about places
pub mod facts;
/// Question generation and randomness
pub mod quiz;
/// Background services like the health endpoint and fact refresh
pub mod services;
/// Short random session tokens
pub mod session_id;
/// Solo training engine
pub mod solo;
/// Utility functions for validation, formatting and logging
pub mod utils;
