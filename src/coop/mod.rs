//! Cooperative two-player-vs-bots matches.

pub mod coordinator;
pub mod messages;
pub mod registry;
pub mod session;
pub mod turns;

pub use coordinator::{CoopResult, CoopSettings, TurnCoordinator};
pub use registry::SessionRegistry;
pub use session::{CoopSession, Difficulty, Player, PlayerKind, Region, Stage};
pub use turns::Slot;
