//! Single-player practice: flash cards, a timed sprint, and a short test.

pub mod engine;
pub mod session;

pub use engine::{summary, SoloEngine, SoloResult};
pub use session::{SoloMode, SoloRegistry, SoloSession};
