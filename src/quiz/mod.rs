//! Question generation shared by every game mode.

pub mod question;
pub mod rng;

pub use question::{generate, generate_for, Direction, DirectionChoice, Question};
pub use rng::{QuizRng, ScriptedRng, SeededRng};
