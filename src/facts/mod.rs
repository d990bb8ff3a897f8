//! Country facts: the persisted cache, external generation, and the
//! "another fact" tracker.

pub mod cache;
pub mod extra;
pub mod generator;

pub use cache::{FactCache, FactEntry};
pub use extra::{compose_with_fact, AnotherFact, ExtraFacts};
pub use generator::{ChatCompletionFactGenerator, DisabledFactGenerator, FactGenerator};
