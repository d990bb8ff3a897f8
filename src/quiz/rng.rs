//! Random number source abstraction.
//!
//! The engines never reach for a global generator; they draw from an
//! injected [`QuizRng`] so tests can force every outcome.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Abstraction over random draws.
pub trait QuizRng: Send {
    /// Uniform index in `[0, len)`. `len` is never zero.
    fn next_index(&mut self, len: usize) -> usize;

    /// Uniform `f64` in `[0.0, 1.0)`.
    fn next_f64(&mut self) -> f64;
}

/// Production generator, optionally seeded for reproducible runs.
pub struct SeededRng {
    inner: StdRng,
}

impl SeededRng {
    pub fn new(seed: Option<u64>) -> Self {
        let inner = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { inner }
    }
}

impl QuizRng for SeededRng {
    fn next_index(&mut self, len: usize) -> usize {
        self.inner.random_range(0..len)
    }

    fn next_f64(&mut self) -> f64 {
        self.inner.random::<f64>()
    }
}

/// Replays scripted `f64` draws, then repeats `fallback`. Index draws always
/// pick the first candidate, so shuffles and samples are deterministic.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    draws: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRng {
    pub fn new(draws: Vec<f64>, fallback: f64) -> Self {
        Self {
            draws: draws.into(),
            fallback,
        }
    }

    /// Every probability draw returns `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(Vec::new(), value)
    }
}

impl QuizRng for ScriptedRng {
    fn next_index(&mut self, _len: usize) -> usize {
        0
    }

    fn next_f64(&mut self) -> f64 {
        self.draws.pop_front().unwrap_or(self.fallback)
    }
}

/// Fisher–Yates shuffle driven by a [`QuizRng`].
pub fn shuffle<T>(rng: &mut dyn QuizRng, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1);
        items.swap(i, j);
    }
}

/// Draws up to `count` items without replacement.
pub fn sample<T: Clone>(rng: &mut dyn QuizRng, items: &[T], count: usize) -> Vec<T> {
    let mut pool = items.to_vec();
    let mut picked = Vec::with_capacity(count.min(pool.len()));
    while picked.len() < count && !pool.is_empty() {
        let idx = rng.next_index(pool.len());
        picked.push(pool.swap_remove(idx));
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let mut a = SeededRng::new(Some(42));
        let mut b = SeededRng::new(Some(42));
        for _ in 0..10 {
            assert_eq!(a.next_index(100), b.next_index(100));
        }
        let draw = a.next_f64();
        assert!((0.0..1.0).contains(&draw));
    }

    #[test]
    fn test_scripted_rng_replays_then_falls_back() {
        let mut rng = ScriptedRng::new(vec![0.1, 0.2], 0.9);
        assert_eq!(rng.next_f64(), 0.1);
        assert_eq!(rng.next_f64(), 0.2);
        assert_eq!(rng.next_f64(), 0.9);
        assert_eq!(rng.next_index(7), 0);
    }

    #[test]
    fn test_sample_never_repeats() {
        let mut rng = SeededRng::new(Some(7));
        let items: Vec<u32> = (0..10).collect();
        let mut picked = sample(&mut rng, &items, 6);
        assert_eq!(picked.len(), 6);
        picked.sort_unstable();
        picked.dedup();
        assert_eq!(picked.len(), 6);
        assert_eq!(sample(&mut rng, &items, 50).len(), 10);
    }

    #[test]
    fn test_shuffle_keeps_elements() {
        let mut rng = SeededRng::new(Some(3));
        let mut items = vec!["a", "b", "c", "d"];
        shuffle(&mut rng, &mut items);
        items.sort_unstable();
        assert_eq!(items, vec!["a", "b", "c", "d"]);
    }
}
