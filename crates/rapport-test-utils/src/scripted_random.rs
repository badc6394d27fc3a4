// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted random source for forcing dampener and selection branches.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use rapport_core::RandomSource;

/// Returns pre-configured draws in FIFO order, then `fallback` forever.
///
/// Also counts draws so tests can assert that a code path never consumed
/// randomness.
pub struct ScriptedRandom {
    draws: Mutex<VecDeque<f64>>,
    fallback: f64,
    consumed: AtomicUsize,
}

impl ScriptedRandom {
    pub fn new(draws: Vec<f64>) -> Self {
        Self::with_fallback(draws, 0.0)
    }

    pub fn with_fallback(draws: Vec<f64>, fallback: f64) -> Self {
        Self {
            draws: Mutex::new(VecDeque::from(draws)),
            fallback,
            consumed: AtomicUsize::new(0),
        }
    }

    /// Always returns `value`.
    pub fn constant(value: f64) -> Self {
        Self::with_fallback(Vec::new(), value)
    }

    /// Number of draws taken so far.
    pub fn consumed(&self) -> usize {
        self.consumed.load(Ordering::SeqCst)
    }

    /// Queue another draw.
    pub fn push(&self, value: f64) {
        self.draws
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(value);
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&self) -> f64 {
        self.consumed.fetch_add(1, Ordering::SeqCst);
        self.draws
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_then_fallback() {
        let rng = ScriptedRandom::with_fallback(vec![0.1, 0.9], 0.5);
        assert_eq!(rng.next_f64(), 0.1);
        assert_eq!(rng.next_f64(), 0.9);
        assert_eq!(rng.next_f64(), 0.5);
        rng.push(0.2);
        assert_eq!(rng.next_f64(), 0.2);
        assert_eq!(rng.consumed(), 4);
    }
}
