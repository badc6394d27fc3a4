// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Injectable randomness so the upsell dampener and reply picks are testable.

/// Source of uniform random draws.
pub trait RandomSource: Send + Sync {
    /// Uniform draw in `[0, 1)`.
    fn next_f64(&self) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick(&self, len: usize) -> usize {
        let idx = (self.next_f64() * len as f64) as usize;
        idx.min(len.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64);

    impl RandomSource for Fixed {
        fn next_f64(&self) -> f64 {
            self.0
        }
    }

    #[test]
    fn pick_stays_in_bounds() {
        assert_eq!(Fixed(0.0).pick(5), 0);
        assert_eq!(Fixed(0.5).pick(4), 2);
        assert_eq!(Fixed(0.999_999).pick(3), 2);
        // Out-of-contract draws are clamped.
        assert_eq!(Fixed(1.0).pick(3), 2);
    }
}
