//! Guess/exact divergence tracking
//!
//! Guess mode skips line of sight and similar checks for speed. Whenever both
//! modes are computed for the same shot, the difference is recorded here so
//! drift between the two can be spotted in the logs.

use std::sync::Mutex;

use crate::core::types::{UnitId, WeaponId};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DivergenceStats {
    pub samples: u64,
    pub total: f64,
    pub max: f64,
    /// Samples above the warning threshold
    pub warnings: u64,
}

impl DivergenceStats {
    pub fn mean(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.total / self.samples as f64
        }
    }
}

#[derive(Debug)]
pub struct DivergenceTracker {
    threshold: f64,
    stats: Mutex<DivergenceStats>,
}

impl DivergenceTracker {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            stats: Mutex::new(DivergenceStats::default()),
        }
    }

    /// Record one guess/exact pair of hit probabilities
    pub fn record(&self, weapon: WeaponId, target: UnitId, guess: f64, exact: f64) {
        let divergence = (guess - exact).abs();
        tracing::debug!(%weapon, %target, guess, exact, divergence, "estimate divergence");
        if divergence > self.threshold {
            tracing::warn!(
                %weapon,
                %target,
                guess,
                exact,
                "guess estimate diverges from exact"
            );
        }

        let mut stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        stats.samples += 1;
        stats.total += divergence;
        stats.max = stats.max.max(divergence);
        if divergence > self.threshold {
            stats.warnings += 1;
        }
    }

    pub fn stats(&self) -> DivergenceStats {
        *self.stats.lock().unwrap_or_else(|e| e.into_inner())
    }
}
