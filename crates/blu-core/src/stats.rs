//! Stats Aggregator: running counters fed by every block.

use std::fmt;
use std::ops::Range;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::Category;

/// Per-block data-saved estimate, in kilobytes.
pub const SAVED_KB_PER_BLOCK: Range<f64> = 1.0..3.0;

/// Aggregate counters. All three only ever grow.
///
/// `saved` is an estimate drawn at random per block, not a measurement;
/// tests can only bound it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub blocked: u64,
    pub saved: f64,
    pub threats: u64,
}

impl Stats {
    pub fn on_block<R: Rng + ?Sized>(&mut self, category: Category, rng: &mut R) {
        self.blocked += 1;
        self.saved += rng.gen_range(SAVED_KB_PER_BLOCK);
        if category.is_threat() {
            self.threats += 1;
        }
    }

    /// Estimated data saved, in megabytes.
    pub fn saved_megabytes(&self) -> f64 {
        self.saved / 1024.0
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} blocked, {:.2} MB saved, {} threats",
            self.blocked,
            self.saved_megabytes(),
            self.threats
        )
    }
}
