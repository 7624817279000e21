//! File-size distribution histogram.

use serde::{Deserialize, Serialize};

/// Default bucket upper borders in bytes, shared by every histogram in a
/// report so their columns line up when rendered side by side.
pub const DEFAULT_BORDERS: [u64; 8] = [
    0,
    1024,
    64 * 1024,
    1024 * 1024,
    32 * 1024 * 1024,
    256 * 1024 * 1024,
    1024 * 1024 * 1024,
    16 * 1024 * 1024 * 1024,
];

/// Counts file sizes into fixed, ordered buckets.
///
/// Each bucket is an inclusive upper border; sizes above the last border fall
/// into a final open-ended overflow bucket. Borders never change after
/// construction, so `counts()` always has `upper_borders().len() + 1`
/// entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeHistogram {
    borders: Vec<u64>,
    counts: Vec<u64>,
}

impl SizeHistogram {
    /// Create a histogram with the default borders.
    pub fn new() -> Self {
        Self::with_borders(DEFAULT_BORDERS.to_vec())
    }

    /// Create a histogram with custom borders.
    ///
    /// Borders must be non-empty and strictly increasing.
    pub fn with_borders(borders: Vec<u64>) -> Self {
        debug_assert!(!borders.is_empty());
        debug_assert!(borders.windows(2).all(|w| w[0] < w[1]));
        let counts = vec![0; borders.len() + 1];
        Self { borders, counts }
    }

    /// Record one file size. Increments exactly one bucket: the first whose
    /// border is >= `size`, or the overflow bucket.
    pub fn add(&mut self, size: u64) {
        let slot = self
            .borders
            .iter()
            .position(|&border| size <= border)
            .unwrap_or(self.borders.len());
        self.counts[slot] += 1;
    }

    /// Current bucket counts, in border order plus the overflow slot.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// The bucket upper borders, constant for this histogram's lifetime.
    pub fn upper_borders(&self) -> &[u64] {
        &self.borders
    }

    /// Sum of all bucket counts (equals the number of `add` calls).
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Merge another histogram's counts into this one.
    ///
    /// Both histograms must share the same borders.
    pub fn merge(&mut self, other: &SizeHistogram) {
        debug_assert_eq!(self.borders, other.borders);
        for (slot, count) in other.counts.iter().enumerate() {
            self.counts[slot] += count;
        }
    }
}

impl Default for SizeHistogram {
    fn default() -> Self {
        Self::new()
    }
}
