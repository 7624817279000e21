//! Per-owner usage accumulators and the finished report.

use std::path::PathBuf;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::histogram::SizeHistogram;

/// Running usage totals for one reporting key (a user, a group, or the
/// overall singleton).
///
/// Counters only ever increase while a walk is in flight; once the walk
/// returns the value is read-only. `files` always equals the histogram's
/// total, and `blocks`/`total_size` only move through file events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerUsage {
    /// Number of files attributed to this key.
    pub files: u64,
    /// Number of directories.
    pub directories: u64,
    /// Number of symbolic links.
    pub symlinks: u64,
    /// Sum of block counts across attributed files.
    pub blocks: u64,
    /// Sum of file sizes in bytes.
    pub total_size: u64,
    /// Distribution of attributed file sizes.
    pub histogram: SizeHistogram,
}

impl OwnerUsage {
    /// Create a zeroed accumulator.
    pub fn new() -> Self {
        Self {
            files: 0,
            directories: 0,
            symlinks: 0,
            blocks: 0,
            total_size: 0,
            histogram: SizeHistogram::new(),
        }
    }

    /// Record one file. The four updates belong together; callers holding
    /// this accumulator exclusively see either none or all of them.
    ///
    /// Byte and block sums saturate instead of wrapping, so the counters
    /// stay monotone even on absurd inputs.
    pub fn record_file(&mut self, size: u64, blocks: u64) {
        self.files += 1;
        self.total_size = self.total_size.saturating_add(size);
        self.blocks = self.blocks.saturating_add(blocks);
        self.histogram.add(size);
    }

    /// Record one directory.
    pub fn record_directory(&mut self) {
        self.directories += 1;
    }

    /// Record one symlink. Symlinks contribute no size or block data.
    pub fn record_symlink(&mut self) {
        self.symlinks += 1;
    }

    /// Total size in whole megabytes, truncating.
    pub fn size_mb(&self) -> u64 {
        self.total_size / 1024 / 1024
    }
}

impl Default for OwnerUsage {
    fn default() -> Self {
        Self::new()
    }
}

/// An accumulator labelled with the user or group name it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedUsage {
    /// User or group name. Empty when the owner could not be determined.
    pub name: CompactString,
    /// The accumulated totals for that name.
    pub usage: OwnerUsage,
}

/// The finished, read-only aggregation for one reported path.
///
/// Produced once a walk completes; `by_group` and `by_user` are sorted by
/// name so downstream sorting sees a deterministic input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageReport {
    /// The path this report covers.
    pub path: PathBuf,
    /// Totals across every node, regardless of owner.
    pub overall: OwnerUsage,
    /// Per-group totals, sorted by group name.
    pub by_group: Vec<NamedUsage>,
    /// Per-user totals, sorted by user name.
    pub by_user: Vec<NamedUsage>,
}

impl UsageReport {
    /// Number of distinct groups seen.
    pub fn group_count(&self) -> usize {
        self.by_group.len()
    }

    /// Number of distinct users seen.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }
}
