//! Report options.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::usage::OwnerUsage;

/// Metric used to order per-group and per-user tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortMetric {
    /// Order by accumulated block count.
    Blocks,
    /// Order by number of files.
    Files,
    /// Order by number of directories.
    Directories,
    /// Order by total file size in bytes.
    FileSize,
}

impl SortMetric {
    /// The sort key this metric extracts from an accumulator.
    pub fn key(&self, usage: &OwnerUsage) -> u64 {
        match self {
            SortMetric::Blocks => usage.blocks,
            SortMetric::Files => usage.files,
            SortMetric::Directories => usage.directories,
            SortMetric::FileSize => usage.total_size,
        }
    }
}

/// Settings for selecting and ordering report rows.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct ReportOptions {
    /// Metric the group and user tables are sorted by (ascending).
    #[builder(default = "SortMetric::FileSize")]
    #[serde(default = "default_sort")]
    pub sort: SortMetric,

    /// Optional regex applied to user names (search semantics). `None`
    /// keeps every user.
    #[builder(default)]
    #[serde(default)]
    pub user_filter: Option<String>,
}

fn default_sort() -> SortMetric {
    SortMetric::FileSize
}

impl ReportOptions {
    /// Create a new options builder.
    pub fn builder() -> ReportOptionsBuilder {
        ReportOptionsBuilder::default()
    }
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            sort: SortMetric::FileSize,
            user_filter: None,
        }
    }
}
