//! Core types for whodu.
//!
//! This crate provides the data model shared across the whodu workspace:
//! per-owner usage accumulators, the file-size histogram, the finished
//! report, and the options that select and order report rows.

mod error;
mod histogram;
mod options;
mod usage;

pub use error::WalkError;
pub use histogram::{DEFAULT_BORDERS, SizeHistogram};
pub use options::{ReportOptions, ReportOptionsBuilder, SortMetric};
pub use usage::{NamedUsage, OwnerUsage, UsageReport};
