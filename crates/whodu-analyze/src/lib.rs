//! Owner usage aggregation and report rendering for whodu.
//!
//! This crate turns the walk callbacks from `whodu-scan` into a finished
//! [`UsageReport`](whodu_core::UsageReport) and renders it:
//!
//! - [`UsageBuilder`] / [`UsageVisitor`] — concurrent per-owner aggregation
//! - [`compute_report`] — walk a path and aggregate it
//! - [`select`] — filter and order report rows
//! - [`render_report`] — aligned tabular text output
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use whodu_analyze::{compute_report, render_report};
//! use whodu_core::ReportOptions;
//! use whodu_scan::JwalkWalker;
//!
//! let walker = JwalkWalker::new();
//! let report = compute_report(&walker, Path::new("/var/log")).unwrap();
//!
//! let options = ReportOptions::default();
//! render_report(&options, &report, &mut std::io::stdout()).unwrap();
//! ```

mod aggregate;
mod error;
mod render;
pub mod select;

pub use aggregate::{UsageBuilder, UsageVisitor, compute_report};
pub use error::ReportError;
pub use render::render_report;

// Re-export core types for convenience
pub use whodu_core::{NamedUsage, OwnerUsage, ReportOptions, SortMetric, UsageReport};
