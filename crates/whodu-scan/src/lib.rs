//! Parallel file system walking for whodu.
//!
//! This crate owns the traversal boundary: the [`FsVisitor`] callback
//! contract, the jwalk-backed [`JwalkWalker`] that drives it, and the
//! [`OwnerCache`] mapping uids and gids to names.
//!
//! # Overview
//!
//! The walker dispatches one callback per node from the rayon workers doing
//! the directory reads, so callbacks arrive concurrently and in no
//! particular order. Visitors only rely on "each node exactly once".
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use whodu_scan::{FsVisitor, JwalkWalker, NodeMeta};
//!
//! struct Printer;
//!
//! impl FsVisitor for Printer {
//!     fn on_file(&self, node: &NodeMeta, path: &Path) {
//!         println!("{} owns {}", node.user, path.display());
//!     }
//!     fn on_directory(&self, _node: &NodeMeta, _path: &Path) {}
//!     fn on_symlink(&self, _node: &NodeMeta, _path: &Path) {}
//! }
//!
//! let walker = JwalkWalker::new();
//! let summary = walker.visit_parallel(Arc::new(Printer), Path::new("/tmp")).unwrap();
//! println!("visited {} files", summary.files);
//! ```

mod owner;
mod visitor;
mod walker;

pub use owner::OwnerCache;
pub use visitor::{FsVisitor, NodeKind, NodeMeta};
pub use walker::{JwalkWalker, WalkSummary};

// Re-export core types for convenience
pub use whodu_core::WalkError;
