//! The node-visit callback contract.

use std::path::Path;

use compact_str::CompactString;

/// Kind of a visited node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
}

/// Metadata handed to a visitor for one node.
///
/// `size` and `blocks` are meaningful for files only and are zero for
/// directories and symlinks. `user` and `group` fall back to the numeric id
/// when no name is known for the owner.
#[derive(Debug, Clone)]
pub struct NodeMeta {
    /// Node kind.
    pub kind: NodeKind,
    /// File or directory name (not the full path).
    pub name: CompactString,
    /// Owning user name.
    pub user: CompactString,
    /// Owning group name.
    pub group: CompactString,
    /// Size in bytes (files only).
    pub size: u64,
    /// Disk blocks used (files only).
    pub blocks: u64,
}

/// Receives one callback per visited node.
///
/// The walker dispatches callbacks from parallel workers in no particular
/// order; each node is visited exactly once. Implementations must therefore
/// be safe to call concurrently from any number of threads.
pub trait FsVisitor: Send + Sync {
    /// Called once for every regular file.
    fn on_file(&self, node: &NodeMeta, path: &Path);

    /// Called once for every directory, the walk root included.
    fn on_directory(&self, node: &NodeMeta, path: &Path);

    /// Called once for every symbolic link. Links are never followed.
    fn on_symlink(&self, node: &NodeMeta, path: &Path);
}
