//! JWalk-based parallel tree walker.

use std::fs::Metadata;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

use compact_str::CompactString;
use jwalk::{Parallelism, WalkDir};

use whodu_core::WalkError;

use crate::owner::OwnerCache;
use crate::visitor::{FsVisitor, NodeKind, NodeMeta};

/// Totals for one completed walk.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkSummary {
    /// Files visited.
    pub files: u64,
    /// Directories visited, the root included.
    pub directories: u64,
    /// Symlinks visited.
    pub symlinks: u64,
    /// Entries skipped because they could not be read.
    pub warnings: u64,
    /// Wall-clock duration of the walk.
    pub elapsed: Duration,
}

/// Walks a directory tree with jwalk and dispatches one visitor callback per
/// node from the rayon worker threads doing the directory reads.
///
/// Callbacks therefore arrive concurrently and in no particular order; the
/// only guarantee is that every node under the root is dispatched exactly
/// once. Symlinks are reported, never followed.
pub struct JwalkWalker {
    threads: usize,
}

#[derive(Default)]
struct WalkCounters {
    files: AtomicU64,
    directories: AtomicU64,
    symlinks: AtomicU64,
    warnings: AtomicU64,
}

impl JwalkWalker {
    /// Create a walker using the shared rayon pool.
    pub fn new() -> Self {
        Self { threads: 0 }
    }

    /// Create a walker with a dedicated pool of `threads` workers
    /// (0 = shared rayon pool).
    pub fn with_threads(threads: usize) -> Self {
        Self { threads }
    }

    /// Visit every node under `root`, invoking `visitor` once per node.
    ///
    /// Fails if the root cannot be read or is not a directory. Entries below
    /// the root that cannot be read are logged, counted as warnings, and
    /// skipped; they never abort the walk.
    pub fn visit_parallel(
        &self,
        visitor: Arc<dyn FsVisitor>,
        root: &Path,
    ) -> Result<WalkSummary, WalkError> {
        let start = Instant::now();
        let root_path = root.canonicalize().map_err(|e| WalkError::io(root, e))?;
        let root_meta =
            std::fs::symlink_metadata(&root_path).map_err(|e| WalkError::io(&root_path, e))?;
        if !root_meta.is_dir() {
            return Err(WalkError::NotADirectory { path: root_path });
        }

        let owners = Arc::new(OwnerCache::new());
        let counters = Arc::new(WalkCounters::default());

        let parallelism = match self.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_millis(100),
            },
            n => Parallelism::RayonNewPool(n),
        };

        let walker = WalkDir::new(&root_path)
            .parallelism(parallelism)
            .skip_hidden(false)
            .follow_links(false)
            .process_read_dir({
                let visitor = Arc::clone(&visitor);
                let owners = Arc::clone(&owners);
                let counters = Arc::clone(&counters);
                // The first pass (depth None) hands over the root entry
                // itself; later passes hand over directory children. Every
                // node therefore comes through here exactly once.
                move |_depth, _dir_path, _state, children| {
                    for child in children.iter() {
                        match child {
                            Ok(entry) => {
                                dispatch_entry(entry, visitor.as_ref(), &owners, &counters);
                            }
                            Err(err) => {
                                tracing::warn!(error = %err, "skipping unreadable entry");
                                counters.warnings.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                    }
                }
            });

        // Visitation happens in the read-dir passes; draining the iterator
        // just drives the walk to completion. Errors were already counted
        // when their read-dir pass saw them.
        for _entry in walker {}

        let summary = WalkSummary {
            files: counters.files.load(Ordering::Relaxed),
            directories: counters.directories.load(Ordering::Relaxed),
            symlinks: counters.symlinks.load(Ordering::Relaxed),
            warnings: counters.warnings.load(Ordering::Relaxed),
            elapsed: start.elapsed(),
        };
        tracing::info!(
            path = %root_path.display(),
            files = summary.files,
            directories = summary.directories,
            symlinks = summary.symlinks,
            warnings = summary.warnings,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "walk finished"
        );
        Ok(summary)
    }
}

impl Default for JwalkWalker {
    fn default() -> Self {
        Self::new()
    }
}

/// Dispatch one directory child to the visitor.
fn dispatch_entry(
    entry: &jwalk::DirEntry<((), ())>,
    visitor: &dyn FsVisitor,
    owners: &OwnerCache,
    counters: &WalkCounters,
) {
    let file_type = entry.file_type();
    let kind = if file_type.is_symlink() {
        NodeKind::Symlink
    } else if file_type.is_dir() {
        NodeKind::Directory
    } else if file_type.is_file() {
        NodeKind::File
    } else {
        // Sockets, fifos, devices: nothing to account for.
        return;
    };

    let path = entry.path();
    let metadata = match std::fs::symlink_metadata(&path) {
        Ok(m) => m,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "skipping unreadable entry");
            counters.warnings.fetch_add(1, Ordering::Relaxed);
            return;
        }
    };

    let node = node_meta(&path, &metadata, kind, owners);

    match kind {
        NodeKind::File => {
            visitor.on_file(&node, &path);
            counters.files.fetch_add(1, Ordering::Relaxed);
        }
        NodeKind::Directory => {
            visitor.on_directory(&node, &path);
            counters.directories.fetch_add(1, Ordering::Relaxed);
        }
        NodeKind::Symlink => {
            visitor.on_symlink(&node, &path);
            counters.symlinks.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Build node metadata from a stat result.
fn node_meta(path: &Path, metadata: &Metadata, kind: NodeKind, owners: &OwnerCache) -> NodeMeta {
    let name = path
        .file_name()
        .map(|n| CompactString::new(n.to_string_lossy()))
        .unwrap_or_else(|| CompactString::new(path.to_string_lossy()));

    let (size, blocks) = if kind == NodeKind::File {
        (metadata.len(), get_blocks(metadata))
    } else {
        (0, 0)
    };

    NodeMeta {
        kind,
        name,
        user: owners.user_name(get_uid(metadata)),
        group: owners.group_name(get_gid(metadata)),
        size,
        blocks,
    }
}

// Cross-platform metadata helpers

/// Get the owning uid from metadata.
#[cfg(unix)]
fn get_uid(metadata: &Metadata) -> u32 {
    metadata.uid()
}

#[cfg(not(unix))]
fn get_uid(_metadata: &Metadata) -> u32 {
    0
}

/// Get the owning gid from metadata.
#[cfg(unix)]
fn get_gid(metadata: &Metadata) -> u32 {
    metadata.gid()
}

#[cfg(not(unix))]
fn get_gid(_metadata: &Metadata) -> u32 {
    0
}

/// Get the number of 512-byte blocks from metadata.
#[cfg(unix)]
fn get_blocks(metadata: &Metadata) -> u64 {
    metadata.blocks()
}

#[cfg(not(unix))]
fn get_blocks(metadata: &Metadata) -> u64 {
    // Estimate blocks from file size (512-byte blocks, rounded up)
    metadata.len().div_ceil(512)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct CountingVisitor {
        files: AtomicU64,
        directories: AtomicU64,
        symlinks: AtomicU64,
        file_sizes: Mutex<Vec<u64>>,
        dir_paths: Mutex<Vec<std::path::PathBuf>>,
    }

    impl FsVisitor for CountingVisitor {
        fn on_file(&self, node: &NodeMeta, _path: &Path) {
            self.files.fetch_add(1, Ordering::Relaxed);
            self.file_sizes.lock().unwrap().push(node.size);
        }

        fn on_directory(&self, _node: &NodeMeta, path: &Path) {
            self.directories.fetch_add(1, Ordering::Relaxed);
            self.dir_paths.lock().unwrap().push(path.to_path_buf());
        }

        fn on_symlink(&self, _node: &NodeMeta, _path: &Path) {
            self.symlinks.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir(root.join("dir1")).unwrap();
        fs::create_dir(root.join("dir2")).unwrap();
        fs::create_dir(root.join("dir1/subdir")).unwrap();

        fs::write(root.join("file1.txt"), "hello").unwrap();
        fs::write(root.join("dir1/file2.txt"), "world world world").unwrap();
        fs::write(root.join("dir1/subdir/file3.txt"), "test").unwrap();
        fs::write(root.join("dir2/file4.txt"), "another file here").unwrap();

        temp
    }

    #[test]
    fn test_every_node_visited_once() {
        let temp = create_test_tree();
        let visitor = Arc::new(CountingVisitor::default());

        let walker = JwalkWalker::new();
        let summary = walker
            .visit_parallel(Arc::clone(&visitor) as Arc<dyn FsVisitor>, temp.path())
            .unwrap();

        assert_eq!(visitor.files.load(Ordering::Relaxed), 4);
        // root + dir1 + dir2 + subdir
        assert_eq!(visitor.directories.load(Ordering::Relaxed), 4);
        assert_eq!(summary.files, 4);
        assert_eq!(summary.directories, 4);

        let sizes: u64 = visitor.file_sizes.lock().unwrap().iter().sum();
        assert_eq!(sizes, 5 + 17 + 4 + 17);
    }

    #[test]
    fn test_root_directory_visited_exactly_once() {
        let temp = create_test_tree();
        let root = temp.path().canonicalize().unwrap();
        let visitor = Arc::new(CountingVisitor::default());

        let walker = JwalkWalker::new();
        walker
            .visit_parallel(Arc::clone(&visitor) as Arc<dyn FsVisitor>, temp.path())
            .unwrap();

        let dir_paths = visitor.dir_paths.lock().unwrap();
        let root_visits = dir_paths.iter().filter(|p| **p == root).count();
        assert_eq!(root_visits, 1);
        assert_eq!(dir_paths.len(), 4);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_reported_not_followed() {
        let temp = create_test_tree();
        std::os::unix::fs::symlink(temp.path().join("dir1"), temp.path().join("link1")).unwrap();

        let visitor = Arc::new(CountingVisitor::default());
        let walker = JwalkWalker::new();
        walker
            .visit_parallel(Arc::clone(&visitor) as Arc<dyn FsVisitor>, temp.path())
            .unwrap();

        assert_eq!(visitor.symlinks.load(Ordering::Relaxed), 1);
        // Nothing behind the link is visited twice.
        assert_eq!(visitor.files.load(Ordering::Relaxed), 4);
        assert_eq!(visitor.directories.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let walker = JwalkWalker::new();
        let visitor = Arc::new(CountingVisitor::default());
        let err = walker
            .visit_parallel(visitor as Arc<dyn FsVisitor>, Path::new("/no/such/path"))
            .unwrap_err();
        assert!(matches!(err, WalkError::NotFound { .. }));
    }

    #[test]
    fn test_file_root_is_an_error() {
        let temp = create_test_tree();
        let walker = JwalkWalker::new();
        let visitor = Arc::new(CountingVisitor::default());
        let err = walker
            .visit_parallel(visitor as Arc<dyn FsVisitor>, &temp.path().join("file1.txt"))
            .unwrap_err();
        assert!(matches!(err, WalkError::NotADirectory { .. }));
    }

    #[test]
    fn test_dedicated_pool() {
        let temp = create_test_tree();
        let visitor = Arc::new(CountingVisitor::default());
        let walker = JwalkWalker::with_threads(2);
        let summary = walker
            .visit_parallel(Arc::clone(&visitor) as Arc<dyn FsVisitor>, temp.path())
            .unwrap();
        assert_eq!(summary.files, 4);
    }
}
