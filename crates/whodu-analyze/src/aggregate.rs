//! Concurrent usage aggregation.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use compact_str::CompactString;
use dashmap::DashMap;

use whodu_core::{NamedUsage, OwnerUsage, UsageReport};
use whodu_scan::{FsVisitor, JwalkWalker, NodeMeta};

use crate::error::ReportError;

/// Write-shared aggregation state for one walk.
///
/// Holds the overall accumulator plus one accumulator per distinct group and
/// user name. Accumulators are created lazily; concurrent first-sight of the
/// same name yields exactly one accumulator, and every caller gets that same
/// instance. Entries are never removed or replaced. Mutual exclusion is
/// scoped per accumulator, so updates for unrelated names never serialize
/// against each other.
#[derive(Debug, Default)]
pub struct UsageBuilder {
    overall: Mutex<OwnerUsage>,
    by_group: DashMap<CompactString, Arc<Mutex<OwnerUsage>>>,
    by_user: DashMap<CompactString, Arc<Mutex<OwnerUsage>>>,
}

/// Lock an accumulator, recovering the data if a previous holder panicked.
fn lock(cell: &Mutex<OwnerUsage>) -> MutexGuard<'_, OwnerUsage> {
    cell.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn get_or_create(
    map: &DashMap<CompactString, Arc<Mutex<OwnerUsage>>>,
    name: &str,
) -> Arc<Mutex<OwnerUsage>> {
    // Fast path: the name almost always exists already.
    if let Some(cell) = map.get(name) {
        return Arc::clone(&cell);
    }
    map.entry(CompactString::new(name))
        .or_insert_with(|| Arc::new(Mutex::new(OwnerUsage::new())))
        .clone()
}

impl UsageBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The accumulator for `group`, created on first sight.
    pub fn group(&self, group: &str) -> Arc<Mutex<OwnerUsage>> {
        get_or_create(&self.by_group, group)
    }

    /// The accumulator for `user`, created on first sight.
    pub fn user(&self, user: &str) -> Arc<Mutex<OwnerUsage>> {
        get_or_create(&self.by_user, user)
    }

    fn record_file(&self, node: &NodeMeta) {
        let group = self.group(&node.group);
        let user = self.user(&node.user);

        lock(&self.overall).record_file(node.size, node.blocks);
        lock(&group).record_file(node.size, node.blocks);
        lock(&user).record_file(node.size, node.blocks);
    }

    fn record_directory(&self, node: &NodeMeta) {
        let group = self.group(&node.group);
        let user = self.user(&node.user);

        lock(&self.overall).record_directory();
        lock(&group).record_directory();
        lock(&user).record_directory();
    }

    fn record_symlink(&self, node: &NodeMeta) {
        let group = self.group(&node.group);
        let user = self.user(&node.user);

        lock(&self.overall).record_symlink();
        lock(&group).record_symlink();
        lock(&user).record_symlink();
    }

    /// Snapshot the accumulated state into an immutable report.
    ///
    /// Meant to be called once the walk has returned; per-name rows come out
    /// sorted by name so downstream ordering is deterministic.
    pub fn report(&self, path: impl Into<std::path::PathBuf>) -> UsageReport {
        UsageReport {
            path: path.into(),
            overall: lock(&self.overall).clone(),
            by_group: snapshot_rows(&self.by_group),
            by_user: snapshot_rows(&self.by_user),
        }
    }
}

fn snapshot_rows(map: &DashMap<CompactString, Arc<Mutex<OwnerUsage>>>) -> Vec<NamedUsage> {
    let mut rows: Vec<NamedUsage> = map
        .iter()
        .map(|entry| NamedUsage {
            name: entry.key().clone(),
            usage: lock(entry.value()).clone(),
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    rows
}

/// The traversal sink: applies every node callback to the three relevant
/// accumulators (overall, owning group, owning user).
#[derive(Debug, Default)]
pub struct UsageVisitor {
    builder: UsageBuilder,
}

impl UsageVisitor {
    /// Create a visitor with an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the aggregation into a report for `path`.
    pub fn report(&self, path: impl Into<std::path::PathBuf>) -> UsageReport {
        self.builder.report(path)
    }
}

impl FsVisitor for UsageVisitor {
    fn on_file(&self, node: &NodeMeta, _path: &Path) {
        self.builder.record_file(node);
    }

    fn on_directory(&self, node: &NodeMeta, _path: &Path) {
        self.builder.record_directory(node);
    }

    fn on_symlink(&self, node: &NodeMeta, path: &Path) {
        // Symlinks are only noted; they carry no size or block data.
        tracing::debug!(path = %path.display(), target_owner = %node.user, "symlink noted");
        self.builder.record_symlink(node);
    }
}

/// Walk `path` and aggregate usage per owner.
///
/// Fails only when the walk itself cannot start or read the root; per-entry
/// problems below the root are handled inside the walker.
pub fn compute_report(walker: &JwalkWalker, path: &Path) -> Result<UsageReport, ReportError> {
    let visitor = Arc::new(UsageVisitor::new());
    walker.visit_parallel(Arc::clone(&visitor) as Arc<dyn FsVisitor>, path)?;

    let report = visitor.report(path);
    tracing::info!(
        path = %path.display(),
        users = report.user_count(),
        groups = report.group_count(),
        files = report.overall.files,
        "aggregation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use whodu_scan::NodeKind;

    fn file_node(user: &str, group: &str, size: u64, blocks: u64) -> NodeMeta {
        NodeMeta {
            kind: NodeKind::File,
            name: "f".into(),
            user: user.into(),
            group: group.into(),
            size,
            blocks,
        }
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let builder = UsageBuilder::new();

        let first = builder.user("alice");
        let second = builder.user("alice");
        assert!(Arc::ptr_eq(&first, &second));

        lock(&first).record_file(100, 1);

        // Inserting another key leaves the existing accumulator untouched.
        let bob = builder.user("bob");
        assert!(!Arc::ptr_eq(&first, &bob));
        let third = builder.user("alice");
        assert!(Arc::ptr_eq(&first, &third));
        assert_eq!(lock(&third).files, 1);
    }

    #[test]
    fn test_concurrent_get_or_create_single_winner() {
        let builder = UsageBuilder::new();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        lock(&builder.user("alice")).record_file(1, 1);
                    }
                });
            }
        });

        let report = builder.report("/tmp");
        assert_eq!(report.by_user.len(), 1);
        assert_eq!(report.by_user[0].usage.files, 800);
    }

    #[test]
    fn test_visitor_attributes_to_all_three_accumulators() {
        let visitor = UsageVisitor::new();
        visitor.on_file(&file_node("alice", "eng", 2048, 4), Path::new("/t/f"));

        let report = visitor.report("/t");
        assert_eq!(report.overall.files, 1);
        assert_eq!(report.by_user[0].name, "alice");
        assert_eq!(report.by_user[0].usage.total_size, 2048);
        assert_eq!(report.by_group[0].name, "eng");
        assert_eq!(report.by_group[0].usage.blocks, 4);
    }

    #[test]
    fn test_conservation_across_users_and_groups() {
        let visitor = UsageVisitor::new();
        let nodes = [
            file_node("alice", "eng", 500, 1),
            file_node("alice", "eng", 2000, 4),
            file_node("bob", "ops", 2_000_000, 3907),
        ];

        std::thread::scope(|scope| {
            for node in &nodes {
                scope.spawn(|| visitor.on_file(node, Path::new("/t/f")));
            }
        });

        let report = visitor.report("/t");
        let user_files: u64 = report.by_user.iter().map(|r| r.usage.files).sum();
        let group_size: u64 = report.by_group.iter().map(|r| r.usage.total_size).sum();
        let user_blocks: u64 = report.by_user.iter().map(|r| r.usage.blocks).sum();

        assert_eq!(report.overall.files, user_files);
        assert_eq!(report.overall.total_size, group_size);
        assert_eq!(report.overall.blocks, user_blocks);
        assert_eq!(report.overall.histogram.total(), report.overall.files);
    }

    #[test]
    fn test_unknown_owner_still_counted() {
        let visitor = UsageVisitor::new();
        visitor.on_file(&file_node("", "", 100, 1), Path::new("/t/f"));

        let report = visitor.report("/t");
        assert_eq!(report.overall.files, 1);
        assert_eq!(report.by_user.len(), 1);
        assert_eq!(report.by_user[0].name, "");
        assert_eq!(report.by_user[0].usage.files, 1);
    }
}
