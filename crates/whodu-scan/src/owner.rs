//! Owner name resolution with caching.

use compact_str::CompactString;
use dashmap::DashMap;

/// Caches uid/gid to name lookups.
///
/// Name resolution goes through NSS and can be slow (LDAP, sssd); a walk
/// touches the same handful of ids millions of times, so each id is resolved
/// once and served from a concurrent map afterwards. Ids without a passwd or
/// group entry resolve to their decimal string so the node is still
/// attributed to a stable key.
#[derive(Debug, Default)]
pub struct OwnerCache {
    users: DashMap<u32, CompactString>,
    groups: DashMap<u32, CompactString>,
}

impl OwnerCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            groups: DashMap::new(),
        }
    }

    /// Resolve a uid to a user name.
    pub fn user_name(&self, uid: u32) -> CompactString {
        if let Some(name) = self.users.get(&uid) {
            return name.clone();
        }
        let name = resolve_user(uid);
        self.users.insert(uid, name.clone());
        name
    }

    /// Resolve a gid to a group name.
    pub fn group_name(&self, gid: u32) -> CompactString {
        if let Some(name) = self.groups.get(&gid) {
            return name.clone();
        }
        let name = resolve_group(gid);
        self.groups.insert(gid, name.clone());
        name
    }

    /// Number of distinct uids resolved so far.
    pub fn users_seen(&self) -> usize {
        self.users.len()
    }

    /// Number of distinct gids resolved so far.
    pub fn groups_seen(&self) -> usize {
        self.groups.len()
    }
}

#[cfg(unix)]
fn resolve_user(uid: u32) -> CompactString {
    match uzers::get_user_by_uid(uid) {
        Some(user) => CompactString::new(user.name().to_string_lossy()),
        None => {
            tracing::warn!(uid, "no passwd entry for uid, using numeric id");
            CompactString::new(uid.to_string())
        }
    }
}

#[cfg(not(unix))]
fn resolve_user(uid: u32) -> CompactString {
    CompactString::new(uid.to_string())
}

#[cfg(unix)]
fn resolve_group(gid: u32) -> CompactString {
    match uzers::get_group_by_gid(gid) {
        Some(group) => CompactString::new(group.name().to_string_lossy()),
        None => {
            tracing::warn!(gid, "no group entry for gid, using numeric id");
            CompactString::new(gid.to_string())
        }
    }
}

#[cfg(not(unix))]
fn resolve_group(gid: u32) -> CompactString {
    CompactString::new(gid.to_string())
}
