//! Workspace snapshot builder.
//!
//! Lists the direct children of a workspace root, classifies each as a
//! project directory or a config file, sizes it, and returns the result
//! newest-first. The walk is blocking; async callers run it on
//! `spawn_blocking`.

mod store;

pub use store::SnapshotStore;

use std::fs;
use std::path::Path;

use chrono::{DateTime, SubsecRound, Utc};
use walkdir::WalkDir;

use crate::config::{ScanRules, VCS_DIR_NAME};
use crate::error::{Error, Result};
use crate::models::{Entry, Snapshot};

/// Scan `root` and build a fresh [`Snapshot`].
///
/// Fails only when `root` itself cannot be listed. Children that vanish or
/// cannot be statted mid-scan are skipped, and unreadable subtrees add zero
/// to a project's size.
pub fn build(root: &Path, rules: &ScanRules) -> Result<Snapshot> {
    let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());

    let read_dir = fs::read_dir(&root).map_err(|source| Error::WorkspaceUnreadable {
        path: root.clone(),
        source,
    })?;

    let mut children: Vec<fs::DirEntry> = read_dir
        .filter_map(|child| match child {
            Ok(child) => Some(child),
            Err(e) => {
                tracing::debug!("Skipping unreadable workspace entry: {}", e);
                None
            }
        })
        .collect();
    // Directory listing order is platform dependent.
    children.sort_by_key(|child| child.file_name());

    let mut entries = Vec::new();
    for child in children {
        let name = child.file_name().to_string_lossy().into_owned();
        if !is_visible(&name, rules) {
            continue;
        }

        let (file_type, metadata) = match (child.file_type(), child.metadata()) {
            (Ok(file_type), Ok(metadata)) => (file_type, metadata),
            (Err(e), _) | (_, Err(e)) => {
                tracing::debug!("Skipping {}: {}", name, e);
                continue;
            }
        };

        let path = child.path();
        let location = path.to_string_lossy().into_owned();
        let last_modified = modified_at(&metadata);

        if file_type.is_dir() {
            entries.push(Entry::project(
                name,
                location,
                has_documentation(&path, rules),
                last_modified,
                directory_size(&path, rules),
            ));
        } else if file_type.is_file() && rules.is_config_file(&name) {
            entries.push(Entry::config(name, location, last_modified, metadata.len()));
        }
    }

    sort_newest_first(&mut entries);

    tracing::debug!(
        "Scanned workspace {} ({} entries)",
        root.display(),
        entries.len()
    );

    Ok(Snapshot {
        entries,
        generated_at: Utc::now().trunc_subsecs(3),
        root_path: root,
    })
}

/// Whether a top-level name survives the dot-file rule and then the skip list.
fn is_visible(name: &str, rules: &ScanRules) -> bool {
    if name.starts_with('.') && name != VCS_DIR_NAME {
        return false;
    }
    !rules.is_skipped(name)
}

/// True when a documentation or manifest marker is a direct child of `dir`.
pub fn has_documentation(dir: &Path, rules: &ScanRules) -> bool {
    rules.markers().any(|marker| dir.join(marker).exists())
}

/// Total bytes of regular files under `dir`, symlinks not followed.
///
/// Anything named in the size exclusion set is pruned with its subtree.
/// Unreadable entries contribute nothing.
pub fn directory_size(dir: &Path, rules: &ScanRules) -> u64 {
    WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0 || !rules.is_size_excluded(&e.file_name().to_string_lossy())
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// Stable sort, newest first; equal timestamps keep traversal order.
pub fn sort_newest_first(entries: &mut [Entry]) {
    entries.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
}

/// Modification time at millisecond precision, matching the wire format.
fn modified_at(metadata: &fs::Metadata) -> DateTime<Utc> {
    metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_default()
        .trunc_subsecs(3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(name: &str, secs: i64) -> Entry {
        Entry::project(
            name,
            format!("/ws/{}", name),
            false,
            Utc.timestamp_opt(secs, 0).unwrap(),
            0,
        )
    }

    #[test]
    fn sort_keeps_traversal_order_for_ties() {
        let mut entries = vec![entry("A", 5), entry("B", 5), entry("C", 3)];
        sort_newest_first(&mut entries);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn sort_puts_newest_first() {
        let mut entries = vec![entry("old", 1), entry("new", 9), entry("mid", 4)];
        sort_newest_first(&mut entries);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["new", "mid", "old"]);
    }

    #[test]
    fn dot_rule_runs_before_skip_list() {
        let rules = ScanRules::default();
        assert!(!is_visible(".env", &rules));
        // .git passes the dot rule and is then dropped by the skip list.
        assert!(!is_visible(".git", &rules));

        let permissive = ScanRules {
            skip_names: vec![],
            ..ScanRules::default()
        };
        assert!(is_visible(".git", &permissive));
        assert!(!is_visible(".next", &permissive));
        assert!(is_visible("alpha", &permissive));
    }
}
