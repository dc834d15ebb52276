use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// One top-level item of the workspace.
///
/// `location` is the absolute path and is unique within a [`Snapshot`].
/// Config entries never carry documentation and are sized as a single file;
/// project entries are sized recursively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    #[serde(rename = "path")]
    pub location: String,
    #[serde(rename = "type")]
    pub category: Category,
    #[serde(rename = "hasReadme")]
    pub has_documentation: bool,
    #[serde(rename = "lastModified", with = "timestamp")]
    pub last_modified: DateTime<Utc>,
    #[serde(rename = "size")]
    pub size_bytes: u64,
}

impl Entry {
    pub fn project(
        name: impl Into<String>,
        location: impl Into<String>,
        has_documentation: bool,
        last_modified: DateTime<Utc>,
        size_bytes: u64,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            category: Category::Project,
            has_documentation,
            last_modified,
            size_bytes,
        }
    }

    pub fn config(
        name: impl Into<String>,
        location: impl Into<String>,
        last_modified: DateTime<Utc>,
        size_bytes: u64,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            category: Category::Config,
            has_documentation: false,
            last_modified,
            size_bytes,
        }
    }
}

/// Classification of an [`Entry`].
///
/// `Memory` is part of the UI contract but no scan produces it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Project,
    Config,
    Memory,
}

/// Immutable, newest-first inventory of one workspace root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub entries: Vec<Entry>,
    #[serde(with = "timestamp")]
    pub generated_at: DateTime<Utc>,
    pub root_path: PathBuf,
}

impl Snapshot {
    pub fn projects(&self) -> impl Iterator<Item = &Entry> {
        self.entries
            .iter()
            .filter(|e| e.category == Category::Project)
    }

    pub fn configs(&self) -> impl Iterator<Item = &Entry> {
        self.entries
            .iter()
            .filter(|e| e.category == Category::Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn entry_serializes_with_dashboard_field_names() {
        let modified = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let entry = Entry::project("alpha", "/ws/alpha", true, modified, 4096);

        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "name": "alpha",
                "path": "/ws/alpha",
                "type": "project",
                "hasReadme": true,
                "lastModified": "2024-01-02T00:00:00.000Z",
                "size": 4096,
            })
        );
    }

    #[test]
    fn config_entries_never_carry_documentation() {
        let modified = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
        let entry = Entry::config("AGENTS.md", "/ws/AGENTS.md", modified, 300);
        assert_eq!(entry.category, Category::Config);
        assert!(!entry.has_documentation);
    }

    #[test]
    fn memory_category_parses_from_the_wire() {
        let category: Category = serde_json::from_str("\"memory\"").unwrap();
        assert_eq!(category, Category::Memory);
        assert_eq!(serde_json::to_value(category).unwrap(), "memory");
    }
}
