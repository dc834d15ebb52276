//! Process-wide configuration, built once at start-up.
//!
//! Everything the builder and the resolvers need (workspace root, the fixed
//! name lists, snapshot location, session endpoint) lives here so the two
//! read paths can never disagree about a default.

use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_SESSION_SERVICE_URL: &str = "http://localhost:8024";
const DEFAULT_SESSION_LIMIT: u32 = 50;
const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 10;
const SNAPSHOT_FILE: &str = "workspace.json";

/// Top-level files surfaced as standalone config entries.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    "AGENTS.md",
    "SOUL.md",
    "USER.md",
    "MEMORY.md",
    "TOOLS.md",
    "HEARTBEAT.md",
    "IDENTITY.md",
];

/// Top-level names never emitted.
pub const SKIP_NAMES: &[&str] = &[
    ".git",
    "node_modules",
    ".next",
    "security",
    "secrets",
    "backups",
    ".vercel",
];

/// Names pruned while summing a project's size. Deliberately narrower than
/// [`SKIP_NAMES`]; the two lists are tuned independently.
pub const SIZE_EXCLUSIONS: &[&str] = &[".git", "node_modules"];

pub const DOCUMENTATION_MARKERS: &[&str] = &["README.md", "PLAN.md"];
pub const MANIFEST_MARKERS: &[&str] = &["package.json"];

/// The only dot-prefixed top-level name that reaches the skip-list check.
pub const VCS_DIR_NAME: &str = ".git";

/// Name lists that drive classification and sizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRules {
    pub config_file_names: Vec<String>,
    pub skip_names: Vec<String>,
    pub size_exclusions: Vec<String>,
    pub documentation_markers: Vec<String>,
    pub manifest_markers: Vec<String>,
}

impl ScanRules {
    pub fn is_config_file(&self, name: &str) -> bool {
        self.config_file_names.iter().any(|n| n == name)
    }

    pub fn is_skipped(&self, name: &str) -> bool {
        self.skip_names.iter().any(|n| n == name)
    }

    pub fn is_size_excluded(&self, name: &str) -> bool {
        self.size_exclusions.iter().any(|n| n == name)
    }

    /// Marker files whose presence as a direct child flags a project as documented.
    pub fn markers(&self) -> impl Iterator<Item = &str> {
        self.documentation_markers
            .iter()
            .chain(self.manifest_markers.iter())
            .map(String::as_str)
    }
}

impl Default for ScanRules {
    fn default() -> Self {
        fn owned(names: &[&str]) -> Vec<String> {
            names.iter().map(|s| s.to_string()).collect()
        }

        Self {
            config_file_names: owned(CONFIG_FILE_NAMES),
            skip_names: owned(SKIP_NAMES),
            size_exclusions: owned(SIZE_EXCLUSIONS),
            documentation_markers: owned(DOCUMENTATION_MARKERS),
            manifest_markers: owned(MANIFEST_MARKERS),
        }
    }
}

/// Where the remote session-listing service lives and how hard to try.
#[derive(Debug, Clone)]
pub struct SessionServiceConfig {
    /// Base URL without the `/api/sessions` suffix.
    pub base_url: String,
    pub token: Option<String>,
    pub limit: u32,
    /// Ceiling for the single attempt; there are no retries.
    pub timeout: Duration,
}

impl Default for SessionServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SESSION_SERVICE_URL.to_string(),
            token: None,
            limit: DEFAULT_SESSION_LIMIT,
            timeout: Duration::from_secs(DEFAULT_SESSION_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub workspace_root: PathBuf,
    pub snapshot_path: PathBuf,
    pub rules: ScanRules,
    pub sessions: SessionServiceConfig,
}

impl DashboardConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let workspace_root = std::env::var_os("WORKSPACE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_workspace_root);

        let snapshot_path = std::env::var_os("DASHBOARD_SNAPSHOT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_snapshot_path);

        let timeout = std::env::var("SESSION_SERVICE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_SESSION_TIMEOUT_SECS));

        let sessions = SessionServiceConfig {
            base_url: std::env::var("SESSION_SERVICE_URL")
                .unwrap_or_else(|_| DEFAULT_SESSION_SERVICE_URL.to_string()),
            token: std::env::var("SESSION_SERVICE_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            limit: DEFAULT_SESSION_LIMIT,
            timeout,
        };

        Self {
            workspace_root,
            snapshot_path,
            rules: ScanRules::default(),
            sessions,
        }
    }

    /// Configuration rooted at `workspace_root` with every other value defaulted.
    /// Used by tests and by the CLI when flags override the environment.
    pub fn for_workspace(
        workspace_root: impl Into<PathBuf>,
        snapshot_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            snapshot_path: snapshot_path.into(),
            rules: ScanRules::default(),
            sessions: SessionServiceConfig::default(),
        }
    }

    pub fn with_workspace_root(mut self, root: Option<&Path>) -> Self {
        if let Some(root) = root {
            self.workspace_root = root.to_path_buf();
        }
        self
    }

    pub fn with_snapshot_path(mut self, path: Option<&Path>) -> Self {
        if let Some(path) = path {
            self.snapshot_path = path.to_path_buf();
        }
        self
    }

    pub fn with_session_service(mut self, sessions: SessionServiceConfig) -> Self {
        self.sessions = sessions;
        self
    }
}

fn default_workspace_root() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("workspace"))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_snapshot_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "workspace-dash")
        .map(|dirs| dirs.data_dir().join(SNAPSHOT_FILE))
        .unwrap_or_else(|| PathBuf::from("data").join(SNAPSHOT_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_list_and_size_exclusions_stay_distinct() {
        let rules = ScanRules::default();
        assert!(rules.is_skipped("backups"));
        assert!(!rules.is_size_excluded("backups"));
        assert!(rules.is_size_excluded("node_modules"));
        assert!(rules.is_skipped("node_modules"));
    }

    #[test]
    fn markers_cover_documentation_and_manifest_files() {
        let rules = ScanRules::default();
        let markers: Vec<&str> = rules.markers().collect();
        assert_eq!(markers, vec!["README.md", "PLAN.md", "package.json"]);
    }

    #[test]
    fn config_files_are_matched_exactly() {
        let rules = ScanRules::default();
        assert!(rules.is_config_file("AGENTS.md"));
        assert!(!rules.is_config_file("agents.md"));
        assert!(!rules.is_config_file("README.md"));
    }

    #[test]
    fn snapshot_path_ends_with_workspace_json() {
        assert!(default_snapshot_path().ends_with(SNAPSHOT_FILE));
    }
}
