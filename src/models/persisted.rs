use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{timestamp, Entry, Session, Snapshot};

/// On-disk snapshot written by `wsdash generate` and read by both resolvers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    pub projects: Vec<Entry>,
    /// Absent in files that predate session capture; readers then go live.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sessions: Option<Vec<Session>>,
    #[serde(with = "timestamp")]
    pub generated_at: DateTime<Utc>,
    pub workspace: String,
}

impl PersistedSnapshot {
    pub fn new(snapshot: Snapshot, sessions: Vec<Session>) -> Self {
        Self {
            workspace: snapshot.root_path.to_string_lossy().into_owned(),
            generated_at: snapshot.generated_at,
            projects: snapshot.entries,
            sessions: Some(sessions),
        }
    }
}
