use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{timestamp, Entry, Session};

/// Where a resolved payload came from. Serialized as the dashboard's
/// `source` tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Origin {
    /// Read from the persisted snapshot file.
    #[serde(rename = "static")]
    Persisted,
    /// Computed from the filesystem or fetched from the session service.
    #[serde(rename = "live")]
    Live,
    /// The live source failed softly; the payload is empty.
    #[serde(rename = "fallback")]
    Unavailable,
}

/// Body of `GET /projects-resolution`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsResponse {
    pub projects: Vec<Entry>,
    pub workspace: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub generated_at: Option<DateTime<Utc>>,
    pub source: Origin,
}

/// Body of `GET /sessions-resolution`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionsResponse {
    pub sessions: Vec<Session>,
    pub count: usize,
    pub source: Origin,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Body returned with a server error when the workspace cannot be scanned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectsErrorResponse {
    pub error: String,
    pub projects: Vec<Entry>,
}
