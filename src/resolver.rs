//! Dual-source inventory resolution.
//!
//! Both read paths try the persisted snapshot first and fall through to a
//! live computation when it is absent or unusable. The policy lives in
//! [`resolve_with_fallback`]; the two public resolvers only supply the field
//! selector and the live source.

use std::convert::Infallible;
use std::future::Future;

use chrono::{DateTime, Utc};

use crate::config::DashboardConfig;
use crate::error::{Error, Result};
use crate::models::{
    Entry, Origin, PersistedSnapshot, ProjectsResponse, Session, SessionsResponse, Snapshot,
};
use crate::sessions::{Fetched, SessionClient};
use crate::snapshot::{self, SnapshotStore};

/// A payload tagged with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<T> {
    pub value: T,
    pub origin: Origin,
    /// Only set for persisted payloads.
    pub generated_at: Option<DateTime<Utc>>,
    /// Why a live source degraded.
    pub note: Option<String>,
}

/// Project entries plus the workspace they were scanned from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectInventory {
    pub entries: Vec<Entry>,
    pub workspace: String,
}

impl From<Snapshot> for ProjectInventory {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            workspace: snapshot.root_path.to_string_lossy().into_owned(),
            entries: snapshot.entries,
        }
    }
}

/// Serve `select(persisted)` when the snapshot file yields a value, otherwise
/// run `live` once.
///
/// A missing, unreadable or corrupt snapshot file is never an error here; only
/// the live source can fail, and a degraded live result becomes an empty
/// [`Origin::Unavailable`] payload carrying the reason.
pub async fn resolve_with_fallback<T, E, S, L, Fut>(
    store: &SnapshotStore,
    select: S,
    live: L,
) -> std::result::Result<Resolution<T>, E>
where
    T: Default,
    S: FnOnce(PersistedSnapshot) -> Option<T>,
    L: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<Fetched<T>, E>>,
{
    match store.load().await {
        Ok(Some(persisted)) => {
            let generated_at = persisted.generated_at;
            if let Some(value) = select(persisted) {
                return Ok(Resolution {
                    value,
                    origin: Origin::Persisted,
                    generated_at: Some(generated_at),
                    note: None,
                });
            }
            tracing::debug!(
                "Persisted snapshot at {} lacks the requested field",
                store.path().display()
            );
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("Ignoring persisted snapshot: {}", e),
    }

    let resolution = match live().await? {
        Fetched::Ok(value) => Resolution {
            value,
            origin: Origin::Live,
            generated_at: None,
            note: None,
        },
        Fetched::Degraded(reason) => Resolution {
            value: T::default(),
            origin: Origin::Unavailable,
            generated_at: None,
            note: Some(reason),
        },
    };
    Ok(resolution)
}

/// Project inventory, persisted or scanned live.
///
/// Fails with [`Error::WorkspaceUnreadable`] when the snapshot file is
/// unusable and the workspace root cannot be listed.
pub async fn resolve_projects(config: &DashboardConfig) -> Result<Resolution<ProjectInventory>> {
    let store = SnapshotStore::new(&config.snapshot_path);
    let root = config.workspace_root.clone();
    let rules = config.rules.clone();

    resolve_with_fallback(
        &store,
        |persisted| {
            Some(ProjectInventory {
                entries: persisted.projects,
                workspace: persisted.workspace,
            })
        },
        move || async move {
            let snapshot = tokio::task::spawn_blocking(move || snapshot::build(&root, &rules))
                .await
                .map_err(|e| Error::Task(e.to_string()))??;
            Ok::<_, Error>(Fetched::Ok(ProjectInventory::from(snapshot)))
        },
    )
    .await
}

/// Session list, persisted or fetched live. Never fails.
pub async fn resolve_sessions(
    config: &DashboardConfig,
    client: &SessionClient,
) -> Resolution<Vec<Session>> {
    let store = SnapshotStore::new(&config.snapshot_path);

    let resolved = resolve_with_fallback(
        &store,
        |persisted| persisted.sessions,
        move || async move { Ok::<_, Infallible>(client.fetch_sessions().await) },
    )
    .await;

    match resolved {
        Ok(resolution) => resolution,
        Err(never) => match never {},
    }
}

impl From<Resolution<ProjectInventory>> for ProjectsResponse {
    fn from(resolution: Resolution<ProjectInventory>) -> Self {
        Self {
            projects: resolution.value.entries,
            workspace: resolution.value.workspace,
            generated_at: resolution.generated_at,
            source: resolution.origin,
        }
    }
}

impl From<Resolution<Vec<Session>>> for SessionsResponse {
    fn from(resolution: Resolution<Vec<Session>>) -> Self {
        Self {
            count: resolution.value.len(),
            sessions: resolution.value,
            source: resolution.origin,
            generated_at: resolution.generated_at,
            note: resolution.note,
        }
    }
}
