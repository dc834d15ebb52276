//! Data shapes shared by the snapshot builder, the resolvers and the HTTP layer.
//!
//! # Core Concepts
//!
//! - [`Entry`]: one top-level workspace item, either a project directory or a
//!   recognized config file. Field names on the wire follow the dashboard UI
//!   contract (`path`, `type`, `hasReadme`, `lastModified`, `size`).
//! - [`Snapshot`]: an immutable, newest-first inventory of one workspace root.
//! - [`PersistedSnapshot`]: the on-disk form written by `wsdash generate`.
//! - [`Session`]: chat-agent session metadata passed through from the remote
//!   session service untouched.
//! - [`ProjectsResponse`] / [`SessionsResponse`]: resolution envelopes tagged
//!   with their [`Origin`].

mod entry;
mod persisted;
mod resolution;
mod session;
mod timestamp;

pub use entry::*;
pub use persisted::*;
pub use resolution::*;
pub use session::*;
