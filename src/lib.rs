//! Backend for a password-gated workspace dashboard.
//!
//! The service answers two questions for the dashboard UI: which projects and
//! config files live in the workspace, and which chat-agent sessions are
//! active. Both answers come either from a persisted snapshot written by
//! `wsdash generate` or from a live computation.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod resolver;
pub mod sessions;
pub mod snapshot;

pub use error::{Error, Result};
