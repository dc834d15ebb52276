//! HTTP client for the remote session-listing service.
//!
//! Configuration comes from [`SessionServiceConfig`]:
//! - `SESSION_SERVICE_URL` - Base URL (default: `http://localhost:8024`)
//! - `SESSION_SERVICE_TOKEN` - Bearer token (optional)
//! - `SESSION_SERVICE_TIMEOUT_SECS` - Request timeout (default: 10)

use reqwest::{Client, StatusCode};
use thiserror::Error;

use super::Fetched;
use crate::config::SessionServiceConfig;
use crate::models::{Session, SessionList};

/// Session service errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized: session service token missing or invalid")]
    Unauthorized,

    #[error("Session service returned {0}")]
    Status(StatusCode),
}

/// HTTP client for the session service.
#[derive(Debug, Clone)]
pub struct SessionClient {
    base_url: String,
    token: Option<String>,
    limit: u32,
    client: Client,
}

impl SessionClient {
    pub fn new(config: &SessionServiceConfig) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            limit: config.limit,
            client,
        })
    }

    /// List session metadata. Message bodies are never requested.
    pub async fn list_sessions(&self) -> Result<Vec<Session>, ClientError> {
        let url = format!("{}/api/sessions", self.base_url);
        let mut req = self
            .client
            .get(&url)
            .query(&[("limit", self.limit.to_string()), ("messageLimit", "0".to_string())]);
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }

        let response = req.send().await?;
        let status = response.status();
        match status {
            s if s.is_success() => Ok(response.json::<SessionList>().await?.sessions),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::Unauthorized),
            _ => Err(ClientError::Status(status)),
        }
    }

    /// Single attempt, no retry. Any failure becomes [`Fetched::Degraded`].
    pub async fn fetch_sessions(&self) -> Fetched<Vec<Session>> {
        match self.list_sessions().await {
            Ok(sessions) => {
                tracing::debug!("Fetched {} sessions from {}", sessions.len(), self.base_url);
                Fetched::Ok(sessions)
            }
            Err(e) => {
                tracing::warn!("Session service unavailable: {}", e);
                Fetched::Degraded(format!("Could not reach the session service: {}", e))
            }
        }
    }
}
