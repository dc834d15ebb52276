use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::error::Error;
use crate::models::*;
use crate::resolver;

// ============================================================
// Error Handling
// ============================================================

/// The one resolution failure the dashboard surfaces: the workspace itself
/// could not be scanned. The message is passed through so the UI can show it.
fn workspace_error(e: Error) -> (StatusCode, Json<ProjectsErrorResponse>) {
    tracing::error!("Project resolution failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ProjectsErrorResponse {
            error: e.to_string(),
            projects: vec![],
        }),
    )
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Inventory
// ============================================================

pub async fn resolve_projects(
    State(state): State<AppState>,
) -> Result<Json<ProjectsResponse>, (StatusCode, Json<ProjectsErrorResponse>)> {
    resolver::resolve_projects(&state.config)
        .await
        .map(|resolution| Json(resolution.into()))
        .map_err(workspace_error)
}

/// Always 200: sessions are enrichment, a dead session service only adds a note.
pub async fn resolve_sessions(State(state): State<AppState>) -> Json<SessionsResponse> {
    Json(resolver::resolve_sessions(&state.config, &state.sessions).await.into())
}

// ============================================================
// Auth
// ============================================================

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    input: Result<Json<LoginInput>, JsonRejection>,
) -> Response {
    let Ok(Json(input)) = input else {
        return error_body(StatusCode::BAD_REQUEST, "Invalid request");
    };

    if !state.auth.is_enabled() || state.auth.password_matches(&input.password) {
        tracing::info!("Dashboard login succeeded");
        return (
            [(header::SET_COOKIE, state.auth.login_cookie())],
            Json(serde_json::json!({ "success": true })),
        )
            .into_response();
    }

    tracing::warn!("Dashboard login rejected");
    error_body(StatusCode::UNAUTHORIZED, "Invalid password")
}

pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, state.auth.logout_cookie())],
        Json(serde_json::json!({ "success": true })),
    )
}
