use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::services::calendar_config_service;
use crate::services::generation_service;
use crate::web::{AppState, error::AppError};

/// Generation trigger. The write token is the only credential; no session
/// is required. An unknown token answers 400, same as an authentication
/// failure against GitLab (source behavior, kept deliberately).
async fn generate_handler(
    State(app_state): State<Arc<AppState>>,
    Path(write_token): Path<Uuid>,
) -> Result<Response, AppError> {
    let config = calendar_config_service::find_by_write_token(&app_state.db_pool, write_token)
        .await?
        .ok_or_else(|| {
            AppError::GenerationFailed("Unknown or invalid generation token".to_string())
        })?;

    let updated = generation_service::run_generation(
        &app_state.db_pool,
        app_state.generator.as_ref(),
        &app_state.config,
        config,
    )
    .await?;

    let location = format!("/api/calendars/{}", updated.id);
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

/// Retrieval gate. Holding the read token is the capability; the file is
/// streamed verbatim. Only plain file names are accepted so the token
/// cannot be combined with path traversal.
async fn show_handler(
    State(app_state): State<Arc<AppState>>,
    Path((read_token, file_name)): Path<(Uuid, String)>,
) -> Result<Response, AppError> {
    if file_name.contains('/') || file_name.contains('\\') || file_name.contains("..") {
        return Err(AppError::NotFound("File not found".to_string()));
    }

    let path = std::path::Path::new(&app_state.config.media_root)
        .join(read_token.to_string())
        .join(&file_name);

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| AppError::NotFound("File not found".to_string()))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/calendar; charset=utf-8")],
        bytes,
    )
        .into_response())
}

pub fn create_ics_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate/{write_token}", get(generate_handler))
        .route("/show/{read_token}/{file_name}", get(show_handler))
}
