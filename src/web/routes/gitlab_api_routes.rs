use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use crate::db::entities::gitlab_api;
use crate::db::services::gitlab_api_service;
use crate::services::encryption_service;
use crate::web::models::{AuthenticatedUser, GitlabApiResponse};
use crate::web::{AppState, error::AppError};

// --- Request Structs ---

#[derive(Deserialize)]
pub struct CreateGitlabApiRequest {
    api_name: String,
    url: String,
    token: String,
}

#[derive(Deserialize)]
pub struct UpdateGitlabApiRequest {
    api_name: String,
    url: String,
    /// Omitting the field keeps the stored token.
    token: Option<String>,
}

fn validate_fields(api_name: &str, url: &str) -> Result<(), AppError> {
    if api_name.trim().is_empty() {
        return Err(AppError::InvalidInput("api_name must not be empty".to_string()));
    }
    Url::parse(url)
        .map_err(|e| AppError::InvalidInput(format!("url is not a valid URL: {e}")))?;
    Ok(())
}

/// Shows only the tail of the token, e.g. `…sa0x`.
fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("…{tail}")
}

fn to_response(api: gitlab_api::Model, key_hex: &str) -> Result<GitlabApiResponse, AppError> {
    let token =
        encryption_service::decrypt(&api.token_encrypted, key_hex).map_err(AppError::InternalServerError)?;
    Ok(GitlabApiResponse {
        id: api.id,
        user_id: api.user_id,
        api_name: api.api_name,
        url: api.url,
        token_preview: mask_token(&token),
    })
}

// --- Route Handlers ---

async fn create_api_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateGitlabApiRequest>,
) -> Result<(StatusCode, Json<GitlabApiResponse>), AppError> {
    validate_fields(&payload.api_name, &payload.url)?;
    if payload.token.trim().is_empty() {
        return Err(AppError::InvalidInput("token must not be empty".to_string()));
    }

    let key_hex = &app_state.config.token_encryption_key;
    let token_encrypted =
        encryption_service::encrypt(&payload.token, key_hex).map_err(AppError::InternalServerError)?;

    let api = gitlab_api_service::create_api(
        &app_state.db_pool,
        authenticated_user.id,
        &payload.api_name,
        &payload.url,
        &token_encrypted,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(to_response(api, key_hex)?)))
}

async fn list_apis_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<GitlabApiResponse>>, AppError> {
    // Superusers see everything; everyone else is filtered server-side.
    let apis = if authenticated_user.is_superuser {
        gitlab_api_service::find_all(&app_state.db_pool).await?
    } else {
        gitlab_api_service::find_by_owner(&app_state.db_pool, authenticated_user.id).await?
    };

    let key_hex = &app_state.config.token_encryption_key;
    let mut responses = Vec::with_capacity(apis.len());
    for api in apis {
        responses.push(to_response(api, key_hex)?);
    }
    Ok(Json(responses))
}

async fn get_api_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(api_id): Path<i32>,
) -> Result<Json<GitlabApiResponse>, AppError> {
    let api = gitlab_api_service::find_by_id(&app_state.db_pool, api_id)
        .await?
        .ok_or_else(|| AppError::NotFound("GitLab API not found".to_string()))?;
    if !authenticated_user.can_access(api.user_id) {
        return Err(AppError::Forbidden("Permission denied".to_string()));
    }
    Ok(Json(to_response(api, &app_state.config.token_encryption_key)?))
}

async fn update_api_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(api_id): Path<i32>,
    Json(payload): Json<UpdateGitlabApiRequest>,
) -> Result<Json<GitlabApiResponse>, AppError> {
    let api = gitlab_api_service::find_by_id(&app_state.db_pool, api_id)
        .await?
        .ok_or_else(|| AppError::NotFound("GitLab API not found".to_string()))?;
    if !authenticated_user.can_access(api.user_id) {
        return Err(AppError::Forbidden("Permission denied".to_string()));
    }
    validate_fields(&payload.api_name, &payload.url)?;

    let key_hex = &app_state.config.token_encryption_key;
    let token_encrypted = match payload.token.as_deref() {
        Some(token) if !token.trim().is_empty() => {
            Some(encryption_service::encrypt(token, key_hex).map_err(AppError::InternalServerError)?)
        }
        _ => None,
    };

    let updated = gitlab_api_service::update_api(
        &app_state.db_pool,
        api,
        &payload.api_name,
        &payload.url,
        token_encrypted.as_deref(),
    )
    .await?;

    Ok(Json(to_response(updated, key_hex)?))
}

async fn delete_api_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(api_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let api = gitlab_api_service::find_by_id(&app_state.db_pool, api_id)
        .await?
        .ok_or_else(|| AppError::NotFound("GitLab API not found".to_string()))?;
    if !authenticated_user.can_access(api.user_id) {
        return Err(AppError::Forbidden("Permission denied".to_string()));
    }
    // Cascades to dependent calendar configurations
    gitlab_api_service::delete_api(&app_state.db_pool, api.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_gitlab_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_apis_handler).post(create_api_handler))
        .route(
            "/{id}",
            get(get_api_handler)
                .put(update_api_handler)
                .delete(delete_api_handler),
        )
}

#[cfg(test)]
mod tests {
    use super::mask_token;

    #[test]
    fn test_mask_token_keeps_only_tail() {
        assert_eq!(mask_token("DhvrWaxnZ3S3bV1C7_sa"), "…7_sa");
        assert_eq!(mask_token("abc"), "****");
    }
}
