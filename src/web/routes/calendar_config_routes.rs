use axum::{
    Json, Router,
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::services::{calendar_config_service, gitlab_api_service};
use crate::db::services::calendar_config_service::{CalendarConfigUpdate, NewCalendarConfig};
use crate::web::models::{AuthenticatedUser, CalendarConfigResponse};
use crate::web::{AppState, error::AppError};

const EMPTY_FILTER_MESSAGE: &str = "Please provide an entry for at least one project/group";

// --- Request Structs ---

#[derive(Deserialize)]
pub struct CalendarConfigRequest {
    config_name: String,
    api_id: i32,
    #[serde(default)]
    projects: String,
    #[serde(default)]
    groups: String,
    #[serde(default)]
    only_issues: bool,
    #[serde(default)]
    only_milestones: bool,
    #[serde(default)]
    combined: bool,
    #[serde(default)]
    reminder: f64,
}

fn validate_request(req: &CalendarConfigRequest) -> Result<(), AppError> {
    if req.config_name.trim().is_empty() {
        return Err(AppError::InvalidInput("config_name must not be empty".to_string()));
    }
    // The name becomes the artifact file name under the read-token
    // directory; anything the retrieval gate would refuse is rejected here.
    if req.config_name.contains('/')
        || req.config_name.contains('\\')
        || req.config_name.contains("..")
    {
        return Err(AppError::InvalidInput(
            "config_name must not contain path separators".to_string(),
        ));
    }
    if req.projects.trim().is_empty() && req.groups.trim().is_empty() {
        return Err(AppError::ValidationFailed(vec![
            ("projects", EMPTY_FILTER_MESSAGE.to_string()),
            ("groups", EMPTY_FILTER_MESSAGE.to_string()),
        ]));
    }
    Ok(())
}

/// The referenced API must exist and belong to the requester; the form
/// equivalent only offered the user's own APIs in the dropdown.
async fn check_api_ownership(
    app_state: &AppState,
    user: &AuthenticatedUser,
    api_id: i32,
) -> Result<(), AppError> {
    let api = gitlab_api_service::find_by_id(&app_state.db_pool, api_id)
        .await?
        .ok_or_else(|| AppError::InvalidInput("Unknown api_id".to_string()))?;
    if !user.can_access(api.user_id) {
        return Err(AppError::Forbidden(
            "The selected GitLab API belongs to another user".to_string(),
        ));
    }
    Ok(())
}

// --- Route Handlers ---

async fn create_config_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CalendarConfigRequest>,
) -> Result<(StatusCode, Json<CalendarConfigResponse>), AppError> {
    validate_request(&payload)?;
    check_api_ownership(&app_state, &authenticated_user, payload.api_id).await?;

    let config = calendar_config_service::create_config(
        &app_state.db_pool,
        NewCalendarConfig {
            user_id: authenticated_user.id,
            api_id: payload.api_id,
            config_name: &payload.config_name,
            projects: &payload.projects,
            groups: &payload.groups,
            only_issues: payload.only_issues,
            only_milestones: payload.only_milestones,
            combined: payload.combined,
            reminder: payload.reminder,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(config.into())))
}

async fn list_configs_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<CalendarConfigResponse>>, AppError> {
    let configs = if authenticated_user.is_superuser {
        calendar_config_service::find_all(&app_state.db_pool).await?
    } else {
        calendar_config_service::find_by_owner(&app_state.db_pool, authenticated_user.id).await?
    };
    Ok(Json(configs.into_iter().map(Into::into).collect()))
}

async fn get_config_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(config_id): Path<i32>,
) -> Result<Json<CalendarConfigResponse>, AppError> {
    let config = calendar_config_service::find_by_id(&app_state.db_pool, config_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Calendar configuration not found".to_string()))?;
    if !authenticated_user.can_access(config.user_id) {
        return Err(AppError::Forbidden("Permission denied".to_string()));
    }
    Ok(Json(config.into()))
}

async fn update_config_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(config_id): Path<i32>,
    Json(payload): Json<CalendarConfigRequest>,
) -> Result<Json<CalendarConfigResponse>, AppError> {
    let config = calendar_config_service::find_by_id(&app_state.db_pool, config_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Calendar configuration not found".to_string()))?;
    if !authenticated_user.can_access(config.user_id) {
        return Err(AppError::Forbidden("Permission denied".to_string()));
    }
    validate_request(&payload)?;
    check_api_ownership(&app_state, &authenticated_user, payload.api_id).await?;

    let updated = calendar_config_service::update_config(
        &app_state.db_pool,
        config,
        CalendarConfigUpdate {
            api_id: payload.api_id,
            config_name: &payload.config_name,
            projects: &payload.projects,
            groups: &payload.groups,
            only_issues: payload.only_issues,
            only_milestones: payload.only_milestones,
            combined: payload.combined,
            reminder: payload.reminder,
        },
    )
    .await?;

    Ok(Json(updated.into()))
}

async fn delete_config_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(config_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let config = calendar_config_service::find_by_id(&app_state.db_pool, config_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Calendar configuration not found".to_string()))?;
    if !authenticated_user.can_access(config.user_id) {
        return Err(AppError::Forbidden("Permission denied".to_string()));
    }
    calendar_config_service::delete_config(&app_state.db_pool, config.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_calendar_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_configs_handler).post(create_config_handler))
        .route(
            "/{id}",
            get(get_config_handler)
                .put(update_config_handler)
                .delete(delete_config_handler),
        )
}
