use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub is_superuser: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i32,
    pub username: String,
}

// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user_id: i32,
    pub is_superuser: bool,
    pub exp: usize, // Expiration time (timestamp)
}

/// Authenticated user details, passed along as a request extension.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub username: String,
    pub is_superuser: bool,
}

impl AuthenticatedUser {
    /// Ownership gate: owners and superusers pass, everyone else is 403.
    pub fn can_access(&self, owner_id: i32) -> bool {
        self.is_superuser || self.id == owner_id
    }
}

#[derive(Debug, Serialize)]
pub struct GitlabApiResponse {
    pub id: i32,
    pub user_id: i32,
    pub api_name: String,
    pub url: String,
    /// Masked preview of the access token; the full value is never
    /// returned once stored.
    pub token_preview: String,
}

#[derive(Debug, Serialize)]
pub struct CalendarConfigResponse {
    pub id: i32,
    pub user_id: i32,
    pub api_id: i32,
    pub config_name: String,
    pub projects: String,
    pub groups: String,
    pub only_issues: bool,
    pub only_milestones: bool,
    pub combined: bool,
    pub reminder: f64,
    pub read_token: Uuid,
    pub write_token: Uuid,
    pub generated: bool,
}

impl From<crate::db::entities::calendar_configuration::Model> for CalendarConfigResponse {
    fn from(model: crate::db::entities::calendar_configuration::Model) -> Self {
        CalendarConfigResponse {
            id: model.id,
            user_id: model.user_id,
            api_id: model.api_id,
            config_name: model.config_name,
            projects: model.projects,
            groups: model.groups,
            only_issues: model.only_issues,
            only_milestones: model.only_milestones,
            combined: model.combined,
            reminder: model.reminder,
            read_token: model.read_token,
            write_token: model.write_token,
            generated: model.generated,
        }
    }
}
