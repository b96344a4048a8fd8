use axum::{Extension, extract::State};
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::db::entities::user;
use crate::db::services::user_service;
use crate::web::AppState;
use crate::web::error::AppError;
use crate::web::models::{
    AuthenticatedUser, Claims, LoginRequest, LoginResponse, RegisterRequest, UserResponse,
};

pub async fn register_user(
    db: &DatabaseConnection,
    req: RegisterRequest,
) -> Result<UserResponse, AppError> {
    if req.username.is_empty() || req.password.len() < 8 {
        return Err(AppError::InvalidInput(
            "Username must not be empty and the password needs at least 8 characters.".to_string(),
        ));
    }

    let existing = user_service::find_by_username(db, &req.username)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to check username: {e}")))?;
    if existing.is_some() {
        return Err(AppError::UserAlreadyExists(
            "Username is already taken.".to_string(),
        ));
    }

    let password_hash = hash(&req.password, DEFAULT_COST)
        .map_err(|e| AppError::PasswordHashingError(format!("Password hashing failed: {e}")))?;

    let user_model = user_service::create_user(db, &req.username, &password_hash, false)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create user: {e}")))?;

    Ok(UserResponse {
        id: user_model.id,
        username: user_model.username,
        is_superuser: user_model.is_superuser,
    })
}

pub async fn login_user(
    db: &DatabaseConnection,
    req: LoginRequest,
    jwt_secret: &str,
) -> Result<LoginResponse, AppError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Username and password must not be empty.".to_string(),
        ));
    }

    let user = user_service::find_by_username(db, &req.username)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to look up user: {e}")))?
        .ok_or(AppError::UserNotFound)?;

    let valid_password = verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::InternalServerError(format!("Password verification failed: {e}")))?;

    if !valid_password {
        return Err(AppError::InvalidCredentials);
    }

    create_jwt_for_user(&user, jwt_secret)
}

pub fn create_jwt_for_user(user: &user::Model, jwt_secret: &str) -> Result<LoginResponse, AppError> {
    let now = Utc::now();
    // Token valid for 24 hours
    let expiration = (now + Duration::hours(24)).timestamp() as usize;

    let claims = Claims {
        sub: user.username.clone(),
        user_id: user.id,
        is_superuser: user.is_superuser,
        exp: expiration,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_ref()),
    )
    .map_err(|e| AppError::TokenCreationError(format!("Failed to create token: {e}")))?;

    Ok(LoginResponse {
        token,
        user_id: user.id,
        username: user.username.clone(),
    })
}

/// Answers from the database rather than the JWT claims, so a role change
/// is visible without re-login.
pub async fn me(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<axum::Json<UserResponse>, AppError> {
    let user = user_service::find_by_id(&app_state.db_pool, user.id)
        .await?
        .ok_or(AppError::UserNotFound)?;
    Ok(axum::Json(UserResponse {
        id: user.id,
        username: user.username,
        is_superuser: user.is_superuser,
    }))
}
