use axum::{
    Json, Router,
    extract::State,
    http::Method,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::calendar::CalendarGenerator;
use crate::server::config::ServerConfig;
use crate::services::auth_service;
use crate::web::{
    error::AppError,
    middleware::auth,
    models::{LoginRequest, RegisterRequest},
    routes::{calendar_config_routes, gitlab_api_routes, ics_routes},
};

pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DatabaseConnection,
    pub generator: Arc<dyn CalendarGenerator>,
    pub config: Arc<ServerConfig>,
}

async fn register_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<models::UserResponse>, AppError> {
    let user_response = auth_service::register_user(&app_state.db_pool, payload).await?;
    Ok(Json(user_response))
}

async fn login_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let login_response =
        auth_service::login_user(&app_state.db_pool, payload, &app_state.config.jwt_secret).await?;

    let auth_cookie = Cookie::build(("token", login_response.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(true)
        .build();

    let mut response = Json(login_response).into_response();
    response.headers_mut().insert(
        axum::http::header::SET_COOKIE,
        auth_cookie
            .to_string()
            .parse()
            .map_err(|e| AppError::InternalServerError(format!("Invalid cookie header: {e}")))?,
    );

    Ok(response)
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_axum_router(
    db_pool: DatabaseConnection,
    generator: Arc<dyn CalendarGenerator>,
    config: Arc<ServerConfig>,
) -> Router {
    let app_state = Arc::new(AppState {
        db_pool,
        generator,
        config,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check_handler))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route(
            "/api/auth/me",
            get(auth_service::me).route_layer(axum_middleware::from_fn_with_state(
                app_state.clone(),
                auth::auth,
            )),
        )
        .nest(
            "/api/gitlabapis",
            gitlab_api_routes::create_gitlab_api_router().route_layer(
                axum_middleware::from_fn_with_state(app_state.clone(), auth::auth),
            ),
        )
        .nest(
            "/api/calendars",
            calendar_config_routes::create_calendar_router().route_layer(
                axum_middleware::from_fn_with_state(app_state.clone(), auth::auth),
            ),
        )
        // Token-gated, deliberately outside the auth middleware
        .nest("/ics", ics_routes::create_ics_router())
        .with_state(app_state.clone())
        .layer(cors)
}
