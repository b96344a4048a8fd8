pub mod calendar_config_service;
pub mod gitlab_api_service;
pub mod user_service;
