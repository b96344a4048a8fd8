pub mod calendar_config_routes;
pub mod gitlab_api_routes;
pub mod ics_routes;
