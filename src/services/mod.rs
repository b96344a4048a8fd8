pub mod auth_service;
pub mod encryption_service;
pub mod generation_service;
