pub mod calendar;
pub mod db;
pub mod gitlab;
pub mod server;
pub mod services;
pub mod web;
