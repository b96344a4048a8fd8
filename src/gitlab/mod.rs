pub mod client;

pub use client::{CurrentUser, GitlabClient, Issue, Milestone, Project};
