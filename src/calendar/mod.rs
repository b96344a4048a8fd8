use async_trait::async_trait;
use thiserror::Error;

pub mod converter;

pub use converter::GitlabCalendarGenerator;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("GitLab authentication failed: {0}")]
    AuthFailed(String),
    #[error("GitLab API request failed: {0}")]
    Api(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Invalid API endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Everything the generator needs, resolved and decrypted by the caller.
/// Empty `project_ids` and `group_ids` together mean "all projects the
/// token has membership access to".
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub endpoint: String,
    pub token: String,
    pub calendar_name: String,
    pub only_issues: bool,
    pub only_milestones: bool,
    pub reminder_hours: f64,
    pub project_ids: Vec<u64>,
    pub group_ids: Vec<u64>,
}

/// Collaborator that turns a configuration into `.ics` bytes. The web
/// layer owns persistence; implementations only fetch and encode. Tests
/// substitute a stub so no network is involved.
#[async_trait]
pub trait CalendarGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<u8>, GenerationError>;
}
