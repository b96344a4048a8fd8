use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::calendar::GenerationError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimal GitLab v4 REST client: just enough to verify a token and pull
/// the issues and milestones the calendar needs. Authenticates with the
/// `PRIVATE-TOKEN` header on every request.
pub struct GitlabClient {
    http: Client,
    base: Url,
    token: String,
}

#[derive(Debug, Deserialize)]
pub struct CurrentUser {
    pub id: u64,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub web_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Milestone {
    pub title: String,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub web_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Project {
    pub id: u64,
}

impl GitlabClient {
    pub fn new(endpoint: &str, token: &str) -> Result<Self, GenerationError> {
        let mut base =
            Url::parse(endpoint).map_err(|e| GenerationError::InvalidEndpoint(e.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base,
            token: token.to_string(),
        })
    }

    fn api_url(&self, path: &str) -> Result<Url, GenerationError> {
        self.base
            .join(&format!("api/v4/{path}"))
            .map_err(|e| GenerationError::InvalidEndpoint(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GenerationError> {
        let url = self.api_url(path)?;
        debug!(url = %url, "querying GitLab API");
        let response = self
            .http
            .get(url.clone())
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(GenerationError::AuthFailed(format!(
                "GitLab rejected the access token ({status})"
            )));
        }
        if !status.is_success() {
            return Err(GenerationError::Api(format!(
                "{} returned {status}",
                url.path()
            )));
        }
        Ok(response.json::<T>().await?)
    }

    /// Verifies the token against `/user`, mirroring `gitlab.Gitlab.auth()`.
    pub async fn auth(&self) -> Result<CurrentUser, GenerationError> {
        self.get_json("user").await
    }

    pub async fn project_issues(&self, project_id: u64) -> Result<Vec<Issue>, GenerationError> {
        self.get_json(&format!(
            "projects/{project_id}/issues?state=opened&per_page=100"
        ))
        .await
    }

    pub async fn project_milestones(
        &self,
        project_id: u64,
    ) -> Result<Vec<Milestone>, GenerationError> {
        self.get_json(&format!(
            "projects/{project_id}/milestones?state=active&per_page=100"
        ))
        .await
    }

    pub async fn group_issues(&self, group_id: u64) -> Result<Vec<Issue>, GenerationError> {
        self.get_json(&format!(
            "groups/{group_id}/issues?state=opened&per_page=100"
        ))
        .await
    }

    pub async fn group_milestones(&self, group_id: u64) -> Result<Vec<Milestone>, GenerationError> {
        self.get_json(&format!(
            "groups/{group_id}/milestones?state=active&per_page=100"
        ))
        .await
    }

    /// Projects the token has membership access to; used when no explicit
    /// project or group ids are configured.
    pub async fn membership_projects(&self) -> Result<Vec<Project>, GenerationError> {
        self.get_json("projects?membership=true&per_page=100").await
    }
}
