use sea_orm::DatabaseConnection;
use std::path::Path;
use tracing::{error, info, warn};

use crate::calendar::{CalendarGenerator, GenerationError, GenerationRequest};
use crate::db::entities::calendar_configuration;
use crate::db::services::{calendar_config_service, gitlab_api_service};
use crate::server::config::ServerConfig;
use crate::services::encryption_service;
use crate::web::error::AppError;

/// Runs one generation pass for a configuration: resolve and decrypt the
/// credential, hand everything to the generator collaborator, persist the
/// artifact under `{media_root}/{read_token}/`, then flip `generated`.
///
/// The file is written to a dot-prefixed temp name and renamed into place
/// so the retrieval gate never serves a half-written calendar. There is
/// deliberately no lock across concurrent triggers; the last writer wins.
pub async fn run_generation(
    db: &DatabaseConnection,
    generator: &dyn CalendarGenerator,
    config: &ServerConfig,
    cal: calendar_configuration::Model,
) -> Result<calendar_configuration::Model, AppError> {
    let api = gitlab_api_service::find_by_id(db, cal.api_id)
        .await?
        .ok_or_else(|| {
            AppError::InternalServerError("Configuration references a missing API".to_string())
        })?;

    let token = encryption_service::decrypt(&api.token_encrypted, &config.token_encryption_key)
        .map_err(AppError::InternalServerError)?;

    let request = GenerationRequest {
        endpoint: api.url.clone(),
        token,
        calendar_name: cal.config_name.clone(),
        only_issues: cal.only_issues,
        only_milestones: cal.only_milestones,
        reminder_hours: cal.reminder,
        project_ids: cal.project_id_list(),
        group_ids: cal.group_id_list(),
    };

    let bytes = generator.generate(&request).await.map_err(|e| match e {
        GenerationError::AuthFailed(msg) => {
            warn!(config_id = cal.id, error = %msg, "GitLab authentication failed");
            AppError::GenerationFailed(msg)
        }
        other => AppError::InternalServerError(other.to_string()),
    })?;

    let dir = Path::new(&config.media_root).join(cal.read_token.to_string());
    tokio::fs::create_dir_all(&dir).await?;

    let file_name = cal.ics_file_name();
    let tmp_path = dir.join(format!(".{file_name}.tmp"));
    let final_path = dir.join(&file_name);
    tokio::fs::write(&tmp_path, &bytes).await?;
    tokio::fs::rename(&tmp_path, &final_path).await?;

    let updated = calendar_config_service::mark_generated(db, cal).await?;
    info!(
        config_id = updated.id,
        path = %final_path.display(),
        bytes = bytes.len(),
        "calendar generated"
    );
    Ok(updated)
}

#[derive(Debug, Default)]
pub struct UpdateAllSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Regenerates every stored configuration, for the operator update pass.
/// A failing configuration is logged and counted; the pass never aborts
/// because one credential went stale.
pub async fn run_all(
    db: &DatabaseConnection,
    generator: &dyn CalendarGenerator,
    config: &ServerConfig,
) -> Result<UpdateAllSummary, AppError> {
    let configs = calendar_config_service::find_all(db).await?;
    let mut summary = UpdateAllSummary::default();
    for cal in configs {
        let config_id = cal.id;
        let config_name = cal.config_name.clone();
        match run_generation(db, generator, config, cal).await {
            Ok(_) => summary.succeeded += 1,
            Err(e) => {
                error!(config_id, config_name = %config_name, error = %e, "regeneration failed");
                summary.failed += 1;
            }
        }
    }
    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "calendar update pass finished"
    );
    Ok(summary)
}
