use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A named filter set bound to one GitLab API registration.
///
/// `projects` and `groups` are comma-separated id lists kept verbatim as
/// entered; parsing happens on read so a stray non-numeric entry never
/// blocks saving the rest. The two UUID tokens are minted once at creation
/// and are the only handles the ics endpoints accept: `write_token` may
/// trigger regeneration, `read_token` may fetch the generated file.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "calendar_configurations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub api_id: i32,
    pub config_name: String,
    pub projects: String,
    pub groups: String,
    pub only_issues: bool,
    pub only_milestones: bool,
    pub combined: bool,
    pub reminder: f64,
    #[sea_orm(unique)]
    pub read_token: Uuid,
    #[sea_orm(unique)]
    pub write_token: Uuid,
    pub generated: bool,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade",
        on_update = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::gitlab_api::Entity",
        from = "Column::ApiId",
        to = "super::gitlab_api::Column::Id",
        on_delete = "Cascade",
        on_update = "Cascade"
    )]
    GitlabApi,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::gitlab_api::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GitlabApi.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn project_id_list(&self) -> Vec<u64> {
        parse_id_list(&self.projects)
    }

    pub fn group_id_list(&self) -> Vec<u64> {
        parse_id_list(&self.groups)
    }

    /// File name of the generated artifact for this configuration.
    pub fn ics_file_name(&self) -> String {
        format!("{}.ics", self.config_name)
    }
}

/// Parses a comma-separated id list. Entries that are not positive
/// integers are dropped with a warning instead of failing the whole list.
pub fn parse_id_list(raw: &str) -> Vec<u64> {
    let mut ids = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match token.parse::<u64>() {
            Ok(id) => {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            Err(_) => {
                warn!(token, "dropping non-numeric entry from id list");
            }
        }
    }
    ids
}
