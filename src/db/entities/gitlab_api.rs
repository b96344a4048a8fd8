use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A GitLab endpoint plus access token registered by one user.
/// `token_encrypted` holds the AES-GCM ciphertext of the private token;
/// the plaintext only exists transiently on the generation path.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gitlab_apis")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub api_name: String,
    pub url: String,
    #[serde(skip_serializing)]
    pub token_encrypted: String,
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

    #[sea_orm(has_many = "super::calendar_configuration::Entity")]
    CalendarConfigurations,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::calendar_configuration::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CalendarConfigurations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
