use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_superuser: bool,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::gitlab_api::Entity")]
    GitlabApis,

    #[sea_orm(has_many = "super::calendar_configuration::Entity")]
    CalendarConfigurations,
}

impl Related<super::gitlab_api::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GitlabApis.def()
    }
}

impl Related<super::calendar_configuration::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CalendarConfigurations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
