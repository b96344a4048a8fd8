use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::db::entities::calendar_configuration;

pub struct NewCalendarConfig<'a> {
    pub user_id: i32,
    pub api_id: i32,
    pub config_name: &'a str,
    pub projects: &'a str,
    pub groups: &'a str,
    pub only_issues: bool,
    pub only_milestones: bool,
    pub combined: bool,
    pub reminder: f64,
}

pub struct CalendarConfigUpdate<'a> {
    pub api_id: i32,
    pub config_name: &'a str,
    pub projects: &'a str,
    pub groups: &'a str,
    pub only_issues: bool,
    pub only_milestones: bool,
    pub combined: bool,
    pub reminder: f64,
}

/// Inserts a configuration, minting the two capability tokens. The unique
/// indexes on both token columns back up the (astronomically unlikely)
/// collision case.
pub async fn create_config(
    db: &DatabaseConnection,
    new: NewCalendarConfig<'_>,
) -> Result<calendar_configuration::Model, DbErr> {
    let now = Utc::now();
    let model = calendar_configuration::ActiveModel {
        user_id: Set(new.user_id),
        api_id: Set(new.api_id),
        config_name: Set(new.config_name.to_string()),
        projects: Set(new.projects.to_string()),
        groups: Set(new.groups.to_string()),
        only_issues: Set(new.only_issues),
        only_milestones: Set(new.only_milestones),
        combined: Set(new.combined),
        reminder: Set(new.reminder),
        read_token: Set(Uuid::new_v4()),
        write_token: Set(Uuid::new_v4()),
        generated: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    model.insert(db).await
}

pub async fn find_by_id(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<calendar_configuration::Model>, DbErr> {
    calendar_configuration::Entity::find_by_id(id).one(db).await
}

pub async fn find_by_owner(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<calendar_configuration::Model>, DbErr> {
    calendar_configuration::Entity::find()
        .filter(calendar_configuration::Column::UserId.eq(user_id))
        .order_by_asc(calendar_configuration::Column::ConfigName)
        .all(db)
        .await
}

pub async fn find_all(
    db: &DatabaseConnection,
) -> Result<Vec<calendar_configuration::Model>, DbErr> {
    calendar_configuration::Entity::find()
        .order_by_asc(calendar_configuration::Column::ConfigName)
        .all(db)
        .await
}

pub async fn find_by_write_token(
    db: &DatabaseConnection,
    write_token: Uuid,
) -> Result<Option<calendar_configuration::Model>, DbErr> {
    calendar_configuration::Entity::find()
        .filter(calendar_configuration::Column::WriteToken.eq(write_token))
        .one(db)
        .await
}

/// Updates the mutable fields. Tokens and the `generated` flag are never
/// touched here.
pub async fn update_config(
    db: &DatabaseConnection,
    config: calendar_configuration::Model,
    update: CalendarConfigUpdate<'_>,
) -> Result<calendar_configuration::Model, DbErr> {
    let mut active: calendar_configuration::ActiveModel = config.into();
    active.api_id = Set(update.api_id);
    active.config_name = Set(update.config_name.to_string());
    active.projects = Set(update.projects.to_string());
    active.groups = Set(update.groups.to_string());
    active.only_issues = Set(update.only_issues);
    active.only_milestones = Set(update.only_milestones);
    active.combined = Set(update.combined);
    active.reminder = Set(update.reminder);
    active.updated_at = Set(Utc::now());
    active.update(db).await
}

/// Flips the `generated` flag after a successful run. Only ever sets it.
pub async fn mark_generated(
    db: &DatabaseConnection,
    config: calendar_configuration::Model,
) -> Result<calendar_configuration::Model, DbErr> {
    let mut active: calendar_configuration::ActiveModel = config.into();
    active.generated = Set(true);
    active.updated_at = Set(Utc::now());
    active.update(db).await
}

pub async fn delete_config(db: &DatabaseConnection, id: i32) -> Result<(), DbErr> {
    calendar_configuration::Entity::delete_by_id(id)
        .exec(db)
        .await?;
    Ok(())
}
