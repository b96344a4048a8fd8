use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::db::entities::{calendar_configuration, gitlab_api};

pub async fn create_api(
    db: &DatabaseConnection,
    user_id: i32,
    api_name: &str,
    url: &str,
    token_encrypted: &str,
) -> Result<gitlab_api::Model, DbErr> {
    let now = Utc::now();
    let new_api = gitlab_api::ActiveModel {
        user_id: Set(user_id),
        api_name: Set(api_name.to_string()),
        url: Set(url.to_string()),
        token_encrypted: Set(token_encrypted.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    new_api.insert(db).await
}

pub async fn find_by_id(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<gitlab_api::Model>, DbErr> {
    gitlab_api::Entity::find_by_id(id).one(db).await
}

pub async fn find_by_owner(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<gitlab_api::Model>, DbErr> {
    gitlab_api::Entity::find()
        .filter(gitlab_api::Column::UserId.eq(user_id))
        .order_by_asc(gitlab_api::Column::ApiName)
        .all(db)
        .await
}

pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<gitlab_api::Model>, DbErr> {
    gitlab_api::Entity::find()
        .order_by_asc(gitlab_api::Column::ApiName)
        .all(db)
        .await
}

pub async fn update_api(
    db: &DatabaseConnection,
    api: gitlab_api::Model,
    api_name: &str,
    url: &str,
    token_encrypted: Option<&str>,
) -> Result<gitlab_api::Model, DbErr> {
    let mut active: gitlab_api::ActiveModel = api.into();
    active.api_name = Set(api_name.to_string());
    active.url = Set(url.to_string());
    if let Some(token) = token_encrypted {
        active.token_encrypted = Set(token.to_string());
    }
    active.updated_at = Set(Utc::now());
    active.update(db).await
}

/// Deletes an API registration together with its dependent calendar
/// configurations. The FK carries ON DELETE CASCADE; the explicit delete
/// keeps the behavior identical on engines without FK enforcement.
pub async fn delete_api(db: &DatabaseConnection, id: i32) -> Result<(), DbErr> {
    let txn = db.begin().await?;
    calendar_configuration::Entity::delete_many()
        .filter(calendar_configuration::Column::ApiId.eq(id))
        .exec(&txn)
        .await?;
    gitlab_api::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await
}
