use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};

use crate::db::entities::user;

pub async fn create_user(
    db: &DatabaseConnection,
    username: &str,
    password_hash: &str,
    is_superuser: bool,
) -> Result<user::Model, DbErr> {
    let now = Utc::now();
    let new_user = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(password_hash.to_string()),
        is_superuser: Set(is_superuser),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    new_user.insert(db).await
}

pub async fn find_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
}

pub async fn find_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find_by_id(id).one(db).await
}
