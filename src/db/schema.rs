use sea_orm::sea_query::TableCreateStatement;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Schema};
use tracing::info;

use crate::db::entities::{calendar_configuration, gitlab_api, user};

/// Creates all tables derived from the entities if they do not exist yet.
/// Used at startup against Postgres and by the tests against SQLite.
pub async fn create_all_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, user::Entity).await?;
    create_table(db, gitlab_api::Entity).await?;
    create_table(db, calendar_configuration::Entity).await?;
    info!("database schema is up to date");
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    let mut stmt: TableCreateStatement = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(builder.build(&stmt)).await?;
    Ok(())
}
