use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema};

use crate::entities::{comment, follow, tweet, tweet_like, user};

pub type DbPool = DatabaseConnection;

/// Connects to the database and ensures the schema exists. `url` is the
/// MySQL URL from [`crate::config::Config::mysql_url`] in production;
/// tests pass `sqlite::memory:` and get the identical schema.
pub async fn create_pool(url: &str) -> Result<DbPool, anyhow::Error> {
    let db = Database::connect(url).await?;
    init_schema(&db).await?;
    Ok(db)
}

/// Creates all tables if they do not exist. Table definitions are derived
/// from the entities, so unique keys (username, email, the follow and
/// like pairs) and foreign-key rules live in one place.
pub async fn init_schema(db: &DbPool) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    // Referenced tables first: edges and comments point at users/tweets.
    create_table(db, &schema, user::Entity).await?;
    create_table(db, &schema, tweet::Entity).await?;
    create_table(db, &schema, follow::Entity).await?;
    create_table(db, &schema, tweet_like::Entity).await?;
    create_table(db, &schema, comment::Entity).await?;

    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DbPool, schema: &Schema, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}
