use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::info;

pub mod queries;
pub mod repository;
pub mod rows;

pub type DbPool = Pool<Postgres>;

pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Creates the tables and indexes if they do not exist yet.
pub async fn migrate(pool: &DbPool) -> Result<()> {
    let mut tx = pool.begin().await?;
    for statement in queries::SCHEMA {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    info!("Schema ready ({} statements)", queries::SCHEMA.len());
    Ok(())
}
