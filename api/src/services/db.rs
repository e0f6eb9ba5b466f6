//! Database pool and schema bootstrap
//!
//! Query functions in `domain` use sqlx's generic Executor trait, so they accept
//! both `&PgPool` and `&mut PgConnection` (transactions):
//!
//! ```ignore
//! domain::videos::insert_video(&pool, &video).await?;
//!
//! let mut tx = pool.begin().await?;
//! domain::videos::insert_video(&mut *tx, &video).await?;
//! tx.commit().await?;
//! ```

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::domain::videos;

/// Connect to Postgres and create the videos table if it does not exist yet
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    videos::ensure_schema(&pool).await?;
    info!(max_connections, "Database ready");

    Ok(pool)
}
