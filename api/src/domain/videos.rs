//! Video domain - DB queries for ingested videos
//!
//! All functions use the generic Executor pattern, allowing them to work with
//! both `&PgPool` (for standalone queries) and `&mut PgConnection` (for transactions).

use sqlx::{Executor, Postgres};

use crate::models::{NewVideo, VideoRecord};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS videos (
    id BIGSERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    publish_date TEXT NOT NULL,
    thumbnail_url TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS videos_publish_date_idx ON videos (publish_date DESC);
"#;

/// Create the videos table and its index if they are missing
pub async fn ensure_schema<'e, E>(executor: E) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::raw_sql(SCHEMA).execute(executor).await?;
    Ok(())
}

/// Insert a video and return it with its assigned id
pub async fn insert_video<'e, E>(executor: E, video: &NewVideo) -> Result<VideoRecord, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO videos (title, description, publish_date, thumbnail_url)
        VALUES ($1, $2, $3, $4)
        RETURNING id, title, description, publish_date, thumbnail_url
        "#,
    )
    .bind(&video.title)
    .bind(&video.description)
    .bind(&video.publish_date)
    .bind(&video.thumbnail_url)
    .fetch_one(executor)
    .await
}

/// Video row with total count from window function
#[derive(Debug, sqlx::FromRow)]
struct VideoRowWithTotal {
    id: i64,
    title: String,
    description: String,
    publish_date: String,
    thumbnail_url: String,
    total_count: i64,
}

/// List one page of videos, newest first, returning the total count in the same query.
/// The total is 0 when the page is past the end; callers needing it then should use
/// [`count_videos`].
pub async fn list_videos_with_count<'e, E>(
    executor: E,
    limit: i64,
    offset: i64,
) -> Result<(Vec<VideoRecord>, i64), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows: Vec<VideoRowWithTotal> = sqlx::query_as(
        r#"
        SELECT id, title, description, publish_date, thumbnail_url,
               COUNT(*) OVER() as total_count
        FROM videos
        ORDER BY publish_date DESC, id DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await?;

    let total = rows.first().map(|r| r.total_count).unwrap_or(0);

    let videos = rows
        .into_iter()
        .map(|r| VideoRecord {
            id: r.id,
            title: r.title,
            description: r.description,
            publish_date: r.publish_date,
            thumbnail_url: r.thumbnail_url,
        })
        .collect();

    Ok((videos, total))
}

/// Videos whose title or description contains `term`, ignoring case
pub async fn search_videos<'e, E>(
    executor: E,
    term: &str,
    limit: i64,
) -> Result<Vec<VideoRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    // strpos avoids treating % and _ in the term as LIKE wildcards
    sqlx::query_as(
        r#"
        SELECT id, title, description, publish_date, thumbnail_url
        FROM videos
        WHERE strpos(lower(title), lower($1)) > 0
           OR strpos(lower(description), lower($1)) > 0
        ORDER BY publish_date DESC, id DESC
        LIMIT $2
        "#,
    )
    .bind(term)
    .bind(limit)
    .fetch_all(executor)
    .await
}

pub async fn count_videos<'e, E>(executor: E) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM videos")
        .fetch_one(executor)
        .await?;
    Ok(row.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    fn video(title: &str, description: &str, publish_date: &str) -> NewVideo {
        NewVideo {
            title: title.to_string(),
            description: description.to_string(),
            publish_date: publish_date.to_string(),
            thumbnail_url: format!("https://i.ytimg.com/{}/hq.jpg", title),
        }
    }

    /// Runs inside a rolled-back transaction so the target database is left untouched.
    /// `DATABASE_URL=postgres://... cargo test -- --ignored`
    #[tokio::test]
    #[ignore = "needs a PostgreSQL instance at DATABASE_URL"]
    async fn queries_against_postgres() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPool::connect(&url).await.unwrap();
        let mut tx = pool.begin().await.unwrap();

        ensure_schema(&mut *tx).await.unwrap();
        // idempotent
        ensure_schema(&mut *tx).await.unwrap();
        sqlx::query("DELETE FROM videos").execute(&mut *tx).await.unwrap();

        let first = insert_video(&mut *tx, &video("Football highlights", "goals", "2024-01-01T00:00:00Z"))
            .await
            .unwrap();
        let second = insert_video(&mut *tx, &video("Cooking show", "100% pasta_night", "2024-03-01T00:00:00Z"))
            .await
            .unwrap();
        let third = insert_video(&mut *tx, &video("Derby recap", "a FOOTBALL derby", "2024-02-01T00:00:00Z"))
            .await
            .unwrap();
        assert_eq!(first.title, "Football highlights");
        assert!(first.id < second.id && second.id < third.id);

        assert_eq!(count_videos(&mut *tx).await.unwrap(), 3);

        let (page, total) = list_videos_with_count(&mut *tx, 2, 0).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(
            page.iter().map(|v| v.id).collect::<Vec<_>>(),
            vec![second.id, third.id]
        );

        let (page, total) = list_videos_with_count(&mut *tx, 2, 2).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page, vec![first.clone()]);

        // past the end the window count has no row to ride on
        let (page, total) = list_videos_with_count(&mut *tx, 2, 10).await.unwrap();
        assert!(page.is_empty());
        assert_eq!(total, 0);

        let found = search_videos(&mut *tx, "football", 5).await.unwrap();
        assert_eq!(
            found.iter().map(|v| v.id).collect::<Vec<_>>(),
            vec![third.id, first.id]
        );

        let found = search_videos(&mut *tx, "football", 1).await.unwrap();
        assert_eq!(found.len(), 1);

        // LIKE wildcards are matched literally
        assert_eq!(search_videos(&mut *tx, "100%", 5).await.unwrap(), vec![second.clone()]);
        assert!(search_videos(&mut *tx, "g_a", 5).await.unwrap().is_empty());

        tx.rollback().await.unwrap();
    }
}
