use sqlx::PgPool;

use crate::model::Snowflake;
use crate::reviews::repo_types::ReviewRecord;

/// All reviews of a mod, oldest id first.
pub async fn list_by_mod(db: &PgPool, mod_id: Snowflake) -> anyhow::Result<Vec<ReviewRecord>> {
    let rows = sqlx::query_as::<_, ReviewRecord>(
        r#"
        SELECT id, created, rating, content, mod_id, author_id
        FROM reviews
        WHERE mod_id = $1
        ORDER BY id
        "#,
    )
    .bind(mod_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// All reviews written by a user, oldest id first.
pub async fn list_by_author(db: &PgPool, author_id: Snowflake) -> anyhow::Result<Vec<ReviewRecord>> {
    let rows = sqlx::query_as::<_, ReviewRecord>(
        r#"
        SELECT id, created, rating, content, mod_id, author_id
        FROM reviews
        WHERE author_id = $1
        ORDER BY id
        "#,
    )
    .bind(author_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Paged variant for the per-user review listing endpoint.
pub async fn page_by_author(
    db: &PgPool,
    author_id: Snowflake,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<ReviewRecord>> {
    let rows = sqlx::query_as::<_, ReviewRecord>(
        r#"
        SELECT id, created, rating, content, mod_id, author_id
        FROM reviews
        WHERE author_id = $1
        ORDER BY id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(author_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
