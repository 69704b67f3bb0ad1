use sqlx::PgPool;

use crate::connections::repo_types::ConnectionRecord;
use crate::model::Snowflake;

/// All connections owned by a user, oldest id first.
pub async fn list_by_user(db: &PgPool, user_id: Snowflake) -> anyhow::Result<Vec<ConnectionRecord>> {
    let rows = sqlx::query_as::<_, ConnectionRecord>(
        r#"
        SELECT id, created, user_id, service, account_name
        FROM connections
        WHERE user_id = $1
        ORDER BY id
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
