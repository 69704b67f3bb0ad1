use sqlx::PgPool;

use crate::model::{Relation, Snowflake};
use crate::mods::repo_types::ModRecord;

const MOD_COLUMNS: &str = "id, created, title, icon, path, tagline, description, website, \
                           released_at, last_updated, downloads, verified";

/// Attach author and review id collections to a mod row.
pub async fn load_relations(db: &PgPool, record: &mut ModRecord) -> anyhow::Result<()> {
    let authors = sqlx::query_scalar::<_, Snowflake>(
        r#"
        SELECT user_id FROM mod_authors
        WHERE mod_id = $1
        ORDER BY user_id
        "#,
    )
    .bind(record.id)
    .fetch_all(db)
    .await?;

    let reviews = sqlx::query_scalar::<_, Snowflake>(
        r#"
        SELECT id FROM reviews
        WHERE mod_id = $1
        ORDER BY id
        "#,
    )
    .bind(record.id)
    .fetch_all(db)
    .await?;

    record.authors = Relation::loaded(authors);
    record.reviews = Relation::loaded(reviews);
    Ok(())
}

pub async fn hydrate_all(db: &PgPool, records: &mut [ModRecord]) -> anyhow::Result<()> {
    for record in records.iter_mut() {
        load_relations(db, record).await?;
    }
    Ok(())
}

pub async fn find_by_id(db: &PgPool, id: Snowflake) -> anyhow::Result<Option<ModRecord>> {
    let row = sqlx::query_as::<_, ModRecord>(&format!(
        "SELECT {MOD_COLUMNS} FROM mods WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// One mod with relations loaded, ready for conversion.
pub async fn find_hydrated(db: &PgPool, id: Snowflake) -> anyhow::Result<Option<ModRecord>> {
    let Some(mut record) = find_by_id(db, id).await? else {
        return Ok(None);
    };
    load_relations(db, &mut record).await?;
    Ok(Some(record))
}

/// Verified mods, paged, hydrated.
pub async fn page_verified(
    db: &PgPool,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<ModRecord>> {
    let mut rows = sqlx::query_as::<_, ModRecord>(&format!(
        "SELECT {MOD_COLUMNS} FROM mods WHERE verified ORDER BY id LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    hydrate_all(db, &mut rows).await?;
    Ok(rows)
}

/// Ten most recently released verified mods.
pub async fn recent_releases(db: &PgPool) -> anyhow::Result<Vec<ModRecord>> {
    let mut rows = sqlx::query_as::<_, ModRecord>(&format!(
        "SELECT {MOD_COLUMNS} FROM mods WHERE verified ORDER BY released_at DESC LIMIT 10"
    ))
    .fetch_all(db)
    .await?;
    hydrate_all(db, &mut rows).await?;
    Ok(rows)
}

/// Ten most downloaded verified mods.
pub async fn popular(db: &PgPool) -> anyhow::Result<Vec<ModRecord>> {
    let mut rows = sqlx::query_as::<_, ModRecord>(&format!(
        "SELECT {MOD_COLUMNS} FROM mods WHERE verified ORDER BY downloads DESC LIMIT 10"
    ))
    .fetch_all(db)
    .await?;
    hydrate_all(db, &mut rows).await?;
    Ok(rows)
}

/// Mods authored by a user, oldest id first. Rows come back unhydrated; the
/// caller decides whether it needs the relation collections.
pub async fn list_by_author(db: &PgPool, user_id: Snowflake) -> anyhow::Result<Vec<ModRecord>> {
    let rows = sqlx::query_as::<_, ModRecord>(
        r#"
        SELECT m.id, m.created, m.title, m.icon, m.path, m.tagline, m.description,
               m.website, m.released_at, m.last_updated, m.downloads, m.verified
        FROM mods m
        JOIN mod_authors ma ON ma.mod_id = m.id
        WHERE ma.user_id = $1
        ORDER BY m.id
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Mods favourited by a user, oldest id first. Unhydrated, like
/// [`list_by_author`].
pub async fn list_favourites_of(db: &PgPool, user_id: Snowflake) -> anyhow::Result<Vec<ModRecord>> {
    let rows = sqlx::query_as::<_, ModRecord>(
        r#"
        SELECT m.id, m.created, m.title, m.icon, m.path, m.tagline, m.description,
               m.website, m.released_at, m.last_updated, m.downloads, m.verified
        FROM mods m
        JOIN mod_favourites mf ON mf.mod_id = m.id
        WHERE mf.user_id = $1
        ORDER BY m.id
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
