use sqlx::PgPool;

use crate::model::{Relation, Snowflake};
use crate::users::repo_types::UserRecord;
use crate::{connections, mods, reviews};

const USER_COLUMNS: &str =
    "id, created, username, avatar, bio, donator, developer, moderator, password_hash";

/// Eager-load all four relation collections. Required before converting the
/// record to its API shape.
pub async fn load_relations(db: &PgPool, record: &mut UserRecord) -> anyhow::Result<()> {
    let owned = mods::repo::list_by_author(db, record.id).await?;
    let favourites = mods::repo::list_favourites_of(db, record.id).await?;
    let reviews = reviews::repo::list_by_author(db, record.id).await?;
    let connections = connections::repo::list_by_user(db, record.id).await?;

    record.mods = Relation::loaded(owned);
    record.favourites = Relation::loaded(favourites);
    record.reviews = Relation::loaded(reviews);
    record.connections = Relation::loaded(connections);
    Ok(())
}

pub async fn find_by_id(db: &PgPool, id: Snowflake) -> anyhow::Result<Option<UserRecord>> {
    let row = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Login lookup. Relations stay unloaded; authentication only needs scalars.
pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<UserRecord>> {
    let row = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// One user with every relation loaded, ready for conversion.
pub async fn find_hydrated(db: &PgPool, id: Snowflake) -> anyhow::Result<Option<UserRecord>> {
    let Some(mut record) = find_by_id(db, id).await? else {
        return Ok(None);
    };
    load_relations(db, &mut record).await?;
    Ok(Some(record))
}

/// Paged user listing, each record hydrated.
pub async fn page(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<UserRecord>> {
    let mut rows = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    for record in rows.iter_mut() {
        load_relations(db, record).await?;
    }
    Ok(rows)
}

/// Authors of a mod, hydrated for the user-shape listing.
pub async fn list_authors_of_mod(db: &PgPool, mod_id: Snowflake) -> anyhow::Result<Vec<UserRecord>> {
    let mut rows = sqlx::query_as::<_, UserRecord>(
        r#"
        SELECT u.id, u.created, u.username, u.avatar, u.bio, u.donator, u.developer,
               u.moderator, u.password_hash
        FROM users u
        JOIN mod_authors ma ON ma.user_id = u.id
        WHERE ma.mod_id = $1
        ORDER BY u.id
        "#,
    )
    .bind(mod_id)
    .fetch_all(db)
    .await?;
    for record in rows.iter_mut() {
        load_relations(db, record).await?;
    }
    Ok(rows)
}

/// Insert a new user. The id is assigned here, once, and never changes.
pub async fn create(db: &PgPool, username: &str, password_hash: &str) -> anyhow::Result<UserRecord> {
    let id = Snowflake::generate();
    let mut record = sqlx::query_as::<_, UserRecord>(&format!(
        "INSERT INTO users (id, username, password_hash) VALUES ($1, $2, $3) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(username)
    .bind(password_hash)
    .fetch_one(db)
    .await?;

    // A freshly inserted user has no related rows yet.
    record.mods = Relation::loaded(vec![]);
    record.favourites = Relation::loaded(vec![]);
    record.reviews = Relation::loaded(vec![]);
    record.connections = Relation::loaded(vec![]);
    Ok(record)
}
