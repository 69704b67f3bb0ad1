use sqlx::FromRow;
use time::OffsetDateTime;

use crate::model::{Identified, Relation, Snowflake, Timestamped};

/// Mod as stored. `path` is the internal download location and is never
/// exposed through any API shape.
///
/// `authors` and `reviews` come from separate tables and are `Unloaded` until
/// the repo hydrates them; the row query leaves them at their default.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ModRecord {
    pub id: Snowflake,
    pub created: OffsetDateTime,
    pub title: String,
    pub icon: Option<String>,
    pub path: String,
    pub tagline: String,
    pub description: String,
    pub website: String,
    pub released_at: i64,
    pub last_updated: i64,
    pub downloads: i64,
    pub verified: bool,
    #[sqlx(skip)]
    pub authors: Relation<Snowflake>,
    #[sqlx(skip)]
    pub reviews: Relation<Snowflake>,
}

impl Identified for ModRecord {
    fn id(&self) -> Snowflake {
        self.id
    }
}

impl Timestamped for ModRecord {
    fn created(&self) -> OffsetDateTime {
        self.created
    }
}
