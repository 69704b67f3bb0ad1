use sqlx::FromRow;
use time::OffsetDateTime;

use crate::connections::repo_types::ConnectionRecord;
use crate::model::{Identified, Relation, Snowflake, Timestamped};
use crate::mods::repo_types::ModRecord;
use crate::reviews::repo_types::ReviewRecord;

/// User as stored. `password_hash` never leaves this type: the record does
/// not implement `Serialize`, and the API shape is built field by field.
///
/// The four relation collections live in other tables and default to
/// `Unloaded` on a plain row fetch; conversion to the API shape refuses to
/// run until the repo has loaded all of them.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserRecord {
    pub id: Snowflake,
    pub created: OffsetDateTime,
    pub username: String,
    pub avatar: String,
    pub bio: String,
    pub donator: bool,
    pub developer: bool,
    pub moderator: bool,
    pub password_hash: String,
    #[sqlx(skip)]
    pub mods: Relation<ModRecord>,
    #[sqlx(skip)]
    pub favourites: Relation<ModRecord>,
    #[sqlx(skip)]
    pub reviews: Relation<ReviewRecord>,
    #[sqlx(skip)]
    pub connections: Relation<ConnectionRecord>,
}

impl Identified for UserRecord {
    fn id(&self) -> Snowflake {
        self.id
    }
}

impl Timestamped for UserRecord {
    fn created(&self) -> OffsetDateTime {
        self.created
    }
}
