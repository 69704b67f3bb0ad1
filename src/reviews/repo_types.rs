use sqlx::FromRow;
use time::OffsetDateTime;

use crate::model::{Identified, Snowflake, Timestamped};

/// Review written by a user about a mod.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ReviewRecord {
    pub id: Snowflake,
    pub created: OffsetDateTime,
    pub rating: String,
    pub content: String,
    pub mod_id: Snowflake,
    pub author_id: Snowflake,
}

impl Identified for ReviewRecord {
    fn id(&self) -> Snowflake {
        self.id
    }
}

impl Timestamped for ReviewRecord {
    fn created(&self) -> OffsetDateTime {
        self.created
    }
}
