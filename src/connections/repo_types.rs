use sqlx::FromRow;
use time::OffsetDateTime;

use crate::model::{Identified, Snowflake, Timestamped};

/// Third-party account link owned by a user.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ConnectionRecord {
    pub id: Snowflake,
    pub created: OffsetDateTime,
    pub user_id: Snowflake,
    pub service: String,
    pub account_name: String,
}

impl Identified for ConnectionRecord {
    fn id(&self) -> Snowflake {
        self.id
    }
}

impl Timestamped for ConnectionRecord {
    fn created(&self) -> OffsetDateTime {
        self.created
    }
}
