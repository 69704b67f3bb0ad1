use serde::Serialize;
use time::OffsetDateTime;

use crate::model::{Identified, Snowflake, Timestamped};
use crate::reviews::repo_types::ReviewRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewShape {
    pub id: Snowflake,
    pub created: OffsetDateTime,
    pub rating: String,
    pub content: String,
    #[serde(rename = "mod")]
    pub mod_id: Snowflake,
    pub author: Snowflake,
}

impl ReviewShape {
    pub fn from_record(record: &ReviewRecord) -> Self {
        Self {
            id: record.id(),
            created: record.created(),
            rating: record.rating.clone(),
            content: record.content.clone(),
            mod_id: record.mod_id,
            author: record.author_id,
        }
    }
}
