use serde::Serialize;

use crate::connections::repo_types::ConnectionRecord;
use crate::model::{Identified, Snowflake};

/// Client-facing view of a connection. The owning user id stays internal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionShape {
    pub id: Snowflake,
    pub service: String,
    pub account_name: String,
}

impl ConnectionShape {
    pub fn from_record(record: &ConnectionRecord) -> Self {
        Self {
            id: record.id(),
            service: record.service.clone(),
            account_name: record.account_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;

    fn record() -> ConnectionRecord {
        ConnectionRecord {
            id: Snowflake::new(101),
            created: OffsetDateTime::UNIX_EPOCH,
            user_id: Snowflake::new(7),
            service: "github".into(),
            account_name: "octocat".into(),
        }
    }

    #[test]
    fn copies_documented_fields_only() {
        let shape = ConnectionShape::from_record(&record());
        assert_eq!(shape.id, Snowflake::new(101));
        assert_eq!(shape.service, "github");
        assert_eq!(shape.account_name, "octocat");

        let json = serde_json::to_value(&shape).unwrap();
        assert!(json.get("user_id").is_none());
        assert!(json.get("created").is_none());
    }
}
