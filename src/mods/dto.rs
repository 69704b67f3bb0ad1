use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::model::{Identified, RelationUnloaded, Snowflake, Timestamped};
use crate::mods::repo_types::ModRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModShape {
    pub id: Snowflake,
    pub created: OffsetDateTime,
    pub title: String,
    pub icon: Option<String>,
    pub tagline: String,
    pub description: String,
    pub website: String,
    pub released_at: i64,
    pub last_updated: i64,
    pub downloads: i64,
    pub verified: bool,
    pub authors: Vec<Snowflake>,
    pub reviews: Vec<Snowflake>,
}

impl ModShape {
    /// Field-by-field projection of a hydrated mod record. `path` stays out.
    pub fn from_record(record: &ModRecord) -> Result<Self, RelationUnloaded> {
        let authors = record.authors.require("authors")?;
        let reviews = record.reviews.require("reviews")?;

        Ok(Self {
            id: record.id(),
            created: record.created(),
            title: record.title.clone(),
            icon: record.icon.clone(),
            tagline: record.tagline.clone(),
            description: record.description.clone(),
            website: record.website.clone(),
            released_at: record.released_at,
            last_updated: record.last_updated,
            downloads: record.downloads,
            verified: record.verified,
            authors: authors.to_vec(),
            reviews: reviews.to_vec(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 {
    20
}

#[cfg(test)]
mod tests {
    use crate::model::Relation;

    use super::*;

    fn record() -> ModRecord {
        ModRecord {
            id: Snowflake::new(900),
            created: OffsetDateTime::UNIX_EPOCH,
            title: "Doki Doki Forever".into(),
            icon: None,
            path: "a1b2c3d4e5f6a7b8".into(),
            tagline: "an epilogue mod".into(),
            description: "long description".into(),
            website: "https://example.com".into(),
            released_at: 1_520_000_000,
            last_updated: 1_520_100_000,
            downloads: 4242,
            verified: true,
            authors: Relation::loaded(vec![Snowflake::new(1), Snowflake::new(2)]),
            reviews: Relation::loaded(vec![Snowflake::new(30)]),
        }
    }

    #[test]
    fn scalars_copied_verbatim_and_path_withheld() {
        let shape = ModShape::from_record(&record()).unwrap();
        assert_eq!(shape.title, "Doki Doki Forever");
        assert_eq!(shape.downloads, 4242);
        assert!(shape.verified);

        let json = serde_json::to_value(&shape).unwrap();
        assert!(json.get("path").is_none());
    }

    #[test]
    fn relations_become_ordered_id_arrays() {
        let shape = ModShape::from_record(&record()).unwrap();
        assert_eq!(shape.authors, vec![Snowflake::new(1), Snowflake::new(2)]);
        assert_eq!(shape.reviews, vec![Snowflake::new(30)]);
    }

    #[test]
    fn unloaded_authors_is_a_conversion_error() {
        let mut r = record();
        r.authors = Relation::Unloaded;
        let err = ModShape::from_record(&r).unwrap_err();
        assert_eq!(err.relation, "authors");
    }
}
