use serde::Serialize;
use time::OffsetDateTime;

use crate::connections::dto::ConnectionShape;
use crate::model::{ids_of, Identified, RelationUnloaded, Snowflake, Timestamped};
use crate::users::repo_types::UserRecord;

/// Client-facing view of a user. Relation collections carry bare ids (mods,
/// favourites, reviews) or nested shapes (connections), never full records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserShape {
    pub id: Snowflake,
    pub created: OffsetDateTime,
    pub username: String,
    pub avatar: String,
    pub bio: String,
    pub donator: bool,
    pub developer: bool,
    pub moderator: bool,
    pub mods: Vec<Snowflake>,
    pub favourites: Vec<Snowflake>,
    pub reviews: Vec<Snowflake>,
    pub connections: Vec<ConnectionShape>,
}

impl UserShape {
    /// Project a fully hydrated user record into its API shape.
    ///
    /// Pure and synchronous: scalars are copied verbatim, relation
    /// collections are mapped element-wise in their input order (no sorting,
    /// no deduplication). Every relation must be loaded up front; an unloaded
    /// one means the caller forgot to eager-load and the whole conversion
    /// fails, rather than masking the bug with an empty array.
    pub fn from_record(record: &UserRecord) -> Result<Self, RelationUnloaded> {
        let mods = record.mods.require("mods")?;
        let favourites = record.favourites.require("favourites")?;
        let reviews = record.reviews.require("reviews")?;
        let connections = record.connections.require("connections")?;

        Ok(Self {
            id: record.id(),
            created: record.created(),
            username: record.username.clone(),
            avatar: record.avatar.clone(),
            bio: record.bio.clone(),
            donator: record.donator,
            developer: record.developer,
            moderator: record.moderator,
            mods: ids_of(mods),
            favourites: ids_of(favourites),
            reviews: ids_of(reviews),
            connections: connections.iter().map(ConnectionShape::from_record).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::connections::repo_types::ConnectionRecord;
    use crate::model::{Identified, Relation};
    use crate::mods::repo_types::ModRecord;
    use crate::reviews::repo_types::ReviewRecord;

    use super::*;

    fn mod_record(id: u64) -> ModRecord {
        ModRecord {
            id: Snowflake::new(id),
            created: OffsetDateTime::UNIX_EPOCH,
            title: format!("mod-{id}"),
            icon: None,
            path: "deadbeefdeadbeef".into(),
            tagline: "tagline".into(),
            description: "description".into(),
            website: "https://example.com".into(),
            released_at: 1_500_000_000,
            last_updated: 1_500_000_001,
            downloads: 0,
            verified: true,
            authors: Relation::Unloaded,
            reviews: Relation::Unloaded,
        }
    }

    fn review_record(id: u64) -> ReviewRecord {
        ReviewRecord {
            id: Snowflake::new(id),
            created: OffsetDateTime::UNIX_EPOCH,
            rating: "5".into(),
            content: "great".into(),
            mod_id: Snowflake::new(1),
            author_id: Snowflake::new(7),
        }
    }

    fn connection_record(id: u64, service: &str) -> ConnectionRecord {
        ConnectionRecord {
            id: Snowflake::new(id),
            created: OffsetDateTime::UNIX_EPOCH,
            user_id: Snowflake::new(7),
            service: service.into(),
            account_name: "someone".into(),
        }
    }

    fn user_record() -> UserRecord {
        UserRecord {
            id: Snowflake::new(7),
            created: OffsetDateTime::UNIX_EPOCH,
            username: "minike".into(),
            avatar: "https://cdn.example.com/a.png".into(),
            bio: "hello".into(),
            donator: true,
            developer: false,
            moderator: true,
            password_hash: "$argon2id$...".into(),
            mods: Relation::loaded(vec![mod_record(31), mod_record(12)]),
            favourites: Relation::loaded(vec![mod_record(99)]),
            reviews: Relation::loaded(vec![review_record(41), review_record(40)]),
            connections: Relation::loaded(vec![
                connection_record(51, "github"),
                connection_record(50, "discord"),
            ]),
        }
    }

    #[test]
    fn scalars_are_copied_verbatim() {
        let record = user_record();
        let shape = UserShape::from_record(&record).unwrap();
        assert_eq!(shape.id, record.id);
        assert_eq!(shape.created, record.created);
        assert_eq!(shape.username, record.username);
        assert_eq!(shape.avatar, record.avatar);
        assert_eq!(shape.bio, record.bio);
        assert_eq!(shape.donator, record.donator);
        assert_eq!(shape.developer, record.developer);
        assert_eq!(shape.moderator, record.moderator);
    }

    #[test]
    fn mods_and_favourites_narrow_to_ids_in_input_order() {
        let record = user_record();
        let shape = UserShape::from_record(&record).unwrap();
        assert_eq!(shape.mods, vec![Snowflake::new(31), Snowflake::new(12)]);
        assert_eq!(shape.favourites, vec![Snowflake::new(99)]);
        assert_eq!(shape.reviews, vec![Snowflake::new(41), Snowflake::new(40)]);
    }

    #[test]
    fn connections_map_through_nested_converter_in_order() {
        let shape = UserShape::from_record(&user_record()).unwrap();
        let services: Vec<&str> = shape.connections.iter().map(|c| c.service.as_str()).collect();
        assert_eq!(services, vec!["github", "discord"]);
    }

    #[test]
    fn reordering_input_reorders_output_identically() {
        let mut record = user_record();
        if let Relation::Loaded(items) = &mut record.connections {
            items.reverse();
        }
        if let Relation::Loaded(items) = &mut record.mods {
            items.reverse();
        }
        let shape = UserShape::from_record(&record).unwrap();
        assert_eq!(shape.mods, vec![Snowflake::new(12), Snowflake::new(31)]);
        let ids: Vec<Snowflake> = shape.connections.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![Snowflake::new(50), Snowflake::new(51)]);
    }

    #[test]
    fn conversion_is_referentially_transparent() {
        let record = user_record();
        let first = UserShape::from_record(&record).unwrap();
        let second = UserShape::from_record(&record).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn duplicate_favourites_are_kept_as_is() {
        let mut record = user_record();
        record.favourites = Relation::loaded(vec![mod_record(99), mod_record(99)]);
        let shape = UserShape::from_record(&record).unwrap();
        assert_eq!(shape.favourites, vec![Snowflake::new(99), Snowflake::new(99)]);
    }

    #[test]
    fn each_unloaded_relation_fails_conversion() {
        for relation in ["mods", "favourites", "reviews", "connections"] {
            let mut record = user_record();
            match relation {
                "mods" => record.mods = Relation::Unloaded,
                "favourites" => record.favourites = Relation::Unloaded,
                "reviews" => record.reviews = Relation::Unloaded,
                _ => record.connections = Relation::Unloaded,
            }
            let err = UserShape::from_record(&record).unwrap_err();
            assert_eq!(err.relation, relation, "wrong relation reported");
        }
    }

    #[test]
    fn narrowing_matches_identifier_projection() {
        let record = user_record();
        let shape = UserShape::from_record(&record).unwrap();
        let expected: Vec<Snowflake> = match &record.mods {
            Relation::Loaded(items) => items.iter().map(|m| m.id()).collect(),
            Relation::Unloaded => unreachable!(),
        };
        assert_eq!(shape.mods, expected);
    }

    #[test]
    fn serialized_shape_never_leaks_the_password_hash() {
        let json = serde_json::to_value(UserShape::from_record(&user_record()).unwrap()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["id"], "7");
        assert_eq!(json["username"], "minike");
        // mods/favourites are id arrays, never nested objects
        assert!(json["mods"].as_array().unwrap().iter().all(|v| v.is_string()));
        assert!(json["favourites"].as_array().unwrap().iter().all(|v| v.is_string()));
    }
}
