use std::fmt;

use rand::Rng;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;

/// Milliseconds since the snowflake epoch (2000-01-01T00:00:00Z).
const EPOCH_MS: i64 = 946_684_800_000;

/// Bits of per-millisecond randomness below the timestamp.
const RANDOM_BITS: u32 = 23;

/// 64-bit record identifier, assigned once at insert time and immutable after.
///
/// Serialized as a JSON string because 64-bit values are not representable in
/// JS numbers. Stored in Postgres as BIGINT via a bit cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Snowflake(u64);

impl Snowflake {
    pub fn new(raw: u64) -> Self {
        Snowflake(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Generate a fresh id: millisecond timestamp shifted left, OR'd with
    /// random low bits. Roughly time-ordered across inserts.
    pub fn generate() -> Self {
        let now_ms = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
        let ts = (now_ms - EPOCH_MS) as u64;
        let random: u64 = rand::thread_rng().gen_range(0..(1 << RANDOM_BITS));
        Snowflake((ts << RANDOM_BITS) | random)
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for Snowflake {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SnowflakeVisitor;

        impl<'de> de::Visitor<'de> for SnowflakeVisitor {
            type Value = Snowflake;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a snowflake id as a decimal string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse::<u64>().map(Snowflake).map_err(de::Error::custom)
            }
        }

        // deserialize_str rather than deserialize_any: the axum path
        // extractor cannot drive deserialize_any.
        deserializer.deserialize_str(SnowflakeVisitor)
    }
}

impl sqlx::Type<sqlx::Postgres> for Snowflake {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for Snowflake {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&(self.0 as i64), buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Snowflake {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <i64 as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
        Ok(Snowflake(raw as u64))
    }
}

/// Records with a stable unique identifier.
pub trait Identified {
    fn id(&self) -> Snowflake;
}

/// Records that also carry a creation instant, set once at insert time.
pub trait Timestamped: Identified {
    fn created(&self) -> OffsetDateTime;
}

/// Narrow a loaded collection down to its identifiers, preserving order.
pub fn ids_of<T: Identified>(items: &[T]) -> Vec<Snowflake> {
    items.iter().map(|item| item.id()).collect()
}

/// A relation collection was used before the repo eager-loaded it. This is a
/// bug at the call site, not a runtime condition to recover from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("relation `{relation}` was not loaded before conversion")]
pub struct RelationUnloaded {
    pub relation: &'static str,
}

/// Relation collection with an explicit loaded/unloaded state.
///
/// `Unloaded` means the repo has not fetched the rows yet; it is distinct from
/// `Loaded(vec![])`, which means the record genuinely has no related rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation<T> {
    Unloaded,
    Loaded(Vec<T>),
}

// Manual impl: the derive would demand `T: Default`, which the record types
// don't have and the unloaded state doesn't need.
impl<T> Default for Relation<T> {
    fn default() -> Self {
        Relation::Unloaded
    }
}

impl<T> Relation<T> {
    pub fn loaded(items: Vec<T>) -> Self {
        Relation::Loaded(items)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Relation::Loaded(_))
    }

    /// Access the loaded rows, or fail if the relation was never fetched.
    /// Never substitutes an empty collection for an unloaded one.
    pub fn require(&self, relation: &'static str) -> Result<&[T], RelationUnloaded> {
        match self {
            Relation::Loaded(items) => Ok(items),
            Relation::Unloaded => Err(RelationUnloaded { relation }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snowflake_serializes_as_string() {
        let id = Snowflake::new(4_503_599_627_370_497);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"4503599627370497\"");
    }

    #[test]
    fn snowflake_deserializes_from_string() {
        let id: Snowflake = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(id, Snowflake::new(42));
    }

    #[test]
    fn snowflake_roundtrips_through_json() {
        let id = Snowflake::generate();
        let json = serde_json::to_string(&id).unwrap();
        let back: Snowflake = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn snowflake_rejects_garbage() {
        assert!(serde_json::from_str::<Snowflake>("\"not-a-number\"").is_err());
    }

    #[test]
    fn generated_snowflakes_are_distinct_and_time_prefixed() {
        let a = Snowflake::generate();
        let b = Snowflake::generate();
        assert_ne!(a, b);
        // Both carry a nonzero timestamp component.
        assert!(a.get() >> RANDOM_BITS > 0);
        assert!(b.get() >> RANDOM_BITS > 0);
        // Generated in the same process, the timestamp prefixes are close.
        let delta = (a.get() >> RANDOM_BITS).abs_diff(b.get() >> RANDOM_BITS);
        assert!(delta < 10_000);
    }

    #[test]
    fn require_on_loaded_returns_rows_in_order() {
        let rel = Relation::loaded(vec![3, 1, 2]);
        assert_eq!(rel.require("numbers").unwrap(), &[3, 1, 2]);
    }

    #[test]
    fn require_on_unloaded_names_the_relation() {
        let rel: Relation<u8> = Relation::Unloaded;
        let err = rel.require("mods").unwrap_err();
        assert_eq!(err.relation, "mods");
        assert!(err.to_string().contains("`mods`"));
    }

    #[test]
    fn unloaded_is_not_an_empty_collection() {
        let unloaded: Relation<u8> = Relation::Unloaded;
        let empty: Relation<u8> = Relation::loaded(vec![]);
        assert_ne!(unloaded, empty);
        assert!(!unloaded.is_loaded());
        assert!(empty.is_loaded());
        assert!(empty.require("anything").unwrap().is_empty());
    }

    struct Thing {
        id: Snowflake,
    }

    impl Identified for Thing {
        fn id(&self) -> Snowflake {
            self.id
        }
    }

    #[test]
    fn ids_of_preserves_order() {
        let things = vec![
            Thing { id: Snowflake::new(9) },
            Thing { id: Snowflake::new(3) },
            Thing { id: Snowflake::new(7) },
        ];
        assert_eq!(
            ids_of(&things),
            vec![Snowflake::new(9), Snowflake::new(3), Snowflake::new(7)]
        );
    }
}
