//! Serde helpers for shared type attribution
//!
//! `JavaType` shares its composite variants behind `Arc` so the RPC layer can
//! track them by identity. Serde does not implement Serialize/Deserialize for
//! `Arc<T>` without the `rc` feature, so these helpers serialize the inner value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

/// Serialize Arc<T> by serializing the inner value
pub fn serialize_arc<S, T>(arc: &Arc<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    arc.as_ref().serialize(serializer)
}

/// Deserialize Arc<T> by deserializing the inner value and wrapping in Arc
pub fn deserialize_arc<'de, D, T>(deserializer: D) -> Result<Arc<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let value = T::deserialize(deserializer)?;
    Ok(Arc::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Holder {
        #[serde(serialize_with = "serialize_arc", deserialize_with = "deserialize_arc")]
        inner: Arc<String>,
    }

    #[test]
    fn test_arc_is_transparent_in_json() {
        let holder = Holder { inner: Arc::new("shared".to_string()) };
        let json = serde_json::to_string(&holder).unwrap();
        assert_eq!(json, r#"{"inner":"shared"}"#);
        let back: Holder = serde_json::from_str(&json).unwrap();
        assert_eq!(back, holder);
    }
}
