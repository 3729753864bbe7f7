use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Process-unique node identity.
///
/// Stable across revisions of the same logical node, so it doubles as the key
/// for RPC diffing and for list reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn random() -> Self {
        NodeId(Uuid::new_v4())
    }

    /// The id shared by every empty `Markers` value.
    pub const fn nil() -> Self {
        NodeId(Uuid::nil())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for NodeId {
    fn from(value: Uuid) -> Self {
        NodeId(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_are_distinct() {
        assert_ne!(NodeId::random(), NodeId::random());
        assert!(NodeId::nil().is_nil());
    }

    #[test]
    fn test_serializes_as_plain_uuid_string() {
        let id = NodeId::random();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_string()));
        let back: NodeId = serde_json::from_value(json).unwrap();
        assert_eq!(back, id);
    }
}
