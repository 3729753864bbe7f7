//! Opaque metadata attached to nodes.
//!
//! Markers never participate in semantic comparison; they carry facts such as
//! "this element was followed by a trailing comma" or "this subtree failed to
//! parse".

use serde::{Deserialize, Serialize};

use super::id::NodeId;
use super::space::Space;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Marker {
    /// The element was followed by a trailing comma; `suffix` is the space after it.
    TrailingComma { id: NodeId, suffix: Space },
    /// The statement was terminated by an explicit semicolon.
    Semicolon { id: NodeId },
    /// The parser could not translate this subtree.
    #[serde(rename_all = "camelCase")]
    ParseExceptionResult {
        id: NodeId,
        parser_type: String,
        exception_type: String,
        message: String,
    },
    /// Host-defined marker carried through unchanged.
    Custom { id: NodeId, name: String, data: serde_json::Value },
}

impl Marker {
    pub fn id(&self) -> NodeId {
        match self {
            Marker::TrailingComma { id, .. }
            | Marker::Semicolon { id }
            | Marker::ParseExceptionResult { id, .. }
            | Marker::Custom { id, .. } => *id,
        }
    }

    pub fn semicolon() -> Self {
        Marker::Semicolon { id: NodeId::random() }
    }

    pub fn trailing_comma(suffix: Space) -> Self {
        Marker::TrailingComma { id: NodeId::random(), suffix }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Markers {
    pub id: NodeId,
    pub markers: Vec<Marker>,
}

impl Markers {
    pub const fn empty() -> Self {
        Markers { id: NodeId::nil(), markers: Vec::new() }
    }

    pub fn build(markers: Vec<Marker>) -> Self {
        Markers { id: NodeId::random(), markers }
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn add(mut self, marker: Marker) -> Self {
        if self.id.is_nil() {
            self.id = NodeId::random();
        }
        self.markers.push(marker);
        self
    }

    pub fn has_semicolon(&self) -> bool {
        self.markers.iter().any(|m| matches!(m, Marker::Semicolon { .. }))
    }

    pub fn trailing_comma(&self) -> Option<&Space> {
        self.markers.iter().find_map(|m| match m {
            Marker::TrailingComma { suffix, .. } => Some(suffix),
            _ => None,
        })
    }

    pub fn parse_exception(&self) -> Option<&Marker> {
        self.markers.iter().find(|m| matches!(m, Marker::ParseExceptionResult { .. }))
    }
}

impl Default for Markers {
    fn default() -> Self {
        Markers::empty()
    }
}
