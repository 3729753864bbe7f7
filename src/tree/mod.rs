//! Lossless semantic tree model
//!
//! Nodes are immutable values shared behind `Arc`. The tree is split into two
//! kind namespaces:
//! - `J`: the generic core language layer (identifiers, literals, operators, blocks)
//! - `Js`: the JavaScript/TypeScript extension layer
//!
//! Both implement the language-agnostic [`Tree`] trait, so any child field can
//! hold a node from either namespace. Code that only knows the core layer
//! reaches extension nodes through the kind registry (see [`crate::registry`]).
//!
//! # Structural sharing
//!
//! A transformation that leaves a subtree untouched returns the very same
//! `Arc`, which lets every ancestor detect "nothing changed" with
//! `Arc::ptr_eq` and return itself as well.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

#[macro_use]
mod macros;

pub mod id;
pub mod j;
pub mod java_type;
pub mod js;
pub mod kind;
pub mod markers;
pub mod space;
pub(crate) mod walk;

pub use id::NodeId;
pub use j::J;
pub use java_type::JavaType;
pub use js::Js;
pub use kind::Kind;
pub use markers::{Marker, Markers};
pub use space::{Comment, Container, LeftPadded, RightPadded, Space};

/// Shared handle to any node.
pub type TreeRef = Arc<dyn Tree>;

/// Language-agnostic interface implemented by every node namespace.
pub trait Tree: Send + Sync + fmt::Debug + Any {
    /// Discriminant identifying the concrete variant.
    fn kind(&self) -> Kind;

    fn id(&self) -> NodeId;

    /// Formatting between the previous token and this node's first token.
    fn prefix(&self) -> &Space;

    fn markers(&self) -> &Markers;

    fn as_any(&self) -> &dyn Any;

    fn with_prefix(&self, prefix: Space) -> TreeRef;

    fn with_markers(&self, markers: Markers) -> TreeRef;

    fn with_id(&self, id: NodeId) -> TreeRef;
}

impl dyn Tree {
    pub fn downcast_ref<T: Tree>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn as_j(&self) -> Option<&J> {
        self.downcast_ref::<J>()
    }

    pub fn as_js(&self) -> Option<&Js> {
        self.downcast_ref::<Js>()
    }

    pub fn is_kind(&self, kind: Kind) -> bool {
        self.kind() == kind
    }
}

/// Reference equality between two optional children.
pub(crate) fn same_opt(a: Option<&TreeRef>, b: Option<&TreeRef>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}

/// Narrowing from any node to one concrete node struct.
pub trait TreeCast: Sized {
    fn cast(tree: &dyn Tree) -> Option<&Self>;
}

/// Fails with a `TypeMismatch` naming the expected and actual kinds.
pub fn expect_cast<'a, T: TreeCast>(tree: &'a dyn Tree, expected: Kind) -> crate::Result<&'a T> {
    T::cast(tree).ok_or_else(|| crate::LstError::TypeMismatch {
        expected: expected.to_string(),
        actual: tree.kind().to_string(),
    })
}
