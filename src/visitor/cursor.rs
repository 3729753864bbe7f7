use std::fmt;

use archery::ArcK;
use rpds::List;

use crate::tree::{Kind, TreeRef};

/// Ancestor chain of the node currently being visited.
///
/// Built by the traversal engine on the way down and never stored on nodes. The
/// chain is a persistent list, so pushing a child shares the whole parent chain
/// and a cursor can be cloned and kept around cheaply.
#[derive(Clone)]
pub struct Cursor {
    path: List<TreeRef, ArcK>,
}

impl Cursor {
    /// Cursor above the root of a traversal.
    pub fn root() -> Self {
        Cursor { path: List::new_with_ptr_kind() }
    }

    pub fn push(&self, tree: TreeRef) -> Cursor {
        Cursor { path: self.path.push_front(tree) }
    }

    /// The node this cursor points at; `None` above the root.
    pub fn value(&self) -> Option<&TreeRef> {
        self.path.first()
    }

    pub fn parent(&self) -> Option<Cursor> {
        self.path.drop_first().map(|path| Cursor { path })
    }

    pub fn parent_tree(&self) -> Option<&TreeRef> {
        self.path.iter().nth(1)
    }

    /// Number of nodes on the chain, the current node included.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Ancestors from the direct parent up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &TreeRef> {
        self.path.iter().skip(1)
    }

    /// Nearest node of `kind` on the chain, starting with the current node.
    pub fn first_enclosing(&self, kind: Kind) -> Option<&TreeRef> {
        self.path.iter().find(|tree| tree.kind() == kind)
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor::root()
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.path.iter().map(|tree| tree.kind().simple_name())).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::j::Identifier;
    use crate::tree::kind;
    use crate::tree::Space;

    #[test]
    fn test_push_shares_parent_chain() {
        let a = Identifier::new(Space::EMPTY, "a").into_tree();
        let b = Identifier::new(Space::EMPTY, "b").into_tree();

        let root = Cursor::root();
        let first = root.push(a.clone());
        let second = first.push(b.clone());

        assert!(root.is_root());
        assert_eq!(second.depth(), 2);
        assert!(std::sync::Arc::ptr_eq(second.value().unwrap(), &b));
        assert!(std::sync::Arc::ptr_eq(second.parent_tree().unwrap(), &a));
        assert_eq!(second.ancestors().count(), 1);
        assert_eq!(second.parent().map(|c| c.depth()), Some(1));
        assert_eq!(first.depth(), 1);
    }

    #[test]
    fn test_first_enclosing_finds_nearest_kind() {
        let a = Identifier::new(Space::EMPTY, "a").into_tree();
        let cursor = Cursor::root().push(a.clone());
        assert!(cursor.first_enclosing(kind::j::IDENTIFIER).is_some());
        assert!(cursor.first_enclosing(kind::j::BINARY).is_none());
    }
}
