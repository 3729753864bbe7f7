//! Traversal engine.
//!
//! [`TreeVisitor`] is a double-dispatch visitor over the core node namespace.
//! [`TreeVisitor::visit`] pushes the node onto the [`Cursor`], brackets the
//! dispatch with `pre_visit`/`post_visit` and calls the `visit_<kind>` method
//! matching the node's kind. The default kind methods visit every child in
//! declaration order and rebuild the node only when a child came back as a
//! different `Arc`; otherwise the original `Arc` is returned, so untouched
//! subtrees are shared between the input and the output tree.
//!
//! Nodes outside the core namespace are routed through `visit_extension`,
//! which by default asks the kind registry for the owning extension's adapter.
//! The JavaScript layer adds its own dispatch on top via [`JsVisitor`].
//!
//! All visit methods are async. Children are visited one at a time, depth
//! first, left to right.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{LstError, Result};
use crate::registry;
use crate::tree::j::{
    Assignment, Binary, Block, Empty, FieldAccess, Identifier, If, Literal, MethodInvocation, NamedVariable, Opaque,
    Parentheses, Return, Unary, Unknown, UnknownSource,
};
use crate::tree::{J, JavaType, Markers, Space, TreeRef};

pub mod control;
pub mod cursor;
pub mod js;

pub use control::StopToken;
pub use cursor::Cursor;
pub use js::{dispatch_js, visit_js_children, JsVisitor};

/// Type-erased view of a visitor, handed to node child walks and to extension
/// adapters so they can recurse without knowing the visitor's context type.
#[async_trait]
pub trait ChildVisitor: Send {
    /// Visits `tree`; `cursor` points at its parent.
    async fn visit_child(&mut self, tree: &TreeRef, cursor: &Cursor) -> Result<TreeRef>;

    /// `None` when the space is unchanged.
    async fn visit_space(&mut self, space: &Space, cursor: &Cursor) -> Result<Option<Space>>;

    async fn visit_markers(&mut self, markers: &Markers, cursor: &Cursor) -> Result<Option<Markers>>;

    async fn visit_type(&mut self, ty: Option<&JavaType>, cursor: &Cursor) -> Result<Option<Option<JavaType>>>;
}

/// Adapts a [`TreeVisitor`] and its context into a [`ChildVisitor`].
pub struct CoreBridge<'a, V: ?Sized, P> {
    visitor: &'a mut V,
    p: &'a mut P,
}

impl<'a, V: ?Sized, P> CoreBridge<'a, V, P> {
    pub fn new(visitor: &'a mut V, p: &'a mut P) -> Self {
        CoreBridge { visitor, p }
    }
}

#[async_trait]
impl<V, P> ChildVisitor for CoreBridge<'_, V, P>
where
    V: TreeVisitor<P> + ?Sized,
    P: Send + 'static,
{
    async fn visit_child(&mut self, tree: &TreeRef, cursor: &Cursor) -> Result<TreeRef> {
        self.visitor.visit(tree, self.p, cursor).await
    }

    async fn visit_space(&mut self, space: &Space, cursor: &Cursor) -> Result<Option<Space>> {
        self.visitor.visit_space(space, self.p, cursor).await
    }

    async fn visit_markers(&mut self, markers: &Markers, cursor: &Cursor) -> Result<Option<Markers>> {
        self.visitor.visit_markers(markers, self.p, cursor).await
    }

    async fn visit_type(&mut self, ty: Option<&JavaType>, cursor: &Cursor) -> Result<Option<Option<JavaType>>> {
        self.visitor.visit_type(ty, self.p, cursor).await
    }
}

/// Visitor over the core node namespace, threading a context value `P`.
///
/// Every `visit_<kind>` method receives the node as a shared handle (`tree`)
/// and as its concrete struct (`node`), plus a cursor whose value is `tree`.
/// Returning `tree` itself signals "unchanged".
#[async_trait]
pub trait TreeVisitor<P: Send + 'static>: Send {
    /// Polled at the top of every visit; once true, visits return their input.
    fn is_stopped(&self) -> bool {
        false
    }

    /// Entry point for a whole tree.
    async fn visit_root(&mut self, tree: &TreeRef, p: &mut P) -> Result<TreeRef> {
        self.visit(tree, p, &Cursor::root()).await
    }

    /// Visits one node. `parent` points at the node's parent.
    ///
    /// Overrides can run [`walk`] to keep the default behavior around their
    /// own logic.
    async fn visit(&mut self, tree: &TreeRef, p: &mut P, parent: &Cursor) -> Result<TreeRef> {
        walk(self, tree, p, parent).await
    }

    async fn pre_visit(&mut self, tree: &TreeRef, _p: &mut P, _cursor: &Cursor) -> Result<TreeRef> {
        Ok(tree.clone())
    }

    async fn post_visit(&mut self, tree: &TreeRef, _p: &mut P, _cursor: &Cursor) -> Result<TreeRef> {
        Ok(tree.clone())
    }

    async fn visit_space(&mut self, _space: &Space, _p: &mut P, _cursor: &Cursor) -> Result<Option<Space>> {
        Ok(None)
    }

    async fn visit_markers(&mut self, _markers: &Markers, _p: &mut P, _cursor: &Cursor) -> Result<Option<Markers>> {
        Ok(None)
    }

    async fn visit_type(
        &mut self,
        _ty: Option<&JavaType>,
        _p: &mut P,
        _cursor: &Cursor,
    ) -> Result<Option<Option<JavaType>>> {
        Ok(None)
    }

    /// Handles any node outside the core namespace.
    ///
    /// The default walks the node's children through the adapter registered
    /// for its kind and fails with [`LstError::UnknownKind`] if there is none.
    async fn visit_extension(&mut self, tree: &TreeRef, p: &mut P, cursor: &Cursor) -> Result<TreeRef> {
        visit_children(self, tree, p, cursor).await
    }

    async fn visit_identifier(
        &mut self,
        tree: &TreeRef,
        _node: &Identifier,
        p: &mut P,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        visit_children(self, tree, p, cursor).await
    }

    async fn visit_literal(&mut self, tree: &TreeRef, _node: &Literal, p: &mut P, cursor: &Cursor) -> Result<TreeRef> {
        visit_children(self, tree, p, cursor).await
    }

    async fn visit_binary(&mut self, tree: &TreeRef, _node: &Binary, p: &mut P, cursor: &Cursor) -> Result<TreeRef> {
        visit_children(self, tree, p, cursor).await
    }

    async fn visit_unary(&mut self, tree: &TreeRef, _node: &Unary, p: &mut P, cursor: &Cursor) -> Result<TreeRef> {
        visit_children(self, tree, p, cursor).await
    }

    async fn visit_assignment(
        &mut self,
        tree: &TreeRef,
        _node: &Assignment,
        p: &mut P,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        visit_children(self, tree, p, cursor).await
    }

    async fn visit_parentheses(
        &mut self,
        tree: &TreeRef,
        _node: &Parentheses,
        p: &mut P,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        visit_children(self, tree, p, cursor).await
    }

    async fn visit_field_access(
        &mut self,
        tree: &TreeRef,
        _node: &FieldAccess,
        p: &mut P,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        visit_children(self, tree, p, cursor).await
    }

    async fn visit_method_invocation(
        &mut self,
        tree: &TreeRef,
        _node: &MethodInvocation,
        p: &mut P,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        visit_children(self, tree, p, cursor).await
    }

    async fn visit_block(&mut self, tree: &TreeRef, _node: &Block, p: &mut P, cursor: &Cursor) -> Result<TreeRef> {
        visit_children(self, tree, p, cursor).await
    }

    async fn visit_if(&mut self, tree: &TreeRef, _node: &If, p: &mut P, cursor: &Cursor) -> Result<TreeRef> {
        visit_children(self, tree, p, cursor).await
    }

    async fn visit_return(&mut self, tree: &TreeRef, _node: &Return, p: &mut P, cursor: &Cursor) -> Result<TreeRef> {
        visit_children(self, tree, p, cursor).await
    }

    async fn visit_named_variable(
        &mut self,
        tree: &TreeRef,
        _node: &NamedVariable,
        p: &mut P,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        visit_children(self, tree, p, cursor).await
    }

    async fn visit_empty(&mut self, tree: &TreeRef, _node: &Empty, p: &mut P, cursor: &Cursor) -> Result<TreeRef> {
        visit_children(self, tree, p, cursor).await
    }

    async fn visit_unknown(&mut self, tree: &TreeRef, _node: &Unknown, p: &mut P, cursor: &Cursor) -> Result<TreeRef> {
        visit_children(self, tree, p, cursor).await
    }

    async fn visit_unknown_source(
        &mut self,
        tree: &TreeRef,
        _node: &UnknownSource,
        p: &mut P,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        visit_children(self, tree, p, cursor).await
    }

    /// Opaque nodes are passed through untouched.
    async fn visit_opaque(&mut self, tree: &TreeRef, _node: &Opaque, _p: &mut P, _cursor: &Cursor) -> Result<TreeRef> {
        Ok(tree.clone())
    }
}

/// The default body of [`TreeVisitor::visit`].
pub async fn walk<V, P>(v: &mut V, tree: &TreeRef, p: &mut P, parent: &Cursor) -> Result<TreeRef>
where
    V: TreeVisitor<P> + ?Sized,
    P: Send + 'static,
{
    if v.is_stopped() {
        return Ok(tree.clone());
    }
    let cursor = parent.push(tree.clone());
    let pre = v.pre_visit(tree, p, &cursor).await?;
    let cursor = if Arc::ptr_eq(&pre, tree) { cursor } else { parent.push(pre.clone()) };
    let visited = dispatch(v, &pre, p, &cursor).await?;
    if v.is_stopped() {
        return Ok(visited);
    }
    v.post_visit(&visited, p, &cursor).await
}

/// Calls the `visit_<kind>` method matching `tree`'s kind.
pub async fn dispatch<V, P>(v: &mut V, tree: &TreeRef, p: &mut P, cursor: &Cursor) -> Result<TreeRef>
where
    V: TreeVisitor<P> + ?Sized,
    P: Send + 'static,
{
    let Some(j) = tree.as_j() else {
        return v.visit_extension(tree, p, cursor).await;
    };
    match j {
        J::Identifier(n) => v.visit_identifier(tree, n, p, cursor).await,
        J::Literal(n) => v.visit_literal(tree, n, p, cursor).await,
        J::Binary(n) => v.visit_binary(tree, n, p, cursor).await,
        J::Unary(n) => v.visit_unary(tree, n, p, cursor).await,
        J::Assignment(n) => v.visit_assignment(tree, n, p, cursor).await,
        J::Parentheses(n) => v.visit_parentheses(tree, n, p, cursor).await,
        J::FieldAccess(n) => v.visit_field_access(tree, n, p, cursor).await,
        J::MethodInvocation(n) => v.visit_method_invocation(tree, n, p, cursor).await,
        J::Block(n) => v.visit_block(tree, n, p, cursor).await,
        J::If(n) => v.visit_if(tree, n, p, cursor).await,
        J::Return(n) => v.visit_return(tree, n, p, cursor).await,
        J::NamedVariable(n) => v.visit_named_variable(tree, n, p, cursor).await,
        J::Empty(n) => v.visit_empty(tree, n, p, cursor).await,
        J::Unknown(n) => v.visit_unknown(tree, n, p, cursor).await,
        J::UnknownSource(n) => v.visit_unknown_source(tree, n, p, cursor).await,
        J::Opaque(n) => v.visit_opaque(tree, n, p, cursor).await,
    }
}

/// Visits every child of `tree` and rebuilds it only if one of them changed.
///
/// Core nodes are walked directly. Any other node is walked through the
/// extension adapter registered for its kind.
pub async fn visit_children<V, P>(v: &mut V, tree: &TreeRef, p: &mut P, cursor: &Cursor) -> Result<TreeRef>
where
    V: TreeVisitor<P> + ?Sized,
    P: Send + 'static,
{
    let mut bridge = CoreBridge::new(v, p);
    if let Some(j) = tree.as_j() {
        return Ok(match j.map_children(&mut bridge, cursor).await? {
            Some(rebuilt) => Arc::new(rebuilt),
            None => tree.clone(),
        });
    }
    let Some(adapter) = registry::adapter_for(tree.kind()) else {
        return Err(LstError::UnknownKind { kind: tree.kind().to_string(), id: tree.id() });
    };
    adapter.visit_children(tree, &mut bridge, cursor).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::j::BinaryOperator;
    use crate::tree::{LeftPadded, Markers, NodeId};

    struct Identity;

    impl TreeVisitor<()> for Identity {}

    struct Renamer;

    #[async_trait]
    impl TreeVisitor<usize> for Renamer {
        async fn visit_identifier(
            &mut self,
            tree: &TreeRef,
            node: &Identifier,
            count: &mut usize,
            _cursor: &Cursor,
        ) -> Result<TreeRef> {
            if node.simple_name != "a" {
                return Ok(tree.clone());
            }
            *count += 1;
            Ok(Identifier { simple_name: "z".to_string(), ..node.clone() }.into_tree())
        }
    }

    fn binary() -> TreeRef {
        Binary {
            id: NodeId::random(),
            prefix: Space::EMPTY,
            markers: Markers::empty(),
            left: Identifier::new(Space::EMPTY, "a").into_tree(),
            operator: LeftPadded::new(Space::single_space(), BinaryOperator::Addition),
            right: Identifier::new(Space::single_space(), "b").into_tree(),
            ty: None,
        }
        .into_tree()
    }

    #[tokio::test]
    async fn test_identity_visit_shares_tree() {
        let tree = binary();
        let out = Identity.visit_root(&tree, &mut ()).await.unwrap();
        assert!(Arc::ptr_eq(&tree, &out));
    }

    #[tokio::test]
    async fn test_rewrite_rebuilds_only_changed_path() {
        let tree = binary();
        let mut count = 0;
        let out = Renamer.visit_root(&tree, &mut count).await.unwrap();
        assert_eq!(count, 1);
        assert!(!Arc::ptr_eq(&tree, &out));
        assert_eq!(out.id(), tree.id());

        let (before, after) = match (tree.as_j(), out.as_j()) {
            (Some(J::Binary(before)), Some(J::Binary(after))) => (before, after),
            other => panic!("expected binaries, got {other:?}"),
        };
        assert!(!Arc::ptr_eq(&before.left, &after.left));
        assert!(Arc::ptr_eq(&before.right, &after.right));
    }
}
