//! JavaScript/TypeScript layer of the traversal engine.
//!
//! A [`JsVisitor`] is a [`TreeVisitor`] that also has a `visit_<kind>` method
//! for every extension kind. The core dispatch hands extension nodes to
//! `visit_extension`; implementors route them here by overriding it:
//!
//! ```ignore
//! async fn visit_extension(&mut self, tree: &TreeRef, p: &mut P, cursor: &Cursor) -> Result<TreeRef> {
//!     dispatch_js(self, tree, p, cursor).await
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{LstError, Result};
use crate::registry::ExtensionAdapter;
use crate::tree::js::{
    Alias, ArrowFunction, Await, CompilationUnit, ExpressionStatement, Import, ScopedVariableDeclarations, TypeOf,
    Void,
};
use crate::tree::{kind, Js, TreeRef};

use super::{visit_children, ChildVisitor, CoreBridge, Cursor, TreeVisitor};

#[async_trait]
pub trait JsVisitor<P: Send + 'static>: TreeVisitor<P> {
    async fn visit_compilation_unit(
        &mut self,
        tree: &TreeRef,
        _node: &CompilationUnit,
        p: &mut P,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        visit_js_children(self, tree, p, cursor).await
    }

    async fn visit_scoped_variable_declarations(
        &mut self,
        tree: &TreeRef,
        _node: &ScopedVariableDeclarations,
        p: &mut P,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        visit_js_children(self, tree, p, cursor).await
    }

    async fn visit_expression_statement(
        &mut self,
        tree: &TreeRef,
        _node: &ExpressionStatement,
        p: &mut P,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        visit_js_children(self, tree, p, cursor).await
    }

    async fn visit_import(&mut self, tree: &TreeRef, _node: &Import, p: &mut P, cursor: &Cursor) -> Result<TreeRef> {
        visit_js_children(self, tree, p, cursor).await
    }

    async fn visit_alias(&mut self, tree: &TreeRef, _node: &Alias, p: &mut P, cursor: &Cursor) -> Result<TreeRef> {
        visit_js_children(self, tree, p, cursor).await
    }

    async fn visit_arrow_function(
        &mut self,
        tree: &TreeRef,
        _node: &ArrowFunction,
        p: &mut P,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        visit_js_children(self, tree, p, cursor).await
    }

    async fn visit_type_of(&mut self, tree: &TreeRef, _node: &TypeOf, p: &mut P, cursor: &Cursor) -> Result<TreeRef> {
        visit_js_children(self, tree, p, cursor).await
    }

    async fn visit_await(&mut self, tree: &TreeRef, _node: &Await, p: &mut P, cursor: &Cursor) -> Result<TreeRef> {
        visit_js_children(self, tree, p, cursor).await
    }

    async fn visit_void(&mut self, tree: &TreeRef, _node: &Void, p: &mut P, cursor: &Cursor) -> Result<TreeRef> {
        visit_js_children(self, tree, p, cursor).await
    }
}

/// Calls the `visit_<kind>` method matching an extension node's kind.
///
/// Nodes from any other extension fall back to the registry-driven child walk.
pub async fn dispatch_js<V, P>(v: &mut V, tree: &TreeRef, p: &mut P, cursor: &Cursor) -> Result<TreeRef>
where
    V: JsVisitor<P> + ?Sized,
    P: Send + 'static,
{
    let Some(js) = tree.as_js() else {
        return visit_children(v, tree, p, cursor).await;
    };
    match js {
        Js::CompilationUnit(n) => v.visit_compilation_unit(tree, n, p, cursor).await,
        Js::ScopedVariableDeclarations(n) => v.visit_scoped_variable_declarations(tree, n, p, cursor).await,
        Js::ExpressionStatement(n) => v.visit_expression_statement(tree, n, p, cursor).await,
        Js::Import(n) => v.visit_import(tree, n, p, cursor).await,
        Js::Alias(n) => v.visit_alias(tree, n, p, cursor).await,
        Js::ArrowFunction(n) => v.visit_arrow_function(tree, n, p, cursor).await,
        Js::TypeOf(n) => v.visit_type_of(tree, n, p, cursor).await,
        Js::Await(n) => v.visit_await(tree, n, p, cursor).await,
        Js::Void(n) => v.visit_void(tree, n, p, cursor).await,
    }
}

/// Default child walk for extension nodes, without a registry round trip.
pub async fn visit_js_children<V, P>(v: &mut V, tree: &TreeRef, p: &mut P, cursor: &Cursor) -> Result<TreeRef>
where
    V: TreeVisitor<P> + ?Sized,
    P: Send + 'static,
{
    let Some(js) = tree.as_js() else {
        return visit_children(v, tree, p, cursor).await;
    };
    let mut bridge = CoreBridge::new(v, p);
    Ok(match js.map_children(&mut bridge, cursor).await? {
        Some(rebuilt) => Arc::new(rebuilt),
        None => tree.clone(),
    })
}

/// Registry adapter that lets core-only visitors descend into extension nodes.
#[derive(Debug, Default)]
pub struct JsAdapter;

#[async_trait]
impl ExtensionAdapter for JsAdapter {
    fn namespace(&self) -> &'static str {
        kind::JS_NAMESPACE
    }

    async fn visit_children(
        &self,
        tree: &TreeRef,
        visitor: &mut dyn ChildVisitor,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let js = tree.as_js().ok_or_else(|| LstError::TypeMismatch {
            expected: kind::JS_NAMESPACE.to_string(),
            actual: tree.kind().to_string(),
        })?;
        Ok(match js.map_children(visitor, cursor).await? {
            Some(rebuilt) => Arc::new(rebuilt),
            None => tree.clone(),
        })
    }
}
