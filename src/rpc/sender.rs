//! Diff producer: a visitor that writes every field of a node to the send
//! queue, diffed against the revision the peer holds.
//!
//! The node being sent is the visited tree; the peer's revision of it is the
//! top of the queue's "before" stack. Fields are written in declaration order,
//! which the receiver mirrors exactly.

use std::sync::Arc;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::{LstError, Result};
use crate::tree::j::{
    Assignment, Binary, Block, Empty, FieldAccess, Identifier, If, Literal, MethodInvocation, NamedVariable, Opaque,
    Parentheses, Return, Unary, Unknown, UnknownSource,
};
use crate::tree::java_type::same_type;
use crate::tree::js::{
    Alias, ArrowFunction, Await, CompilationUnit, ExpressionStatement, Import, ScopedVariableDeclarations, TypeOf,
    Void,
};
use crate::tree::{Container, JavaType, LeftPadded, NodeId, RightPadded, Tree, TreeCast, TreeRef, J};
use crate::visitor::{dispatch_js, walk, Cursor, JsVisitor, TreeVisitor};

use super::{RpcObjectData, RpcSendQueue};

/// Writes a scalar field: `NoChange` when equal, else its new value.
pub async fn send_value<T>(q: &mut RpcSendQueue, before: Option<&T>, after: Option<&T>) -> Result<()>
where
    T: Serialize + PartialEq + Sync,
{
    let op = match (before, after) {
        (before, after) if before == after => RpcObjectData::no_change(),
        (_, None) => RpcObjectData::delete(),
        (None, Some(after)) => RpcObjectData::add_value(to_json(after)?),
        (Some(_), Some(after)) => RpcObjectData::change_value(to_json(after)?),
    };
    q.put(op).await
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| LstError::codec("outgoing value", e))
}

/// Writes a type attribution, by reference number when the peer has seen it.
pub async fn send_type(q: &mut RpcSendQueue, before: Option<&JavaType>, after: Option<&JavaType>) -> Result<()> {
    if same_type(before, after) {
        return q.put(RpcObjectData::no_change()).await;
    }
    let Some(ty) = after else {
        return q.put(RpcObjectData::delete()).await;
    };
    put_type(q, opening(before.is_some()), ty).await
}

/// Writes `ty` behind `open`: a back reference when already numbered, else
/// the full value, numbered when it has shared identity.
async fn put_type(q: &mut RpcSendQueue, open: RpcObjectData, ty: &JavaType) -> Result<()> {
    let op = match q.type_refs().lookup(ty) {
        Some(ref_id) => open.with_ref(ref_id),
        None => {
            let op = RpcObjectData { value: Some(to_json(ty)?), ..open };
            match q.type_refs().assign(ty) {
                Some(ref_id) => op.with_ref(ref_id),
                None => op,
            }
        }
    };
    q.put(op).await
}

/// Re-emits a captured frame, numbering its types in this exchange.
async fn replay_opaque(q: &mut RpcSendQueue, opaque: &Opaque) -> Result<()> {
    let captured: FxHashMap<usize, &JavaType> = opaque.types.iter().map(|(idx, ty)| (*idx, ty)).collect();
    for (idx, op) in opaque.ops.iter().enumerate() {
        let parsed: JavaType;
        let ty = match (captured.get(&idx), op.ref_id, &op.value) {
            (Some(ty), _, _) => *ty,
            (None, None, _) => {
                q.put(op.clone()).await?;
                continue;
            }
            (None, Some(_), Some(value)) => {
                parsed = serde_json::from_value(value.clone()).map_err(|e| LstError::codec("opaque type", e))?;
                &parsed
            }
            (None, Some(ref_id), None) => return Err(LstError::UnknownReference(ref_id)),
        };
        let open = RpcObjectData { state: op.state, value_type: op.value_type.clone(), value: None, ref_id: None };
        put_type(q, open, ty).await?;
    }
    Ok(())
}

fn same_right_padded(a: &RightPadded<TreeRef>, b: &RightPadded<TreeRef>) -> bool {
    Arc::ptr_eq(&a.element, &b.element) && a.after == b.after && a.markers == b.markers
}

fn same_list(a: &[RightPadded<TreeRef>], b: &[RightPadded<TreeRef>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| same_right_padded(a, b))
}

fn opening(before_present: bool) -> RpcObjectData {
    if before_present { RpcObjectData::change_object() } else { RpcObjectData::add_object(None) }
}

/// Sender for core and JavaScript nodes.
#[derive(Debug, Default)]
pub struct JsSender;

impl JsSender {
    /// Writes a child node: `NoChange` when the peer holds the same `Arc`,
    /// otherwise a frame carrying the node's fields.
    ///
    /// A node whose kind or id differs from the peer's is sent as an add.
    pub async fn send_tree(
        &mut self,
        q: &mut RpcSendQueue,
        before: Option<&TreeRef>,
        after: Option<&TreeRef>,
        cursor: &Cursor,
    ) -> Result<()> {
        let after = match (before, after) {
            (None, None) => return q.put(RpcObjectData::no_change()).await,
            (Some(before), Some(after)) if Arc::ptr_eq(before, after) => {
                return q.put(RpcObjectData::no_change()).await;
            }
            (_, None) => return q.put(RpcObjectData::delete()).await,
            (_, Some(after)) => after,
        };

        if let Some(J::Opaque(opaque)) = after.as_j() {
            return replay_opaque(q, opaque).await;
        }

        let before = before.filter(|b| b.kind() == after.kind() && b.id() == after.id());
        let open = match before {
            Some(_) => RpcObjectData::change_object(),
            None => RpcObjectData::add_object(Some(after.kind().to_string())),
        };
        q.put(open).await?;
        q.push_before(before.cloned());
        let sent = self.visit(after, q, cursor).await;
        q.pop_before();
        sent?;
        q.put(RpcObjectData::end_of_object()).await
    }

    async fn send_right_padded(
        &mut self,
        q: &mut RpcSendQueue,
        before: Option<&RightPadded<TreeRef>>,
        after: Option<&RightPadded<TreeRef>>,
        cursor: &Cursor,
    ) -> Result<()> {
        let after = match (before, after) {
            (None, None) => return q.put(RpcObjectData::no_change()).await,
            (Some(b), Some(a)) if same_right_padded(b, a) => return q.put(RpcObjectData::no_change()).await,
            (_, None) => return q.put(RpcObjectData::delete()).await,
            (_, Some(after)) => after,
        };
        q.put(opening(before.is_some())).await?;
        self.send_tree(q, before.map(|b| &b.element), Some(&after.element), cursor).await?;
        send_value(q, before.map(|b| &b.after), Some(&after.after)).await?;
        send_value(q, before.map(|b| &b.markers), Some(&after.markers)).await?;
        q.put(RpcObjectData::end_of_object()).await
    }

    async fn send_left_padded(
        &mut self,
        q: &mut RpcSendQueue,
        before: Option<&LeftPadded<TreeRef>>,
        after: Option<&LeftPadded<TreeRef>>,
        cursor: &Cursor,
    ) -> Result<()> {
        let after = match (before, after) {
            (None, None) => return q.put(RpcObjectData::no_change()).await,
            (Some(b), Some(a)) if Arc::ptr_eq(&b.element, &a.element) && b.before == a.before && b.markers == a.markers => {
                return q.put(RpcObjectData::no_change()).await;
            }
            (_, None) => return q.put(RpcObjectData::delete()).await,
            (_, Some(after)) => after,
        };
        q.put(opening(before.is_some())).await?;
        send_value(q, before.map(|b| &b.before), Some(&after.before)).await?;
        self.send_tree(q, before.map(|b| &b.element), Some(&after.element), cursor).await?;
        send_value(q, before.map(|b| &b.markers), Some(&after.markers)).await?;
        q.put(RpcObjectData::end_of_object()).await
    }

    async fn send_left_value<T>(
        &mut self,
        q: &mut RpcSendQueue,
        before: Option<&LeftPadded<T>>,
        after: &LeftPadded<T>,
    ) -> Result<()>
    where
        T: Serialize + PartialEq + Sync,
    {
        if before == Some(after) {
            return q.put(RpcObjectData::no_change()).await;
        }
        q.put(opening(before.is_some())).await?;
        send_value(q, before.map(|b| &b.before), Some(&after.before)).await?;
        send_value(q, before.map(|b| &b.element), Some(&after.element)).await?;
        send_value(q, before.map(|b| &b.markers), Some(&after.markers)).await?;
        q.put(RpcObjectData::end_of_object()).await
    }

    /// Writes a padded list, matching elements to the peer's by id.
    async fn send_list(
        &mut self,
        q: &mut RpcSendQueue,
        before: Option<&[RightPadded<TreeRef>]>,
        after: Option<&[RightPadded<TreeRef>]>,
        cursor: &Cursor,
    ) -> Result<()> {
        let after = match (before, after) {
            (None, None) => return q.put(RpcObjectData::no_change()).await,
            (Some(b), Some(a)) if same_list(b, a) => return q.put(RpcObjectData::no_change()).await,
            (_, None) => return q.put(RpcObjectData::delete()).await,
            (_, Some(after)) => after,
        };
        q.put(opening(before.is_some())).await?;

        let before = before.unwrap_or(&[]);
        let by_id: FxHashMap<NodeId, usize> =
            before.iter().enumerate().map(|(idx, rp)| (rp.element.id(), idx)).collect();
        let positions: Vec<i64> = after
            .iter()
            .map(|rp| by_id.get(&rp.element.id()).map_or(-1, |&idx| idx as i64))
            .collect();
        q.put(RpcObjectData::change_value(to_json(&positions)?)).await?;

        for (rp, &pos) in after.iter().zip(&positions) {
            let prior = usize::try_from(pos).ok().and_then(|idx| before.get(idx));
            self.send_right_padded(q, prior, Some(rp), cursor).await?;
        }
        q.put(RpcObjectData::end_of_object()).await
    }

    async fn send_container(
        &mut self,
        q: &mut RpcSendQueue,
        before: Option<&Container<TreeRef>>,
        after: Option<&Container<TreeRef>>,
        cursor: &Cursor,
    ) -> Result<()> {
        let after = match (before, after) {
            (None, None) => return q.put(RpcObjectData::no_change()).await,
            (Some(b), Some(a)) if b.before == a.before && b.markers == a.markers && same_list(&b.elements, &a.elements) => {
                return q.put(RpcObjectData::no_change()).await;
            }
            (_, None) => return q.put(RpcObjectData::delete()).await,
            (_, Some(after)) => after,
        };
        q.put(opening(before.is_some())).await?;
        send_value(q, before.map(|b| &b.before), Some(&after.before)).await?;
        self.send_list(q, before.map(|b| b.elements.as_slice()), Some(after.elements.as_slice()), cursor).await?;
        send_value(q, before.map(|b| &b.markers), Some(&after.markers)).await?;
        q.put(RpcObjectData::end_of_object()).await
    }
}

/// The peer's revision of the node being sent, narrowed to its struct.
fn prior<T: TreeCast>(before: &Option<TreeRef>) -> Option<&T> {
    before.as_deref().and_then(T::cast)
}

#[async_trait]
impl TreeVisitor<RpcSendQueue> for JsSender {
    /// Writes the fields every node shares, then the kind-specific ones.
    async fn visit(&mut self, tree: &TreeRef, q: &mut RpcSendQueue, parent: &Cursor) -> Result<TreeRef> {
        let before = q.before();
        let b: Option<&dyn Tree> = before.as_deref();
        send_value(q, b.map(|b| b.id()).as_ref(), Some(&tree.id())).await?;
        send_value(q, b.map(|b| b.prefix()), Some(tree.prefix())).await?;
        send_value(q, b.map(|b| b.markers()), Some(tree.markers())).await?;
        walk(self, tree, q, parent).await
    }

    async fn visit_extension(&mut self, tree: &TreeRef, q: &mut RpcSendQueue, cursor: &Cursor) -> Result<TreeRef> {
        if tree.as_js().is_none() {
            return Err(LstError::UnknownKind { kind: tree.kind().to_string(), id: tree.id() });
        }
        dispatch_js(self, tree, q, cursor).await
    }

    async fn visit_identifier(
        &mut self,
        tree: &TreeRef,
        node: &Identifier,
        q: &mut RpcSendQueue,
        _cursor: &Cursor,
    ) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<Identifier>(&before);
        send_value(q, b.map(|b| &b.simple_name), Some(&node.simple_name)).await?;
        send_type(q, b.and_then(|b| b.ty.as_ref()), node.ty.as_ref()).await?;
        Ok(tree.clone())
    }

    async fn visit_literal(
        &mut self,
        tree: &TreeRef,
        node: &Literal,
        q: &mut RpcSendQueue,
        _cursor: &Cursor,
    ) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<Literal>(&before);
        send_value(q, b.and_then(|b| b.value.as_ref()), node.value.as_ref()).await?;
        send_value(q, b.and_then(|b| b.value_source.as_ref()), node.value_source.as_ref()).await?;
        send_type(q, b.and_then(|b| b.ty.as_ref()), node.ty.as_ref()).await?;
        Ok(tree.clone())
    }

    async fn visit_binary(
        &mut self,
        tree: &TreeRef,
        node: &Binary,
        q: &mut RpcSendQueue,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<Binary>(&before);
        self.send_tree(q, b.map(|b| &b.left), Some(&node.left), cursor).await?;
        self.send_left_value(q, b.map(|b| &b.operator), &node.operator).await?;
        self.send_tree(q, b.map(|b| &b.right), Some(&node.right), cursor).await?;
        send_type(q, b.and_then(|b| b.ty.as_ref()), node.ty.as_ref()).await?;
        Ok(tree.clone())
    }

    async fn visit_unary(&mut self, tree: &TreeRef, node: &Unary, q: &mut RpcSendQueue, cursor: &Cursor) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<Unary>(&before);
        self.send_left_value(q, b.map(|b| &b.operator), &node.operator).await?;
        self.send_tree(q, b.map(|b| &b.expression), Some(&node.expression), cursor).await?;
        send_type(q, b.and_then(|b| b.ty.as_ref()), node.ty.as_ref()).await?;
        Ok(tree.clone())
    }

    async fn visit_assignment(
        &mut self,
        tree: &TreeRef,
        node: &Assignment,
        q: &mut RpcSendQueue,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<Assignment>(&before);
        self.send_tree(q, b.map(|b| &b.variable), Some(&node.variable), cursor).await?;
        self.send_left_padded(q, b.map(|b| &b.assignment), Some(&node.assignment), cursor).await?;
        send_type(q, b.and_then(|b| b.ty.as_ref()), node.ty.as_ref()).await?;
        Ok(tree.clone())
    }

    async fn visit_parentheses(
        &mut self,
        tree: &TreeRef,
        node: &Parentheses,
        q: &mut RpcSendQueue,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<Parentheses>(&before);
        self.send_right_padded(q, b.map(|b| &b.tree), Some(&node.tree), cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_field_access(
        &mut self,
        tree: &TreeRef,
        node: &FieldAccess,
        q: &mut RpcSendQueue,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<FieldAccess>(&before);
        self.send_tree(q, b.map(|b| &b.target), Some(&node.target), cursor).await?;
        self.send_left_padded(q, b.map(|b| &b.name), Some(&node.name), cursor).await?;
        send_type(q, b.and_then(|b| b.ty.as_ref()), node.ty.as_ref()).await?;
        Ok(tree.clone())
    }

    async fn visit_method_invocation(
        &mut self,
        tree: &TreeRef,
        node: &MethodInvocation,
        q: &mut RpcSendQueue,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<MethodInvocation>(&before);
        self.send_right_padded(q, b.and_then(|b| b.select.as_ref()), node.select.as_ref(), cursor).await?;
        self.send_tree(q, b.map(|b| &b.name), Some(&node.name), cursor).await?;
        self.send_container(q, b.map(|b| &b.arguments), Some(&node.arguments), cursor).await?;
        send_type(q, b.and_then(|b| b.method_type.as_ref()), node.method_type.as_ref()).await?;
        Ok(tree.clone())
    }

    async fn visit_block(&mut self, tree: &TreeRef, node: &Block, q: &mut RpcSendQueue, cursor: &Cursor) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<Block>(&before);
        self.send_list(q, b.map(|b| b.statements.as_slice()), Some(node.statements.as_slice()), cursor).await?;
        send_value(q, b.map(|b| &b.end), Some(&node.end)).await?;
        Ok(tree.clone())
    }

    async fn visit_if(&mut self, tree: &TreeRef, node: &If, q: &mut RpcSendQueue, cursor: &Cursor) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<If>(&before);
        self.send_tree(q, b.map(|b| &b.condition), Some(&node.condition), cursor).await?;
        self.send_right_padded(q, b.map(|b| &b.then_part), Some(&node.then_part), cursor).await?;
        self.send_left_padded(q, b.and_then(|b| b.else_part.as_ref()), node.else_part.as_ref(), cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_return(
        &mut self,
        tree: &TreeRef,
        node: &Return,
        q: &mut RpcSendQueue,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<Return>(&before);
        self.send_tree(q, b.and_then(|b| b.expression.as_ref()), node.expression.as_ref(), cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_named_variable(
        &mut self,
        tree: &TreeRef,
        node: &NamedVariable,
        q: &mut RpcSendQueue,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<NamedVariable>(&before);
        self.send_tree(q, b.map(|b| &b.name), Some(&node.name), cursor).await?;
        self.send_left_padded(q, b.and_then(|b| b.initializer.as_ref()), node.initializer.as_ref(), cursor).await?;
        send_type(q, b.and_then(|b| b.variable_type.as_ref()), node.variable_type.as_ref()).await?;
        Ok(tree.clone())
    }

    async fn visit_empty(&mut self, tree: &TreeRef, _node: &Empty, _q: &mut RpcSendQueue, _cursor: &Cursor) -> Result<TreeRef> {
        Ok(tree.clone())
    }

    async fn visit_unknown(
        &mut self,
        tree: &TreeRef,
        node: &Unknown,
        q: &mut RpcSendQueue,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<Unknown>(&before);
        self.send_tree(q, b.map(|b| &b.source), Some(&node.source), cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_unknown_source(
        &mut self,
        tree: &TreeRef,
        node: &UnknownSource,
        q: &mut RpcSendQueue,
        _cursor: &Cursor,
    ) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<UnknownSource>(&before);
        send_value(q, b.map(|b| &b.text), Some(&node.text)).await?;
        Ok(tree.clone())
    }
}

#[async_trait]
impl JsVisitor<RpcSendQueue> for JsSender {
    async fn visit_compilation_unit(
        &mut self,
        tree: &TreeRef,
        node: &CompilationUnit,
        q: &mut RpcSendQueue,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<CompilationUnit>(&before);
        send_value(q, b.map(|b| &b.source_path), Some(&node.source_path)).await?;
        self.send_list(q, b.map(|b| b.statements.as_slice()), Some(node.statements.as_slice()), cursor).await?;
        send_value(q, b.map(|b| &b.eof), Some(&node.eof)).await?;
        Ok(tree.clone())
    }

    async fn visit_scoped_variable_declarations(
        &mut self,
        tree: &TreeRef,
        node: &ScopedVariableDeclarations,
        q: &mut RpcSendQueue,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<ScopedVariableDeclarations>(&before);
        send_value(q, b.map(|b| &b.scope), Some(&node.scope)).await?;
        self.send_list(q, b.map(|b| b.variables.as_slice()), Some(node.variables.as_slice()), cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_expression_statement(
        &mut self,
        tree: &TreeRef,
        node: &ExpressionStatement,
        q: &mut RpcSendQueue,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<ExpressionStatement>(&before);
        self.send_tree(q, b.map(|b| &b.expression), Some(&node.expression), cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_import(
        &mut self,
        tree: &TreeRef,
        node: &Import,
        q: &mut RpcSendQueue,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<Import>(&before);
        self.send_container(q, b.and_then(|b| b.specifiers.as_ref()), node.specifiers.as_ref(), cursor).await?;
        self.send_left_padded(q, b.map(|b| &b.module_specifier), Some(&node.module_specifier), cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_alias(&mut self, tree: &TreeRef, node: &Alias, q: &mut RpcSendQueue, cursor: &Cursor) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<Alias>(&before);
        self.send_right_padded(q, b.map(|b| &b.property_name), Some(&node.property_name), cursor).await?;
        self.send_tree(q, b.map(|b| &b.alias), Some(&node.alias), cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_arrow_function(
        &mut self,
        tree: &TreeRef,
        node: &ArrowFunction,
        q: &mut RpcSendQueue,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<ArrowFunction>(&before);
        self.send_container(q, b.map(|b| &b.parameters), Some(&node.parameters), cursor).await?;
        self.send_left_padded(q, b.map(|b| &b.body), Some(&node.body), cursor).await?;
        send_type(q, b.and_then(|b| b.ty.as_ref()), node.ty.as_ref()).await?;
        Ok(tree.clone())
    }

    async fn visit_type_of(&mut self, tree: &TreeRef, node: &TypeOf, q: &mut RpcSendQueue, cursor: &Cursor) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<TypeOf>(&before);
        self.send_tree(q, b.map(|b| &b.expression), Some(&node.expression), cursor).await?;
        send_type(q, b.and_then(|b| b.ty.as_ref()), node.ty.as_ref()).await?;
        Ok(tree.clone())
    }

    async fn visit_await(&mut self, tree: &TreeRef, node: &Await, q: &mut RpcSendQueue, cursor: &Cursor) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<Await>(&before);
        self.send_tree(q, b.map(|b| &b.expression), Some(&node.expression), cursor).await?;
        send_type(q, b.and_then(|b| b.ty.as_ref()), node.ty.as_ref()).await?;
        Ok(tree.clone())
    }

    async fn visit_void(&mut self, tree: &TreeRef, node: &Void, q: &mut RpcSendQueue, cursor: &Cursor) -> Result<TreeRef> {
        let before = q.before();
        let b = prior::<Void>(&before);
        self.send_tree(q, b.map(|b| &b.expression), Some(&node.expression), cursor).await?;
        Ok(tree.clone())
    }
}
