//! Patch consumer: rebuilds a tree from the op queue, reusing the prior
//! revision wherever the peer reported no change.
//!
//! Decoding is an explicit switch over every kind this crate knows. A node is
//! rebuilt only when at least one of its fields changed; otherwise the prior
//! `Arc` is returned, so unchanged subtrees stay shared across revisions.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::config::UnknownKindPolicy;
use crate::error::{LstError, Result};
use crate::registry;
use crate::tree::j::{
    Assignment, Binary, Block, Empty, FieldAccess, Identifier, If, Literal, MethodInvocation, NamedVariable, Opaque,
    Parentheses, Return, Unary, Unknown, UnknownSource,
};
use crate::tree::java_type::same_type;
use crate::tree::js::{
    Alias, ArrowFunction, Await, CompilationUnit, ExpressionStatement, Import, ScopedVariableDeclarations, TypeOf,
    Void,
};
use crate::tree::kind::{j, js};
use crate::tree::{
    same_opt, Container, JavaType, Kind, LeftPadded, Markers, NodeId, RightPadded, Space, Tree, TreeCast, TreeRef, J,
};

use super::{RpcObjectData, RpcReceiveQueue, RpcState};

fn decodable(kind: Kind) -> bool {
    kind != j::OPAQUE && (j::ALL.contains(&kind) || js::ALL.contains(&kind))
}

fn from_json<T: DeserializeOwned>(value: serde_json::Value, context: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| LstError::codec(context, e))
}

/// Receiver for core and JavaScript nodes.
#[derive(Debug, Default)]
pub struct JsReceiver {
    /// Whether any field of the node being decoded differs from its prior revision.
    changed: bool,
}

impl JsReceiver {
    pub fn new() -> Self {
        JsReceiver::default()
    }

    /// Reads one child node. `None` when the peer deleted it or never had one.
    pub fn receive_tree<'a>(
        &'a mut self,
        q: &'a mut RpcReceiveQueue,
        before: Option<&'a TreeRef>,
        context: &'static str,
    ) -> BoxFuture<'a, Result<Option<TreeRef>>> {
        async move {
            let op = q.take(context).await?;
            match op.state {
                RpcState::NoChange => Ok(before.cloned()),
                RpcState::Delete => Ok(None),
                RpcState::EndOfObject => Err(LstError::unexpected(op.state, context)),
                RpcState::Add => {
                    if !op.opens_frame() {
                        return Err(LstError::unexpected(op.state, context));
                    }
                    let name = op.value_type.clone().ok_or_else(|| LstError::missing(format!("{context} kind")))?;
                    match registry::resolve_kind(&name).filter(|&kind| decodable(kind)) {
                        Some(kind) => self.receive_node(q, kind, None).await.map(Some),
                        None => match q.policy() {
                            UnknownKindPolicy::Preserve => capture_opaque(q, op, name).await.map(Some),
                            UnknownKindPolicy::Reject => Err(LstError::UnregisteredKindName(name)),
                        },
                    }
                }
                RpcState::Change => {
                    let Some(before) = before else {
                        return Err(LstError::unexpected(op.state, format!("{context} without a prior revision")));
                    };
                    if let Some(J::Opaque(opaque)) = before.as_j() {
                        return Err(LstError::OpaquePatch { kind: opaque.foreign_kind.clone() });
                    }
                    if !op.opens_frame() {
                        return Err(LstError::unexpected(op.state, context));
                    }
                    self.receive_node(q, before.kind(), Some(before)).await.map(Some)
                }
            }
        }
        .boxed()
    }

    /// Decodes a node frame whose opening op was already taken.
    async fn receive_node(&mut self, q: &mut RpcReceiveQueue, kind: Kind, before: Option<&TreeRef>) -> Result<TreeRef> {
        let outer = std::mem::replace(&mut self.changed, false);
        let decoded = self.decode(q, kind, before).await;
        let changed = std::mem::replace(&mut self.changed, outer);
        let node = decoded?;

        let closing = q.take(kind.simple_name()).await?;
        if closing.state != RpcState::EndOfObject {
            return Err(LstError::unexpected(closing.state, format!("end of {}", kind.simple_name())));
        }
        Ok(match before {
            Some(before) if !changed => before.clone(),
            _ => node,
        })
    }

    async fn value<T>(&mut self, q: &mut RpcReceiveQueue, before: Option<&T>, context: &'static str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Clone + Send + Sync,
    {
        let op = q.take(context).await?;
        match op.state {
            RpcState::NoChange => Ok(before.cloned()),
            RpcState::Delete => {
                self.changed |= before.is_some();
                Ok(None)
            }
            RpcState::Add | RpcState::Change => {
                let value = op.value.ok_or_else(|| LstError::unexpected(op.state, context))?;
                self.changed = true;
                from_json(value, context).map(Some)
            }
            RpcState::EndOfObject => Err(LstError::unexpected(op.state, context)),
        }
    }

    async fn req_value<T>(&mut self, q: &mut RpcReceiveQueue, before: Option<&T>, context: &'static str) -> Result<T>
    where
        T: DeserializeOwned + Clone + Send + Sync,
    {
        self.value(q, before, context).await?.ok_or_else(|| LstError::missing(context))
    }

    async fn tree(
        &mut self,
        q: &mut RpcReceiveQueue,
        before: Option<&TreeRef>,
        context: &'static str,
    ) -> Result<Option<TreeRef>> {
        let received = self.receive_tree(q, before, context).await?;
        if !same_opt(received.as_ref(), before) {
            self.changed = true;
        }
        Ok(received)
    }

    async fn req_tree(&mut self, q: &mut RpcReceiveQueue, before: Option<&TreeRef>, context: &'static str) -> Result<TreeRef> {
        self.tree(q, before, context).await?.ok_or_else(|| LstError::missing(context))
    }

    /// Takes the op in front of a padding wrapper, container or list.
    ///
    /// `Ok(None)` means the composite follows as a frame; otherwise the
    /// outcome is already known: kept as before, or deleted.
    async fn composite<T: Clone>(
        &mut self,
        q: &mut RpcReceiveQueue,
        before: Option<&T>,
        context: &'static str,
    ) -> Result<Option<Option<T>>> {
        let op = q.take(context).await?;
        match op.state {
            RpcState::NoChange => Ok(Some(before.cloned())),
            RpcState::Delete => {
                self.changed |= before.is_some();
                Ok(Some(None))
            }
            RpcState::Change if before.is_none() => Err(LstError::unexpected(op.state, context)),
            RpcState::Add | RpcState::Change if op.opens_frame() => Ok(None),
            state => Err(LstError::unexpected(state, context)),
        }
    }

    async fn end(&mut self, q: &mut RpcReceiveQueue, context: &'static str) -> Result<()> {
        let op = q.take(context).await?;
        match op.state {
            RpcState::EndOfObject => Ok(()),
            state => Err(LstError::unexpected(state, context)),
        }
    }

    async fn right_padded(
        &mut self,
        q: &mut RpcReceiveQueue,
        before: Option<&RightPadded<TreeRef>>,
        context: &'static str,
    ) -> Result<Option<RightPadded<TreeRef>>> {
        if let Some(known) = self.composite(q, before, context).await? {
            return Ok(known);
        }
        let element = self.req_tree(q, before.map(|b| &b.element), context).await?;
        let after = self.req_value(q, before.map(|b| &b.after), context).await?;
        let markers = self.req_value(q, before.map(|b| &b.markers), context).await?;
        self.end(q, context).await?;
        Ok(Some(RightPadded { element, after, markers }))
    }

    async fn req_right_padded(
        &mut self,
        q: &mut RpcReceiveQueue,
        before: Option<&RightPadded<TreeRef>>,
        context: &'static str,
    ) -> Result<RightPadded<TreeRef>> {
        self.right_padded(q, before, context).await?.ok_or_else(|| LstError::missing(context))
    }

    async fn left_padded(
        &mut self,
        q: &mut RpcReceiveQueue,
        before: Option<&LeftPadded<TreeRef>>,
        context: &'static str,
    ) -> Result<Option<LeftPadded<TreeRef>>> {
        if let Some(known) = self.composite(q, before, context).await? {
            return Ok(known);
        }
        let space = self.req_value(q, before.map(|b| &b.before), context).await?;
        let element = self.req_tree(q, before.map(|b| &b.element), context).await?;
        let markers = self.req_value(q, before.map(|b| &b.markers), context).await?;
        self.end(q, context).await?;
        Ok(Some(LeftPadded { before: space, element, markers }))
    }

    async fn req_left_padded(
        &mut self,
        q: &mut RpcReceiveQueue,
        before: Option<&LeftPadded<TreeRef>>,
        context: &'static str,
    ) -> Result<LeftPadded<TreeRef>> {
        self.left_padded(q, before, context).await?.ok_or_else(|| LstError::missing(context))
    }

    async fn left_value<T>(
        &mut self,
        q: &mut RpcReceiveQueue,
        before: Option<&LeftPadded<T>>,
        context: &'static str,
    ) -> Result<LeftPadded<T>>
    where
        T: DeserializeOwned + Clone + Send + Sync,
    {
        if let Some(known) = self.composite(q, before, context).await? {
            return known.ok_or_else(|| LstError::missing(context));
        }
        let space = self.req_value(q, before.map(|b| &b.before), context).await?;
        let element = self.req_value(q, before.map(|b| &b.element), context).await?;
        let markers = self.req_value(q, before.map(|b| &b.markers), context).await?;
        self.end(q, context).await?;
        Ok(LeftPadded { before: space, element, markers })
    }

    async fn list(
        &mut self,
        q: &mut RpcReceiveQueue,
        before: Option<&Vec<RightPadded<TreeRef>>>,
        context: &'static str,
    ) -> Result<Option<Vec<RightPadded<TreeRef>>>> {
        if let Some(known) = self.composite(q, before, context).await? {
            return Ok(known);
        }
        let positions: Vec<i64> = self.req_value(q, None, context).await?;
        let prior = before.map(Vec::as_slice).unwrap_or(&[]);
        let reordered = positions.len() != prior.len()
            || positions.iter().enumerate().any(|(idx, &pos)| usize::try_from(pos).ok() != Some(idx));
        if reordered {
            self.changed = true;
        }

        let mut elements = Vec::with_capacity(positions.len());
        for pos in positions {
            let element_before = usize::try_from(pos).ok().and_then(|idx| prior.get(idx));
            elements.push(self.req_right_padded(q, element_before, context).await?);
        }
        self.end(q, context).await?;
        Ok(Some(elements))
    }

    async fn req_list(
        &mut self,
        q: &mut RpcReceiveQueue,
        before: Option<&Vec<RightPadded<TreeRef>>>,
        context: &'static str,
    ) -> Result<Vec<RightPadded<TreeRef>>> {
        self.list(q, before, context).await?.ok_or_else(|| LstError::missing(context))
    }

    async fn container(
        &mut self,
        q: &mut RpcReceiveQueue,
        before: Option<&Container<TreeRef>>,
        context: &'static str,
    ) -> Result<Option<Container<TreeRef>>> {
        if let Some(known) = self.composite(q, before, context).await? {
            return Ok(known);
        }
        let space = self.req_value(q, before.map(|b| &b.before), context).await?;
        let elements = self.req_list(q, before.map(|b| &b.elements), context).await?;
        let markers = self.req_value(q, before.map(|b| &b.markers), context).await?;
        self.end(q, context).await?;
        Ok(Some(Container { before: space, elements, markers }))
    }

    async fn req_container(
        &mut self,
        q: &mut RpcReceiveQueue,
        before: Option<&Container<TreeRef>>,
        context: &'static str,
    ) -> Result<Container<TreeRef>> {
        self.container(q, before, context).await?.ok_or_else(|| LstError::missing(context))
    }

    async fn java_type(
        &mut self,
        q: &mut RpcReceiveQueue,
        before: Option<&JavaType>,
        context: &'static str,
    ) -> Result<Option<JavaType>> {
        let op = q.take(context).await?;
        let received = match op.state {
            RpcState::NoChange => return Ok(before.cloned()),
            RpcState::Delete => None,
            RpcState::EndOfObject => return Err(LstError::unexpected(op.state, context)),
            RpcState::Add | RpcState::Change => match (op.value, op.ref_id) {
                (Some(value), ref_id) => {
                    let ty: JavaType = from_json(value, context)?;
                    if let Some(ref_id) = ref_id {
                        q.type_refs().insert(ref_id, ty.clone());
                    }
                    Some(ty)
                }
                (None, Some(ref_id)) => {
                    Some(q.type_refs().get(&ref_id).cloned().ok_or(LstError::UnknownReference(ref_id))?)
                }
                (None, None) => return Err(LstError::unexpected(op.state, context)),
            },
        };
        if !same_type(received.as_ref(), before) {
            self.changed = true;
        }
        Ok(received)
    }

    async fn decode(&mut self, q: &mut RpcReceiveQueue, kind: Kind, before: Option<&TreeRef>) -> Result<TreeRef> {
        let prior: Option<&dyn Tree> = before.map(|b| b.as_ref());
        let id: NodeId = self.req_value(q, prior.map(|b| b.id()).as_ref(), "id").await?;
        let prefix: Space = self.req_value(q, prior.map(|b| b.prefix()), "prefix").await?;
        let markers: Markers = self.req_value(q, prior.map(|b| b.markers()), "markers").await?;

        let tree = match kind {
            j::IDENTIFIER => {
                let b = prior.and_then(Identifier::cast);
                Identifier {
                    id,
                    prefix,
                    markers,
                    simple_name: self.req_value(q, b.map(|b| &b.simple_name), "Identifier.simpleName").await?,
                    ty: self.java_type(q, b.and_then(|b| b.ty.as_ref()), "Identifier.type").await?,
                }
                .into_tree()
            }
            j::LITERAL => {
                let b = prior.and_then(Literal::cast);
                Literal {
                    id,
                    prefix,
                    markers,
                    value: self.value(q, b.and_then(|b| b.value.as_ref()), "Literal.value").await?,
                    value_source: self.value(q, b.and_then(|b| b.value_source.as_ref()), "Literal.valueSource").await?,
                    ty: self.java_type(q, b.and_then(|b| b.ty.as_ref()), "Literal.type").await?,
                }
                .into_tree()
            }
            j::BINARY => {
                let b = prior.and_then(Binary::cast);
                Binary {
                    id,
                    prefix,
                    markers,
                    left: self.req_tree(q, b.map(|b| &b.left), "Binary.left").await?,
                    operator: self.left_value(q, b.map(|b| &b.operator), "Binary.operator").await?,
                    right: self.req_tree(q, b.map(|b| &b.right), "Binary.right").await?,
                    ty: self.java_type(q, b.and_then(|b| b.ty.as_ref()), "Binary.type").await?,
                }
                .into_tree()
            }
            j::UNARY => {
                let b = prior.and_then(Unary::cast);
                Unary {
                    id,
                    prefix,
                    markers,
                    operator: self.left_value(q, b.map(|b| &b.operator), "Unary.operator").await?,
                    expression: self.req_tree(q, b.map(|b| &b.expression), "Unary.expression").await?,
                    ty: self.java_type(q, b.and_then(|b| b.ty.as_ref()), "Unary.type").await?,
                }
                .into_tree()
            }
            j::ASSIGNMENT => {
                let b = prior.and_then(Assignment::cast);
                Assignment {
                    id,
                    prefix,
                    markers,
                    variable: self.req_tree(q, b.map(|b| &b.variable), "Assignment.variable").await?,
                    assignment: self.req_left_padded(q, b.map(|b| &b.assignment), "Assignment.assignment").await?,
                    ty: self.java_type(q, b.and_then(|b| b.ty.as_ref()), "Assignment.type").await?,
                }
                .into_tree()
            }
            j::PARENTHESES => {
                let b = prior.and_then(Parentheses::cast);
                Parentheses {
                    id,
                    prefix,
                    markers,
                    tree: self.req_right_padded(q, b.map(|b| &b.tree), "Parentheses.tree").await?,
                }
                .into_tree()
            }
            j::FIELD_ACCESS => {
                let b = prior.and_then(FieldAccess::cast);
                FieldAccess {
                    id,
                    prefix,
                    markers,
                    target: self.req_tree(q, b.map(|b| &b.target), "FieldAccess.target").await?,
                    name: self.req_left_padded(q, b.map(|b| &b.name), "FieldAccess.name").await?,
                    ty: self.java_type(q, b.and_then(|b| b.ty.as_ref()), "FieldAccess.type").await?,
                }
                .into_tree()
            }
            j::METHOD_INVOCATION => {
                let b = prior.and_then(MethodInvocation::cast);
                MethodInvocation {
                    id,
                    prefix,
                    markers,
                    select: self.right_padded(q, b.and_then(|b| b.select.as_ref()), "MethodInvocation.select").await?,
                    name: self.req_tree(q, b.map(|b| &b.name), "MethodInvocation.name").await?,
                    arguments: self.req_container(q, b.map(|b| &b.arguments), "MethodInvocation.arguments").await?,
                    method_type: self
                        .java_type(q, b.and_then(|b| b.method_type.as_ref()), "MethodInvocation.methodType")
                        .await?,
                }
                .into_tree()
            }
            j::BLOCK => {
                let b = prior.and_then(Block::cast);
                Block {
                    id,
                    prefix,
                    markers,
                    statements: self.req_list(q, b.map(|b| &b.statements), "Block.statements").await?,
                    end: self.req_value(q, b.map(|b| &b.end), "Block.end").await?,
                }
                .into_tree()
            }
            j::IF => {
                let b = prior.and_then(If::cast);
                If {
                    id,
                    prefix,
                    markers,
                    condition: self.req_tree(q, b.map(|b| &b.condition), "If.condition").await?,
                    then_part: self.req_right_padded(q, b.map(|b| &b.then_part), "If.thenPart").await?,
                    else_part: self.left_padded(q, b.and_then(|b| b.else_part.as_ref()), "If.elsePart").await?,
                }
                .into_tree()
            }
            j::RETURN => {
                let b = prior.and_then(Return::cast);
                Return {
                    id,
                    prefix,
                    markers,
                    expression: self.tree(q, b.and_then(|b| b.expression.as_ref()), "Return.expression").await?,
                }
                .into_tree()
            }
            j::NAMED_VARIABLE => {
                let b = prior.and_then(NamedVariable::cast);
                NamedVariable {
                    id,
                    prefix,
                    markers,
                    name: self.req_tree(q, b.map(|b| &b.name), "NamedVariable.name").await?,
                    initializer: self
                        .left_padded(q, b.and_then(|b| b.initializer.as_ref()), "NamedVariable.initializer")
                        .await?,
                    variable_type: self
                        .java_type(q, b.and_then(|b| b.variable_type.as_ref()), "NamedVariable.variableType")
                        .await?,
                }
                .into_tree()
            }
            j::EMPTY => Empty { id, prefix, markers }.into_tree(),
            j::UNKNOWN => {
                let b = prior.and_then(Unknown::cast);
                Unknown { id, prefix, markers, source: self.req_tree(q, b.map(|b| &b.source), "Unknown.source").await? }
                    .into_tree()
            }
            j::UNKNOWN_SOURCE => {
                let b = prior.and_then(UnknownSource::cast);
                UnknownSource { id, prefix, markers, text: self.req_value(q, b.map(|b| &b.text), "UnknownSource.text").await? }
                    .into_tree()
            }
            js::COMPILATION_UNIT => {
                let b = prior.and_then(CompilationUnit::cast);
                CompilationUnit {
                    id,
                    prefix,
                    markers,
                    source_path: self.req_value(q, b.map(|b| &b.source_path), "CompilationUnit.sourcePath").await?,
                    statements: self.req_list(q, b.map(|b| &b.statements), "CompilationUnit.statements").await?,
                    eof: self.req_value(q, b.map(|b| &b.eof), "CompilationUnit.eof").await?,
                }
                .into_tree()
            }
            js::SCOPED_VARIABLE_DECLARATIONS => {
                let b = prior.and_then(ScopedVariableDeclarations::cast);
                ScopedVariableDeclarations {
                    id,
                    prefix,
                    markers,
                    scope: self.req_value(q, b.map(|b| &b.scope), "ScopedVariableDeclarations.scope").await?,
                    variables: self
                        .req_list(q, b.map(|b| &b.variables), "ScopedVariableDeclarations.variables")
                        .await?,
                }
                .into_tree()
            }
            js::EXPRESSION_STATEMENT => {
                let b = prior.and_then(ExpressionStatement::cast);
                ExpressionStatement {
                    id,
                    prefix,
                    markers,
                    expression: self.req_tree(q, b.map(|b| &b.expression), "ExpressionStatement.expression").await?,
                }
                .into_tree()
            }
            js::IMPORT => {
                let b = prior.and_then(Import::cast);
                Import {
                    id,
                    prefix,
                    markers,
                    specifiers: self.container(q, b.and_then(|b| b.specifiers.as_ref()), "Import.specifiers").await?,
                    module_specifier: self
                        .req_left_padded(q, b.map(|b| &b.module_specifier), "Import.moduleSpecifier")
                        .await?,
                }
                .into_tree()
            }
            js::ALIAS => {
                let b = prior.and_then(Alias::cast);
                Alias {
                    id,
                    prefix,
                    markers,
                    property_name: self.req_right_padded(q, b.map(|b| &b.property_name), "Alias.propertyName").await?,
                    alias: self.req_tree(q, b.map(|b| &b.alias), "Alias.alias").await?,
                }
                .into_tree()
            }
            js::ARROW_FUNCTION => {
                let b = prior.and_then(ArrowFunction::cast);
                ArrowFunction {
                    id,
                    prefix,
                    markers,
                    parameters: self.req_container(q, b.map(|b| &b.parameters), "ArrowFunction.parameters").await?,
                    body: self.req_left_padded(q, b.map(|b| &b.body), "ArrowFunction.body").await?,
                    ty: self.java_type(q, b.and_then(|b| b.ty.as_ref()), "ArrowFunction.type").await?,
                }
                .into_tree()
            }
            js::TYPE_OF => {
                let b = prior.and_then(TypeOf::cast);
                TypeOf {
                    id,
                    prefix,
                    markers,
                    expression: self.req_tree(q, b.map(|b| &b.expression), "TypeOf.expression").await?,
                    ty: self.java_type(q, b.and_then(|b| b.ty.as_ref()), "TypeOf.type").await?,
                }
                .into_tree()
            }
            js::AWAIT => {
                let b = prior.and_then(Await::cast);
                Await {
                    id,
                    prefix,
                    markers,
                    expression: self.req_tree(q, b.map(|b| &b.expression), "Await.expression").await?,
                    ty: self.java_type(q, b.and_then(|b| b.ty.as_ref()), "Await.type").await?,
                }
                .into_tree()
            }
            js::VOID => {
                let b = prior.and_then(Void::cast);
                Void { id, prefix, markers, expression: self.req_tree(q, b.map(|b| &b.expression), "Void.expression").await? }
                    .into_tree()
            }
            other => return Err(LstError::UnregisteredKindName(other.to_string())),
        };
        Ok(tree)
    }
}

/// Reads the rest of a frame of unknown kind into an opaque node.
async fn capture_opaque(q: &mut RpcReceiveQueue, open: RpcObjectData, foreign_kind: String) -> Result<TreeRef> {
    warn!("Preserving node of unregistered kind {} as opaque", foreign_kind);
    let mut ops = vec![open];
    let mut types = Vec::new();
    let mut depth = 1usize;
    while depth > 0 {
        let mut op = q.take(&foreign_kind).await?;
        if op.opens_frame() {
            depth += 1;
        } else if op.state == RpcState::EndOfObject {
            depth -= 1;
        }
        // Reference numbers belong to this exchange; keep the resolved type instead.
        if let Some(ref_id) = op.ref_id.take() {
            let ty: JavaType = match op.value.take() {
                Some(value) => {
                    let ty: JavaType = from_json(value, "opaque type")?;
                    q.type_refs().insert(ref_id, ty.clone());
                    ty
                }
                None => q.type_refs().get(&ref_id).cloned().ok_or(LstError::UnknownReference(ref_id))?,
            };
            op.value = Some(serde_json::to_value(&ty).map_err(|e| LstError::codec("opaque type", e))?);
            types.push((ops.len(), ty));
        }
        ops.push(op);
    }

    let header = |idx: usize| ops.get(idx).and_then(|op| op.value.clone());
    let id = header(1).and_then(|v| serde_json::from_value(v).ok()).unwrap_or_else(NodeId::random);
    let prefix = header(2).and_then(|v| serde_json::from_value(v).ok()).unwrap_or(Space::EMPTY);
    let markers = header(3).and_then(|v| serde_json::from_value(v).ok()).unwrap_or_else(Markers::empty);
    Ok(Arc::new(J::Opaque(Opaque { id, prefix, markers, foreign_kind, ops, types })))
}
