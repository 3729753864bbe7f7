//! Structural equivalence of two trees.
//!
//! [`Comparator`] walks the left tree with the corresponding node of the right
//! tree as its context. Kinds must match, then scalar fields, then children in
//! declaration order. Lists must agree in length and optional children in
//! presence. The first mismatch trips a [`StopToken`], which makes every later
//! visit return immediately, so nothing past the mismatch is inspected.
//!
//! Ids, prefixes, padding, markers and type attribution are not compared:
//! `a + b` and `a+b` are equivalent.

use async_trait::async_trait;
use tracing::trace;

use crate::error::{LstError, Result};
use crate::tree::j::{
    Assignment, Binary, Block, Empty, FieldAccess, Identifier, If, Literal, MethodInvocation, NamedVariable, Opaque,
    Parentheses, Return, Unary, Unknown, UnknownSource,
};
use crate::tree::js::{
    Alias, ArrowFunction, Await, CompilationUnit, ExpressionStatement, Import, ScopedVariableDeclarations, TypeOf,
    Void,
};
use crate::tree::{Container, RightPadded, TreeCast, TreeRef};
use crate::visitor::{dispatch_js, walk, Cursor, JsVisitor, StopToken, TreeVisitor};

/// Op indices of an opaque frame holding id, prefix and markers.
const OPAQUE_HEADER: std::ops::RangeInclusive<usize> = 1..=3;

pub struct Comparator {
    stop: StopToken,
    visited: usize,
}

impl Default for Comparator {
    fn default() -> Self {
        Comparator::new()
    }
}

impl Comparator {
    pub fn new() -> Self {
        Comparator { stop: StopToken::new(), visited: 0 }
    }

    /// `true` when `a` and `b` are structurally equivalent.
    ///
    /// A comparator is single-use: once it has seen a mismatch it stays stopped.
    pub async fn compare(&mut self, a: &TreeRef, b: &TreeRef) -> Result<bool> {
        let mut other = b.clone();
        self.visit_root(a, &mut other).await?;
        Ok(!self.stop.is_stopped())
    }

    /// Number of node pairs inspected so far.
    pub fn visited(&self) -> usize {
        self.visited
    }

    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    fn mismatch(&mut self, tree: &TreeRef, what: &str) {
        trace!("Mismatch at {} {}: {}", tree.kind().simple_name(), tree.id(), what);
        self.stop.stop();
    }

    async fn child(&mut self, a: &TreeRef, b: &TreeRef, cursor: &Cursor) -> Result<()> {
        let mut other = b.clone();
        self.visit(a, &mut other, cursor).await?;
        Ok(())
    }

    async fn opt_child(&mut self, tree: &TreeRef, a: Option<&TreeRef>, b: Option<&TreeRef>, cursor: &Cursor) -> Result<()> {
        match (a, b) {
            (Some(a), Some(b)) => self.child(a, b, cursor).await,
            (None, None) => Ok(()),
            _ => {
                self.mismatch(tree, "optional child presence");
                Ok(())
            }
        }
    }

    async fn list(
        &mut self,
        tree: &TreeRef,
        a: &[RightPadded<TreeRef>],
        b: &[RightPadded<TreeRef>],
        cursor: &Cursor,
    ) -> Result<()> {
        if a.len() != b.len() {
            self.mismatch(tree, "list length");
            return Ok(());
        }
        for (a, b) in a.iter().zip(b) {
            if self.stop.is_stopped() {
                break;
            }
            self.child(&a.element, &b.element, cursor).await?;
        }
        Ok(())
    }

    async fn container(
        &mut self,
        tree: &TreeRef,
        a: &Container<TreeRef>,
        b: &Container<TreeRef>,
        cursor: &Cursor,
    ) -> Result<()> {
        self.list(tree, &a.elements, &b.elements, cursor).await
    }

    /// Narrows the paired node to `T`, recording a mismatch if it is not one.
    fn paired<'o, T: TreeCast>(&mut self, tree: &TreeRef, other: &'o TreeRef) -> Option<&'o T> {
        let paired = T::cast(other.as_ref());
        if paired.is_none() {
            self.mismatch(tree, "paired node kind");
        }
        paired
    }
}

/// `true` when `a` and `b` are structurally equivalent.
pub async fn compare(a: &TreeRef, b: &TreeRef) -> Result<bool> {
    Comparator::new().compare(a, b).await
}

#[async_trait]
impl TreeVisitor<TreeRef> for Comparator {
    fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    async fn visit(&mut self, tree: &TreeRef, other: &mut TreeRef, parent: &Cursor) -> Result<TreeRef> {
        if self.is_stopped() {
            return Ok(tree.clone());
        }
        self.visited += 1;
        if tree.kind() != other.kind() {
            self.mismatch(tree, "kind");
            return Ok(tree.clone());
        }
        walk(self, tree, other, parent).await
    }

    async fn visit_extension(&mut self, tree: &TreeRef, other: &mut TreeRef, cursor: &Cursor) -> Result<TreeRef> {
        if tree.as_js().is_none() {
            return Err(LstError::UnknownKind { kind: tree.kind().to_string(), id: tree.id() });
        }
        dispatch_js(self, tree, other, cursor).await
    }

    async fn visit_identifier(
        &mut self,
        tree: &TreeRef,
        node: &Identifier,
        other: &mut TreeRef,
        _cursor: &Cursor,
    ) -> Result<TreeRef> {
        if let Some(o) = self.paired::<Identifier>(tree, other) {
            if node.simple_name != o.simple_name {
                self.mismatch(tree, "identifier name");
            }
        }
        Ok(tree.clone())
    }

    async fn visit_literal(
        &mut self,
        tree: &TreeRef,
        node: &Literal,
        other: &mut TreeRef,
        _cursor: &Cursor,
    ) -> Result<TreeRef> {
        if let Some(o) = self.paired::<Literal>(tree, other) {
            if node.value != o.value || node.value_source != o.value_source {
                self.mismatch(tree, "literal value");
            }
        }
        Ok(tree.clone())
    }

    async fn visit_binary(&mut self, tree: &TreeRef, node: &Binary, other: &mut TreeRef, cursor: &Cursor) -> Result<TreeRef> {
        let other = other.clone();
        let Some(o) = self.paired::<Binary>(tree, &other) else {
            return Ok(tree.clone());
        };
        if node.operator.element != o.operator.element {
            self.mismatch(tree, "binary operator");
            return Ok(tree.clone());
        }
        self.child(&node.left, &o.left, cursor).await?;
        self.child(&node.right, &o.right, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_unary(&mut self, tree: &TreeRef, node: &Unary, other: &mut TreeRef, cursor: &Cursor) -> Result<TreeRef> {
        let other = other.clone();
        let Some(o) = self.paired::<Unary>(tree, &other) else {
            return Ok(tree.clone());
        };
        if node.operator.element != o.operator.element {
            self.mismatch(tree, "unary operator");
            return Ok(tree.clone());
        }
        self.child(&node.expression, &o.expression, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_assignment(
        &mut self,
        tree: &TreeRef,
        node: &Assignment,
        other: &mut TreeRef,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let other = other.clone();
        let Some(o) = self.paired::<Assignment>(tree, &other) else {
            return Ok(tree.clone());
        };
        self.child(&node.variable, &o.variable, cursor).await?;
        self.child(&node.assignment.element, &o.assignment.element, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_parentheses(
        &mut self,
        tree: &TreeRef,
        node: &Parentheses,
        other: &mut TreeRef,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let other = other.clone();
        let Some(o) = self.paired::<Parentheses>(tree, &other) else {
            return Ok(tree.clone());
        };
        self.child(&node.tree.element, &o.tree.element, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_field_access(
        &mut self,
        tree: &TreeRef,
        node: &FieldAccess,
        other: &mut TreeRef,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let other = other.clone();
        let Some(o) = self.paired::<FieldAccess>(tree, &other) else {
            return Ok(tree.clone());
        };
        self.child(&node.target, &o.target, cursor).await?;
        self.child(&node.name.element, &o.name.element, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_method_invocation(
        &mut self,
        tree: &TreeRef,
        node: &MethodInvocation,
        other: &mut TreeRef,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let other = other.clone();
        let Some(o) = self.paired::<MethodInvocation>(tree, &other) else {
            return Ok(tree.clone());
        };
        let (a_select, b_select) = (node.select.as_ref().map(|s| &s.element), o.select.as_ref().map(|s| &s.element));
        self.opt_child(tree, a_select, b_select, cursor).await?;
        self.child(&node.name, &o.name, cursor).await?;
        self.container(tree, &node.arguments, &o.arguments, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_block(&mut self, tree: &TreeRef, node: &Block, other: &mut TreeRef, cursor: &Cursor) -> Result<TreeRef> {
        let other = other.clone();
        let Some(o) = self.paired::<Block>(tree, &other) else {
            return Ok(tree.clone());
        };
        self.list(tree, &node.statements, &o.statements, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_if(&mut self, tree: &TreeRef, node: &If, other: &mut TreeRef, cursor: &Cursor) -> Result<TreeRef> {
        let other = other.clone();
        let Some(o) = self.paired::<If>(tree, &other) else {
            return Ok(tree.clone());
        };
        self.child(&node.condition, &o.condition, cursor).await?;
        self.child(&node.then_part.element, &o.then_part.element, cursor).await?;
        let (a_else, b_else) = (node.else_part.as_ref().map(|e| &e.element), o.else_part.as_ref().map(|e| &e.element));
        self.opt_child(tree, a_else, b_else, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_return(&mut self, tree: &TreeRef, node: &Return, other: &mut TreeRef, cursor: &Cursor) -> Result<TreeRef> {
        let other = other.clone();
        let Some(o) = self.paired::<Return>(tree, &other) else {
            return Ok(tree.clone());
        };
        self.opt_child(tree, node.expression.as_ref(), o.expression.as_ref(), cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_named_variable(
        &mut self,
        tree: &TreeRef,
        node: &NamedVariable,
        other: &mut TreeRef,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let other = other.clone();
        let Some(o) = self.paired::<NamedVariable>(tree, &other) else {
            return Ok(tree.clone());
        };
        self.child(&node.name, &o.name, cursor).await?;
        let (a_init, b_init) =
            (node.initializer.as_ref().map(|i| &i.element), o.initializer.as_ref().map(|i| &i.element));
        self.opt_child(tree, a_init, b_init, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_empty(&mut self, tree: &TreeRef, _node: &Empty, _other: &mut TreeRef, _cursor: &Cursor) -> Result<TreeRef> {
        Ok(tree.clone())
    }

    async fn visit_unknown(
        &mut self,
        tree: &TreeRef,
        node: &Unknown,
        other: &mut TreeRef,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let other = other.clone();
        let Some(o) = self.paired::<Unknown>(tree, &other) else {
            return Ok(tree.clone());
        };
        self.child(&node.source, &o.source, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_unknown_source(
        &mut self,
        tree: &TreeRef,
        node: &UnknownSource,
        other: &mut TreeRef,
        _cursor: &Cursor,
    ) -> Result<TreeRef> {
        if let Some(o) = self.paired::<UnknownSource>(tree, other) {
            if node.text != o.text {
                self.mismatch(tree, "unknown source text");
            }
        }
        Ok(tree.clone())
    }

    /// Opaque nodes match on foreign kind and frame payload. The id, prefix
    /// and markers header ops and type reference numbers are ignored.
    async fn visit_opaque(&mut self, tree: &TreeRef, node: &Opaque, other: &mut TreeRef, _cursor: &Cursor) -> Result<TreeRef> {
        if let Some(o) = self.paired::<Opaque>(tree, other) {
            let same_payload = node.ops.len() == o.ops.len()
                && node.ops.iter().zip(&o.ops).enumerate().all(|(idx, (a, b))| {
                    OPAQUE_HEADER.contains(&idx)
                        || (a.state == b.state && a.value_type == b.value_type && a.value == b.value)
                });
            if node.foreign_kind != o.foreign_kind || !same_payload {
                self.mismatch(tree, "opaque node");
            }
        }
        Ok(tree.clone())
    }
}

#[async_trait]
impl JsVisitor<TreeRef> for Comparator {
    async fn visit_compilation_unit(
        &mut self,
        tree: &TreeRef,
        node: &CompilationUnit,
        other: &mut TreeRef,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let other = other.clone();
        let Some(o) = self.paired::<CompilationUnit>(tree, &other) else {
            return Ok(tree.clone());
        };
        self.list(tree, &node.statements, &o.statements, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_scoped_variable_declarations(
        &mut self,
        tree: &TreeRef,
        node: &ScopedVariableDeclarations,
        other: &mut TreeRef,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let other = other.clone();
        let Some(o) = self.paired::<ScopedVariableDeclarations>(tree, &other) else {
            return Ok(tree.clone());
        };
        if node.scope != o.scope {
            self.mismatch(tree, "declaration scope");
            return Ok(tree.clone());
        }
        self.list(tree, &node.variables, &o.variables, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_expression_statement(
        &mut self,
        tree: &TreeRef,
        node: &ExpressionStatement,
        other: &mut TreeRef,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let other = other.clone();
        let Some(o) = self.paired::<ExpressionStatement>(tree, &other) else {
            return Ok(tree.clone());
        };
        self.child(&node.expression, &o.expression, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_import(&mut self, tree: &TreeRef, node: &Import, other: &mut TreeRef, cursor: &Cursor) -> Result<TreeRef> {
        let other = other.clone();
        let Some(o) = self.paired::<Import>(tree, &other) else {
            return Ok(tree.clone());
        };
        match (&node.specifiers, &o.specifiers) {
            (Some(a), Some(b)) => self.container(tree, a, b, cursor).await?,
            (None, None) => {}
            _ => {
                self.mismatch(tree, "import specifiers presence");
                return Ok(tree.clone());
            }
        }
        self.child(&node.module_specifier.element, &o.module_specifier.element, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_alias(&mut self, tree: &TreeRef, node: &Alias, other: &mut TreeRef, cursor: &Cursor) -> Result<TreeRef> {
        let other = other.clone();
        let Some(o) = self.paired::<Alias>(tree, &other) else {
            return Ok(tree.clone());
        };
        self.child(&node.property_name.element, &o.property_name.element, cursor).await?;
        self.child(&node.alias, &o.alias, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_arrow_function(
        &mut self,
        tree: &TreeRef,
        node: &ArrowFunction,
        other: &mut TreeRef,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        let other = other.clone();
        let Some(o) = self.paired::<ArrowFunction>(tree, &other) else {
            return Ok(tree.clone());
        };
        self.container(tree, &node.parameters, &o.parameters, cursor).await?;
        self.child(&node.body.element, &o.body.element, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_type_of(&mut self, tree: &TreeRef, node: &TypeOf, other: &mut TreeRef, cursor: &Cursor) -> Result<TreeRef> {
        let other = other.clone();
        let Some(o) = self.paired::<TypeOf>(tree, &other) else {
            return Ok(tree.clone());
        };
        self.child(&node.expression, &o.expression, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_await(&mut self, tree: &TreeRef, node: &Await, other: &mut TreeRef, cursor: &Cursor) -> Result<TreeRef> {
        let other = other.clone();
        let Some(o) = self.paired::<Await>(tree, &other) else {
            return Ok(tree.clone());
        };
        self.child(&node.expression, &o.expression, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_void(&mut self, tree: &TreeRef, node: &Void, other: &mut TreeRef, cursor: &Cursor) -> Result<TreeRef> {
        let other = other.clone();
        let Some(o) = self.paired::<Void>(tree, &other) else {
            return Ok(tree.clone());
        };
        self.child(&node.expression, &o.expression, cursor).await?;
        Ok(tree.clone())
    }
}
