//! Source printer.
//!
//! Reproduces the text a tree was parsed from: every prefix, padding space and
//! comment is written back verbatim around the tokens implied by the node
//! kinds. Printing an unmodified tree yields its original source.

use async_trait::async_trait;

use crate::error::{LstError, Result};
use crate::tree::j::{
    Assignment, Binary, Block, Empty, FieldAccess, Identifier, If, Literal, MethodInvocation, NamedVariable, Opaque,
    Parentheses, Return, Unary, Unknown, UnknownSource,
};
use crate::tree::js::{
    Alias, ArrowFunction, Await, CompilationUnit, ExpressionStatement, Import, ScopedVariableDeclarations, TypeOf,
    Void,
};
use crate::tree::{Container, RightPadded, TreeRef};
use crate::visitor::{dispatch_js, walk, Cursor, JsVisitor, TreeVisitor};

#[derive(Default)]
pub struct Printer;

/// Prints `tree` back to source text.
pub async fn print(tree: &TreeRef) -> Result<String> {
    let mut out = String::new();
    let mut printer = Printer;
    printer.visit_root(tree, &mut out).await?;
    Ok(out)
}

impl Printer {
    async fn statements(&mut self, statements: &[RightPadded<TreeRef>], out: &mut String, cursor: &Cursor) -> Result<()> {
        for statement in statements {
            self.visit(&statement.element, out, cursor).await?;
            statement.after.print_to(out);
            if statement.markers.has_semicolon() {
                out.push(';');
            }
        }
        Ok(())
    }

    async fn comma_separated(&mut self, elements: &[RightPadded<TreeRef>], out: &mut String, cursor: &Cursor) -> Result<()> {
        for (i, element) in elements.iter().enumerate() {
            self.visit(&element.element, out, cursor).await?;
            element.after.print_to(out);
            if i + 1 < elements.len() {
                out.push(',');
            } else if let Some(suffix) = element.markers.trailing_comma() {
                out.push(',');
                suffix.print_to(out);
            }
        }
        Ok(())
    }

    async fn container(
        &mut self,
        container: &Container<TreeRef>,
        open: char,
        close: char,
        out: &mut String,
        cursor: &Cursor,
    ) -> Result<()> {
        container.before.print_to(out);
        out.push(open);
        self.comma_separated(&container.elements, out, cursor).await?;
        out.push(close);
        Ok(())
    }
}

#[async_trait]
impl TreeVisitor<String> for Printer {
    async fn visit(&mut self, tree: &TreeRef, out: &mut String, parent: &Cursor) -> Result<TreeRef> {
        tree.prefix().print_to(out);
        walk(self, tree, out, parent).await
    }

    async fn visit_extension(&mut self, tree: &TreeRef, out: &mut String, cursor: &Cursor) -> Result<TreeRef> {
        if tree.as_js().is_none() {
            return Err(LstError::UnknownKind { kind: tree.kind().to_string(), id: tree.id() });
        }
        dispatch_js(self, tree, out, cursor).await
    }

    async fn visit_identifier(
        &mut self,
        tree: &TreeRef,
        node: &Identifier,
        out: &mut String,
        _cursor: &Cursor,
    ) -> Result<TreeRef> {
        out.push_str(&node.simple_name);
        Ok(tree.clone())
    }

    async fn visit_literal(&mut self, tree: &TreeRef, node: &Literal, out: &mut String, _cursor: &Cursor) -> Result<TreeRef> {
        match (&node.value_source, &node.value) {
            (Some(source), _) => out.push_str(source),
            (None, Some(value)) => out.push_str(&value.to_string()),
            (None, None) => out.push_str("null"),
        }
        Ok(tree.clone())
    }

    async fn visit_binary(&mut self, tree: &TreeRef, node: &Binary, out: &mut String, cursor: &Cursor) -> Result<TreeRef> {
        self.visit(&node.left, out, cursor).await?;
        node.operator.before.print_to(out);
        out.push_str(node.operator.element.token());
        self.visit(&node.right, out, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_unary(&mut self, tree: &TreeRef, node: &Unary, out: &mut String, cursor: &Cursor) -> Result<TreeRef> {
        if node.operator.element.is_postfix() {
            self.visit(&node.expression, out, cursor).await?;
            node.operator.before.print_to(out);
            out.push_str(node.operator.element.token());
        } else {
            node.operator.before.print_to(out);
            out.push_str(node.operator.element.token());
            self.visit(&node.expression, out, cursor).await?;
        }
        Ok(tree.clone())
    }

    async fn visit_assignment(
        &mut self,
        tree: &TreeRef,
        node: &Assignment,
        out: &mut String,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        self.visit(&node.variable, out, cursor).await?;
        node.assignment.before.print_to(out);
        out.push('=');
        self.visit(&node.assignment.element, out, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_parentheses(
        &mut self,
        tree: &TreeRef,
        node: &Parentheses,
        out: &mut String,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        out.push('(');
        self.visit(&node.tree.element, out, cursor).await?;
        node.tree.after.print_to(out);
        out.push(')');
        Ok(tree.clone())
    }

    async fn visit_field_access(
        &mut self,
        tree: &TreeRef,
        node: &FieldAccess,
        out: &mut String,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        self.visit(&node.target, out, cursor).await?;
        node.name.before.print_to(out);
        out.push('.');
        self.visit(&node.name.element, out, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_method_invocation(
        &mut self,
        tree: &TreeRef,
        node: &MethodInvocation,
        out: &mut String,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        if let Some(select) = &node.select {
            self.visit(&select.element, out, cursor).await?;
            select.after.print_to(out);
            out.push('.');
        }
        self.visit(&node.name, out, cursor).await?;
        self.container(&node.arguments, '(', ')', out, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_block(&mut self, tree: &TreeRef, node: &Block, out: &mut String, cursor: &Cursor) -> Result<TreeRef> {
        out.push('{');
        self.statements(&node.statements, out, cursor).await?;
        node.end.print_to(out);
        out.push('}');
        Ok(tree.clone())
    }

    async fn visit_if(&mut self, tree: &TreeRef, node: &If, out: &mut String, cursor: &Cursor) -> Result<TreeRef> {
        out.push_str("if");
        self.visit(&node.condition, out, cursor).await?;
        self.visit(&node.then_part.element, out, cursor).await?;
        node.then_part.after.print_to(out);
        if node.then_part.markers.has_semicolon() {
            out.push(';');
        }
        if let Some(else_part) = &node.else_part {
            else_part.before.print_to(out);
            out.push_str("else");
            self.visit(&else_part.element, out, cursor).await?;
        }
        Ok(tree.clone())
    }

    async fn visit_return(&mut self, tree: &TreeRef, node: &Return, out: &mut String, cursor: &Cursor) -> Result<TreeRef> {
        out.push_str("return");
        if let Some(expression) = &node.expression {
            self.visit(expression, out, cursor).await?;
        }
        Ok(tree.clone())
    }

    async fn visit_named_variable(
        &mut self,
        tree: &TreeRef,
        node: &NamedVariable,
        out: &mut String,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        self.visit(&node.name, out, cursor).await?;
        if let Some(initializer) = &node.initializer {
            initializer.before.print_to(out);
            out.push('=');
            self.visit(&initializer.element, out, cursor).await?;
        }
        Ok(tree.clone())
    }

    async fn visit_empty(&mut self, tree: &TreeRef, _node: &Empty, _out: &mut String, _cursor: &Cursor) -> Result<TreeRef> {
        Ok(tree.clone())
    }

    async fn visit_unknown(&mut self, tree: &TreeRef, node: &Unknown, out: &mut String, cursor: &Cursor) -> Result<TreeRef> {
        self.visit(&node.source, out, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_unknown_source(
        &mut self,
        tree: &TreeRef,
        node: &UnknownSource,
        out: &mut String,
        _cursor: &Cursor,
    ) -> Result<TreeRef> {
        out.push_str(&node.text);
        Ok(tree.clone())
    }

    async fn visit_opaque(&mut self, _tree: &TreeRef, node: &Opaque, _out: &mut String, _cursor: &Cursor) -> Result<TreeRef> {
        Err(LstError::Unprintable { kind: node.foreign_kind.clone() })
    }
}

#[async_trait]
impl JsVisitor<String> for Printer {
    async fn visit_compilation_unit(
        &mut self,
        tree: &TreeRef,
        node: &CompilationUnit,
        out: &mut String,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        self.statements(&node.statements, out, cursor).await?;
        node.eof.print_to(out);
        Ok(tree.clone())
    }

    async fn visit_scoped_variable_declarations(
        &mut self,
        tree: &TreeRef,
        node: &ScopedVariableDeclarations,
        out: &mut String,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        out.push_str(node.scope.keyword());
        self.comma_separated(&node.variables, out, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_expression_statement(
        &mut self,
        tree: &TreeRef,
        node: &ExpressionStatement,
        out: &mut String,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        self.visit(&node.expression, out, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_import(&mut self, tree: &TreeRef, node: &Import, out: &mut String, cursor: &Cursor) -> Result<TreeRef> {
        out.push_str("import");
        if let Some(specifiers) = &node.specifiers {
            self.container(specifiers, '{', '}', out, cursor).await?;
            node.module_specifier.before.print_to(out);
            out.push_str("from");
        } else {
            node.module_specifier.before.print_to(out);
        }
        self.visit(&node.module_specifier.element, out, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_alias(&mut self, tree: &TreeRef, node: &Alias, out: &mut String, cursor: &Cursor) -> Result<TreeRef> {
        self.visit(&node.property_name.element, out, cursor).await?;
        node.property_name.after.print_to(out);
        out.push_str("as");
        self.visit(&node.alias, out, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_arrow_function(
        &mut self,
        tree: &TreeRef,
        node: &ArrowFunction,
        out: &mut String,
        cursor: &Cursor,
    ) -> Result<TreeRef> {
        self.container(&node.parameters, '(', ')', out, cursor).await?;
        node.body.before.print_to(out);
        out.push_str("=>");
        self.visit(&node.body.element, out, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_type_of(&mut self, tree: &TreeRef, node: &TypeOf, out: &mut String, cursor: &Cursor) -> Result<TreeRef> {
        out.push_str("typeof");
        self.visit(&node.expression, out, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_await(&mut self, tree: &TreeRef, node: &Await, out: &mut String, cursor: &Cursor) -> Result<TreeRef> {
        out.push_str("await");
        self.visit(&node.expression, out, cursor).await?;
        Ok(tree.clone())
    }

    async fn visit_void(&mut self, tree: &TreeRef, node: &Void, out: &mut String, cursor: &Cursor) -> Result<TreeRef> {
        out.push_str("void");
        self.visit(&node.expression, out, cursor).await?;
        Ok(tree.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::j::BinaryOperator;
    use crate::tree::{LeftPadded, NodeId, Space};

    fn ident(prefix: &str, name: &str) -> TreeRef {
        Identifier::new(Space::format(prefix), name).into_tree()
    }

    #[tokio::test]
    async fn test_print_binary_keeps_spacing() {
        let tree = Binary {
            id: NodeId::random(),
            prefix: Space::EMPTY,
            markers: Default::default(),
            left: ident("", "a"),
            operator: LeftPadded::new(Space::single_space(), BinaryOperator::Addition),
            right: ident("  ", "b"),
            ty: None,
        }
        .into_tree();
        assert_eq!(print(&tree).await.unwrap(), "a +  b");
    }

    #[tokio::test]
    async fn test_print_opaque_fails() {
        let tree = Opaque {
            id: NodeId::random(),
            prefix: Space::EMPTY,
            markers: Default::default(),
            foreign_kind: "org.example.Foo".into(),
            ops: Vec::new(),
            types: Vec::new(),
        }
        .into_tree();
        assert!(matches!(print(&tree).await, Err(LstError::Unprintable { .. })));
    }
}
