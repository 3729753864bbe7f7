//! Hand-built trees for the snippets the integration tests keep reaching for.
//!
//! Every builder takes the prefix of the node it creates, so the same snippet
//! can be built with different formatting.

use lst_js::tree::j::{
    Binary, BinaryOperator, Identifier, Literal, MethodInvocation, NamedVariable,
};
use lst_js::tree::js::{
    Alias, CompilationUnit, ExpressionStatement, Import, ScopedVariableDeclarations, VariableScope,
};
use lst_js::tree::{Container, LeftPadded, Marker, Markers, NodeId, RightPadded, Space, TreeRef};

pub fn ws(whitespace: &str) -> Space {
    Space::format(whitespace)
}

pub fn ident(prefix: &str, name: &str) -> TreeRef {
    Identifier::new(ws(prefix), name).into_tree()
}

pub fn number(prefix: &str, n: i64) -> TreeRef {
    Literal::new(ws(prefix), serde_json::json!(n), n.to_string()).into_tree()
}

pub fn string(prefix: &str, s: &str) -> TreeRef {
    Literal::new(ws(prefix), serde_json::json!(s), format!("\"{}\"", s)).into_tree()
}

pub fn binary(left: TreeRef, before_operator: &str, operator: BinaryOperator, right: TreeRef) -> TreeRef {
    Binary {
        id: NodeId::random(),
        prefix: Space::EMPTY,
        markers: Markers::empty(),
        left,
        operator: LeftPadded::new(ws(before_operator), operator),
        right,
        ty: None,
    }
    .into_tree()
}

/// `a + b` when `spaced`, `a+b` otherwise.
pub fn sum(spaced: bool) -> TreeRef {
    let gap = if spaced { " " } else { "" };
    binary(ident("", "a"), gap, BinaryOperator::Addition, ident(gap, "b"))
}

/// `receiver.name(args)`; arguments are separated by `, `.
pub fn call(receiver: Option<TreeRef>, name: &str, args: Vec<TreeRef>) -> TreeRef {
    let arguments = args
        .into_iter()
        .enumerate()
        .map(|(i, arg)| RightPadded::bare(if i == 0 { arg } else { arg.with_prefix(ws(" ")) }))
        .collect();
    MethodInvocation {
        id: NodeId::random(),
        prefix: Space::EMPTY,
        markers: Markers::empty(),
        select: receiver.map(RightPadded::bare),
        name: ident("", name),
        arguments: Container::new(Space::EMPTY, arguments),
        method_type: None,
    }
    .into_tree()
}

/// Terminates a statement with `;`.
pub fn statement(tree: TreeRef) -> RightPadded<TreeRef> {
    RightPadded { element: tree, after: Space::EMPTY, markers: Markers::build(vec![Marker::semicolon()]) }
}

pub fn expression_statement(prefix: &str, expression: TreeRef) -> TreeRef {
    ExpressionStatement { id: NodeId::random(), prefix: ws(prefix), markers: Markers::empty(), expression }.into_tree()
}

/// `const <name> = <value>`, without the terminating semicolon.
pub fn const_decl(prefix: &str, name: &str, value: TreeRef) -> TreeRef {
    let variable = NamedVariable {
        id: NodeId::random(),
        prefix: ws(" "),
        markers: Markers::empty(),
        name: ident("", name),
        initializer: Some(LeftPadded::new(ws(" "), value.with_prefix(ws(" ")))),
        variable_type: None,
    }
    .into_tree();
    ScopedVariableDeclarations {
        id: NodeId::random(),
        prefix: ws(prefix),
        markers: Markers::empty(),
        scope: VariableScope::Const,
        variables: vec![RightPadded::bare(variable)],
    }
    .into_tree()
}

/// `import {<name> as <alias>} from "<module>"`.
pub fn import_alias(prefix: &str, name: &str, alias: &str, module: &str) -> TreeRef {
    let specifier = Alias {
        id: NodeId::random(),
        prefix: Space::EMPTY,
        markers: Markers::empty(),
        property_name: RightPadded::new(ident("", name), ws(" ")),
        alias: ident(" ", alias),
    }
    .into_tree();
    Import {
        id: NodeId::random(),
        prefix: ws(prefix),
        markers: Markers::empty(),
        specifiers: Some(Container::new(ws(" "), vec![RightPadded::bare(specifier)])),
        module_specifier: LeftPadded::new(ws(" "), string(" ", module)),
    }
    .into_tree()
}

pub fn unit(statements: Vec<RightPadded<TreeRef>>) -> TreeRef {
    CompilationUnit::new("test.js", statements, Space::EMPTY).into_tree()
}

/// The compilation unit for `const x = <n>;`.
pub fn const_unit(name: &str, n: i64) -> TreeRef {
    unit(vec![statement(const_decl("", name, number("", n)))])
}

/// One `<name>;` statement per name, separated by newlines.
pub fn identifier_statements(names: &[&str]) -> Vec<RightPadded<TreeRef>> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| statement(expression_statement(if i == 0 { "" } else { "\n" }, ident("", name))))
        .collect()
}
