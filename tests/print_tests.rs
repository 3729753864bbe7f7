use indoc::indoc;
use lst_js::print;
use lst_js::tree::j::{BinaryOperator, Unary, UnaryOperator};
use lst_js::tree::js::{Await, TypeOf};
use lst_js::tree::{Comment, LeftPadded, Marker, Markers, NodeId, RightPadded, Space};
use test_utils::lst::builders::{
    binary, call, const_unit, expression_statement, ident, identifier_statements, import_alias, number, statement,
    string, unit, ws,
};

#[tokio::test]
async fn test_print_const_declaration() {
    test_utils::setup();
    assert_eq!(print(&const_unit("x", 1)).await.unwrap(), "const x = 1;");
}

#[tokio::test]
async fn test_print_import_alias() {
    test_utils::setup();
    let tree = unit(vec![statement(import_alias("", "a", "b", "x"))]);
    assert_eq!(print(&tree).await.unwrap(), "import {a as b} from \"x\";");
}

#[tokio::test]
async fn test_print_call_with_trailing_comma() {
    test_utils::setup();
    let plain = call(Some(ident("", "console")), "log", vec![ident("", "a"), string("", "b")]);
    assert_eq!(print(&plain).await.unwrap(), "console.log(a, \"b\")");

    let Some(lst_js::tree::J::MethodInvocation(mi)) = plain.as_j() else {
        panic!("expected a method invocation");
    };
    let mut arguments = mi.arguments.clone();
    let last = arguments.elements.len() - 1;
    arguments.elements[last] = RightPadded {
        markers: Markers::build(vec![Marker::trailing_comma(ws(" "))]),
        ..arguments.elements[last].clone()
    };
    let trailing = lst_js::tree::j::MethodInvocation { arguments, ..mi.clone() }.into_tree();
    assert_eq!(print(&trailing).await.unwrap(), "console.log(a, \"b\", )");
}

#[tokio::test]
async fn test_print_keeps_comments() {
    test_utils::setup();
    let commented = ident("", "b").with_prefix(
        Space::format(" ")
            .with_comment(Comment::block(" block ", " "))
            .with_comment(Comment::line(" line", "\n  ")),
    );
    let tree = binary(ident("", "a"), " ", BinaryOperator::Multiplication, commented);
    assert_eq!(print(&tree).await.unwrap(), "a * /* block */ // line\n  b");
}

#[tokio::test]
async fn test_print_unary_and_keyword_operators() {
    test_utils::setup();
    let increment = Unary {
        id: NodeId::random(),
        prefix: Space::EMPTY,
        markers: Markers::empty(),
        operator: LeftPadded::new(Space::EMPTY, UnaryOperator::PostIncrement),
        expression: ident("", "i"),
        ty: None,
    }
    .into_tree();
    let not = Unary {
        id: NodeId::random(),
        prefix: ws(" "),
        markers: Markers::empty(),
        operator: LeftPadded::new(Space::EMPTY, UnaryOperator::Not),
        expression: ident("", "done"),
        ty: None,
    }
    .into_tree();
    let type_of = TypeOf { id: NodeId::random(), prefix: Space::EMPTY, markers: Markers::empty(), expression: ident(" ", "x"), ty: None }
        .into_tree();
    let awaited = Await { id: NodeId::random(), prefix: ws("\n"), markers: Markers::empty(), expression: number(" ", 3), ty: None }
        .into_tree();
    let tree = unit(vec![
        statement(expression_statement("", increment)),
        statement(expression_statement("", not)),
        statement(expression_statement(" ", type_of)),
        statement(expression_statement("", awaited)),
    ]);
    assert_eq!(print(&tree).await.unwrap(), "i++; !done; typeof x;\nawait 3;");
}

#[tokio::test]
async fn test_print_statement_sequence() {
    test_utils::setup();
    let tree = unit(identifier_statements(&["a", "b", "c"]));
    let expected = indoc! {"
        a;
        b;
        c;"};
    assert_eq!(print(&tree).await.unwrap(), expected);
}
