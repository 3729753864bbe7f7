//! Structural comparison: formatting and identity are ignored, the first
//! difference ends the walk.

use lst_js::tree::j::{BinaryOperator, Opaque};
use lst_js::tree::{Comment, Markers, NodeId, Space, TreeRef};
use lst_js::{compare, Comparator, RpcObjectData};
use test_utils::lst::builders::{
    binary, call, const_decl, const_unit, expression_statement, ident, identifier_statements, import_alias, number,
    statement, string, sum, unit,
};

#[tokio::test]
async fn test_formatting_is_ignored() {
    test_utils::setup();
    assert!(compare(&sum(true), &sum(false)).await.unwrap());

    let commented = binary(
        ident("", "a"),
        " ",
        BinaryOperator::Addition,
        ident("", "b").with_prefix(Space::format(" ").with_comment(Comment::block(" why ", " "))),
    );
    assert!(compare(&sum(false), &commented).await.unwrap());
}

#[tokio::test]
async fn test_ids_are_ignored() {
    test_utils::setup();
    let a = const_unit("x", 1);
    let b = const_unit("x", 1);
    assert_ne!(a.id(), b.id());
    assert!(compare(&a, &b).await.unwrap());
}

#[tokio::test]
async fn test_literal_difference_is_found() {
    test_utils::setup();
    assert!(!compare(&const_unit("x", 1), &const_unit("x", 2)).await.unwrap());
    assert!(!compare(&const_unit("x", 1), &const_unit("y", 1)).await.unwrap());
}

#[tokio::test]
async fn test_operator_difference_is_found() {
    test_utils::setup();
    let minus = binary(ident("", "a"), " ", BinaryOperator::Subtraction, ident(" ", "b"));
    assert!(!compare(&sum(true), &minus).await.unwrap());

    let mut same = Comparator::new();
    assert!(same.compare(&sum(true), &sum(false)).await.unwrap());
    assert_eq!(same.visited(), 3);

    // The operator decides before either operand is visited.
    let mut differs = Comparator::new();
    assert!(!differs.compare(&sum(true), &minus).await.unwrap());
    assert_eq!(differs.visited(), 1);
}

#[tokio::test]
async fn test_kind_difference_is_found() {
    test_utils::setup();
    let a = unit(vec![statement(expression_statement("", number("", 1)))]);
    let b = unit(vec![statement(expression_statement("", string("", "1")))]);
    assert!(!compare(&a, &b).await.unwrap());

    let c = unit(vec![statement(expression_statement("", ident("", "a")))]);
    assert!(!compare(&a, &c).await.unwrap());
}

#[tokio::test]
async fn test_list_length_difference_is_found() {
    test_utils::setup();
    let short = unit(identifier_statements(&["a", "b"]));
    let long = unit(identifier_statements(&["a", "b", "c"]));
    assert!(!compare(&short, &long).await.unwrap());
    assert!(!compare(&long, &short).await.unwrap());

    let no_args = call(Some(ident("", "console")), "log", vec![]);
    let one_arg = call(Some(ident("", "console")), "log", vec![ident("", "x")]);
    assert!(!compare(&no_args, &one_arg).await.unwrap());
}

#[tokio::test]
async fn test_optional_child_presence_is_compared() {
    test_utils::setup();
    let method = call(Some(ident("", "console")), "log", vec![ident("", "x")]);
    let function = call(None, "log", vec![ident("", "x")]);
    assert!(!compare(&method, &function).await.unwrap());
    assert!(compare(&function, &call(None, "log", vec![ident("", "x")])).await.unwrap());
}

#[tokio::test]
async fn test_import_aliases_are_compared() {
    test_utils::setup();
    let a = unit(vec![statement(import_alias("", "a", "b", "x"))]);
    let b = unit(vec![statement(import_alias("\n\n", "a", "b", "x"))]);
    let c = unit(vec![statement(import_alias("", "a", "c", "x"))]);
    assert!(compare(&a, &b).await.unwrap());
    assert!(!compare(&a, &c).await.unwrap());
}

#[tokio::test]
async fn test_first_mismatch_stops_the_walk() {
    test_utils::setup();
    let a = unit(identifier_statements(&["a", "b", "c", "d"]));
    let same = unit(identifier_statements(&["a", "b", "c", "d"]));
    let differs_early = unit(identifier_statements(&["z", "b", "c", "d"]));

    let mut full = Comparator::new();
    assert!(full.compare(&a, &same).await.unwrap());
    // unit + 4 statements + 4 identifiers
    assert_eq!(full.visited(), 9);

    let mut early = Comparator::new();
    assert!(!early.compare(&a, &differs_early).await.unwrap());
    assert_eq!(early.visited(), 3);
    assert!(early.stop_token().is_stopped());
}

#[tokio::test]
async fn test_declaration_matches_equivalent_formatting() {
    test_utils::setup();
    let a = unit(vec![statement(const_decl("", "x", number("", 1)))]);
    let b = unit(vec![statement(const_decl("\n  ", "x", number("", 1)))]);
    assert!(compare(&a, &b).await.unwrap());
}

/// An opaque `Widget` frame carrying one string field.
fn widget(payload: &str) -> TreeRef {
    let id = NodeId::random();
    Opaque {
        id,
        prefix: Space::EMPTY,
        markers: Markers::empty(),
        foreign_kind: "org.example.tree.W$Widget".to_string(),
        ops: vec![
            RpcObjectData::add_object(Some("org.example.tree.W$Widget".to_string())),
            RpcObjectData::add_value(serde_json::to_value(id).unwrap()),
            RpcObjectData::add_value(serde_json::to_value(Space::EMPTY).unwrap()),
            RpcObjectData::add_value(serde_json::to_value(Markers::empty()).unwrap()),
            RpcObjectData::add_value(serde_json::json!(payload)),
            RpcObjectData::end_of_object(),
        ],
        types: Vec::new(),
    }
    .into_tree()
}

#[tokio::test]
async fn test_opaque_payloads_are_compared() {
    test_utils::setup();
    assert!(compare(&widget("one"), &widget("one")).await.unwrap());
    assert!(!compare(&widget("one"), &widget("two")).await.unwrap());
}
