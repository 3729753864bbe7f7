//! Traversal engine: dispatch into both namespaces, structural sharing on
//! rewrite, cursor bookkeeping and early termination.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use lst_js::tree::j::{BinaryOperator, Identifier};
use lst_js::tree::js::Import;
use lst_js::tree::{kind, Kind, Markers, NodeId, RightPadded, Space, Tree, TreeRef};
use lst_js::visitor::{dispatch_js, walk};
use lst_js::{Cursor, JsVisitor, LstError, Result, StopToken, TreeVisitor};
use test_utils::lst::builders::{
    binary, const_decl, expression_statement, ident, identifier_statements, import_alias, number, statement, sum,
    unit,
};

struct Identity;

impl TreeVisitor<()> for Identity {}

/// Core-only rewrite: renames one identifier wherever it occurs.
struct Rename {
    from: &'static str,
    to: &'static str,
}

#[async_trait]
impl TreeVisitor<usize> for Rename {
    async fn visit_identifier(
        &mut self,
        tree: &TreeRef,
        node: &Identifier,
        renamed: &mut usize,
        _cursor: &Cursor,
    ) -> Result<TreeRef> {
        if node.simple_name != self.from {
            return Ok(tree.clone());
        }
        *renamed += 1;
        Ok(Identifier { simple_name: self.to.to_string(), ..node.clone() }.into_tree())
    }
}

fn statements_of(tree: &TreeRef) -> Vec<TreeRef> {
    match tree.as_js() {
        Some(lst_js::tree::Js::CompilationUnit(cu)) => cu.statements.iter().map(|s| s.element.clone()).collect(),
        other => panic!("expected a compilation unit, got {other:?}"),
    }
}

#[tokio::test]
async fn test_identity_visit_returns_same_root() {
    test_utils::setup();
    let tree = unit(vec![
        statement(const_decl("", "x", number("", 1))),
        statement(expression_statement("\n", sum(true))),
    ]);
    let out = Identity.visit_root(&tree, &mut ()).await.unwrap();
    assert!(Arc::ptr_eq(&tree, &out));
}

#[tokio::test]
async fn test_core_visitor_descends_into_extension_nodes() {
    test_utils::setup();
    let tree = unit(identifier_statements(&["a", "b", "a"]));
    let mut renamed = 0;
    let out = Rename { from: "a", to: "z" }.visit_root(&tree, &mut renamed).await.unwrap();
    assert_eq!(renamed, 2);
    assert_eq!(lst_js::print(&out).await.unwrap(), "z;\nb;\nz;");

    let (before, after) = (statements_of(&tree), statements_of(&out));
    assert!(!Arc::ptr_eq(&before[0], &after[0]));
    assert!(Arc::ptr_eq(&before[1], &after[1]));
    assert!(!Arc::ptr_eq(&before[2], &after[2]));
    assert_eq!(before[0].id(), after[0].id());
    assert_eq!(tree.id(), out.id());
}

#[tokio::test]
async fn test_rewrite_without_match_shares_everything() {
    test_utils::setup();
    let tree = unit(identifier_statements(&["a", "b"]));
    let mut renamed = 0;
    let out = Rename { from: "q", to: "z" }.visit_root(&tree, &mut renamed).await.unwrap();
    assert_eq!(renamed, 0);
    assert!(Arc::ptr_eq(&tree, &out));
}

/// Records the depth and enclosing declaration of every identifier.
#[derive(Default)]
struct CursorProbe {
    seen: Vec<(String, usize, bool)>,
}

#[async_trait]
impl TreeVisitor<()> for CursorProbe {
    async fn visit_identifier(&mut self, tree: &TreeRef, node: &Identifier, _p: &mut (), cursor: &Cursor) -> Result<TreeRef> {
        assert!(cursor.value().is_some_and(|value| Arc::ptr_eq(value, tree)));
        let in_declaration = cursor.first_enclosing(kind::js::SCOPED_VARIABLE_DECLARATIONS).is_some();
        self.seen.push((node.simple_name.clone(), cursor.depth(), in_declaration));
        Ok(tree.clone())
    }
}

#[tokio::test]
async fn test_cursor_tracks_ancestors() {
    test_utils::setup();
    let tree = unit(vec![
        statement(const_decl("", "x", number("", 1))),
        statement(expression_statement("\n", ident("", "y"))),
    ]);
    let mut probe = CursorProbe::default();
    probe.visit_root(&tree, &mut ()).await.unwrap();
    assert_eq!(probe.seen, vec![("x".to_string(), 4, true), ("y".to_string(), 3, false)]);
}

/// Counts imports through the extension's own dispatch.
#[derive(Default)]
struct ImportCounter {
    modules: Vec<String>,
}

#[async_trait]
impl TreeVisitor<()> for ImportCounter {
    async fn visit_extension(&mut self, tree: &TreeRef, p: &mut (), cursor: &Cursor) -> Result<TreeRef> {
        dispatch_js(self, tree, p, cursor).await
    }
}

#[async_trait]
impl JsVisitor<()> for ImportCounter {
    async fn visit_import(&mut self, tree: &TreeRef, node: &Import, _p: &mut (), _cursor: &Cursor) -> Result<TreeRef> {
        let module = lst_js::print(&node.module_specifier.element).await?;
        self.modules.push(module.trim().to_string());
        Ok(tree.clone())
    }
}

#[tokio::test]
async fn test_extension_dispatch_reaches_kind_methods() {
    test_utils::setup();
    let tree = unit(vec![
        statement(import_alias("", "a", "b", "x")),
        statement(import_alias("\n", "c", "d", "y")),
    ]);
    let mut counter = ImportCounter::default();
    counter.visit_root(&tree, &mut ()).await.unwrap();
    assert_eq!(counter.modules, vec!["\"x\"", "\"y\""]);
}

/// Stops the traversal after a fixed number of nodes.
struct StopAfter {
    remaining: usize,
    visited: usize,
    token: StopToken,
}

#[async_trait]
impl TreeVisitor<()> for StopAfter {
    fn is_stopped(&self) -> bool {
        self.token.is_stopped()
    }

    async fn visit(&mut self, tree: &TreeRef, p: &mut (), parent: &Cursor) -> Result<TreeRef> {
        if self.is_stopped() {
            return Ok(tree.clone());
        }
        self.visited += 1;
        self.remaining -= 1;
        if self.remaining == 0 {
            self.token.stop();
        }
        walk(self, tree, p, parent).await
    }
}

#[tokio::test]
async fn test_stop_token_halts_traversal() {
    test_utils::setup();
    let tree = unit(identifier_statements(&["a", "b", "c", "d"]));
    let mut visitor = StopAfter { remaining: 3, visited: 0, token: StopToken::new() };
    let out = visitor.visit_root(&tree, &mut ()).await.unwrap();
    assert_eq!(visitor.visited, 3);
    assert!(Arc::ptr_eq(&tree, &out));
}

#[derive(Debug, Clone)]
struct Widget {
    id: NodeId,
    prefix: Space,
    markers: Markers,
}

const WIDGET: Kind = Kind::new("org.example.tree.W$Widget");

impl Tree for Widget {
    fn kind(&self) -> Kind {
        WIDGET
    }

    fn id(&self) -> NodeId {
        self.id
    }

    fn prefix(&self) -> &Space {
        &self.prefix
    }

    fn markers(&self) -> &Markers {
        &self.markers
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn with_prefix(&self, prefix: Space) -> TreeRef {
        Arc::new(Widget { prefix, ..self.clone() })
    }

    fn with_markers(&self, markers: Markers) -> TreeRef {
        Arc::new(Widget { markers, ..self.clone() })
    }

    fn with_id(&self, id: NodeId) -> TreeRef {
        Arc::new(Widget { id, ..self.clone() })
    }
}

#[tokio::test]
async fn test_unregistered_kind_is_an_error() {
    test_utils::setup();
    let widget: TreeRef = Arc::new(Widget { id: NodeId::random(), prefix: Space::EMPTY, markers: Markers::empty() });
    let tree = binary(ident("", "a"), " ", BinaryOperator::Addition, widget);
    match Identity.visit_root(&tree, &mut ()).await {
        Err(LstError::UnknownKind { kind, .. }) => assert_eq!(kind, WIDGET.to_string()),
        other => panic!("expected UnknownKind, got {other:?}"),
    }
}

#[tokio::test]
async fn test_padding_is_kept_on_rebuild() {
    test_utils::setup();
    let tree = unit(vec![RightPadded::new(
        expression_statement("", binary(ident("", "a"), "  ", BinaryOperator::Subtraction, ident("   ", "b"))),
        Space::format(" "),
    )]);
    let mut renamed = 0;
    let out = Rename { from: "b", to: "c" }.visit_root(&tree, &mut renamed).await.unwrap();
    assert_eq!(lst_js::print(&out).await.unwrap(), "a  -   c ");
}
