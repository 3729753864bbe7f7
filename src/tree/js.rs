//! JavaScript/TypeScript extension nodes.
//!
//! The core traversal engine never names these kinds; it reaches them through
//! the adapter registered by [`crate::install`].

use crate::error::Result;
use crate::visitor::{ChildVisitor, Cursor};

use super::kind::js as kind;
use super::walk::{keep, Walker};
use super::{Container, JavaType, LeftPadded, Markers, NodeId, RightPadded, Space, TreeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum VariableScope {
    Const,
    Let,
    Var,
    Using,
}

impl VariableScope {
    pub fn keyword(&self) -> &'static str {
        match self {
            VariableScope::Const => "const",
            VariableScope::Let => "let",
            VariableScope::Var => "var",
            VariableScope::Using => "using",
        }
    }
}

/// Root of a parsed source file.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub source_path: String,
    pub statements: Vec<RightPadded<TreeRef>>,
    /// Trailing formatting after the last statement.
    pub eof: Space,
}

impl CompilationUnit {
    pub fn new(source_path: impl Into<String>, statements: Vec<RightPadded<TreeRef>>, eof: Space) -> Self {
        CompilationUnit {
            id: NodeId::random(),
            prefix: Space::EMPTY,
            markers: Markers::empty(),
            source_path: source_path.into(),
            statements,
            eof,
        }
    }

    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        let statements = w.padded_list(&self.statements).await?;
        let eof = w.space(&self.eof).await?;
        Ok(w.changed().then(|| CompilationUnit {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            source_path: self.source_path.clone(),
            statements: keep(statements, &self.statements),
            eof: keep(eof, &self.eof),
        }))
    }
}

/// `const a = 1, b = 2` and friends. Each variable is a `NamedVariable`.
#[derive(Debug, Clone)]
pub struct ScopedVariableDeclarations {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub scope: VariableScope,
    pub variables: Vec<RightPadded<TreeRef>>,
}

impl ScopedVariableDeclarations {
    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        let variables = w.padded_list(&self.variables).await?;
        Ok(w.changed().then(|| ScopedVariableDeclarations {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            scope: self.scope,
            variables: keep(variables, &self.variables),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct ExpressionStatement {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub expression: TreeRef,
}

impl ExpressionStatement {
    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        let expression = w.tree(&self.expression).await?;
        Ok(w.changed().then(|| ExpressionStatement {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            expression: keep(expression, &self.expression),
        }))
    }
}

/// `import { a as b, c } from "m"`.
#[derive(Debug, Clone)]
pub struct Import {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// Braced specifier list; each element is an `Alias` or an `Identifier`.
    pub specifiers: Option<Container<TreeRef>>,
    /// `before` is the space ahead of `from` when specifiers are present.
    pub module_specifier: LeftPadded<TreeRef>,
}

impl Import {
    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        let specifiers = w.opt_container(&self.specifiers).await?;
        let module_specifier = w.left_padded(&self.module_specifier).await?;
        Ok(w.changed().then(|| Import {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            specifiers: keep(specifiers, &self.specifiers),
            module_specifier: keep(module_specifier, &self.module_specifier),
        }))
    }
}

/// `name as alias` inside an import or export specifier list.
#[derive(Debug, Clone)]
pub struct Alias {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// `after` is the space ahead of `as`.
    pub property_name: RightPadded<TreeRef>,
    pub alias: TreeRef,
}

impl Alias {
    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        let property_name = w.right_padded(&self.property_name).await?;
        let alias = w.tree(&self.alias).await?;
        Ok(w.changed().then(|| Alias {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            property_name: keep(property_name, &self.property_name),
            alias: keep(alias, &self.alias),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct ArrowFunction {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub parameters: Container<TreeRef>,
    /// `before` is the space ahead of `=>`.
    pub body: LeftPadded<TreeRef>,
    pub ty: Option<JavaType>,
}

impl ArrowFunction {
    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        let parameters = w.container(&self.parameters).await?;
        let body = w.left_padded(&self.body).await?;
        let ty = w.ty(&self.ty).await?;
        Ok(w.changed().then(|| ArrowFunction {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            parameters: keep(parameters, &self.parameters),
            body: keep(body, &self.body),
            ty: keep(ty, &self.ty),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct TypeOf {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub expression: TreeRef,
    pub ty: Option<JavaType>,
}

impl TypeOf {
    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        let expression = w.tree(&self.expression).await?;
        let ty = w.ty(&self.ty).await?;
        Ok(w.changed().then(|| TypeOf {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            expression: keep(expression, &self.expression),
            ty: keep(ty, &self.ty),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct Await {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub expression: TreeRef,
    pub ty: Option<JavaType>,
}

impl Await {
    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        let expression = w.tree(&self.expression).await?;
        let ty = w.ty(&self.ty).await?;
        Ok(w.changed().then(|| Await {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            expression: keep(expression, &self.expression),
            ty: keep(ty, &self.ty),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct Void {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub expression: TreeRef,
}

impl Void {
    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        let expression = w.tree(&self.expression).await?;
        Ok(w.changed().then(|| Void {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            expression: keep(expression, &self.expression),
        }))
    }
}

tree_namespace! {
    /// JavaScript/TypeScript extension node.
    Js {
        CompilationUnit(CompilationUnit) => kind::COMPILATION_UNIT,
        ScopedVariableDeclarations(ScopedVariableDeclarations) => kind::SCOPED_VARIABLE_DECLARATIONS,
        ExpressionStatement(ExpressionStatement) => kind::EXPRESSION_STATEMENT,
        Import(Import) => kind::IMPORT,
        Alias(Alias) => kind::ALIAS,
        ArrowFunction(ArrowFunction) => kind::ARROW_FUNCTION,
        TypeOf(TypeOf) => kind::TYPE_OF,
        Await(Await) => kind::AWAIT,
        Void(Void) => kind::VOID,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::j::Identifier;
    use crate::tree::{Tree, TreeCast};

    #[test]
    fn test_extension_nodes_are_not_core_nodes() {
        let stmt = ExpressionStatement {
            id: NodeId::random(),
            prefix: Space::EMPTY,
            markers: Markers::empty(),
            expression: Identifier::new(Space::EMPTY, "a").into_tree(),
        }
        .into_tree();
        assert!(stmt.as_j().is_none());
        assert!(stmt.as_js().is_some());
        assert_eq!(stmt.kind().namespace(), crate::tree::kind::JS_NAMESPACE);
        assert!(ExpressionStatement::cast(stmt.as_ref()).is_some());
    }

    #[test]
    fn test_scope_keywords() {
        assert_eq!(VariableScope::Const.keyword(), "const");
        assert_eq!(VariableScope::Using.keyword(), "using");
    }
}
