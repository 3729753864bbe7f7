//! Core language layer nodes.
//!
//! These kinds are shared by every language built on the LST: the traversal
//! engine dispatches them with an exhaustive `match`, without any knowledge of
//! extension namespaces.

use crate::error::Result;
use crate::rpc::RpcObjectData;
use crate::visitor::{ChildVisitor, Cursor};

use super::kind::j as kind;
use super::walk::{keep, Walker};
use super::{Container, JavaType, LeftPadded, Marker, Markers, NodeId, RightPadded, Space, TreeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BinaryOperator {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Modulo,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    BitAnd,
    BitOr,
    BitXor,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    Or,
    And,
}

impl BinaryOperator {
    pub fn token(&self) -> &'static str {
        match self {
            BinaryOperator::Addition => "+",
            BinaryOperator::Subtraction => "-",
            BinaryOperator::Multiplication => "*",
            BinaryOperator::Division => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::StrictEqual => "===",
            BinaryOperator::StrictNotEqual => "!==",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::LeftShift => "<<",
            BinaryOperator::RightShift => ">>",
            BinaryOperator::UnsignedRightShift => ">>>",
            BinaryOperator::Or => "||",
            BinaryOperator::And => "&&",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum UnaryOperator {
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
    Positive,
    Negative,
    Complement,
    Not,
}

impl UnaryOperator {
    pub fn token(&self) -> &'static str {
        match self {
            UnaryOperator::PreIncrement | UnaryOperator::PostIncrement => "++",
            UnaryOperator::PreDecrement | UnaryOperator::PostDecrement => "--",
            UnaryOperator::Positive => "+",
            UnaryOperator::Negative => "-",
            UnaryOperator::Complement => "~",
            UnaryOperator::Not => "!",
        }
    }

    pub fn is_postfix(&self) -> bool {
        matches!(self, UnaryOperator::PostIncrement | UnaryOperator::PostDecrement)
    }
}

#[derive(Debug, Clone)]
pub struct Identifier {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub simple_name: String,
    pub ty: Option<JavaType>,
}

impl Identifier {
    pub fn new(prefix: Space, simple_name: impl Into<String>) -> Self {
        Identifier {
            id: NodeId::random(),
            prefix,
            markers: Markers::empty(),
            simple_name: simple_name.into(),
            ty: None,
        }
    }

    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        let ty = w.ty(&self.ty).await?;
        Ok(w.changed().then(|| Identifier {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            simple_name: self.simple_name.clone(),
            ty: keep(ty, &self.ty),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct Literal {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub value: Option<serde_json::Value>,
    /// Source text of the literal exactly as written.
    pub value_source: Option<String>,
    pub ty: Option<JavaType>,
}

impl Literal {
    pub fn new(prefix: Space, value: serde_json::Value, value_source: impl Into<String>) -> Self {
        Literal {
            id: NodeId::random(),
            prefix,
            markers: Markers::empty(),
            value: Some(value),
            value_source: Some(value_source.into()),
            ty: None,
        }
    }

    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        let ty = w.ty(&self.ty).await?;
        Ok(w.changed().then(|| Literal {
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            ty: keep(ty, &self.ty),
            ..self.clone()
        }))
    }
}

#[derive(Debug, Clone)]
pub struct Binary {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub left: TreeRef,
    pub operator: LeftPadded<BinaryOperator>,
    pub right: TreeRef,
    pub ty: Option<JavaType>,
}

impl Binary {
    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        let left = w.tree(&self.left).await?;
        let operator = w.left_padded_value(&self.operator).await?;
        let right = w.tree(&self.right).await?;
        let ty = w.ty(&self.ty).await?;
        Ok(w.changed().then(|| Binary {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            left: keep(left, &self.left),
            operator: keep(operator, &self.operator),
            right: keep(right, &self.right),
            ty: keep(ty, &self.ty),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct Unary {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub operator: LeftPadded<UnaryOperator>,
    pub expression: TreeRef,
    pub ty: Option<JavaType>,
}

impl Unary {
    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        let operator = w.left_padded_value(&self.operator).await?;
        let expression = w.tree(&self.expression).await?;
        let ty = w.ty(&self.ty).await?;
        Ok(w.changed().then(|| Unary {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            operator: keep(operator, &self.operator),
            expression: keep(expression, &self.expression),
            ty: keep(ty, &self.ty),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub variable: TreeRef,
    pub assignment: LeftPadded<TreeRef>,
    pub ty: Option<JavaType>,
}

impl Assignment {
    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        let variable = w.tree(&self.variable).await?;
        let assignment = w.left_padded(&self.assignment).await?;
        let ty = w.ty(&self.ty).await?;
        Ok(w.changed().then(|| Assignment {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            variable: keep(variable, &self.variable),
            assignment: keep(assignment, &self.assignment),
            ty: keep(ty, &self.ty),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct Parentheses {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub tree: RightPadded<TreeRef>,
}

impl Parentheses {
    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        let tree = w.right_padded(&self.tree).await?;
        Ok(w.changed().then(|| Parentheses {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            tree: keep(tree, &self.tree),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct FieldAccess {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub target: TreeRef,
    /// The `.name` part; `before` is the space ahead of the dot.
    pub name: LeftPadded<TreeRef>,
    pub ty: Option<JavaType>,
}

impl FieldAccess {
    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        let target = w.tree(&self.target).await?;
        let name = w.left_padded(&self.name).await?;
        let ty = w.ty(&self.ty).await?;
        Ok(w.changed().then(|| FieldAccess {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            target: keep(target, &self.target),
            name: keep(name, &self.name),
            ty: keep(ty, &self.ty),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct MethodInvocation {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// Receiver followed by the space before the dot.
    pub select: Option<RightPadded<TreeRef>>,
    pub name: TreeRef,
    pub arguments: Container<TreeRef>,
    pub method_type: Option<JavaType>,
}

impl MethodInvocation {
    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        let select = w.opt_right_padded(&self.select).await?;
        let name = w.tree(&self.name).await?;
        let arguments = w.container(&self.arguments).await?;
        let method_type = w.ty(&self.method_type).await?;
        Ok(w.changed().then(|| MethodInvocation {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            select: keep(select, &self.select),
            name: keep(name, &self.name),
            arguments: keep(arguments, &self.arguments),
            method_type: keep(method_type, &self.method_type),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct Block {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub statements: Vec<RightPadded<TreeRef>>,
    /// Space before the closing brace.
    pub end: Space,
}

impl Block {
    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        let statements = w.padded_list(&self.statements).await?;
        let end = w.space(&self.end).await?;
        Ok(w.changed().then(|| Block {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            statements: keep(statements, &self.statements),
            end: keep(end, &self.end),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct If {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// Always a `Parentheses` node.
    pub condition: TreeRef,
    pub then_part: RightPadded<TreeRef>,
    /// `before` is the space ahead of the `else` keyword.
    pub else_part: Option<LeftPadded<TreeRef>>,
}

impl If {
    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        let condition = w.tree(&self.condition).await?;
        let then_part = w.right_padded(&self.then_part).await?;
        let else_part = w.opt_left_padded(&self.else_part).await?;
        Ok(w.changed().then(|| If {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            condition: keep(condition, &self.condition),
            then_part: keep(then_part, &self.then_part),
            else_part: keep(else_part, &self.else_part),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct Return {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub expression: Option<TreeRef>,
}

impl Return {
    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        let expression = w.opt_tree(&self.expression).await?;
        Ok(w.changed().then(|| Return {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            expression: keep(expression, &self.expression),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct NamedVariable {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub name: TreeRef,
    /// `before` is the space ahead of `=`.
    pub initializer: Option<LeftPadded<TreeRef>>,
    pub variable_type: Option<JavaType>,
}

impl NamedVariable {
    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        let name = w.tree(&self.name).await?;
        let initializer = w.opt_left_padded(&self.initializer).await?;
        let variable_type = w.ty(&self.variable_type).await?;
        Ok(w.changed().then(|| NamedVariable {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            name: keep(name, &self.name),
            initializer: keep(initializer, &self.initializer),
            variable_type: keep(variable_type, &self.variable_type),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct Empty {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
}

impl Empty {
    pub fn new(prefix: Space) -> Self {
        Empty { id: NodeId::random(), prefix, markers: Markers::empty() }
    }

    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        Ok(w.changed().then(|| Empty {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
        }))
    }
}

/// Placeholder for a construct the parser could not translate.
///
/// Carries the raw source text in `source` and a `ParseExceptionResult`
/// marker, so the tree stays lossless and downstream consumers can see the
/// failure as data.
#[derive(Debug, Clone)]
pub struct Unknown {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    /// Always an `UnknownSource` node.
    pub source: TreeRef,
}

impl Unknown {
    pub fn from_source(
        prefix: Space,
        text: impl Into<String>,
        parser_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let marker = Marker::ParseExceptionResult {
            id: NodeId::random(),
            parser_type: parser_type.into(),
            exception_type: "UnsupportedSyntax".to_string(),
            message: message.into(),
        };
        let source = UnknownSource {
            id: NodeId::random(),
            prefix: Space::EMPTY,
            markers: Markers::build(vec![marker]),
            text: text.into(),
        };
        Unknown { id: NodeId::random(), prefix, markers: Markers::empty(), source: source.into_tree() }
    }

    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        let source = w.tree(&self.source).await?;
        Ok(w.changed().then(|| Unknown {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            source: keep(source, &self.source),
        }))
    }
}

#[derive(Debug, Clone)]
pub struct UnknownSource {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub text: String,
}

impl UnknownSource {
    async fn map_children(&self, v: &mut dyn ChildVisitor, cursor: &Cursor) -> Result<Option<Self>> {
        let mut w = Walker::new(v, cursor);
        let prefix = w.space(&self.prefix).await?;
        let markers = w.markers(&self.markers).await?;
        Ok(w.changed().then(|| UnknownSource {
            id: self.id,
            prefix: keep(prefix, &self.prefix),
            markers: keep(markers, &self.markers),
            text: self.text.clone(),
        }))
    }
}

/// A node of a kind this process has no codec for, captured verbatim from the
/// wire so it can be passed through and re-emitted unchanged.
#[derive(Debug, Clone)]
pub struct Opaque {
    pub id: NodeId,
    pub prefix: Space,
    pub markers: Markers,
    pub foreign_kind: String,
    /// The complete frame as received, opening op through `EndOfObject`.
    /// Type ops carry their full value and no reference number.
    pub ops: Vec<RpcObjectData>,
    /// Type attributions resolved on capture, keyed by their op index.
    pub types: Vec<(usize, JavaType)>,
}

impl Opaque {
    async fn map_children(&self, _v: &mut dyn ChildVisitor, _cursor: &Cursor) -> Result<Option<Self>> {
        Ok(None)
    }
}

tree_namespace! {
    /// Core language layer node.
    J {
        Identifier(Identifier) => kind::IDENTIFIER,
        Literal(Literal) => kind::LITERAL,
        Binary(Binary) => kind::BINARY,
        Unary(Unary) => kind::UNARY,
        Assignment(Assignment) => kind::ASSIGNMENT,
        Parentheses(Parentheses) => kind::PARENTHESES,
        FieldAccess(FieldAccess) => kind::FIELD_ACCESS,
        MethodInvocation(MethodInvocation) => kind::METHOD_INVOCATION,
        Block(Block) => kind::BLOCK,
        If(If) => kind::IF,
        Return(Return) => kind::RETURN,
        NamedVariable(NamedVariable) => kind::NAMED_VARIABLE,
        Empty(Empty) => kind::EMPTY,
        Unknown(Unknown) => kind::UNKNOWN,
        UnknownSource(UnknownSource) => kind::UNKNOWN_SOURCE,
        Opaque(Opaque) => kind::OPAQUE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Tree, TreeCast};

    #[test]
    fn test_cast_narrows_to_variant() {
        let ident = Identifier::new(Space::EMPTY, "x").into_tree();
        assert_eq!(ident.kind(), kind::IDENTIFIER);
        assert_eq!(Identifier::cast(ident.as_ref()).map(|i| i.simple_name.as_str()), Some("x"));
        assert!(Literal::cast(ident.as_ref()).is_none());
    }

    #[test]
    fn test_with_prefix_keeps_identity() {
        let ident = Identifier::new(Space::EMPTY, "x").into_tree();
        let spaced = ident.with_prefix(Space::single_space());
        assert_eq!(spaced.id(), ident.id());
        assert_eq!(spaced.prefix(), &Space::single_space());
    }

    #[test]
    fn test_unknown_carries_parse_failure_marker() {
        let unknown = Unknown::from_source(Space::EMPTY, "@decorator class A {}", "typescript", "decorators");
        let source = UnknownSource::cast(unknown.source.as_ref()).unwrap();
        assert_eq!(source.text, "@decorator class A {}");
        assert!(source.markers.parse_exception().is_some());
    }

    #[test]
    fn test_operator_tokens() {
        assert_eq!(BinaryOperator::StrictEqual.token(), "===");
        assert!(UnaryOperator::PostIncrement.is_postfix());
        assert!(!UnaryOperator::Not.is_postfix());
    }
}
