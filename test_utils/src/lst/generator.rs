//! Random JavaScript expressions for property-based testing.
//!
//! [`FormattedExpr`] pairs a random expression with a random layout. The
//! layout decides the whitespace (and the occasional block comment) in every
//! formatting slot of the tree, so two values with the same `expr` and
//! different layouts build structurally equivalent trees that print
//! differently.
//!
//! Generation functions take a depth parameter to bound recursion.

use std::fmt;

use lst_js::tree::j::{
    Binary, BinaryOperator, FieldAccess, Identifier, Literal, MethodInvocation, Parentheses, Unary, UnaryOperator,
};
use lst_js::tree::js::{Await, CompilationUnit, ExpressionStatement, TypeOf, Void};
use lst_js::tree::{Comment, Container, LeftPadded, Marker, Markers, NodeId, RightPadded, Space, TreeRef};
use quickcheck::{Arbitrary, Gen};

#[derive(Clone, Debug)]
pub enum Expr {
    Ident(String),
    Number(u32),
    Str(String),
    Binary(Box<Expr>, BinaryOperator, Box<Expr>),
    Unary(UnaryOperator, Box<Expr>),
    Paren(Box<Expr>),
    Field(Box<Expr>, String),
    Call(Option<Box<Expr>>, String, Vec<Expr>),
    TypeOf(Box<Expr>),
    Await(Box<Expr>),
    Void(Box<Expr>),
}

/// An expression plus the formatting to build it with.
#[derive(Clone, Debug)]
pub struct FormattedExpr {
    pub expr: Expr,
    pub layout: Vec<u8>,
}

/// Maximum recursion depth for generation.
const MAX_DEPTH: usize = 6;

const RESERVED_KEYWORDS: &[&str] = &[
    "as", "await", "const", "do", "else", "from", "if", "import", "in", "let", "new", "return", "typeof", "var",
    "void",
];

const BINARY_OPERATORS: &[BinaryOperator] = &[
    BinaryOperator::Addition,
    BinaryOperator::Subtraction,
    BinaryOperator::Multiplication,
    BinaryOperator::LessThan,
    BinaryOperator::StrictEqual,
    BinaryOperator::And,
    BinaryOperator::Or,
];

const UNARY_OPERATORS: &[UnaryOperator] =
    &[UnaryOperator::Negative, UnaryOperator::Not, UnaryOperator::Complement, UnaryOperator::PostIncrement];

/// Generates a random number in the range [min, max] inclusive.
fn gen_range(g: &mut Gen, min: u32, max: u32) -> u32 {
    min + (u32::arbitrary(g) % (max - min + 1))
}

fn gen_name(g: &mut Gen) -> String {
    let starters: Vec<char> = "abcdefghijklmnopqrstuvwxyz_$".chars().collect();
    let continuers: Vec<char> = "abcdefghijklmnopqrstuvwxyz0123456789_".chars().collect();
    loop {
        let len = gen_range(g, 1, 8);
        let mut name = String::new();
        name.push(*g.choose(&starters).unwrap());
        for _ in 1..len {
            name.push(*g.choose(&continuers).unwrap());
        }
        if !RESERVED_KEYWORDS.contains(&name.as_str()) {
            return name;
        }
    }
}

fn gen_string_content(g: &mut Gen) -> String {
    let len = gen_range(g, 0, 5);
    (0..len)
        .map(|_| {
            let mut c = char::arbitrary(g);
            while c.is_control() || c == '"' || c == '\\' {
                c = char::arbitrary(g);
            }
            c
        })
        .collect()
}

fn gen_leaf(g: &mut Gen) -> Expr {
    match gen_range(g, 0, 2) {
        0 => Expr::Ident(gen_name(g)),
        1 => Expr::Number(gen_range(g, 0, 999)),
        _ => Expr::Str(gen_string_content(g)),
    }
}

pub fn gen_expr(g: &mut Gen, depth: usize) -> Expr {
    if depth == 0 {
        return gen_leaf(g);
    }
    let sub = |g: &mut Gen| Box::new(gen_expr(g, depth - 1));
    match gen_range(g, 0, 9) {
        0 | 1 => gen_leaf(g),
        2 => Expr::Binary(sub(g), *g.choose(BINARY_OPERATORS).unwrap(), sub(g)),
        3 => Expr::Unary(*g.choose(UNARY_OPERATORS).unwrap(), sub(g)),
        4 => Expr::Paren(sub(g)),
        5 => Expr::Field(sub(g), gen_name(g)),
        6 => {
            let select = bool::arbitrary(g).then(|| sub(g));
            let args = (0..gen_range(g, 0, 3)).map(|_| gen_expr(g, depth - 1)).collect();
            Expr::Call(select, gen_name(g), args)
        }
        7 => Expr::TypeOf(sub(g)),
        8 => Expr::Await(sub(g)),
        _ => Expr::Void(sub(g)),
    }
}

impl Arbitrary for Expr {
    fn arbitrary(g: &mut Gen) -> Self {
        gen_expr(g, g.size().min(MAX_DEPTH))
    }
}

impl Arbitrary for FormattedExpr {
    fn arbitrary(g: &mut Gen) -> Self {
        let expr = Expr::arbitrary(g);
        let layout = (0..gen_range(g, 1, 16)).map(|_| u8::arbitrary(g)).collect();
        FormattedExpr { expr, layout }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let expr = self.expr.clone();
        Box::new(self.layout.shrink().map(move |layout| FormattedExpr { expr: expr.clone(), layout }))
    }
}

/// Hands out the formatting for each slot, cycling through the layout bytes.
struct Layout<'a> {
    slots: &'a [u8],
    next: usize,
}

impl Layout<'_> {
    fn space(&mut self) -> Space {
        if self.slots.is_empty() {
            return Space::EMPTY;
        }
        let slot = self.slots[self.next % self.slots.len()];
        self.next += 1;
        match slot % 8 {
            0 | 1 | 2 => Space::EMPTY,
            3 => Space::format(" "),
            4 => Space::format("  "),
            5 => Space::format("\n"),
            6 => Space::format("\n    "),
            _ => Space::format(" ").with_comment(Comment::block(" note ", " ")),
        }
    }

    /// The operand of a keyword operator needs at least one space.
    fn keyword_operand(&mut self) -> Space {
        let space = self.space();
        if space.is_empty() { Space::format(" ") } else { space }
    }
}

impl FormattedExpr {
    /// Builds the tree for `expr` with this layout.
    pub fn to_tree(&self) -> TreeRef {
        let mut layout = Layout { slots: &self.layout, next: 0 };
        build(&self.expr, Space::EMPTY, &mut layout)
    }

    /// Wraps the tree in an expression statement inside a compilation unit.
    pub fn to_unit(&self) -> TreeRef {
        let statement = ExpressionStatement {
            id: NodeId::random(),
            prefix: Space::EMPTY,
            markers: Markers::empty(),
            expression: self.to_tree(),
        }
        .into_tree();
        let terminated =
            RightPadded { element: statement, after: Space::EMPTY, markers: Markers::build(vec![Marker::semicolon()]) };
        CompilationUnit::new("generated.js", vec![terminated], Space::format("\n")).into_tree()
    }

    /// The same expression with no optional whitespace at all.
    pub fn tight(&self) -> FormattedExpr {
        FormattedExpr { expr: self.expr.clone(), layout: Vec::new() }
    }
}

fn build(expr: &Expr, prefix: Space, layout: &mut Layout<'_>) -> TreeRef {
    let id = NodeId::random();
    let markers = Markers::empty();
    match expr {
        Expr::Ident(name) => Identifier::new(prefix, name.as_str()).into_tree(),
        Expr::Number(n) => Literal::new(prefix, serde_json::json!(n), n.to_string()).into_tree(),
        Expr::Str(s) => Literal::new(prefix, serde_json::json!(s), format!("\"{}\"", s)).into_tree(),
        Expr::Binary(left, operator, right) => {
            let left = build(left, Space::EMPTY, layout);
            let operator = LeftPadded::new(layout.space(), *operator);
            let right_prefix = layout.space();
            let right = build(right, right_prefix, layout);
            Binary { id, prefix, markers, left, operator, right, ty: None }.into_tree()
        }
        Expr::Unary(operator, expression) => {
            let (operator, expression) = if operator.is_postfix() {
                let expression = build(expression, Space::EMPTY, layout);
                (LeftPadded::new(layout.space(), *operator), expression)
            } else {
                let expression_prefix = layout.space();
                (LeftPadded::new(Space::EMPTY, *operator), build(expression, expression_prefix, layout))
            };
            Unary { id, prefix, markers, operator, expression, ty: None }.into_tree()
        }
        Expr::Paren(inner) => {
            let inner_prefix = layout.space();
            let inner = build(inner, inner_prefix, layout);
            Parentheses { id, prefix, markers, tree: RightPadded::new(inner, layout.space()) }.into_tree()
        }
        Expr::Field(target, name) => {
            let target = build(target, Space::EMPTY, layout);
            let dot = layout.space();
            let name = Identifier::new(layout.space(), name.as_str()).into_tree();
            FieldAccess { id, prefix, markers, target, name: LeftPadded::new(dot, name), ty: None }.into_tree()
        }
        Expr::Call(select, name, args) => {
            let select = select.as_ref().map(|select| {
                let select = build(select, Space::EMPTY, layout);
                RightPadded::new(select, layout.space())
            });
            let name_prefix = if select.is_some() { layout.space() } else { Space::EMPTY };
            let name = Identifier::new(name_prefix, name.as_str()).into_tree();
            let before = layout.space();
            let elements = args
                .iter()
                .map(|arg| {
                    let arg_prefix = layout.space();
                    let arg = build(arg, arg_prefix, layout);
                    RightPadded::new(arg, layout.space())
                })
                .collect();
            MethodInvocation {
                id,
                prefix,
                markers,
                select,
                name,
                arguments: Container::new(before, elements),
                method_type: None,
            }
            .into_tree()
        }
        Expr::TypeOf(expression) => {
            let operand = layout.keyword_operand();
            TypeOf { id, prefix, markers, expression: build(expression, operand, layout), ty: None }.into_tree()
        }
        Expr::Await(expression) => {
            let operand = layout.keyword_operand();
            Await { id, prefix, markers, expression: build(expression, operand, layout), ty: None }.into_tree()
        }
        Expr::Void(expression) => {
            let operand = layout.keyword_operand();
            Void { id, prefix, markers, expression: build(expression, operand, layout) }.into_tree()
        }
    }
}

/// Renders the expression with no optional whitespace, the way a tight
/// layout prints it.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(name) => write!(f, "{}", name),
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Str(s) => write!(f, "\"{}\"", s),
            Expr::Binary(left, operator, right) => write!(f, "{}{}{}", left, operator.token(), right),
            Expr::Unary(operator, expression) if operator.is_postfix() => {
                write!(f, "{}{}", expression, operator.token())
            }
            Expr::Unary(operator, expression) => write!(f, "{}{}", operator.token(), expression),
            Expr::Paren(inner) => write!(f, "({})", inner),
            Expr::Field(target, name) => write!(f, "{}.{}", target, name),
            Expr::Call(select, name, args) => {
                if let Some(select) = select {
                    write!(f, "{}.", select)?;
                }
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::TypeOf(expression) => write!(f, "typeof {}", expression),
            Expr::Await(expression) => write!(f, "await {}", expression),
            Expr::Void(expression) => write!(f, "void {}", expression),
        }
    }
}
