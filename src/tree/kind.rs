//! Kind tags: the discriminant identifying a node's concrete variant.
//!
//! Kinds are namespaced the way the wider LST ecosystem names them
//! (`<namespace>$<Variant>`), so a kind string received over RPC can be matched
//! against a peer written in another language.

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Kind(&'static str);

impl Kind {
    pub const fn new(name: &'static str) -> Self {
        Kind(name)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    /// The namespace part of the kind, e.g. `org.openrewrite.java.tree.J`.
    pub fn namespace(&self) -> &'static str {
        match self.0.rfind('$') {
            Some(idx) => &self.0[..idx],
            None => self.0,
        }
    }

    /// The variant part of the kind, e.g. `Binary`.
    pub fn simple_name(&self) -> &'static str {
        match self.0.rfind('$') {
            Some(idx) => &self.0[idx + 1..],
            None => self.0,
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Kind({})", self.0)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

pub const J_NAMESPACE: &str = "org.openrewrite.java.tree.J";
pub const JS_NAMESPACE: &str = "org.openrewrite.javascript.tree.JS";

/// Core (generic language layer) kinds.
pub mod j {
    use super::Kind;

    pub const IDENTIFIER: Kind = Kind::new("org.openrewrite.java.tree.J$Identifier");
    pub const LITERAL: Kind = Kind::new("org.openrewrite.java.tree.J$Literal");
    pub const BINARY: Kind = Kind::new("org.openrewrite.java.tree.J$Binary");
    pub const UNARY: Kind = Kind::new("org.openrewrite.java.tree.J$Unary");
    pub const ASSIGNMENT: Kind = Kind::new("org.openrewrite.java.tree.J$Assignment");
    pub const PARENTHESES: Kind = Kind::new("org.openrewrite.java.tree.J$Parentheses");
    pub const FIELD_ACCESS: Kind = Kind::new("org.openrewrite.java.tree.J$FieldAccess");
    pub const METHOD_INVOCATION: Kind = Kind::new("org.openrewrite.java.tree.J$MethodInvocation");
    pub const BLOCK: Kind = Kind::new("org.openrewrite.java.tree.J$Block");
    pub const IF: Kind = Kind::new("org.openrewrite.java.tree.J$If");
    pub const RETURN: Kind = Kind::new("org.openrewrite.java.tree.J$Return");
    pub const NAMED_VARIABLE: Kind = Kind::new("org.openrewrite.java.tree.J$NamedVariable");
    pub const EMPTY: Kind = Kind::new("org.openrewrite.java.tree.J$Empty");
    pub const UNKNOWN: Kind = Kind::new("org.openrewrite.java.tree.J$Unknown");
    pub const UNKNOWN_SOURCE: Kind = Kind::new("org.openrewrite.java.tree.J$UnknownSource");
    pub const OPAQUE: Kind = Kind::new("org.openrewrite.java.tree.J$Opaque");

    pub const ALL: &[Kind] = &[
        IDENTIFIER,
        LITERAL,
        BINARY,
        UNARY,
        ASSIGNMENT,
        PARENTHESES,
        FIELD_ACCESS,
        METHOD_INVOCATION,
        BLOCK,
        IF,
        RETURN,
        NAMED_VARIABLE,
        EMPTY,
        UNKNOWN,
        UNKNOWN_SOURCE,
        OPAQUE,
    ];
}

/// JavaScript/TypeScript extension kinds.
pub mod js {
    use super::Kind;

    pub const COMPILATION_UNIT: Kind = Kind::new("org.openrewrite.javascript.tree.JS$CompilationUnit");
    pub const SCOPED_VARIABLE_DECLARATIONS: Kind =
        Kind::new("org.openrewrite.javascript.tree.JS$ScopedVariableDeclarations");
    pub const EXPRESSION_STATEMENT: Kind = Kind::new("org.openrewrite.javascript.tree.JS$ExpressionStatement");
    pub const IMPORT: Kind = Kind::new("org.openrewrite.javascript.tree.JS$Import");
    pub const ALIAS: Kind = Kind::new("org.openrewrite.javascript.tree.JS$Alias");
    pub const ARROW_FUNCTION: Kind = Kind::new("org.openrewrite.javascript.tree.JS$ArrowFunction");
    pub const TYPE_OF: Kind = Kind::new("org.openrewrite.javascript.tree.JS$TypeOf");
    pub const AWAIT: Kind = Kind::new("org.openrewrite.javascript.tree.JS$Await");
    pub const VOID: Kind = Kind::new("org.openrewrite.javascript.tree.JS$Void");

    pub const ALL: &[Kind] = &[
        COMPILATION_UNIT,
        SCOPED_VARIABLE_DECLARATIONS,
        EXPRESSION_STATEMENT,
        IMPORT,
        ALIAS,
        ARROW_FUNCTION,
        TYPE_OF,
        AWAIT,
        VOID,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_namespaces() {
        assert_eq!(j::BINARY.namespace(), J_NAMESPACE);
        assert_eq!(js::TYPE_OF.namespace(), JS_NAMESPACE);
        assert_eq!(js::TYPE_OF.simple_name(), "TypeOf");
        assert!(j::ALL.iter().all(|k| k.namespace() == J_NAMESPACE));
        assert!(js::ALL.iter().all(|k| k.namespace() == JS_NAMESPACE));
    }
}
