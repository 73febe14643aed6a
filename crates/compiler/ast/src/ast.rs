//! # Mana AST
//!
//! This module contains the abstract syntax tree (AST) for the Mana language.
//!
//! The AST represents the structure of a program: a list of statements, some
//! of which declare functions.

use mana_compiler_diagnostics::SourceLocation;
use serde::{Deserialize, Serialize};

/// A node together with the place in the source it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub node: T,
    #[serde(default)]
    pub location: SourceLocation,
}

impl<T> Spanned<T> {
    /// Create a new spanned node
    pub const fn new(node: T, location: SourceLocation) -> Self {
        Self { node, location }
    }

    /// Create a node with an unknown location
    pub fn unlocated(node: T) -> Self {
        Self::new(node, SourceLocation::default())
    }

    /// Get the wrapped node
    pub const fn node(&self) -> &T {
        &self.node
    }

    /// Get the source location
    pub const fn location(&self) -> &SourceLocation {
        &self.location
    }
}

/// Literal values that can appear in expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    /// Integer literal (e.g., `42`)
    Integer(i32),
    /// Floating-point literal (e.g., `3.5`)
    Float(f64),
    /// String literal (e.g., `"hello\n"`)
    String(String),
    /// Boolean literal (`true` or `false`)
    Boolean(bool),
    /// The `null` literal
    Null,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    /// Arithmetic negation `-`
    Neg,
    /// Logical negation `!`
    Not,
}

/// Binary operators supported in expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    /// Addition operator `+`
    Add,
    /// Subtraction operator `-`
    Sub,
    /// Multiplication operator `*`
    Mul,
    /// Division operator `/`
    Div,
    /// Remainder operator `%`
    Mod,
    /// Equality operator `==`
    Eq,
    /// Inequality operator `!=`
    Neq,
    /// Less-than operator `<`
    Less,
    /// Less-than-or-equal operator `<=`
    LessEqual,
    /// Greater-than operator `>`
    Greater,
    /// Greater-than-or-equal operator `>=`
    GreaterEqual,
    /// Short-circuit logical AND `&&`
    And,
    /// Short-circuit logical OR `||`
    Or,
}

impl BinaryOp {
    /// Returns true for `&&` and `||`
    pub const fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    /// Returns true for equality and ordering comparisons
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Neq | Self::Less | Self::LessEqual | Self::Greater | Self::GreaterEqual
        )
    }

    /// The source-level spelling of the operator
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "==",
            Self::Neq => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

/// Represents an expression in the Mana language.
///
/// Every expression evaluates to exactly one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    /// A literal constant
    Literal(Literal),
    /// Unary operation (e.g., `-x`, `!done`)
    Unary {
        op: UnaryOp,
        operand: Box<Spanned<Expression>>,
    },
    /// Binary operation (e.g., `a + b`, `x == y`, `p && q`)
    Binary {
        op: BinaryOp,
        left: Box<Spanned<Expression>>,
        right: Box<Spanned<Expression>>,
    },
    /// Parenthesized expression (e.g., `(a + b)`)
    Grouping(Box<Spanned<Expression>>),
    /// Variable reference (e.g., `x`)
    Variable(String),
    /// Assignment to a declared variable (e.g., `x = 3`)
    Assign {
        name: String,
        value: Box<Spanned<Expression>>,
    },
    /// Function call (e.g., `foo()`, `add(x, y)`)
    Call {
        callee: Box<Spanned<Expression>>,
        args: Vec<Spanned<Expression>>,
    },
}

/// A function parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub location: SourceLocation,
}

/// A function declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Parameter>,
    pub body: Vec<Spanned<Statement>>,
}

/// Represents a statement in the Mana language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    /// An expression evaluated for its side effects (e.g., `print("hi");`)
    Expression(Spanned<Expression>),
    /// Variable or constant declaration (e.g., `var x = 1;`, `const y = 2;`)
    VarDecl {
        name: String,
        initializer: Option<Spanned<Expression>>,
        is_const: bool,
    },
    /// Block statement (e.g., `{ stmt1; stmt2; }`)
    Block(Vec<Spanned<Statement>>),
    /// If statement (e.g., `if (cond) { ... } else { ... }`)
    If {
        condition: Spanned<Expression>,
        then_branch: Box<Spanned<Statement>>,
        else_branch: Option<Box<Spanned<Statement>>>,
    },
    /// While loop (e.g., `while (cond) { ... }`)
    While {
        condition: Spanned<Expression>,
        body: Box<Spanned<Statement>>,
    },
    /// Function declaration
    Function(FunctionDef),
    /// Return statement (e.g., `return x;`, `return;`)
    Return(Option<Spanned<Expression>>),
}

impl Statement {
    /// A short human name for the statement kind, used in diagnostics
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Expression(_) => "expression statement",
            Self::VarDecl { .. } => "variable declaration",
            Self::Block(_) => "block",
            Self::If { .. } => "if statement",
            Self::While { .. } => "while statement",
            Self::Function(_) => "function declaration",
            Self::Return(_) => "return statement",
        }
    }
}

/// A whole program: the ordered top-level statements of one source file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Spanned<Statement>>,
}

impl Program {
    pub const fn new(statements: Vec<Spanned<Statement>>) -> Self {
        Self { statements }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::*;

    #[test]
    fn test_program_json_shape() {
        let program = Program::new(vec![var_decl("x", Some(int(5)))]);
        let json = serde_json::to_value(&program).unwrap();
        assert_eq!(
            json["statements"][0]["node"]["var_decl"]["initializer"]["node"]["literal"]["integer"],
            5
        );
    }

    #[test]
    fn test_program_from_json_without_locations() {
        let json = r#"{
            "statements": [
                { "node": { "expression": { "node": {
                    "assign": { "name": "y", "value": { "node": { "literal": { "integer": 3 } } } }
                } } } }
            ]
        }"#;
        let program: Program = serde_json::from_str(json).unwrap();
        assert_eq!(program.statements.len(), 1);
        assert!(program.statements[0].location().is_unknown());
        match &program.statements[0].node {
            Statement::Expression(expr) => {
                assert!(matches!(&expr.node, Expression::Assign { name, .. } if name == "y"));
            }
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn test_null_literal_json() {
        let expr: Spanned<Expression> =
            serde_json::from_str(r#"{ "node": { "literal": "null" } }"#).unwrap();
        assert_eq!(expr.node, Expression::Literal(Literal::Null));
    }

    #[test]
    fn test_operator_classification() {
        assert!(BinaryOp::And.is_logical());
        assert!(!BinaryOp::Add.is_logical());
        assert!(BinaryOp::LessEqual.is_comparison());
        assert_eq!(BinaryOp::GreaterEqual.symbol(), ">=");
    }
}
