//! # MIR Values
//!
//! This module defines values and operands in the MIR system.
//! Values represent data that flows through the program.

use crate::{FunctionId, MirType, PrettyPrint, StringId, ValueId};

/// Represents any value in the program: constants or instruction results.
///
/// # Design Notes
///
/// - Literals are embedded directly
/// - Operands reference values computed by instructions
/// - Mutable source variables are *not* values: they live in slots
/// - `Error` is the null sentinel substituted for an expression that failed
///   to lower, so that lowering can continue
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// A constant literal value
    Literal(Literal),

    /// An operand that references a computed value
    /// The `ValueId` points to the instruction that produces this value
    Operand(ValueId),

    /// A placeholder for unresolved or ill-typed expressions
    Error,
}

/// Literal constant values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    /// 32-bit integer literal
    Integer(i32),

    /// 64-bit floating point literal
    Float(f64),

    /// Boolean literal
    Boolean(bool),

    /// Pointer to a hoisted string constant of the module
    String(StringId),

    /// The null string pointer
    Null,

    /// Pointer to a function of the module
    Function(FunctionId),

    /// The value of a void call
    Unit,
}

impl Literal {
    /// The type of this literal, when it can be known without a module.
    ///
    /// Function literals need the callee's signature and return `None`.
    pub const fn known_type(&self) -> Option<MirType> {
        match self {
            Self::Integer(_) => Some(MirType::Int),
            Self::Float(_) => Some(MirType::Float),
            Self::Boolean(_) => Some(MirType::Bool),
            Self::String(_) | Self::Null => Some(MirType::String),
            Self::Unit => Some(MirType::Void),
            Self::Function(_) => None,
        }
    }
}

impl Value {
    /// Creates a new integer literal value
    pub const fn integer(value: i32) -> Self {
        Self::Literal(Literal::Integer(value))
    }

    /// Creates a new float literal value
    pub const fn float(value: f64) -> Self {
        Self::Literal(Literal::Float(value))
    }

    /// Creates a new boolean literal value
    pub const fn boolean(value: bool) -> Self {
        Self::Literal(Literal::Boolean(value))
    }

    /// Creates a reference to a string constant
    pub const fn string(id: StringId) -> Self {
        Self::Literal(Literal::String(id))
    }

    /// Creates the null string pointer
    pub const fn null() -> Self {
        Self::Literal(Literal::Null)
    }

    /// Creates a reference to a function
    pub const fn function(id: FunctionId) -> Self {
        Self::Literal(Literal::Function(id))
    }

    /// Creates the unit value
    pub const fn unit() -> Self {
        Self::Literal(Literal::Unit)
    }

    /// Creates a new operand value
    pub const fn operand(id: ValueId) -> Self {
        Self::Operand(id)
    }

    /// Creates an error value for error recovery
    pub const fn error() -> Self {
        Self::Error
    }

    /// Returns true if this is a literal value
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Returns true if this is an operand
    pub const fn is_operand(&self) -> bool {
        matches!(self, Self::Operand(_))
    }

    /// Returns true if this is the error sentinel
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Returns the ValueId if this is an operand
    pub const fn as_operand(&self) -> Option<ValueId> {
        match self {
            Self::Operand(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns the literal if this is a literal value
    pub const fn as_literal(&self) -> Option<Literal> {
        match self {
            Self::Literal(lit) => Some(*lit),
            _ => None,
        }
    }
}

impl PrettyPrint for Value {
    fn pretty_print(&self, _indent: usize) -> String {
        match self {
            Self::Literal(lit) => lit.pretty_print(0),
            Self::Operand(id) => id.pretty_print(0),
            Self::Error => "<error>".to_string(),
        }
    }
}

impl PrettyPrint for Literal {
    fn pretty_print(&self, _indent: usize) -> String {
        match self {
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => format!("{value:?}"),
            Self::Boolean(value) => value.to_string(),
            Self::String(id) => id.pretty_print(0),
            Self::Null => "null".to_string(),
            Self::Function(id) => id.pretty_print(0),
            Self::Unit => "()".to_string(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.pretty_print(0))
    }
}
