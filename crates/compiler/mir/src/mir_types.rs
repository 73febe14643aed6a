//! # MIR Type System
//!
//! The concrete type tags carried by every MIR value.

use std::fmt;

/// Represents a type in MIR
///
/// The tags mirror the machine-level types the program will be emitted as:
/// 32-bit integers, 64-bit floats, 1-bit booleans and string pointers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MirType {
    /// 32-bit signed integer
    Int,
    /// 64-bit floating point
    Float,
    /// 1-bit boolean
    Bool,
    /// Pointer to a string constant. `null` has this type.
    String,
    /// No value (result of calling a void function)
    Void,
    /// Pointer to a function with the given signature
    Function {
        params: Vec<MirType>,
        ret: Box<MirType>,
    },
    /// Type of the error sentinel produced when lowering fails
    Error,
}

impl MirType {
    pub const fn int() -> Self {
        Self::Int
    }

    pub const fn float() -> Self {
        Self::Float
    }

    pub const fn bool() -> Self {
        Self::Bool
    }

    pub const fn string() -> Self {
        Self::String
    }

    pub const fn void() -> Self {
        Self::Void
    }

    pub const fn error() -> Self {
        Self::Error
    }

    /// Creates a function-pointer type
    pub fn function(params: Vec<Self>, ret: Self) -> Self {
        Self::Function {
            params,
            ret: Box::new(ret),
        }
    }

    pub const fn is_integer(&self) -> bool {
        matches!(self, Self::Int)
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float)
    }

    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }

    /// Returns true for the numeric kinds, integer and float
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Returns the parameter and return types if this is a function-pointer type
    pub fn function_signature(&self) -> Option<(&[Self], &Self)> {
        match self {
            Self::Function { params, ret } => Some((params, ret)),
            _ => None,
        }
    }

    /// The value a function of this return type yields when its body falls
    /// off the end
    pub const fn zero_value(&self) -> Option<crate::Value> {
        match self {
            Self::Int => Some(crate::Value::integer(0)),
            Self::Float => Some(crate::Value::float(0.0)),
            Self::Bool => Some(crate::Value::boolean(false)),
            Self::String => Some(crate::Value::null()),
            Self::Void | Self::Function { .. } | Self::Error => None,
        }
    }
}

impl fmt::Display for MirType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Bool => write!(f, "bool"),
            Self::String => write!(f, "string"),
            Self::Void => write!(f, "void"),
            Self::Function { params, ret } => {
                write!(f, "fn(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") -> {ret}")
            }
            Self::Error => write!(f, "error"),
        }
    }
}
