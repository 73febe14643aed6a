//! # MIR Terminators
//!
//! This module defines terminators, which end basic blocks and transfer control flow.
//! Every basic block must end with exactly one terminator.

use crate::{BasicBlockId, PrettyPrint, Value, ValueId};

/// A terminator ends a basic block and transfers control
///
/// # Design Notes
///
/// - Each terminator specifies its target blocks explicitly
/// - Conditional branches specify both targets (taken/not taken)
/// - Return terminators end function execution
/// - `Unreachable` is the placeholder of a block that has not been
///   terminated yet; a finished function never contains one
#[derive(Debug, Clone, PartialEq)]
pub enum Terminator {
    /// Unconditional jump: `jump target`
    Jump { target: BasicBlockId },

    /// Conditional branch: `if condition then jump then_target else jump else_target`
    If {
        condition: Value,
        then_target: BasicBlockId,
        else_target: BasicBlockId,
    },

    /// Function return: `return value?`
    Return { value: Option<Value> },

    /// Placeholder for a block under construction
    Unreachable,
}

impl Terminator {
    /// Creates a new jump terminator
    pub const fn jump(target: BasicBlockId) -> Self {
        Self::Jump { target }
    }

    /// Creates a new conditional branch terminator
    pub const fn branch(
        condition: Value,
        then_target: BasicBlockId,
        else_target: BasicBlockId,
    ) -> Self {
        Self::If {
            condition,
            then_target,
            else_target,
        }
    }

    /// Creates a new return terminator with a value
    pub const fn return_value(value: Value) -> Self {
        Self::Return { value: Some(value) }
    }

    /// Creates a new void return terminator
    pub const fn return_void() -> Self {
        Self::Return { value: None }
    }

    /// Creates an unreachable terminator
    pub const fn unreachable() -> Self {
        Self::Unreachable
    }

    /// Returns all basic block targets of this terminator
    ///
    /// A conditional branch with both arms on the same block reports it once.
    pub fn target_blocks(&self) -> Vec<BasicBlockId> {
        match self {
            Self::Jump { target } => vec![*target],
            Self::If {
                then_target,
                else_target,
                ..
            } => {
                if then_target == else_target {
                    vec![*then_target]
                } else {
                    vec![*then_target, *else_target]
                }
            }
            Self::Return { .. } | Self::Unreachable => vec![],
        }
    }

    /// Returns the value operands read by this terminator
    pub fn operands(&self) -> Vec<&Value> {
        match self {
            Self::If { condition, .. } => vec![condition],
            Self::Return { value: Some(value) } => vec![value],
            Self::Jump { .. } | Self::Return { value: None } | Self::Unreachable => vec![],
        }
    }

    /// Returns all values used by this terminator
    pub fn used_values(&self) -> Vec<ValueId> {
        self.operands()
            .into_iter()
            .filter_map(Value::as_operand)
            .collect()
    }

    /// Returns true if this is a real terminator and not the placeholder
    pub const fn is_terminator(&self) -> bool {
        !matches!(self, Self::Unreachable)
    }

    /// Returns true if this terminator ends the function
    pub const fn is_return(&self) -> bool {
        matches!(self, Self::Return { .. })
    }

    /// Returns true if this is a conditional branch
    pub const fn is_conditional(&self) -> bool {
        matches!(self, Self::If { .. })
    }
}

impl PrettyPrint for Terminator {
    fn pretty_print(&self, _indent: usize) -> String {
        match self {
            Self::Jump { target } => format!("jump {}", target.pretty_print(0)),

            Self::If {
                condition,
                then_target,
                else_target,
            } => format!(
                "if {} then jump {} else jump {}",
                condition.pretty_print(0),
                then_target.pretty_print(0),
                else_target.pretty_print(0)
            ),

            Self::Return { value: Some(value) } => format!("return {}", value.pretty_print(0)),

            Self::Return { value: None } => "return".to_string(),

            Self::Unreachable => "unreachable".to_string(),
        }
    }
}
