//! # MIR Instructions
//!
//! This module defines the instruction types for MIR. Instructions perform
//! computations and side effects but do not transfer control flow.

use itertools::Itertools;

use crate::{BasicBlockId, FunctionId, MirType, PrettyPrint, SlotId, Value, ValueId};

/// Operand family an operator works on
///
/// Integer comparisons also cover booleans, which are 1-bit integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    Int,
    Float,
}

/// Arithmetic operators, already specialized to their operand family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    FAdd,
    FSub,
    FMul,
    FDiv,
}

impl BinaryOp {
    /// The type produced by this operator
    pub const fn result_type(self) -> MirType {
        match self {
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Rem => MirType::Int,
            Self::FAdd | Self::FSub | Self::FMul | Self::FDiv => MirType::Float,
        }
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "sdiv",
            Self::Rem => "srem",
            Self::FAdd => "fadd",
            Self::FSub => "fsub",
            Self::FMul => "fmul",
            Self::FDiv => "fdiv",
        }
    }
}

/// Comparison predicates. Integer forms are signed, float forms are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparePredicate {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparePredicate {
    pub const fn mnemonic(self, kind: NumericKind) -> &'static str {
        match (kind, self) {
            (NumericKind::Int, Self::Eq) => "icmp eq",
            (NumericKind::Int, Self::Ne) => "icmp ne",
            (NumericKind::Int, Self::Lt) => "icmp slt",
            (NumericKind::Int, Self::Le) => "icmp sle",
            (NumericKind::Int, Self::Gt) => "icmp sgt",
            (NumericKind::Int, Self::Ge) => "icmp sge",
            (NumericKind::Float, Self::Eq) => "fcmp oeq",
            (NumericKind::Float, Self::Ne) => "fcmp one",
            (NumericKind::Float, Self::Lt) => "fcmp olt",
            (NumericKind::Float, Self::Le) => "fcmp ole",
            (NumericKind::Float, Self::Gt) => "fcmp ogt",
            (NumericKind::Float, Self::Ge) => "fcmp oge",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Integer negation
    Neg,
    /// Float negation
    FNeg,
    /// Boolean not
    Not,
}

impl UnaryOp {
    pub const fn result_type(self) -> MirType {
        match self {
            Self::Neg => MirType::Int,
            Self::FNeg => MirType::Float,
            Self::Not => MirType::Bool,
        }
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Neg => "neg",
            Self::FNeg => "fneg",
            Self::Not => "not",
        }
    }
}

/// Value conversions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastKind {
    /// Signed integer to float promotion
    IntToFloat,
    /// Boolean to integer widening (zero extension)
    BoolToInt,
}

impl CastKind {
    pub const fn result_type(self) -> MirType {
        match self {
            Self::IntToFloat => MirType::Float,
            Self::BoolToInt => MirType::Int,
        }
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::IntToFloat => "sitofp",
            Self::BoolToInt => "zext",
        }
    }
}

/// A single MIR instruction
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// The kind of instruction and its operands
    pub kind: InstructionKind,

    /// Optional comment for debugging
    pub comment: Option<String>,
}

/// The different kinds of MIR instructions
#[derive(Debug, Clone, PartialEq)]
pub enum InstructionKind {
    /// Reserve a storage slot: `$slot = alloca ty`
    /// Only ever found at the start of the entry block.
    Alloca { slot: SlotId, ty: MirType },

    /// Read a slot: `%dest = load $slot`
    Load { dest: ValueId, slot: SlotId },

    /// Write a slot: `store $slot, value`
    Store { slot: SlotId, value: Value },

    /// Arithmetic: `%dest = op left, right`
    Binary {
        op: BinaryOp,
        dest: ValueId,
        left: Value,
        right: Value,
    },

    /// Comparison producing a bool: `%dest = icmp pred left, right`
    Compare {
        pred: ComparePredicate,
        kind: NumericKind,
        dest: ValueId,
        left: Value,
        right: Value,
    },

    /// Unary operation: `%dest = op source`
    Unary {
        op: UnaryOp,
        dest: ValueId,
        source: Value,
    },

    /// Conversion: `%dest = sitofp source`
    Cast {
        kind: CastKind,
        dest: ValueId,
        source: Value,
    },

    /// Direct call of a module function. `dest` is `None` for void callees.
    Call {
        dest: Option<ValueId>,
        callee: FunctionId,
        args: Vec<Value>,
    },

    /// Call through a function-pointer value
    CallIndirect {
        dest: Option<ValueId>,
        callee: Value,
        args: Vec<Value>,
    },

    /// Merge node: selects the value flowing in from the predecessor that
    /// control came from. There is exactly one source per predecessor.
    Phi {
        dest: ValueId,
        ty: MirType,
        sources: Vec<(BasicBlockId, Value)>,
    },
}

impl Instruction {
    const fn of(kind: InstructionKind) -> Self {
        Self {
            kind,
            comment: None,
        }
    }

    pub const fn alloca(slot: SlotId, ty: MirType) -> Self {
        Self::of(InstructionKind::Alloca { slot, ty })
    }

    pub const fn load(dest: ValueId, slot: SlotId) -> Self {
        Self::of(InstructionKind::Load { dest, slot })
    }

    pub const fn store(slot: SlotId, value: Value) -> Self {
        Self::of(InstructionKind::Store { slot, value })
    }

    pub const fn binary(op: BinaryOp, dest: ValueId, left: Value, right: Value) -> Self {
        Self::of(InstructionKind::Binary {
            op,
            dest,
            left,
            right,
        })
    }

    pub const fn compare(
        pred: ComparePredicate,
        kind: NumericKind,
        dest: ValueId,
        left: Value,
        right: Value,
    ) -> Self {
        Self::of(InstructionKind::Compare {
            pred,
            kind,
            dest,
            left,
            right,
        })
    }

    pub const fn unary(op: UnaryOp, dest: ValueId, source: Value) -> Self {
        Self::of(InstructionKind::Unary { op, dest, source })
    }

    pub const fn cast(kind: CastKind, dest: ValueId, source: Value) -> Self {
        Self::of(InstructionKind::Cast { kind, dest, source })
    }

    pub const fn call(dest: Option<ValueId>, callee: FunctionId, args: Vec<Value>) -> Self {
        Self::of(InstructionKind::Call { dest, callee, args })
    }

    pub const fn call_indirect(dest: Option<ValueId>, callee: Value, args: Vec<Value>) -> Self {
        Self::of(InstructionKind::CallIndirect { dest, callee, args })
    }

    pub const fn phi(dest: ValueId, ty: MirType, sources: Vec<(BasicBlockId, Value)>) -> Self {
        Self::of(InstructionKind::Phi { dest, ty, sources })
    }

    /// Sets a comment for this instruction
    pub fn with_comment(mut self, comment: String) -> Self {
        self.comment = Some(comment);
        self
    }

    /// Returns the value defined by this instruction, if any
    pub const fn destination(&self) -> Option<ValueId> {
        match &self.kind {
            InstructionKind::Load { dest, .. }
            | InstructionKind::Binary { dest, .. }
            | InstructionKind::Compare { dest, .. }
            | InstructionKind::Unary { dest, .. }
            | InstructionKind::Cast { dest, .. }
            | InstructionKind::Phi { dest, .. } => Some(*dest),
            InstructionKind::Call { dest, .. } | InstructionKind::CallIndirect { dest, .. } => {
                *dest
            }
            InstructionKind::Alloca { .. } | InstructionKind::Store { .. } => None,
        }
    }

    /// Returns every value operand read by this instruction
    pub fn operands(&self) -> Vec<&Value> {
        match &self.kind {
            InstructionKind::Alloca { .. } | InstructionKind::Load { .. } => vec![],
            InstructionKind::Store { value, .. } => vec![value],
            InstructionKind::Binary { left, right, .. }
            | InstructionKind::Compare { left, right, .. } => vec![left, right],
            InstructionKind::Unary { source, .. } | InstructionKind::Cast { source, .. } => {
                vec![source]
            }
            InstructionKind::Call { args, .. } => args.iter().collect(),
            InstructionKind::CallIndirect { callee, args, .. } => {
                std::iter::once(callee).chain(args.iter()).collect()
            }
            InstructionKind::Phi { sources, .. } => sources.iter().map(|(_, v)| v).collect(),
        }
    }

    /// Returns the ValueIds read by this instruction
    pub fn used_values(&self) -> Vec<ValueId> {
        self.operands()
            .into_iter()
            .filter_map(Value::as_operand)
            .collect()
    }

    /// Returns the slot this instruction touches, if any
    pub const fn slot(&self) -> Option<SlotId> {
        match &self.kind {
            InstructionKind::Alloca { slot, .. }
            | InstructionKind::Load { slot, .. }
            | InstructionKind::Store { slot, .. } => Some(*slot),
            _ => None,
        }
    }

    pub const fn is_phi(&self) -> bool {
        matches!(self.kind, InstructionKind::Phi { .. })
    }

    pub const fn is_alloca(&self) -> bool {
        matches!(self.kind, InstructionKind::Alloca { .. })
    }
}

fn print_args(args: &[Value]) -> String {
    args.iter().map(|arg| arg.pretty_print(0)).join(", ")
}

fn print_call(dest: &Option<ValueId>, callee: String, args: &[Value]) -> String {
    match dest {
        Some(dest) => format!(
            "{} = call {callee}({})",
            dest.pretty_print(0),
            print_args(args)
        ),
        None => format!("call {callee}({})", print_args(args)),
    }
}

impl PrettyPrint for Instruction {
    fn pretty_print(&self, _indent: usize) -> String {
        let mut result = match &self.kind {
            InstructionKind::Alloca { slot, ty } => {
                format!("{} = alloca {ty}", slot.pretty_print(0))
            }

            InstructionKind::Load { dest, slot } => {
                format!("{} = load {}", dest.pretty_print(0), slot.pretty_print(0))
            }

            InstructionKind::Store { slot, value } => {
                format!("store {}, {}", slot.pretty_print(0), value.pretty_print(0))
            }

            InstructionKind::Binary {
                op,
                dest,
                left,
                right,
            } => format!(
                "{} = {} {}, {}",
                dest.pretty_print(0),
                op.mnemonic(),
                left.pretty_print(0),
                right.pretty_print(0)
            ),

            InstructionKind::Compare {
                pred,
                kind,
                dest,
                left,
                right,
            } => format!(
                "{} = {} {}, {}",
                dest.pretty_print(0),
                pred.mnemonic(*kind),
                left.pretty_print(0),
                right.pretty_print(0)
            ),

            InstructionKind::Unary { op, dest, source } => format!(
                "{} = {} {}",
                dest.pretty_print(0),
                op.mnemonic(),
                source.pretty_print(0)
            ),

            InstructionKind::Cast { kind, dest, source } => format!(
                "{} = {} {}",
                dest.pretty_print(0),
                kind.mnemonic(),
                source.pretty_print(0)
            ),

            InstructionKind::Call { dest, callee, args } => {
                print_call(dest, callee.pretty_print(0), args)
            }

            InstructionKind::CallIndirect { dest, callee, args } => {
                print_call(dest, callee.pretty_print(0), args)
            }

            InstructionKind::Phi { dest, ty, sources } => {
                let sources = sources
                    .iter()
                    .map(|(block, value)| {
                        format!("[{}: {}]", block.pretty_print(0), value.pretty_print(0))
                    })
                    .join(", ");
                format!("{} = phi {ty} {sources}", dest.pretty_print(0))
            }
        };

        if let Some(comment) = &self.comment {
            result.push_str(&format!("  // {comment}"));
        }

        result
    }
}

#[cfg(test)]
#[path = "instruction_tests.rs"]
mod tests;
