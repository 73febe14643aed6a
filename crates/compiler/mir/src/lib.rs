//! # Mana Intermediate Representation (MIR) and lowering engine
//!
//! This crate turns a Mana syntax tree into a block-structured, typed
//! program representation ready for interpretation or machine-code emission.
//!
//! ## Design Principles
//!
//! The design is inspired by LLVM IR:
//!
//! 1. **Control Flow Graph (CFG)**: Functions are directed graphs of basic blocks
//! 2. **Three-Address Code**: Instructions are simple, atomic operations
//! 3. **Single assignment for temporaries**: every `ValueId` is defined once;
//!    mutable source variables live in storage slots accessed by `load`/`store`
//! 4. **Explicit Control Flow**: All control flow is explicit through terminators,
//!    and short-circuit operators are lowered into branches joined by a `phi`
//!
//! ## Architecture
//!
//! ```text
//! MirModule
//! functions: IndexVec<FunctionId, Option<MirFunction>>
//! strings: IndexVec<StringId, String>
//!
//! MirFunction
//! basic_blocks: IndexVec<BasicBlockId, BasicBlock>   (arena)
//! layout: Vec<BasicBlockId>                          (attached blocks, in order)
//! slots: IndexVec<SlotId, Slot>
//!
//! BasicBlock
//! instructions: Vec<Instruction>
//! terminator: Terminator
//! ```
//!
//! ## Error Handling
//!
//! Lowering never aborts on malformed input. Problems are pushed into the
//! `DiagnosticCollection` passed by the caller, the offending expression
//! yields [`Value::Error`], and lowering carries on so that one run can
//! surface many errors. A function that fails structural verification is
//! removed from the module.

#![allow(clippy::option_if_let_else)]

pub use basic_block::BasicBlock;
pub use builder::{CfgBuilder, CfgState, InstrBuilder};
pub use config::LoweringConfig;
pub use function::{FunctionKind, MirFunction, Parameter, Slot, VerificationError};
pub use instruction::{
    BinaryOp, CastKind, ComparePredicate, Instruction, InstructionKind, NumericKind, UnaryOp,
};
pub use lowering::{finalize_function, lower_program, verify_module};
pub use mir_types::MirType;
pub use module::{MirModule, ModuleError};
pub use reconcile::TypeMismatch;
pub use scope::ScopeChain;
pub use terminator::Terminator;
pub use value::{Literal, Value};
pub use value_stack::ValueStack;

pub mod basic_block;
pub mod builder;
pub mod config;
pub mod function;
pub mod instruction;
pub mod lowering;
pub mod mir_types;
pub mod module;
pub mod reconcile;
pub mod scope;
pub mod terminator;
pub mod value;
pub mod value_stack;

#[cfg(test)]
mod testing;


// --- Core Identifiers ---

index_vec::define_index_type! {
    /// Unique identifier for a function within a MIR module
    pub struct FunctionId = usize;
}

index_vec::define_index_type! {
    /// Unique identifier for a basic block within a function
    pub struct BasicBlockId = usize;
}

index_vec::define_index_type! {
    /// Unique identifier for a value (virtual register) within a function
    pub struct ValueId = usize;
}

index_vec::define_index_type! {
    /// Unique identifier for a storage slot within a function
    pub struct SlotId = usize;
}

index_vec::define_index_type! {
    /// Unique identifier for a hoisted string constant within a module
    pub struct StringId = usize;
}

// --- Pretty Printing Support ---

/// Trait for pretty-printing MIR constructs
pub trait PrettyPrint {
    fn pretty_print(&self, indent: usize) -> String;
}

/// Helper function to create indentation
pub(crate) fn indent_str(level: usize) -> String {
    "  ".repeat(level)
}

impl PrettyPrint for BasicBlockId {
    fn pretty_print(&self, _indent: usize) -> String {
        format!("block{}", self.index())
    }
}

impl PrettyPrint for ValueId {
    fn pretty_print(&self, _indent: usize) -> String {
        format!("%{}", self.index())
    }
}

impl PrettyPrint for SlotId {
    fn pretty_print(&self, _indent: usize) -> String {
        format!("${}", self.index())
    }
}

impl PrettyPrint for StringId {
    fn pretty_print(&self, _indent: usize) -> String {
        format!("@str{}", self.index())
    }
}

impl PrettyPrint for FunctionId {
    fn pretty_print(&self, _indent: usize) -> String {
        format!("@fn{}", self.index())
    }
}
