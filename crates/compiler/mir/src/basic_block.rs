//! # MIR Basic Block
//!
//! This module defines basic blocks, the fundamental building blocks of the CFG.
//! A basic block is a straight-line sequence of instructions with exactly one entry
//! point and one exit point.

use crate::{indent_str, BasicBlockId, Instruction, PrettyPrint, Terminator, ValueId};

/// A basic block in the Control Flow Graph
///
/// # Invariants
///
/// - Every attached basic block ends with exactly one terminator
/// - Phi instructions come before any other instruction
/// - `preds` lists each predecessor block once
#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    /// Optional name for debugging (e.g. "then", "loop_header")
    pub name: Option<String>,

    /// The sequence of instructions in this block
    pub instructions: Vec<Instruction>,

    /// The terminator that ends this block and transfers control
    pub terminator: Terminator,

    /// Blocks whose terminator targets this block
    pub preds: Vec<BasicBlockId>,
}

impl BasicBlock {
    /// Creates a new empty basic block with an unreachable terminator
    ///
    /// The unreachable terminator serves as a placeholder until the real
    /// terminator is set during MIR construction.
    pub const fn new() -> Self {
        Self {
            name: None,
            instructions: Vec::new(),
            terminator: Terminator::Unreachable,
            preds: Vec::new(),
        }
    }

    /// Creates a new empty basic block with a name
    pub const fn with_name(name: String) -> Self {
        Self {
            name: Some(name),
            instructions: Vec::new(),
            terminator: Terminator::Unreachable,
            preds: Vec::new(),
        }
    }

    /// Adds an instruction to the end of this block
    pub fn push_instruction(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Adds a phi instruction after any phis already at the start of the block
    pub fn push_phi(&mut self, instruction: Instruction) {
        let position = self.phi_count();
        self.instructions.insert(position, instruction);
    }

    /// Sets the terminator for this block
    ///
    /// This does not maintain predecessor lists; use
    /// [`crate::MirFunction::set_terminator`] for that.
    pub fn set_terminator(&mut self, terminator: Terminator) {
        self.terminator = terminator;
    }

    /// Returns true if this block has a real terminator
    pub const fn is_terminated(&self) -> bool {
        self.terminator.is_terminator()
    }

    /// Records `pred` as a predecessor
    pub fn add_pred(&mut self, pred: BasicBlockId) {
        if !self.preds.contains(&pred) {
            self.preds.push(pred);
        }
    }

    /// Forgets `pred` as a predecessor
    pub fn remove_pred(&mut self, pred: BasicBlockId) {
        self.preds.retain(|&p| p != pred);
    }

    /// Number of phi instructions at the start of the block
    pub fn phi_count(&self) -> usize {
        self.instructions
            .iter()
            .take_while(|instruction| instruction.is_phi())
            .count()
    }

    /// Returns the number of instructions in this block
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if this block is empty (no instructions)
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Returns an iterator over the instructions in this block
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    /// Returns the terminator of this block
    pub const fn terminator(&self) -> &Terminator {
        &self.terminator
    }

    /// Returns all values used by this basic block
    pub fn used_values(&self) -> Vec<ValueId> {
        self.instructions
            .iter()
            .flat_map(Instruction::used_values)
            .chain(self.terminator.used_values())
            .collect()
    }

    /// Returns all values defined by this basic block
    pub fn defined_values(&self) -> Vec<ValueId> {
        self.instructions
            .iter()
            .filter_map(Instruction::destination)
            .collect()
    }
}

impl Default for BasicBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl PrettyPrint for BasicBlock {
    fn pretty_print(&self, indent: usize) -> String {
        let mut result = String::new();
        let base_indent = indent_str(indent);

        for instruction in &self.instructions {
            result.push_str(&format!("{}{}\n", base_indent, instruction.pretty_print(0)));
        }

        result.push_str(&format!(
            "{}{}\n",
            base_indent,
            self.terminator.pretty_print(0)
        ));

        result
    }
}
