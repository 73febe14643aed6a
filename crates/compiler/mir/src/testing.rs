//! # Testing Utilities for MIR
//!
//! Helpers shared by the unit tests of this crate.

use mana_compiler_ast::{Program, Spanned, Statement};
use mana_compiler_diagnostics::DiagnosticCollection;

use crate::{lower_program, InstructionKind, LoweringConfig, MirFunction, MirModule, SlotId};

/// Lowers `statements` with the default configuration
pub fn lower(statements: Vec<Spanned<Statement>>) -> (MirModule, DiagnosticCollection) {
    lower_with(&LoweringConfig::default(), statements)
}

pub fn lower_with(
    config: &LoweringConfig,
    statements: Vec<Spanned<Statement>>,
) -> (MirModule, DiagnosticCollection) {
    let mut diagnostics = DiagnosticCollection::new();
    let module = lower_program(&Program::new(statements), config, &mut diagnostics);
    (module, diagnostics)
}

/// The synthesized entry point of a module lowered with the default config
pub fn entry(module: &MirModule) -> &MirFunction {
    module
        .function_by_name("main")
        .expect("entry point should exist")
}

/// The slot declared for the variable `name`, if exactly one was
pub fn slot_named(function: &MirFunction, name: &str) -> Option<SlotId> {
    let mut slots = function
        .slots
        .iter_enumerated()
        .filter(|(_, slot)| slot.name == name)
        .map(|(id, _)| id);
    let slot = slots.next()?;
    slots.next().is_none().then_some(slot)
}

/// All slots stored to by the instructions of `block_name` blocks
pub fn stores_in(function: &MirFunction, block_name: &str) -> Vec<SlotId> {
    function
        .blocks_named(block_name)
        .filter_map(|id| function.get_basic_block(id))
        .flat_map(|block| block.instructions.iter())
        .filter_map(|instruction| match &instruction.kind {
            InstructionKind::Store { slot, .. } => Some(*slot),
            _ => None,
        })
        .collect()
}
