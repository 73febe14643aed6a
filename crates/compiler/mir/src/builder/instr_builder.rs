//! # Instruction Builder
//!
//! This module provides a fluent API for creating MIR instructions.
//! It centralizes destination allocation so that every emitted value gets a
//! fresh, typed `ValueId`.

use crate::{
    BasicBlockId, BinaryOp, CastKind, ComparePredicate, FunctionId, Instruction, MirFunction,
    MirType, NumericKind, SlotId, UnaryOp, Value, ValueId,
};

/// A builder for creating MIR instructions with a fluent API
///
/// The InstrBuilder appends to one block of one function and hands back the
/// destination of each value-producing instruction.
pub struct InstrBuilder<'f> {
    function: &'f mut MirFunction,
    current_block: BasicBlockId,
}

impl<'f> InstrBuilder<'f> {
    /// Creates a new instruction builder for the given function and current block
    pub const fn new(function: &'f mut MirFunction, current_block: BasicBlockId) -> Self {
        Self {
            function,
            current_block,
        }
    }

    /// Add an instruction to the current block
    pub fn add_instruction(&mut self, instruction: Instruction) {
        if let Some(block) = self.function.basic_blocks.get_mut(self.current_block) {
            block.push_instruction(instruction);
        }
    }

    /// Load the current contents of a slot
    pub fn load(&mut self, slot: SlotId, ty: MirType, comment: Option<String>) -> ValueId {
        let dest = self.function.new_typed_value_id(ty);
        let mut instr = Instruction::load(dest, slot);
        instr.comment = comment;
        self.add_instruction(instr);
        dest
    }

    /// Store a value into a slot
    pub fn store(&mut self, slot: SlotId, value: Value, comment: Option<String>) -> &mut Self {
        let mut instr = Instruction::store(slot, value);
        instr.comment = comment;
        self.add_instruction(instr);
        self
    }

    /// Create and add a binary operation with automatic destination
    pub fn binary(&mut self, op: BinaryOp, lhs: Value, rhs: Value) -> ValueId {
        let dest = self.function.new_typed_value_id(op.result_type());
        self.add_instruction(Instruction::binary(op, dest, lhs, rhs));
        dest
    }

    /// Create and add a comparison producing a bool
    pub fn compare(
        &mut self,
        pred: ComparePredicate,
        kind: NumericKind,
        lhs: Value,
        rhs: Value,
    ) -> ValueId {
        let dest = self.function.new_typed_value_id(MirType::bool());
        self.add_instruction(Instruction::compare(pred, kind, dest, lhs, rhs));
        dest
    }

    /// Create and add a unary operation with automatic destination
    pub fn unary(&mut self, op: UnaryOp, operand: Value) -> ValueId {
        let dest = self.function.new_typed_value_id(op.result_type());
        self.add_instruction(Instruction::unary(op, dest, operand));
        dest
    }

    /// Create and add a conversion with automatic destination
    pub fn cast(&mut self, kind: CastKind, operand: Value) -> ValueId {
        let dest = self.function.new_typed_value_id(kind.result_type());
        self.add_instruction(Instruction::cast(kind, dest, operand));
        dest
    }

    /// Create and add a direct call
    ///
    /// ## Returns
    /// The destination ValueId, or `None` when the callee returns void
    pub fn call(
        &mut self,
        callee: FunctionId,
        args: Vec<Value>,
        return_type: MirType,
        comment: String,
    ) -> Option<ValueId> {
        let dest = (return_type != MirType::Void)
            .then(|| self.function.new_typed_value_id(return_type));
        self.add_instruction(Instruction::call(dest, callee, args).with_comment(comment));
        dest
    }

    /// Create and add a call through a function-pointer value
    pub fn call_indirect(
        &mut self,
        callee: Value,
        args: Vec<Value>,
        return_type: MirType,
        comment: String,
    ) -> Option<ValueId> {
        let dest = (return_type != MirType::Void)
            .then(|| self.function.new_typed_value_id(return_type));
        self.add_instruction(Instruction::call_indirect(dest, callee, args).with_comment(comment));
        dest
    }

    /// Create a phi after the phis already leading the current block
    pub fn phi(&mut self, ty: MirType, sources: Vec<(BasicBlockId, Value)>) -> ValueId {
        let dest = self.function.new_typed_value_id(ty.clone());
        if let Some(block) = self.function.basic_blocks.get_mut(self.current_block) {
            block.push_phi(Instruction::phi(dest, ty, sources));
        }
        dest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InstructionKind;

    #[test]
    fn test_destinations_are_typed() {
        let mut function = MirFunction::new("f".to_string(), MirType::int());
        let entry = function.entry_block;
        let slot = function.allocate_slot("x".to_string(), MirType::int());

        let mut instrs = InstrBuilder::new(&mut function, entry);
        let loaded = instrs.load(slot, MirType::int(), None);
        let promoted = instrs.cast(CastKind::IntToFloat, Value::operand(loaded));
        let sum = instrs.binary(BinaryOp::FAdd, Value::operand(promoted), Value::float(0.5));
        let cmp = instrs.compare(
            ComparePredicate::Gt,
            NumericKind::Float,
            Value::operand(sum),
            Value::float(1.0),
        );

        assert_eq!(function.get_value_type(loaded), Some(&MirType::int()));
        assert_eq!(function.get_value_type(promoted), Some(&MirType::float()));
        assert_eq!(function.get_value_type(sum), Some(&MirType::float()));
        assert_eq!(function.get_value_type(cmp), Some(&MirType::bool()));
        // alloca + four instructions
        assert_eq!(function.get_basic_block(entry).unwrap().instructions.len(), 5);
    }

    #[test]
    fn test_void_call_has_no_destination() {
        let mut function = MirFunction::new("f".to_string(), MirType::int());
        let entry = function.entry_block;
        let mut instrs = InstrBuilder::new(&mut function, entry);

        let dest = instrs.call(
            FunctionId::from_raw(0),
            vec![Value::null()],
            MirType::void(),
            "print".to_string(),
        );
        assert_eq!(dest, None);
        assert!(matches!(
            function.get_basic_block(entry).unwrap().instructions[0].kind,
            InstructionKind::Call { dest: None, .. }
        ));
    }

    #[test]
    fn test_phis_lead_the_block() {
        let mut function = MirFunction::new("f".to_string(), MirType::int());
        let entry = function.entry_block;
        let mut instrs = InstrBuilder::new(&mut function, entry);
        instrs.unary(UnaryOp::Neg, Value::integer(1));
        instrs.phi(MirType::bool(), vec![]);

        let block = function.get_basic_block(entry).unwrap();
        assert!(block.instructions[0].is_phi());
        assert_eq!(block.phi_count(), 1);
    }
}
