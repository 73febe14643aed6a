//! # Control Flow Graph Builder
//!
//! This module provides specialized operations for constructing and manipulating
//! the control flow graph of MIR functions. It centralizes block creation,
//! termination, and navigation logic.

use crate::{BasicBlock, BasicBlockId, MirFunction, Terminator, Value};

/// Result of CFG operations that modify state
///
/// This allows the CfgBuilder to return state changes without holding borrows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfgState {
    pub current_block_id: BasicBlockId,
    pub is_terminated: bool,
}

/// A builder for control flow graph operations
///
/// The CfgBuilder manages basic block creation, termination, and navigation
/// within a MIR function. Blocks are created detached from the function's
/// layout and are attached the first time they become the insertion point,
/// so a block that is never switched to never appears in the output.
pub struct CfgBuilder<'f> {
    function: &'f mut MirFunction,
    current_block_id: BasicBlockId,
    is_terminated: bool,
}

impl<'f> CfgBuilder<'f> {
    /// Creates a new CFG builder for the given function
    ///
    /// ## Arguments
    /// * `function` - The MIR function to build the CFG for
    /// * `current_block_id` - The initially active block
    pub const fn new(function: &'f mut MirFunction, current_block_id: BasicBlockId) -> Self {
        Self {
            function,
            current_block_id,
            is_terminated: false,
        }
    }

    /// Re-creates a builder from a previously returned state
    pub const fn resume(function: &'f mut MirFunction, state: CfgState) -> Self {
        Self {
            function,
            current_block_id: state.current_block_id,
            is_terminated: state.is_terminated,
        }
    }

    /// Creates a new, detached basic block with an optional name
    ///
    /// ## Returns
    /// The ID of the newly created block
    pub fn new_block(&mut self, name: Option<String>) -> BasicBlockId {
        let block_name =
            name.unwrap_or_else(|| format!("block_{}", self.function.basic_blocks.len()));
        self.function.add_basic_block_with_name(block_name)
    }

    /// Returns the current CFG state
    ///
    /// This is useful for updating external state after CFG operations
    pub fn state(&self) -> CfgState {
        CfgState {
            current_block_id: self.current_block_id,
            is_terminated: self.is_terminated(),
        }
    }

    /// Switches the insertion point to the specified block, attaching it
    ///
    /// ## Returns
    /// The new CFG state after switching
    pub fn switch_to_block(&mut self, block_id: BasicBlockId) -> CfgState {
        self.function.attach_block(block_id);
        self.current_block_id = block_id;
        self.is_terminated = false;
        self.state()
    }

    /// Returns the current block ID
    pub const fn current_block_id(&self) -> BasicBlockId {
        self.current_block_id
    }

    /// Returns a reference to the current block
    pub fn current_block(&self) -> Option<&BasicBlock> {
        self.function.basic_blocks.get(self.current_block_id)
    }

    /// Checks if the current block is terminated
    pub fn is_terminated(&self) -> bool {
        self.is_terminated
            || self
                .current_block()
                .is_some_and(BasicBlock::is_terminated)
    }

    /// Terminates the current block with the given terminator
    ///
    /// A block keeps its first terminator: terminating it again is logged
    /// and ignored.
    ///
    /// ## Returns
    /// Whether the terminator was installed
    pub fn terminate(&mut self, terminator: Terminator) -> bool {
        if self.is_terminated() {
            log::warn!(
                "ignoring second terminator for block{} of '{}'",
                self.current_block_id.index(),
                self.function.name
            );
            return false;
        }

        self.function
            .set_terminator(self.current_block_id, terminator);
        self.is_terminated = true;
        true
    }

    /// Terminates the current block with a jump to the target block
    pub fn terminate_with_jump(&mut self, target: BasicBlockId) -> bool {
        self.terminate(Terminator::jump(target))
    }

    /// Terminates the current block with a conditional branch
    ///
    /// ## Arguments
    /// * `condition` - The boolean value to test
    /// * `then_target` - The block to jump to if condition is true
    /// * `else_target` - The block to jump to if condition is false
    pub fn terminate_with_branch(
        &mut self,
        condition: Value,
        then_target: BasicBlockId,
        else_target: BasicBlockId,
    ) -> bool {
        self.terminate(Terminator::branch(condition, then_target, else_target))
    }

    /// Terminates the current block with a return
    pub fn terminate_with_return(&mut self, value: Option<Value>) -> bool {
        match value {
            Some(value) => self.terminate(Terminator::return_value(value)),
            None => self.terminate(Terminator::return_void()),
        }
    }

    /// Terminates the current block with a jump and switches to the target
    ///
    /// This is a common pattern in control flow construction.
    pub fn jump_to(&mut self, target: BasicBlockId) {
        if !self.is_terminated() {
            self.terminate_with_jump(target);
        }
        self.switch_to_block(target);
    }

    /// Creates blocks for an if-then-else pattern
    ///
    /// ## Returns
    /// A tuple of (then_block_id, else_block_id, merge_block_id)
    pub fn create_if_blocks(&mut self) -> (BasicBlockId, BasicBlockId, BasicBlockId) {
        let then_block = self.new_block(Some("then".to_string()));
        let else_block = self.new_block(Some("else".to_string()));
        let merge_block = self.new_block(Some("merge".to_string()));
        (then_block, else_block, merge_block)
    }

    /// Creates blocks for a loop pattern
    ///
    /// ## Returns
    /// A tuple of (header_block_id, body_block_id, exit_block_id)
    pub fn create_loop_blocks(&mut self) -> (BasicBlockId, BasicBlockId, BasicBlockId) {
        let header = self.new_block(Some("loop_header".to_string()));
        let body = self.new_block(Some("loop_body".to_string()));
        let exit = self.new_block(Some("loop_exit".to_string()));
        (header, body, exit)
    }

    /// Creates blocks for a short-circuiting `&&` or `||`
    ///
    /// ## Returns
    /// A tuple of (right_operand_block_id, merge_block_id)
    pub fn create_short_circuit_blocks(&mut self, is_and: bool) -> (BasicBlockId, BasicBlockId) {
        let prefix = if is_and { "and" } else { "or" };
        let right = self.new_block(Some(format!("{prefix}_rhs")));
        let merge = self.new_block(Some(format!("{prefix}_merge")));
        (right, merge)
    }
}
