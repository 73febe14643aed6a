//! # MIR Function
//!
//! This module defines the function-level MIR representation, including
//! the Control Flow Graph (CFG) of basic blocks and the function's storage slots.

use index_vec::IndexVec;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::{
    indent_str, BasicBlock, BasicBlockId, Instruction, InstructionKind, MirType, PrettyPrint,
    SlotId, Terminator, Value, ValueId,
};

/// Whether a function has a body in this module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// Lowered from source
    Defined,
    /// Declared only, provided by the runtime (e.g. `print`)
    External,
}

/// A function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: MirType,
    /// The incoming argument value
    pub value: Option<ValueId>,
    /// The slot the argument is stored into on entry
    pub slot: Option<SlotId>,
}

/// A unit of mutable storage for one declared variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// Source name of the variable, for dumps
    pub name: String,
    pub ty: MirType,
}

/// Structural problems found by [`MirFunction::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("entry block block{} does not exist", .0.index())]
    MissingEntryBlock(BasicBlockId),
    #[error("entry block is not the first block of the layout")]
    EntryNotFirst,
    #[error("entry block has predecessors {preds:?}")]
    EntryHasPredecessors { preds: Vec<usize> },
    #[error("block{} has no terminator", .block.index())]
    UnterminatedBlock { block: BasicBlockId },
    #[error("block{} targets non-existent block{}", .block.index(), .target.index())]
    DanglingTarget {
        block: BasicBlockId,
        target: BasicBlockId,
    },
    #[error("block{} targets block{} which is not part of the function", .block.index(), .target.index())]
    DetachedTarget {
        block: BasicBlockId,
        target: BasicBlockId,
    },
    #[error("block{} records predecessors {recorded:?} but is targeted by {actual:?}", .block.index())]
    PredecessorMismatch {
        block: BasicBlockId,
        recorded: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("block{}: phi at position {position} follows a non-phi instruction", .block.index())]
    PhiNotAtStart { block: BasicBlockId, position: usize },
    #[error("block{}: phi has {sources} incoming values for {preds} predecessors", .block.index())]
    PhiSourceCount {
        block: BasicBlockId,
        sources: usize,
        preds: usize,
    },
    #[error("block{}: phi has an incoming value from block{} which is not a predecessor", .block.index(), .source_block.index())]
    PhiSourceNotPredecessor {
        block: BasicBlockId,
        source_block: BasicBlockId,
    },
    #[error("slot ${} is allocated {count} times", .slot.index())]
    SlotAllocation { slot: SlotId, count: usize },
    #[error("slot ${} is allocated in block{} instead of the entry block", .slot.index(), .block.index())]
    AllocaOutsideEntry { slot: SlotId, block: BasicBlockId },
    #[error("block{} refers to unknown slot ${}", .block.index(), .slot.index())]
    UnknownSlot { block: BasicBlockId, slot: SlotId },
    #[error("store of a {found} value into slot ${} of type {expected}", .slot.index())]
    StoreTypeMismatch {
        slot: SlotId,
        expected: MirType,
        found: MirType,
    },
    #[error("block{} refers to undefined value %{}", .block.index(), .value.index())]
    UnknownValue { block: BasicBlockId, value: ValueId },
    #[error("value %{} is defined more than once", .value.index())]
    ValueRedefined { value: ValueId },
    #[error("block{} returns {found} from a function returning {expected}", .block.index())]
    ReturnTypeMismatch {
        block: BasicBlockId,
        expected: MirType,
        found: String,
    },
}

/// The MIR for a single function, laid out as a Control Flow Graph (CFG)
///
/// # Design Notes
///
/// - Basic blocks live in an arena (`basic_blocks`) and are referred to by
///   stable ids. A block becomes part of the function, and shows up in
///   dumps and verification, once it is attached to `layout`.
/// - Each defined function has exactly one entry block, first in `layout`
/// - Every slot is allocated by an `alloca` at the start of the entry block
#[derive(Debug, Clone, PartialEq)]
pub struct MirFunction {
    /// The name of the function (for debugging and linking)
    pub name: String,

    pub kind: FunctionKind,

    /// Parameters in signature order
    pub parameters: Vec<Parameter>,

    pub return_type: MirType,

    /// All basic blocks created for this function, attached or not
    pub basic_blocks: IndexVec<BasicBlockId, BasicBlock>,

    /// The blocks that are part of the function, in emission order
    pub layout: Vec<BasicBlockId>,

    /// The entry point of the function
    pub entry_block: BasicBlockId,

    /// Storage slots, one per declared variable or parameter
    pub slots: IndexVec<SlotId, Slot>,

    /// Type information for each value in the function
    pub value_types: IndexVec<ValueId, MirType>,
}

impl MirFunction {
    /// Creates a new function with an empty, attached entry block
    pub fn new(name: String, return_type: MirType) -> Self {
        let mut basic_blocks = IndexVec::new();
        let entry_block = basic_blocks.push(BasicBlock::with_name("entry".to_string()));

        Self {
            name,
            kind: FunctionKind::Defined,
            parameters: Vec::new(),
            return_type,
            basic_blocks,
            layout: vec![entry_block],
            entry_block,
            slots: IndexVec::new(),
            value_types: IndexVec::new(),
        }
    }

    /// Creates a body-less declaration of a runtime-provided function
    pub fn external(name: String, params: Vec<(String, MirType)>, return_type: MirType) -> Self {
        Self {
            name,
            kind: FunctionKind::External,
            parameters: params
                .into_iter()
                .map(|(name, ty)| Parameter {
                    name,
                    ty,
                    value: None,
                    slot: None,
                })
                .collect(),
            return_type,
            basic_blocks: IndexVec::new(),
            layout: Vec::new(),
            entry_block: BasicBlockId::from_raw(0),
            slots: IndexVec::new(),
            value_types: IndexVec::new(),
        }
    }

    pub fn is_external(&self) -> bool {
        self.kind == FunctionKind::External
    }

    /// The function-pointer type of this function
    pub fn signature(&self) -> MirType {
        MirType::function(
            self.parameters.iter().map(|p| p.ty.clone()).collect(),
            self.return_type.clone(),
        )
    }

    /// Adds a new, detached basic block with a name and returns its ID
    pub fn add_basic_block_with_name(&mut self, name: String) -> BasicBlockId {
        self.basic_blocks.push(BasicBlock::with_name(name))
    }

    /// Makes `block_id` part of the function's block list
    pub fn attach_block(&mut self, block_id: BasicBlockId) {
        if !self.layout.contains(&block_id) {
            self.layout.push(block_id);
        }
    }

    pub fn is_attached(&self, block_id: BasicBlockId) -> bool {
        self.layout.contains(&block_id)
    }

    /// Gets a basic block by ID
    pub fn get_basic_block(&self, id: BasicBlockId) -> Option<&BasicBlock> {
        self.basic_blocks.get(id)
    }

    /// Gets a mutable reference to a basic block by ID
    pub fn get_basic_block_mut(&mut self, id: BasicBlockId) -> Option<&mut BasicBlock> {
        self.basic_blocks.get_mut(id)
    }

    /// Generates a new unique value ID with type information
    pub fn new_typed_value_id(&mut self, mir_type: MirType) -> ValueId {
        self.value_types.push(mir_type)
    }

    /// Gets the type of a value ID
    pub fn get_value_type(&self, value_id: ValueId) -> Option<&MirType> {
        self.value_types.get(value_id)
    }

    /// Gets the type of a value, if it can be known without the module
    pub fn value_type(&self, value: &Value) -> Option<MirType> {
        match value {
            Value::Operand(id) => self.get_value_type(*id).cloned(),
            Value::Literal(lit) => lit.known_type(),
            Value::Error => Some(MirType::Error),
        }
    }

    /// Allocates a fresh slot in the function's entry region
    ///
    /// The `alloca` is placed after the allocas already at the start of the
    /// entry block, whatever block the caller is currently building.
    pub fn allocate_slot(&mut self, name: String, ty: MirType) -> SlotId {
        let slot = self.slots.push(Slot {
            name: name.clone(),
            ty: ty.clone(),
        });
        if let Some(entry) = self.basic_blocks.get_mut(self.entry_block) {
            let position = entry
                .instructions
                .iter()
                .take_while(|instruction| instruction.is_alloca())
                .count();
            entry
                .instructions
                .insert(position, Instruction::alloca(slot, ty).with_comment(name));
        }
        slot
    }

    /// Gets a slot by ID
    pub fn get_slot(&self, slot: SlotId) -> Option<&Slot> {
        self.slots.get(slot)
    }

    /// Records the CFG edge `pred -> succ` in the successor's predecessor list
    pub fn connect(&mut self, pred: BasicBlockId, succ: BasicBlockId) {
        if let Some(block) = self.basic_blocks.get_mut(succ) {
            block.add_pred(pred);
        }
    }

    /// Removes the CFG edge `pred -> succ`
    pub fn disconnect(&mut self, pred: BasicBlockId, succ: BasicBlockId) {
        if let Some(block) = self.basic_blocks.get_mut(succ) {
            block.remove_pred(pred);
        }
    }

    /// Set terminator while properly maintaining CFG edges
    pub fn set_terminator(&mut self, block_id: BasicBlockId, terminator: Terminator) {
        let old_targets = match self.basic_blocks.get(block_id) {
            Some(block) => block.terminator.target_blocks(),
            None => return,
        };

        for target in old_targets {
            self.disconnect(block_id, target);
        }

        let new_targets = terminator.target_blocks();
        if let Some(block) = self.basic_blocks.get_mut(block_id) {
            block.set_terminator(terminator);
        }

        for target in new_targets {
            self.connect(block_id, target);
        }
    }

    /// Iterates over the attached blocks in layout order
    pub fn blocks(&self) -> impl Iterator<Item = (BasicBlockId, &BasicBlock)> {
        self.layout
            .iter()
            .filter_map(|&id| self.basic_blocks.get(id).map(|block| (id, block)))
    }

    /// Number of attached blocks
    pub fn block_count(&self) -> usize {
        self.layout.len()
    }

    /// The attached blocks with the given debug name
    pub fn blocks_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = BasicBlockId> + 'a {
        self.blocks()
            .filter(move |(_, block)| block.name.as_deref() == Some(name))
            .map(|(id, _)| id)
    }

    /// Iterates over every instruction of the attached blocks
    pub fn instructions(&self) -> impl Iterator<Item = (BasicBlockId, &Instruction)> {
        self.blocks()
            .flat_map(|(id, block)| block.instructions.iter().map(move |instr| (id, instr)))
    }

    /// Checks if a basic block is reachable from the entry block
    pub fn is_block_reachable(&self, target: BasicBlockId) -> bool {
        let mut visited = FxHashSet::default();
        let mut stack = vec![self.entry_block];

        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }

            if visited.insert(current) {
                if let Some(block) = self.get_basic_block(current) {
                    stack.extend(block.terminator.target_blocks());
                }
            }
        }

        false
    }

    /// Returns all attached blocks that cannot be reached from the entry
    pub fn unreachable_blocks(&self) -> Vec<BasicBlockId> {
        self.blocks()
            .map(|(id, _)| id)
            .filter(|&id| !self.is_block_reachable(id))
            .collect()
    }

    /// Validates the function structure
    ///
    /// Checks:
    /// - The entry block exists, comes first and has no predecessors
    /// - Every attached block is terminated and only targets attached blocks
    /// - Recorded predecessor lists agree with the terminators
    /// - Phis lead their block and have one incoming value per predecessor
    /// - Every slot has exactly one `alloca`, in the entry block
    /// - Stores and returns agree with slot and return types
    /// - Every value is defined once before being referenced by id
    pub fn validate(&self) -> Result<(), VerificationError> {
        if self.is_external() {
            return Ok(());
        }

        let entry = self
            .basic_blocks
            .get(self.entry_block)
            .ok_or(VerificationError::MissingEntryBlock(self.entry_block))?;
        if self.layout.first() != Some(&self.entry_block) {
            return Err(VerificationError::EntryNotFirst);
        }
        if !entry.preds.is_empty() {
            return Err(VerificationError::EntryHasPredecessors {
                preds: entry.preds.iter().map(|p| p.index()).collect(),
            });
        }

        let attached: FxHashSet<BasicBlockId> = self.layout.iter().copied().collect();
        let mut actual_preds: FxHashMap<BasicBlockId, Vec<BasicBlockId>> = FxHashMap::default();

        for (block_id, block) in self.blocks() {
            if !block.is_terminated() {
                return Err(VerificationError::UnterminatedBlock { block: block_id });
            }

            for target in block.terminator.target_blocks() {
                if self.basic_blocks.get(target).is_none() {
                    return Err(VerificationError::DanglingTarget {
                        block: block_id,
                        target,
                    });
                }
                if !attached.contains(&target) {
                    return Err(VerificationError::DetachedTarget {
                        block: block_id,
                        target,
                    });
                }
                actual_preds.entry(target).or_default().push(block_id);
            }
        }

        for (block_id, block) in self.blocks() {
            let mut actual: Vec<usize> = actual_preds
                .get(&block_id)
                .map(|preds| preds.iter().map(|p| p.index()).collect())
                .unwrap_or_default();
            actual.sort_unstable();
            let mut recorded: Vec<usize> = block.preds.iter().map(|p| p.index()).collect();
            recorded.sort_unstable();
            if recorded != actual {
                return Err(VerificationError::PredecessorMismatch {
                    block: block_id,
                    recorded,
                    actual,
                });
            }

            self.validate_phis(block_id, block)?;
        }

        self.validate_slots_and_values()?;
        self.validate_returns()
    }

    fn validate_phis(
        &self,
        block_id: BasicBlockId,
        block: &BasicBlock,
    ) -> Result<(), VerificationError> {
        let phi_count = block.phi_count();
        for (position, instruction) in block.instructions.iter().enumerate() {
            let InstructionKind::Phi { sources, .. } = &instruction.kind else {
                continue;
            };
            if position >= phi_count {
                return Err(VerificationError::PhiNotAtStart {
                    block: block_id,
                    position,
                });
            }
            if sources.len() != block.preds.len() {
                return Err(VerificationError::PhiSourceCount {
                    block: block_id,
                    sources: sources.len(),
                    preds: block.preds.len(),
                });
            }
            for (source_block, _) in sources {
                if !block.preds.contains(source_block) {
                    return Err(VerificationError::PhiSourceNotPredecessor {
                        block: block_id,
                        source_block: *source_block,
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_slots_and_values(&self) -> Result<(), VerificationError> {
        let mut alloca_counts: IndexVec<SlotId, usize> = IndexVec::from_vec(vec![0; self.slots.len()]);
        let mut defined: FxHashSet<ValueId> =
            self.parameters.iter().filter_map(|p| p.value).collect();

        for (block_id, instruction) in self.instructions() {
            if let Some(slot) = instruction.slot() {
                let Some(slot_info) = self.slots.get(slot) else {
                    return Err(VerificationError::UnknownSlot {
                        block: block_id,
                        slot,
                    });
                };

                match &instruction.kind {
                    InstructionKind::Alloca { .. } => {
                        if block_id != self.entry_block {
                            return Err(VerificationError::AllocaOutsideEntry {
                                slot,
                                block: block_id,
                            });
                        }
                        alloca_counts[slot] += 1;
                    }
                    InstructionKind::Store { value, .. } => {
                        if let Some(found) = self.value_type(value) {
                            if !found.is_error() && found != slot_info.ty {
                                return Err(VerificationError::StoreTypeMismatch {
                                    slot,
                                    expected: slot_info.ty.clone(),
                                    found,
                                });
                            }
                        }
                    }
                    _ => {}
                }
            }

            for value in instruction.used_values() {
                if self.value_types.get(value).is_none() {
                    return Err(VerificationError::UnknownValue {
                        block: block_id,
                        value,
                    });
                }
            }

            if let Some(dest) = instruction.destination() {
                if self.value_types.get(dest).is_none() {
                    return Err(VerificationError::UnknownValue {
                        block: block_id,
                        value: dest,
                    });
                }
                if !defined.insert(dest) {
                    return Err(VerificationError::ValueRedefined { value: dest });
                }
            }
        }

        for (block_id, block) in self.blocks() {
            for value in block.terminator.used_values() {
                if self.value_types.get(value).is_none() {
                    return Err(VerificationError::UnknownValue {
                        block: block_id,
                        value,
                    });
                }
            }
        }

        for (slot, count) in alloca_counts.iter_enumerated() {
            if *count != 1 {
                return Err(VerificationError::SlotAllocation {
                    slot,
                    count: *count,
                });
            }
        }

        Ok(())
    }

    fn validate_returns(&self) -> Result<(), VerificationError> {
        for (block_id, block) in self.blocks() {
            let Terminator::Return { value } = &block.terminator else {
                continue;
            };
            let found = match value {
                None => Some(MirType::Void),
                Some(value) => self.value_type(value),
            };
            let Some(found) = found else {
                // Function pointers are typed by the module, not checked here
                continue;
            };
            if !found.is_error() && found != self.return_type {
                return Err(VerificationError::ReturnTypeMismatch {
                    block: block_id,
                    expected: self.return_type.clone(),
                    found: found.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl PrettyPrint for MirFunction {
    fn pretty_print(&self, indent: usize) -> String {
        let mut result = String::new();
        let base_indent = indent_str(indent);

        let params = self
            .parameters
            .iter()
            .map(|p| match p.value {
                Some(value) => format!("{}: {} = {}", p.name, p.ty, value.pretty_print(0)),
                None => format!("{}: {}", p.name, p.ty),
            })
            .collect::<Vec<_>>()
            .join(", ");

        if self.is_external() {
            result.push_str(&format!(
                "{}extern fn {}({}) -> {}\n",
                base_indent, self.name, params, self.return_type
            ));
            return result;
        }

        result.push_str(&format!(
            "{}fn {}({}) -> {} {{\n",
            base_indent, self.name, params, self.return_type
        ));

        for (block_id, block) in self.blocks() {
            let block_display = match &block.name {
                Some(name) => format!("{} ({name})", block_id.pretty_print(0)),
                None => block_id.pretty_print(0),
            };
            result.push_str(&format!("{base_indent}  {block_display}:\n"));
            result.push_str(&block.pretty_print(indent + 2));
        }

        result.push_str(&format!("{base_indent}}}\n"));
        result
    }
}

#[cfg(test)]
#[path = "function_tests.rs"]
mod tests;
