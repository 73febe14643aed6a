//! # MirBuilder
//!
//! This module contains the main builder struct for constructing MIR functions
//! from the AST. The MirBuilder maintains state during the lowering process and
//! provides core infrastructure for instruction generation.

use mana_compiler_diagnostics::{
    Diagnostic, DiagnosticCode, DiagnosticCollection, SourceLocation,
};

use crate::reconcile::{reconcile_assignment, truthiness, Coercion, Truthiness, TypeMismatch};
use crate::{
    BasicBlockId, CfgBuilder, CfgState, ComparePredicate, InstrBuilder, Literal,
    LoweringConfig, MirFunction, MirModule, MirType, NumericKind, ScopeChain, Terminator, Value,
    ValueStack,
};

/// A builder that constructs one `MirFunction` from a list of statements
///
/// The module and the diagnostics sink are borrowed for the duration of the
/// function; the function itself is owned by the builder and handed back by
/// [`MirBuilder::finish`].
pub struct MirBuilder<'m> {
    pub(super) module: &'m mut MirModule,
    pub(super) diagnostics: &'m mut DiagnosticCollection,
    pub(super) config: &'m LoweringConfig,

    // State for the function currently being built
    pub(super) function: MirFunction,
    pub(super) state: CfgState,
    pub(super) scopes: ScopeChain,
    pub(super) values: ValueStack,
    /// False while lowering the synthesized entry point
    pub(super) in_function: bool,
}

impl<'m> MirBuilder<'m> {
    pub fn new(
        module: &'m mut MirModule,
        diagnostics: &'m mut DiagnosticCollection,
        config: &'m LoweringConfig,
        function: MirFunction,
        in_function: bool,
    ) -> Self {
        let state = CfgState {
            current_block_id: function.entry_block,
            is_terminated: false,
        };
        Self {
            module,
            diagnostics,
            config,
            function,
            state,
            scopes: ScopeChain::new(),
            values: ValueStack::new(),
            in_function,
        }
    }

    /// Hands back the function built so far
    pub fn finish(self) -> MirFunction {
        self.function
    }

    // --- Block Builder ---

    pub(super) fn cfg(&mut self) -> CfgBuilder<'_> {
        CfgBuilder::resume(&mut self.function, self.state)
    }

    pub(super) fn instr(&mut self) -> InstrBuilder<'_> {
        InstrBuilder::new(&mut self.function, self.state.current_block_id)
    }

    pub(super) const fn current_block_id(&self) -> BasicBlockId {
        self.state.current_block_id
    }

    pub(super) fn is_current_block_terminated(&self) -> bool {
        self.state.is_terminated
            || self
                .function
                .get_basic_block(self.state.current_block_id)
                .is_some_and(|block| block.is_terminated())
    }

    pub(super) fn switch_to_block(&mut self, block_id: BasicBlockId) {
        self.state = self.cfg().switch_to_block(block_id);
    }

    /// Closes the current block with a jump to `target` and continues there
    pub(super) fn jump_to(&mut self, target: BasicBlockId) {
        let mut cfg = self.cfg();
        cfg.jump_to(target);
        self.state = cfg.state();
    }

    pub(super) fn terminate(&mut self, terminator: Terminator) {
        let mut cfg = self.cfg();
        cfg.terminate(terminator);
        self.state = cfg.state();
    }

    pub(super) fn terminate_with_jump(&mut self, target: BasicBlockId) {
        self.terminate(Terminator::jump(target));
    }

    pub(super) fn terminate_with_branch(
        &mut self,
        condition: Value,
        then_block: BasicBlockId,
        else_block: BasicBlockId,
    ) {
        self.terminate(Terminator::branch(condition, then_block, else_block));
    }

    pub(super) fn terminate_with_return(&mut self, value: Value) {
        self.terminate(Terminator::return_value(value));
    }

    /// Whether any edge leads into `block_id`
    pub(super) fn has_predecessors(&self, block_id: BasicBlockId) -> bool {
        self.function
            .get_basic_block(block_id)
            .is_some_and(|block| !block.preds.is_empty())
    }

    // --- Diagnostics ---

    pub(super) fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.add(diagnostic);
    }

    pub(super) fn report_mismatch(
        &mut self,
        code: DiagnosticCode,
        mismatch: &TypeMismatch,
        location: &SourceLocation,
    ) {
        self.report(
            Diagnostic::error(code, mismatch.to_string()).with_location(location.clone()),
        );
    }

    // --- Types ---

    /// The type of a value in the function being built
    pub(super) fn type_of(&self, value: &Value) -> MirType {
        match value {
            Value::Literal(Literal::Function(id)) => self
                .module
                .get_function(*id)
                .map_or(MirType::Error, MirFunction::signature),
            Value::Literal(literal) => literal.known_type().unwrap_or(MirType::Error),
            Value::Operand(id) => self
                .function
                .get_value_type(*id)
                .cloned()
                .unwrap_or(MirType::Error),
            Value::Error => MirType::Error,
        }
    }

    /// Converts `value` so it can be stored into a location of type `target`
    ///
    /// Reports a mismatch with `code` and yields the sentinel when no
    /// conversion exists.
    pub(super) fn coerce_to(
        &mut self,
        value: Value,
        target: &MirType,
        code: DiagnosticCode,
        location: &SourceLocation,
    ) -> Value {
        let found = self.type_of(&value);
        match reconcile_assignment(target, &found) {
            Ok(Coercion::Identity) => value,
            Ok(Coercion::Convert(kind)) => Value::operand(self.instr().cast(kind, value)),
            Err(mismatch) => {
                self.report_mismatch(code, &mismatch, location);
                Value::Error
            }
        }
    }

    /// Turns a value into a bool the way `plan` says
    pub(super) fn truthy(&mut self, value: Value, plan: Truthiness) -> Value {
        match plan {
            Truthiness::AlreadyBool => value,
            Truthiness::IntNonZero => Value::operand(self.instr().compare(
                ComparePredicate::Ne,
                NumericKind::Int,
                value,
                Value::integer(0),
            )),
            Truthiness::FloatNonZero => Value::operand(self.instr().compare(
                ComparePredicate::Ne,
                NumericKind::Float,
                value,
                Value::float(0.0),
            )),
        }
    }

    /// Coerces a value used as a branch condition to bool
    ///
    /// `mismatch` is the error reported when the value has no truth value.
    pub(super) fn coerce_to_bool(
        &mut self,
        value: Value,
        mismatch: TypeMismatch,
        location: &SourceLocation,
    ) -> Value {
        let ty = self.type_of(&value);
        if ty.is_error() {
            return Value::Error;
        }
        match truthiness(&ty) {
            Some(plan) => self.truthy(value, plan),
            None => {
                self.report_mismatch(DiagnosticCode::TypeMismatch, &mismatch, location);
                Value::Error
            }
        }
    }
}
