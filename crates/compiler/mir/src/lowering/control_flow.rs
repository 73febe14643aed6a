//! # Control Flow Helpers
//!
//! Lowering of the constructs that split the current block in the middle of
//! an expression: conditions and short-circuiting logical operators.

use mana_compiler_ast::{Expression, Spanned};

use crate::reconcile::TypeMismatch;
use crate::{MirType, Value};

use super::builder::MirBuilder;
use super::expr::LowerExpr;

impl MirBuilder<'_> {
    /// Lowers an `if`/`while` condition to a bool
    pub(super) fn lower_condition(&mut self, condition: &Spanned<Expression>) -> Value {
        let value = self.lower_value(condition);
        self.coerce_to_bool(value, TypeMismatch::InvalidCondition, condition.location())
    }

    /// Lowers `left && right` (`is_and`) or `left || right`
    ///
    /// ```text
    /// current:
    ///     %l = <left>
    ///     if %l then jump and_rhs else jump and_merge     (|| swaps the arms)
    /// and_rhs:
    ///     %r = <right>
    ///     jump and_merge
    /// and_merge:
    ///     %v = phi bool [current: false], [and_rhs: %r]   (|| uses true)
    /// ```
    ///
    /// The right operand is only ever emitted into the `rhs` block.
    pub(super) fn lower_short_circuit(
        &mut self,
        is_and: bool,
        left: &Spanned<Expression>,
        right: &Spanned<Expression>,
    ) -> Value {
        let lhs = self.lower_value(left);
        let lhs = self.coerce_to_bool(lhs, TypeMismatch::LogicalLeft, left.location());
        let left_block = self.current_block_id();

        let (rhs_block, merge_block) = self.cfg().create_short_circuit_blocks(is_and);
        if is_and {
            self.terminate_with_branch(lhs, rhs_block, merge_block);
        } else {
            self.terminate_with_branch(lhs, merge_block, rhs_block);
        }

        self.switch_to_block(rhs_block);
        let rhs = self.lower_value(right);
        let rhs = self.coerce_to_bool(rhs, TypeMismatch::LogicalRight, right.location());
        // The right operand may itself have split the block
        let right_block = self.current_block_id();
        self.terminate_with_jump(merge_block);

        self.switch_to_block(merge_block);
        let result = self.instr().phi(
            MirType::bool(),
            vec![
                (left_block, Value::boolean(!is_and)),
                (right_block, rhs),
            ],
        );
        Value::operand(result)
    }
}
