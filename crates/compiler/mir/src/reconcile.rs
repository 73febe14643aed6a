//! # Type Reconciliation
//!
//! Decides, for every operator, which typed instruction implements it and
//! which operand has to be converted first. Integers are promoted to floats
//! when the two sides of an operator disagree, never the reverse.

use mana_compiler_ast::BinaryOp as SourceBinaryOp;
use mana_compiler_ast::UnaryOp as SourceUnaryOp;
use thiserror::Error;

use crate::{BinaryOp, CastKind, ComparePredicate, MirType, NumericKind, UnaryOp};

/// Operator applied to operand types it does not support
///
/// The `Display` text is the user-facing diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeMismatch {
    #[error("Invalid operands for {0}")]
    InvalidOperands(&'static str),
    #[error("Modulo operator requires integer operands")]
    ModuloRequiresIntegers,
    #[error("Invalid operand type for negation")]
    InvalidNegation,
    #[error("Invalid operand type for logical not")]
    InvalidLogicalNot,
    #[error("Left operand of logical operator must be a boolean")]
    LogicalLeft,
    #[error("Right operand of logical operator must be a boolean")]
    LogicalRight,
    #[error("Condition must be a boolean or numeric value")]
    InvalidCondition,
    #[error("Cannot convert {found} to {expected}")]
    IncompatibleTypes { expected: MirType, found: MirType },
}

/// Which operand of a binary operator gets `sitofp` before the operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    None,
    Left,
    Right,
}

/// How a source binary operator is emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryPlan {
    Arithmetic {
        op: BinaryOp,
        promote: Promotion,
    },
    Comparison {
        pred: ComparePredicate,
        kind: NumericKind,
        promote: Promotion,
    },
    /// `&&` and `||` are control flow, see the lowering of logical operators
    ShortCircuit { is_and: bool },
}

/// How a source unary operator is emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryPlan {
    Negate(UnaryOp),
    LogicalNot(Truthiness),
}

/// How a value is turned into a bool for a branch or a logical operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truthiness {
    AlreadyBool,
    /// `icmp ne 0`
    IntNonZero,
    /// `fcmp one 0.0`
    FloatNonZero,
}

/// Conversion applied to a value before it is stored, passed or returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    Identity,
    Convert(CastKind),
}

/// The numeric kind both operands share after promotion
fn numeric_kind(left: &MirType, right: &MirType) -> Option<(NumericKind, Promotion)> {
    match (left, right) {
        (MirType::Int, MirType::Int) => Some((NumericKind::Int, Promotion::None)),
        (MirType::Float, MirType::Float) => Some((NumericKind::Float, Promotion::None)),
        (MirType::Int, MirType::Float) => Some((NumericKind::Float, Promotion::Left)),
        (MirType::Float, MirType::Int) => Some((NumericKind::Float, Promotion::Right)),
        _ => None,
    }
}

fn arithmetic(
    name: &'static str,
    int_op: BinaryOp,
    float_op: BinaryOp,
    left: &MirType,
    right: &MirType,
) -> Result<BinaryPlan, TypeMismatch> {
    match numeric_kind(left, right) {
        Some((NumericKind::Int, promote)) => Ok(BinaryPlan::Arithmetic {
            op: int_op,
            promote,
        }),
        Some((NumericKind::Float, promote)) => Ok(BinaryPlan::Arithmetic {
            op: float_op,
            promote,
        }),
        None => Err(TypeMismatch::InvalidOperands(name)),
    }
}

fn comparison(
    pred: ComparePredicate,
    left: &MirType,
    right: &MirType,
) -> Result<BinaryPlan, TypeMismatch> {
    if let Some((kind, promote)) = numeric_kind(left, right) {
        return Ok(BinaryPlan::Comparison {
            pred,
            kind,
            promote,
        });
    }

    let is_equality = matches!(pred, ComparePredicate::Eq | ComparePredicate::Ne);
    if is_equality && left.is_bool() && right.is_bool() {
        return Ok(BinaryPlan::Comparison {
            pred,
            kind: NumericKind::Int,
            promote: Promotion::None,
        });
    }

    Err(TypeMismatch::InvalidOperands("comparison"))
}

/// Selects the instruction for `left op right`
pub fn plan_binary(
    op: SourceBinaryOp,
    left: &MirType,
    right: &MirType,
) -> Result<BinaryPlan, TypeMismatch> {
    match op {
        SourceBinaryOp::Add => arithmetic("addition", BinaryOp::Add, BinaryOp::FAdd, left, right),
        SourceBinaryOp::Sub => {
            arithmetic("subtraction", BinaryOp::Sub, BinaryOp::FSub, left, right)
        }
        SourceBinaryOp::Mul => {
            arithmetic("multiplication", BinaryOp::Mul, BinaryOp::FMul, left, right)
        }
        SourceBinaryOp::Div => arithmetic("division", BinaryOp::Div, BinaryOp::FDiv, left, right),
        SourceBinaryOp::Mod => {
            if left.is_integer() && right.is_integer() {
                Ok(BinaryPlan::Arithmetic {
                    op: BinaryOp::Rem,
                    promote: Promotion::None,
                })
            } else {
                Err(TypeMismatch::ModuloRequiresIntegers)
            }
        }
        SourceBinaryOp::Eq => comparison(ComparePredicate::Eq, left, right),
        SourceBinaryOp::Neq => comparison(ComparePredicate::Ne, left, right),
        SourceBinaryOp::Less => comparison(ComparePredicate::Lt, left, right),
        SourceBinaryOp::LessEqual => comparison(ComparePredicate::Le, left, right),
        SourceBinaryOp::Greater => comparison(ComparePredicate::Gt, left, right),
        SourceBinaryOp::GreaterEqual => comparison(ComparePredicate::Ge, left, right),
        SourceBinaryOp::And => Ok(BinaryPlan::ShortCircuit { is_and: true }),
        SourceBinaryOp::Or => Ok(BinaryPlan::ShortCircuit { is_and: false }),
    }
}

/// Selects the instruction for `op operand`
pub fn plan_unary(op: SourceUnaryOp, operand: &MirType) -> Result<UnaryPlan, TypeMismatch> {
    match (op, operand) {
        (SourceUnaryOp::Neg, MirType::Int) => Ok(UnaryPlan::Negate(UnaryOp::Neg)),
        (SourceUnaryOp::Neg, MirType::Float) => Ok(UnaryPlan::Negate(UnaryOp::FNeg)),
        (SourceUnaryOp::Neg, _) => Err(TypeMismatch::InvalidNegation),
        (SourceUnaryOp::Not, MirType::Bool) => Ok(UnaryPlan::LogicalNot(Truthiness::AlreadyBool)),
        (SourceUnaryOp::Not, MirType::Int) => Ok(UnaryPlan::LogicalNot(Truthiness::IntNonZero)),
        (SourceUnaryOp::Not, _) => Err(TypeMismatch::InvalidLogicalNot),
    }
}

/// How a value of type `ty` is tested for truth, if it can be
pub const fn truthiness(ty: &MirType) -> Option<Truthiness> {
    match ty {
        MirType::Bool => Some(Truthiness::AlreadyBool),
        MirType::Int => Some(Truthiness::IntNonZero),
        MirType::Float => Some(Truthiness::FloatNonZero),
        _ => None,
    }
}

/// The conversion that makes a `found` value fit a `target` location
///
/// Promotes `int` to `float` and widens `bool` to `int`; anything narrowing
/// or unrelated is a mismatch. The error type fits everywhere.
pub fn reconcile_assignment(target: &MirType, found: &MirType) -> Result<Coercion, TypeMismatch> {
    if target == found || target.is_error() || found.is_error() {
        return Ok(Coercion::Identity);
    }
    match (target, found) {
        (MirType::Float, MirType::Int) => Ok(Coercion::Convert(CastKind::IntToFloat)),
        (MirType::Int, MirType::Bool) => Ok(Coercion::Convert(CastKind::BoolToInt)),
        _ => Err(TypeMismatch::IncompatibleTypes {
            expected: target.clone(),
            found: found.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ARITHMETIC: [SourceBinaryOp; 4] = [
        SourceBinaryOp::Add,
        SourceBinaryOp::Sub,
        SourceBinaryOp::Mul,
        SourceBinaryOp::Div,
    ];

    #[test]
    fn test_integer_arithmetic_stays_integer() {
        assert_eq!(
            plan_binary(SourceBinaryOp::Add, &MirType::Int, &MirType::Int),
            Ok(BinaryPlan::Arithmetic {
                op: BinaryOp::Add,
                promote: Promotion::None
            })
        );
        assert_eq!(
            plan_binary(SourceBinaryOp::Mod, &MirType::Int, &MirType::Int),
            Ok(BinaryPlan::Arithmetic {
                op: BinaryOp::Rem,
                promote: Promotion::None
            })
        );
    }

    #[test]
    fn test_float_modulo_is_rejected() {
        assert_eq!(
            plan_binary(SourceBinaryOp::Mod, &MirType::Float, &MirType::Int),
            Err(TypeMismatch::ModuloRequiresIntegers)
        );
    }

    #[test]
    fn test_error_messages() {
        let err = plan_binary(SourceBinaryOp::Sub, &MirType::String, &MirType::Int).unwrap_err();
        assert_eq!(err.to_string(), "Invalid operands for subtraction");
        let err = plan_binary(SourceBinaryOp::Less, &MirType::Bool, &MirType::Bool).unwrap_err();
        assert_eq!(err.to_string(), "Invalid operands for comparison");
        let err = plan_unary(SourceUnaryOp::Not, &MirType::Float).unwrap_err();
        assert_eq!(err.to_string(), "Invalid operand type for logical not");
    }

    #[test]
    fn test_bool_equality_is_allowed() {
        assert_eq!(
            plan_binary(SourceBinaryOp::Neq, &MirType::Bool, &MirType::Bool),
            Ok(BinaryPlan::Comparison {
                pred: ComparePredicate::Ne,
                kind: NumericKind::Int,
                promote: Promotion::None
            })
        );
    }

    #[test]
    fn test_unary_plans() {
        assert_eq!(
            plan_unary(SourceUnaryOp::Neg, &MirType::Float),
            Ok(UnaryPlan::Negate(UnaryOp::FNeg))
        );
        assert_eq!(
            plan_unary(SourceUnaryOp::Not, &MirType::Int),
            Ok(UnaryPlan::LogicalNot(Truthiness::IntNonZero))
        );
        assert_eq!(
            plan_unary(SourceUnaryOp::Neg, &MirType::Bool),
            Err(TypeMismatch::InvalidNegation)
        );
    }

    #[test]
    fn test_assignment_coercions() {
        assert_eq!(
            reconcile_assignment(&MirType::Float, &MirType::Int),
            Ok(Coercion::Convert(CastKind::IntToFloat))
        );
        assert_eq!(
            reconcile_assignment(&MirType::Int, &MirType::Bool),
            Ok(Coercion::Convert(CastKind::BoolToInt))
        );
        assert_eq!(
            reconcile_assignment(&MirType::Int, &MirType::Error),
            Ok(Coercion::Identity)
        );
        assert_eq!(
            reconcile_assignment(&MirType::Int, &MirType::Float),
            Err(TypeMismatch::IncompatibleTypes {
                expected: MirType::Int,
                found: MirType::Float
            })
        );
    }

    proptest! {
        #[test]
        fn mixed_operands_promote_the_integer_side(op_index in 0usize..4, int_on_left in any::<bool>()) {
            let op = ARITHMETIC[op_index];
            let (left, right) = if int_on_left {
                (MirType::Int, MirType::Float)
            } else {
                (MirType::Float, MirType::Int)
            };

            let plan = plan_binary(op, &left, &right).unwrap();
            let BinaryPlan::Arithmetic { op: emitted, promote } = plan else {
                panic!("expected arithmetic plan, got {plan:?}");
            };
            prop_assert_eq!(emitted.result_type(), MirType::Float);
            prop_assert_eq!(promote, if int_on_left { Promotion::Left } else { Promotion::Right });
        }

        #[test]
        fn comparisons_always_produce_a_numeric_kind(op_index in 0usize..6, left_float in any::<bool>(), right_float in any::<bool>()) {
            let ops = [
                SourceBinaryOp::Eq,
                SourceBinaryOp::Neq,
                SourceBinaryOp::Less,
                SourceBinaryOp::LessEqual,
                SourceBinaryOp::Greater,
                SourceBinaryOp::GreaterEqual,
            ];
            let ty = |float: bool| if float { MirType::Float } else { MirType::Int };
            let plan = plan_binary(ops[op_index], &ty(left_float), &ty(right_float)).unwrap();
            let BinaryPlan::Comparison { kind, .. } = plan else {
                panic!("expected comparison plan, got {plan:?}");
            };
            let expected = if left_float || right_float { NumericKind::Float } else { NumericKind::Int };
            prop_assert_eq!(kind, expected);
        }
    }
}
