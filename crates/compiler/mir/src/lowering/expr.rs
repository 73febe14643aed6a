//! # Expression Lowering
//!
//! This module contains the trait and implementations for lowering expressions
//! from the AST to MIR values. Every expression pushes exactly one value on the
//! builder's value stack; a parent pops the values of its children.

use mana_compiler_ast::{BinaryOp, Expression, Literal as AstLiteral, Spanned, UnaryOp};
use mana_compiler_diagnostics::{Diagnostic, DiagnosticCode, SourceLocation};

use crate::reconcile::{plan_binary, plan_unary, BinaryPlan, Promotion, UnaryPlan};
use crate::{CastKind, FunctionId, Literal, MirType, Value};

use super::builder::MirBuilder;

/// Trait for lowering expressions to MIR values
pub trait LowerExpr {
    /// Lowers `expr` and pushes its value
    fn lower_expression(&mut self, expr: &Spanned<Expression>);

    /// Lowers `expr` and pops its value right back
    fn lower_value(&mut self, expr: &Spanned<Expression>) -> Value;
}

impl LowerExpr for MirBuilder<'_> {
    fn lower_expression(&mut self, expr: &Spanned<Expression>) {
        let location = expr.location();
        let value = match expr.node() {
            Expression::Literal(literal) => self.lower_literal(literal),
            Expression::Unary { op, operand } => self.lower_unary_op(*op, operand, location),
            Expression::Binary { op, left, right } => {
                self.lower_binary_op(*op, left, right, location)
            }
            Expression::Grouping(inner) => self.lower_value(inner),
            Expression::Variable(name) => self.lower_variable(name, location),
            Expression::Assign { name, value } => self.lower_assignment(name, value, location),
            Expression::Call { callee, args } => self.lower_call(callee, args, location),
        };
        self.values.push(value);
    }

    fn lower_value(&mut self, expr: &Spanned<Expression>) -> Value {
        self.lower_expression(expr);
        self.values.pop()
    }
}

impl MirBuilder<'_> {
    fn lower_literal(&mut self, literal: &AstLiteral) -> Value {
        match literal {
            AstLiteral::Integer(value) => Value::integer(*value),
            AstLiteral::Float(value) => Value::float(*value),
            AstLiteral::Boolean(value) => Value::boolean(*value),
            AstLiteral::String(text) => Value::string(self.module.intern_string(text)),
            AstLiteral::Null => Value::null(),
        }
    }

    /// A local shadows a module function of the same name
    fn lower_variable(&mut self, name: &str, location: &SourceLocation) -> Value {
        if let Some(slot) = self.scopes.resolve(name) {
            let ty = self
                .function
                .get_slot(slot)
                .map_or(MirType::Error, |slot| slot.ty.clone());
            return Value::operand(self.instr().load(slot, ty, Some(name.to_string())));
        }

        if let Some(function_id) = self.module.lookup_function(name) {
            return Value::function(function_id);
        }

        self.report(Diagnostic::undeclared_variable(name, location.clone()));
        Value::Error
    }

    fn lower_assignment(
        &mut self,
        name: &str,
        value: &Spanned<Expression>,
        location: &SourceLocation,
    ) -> Value {
        let raw = self.lower_value(value);

        let Some(slot) = self.scopes.resolve(name) else {
            self.report(Diagnostic::undeclared_variable(name, location.clone()));
            return Value::Error;
        };
        let slot_type = self
            .function
            .get_slot(slot)
            .map_or(MirType::Error, |slot| slot.ty.clone());

        let stored = self.coerce_to(
            raw,
            &slot_type,
            DiagnosticCode::InvalidAssignment,
            location,
        );
        if !stored.is_error() {
            self.instr().store(slot, stored, Some(name.to_string()));
        }
        stored
    }

    fn lower_unary_op(
        &mut self,
        op: UnaryOp,
        operand: &Spanned<Expression>,
        location: &SourceLocation,
    ) -> Value {
        let value = self.lower_value(operand);
        let ty = self.type_of(&value);
        if ty.is_error() {
            return Value::Error;
        }

        match plan_unary(op, &ty) {
            Ok(UnaryPlan::Negate(unary)) => Value::operand(self.instr().unary(unary, value)),
            Ok(UnaryPlan::LogicalNot(plan)) => {
                let condition = self.truthy(value, plan);
                Value::operand(self.instr().unary(crate::UnaryOp::Not, condition))
            }
            Err(mismatch) => {
                self.report_mismatch(DiagnosticCode::TypeMismatch, &mismatch, location);
                Value::Error
            }
        }
    }

    /// Converts the operand `promote` names to float
    fn promote(&mut self, left: Value, right: Value, promote: Promotion) -> (Value, Value) {
        match promote {
            Promotion::None => (left, right),
            Promotion::Left => (
                Value::operand(self.instr().cast(CastKind::IntToFloat, left)),
                right,
            ),
            Promotion::Right => (
                left,
                Value::operand(self.instr().cast(CastKind::IntToFloat, right)),
            ),
        }
    }

    fn lower_binary_op(
        &mut self,
        op: BinaryOp,
        left: &Spanned<Expression>,
        right: &Spanned<Expression>,
        location: &SourceLocation,
    ) -> Value {
        match op {
            BinaryOp::And => return self.lower_short_circuit(true, left, right),
            BinaryOp::Or => return self.lower_short_circuit(false, left, right),
            _ => {}
        }

        let lhs = self.lower_value(left);
        let rhs = self.lower_value(right);
        let left_type = self.type_of(&lhs);
        let right_type = self.type_of(&rhs);
        if left_type.is_error() || right_type.is_error() {
            return Value::Error;
        }

        match plan_binary(op, &left_type, &right_type) {
            Ok(BinaryPlan::Arithmetic { op, promote }) => {
                let (lhs, rhs) = self.promote(lhs, rhs, promote);
                Value::operand(self.instr().binary(op, lhs, rhs))
            }
            Ok(BinaryPlan::Comparison {
                pred,
                kind,
                promote,
            }) => {
                let (lhs, rhs) = self.promote(lhs, rhs, promote);
                Value::operand(self.instr().compare(pred, kind, lhs, rhs))
            }
            Ok(BinaryPlan::ShortCircuit { .. }) => {
                log::error!("logical operator reached eager lowering");
                Value::Error
            }
            Err(mismatch) => {
                self.report_mismatch(DiagnosticCode::TypeMismatch, &mismatch, location);
                Value::Error
            }
        }
    }

    fn lower_call(
        &mut self,
        callee: &Spanned<Expression>,
        args: &[Spanned<Expression>],
        location: &SourceLocation,
    ) -> Value {
        // Direct call by name, unless a local of that name shadows the function
        if let Expression::Variable(name) = callee.node() {
            if self.scopes.resolve(name).is_none() {
                return match self.module.lookup_function(name) {
                    Some(function_id) => self.lower_direct_call(function_id, name, args, location),
                    None => {
                        self.report(Diagnostic::undeclared_function(name, location.clone()));
                        self.lower_discarded(args);
                        Value::Error
                    }
                };
            }
        }

        let callee_value = self.lower_value(callee);
        if let Value::Literal(Literal::Function(function_id)) = callee_value {
            let name = self
                .module
                .get_function(function_id)
                .map(|function| function.name.clone())
                .unwrap_or_default();
            return self.lower_direct_call(function_id, &name, args, location);
        }

        let callee_type = self.type_of(&callee_value);
        let Some((params, ret)) = callee_type.function_signature() else {
            if !callee_type.is_error() {
                self.report(Diagnostic::not_callable(location.clone()));
            }
            self.lower_discarded(args);
            return Value::Error;
        };
        let (params, ret) = (params.to_vec(), ret.clone());

        let Some(args) = self.lower_arguments("function value", &params, args, location) else {
            return Value::Error;
        };
        let comment = match callee.node() {
            Expression::Variable(name) => name.clone(),
            _ => "indirect".to_string(),
        };
        match self.instr().call_indirect(callee_value, args, ret, comment) {
            Some(dest) => Value::operand(dest),
            None => Value::unit(),
        }
    }

    fn lower_direct_call(
        &mut self,
        function_id: FunctionId,
        name: &str,
        args: &[Spanned<Expression>],
        location: &SourceLocation,
    ) -> Value {
        let Some((params, ret)) = self.module.get_function(function_id).map(|function| {
            (
                function
                    .parameters
                    .iter()
                    .map(|param| param.ty.clone())
                    .collect::<Vec<_>>(),
                function.return_type.clone(),
            )
        }) else {
            self.report(Diagnostic::undeclared_function(name, location.clone()));
            self.lower_discarded(args);
            return Value::Error;
        };

        let Some(args) = self.lower_arguments(name, &params, args, location) else {
            return Value::Error;
        };
        match self.instr().call(function_id, args, ret, name.to_string()) {
            Some(dest) => Value::operand(dest),
            None => Value::unit(),
        }
    }

    /// Lowers call arguments left to right and fits them to `params`
    ///
    /// Returns `None` after reporting when the argument count is wrong.
    fn lower_arguments(
        &mut self,
        name: &str,
        params: &[MirType],
        args: &[Spanned<Expression>],
        location: &SourceLocation,
    ) -> Option<Vec<Value>> {
        let values: Vec<Value> = args.iter().map(|arg| self.lower_value(arg)).collect();

        if values.len() != params.len() {
            self.report(
                Diagnostic::error(
                    DiagnosticCode::InvalidFunctionCall,
                    format!(
                        "Function '{name}' expects {} argument(s) but {} were given",
                        params.len(),
                        values.len()
                    ),
                )
                .with_location(location.clone()),
            );
            return None;
        }

        Some(
            values
                .into_iter()
                .zip(params)
                .zip(args)
                .map(|((value, param), arg)| {
                    self.coerce_to(value, param, DiagnosticCode::TypeMismatch, arg.location())
                })
                .collect(),
        )
    }

    /// Evaluates expressions only for the diagnostics they produce
    fn lower_discarded(&mut self, args: &[Spanned<Expression>]) {
        for arg in args {
            self.lower_value(arg);
        }
    }
}
