//! # Statement Lowering
//!
//! This module contains the trait and implementations for lowering statements
//! from the AST to MIR instructions.

use mana_compiler_ast::{Expression, FunctionDef, Spanned, Statement};
use mana_compiler_diagnostics::{Diagnostic, DiagnosticCode, SourceLocation};

use crate::{MirType, Value};

use super::builder::MirBuilder;
use super::expr::LowerExpr;
use super::function::{declare_function, lower_function};

/// Trait for lowering statements to MIR
pub trait LowerStmt {
    /// Lowers one statement at the current insertion point
    ///
    /// Leaves the value stack as deep as it found it.
    fn lower_statement(&mut self, stmt: &Spanned<Statement>);
}

impl LowerStmt for MirBuilder<'_> {
    fn lower_statement(&mut self, stmt: &Spanned<Statement>) {
        match stmt.node() {
            Statement::Expression(expr) => self.lower_expression_statement(expr),
            Statement::VarDecl {
                name,
                initializer,
                is_const,
            } => self.lower_var_decl(name, initializer.as_ref(), *is_const, stmt.location()),
            Statement::Block(statements) => self.lower_block_statement(statements),
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => self.lower_if_statement(condition, then_branch, else_branch.as_deref()),
            Statement::While { condition, body } => self.lower_while_statement(condition, body),
            Statement::Function(def) => self.lower_nested_function(def, stmt.location()),
            Statement::Return(value) => self.lower_return_statement(value.as_ref(), stmt.location()),
        }
    }
}

impl MirBuilder<'_> {
    /// Lowers a statement sequence in order
    ///
    /// Once the current block is terminated the remaining statements cannot
    /// run. They are reported once and skipped, except for function
    /// declarations which do not emit code into the current block.
    pub(crate) fn lower_statement_list<'s, I>(&mut self, statements: I)
    where
        I: IntoIterator<Item = &'s Spanned<Statement>>,
    {
        let mut reported_unreachable = false;

        for stmt in statements {
            let is_declaration = matches!(stmt.node(), Statement::Function(_));
            if self.is_current_block_terminated() && !is_declaration {
                if !reported_unreachable {
                    log::warn!(
                        "skipping unreachable {} in '{}'",
                        stmt.node().kind_name(),
                        self.function.name
                    );
                    self.report(Diagnostic::unreachable_code(
                        stmt.node().kind_name(),
                        stmt.location().clone(),
                    ));
                    reported_unreachable = true;
                }
                continue;
            }

            let depth = self.values.depth();
            self.lower_statement(stmt);
            if self.values.depth() != depth {
                log::error!(
                    "value stack went from {depth} to {} lowering a {}",
                    self.values.depth(),
                    stmt.node().kind_name()
                );
                self.values.truncate(depth);
            }
        }
    }

    pub(super) fn lower_expression_statement(&mut self, expr: &Spanned<Expression>) {
        self.lower_expression(expr);
        self.values.pop();
    }

    pub(super) fn lower_var_decl(
        &mut self,
        name: &str,
        initializer: Option<&Spanned<Expression>>,
        is_const: bool,
        location: &SourceLocation,
    ) {
        let initial = match initializer {
            Some(expr) => Some(self.lower_value(expr)),
            None => {
                if is_const {
                    self.report(Diagnostic::missing_initializer(name, location.clone()));
                }
                None
            }
        };

        let initial_type = initial.as_ref().map(|value| self.type_of(value));
        let slot_type = match &initial_type {
            None | Some(MirType::Error) => MirType::Int,
            Some(MirType::Void) => {
                self.report(Diagnostic::type_mismatch(
                    format!("Cannot initialize '{name}' with a void value"),
                    location.clone(),
                ));
                MirType::Int
            }
            Some(ty) => ty.clone(),
        };

        if self.scopes.is_declared_in_current_scope(name) {
            self.report(Diagnostic::duplicate_definition(name, location.clone()));
            return;
        }

        let slot = self
            .function
            .allocate_slot(name.to_string(), slot_type.clone());
        if let Err(existing) = self.scopes.declare(name, slot) {
            log::error!("'{name}' already bound to slot {}", existing.index());
        }

        // Without an initializer the slot starts at its type's zero
        let stored = match (initial, initial_type) {
            (None, _) => slot_type.zero_value(),
            (Some(value), Some(ty)) if !ty.is_error() && ty != MirType::Void => Some(value),
            (Some(_), _) => None,
        };
        if let Some(value) = stored {
            self.instr().store(slot, value, Some(name.to_string()));
        }
    }

    pub(super) fn lower_block_statement(&mut self, statements: &[Spanned<Statement>]) {
        self.scopes.push_scope();
        self.lower_statement_list(statements);
        self.scopes.pop_scope();
    }

    /// Lowers an `if` branch in its own scope
    fn lower_branch(&mut self, branch: &Spanned<Statement>) {
        self.scopes.push_scope();
        self.lower_statement(branch);
        self.scopes.pop_scope();
    }

    pub(super) fn lower_if_statement(
        &mut self,
        condition: &Spanned<Expression>,
        then_branch: &Spanned<Statement>,
        else_branch: Option<&Spanned<Statement>>,
    ) {
        let condition_value = self.lower_condition(condition);
        let (then_block, else_block, merge_block) = self.cfg().create_if_blocks();

        // Without an else branch the false edge goes straight to the merge block
        let false_target = if else_branch.is_some() {
            else_block
        } else {
            merge_block
        };
        self.terminate_with_branch(condition_value, then_block, false_target);

        self.switch_to_block(then_block);
        self.lower_branch(then_branch);
        if !self.is_current_block_terminated() {
            self.terminate_with_jump(merge_block);
        }

        if let Some(else_stmt) = else_branch {
            self.switch_to_block(else_block);
            self.lower_branch(else_stmt);
            if !self.is_current_block_terminated() {
                self.terminate_with_jump(merge_block);
            }
        }

        if self.has_predecessors(merge_block) {
            self.switch_to_block(merge_block);
        } else {
            // Every path returned; the merge block stays out of the function
            self.state.is_terminated = true;
        }
    }

    pub(super) fn lower_while_statement(
        &mut self,
        condition: &Spanned<Expression>,
        body: &Spanned<Statement>,
    ) {
        // While Loop Pattern:
        // entry:
        //     jump loop_header
        // loop_header:
        //     %cond = evaluate_condition
        //     if %cond then loop_body else loop_exit
        // loop_body:
        //     ... body statements ...
        //     jump loop_header
        // loop_exit:
        //     ... continue after loop ...
        let (loop_header, loop_body, loop_exit) = self.cfg().create_loop_blocks();

        self.jump_to(loop_header);
        let condition_value = self.lower_condition(condition);
        self.terminate_with_branch(condition_value, loop_body, loop_exit);

        self.switch_to_block(loop_body);
        self.lower_branch(body);
        if !self.is_current_block_terminated() {
            self.terminate_with_jump(loop_header);
        }

        self.switch_to_block(loop_exit);
    }

    pub(super) fn lower_return_statement(
        &mut self,
        value: Option<&Spanned<Expression>>,
        location: &SourceLocation,
    ) {
        if !self.in_function && !self.config.allow_top_level_return {
            if let Some(expr) = value {
                self.lower_value(expr);
            }
            self.report(Diagnostic::return_outside_function(location.clone()));
            return;
        }

        let return_value = match value {
            Some(expr) => {
                let raw = self.lower_value(expr);
                let return_type = self.function.return_type.clone();
                self.coerce_to(raw, &return_type, DiagnosticCode::InvalidReturnType, expr.location())
            }
            None => Value::integer(0),
        };
        self.terminate_with_return(return_value);
    }

    /// A function declared inside a body becomes a module function, callable
    /// from the statements that follow it
    pub(super) fn lower_nested_function(&mut self, def: &FunctionDef, location: &SourceLocation) {
        let Some(function_id) = declare_function(self.module, self.diagnostics, def, location)
        else {
            return;
        };
        lower_function(
            self.module,
            self.diagnostics,
            self.config,
            function_id,
            def,
            location,
        );
    }
}
