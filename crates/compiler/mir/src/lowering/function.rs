//! # Function-level MIR Lowering
//!
//! This module contains the main entry point for MIR generation and the
//! orchestration logic for lowering entire functions from the AST.

use mana_compiler_ast::{FunctionDef, Parameter as AstParameter, Program, Statement};
use mana_compiler_diagnostics::{Diagnostic, DiagnosticCollection, SourceLocation};

use crate::{FunctionId, LoweringConfig, MirFunction, MirModule, MirType, Parameter, Value};

use super::builder::MirBuilder;

/// The main entry point for MIR generation.
///
/// Lowers a whole program into a module:
/// 1. The runtime `print` function is declared (unless disabled)
/// 2. Every top-level function is registered, so calls resolve in any order
/// 3. Each function body is lowered and verified
/// 4. The remaining top-level statements become the entry point function
/// 5. The finished module is verified as a whole
///
/// # Error Handling
///
/// This function never fails. Problems are reported to `diagnostics`, and a
/// module produced while `diagnostics.has_errors()` is set must not be used.
pub fn lower_program(
    program: &Program,
    config: &LoweringConfig,
    diagnostics: &mut DiagnosticCollection,
) -> MirModule {
    let mut module = MirModule::new(config.module_name.clone());

    if config.declare_builtins {
        module.add_function(MirFunction::external(
            "print".to_string(),
            vec![("format".to_string(), MirType::string())],
            MirType::void(),
        ));
    }

    let entry = MirFunction::new(config.entry_point.clone(), MirType::int());
    let entry_id = module.add_function(entry.clone());

    // First pass: register every top-level function
    let mut declared = Vec::new();
    for stmt in &program.statements {
        if let Statement::Function(def) = stmt.node() {
            if let Some(function_id) = declare_function(&mut module, diagnostics, def, stmt.location())
            {
                declared.push((function_id, def, stmt.location()));
            }
        }
    }

    // Second pass: lower the bodies
    for (function_id, def, location) in declared {
        lower_function(&mut module, diagnostics, config, function_id, def, location);
    }

    log::debug!("lowering entry point '{}'", config.entry_point);
    let mut builder = MirBuilder::new(&mut module, diagnostics, config, entry, false);
    builder.lower_statement_list(
        program
            .statements
            .iter()
            .filter(|stmt| !matches!(stmt.node(), Statement::Function(_))),
    );
    builder.terminate_with_default_return();
    let entry = builder.finish();
    finalize_function(
        &mut module,
        entry_id,
        entry,
        config,
        diagnostics,
        &SourceLocation::default(),
    );

    if config.verify_module {
        verify_module(&module, diagnostics);
    }

    module
}

/// Checks the module as a whole, reporting every problem as fatal
///
/// Returns whether the module is well formed.
pub fn verify_module(module: &MirModule, diagnostics: &mut DiagnosticCollection) -> bool {
    log::debug!("verifying module '{}'", module.name);
    let Err(errors) = module.validate() else {
        return true;
    };
    for error in errors {
        log::error!("module '{}' failed verification: {error}", module.name);
        diagnostics.add(Diagnostic::module_verification_failed(&error.to_string()));
    }
    false
}

/// Reserves a module slot for `def`, reporting a name that is already taken
pub(super) fn declare_function(
    module: &mut MirModule,
    diagnostics: &mut DiagnosticCollection,
    def: &FunctionDef,
    location: &SourceLocation,
) -> Option<FunctionId> {
    if module.lookup_function(&def.name).is_some() {
        diagnostics.add(Diagnostic::duplicate_definition(&def.name, location.clone()));
        return None;
    }

    // The placeholder carries the signature so that calls lowered before the
    // body can be checked
    let mut placeholder = MirFunction::new(def.name.clone(), MirType::int());
    placeholder.parameters = def
        .params
        .iter()
        .map(|param| Parameter {
            name: param.name.clone(),
            ty: MirType::int(),
            value: None,
            slot: None,
        })
        .collect();
    Some(module.add_function(placeholder))
}

/// Lowers the body of a declared function into its module slot
///
/// Returns whether the function survived verification.
pub(super) fn lower_function(
    module: &mut MirModule,
    diagnostics: &mut DiagnosticCollection,
    config: &LoweringConfig,
    function_id: FunctionId,
    def: &FunctionDef,
    location: &SourceLocation,
) -> bool {
    log::debug!("lowering function '{}'", def.name);

    let function = MirFunction::new(def.name.clone(), MirType::int());
    let mut builder = MirBuilder::new(module, diagnostics, config, function, true);

    builder.bind_parameters(&def.params);
    builder.scopes.push_scope();
    builder.lower_statement_list(&def.body);
    builder.scopes.pop_scope();
    builder.terminate_with_default_return();

    let function = builder.finish();
    finalize_function(module, function_id, function, config, diagnostics, location)
}

/// Installs a lowered function in the module and verifies it
///
/// A function that fails verification is reported and removed from the
/// module. Returns whether the function was kept.
pub fn finalize_function(
    module: &mut MirModule,
    function_id: FunctionId,
    function: MirFunction,
    config: &LoweringConfig,
    diagnostics: &mut DiagnosticCollection,
    location: &SourceLocation,
) -> bool {
    let name = function.name.clone();
    module.replace_function(function_id, function);
    if !config.verify_functions {
        return true;
    }

    log::debug!("verifying function '{name}'");
    let Some(result) = module.get_function(function_id).map(MirFunction::validate) else {
        return false;
    };

    match result {
        Ok(()) => true,
        Err(error) => {
            log::error!("removing function '{name}': {error}");
            diagnostics.add(Diagnostic::function_verification_failed(
                &name,
                &error.to_string(),
                location.clone(),
            ));
            module.remove_function(function_id);
            false
        }
    }
}

impl MirBuilder<'_> {
    /// Gives every parameter a slot holding the incoming argument
    pub(super) fn bind_parameters(&mut self, params: &[AstParameter]) {
        for param in params {
            let value = self.function.new_typed_value_id(MirType::int());

            if self.scopes.is_declared_in_current_scope(&param.name) {
                self.report(Diagnostic::duplicate_definition(
                    &param.name,
                    param.location.clone(),
                ));
                self.function.parameters.push(Parameter {
                    name: param.name.clone(),
                    ty: MirType::int(),
                    value: Some(value),
                    slot: None,
                });
                continue;
            }

            let slot = self
                .function
                .allocate_slot(param.name.clone(), MirType::int());
            self.function.parameters.push(Parameter {
                name: param.name.clone(),
                ty: MirType::int(),
                value: Some(value),
                slot: Some(slot),
            });
            self.instr()
                .store(slot, Value::operand(value), Some(param.name.clone()));
            if let Err(existing) = self.scopes.declare(&param.name, slot) {
                log::error!(
                    "parameter '{}' already bound to slot {}",
                    param.name,
                    existing.index()
                );
            }
        }
    }

    /// Returns the zero of the return type if the body fell off its end
    pub(super) fn terminate_with_default_return(&mut self) {
        if self.is_current_block_terminated() {
            return;
        }
        let zero = self
            .function
            .return_type
            .zero_value()
            .unwrap_or(Value::integer(0));
        self.terminate_with_return(zero);
    }
}
