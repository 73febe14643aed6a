//! # MIR Module
//!
//! This module defines the top-level container for MIR, representing an entire
//! compilation unit: its functions and its hoisted string constants.

use std::fmt;

use index_vec::IndexVec;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::{
    indent_str, FunctionId, InstructionKind, Literal, MirFunction, PrettyPrint, StringId, Value,
    VerificationError,
};

/// Whole-module consistency problems found by [`MirModule::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    #[error("function name mismatch: map has '{expected}', function has '{found}'")]
    NameMismatch { expected: String, found: String },
    #[error("name map references missing function @fn{}", .0.index())]
    DanglingName(FunctionId),
    #[error("duplicate function name: '{0}'")]
    DuplicateSymbol(String),
    #[error("function '{function}' refers to missing function @fn{}", .callee.index())]
    DanglingFunction { function: String, callee: FunctionId },
    #[error("function '{function}' refers to missing string @str{}", .string.index())]
    DanglingString { function: String, string: StringId },
    #[error("function '{name}' is malformed: {error}")]
    InvalidFunction {
        name: String,
        error: VerificationError,
    },
}

/// The MIR for an entire program module (compilation unit)
///
/// # Design Notes
///
/// - Functions are stored in an `IndexVec` for efficient access by `FunctionId`.
///   A removed function leaves a `None` tombstone so ids stay stable.
/// - String literals are hoisted into a module-level table and deduplicated
///   by content
#[derive(Debug, Clone, PartialEq)]
pub struct MirModule {
    /// Module name, shown in dumps
    pub name: String,

    /// All functions in this module, indexed by `FunctionId`
    pub functions: IndexVec<FunctionId, Option<MirFunction>>,

    /// Mapping from function names to their IDs for lookup
    pub function_names: FxHashMap<String, FunctionId>,

    /// Hoisted string constants, indexed by `StringId`
    pub strings: IndexVec<StringId, String>,

    string_ids: FxHashMap<String, StringId>,
}

impl MirModule {
    /// Creates a new empty MIR module
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: IndexVec::new(),
            function_names: FxHashMap::default(),
            strings: IndexVec::new(),
            string_ids: FxHashMap::default(),
        }
    }

    /// Adds a function to the module and returns its ID
    pub fn add_function(&mut self, function: MirFunction) -> FunctionId {
        let name = function.name.clone();
        let function_id = self.functions.push(Some(function));
        self.function_names.insert(name, function_id);
        function_id
    }

    /// Puts `function` in the slot reserved by an earlier [`Self::add_function`]
    pub fn replace_function(&mut self, id: FunctionId, function: MirFunction) {
        if let Some(slot) = self.functions.get_mut(id) {
            *slot = Some(function);
        }
    }

    /// Removes a function, keeping its id reserved. Returns the removed body.
    pub fn remove_function(&mut self, id: FunctionId) -> Option<MirFunction> {
        let removed = self.functions.get_mut(id).and_then(Option::take);
        if let Some(function) = &removed {
            if self.function_names.get(&function.name) == Some(&id) {
                self.function_names.remove(&function.name);
            }
        }
        removed
    }

    /// Gets a function by ID
    pub fn get_function(&self, id: FunctionId) -> Option<&MirFunction> {
        self.functions.get(id).and_then(Option::as_ref)
    }

    /// Looks up a function by name
    pub fn lookup_function(&self, name: &str) -> Option<FunctionId> {
        self.function_names.get(name).copied()
    }

    /// Looks up a function body by name
    pub fn function_by_name(&self, name: &str) -> Option<&MirFunction> {
        self.lookup_function(name)
            .and_then(|id| self.get_function(id))
    }

    /// Returns an iterator over all live functions
    pub fn functions(&self) -> impl Iterator<Item = (FunctionId, &MirFunction)> {
        self.functions
            .iter_enumerated()
            .filter_map(|(id, function)| function.as_ref().map(|f| (id, f)))
    }

    /// Returns the number of live functions in this module
    pub fn function_count(&self) -> usize {
        self.functions().count()
    }

    /// Returns the id of the string constant `text`, hoisting it on first use
    pub fn intern_string(&mut self, text: &str) -> StringId {
        if let Some(&id) = self.string_ids.get(text) {
            return id;
        }
        let id = self.strings.push(text.to_string());
        self.string_ids.insert(text.to_string(), id);
        id
    }

    /// Gets a string constant by ID
    pub fn string(&self, id: StringId) -> Option<&str> {
        self.strings.get(id).map(String::as_str)
    }

    /// Returns an iterator over all string constants
    pub fn strings(&self) -> impl Iterator<Item = (StringId, &str)> {
        self.strings
            .iter_enumerated()
            .map(|(id, text)| (id, text.as_str()))
    }

    /// Renders the whole module as text
    pub fn dump(&self) -> String {
        self.pretty_print(0)
    }

    /// Validates the module structure
    ///
    /// Checks:
    /// - All function names in the name map are valid
    /// - No duplicate function names
    /// - Function and string references point at live entries
    /// - All functions have valid internal structure
    pub fn validate(&self) -> Result<(), Vec<ModuleError>> {
        let mut errors = Vec::new();

        for (name, &func_id) in &self.function_names {
            match self.get_function(func_id) {
                Some(function) if function.name != *name => {
                    errors.push(ModuleError::NameMismatch {
                        expected: name.clone(),
                        found: function.name.clone(),
                    });
                }
                Some(_) => {}
                None => errors.push(ModuleError::DanglingName(func_id)),
            }
        }

        let mut seen_names = FxHashSet::default();
        for (_, function) in self.functions() {
            if !seen_names.insert(function.name.as_str()) {
                errors.push(ModuleError::DuplicateSymbol(function.name.clone()));
            }
        }

        for (_, function) in self.functions() {
            self.check_references(function, &mut errors);

            if let Err(error) = function.validate() {
                errors.push(ModuleError::InvalidFunction {
                    name: function.name.clone(),
                    error,
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn check_references(&self, function: &MirFunction, errors: &mut Vec<ModuleError>) {
        let mut values: Vec<&Value> = Vec::new();
        for (_, instruction) in function.instructions() {
            if let InstructionKind::Call { callee, .. } = &instruction.kind {
                if self.get_function(*callee).is_none() {
                    errors.push(ModuleError::DanglingFunction {
                        function: function.name.clone(),
                        callee: *callee,
                    });
                }
            }
            values.extend(instruction.operands());
        }
        for (_, block) in function.blocks() {
            values.extend(block.terminator.operands());
        }

        for value in values {
            match value {
                Value::Literal(Literal::Function(callee)) if self.get_function(*callee).is_none() => {
                    errors.push(ModuleError::DanglingFunction {
                        function: function.name.clone(),
                        callee: *callee,
                    });
                }
                Value::Literal(Literal::String(string)) if self.strings.get(*string).is_none() => {
                    errors.push(ModuleError::DanglingString {
                        function: function.name.clone(),
                        string: *string,
                    });
                }
                _ => {}
            }
        }
    }
}

impl Default for MirModule {
    fn default() -> Self {
        Self::new("program")
    }
}

impl PrettyPrint for MirModule {
    fn pretty_print(&self, indent: usize) -> String {
        let mut result = String::new();
        let base_indent = indent_str(indent);

        result.push_str(&format!("{base_indent}module {} {{\n", self.name));

        for (id, text) in self.strings() {
            result.push_str(&format!(
                "{base_indent}  {} = {text:?}\n",
                id.pretty_print(0)
            ));
        }
        if !self.strings.is_empty() {
            result.push('\n');
        }

        for (func_id, function) in self.functions() {
            result.push_str(&format!(
                "{base_indent}  // Function {}\n",
                func_id.index()
            ));
            result.push_str(&function.pretty_print(indent + 1));
            result.push('\n');
        }

        result.push_str(&format!("{base_indent}}}\n"));
        result
    }
}

impl fmt::Display for MirModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty_print(0))
    }
}
