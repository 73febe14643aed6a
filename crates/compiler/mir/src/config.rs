//! # Lowering configuration

/// Knobs for [`crate::lower_program`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweringConfig {
    /// Name given to the produced module
    pub module_name: String,
    /// Name of the synthesized function that holds top-level statements
    pub entry_point: String,
    /// Declare the runtime `print(format: string) -> void` function
    pub declare_builtins: bool,
    /// Verify each function after lowering, dropping the ones that fail
    pub verify_functions: bool,
    /// Verify the whole module once every function is lowered
    pub verify_module: bool,
    /// Accept `return` among top-level statements, ending the entry point
    pub allow_top_level_return: bool,
}

impl Default for LoweringConfig {
    fn default() -> Self {
        Self {
            module_name: "program".to_string(),
            entry_point: "main".to_string(),
            declare_builtins: true,
            verify_functions: true,
            verify_module: true,
            allow_top_level_return: true,
        }
    }
}

impl LoweringConfig {
    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    pub fn with_entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry_point = name.into();
        self
    }

    pub const fn with_builtins(mut self, declare: bool) -> Self {
        self.declare_builtins = declare;
        self
    }

    pub const fn with_function_verification(mut self, verify: bool) -> Self {
        self.verify_functions = verify;
        self
    }

    pub const fn with_module_verification(mut self, verify: bool) -> Self {
        self.verify_module = verify;
        self
    }

    pub const fn with_top_level_return(mut self, allow: bool) -> Self {
        self.allow_top_level_return = allow;
        self
    }
}
