//! # MIR Lowering Module
//!
//! This module contains the infrastructure for lowering the AST to MIR.
//! It's organized into focused submodules that each handle a specific aspect of
//! the lowering process.

pub mod builder;
pub mod control_flow;
pub mod expr;
pub mod function;
pub mod stmt;

// Re-export the main entry point
pub use function::{finalize_function, lower_program, verify_module};

// Re-export commonly used items
pub use builder::MirBuilder;
pub use expr::LowerExpr;
pub use stmt::LowerStmt;

#[cfg(test)]
#[path = "lowering_tests.rs"]
mod tests;
