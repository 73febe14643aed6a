//! # Mana AST
//!
//! The syntax tree handed to the lowering engine by the front end. The tree is
//! a closed set of enums, so consumers dispatch over it with exhaustive
//! `match`es. Every type is serde-serializable, which lets external front ends
//! hand over programs as JSON.

pub mod ast;
pub mod build;

pub use ast::{
    BinaryOp, Expression, FunctionDef, Literal, Parameter, Program, Spanned, Statement, UnaryOp,
};
