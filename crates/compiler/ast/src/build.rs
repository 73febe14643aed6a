//! Terse constructors for building syntax trees by hand.
//!
//! Nodes built here carry an unknown location; use [`at`] to attach one.

use mana_compiler_diagnostics::SourceLocation;

use crate::ast::{
    BinaryOp, Expression, FunctionDef, Literal, Parameter, Spanned, Statement, UnaryOp,
};

type Expr = Spanned<Expression>;
type Stmt = Spanned<Statement>;

/// Attaches a location (in the file `<input>`) to a node
pub fn at<T>(mut node: Spanned<T>, line: u32, column: u32) -> Spanned<T> {
    node.location = SourceLocation::new("<input>", line, column);
    node
}

fn expr(expression: Expression) -> Expr {
    Spanned::unlocated(expression)
}

fn stmt(statement: Statement) -> Stmt {
    Spanned::unlocated(statement)
}

pub fn int(value: i32) -> Expr {
    expr(Expression::Literal(Literal::Integer(value)))
}

pub fn float(value: f64) -> Expr {
    expr(Expression::Literal(Literal::Float(value)))
}

pub fn string(value: &str) -> Expr {
    expr(Expression::Literal(Literal::String(value.to_string())))
}

pub fn boolean(value: bool) -> Expr {
    expr(Expression::Literal(Literal::Boolean(value)))
}

pub fn null() -> Expr {
    expr(Expression::Literal(Literal::Null))
}

pub fn var(name: &str) -> Expr {
    expr(Expression::Variable(name.to_string()))
}

pub fn assign(name: &str, value: Expr) -> Expr {
    expr(Expression::Assign {
        name: name.to_string(),
        value: Box::new(value),
    })
}

pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    expr(Expression::Unary {
        op,
        operand: Box::new(operand),
    })
}

pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    expr(Expression::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

pub fn group(inner: Expr) -> Expr {
    expr(Expression::Grouping(Box::new(inner)))
}

pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    expr(Expression::Call {
        callee: Box::new(callee),
        args,
    })
}

/// A direct call by name, `name(args...)`
pub fn call_named(name: &str, args: Vec<Expr>) -> Expr {
    call(var(name), args)
}

pub fn expr_stmt(expression: Expr) -> Stmt {
    stmt(Statement::Expression(expression))
}

pub fn var_decl(name: &str, initializer: Option<Expr>) -> Stmt {
    stmt(Statement::VarDecl {
        name: name.to_string(),
        initializer,
        is_const: false,
    })
}

pub fn const_decl(name: &str, initializer: Option<Expr>) -> Stmt {
    stmt(Statement::VarDecl {
        name: name.to_string(),
        initializer,
        is_const: true,
    })
}

pub fn block(statements: Vec<Stmt>) -> Stmt {
    stmt(Statement::Block(statements))
}

pub fn if_stmt(condition: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Stmt {
    stmt(Statement::If {
        condition,
        then_branch: Box::new(then_branch),
        else_branch: else_branch.map(Box::new),
    })
}

pub fn while_stmt(condition: Expr, body: Stmt) -> Stmt {
    stmt(Statement::While {
        condition,
        body: Box::new(body),
    })
}

pub fn function(name: &str, params: &[&str], body: Vec<Stmt>) -> Stmt {
    stmt(Statement::Function(FunctionDef {
        name: name.to_string(),
        params: params
            .iter()
            .map(|param| Parameter {
                name: (*param).to_string(),
                location: SourceLocation::default(),
            })
            .collect(),
        body,
    }))
}

pub fn ret(value: Option<Expr>) -> Stmt {
    stmt(Statement::Return(value))
}
