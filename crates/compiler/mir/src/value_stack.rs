//! # Value Stack
//!
//! The operand stack used while lowering expressions. Lowering an expression
//! pushes exactly one value; its parent pops the values of its children.

use crate::Value;

#[derive(Debug, Clone, Default)]
pub struct ValueStack {
    values: Vec<Value>,
}

impl ValueStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Pops the most recent value
    ///
    /// An empty stack yields [`Value::Error`] so that lowering can go on.
    pub fn pop(&mut self) -> Value {
        match self.values.pop() {
            Some(value) => value,
            None => {
                log::error!("value stack underflow");
                Value::Error
            }
        }
    }

    pub fn peek(&self) -> Option<&Value> {
        self.values.last()
    }

    pub fn depth(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drops every value above `depth`
    pub fn truncate(&mut self, depth: usize) {
        self.values.truncate(depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo_order() {
        let mut stack = ValueStack::new();
        stack.push(Value::integer(1));
        stack.push(Value::integer(2));
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.peek(), Some(&Value::integer(2)));
        assert_eq!(stack.pop(), Value::integer(2));
        assert_eq!(stack.pop(), Value::integer(1));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_underflow_yields_error_sentinel() {
        let mut stack = ValueStack::new();
        assert_eq!(stack.pop(), Value::Error);
    }

    #[test]
    fn test_truncate() {
        let mut stack = ValueStack::new();
        for i in 0..4 {
            stack.push(Value::integer(i));
        }
        stack.truncate(1);
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.pop(), Value::integer(0));
    }
}
