//! # Storage Binder
//!
//! Lexical scopes mapping source names to the storage slots that hold them.

use rustc_hash::FxHashMap;

use crate::SlotId;

/// A chain of nested lexical scopes
///
/// The innermost scope is searched first, so a name declared in an inner
/// scope shadows any binding of the same name further out until that scope
/// is popped. The outermost (root) scope is never popped.
#[derive(Debug, Clone)]
pub struct ScopeChain {
    scopes: Vec<FxHashMap<String, SlotId>>,
}

impl ScopeChain {
    pub fn new() -> Self {
        Self {
            scopes: vec![FxHashMap::default()],
        }
    }

    /// Opens a new innermost scope
    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Closes the innermost scope, dropping its bindings
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        } else {
            log::warn!("attempted to pop the root scope");
        }
    }

    /// Number of open scopes, counting the root
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Binds `name` in the innermost scope
    ///
    /// Fails with the existing slot when the innermost scope already binds
    /// `name`; the existing binding is kept.
    pub fn declare(&mut self, name: &str, slot: SlotId) -> Result<(), SlotId> {
        let Some(scope) = self.scopes.last_mut() else {
            return Ok(());
        };
        if let Some(&existing) = scope.get(name) {
            return Err(existing);
        }
        scope.insert(name.to_string(), slot);
        Ok(())
    }

    /// Finds the innermost binding of `name`
    pub fn resolve(&self, name: &str) -> Option<SlotId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    pub fn is_declared_in_current_scope(&self, name: &str) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| scope.contains_key(name))
    }
}

impl Default for ScopeChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(n: usize) -> SlotId {
        SlotId::from_raw(n)
    }

    #[test]
    fn test_inner_binding_shadows_until_popped() {
        let mut scopes = ScopeChain::new();
        scopes.declare("x", slot(0)).unwrap();

        scopes.push_scope();
        assert_eq!(scopes.resolve("x"), Some(slot(0)));
        scopes.declare("x", slot(1)).unwrap();
        assert_eq!(scopes.resolve("x"), Some(slot(1)));

        scopes.pop_scope();
        assert_eq!(scopes.resolve("x"), Some(slot(0)));
    }

    #[test]
    fn test_redeclaration_in_same_scope_fails() {
        let mut scopes = ScopeChain::new();
        scopes.declare("x", slot(0)).unwrap();
        assert_eq!(scopes.declare("x", slot(1)), Err(slot(0)));
        assert_eq!(scopes.resolve("x"), Some(slot(0)));
    }

    #[test]
    fn test_unknown_name_and_root_scope() {
        let mut scopes = ScopeChain::new();
        assert_eq!(scopes.resolve("missing"), None);
        scopes.pop_scope();
        assert_eq!(scopes.depth(), 1);
        scopes.declare("y", slot(3)).unwrap();
        assert!(scopes.is_declared_in_current_scope("y"));
    }
}
