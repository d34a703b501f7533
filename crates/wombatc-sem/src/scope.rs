//! Scoped symbol table.
//!
//! Scopes form an explicit stack: lookup walks from the innermost scope
//! toward the global one, insertion and shadowing happen in the innermost
//! scope only. Bindings are kept in insertion order so diagnostics stay
//! deterministic.

use indexmap::IndexMap;
use wombatc_par::ast::Param;
use wombatc_par::types::{Mutability, TypeRef};
use wombatc_util::Symbol;

/// What a name refers to.
#[derive(Clone, Debug)]
pub enum SymbolInfo {
    /// A variable binding.
    Var {
        ty: TypeRef,
        mutability: Mutability,
    },
    /// A function with its parameter list and return type.
    Fn {
        params: Vec<Param>,
        ret_type: TypeRef,
    },
}

impl SymbolInfo {
    pub fn is_fn(&self) -> bool {
        matches!(self, SymbolInfo::Fn { .. })
    }

    pub fn is_var(&self) -> bool {
        matches!(self, SymbolInfo::Var { .. })
    }
}

/// One lexical scope.
#[derive(Debug, Default)]
pub struct Scope {
    bindings: IndexMap<Symbol, SymbolInfo>,
}

/// The stack of scopes. The bottom scope is global and never popped.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    /// Opens a new innermost scope.
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Closes the innermost scope. The global scope stays.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Inserts (or shadows) a binding in the innermost scope.
    pub fn insert(&mut self, name: Symbol, info: SymbolInfo) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.bindings.insert(name, info);
        }
    }

    /// Inserts a binding into the global scope regardless of nesting.
    pub fn insert_global(&mut self, name: Symbol, info: SymbolInfo) {
        if let Some(scope) = self.scopes.first_mut() {
            scope.bindings.insert(name, info);
        }
    }

    /// Whether the innermost scope already binds `name`.
    pub fn exists_in_current(&self, name: Symbol) -> bool {
        self.scopes
            .last()
            .is_some_and(|s| s.bindings.contains_key(&name))
    }

    /// Resolves a name, walking from the innermost scope to the global one.
    pub fn lookup(&self, name: Symbol) -> Option<&SymbolInfo> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.bindings.get(&name))
    }

    /// Current nesting depth, global scope included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wombatc_par::types::{Primitive, Type};

    fn var(prim: Primitive) -> SymbolInfo {
        SymbolInfo::Var {
            ty: Type::primitive(prim),
            mutability: Mutability::Immutable,
        }
    }

    #[test]
    fn test_lookup_walks_to_the_root() {
        let mut table = SymbolTable::new();
        let x = Symbol::intern("x");
        table.insert(x, var(Primitive::Int));

        table.push_scope();
        assert!(table.lookup(x).is_some());
        assert!(!table.exists_in_current(x));
    }

    #[test]
    fn test_shadowing_in_inner_scope() {
        let mut table = SymbolTable::new();
        let x = Symbol::intern("shadowed");
        table.insert(x, var(Primitive::Int));

        table.push_scope();
        table.insert(x, var(Primitive::Bool));

        match table.lookup(x) {
            Some(SymbolInfo::Var { ty, .. }) => assert!(ty.is_primitive(Primitive::Bool)),
            other => panic!("unexpected: {other:?}"),
        }

        table.pop_scope();
        match table.lookup(x) {
            Some(SymbolInfo::Var { ty, .. }) => assert!(ty.is_primitive(Primitive::Int)),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_pop_never_drops_global_scope() {
        let mut table = SymbolTable::new();
        table.pop_scope();
        table.pop_scope();
        assert_eq!(table.depth(), 1);

        let g = Symbol::intern("global_fn");
        table.insert(
            g,
            SymbolInfo::Fn {
                params: vec![],
                ret_type: Type::primitive(Primitive::Free),
            },
        );
        assert!(table.lookup(g).is_some());
    }

    #[test]
    fn test_insert_global_from_nested_scope() {
        let mut table = SymbolTable::new();
        table.push_scope();
        let f = Symbol::intern("deep_fn");
        table.insert_global(
            f,
            SymbolInfo::Fn {
                params: vec![],
                ret_type: Type::primitive(Primitive::Int),
            },
        );
        table.pop_scope();
        assert!(table.lookup(f).is_some_and(SymbolInfo::is_fn));
    }

    #[test]
    fn test_binding_dropped_with_scope() {
        let mut table = SymbolTable::new();
        table.push_scope();
        let t = Symbol::intern("transient");
        table.insert(t, var(Primitive::Char));
        table.pop_scope();
        assert!(table.lookup(t).is_none());
    }
}
