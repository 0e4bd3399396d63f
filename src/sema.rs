//! Semantic analysis support: symbol scopes, errors, warnings
//!
//! Name resolution and type checking run interleaved with lowering
//! (see [`crate::ir::lower`]); this module holds the pieces they share.
//! Fatal errors abort compilation immediately. Warnings accumulate and
//! are reported by the caller after compilation finishes.

use crate::span::Position;
use crate::ty::Ty;
use std::collections::HashMap;
use thiserror::Error;

/// A non-fatal diagnostic, reported after compilation completes
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub message: String,
    /// The offending lexeme
    pub lexeme: String,
    pub pos: Position,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "warning: {} at '{}' ({})", self.message, self.lexeme, self.pos)
    }
}

/// Fatal semantic errors
#[derive(Error, Debug, Clone)]
pub enum SemaError {
    #[error("{pos}: variable '{name}' declared void")]
    VoidVariable { name: String, pos: Position },

    #[error("{pos}: redeclaration of global variable '{name}'")]
    GlobalRedeclaration { name: String, pos: Position },

    #[error("{pos}: redeclaration of variable '{name}'")]
    Redeclaration { name: String, pos: Position },

    #[error("{pos}: unknown variable '{name}'")]
    UnknownVariable { name: String, pos: Position },

    #[error("{pos}: unknown function '{name}'")]
    UnknownFunction { name: String, pos: Position },

    #[error("{pos}: redeclaration of function '{name}'")]
    FunctionRedeclaration { name: String, pos: Position },

    #[error("{pos}: function '{name}' expects {expected} argument(s), found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        pos: Position,
    },

    #[error("{pos}: argument {index} of '{name}' expects {expected}, found {found}")]
    ArgTypeMismatch {
        name: String,
        index: usize,
        expected: Ty,
        found: Ty,
        pos: Position,
    },

    #[error("{pos}: unsupported cast from {from} to {to}")]
    UnsupportedCast { from: Ty, to: Ty, pos: Position },

    #[error("{pos}: void value used in an expression at '{lexeme}'")]
    VoidOperand { lexeme: String, pos: Position },

    #[error("{pos}: division by zero")]
    DivisionByZero { pos: Position },
}

/// How a looked-up name resolves
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binding<S> {
    /// A block-local or parameter, with its stack slot handle
    Local { slot: S, ty: Ty },
    /// A file-scope global
    Global { ty: Ty },
}

impl<S> Binding<S> {
    pub fn ty(&self) -> Ty {
        match self {
            Binding::Local { ty, .. } => *ty,
            Binding::Global { ty } => *ty,
        }
    }
}

/// A stack of lexical scopes over one global table.
///
/// `S` is the backend's handle for a local stack slot. Lookup walks the
/// local stack innermost-first and falls back to the globals, so an
/// inner declaration shadows an outer one and shadowing ends when its
/// scope is popped.
#[derive(Debug)]
pub struct Scopes<S> {
    globals: HashMap<String, Ty>,
    locals: Vec<HashMap<String, (S, Ty)>>,
}

impl<S: Copy> Scopes<S> {
    pub fn new() -> Self {
        Self {
            globals: HashMap::new(),
            locals: Vec::new(),
        }
    }

    /// Whether no local scope is open
    pub fn at_file_scope(&self) -> bool {
        self.locals.is_empty()
    }

    /// Open a new innermost scope
    pub fn enter(&mut self) {
        self.locals.push(HashMap::new());
    }

    /// Close the innermost scope, dropping its bindings
    pub fn exit(&mut self) {
        self.locals.pop();
    }

    /// Declare a global. Returns false if the name is already a global.
    pub fn declare_global(&mut self, name: &str, ty: Ty) -> bool {
        if self.globals.contains_key(name) {
            return false;
        }
        self.globals.insert(name.to_string(), ty);
        true
    }

    /// Declare a local in the innermost scope. Returns false if the
    /// name is already declared in that same scope; shadowing an outer
    /// scope is fine.
    pub fn declare_local(&mut self, name: &str, slot: S, ty: Ty) -> bool {
        let scope = self
            .locals
            .last_mut()
            .expect("declare_local outside any scope");
        if scope.contains_key(name) {
            return false;
        }
        scope.insert(name.to_string(), (slot, ty));
        true
    }

    /// Resolve a name, innermost scope first, then globals
    pub fn lookup(&self, name: &str) -> Option<Binding<S>> {
        for scope in self.locals.iter().rev() {
            if let Some(&(slot, ty)) = scope.get(name) {
                return Some(Binding::Local { slot, ty });
            }
        }
        self.globals.get(name).map(|&ty| Binding::Global { ty })
    }
}

impl<S: Copy> Default for Scopes<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_in_current_scope() {
        let mut scopes: Scopes<u32> = Scopes::new();
        scopes.enter();
        assert!(scopes.declare_local("x", 0, Ty::Int));
        assert_eq!(
            scopes.lookup("x"),
            Some(Binding::Local { slot: 0, ty: Ty::Int })
        );
    }

    #[test]
    fn test_shadowing_and_restore() {
        let mut scopes: Scopes<u32> = Scopes::new();
        scopes.enter();
        scopes.declare_local("x", 0, Ty::Int);
        scopes.enter();
        scopes.declare_local("x", 1, Ty::Float);
        assert_eq!(
            scopes.lookup("x"),
            Some(Binding::Local { slot: 1, ty: Ty::Float })
        );
        scopes.exit();
        // the outer binding comes back after the inner scope closes
        assert_eq!(
            scopes.lookup("x"),
            Some(Binding::Local { slot: 0, ty: Ty::Int })
        );
    }

    #[test]
    fn test_duplicate_in_same_scope_rejected() {
        let mut scopes: Scopes<u32> = Scopes::new();
        scopes.enter();
        assert!(scopes.declare_local("x", 0, Ty::Int));
        assert!(!scopes.declare_local("x", 1, Ty::Int));
    }

    #[test]
    fn test_local_shadows_global() {
        let mut scopes: Scopes<u32> = Scopes::new();
        assert!(scopes.declare_global("g", Ty::Float));
        scopes.enter();
        assert_eq!(scopes.lookup("g"), Some(Binding::Global { ty: Ty::Float }));
        scopes.declare_local("g", 7, Ty::Int);
        assert_eq!(
            scopes.lookup("g"),
            Some(Binding::Local { slot: 7, ty: Ty::Int })
        );
        scopes.exit();
        assert_eq!(scopes.lookup("g"), Some(Binding::Global { ty: Ty::Float }));
    }

    #[test]
    fn test_duplicate_global_rejected() {
        let mut scopes: Scopes<u32> = Scopes::new();
        assert!(scopes.declare_global("g", Ty::Int));
        assert!(!scopes.declare_global("g", Ty::Int));
    }

    #[test]
    fn test_unknown_name() {
        let scopes: Scopes<u32> = Scopes::new();
        assert_eq!(scopes.lookup("nope"), None);
    }
}
