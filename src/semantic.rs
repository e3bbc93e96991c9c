use std::collections::BTreeMap;

use log::{debug, warn};
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::ast::Node;

/// Placeholder type recorded for every symbol; no inference is performed.
pub const UNKNOWN_TYPE: &str = "unknown";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("Redeclaration of '{name}' in this scope")]
    Redeclaration { name: String },
    #[error("Reference to undeclared variable '{name}'")]
    UndeclaredVariable { name: String },
    #[error("Left-hand side of assignment is not a variable")]
    AssignmentTargetNotVariable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub ty: String,
    pub is_function: bool,
}

impl Symbol {
    pub fn variable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: UNKNOWN_TYPE.to_string(),
            is_function: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: BTreeMap<String, Symbol>,
}

impl SymbolTable {
    #[inline]
    pub fn add_symbol(&mut self, symbol: Symbol) {
        self.symbols.insert(symbol.name.clone(), symbol);
    }

    #[inline]
    pub fn get_symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    #[inline]
    pub fn contains_symbol(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }
}

/// Result of a semantic pass. Always produced, even for erroneous programs.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub symbols: SymbolTable,
    pub errors: Vec<SemanticError>,
}

#[derive(Default)]
pub struct SemanticAnalyzer {
    scopes: Vec<FxHashSet<String>>,
    symbols: SymbolTable,
    errors: Vec<SemanticError>,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analyze(mut self, root: &Node) -> Analysis {
        self.enter_scope();
        self.visit(root);
        self.exit_scope();
        debug!(
            "analysis declared {} symbols with {} errors",
            self.symbols.len(),
            self.errors.len()
        );
        Analysis {
            symbols: self.symbols,
            errors: self.errors,
        }
    }

    fn visit(&mut self, node: &Node) {
        match node {
            Node::Program { statements } => {
                for statement in statements {
                    self.visit(statement);
                }
            }
            Node::Assignment { target, value } => {
                match target.as_ref() {
                    Node::Identifier(name) => {
                        if !self.is_declared(name) {
                            self.declare(name);
                            self.symbols.add_symbol(Symbol::variable(name.as_str()));
                        }
                    }
                    _ => self.report(SemanticError::AssignmentTargetNotVariable),
                }
                self.visit(value);
            }
            Node::BinaryOp { left, right, .. } => {
                self.visit(left);
                self.visit(right);
            }
            Node::UnaryOp { operand, .. } => self.visit(operand),
            Node::Identifier(name) => {
                if !self.is_declared(name) {
                    self.report(SemanticError::UndeclaredVariable { name: name.clone() });
                }
            }
            Node::NumberLiteral(_) | Node::StringLiteral(_) => {}
        }
    }

    fn enter_scope(&mut self) {
        self.scopes.push(FxHashSet::default());
    }

    fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    /// Adds `name` to the innermost scope. Returns `false` and records a
    /// diagnostic when that scope already holds it.
    fn declare(&mut self, name: &str) -> bool {
        let Some(scope) = self.scopes.last_mut() else {
            return false;
        };
        if !scope.insert(name.to_string()) {
            self.report(SemanticError::Redeclaration {
                name: name.to_string(),
            });
            return false;
        }
        true
    }

    fn is_declared(&self, name: &str) -> bool {
        self.scopes.iter().rev().any(|scope| scope.contains(name))
    }

    fn report(&mut self, error: SemanticError) {
        warn!("{error}");
        self.errors.push(error);
    }
}

pub fn analyze(root: &Node) -> Analysis {
    SemanticAnalyzer::new().analyze(root)
}
