//! Semantic analysis module.
//!
//! - [`symbol_table`]: the scope chain and its symbols
//! - [`conversions`]: implicit promotions and conversions
//! - [`checker`]: declaration, expression and statement rules
//! - [`error`]: the recoverable errors those rules report

pub mod checker;
pub mod conversions;
pub mod error;
pub mod symbol_table;

// Re-export key types for public API
pub use checker::Checker;
pub use error::SemanticError;
pub use symbol_table::{Scope, ScopeId, Symbol, SymbolRef, SymbolTable};
