//! Abstract Syntax Tree (AST) for Simple C.
//!
//! The tree is produced by the semantic checker and is already canonical:
//! implicit promotions, conversions and pointer scaling appear as ordinary
//! nodes.
//!
//! - [`nodes`]: expression, statement, block and function nodes
//! - [`literal`]: integer and string literal decoding
//! - [`dumper`]: indented text rendering for debugging

/// Represents an interned string using symbol_table crate.
/// Alias for GlobalSymbol from symbol_table crate with global feature.
pub type NameId = symbol_table::GlobalSymbol;

pub mod dumper;
pub mod literal;
pub mod nodes;

pub use dumper::AstDumper;
pub use literal::IntegerLiteral;
pub use nodes::*;
