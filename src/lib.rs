//! Semantic checker, storage allocator and x86-64 code generator for Simple C.

/// Contains the AST node set, literal decoding and the tree dumper.
pub mod ast;
/// Contains the storage allocator and the assembly generator.
pub mod codegen;
/// Contains the translation facade.
pub mod compiler;
/// Contains the line-numbered diagnostic sink.
pub mod diagnostic;
/// Contains the error types for the application.
pub mod error;
pub mod options;
/// Contains the symbol table and the semantic checker.
pub mod semantic;
pub mod types;

#[cfg(test)]
mod tests;

pub use compiler::Compiler;
pub use error::CompileError;
pub use options::CompileOptions;
