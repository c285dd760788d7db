use crate::codegen::error::CodegenError;

use thiserror::Error;

/// A condition that stops translation.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Raised by the grammar driver; there is no recovery.
    #[error("line {line}: syntax error at '{near}'")]
    Syntax { line: u32, near: String },
    /// Translation ran to the end but reported errors.
    #[error("{count} semantic error(s)")]
    Semantic { count: usize },
    #[error("{0}")]
    Codegen(#[from] CodegenError),
}
