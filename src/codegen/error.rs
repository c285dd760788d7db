use thiserror::Error;

/// An error that can occur during code generation.
#[derive(Error, Debug)]
pub enum CodegenError {
    /// A function still holds nodes that failed to check.
    #[error("cannot generate code for '{function}': it contains semantic errors")]
    ErroneousTree { function: String },
    /// The configured triple is not x86-64.
    #[error("unsupported target '{0}': only x86_64 is supported")]
    UnsupportedTarget(String),
}
