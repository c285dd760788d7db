use thiserror::Error;

use crate::ast::NameId;

/// A recoverable problem found while checking declarations and expressions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticError {
    /// A function body was given twice.
    #[error("redefinition of '{0}'")]
    Redefinition(NameId),

    /// A name was declared twice in the same block.
    #[error("redeclaration of '{0}'")]
    Redeclaration(NameId),

    /// A file-level name was declared with two different types.
    #[error("conflicting types for '{0}'")]
    ConflictingTypes(NameId),

    #[error("'{0}' undeclared")]
    Undeclared(NameId),

    #[error("invalid return type")]
    InvalidReturnType,

    /// The condition of an `if` or `while` is not logical.
    #[error("invalid type for test expression")]
    InvalidTestExpression,

    #[error("lvalue required in expression")]
    LvalueRequired,

    #[error("invalid operands to binary {0}")]
    InvalidBinaryOperands(&'static str),

    #[error("invalid operand to unary {0}")]
    InvalidUnaryOperand(&'static str),

    #[error("invalid operand in cast expression")]
    InvalidCast,

    #[error("invalid operand in sizeof expression")]
    InvalidSizeof,

    #[error("called object is not a function")]
    NotAFunction,

    /// Wrong arity, or an argument not convertible to its parameter.
    #[error("invalid arguments to called function")]
    InvalidArguments,
}
