//! Type system representation for Simple C.
//!
//! A type is a value: a base specifier, a level of indirection, and a kind that
//! says whether it names a scalar, an array or a function. The error type is
//! absorbing; every rule that sees it yields it again without reporting, which
//! keeps one mistake from producing a cascade of diagnostics.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;
use thin_vec::ThinVec;

/// Size of `char` in bytes.
pub const SIZEOF_CHAR: u64 = 1;
/// Size of `int` in bytes.
pub const SIZEOF_INT: u64 = 4;
/// Size of `long` in bytes.
pub const SIZEOF_LONG: u64 = 8;
/// Size of any pointer in bytes.
pub const SIZEOF_PTR: u64 = 8;

/// Base type specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Specifier {
    Char,
    Int,
    Long,
}

impl Specifier {
    pub fn size(self) -> u64 {
        match self {
            Specifier::Char => SIZEOF_CHAR,
            Specifier::Int => SIZEOF_INT,
            Specifier::Long => SIZEOF_LONG,
        }
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Specifier::Char => write!(f, "char"),
            Specifier::Int => write!(f, "int"),
            Specifier::Long => write!(f, "long"),
        }
    }
}

/// Parameter list of a function type. `None` on the owning type means the
/// list was left unspecified (`int f();`), which is distinct from an empty one.
pub type Parameters = ThinVec<Type>;

/// The kind of a type. Fixed at construction.
#[derive(Debug, Clone)]
pub enum TypeKind {
    Scalar,
    Array { length: u64 },
    Function { parameters: Option<Parameters> },
    Error,
}

/// A Simple C type.
#[derive(Debug, Clone)]
pub struct Type {
    kind: TypeKind,
    specifier: Specifier,
    indirection: u32,
}

impl Type {
    pub fn scalar(specifier: Specifier, indirection: u32) -> Self {
        Type {
            kind: TypeKind::Scalar,
            specifier,
            indirection,
        }
    }

    pub fn array(specifier: Specifier, indirection: u32, length: u64) -> Self {
        Type {
            kind: TypeKind::Array { length },
            specifier,
            indirection,
        }
    }

    pub fn function(specifier: Specifier, indirection: u32, parameters: Option<Parameters>) -> Self {
        Type {
            kind: TypeKind::Function { parameters },
            specifier,
            indirection,
        }
    }

    pub fn error() -> Self {
        // The specifier of an error type is never observed.
        Type {
            kind: TypeKind::Error,
            specifier: Specifier::Int,
            indirection: 0,
        }
    }

    pub fn char() -> Self {
        Type::scalar(Specifier::Char, 0)
    }

    pub fn int() -> Self {
        Type::scalar(Specifier::Int, 0)
    }

    pub fn long() -> Self {
        Type::scalar(Specifier::Long, 0)
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn specifier(&self) -> Specifier {
        self.specifier
    }

    pub fn indirection(&self) -> u32 {
        self.indirection
    }

    /// Length of an array type.
    pub fn length(&self) -> Option<u64> {
        match self.kind {
            TypeKind::Array { length } => Some(length),
            _ => None,
        }
    }

    /// Parameters of a function type; `None` both for non-functions and for
    /// an unspecified list.
    pub fn parameters(&self) -> Option<&Parameters> {
        match &self.kind {
            TypeKind::Function { parameters } => parameters.as_ref(),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, TypeKind::Array { .. })
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.kind, TypeKind::Scalar)
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, TypeKind::Function { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, TypeKind::Error)
    }

    pub fn is_pointer(&self) -> bool {
        !self.is_error() && self.indirection > 0
    }

    pub fn is_numeric(&self) -> bool {
        self.is_scalar() && self.indirection == 0
    }

    pub fn is_logical(&self) -> bool {
        self.is_scalar() || self.is_array()
    }

    /// The value type of a function type: what a call produces.
    pub fn result(&self) -> Type {
        match self.kind {
            TypeKind::Error => Type::error(),
            _ => Type::scalar(self.specifier, self.indirection),
        }
    }

    /// Array to pointer-to-element, `char` to `int`, everything else unchanged.
    pub fn promote(&self) -> Type {
        match self.kind {
            TypeKind::Array { .. } => Type::scalar(self.specifier, self.indirection + 1),
            TypeKind::Scalar if self.indirection == 0 && self.specifier == Specifier::Char => Type::int(),
            _ => self.clone(),
        }
    }

    /// One level less of indirection. Only meaningful on pointers.
    pub fn deref(&self) -> Type {
        debug_assert!(self.indirection > 0, "deref of non-pointer type {}", self);
        Type::scalar(self.specifier, self.indirection.saturating_sub(1))
    }

    /// One level more of indirection.
    pub fn pointer_to(&self) -> Type {
        Type::scalar(self.specifier, self.indirection + 1)
    }

    /// Size in bytes. Functions and the error type have no size and report 0.
    pub fn size(&self) -> u64 {
        let element = if self.indirection > 0 {
            SIZEOF_PTR
        } else {
            self.specifier.size()
        };

        match self.kind {
            TypeKind::Scalar => element,
            TypeKind::Array { length } => element * length,
            TypeKind::Function { .. } | TypeKind::Error => 0,
        }
    }

    /// Compatibility after promotion: identical numeric or pointer types, or a
    /// pointer with more than one level of indirection against a plain pointer.
    pub fn is_compatible_with(&self, other: &Type) -> bool {
        let left = self.promote();
        let right = other.promote();

        if !left.is_scalar() || !right.is_scalar() {
            return false;
        }

        if left == right {
            return true;
        }

        let generic = |a: &Type, b: &Type| a.indirection > 1 && b.indirection == 1;
        generic(&left, &right) || generic(&right, &left)
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (TypeKind::Error, TypeKind::Error) => true,
            (TypeKind::Error, _) | (_, TypeKind::Error) => false,
            _ if self.specifier != other.specifier || self.indirection != other.indirection => false,
            (TypeKind::Scalar, TypeKind::Scalar) => true,
            (TypeKind::Array { length: a }, TypeKind::Array { length: b }) => a == b,
            (TypeKind::Function { parameters: a }, TypeKind::Function { parameters: b }) => match (a, b) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            },
            _ => false,
        }
    }
}

impl Default for Type {
    fn default() -> Self {
        Type::error()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_error() {
            return write!(f, "error");
        }

        write!(f, "{}", self.specifier)?;
        if self.indirection > 0 {
            write!(f, " {}", "*".repeat(self.indirection as usize))?;
        }

        match &self.kind {
            TypeKind::Array { length } => write!(f, "[{}]", length),
            TypeKind::Function { parameters: Some(params) } => {
                write!(f, "({})", params.iter().map(|p| p.to_string()).join(", "))
            }
            TypeKind::Function { parameters: None } => write!(f, "()"),
            _ => Ok(()),
        }
    }
}

impl Serialize for Type {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
