//! AST node definitions and constructors.
//!
//! The checker builds these bottom-up. Every implicit conversion the language
//! performs is already present as an explicit node (`Cast`, `AddrOf`, the
//! pointer-scaling `Mul`), so later stages never consult conversion rules.

use serde::Serialize;
use thin_vec::ThinVec;

use crate::semantic::{ScopeId, SymbolRef};
use crate::types::Type;

// Unary Operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    Minus,
    LogicNot,
    Deref,
    AddrOf,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Minus => "-",
            UnaryOp::LogicNot => "!",
            UnaryOp::Deref => "*",
            UnaryOp::AddrOf => "&",
        }
    }
}

// Binary Operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    LogicAnd,
    LogicOr,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::LogicAnd => "&&",
            BinaryOp::LogicOr => "||",
        }
    }

    /// The comparison with swapped truth value, used when branching on false.
    pub fn negated(self) -> Option<BinaryOp> {
        Some(match self {
            BinaryOp::Equal => BinaryOp::NotEqual,
            BinaryOp::NotEqual => BinaryOp::Equal,
            BinaryOp::Less => BinaryOp::GreaterEqual,
            BinaryOp::LessEqual => BinaryOp::Greater,
            BinaryOp::Greater => BinaryOp::LessEqual,
            BinaryOp::GreaterEqual => BinaryOp::Less,
            _ => return None,
        })
    }
}

/// Expression variants.
#[derive(Debug, Clone)]
pub enum ExprKind {
    Number(i64),
    /// Literal text including its quotes, escapes left undecoded.
    String(String),
    Identifier(SymbolRef),
    Call {
        callee: SymbolRef,
        args: ThinVec<Expr>,
    },
    Unary(UnaryOp, Box<Expr>),
    /// Conversion to the type of the enclosing [`Expr`].
    Cast(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

/// A checked expression: its kind, resolved type and value category.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
    pub lvalue: bool,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Type) -> Self {
        Expr { kind, ty, lvalue: false }
    }

    pub fn number(value: i64, ty: Type) -> Self {
        Expr::new(ExprKind::Number(value), ty)
    }

    pub fn unary(op: UnaryOp, operand: Expr, ty: Type) -> Self {
        Expr::new(ExprKind::Unary(op, Box::new(operand)), ty)
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr, ty: Type) -> Self {
        Expr::new(ExprKind::Binary(op, Box::new(left), Box::new(right)), ty)
    }

    pub fn cast(operand: Expr, ty: Type) -> Self {
        Expr::new(ExprKind::Cast(Box::new(operand)), ty)
    }

    pub fn with_lvalue(mut self, lvalue: bool) -> Self {
        self.lvalue = lvalue;
        self
    }

    pub fn is_error(&self) -> bool {
        self.ty.is_error()
    }

    /// Numeric constant value, if this is one.
    pub fn as_number(&self) -> Option<i64> {
        match self.kind {
            ExprKind::Number(value) => Some(value),
            _ => None,
        }
    }

    /// True if any node of this tree failed to check.
    pub fn contains_error(&self) -> bool {
        if self.is_error() {
            return true;
        }
        match &self.kind {
            ExprKind::Call { args, .. } => args.iter().any(Expr::contains_error),
            ExprKind::Unary(_, operand) | ExprKind::Cast(operand) => operand.contains_error(),
            ExprKind::Binary(_, left, right) => left.contains_error() || right.contains_error(),
            ExprKind::Number(_) | ExprKind::String(_) | ExprKind::Identifier(_) => false,
        }
    }
}

/// Statement variants.
#[derive(Debug, Clone)]
pub enum Stmt {
    Expr(Expr),
    Assign(Expr, Expr),
    Return(Expr),
    While(Expr, Box<Stmt>),
    If(Expr, Box<Stmt>, Option<Box<Stmt>>),
    Block(Block),
}

impl Stmt {
    pub fn contains_error(&self) -> bool {
        match self {
            Stmt::Expr(expr) | Stmt::Return(expr) => expr.contains_error(),
            Stmt::Assign(left, right) => left.contains_error() || right.contains_error(),
            Stmt::While(cond, body) => cond.contains_error() || body.contains_error(),
            Stmt::If(cond, then_stmt, else_stmt) => {
                cond.contains_error()
                    || then_stmt.contains_error()
                    || else_stmt.as_ref().is_some_and(|s| s.contains_error())
            }
            Stmt::Block(block) => block.contains_error(),
        }
    }
}

/// A statement list together with the scope its declarations live in.
#[derive(Debug, Clone)]
pub struct Block {
    pub scope: ScopeId,
    pub stmts: ThinVec<Stmt>,
}

impl Block {
    pub fn contains_error(&self) -> bool {
        self.stmts.iter().any(Stmt::contains_error)
    }
}

/// A function definition. The body's scope also holds the parameters, first
/// and in order.
#[derive(Debug, Clone)]
pub struct Function {
    pub symbol: SymbolRef,
    pub body: Block,
}
