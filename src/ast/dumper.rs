//! AST Dumper module
//!
//! Renders checked trees as indented text, one node per line with its type.
//! Used for debugging and snapshot tests.

use std::fmt::Write;

use crate::ast::{BinaryOp, Block, Expr, ExprKind, Function, Stmt, UnaryOp};
use crate::semantic::SymbolTable;

/// Dumper for AST
pub struct AstDumper<'a> {
    symbols: &'a SymbolTable,
    out: String,
}

impl<'a> AstDumper<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        AstDumper {
            symbols,
            out: String::new(),
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    /// Dump a single expression tree.
    pub fn dump_expr(symbols: &SymbolTable, expr: &Expr) -> String {
        let mut dumper = AstDumper::new(symbols);
        dumper.expr(expr, 0);
        dumper.finish()
    }

    /// Dump a function definition.
    pub fn dump_function(symbols: &SymbolTable, function: &Function) -> String {
        let mut dumper = AstDumper::new(symbols);
        dumper.function(function);
        dumper.finish()
    }

    fn line(&mut self, depth: usize, text: std::fmt::Arguments<'_>) {
        // Writing into a String cannot fail.
        let _ = writeln!(self.out, "{:indent$}{}", "", text, indent = depth * 2);
    }

    pub fn function(&mut self, function: &Function) {
        let symbol = self.symbols.symbol(function.symbol);
        self.line(0, format_args!("Function {} {}", symbol.name, symbol.ty));
        self.block(&function.body, 1);
    }

    fn block(&mut self, block: &Block, depth: usize) {
        self.line(depth, format_args!("Block"));
        for symbol in self.symbols.symbols(block.scope) {
            let symbol = self.symbols.symbol(symbol);
            match symbol.offset {
                Some(offset) => self.line(depth + 1, format_args!("Declare {} {} @{}", symbol.name, symbol.ty, offset)),
                None => self.line(depth + 1, format_args!("Declare {} {}", symbol.name, symbol.ty)),
            }
        }
        for stmt in &block.stmts {
            self.stmt(stmt, depth + 1);
        }
    }

    fn stmt(&mut self, stmt: &Stmt, depth: usize) {
        match stmt {
            Stmt::Expr(expr) => self.expr(expr, depth),
            Stmt::Assign(left, right) => {
                self.line(depth, format_args!("Assign"));
                self.expr(left, depth + 1);
                self.expr(right, depth + 1);
            }
            Stmt::Return(expr) => {
                self.line(depth, format_args!("Return"));
                self.expr(expr, depth + 1);
            }
            Stmt::While(cond, body) => {
                self.line(depth, format_args!("While"));
                self.expr(cond, depth + 1);
                self.stmt(body, depth + 1);
            }
            Stmt::If(cond, then_stmt, else_stmt) => {
                self.line(depth, format_args!("If"));
                self.expr(cond, depth + 1);
                self.stmt(then_stmt, depth + 1);
                if let Some(else_stmt) = else_stmt {
                    self.line(depth, format_args!("Else"));
                    self.stmt(else_stmt, depth + 1);
                }
            }
            Stmt::Block(block) => self.block(block, depth),
        }
    }

    fn expr(&mut self, expr: &Expr, depth: usize) {
        let ty = &expr.ty;
        match &expr.kind {
            ExprKind::Number(value) => self.line(depth, format_args!("Number {} {}", value, ty)),
            ExprKind::String(text) => self.line(depth, format_args!("String {} {}", text, ty)),
            ExprKind::Identifier(symbol) => {
                let name = self.symbols.symbol(*symbol).name;
                self.line(depth, format_args!("Identifier {} {}", name, ty));
            }
            ExprKind::Call { callee, args } => {
                let name = self.symbols.symbol(*callee).name;
                self.line(depth, format_args!("Call {} {}", name, ty));
                for arg in args {
                    self.expr(arg, depth + 1);
                }
            }
            ExprKind::Unary(op, operand) => {
                self.line(depth, format_args!("{} {}", unary_name(*op), ty));
                self.expr(operand, depth + 1);
            }
            ExprKind::Cast(operand) => {
                self.line(depth, format_args!("Cast {}", ty));
                self.expr(operand, depth + 1);
            }
            ExprKind::Binary(op, left, right) => {
                self.line(depth, format_args!("{} {}", binary_name(*op), ty));
                self.expr(left, depth + 1);
                self.expr(right, depth + 1);
            }
        }
    }
}

fn unary_name(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Minus => "Negate",
        UnaryOp::LogicNot => "Not",
        UnaryOp::Deref => "Dereference",
        UnaryOp::AddrOf => "Address",
    }
}

fn binary_name(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "Add",
        BinaryOp::Sub => "Subtract",
        BinaryOp::Mul => "Multiply",
        BinaryOp::Div => "Divide",
        BinaryOp::Mod => "Remainder",
        BinaryOp::Equal => "Equal",
        BinaryOp::NotEqual => "NotEqual",
        BinaryOp::Less => "LessThan",
        BinaryOp::LessEqual => "LessOrEqual",
        BinaryOp::Greater => "GreaterThan",
        BinaryOp::GreaterEqual => "GreaterOrEqual",
        BinaryOp::LogicAnd => "LogicalAnd",
        BinaryOp::LogicOr => "LogicalOr",
    }
}
