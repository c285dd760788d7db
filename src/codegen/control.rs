//! Statement lowering and conditional branches.

use crate::ast::{Block, Expr, ExprKind, Stmt, UnaryOp};
use crate::codegen::expr::condition;
use crate::codegen::generator::Generator;
use crate::codegen::label::Label;
use crate::codegen::registers::{Reg, suffix};

impl Generator<'_> {
    pub(crate) fn block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.stmt(stmt);
        }
    }

    /// Generate one statement. No register is assumed live across it.
    pub(crate) fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => {
                let value = self.expr(expr);
                self.unbind(value);
            }
            Stmt::Assign(left, right) => self.assignment(left, right),
            Stmt::Return(expr) => self.return_stmt(expr),
            Stmt::While(cond, body) => self.while_stmt(cond, body),
            Stmt::If(cond, then_stmt, else_stmt) => self.if_stmt(cond, then_stmt, else_stmt.as_deref()),
            Stmt::Block(block) => self.block(block),
        }
        self.release();
    }

    fn assignment(&mut self, left: &Expr, right: &Expr) {
        let size = left.ty.size();
        self.annotate("assign");

        if let ExprKind::Unary(UnaryOp::Deref, pointer) = &left.kind {
            let value = self.expr(right);
            let address = self.expr(pointer);
            let source = self.in_register(value, &[]);
            let target = self.in_register(address, &[source]);
            self.emit(format_args!("mov{} {}, ({})", suffix(size), source.name(size), target.name(8)));
            return;
        }

        let target = self.expr(left);
        let value = self.expr(right);
        let source = self.in_register(value, &[]);
        let destination = self.operand(target);
        self.emit(format_args!("mov{} {}, {}", suffix(size), source.name(size), destination));
    }

    fn return_stmt(&mut self, expr: &Expr) {
        let value = self.expr(expr);
        self.load(value, Reg::Rax);

        if let Some(label) = self.return_label {
            self.emit(format_args!("jmp {}", label));
        }
    }

    fn while_stmt(&mut self, cond: &Expr, body: &Stmt) {
        self.annotate("while");
        let (head, exit) = (self.new_label(), self.new_label());

        self.release();
        self.emit_label(head);
        self.test(cond, exit, false);
        self.stmt(body);
        self.release();
        self.emit(format_args!("jmp {}", head));
        self.emit_label(exit);
    }

    fn if_stmt(&mut self, cond: &Expr, then_stmt: &Stmt, else_stmt: Option<&Stmt>) {
        self.annotate("if");
        let skip = self.new_label();

        self.test(cond, skip, false);
        self.stmt(then_stmt);

        match else_stmt {
            Some(else_stmt) => {
                let exit = self.new_label();
                self.emit(format_args!("jmp {}", exit));
                self.emit_label(skip);
                self.stmt(else_stmt);
                self.emit_label(exit);
            }
            None => self.emit_label(skip),
        }
    }

    /// Branch to `label` when `cond` is `on_true`. Comparisons fuse into the
    /// conditional jump; anything else is compared against zero.
    pub(crate) fn test(&mut self, cond: &Expr, label: Label, on_true: bool) {
        if let ExprKind::Binary(op, left, right) = &cond.kind
            && let Some(negated) = op.negated()
        {
            let (_, right) = self.comparison(left, right);
            self.unbind(right);
            let op = if on_true { *op } else { negated };
            self.emit(format_args!("j{} {}", condition(op), label));
            return;
        }

        let value = self.expr(cond);
        self.compare_zero(value);
        self.emit(format_args!("{} {}", if on_true { "jne" } else { "je" }, label));
    }
}
