//! Expression lowering.

use thin_vec::ThinVec;

use crate::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::codegen::generator::{Generator, Location, ValueId};
use crate::codegen::registers::{ARG_REGISTERS, Reg, suffix};
use crate::codegen::target::{NUM_ARGS_IN_REGS, SIZEOF_ARG};
use crate::semantic::SymbolRef;

/// `set` condition code for a comparison.
pub(crate) fn condition(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Equal => "e",
        BinaryOp::NotEqual => "ne",
        BinaryOp::Less => "l",
        BinaryOp::LessEqual => "le",
        BinaryOp::Greater => "g",
        BinaryOp::GreaterEqual => "ge",
        _ => unreachable!("{:?} is not a comparison", op),
    }
}

impl Generator<'_> {
    /// Generate `expr` and return the value holding its result.
    pub(crate) fn expr(&mut self, expr: &Expr) -> ValueId {
        let size = expr.ty.size();

        match &expr.kind {
            ExprKind::Number(value) => self.number(*value, size),
            ExprKind::String(text) => {
                let label = self.intern_string(text);
                self.value(Location::Memory(format!("{}(%rip)", label)), size)
            }
            ExprKind::Identifier(symbol) => {
                let location = self.storage_of(*symbol);
                self.value(Location::Memory(location), size)
            }
            ExprKind::Call { callee, args } => self.call(*callee, args, size),
            ExprKind::Unary(op, operand) => self.unary(*op, operand, size),
            ExprKind::Cast(operand) => self.cast(operand, size),
            ExprKind::Binary(op, left, right) => self.binary(*op, left, right, size),
        }
    }

    /// Frame-relative or `%rip`-relative location of a symbol.
    pub(crate) fn storage_of(&self, symbol: SymbolRef) -> String {
        let symbols = self.symbols;
        let symbol = symbols.symbol(symbol);
        match symbol.offset {
            Some(offset) => format!("{}(%rbp)", offset),
            None => format!("{}(%rip)", self.global_name(symbol.name)),
        }
    }

    fn number(&mut self, value: i64, size: u64) -> ValueId {
        if i32::try_from(value).is_ok() {
            return self.value(Location::Immediate(value), size);
        }

        // Only a move can carry a 64-bit immediate.
        let reg = self.getreg(&[]);
        self.emit(format_args!("movq ${}, {}", value, reg.name(8)));
        self.value(Location::Register(reg), size)
    }

    fn unary(&mut self, op: UnaryOp, operand: &Expr, size: u64) -> ValueId {
        match op {
            UnaryOp::Minus => {
                self.annotate("negate");
                let value = self.expr(operand);
                let reg = self.in_register(value, &[]);
                self.emit(format_args!("neg{} {}", suffix(size), reg.name(size)));
                self.rebind(value, reg, size)
            }
            UnaryOp::LogicNot => {
                self.annotate("not");
                let value = self.expr(operand);
                let width = self.size_of(value);
                let reg = self.in_register(value, &[]);
                self.emit(format_args!("cmp{} $0, {}", suffix(width), reg.name(width)));
                self.emit(format_args!("sete {}", reg.name(1)));
                self.emit(format_args!("movzbl {}, {}", reg.name(1), reg.name(4)));
                self.rebind(value, reg, size)
            }
            UnaryOp::Deref => {
                self.annotate("dereference");
                let pointer = self.expr(operand);
                let reg = self.in_register(pointer, &[]);
                self.emit(format_args!("mov{} ({}), {}", suffix(size), reg.name(8), reg.name(size)));
                self.rebind(pointer, reg, size)
            }
            UnaryOp::AddrOf => {
                self.annotate("address");
                self.address_of(operand)
            }
        }
    }

    /// The address of an lvalue, in a register.
    fn address_of(&mut self, operand: &Expr) -> ValueId {
        // &*p is p.
        if let ExprKind::Unary(UnaryOp::Deref, pointer) = &operand.kind {
            let value = self.expr(pointer);
            let reg = self.in_register(value, &[]);
            return self.rebind(value, reg, 8);
        }

        let value = self.expr(operand);
        let location = self.operand(value);
        let reg = self.getreg(&[]);
        self.emit(format_args!("leaq {}, {}", location, reg.name(8)));
        self.value(Location::Register(reg), 8)
    }

    fn cast(&mut self, operand: &Expr, size: u64) -> ValueId {
        let value = self.expr(operand);
        let source = self.size_of(value);

        if source == size {
            return value;
        }

        self.annotate("cast");
        let reg = self.in_register(value, &[]);
        if size > source {
            self.emit(format_args!(
                "movs{}{} {}, {}",
                suffix(source),
                suffix(size),
                reg.name(source),
                reg.name(size)
            ));
        } else {
            self.emit(format_args!("mov{} {}, {}", suffix(size), reg.name(size), reg.name(size)));
        }
        self.rebind(value, reg, size)
    }

    /// Hand `reg` from a consumed operand to a new result of `size` bytes.
    fn rebind(&mut self, consumed: ValueId, reg: Reg, size: u64) -> ValueId {
        self.unbind(consumed);
        self.value(Location::Register(reg), size)
    }

    fn binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr, size: u64) -> ValueId {
        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => self.arithmetic(op, left, right, size),
            BinaryOp::Div | BinaryOp::Mod => self.divide(op, left, right, size),
            BinaryOp::LogicAnd | BinaryOp::LogicOr => self.logical(op, left, right, size),
            _ => self.compare(op, left, right, size),
        }
    }

    fn arithmetic(&mut self, op: BinaryOp, left: &Expr, right: &Expr, size: u64) -> ValueId {
        let opcode = match op {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            _ => "imul",
        };
        self.annotate(opcode);

        let left = self.expr(left);
        let right = self.expr(right);
        let reg = self.in_register(left, &[]);
        let source = self.operand(right);

        self.emit(format_args!("{}{} {}, {}", opcode, suffix(size), source, reg.name(size)));
        self.unbind(right);
        self.rebind(left, reg, size)
    }

    /// Signed division: dividend in `%rax`, sign-extended into `%rdx`,
    /// divisor in `%rcx`. The quotient is left in `%rax`, the remainder in
    /// `%rdx`.
    fn divide(&mut self, op: BinaryOp, left: &Expr, right: &Expr, size: u64) -> ValueId {
        self.annotate(if op == BinaryOp::Div { "divide" } else { "remainder" });

        let left = self.expr(left);
        let right = self.expr(right);

        self.load(left, Reg::Rax);
        self.evict(Reg::Rdx);
        self.load(right, Reg::Rcx);

        self.emit(if size == 8 { "cqto" } else { "cltd" });
        self.emit(format_args!("idiv{} {}", suffix(size), Reg::Rcx.name(size)));

        self.unbind(right);
        self.unbind(left);
        let result = if op == BinaryOp::Div { Reg::Rax } else { Reg::Rdx };
        self.value(Location::Register(result), size)
    }

    /// Compare and materialize 0 or 1.
    fn compare(&mut self, op: BinaryOp, left: &Expr, right: &Expr, size: u64) -> ValueId {
        self.annotate(op.as_str());

        let (reg, right) = self.comparison(left, right);
        self.emit(format_args!("set{} {}", condition(op), reg.name(1)));
        self.emit(format_args!("movzbl {}, {}", reg.name(1), reg.name(4)));
        self.unbind(right);
        self.value(Location::Register(reg), size)
    }

    /// Emit `cmp right, left` with the left operand in a register. The left
    /// value is released; its register is returned with the right value.
    pub(crate) fn comparison(&mut self, left: &Expr, right: &Expr) -> (Reg, ValueId) {
        let left = self.expr(left);
        let right = self.expr(right);
        let width = self.size_of(left);
        let reg = self.in_register(left, &[]);
        let source = self.operand(right);

        self.emit(format_args!("cmp{} {}, {}", suffix(width), source, reg.name(width)));
        self.unbind(left);
        (reg, right)
    }

    /// Short-circuit `&&` and `||`: the right operand is skipped when the left
    /// one decides the result.
    fn logical(&mut self, op: BinaryOp, left: &Expr, right: &Expr, size: u64) -> ValueId {
        self.annotate(op.as_str());
        self.spill_all();
        let merge = self.new_label();

        let left = self.expr(left);
        self.compare_zero(left);
        self.emit(format_args!("{} {}", if op == BinaryOp::LogicAnd { "je" } else { "jne" }, merge));

        let right = self.expr(right);
        self.compare_zero(right);

        self.emit_label(merge);
        let reg = self.getreg(&[]);
        self.emit(format_args!("setne {}", reg.name(1)));
        self.emit(format_args!("movzbl {}, {}", reg.name(1), reg.name(4)));
        self.value(Location::Register(reg), size)
    }

    /// `cmp $0, value` with the value in a register, which is then released.
    pub(crate) fn compare_zero(&mut self, value: ValueId) {
        let width = self.size_of(value);
        let reg = self.in_register(value, &[]);
        self.emit(format_args!("cmp{} $0, {}", suffix(width), reg.name(width)));
        self.unbind(value);
    }

    /// Arguments are evaluated first, then every register is spilled since
    /// the callee may clobber them. The first six go in registers, the rest
    /// are pushed right to left with the stack kept 16-byte aligned.
    fn call(&mut self, callee: SymbolRef, args: &ThinVec<Expr>, size: u64) -> ValueId {
        let symbols = self.symbols;
        let symbol = symbols.symbol(callee);
        let name = self.global_name(symbol.name);
        let unspecified = symbol.ty.parameters().is_none();
        self.annotate("call");

        let values: Vec<ValueId> = args.iter().map(|arg| self.expr(arg)).collect();
        self.spill_all();

        let mut pushed = 0;
        let on_stack = values.len().saturating_sub(NUM_ARGS_IN_REGS) as u64;
        if on_stack % 2 == 1 {
            pushed += SIZEOF_ARG;
            self.emit(format_args!("subq ${}, %rsp", SIZEOF_ARG));
        }

        for (index, value) in values.iter().copied().enumerate().rev() {
            let width = self.size_of(value);
            let source = self.operand(value);

            if index < NUM_ARGS_IN_REGS {
                let reg = ARG_REGISTERS[index];
                self.emit(format_args!("mov{} {}, {}", suffix(width), source, reg.name(width)));
            } else {
                pushed += SIZEOF_ARG;
                if self.is_immediate(value) || width == SIZEOF_ARG {
                    self.emit(format_args!("pushq {}", source));
                } else {
                    self.emit(format_args!("mov{} {}, {}", suffix(width), source, Reg::Rax.name(width)));
                    self.emit("pushq %rax");
                }
            }
        }

        if unspecified {
            self.emit("movl $0, %eax");
        }
        self.emit(format_args!("call {}", name));

        if pushed > 0 {
            self.emit(format_args!("addq ${}, %rsp", pushed));
        }

        self.value(Location::Register(Reg::Rax), size)
    }
}
