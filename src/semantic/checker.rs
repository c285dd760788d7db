//! Semantic checker.
//!
//! The grammar driver calls into the [`Checker`] in source order with operand
//! trees that have already been checked. Each operation validates its operands,
//! inserts the implicit conversions, and returns a new node. Failures are
//! reported to the [`DiagnosticEngine`] and produce an error-typed node; an
//! error-typed operand propagates silently so one mistake is reported once.

use log::debug;
use thin_vec::ThinVec;

use crate::ast::literal::decoded_string_length;
use crate::ast::{BinaryOp, Block, Expr, ExprKind, Function, IntegerLiteral, NameId, Stmt, UnaryOp};
use crate::diagnostic::DiagnosticEngine;
use crate::semantic::conversions::{convert, extend, promote};
use crate::semantic::{ScopeId, SemanticError, Symbol, SymbolRef, SymbolTable};
use crate::types::{Specifier, Type};

/// A scalar with at least one level of indirection.
fn is_data_pointer(ty: &Type) -> bool {
    ty.is_scalar() && ty.indirection() > 0
}

/// Semantic checker state: the scope chain, the diagnostic sink, and the
/// return type of the function whose body is being checked.
#[derive(Debug, Default)]
pub struct Checker {
    symbols: SymbolTable,
    diagnostics: DiagnosticEngine,
    return_type: Option<Type>,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    pub fn diagnostics(&self) -> &DiagnosticEngine {
        &self.diagnostics
    }

    /// Source line attached to subsequent diagnostics.
    pub fn set_line(&mut self, line: u32) {
        self.diagnostics.set_line(line);
    }

    pub fn into_parts(self) -> (SymbolTable, DiagnosticEngine) {
        (self.symbols, self.diagnostics)
    }

    fn report(&mut self, error: SemanticError) {
        self.diagnostics.report_error(error);
    }

    // --- Scopes and declarations ---

    pub fn open_scope(&mut self) -> ScopeId {
        self.symbols.open_scope()
    }

    pub fn close_scope(&mut self) -> Option<ScopeId> {
        self.symbols.close_scope()
    }

    fn outermost(&mut self) -> ScopeId {
        match self.symbols.outermost_scope() {
            Some(scope) => scope,
            None => self.symbols.open_scope(),
        }
    }

    /// Define a function in the outermost scope. The definition always
    /// replaces any earlier declaration or definition.
    pub fn define_function(&mut self, name: NameId, ty: Type) -> SymbolRef {
        let outermost = self.outermost();
        self.return_type = Some(ty.result());

        match self.symbols.find_in(outermost, name) {
            Some(existing) => {
                let prior = &self.symbols.symbol(existing).ty;
                if prior.is_function() && prior.parameters().is_some() {
                    self.report(SemanticError::Redefinition(name));
                } else if *prior != ty {
                    self.report(SemanticError::ConflictingTypes(name));
                }
                self.symbols.replace_in(outermost, Symbol::new(name, ty))
            }
            None => self.symbols.insert_in(outermost, Symbol::new(name, ty)),
        }
    }

    /// Declare a function in the outermost scope. A redeclaration is
    /// discarded.
    pub fn declare_function(&mut self, name: NameId, ty: Type) -> SymbolRef {
        let outermost = self.outermost();

        match self.symbols.find_in(outermost, name) {
            Some(existing) => {
                if self.symbols.symbol(existing).ty != ty {
                    self.report(SemanticError::ConflictingTypes(name));
                }
                existing
            }
            None => self.symbols.insert_in(outermost, Symbol::new(name, ty)),
        }
    }

    /// Declare a variable in the current scope. A redeclaration is discarded.
    pub fn declare_variable(&mut self, name: NameId, ty: Type) -> SymbolRef {
        match self.symbols.find(name) {
            Some(existing) => {
                if !self.symbols.at_outermost() {
                    self.report(SemanticError::Redeclaration(name));
                } else if self.symbols.symbol(existing).ty != ty {
                    self.report(SemanticError::ConflictingTypes(name));
                }
                existing
            }
            None => self.symbols.insert(Symbol::new(name, ty)),
        }
    }

    /// Resolve a name. An undeclared name is reported once and bound to the
    /// error type in the current scope.
    pub fn check_identifier(&mut self, name: NameId) -> SymbolRef {
        match self.symbols.lookup(name) {
            Some(symbol) => symbol,
            None => {
                self.report(SemanticError::Undeclared(name));
                self.symbols.insert(Symbol::new(name, Type::error()))
            }
        }
    }

    // --- Primary expressions ---

    /// A use of `symbol`. Only scalars are lvalues.
    pub fn identifier(&self, symbol: SymbolRef) -> Expr {
        let ty = self.symbols.symbol(symbol).ty.clone();
        let lvalue = ty.is_scalar();
        Expr::new(ExprKind::Identifier(symbol), ty).with_lvalue(lvalue)
    }

    pub fn number(&self, literal: IntegerLiteral) -> Expr {
        let ty = if literal.is_long() { Type::long() } else { Type::int() };
        Expr::number(literal.value, ty)
    }

    /// A string literal as written, quotes included.
    pub fn string(&self, text: &str) -> Expr {
        let length = decoded_string_length(text) + 1;
        Expr::new(
            ExprKind::String(text.to_string()),
            Type::array(Specifier::Char, 0, length),
        )
    }

    // --- Postfix expressions ---

    /// Check a call: the callee must be a function and the arguments must
    /// convert to a specified parameter list. An unspecified list only
    /// promotes the arguments.
    pub fn check_call(&mut self, callee: SymbolRef, mut args: ThinVec<Expr>) -> Expr {
        let ty = self.symbols.symbol(callee).ty.clone();
        let mut result = Type::error();

        if !ty.is_error() {
            if !ty.is_function() {
                self.report(SemanticError::NotAFunction);
            } else if let Some(params) = ty.parameters() {
                if params.len() != args.len() {
                    self.report(SemanticError::InvalidArguments);
                } else if args.iter_mut().zip(params.iter()).all(|(arg, param)| convert(arg, param) == *param) {
                    result = ty.result();
                } else {
                    self.report(SemanticError::InvalidArguments);
                }
            } else {
                for arg in args.iter_mut() {
                    promote(arg);
                }
                result = ty.result();
            }
        }

        Expr::new(ExprKind::Call { callee, args }, result)
    }

    /// Check `left[right]`, rewritten as `*(left + right * sizeof *left)`.
    pub fn check_index(&mut self, mut left: Expr, mut right: Expr) -> Expr {
        let t1 = promote(&mut left);
        let t2 = extend(&mut right, &Type::long());
        let mut result = Type::error();

        if !t1.is_error() && !t2.is_error() {
            if is_data_pointer(&t1) && t2 == Type::long() {
                result = t1.deref();
                right = scale(right, &t1);
            } else {
                self.report(SemanticError::InvalidBinaryOperands("[]"));
            }
        }

        let sum = Expr::binary(BinaryOp::Add, left, right, t1);
        Expr::unary(UnaryOp::Deref, sum, result).with_lvalue(true)
    }

    // --- Unary expressions ---

    pub fn check_not(&mut self, mut expr: Expr) -> Expr {
        let t = promote(&mut expr);
        let mut result = Type::error();

        if !t.is_error() {
            if t.is_logical() {
                result = Type::int();
            } else {
                self.report(SemanticError::InvalidUnaryOperand(UnaryOp::LogicNot.as_str()));
            }
        }

        Expr::unary(UnaryOp::LogicNot, expr, result)
    }

    pub fn check_negate(&mut self, mut expr: Expr) -> Expr {
        let t = promote(&mut expr);
        let mut result = Type::error();

        if !t.is_error() {
            if t.is_numeric() {
                result = t;
            } else {
                self.report(SemanticError::InvalidUnaryOperand(UnaryOp::Minus.as_str()));
            }
        }

        Expr::unary(UnaryOp::Minus, expr, result)
    }

    /// `*expr`: the operand must be a pointer; the result is an lvalue.
    pub fn check_dereference(&mut self, mut expr: Expr) -> Expr {
        let t = promote(&mut expr);
        let mut result = Type::error();

        if !t.is_error() {
            if is_data_pointer(&t) {
                result = t.deref();
            } else {
                self.report(SemanticError::InvalidUnaryOperand(UnaryOp::Deref.as_str()));
            }
        }

        Expr::unary(UnaryOp::Deref, expr, result).with_lvalue(true)
    }

    /// `&expr`: the operand must be an lvalue.
    pub fn check_address(&mut self, expr: Expr) -> Expr {
        let t = expr.ty.clone();
        let mut result = Type::error();

        if !t.is_error() {
            if expr.lvalue {
                result = t.pointer_to();
            } else {
                self.report(SemanticError::LvalueRequired);
            }
        }

        Expr::unary(UnaryOp::AddrOf, expr, result)
    }

    /// `sizeof expr` folds to an `int` constant. Functions have no size.
    pub fn check_sizeof(&mut self, expr: Expr) -> Expr {
        if expr.ty.is_function() {
            self.report(SemanticError::InvalidSizeof);
        }

        Expr::number(expr.ty.size() as i64, Type::int())
    }

    /// `(ty) expr`: numeric to numeric, pointer to pointer, and pointer to or
    /// from `long`.
    pub fn check_cast(&mut self, ty: Type, mut expr: Expr) -> Expr {
        let t = expr.ty.promote();

        if t.is_error() {
            return expr;
        }

        let result = if ty.is_numeric() && t.is_numeric() {
            convert(&mut expr, &ty)
        } else if (is_data_pointer(&ty) && (is_data_pointer(&t) || t == Type::long()))
            || (is_data_pointer(&t) && ty == Type::long())
        {
            promote(&mut expr)
        } else {
            self.report(SemanticError::InvalidCast);
            return Expr::cast(expr, Type::error());
        };

        if result != ty {
            debug!("casting {} to {}", result, ty);
            Expr::cast(expr, ty)
        } else {
            expr
        }
    }

    // --- Binary expressions ---

    /// Check any binary operator by dispatching on `op`.
    pub fn check_binary(&mut self, op: BinaryOp, left: Expr, right: Expr) -> Expr {
        match op {
            BinaryOp::Add => self.check_add(left, right),
            BinaryOp::Sub => self.check_subtract(left, right),
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => self.check_multiplicative(op, left, right),
            BinaryOp::LogicAnd | BinaryOp::LogicOr => self.check_logical(op, left, right),
            _ => self.check_compare(op, left, right),
        }
    }

    /// `*`, `/`, `%`: numeric operands only.
    pub fn check_multiplicative(&mut self, op: BinaryOp, mut left: Expr, mut right: Expr) -> Expr {
        let t1 = extend(&mut left, &right.ty);
        let t2 = extend(&mut right, &left.ty);
        let mut result = Type::error();

        if !t1.is_error() && !t2.is_error() {
            if t1.is_numeric() && t2.is_numeric() {
                result = t1;
            } else {
                self.report(SemanticError::InvalidBinaryOperands(op.as_str()));
            }
        }

        Expr::binary(op, left, right, result)
    }

    pub fn check_multiply(&mut self, left: Expr, right: Expr) -> Expr {
        self.check_multiplicative(BinaryOp::Mul, left, right)
    }

    pub fn check_divide(&mut self, left: Expr, right: Expr) -> Expr {
        self.check_multiplicative(BinaryOp::Div, left, right)
    }

    pub fn check_remainder(&mut self, left: Expr, right: Expr) -> Expr {
        self.check_multiplicative(BinaryOp::Mod, left, right)
    }

    /// `+`: numbers widen to the larger operand; a pointer plus a number keeps
    /// the pointer type with the number scaled by the pointee size.
    pub fn check_add(&mut self, mut left: Expr, mut right: Expr) -> Expr {
        let (t1, t2) = (left.ty.promote(), right.ty.promote());
        let mut result = Type::error();

        if !t1.is_error() && !t2.is_error() {
            if t1.is_numeric() && t2.is_numeric() {
                let t1 = extend(&mut left, &right.ty);
                extend(&mut right, &t1);
                result = t1;
            } else if is_data_pointer(&t1) && t2.is_numeric() {
                let pointer = promote(&mut left);
                extend(&mut right, &Type::long());
                right = scale(right, &pointer);
                result = pointer;
            } else if t1.is_numeric() && is_data_pointer(&t2) {
                extend(&mut left, &Type::long());
                let pointer = promote(&mut right);
                left = scale(left, &pointer);
                result = pointer;
            } else {
                self.report(SemanticError::InvalidBinaryOperands(BinaryOp::Add.as_str()));
            }
        }

        Expr::binary(BinaryOp::Add, left, right, result)
    }

    /// `-`: as `+` for numbers and pointer minus number; two pointers to the
    /// same type give the element distance as a `long`.
    pub fn check_subtract(&mut self, mut left: Expr, mut right: Expr) -> Expr {
        let (t1, t2) = (left.ty.promote(), right.ty.promote());
        let mut result = Type::error();

        if !t1.is_error() && !t2.is_error() {
            if t1.is_numeric() && t2.is_numeric() {
                let t1 = extend(&mut left, &right.ty);
                extend(&mut right, &t1);
                result = t1;
            } else if is_data_pointer(&t1) && t1 == t2 {
                promote(&mut left);
                promote(&mut right);
                let size = t1.deref().size() as i64;
                let difference = Expr::binary(BinaryOp::Sub, left, right, Type::long());
                return Expr::binary(BinaryOp::Div, difference, Expr::number(size, Type::long()), Type::long());
            } else if is_data_pointer(&t1) && t2.is_numeric() {
                let pointer = promote(&mut left);
                extend(&mut right, &Type::long());
                right = scale(right, &pointer);
                result = pointer;
            } else {
                self.report(SemanticError::InvalidBinaryOperands(BinaryOp::Sub.as_str()));
            }
        }

        Expr::binary(BinaryOp::Sub, left, right, result)
    }

    /// Equality and relational operators: operands extended toward each other
    /// must be compatible; the result is `int`.
    pub fn check_compare(&mut self, op: BinaryOp, mut left: Expr, mut right: Expr) -> Expr {
        let t1 = extend(&mut left, &right.ty);
        let t2 = extend(&mut right, &left.ty);
        let mut result = Type::error();

        if !t1.is_error() && !t2.is_error() {
            if t1.is_compatible_with(&t2) {
                result = Type::int();
            } else {
                self.report(SemanticError::InvalidBinaryOperands(op.as_str()));
            }
        }

        Expr::binary(op, left, right, result)
    }

    pub fn check_equal(&mut self, left: Expr, right: Expr) -> Expr {
        self.check_compare(BinaryOp::Equal, left, right)
    }

    pub fn check_not_equal(&mut self, left: Expr, right: Expr) -> Expr {
        self.check_compare(BinaryOp::NotEqual, left, right)
    }

    pub fn check_less_than(&mut self, left: Expr, right: Expr) -> Expr {
        self.check_compare(BinaryOp::Less, left, right)
    }

    pub fn check_greater_than(&mut self, left: Expr, right: Expr) -> Expr {
        self.check_compare(BinaryOp::Greater, left, right)
    }

    pub fn check_less_or_equal(&mut self, left: Expr, right: Expr) -> Expr {
        self.check_compare(BinaryOp::LessEqual, left, right)
    }

    pub fn check_greater_or_equal(&mut self, left: Expr, right: Expr) -> Expr {
        self.check_compare(BinaryOp::GreaterEqual, left, right)
    }

    /// `&&` and `||`: both operands logical after promotion.
    pub fn check_logical(&mut self, op: BinaryOp, mut left: Expr, mut right: Expr) -> Expr {
        let t1 = promote(&mut left);
        let t2 = promote(&mut right);
        let mut result = Type::error();

        if !t1.is_error() && !t2.is_error() {
            if t1.is_logical() && t2.is_logical() {
                result = Type::int();
            } else {
                self.report(SemanticError::InvalidBinaryOperands(op.as_str()));
            }
        }

        Expr::binary(op, left, right, result)
    }

    pub fn check_logical_and(&mut self, left: Expr, right: Expr) -> Expr {
        self.check_logical(BinaryOp::LogicAnd, left, right)
    }

    pub fn check_logical_or(&mut self, left: Expr, right: Expr) -> Expr {
        self.check_logical(BinaryOp::LogicOr, left, right)
    }

    // --- Statements ---

    /// `left = right`: the left side must be an lvalue and the converted
    /// right side compatible with it.
    pub fn check_assignment(&mut self, left: Expr, mut right: Expr) -> Stmt {
        let t1 = left.ty.clone();
        let t2 = convert(&mut right, &t1);

        if !t1.is_error() && !t2.is_error() {
            if !left.lvalue {
                self.report(SemanticError::LvalueRequired);
            } else if !t1.is_compatible_with(&t2) {
                self.report(SemanticError::InvalidBinaryOperands("="));
            }
        }

        Stmt::Assign(left, right)
    }

    /// `return expr` against the enclosing function's declared type.
    pub fn check_return(&mut self, mut expr: Expr) -> Stmt {
        let expected = self.return_type.clone().unwrap_or_default();
        let t = convert(&mut expr, &expected);

        if !t.is_error() && !expected.is_error() && !t.is_compatible_with(&expected) {
            self.report(SemanticError::InvalidReturnType);
        }

        Stmt::Return(expr)
    }

    /// The controlling expression of `if` or `while`.
    pub fn check_test(&mut self, mut expr: Expr) -> Expr {
        let t = promote(&mut expr);

        if !t.is_error() && !t.is_logical() {
            self.report(SemanticError::InvalidTestExpression);
        }

        expr
    }

    pub fn check_while(&mut self, cond: Expr, body: Stmt) -> Stmt {
        let cond = self.check_test(cond);
        Stmt::While(cond, Box::new(body))
    }

    pub fn check_if(&mut self, cond: Expr, then_stmt: Stmt, else_stmt: Option<Stmt>) -> Stmt {
        let cond = self.check_test(cond);
        Stmt::If(cond, Box::new(then_stmt), else_stmt.map(Box::new))
    }

    pub fn block(&self, scope: ScopeId, stmts: ThinVec<Stmt>) -> Block {
        Block { scope, stmts }
    }

    /// Finish the function whose body was just closed.
    pub fn function(&mut self, symbol: SymbolRef, body: Block) -> Function {
        self.return_type = None;
        Function { symbol, body }
    }
}

/// Multiply a `long` operand by the size of what `pointer` points to.
fn scale(operand: Expr, pointer: &Type) -> Expr {
    let size = pointer.deref().size() as i64;
    Expr::binary(BinaryOp::Mul, operand, Expr::number(size, Type::long()), Type::long())
}
