//! The translation facade used by the grammar driver.
//!
//! The driver owns tokens and grammar order. It calls the [`Checker`] through
//! [`Compiler::checker`] as it recognizes declarations, expressions and
//! statements, hands each finished function to [`Compiler::add_function`], and
//! calls [`Compiler::finish`] at end of input.

use log::debug;
use thin_vec::ThinVec;

use crate::ast::literal::parse_integer_literal;
use crate::ast::{AstDumper, Expr, Function};
use crate::codegen;
use crate::diagnostic::DiagnosticEngine;
use crate::error::CompileError;
use crate::options::CompileOptions;
use crate::semantic::Checker;

pub struct Compiler {
    checker: Checker,
    functions: ThinVec<Function>,
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        let mut checker = Checker::new();
        checker.open_scope();
        Compiler {
            checker,
            functions: ThinVec::new(),
            options,
        }
    }

    pub fn checker(&mut self) -> &mut Checker {
        &mut self.checker
    }

    pub fn diagnostics(&self) -> &DiagnosticEngine {
        self.checker.diagnostics()
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// A fatal syntax error at the current line.
    pub fn syntax_error(&self, near: &str) -> CompileError {
        CompileError::Syntax {
            line: self.checker.diagnostics().line(),
            near: near.to_string(),
        }
    }

    /// An integer literal token. Malformed digits are a syntax error.
    pub fn number(&mut self, text: &str) -> Result<Expr, CompileError> {
        match parse_integer_literal(text) {
            Some(literal) => Ok(self.checker.number(literal)),
            None => Err(self.syntax_error(text)),
        }
    }

    pub fn add_function(&mut self, function: Function) {
        self.functions.push(function);
    }

    /// Text dump of every function collected so far.
    pub fn dump(&self) -> String {
        self.functions
            .iter()
            .map(|function| AstDumper::dump_function(self.checker.symbols(), function))
            .collect()
    }

    /// Close the file scope and, if checking reported nothing, allocate
    /// storage and generate assembly.
    pub fn finish(mut self) -> Result<String, CompileError> {
        let count = self.checker.diagnostics().error_count();
        if count > 0 {
            debug!("translation finished with {} error(s)", count);
            return Err(CompileError::Semantic { count });
        }

        self.checker.close_scope();
        let (mut symbols, _) = self.checker.into_parts();
        let assembly = codegen::generate(&self.functions, &mut symbols, &self.options)?;
        Ok(assembly)
    }
}
