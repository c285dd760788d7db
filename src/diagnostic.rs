//! Line-numbered diagnostic sink.
//!
//! The checker reports every recoverable problem here and keeps going; the
//! final error count decides whether code generation runs.

use std::fmt;

use log::debug;

use crate::semantic::SemanticError;

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

/// A single reported problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub line: u32,
    pub error: SemanticError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            DiagnosticLevel::Error => "error",
            DiagnosticLevel::Warning => "warning",
        };
        write!(f, "line {}: {}: {}", self.line, level, self.error)
    }
}

/// Diagnostic engine for collecting semantic errors
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
    diagnostics: Vec<Diagnostic>,
    line: u32,
    error_count: usize,
}

impl DiagnosticEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source line attached to subsequent reports.
    pub fn set_line(&mut self, line: u32) {
        self.line = line;
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn report_error(&mut self, error: SemanticError) {
        debug!("line {}: {}", self.line, error);
        self.error_count += 1;
        self.diagnostics.push(Diagnostic {
            level: DiagnosticLevel::Error,
            line: self.line,
            error,
        });
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Render all diagnostics, one per line.
    pub fn render(&self) -> String {
        self.diagnostics.iter().map(|d| format!("{}\n", d)).collect()
    }
}
