//! Code generation module.
//!
//! Lowers checked functions to x86-64 assembly text:
//! - [`storage`]: frame offsets for parameters and locals
//! - [`generator`]: value locations, the register pool and spilling
//! - `expr` / `control`: per-node lowering of expressions and statements

pub mod error;
pub mod generator;
pub mod label;
pub mod registers;
pub mod storage;
pub mod target;

mod control;
mod expr;

use log::debug;

use crate::ast::Function;
use crate::options::CompileOptions;
use crate::semantic::SymbolTable;

// Re-export key types for public API
pub use error::CodegenError;
pub use generator::Generator;
pub use storage::{FrameLayout, Slot, allocate};
pub use target::Target;

/// Allocate storage for every function, then generate the whole translation
/// unit. Refuses trees that still contain error-typed nodes.
pub fn generate(
    functions: &[Function],
    symbols: &mut SymbolTable,
    options: &CompileOptions,
) -> Result<String, CodegenError> {
    let target = Target::from_triple(&options.triple)?;

    if let Some(function) = functions.iter().find(|f| f.body.contains_error()) {
        return Err(CodegenError::ErroneousTree {
            function: symbols.symbol(function.symbol).name.to_string(),
        });
    }

    let layouts: Vec<FrameLayout> = functions.iter().map(|function| allocate(symbols, function)).collect();
    debug!("allocated {} function frames", layouts.len());

    let mut generator = Generator::new(symbols, target, options.annotate);
    for (function, layout) in functions.iter().zip(&layouts) {
        generator.function(function, layout);
    }

    Ok(generator.finish())
}
