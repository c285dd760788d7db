//! Storage allocation: frame offsets for parameters and locals.
//!
//! Register-passed parameters are spilled below the frame pointer exactly like
//! locals. Stack-passed parameters sit above the saved frame pointer and return
//! address, one 8-byte slot each.

use log::debug;
use serde::Serialize;

use crate::ast::{Block, Function};
use crate::codegen::target::{INIT_ARG_OFFSET, NUM_ARGS_IN_REGS, SIZEOF_ARG, align_frame};
use crate::semantic::{ScopeId, SymbolRef, SymbolTable};

/// One allocated symbol.
#[derive(Debug, Clone, Serialize)]
pub struct Slot {
    pub name: String,
    pub ty: String,
    pub offset: i64,
}

/// The frame of one function after allocation.
#[derive(Debug, Clone, Serialize)]
pub struct FrameLayout {
    pub slots: Vec<Slot>,
    /// Total displacement below the frame pointer, before alignment.
    pub displacement: i64,
    /// `displacement` rounded up to the stack alignment.
    pub size: i64,
}

/// Assign an offset to every symbol declared in `function`, nested blocks
/// included, and return the resulting layout.
pub fn allocate(symbols: &mut SymbolTable, function: &Function) -> FrameLayout {
    let params = symbols
        .symbol(function.symbol)
        .ty
        .parameters()
        .map_or(0, |params| params.len());

    let mut allocator = Allocator {
        symbols,
        slots: Vec::new(),
        offset: 0,
    };
    allocator.function_scope(&function.body, params);

    let displacement = -allocator.offset;
    let size = align_frame(displacement);
    debug!("storage: frame of {} bytes ({} before alignment)", size, displacement);

    FrameLayout {
        slots: allocator.slots,
        displacement,
        size,
    }
}

struct Allocator<'a> {
    symbols: &'a mut SymbolTable,
    slots: Vec<Slot>,
    offset: i64,
}

impl Allocator<'_> {
    fn function_scope(&mut self, body: &Block, params: usize) {
        let entries: Vec<_> = self.symbols.symbols(body.scope).collect();

        for (index, entry) in entries.into_iter().enumerate() {
            let offset = if index < params && index >= NUM_ARGS_IN_REGS {
                INIT_ARG_OFFSET + ((index - NUM_ARGS_IN_REGS) as u64 * SIZEOF_ARG) as i64
            } else {
                self.offset -= self.symbols.symbol(entry).ty.size() as i64;
                self.offset
            };
            self.assign(entry, offset);
        }

        self.nested_scopes(body.scope);
    }

    fn nested_scopes(&mut self, scope: ScopeId) {
        let children = self.symbols.scope(scope).children.clone();

        for child in children {
            let entries: Vec<_> = self.symbols.symbols(child).collect();
            for entry in entries {
                self.offset -= self.symbols.symbol(entry).ty.size() as i64;
                self.assign(entry, self.offset);
            }
            self.nested_scopes(child);
        }
    }

    fn assign(&mut self, entry: SymbolRef, offset: i64) {
        let symbol = self.symbols.symbol_mut(entry);
        symbol.offset = Some(offset);
        debug!("storage: '{}' at {}(%rbp)", symbol.name, offset);

        self.slots.push(Slot {
            name: symbol.name.to_string(),
            ty: symbol.ty.to_string(),
            offset,
        });
    }
}
