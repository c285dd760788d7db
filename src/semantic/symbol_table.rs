//! Symbol table management and scope handling.
//!
//! Scopes and symbols live in flat arenas and are addressed by non-zero ids.
//! A closed scope is never destroyed: the storage allocator and the code
//! generator read its symbols long after the checker has left it.

use std::num::NonZeroU32;

use indexmap::IndexMap;
use log::debug;

use crate::ast::NameId;
use crate::types::Type;

/// Reference to an entry of [`SymbolTable::entries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolRef(NonZeroU32);

impl SymbolRef {
    fn from_index(index: usize) -> Self {
        // Index 0 maps to 1; the arena never holds more than u32::MAX entries.
        SymbolRef(NonZeroU32::MIN.saturating_add(index as u32))
    }

    pub fn index(self) -> usize {
        self.0.get() as usize - 1
    }
}

/// Scope ID for efficient scope references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(NonZeroU32);

impl ScopeId {
    fn from_index(index: usize) -> Self {
        ScopeId(NonZeroU32::MIN.saturating_add(index as u32))
    }

    pub fn index(self) -> usize {
        self.0.get() as usize - 1
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// A named binding. `offset` is filled in by the storage allocator and stays
/// `None` for file-level symbols, which are addressed by name.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: NameId,
    pub ty: Type,
    pub offset: Option<i64>,
}

impl Symbol {
    pub fn new(name: NameId, ty: Type) -> Self {
        Symbol { name, ty, offset: None }
    }
}

/// Scope information
#[derive(Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    /// Symbols in declaration order.
    pub symbols: IndexMap<NameId, SymbolRef>,
    /// Scopes opened while this one was current, in opening order.
    pub children: Vec<ScopeId>,
}

/// Symbol table using flattened storage
#[derive(Debug, Default)]
pub struct SymbolTable {
    pub entries: Vec<Symbol>,
    pub scopes: Vec<Scope>,
    current: Option<ScopeId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a scope enclosed by the current one. The first call creates the
    /// outermost scope.
    pub fn open_scope(&mut self) -> ScopeId {
        let id = ScopeId::from_index(self.scopes.len());
        self.scopes.push(Scope {
            parent: self.current,
            symbols: IndexMap::new(),
            children: Vec::new(),
        });

        if let Some(parent) = self.current {
            self.scope_mut(parent).children.push(id);
        }

        self.current = Some(id);
        debug!("SymbolTable: opened scope {} (parent {:?})", id.get(), self.scope(id).parent.map(ScopeId::get));
        id
    }

    /// Pop the current scope and return it. Its symbols remain readable.
    pub fn close_scope(&mut self) -> Option<ScopeId> {
        let closed = self.current?;
        self.current = self.scope(closed).parent;
        debug!(
            "SymbolTable: closed scope {}, current is now {:?}",
            closed.get(),
            self.current.map(ScopeId::get)
        );
        Some(closed)
    }

    pub fn current_scope(&self) -> Option<ScopeId> {
        self.current
    }

    pub fn outermost_scope(&self) -> Option<ScopeId> {
        (!self.scopes.is_empty()).then(|| ScopeId::from_index(0))
    }

    /// True when the current scope is the file-level one.
    pub fn at_outermost(&self) -> bool {
        self.current.is_some_and(|id| self.scope(id).parent.is_none())
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    pub fn symbol(&self, id: SymbolRef) -> &Symbol {
        &self.entries[id.index()]
    }

    pub fn symbol_mut(&mut self, id: SymbolRef) -> &mut Symbol {
        &mut self.entries[id.index()]
    }

    /// Symbols of a scope in declaration order.
    pub fn symbols(&self, id: ScopeId) -> impl Iterator<Item = SymbolRef> + '_ {
        self.scope(id).symbols.values().copied()
    }

    /// Look a name up in the current scope only.
    pub fn find(&self, name: NameId) -> Option<SymbolRef> {
        self.find_in(self.current?, name)
    }

    pub fn find_in(&self, scope: ScopeId, name: NameId) -> Option<SymbolRef> {
        self.scope(scope).symbols.get(&name).copied()
    }

    /// Look a name up through the chain of enclosing scopes.
    pub fn lookup(&self, name: NameId) -> Option<SymbolRef> {
        let mut scope_id = self.current;
        while let Some(id) = scope_id {
            let scope = self.scope(id);
            if let Some(&entry) = scope.symbols.get(&name) {
                return Some(entry);
            }
            scope_id = scope.parent;
        }
        None
    }

    /// Add a symbol to the current scope. Uniqueness is the caller's concern;
    /// a later insert under the same name shadows the earlier one.
    pub fn insert(&mut self, symbol: Symbol) -> SymbolRef {
        // Without any open scope there is nowhere to bind the name; open the outermost one.
        let current = match self.current {
            Some(id) => id,
            None => self.open_scope(),
        };
        self.insert_in(current, symbol)
    }

    pub fn insert_in(&mut self, scope: ScopeId, symbol: Symbol) -> SymbolRef {
        let entry = SymbolRef::from_index(self.entries.len());
        let name = symbol.name;
        debug!("SymbolTable: inserting '{}' of type {} into scope {}", name, symbol.ty, scope.get());
        self.entries.push(symbol);
        self.scope_mut(scope).symbols.insert(name, entry);
        entry
    }

    /// Drop the binding for `name` in `scope` and insert `symbol` at the end
    /// of its declaration order.
    pub fn replace_in(&mut self, scope: ScopeId, symbol: Symbol) -> SymbolRef {
        let removed = self.scope_mut(scope).symbols.shift_remove(&symbol.name);
        debug!("SymbolTable: replacing '{}' (previous entry {:?})", symbol.name, removed);
        self.insert_in(scope, symbol)
    }
}
