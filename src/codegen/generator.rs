//! Generation context: output buffers, value locations, the register pool,
//! stack temporaries and labels for one compilation.

use std::fmt;

use log::{debug, trace};

use crate::ast::Function;
use crate::codegen::label::Label;
use crate::codegen::registers::{ARG_REGISTERS, Reg, RegisterPool, suffix};
use crate::codegen::storage::FrameLayout;
use crate::codegen::target::{NUM_ARGS_IN_REGS, Target, align_frame};
use crate::semantic::SymbolTable;

/// Handle of a computed value within the current function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(usize);

/// Where a value currently lives.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Immediate(i64),
    Memory(String),
    Register(Reg),
}

#[derive(Debug, Clone)]
pub struct Value {
    pub location: Location,
    pub size: u64,
}

/// Code generator state. Assembly for the function being generated goes to
/// `body` first so the prologue can reserve the final frame size.
pub struct Generator<'a> {
    pub(crate) symbols: &'a SymbolTable,
    pub(crate) target: Target,
    annotate: bool,
    output: String,
    body: String,
    values: Vec<Value>,
    pool: RegisterPool,
    temp_offset: i64,
    next_label: u32,
    strings: Vec<(Label, String)>,
    pub(crate) return_label: Option<Label>,
}

impl<'a> Generator<'a> {
    pub fn new(symbols: &'a SymbolTable, target: Target, annotate: bool) -> Self {
        Generator {
            symbols,
            target,
            annotate,
            output: String::new(),
            body: String::new(),
            values: Vec::new(),
            pool: RegisterPool::default(),
            temp_offset: 0,
            next_label: 0,
            strings: Vec::new(),
            return_label: None,
        }
    }

    // --- Emission ---

    pub(crate) fn emit(&mut self, instruction: impl fmt::Display) {
        let line = format!("    {}\n", instruction);
        trace!("emit: {}", line.trim_end());
        self.body.push_str(&line);
    }

    pub(crate) fn emit_label(&mut self, label: Label) {
        trace!("emit: {}:", label);
        self.body.push_str(&format!("{}:\n", label));
    }

    /// A `# note` line, written only when annotation is enabled.
    pub(crate) fn annotate(&mut self, note: &str) {
        if self.annotate {
            self.body.push_str(&format!("    # {}\n", note));
        }
    }

    pub(crate) fn new_label(&mut self) -> Label {
        let label = Label::new(self.target.label_prefix, self.next_label);
        self.next_label += 1;
        label
    }

    pub(crate) fn global_name(&self, name: impl fmt::Display) -> String {
        format!("{}{}", self.target.global_prefix, name)
    }

    /// Record a string literal and return the label it will be emitted under.
    pub(crate) fn intern_string(&mut self, text: &str) -> Label {
        let label = self.new_label();
        self.strings.push((label, text.to_string()));
        label
    }

    // --- Values ---

    pub(crate) fn value(&mut self, location: Location, size: u64) -> ValueId {
        let id = ValueId(self.values.len());
        if let Location::Register(reg) = location {
            self.pool.bind(reg, Some(id));
        }
        self.values.push(Value { location, size });
        id
    }

    pub(crate) fn size_of(&self, value: ValueId) -> u64 {
        self.values[value.0].size
    }

    pub(crate) fn register_of(&self, value: ValueId) -> Option<Reg> {
        match self.values[value.0].location {
            Location::Register(reg) => Some(reg),
            _ => None,
        }
    }

    pub(crate) fn is_immediate(&self, value: ValueId) -> bool {
        matches!(self.values[value.0].location, Location::Immediate(_))
    }

    /// Operand text of a value at its own size.
    pub(crate) fn operand(&self, value: ValueId) -> String {
        let value = &self.values[value.0];
        match &value.location {
            Location::Immediate(n) => format!("${}", n),
            Location::Memory(text) => text.clone(),
            Location::Register(reg) => reg.name(value.size).to_string(),
        }
    }

    // --- Register pool ---

    /// Bind `value` to `reg` without emitting code. `reg` must be free.
    pub(crate) fn assign(&mut self, value: ValueId, reg: Reg) {
        self.unbind(value);
        self.pool.bind(reg, Some(value));
        self.values[value.0].location = Location::Register(reg);
    }

    /// Forget `value`'s register; the value is dead.
    pub(crate) fn unbind(&mut self, value: ValueId) {
        if let Some(reg) = self.register_of(value)
            && self.pool.occupant(reg) == Some(value)
        {
            self.pool.bind(reg, None);
        }
    }

    /// A fresh stack temporary of `size` bytes, aligned to its size.
    fn temporary(&mut self, size: u64) -> String {
        let size = size.max(1) as i64;
        self.temp_offset -= size;
        self.temp_offset -= self.temp_offset.rem_euclid(size);
        format!("{}(%rbp)", self.temp_offset)
    }

    /// Write the occupant of `reg`, if any, to a fresh temporary.
    pub(crate) fn evict(&mut self, reg: Reg) {
        if let Some(occupant) = self.pool.occupant(reg) {
            let size = self.size_of(occupant);
            let slot = self.temporary(size);
            debug!("spilling {} to {}", reg.name(size), slot);
            self.emit(format_args!("mov{} {}, {}", suffix(size), reg.name(size), slot));
            self.annotate("spill");
            self.values[occupant.0].location = Location::Memory(slot);
            self.pool.bind(reg, None);
        }
    }

    /// A free register, spilling the first eligible occupant when none is.
    pub(crate) fn getreg(&mut self, exclude: &[Reg]) -> Reg {
        if let Some(reg) = self.pool.free(exclude) {
            return reg;
        }

        let victim = self
            .pool
            .occupied()
            .map(|(reg, _)| reg)
            .find(|reg| !exclude.contains(reg))
            .unwrap_or(Reg::Rax);
        self.evict(victim);
        victim
    }

    /// Move `value` into `reg`, evicting whatever else is there.
    pub(crate) fn load(&mut self, value: ValueId, reg: Reg) {
        if self.pool.occupant(reg) == Some(value) {
            return;
        }

        self.evict(reg);
        let size = self.size_of(value);
        let source = self.operand(value);
        self.emit(format_args!("mov{} {}, {}", suffix(size), source, reg.name(size)));
        self.assign(value, reg);
    }

    /// Make sure `value` is in some register and return it.
    pub(crate) fn in_register(&mut self, value: ValueId, exclude: &[Reg]) -> Reg {
        match self.register_of(value) {
            Some(reg) if !exclude.contains(&reg) => reg,
            _ => {
                let reg = self.getreg(exclude);
                self.load(value, reg);
                reg
            }
        }
    }

    /// Spill every live register, before a call or a branch that joins.
    pub(crate) fn spill_all(&mut self) {
        let occupied: Vec<Reg> = self.pool.occupied().map(|(reg, _)| reg).collect();
        for reg in occupied {
            self.evict(reg);
        }
    }

    /// Forget all bindings at a statement boundary.
    pub(crate) fn release(&mut self) {
        self.pool.clear();
    }

    // --- Functions and the data section ---

    /// Generate one function whose storage has already been allocated.
    pub fn function(&mut self, function: &Function, layout: &FrameLayout) {
        let symbols = self.symbols;
        let symbol = symbols.symbol(function.symbol);
        let name = self.global_name(symbol.name);
        let params = symbol.ty.parameters().map_or(0, |params| params.len());
        debug!("generating function '{}'", symbol.name);

        self.values.clear();
        self.pool.clear();
        self.body.clear();
        self.temp_offset = -layout.displacement;
        let return_label = self.new_label();
        self.return_label = Some(return_label);

        self.block(&function.body);

        let frame = align_frame(-self.temp_offset);
        debug!("function '{}' frame size {}", symbol.name, frame);

        self.output.push_str(&format!("    .globl {}\n", name));
        self.output.push_str(&format!("{}:\n", name));
        self.output.push_str("    pushq %rbp\n");
        self.output.push_str("    movq %rsp, %rbp\n");
        if frame > 0 {
            self.output.push_str(&format!("    subq ${}, %rsp\n", frame));
        }

        let spilled = symbols.symbols(function.body.scope).take(params.min(NUM_ARGS_IN_REGS));
        for (entry, reg) in spilled.zip(ARG_REGISTERS) {
            let param = symbols.symbol(entry);
            let size = param.ty.size();
            let offset = param.offset.unwrap_or_default();
            self.output
                .push_str(&format!("    mov{} {}, {}(%rbp)\n", suffix(size), reg.name(size), offset));
        }

        let body = std::mem::take(&mut self.body);
        self.output.push_str(&body);
        self.output.push_str(&format!("{}:\n", return_label));
        self.output.push_str("    movq %rbp, %rsp\n");
        self.output.push_str("    popq %rbp\n");
        self.output.push_str("    ret\n\n");
        self.return_label = None;
    }

    /// Append `.comm` storage for file-level variables, then the collected
    /// string literals, and return the whole assembly text.
    pub fn finish(mut self) -> String {
        let symbols = self.symbols;
        if let Some(outermost) = symbols.outermost_scope() {
            for entry in symbols.symbols(outermost) {
                let symbol = symbols.symbol(entry);
                if symbol.ty.is_function() || symbol.ty.is_error() {
                    continue;
                }
                let line = format!("    .comm {}, {}\n", self.global_name(symbol.name), symbol.ty.size());
                self.output.push_str(&line);
            }
        }

        if !self.strings.is_empty() {
            self.output.push_str("    .data\n");
            for (label, text) in std::mem::take(&mut self.strings) {
                self.output.push_str(&format!("{}: .asciz {}\n", label, text));
            }
        }

        self.output
    }
}
