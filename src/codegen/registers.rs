//! The register pool.
//!
//! Each register holds at most one live value and each value sits in at most
//! one register; the binding is kept in both directions by the generator.

use crate::codegen::generator::ValueId;

/// General purpose registers available to the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg {
    Rax,
    Rdi,
    Rsi,
    Rdx,
    Rcx,
    R8,
    R9,
}

/// Allocation order.
pub const REGISTERS: [Reg; 7] = [Reg::Rax, Reg::Rdi, Reg::Rsi, Reg::Rdx, Reg::Rcx, Reg::R8, Reg::R9];

/// Integer argument registers in calling-convention order.
pub const ARG_REGISTERS: [Reg; 6] = [Reg::Rdi, Reg::Rsi, Reg::Rdx, Reg::Rcx, Reg::R8, Reg::R9];

impl Reg {
    /// Register name for an access of `size` bytes.
    pub fn name(self, size: u64) -> &'static str {
        let (quad, long, byte) = match self {
            Reg::Rax => ("%rax", "%eax", "%al"),
            Reg::Rdi => ("%rdi", "%edi", "%dil"),
            Reg::Rsi => ("%rsi", "%esi", "%sil"),
            Reg::Rdx => ("%rdx", "%edx", "%dl"),
            Reg::Rcx => ("%rcx", "%ecx", "%cl"),
            Reg::R8 => ("%r8", "%r8d", "%r8b"),
            Reg::R9 => ("%r9", "%r9d", "%r9b"),
        };
        match size {
            1 => byte,
            4 => long,
            _ => quad,
        }
    }

    fn slot(self) -> usize {
        match self {
            Reg::Rax => 0,
            Reg::Rdi => 1,
            Reg::Rsi => 2,
            Reg::Rdx => 3,
            Reg::Rcx => 4,
            Reg::R8 => 5,
            Reg::R9 => 6,
        }
    }
}

/// Instruction suffix for an operand size.
pub fn suffix(size: u64) -> &'static str {
    match size {
        1 => "b",
        4 => "l",
        _ => "q",
    }
}

/// Which value, if any, occupies each register.
#[derive(Debug, Default)]
pub struct RegisterPool {
    bindings: [Option<ValueId>; 7],
}

impl RegisterPool {
    pub fn occupant(&self, reg: Reg) -> Option<ValueId> {
        self.bindings[reg.slot()]
    }

    pub fn bind(&mut self, reg: Reg, value: Option<ValueId>) {
        self.bindings[reg.slot()] = value;
    }

    /// First unoccupied register not in `exclude`.
    pub fn free(&self, exclude: &[Reg]) -> Option<Reg> {
        REGISTERS
            .into_iter()
            .find(|reg| self.occupant(*reg).is_none() && !exclude.contains(reg))
    }

    /// Registers currently holding a value, in allocation order.
    pub fn occupied(&self) -> impl Iterator<Item = (Reg, ValueId)> + '_ {
        REGISTERS
            .into_iter()
            .filter_map(|reg| self.occupant(reg).map(|value| (reg, value)))
    }

    pub fn clear(&mut self) {
        self.bindings = [None; 7];
    }
}
