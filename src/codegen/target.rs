//! Target description derived from the configured triple.

use target_lexicon::{Architecture, BinaryFormat, Triple};

use crate::codegen::error::CodegenError;

/// Size of every argument slot on the stack.
pub const SIZEOF_ARG: u64 = 8;
/// Integer arguments passed in registers.
pub const NUM_ARGS_IN_REGS: usize = 6;
/// Offset of the first stack-passed argument from the frame pointer.
pub const INIT_ARG_OFFSET: i64 = 16;
/// Stack alignment required at call sites.
pub const STACK_ALIGNMENT: i64 = 16;

/// Symbol naming conventions of an x86-64 target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub global_prefix: &'static str,
    pub label_prefix: &'static str,
}

impl Target {
    pub fn from_triple(triple: &Triple) -> Result<Self, CodegenError> {
        if triple.architecture != Architecture::X86_64 {
            return Err(CodegenError::UnsupportedTarget(triple.to_string()));
        }

        Ok(match triple.binary_format {
            BinaryFormat::Macho => Target {
                global_prefix: "_",
                label_prefix: "L",
            },
            _ => Target {
                global_prefix: "",
                label_prefix: ".L",
            },
        })
    }
}

/// Round a frame displacement up to the stack alignment.
pub fn align_frame(size: i64) -> i64 {
    (size + STACK_ALIGNMENT - 1) / STACK_ALIGNMENT * STACK_ALIGNMENT
}
