
pub mod codegen_basics;
pub mod codegen_pointers;

pub mod driver_ast_dumper;

pub mod semantic_negative;
