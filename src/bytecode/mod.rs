pub mod compile_error;
pub mod container;
pub mod disasm;
pub mod generate;
pub mod op;
pub mod symbols;

pub use container::{BytecodeContainer, Instruction};
pub use op::Op;
