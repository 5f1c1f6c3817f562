use crate::bytecode::container::BytecodeContainer;

/// Render a container in the listing format used by `--dis`: the pools
/// with their indices, the entry point, then the numbered instructions.
pub fn disassemble(bc: &BytecodeContainer) -> String {
    let mut out = String::new();

    out.push_str(&format!("Constants ({}):\n", bc.constants.len()));
    for (i, constant) in bc.constants.iter().enumerate() {
        out.push_str(&format!("  {}: {}\n", i, constant.repr()));
    }

    out.push_str(&format!("\nNames ({}):\n", bc.names.len()));
    for (i, name) in bc.names.iter().enumerate() {
        out.push_str(&format!("  {}: {}\n", i, name));
    }

    out.push_str(&format!("\nFunctions ({}):\n", bc.functions.len()));
    for name in &bc.functions {
        out.push_str(&format!("  {}\n", name));
    }

    out.push_str(&format!("\nEntry point: {}\n", bc.entry_point));

    out.push_str(&format!("\nInstructions ({}):\n", bc.instructions.len()));
    for (i, instruction) in bc.instructions.iter().enumerate() {
        out.push_str(&format!("  {:3}: {}\n", i, instruction.op));
    }

    out
}
