use serde::{Deserialize, Serialize};

/// Comparison selector carried by `CompareOp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl CmpOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Gt => ">",
            CmpOp::Le => "<=",
            CmpOp::Ge => ">=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<CmpOp> {
        let op = match symbol {
            "==" => CmpOp::Eq,
            "!=" => CmpOp::Ne,
            "<" => CmpOp::Lt,
            ">" => CmpOp::Gt,
            "<=" => CmpOp::Le,
            ">=" => CmpOp::Ge,
            _ => return None,
        };
        Some(op)
    }
}

// =============================================================================
// OP - Bytecode instructions
// =============================================================================

/// Operands live in the variant payload: pool indices for loads and
/// stores, instruction indices for jumps, an element count for lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Op {
    /// Push `constants[i]`.
    LoadConst(usize),
    /// Discard the top of the stack.
    PopTop,
    /// Pop and bind to `names[i]`.
    StoreName(usize),
    /// Push the value bound to `names[i]`.
    LoadName(usize),

    // arithmetic, all ( a b -- result )
    BinaryAdd,
    BinarySubtract,
    BinaryMultiply,
    BinaryDivide,
    BinaryModulo,

    /// Pop two, push the comparison result as a bool.
    CompareOp(CmpOp),

    /// Set the instruction pointer.
    JumpAbsolute(usize),
    /// Pop; set the instruction pointer when the value is falsy.
    PopJumpIfFalse(usize),

    /// Halt; the top of the stack (unpopped) becomes the result.
    ReturnValue,
    /// Pop `n` values, push them as one list in stack order.
    BuildList(usize),
}

impl Op {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Op::LoadConst(_) => "LOAD_CONST",
            Op::PopTop => "POP_TOP",
            Op::StoreName(_) => "STORE_NAME",
            Op::LoadName(_) => "LOAD_NAME",
            Op::BinaryAdd => "BINARY_ADD",
            Op::BinarySubtract => "BINARY_SUBTRACT",
            Op::BinaryMultiply => "BINARY_MULTIPLY",
            Op::BinaryDivide => "BINARY_DIVIDE",
            Op::BinaryModulo => "BINARY_MODULO",
            Op::CompareOp(_) => "COMPARE_OP",
            Op::JumpAbsolute(_) => "JUMP_ABSOLUTE",
            Op::PopJumpIfFalse(_) => "POP_JUMP_IF_FALSE",
            Op::ReturnValue => "RETURN_VALUE",
            Op::BuildList(_) => "BUILD_LIST",
        }
    }

    /// Rendered operand, if the opcode carries one.
    pub fn operand(&self) -> Option<String> {
        match self {
            Op::LoadConst(i)
            | Op::StoreName(i)
            | Op::LoadName(i)
            | Op::JumpAbsolute(i)
            | Op::PopJumpIfFalse(i)
            | Op::BuildList(i) => Some(i.to_string()),
            Op::CompareOp(cmp) => Some(cmp.symbol().to_string()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.operand() {
            Some(operand) => write!(f, "{} {}", self.mnemonic(), operand),
            None => f.write_str(self.mnemonic()),
        }
    }
}
