use crate::bytecode::op::Op;
use crate::lang::value::Value;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to write '{path}': {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to encode bytecode: {0}")]
    Encode(postcard::Error),
    #[error("failed to decode bytecode: {0}")]
    Decode(postcard::Error),
    #[error("instruction {index}: {op} indexes past {pool} pool ({len} entries)")]
    InvalidOperand {
        index: usize,
        op: String,
        pool: &'static str,
        len: usize,
    },
}

/// One executable instruction plus the source line it came from
/// (0 when the AST carried no position).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub op: Op,
    pub line: usize,
}

/// A compiled Noodle program: the instruction stream plus its constant
/// and name pools, the names of the functions defined in it, and the
/// entry point label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BytecodeContainer {
    pub instructions: Vec<Instruction>,
    pub constants: Vec<Value>,
    pub names: Vec<String>,
    pub functions: Vec<String>,
    pub entry_point: String,
}

impl Default for BytecodeContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl BytecodeContainer {
    pub fn new() -> Self {
        BytecodeContainer {
            instructions: Vec::new(),
            constants: Vec::new(),
            names: Vec::new(),
            functions: Vec::new(),
            entry_point: "main".to_string(),
        }
    }

    /// Append an instruction, returning its index.
    pub fn emit(&mut self, op: Op, line: usize) -> usize {
        self.instructions.push(Instruction { op, line });
        self.instructions.len() - 1
    }

    /// Intern a constant. Equal values share one pool slot.
    pub fn add_constant(&mut self, value: Value) -> usize {
        match self.constants.iter().position(|c| *c == value) {
            Some(index) => index,
            None => {
                self.constants.push(value);
                self.constants.len() - 1
            }
        }
    }

    /// Intern a name. Equal names share one pool slot.
    pub fn add_name(&mut self, name: &str) -> usize {
        match self.names.iter().position(|n| n == name) {
            Some(index) => index,
            None => {
                self.names.push(name.to_string());
                self.names.len() - 1
            }
        }
    }

    pub fn add_function(&mut self, name: &str) {
        if !self.functions.iter().any(|f| f == name) {
            self.functions.push(name.to_string());
        }
    }

    /// Check that every pool and jump operand is in range. Jump targets
    /// may equal the instruction count; landing there halts cleanly.
    pub fn validate(&self) -> Result<(), ContainerError> {
        let end = self.instructions.len();
        for (index, instruction) in self.instructions.iter().enumerate() {
            let out_of_range = match instruction.op {
                Op::LoadConst(i) if i >= self.constants.len() => {
                    Some(("constant", self.constants.len()))
                }
                Op::StoreName(i) | Op::LoadName(i) if i >= self.names.len() => {
                    Some(("name", self.names.len()))
                }
                Op::JumpAbsolute(i) | Op::PopJumpIfFalse(i) if i > end => {
                    Some(("instruction", end))
                }
                _ => None,
            };
            if let Some((pool, len)) = out_of_range {
                return Err(ContainerError::InvalidOperand {
                    index,
                    op: instruction.op.to_string(),
                    pool,
                    len,
                });
            }
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), ContainerError> {
        let bytes = postcard::to_allocvec(self).map_err(ContainerError::Encode)?;
        fs::write(path, bytes).map_err(|source| ContainerError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ContainerError> {
        let bytes = fs::read(path).map_err(|source| ContainerError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let container: BytecodeContainer =
            postcard::from_bytes(&bytes).map_err(ContainerError::Decode)?;
        container.validate()?;
        Ok(container)
    }
}
