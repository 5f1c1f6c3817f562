use thiserror::Error;

/// The single runtime-error kind. `ip` is the index of the instruction
/// that failed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("runtime error at instruction {ip}: {message}")]
pub struct RuntimeError {
    pub message: String,
    pub ip: usize,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>, ip: usize) -> Self {
        RuntimeError {
            message: message.into(),
            ip,
        }
    }

    pub fn division_by_zero(ip: usize) -> Self {
        Self::new("Division by zero", ip)
    }

    pub fn undefined_variable(name: &str, ip: usize) -> Self {
        Self::new(format!("Variable '{}' not defined", name), ip)
    }

    pub fn underflow(mnemonic: &str, needed: usize, ip: usize) -> Self {
        Self::new(format!("Need {} operands for {}", needed, mnemonic), ip)
    }

    pub fn type_error(context: impl Into<String>, ip: usize) -> Self {
        Self::new(context, ip)
    }
}
