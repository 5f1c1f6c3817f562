use thiserror::Error;

/// Fatal errors raised while turning an AST into bytecode. Unlike lexer
/// diagnostics these abort generation immediately.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("Invalid AST: {0}")]
    InvalidAst(String),

    #[error("Unsupported construct: {0}")]
    UnsupportedConstruct(String),

    #[error("Variable '{0}' not defined")]
    UndefinedVariable(String),

    #[error("{0} requires a value")]
    MissingValue(String),

    #[error("Unresolved label '{0}'")]
    UnresolvedLabel(String),

    /// Generator invariant violation (should not happen in normal use)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CompileError {
    pub fn invalid_ast(reason: impl std::fmt::Display) -> Self {
        CompileError::InvalidAst(reason.to_string())
    }

    pub fn unsupported(construct: impl Into<String>) -> Self {
        CompileError::UnsupportedConstruct(construct.into())
    }

    pub fn undefined_variable(name: &str) -> Self {
        CompileError::UndefinedVariable(name.to_string())
    }

    pub fn missing_value(what: &str) -> Self {
        CompileError::MissingValue(what.to_string())
    }

    pub fn unresolved_label(label: &str) -> Self {
        CompileError::UnresolvedLabel(label.to_string())
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        CompileError::Internal(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            CompileError::undefined_variable("x").to_string(),
            "Variable 'x' not defined"
        );
        assert_eq!(
            CompileError::unsupported("for_statement").to_string(),
            "Unsupported construct: for_statement"
        );
        assert_eq!(
            CompileError::missing_value("Assignment").to_string(),
            "Assignment requires a value"
        );
        assert_eq!(
            CompileError::unresolved_label("else_0").to_string(),
            "Unresolved label 'else_0'"
        );
    }
}
