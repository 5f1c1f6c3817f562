//! Typed view of the parser's AST.
//!
//! ASTs arrive as JSON objects whose `type` field names the node kind.
//! Deserializing into closed enums means every downstream walk is an
//! exhaustive match; an unknown node kind fails at the boundary instead
//! of deep inside generation.

use crate::lang::value::Value;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    pub fn from_json(source: &str) -> Result<Program, serde_json::Error> {
        serde_json::from_str(source)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Stmt {
    VariableDeclaration {
        name: String,
        #[serde(default)]
        value: Option<Expr>,
        #[serde(default)]
        line: usize,
    },
    Assignment {
        name: String,
        #[serde(default)]
        value: Option<Expr>,
        #[serde(default)]
        line: usize,
    },
    ReturnStatement {
        #[serde(default)]
        value: Option<Expr>,
        #[serde(default)]
        line: usize,
    },
    ExpressionStatement {
        expression: Expr,
        #[serde(default)]
        line: usize,
    },
    IfStatement {
        condition: Expr,
        #[serde(default)]
        body: Vec<Stmt>,
        #[serde(default)]
        else_body: Vec<Stmt>,
        #[serde(default)]
        line: usize,
    },
    FunctionDefinition {
        name: String,
        #[serde(default)]
        parameters: Vec<Parameter>,
        #[serde(default)]
        body: Vec<Stmt>,
        #[serde(default)]
        line: usize,
    },
    // Recognized but not generatable; kept as node kinds so they surface
    // as typed unsupported-construct errors rather than parse failures.
    ForStatement,
    WhileStatement,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expr {
    Literal {
        #[serde(deserialize_with = "crate::lang::value::from_json")]
        value: Value,
        #[serde(default)]
        line: usize,
    },
    Identifier {
        name: String,
        #[serde(default)]
        line: usize,
    },
    BinaryExpression {
        left: Box<Expr>,
        operator: String,
        right: Box<Expr>,
        #[serde(default)]
        line: usize,
    },
    ArrayLiteral {
        #[serde(default)]
        elements: Vec<Expr>,
        #[serde(default)]
        line: usize,
    },
    FunctionCall {
        #[serde(default)]
        function: String,
        #[serde(default)]
        line: usize,
    },
}
