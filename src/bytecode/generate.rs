use crate::bytecode::compile_error::CompileError;
use crate::bytecode::container::BytecodeContainer;
use crate::bytecode::op::{CmpOp, Op};
use crate::bytecode::symbols::{LabelManager, SymbolKind, SymbolTable};
use crate::lang::ast::{Expr, Program, Stmt};
use crate::lang::value::Value;
use tracing::debug;

/// Walks a typed AST and emits a [`BytecodeContainer`].
///
/// Control flow is generated in two passes: jumps are emitted with a
/// placeholder target and a label name, label positions are recorded as
/// generation reaches them, and a final patch pass rewrites every
/// placeholder to its resolved instruction index. A label that was
/// branched to but never placed is a compile error.
pub struct Generator {
    container: BytecodeContainer,
    symbols: SymbolTable,
    labels: LabelManager,
    pending_jumps: Vec<(usize, String)>,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    pub fn new() -> Self {
        Generator {
            container: BytecodeContainer::new(),
            symbols: SymbolTable::new(),
            labels: LabelManager::new(),
            pending_jumps: Vec::new(),
        }
    }

    pub fn generate(mut self, program: &Program) -> Result<BytecodeContainer, CompileError> {
        debug!(statements = program.statements.len(), "generating bytecode");

        self.symbols.enter_scope();
        for stmt in &program.statements {
            self.gen_stmt(stmt)?;
        }

        // Programs without a return on every path still produce a result
        if !always_returns(&program.statements) {
            let none = self.container.add_constant(Value::None);
            self.container.emit(Op::LoadConst(none), 0);
            self.container.emit(Op::ReturnValue, 0);
        }
        self.symbols.exit_scope();

        self.patch_jumps()?;

        debug!(
            instructions = self.container.instructions.len(),
            constants = self.container.constants.len(),
            names = self.container.names.len(),
            "generation complete"
        );
        Ok(self.container)
    }

    fn emit_jump(&mut self, op: Op, label: &str, line: usize) {
        let index = self.container.emit(op, line);
        self.pending_jumps.push((index, label.to_string()));
    }

    fn patch_jumps(&mut self) -> Result<(), CompileError> {
        for (index, label) in self.pending_jumps.drain(..) {
            let target = self
                .labels
                .position_of(&label)
                .ok_or_else(|| CompileError::unresolved_label(&label))?;
            match &mut self.container.instructions[index].op {
                Op::JumpAbsolute(t) | Op::PopJumpIfFalse(t) => *t = target,
                other => {
                    return Err(CompileError::internal(format!(
                        "pending jump at {} points at non-jump {}",
                        index,
                        other.mnemonic()
                    )));
                }
            }
        }
        Ok(())
    }

    fn gen_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::VariableDeclaration { name, value, line } => {
                match value {
                    Some(expr) => self.gen_expr(expr)?,
                    None => {
                        let none = self.container.add_constant(Value::None);
                        self.container.emit(Op::LoadConst(none), *line);
                    }
                }
                self.symbols.add_symbol(name, SymbolKind::Variable);
                let index = self.container.add_name(name);
                self.container.emit(Op::StoreName(index), *line);
                Ok(())
            }
            Stmt::Assignment { name, value, line } => {
                let expr = value
                    .as_ref()
                    .ok_or_else(|| CompileError::missing_value("Assignment"))?;
                self.gen_expr(expr)?;
                let index = self.container.add_name(name);
                self.container.emit(Op::StoreName(index), *line);
                Ok(())
            }
            Stmt::ReturnStatement { value, line } => {
                match value {
                    Some(expr) => self.gen_expr(expr)?,
                    None => {
                        let none = self.container.add_constant(Value::None);
                        self.container.emit(Op::LoadConst(none), *line);
                    }
                }
                self.container.emit(Op::ReturnValue, *line);
                Ok(())
            }
            Stmt::ExpressionStatement { expression, line } => {
                self.gen_expr(expression)?;
                // Discard the value so statements leave the stack balanced
                self.container.emit(Op::PopTop, *line);
                Ok(())
            }
            Stmt::IfStatement {
                condition,
                body,
                else_body,
                line,
            } => self.gen_if(condition, body, else_body, *line),
            Stmt::FunctionDefinition {
                name,
                parameters,
                body,
                line,
            } => {
                self.symbols.add_symbol(name, SymbolKind::Function);
                self.container.add_function(name);

                // Bodies are generated inline for now; no callable object
                // exists until function calls are supported.
                self.symbols.enter_scope();
                for parameter in parameters {
                    self.symbols.add_symbol(&parameter.name, SymbolKind::Variable);
                }
                for stmt in body {
                    self.gen_stmt(stmt)?;
                }
                if !always_returns(body) {
                    let none = self.container.add_constant(Value::None);
                    self.container.emit(Op::LoadConst(none), *line);
                    self.container.emit(Op::ReturnValue, *line);
                }
                self.symbols.exit_scope();
                Ok(())
            }
            Stmt::ForStatement => Err(CompileError::unsupported("for_statement")),
            Stmt::WhileStatement => Err(CompileError::unsupported("while_statement")),
        }
    }

    fn gen_if(
        &mut self,
        condition: &Expr,
        body: &[Stmt],
        else_body: &[Stmt],
        line: usize,
    ) -> Result<(), CompileError> {
        let else_label = self.labels.create_label("else");
        let end_label = self.labels.create_label("end_if");

        self.gen_expr(condition)?;
        self.emit_jump(Op::PopJumpIfFalse(0), &else_label, line);

        for stmt in body {
            self.gen_stmt(stmt)?;
        }
        self.emit_jump(Op::JumpAbsolute(0), &end_label, line);

        self.labels
            .resolve(&else_label, self.container.instructions.len());
        for stmt in else_body {
            self.gen_stmt(stmt)?;
        }
        self.labels
            .resolve(&end_label, self.container.instructions.len());
        Ok(())
    }

    fn gen_expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Literal { value, line } => {
                let index = self.container.add_constant(value.clone());
                self.container.emit(Op::LoadConst(index), *line);
                Ok(())
            }
            Expr::Identifier { name, line } => {
                if !self.symbols.has_symbol(name) {
                    return Err(CompileError::undefined_variable(name));
                }
                let index = self.container.add_name(name);
                self.container.emit(Op::LoadName(index), *line);
                Ok(())
            }
            Expr::BinaryExpression {
                left,
                operator,
                right,
                line,
            } => {
                self.gen_expr(left)?;
                self.gen_expr(right)?;
                let op = match operator.as_str() {
                    "+" => Op::BinaryAdd,
                    "-" => Op::BinarySubtract,
                    "*" => Op::BinaryMultiply,
                    "/" => Op::BinaryDivide,
                    "%" => Op::BinaryModulo,
                    other => match CmpOp::from_symbol(other) {
                        Some(cmp) => Op::CompareOp(cmp),
                        None => {
                            return Err(CompileError::unsupported(format!(
                                "binary operator '{}'",
                                other
                            )));
                        }
                    },
                };
                self.container.emit(op, *line);
                Ok(())
            }
            Expr::ArrayLiteral { elements, line } => {
                for element in elements {
                    self.gen_expr(element)?;
                }
                self.container.emit(Op::BuildList(elements.len()), *line);
                Ok(())
            }
            Expr::FunctionCall { .. } => Err(CompileError::unsupported("function_call")),
        }
    }
}

/// True when every control path through `stmts` hits an explicit return.
/// An `if` only counts when both branches are present and both return.
fn always_returns(stmts: &[Stmt]) -> bool {
    stmts.iter().any(|stmt| match stmt {
        Stmt::ReturnStatement { .. } => true,
        Stmt::IfStatement { body, else_body, .. } => {
            always_returns(body) && always_returns(else_body)
        }
        _ => false,
    })
}
