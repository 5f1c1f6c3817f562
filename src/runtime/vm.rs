use crate::bytecode::container::BytecodeContainer;
use crate::bytecode::op::{CmpOp, Op};
use crate::lang::value::Value;
use crate::runtime::runtime_error::RuntimeError;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct VmConfig {
    /// Abort after this many executed instructions, if set.
    pub max_steps: Option<usize>,
    pub max_stack_size: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            max_steps: None,
            max_stack_size: 100_000,
        }
    }
}

/// What a finished run reports: the program's result plus counters.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub result: Value,
    pub instructions_executed: usize,
    pub max_stack_depth: usize,
}

/// Stack machine over a [`BytecodeContainer`]. Every call to
/// [`Vm::execute`] runs with a fresh stack and heap; nothing carries
/// over between runs.
pub struct Vm {
    container: BytecodeContainer,
    config: VmConfig,
}

impl Vm {
    pub fn new(container: BytecodeContainer) -> Self {
        Self::with_config(container, VmConfig::default())
    }

    pub fn with_config(container: BytecodeContainer, config: VmConfig) -> Self {
        Vm { container, config }
    }

    pub fn container(&self) -> &BytecodeContainer {
        &self.container
    }

    pub fn execute(&self) -> Result<Execution, RuntimeError> {
        let end = self.container.instructions.len();
        debug!(instructions = end, "executing");

        let mut stack: Vec<Value> = Vec::new();
        let mut heap: HashMap<String, Value> = HashMap::new();
        let mut ip = 0usize;
        let mut executed = 0usize;
        let mut max_depth = 0usize;
        let mut result = Value::None;
        let mut running = true;

        while running && ip < end {
            let at = ip;
            let instruction = &self.container.instructions[ip];
            ip += 1;
            executed += 1;

            // Depth is sampled before each dispatch
            if stack.len() > max_depth {
                max_depth = stack.len();
            }

            if let Some(max) = self.config.max_steps {
                if executed > max {
                    return Err(RuntimeError::new(
                        format!("Step limit exceeded ({})", max),
                        at,
                    ));
                }
            }

            match &instruction.op {
                Op::LoadConst(i) => {
                    let value = self.container.constants.get(*i).cloned().ok_or_else(|| {
                        RuntimeError::new(format!("Invalid constant index {}", i), at)
                    })?;
                    stack.push(value);
                }
                Op::PopTop => {
                    if stack.pop().is_none() {
                        return Err(RuntimeError::new("Cannot POP_TOP from empty stack", at));
                    }
                }
                Op::StoreName(i) => {
                    let name = self.name_at(*i, at)?;
                    let value = stack.pop().ok_or_else(|| {
                        RuntimeError::new("Cannot STORE_NAME from empty stack", at)
                    })?;
                    heap.insert(name.to_string(), value);
                }
                Op::LoadName(i) => {
                    let name = self.name_at(*i, at)?;
                    let value = heap
                        .get(name)
                        .cloned()
                        .ok_or_else(|| RuntimeError::undefined_variable(name, at))?;
                    stack.push(value);
                }
                Op::BinaryAdd => {
                    let (a, b) = pop2(&mut stack, "BINARY_ADD", at)?;
                    stack.push(add(a, b, at)?);
                }
                Op::BinarySubtract => {
                    let (a, b) = pop2(&mut stack, "BINARY_SUBTRACT", at)?;
                    stack.push(subtract(a, b, at)?);
                }
                Op::BinaryMultiply => {
                    let (a, b) = pop2(&mut stack, "BINARY_MULTIPLY", at)?;
                    stack.push(multiply(a, b, at)?);
                }
                Op::BinaryDivide => {
                    let (a, b) = pop2(&mut stack, "BINARY_DIVIDE", at)?;
                    stack.push(divide(a, b, at)?);
                }
                Op::BinaryModulo => {
                    let (a, b) = pop2(&mut stack, "BINARY_MODULO", at)?;
                    stack.push(modulo(a, b, at)?);
                }
                Op::CompareOp(cmp) => {
                    let (a, b) = pop2(&mut stack, "COMPARE_OP", at)?;
                    stack.push(Value::Bool(compare(*cmp, &a, &b, at)?));
                }
                Op::JumpAbsolute(t) => {
                    ip = self.jump_target(*t, at)?;
                }
                Op::PopJumpIfFalse(t) => {
                    let condition = stack.pop().ok_or_else(|| {
                        RuntimeError::new("Cannot POP_JUMP_IF_FALSE from empty stack", at)
                    })?;
                    let target = self.jump_target(*t, at)?;
                    if !condition.is_truthy() {
                        ip = target;
                    }
                }
                Op::ReturnValue => {
                    // The result stays on the stack, unpopped
                    result = stack.last().cloned().unwrap_or(Value::None);
                    running = false;
                }
                Op::BuildList(n) => {
                    if stack.len() < *n {
                        return Err(RuntimeError::underflow("BUILD_LIST", *n, at));
                    }
                    let items = stack.split_off(stack.len() - n);
                    stack.push(Value::List(items));
                }
            }

            if stack.len() > self.config.max_stack_size {
                return Err(RuntimeError::new(
                    format!("Stack size limit exceeded ({})", self.config.max_stack_size),
                    at,
                ));
            }
        }

        debug!(executed, max_depth, "execution finished");
        Ok(Execution {
            result,
            instructions_executed: executed,
            max_stack_depth: max_depth,
        })
    }

    fn name_at(&self, index: usize, at: usize) -> Result<&str, RuntimeError> {
        self.container
            .names
            .get(index)
            .map(|s| s.as_str())
            .ok_or_else(|| RuntimeError::new(format!("Invalid name index {}", index), at))
    }

    /// Jumping to the instruction count is allowed; the loop simply ends.
    fn jump_target(&self, target: usize, at: usize) -> Result<usize, RuntimeError> {
        if target > self.container.instructions.len() {
            return Err(RuntimeError::new(
                format!("Invalid jump target {}", target),
                at,
            ));
        }
        Ok(target)
    }
}

fn pop2(
    stack: &mut Vec<Value>,
    mnemonic: &str,
    at: usize,
) -> Result<(Value, Value), RuntimeError> {
    if stack.len() < 2 {
        return Err(RuntimeError::underflow(mnemonic, 2, at));
    }
    let b = stack.pop().unwrap_or(Value::None);
    let a = stack.pop().unwrap_or(Value::None);
    Ok((a, b))
}

fn add(a: Value, b: Value, at: usize) -> Result<Value, RuntimeError> {
    let result = match (&a, &b) {
        (Value::Integer(x), Value::Integer(y)) => Value::Integer(x + y),
        (Value::Float(x), Value::Float(y)) => Value::Float(x + y),
        (Value::Integer(x), Value::Float(y)) => Value::Float(*x as f64 + y),
        (Value::Float(x), Value::Integer(y)) => Value::Float(x + *y as f64),
        (Value::Str(x), Value::Str(y)) => Value::Str(format!("{}{}", x, y)),
        (Value::List(x), Value::List(y)) => {
            let mut items = x.clone();
            items.extend(y.iter().cloned());
            Value::List(items)
        }
        _ => {
            return Err(RuntimeError::type_error(
                format!("Cannot add {} and {}", a.type_name(), b.type_name()),
                at,
            ));
        }
    };
    Ok(result)
}

fn subtract(a: Value, b: Value, at: usize) -> Result<Value, RuntimeError> {
    let result = match (&a, &b) {
        (Value::Integer(x), Value::Integer(y)) => Value::Integer(x - y),
        (Value::Float(x), Value::Float(y)) => Value::Float(x - y),
        (Value::Integer(x), Value::Float(y)) => Value::Float(*x as f64 - y),
        (Value::Float(x), Value::Integer(y)) => Value::Float(x - *y as f64),
        _ => {
            return Err(RuntimeError::type_error(
                format!("Cannot subtract {} from {}", b.type_name(), a.type_name()),
                at,
            ));
        }
    };
    Ok(result)
}

fn multiply(a: Value, b: Value, at: usize) -> Result<Value, RuntimeError> {
    let result = match (&a, &b) {
        (Value::Integer(x), Value::Integer(y)) => Value::Integer(x * y),
        (Value::Float(x), Value::Float(y)) => Value::Float(x * y),
        (Value::Integer(x), Value::Float(y)) => Value::Float(*x as f64 * y),
        (Value::Float(x), Value::Integer(y)) => Value::Float(x * *y as f64),
        _ => {
            return Err(RuntimeError::type_error(
                format!("Cannot multiply {} and {}", a.type_name(), b.type_name()),
                at,
            ));
        }
    };
    Ok(result)
}

/// Division always yields a float, matching the source language.
fn divide(a: Value, b: Value, at: usize) -> Result<Value, RuntimeError> {
    let (x, y) = match (&a, &b) {
        (Value::Integer(x), Value::Integer(y)) => (*x as f64, *y as f64),
        (Value::Float(x), Value::Float(y)) => (*x, *y),
        (Value::Integer(x), Value::Float(y)) => (*x as f64, *y),
        (Value::Float(x), Value::Integer(y)) => (*x, *y as f64),
        _ => {
            return Err(RuntimeError::type_error(
                format!("Cannot divide {} by {}", a.type_name(), b.type_name()),
                at,
            ));
        }
    };
    if y == 0.0 {
        return Err(RuntimeError::division_by_zero(at));
    }
    Ok(Value::Float(x / y))
}

fn modulo(a: Value, b: Value, at: usize) -> Result<Value, RuntimeError> {
    let result = match (&a, &b) {
        (Value::Integer(_), Value::Integer(0)) => {
            return Err(RuntimeError::new("Modulo by zero", at));
        }
        (Value::Integer(x), Value::Integer(y)) => Value::Integer(x % y),
        (Value::Float(x), Value::Float(y)) => float_modulo(*x, *y, at)?,
        (Value::Integer(x), Value::Float(y)) => float_modulo(*x as f64, *y, at)?,
        (Value::Float(x), Value::Integer(y)) => float_modulo(*x, *y as f64, at)?,
        _ => {
            return Err(RuntimeError::type_error(
                format!("Cannot take {} modulo {}", a.type_name(), b.type_name()),
                at,
            ));
        }
    };
    Ok(result)
}

fn float_modulo(x: f64, y: f64, at: usize) -> Result<Value, RuntimeError> {
    if y == 0.0 {
        return Err(RuntimeError::new("Modulo by zero", at));
    }
    Ok(Value::Float(x % y))
}

fn compare(cmp: CmpOp, a: &Value, b: &Value, at: usize) -> Result<bool, RuntimeError> {
    match cmp {
        CmpOp::Eq => Ok(values_equal(a, b)),
        CmpOp::Ne => Ok(!values_equal(a, b)),
        CmpOp::Lt => Ok(ordering(a, b, at)? == Ordering::Less),
        CmpOp::Gt => Ok(ordering(a, b, at)? == Ordering::Greater),
        CmpOp::Le => Ok(ordering(a, b, at)? != Ordering::Greater),
        CmpOp::Ge => Ok(ordering(a, b, at)? != Ordering::Less),
    }
}

/// Equality crosses the integer/float divide; everything else is
/// structural.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Integer(x), Value::Float(y)) | (Value::Float(y), Value::Integer(x)) => {
            *x as f64 == *y
        }
        _ => a == b,
    }
}

fn ordering(a: &Value, b: &Value, at: usize) -> Result<Ordering, RuntimeError> {
    let ordering = match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x.partial_cmp(y),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        (Value::Integer(x), Value::Float(y)) => (*x as f64).partial_cmp(y),
        (Value::Float(x), Value::Integer(y)) => x.partial_cmp(&(*y as f64)),
        (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
        _ => None,
    };
    ordering.ok_or_else(|| {
        RuntimeError::type_error(
            format!("Cannot compare {} and {}", a.type_name(), b.type_name()),
            at,
        )
    })
}
