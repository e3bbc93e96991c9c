use log::trace;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::bytecode::{Instruction, VmOp};

pub type Memory = FxHashMap<String, i64>;

pub type VmResult<T> = std::result::Result<T, VmError>;

/// Faults that abort execution.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error("Stack underflow in {op} at instruction {ip}")]
    StackUnderflow { op: VmOp, ip: usize },
    #[error("Invalid integer operand '{operand}' at instruction {ip}")]
    InvalidInteger { operand: String, ip: usize },
    #[error("Division by zero at instruction {ip}")]
    DivisionByZero { ip: usize },
    #[error("Integer overflow in {op} at instruction {ip}")]
    IntegerOverflow { op: VmOp, ip: usize },
}

/// Stack machine over `i64` values with a flat name to value memory.
///
/// Instructions run strictly in order. Jump, label, call and return opcodes
/// are accepted but have no effect.
#[derive(Debug, Default)]
pub struct VM {
    stack: Vec<i64>,
    memory: Memory,
    ip: usize,
}

impl VM {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `code` from a clean state and returns the final memory. The state
    /// stays inspectable until the next call.
    pub fn execute(&mut self, code: &[Instruction]) -> VmResult<&Memory> {
        self.stack.clear();
        self.memory.clear();
        self.ip = 0;

        while let Some(instruction) = code.get(self.ip) {
            trace!("{:>4} {instruction} {:?}", self.ip, self.stack);
            self.step(instruction)?;
            self.ip += 1;
        }
        Ok(&self.memory)
    }

    /// Value bound to `name` after execution, `None` when it was never stored.
    pub fn get_variable(&self, name: &str) -> Option<i64> {
        self.memory.get(name).copied()
    }

    pub fn variables(&self) -> &Memory {
        &self.memory
    }

    /// Bindings sorted by name.
    pub fn bindings(&self) -> Vec<(&str, i64)> {
        let mut bindings = self
            .memory
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
            .collect::<Vec<_>>();
        bindings.sort_unstable_by(|left, right| left.0.cmp(right.0));
        bindings
    }

    pub fn stack(&self) -> &[i64] {
        &self.stack
    }

    fn step(&mut self, instruction: &Instruction) -> VmResult<()> {
        let op = instruction.opcode;
        match op {
            VmOp::Push => {
                let value = instruction.operand1.parse::<i64>().map_err(|_| {
                    VmError::InvalidInteger {
                        operand: instruction.operand1.clone(),
                        ip: self.ip,
                    }
                })?;
                self.stack.push(value);
            }
            VmOp::Pop => {
                self.stack.pop();
            }
            VmOp::Load => {
                // Unbound names read as zero.
                let value = self.get_variable(&instruction.operand1).unwrap_or(0);
                self.stack.push(value);
            }
            VmOp::Store => {
                if let Some(value) = self.stack.pop() {
                    self.memory.insert(instruction.operand1.clone(), value);
                }
            }
            VmOp::Add => self.arithmetic(op, i64::checked_add)?,
            VmOp::Sub => self.arithmetic(op, i64::checked_sub)?,
            VmOp::Mul => self.arithmetic(op, i64::checked_mul)?,
            VmOp::Div => {
                let right = self.pop_stack(op)?;
                let left = self.pop_stack(op)?;
                if right == 0 {
                    return Err(VmError::DivisionByZero { ip: self.ip });
                }
                let quotient = left
                    .checked_div(right)
                    .ok_or(VmError::IntegerOverflow { op, ip: self.ip })?;
                self.stack.push(quotient);
            }
            VmOp::Neg => {
                let value = self.pop_stack(op)?;
                let negated = value
                    .checked_neg()
                    .ok_or(VmError::IntegerOverflow { op, ip: self.ip })?;
                self.stack.push(negated);
            }
            VmOp::CmpEq => self.compare(op, |a, b| a == b)?,
            VmOp::CmpNe => self.compare(op, |a, b| a != b)?,
            VmOp::CmpLt => self.compare(op, |a, b| a < b)?,
            VmOp::CmpLe => self.compare(op, |a, b| a <= b)?,
            VmOp::CmpGt => self.compare(op, |a, b| a > b)?,
            VmOp::CmpGe => self.compare(op, |a, b| a >= b)?,
            VmOp::Jump
            | VmOp::JumpIfTrue
            | VmOp::JumpIfFalse
            | VmOp::Label
            | VmOp::Call
            | VmOp::Return => {
                trace!("ignoring reserved opcode {op}");
            }
        }
        Ok(())
    }

    /// Pops `b` then `a` and pushes `apply(a, b)`.
    fn arithmetic(&mut self, op: VmOp, apply: fn(i64, i64) -> Option<i64>) -> VmResult<()> {
        let right = self.pop_stack(op)?;
        let left = self.pop_stack(op)?;
        let result = apply(left, right).ok_or(VmError::IntegerOverflow { op, ip: self.ip })?;
        self.stack.push(result);
        Ok(())
    }

    fn compare(&mut self, op: VmOp, test: fn(i64, i64) -> bool) -> VmResult<()> {
        let right = self.pop_stack(op)?;
        let left = self.pop_stack(op)?;
        self.stack.push(i64::from(test(left, right)));
        Ok(())
    }

    fn pop_stack(&mut self, op: VmOp) -> VmResult<i64> {
        self.stack
            .pop()
            .ok_or(VmError::StackUnderflow { op, ip: self.ip })
    }
}
