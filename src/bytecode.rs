//! Instruction encoding executed by the virtual machine.
//!
//! Deliberately a separate type from [`crate::ir::IrOp`] even though the two
//! sets currently match one for one; the assembler owns the translation.

use std::fmt;

use crate::ir::write_instruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VmOp {
    Push,
    Pop,
    Load,
    Store,
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    CmpEq,
    CmpNe,
    CmpLt,
    CmpLe,
    CmpGt,
    CmpGe,
    Jump,
    JumpIfTrue,
    JumpIfFalse,
    Label,
    Call,
    Return,
}

impl VmOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            VmOp::Push => "VM_PUSH",
            VmOp::Pop => "VM_POP",
            VmOp::Load => "VM_LOAD",
            VmOp::Store => "VM_STORE",
            VmOp::Add => "VM_ADD",
            VmOp::Sub => "VM_SUB",
            VmOp::Mul => "VM_MUL",
            VmOp::Div => "VM_DIV",
            VmOp::Neg => "VM_NEG",
            VmOp::CmpEq => "VM_CMP_EQ",
            VmOp::CmpNe => "VM_CMP_NE",
            VmOp::CmpLt => "VM_CMP_LT",
            VmOp::CmpLe => "VM_CMP_LE",
            VmOp::CmpGt => "VM_CMP_GT",
            VmOp::CmpGe => "VM_CMP_GE",
            VmOp::Jump => "VM_JUMP",
            VmOp::JumpIfTrue => "VM_JUMP_IF_TRUE",
            VmOp::JumpIfFalse => "VM_JUMP_IF_FALSE",
            VmOp::Label => "VM_LABEL",
            VmOp::Call => "VM_CALL",
            VmOp::Return => "VM_RETURN",
        }
    }
}

impl fmt::Display for VmOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: VmOp,
    pub operand1: String,
    pub operand2: String,
    pub label: String,
}

impl Instruction {
    pub fn new(opcode: VmOp) -> Self {
        Self {
            opcode,
            operand1: String::new(),
            operand2: String::new(),
            label: String::new(),
        }
    }

    pub fn with_operand(opcode: VmOp, operand: impl Into<String>) -> Self {
        Self {
            operand1: operand.into(),
            ..Self::new(opcode)
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_instruction(
            f,
            &self.label,
            self.opcode.mnemonic(),
            &self.operand1,
            &self.operand2,
        )
    }
}

pub fn render(code: &[Instruction]) -> String {
    code.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
