//! Symbolic, stack-oriented intermediate representation.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrOp {
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

impl IrOp {
    pub const ALL: [IrOp; 21] = [
        IrOp::Push,
        IrOp::Pop,
        IrOp::Load,
        IrOp::Store,
        IrOp::Add,
        IrOp::Sub,
        IrOp::Mul,
        IrOp::Div,
        IrOp::Neg,
        IrOp::CmpEq,
        IrOp::CmpNe,
        IrOp::CmpLt,
        IrOp::CmpLe,
        IrOp::CmpGt,
        IrOp::CmpGe,
        IrOp::Jump,
        IrOp::JumpIfTrue,
        IrOp::JumpIfFalse,
        IrOp::Label,
        IrOp::Call,
        IrOp::Return,
    ];

    pub fn mnemonic(self) -> &'static str {
        match self {
            IrOp::Push => "PUSH",
            IrOp::Pop => "POP",
            IrOp::Load => "LOAD",
            IrOp::Store => "STORE",
            IrOp::Add => "ADD",
            IrOp::Sub => "SUB",
            IrOp::Mul => "MUL",
            IrOp::Div => "DIV",
            IrOp::Neg => "NEG",
            IrOp::CmpEq => "CMP_EQ",
            IrOp::CmpNe => "CMP_NE",
            IrOp::CmpLt => "CMP_LT",
            IrOp::CmpLe => "CMP_LE",
            IrOp::CmpGt => "CMP_GT",
            IrOp::CmpGe => "CMP_GE",
            IrOp::Jump => "JUMP",
            IrOp::JumpIfTrue => "JUMP_IF_TRUE",
            IrOp::JumpIfFalse => "JUMP_IF_FALSE",
            IrOp::Label => "LABEL",
            IrOp::Call => "CALL",
            IrOp::Return => "RETURN",
        }
    }
}

impl fmt::Display for IrOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrInstruction {
    pub opcode: IrOp,
    pub operand1: String,
    pub operand2: String,
    pub label: String,
    pub comment: String,
}

impl IrInstruction {
    pub fn new(opcode: IrOp) -> Self {
        Self {
            opcode,
            operand1: String::new(),
            operand2: String::new(),
            label: String::new(),
            comment: String::new(),
        }
    }

    pub fn with_operand(opcode: IrOp, operand: impl Into<String>) -> Self {
        Self {
            operand1: operand.into(),
            ..Self::new(opcode)
        }
    }

    pub fn commented(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// `[label:] OPCODE [operand1] [operand2] [; comment]`
impl fmt::Display for IrInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_instruction(
            f,
            &self.label,
            self.opcode.mnemonic(),
            &self.operand1,
            &self.operand2,
        )?;
        if !self.comment.is_empty() {
            write!(f, " ; {}", self.comment)?;
        }
        Ok(())
    }
}

pub(crate) fn write_instruction(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    mnemonic: &str,
    operand1: &str,
    operand2: &str,
) -> fmt::Result {
    if !label.is_empty() {
        write!(f, "{label}: ")?;
    }
    f.write_str(mnemonic)?;
    for operand in [operand1, operand2] {
        if !operand.is_empty() {
            write!(f, " {operand}")?;
        }
    }
    Ok(())
}

/// One instruction per line, in emission order.
pub fn render(instructions: &[IrInstruction]) -> String {
    instructions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
