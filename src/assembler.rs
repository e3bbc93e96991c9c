use log::debug;

use crate::bytecode::{Instruction, VmOp};
use crate::ir::{IrInstruction, IrOp};

/// Lowers IR into bytecode, one instruction for one instruction.
///
/// Operands and labels carry over unchanged; comments are dropped. Adding an
/// `IrOp` without a `VmOp` counterpart fails to build here.
pub fn assemble(ir: &[IrInstruction]) -> Vec<Instruction> {
    let code = ir
        .iter()
        .map(|instruction| Instruction {
            opcode: map_opcode(instruction.opcode),
            operand1: instruction.operand1.clone(),
            operand2: instruction.operand2.clone(),
            label: instruction.label.clone(),
        })
        .collect::<Vec<_>>();
    debug!("assembled {} bytecode instructions", code.len());
    code
}

pub fn map_opcode(op: IrOp) -> VmOp {
    match op {
        IrOp::Push => VmOp::Push,
        IrOp::Pop => VmOp::Pop,
        IrOp::Load => VmOp::Load,
        IrOp::Store => VmOp::Store,
        IrOp::Add => VmOp::Add,
        IrOp::Sub => VmOp::Sub,
        IrOp::Mul => VmOp::Mul,
        IrOp::Div => VmOp::Div,
        IrOp::Neg => VmOp::Neg,
        IrOp::CmpEq => VmOp::CmpEq,
        IrOp::CmpNe => VmOp::CmpNe,
        IrOp::CmpLt => VmOp::CmpLt,
        IrOp::CmpLe => VmOp::CmpLe,
        IrOp::CmpGt => VmOp::CmpGt,
        IrOp::CmpGe => VmOp::CmpGe,
        IrOp::Jump => VmOp::Jump,
        IrOp::JumpIfTrue => VmOp::JumpIfTrue,
        IrOp::JumpIfFalse => VmOp::JumpIfFalse,
        IrOp::Label => VmOp::Label,
        IrOp::Call => VmOp::Call,
        IrOp::Return => VmOp::Return,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_operands_and_labels() {
        let ir = vec![
            IrInstruction::with_operand(IrOp::Push, "5"),
            IrInstruction {
                opcode: IrOp::Label,
                operand1: String::new(),
                operand2: String::new(),
                label: "start".to_string(),
                comment: "entry".to_string(),
            },
            IrInstruction::with_operand(IrOp::Store, "a"),
        ];
        let code = assemble(&ir);
        assert_eq!(
            code,
            vec![
                Instruction::with_operand(VmOp::Push, "5"),
                Instruction {
                    label: "start".to_string(),
                    ..Instruction::new(VmOp::Label)
                },
                Instruction::with_operand(VmOp::Store, "a"),
            ]
        );
    }

    #[test]
    fn mapping_is_one_to_one() {
        let mut targets = IrOp::ALL
            .iter()
            .map(|op| map_opcode(*op))
            .collect::<Vec<_>>();
        for (ir_op, vm_op) in IrOp::ALL.iter().zip(&targets) {
            assert_eq!(vm_op.mnemonic(), format!("VM_{}", ir_op.mnemonic()));
        }
        targets.sort_by_key(|op| op.mnemonic());
        targets.dedup();
        assert_eq!(targets.len(), IrOp::ALL.len());
    }

    #[test]
    fn assembly_is_deterministic() {
        let ir = IrOp::ALL
            .iter()
            .map(|op| IrInstruction::with_operand(*op, "x"))
            .collect::<Vec<_>>();
        assert_eq!(assemble(&ir), assemble(&ir));
        assert_eq!(assemble(&ir).len(), ir.len());
    }
}
