use log::debug;

use crate::ast::{BinaryOperator, Node, UnaryOperator};
use crate::ir::{IrInstruction, IrOp};

/// Lowers an analyzed syntax tree into IR with a post-order walk.
///
/// Every expression leaves exactly one value on the operand stack; the left
/// operand of a binary operator is always pushed before the right one. The
/// generator trusts the semantic pass and does not re-check names.
#[derive(Default)]
pub struct CodeGenerator {
    instructions: Vec<IrInstruction>,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(mut self, root: &Node) -> Vec<IrInstruction> {
        self.emit_statement(root);
        debug!("generated {} IR instructions", self.instructions.len());
        self.instructions
    }

    fn emit_statement(&mut self, node: &Node) {
        match node {
            Node::Program { statements } => {
                for statement in statements {
                    self.emit_statement(statement);
                }
            }
            Node::Assignment { target, value } => self.emit_assignment(target, value, false),
            Node::BinaryOp { .. }
            | Node::UnaryOp { .. }
            | Node::Identifier(_)
            | Node::NumberLiteral(_)
            | Node::StringLiteral(_) => {
                self.emit_expression(node);
                self.emit(IrInstruction::new(IrOp::Pop));
            }
        }
    }

    fn emit_expression(&mut self, node: &Node) {
        match node {
            Node::Program { statements } => {
                for statement in statements {
                    self.emit_statement(statement);
                }
            }
            Node::Assignment { target, value } => self.emit_assignment(target, value, true),
            Node::BinaryOp { left, op, right } => {
                self.emit_expression(left);
                self.emit_expression(right);
                self.emit(IrInstruction::new(binary_opcode(*op)));
            }
            Node::UnaryOp { op, operand } => {
                self.emit_expression(operand);
                match op {
                    UnaryOperator::Negate => self.emit(IrInstruction::new(IrOp::Neg)),
                    UnaryOperator::Not => {
                        self.emit(IrInstruction::with_operand(IrOp::Push, "0").commented("not"));
                        self.emit(IrInstruction::new(IrOp::CmpEq));
                    }
                }
            }
            Node::Identifier(name) => self.emit(IrInstruction::with_operand(IrOp::Load, name)),
            Node::NumberLiteral(text) | Node::StringLiteral(text) => {
                self.emit(IrInstruction::with_operand(IrOp::Push, text))
            }
        }
    }

    /// `as_expression` is set for nested assignments, whose stored value must
    /// stay available to the enclosing expression.
    fn emit_assignment(&mut self, target: &Node, value: &Node, as_expression: bool) {
        let Node::Identifier(name) = target else {
            if as_expression {
                self.emit_expression(value);
            }
            return;
        };

        self.emit_expression(value);
        self.emit(IrInstruction::with_operand(IrOp::Store, name));
        if as_expression {
            self.emit(IrInstruction::with_operand(IrOp::Load, name));
        }
    }

    fn emit(&mut self, instruction: IrInstruction) {
        self.instructions.push(instruction);
    }
}

pub fn binary_opcode(op: BinaryOperator) -> IrOp {
    match op {
        BinaryOperator::Add => IrOp::Add,
        BinaryOperator::Sub => IrOp::Sub,
        BinaryOperator::Mul => IrOp::Mul,
        BinaryOperator::Div => IrOp::Div,
        BinaryOperator::Equal => IrOp::CmpEq,
        BinaryOperator::NotEqual => IrOp::CmpNe,
        BinaryOperator::Less => IrOp::CmpLt,
        BinaryOperator::LessEqual => IrOp::CmpLe,
        BinaryOperator::Greater => IrOp::CmpGt,
        BinaryOperator::GreaterEqual => IrOp::CmpGe,
    }
}

pub fn generate(root: &Node) -> Vec<IrInstruction> {
    CodeGenerator::new().generate(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::render;
    use crate::lexer::tokenize;
    use crate::parser::parse_tokens;
    use indoc::indoc;

    fn lower(input: &str) -> String {
        let (program, errors) = parse_tokens(tokenize(input));
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        render(&generate(&program))
    }

    #[test]
    fn emits_post_order_stack_code() {
        let expected = indoc! {"
            PUSH 5
            PUSH 3
            ADD
            STORE a
            LOAD a
            PUSH 2
            MUL
            STORE b"};
        assert_eq!(lower("a = 5 + 3; b = a * 2;"), expected);
    }

    #[test]
    fn pushes_left_operand_first() {
        let expected = indoc! {"
            PUSH 10
            PUSH 4
            SUB
            PUSH 2
            DIV
            STORE x"};
        assert_eq!(lower("x = (10 - 4) / 2;"), expected);
    }

    #[test]
    fn maps_every_comparison_operator() {
        let code = generate(&parse_tokens(tokenize(
            "a = 1 == 2; b = 1 != 2; c = 1 < 2; d = 1 <= 2; e = 1 > 2; f = 1 >= 2;",
        ))
        .0);
        let comparisons = code
            .iter()
            .map(|instruction| instruction.opcode)
            .filter(|op| !matches!(op, IrOp::Push | IrOp::Store))
            .collect::<Vec<_>>();
        assert_eq!(
            comparisons,
            vec![
                IrOp::CmpEq,
                IrOp::CmpNe,
                IrOp::CmpLt,
                IrOp::CmpLe,
                IrOp::CmpGt,
                IrOp::CmpGe,
            ]
        );
    }

    #[test]
    fn lowers_unary_operators() {
        let expected = indoc! {"
            LOAD y
            NEG
            PUSH 0 ; not
            CMP_EQ
            STORE x"};
        assert_eq!(lower("x = !-y;"), expected);
    }

    #[test]
    fn nested_assignment_reloads_stored_value() {
        let expected = indoc! {"
            PUSH 1
            STORE b
            LOAD b
            STORE a"};
        assert_eq!(lower("a = b = 1;"), expected);
    }

    #[test]
    fn literals_share_push() {
        assert_eq!(lower("s = \"hi\"; f = 2.5;"), "PUSH hi\nSTORE s\nPUSH 2.5\nSTORE f");
    }

    #[test]
    fn skips_store_for_non_variable_target() {
        // `1 + 2 = 3` only evaluates the value so `a` still receives one value.
        assert_eq!(lower("a = 1 + 2 = 3;"), "PUSH 3\nSTORE a");
    }

    #[test]
    fn bare_expression_statement_is_discarded() {
        let program = Node::Program {
            statements: vec![Node::number("7")],
        };
        let code = generate(&program);
        assert_eq!(render(&code), "PUSH 7\nPOP");
    }

    #[test]
    fn empty_program_emits_nothing() {
        assert!(generate(&Node::Program { statements: vec![] }).is_empty());
    }
}
