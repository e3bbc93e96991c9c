//! Syntax tree shared by the semantic analyzer and the code generator.
//!
//! The parser builds these nodes once; later passes only read them and
//! dispatch with exhaustive matches over [`Node`].

use std::fmt;

use crate::token::TokenKind;

#[derive(Debug, PartialEq, Clone)]
pub enum Node {
    Program {
        statements: Vec<Node>,
    },
    Assignment {
        target: Box<Node>,
        value: Box<Node>,
    },
    BinaryOp {
        left: Box<Node>,
        op: BinaryOperator,
        right: Box<Node>,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Node>,
    },
    Identifier(String),
    NumberLiteral(String),
    StringLiteral(String),
}

impl Node {
    pub fn identifier(name: impl Into<String>) -> Self {
        Node::Identifier(name.into())
    }

    pub fn number(text: impl Into<String>) -> Self {
        Node::NumberLiteral(text.into())
    }

    pub fn assignment(target: Node, value: Node) -> Self {
        Node::Assignment {
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    pub fn binary(left: Node, op: BinaryOperator, right: Node) -> Self {
        Node::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOperator, operand: Node) -> Self {
        Node::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }

    /// Top-level statements of a `Program` node; empty for any other node.
    pub fn statements(&self) -> &[Node] {
        match self {
            Node::Program { statements } => statements,
            _ => &[],
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl BinaryOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Plus => BinaryOperator::Add,
            TokenKind::Minus => BinaryOperator::Sub,
            TokenKind::Star => BinaryOperator::Mul,
            TokenKind::Slash => BinaryOperator::Div,
            TokenKind::EqualEqual => BinaryOperator::Equal,
            TokenKind::BangEqual => BinaryOperator::NotEqual,
            TokenKind::Less => BinaryOperator::Less,
            TokenKind::LessEqual => BinaryOperator::LessEqual,
            TokenKind::Greater => BinaryOperator::Greater,
            TokenKind::GreaterEqual => BinaryOperator::GreaterEqual,
            _ => return None,
        };
        Some(op)
    }

    /// The operator as it is spelled in source.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOperator {
    Negate,
    Not,
}

impl UnaryOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Minus => Some(UnaryOperator::Negate),
            TokenKind::Bang => Some(UnaryOperator::Not),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Negate => "-",
            UnaryOperator::Not => "!",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Renders the tree as one S-expression per statement.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Program { statements } => {
                for (index, statement) in statements.iter().enumerate() {
                    if index > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{statement}")?;
                }
                Ok(())
            }
            Node::Assignment { target, value } => write!(f, "(= {target} {value})"),
            Node::BinaryOp { left, op, right } => write!(f, "({op} {left} {right})"),
            Node::UnaryOp { op, operand } => write!(f, "({op} {operand})"),
            Node::Identifier(name) => f.write_str(name),
            Node::NumberLiteral(text) => f.write_str(text),
            Node::StringLiteral(text) => write!(f, "{text:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_expressions() {
        let program = Node::Program {
            statements: vec![Node::assignment(
                Node::identifier("x"),
                Node::binary(
                    Node::number("2"),
                    BinaryOperator::Add,
                    Node::unary(UnaryOperator::Negate, Node::identifier("y")),
                ),
            )],
        };
        assert_eq!(program.to_string(), "(= x (+ 2 (- y)))");
    }

    #[test]
    fn maps_operator_tokens() {
        assert_eq!(
            BinaryOperator::from_token(TokenKind::GreaterEqual),
            Some(BinaryOperator::GreaterEqual)
        );
        assert_eq!(BinaryOperator::from_token(TokenKind::Assign), None);
        assert_eq!(
            UnaryOperator::from_token(TokenKind::Bang),
            Some(UnaryOperator::Not)
        );
        assert_eq!(BinaryOperator::NotEqual.symbol(), "!=");
    }
}
