use log::{debug, warn};

use crate::ast::{BinaryOperator, Node, UnaryOperator};
use crate::token::{Span, Token, TokenKind};

mod error;

pub use error::{ParseError, ParseResult};

const EQUALITY: &[TokenKind] = &[TokenKind::EqualEqual, TokenKind::BangEqual];
const COMPARISON: &[TokenKind] = &[
    TokenKind::Less,
    TokenKind::Greater,
    TokenKind::LessEqual,
    TokenKind::GreaterEqual,
];
const TERM: &[TokenKind] = &[TokenKind::Plus, TokenKind::Minus];
const FACTOR: &[TokenKind] = &[TokenKind::Star, TokenKind::Slash];

/// Deepest expression tree, and deepest parser recursion, a statement may use.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Expression under construction along with the height of its tree.
struct Expr {
    node: Node,
    height: usize,
}

pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    position: usize,
    depth: usize,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(mut tokens: Vec<Token<'a>>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::EOF) {
            let span = tokens
                .last()
                .map(|token| Span {
                    start: token.span.end,
                    end: token.span.end,
                    ..token.span
                })
                .unwrap_or_default();
            tokens.push(Token::new(TokenKind::EOF, "", span));
        }
        Self {
            tokens,
            position: 0,
            depth: 0,
            errors: Vec::new(),
        }
    }

    /// Parses every statement, recording syntax errors instead of stopping.
    /// The returned node is always a `Program`.
    pub fn parse_program(&mut self) -> Node {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    warn!("{error}");
                    self.errors.push(error);
                    self.synchronize();
                }
            }
        }
        debug!(
            "parsed {} statements with {} errors",
            statements.len(),
            self.errors.len()
        );
        Node::Program { statements }
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    fn parse_statement(&mut self) -> ParseResult<Node> {
        let current = self.peek();
        if current.kind != TokenKind::Identifier {
            return Err(ParseError::InvalidStatementStart {
                found: current.describe(),
                line: current.line(),
            });
        }
        let name = current.text.to_string();
        self.advance();
        self.expect(TokenKind::Assign, "'='")?;
        let value = self.parse_assignment()?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Node::assignment(Node::Identifier(name), value.node))
    }

    fn parse_assignment(&mut self) -> ParseResult<Expr> {
        let target = self.parse_equality()?;
        if self.match_kind(TokenKind::Assign) {
            let value = self.nested(Self::parse_assignment)?;
            let height = target.height.max(value.height);
            return self.composite(Node::assignment(target.node, value.node), height);
        }
        Ok(target)
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        self.parse_binary(EQUALITY, Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        self.parse_binary(COMPARISON, Self::parse_term)
    }

    fn parse_term(&mut self) -> ParseResult<Expr> {
        self.parse_binary(TERM, Self::parse_factor)
    }

    fn parse_factor(&mut self) -> ParseResult<Expr> {
        self.parse_binary(FACTOR, Self::parse_unary)
    }

    /// One left-associative precedence level.
    fn parse_binary(
        &mut self,
        operators: &[TokenKind],
        operand: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut expr = operand(self)?;
        while operators.contains(&self.peek().kind) {
            let token = self.advance();
            let right = operand(self)?;
            let op = BinaryOperator::from_token(token.kind).ok_or_else(|| {
                ParseError::UnexpectedToken {
                    found: token.describe(),
                    line: token.line(),
                }
            })?;
            let height = expr.height.max(right.height);
            expr = self.composite(Node::binary(expr.node, op, right.node), height)?;
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        if let Some(op) = UnaryOperator::from_token(self.peek().kind) {
            self.advance();
            let operand = self.nested(Self::parse_unary)?;
            return self.composite(Node::unary(op, operand.node), operand.height);
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let current = self.peek();
        let leaf = match current.kind {
            TokenKind::IntegerLiteral | TokenKind::FloatLiteral => {
                Node::NumberLiteral(current.text.to_string())
            }
            TokenKind::Identifier => Node::Identifier(current.text.to_string()),
            TokenKind::StringLiteral => Node::StringLiteral(current.text.to_string()),
            TokenKind::LParen => {
                self.advance();
                let expr = self.nested(Self::parse_assignment)?;
                self.expect(TokenKind::RParen, "')' after expression")?;
                return Ok(expr);
            }
            _ => {
                return Err(ParseError::UnexpectedToken {
                    found: current.describe(),
                    line: current.line(),
                });
            }
        };
        self.advance();
        Ok(Expr {
            node: leaf,
            height: 1,
        })
    }

    /// Runs `parse` one level deeper, refusing once the parser's own
    /// recursion reaches `MAX_NESTING_DEPTH`.
    fn nested(&mut self, parse: fn(&mut Self) -> ParseResult<Expr>) -> ParseResult<Expr> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.nesting_too_deep());
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Wraps `node` whose deepest child has height `child_height`. Trees taller
    /// than `MAX_NESTING_DEPTH` are rejected.
    fn composite(&self, node: Node, child_height: usize) -> ParseResult<Expr> {
        let height = child_height + 1;
        if height > MAX_NESTING_DEPTH {
            return Err(self.nesting_too_deep());
        }
        Ok(Expr { node, height })
    }

    fn nesting_too_deep(&self) -> ParseError {
        ParseError::NestingTooDeep {
            limit: MAX_NESTING_DEPTH,
            line: self.peek().line(),
        }
    }

    /// Skips to the end of the broken statement: just past the next `;`, or
    /// up to a token that can begin a statement, whichever comes first.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            let kind = self.peek().kind;
            if kind == TokenKind::Identifier || kind.is_number() || kind.is_keyword() {
                return;
            }
            self.advance();
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> ParseResult<()> {
        if self.match_kind(kind) {
            return Ok(());
        }
        let current = self.peek();
        Err(ParseError::Expected {
            expected,
            found: current.describe(),
            line: current.line(),
        })
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn advance(&mut self) -> Token<'a> {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.position += 1;
        }
        token
    }

    fn peek(&self) -> &Token<'a> {
        let last = self.tokens.len() - 1;
        &self.tokens[self.position.min(last)]
    }

    fn previous(&self) -> &Token<'a> {
        &self.tokens[self.position.saturating_sub(1)]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::EOF
    }
}

/// Parses a token stream into a `Program` node plus the syntax errors that
/// were recovered from along the way.
pub fn parse_tokens(tokens: Vec<Token<'_>>) -> (Node, Vec<ParseError>) {
    let mut parser = Parser::new(tokens);
    let program = parser.parse_program();
    (program, parser.into_errors())
}
