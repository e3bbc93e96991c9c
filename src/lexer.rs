use std::{iter::Peekable, str::CharIndices};

use log::{debug, warn};

use crate::token::{Span, Token, TokenKind};

mod error;

pub use error::LexError;

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
    errors: Vec<LexError>,
    eof_emitted: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            line: 1,
            column: 1,
            errors: Vec::new(),
            eof_emitted: false,
        }
    }

    /// Lexical problems recorded so far. Scanning never stops on them.
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<LexError> {
        self.errors
    }

    /// Returns the next token. Once input is exhausted every call yields `EOF`.
    pub fn next_token(&mut self) -> Token<'a> {
        loop {
            self.skip_trivia();

            let start_line = self.line;
            let start_column = self.column;
            let (start_idx, ch) = match self.advance_char() {
                Some(next) => next,
                None => {
                    let index = self.input.len();
                    return Token::new(
                        TokenKind::EOF,
                        "",
                        Span {
                            start: index,
                            end: index,
                            line: start_line,
                            column: start_column,
                        },
                    );
                }
            };

            let kind = match ch {
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,
                ';' => TokenKind::Semicolon,
                ',' => TokenKind::Comma,
                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '*' => TokenKind::Star,
                '/' => TokenKind::Slash,
                '=' => self.pick('=', TokenKind::EqualEqual, TokenKind::Assign),
                '!' => self.pick('=', TokenKind::BangEqual, TokenKind::Bang),
                '<' => self.pick('=', TokenKind::LessEqual, TokenKind::Less),
                '>' => self.pick('=', TokenKind::GreaterEqual, TokenKind::Greater),
                '&' => self.pick('&', TokenKind::AndAnd, TokenKind::Ampersand),
                '|' => self.pick('|', TokenKind::OrOr, TokenKind::Pipe),
                '"' => match self.read_string(start_line, start_column) {
                    Some(kind) => kind,
                    None => continue,
                },
                '\'' => match self.read_char(start_line, start_column) {
                    Some(kind) => kind,
                    None => continue,
                },
                c if c.is_ascii_digit() => self.read_number(),
                c if c.is_ascii_alphabetic() || c == '_' => self.read_identifier(start_idx),
                _ => TokenKind::Unknown,
            };

            let end_idx = self.current_index();
            let text = match kind {
                TokenKind::StringLiteral | TokenKind::CharLiteral => {
                    &self.input[start_idx + 1..end_idx - 1]
                }
                _ => &self.input[start_idx..end_idx],
            };
            return Token::new(
                kind,
                text,
                Span {
                    start: start_idx,
                    end: end_idx,
                    line: start_line,
                    column: start_column,
                },
            );
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance_char();
                }
                '/' if self.peek_second() == Some('/') => {
                    while let Some(&(_, c)) = self.chars.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance_char();
                    }
                }
                _ => break,
            }
        }
    }

    /// One-character lookahead for two-character operators.
    fn pick(&mut self, second: char, double: TokenKind, single: TokenKind) -> TokenKind {
        if self.chars.peek().map(|&(_, c)| c) == Some(second) {
            self.advance_char();
            double
        } else {
            single
        }
    }

    fn read_identifier(&mut self, start: usize) -> TokenKind {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance_char();
            } else {
                break;
            }
        }

        let end = self.current_index();
        let ident = &self.input[start..end];
        TokenKind::keyword(ident).unwrap_or(TokenKind::Identifier)
    }

    fn read_number(&mut self) -> TokenKind {
        self.skip_digits();

        let has_fraction = self.chars.peek().map(|&(_, c)| c) == Some('.')
            && self.peek_second().is_some_and(|c| c.is_ascii_digit());
        if has_fraction {
            self.advance_char(); // Consume '.'
            self.skip_digits();
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntegerLiteral
        }
    }

    fn skip_digits(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_digit() {
                self.advance_char();
            } else {
                break;
            }
        }
    }

    fn read_string(&mut self, line: usize, column: usize) -> Option<TokenKind> {
        while let Some((_, c)) = self.advance_char() {
            match c {
                '"' => return Some(TokenKind::StringLiteral),
                '\\' => {
                    self.advance_char(); // Escaped character
                }
                _ => {}
            }
        }
        self.report(LexError::UnterminatedString { line, column });
        None
    }

    fn read_char(&mut self, line: usize, column: usize) -> Option<TokenKind> {
        let value = self.advance_char().map(|(_, c)| c);
        if value == Some('\\') {
            self.advance_char(); // Escaped character
        }
        if value.is_some() && self.chars.peek().map(|&(_, c)| c) == Some('\'') {
            self.advance_char();
            return Some(TokenKind::CharLiteral);
        }
        self.report(LexError::UnterminatedChar { line, column });
        None
    }

    fn report(&mut self, error: LexError) {
        warn!("{error}");
        self.errors.push(error);
    }

    fn advance_char(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if let Some((_, c)) = next {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        next
    }

    fn peek_second(&self) -> Option<char> {
        let mut lookahead = self.chars.clone();
        lookahead.next();
        lookahead.next().map(|(_, c)| c)
    }

    fn current_index(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.eof_emitted {
            return None;
        }
        let token = self.next_token();
        self.eof_emitted = token.kind == TokenKind::EOF;
        Some(token)
    }
}

/// Tokenizes `input`, returning the token stream together with any lexical
/// diagnostics. The stream always ends with exactly one `EOF` token.
pub fn tokenize_with_errors(input: &str) -> (Vec<Token<'_>>, Vec<LexError>) {
    let mut lexer = Lexer::new(input);
    let tokens = lexer.by_ref().collect::<Vec<_>>();
    debug!(
        "lexed {} tokens with {} errors",
        tokens.len(),
        lexer.errors().len()
    );
    (tokens, lexer.into_errors())
}

pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    tokenize_with_errors(input).0
}
