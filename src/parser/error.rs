use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Expected {expected}, got '{found}' at line {line}")]
    Expected {
        expected: &'static str,
        found: String,
        line: usize,
    },
    #[error("Unexpected token '{found}' at line {line}")]
    UnexpectedToken { found: String, line: usize },
    #[error("Statement must start with an identifier, got '{found}' at line {line}")]
    InvalidStatementStart { found: String, line: usize },
    #[error("Expression nests deeper than {limit} levels at line {line}")]
    NestingTooDeep { limit: usize, line: usize },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::Expected { line, .. }
            | ParseError::UnexpectedToken { line, .. }
            | ParseError::InvalidStatementStart { line, .. }
            | ParseError::NestingTooDeep { line, .. } => *line,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
