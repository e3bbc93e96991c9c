//! Chains the compiler stages and collects their diagnostics.

use log::{debug, info};
use thiserror::Error;

use crate::assembler::assemble;
use crate::ast::Node;
use crate::bytecode::Instruction;
use crate::codegen::generate;
use crate::ir::IrInstruction;
use crate::lexer::{LexError, tokenize_with_errors};
use crate::parser::{ParseError, parse_tokens};
use crate::semantic::{SemanticError, SymbolTable, analyze};
use crate::token::Token;
use crate::vm::{VM, VmError};

/// A recoverable problem reported by one of the frontend stages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

impl Diagnostic {
    pub fn stage(&self) -> &'static str {
        match self {
            Diagnostic::Lex(_) => "lexical",
            Diagnostic::Parse(_) => "syntax",
            Diagnostic::Semantic(_) => "semantic",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Execute even when the frontend reported diagnostics.
    pub keep_going: bool,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("compilation reported {} diagnostic(s)", .0.len())]
    Diagnostics(Vec<Diagnostic>),
    #[error(transparent)]
    Runtime(#[from] VmError),
}

/// Everything the pipeline produced for one source text.
#[derive(Debug, Clone)]
pub struct Compilation<'a> {
    pub tokens: Vec<Token<'a>>,
    pub program: Node,
    pub symbols: SymbolTable,
    pub diagnostics: Vec<Diagnostic>,
    pub ir: Vec<IrInstruction>,
    pub bytecode: Vec<Instruction>,
}

impl Compilation<'_> {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Runs every stage up to bytecode. Diagnostics never stop compilation;
/// statements the parser discarded are simply absent from the output.
pub fn compile(source: &str) -> Compilation<'_> {
    let (tokens, lex_errors) = tokenize_with_errors(source);
    let (program, parse_errors) = parse_tokens(tokens.clone());
    let analysis = analyze(&program);
    let ir = generate(&program);
    let bytecode = assemble(&ir);

    let diagnostics = lex_errors
        .into_iter()
        .map(Diagnostic::from)
        .chain(parse_errors.into_iter().map(Diagnostic::from))
        .chain(analysis.errors.into_iter().map(Diagnostic::from))
        .collect::<Vec<_>>();
    debug!(
        "compiled {} statements into {} instructions, {} diagnostics",
        program.statements().len(),
        bytecode.len(),
        diagnostics.len()
    );

    Compilation {
        tokens,
        program,
        symbols: analysis.symbols,
        diagnostics,
        ir,
        bytecode,
    }
}

/// Compiles and executes `source`, returning the VM for inspection.
pub fn run(source: &str, options: PipelineOptions) -> Result<VM, RunError> {
    let compilation = compile(source);
    if compilation.has_errors() && !options.keep_going {
        return Err(RunError::Diagnostics(compilation.diagnostics));
    }
    if compilation.has_errors() {
        info!(
            "executing despite {} diagnostic(s)",
            compilation.diagnostics.len()
        );
    }

    let mut vm = VM::new();
    vm.execute(&compilation.bytecode)?;
    Ok(vm)
}
