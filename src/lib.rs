pub mod assembler;
pub mod ast;
pub mod bytecode;
pub mod codegen;
pub mod ir;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod semantic;
pub mod token;
pub mod vm;

pub use pipeline::{Compilation, Diagnostic, PipelineOptions, RunError, compile, run};
