use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use log::LevelFilter;

use stackc::pipeline::{self, PipelineOptions};
use stackc::vm::VM;
use stackc::{bytecode, ir};

static USAGE: &str = "usage: stackc [--emit tokens|ast|ir|bytecode|state]... [--keep-going] [FILE]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Tokens,
    Ast,
    Ir,
    Bytecode,
    State,
}

impl Stage {
    fn from_name(name: &str) -> Result<Self> {
        let stage = match name {
            "tokens" => Stage::Tokens,
            "ast" => Stage::Ast,
            "ir" => Stage::Ir,
            "bytecode" => Stage::Bytecode,
            "state" => Stage::State,
            _ => bail!("Unknown stage '{name}'\n{USAGE}"),
        };
        Ok(stage)
    }
}

struct Args {
    emit: Vec<Stage>,
    options: PipelineOptions,
    input_path: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut emit = Vec::new();
    let mut options = PipelineOptions::default();
    let mut input_path: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--emit" | "-e" => {
                let name = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("Missing stage name after {arg}"))?;
                emit.push(Stage::from_name(&name)?);
            }
            "--keep-going" | "-k" => options.keep_going = true,
            "--help" | "-h" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            _ => {
                if input_path.is_some() {
                    bail!("Only one input file is supported");
                }
                input_path = Some(arg);
            }
        }
    }

    if emit.is_empty() {
        emit.push(Stage::State);
    }
    Ok(Args {
        emit,
        options,
        input_path,
    })
}

fn main() -> Result<ExitCode> {
    simple_logger::SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()
        .context("Installing logger")?;

    let args = parse_args()?;
    let source = if let Some(path) = &args.input_path {
        fs::read_to_string(path).with_context(|| format!("Reading {path}"))?
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Reading stdin")?;
        buffer
    };

    let compilation = pipeline::compile(&source);
    let emits = |stage| args.emit.contains(&stage);

    if emits(Stage::Tokens) {
        println!("[Tokens]");
        for token in &compilation.tokens {
            println!("{token}");
        }
    }
    if emits(Stage::Ast) {
        println!("\n[AST]\n{}", compilation.program);
    }

    if compilation.has_errors() {
        eprintln!("\nDiagnostics:");
        for diagnostic in &compilation.diagnostics {
            eprintln!("  -> {} error: {diagnostic}", diagnostic.stage());
        }
        if !args.options.keep_going {
            return Ok(ExitCode::FAILURE);
        }
    }

    if emits(Stage::Ir) {
        println!("\n[Intermediate Code]\n{}", ir::render(&compilation.ir));
    }
    if emits(Stage::Bytecode) {
        println!(
            "\n[VM Instructions]\n{}",
            bytecode::render(&compilation.bytecode)
        );
    }

    let mut vm = VM::new();
    vm.execute(&compilation.bytecode)
        .context("Executing program")?;

    if emits(Stage::State) {
        println!("\n[Final State]");
        for (name, value) in vm.bindings() {
            println!("{name} = {value}");
        }
    }
    Ok(ExitCode::SUCCESS)
}
