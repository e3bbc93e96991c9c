use stackc::assembler::assemble;
use stackc::codegen::generate;
use stackc::lexer::tokenize;
use stackc::parser::{MAX_NESTING_DEPTH, ParseError, parse_tokens};
use stackc::semantic::{SemanticError, analyze};
use stackc::token::TokenKind;
use stackc::vm::VM;
use stackc::{Diagnostic, PipelineOptions, compile, run};

fn run_clean(source: &str) -> VM {
    run(source, PipelineOptions::default())
        .unwrap_or_else(|err| panic!("running {source:?} failed: {err}"))
}

#[test]
fn arithmetic_round_trip() {
    let vm = run_clean("a = 5 + 3; b = a * 2;");
    assert_eq!(vm.get_variable("a"), Some(8));
    assert_eq!(vm.get_variable("b"), Some(16));
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let vm = run_clean("x = 2 + 3 * 4; y = (2 + 3) * 4;");
    assert_eq!(vm.get_variable("x"), Some(14));
    assert_eq!(vm.get_variable("y"), Some(20));
}

#[test]
fn comparisons_yield_zero_or_one() {
    let vm = run_clean("p = 5 < 3; q = 5 >= 5;");
    assert_eq!(vm.get_variable("p"), Some(0));
    assert_eq!(vm.get_variable("q"), Some(1));
}

#[test]
fn undeclared_reference_is_reported_once() {
    let (program, errors) = parse_tokens(tokenize("z = w + 1;"));
    assert!(errors.is_empty());

    let analysis = analyze(&program);
    assert_eq!(analysis.errors.len(), 1);
    assert_eq!(
        analysis.errors[0],
        SemanticError::UndeclaredVariable {
            name: "w".to_string()
        }
    );
    assert!(analysis.errors[0].to_string().contains("'w'"));
    assert!(analysis.symbols.contains_symbol("z"));
}

#[test]
fn lexer_survives_unknown_characters() {
    let tokens = tokenize("a = 5 # 3;");
    let unknown = tokens
        .iter()
        .filter(|token| token.kind == TokenKind::Unknown)
        .map(|token| token.text)
        .collect::<Vec<_>>();
    assert_eq!(unknown, vec!["#"]);

    let tail = tokens[4..]
        .iter()
        .map(|token| (token.kind, token.text))
        .collect::<Vec<_>>();
    assert_eq!(
        tail,
        vec![
            (TokenKind::IntegerLiteral, "3"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::EOF, ""),
        ]
    );
}

#[test]
fn assembly_is_pure() {
    let (program, _) = parse_tokens(tokenize("a = 1; b = -a * (a - 4) / 2; c = a != b;"));
    let ir = generate(&program);
    assert!(!ir.is_empty());
    assert_eq!(assemble(&ir), assemble(&ir));
}

#[test]
fn parser_recovers_and_later_statements_run() {
    let compilation = compile("x = ; y = 2;");
    assert_eq!(compilation.diagnostics.len(), 1);
    assert!(matches!(compilation.diagnostics[0], Diagnostic::Parse(_)));
    assert!(
        compilation.diagnostics[0]
            .to_string()
            .ends_with("at line 1")
    );

    let vm = run("x = ; y = 2;", PipelineOptions { keep_going: true })
        .expect("remaining statements should execute");
    assert_eq!(vm.get_variable("y"), Some(2));
    assert_eq!(vm.get_variable("x"), None);
}

#[test]
fn stages_chain_through_public_api() {
    let compilation = compile("total = 10 - 3 - 2; flag = !(total == 5);");
    assert!(!compilation.has_errors());
    assert_eq!(compilation.ir.len(), compilation.bytecode.len());
    for (ir, code) in compilation.ir.iter().zip(&compilation.bytecode) {
        assert_eq!(ir.operand1, code.operand1);
        assert_eq!(ir.operand2, code.operand2);
        assert_eq!(ir.label, code.label);
    }

    let mut vm = VM::new();
    let memory = vm
        .execute(&compilation.bytecode)
        .expect("execution should succeed");
    assert_eq!(memory.get("total"), Some(&5));
    assert_eq!(vm.get_variable("flag"), Some(0));
    assert_eq!(vm.variables().len(), 2);
}

#[test]
fn independent_compilations_do_not_share_state() {
    let first = compile("a = 1;");
    let second = compile("b = 2;");
    assert!(first.symbols.contains_symbol("a"));
    assert!(!first.symbols.contains_symbol("b"));
    assert!(!second.symbols.contains_symbol("a"));
    assert_eq!(first.bytecode.len(), 2);
    assert_eq!(second.bytecode.len(), 2);
}

#[test]
fn deep_nesting_is_a_recoverable_syntax_error() {
    let source = format!("x = {}1; y = 2;", "-".repeat(20_000));
    let compilation = compile(&source);
    assert!(matches!(
        compilation.diagnostics.first(),
        Some(Diagnostic::Parse(ParseError::NestingTooDeep { line: 1, .. }))
    ));

    let vm = run(&source, PipelineOptions { keep_going: true })
        .expect("later statements should still execute");
    assert_eq!(vm.get_variable("y"), Some(2));
    assert_eq!(vm.get_variable("x"), None);
}

#[test]
fn nesting_just_under_the_limit_runs() {
    let vm = run_clean(&format!("x = {}1;", "-".repeat(MAX_NESTING_DEPTH - 1)));
    let expected = if (MAX_NESTING_DEPTH - 1) % 2 == 0 { 1 } else { -1 };
    assert_eq!(vm.get_variable("x"), Some(expected));
}
