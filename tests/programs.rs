use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail, ensure};

use stackc::vm::VM;
use stackc::{PipelineOptions, RunError, compile, run};

fn normalize_output(output: &str) -> String {
    output.replace("\r\n", "\n").trim_end().to_string()
}

fn render_state(vm: &VM) -> String {
    vm.bindings()
        .into_iter()
        .map(|(name, value)| format!("{name} = {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn load_programs(programs_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut programs = Vec::new();
    for entry in
        fs::read_dir(programs_dir).with_context(|| format!("Reading {}", programs_dir.display()))?
    {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("src") {
            programs.push(path);
        }
    }
    ensure!(
        !programs.is_empty(),
        "No .src programs found in {}",
        programs_dir.display()
    );
    programs.sort();
    Ok(programs)
}

fn check_failure(path: &Path, source: &str, expected_error: &str) -> Result<()> {
    let compilation = compile(source);
    let error = if compilation.has_errors() {
        compilation
            .diagnostics
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        match run(source, PipelineOptions::default()) {
            Ok(vm) => bail!(
                "Expected failure for {}, got state:\n{}",
                path.display(),
                render_state(&vm)
            ),
            Err(RunError::Runtime(err)) => err.to_string(),
            Err(err) => bail!("Unexpected error for {}: {err}", path.display()),
        }
    };
    ensure!(
        error.contains(expected_error),
        "Expected error containing '{expected_error}' for {}, got '{error}'",
        path.display()
    );
    Ok(())
}

#[test]
fn runs_fixture_programs() -> Result<()> {
    for path in load_programs(Path::new("tests/programs"))? {
        let source =
            fs::read_to_string(&path).with_context(|| format!("Reading {}", path.display()))?;

        let expected_error_path = path.with_extension("err");
        if expected_error_path.exists() {
            let expected_error = fs::read_to_string(&expected_error_path)
                .with_context(|| format!("Reading {}", expected_error_path.display()))?;
            check_failure(&path, &source, expected_error.trim())?;
            continue;
        }

        let expected_path = path.with_extension("out");
        let expected = fs::read_to_string(&expected_path)
            .with_context(|| format!("Reading {}", expected_path.display()))?;
        let vm = run(&source, PipelineOptions::default())
            .with_context(|| format!("Running {}", path.display()))?;
        assert_eq!(
            render_state(&vm),
            normalize_output(&expected),
            "Final state mismatch for {}",
            path.display()
        );
    }
    Ok(())
}
