//! Test utilities: building programs and picking routines out of the
//! generated source.

use snowball_core::{Encoding, Program, ProgramBuilder};

use crate::{AnalyzedProgram, CompiledUnit, Config, Diagnostics, Error, analyze, compile};

pub fn build(f: impl FnOnce(&mut ProgramBuilder)) -> Program {
    build_with(Encoding::SingleByte, f)
}

pub fn build_with(encoding: Encoding, f: impl FnOnce(&mut ProgramBuilder)) -> Program {
    let mut b = ProgramBuilder::new(encoding);
    f(&mut b);
    b.finish().expect("program should build")
}

/// Runs analysis with the default C configuration.
pub fn analyzed(f: impl FnOnce(&mut ProgramBuilder)) -> (AnalyzedProgram, Diagnostics) {
    analyze(build(f), &Config::new("test")).expect("analysis should succeed")
}

/// Runs analysis expecting it to fail, returning what was reported.
pub fn analysis_errors(f: impl FnOnce(&mut ProgramBuilder)) -> Diagnostics {
    match analyze(build(f), &Config::new("test")) {
        Ok(_) => panic!("analysis should fail"),
        Err(Error::Analyze(d) | Error::TooManyErrors(d)) => d,
        Err(err) => panic!("unexpected error: {err}"),
    }
}

pub fn compiled(f: impl FnOnce(&mut ProgramBuilder)) -> CompiledUnit {
    compiled_with(&Config::new("test"), f)
}

pub fn compiled_with(config: &Config, f: impl FnOnce(&mut ProgramBuilder)) -> CompiledUnit {
    let program = build_with(config.encoding, f);
    compile(program, config).expect("compilation should succeed")
}

/// The definition of the C function `name`, from its signature line to the
/// closing brace at the left margin.
pub fn routine(source: &str, name: &str) -> String {
    let signature = format!(" {name}(struct SN_env * z) {{");
    let mut lines = source.lines().skip_while(|l| !l.ends_with(&signature));
    let mut out = Vec::new();
    for line in lines.by_ref() {
        out.push(line);
        if line == "}" {
            break;
        }
    }
    assert!(!out.is_empty(), "no definition of `{name}` in:\n{source}");
    out.join("\n")
}

/// Snapshot of a routine's generated code.
#[macro_export]
macro_rules! shot_routine {
    ($unit:expr, $name:literal, @$snapshot:literal) => {{
        let code = $crate::test_utils::routine(&$unit.source, $name);
        insta::assert_snapshot!(code, @$snapshot);
    }};
}
