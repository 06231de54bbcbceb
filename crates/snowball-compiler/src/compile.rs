//! The whole pipeline: analysis, then generation.

use snowball_core::Program;

use crate::analyze::analyze;
use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::generate::generate;
use crate::Result;

/// The generated files plus the warnings and notes reported on the way.
#[derive(Debug, Clone)]
pub struct CompiledUnit {
    pub source: String,
    pub header: String,
    pub diagnostics: Diagnostics,
}

/// Compiles a built program to C or C++.
///
/// Analysis errors abort before anything is generated; warnings travel
/// with the result.
///
/// ```
/// use snowball_compiler::{Config, compile};
/// use snowball_core::{NameKind, ProgramBuilder};
///
/// let mut b = ProgramBuilder::default();
/// b.declare(NameKind::External, "stem");
/// b.define("stem", |b| b.literal("x"));
/// let unit = compile(b.finish().unwrap(), &Config::new("demo")).unwrap();
/// assert!(unit.source.contains("extern int stem(struct SN_env * z) {"));
/// assert!(unit.header.contains("extern struct SN_env * create_env(void);"));
/// ```
pub fn compile(program: Program, config: &Config) -> Result<CompiledUnit> {
    let (analyzed, diagnostics) = analyze(program, config)?;
    let generated = generate(&analyzed, config)?;
    Ok(CompiledUnit {
        source: generated.source,
        header: generated.header,
        diagnostics,
    })
}
