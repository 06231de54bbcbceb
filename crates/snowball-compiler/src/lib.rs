//! Compiler backend for Snowball stemming programs.
//!
//! Takes the combinator tree built by the front end and turns it into C or
//! C++ source:
//!
//! - `analyze` - constant folding, among construction, signals,
//!   reachability, dead stores and localisation
//! - `tables` - among tables, grouping bitmaps and the literal pool
//! - `generate` - the backtracking code generator
//! - `diagnostics` - errors and warnings with source lines
//! - `config` - target language and output options
//! - `compile` - the whole pipeline

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod analyze;
pub mod compile;
pub mod config;
pub mod diagnostics;
pub mod generate;
pub mod tables;

#[cfg(test)]
mod compile_tests;
#[cfg(test)]
pub mod test_utils;

pub use analyze::{AnalyzedProgram, analyze};
pub use compile::{CompiledUnit, compile};
pub use config::{Config, Target};
pub use diagnostics::{DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity};
pub use generate::{GenerateError, GeneratedUnit};

/// Result of a pass that may also report warnings.
pub type PassResult<T> = std::result::Result<(T, Diagnostics), Error>;

/// Errors that stop a compilation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("analysis failed with {} errors", .0.error_count())]
    Analyze(Diagnostics),

    #[error("too many errors ({})", .0.error_count())]
    TooManyErrors(Diagnostics),

    #[error(transparent)]
    Generate(#[from] GenerateError),
}

impl Error {
    /// Diagnostics collected before the failure, if any.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Error::Analyze(d) | Error::TooManyErrors(d) => Some(d),
            Error::Generate(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
