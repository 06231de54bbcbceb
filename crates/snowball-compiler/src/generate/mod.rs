//! Backtracking code generation for C and C++.
//!
//! Every routine becomes one function returning 1 on success, 0 on failure
//! and a negative value on a runtime error. Failure inside a routine jumps
//! to the innermost recovery label, running an undo string (restoring the
//! cursor or a limit) first; with no label installed it returns 0.
//!
//! - `writer` - indentation, labels and blocks
//! - `emitter` - per-unit and per-routine state, names and literals
//! - `commands` - one method per command
//! - `among` - dispatch code and among tables
//! - `unit` - the source and header files around the routines
//! - `cost` - whether a command can move the cursor
//! - `comment` - source comments in comments mode

mod among;
mod commands;
mod comment;
mod cost;
mod emitter;
mod unit;
mod writer;

#[cfg(test)]
mod commands_tests;
#[cfg(test)]
mod writer_tests;

pub use cost::{k_needed, repeat_restore};
pub use unit::generate;

use snowball_core::Encoding;

/// Generated source and interface for one compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    pub source: String,
    pub header: String,
}

/// The analysed program has a shape the generator can not translate.
///
/// None of these occur for programs that went through analysis; they
/// guard hand-built trees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("line {line}: `{token}` can not be generated as a command")]
    MisplacedNode { token: &'static str, line: u32 },

    #[error("line {line}: `{token}` without an operand")]
    MissingOperand { token: &'static str, line: u32 },

    #[error("line {line}: `{token}` without a name")]
    MissingName { token: &'static str, line: u32 },

    #[error("line {line}: among without a table")]
    UnresolvedAmong { line: u32 },

    #[error("line {line}: grouping `{name}` without a table")]
    UnresolvedGrouping { name: String, line: u32 },

    #[error("program was built for {program:?} but the output is configured for {config:?}")]
    EncodingMismatch { program: Encoding, config: Encoding },
}

pub type Result<T> = std::result::Result<T, GenerateError>;
