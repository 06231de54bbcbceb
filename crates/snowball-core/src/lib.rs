#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Data model shared by the Snowball compiler stages.
//!
//! - `node` - combinator tree nodes, match directions and signals
//! - `name` - the name table
//! - `program` - the arena owning nodes, names and grouping definitions
//! - `builder` - programmatic construction with front-end bookkeeping
//! - `dump` - indented tree rendering

mod builder;
mod dump;
mod encoding;
mod grouping;
mod name;
mod node;
mod program;


pub use builder::{AmongItem, BuildError, BuildErrorKind, GroupingSource, ProgramBuilder, StringArg};
pub use dump::{ProgramPrinter, render_literal};
pub use encoding::Encoding;
pub use grouping::{GroupingDef, GroupingOp, GroupingTerm};
pub use name::{AmongId, GroupingId, Name, NameId, NameKind};
pub use node::{Mode, Node, NodeId, NodeKind, Signal};
pub use program::{AmongSite, Chain, Program};
