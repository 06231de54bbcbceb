//! Constant tables shared by the analyser and the generator.

pub mod among;
pub mod grouping;
pub mod literal_pool;
pub mod matcher;

#[cfg(test)]
mod grouping_tests;
#[cfg(test)]
mod literal_pool_tests;
#[cfg(test)]
mod matcher_tests;

pub use among::{Among, AmongCase, OrderedCases, PreCheck, PreCheckTest, RepeatedCase, order_cases};
pub use grouping::{Grouping, build_groupings};
pub use literal_pool::{LiteralPool, LiteralRef};
pub use matcher::{Cursor, dispatch, find_among, precheck_rejects};
