//! Character class definitions as written by the front end.

use serde::Serialize;

use crate::name::NameId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingOp {
    Add,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GroupingTerm {
    /// Code points of a literal string.
    Chars(Vec<u16>),
    /// Another grouping.
    Grouping(NameId),
}

/// `define name 'aeiou' + other - 'y'`, applied left to right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupingDef {
    /// `None` when the definition was superseded by a redefinition.
    pub name: Option<NameId>,
    pub line: u32,
    pub terms: Vec<(GroupingOp, GroupingTerm)>,
}
