//! Declared names: variables, routines, externals and groupings.

use serde::Serialize;

use crate::node::{Mode, NodeId};

/// Index of a name in the program's name table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NameId(u32);

impl NameId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a grouping definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GroupingId(u32);

impl GroupingId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of an among table.
///
/// Assigned in the order the amongs were completed by the front end, which
/// means an among nested in another among's action comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AmongId(u32);

impl AmongId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NameKind {
    String,
    Boolean,
    Integer,
    Routine,
    External,
    Grouping,
}

impl NameKind {
    pub fn describe(self) -> &'static str {
        match self {
            NameKind::String => "string",
            NameKind::Boolean => "boolean",
            NameKind::Integer => "integer",
            NameKind::Routine => "routine",
            NameKind::External => "external",
            NameKind::Grouping => "grouping",
        }
    }

    pub fn is_variable(self) -> bool {
        matches!(self, NameKind::String | NameKind::Boolean | NameKind::Integer)
    }

    pub fn is_routine(self) -> bool {
        matches!(self, NameKind::Routine | NameKind::External)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Name {
    pub text: String,
    pub kind: NameKind,
    /// Direction of a routine or external, fixed by its definition or first call.
    pub mode: Option<Mode>,
    /// Some command reads the variable's value.
    pub value_used: bool,
    /// Some command sets the variable.
    pub initialised: bool,
    /// The grouping appears in another grouping's definition.
    pub used_in_definition: bool,
    /// The routine holds an among needing the `among_var` dispatch variable.
    pub amongvar_needed: bool,
    /// `Define` node of a routine or external.
    pub definition: Option<NodeId>,
    pub grouping: Option<GroupingId>,
    /// Reached from an external by the analyser.
    pub reachable: bool,
    /// Dense per-kind slot of a surviving shared name.
    pub slot: Option<u32>,
    /// Number of times the name was mentioned after its declaration.
    pub references: u32,
    /// First node using the name.
    pub first_use: Option<NodeId>,
    /// The single routine or external referring to the name, if there is one.
    pub local_to: Option<NameId>,
    pub declaration_line: u32,
    /// Removed from the program by the analyser.
    pub pruned: bool,
}

impl Name {
    pub fn new(text: impl Into<String>, kind: NameKind, declaration_line: u32) -> Self {
        Self {
            text: text.into(),
            kind,
            mode: None,
            value_used: false,
            initialised: false,
            used_in_definition: false,
            amongvar_needed: false,
            definition: None,
            grouping: None,
            reachable: false,
            slot: None,
            references: 0,
            first_use: None,
            local_to: None,
            declaration_line,
            pruned: false,
        }
    }

    pub fn is_live(&self) -> bool {
        !self.pruned
    }

    /// Stored in per-instance state rather than as a routine local.
    pub fn is_shared(&self) -> bool {
        self.local_to.is_none()
    }
}
