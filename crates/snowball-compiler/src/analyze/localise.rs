//! Routine-local variables and shared slot numbers.
//!
//! A variable mentioned in one routine only can live in that routine's
//! frame when every path through the routine sets it before reading it.
//! Otherwise a call could observe the value left by a previous call.

use snowball_core::{NameId, NameKind, NodeId, NodeKind, Program};

use crate::config::Target;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::tables::Among;

/// Outcome of checking one command for a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetBeforeUse {
    /// Some path reads the variable before setting it.
    UseBeforeSet,
    /// Neither, so far: keep looking at what follows.
    Unknown,
    /// Every path sets the variable before any read.
    SetBeforeAnyUse,
}

use SetBeforeUse::{SetBeforeAnyUse, Unknown, UseBeforeSet};

/// Whether `variable` can be made local to the routine defined by `define`.
///
/// Errs on the side of keeping variables shared.
pub fn always_set_before_use(
    program: &Program,
    amongs: &[Among],
    define: NodeId,
    variable: NameId,
) -> bool {
    let checker = Checker {
        program,
        amongs,
        define,
        variable,
    };
    checker.chain(program.node(define).left) != UseBeforeSet
}

struct Checker<'a> {
    program: &'a Program,
    amongs: &'a [Among],
    define: NodeId,
    variable: NameId,
}

impl Checker<'_> {
    /// A sequence: the first command that decides, decides.
    fn chain(&self, first: Option<NodeId>) -> SetBeforeUse {
        for id in self.program.chain(first) {
            let r = self.check(id);
            if r != Unknown {
                return r;
            }
        }
        Unknown
    }

    fn check_opt(&self, id: Option<NodeId>) -> SetBeforeUse {
        id.map_or(Unknown, |id| self.check(id))
    }

    /// A command that may or may not run its operand.
    fn optional(&self, id: Option<NodeId>) -> SetBeforeUse {
        match self.check_opt(id) {
            UseBeforeSet => UseBeforeSet,
            _ => Unknown,
        }
    }

    /// Every alternative must set the variable for the whole to.
    fn all_of(&self, alternatives: impl Iterator<Item = NodeId>) -> SetBeforeUse {
        let mut all_set = true;
        for id in alternatives {
            match self.check(id) {
                UseBeforeSet => return UseBeforeSet,
                r => all_set &= r == SetBeforeAnyUse,
            }
        }
        if all_set { SetBeforeAnyUse } else { Unknown }
    }

    fn then(&self, first: SetBeforeUse, second: Option<NodeId>) -> SetBeforeUse {
        if first != Unknown {
            return first;
        }
        self.check_opt(second)
    }

    fn names_variable(&self, id: NodeId) -> bool {
        self.program.node(id).name == Some(self.variable)
    }

    fn check(&self, id: NodeId) -> SetBeforeUse {
        let node = self.program.node(id);
        match node.kind {
            NodeKind::Call => {
                let target = node.name.and_then(|n| self.program.name(n).definition);
                if target == Some(self.define) {
                    // A recursive call would see the caller's value.
                    UseBeforeSet
                } else {
                    Unknown
                }
            }
            NodeKind::Among => match node.among {
                Some(among) => self.all_of(self.amongs[among.index()].actions.iter().copied()),
                None => Unknown,
            },
            NodeKind::Or => self.all_of(self.program.chain(node.left)),
            NodeKind::And | NodeKind::Bra => self.chain(node.left),

            NodeKind::Backwards | NodeKind::Not | NodeKind::Reverse | NodeKind::Test => {
                self.check_opt(node.left)
            }
            NodeKind::Do
            | NodeKind::Fail
            | NodeKind::GoPast
            | NodeKind::Goto
            | NodeKind::Try
            | NodeKind::Repeat => self.optional(node.left),

            NodeKind::AtLeast | NodeKind::Loop => {
                if self.check_opt(node.ae) == UseBeforeSet {
                    return UseBeforeSet;
                }
                self.check_opt(node.left)
            }
            NodeKind::SetLimit => self.then(self.check_opt(node.left), node.aux),

            NodeKind::MathAssign => {
                // `x = x + 1` reads `x` first.
                if self.check_opt(node.ae) == UseBeforeSet {
                    UseBeforeSet
                } else if self.names_variable(id) {
                    SetBeforeAnyUse
                } else {
                    Unknown
                }
            }
            NodeKind::AssignTo
            | NodeKind::Set
            | NodeKind::SetMark
            | NodeKind::SliceTo
            | NodeKind::Unset => {
                if self.names_variable(id) {
                    SetBeforeAnyUse
                } else {
                    Unknown
                }
            }
            NodeKind::PlusAssign
            | NodeKind::MinusAssign
            | NodeKind::MultiplyAssign
            | NodeKind::DivideAssign => {
                if self.names_variable(id) {
                    UseBeforeSet
                } else {
                    self.optional(node.ae)
                }
            }

            NodeKind::AtMark | NodeKind::Hop | NodeKind::ToMark => self.optional(node.ae),

            NodeKind::Assign
            | NodeKind::Attach
            | NodeKind::BoolTest
            | NodeKind::Insert
            | NodeKind::NamedString
            | NodeKind::NotBoolTest
            | NodeKind::SliceFrom
            | NodeKind::Variable
            | NodeKind::LenOf
            | NodeKind::SizeOf => {
                if self.names_variable(id) {
                    UseBeforeSet
                } else {
                    Unknown
                }
            }

            NodeKind::Dollar => {
                if self.names_variable(id) {
                    UseBeforeSet
                } else {
                    self.check_opt(node.left)
                }
            }

            NodeKind::FunctionEnd => SetBeforeAnyUse,

            NodeKind::Plus | NodeKind::Minus | NodeKind::Multiply | NodeKind::Divide => {
                self.then(self.check_opt(node.left), node.right)
            }
            kind if kind.is_relational() => self.then(self.check_opt(node.left), node.ae),
            NodeKind::Neg => self.check_opt(node.left),

            _ => Unknown,
        }
    }
}

/// Decides which variables become routine locals and numbers the rest.
///
/// Returns the number of shared variables.
pub(super) fn localise(
    program: &mut Program,
    amongs: &[Among],
    target: Target,
    diagnostics: &mut Diagnostics,
) -> usize {
    let mut next_slot = [0u32; 3];
    for (id, name) in program.live_names().map(|(id, n)| (id, n.clone())).collect::<Vec<_>>() {
        let mut local_to = name.local_to;
        if let Some(routine) = local_to {
            let define = program.name(routine).definition;
            let localisable = target.localises(name.kind)
                && define.is_some_and(|d| always_set_before_use(program, amongs, d, id));
            if target.localises(name.kind) && !localisable {
                let routine_name = &program.name(routine).text;
                let line = define.map_or(name.declaration_line, |d| program.node(d).line);
                let detail = format!(
                    "{} `{}` to routine `{}`",
                    name.kind.describe(),
                    name.text,
                    routine_name
                );
                diagnostics
                    .report(DiagnosticKind::NotLocalised, line)
                    .message(detail)
                    .emit();
            }
            if !localisable {
                local_to = None;
            }
        }

        let slot = match (local_to, name.kind) {
            (None, NameKind::String) => Some(0),
            (None, NameKind::Boolean) => Some(1),
            (None, NameKind::Integer) => Some(2),
            _ => None,
        }
        .map(|kind: usize| {
            let slot = next_slot[kind];
            next_slot[kind] += 1;
            slot
        });

        let name = program.name_mut(id);
        name.local_to = local_to;
        name.slot = slot;
    }
    next_slot.iter().sum::<u32>() as usize
}
