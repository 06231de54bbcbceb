//! Name table checks: undefined, unused and unreachable names, and dead
//! stores.

use std::collections::HashSet;

use snowball_core::{NameId, NameKind, NodeId, NodeKind, Program, Signal};

use super::{live_nodes, postorder};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::tables::{Among, Grouping};

/// `kind 'name'`, as used in name diagnostics.
fn describe(program: &Program, id: NameId) -> String {
    let name = program.name(id);
    format!("{} '{}'", name.kind.describe(), name.text)
}

/// Routines and groupings that are used must be defined.
pub(super) fn check_defined(program: &Program, diagnostics: &mut Diagnostics) {
    for (id, name) in program.names() {
        let Some(first_use) = name.first_use else {
            continue;
        };
        let undefined = match name.kind {
            NameKind::Routine | NameKind::External => name.definition.is_none(),
            NameKind::Grouping => name.grouping.is_none(),
            _ => false,
        };
        if undefined {
            diagnostics
                .report(DiagnosticKind::UsedButNotDefined, program.node(first_use).line)
                .message(describe(program, id))
                .emit();
        }
    }
}

/// Warns about names that serve no purpose and prunes them, along with the
/// routines no external reaches.
pub(super) fn prune_names(program: &mut Program, amongs: &[Among], diagnostics: &mut Diagnostics) {
    for id in program.name_ids() {
        let name = program.name(id);
        let line = name.declaration_line;

        if name.references == 0 {
            let kind = match name.kind {
                NameKind::Routine | NameKind::External | NameKind::Grouping => {
                    DiagnosticKind::DeclaredButNotDefined
                }
                _ => DiagnosticKind::DeclaredButNotUsed,
            };
            report(program, id, kind, line, diagnostics);
            program.name_mut(id).pruned = true;
            continue;
        }

        // A grouping may exist only to define other groupings.
        if matches!(name.kind, NameKind::Routine | NameKind::Grouping)
            && name.first_use.is_none()
            && !name.used_in_definition
        {
            let defined_at = match (name.definition, name.grouping) {
                (Some(define), _) => program.node(define).line,
                (None, Some(grouping)) => program.grouping(grouping).line,
                (None, None) => line,
            };
            report(program, id, DiagnosticKind::DefinedButNotUsed, defined_at, diagnostics);
            program.name_mut(id).pruned = true;
            continue;
        }

        if name.kind.is_variable() {
            if !name.initialised {
                report(program, id, DiagnosticKind::NeverInitialised, line, diagnostics);
            } else if !name.value_used {
                report(program, id, DiagnosticKind::SetButNeverUsed, line, diagnostics);
                remove_dead_assignments(program, amongs, id);
                program.name_mut(id).pruned = true;
                continue;
            }
        }

        let name = program.name(id);
        if !name.reachable {
            // Other kinds only appear inside unreachable routines, which
            // get the warning.
            if name.kind == NameKind::Routine {
                report(program, id, DiagnosticKind::UnreachableRoutine, line, diagnostics);
            }
            program.name_mut(id).pruned = true;
        }
    }
}

fn report(program: &Program, id: NameId, kind: DiagnosticKind, line: u32, diagnostics: &mut Diagnostics) {
    let detail = match kind {
        DiagnosticKind::UnreachableRoutine => program.name(id).text.clone(),
        _ => describe(program, id),
    };
    diagnostics.report(kind, line).message(detail).emit();
}

/// Drops routines and groupings whose names were pruned.
pub(super) fn unlink_pruned(program: &mut Program, groupings: &mut Vec<Grouping>) {
    let routines = std::mem::take(&mut program.routines);
    program.routines = routines
        .into_iter()
        .filter(|&define| {
            program
                .node(define)
                .name
                .is_some_and(|n| program.name(n).is_live())
        })
        .collect();
    groupings.retain(|g| program.name(g.name).is_live());
}

/// Removes stores to variables whose value nothing reads any more.
///
/// Removing one store can remove the last read of another variable (as in
/// `$a = b`), so this repeats until nothing changes.
pub(super) fn eliminate_dead_stores(program: &mut Program, amongs: &[Among], diagnostics: &mut Diagnostics) {
    loop {
        let read = live_reads(program, amongs);
        let dead: Vec<NameId> = program
            .live_names()
            .filter(|(id, n)| n.kind.is_variable() && n.initialised && !read.contains(id))
            .map(|(id, _)| id)
            .collect();
        if dead.is_empty() {
            return;
        }
        for id in dead {
            let line = program.name(id).declaration_line;
            report(program, id, DiagnosticKind::SetButNeverUsed, line, diagnostics);
            remove_dead_assignments(program, amongs, id);
            program.name_mut(id).pruned = true;
        }
    }
}

/// Variables whose value some surviving command reads.
fn live_reads(program: &Program, amongs: &[Among]) -> HashSet<NameId> {
    let nodes = live_nodes(program, amongs);

    // `$x = x + 1` amends `x` without reading it for any other purpose.
    let mut self_references: HashSet<NodeId> = HashSet::new();
    for &id in &nodes {
        let node = program.node(id);
        if node.kind.is_integer_assign() {
            for inner in postorder(program, amongs, node.ae) {
                if program.node(inner).name == node.name {
                    self_references.insert(inner);
                }
            }
        }
    }

    nodes
        .iter()
        .filter(|id| !self_references.contains(id))
        .filter_map(|&id| {
            let node = program.node(id);
            let reads = matches!(
                node.kind,
                NodeKind::BoolTest
                    | NodeKind::NotBoolTest
                    | NodeKind::NamedString
                    | NodeKind::Assign
                    | NodeKind::Insert
                    | NodeKind::Attach
                    | NodeKind::SliceFrom
                    | NodeKind::LenOf
                    | NodeKind::SizeOf
                    | NodeKind::Dollar
                    | NodeKind::Variable
            );
            if reads { node.name } else { None }
        })
        .collect()
}

fn remove_dead_assignments(program: &mut Program, amongs: &[Among], id: NameId) {
    let bodies: Vec<_> = program.routines.iter().map(|&d| program.node(d).left).collect();
    for body in bodies {
        for node_id in postorder(program, amongs, body) {
            let node = program.node_mut(node_id);
            if node.name != Some(id) {
                continue;
            }
            let is_store = node.kind.is_integer_assign()
                || matches!(
                    node.kind,
                    NodeKind::AssignTo
                        | NodeKind::SliceTo
                        | NodeKind::SetMark
                        | NodeKind::Set
                        | NodeKind::Unset
                        | NodeKind::Dollar
                );
            if is_store {
                node.make_true();
                node.signal = Signal::Succeeds;
            }
        }
    }
}
