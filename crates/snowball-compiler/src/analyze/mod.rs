//! Semantic analysis of a built program.
//!
//! Runs in this order:
//! 1. `fold` - constant arithmetic and the rewrites it enables
//! 2. `normalize` - no-op literals, `not booltest`, grouping scans
//! 3. `amongs` - among tables, then routine-end markers
//! 4. `signals` - reachability from the externals and static signals,
//!    pruning commands that can never run
//! 5. `names` - unused and unreachable names, dead stores
//! 6. `amongs` again - drop unreachable tables, re-merge actions
//! 7. `localise` - routine-local variables and shared slots
//!
//! Hard errors stop the pipeline at the end of the stage that reported them.

mod amongs;
mod fold;
mod localise;
mod names;
mod normalize;
mod signals;

#[cfg(test)]
mod fold_tests;
#[cfg(test)]
mod localise_tests;
#[cfg(test)]
mod names_tests;

pub use localise::{SetBeforeUse, always_set_before_use};

use snowball_core::{AmongId, NameId, NodeId, NodeKind, Program};

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::tables::{Among, Grouping, build_groupings};
use crate::{Error, PassResult};

/// A program ready for code generation.
#[derive(Debug, Clone)]
pub struct AnalyzedProgram {
    pub program: Program,
    /// Indexed by [`AmongId`]; tables of unreachable amongs have `used == false`.
    pub amongs: Vec<Among>,
    /// Surviving groupings in definition order.
    pub groupings: Vec<Grouping>,
    /// Number of shared variables kept in the per-instance state.
    pub variable_count: usize,
}

impl AnalyzedProgram {
    pub fn among(&self, id: AmongId) -> &Among {
        &self.amongs[id.index()]
    }

    /// Amongs that survived pruning, in table number order.
    pub fn used_amongs(&self) -> impl Iterator<Item = &Among> {
        self.amongs.iter().filter(|a| a.used)
    }

    pub fn grouping(&self, name: NameId) -> Option<&Grouping> {
        self.groupings.iter().find(|g| g.name == name)
    }
}

pub fn analyze(mut program: Program, config: &Config) -> PassResult<AnalyzedProgram> {
    let mut diagnostics = Diagnostics::new();

    fold::fold_program(&mut program, &mut diagnostics);
    normalize::normalize_program(&mut program, &mut diagnostics);
    let mut groupings = build_groupings(&program, &mut diagnostics);
    checkpoint(&diagnostics)?;

    let mut amongs = amongs::build_amongs(&mut program, &mut diagnostics);
    normalize::append_function_ends(&mut program);
    checkpoint(&diagnostics)?;

    names::check_defined(&program, &mut diagnostics);
    checkpoint(&diagnostics)?;

    signals::visit_externals(&mut program, &mut amongs, &mut diagnostics);
    names::prune_names(&mut program, &amongs, &mut diagnostics);
    names::unlink_pruned(&mut program, &mut groupings);
    names::eliminate_dead_stores(&mut program, &amongs, &mut diagnostics);
    amongs::finalise_amongs(&mut program, &mut amongs);

    let variable_count = localise::localise(&mut program, &amongs, config.target, &mut diagnostics);
    checkpoint(&diagnostics)?;

    let analyzed = AnalyzedProgram {
        program,
        amongs,
        groupings,
        variable_count,
    };
    Ok((analyzed, diagnostics))
}

fn checkpoint(diagnostics: &Diagnostics) -> Result<(), Error> {
    if diagnostics.error_limit_reached() {
        return Err(Error::TooManyErrors(diagnostics.clone()));
    }
    if diagnostics.has_errors() {
        return Err(Error::Analyze(diagnostics.clone()));
    }
    Ok(())
}

/// Every node under `first` (following `right` links), children before
/// their parent.
///
/// An among whose table is built is entered through its actions; an unbuilt
/// one through the action lists among its items. Case strings, gate calls
/// and the back link from an among to its substring are not visited.
pub(crate) fn postorder(program: &Program, amongs: &[Among], first: Option<NodeId>) -> Vec<NodeId> {
    let mut out = Vec::new();
    collect(program, amongs, first, &mut out);
    out
}

fn collect(program: &Program, amongs: &[Among], first: Option<NodeId>, out: &mut Vec<NodeId>) {
    let mut next = first;
    while let Some(id) = next {
        collect_one(program, amongs, id, out);
        let node = program.node(id);
        // The right operand of a binary operator is a child, not a sibling.
        next = if is_binary(node.kind) { None } else { node.right };
    }
}

/// Like `collect`, for one node without its `right` siblings.
fn collect_one(program: &Program, amongs: &[Among], id: NodeId, out: &mut Vec<NodeId>) {
    let node = program.node(id);
    if node.kind == NodeKind::Among {
        match node.among.and_then(|a| amongs.get(a.index())) {
            Some(among) => {
                for &action in &among.actions {
                    collect_one(program, amongs, action, out);
                }
            }
            None => {
                for item in program.chain(node.left) {
                    if program.node(item).kind == NodeKind::Bra {
                        collect_one(program, amongs, item, out);
                    }
                }
            }
        }
    } else {
        collect(program, amongs, node.ae, out);
        collect(program, amongs, node.left, out);
        collect(program, amongs, node.aux, out);
        if is_binary(node.kind) {
            collect(program, amongs, node.right, out);
        }
    }
    out.push(id);
}

pub(crate) fn is_binary(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Plus | NodeKind::Minus | NodeKind::Multiply | NodeKind::Divide
    )
}

/// The nodes of every routine body still in the program.
pub(crate) fn live_nodes(program: &Program, amongs: &[Among]) -> Vec<NodeId> {
    let mut out = Vec::new();
    for &define in &program.routines {
        collect_one(program, amongs, define, &mut out);
    }
    out
}
