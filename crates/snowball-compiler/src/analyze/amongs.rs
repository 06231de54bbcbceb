//! Turns each `among` node into an [`Among`] table.
//!
//! Building happens before signal analysis; finalisation runs once
//! unreachable code is gone, re-merging actions that pruning made identical.

use std::collections::HashSet;

use snowball_core::{
    AmongId, AmongSite, Mode, NameId, Node, NodeId, NodeKind, Program, render_literal,
};

use super::live_nodes;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::tables::{Among, AmongCase, order_cases};

pub(super) fn build_amongs(program: &mut Program, diagnostics: &mut Diagnostics) -> Vec<Among> {
    let sites = program.among_sites.clone();
    sites
        .iter()
        .enumerate()
        .map(|(index, site)| build_among(program, AmongId::new(index), site, diagnostics))
        .collect()
}

fn build_among(
    program: &mut Program,
    id: AmongId,
    site: &AmongSite,
    diagnostics: &mut Diagnostics,
) -> Among {
    let slot = site.node;
    let node = program.node(slot);
    let (line, among_mode) = (node.line, node.mode);
    let mut substring = node.aux;
    let mode = substring.map_or(among_mode, |s| program.node(s).mode);

    let mut items = program.chain_ids(node.left);
    let starter = match items.first() {
        Some(&first) if program.node(first).kind == NodeKind::Bra => {
            items.remove(0);
            Some(first)
        }
        _ => None,
    };

    let mut cases: Vec<AmongCase> = Vec::with_capacity(items.len());
    let mut actions: Vec<NodeId> = Vec::new();
    let mut gates: Vec<NameId> = Vec::new();
    let mut always_matches = false;
    // First case still waiting for its action.
    let mut pending = 0;

    for &item in &items {
        let node = program.node(item);
        let item_line = node.line;
        match node.kind {
            NodeKind::LiteralString => {
                let mut case = AmongCase::new(node.literal.clone().unwrap_or_default(), item_line);
                match node.left.and_then(|call| program.node(call).name) {
                    Some(gate) => {
                        check_gate_mode(program, gate, mode, item_line, diagnostics);
                        let index = match gates.iter().position(|&g| g == gate) {
                            Some(i) => i,
                            None => {
                                gates.push(gate);
                                gates.len() - 1
                            }
                        };
                        case.gate = Some(gate);
                        case.function_index = index as u32 + 1;
                    }
                    None if case.text.is_empty() => always_matches = true,
                    None => {}
                }
                cases.push(case);
            }
            // `()`
            NodeKind::Bra if node.left.is_none() => pending = cases.len(),
            NodeKind::Bra => {
                let left = node.left;
                let earlier = cases[..pending]
                    .iter()
                    .filter_map(|c| c.outcome)
                    .find(|&o| program.equivalent(program.node(actions[o as usize - 1]).left, left));
                let outcome = earlier.unwrap_or_else(|| {
                    actions.push(item);
                    actions.len() as u32
                });
                for case in &mut cases[pending..] {
                    case.outcome = Some(outcome);
                }
                pending = cases.len();
            }
            _ => {}
        }
    }

    let no_action_count = cases.iter().filter(|c| c.outcome.is_none()).count();
    let ordered = order_cases(cases, mode);
    for repeat in &ordered.repeated {
        let previous = &ordered.cases[repeat.previous];
        let repeated = &ordered.cases[repeat.repeated];
        diagnostics
            .report(DiagnosticKind::RepeatedAmongString, repeated.line)
            .message(render_literal(program.encoding, &repeated.text))
            .related_to("previously seen here", previous.line)
            .emit();
    }

    // The among proper moves out of the way of the starter.
    let mut among_node = slot;
    if let Some(starter) = starter {
        among_node = program.relocate(slot);
        let first = match substring {
            Some(_) => starter,
            None => {
                let mut synthesised = Node::new(NodeKind::Substring, among_mode, line);
                synthesised.right = Some(starter);
                let s = program.alloc(synthesised);
                substring = Some(s);
                s
            }
        };
        program.node_mut(starter).right = Some(among_node);
        program.node_mut(among_node).left = items.first().copied();
        let wrapper = program.node_mut(slot);
        wrapper.kind = NodeKind::Bra;
        wrapper.left = Some(first);
        wrapper.aux = None;
        wrapper.literal = None;
    }

    let mut among = Among {
        number: 0,
        node: among_node,
        routine: site.routine,
        mode,
        cases: ordered.cases,
        actions,
        no_action_count,
        gates,
        always_matches,
        shortest: ordered.shortest,
        longest: ordered.longest,
        substring,
        amongvar_needed: false,
        used: false,
    };

    if among.cases.len() == 1 {
        eliminate_single_case(program, &among);
        among.substring = None;
        return among;
    }

    let n = program.node_mut(among_node);
    n.among = Some(id);
    n.aux = None;
    if let Some(s) = substring {
        program.node_mut(s).among = Some(id);
    }
    among
}

fn check_gate_mode(
    program: &mut Program,
    gate: NameId,
    mode: Mode,
    line: u32,
    diagnostics: &mut Diagnostics,
) {
    let name = program.name_mut(gate);
    match name.mode {
        None => name.mode = Some(mode),
        Some(m) if m == mode => {}
        Some(_) => {
            let detail = format!("'{}' mis-used in {} mode", name.text, mode.describe());
            diagnostics
                .report(DiagnosticKind::GateModeMismatch, line)
                .message(detail)
                .emit();
        }
    }
}

/// Rewrites an among with one case into plain commands:
///
/// - `substring ... among(S (C))` becomes `S ... (C)`
/// - `substring ... among(S)` becomes `S ... true`
/// - `among(S (C))` becomes `(S C)`
/// - `among(S)` becomes `S`
///
/// A gated case becomes `gate and ...`.
fn eliminate_single_case(program: &mut Program, among: &Among) {
    let case = &among.cases[0];
    let slot = among.node;
    let right = program.node(slot).right;
    let action = case.outcome.map(|o| among.actions[o as usize - 1]);

    let replacement = match (among.substring, action) {
        (Some(substring), action) => {
            let s = program.node_mut(substring);
            s.kind = NodeKind::LiteralString;
            s.literal = Some(case.text.clone());
            s.among = None;
            match action {
                Some(action) => program.node(action).clone(),
                None => {
                    let mut t = program.node(slot).clone();
                    t.make_true();
                    t
                }
            }
        }
        (None, Some(action)) => {
            let mut bra = program.node(action).clone();
            let mut literal = Node::new(NodeKind::LiteralString, among.mode, case.line);
            literal.literal = Some(case.text.clone());
            literal.right = bra.left;
            bra.left = Some(program.alloc(literal));
            bra
        }
        (None, None) => {
            let mut literal = program.node(slot).clone();
            literal.make_true();
            literal.kind = NodeKind::LiteralString;
            literal.literal = Some(case.text.clone());
            literal
        }
    };

    let mut replacement = replacement;
    replacement.right = right;
    *program.node_mut(slot) = replacement;

    if let Some(gate) = case.gate {
        wrap_in_gate(program, slot, gate);
    }
}

/// `gate and C`, built in the slot of `C`.
fn wrap_in_gate(program: &mut Program, slot: NodeId, gate: NameId) {
    let moved = program.relocate(slot);
    let node = program.node(slot);
    let (mode, line) = (node.mode, node.line);

    let mut call = Node::new(NodeKind::Call, mode, line);
    call.name = Some(gate);
    call.right = Some(moved);
    let call = program.alloc(call);

    let and = program.node_mut(slot);
    let right = and.right;
    *and = Node::new(NodeKind::And, mode, line);
    and.left = Some(call);
    and.right = right;
}

/// Numbers the tables still in use and re-merges their actions.
pub(super) fn finalise_amongs(program: &mut Program, amongs: &mut [Among]) {
    // Reached before a later cut removed it from its sequence.
    let live: HashSet<NodeId> = live_nodes(program, amongs).into_iter().collect();
    for among in amongs.iter_mut() {
        among.used = among.used && live.contains(&among.node);
    }

    let mut number = 0;
    for among in amongs.iter_mut().filter(|a| a.used) {
        among.number = number;
        number += 1;

        let mut i = 0;
        while i < among.actions.len() {
            let left = program.node(among.actions[i]).left;
            let merge_with = if program.is_just_true(left) {
                program.node_mut(among.actions[i]).left = None;
                Some(None)
            } else {
                (0..i)
                    .find(|&k| program.equivalent(program.node(among.actions[k]).left, left))
                    .map(|k| Some(k as u32 + 1))
            };
            let Some(merge_with) = merge_with else {
                i += 1;
                continue;
            };

            let outcome = i as u32 + 1;
            for case in &mut among.cases {
                match case.outcome {
                    Some(o) if o == outcome => {
                        case.outcome = merge_with;
                        if merge_with.is_none() {
                            among.no_action_count += 1;
                        }
                    }
                    Some(o) if o > outcome => case.outcome = Some(o - 1),
                    _ => {}
                }
            }
            among.actions.remove(i);
        }

        let actions = among.actions.len();
        among.amongvar_needed = actions > 1 || (actions == 1 && among.no_action_count > 0);
        if among.amongvar_needed {
            if let Some(routine) = among.routine {
                program.name_mut(routine).amongvar_needed = true;
            }
        }
    }
}
