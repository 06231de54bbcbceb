//! Local rewrites that give later stages fewer shapes to handle.

use snowball_core::{Node, NodeId, NodeKind, Program};

use super::postorder;
use crate::diagnostics::{DiagnosticKind, Diagnostics};

pub(super) fn normalize_program(program: &mut Program, diagnostics: &mut Diagnostics) {
    let bodies: Vec<_> = program.routines.iter().map(|&d| program.node(d).left).collect();
    for body in bodies {
        for id in postorder(program, &[], body) {
            normalize(program, id, diagnostics);
        }
    }
}

fn normalize(program: &mut Program, id: NodeId, diagnostics: &mut Diagnostics) {
    let node = program.node(id);
    match node.kind {
        NodeKind::LiteralString if node.literal.as_ref().is_some_and(|l| l.is_empty()) => {
            let line = node.line;
            program.node_mut(id).make_true();
            diagnostics.report(DiagnosticKind::EmptyLiteral, line).emit();
        }
        NodeKind::AssignTo => {
            diagnostics
                .report(DiagnosticKind::AssignToDiscouraged, node.line)
                .emit();
        }
        NodeKind::Fail if program.is_just_true(node.left) => {
            program.node_mut(id).make_true();
            program.node_mut(id).kind = NodeKind::False;
        }
        NodeKind::Not => absorb_operand(program, id, |kind| {
            (kind == NodeKind::BoolTest).then_some(NodeKind::NotBoolTest)
        }),
        NodeKind::Goto => absorb_operand(program, id, |kind| match kind {
            NodeKind::Grouping => Some(NodeKind::GotoGrouping),
            NodeKind::Non => Some(NodeKind::GotoNon),
            _ => None,
        }),
        NodeKind::GoPast => absorb_operand(program, id, |kind| match kind {
            NodeKind::Grouping => Some(NodeKind::GoPastGrouping),
            NodeKind::Non => Some(NodeKind::GoPastNon),
            _ => None,
        }),
        _ => {}
    }
}

/// Replaces a wrapper by its operand under a specialised kind, keeping the
/// wrapper's place in the sequence.
fn absorb_operand(
    program: &mut Program,
    id: NodeId,
    specialise: impl Fn(NodeKind) -> Option<NodeKind>,
) {
    let Some(operand) = program.node(id).left else {
        return;
    };
    let Some(kind) = specialise(program.node(operand).kind) else {
        return;
    };
    let right = program.node(id).right;
    let mut merged = program.node(operand).clone();
    merged.kind = kind;
    merged.right = right;
    *program.node_mut(id) = merged;
}

/// Appends a `functionend` marker to every routine body.
///
/// Dead code elimination and tail returns look for it to tell where the
/// routine ends.
pub(super) fn append_function_ends(program: &mut Program) {
    for define in program.routines.clone() {
        let Some(body) = program.node(define).left else {
            continue;
        };
        let node = program.node(body);
        let end = Node::new(NodeKind::FunctionEnd, node.mode, program.node(define).line);
        let end = program.alloc(end);

        let body_node = program.node(body);
        if body_node.kind == NodeKind::Bra {
            match body_node.left {
                Some(first) => {
                    let last = program.last_in_chain(first);
                    program.node_mut(last).right = Some(end);
                }
                None => program.node_mut(define).left = Some(end),
            }
        } else {
            let last = program.last_in_chain(body);
            program.node_mut(last).right = Some(end);
        }
    }
}
