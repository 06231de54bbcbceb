//! Constant folding of arithmetic and the command rewrites it enables.

use snowball_core::{Mode, Node, NodeId, NodeKind, Program};

use super::{is_binary, postorder};
use crate::diagnostics::{DiagnosticKind, Diagnostics};

pub(super) fn fold_program(program: &mut Program, diagnostics: &mut Diagnostics) {
    let bodies: Vec<_> = program.routines.iter().map(|&d| program.node(d).left).collect();
    for body in bodies {
        for id in postorder(program, &[], body) {
            fold_command(program, id, diagnostics);
        }
    }
}

fn fold_command(program: &mut Program, id: NodeId, diagnostics: &mut Diagnostics) {
    let kind = program.node(id).kind;
    if kind.is_arithmetic() {
        return;
    }

    if let Some(ae) = program.node(id).ae {
        let folded = fold_ae(program, ae, diagnostics);
        program.node_mut(id).ae = Some(folded);
    }

    match kind {
        k if k.is_relational() => fold_relation(program, id, diagnostics),
        NodeKind::Loop | NodeKind::AtLeast => fold_loop(program, id, diagnostics),
        NodeKind::Hop => fold_hop(program, id, diagnostics),
        k if k.is_integer_assign() => fold_assign(program, id, diagnostics),
        _ => {}
    }
}

/// Folds an arithmetic expression and returns the node now standing for it.
pub(super) fn fold_ae(program: &mut Program, id: NodeId, diagnostics: &mut Diagnostics) -> NodeId {
    let node = program.node(id);
    match node.kind {
        NodeKind::Neg => {
            let Some(operand) = node.left else {
                return id;
            };
            let operand = fold_ae(program, operand, diagnostics);
            let (inner_kind, inner_operand) = {
                let inner = program.node(operand);
                (inner.kind, inner.left)
            };
            match inner_kind {
                // --x
                NodeKind::Neg => inner_operand.unwrap_or(operand),
                NodeKind::Number => {
                    let n = program.node_mut(operand);
                    n.number = n.number.wrapping_neg();
                    operand
                }
                _ => {
                    program.node_mut(id).left = Some(operand);
                    id
                }
            }
        }
        kind if is_binary(kind) => {
            let (Some(lhs), Some(rhs)) = (node.left, node.right) else {
                return id;
            };
            let lhs = fold_ae(program, lhs, diagnostics);
            let rhs = fold_ae(program, rhs, diagnostics);
            fold_binary(program, id, kind, lhs, rhs, diagnostics)
        }
        NodeKind::LenOf | NodeKind::SizeOf => {
            let Some(literal) = &node.literal else {
                return id;
            };
            let value = if node.kind == NodeKind::LenOf {
                program.encoding.char_len(literal)
            } else {
                literal.len()
            };
            let fixed = node.kind == NodeKind::LenOf;
            let n = program.node_mut(id);
            n.kind = NodeKind::Number;
            n.literal = None;
            n.number = value as i32;
            n.fixed_constant = fixed;
            id
        }
        _ => id,
    }
}

fn constant(program: &Program, id: NodeId) -> Option<i32> {
    let node = program.node(id);
    (node.kind == NodeKind::Number).then_some(node.number)
}

fn fold_binary(
    program: &mut Program,
    id: NodeId,
    kind: NodeKind,
    lhs: NodeId,
    rhs: NodeId,
    diagnostics: &mut Diagnostics,
) -> NodeId {
    let line = program.node(lhs).line;
    let (p, r) = (constant(program, lhs), constant(program, rhs));

    if let (Some(p), Some(r)) = (p, r) {
        let value = match kind {
            NodeKind::Plus => p.wrapping_add(r),
            NodeKind::Minus => p.wrapping_sub(r),
            NodeKind::Multiply => p.wrapping_mul(r),
            _ if r == 0 => return division_by_zero(program, id, lhs, rhs, diagnostics),
            _ => p.wrapping_div(r),
        };
        let fixed = program.node(lhs).fixed_constant && program.node(rhs).fixed_constant;
        let n = program.node_mut(id);
        n.kind = NodeKind::Number;
        n.left = None;
        n.right = None;
        n.number = value;
        n.fixed_constant = fixed;
        n.line = line;
        return id;
    }

    match (kind, p, r) {
        // 0 + r, p + 0, p - 0
        (NodeKind::Plus, Some(0), _) => rhs,
        (NodeKind::Plus | NodeKind::Minus, _, Some(0)) => lhs,
        // 0 - r
        (NodeKind::Minus, Some(0), _) => {
            let line = program.node(id).line;
            negate(program, rhs, line)
        }
        // 0 * r, p * 0
        (NodeKind::Multiply, Some(0), _) => lhs,
        (NodeKind::Multiply, _, Some(0)) => {
            program.node_mut(rhs).line = line;
            rhs
        }
        (NodeKind::Multiply, Some(-1), _) => negate(program, rhs, line),
        (NodeKind::Multiply, _, Some(-1)) | (NodeKind::Divide, _, Some(-1)) => {
            negate(program, lhs, line)
        }
        (NodeKind::Multiply, Some(1), _) => {
            program.node_mut(rhs).line = line;
            rhs
        }
        (NodeKind::Multiply | NodeKind::Divide, _, Some(1)) => lhs,
        (NodeKind::Divide, _, Some(0)) => division_by_zero(program, id, lhs, rhs, diagnostics),
        _ => {
            let n = program.node_mut(id);
            n.left = Some(lhs);
            n.right = Some(rhs);
            id
        }
    }
}

fn division_by_zero(
    program: &mut Program,
    id: NodeId,
    lhs: NodeId,
    rhs: NodeId,
    diagnostics: &mut Diagnostics,
) -> NodeId {
    let n = program.node_mut(id);
    n.left = Some(lhs);
    n.right = Some(rhs);
    diagnostics
        .report(DiagnosticKind::DivisionByZero, n.line)
        .emit();
    id
}

fn negate(program: &mut Program, operand: NodeId, line: u32) -> NodeId {
    let mut neg = Node::new(NodeKind::Neg, Mode::Forward, line);
    neg.left = Some(operand);
    program.alloc(neg)
}

/// `$(AE op AE)` between two constants.
fn fold_relation(program: &mut Program, id: NodeId, diagnostics: &mut Diagnostics) {
    let Some(lhs) = program.node(id).left else {
        return;
    };
    let lhs = fold_ae(program, lhs, diagnostics);
    program.node_mut(id).left = Some(lhs);

    let rhs = program.node(id).ae;
    let (Some(p), Some(r)) = (constant(program, lhs), rhs.and_then(|r| constant(program, r))) else {
        return;
    };
    let holds = match program.node(id).kind {
        NodeKind::Eq => p == r,
        NodeKind::Ne => p != r,
        NodeKind::Gt => p > r,
        NodeKind::Ge => p >= r,
        NodeKind::Lt => p < r,
        _ => p <= r,
    };
    let node = program.node_mut(id);
    node.make_true();
    if !holds {
        node.kind = NodeKind::False;
    }
}

fn fold_loop(program: &mut Program, id: NodeId, diagnostics: &mut Diagnostics) {
    let node = program.node(id);
    let Some(ae) = node.ae else {
        return;
    };
    let count = program.node(ae);
    if count.kind != NodeKind::Number {
        return;
    }
    let (n, fixed, line) = (count.number, count.fixed_constant, count.line);
    let is_loop = node.kind == NodeKind::Loop;

    if n <= 0 {
        let kind = if is_loop {
            DiagnosticKind::LoopNoOp
        } else {
            DiagnosticKind::AtLeastIsRepeat
        };
        if fixed {
            diagnostics.report(kind, line).message(n.to_string()).emit();
        }
        let node = program.node_mut(id);
        if is_loop {
            node.make_true();
        } else {
            node.kind = NodeKind::Repeat;
            node.ae = None;
        }
    } else if n == 1 && is_loop {
        if fixed {
            diagnostics.report(DiagnosticKind::LoopOnce, line).emit();
        }
        // The body keeps its id: among tables and substrings refer to it.
        let node = program.node_mut(id);
        node.kind = NodeKind::Bra;
        node.ae = None;
    }
}

fn fold_hop(program: &mut Program, id: NodeId, diagnostics: &mut Diagnostics) {
    let Some(ae) = program.node(id).ae else {
        return;
    };
    let count = program.node(ae);
    if count.kind != NodeKind::Number {
        return;
    }
    let (n, fixed, line) = (count.number, count.fixed_constant, count.line);

    let node = program.node_mut(id);
    match n {
        1 => {
            node.kind = NodeKind::Next;
            node.ae = None;
        }
        0 => {
            node.make_true();
            if fixed {
                diagnostics.report(DiagnosticKind::HopNoOp, line).emit();
            }
        }
        n if n < 0 => {
            node.make_true();
            node.kind = NodeKind::False;
            diagnostics
                .report(DiagnosticKind::NegativeHop, line)
                .message(n.to_string())
                .emit();
        }
        _ => {}
    }
}

fn fold_assign(program: &mut Program, id: NodeId, diagnostics: &mut Diagnostics) {
    let Some(ae) = program.node(id).ae else {
        return;
    };
    let Some(value) = constant(program, ae) else {
        return;
    };

    let kind = program.node(id).kind;
    match (kind, value) {
        (NodeKind::PlusAssign | NodeKind::MinusAssign, 0)
        | (NodeKind::MultiplyAssign | NodeKind::DivideAssign, 1) => {
            program.node_mut(id).make_true();
        }
        // INT_MIN has no positive counterpart.
        (NodeKind::PlusAssign | NodeKind::MinusAssign, v) if v < 0 && v != i32::MIN => {
            let flipped = if kind == NodeKind::PlusAssign {
                NodeKind::MinusAssign
            } else {
                NodeKind::PlusAssign
            };
            program.node_mut(id).kind = flipped;
            program.node_mut(ae).number = -v;
        }
        (NodeKind::DivideAssign, 0) => {
            let line = program.node(id).line;
            diagnostics
                .report(DiagnosticKind::DivisionByZero, line)
                .emit();
        }
        (NodeKind::MultiplyAssign, 0) => {
            let node = program.node_mut(id);
            node.kind = NodeKind::MathAssign;
            if let Some(name) = node.name {
                program.name_mut(name).initialised = true;
            }
        }
        (NodeKind::DivideAssign, -1) => {
            program.node_mut(id).kind = NodeKind::MultiplyAssign;
        }
        _ => {}
    }
}
