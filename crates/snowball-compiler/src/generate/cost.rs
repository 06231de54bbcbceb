//! Static estimates of cursor movement.
//!
//! Both walks follow routine calls, giving up after a fixed depth so that
//! recursive routines terminate.

use snowball_core::{NodeId, NodeKind, Program};

/// Calls followed before assuming the worst.
const MAX_CALL_DEPTH: usize = 100;

/// Whether the commands from `first` onwards may leave the cursor
/// somewhere else, so that a combinator wanting it back has to save it.
pub fn k_needed(program: &Program, first: Option<NodeId>) -> bool {
    k_needed_at(program, first, 0)
}

fn k_needed_at(program: &Program, first: Option<NodeId>, depth: usize) -> bool {
    for id in program.chain(first) {
        let node = program.node(id);
        match node.kind {
            NodeKind::AtLimit
            | NodeKind::Do
            | NodeKind::Dollar
            | NodeKind::LeftSlice
            | NodeKind::RightSlice
            | NodeKind::SliceTo
            | NodeKind::BoolTest
            | NodeKind::NotBoolTest
            | NodeKind::Set
            | NodeKind::Unset
            | NodeKind::True
            | NodeKind::False
            | NodeKind::Debug
            | NodeKind::FunctionEnd
            | NodeKind::Not => {}
            kind if kind.is_integer_assign() || kind.is_relational() => {}

            NodeKind::Call => {
                if depth >= MAX_CALL_DEPTH {
                    return true;
                }
                match called_body(program, id) {
                    Some(body) => {
                        if k_needed_at(program, body, depth + 1) {
                            return true;
                        }
                    }
                    None => return true,
                }
            }
            NodeKind::Bra => {
                if k_needed_at(program, node.left, depth) {
                    return true;
                }
            }
            _ => return true,
        }
    }
    false
}

/// Whether a loop body must restore the cursor before the loop retries or
/// exits.
///
/// A single cursor-moving test that fails leaves the cursor alone; two of
/// them in a row do not.
pub fn repeat_restore(program: &Program, first: Option<NodeId>) -> bool {
    repeat_score(program, first, 0) >= 2
}

fn repeat_score(program: &Program, first: Option<NodeId>, depth: usize) -> u32 {
    let mut score = 0;
    for id in program.chain(first) {
        let node = program.node(id);
        match node.kind {
            // `not` and `do` are absent: they can move the cursor and fail.
            NodeKind::AtLimit
            | NodeKind::Dollar
            | NodeKind::LeftSlice
            | NodeKind::RightSlice
            | NodeKind::SliceTo
            | NodeKind::BoolTest
            | NodeKind::NotBoolTest
            | NodeKind::Set
            | NodeKind::Unset
            | NodeKind::True
            | NodeKind::False
            | NodeKind::Debug
            | NodeKind::FunctionEnd => {}
            kind if kind.is_integer_assign() || kind.is_relational() => {}

            NodeKind::Call => {
                if depth >= MAX_CALL_DEPTH {
                    return 2;
                }
                let Some(body) = called_body(program, id) else {
                    return 2;
                };
                score += repeat_score(program, body, depth + 1);
                if score >= 2 {
                    return score;
                }
            }
            NodeKind::Bra => {
                score += repeat_score(program, node.left, depth);
                if score >= 2 {
                    return score;
                }
            }

            NodeKind::NamedString
            | NodeKind::LiteralString
            | NodeKind::Next
            | NodeKind::Grouping
            | NodeKind::Non
            | NodeKind::Hop => {
                score += 1;
                if score >= 2 {
                    return score;
                }
            }

            _ => return 2,
        }
    }
    score
}

fn called_body(program: &Program, call: NodeId) -> Option<Option<NodeId>> {
    let name = program.node(call).name?;
    let define = program.name(name).definition?;
    Some(program.node(define).left)
}
