//! Reachability from the externals and static signals.
//!
//! Every node reached from an external gets the signal it always produces,
//! if there is one. Commands that can never run because of it are cut from
//! their sequence.

use snowball_core::{NameId, NameKind, NodeId, NodeKind, Program, Signal};

use super::is_binary;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::tables::Among;

pub(super) fn visit_externals(program: &mut Program, amongs: &mut [Among], diagnostics: &mut Diagnostics) {
    let externals: Vec<NameId> = program
        .names()
        .filter(|(_, n)| n.kind == NameKind::External && n.definition.is_some())
        .map(|(id, _)| id)
        .collect();

    let mut visitor = SignalVisitor {
        program,
        amongs,
        diagnostics,
    };
    for id in externals {
        let name = visitor.program.name_mut(id);
        // Callable from outside, so counts as used.
        if name.first_use.is_none() {
            name.first_use = name.definition;
        }
        visitor.visit_routine(id);
    }
}

struct SignalVisitor<'a> {
    program: &'a mut Program,
    amongs: &'a mut [Among],
    diagnostics: &'a mut Diagnostics,
}

impl SignalVisitor<'_> {
    /// Recursive routines see the pessimistic `Unknown` of their own
    /// definition while it is being walked.
    fn visit_routine(&mut self, id: NameId) {
        let name = self.program.name_mut(id);
        if name.reachable {
            return;
        }
        name.reachable = true;
        let Some(define) = name.definition else {
            return;
        };

        self.program.node_mut(define).signal = Signal::Unknown;
        let body = self.program.node(define).left;
        self.visit_chain(body);
        let signal = body.map_or(Signal::Unknown, |b| self.program.node(b).signal);
        self.program.node_mut(define).signal = signal;
    }

    fn visit_chain(&mut self, first: Option<NodeId>) {
        let mut next = first;
        while let Some(id) = next {
            self.visit_node(id);
            // Read after the visit: a `not` that always fails drops its
            // successors.
            let node = self.program.node(id);
            next = if is_binary(node.kind) { None } else { node.right };
        }
    }

    fn visit_node(&mut self, id: NodeId) {
        let node = self.program.node(id);
        let (kind, name, among) = (node.kind, node.name, node.among);
        let (left, aux, ae) = (node.left, node.aux, node.ae);

        if let Some(name) = name {
            if kind == NodeKind::Call {
                self.visit_routine(name);
            } else {
                self.program.name_mut(name).reachable = true;
            }
        } else if let (NodeKind::Among, Some(among)) = (kind, among) {
            let table = &mut self.amongs[among.index()];
            table.used = true;
            let (gates, actions) = (table.gates.clone(), table.actions.clone());
            for gate in gates {
                self.visit_routine(gate);
            }
            for action in actions {
                self.visit_node(action);
            }
        }

        // A built among keeps its case list in `left`.
        if kind != NodeKind::Among {
            self.visit_chain(left);
        }
        self.visit_chain(aux);
        self.visit_chain(ae);
        if is_binary(kind) {
            self.visit_chain(self.program.node(id).right);
        }

        let signal = self.check(id);
        self.program.node_mut(id).signal = signal;
    }

    fn signal_of(&self, id: Option<NodeId>) -> Signal {
        id.map_or(Signal::Unknown, |id| self.program.node(id).signal)
    }

    fn check(&mut self, id: NodeId) -> Signal {
        let node = self.program.node(id);
        match node.kind {
            NodeKind::Fail | NodeKind::False => Signal::Fails,

            NodeKind::Assign
            | NodeKind::Attach
            | NodeKind::Debug
            | NodeKind::Delete
            | NodeKind::Do
            | NodeKind::Insert
            | NodeKind::LeftSlice
            | NodeKind::RightSlice
            | NodeKind::SetMark
            | NodeKind::SliceFrom
            | NodeKind::SliceTo
            | NodeKind::ToLimit
            | NodeKind::ToMark
            | NodeKind::True
            | NodeKind::Try
            | NodeKind::Set
            | NodeKind::Unset
            | NodeKind::MathAssign
            | NodeKind::PlusAssign
            | NodeKind::MinusAssign
            | NodeKind::MultiplyAssign
            | NodeKind::DivideAssign
            | NodeKind::FunctionEnd => Signal::Succeeds,

            NodeKind::Repeat => {
                self.check_loop_body(id, "repeat");
                Signal::Succeeds
            }
            NodeKind::AtLeast => {
                let body = node.left;
                self.check_loop_body(id, "atleast");
                self.signal_of(body)
            }

            NodeKind::Not => {
                let signal = self.signal_of(node.left).inverted();
                if signal == Signal::Fails {
                    if let Some(next) = node.right {
                        if self.program.node(next).kind != NodeKind::FunctionEnd {
                            self.diagnostics
                                .report(DiagnosticKind::UnreachableAfterNot, node.line)
                                .emit();
                        }
                        self.program.node_mut(id).right = None;
                    }
                }
                signal
            }

            NodeKind::SetLimit => self.signal_of(node.left).both(self.signal_of(node.aux)),

            NodeKind::And | NodeKind::Bra => {
                let context = if node.kind == NodeKind::And {
                    "'and'"
                } else {
                    "command list"
                };
                let mut signal = Signal::Succeeds;
                for q in self.program.chain_ids(node.left) {
                    let q_node = self.program.node(q);
                    match q_node.signal {
                        Signal::Fails => {
                            self.cut_after(q, DiagnosticKind::UnreachableAfterFailure, Some(context));
                            return Signal::Fails;
                        }
                        Signal::Unknown => signal = Signal::Unknown,
                        Signal::Succeeds => {}
                    }
                }
                signal
            }

            NodeKind::Or => {
                let mut signal = Signal::Fails;
                for q in self.program.chain_ids(node.left) {
                    match self.program.node(q).signal {
                        Signal::Succeeds => {
                            self.cut_after(q, DiagnosticKind::UnreachableAfterSuccess, None);
                            return Signal::Succeeds;
                        }
                        Signal::Unknown => signal = Signal::Unknown,
                        Signal::Fails => {}
                    }
                }
                signal
            }

            NodeKind::Backwards
            | NodeKind::Dollar
            | NodeKind::Loop
            | NodeKind::Reverse
            | NodeKind::Test => self.signal_of(node.left),

            NodeKind::Call => {
                let definition = node.name.and_then(|n| self.program.name(n).definition);
                self.signal_of(definition)
            }

            NodeKind::Substring => match node.among {
                Some(among) if self.amongs[among.index()].always_matches => Signal::Succeeds,
                _ => Signal::Unknown,
            },

            NodeKind::Among => match node.among {
                Some(among) => self.among_signal(&self.amongs[among.index()]),
                None => Signal::Unknown,
            },

            _ => Signal::Unknown,
        }
    }

    fn among_signal(&self, among: &Among) -> Signal {
        let mut signal = Signal::Succeeds;
        if among.substring.is_none() && !among.always_matches {
            signal = Signal::Unknown;
        }
        if among.actions.is_empty() {
            return signal;
        }

        let mut trues = among.no_action_count > 0;
        let mut falses = false;
        for &action in &among.actions {
            match self.program.node(action).signal {
                Signal::Fails => falses = true,
                Signal::Succeeds => trues = true,
                Signal::Unknown => {
                    falses = true;
                    trues = true;
                }
            }
            if falses && trues {
                break;
            }
        }
        if !trues {
            Signal::Fails
        } else if falses {
            Signal::Unknown
        } else {
            signal
        }
    }

    /// Drops everything after `q` in its sequence.
    fn cut_after(&mut self, q: NodeId, kind: DiagnosticKind, context: Option<&str>) {
        let node = self.program.node(q);
        let Some(next) = node.right else {
            return;
        };
        if self.program.node(next).kind != NodeKind::FunctionEnd {
            let report = self.diagnostics.report(kind, node.line);
            match context {
                Some(context) => report.message(context).emit(),
                None => report.emit(),
            }
        }
        self.program.node_mut(q).right = None;
    }

    fn check_loop_body(&mut self, id: NodeId, what: &str) {
        let node = self.program.node(id);
        let signal = self.signal_of(node.left);
        if signal.is_known() {
            let detail = format!("'{what}' always signals '{}'", signal.as_char());
            self.diagnostics
                .report(DiagnosticKind::ConstantLoopBody, node.line)
                .message(detail)
                .emit();
        }
    }
}
