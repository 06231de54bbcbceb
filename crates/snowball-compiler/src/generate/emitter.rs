//! Generator state, naming and the failure continuation.

use std::collections::HashSet;

use snowball_core::{AmongId, Encoding, Mode, NameId, NameKind, Node, NodeId, NodeKind, Program};

use super::writer::Writer;
use super::{GenerateError, Result, comment};
use crate::analyze::AnalyzedProgram;
use crate::config::{Config, Target};
use crate::tables::{Among, Grouping, LiteralPool};

/// Where a failing command transfers control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(super) enum FailTarget {
    /// `return 0;` from the routine.
    #[default]
    Return,
    Label(u32),
}

/// The failure continuation: an undo string run before the jump.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(super) struct Failure {
    pub(super) target: FailTarget,
    pub(super) undo: String,
}

impl Failure {
    pub(super) fn label(label: u32) -> Self {
        Self {
            target: FailTarget::Label(label),
            undo: String::new(),
        }
    }
}

/// State local to the routine being generated.
#[derive(Debug, Default)]
pub(super) struct RoutineState {
    pub(super) failure: Failure,
    next_label: u32,
    var_number: u32,
    used_labels: HashSet<u32>,
    /// Commands that returned from the routine: what follows them is dead.
    returned: HashSet<NodeId>,
}

pub(super) struct Emitter<'a> {
    pub(super) analyzed: &'a AnalyzedProgram,
    pub(super) program: &'a Program,
    pub(super) config: &'a Config,
    /// Banner, includes, literal arrays and tables, ahead of the routines.
    pub(super) declarations: Writer,
    /// Routine bodies and the lifecycle functions.
    pub(super) out: Writer,
    literals: LiteralPool,
    /// Amongs reduced to a plain cursor step, whose table is not emitted.
    pub(super) inlined: HashSet<AmongId>,
    pub(super) debug_count: u32,
    pub(super) routine: RoutineState,
}

impl<'a> Emitter<'a> {
    pub(super) fn new(analyzed: &'a AnalyzedProgram, config: &'a Config) -> Self {
        Self {
            analyzed,
            program: &analyzed.program,
            config,
            declarations: Writer::new(),
            out: Writer::new(),
            literals: LiteralPool::new(),
            inlined: HashSet::new(),
            debug_count: 0,
            routine: RoutineState::default(),
        }
    }

    pub(super) fn node(&self, id: NodeId) -> &'a Node {
        self.program.node(id)
    }

    pub(super) fn is_cpp(&self) -> bool {
        self.config.target == Target::Cpp
    }

    pub(super) fn is_utf8(&self) -> bool {
        self.config.encoding == Encoding::Utf8
    }

    // Routine state

    pub(super) fn begin_routine(&mut self) {
        self.routine = RoutineState::default();
    }

    pub(super) fn new_label(&mut self) -> u32 {
        let label = self.routine.next_label;
        self.routine.next_label += 1;
        label
    }

    /// Makes a fresh label the failure target, with nothing to undo.
    pub(super) fn install_label(&mut self) -> u32 {
        let label = self.new_label();
        self.routine.failure = Failure::label(label);
        label
    }

    /// Writes `labN:` if anything jumps there.
    pub(super) fn set_label(&mut self, label: u32) {
        if self.routine.used_labels.contains(&label) {
            self.out.label(label);
        }
    }

    /// A fresh temporary, `v_N`.
    pub(super) fn new_var(&mut self) -> String {
        self.routine.var_number += 1;
        format!("v_{}", self.routine.var_number)
    }

    /// The statement a failing command runs.
    pub(super) fn fail(&mut self) -> String {
        let jump = match self.routine.failure.target {
            FailTarget::Return => "return 0;".to_owned(),
            FailTarget::Label(label) => {
                self.routine.used_labels.insert(label);
                format!("goto lab{label};")
            }
        };
        let undo = &self.routine.failure.undo;
        if undo.is_empty() {
            jump
        } else {
            format!("{{ {undo} {jump} }}")
        }
    }

    pub(super) fn just_return_on_fail(&self) -> bool {
        self.routine.failure.target == FailTarget::Return && self.routine.failure.undo.is_empty()
    }

    /// `id` is the last command before the routine's implicit success, and
    /// failing would simply return: its test can be returned directly.
    pub(super) fn tailcallable(&self, id: NodeId) -> bool {
        self.just_return_on_fail()
            && self
                .node(id)
                .right
                .is_some_and(|r| self.node(r).kind == NodeKind::FunctionEnd)
    }

    pub(super) fn mark_returned(&mut self, id: NodeId) {
        self.routine.returned.insert(id);
    }

    pub(super) fn has_returned(&self, id: NodeId) -> bool {
        self.routine.returned.contains(&id)
    }

    /// The next command in the sequence, unless `id` already returned.
    pub(super) fn next_after(&self, id: NodeId) -> Option<NodeId> {
        if self.has_returned(id) {
            None
        } else {
            self.node(id).right
        }
    }

    // Cursor checkpoints

    pub(super) fn save_cursor(&mut self, mode: Mode, var: &str) {
        let from_end = if mode.is_forward() { "" } else { "z->l - " };
        self.out.line(format!("int {var} = {from_end}z->c;"));
    }

    pub(super) fn restore_string(mode: Mode, var: &str) -> String {
        let from_end = if mode.is_forward() { "" } else { "z->l - " };
        format!("z->c = {from_end}{var};")
    }

    pub(super) fn restore_cursor(&mut self, mode: Mode, var: &str) {
        self.out.line(Self::restore_string(mode, var));
    }

    /// A runtime call whose negative result is a fatal error.
    ///
    /// C propagates the error code; C++ throws from the runtime instead.
    pub(super) fn propagating(&mut self, call: &str, keep_c: bool) {
        if self.is_cpp() {
            if keep_c {
                self.out.block_start();
                self.out.line("int saved_c = z->c;");
            }
            self.out.line(format!("{call};"));
            if keep_c {
                self.out.line("z->c = saved_c;");
                self.out.block_end();
            }
        } else {
            self.out.block_start();
            if keep_c {
                self.out.line("int saved_c = z->c;");
            }
            self.out.line(format!("int ret = {call};"));
            if keep_c {
                self.out.line("z->c = saved_c;");
            }
            self.out.line("if (ret < 0) return ret;");
            self.out.block_end();
        }
    }

    pub(super) fn comment(&mut self, id: NodeId) {
        if self.config.comments {
            let text = comment::describe(self.program, id);
            self.out.line(format!("/* {text} */"));
        }
    }

    // Names

    /// The identifier of a name, without any storage qualification.
    pub(super) fn varname(&self, id: NameId) -> String {
        let name = self.program.name(id);
        match name.kind {
            NameKind::String => format!("s_{}", name.text),
            NameKind::Boolean => format!("b_{}", name.text),
            NameKind::Integer => format!("i_{}", name.text),
            NameKind::Routine => format!("r_{}", name.text),
            NameKind::Grouping => format!("g_{}", name.text),
            NameKind::External => match self.config.target {
                Target::C => format!("{}{}", self.config.externals_prefix, name.text),
                Target::Cpp => format!(
                    "{}::{}::{}",
                    self.config.package,
                    self.config.class_name(),
                    name.text
                ),
            },
        }
    }

    /// How generated code refers to a name: shared variables live in the
    /// per-instance state behind `z`.
    pub(super) fn varref(&self, id: NameId) -> String {
        let name = self.program.name(id);
        if name.kind.is_variable() && name.is_shared() {
            format!("((SN_local *)z)->{}", self.varname(id))
        } else {
            self.varname(id)
        }
    }

    pub(super) fn name_of(&self, id: NodeId) -> Result<NameId> {
        let node = self.node(id);
        node.name.ok_or(GenerateError::MissingName {
            token: node.kind.token(),
            line: node.line,
        })
    }

    pub(super) fn node_varref(&self, id: NodeId) -> Result<String> {
        Ok(self.varref(self.name_of(id)?))
    }

    pub(super) fn operand(&self, id: NodeId) -> Result<NodeId> {
        let node = self.node(id);
        node.left.ok_or(GenerateError::MissingOperand {
            token: node.kind.token(),
            line: node.line,
        })
    }

    pub(super) fn grouping_of(&self, id: NodeId) -> Result<&'a Grouping> {
        let name = self.name_of(id)?;
        self.analyzed
            .grouping(name)
            .ok_or_else(|| GenerateError::UnresolvedGrouping {
                name: self.program.name(name).text.clone(),
                line: self.node(id).line,
            })
    }

    pub(super) fn among_of(&self, id: NodeId) -> Result<(AmongId, &'a Among)> {
        let node = self.node(id);
        let among = node.among.ok_or(GenerateError::UnresolvedAmong { line: node.line })?;
        let analyzed: &'a AnalyzedProgram = self.analyzed;
        match analyzed.amongs.get(among.index()) {
            Some(table) => Ok((among, table)),
            None => Err(GenerateError::UnresolvedAmong { line: node.line }),
        }
    }

    // Literals

    /// Reference to a stored literal, declaring it on first use.
    pub(super) fn literal_ref(&mut self, text: &[u16]) -> String {
        if text.is_empty() {
            return "0".to_owned();
        }
        let (at, new) = self.literals.intern(text);
        if new {
            let symbols: Vec<String> = text.iter().map(|&ch| char_literal(ch)).collect();
            self.declarations.write(&format!(
                "static const symbol s_{}[] = {{ {} }};",
                at.index,
                symbols.join(", ")
            ));
            self.declarations.newline();
        }
        match at.offset {
            0 => format!("s_{}", at.index),
            offset => format!("s_{} + {offset}", at.index),
        }
    }

    /// `size, s_N` for a literal operand, or the variable holding the string.
    pub(super) fn data_address(&mut self, id: NodeId) -> Result<String> {
        match &self.node(id).literal {
            Some(text) => {
                let at = self.literal_ref(text);
                Ok(format!("{}, {at}", text.len()))
            }
            None => self.node_varref(id),
        }
    }
}

/// A symbol as a C constant: printable ASCII quoted, anything else in hex.
pub(super) fn char_literal(ch: u16) -> String {
    match ch {
        0x27 | 0x5c => format!("'\\{}'", char::from(ch as u8)),
        32..=126 => format!("'{}'", char::from(ch as u8)),
        _ => format!("0x{ch:X}"),
    }
}

/// `""` or `"_b"`, the runtime's suffix for backward helpers.
pub(super) fn direction_suffix(mode: Mode) -> &'static str {
    if mode.is_forward() { "" } else { "_b" }
}
