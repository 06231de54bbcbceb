//! Programmatic construction of Snowball programs.
//!
//! `ProgramBuilder` stands where a parser would: it declares names, builds
//! nodes in the right direction, and keeps the usage bookkeeping the analyser
//! relies on (reference counts, first use, which routine a name is used in,
//! whether a variable is ever set or read).
//!
//! ```
//! use snowball_core::{AmongItem, NameKind, ProgramBuilder};
//!
//! let mut b = ProgramBuilder::default();
//! b.declare(NameKind::External, "stem");
//! b.define("stem", |b| {
//!     let bra = b.left_slice();
//!     let among = b.among(vec![
//!         AmongItem::case("ing"),
//!         AmongItem::action(|b| vec![b.right_slice(), b.delete()]),
//!     ]);
//!     b.seq(vec![bra, among])
//! });
//! let program = b.finish().unwrap();
//! assert_eq!(program.routines.len(), 1);
//! ```

use crate::encoding::Encoding;
use crate::grouping::{GroupingDef, GroupingOp, GroupingTerm};
use crate::name::{Name, NameId, NameKind};
use crate::node::{Mode, Node, NodeId, NodeKind};
use crate::program::{AmongSite, Program};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {kind}")]
pub struct BuildError {
    pub line: u32,
    pub kind: BuildErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildErrorKind {
    #[error("'{0}' re-declared")]
    Redeclared(String),

    #[error("'{0}' undeclared")]
    Undeclared(String),

    #[error("'{name}' not of type {expected}")]
    WrongKind { name: String, expected: &'static str },

    #[error("integer name '{0}' misplaced")]
    MisplacedInteger(String),

    #[error("'{0}' redefined")]
    Redefined(String),

    #[error("{kind} '{name}' mis-used in {mode} mode")]
    ModeMismatch {
        kind: &'static str,
        name: String,
        mode: &'static str,
    },

    #[error("'backwards' used when already in this mode")]
    NestedBackwards,

    #[error("{0} not allowed inside reverse(...)")]
    NotModifiable(&'static str),

    #[error("'substring' with no matching 'among'")]
    SubstringWithoutAmong,

    #[error("empty among(...)")]
    EmptyAmong,

    #[error("two adjacent bracketed expressions in among(...)")]
    AdjacentActions,
}

/// String operand of `<-`, `insert`, `attach`, `=`, `lenof` and `sizeof`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringArg<'a> {
    Literal(&'a str),
    Name(&'a str),
}

/// Operand of a grouping definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingSource<'a> {
    Literal(&'a str),
    Name(&'a str),
}

type ActionFn<'a> = Box<dyn FnOnce(&mut ProgramBuilder) -> Vec<NodeId> + 'a>;

/// One element of `among(...)`.
pub enum AmongItem<'a> {
    /// A case string, optionally gated by a routine.
    Case {
        text: &'a str,
        gate: Option<&'a str>,
    },
    /// A bracketed command list applying to the cases before it.
    Action(ActionFn<'a>),
}

impl<'a> AmongItem<'a> {
    pub fn case(text: &'a str) -> Self {
        AmongItem::Case { text, gate: None }
    }

    pub fn gated(text: &'a str, gate: &'a str) -> Self {
        AmongItem::Case {
            text,
            gate: Some(gate),
        }
    }

    pub fn action(f: impl FnOnce(&mut ProgramBuilder) -> Vec<NodeId> + 'a) -> Self {
        AmongItem::Action(Box::new(f))
    }

    /// `()`
    pub fn empty() -> Self {
        AmongItem::Action(Box::new(|_| Vec::new()))
    }
}

#[derive(Debug)]
pub struct ProgramBuilder {
    program: Program,
    mode: Mode,
    modifiable: bool,
    line: u32,
    current_routine: Option<NameId>,
    pending_substring: Option<NodeId>,
    assigned_to: Option<NameId>,
    errors: Vec<BuildError>,
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new(Encoding::default())
    }
}

impl ProgramBuilder {
    pub fn new(encoding: Encoding) -> Self {
        Self {
            program: Program::new(encoding),
            mode: Mode::Forward,
            modifiable: true,
            line: 1,
            current_routine: None,
            pending_substring: None,
            assigned_to: None,
            errors: Vec::new(),
        }
    }

    /// Source line given to the nodes and names created from now on.
    pub fn at(&mut self, line: u32) -> &mut Self {
        self.line = line;
        self
    }

    pub fn finish(self) -> Result<Program, BuildError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.program),
        }
    }

    fn error(&mut self, kind: BuildErrorKind) {
        self.errors.push(BuildError {
            line: self.line,
            kind,
        });
    }

    fn node(&mut self, kind: NodeKind) -> NodeId {
        self.program.alloc(Node::new(kind, self.mode, self.line))
    }

    fn node_with_left(&mut self, kind: NodeKind, left: NodeId) -> NodeId {
        let id = self.node(kind);
        self.program.node_mut(id).left = Some(left);
        id
    }

    fn link(&mut self, items: &[NodeId]) -> Option<NodeId> {
        for pair in items.windows(2) {
            self.program.node_mut(pair[0]).right = Some(pair[1]);
        }
        items.first().copied()
    }

    // Names

    pub fn declare(&mut self, kind: NameKind, text: &str) -> NameId {
        if let Some(existing) = self.program.lookup(text) {
            self.error(BuildErrorKind::Redeclared(text.to_owned()));
            return existing;
        }
        self.program.add_name(Name::new(text, kind, self.line))
    }

    pub fn declare_all(&mut self, kind: NameKind, texts: &[&str]) {
        for text in texts {
            self.declare(kind, text);
        }
    }

    fn find(&mut self, text: &str) -> Option<NameId> {
        match self.program.lookup(text) {
            Some(id) => {
                self.program.name_mut(id).references += 1;
                Some(id)
            }
            None => {
                self.error(BuildErrorKind::Undeclared(text.to_owned()));
                None
            }
        }
    }

    fn check_kind(&mut self, id: NameId, expected: NameKind) {
        let name = self.program.name(id);
        let ok = name.kind == expected
            || (expected == NameKind::Routine && name.kind == NameKind::External);
        if !ok {
            let text = name.text.clone();
            self.error(BuildErrorKind::WrongKind {
                name: text,
                expected: expected.describe(),
            });
        }
    }

    fn check_routine_mode(&mut self, id: NameId) {
        let mode = self.mode;
        let name = self.program.name_mut(id);
        match name.mode {
            None => name.mode = Some(mode),
            Some(m) if m == mode => {}
            Some(_) => {
                let kind = BuildErrorKind::ModeMismatch {
                    kind: name.kind.describe(),
                    name: name.text.clone(),
                    mode: mode.describe(),
                };
                self.error(kind);
            }
        }
    }

    /// Records a use of `id` by `node` in the routine being defined.
    fn mark_used_in(&mut self, id: NameId, node: NodeId) {
        let routine = self.current_routine;
        let name = self.program.name_mut(id);
        if name.first_use.is_none() {
            name.first_use = Some(node);
            name.local_to = routine;
        } else if name.local_to.is_some() && name.local_to != routine {
            name.local_to = None;
        }
    }

    fn name_to_node(&mut self, node: NodeId, text: &str, kind: NameKind) -> Option<NameId> {
        let id = self.find(text)?;
        self.check_kind(id, kind);
        self.mark_used_in(id, node);
        self.program.node_mut(node).name = Some(id);
        Some(id)
    }

    fn require_modifiable(&mut self, kind: NodeKind) {
        if !self.modifiable {
            self.error(BuildErrorKind::NotModifiable(kind.token()));
        }
    }

    // Top level

    /// Runs `f` with backward mode as the default direction.
    pub fn backward_mode(&mut self, f: impl FnOnce(&mut Self)) {
        let mode = std::mem::replace(&mut self.mode, Mode::Backward);
        f(self);
        self.mode = mode;
    }

    /// `define name as C` for a routine or external.
    pub fn define(&mut self, text: &str, body: impl FnOnce(&mut Self) -> NodeId) -> NodeId {
        let define = self.node(NodeKind::Define);
        let id = self.find(text);
        if let Some(id) = id {
            let name = self.program.name(id);
            if !name.kind.is_routine() {
                let text = name.text.clone();
                self.error(BuildErrorKind::WrongKind {
                    name: text,
                    expected: "routine or external",
                });
            }
            if self.program.name(id).definition.is_some() {
                self.error(BuildErrorKind::Redefined(text.to_owned()));
            }
            self.check_routine_mode(id);
        }
        self.program.node_mut(define).name = id;
        self.program.routines.push(define);

        self.current_routine = id;
        let left = body(self);
        self.program.node_mut(define).left = Some(left);
        if let Some(id) = id {
            self.program.name_mut(id).definition = Some(define);
        }
        if self.pending_substring.take().is_some() {
            self.error(BuildErrorKind::SubstringWithoutAmong);
        }
        self.current_routine = None;
        define
    }

    /// `define name 'abc' + other - 'x'`
    pub fn define_grouping(&mut self, text: &str, terms: &[(GroupingOp, GroupingSource<'_>)]) {
        let id = self.find(text);
        if let Some(id) = id {
            self.check_kind(id, NameKind::Grouping);
        }

        let mut def = GroupingDef {
            name: id,
            line: self.line,
            terms: Vec::with_capacity(terms.len()),
        };
        for &(op, source) in terms {
            let term = match source {
                GroupingSource::Literal(s) => {
                    GroupingTerm::Chars(self.program.encoding.code_points(s))
                }
                GroupingSource::Name(other) => {
                    let Some(other) = self.find(other) else {
                        continue;
                    };
                    self.check_kind(other, NameKind::Grouping);
                    self.program.name_mut(other).used_in_definition = true;
                    GroupingTerm::Grouping(other)
                }
            };
            def.terms.push((op, term));
        }

        let grouping = self.program.add_grouping(def);
        if let Some(id) = id {
            if let Some(previous) = self.program.name(id).grouping {
                self.error(BuildErrorKind::Redefined(text.to_owned()));
                self.program.groupings[previous.index()].name = None;
            }
            self.program.name_mut(id).grouping = Some(grouping);
        }
    }

    // Command structure

    /// `( C1 C2 ... )`. A single command is returned as is.
    pub fn seq(&mut self, items: Vec<NodeId>) -> NodeId {
        if items.len() == 1 {
            return items[0];
        }
        self.bra(items)
    }

    fn bra(&mut self, items: Vec<NodeId>) -> NodeId {
        let bra = self.node(NodeKind::Bra);
        self.program.node_mut(bra).left = self.link(&items);
        bra
    }

    /// `C1 and C2 and ...`
    pub fn and(&mut self, items: Vec<NodeId>) -> NodeId {
        let node = self.node(NodeKind::And);
        self.program.node_mut(node).left = self.link(&items);
        node
    }

    /// `C1 or C2 or ...`
    pub fn or(&mut self, items: Vec<NodeId>) -> NodeId {
        let node = self.node(NodeKind::Or);
        self.program.node_mut(node).left = self.link(&items);
        node
    }

    pub fn not(&mut self, c: NodeId) -> NodeId {
        self.node_with_left(NodeKind::Not, c)
    }

    pub fn try_(&mut self, c: NodeId) -> NodeId {
        self.node_with_left(NodeKind::Try, c)
    }

    pub fn test(&mut self, c: NodeId) -> NodeId {
        self.node_with_left(NodeKind::Test, c)
    }

    pub fn do_(&mut self, c: NodeId) -> NodeId {
        self.node_with_left(NodeKind::Do, c)
    }

    pub fn fail(&mut self, c: NodeId) -> NodeId {
        self.node_with_left(NodeKind::Fail, c)
    }

    pub fn repeat(&mut self, c: NodeId) -> NodeId {
        self.node_with_left(NodeKind::Repeat, c)
    }

    pub fn goto(&mut self, c: NodeId) -> NodeId {
        self.node_with_left(NodeKind::Goto, c)
    }

    pub fn gopast(&mut self, c: NodeId) -> NodeId {
        self.node_with_left(NodeKind::GoPast, c)
    }

    pub fn loop_(&mut self, count: NodeId, c: NodeId) -> NodeId {
        let node = self.node_with_left(NodeKind::Loop, c);
        self.program.node_mut(node).ae = Some(count);
        node
    }

    pub fn atleast(&mut self, count: NodeId, c: NodeId) -> NodeId {
        let node = self.node_with_left(NodeKind::AtLeast, c);
        self.program.node_mut(node).ae = Some(count);
        node
    }

    /// `setlimit C1 for C2`
    pub fn setlimit(&mut self, limit: NodeId, c: NodeId) -> NodeId {
        let node = self.node_with_left(NodeKind::SetLimit, limit);
        self.program.node_mut(node).aux = Some(c);
        node
    }

    pub fn backwards(&mut self, f: impl FnOnce(&mut Self) -> NodeId) -> NodeId {
        if self.mode == Mode::Backward {
            self.error(BuildErrorKind::NestedBackwards);
        }
        let mode = std::mem::replace(&mut self.mode, Mode::Backward);
        let node = self.node(NodeKind::Backwards);
        let c = f(self);
        self.mode = mode;
        self.program.node_mut(node).left = Some(c);
        node
    }

    pub fn reverse(&mut self, f: impl FnOnce(&mut Self) -> NodeId) -> NodeId {
        let mode = self.mode;
        let modifiable = std::mem::replace(&mut self.modifiable, false);
        self.mode = mode.reversed();
        let node = self.node(NodeKind::Reverse);
        let c = f(self);
        self.mode = mode;
        self.modifiable = modifiable;
        self.program.node_mut(node).left = Some(c);
        node
    }

    /// `$s C`: runs `C` on the string variable `s`.
    pub fn dollar(&mut self, text: &str, f: impl FnOnce(&mut Self) -> NodeId) -> NodeId {
        let id = self.find(text);
        if let Some(id) = id {
            self.check_kind(id, NameKind::String);
            let name = self.program.name_mut(id);
            name.initialised = true;
            name.value_used = true;
        }

        let mode = std::mem::replace(&mut self.mode, Mode::Forward);
        let modifiable = std::mem::replace(&mut self.modifiable, true);
        let node = self.node(NodeKind::Dollar);
        let c = f(self);
        self.mode = mode;
        self.modifiable = modifiable;

        let n = self.program.node_mut(node);
        n.left = Some(c);
        n.name = id;
        if let Some(id) = id {
            self.mark_used_in(id, node);
        }
        node
    }

    // Tests and primitives

    pub fn literal(&mut self, s: &str) -> NodeId {
        let node = self.node(NodeKind::LiteralString);
        self.program.node_mut(node).literal = Some(self.program.encoding.encode(s));
        node
    }

    /// A bare name used as a command: a string test, a boolean test, a
    /// routine call, or a grouping test, depending on how it was declared.
    pub fn name(&mut self, text: &str) -> NodeId {
        let node = self.node(NodeKind::NamedString);
        let Some(id) = self.find(text) else {
            return node;
        };
        self.mark_used_in(id, node);

        let kind = match self.program.name(id).kind {
            NameKind::Boolean => {
                self.program.name_mut(id).value_used = true;
                NodeKind::BoolTest
            }
            NameKind::Integer => {
                self.error(BuildErrorKind::MisplacedInteger(text.to_owned()));
                NodeKind::NamedString
            }
            NameKind::String => {
                self.program.name_mut(id).value_used = true;
                NodeKind::NamedString
            }
            NameKind::Routine | NameKind::External => {
                self.check_routine_mode(id);
                NodeKind::Call
            }
            NameKind::Grouping => NodeKind::Grouping,
        };
        let n = self.program.node_mut(node);
        n.kind = kind;
        n.name = Some(id);
        node
    }

    pub fn non(&mut self, text: &str) -> NodeId {
        let node = self.node(NodeKind::Non);
        self.name_to_node(node, text, NameKind::Grouping);
        node
    }

    pub fn true_(&mut self) -> NodeId {
        self.node(NodeKind::True)
    }

    pub fn false_(&mut self) -> NodeId {
        self.node(NodeKind::False)
    }

    pub fn next(&mut self) -> NodeId {
        self.node(NodeKind::Next)
    }

    pub fn tolimit(&mut self) -> NodeId {
        self.node(NodeKind::ToLimit)
    }

    pub fn atlimit(&mut self) -> NodeId {
        self.node(NodeKind::AtLimit)
    }

    /// `[`
    pub fn left_slice(&mut self) -> NodeId {
        self.node(NodeKind::LeftSlice)
    }

    /// `]`
    pub fn right_slice(&mut self) -> NodeId {
        self.node(NodeKind::RightSlice)
    }

    pub fn delete(&mut self) -> NodeId {
        self.require_modifiable(NodeKind::Delete);
        self.node(NodeKind::Delete)
    }

    /// `?`
    pub fn debug(&mut self) -> NodeId {
        self.program.debug_used = true;
        self.node(NodeKind::Debug)
    }

    pub fn hop(&mut self, count: NodeId) -> NodeId {
        let node = self.node(NodeKind::Hop);
        self.program.node_mut(node).ae = Some(count);
        node
    }

    pub fn tomark(&mut self, position: NodeId) -> NodeId {
        let node = self.node(NodeKind::ToMark);
        self.program.node_mut(node).ae = Some(position);
        node
    }

    pub fn atmark(&mut self, position: NodeId) -> NodeId {
        let node = self.node(NodeKind::AtMark);
        self.program.node_mut(node).ae = Some(position);
        node
    }

    pub fn setmark(&mut self, text: &str) -> NodeId {
        self.setter(NodeKind::SetMark, text, NameKind::Integer)
    }

    pub fn set(&mut self, text: &str) -> NodeId {
        self.setter(NodeKind::Set, text, NameKind::Boolean)
    }

    pub fn unset(&mut self, text: &str) -> NodeId {
        self.setter(NodeKind::Unset, text, NameKind::Boolean)
    }

    /// `-> s`
    pub fn slice_to(&mut self, text: &str) -> NodeId {
        self.require_modifiable(NodeKind::SliceTo);
        self.setter(NodeKind::SliceTo, text, NameKind::String)
    }

    /// `=> s`
    pub fn assign_to(&mut self, text: &str) -> NodeId {
        self.require_modifiable(NodeKind::AssignTo);
        self.setter(NodeKind::AssignTo, text, NameKind::String)
    }

    fn setter(&mut self, kind: NodeKind, text: &str, name_kind: NameKind) -> NodeId {
        let node = self.node(kind);
        if let Some(id) = self.name_to_node(node, text, name_kind) {
            self.program.name_mut(id).initialised = true;
        }
        node
    }

    /// `<- S`
    pub fn slice_from(&mut self, s: StringArg<'_>) -> NodeId {
        self.string_command(NodeKind::SliceFrom, s)
    }

    /// `= S`
    pub fn assign(&mut self, s: StringArg<'_>) -> NodeId {
        self.string_command(NodeKind::Assign, s)
    }

    pub fn insert(&mut self, s: StringArg<'_>) -> NodeId {
        self.string_command(NodeKind::Insert, s)
    }

    pub fn attach(&mut self, s: StringArg<'_>) -> NodeId {
        self.string_command(NodeKind::Attach, s)
    }

    fn string_command(&mut self, kind: NodeKind, s: StringArg<'_>) -> NodeId {
        self.require_modifiable(kind);
        let node = self.string_operand(kind, s);
        if let Some(id) = self.program.node(node).name {
            self.program.name_mut(id).value_used = true;
        }
        node
    }

    fn string_operand(&mut self, kind: NodeKind, s: StringArg<'_>) -> NodeId {
        let node = self.node(kind);
        match s {
            StringArg::Literal(text) => {
                self.program.node_mut(node).literal = Some(self.program.encoding.encode(text));
            }
            StringArg::Name(text) => {
                self.name_to_node(node, text, NameKind::String);
            }
        }
        node
    }

    pub fn substring(&mut self) -> NodeId {
        let node = self.node(NodeKind::Substring);
        if self.pending_substring.replace(node).is_some() {
            self.error(BuildErrorKind::SubstringWithoutAmong);
        }
        node
    }

    /// `among( ... )`. Pairs with a preceding `substring` in the same routine.
    ///
    /// The node keeps the items as its `left` sequence (literal strings with
    /// their gate call in `left`, and bracketed actions), the case count in
    /// `number`, and the paired `substring` in `aux`.
    pub fn among(&mut self, items: Vec<AmongItem<'_>>) -> NodeId {
        let node = self.node(NodeKind::Among);
        let substring = self.pending_substring.take();

        let mut linked = Vec::with_capacity(items.len());
        let mut cases = 0;
        let mut previous_was_action = false;
        for item in items {
            match item {
                AmongItem::Case { text, gate } => {
                    let lit = self.literal(text);
                    if let Some(gate) = gate {
                        let call = self.node(NodeKind::Call);
                        self.name_to_node(call, gate, NameKind::Routine);
                        self.program.node_mut(lit).left = Some(call);
                    }
                    cases += 1;
                    previous_was_action = false;
                    linked.push(lit);
                }
                AmongItem::Action(f) => {
                    if previous_was_action {
                        self.error(BuildErrorKind::AdjacentActions);
                    }
                    let commands = f(self);
                    let bra = self.bra(commands);
                    if self.program.is_just_true(self.program.node(bra).left) {
                        self.program.node_mut(bra).left = None;
                    }
                    previous_was_action = true;
                    linked.push(bra);
                }
            }
        }
        if cases == 0 {
            self.error(BuildErrorKind::EmptyAmong);
        }

        let left = self.link(&linked);
        let n = self.program.node_mut(node);
        n.left = left;
        n.number = cases;
        n.aux = substring;
        self.program.among_sites.push(AmongSite {
            node,
            routine: self.current_routine,
        });
        node
    }

    // Integer commands

    /// `$x = AE`, `$x += AE` and friends.
    pub fn int_assign(
        &mut self,
        kind: NodeKind,
        text: &str,
        value: impl FnOnce(&mut Self) -> NodeId,
    ) -> NodeId {
        debug_assert!(kind.is_integer_assign());
        let node = self.node(kind);
        let id = self.find(text);
        if let Some(id) = id {
            self.check_kind(id, NameKind::Integer);
        }

        let outer = std::mem::replace(&mut self.assigned_to, id);
        let ae = value(self);
        self.assigned_to = outer;

        let n = self.program.node_mut(node);
        n.name = id;
        n.ae = Some(ae);
        if let Some(id) = id {
            if kind == NodeKind::MathAssign && !self.ae_uses_name(Some(ae), id) {
                self.program.name_mut(id).initialised = true;
            }
            self.mark_used_in(id, node);
        }
        node
    }

    /// `$x == AE` and the other relational tests on a variable.
    pub fn int_test(&mut self, kind: NodeKind, text: &str, rhs: NodeId) -> NodeId {
        debug_assert!(kind.is_relational());
        let node = self.node(kind);
        let lhs = self.node(NodeKind::Variable);
        let id = self.find(text);
        if let Some(id) = id {
            self.check_kind(id, NameKind::Integer);
            self.program.name_mut(id).value_used = true;
            self.mark_used_in(id, node);
        }
        self.program.node_mut(lhs).name = id;
        let n = self.program.node_mut(node);
        n.left = Some(lhs);
        n.ae = Some(rhs);
        node
    }

    /// `$(AE1 == AE2)` and the other relational tests.
    pub fn compare(&mut self, kind: NodeKind, lhs: NodeId, rhs: NodeId) -> NodeId {
        debug_assert!(kind.is_relational());
        let node = self.node(kind);
        let n = self.program.node_mut(node);
        n.left = Some(lhs);
        n.ae = Some(rhs);
        node
    }

    fn ae_uses_name(&self, ae: Option<NodeId>, id: NameId) -> bool {
        let Some(ae) = ae else {
            return false;
        };
        let node = self.program.node(ae);
        match node.kind {
            NodeKind::Variable | NodeKind::LenOf | NodeKind::SizeOf => node.name == Some(id),
            NodeKind::Neg => self.ae_uses_name(node.left, id),
            NodeKind::Plus | NodeKind::Minus | NodeKind::Multiply | NodeKind::Divide => {
                self.ae_uses_name(node.left, id) || self.ae_uses_name(node.right, id)
            }
            _ => false,
        }
    }

    // Arithmetic expressions

    pub fn number(&mut self, value: i32) -> NodeId {
        let node = self.node(NodeKind::Number);
        let n = self.program.node_mut(node);
        n.number = value;
        n.fixed_constant = true;
        node
    }

    /// An integer variable read.
    pub fn var(&mut self, text: &str) -> NodeId {
        let node = self.node(NodeKind::Variable);
        if let Some(id) = self.name_to_node(node, text, NameKind::Integer) {
            if self.assigned_to != Some(id) {
                self.program.name_mut(id).value_used = true;
            }
        }
        node
    }

    pub fn cursor(&mut self) -> NodeId {
        self.node(NodeKind::Cursor)
    }

    pub fn limit(&mut self) -> NodeId {
        self.node(NodeKind::Limit)
    }

    pub fn len(&mut self) -> NodeId {
        self.node(NodeKind::Len)
    }

    pub fn size(&mut self) -> NodeId {
        self.node(NodeKind::Size)
    }

    pub fn maxint(&mut self) -> NodeId {
        self.program.int_limits_used = true;
        self.node(NodeKind::MaxInt)
    }

    pub fn minint(&mut self) -> NodeId {
        self.program.int_limits_used = true;
        self.node(NodeKind::MinInt)
    }

    pub fn lenof(&mut self, s: StringArg<'_>) -> NodeId {
        self.string_measure(NodeKind::LenOf, s)
    }

    pub fn sizeof(&mut self, s: StringArg<'_>) -> NodeId {
        self.string_measure(NodeKind::SizeOf, s)
    }

    fn string_measure(&mut self, kind: NodeKind, s: StringArg<'_>) -> NodeId {
        let node = self.string_operand(kind, s);
        if let Some(id) = self.program.node(node).name {
            self.program.name_mut(id).value_used = true;
        }
        node
    }

    pub fn neg(&mut self, operand: NodeId) -> NodeId {
        self.node_with_left(NodeKind::Neg, operand)
    }

    /// `+`, `-`, `*` or `/`.
    pub fn arith(&mut self, kind: NodeKind, lhs: NodeId, rhs: NodeId) -> NodeId {
        debug_assert!(matches!(
            kind,
            NodeKind::Plus | NodeKind::Minus | NodeKind::Multiply | NodeKind::Divide
        ));
        let node = self.node_with_left(kind, lhs);
        self.program.node_mut(node).right = Some(rhs);
        node
    }
}
