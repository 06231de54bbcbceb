//! Combinator tree nodes.
//!
//! Nodes live in the [`Program`](crate::Program) arena and refer to each other
//! by [`NodeId`]. Every node has up to four links:
//! - `left`: the primary subtree (the command of `not`, the body of a routine,
//!   the first element of a command list)
//! - `right`: the next command in the enclosing sequence
//! - `aux`: the second command of `setlimit`, or the paired `substring` of an
//!   `among`
//! - `ae`: an arithmetic expression operand
//!
//! Arithmetic nodes are never part of a sequence, so binary operators keep
//! their operands in `left` and `right`, and `Neg` keeps its operand in
//! `left`. A relational test keeps its left hand side in `left` and its right
//! hand side in `ae`.

use serde::Serialize;

use crate::name::{AmongId, NameId};

/// Index of a node in the program arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Direction a string command scans the buffer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Forward,
    Backward,
}

impl Mode {
    pub fn is_forward(self) -> bool {
        self == Mode::Forward
    }

    pub fn reversed(self) -> Self {
        match self {
            Mode::Forward => Mode::Backward,
            Mode::Backward => Mode::Forward,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Mode::Forward => "string forward",
            Mode::Backward => "string backward",
        }
    }
}

/// Static classification of the outcome a command can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    /// Every execution signals f.
    Fails,
    /// Every execution signals t.
    Succeeds,
    /// Either outcome is possible, or the analysis could not tell.
    #[default]
    Unknown,
}

impl Signal {
    pub fn is_known(self) -> bool {
        self != Signal::Unknown
    }

    /// Logical negation, as applied by `not`.
    pub fn inverted(self) -> Self {
        match self {
            Signal::Fails => Signal::Succeeds,
            Signal::Succeeds => Signal::Fails,
            Signal::Unknown => Signal::Unknown,
        }
    }

    /// Combines two signals that must both be t for the whole to be t.
    pub fn both(self, other: Signal) -> Self {
        match (self, other) {
            (Signal::Fails, _) | (_, Signal::Fails) => Signal::Fails,
            (Signal::Succeeds, Signal::Succeeds) => Signal::Succeeds,
            _ => Signal::Unknown,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Signal::Fails => 'f',
            Signal::Succeeds => 't',
            Signal::Unknown => '?',
        }
    }
}

/// The closed set of node variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    // Routine structure
    Define,
    FunctionEnd,

    // Combinators
    Bra,
    And,
    Or,
    Not,
    Try,
    Test,
    Do,
    Fail,
    Repeat,
    Loop,
    AtLeast,
    Goto,
    GoPast,
    Backwards,
    Reverse,
    SetLimit,
    Dollar,
    Among,
    Substring,

    // Grouping scans synthesised from goto/gopast over a grouping
    GotoGrouping,
    GoPastGrouping,
    GotoNon,
    GoPastNon,

    // Cursor and slice primitives
    True,
    False,
    Next,
    Hop,
    ToLimit,
    AtLimit,
    SetMark,
    ToMark,
    AtMark,
    LeftSlice,
    RightSlice,
    Delete,
    SliceFrom,
    SliceTo,
    AssignTo,
    Assign,
    Insert,
    Attach,
    Debug,

    // Tests
    LiteralString,
    NamedString,
    Grouping,
    Non,
    Call,
    Set,
    Unset,
    BoolTest,
    NotBoolTest,

    // Integer commands
    MathAssign,
    PlusAssign,
    MinusAssign,
    MultiplyAssign,
    DivideAssign,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,

    // Arithmetic expressions
    Number,
    Variable,
    Neg,
    Plus,
    Minus,
    Multiply,
    Divide,
    Cursor,
    Limit,
    Len,
    Size,
    LenOf,
    SizeOf,
    MaxInt,
    MinInt,
}

impl NodeKind {
    /// The source token the node was written with.
    pub fn token(self) -> &'static str {
        match self {
            NodeKind::Define => "define",
            NodeKind::FunctionEnd => "functionend",
            NodeKind::Bra => "(",
            NodeKind::And => "and",
            NodeKind::Or => "or",
            NodeKind::Not => "not",
            NodeKind::Try => "try",
            NodeKind::Test => "test",
            NodeKind::Do => "do",
            NodeKind::Fail => "fail",
            NodeKind::Repeat => "repeat",
            NodeKind::Loop => "loop",
            NodeKind::AtLeast => "atleast",
            NodeKind::Goto | NodeKind::GotoGrouping => "goto",
            NodeKind::GoPast | NodeKind::GoPastGrouping => "gopast",
            NodeKind::GotoNon => "goto non",
            NodeKind::GoPastNon => "gopast non",
            NodeKind::Backwards => "backwards",
            NodeKind::Reverse => "reverse",
            NodeKind::SetLimit => "setlimit",
            NodeKind::Dollar => "$",
            NodeKind::Among => "among",
            NodeKind::Substring => "substring",
            NodeKind::True => "true",
            NodeKind::False => "false",
            NodeKind::Next => "next",
            NodeKind::Hop => "hop",
            NodeKind::ToLimit => "tolimit",
            NodeKind::AtLimit => "atlimit",
            NodeKind::SetMark => "setmark",
            NodeKind::ToMark => "tomark",
            NodeKind::AtMark => "atmark",
            NodeKind::LeftSlice => "[",
            NodeKind::RightSlice => "]",
            NodeKind::Delete => "delete",
            NodeKind::SliceFrom => "<-",
            NodeKind::SliceTo => "->",
            NodeKind::AssignTo => "=>",
            NodeKind::Assign | NodeKind::MathAssign => "=",
            NodeKind::Insert => "insert",
            NodeKind::Attach => "attach",
            NodeKind::Debug => "?",
            NodeKind::LiteralString => "literalstring",
            NodeKind::NamedString => "name",
            NodeKind::Grouping => "grouping",
            NodeKind::Non => "non",
            NodeKind::Call => "call",
            NodeKind::Set => "set",
            NodeKind::Unset => "unset",
            NodeKind::BoolTest => "booltest",
            NodeKind::NotBoolTest => "not booltest",
            NodeKind::PlusAssign => "+=",
            NodeKind::MinusAssign => "-=",
            NodeKind::MultiplyAssign => "*=",
            NodeKind::DivideAssign => "/=",
            NodeKind::Eq => "==",
            NodeKind::Ne => "!=",
            NodeKind::Gt => ">",
            NodeKind::Ge => ">=",
            NodeKind::Lt => "<",
            NodeKind::Le => "<=",
            NodeKind::Number => "number",
            NodeKind::Variable => "name",
            NodeKind::Neg => "-",
            NodeKind::Plus => "+",
            NodeKind::Minus => "-",
            NodeKind::Multiply => "*",
            NodeKind::Divide => "/",
            NodeKind::Cursor => "cursor",
            NodeKind::Limit => "limit",
            NodeKind::Len => "len",
            NodeKind::Size => "size",
            NodeKind::LenOf => "lenof",
            NodeKind::SizeOf => "sizeof",
            NodeKind::MaxInt => "maxint",
            NodeKind::MinInt => "minint",
        }
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            NodeKind::Eq | NodeKind::Ne | NodeKind::Gt | NodeKind::Ge | NodeKind::Lt | NodeKind::Le
        )
    }

    pub fn is_integer_assign(self) -> bool {
        matches!(
            self,
            NodeKind::MathAssign
                | NodeKind::PlusAssign
                | NodeKind::MinusAssign
                | NodeKind::MultiplyAssign
                | NodeKind::DivideAssign
        )
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            NodeKind::Number
                | NodeKind::Variable
                | NodeKind::Neg
                | NodeKind::Plus
                | NodeKind::Minus
                | NodeKind::Multiply
                | NodeKind::Divide
                | NodeKind::Cursor
                | NodeKind::Limit
                | NodeKind::Len
                | NodeKind::Size
                | NodeKind::LenOf
                | NodeKind::SizeOf
                | NodeKind::MaxInt
                | NodeKind::MinInt
        )
    }

    /// The relational test with the opposite outcome (`==` and `!=`, `<` and `>=`).
    pub fn negated_relation(self) -> Option<Self> {
        Some(match self {
            NodeKind::Eq => NodeKind::Ne,
            NodeKind::Ne => NodeKind::Eq,
            NodeKind::Gt => NodeKind::Le,
            NodeKind::Le => NodeKind::Gt,
            NodeKind::Ge => NodeKind::Lt,
            NodeKind::Lt => NodeKind::Ge,
            _ => return None,
        })
    }
}

/// One combinator, primitive command, or arithmetic term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub mode: Mode,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub aux: Option<NodeId>,
    pub ae: Option<NodeId>,
    pub name: Option<NameId>,
    pub literal: Option<Vec<u16>>,
    /// Value of a `Number`, or the case count of an unbuilt `Among`.
    pub number: i32,
    /// `Number` written directly in the source (as opposed to computed).
    pub fixed_constant: bool,
    pub among: Option<AmongId>,
    pub signal: Signal,
    pub line: u32,
}

impl Node {
    pub fn new(kind: NodeKind, mode: Mode, line: u32) -> Self {
        Self {
            kind,
            mode,
            left: None,
            right: None,
            aux: None,
            ae: None,
            name: None,
            literal: None,
            number: 0,
            fixed_constant: false,
            among: None,
            signal: Signal::Unknown,
            line,
        }
    }

    /// Turns the node into a no-op `true`, keeping its place in the sequence.
    pub fn make_true(&mut self) {
        self.kind = NodeKind::True;
        self.left = None;
        self.aux = None;
        self.ae = None;
        self.name = None;
        self.literal = None;
        self.among = None;
    }
}
