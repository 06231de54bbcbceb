//! Among tables: sorted case strings with their fallback chain.
//!
//! Cases are kept in the direction they are written. Ordering and the
//! fallback search work on strings reversed for backward amongs, so both
//! directions share one algorithm: a fallback is always a shorter case that
//! the text starts with, in scan order.

use serde::Serialize;
use snowball_core::{Mode, NameId, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmongCase {
    pub text: Vec<u16>,
    /// Index of the longest shorter case this one starts with in scan order.
    pub fallback: Option<usize>,
    /// 1-based index into [`Among::actions`]. `None` for cases without an action.
    pub outcome: Option<u32>,
    /// Routine that must also succeed for the case to match.
    pub gate: Option<NameId>,
    /// 1-based position of the gate in [`Among::gates`], 0 without a gate.
    pub function_index: u32,
    pub line: u32,
}

impl AmongCase {
    pub fn new(text: Vec<u16>, line: u32) -> Self {
        Self {
            text,
            fallback: None,
            outcome: None,
            gate: None,
            function_index: 0,
            line,
        }
    }

    /// Value stored in the table's result column.
    pub fn result(&self) -> i32 {
        self.outcome.map_or(-1, |o| o as i32)
    }

    /// Fallback as the relative offset stored in the generated table, 0 for none.
    pub fn fallback_offset(&self, index: usize) -> i64 {
        self.fallback.map_or(0, |f| f as i64 - index as i64)
    }
}

/// A built among, shared by the `among` node and its `substring`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Among {
    /// Dense number of the table (`a_N`), assigned once unreachable amongs
    /// are dropped.
    pub number: usize,
    pub node: NodeId,
    pub routine: Option<NameId>,
    /// Scan direction: the substring's mode if there is one.
    pub mode: Mode,
    pub cases: Vec<AmongCase>,
    /// Canonical action per outcome, each a `Bra` node.
    pub actions: Vec<NodeId>,
    pub no_action_count: usize,
    /// Distinct gating routines in first-use order.
    pub gates: Vec<NameId>,
    /// An ungated empty case: the dispatch never fails.
    pub always_matches: bool,
    /// Length of the shortest non-empty case, 0 if there is none.
    pub shortest: usize,
    pub longest: usize,
    pub substring: Option<NodeId>,
    /// The dispatch needs `among_var` to select an action.
    pub amongvar_needed: bool,
    /// Reached from an external and emitted as a table.
    pub used: bool,
}

impl Among {
    pub fn function_count(&self) -> usize {
        self.gates.len()
    }

    pub fn is_forward(&self) -> bool {
        self.mode.is_forward()
    }

    pub fn empty_case(&self) -> Option<usize> {
        self.cases.iter().position(|c| c.text.is_empty())
    }

    /// The cheap rejection test run before the table lookup, if one applies.
    ///
    /// A rejected probe selects the empty case directly, which needs
    /// `among_var` and an ungated empty case.
    pub fn precheck(&self) -> Option<PreCheck> {
        if let Some(empty) = self.empty_case()
            && (!self.amongvar_needed || self.cases[empty].gate.is_some())
        {
            return None;
        }
        precheck(&self.cases, self.mode, self.shortest)
    }
}

/// Two cases with the same text, by index after ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatedCase {
    pub previous: usize,
    pub repeated: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedCases {
    pub cases: Vec<AmongCase>,
    pub shortest: usize,
    pub longest: usize,
    pub repeated: Vec<RepeatedCase>,
}

/// Sorts the cases in scan order and fills in their fallback chain.
///
/// Ties between equal texts keep declaration order, and every such pair is
/// reported in `repeated`.
pub fn order_cases(mut cases: Vec<AmongCase>, mode: Mode) -> OrderedCases {
    let backward = !mode.is_forward();
    if backward {
        for case in &mut cases {
            case.text.reverse();
        }
    }
    cases.sort_by(|a, b| a.text.cmp(&b.text).then(a.line.cmp(&b.line)));

    let mut shortest = 0;
    let mut longest = 0;
    for i in (0..cases.len()).rev() {
        let size = cases[i].text.len();
        if size > 0 {
            if shortest == 0 || size < shortest {
                shortest = size;
            }
            longest = longest.max(size);
        }
        cases[i].fallback = (0..i)
            .rev()
            .find(|&w| cases[w].text.len() < size && cases[i].text.starts_with(&cases[w].text));
    }

    if backward {
        for case in &mut cases {
            case.text.reverse();
        }
    }

    let repeated = (1..cases.len())
        .filter(|&i| cases[i - 1].text == cases[i].text)
        .map(|i| RepeatedCase {
            previous: i - 1,
            repeated: i,
        })
        .collect();

    OrderedCases {
        cases,
        shortest,
        longest,
        repeated,
    }
}

/// What the rejection test compares the probed symbol against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PreCheckTest {
    /// Only the length is checked (`among('')`).
    LengthOnly,
    One(u16),
    Two(u16, u16),
    /// All probed symbols share `ch >> 5 == block`; `bitmap` has bit
    /// `ch & 0x1f` set for each of them.
    Block { block: u16, bitmap: u32 },
}

/// Rejects the among before the table lookup when the symbol at a fixed
/// offset from the cursor can not start any case.
///
/// Forward amongs probe `p[c + offset]`, the last symbol of the shortest
/// case. Backward amongs probe `p[c - 1]`, the last symbol of every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreCheck {
    pub offset: usize,
    pub test: PreCheckTest,
    /// Index of the empty case, selected when the test rejects.
    pub empty_case: Option<usize>,
}

impl PreCheck {
    /// Whether the symbol at the probe position may start a match.
    pub fn accepts(&self, ch: u16) -> bool {
        match self.test {
            PreCheckTest::LengthOnly => true,
            PreCheckTest::One(a) => ch == a,
            PreCheckTest::Two(a, b) => ch == a || ch == b,
            PreCheckTest::Block { block, bitmap } => {
                ch >> 5 == block && (bitmap >> (ch & 0x1f)) & 1 == 1
            }
        }
    }
}

fn precheck(cases: &[AmongCase], mode: Mode, shortest: usize) -> Option<PreCheck> {
    let mut block: Option<u16> = None;
    let mut bitmap = 0u32;
    let mut empty_case = None;
    let mut n_cases = 0usize;
    let mut seen = [0u16; 2];

    for (index, case) in cases.iter().enumerate() {
        if case.text.is_empty() {
            empty_case = Some(index);
            continue;
        }
        let ch = if mode.is_forward() {
            case.text[shortest - 1]
        } else {
            case.text[case.text.len() - 1]
        };

        if n_cases == 0 {
            block = Some(ch >> 5);
        } else if block != Some(ch >> 5) {
            block = None;
            if n_cases > 2 {
                break;
            }
        }

        if block.is_none() {
            if n_cases > 0 && ch == seen[0] {
                continue;
            }
            if n_cases < 2 {
                seen[n_cases] = ch;
                n_cases += 1;
            } else if ch != seen[1] {
                n_cases += 1;
                break;
            }
        } else if bitmap & (1 << (ch & 0x1f)) == 0 {
            bitmap |= 1 << (ch & 0x1f);
            if n_cases < 2 {
                seen[n_cases] = ch;
            }
            n_cases += 1;
        }
    }

    if block.is_none() && n_cases > 2 {
        return None;
    }

    let test = match (n_cases, block) {
        (0, _) => PreCheckTest::LengthOnly,
        (1, _) => PreCheckTest::One(seen[0]),
        (2, _) => PreCheckTest::Two(seen[0], seen[1]),
        (_, Some(block)) => PreCheckTest::Block { block, bitmap },
        (_, None) => return None,
    };

    Some(PreCheck {
        offset: shortest.saturating_sub(1),
        test,
        empty_case,
    })
}
