//! Character classes compiled to bitmaps.

use serde::Serialize;
use snowball_core::{GroupingOp, GroupingTerm, NameId, Program};

use crate::diagnostics::{DiagnosticKind, Diagnostics};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grouping {
    pub name: NameId,
    pub line: u32,
    /// Sorted, without duplicates.
    pub chars: Vec<u16>,
    pub min: u16,
    pub max: u16,
}

impl Grouping {
    fn new(name: NameId, line: u32, mut chars: Vec<u16>) -> Self {
        chars.sort_unstable();
        chars.dedup();
        let min = chars.first().copied().unwrap_or(0);
        let max = chars.last().copied().unwrap_or(0);
        Self {
            name,
            line,
            chars,
            min,
            max,
        }
    }

    /// One bit per code point in `min..=max`: bit `(c - min) % 8` of byte
    /// `(c - min) / 8`.
    pub fn bitmap(&self) -> Vec<u8> {
        let range = usize::from(self.max - self.min) + 1;
        let mut map = vec![0u8; range.div_ceil(8)];
        for &c in &self.chars {
            let bit = usize::from(c - self.min);
            map[bit / 8] |= 1 << (bit % 8);
        }
        map
    }

    pub fn contains(&self, ch: u16) -> bool {
        self.chars.binary_search(&ch).is_ok()
    }
}

/// Builds every named grouping definition in source order.
///
/// A grouping may only refer to groupings defined before it. Definitions
/// superseded by a redefinition are skipped.
pub fn build_groupings(program: &Program, diagnostics: &mut Diagnostics) -> Vec<Grouping> {
    let mut built: Vec<Grouping> = Vec::new();

    for def in &program.groupings {
        let Some(name) = def.name else {
            continue;
        };
        let mut chars: Vec<u16> = Vec::new();
        for (op, term) in &def.terms {
            let operand: &[u16] = match term {
                GroupingTerm::Chars(symbols) => symbols,
                GroupingTerm::Grouping(other) if *other == name => {
                    diagnostics
                        .report(DiagnosticKind::GroupingDefinedInTermsOfItself, def.line)
                        .message(&program.name(name).text)
                        .emit();
                    continue;
                }
                GroupingTerm::Grouping(other) => {
                    match built.iter().find(|g| g.name == *other) {
                        Some(g) => &g.chars,
                        None => {
                            diagnostics
                                .report(DiagnosticKind::GroupingUndefined, def.line)
                                .message(&program.name(*other).text)
                                .emit();
                            continue;
                        }
                    }
                }
            };
            match op {
                GroupingOp::Add => chars.extend_from_slice(operand),
                GroupingOp::Remove => chars.retain(|c| !operand.contains(c)),
            }
        }

        if chars.is_empty() {
            diagnostics.report(DiagnosticKind::EmptyGrouping, def.line).emit();
        }
        let grouping = Grouping::new(name, def.line, chars);
        // A redefinition replaces the earlier table.
        built.retain(|g| g.name != name);
        built.push(grouping);
    }

    built
}
