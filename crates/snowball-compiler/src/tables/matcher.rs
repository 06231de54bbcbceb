//! Reference model of the runtime's among lookup.
//!
//! Mirrors `find_among` and `find_among_b`: a binary search over the sorted
//! cases that tracks the common prefix with both bounds, followed by a walk
//! down the fallback chain until a case whose gate accepts. Used to check the
//! tables and the generated pre-check against each other.

use snowball_core::{Mode, NameId};

use super::among::{Among, AmongCase, PreCheck};

/// Buffer and cursor state as seen by the generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'b> {
    pub buffer: &'b [u16],
    pub c: usize,
    /// Forward limit (`z->l`).
    pub l: usize,
    /// Backward limit (`z->lb`).
    pub lb: usize,
}

impl<'b> Cursor<'b> {
    pub fn forward(buffer: &'b [u16]) -> Self {
        Self {
            buffer,
            c: 0,
            l: buffer.len(),
            lb: 0,
        }
    }

    pub fn backward(buffer: &'b [u16]) -> Self {
        Self {
            buffer,
            c: buffer.len(),
            l: buffer.len(),
            lb: 0,
        }
    }
}

/// Longest-match lookup. Returns the index of the matched case and leaves
/// the cursor after it; on no match the cursor is left where it was.
pub fn find_among(
    cases: &[AmongCase],
    mode: Mode,
    cursor: &mut Cursor<'_>,
    mut gate: impl FnMut(NameId, usize) -> bool,
) -> Option<usize> {
    if cases.is_empty() {
        return None;
    }
    let c_orig = cursor.c;
    let forward = mode.is_forward();

    let mut i = 0usize;
    let mut j = cases.len();
    let mut common_i = 0usize;
    let mut common_j = 0usize;
    let mut first_key_inspected = false;

    loop {
        let k = i + ((j - i) >> 1);
        let mut diff = 0i32;
        let mut common = common_i.min(common_j);
        let text = &cases[k].text;
        while common < text.len() {
            let (at_limit, ch, key) = if forward {
                (c_orig + common == cursor.l, c_orig + common, text[common])
            } else {
                (
                    c_orig - common == cursor.lb,
                    c_orig.wrapping_sub(common + 1),
                    text[text.len() - 1 - common],
                )
            };
            if at_limit {
                diff = -1;
                break;
            }
            diff = i32::from(cursor.buffer[ch]) - i32::from(key);
            if diff != 0 {
                break;
            }
            common += 1;
        }
        if diff < 0 {
            j = k;
            common_j = common;
        } else {
            i = k;
            common_i = common;
        }
        if j - i <= 1 {
            if i > 0 || j == i || first_key_inspected {
                break;
            }
            first_key_inspected = true;
        }
    }

    let mut next = Some(i);
    while let Some(index) = next {
        let case = &cases[index];
        if common_i >= case.text.len() {
            let after = if forward {
                c_orig + case.text.len()
            } else {
                c_orig - case.text.len()
            };
            let accepted = match case.gate {
                None => true,
                Some(routine) => gate(routine, after),
            };
            if accepted {
                cursor.c = after;
                return Some(index);
            }
        }
        next = case.fallback;
    }
    cursor.c = c_orig;
    None
}

/// Whether the pre-check rules out every case at the cursor.
pub fn precheck_rejects(check: &PreCheck, mode: Mode, cursor: &Cursor<'_>) -> bool {
    let offset = check.offset;
    if mode.is_forward() {
        if cursor.c + offset >= cursor.l {
            return true;
        }
        !check.accepts(cursor.buffer[cursor.c + offset])
    } else {
        if cursor.c <= cursor.lb + offset {
            return true;
        }
        !check.accepts(cursor.buffer[cursor.c - 1])
    }
}

/// Runs the dispatch the way the generated code does, with or without the
/// pre-check in front of the table lookup.
pub fn dispatch(
    among: &Among,
    cursor: &mut Cursor<'_>,
    use_precheck: bool,
    gate: impl FnMut(NameId, usize) -> bool,
) -> Option<usize> {
    if use_precheck {
        if let Some(check) = among.precheck() {
            if precheck_rejects(&check, among.mode, cursor) {
                return check.empty_case;
            }
        }
    }
    find_among(&among.cases, among.mode, cursor, gate)
}
