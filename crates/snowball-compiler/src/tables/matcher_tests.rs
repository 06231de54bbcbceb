use snowball_core::{Mode, Name, NameId, NameKind, Node, NodeKind, Program};

use super::among::{Among, AmongCase, order_cases};
use super::matcher::{Cursor, dispatch, find_among};

fn sym(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

fn among(program: &mut Program, cases: Vec<AmongCase>, mode: Mode, amongvar_needed: bool) -> Among {
    let node = program.alloc(Node::new(NodeKind::Among, mode, 1));
    let ordered = order_cases(cases, mode);
    Among {
        number: 0,
        node,
        routine: None,
        mode,
        always_matches: ordered
            .cases
            .iter()
            .any(|c| c.text.is_empty() && c.gate.is_none()),
        cases: ordered.cases,
        actions: Vec::new(),
        no_action_count: 0,
        gates: Vec::new(),
        shortest: ordered.shortest,
        longest: ordered.longest,
        substring: None,
        amongvar_needed,
        used: true,
    }
}

fn plain(texts: &[&str]) -> Vec<AmongCase> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let mut case = AmongCase::new(sym(t), i as u32 + 1);
            case.outcome = Some(i as u32 + 1);
            case
        })
        .collect()
}

/// Every string over `alphabet` up to `max_len` symbols.
fn all_strings(alphabet: &str, max_len: usize) -> Vec<Vec<u16>> {
    let alphabet = sym(alphabet);
    let mut out = vec![Vec::new()];
    let mut frontier = vec![Vec::new()];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for s in &frontier {
            for &ch in &alphabet {
                let mut t: Vec<u16> = s.clone();
                t.push(ch);
                next.push(t);
            }
        }
        out.extend(next.iter().cloned());
        frontier = next;
    }
    out
}

fn matched_text(among: &Among, result: Option<usize>) -> Option<String> {
    result.map(|i| String::from_utf16_lossy(&among.cases[i].text))
}

#[test]
fn longest_match_forward() {
    let mut program = Program::default();
    let among = among(&mut program, plain(&["a", "ab", "abc"]), Mode::Forward, true);
    let buffer = sym("abcd");
    let mut cursor = Cursor::forward(&buffer);

    let result = find_among(&among.cases, among.mode, &mut cursor, |_, _| true);

    assert_eq!(matched_text(&among, result).as_deref(), Some("abc"));
    assert_eq!(among.cases[result.unwrap()].outcome, Some(3));
    assert_eq!(cursor.c, 3);
}

#[test]
fn longest_match_falls_back_to_shorter_case() {
    let mut program = Program::default();
    let among = among(&mut program, plain(&["a", "ab", "abc"]), Mode::Forward, true);
    let buffer = sym("abx");
    let mut cursor = Cursor::forward(&buffer);

    let result = find_among(&among.cases, among.mode, &mut cursor, |_, _| true);

    assert_eq!(matched_text(&among, result).as_deref(), Some("ab"));
    assert_eq!(cursor.c, 2);
}

#[test]
fn longest_match_backward() {
    let mut program = Program::default();
    let among = among(&mut program, plain(&["s", "es", "ies", "sses"]), Mode::Backward, true);
    let buffer = sym("ponies");
    let mut cursor = Cursor::backward(&buffer);

    let result = find_among(&among.cases, among.mode, &mut cursor, |_, _| true);

    assert_eq!(matched_text(&among, result).as_deref(), Some("ies"));
    assert_eq!(cursor.c, 3);
}

#[test]
fn no_match_leaves_cursor() {
    let mut program = Program::default();
    let among = among(&mut program, plain(&["x", "yz"]), Mode::Forward, true);
    let buffer = sym("yx");
    let mut cursor = Cursor::forward(&buffer);

    let result = find_among(&among.cases, among.mode, &mut cursor, |_, _| true);

    assert_eq!(result, None);
    assert_eq!(cursor.c, 0);
}

#[test]
fn rejected_gate_falls_back() {
    let mut program = Program::default();
    let gate: NameId = program.add_name(Name::new("r_gate", NameKind::Routine, 1));
    let mut cases = plain(&["a", "ab"]);
    cases[1].gate = Some(gate);
    cases[1].function_index = 1;
    let among = among(&mut program, cases, Mode::Forward, true);
    let buffer = sym("ab");

    let mut cursor = Cursor::forward(&buffer);
    let mut calls = Vec::new();
    let result = find_among(&among.cases, among.mode, &mut cursor, |routine, c| {
        calls.push((routine, c));
        false
    });

    assert_eq!(matched_text(&among, result).as_deref(), Some("a"));
    assert_eq!(cursor.c, 1);
    assert_eq!(calls, vec![(gate, 2)]);
}

fn assert_precheck_agrees(among: &Among, inputs: &[Vec<u16>]) {
    assert!(among.precheck().is_some(), "expected a pre-check");
    for input in inputs {
        for start in 0..=input.len() {
            let (mut fast, mut slow) = if among.is_forward() {
                (Cursor::forward(input), Cursor::forward(input))
            } else {
                (Cursor::backward(input), Cursor::backward(input))
            };
            fast.c = start;
            slow.c = start;

            let with = dispatch(among, &mut fast, true, |_, _| true);
            let without = dispatch(among, &mut slow, false, |_, _| true);

            assert_eq!(with, without, "input {input:?} at {start}");
            assert_eq!(fast.c, slow.c, "input {input:?} at {start}");
        }
    }
}

#[test]
fn precheck_never_changes_the_dispatch_forward() {
    let inputs = all_strings("abcd", 4);
    let mut program = Program::default();

    for texts in [
        &["a", "ab", "abc"][..],
        &["ba", "ca", "bca"][..],
        &["ab", "ac", "ad", "bd"][..],
        &["cd", "dd"][..],
    ] {
        let among = among(&mut program, plain(texts), Mode::Forward, true);
        assert_precheck_agrees(&among, &inputs);
    }
}

#[test]
fn precheck_never_changes_the_dispatch_backward() {
    let inputs = all_strings("abcd", 4);
    let mut program = Program::default();

    for texts in [&["a", "ba", "cba"][..], &["ab", "db", "cd"][..], &["bc", "c"][..]] {
        let among = among(&mut program, plain(texts), Mode::Backward, true);
        assert_precheck_agrees(&among, &inputs);
    }
}

#[test]
fn precheck_selects_the_empty_case() {
    let inputs = all_strings("abc", 3);
    let mut program = Program::default();
    let among = among(&mut program, plain(&["", "ab", "b"]), Mode::Forward, true);

    assert!(among.always_matches);
    assert_precheck_agrees(&among, &inputs);

    let buffer = sym("c");
    let mut cursor = Cursor::forward(&buffer);
    let result = dispatch(&among, &mut cursor, true, |_, _| true);
    assert_eq!(matched_text(&among, result).as_deref(), Some(""));
}
