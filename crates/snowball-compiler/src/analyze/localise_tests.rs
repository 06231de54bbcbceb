use snowball_core::{Name, NameKind, NodeId, NodeKind, ProgramBuilder, StringArg};

use super::{AnalyzedProgram, always_set_before_use};
use crate::diagnostics::DiagnosticKind;
use crate::test_utils::analyzed;

fn name<'a>(result: &'a AnalyzedProgram, text: &str) -> &'a Name {
    let id = result.program.lookup(text).expect("declared name");
    result.program.name(id)
}

/// `p` is read with `tomark p` after `setup` ran in `stem`.
fn read_after(setup: impl FnOnce(&mut ProgramBuilder) -> Vec<NodeId>) -> AnalyzedProgram {
    let (result, _) = analyzed(|b| {
        b.declare(NameKind::Integer, "p");
        b.declare(NameKind::External, "stem");
        b.define("stem", |b| {
            let mut commands = setup(b);
            let at = b.var("p");
            commands.push(b.tomark(at));
            b.seq(commands)
        });
    });
    result
}

#[test]
fn set_then_read_is_local() {
    let result = read_after(|b| vec![b.setmark("p")]);

    let p = name(&result, "p");
    assert!(p.local_to.is_some());
    assert_eq!(p.slot, None);
    assert_eq!(result.variable_count, 0);
}

#[test]
fn read_then_set_stays_shared() {
    let (result, diagnostics) = analyzed(|b| {
        b.declare(NameKind::Integer, "p");
        b.declare(NameKind::External, "stem");
        b.define("stem", |b| {
            let p = b.var("p");
            let zero = b.number(0);
            let test = b.compare(NodeKind::Gt, p, zero);
            let set = b.setmark("p");
            b.seq(vec![test, set])
        });
    });

    let p = name(&result, "p");
    assert!(p.is_shared());
    assert_eq!(p.slot, Some(0));
    assert_eq!(result.variable_count, 1);
    insta::assert_snapshot!(
        diagnostics.render_plain(),
        @"1: info: Could not localise integer `p` to routine `stem`"
    );
}

#[test]
fn every_or_branch_must_set() {
    let result = read_after(|b| {
        let mark = b.setmark("p");
        let a = b.literal("a");
        let first = b.seq(vec![mark, a]);
        let second = b.setmark("p");
        vec![b.or(vec![first, second])]
    });
    assert!(name(&result, "p").local_to.is_some());

    let result = read_after(|b| {
        let mark = b.setmark("p");
        let a = b.literal("a");
        let first = b.seq(vec![mark, a]);
        let second = b.literal("b");
        vec![b.or(vec![first, second])]
    });
    assert!(name(&result, "p").is_shared());
}

#[test]
fn try_may_skip_the_store() {
    let result = read_after(|b| {
        let mark = b.setmark("p");
        vec![b.try_(mark)]
    });

    assert!(name(&result, "p").is_shared());
}

#[test]
fn recursive_call_before_the_store_stays_shared() {
    let (result, diagnostics) = analyzed(|b| {
        b.declare(NameKind::Integer, "p");
        b.declare(NameKind::Routine, "walk");
        b.declare(NameKind::External, "stem");
        b.define("walk", |b| {
            let a = b.literal("a");
            let again = b.name("walk");
            let inner = b.seq(vec![a, again]);
            let attempt = b.try_(inner);
            let mark = b.setmark("p");
            let at = b.var("p");
            let back = b.tomark(at);
            b.seq(vec![attempt, mark, back])
        });
        b.define("stem", |b| b.name("walk"));
    });

    let p = name(&result, "p");
    assert!(p.is_shared());
    assert_eq!(diagnostics.of_kind(DiagnosticKind::NotLocalised).count(), 1);

    let walk = result.program.lookup("walk").expect("walk");
    let define = result.program.name(walk).definition.expect("defined");
    let p = result.program.lookup("p").expect("p");
    assert!(!always_set_before_use(&result.program, &result.amongs, define, p));
}

#[test]
fn strings_always_live_in_the_state() {
    let (result, diagnostics) = analyzed(|b| {
        b.declare(NameKind::String, "saved");
        b.declare(NameKind::External, "stem");
        b.define("stem", |b| {
            let to = b.slice_to("saved");
            let insert = b.insert(StringArg::Name("saved"));
            b.seq(vec![to, insert])
        });
    });

    assert_eq!(name(&result, "saved").slot, Some(0));
    assert_eq!(result.variable_count, 1);
    assert_eq!(diagnostics.of_kind(DiagnosticKind::NotLocalised).count(), 0);
}

#[test]
fn shared_slots_are_dense_per_kind() {
    let (result, _) = analyzed(|b| {
        b.declare_all(NameKind::Integer, &["p1", "p2"]);
        b.declare(NameKind::Boolean, "found");
        b.declare(NameKind::Routine, "check");
        b.declare(NameKind::External, "stem");
        b.define("check", |b| {
            let p1 = b.var("p1");
            let back1 = b.tomark(p1);
            let p2 = b.var("p2");
            let back2 = b.tomark(p2);
            let found = b.name("found");
            b.seq(vec![back1, back2, found])
        });
        b.define("stem", |b| {
            let m1 = b.setmark("p1");
            let m2 = b.setmark("p2");
            let set = b.set("found");
            let call = b.name("check");
            b.seq(vec![m1, m2, set, call])
        });
    });

    assert_eq!(name(&result, "p1").slot, Some(0));
    assert_eq!(name(&result, "p2").slot, Some(1));
    assert_eq!(name(&result, "found").slot, Some(0));
    assert_eq!(result.variable_count, 3);
}
