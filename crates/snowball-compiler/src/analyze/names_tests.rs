use snowball_core::{NameKind, NodeKind, Program, ProgramBuilder};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::test_utils::{analysis_errors, analyzed, compiled};

fn messages(diagnostics: &Diagnostics, kind: DiagnosticKind) -> Vec<String> {
    diagnostics
        .of_kind(kind)
        .map(|d| format!("{}: {}", d.line(), d.message()))
        .collect()
}

fn is_live(program: &Program, text: &str) -> bool {
    let id = program.lookup(text).expect("declared name");
    program.name(id).is_live()
}

#[test]
fn declared_names_nothing_mentions() {
    let (result, diagnostics) = analyzed(|b| {
        b.declare(NameKind::Integer, "unused");
        b.at(2);
        b.declare(NameKind::Routine, "helper");
        b.declare(NameKind::External, "stem");
        b.define("stem", |b| b.literal("a"));
    });

    assert_eq!(
        messages(&diagnostics, DiagnosticKind::DeclaredButNotUsed),
        ["1: integer 'unused' declared but not used"]
    );
    assert_eq!(
        messages(&diagnostics, DiagnosticKind::DeclaredButNotDefined),
        ["2: routine 'helper' declared but not defined"]
    );
    assert!(!is_live(&result.program, "unused"));
    assert!(!is_live(&result.program, "helper"));
}

#[test]
fn defined_routine_without_callers_is_dropped() {
    let (result, diagnostics) = analyzed(|b| {
        b.declare(NameKind::Routine, "spare");
        b.declare(NameKind::External, "stem");
        b.at(3);
        b.define("spare", |b| b.literal("x"));
        b.at(4);
        b.define("stem", |b| b.literal("a"));
    });

    assert_eq!(
        messages(&diagnostics, DiagnosticKind::DefinedButNotUsed),
        ["3: routine 'spare' defined but not used"]
    );
    assert_eq!(result.program.routines.len(), 1);
}

#[test]
fn routine_called_only_from_dead_code_is_unreachable() {
    let build = |b: &mut ProgramBuilder| {
        b.declare(NameKind::Routine, "spare");
        b.declare(NameKind::Routine, "helper");
        b.declare(NameKind::External, "stem");
        b.define("helper", |b| b.literal("h"));
        b.define("spare", |b| b.name("helper"));
        b.define("stem", |b| b.literal("a"));
    };

    let (result, diagnostics) = analyzed(build);
    insta::assert_snapshot!(diagnostics.render_plain(), @r"
    1: warning: routine 'spare' defined but not used
    1: warning: routine 'helper' not reachable from any externals
    ");
    assert!(!is_live(&result.program, "helper"));

    let unit = compiled(build);
    assert!(!unit.source.contains("r_helper"));
    assert!(!unit.source.contains("r_spare"));
}

#[test]
fn variable_read_but_never_set() {
    let (_, diagnostics) = analyzed(|b| {
        b.declare(NameKind::Integer, "p");
        b.declare(NameKind::External, "stem");
        b.define("stem", |b| {
            let p = b.var("p");
            let zero = b.number(0);
            b.compare(NodeKind::Gt, p, zero)
        });
    });

    assert_eq!(
        messages(&diagnostics, DiagnosticKind::NeverInitialised),
        ["1: integer 'p' is never initialised"]
    );
}

#[test]
fn stores_to_unread_variables_are_removed() {
    let build = |b: &mut ProgramBuilder| {
        b.declare(NameKind::Boolean, "found");
        b.declare(NameKind::External, "stem");
        b.define("stem", |b| {
            let set = b.set("found");
            let a = b.literal("a");
            b.seq(vec![set, a])
        });
    };

    let (result, diagnostics) = analyzed(build);
    assert_eq!(
        messages(&diagnostics, DiagnosticKind::SetButNeverUsed),
        ["1: boolean 'found' is set but never used"]
    );
    assert!(!is_live(&result.program, "found"));

    let unit = compiled(build);
    assert!(!unit.source.contains("found"));
}

#[test]
fn dead_store_can_kill_the_store_feeding_it() {
    let (result, diagnostics) = analyzed(|b| {
        b.declare_all(NameKind::Integer, &["a", "b"]);
        b.declare(NameKind::External, "stem");
        b.define("stem", |b| {
            let mark = b.setmark("b");
            let copy = b.int_assign(NodeKind::MathAssign, "a", |b| b.var("b"));
            let next = b.next();
            b.seq(vec![mark, copy, next])
        });
    });

    assert_eq!(
        messages(&diagnostics, DiagnosticKind::SetButNeverUsed),
        [
            "1: integer 'a' is set but never used",
            "1: integer 'b' is set but never used",
        ]
    );
    assert!(!is_live(&result.program, "a"));
    assert!(!is_live(&result.program, "b"));
    assert_eq!(result.variable_count, 0);
}

#[test]
fn calling_an_undefined_routine_is_an_error() {
    let diagnostics = analysis_errors(|b| {
        b.declare(NameKind::Routine, "missing");
        b.declare(NameKind::External, "stem");
        b.at(5);
        b.define("stem", |b| b.name("missing"));
    });

    assert!(diagnostics.has_errors());
    insta::assert_snapshot!(
        diagnostics.render_plain(),
        @"5: error: routine 'missing' declared but not defined"
    );
}
