use snowball_core::{AmongItem, NameKind, NodeId, NodeKind, Program, ProgramBuilder, StringArg};

use super::fold::fold_program;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::test_utils::{build, compiled};

/// Folds a one-command routine and returns the command.
fn folded(f: impl FnOnce(&mut ProgramBuilder) -> NodeId) -> (Program, NodeId, Diagnostics) {
    let mut program = build(|b| {
        b.declare_all(NameKind::Integer, &["x", "y"]);
        b.declare(NameKind::External, "stem");
        b.define("stem", f);
    });
    let mut diagnostics = Diagnostics::new();
    fold_program(&mut program, &mut diagnostics);
    let define = program.routines[0];
    let body = program.node(define).left.expect("routine body");
    (program, body, diagnostics)
}

/// The folded value assigned by a `$x = ...` body.
fn assigned(program: &Program, body: NodeId) -> NodeId {
    program.node(body).ae.expect("assigned value")
}

#[test]
fn constant_arithmetic_is_evaluated() {
    let (program, body, diagnostics) = folded(|b| {
        b.int_assign(NodeKind::MathAssign, "x", |b| {
            let two = b.number(2);
            let three = b.number(3);
            let product = b.arith(NodeKind::Multiply, two, three);
            let one = b.number(1);
            b.arith(NodeKind::Plus, product, one)
        })
    });

    let value = program.node(assigned(&program, body));
    assert_eq!(value.kind, NodeKind::Number);
    assert_eq!(value.number, 7);
    assert!(value.fixed_constant);
    assert!(diagnostics.is_empty());
}

#[test]
fn identities_drop_the_constant() {
    let (program, body, _) = folded(|b| {
        b.int_assign(NodeKind::MathAssign, "x", |b| {
            let y = b.var("y");
            let one = b.number(1);
            b.arith(NodeKind::Multiply, y, one)
        })
    });
    assert_eq!(program.node(assigned(&program, body)).kind, NodeKind::Variable);

    let (program, body, _) = folded(|b| {
        b.int_assign(NodeKind::MathAssign, "x", |b| {
            let zero = b.number(0);
            let y = b.var("y");
            b.arith(NodeKind::Plus, zero, y)
        })
    });
    assert_eq!(program.node(assigned(&program, body)).kind, NodeKind::Variable);
}

#[test]
fn zero_minus_becomes_negation() {
    let (program, body, _) = folded(|b| {
        b.int_assign(NodeKind::MathAssign, "x", |b| {
            let zero = b.number(0);
            let y = b.var("y");
            b.arith(NodeKind::Minus, zero, y)
        })
    });

    let value = program.node(assigned(&program, body));
    assert_eq!(value.kind, NodeKind::Neg);
    let operand = value.left.expect("negated operand");
    assert_eq!(program.node(operand).kind, NodeKind::Variable);
}

#[test]
fn double_negation_cancels() {
    let (program, body, _) = folded(|b| {
        b.int_assign(NodeKind::MathAssign, "x", |b| {
            let y = b.var("y");
            let inner = b.neg(y);
            b.neg(inner)
        })
    });

    assert_eq!(program.node(assigned(&program, body)).kind, NodeKind::Variable);
}

#[test]
fn division_by_constant_zero_is_an_error() {
    let (_, _, diagnostics) = folded(|b| {
        b.int_assign(NodeKind::MathAssign, "x", |b| {
            let y = b.var("y");
            let zero = b.number(0);
            b.arith(NodeKind::Divide, y, zero)
        })
    });

    assert!(diagnostics.has_errors());
    insta::assert_snapshot!(diagnostics.render_plain(), @"1: error: division by zero");
}

#[test]
fn lenof_literal_is_a_constant() {
    let (program, body, _) = folded(|b| {
        b.int_assign(NodeKind::MathAssign, "x", |b| b.lenof(StringArg::Literal("abc")))
    });

    let value = program.node(assigned(&program, body));
    assert_eq!(value.kind, NodeKind::Number);
    assert_eq!(value.number, 3);
}

#[test]
fn assignments_that_change_nothing_become_true() {
    let (program, body, _) = folded(|b| {
        b.int_assign(NodeKind::PlusAssign, "x", |b| b.number(0))
    });
    assert_eq!(program.node(body).kind, NodeKind::True);

    let (program, body, _) = folded(|b| {
        b.int_assign(NodeKind::MultiplyAssign, "x", |b| b.number(1))
    });
    assert_eq!(program.node(body).kind, NodeKind::True);
}

#[test]
fn adding_a_negative_subtracts() {
    let (program, body, _) = folded(|b| {
        b.int_assign(NodeKind::PlusAssign, "x", |b| b.number(-3))
    });

    assert_eq!(program.node(body).kind, NodeKind::MinusAssign);
    assert_eq!(program.node(assigned(&program, body)).number, 3);
}

#[test]
fn adding_int_min_keeps_its_sign() {
    let (program, body, _) = folded(|b| {
        b.int_assign(NodeKind::PlusAssign, "x", |b| b.number(i32::MIN))
    });

    assert_eq!(program.node(body).kind, NodeKind::PlusAssign);
    assert_eq!(program.node(assigned(&program, body)).number, i32::MIN);
}

#[test]
fn multiplying_by_zero_assigns_zero() {
    let (program, body, _) = folded(|b| {
        b.int_assign(NodeKind::MultiplyAssign, "x", |b| b.number(0))
    });

    assert_eq!(program.node(body).kind, NodeKind::MathAssign);
    let x = program.lookup("x").expect("x");
    assert!(program.name(x).initialised);
}

#[test]
fn comparison_of_constants_is_decided() {
    let (program, body, _) = folded(|b| {
        let one = b.number(1);
        let two = b.number(2);
        b.compare(NodeKind::Lt, one, two)
    });
    assert_eq!(program.node(body).kind, NodeKind::True);

    let (program, body, _) = folded(|b| {
        let one = b.number(1);
        let two = b.number(2);
        b.compare(NodeKind::Gt, one, two)
    });
    assert_eq!(program.node(body).kind, NodeKind::False);
}

#[test]
fn loop_counts() {
    let (program, body, diagnostics) = folded(|b| {
        let zero = b.number(0);
        let a = b.literal("a");
        b.loop_(zero, a)
    });
    assert_eq!(program.node(body).kind, NodeKind::True);
    insta::assert_snapshot!(diagnostics.render_plain(), @"1: warning: loop 0 C is a no-op");

    let (program, body, diagnostics) = folded(|b| {
        let one = b.number(1);
        let a = b.literal("a");
        b.loop_(one, a)
    });
    let node = program.node(body);
    assert_eq!(node.kind, NodeKind::Bra);
    assert!(node.ae.is_none());
    let inner = node.left.expect("loop body");
    assert_eq!(program.node(inner).kind, NodeKind::LiteralString);
    insta::assert_snapshot!(diagnostics.render_plain(), @"1: warning: loop 1 C is just C");
}

#[test]
fn atleast_zero_is_repeat() {
    let (program, body, diagnostics) = folded(|b| {
        let zero = b.number(0);
        let a = b.literal("a");
        b.atleast(zero, a)
    });

    let node = program.node(body);
    assert_eq!(node.kind, NodeKind::Repeat);
    assert!(node.ae.is_none());
    insta::assert_snapshot!(diagnostics.render_plain(), @"1: warning: atleast 0 C is just repeat C");
}

#[test]
fn constant_hops() {
    let (program, body, _) = folded(|b| {
        let one = b.number(1);
        b.hop(one)
    });
    assert_eq!(program.node(body).kind, NodeKind::Next);

    let (program, body, diagnostics) = folded(|b| {
        let zero = b.number(0);
        b.hop(zero)
    });
    assert_eq!(program.node(body).kind, NodeKind::True);
    assert_eq!(diagnostics.of_kind(DiagnosticKind::HopNoOp).count(), 1);

    let (program, body, diagnostics) = folded(|b| {
        let back = b.number(-2);
        b.hop(back)
    });
    assert_eq!(program.node(body).kind, NodeKind::False);
    assert_eq!(diagnostics.of_kind(DiagnosticKind::NegativeHop).count(), 1);
}

#[test]
fn measured_counts_fold_without_warning() {
    let (program, body, diagnostics) = folded(|b| {
        let size = b.sizeof(StringArg::Literal(""));
        let a = b.literal("a");
        b.loop_(size, a)
    });

    assert_eq!(program.node(body).kind, NodeKind::True);
    assert!(diagnostics.is_empty());
}

fn two_cases(b: &mut ProgramBuilder) -> NodeId {
    b.among(vec![AmongItem::case("a"), AmongItem::case("bc")])
}

/// Compiles a single external `stem` built by `f`.
fn stem_source(f: impl FnOnce(&mut ProgramBuilder) -> NodeId) -> String {
    compiled(|b| {
        b.declare(NameKind::External, "stem");
        b.define("stem", f);
    })
    .source
}

#[test]
fn loop_once_keeps_the_among_table() {
    let source = stem_source(|b| {
        let once = b.number(1);
        let among = two_cases(b);
        b.loop_(once, among)
    });

    assert!(source.contains("static const struct among a_0[2] = {"));
    assert!(source.contains("find_among(z, a_0, 2, 0)"));
}

#[test]
fn loop_once_around_a_substring() {
    let source = stem_source(|b| {
        let once = b.number(1);
        let sub = b.substring();
        let found = b.loop_(once, sub);
        let among = b.among(vec![
            AmongItem::case("a"),
            AmongItem::action(|b| vec![b.literal("x")]),
            AmongItem::case("bc"),
            AmongItem::action(|b| vec![b.literal("y")]),
        ]);
        b.seq(vec![found, among])
    });

    assert!(source.contains("among_var = find_among(z, a_0, 2, 0);"));
    assert!(source.contains("switch (among_var) {"));
}

#[test]
fn loop_once_around_a_command_list() {
    let unit = compiled(|b| {
        b.declare(NameKind::Routine, "helper");
        b.declare(NameKind::External, "stem");
        b.define("helper", |b| b.literal("h"));
        b.define("stem", |b| {
            let once = b.number(1);
            let a = b.literal("a");
            let call = b.name("helper");
            let list = b.seq(vec![a, call]);
            let among = two_cases(b);
            let body = b.seq(vec![list, among]);
            b.loop_(once, body)
        });
    });

    assert!(unit.source.contains("r_helper(z)"));
    assert!(unit.source.contains("find_among(z, a_0, 2, 0)"));
}

#[test]
fn loop_zero_drops_the_among() {
    let source = stem_source(|b| {
        let zero = b.number(0);
        let among = two_cases(b);
        let skipped = b.loop_(zero, among);
        let a = b.literal("a");
        b.seq(vec![skipped, a])
    });

    assert!(!source.contains("find_among"));
    assert!(!source.contains("struct among a_"));
}

#[test]
fn atleast_zero_repeats_an_among() {
    let source = stem_source(|b| {
        let zero = b.number(0);
        let among = two_cases(b);
        b.atleast(zero, among)
    });

    assert!(source.contains("while (1) {"));
    assert!(source.contains("find_among(z, a_0, 2, 0)"));
}

#[test]
fn constant_hops_before_an_among() {
    let source = stem_source(|b| {
        let one = b.number(1);
        let step = b.hop(one);
        let zero = b.number(0);
        let stay = b.hop(zero);
        let among = two_cases(b);
        b.seq(vec![step, stay, among])
    });

    assert!(source.contains("if (z->c >= z->l) return 0;"));
    assert!(source.contains("find_among(z, a_0, 2, 0)"));
}
