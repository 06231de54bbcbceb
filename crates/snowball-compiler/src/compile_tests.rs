use snowball_core::{AmongItem, NameKind, StringArg};

use crate::diagnostics::DiagnosticKind;
use crate::shot_routine;
use crate::test_utils::{build, compiled};
use crate::{Config, Error, compile};

#[test]
fn longest_match_among_with_fallbacks() {
    let unit = compiled(|b| {
        b.declare(NameKind::External, "stem");
        b.define("stem", |b| {
            let bra = b.left_slice();
            let sub = b.substring();
            let among = b.among(vec![
                AmongItem::case("a"),
                AmongItem::action(|b| vec![b.right_slice(), b.slice_from(StringArg::Literal("1"))]),
                AmongItem::case("ab"),
                AmongItem::action(|b| vec![b.right_slice(), b.slice_from(StringArg::Literal("2"))]),
                AmongItem::case("abc"),
                AmongItem::action(|b| vec![b.right_slice(), b.slice_from(StringArg::Literal("3"))]),
            ]);
            b.seq(vec![bra, sub, among])
        });
    });

    shot_routine!(unit, "stem", @r"
    extern int stem(struct SN_env * z) {
        int among_var;
        z->bra = z->c;
        if (z->c >= z->l || z->p[z->c + 0] != 97) return 0;
        among_var = find_among(z, a_0, 3, 0);
        if (!among_var) return 0;
        switch (among_var) {
            case 1:
                z->ket = z->c;
                {
                    int ret = slice_from_s(z, 1, s_0);
                    if (ret < 0) return ret;
                }
                break;
            case 2:
                z->ket = z->c;
                {
                    int ret = slice_from_s(z, 1, s_1);
                    if (ret < 0) return ret;
                }
                break;
            case 3:
                z->ket = z->c;
                {
                    int ret = slice_from_s(z, 1, s_2);
                    if (ret < 0) return ret;
                }
                break;
        }
        return 1;
    }
    ");
    // "ab" falls back to "a", "abc" to "ab".
    assert!(unit.source.contains(
        "static const struct among a_0[3] = {\n{ 1, s_3, 0, 1, 0},\n{ 2, s_4, -1, 2, 0},\n{ 3, s_5, -1, 3, 0}\n};\n"
    ));
}

#[test]
fn single_case_among_becomes_a_literal() {
    let unit = compiled(|b| {
        b.declare(NameKind::External, "stem");
        b.define("stem", |b| b.among(vec![AmongItem::case("ing")]));
    });

    shot_routine!(unit, "stem", @r"
    extern int stem(struct SN_env * z) {
        return eq_s(z, 3, s_0);
    }
    ");
    assert!(!unit.source.contains("struct among"));
    assert!(!unit.source.contains("find_among"));
}

#[test]
fn single_case_among_with_substring_and_action() {
    let unit = compiled(|b| {
        b.declare(NameKind::External, "stem");
        b.define("stem", |b| {
            let bra = b.left_slice();
            let sub = b.substring();
            let among = b.among(vec![
                AmongItem::case("ing"),
                AmongItem::action(|b| vec![b.right_slice(), b.delete()]),
            ]);
            b.seq(vec![bra, sub, among])
        });
    });

    shot_routine!(unit, "stem", @r"
    extern int stem(struct SN_env * z) {
        z->bra = z->c;
        if (!(eq_s(z, 3, s_0))) return 0;
        z->ket = z->c;
        {
            int ret = slice_del(z);
            if (ret < 0) return ret;
        }
        return 1;
    }
    ");
    assert!(!unit.source.contains("struct among"));
}

#[test]
fn failing_step_cuts_the_rest_of_an_and() {
    let unit = compiled(|b| {
        b.declare(NameKind::External, "stem");
        b.define("stem", |b| {
            let a = b.literal("a");
            let c = b.literal("b");
            let never = b.false_();
            let unreachable = b.literal("c");
            b.and(vec![a, c, never, unreachable])
        });
    });

    let cut: Vec<_> = unit
        .diagnostics
        .of_kind(DiagnosticKind::UnreachableAfterFailure)
        .collect();
    assert_eq!(cut.len(), 1);
    insta::assert_snapshot!(
        cut[0].message(),
        @"command always signals f here so rest of 'and' is unreachable"
    );
    shot_routine!(unit, "stem", @r"
    extern int stem(struct SN_env * z) {
        {
            int v_1 = z->c;
            if (z->c == z->l || z->p[z->c] != 'a') return 0;
            z->c++;
            z->c = v_1;
            if (z->c == z->l || z->p[z->c] != 'b') return 0;
            z->c++;
            z->c = v_1;
            return 0;
        }
    }
    ");
}

#[test]
fn variable_set_before_use_in_one_routine_is_local() {
    let unit = compiled(|b| {
        b.declare(NameKind::Integer, "p");
        b.declare(NameKind::Routine, "mark_regions");
        b.declare(NameKind::External, "stem");
        b.define("mark_regions", |b| {
            let set = b.setmark("p");
            let next = b.next();
            let at = b.var("p");
            let back = b.tomark(at);
            b.seq(vec![set, next, back])
        });
        b.define("stem", |b| b.name("mark_regions"));
    });

    let routine = crate::test_utils::routine(&unit.source, "r_mark_regions");
    assert!(routine.contains("\n    int i_p;\n"));
    assert!(!unit.source.contains("struct SN_local"));
}

#[test]
fn variable_used_from_two_routines_is_shared() {
    let unit = compiled(|b| {
        b.declare(NameKind::Integer, "p");
        b.declare(NameKind::Routine, "back_to_p");
        b.declare(NameKind::External, "stem");
        b.define("back_to_p", |b| {
            let at = b.var("p");
            b.tomark(at)
        });
        b.define("stem", |b| {
            let set = b.setmark("p");
            let next = b.next();
            let call = b.name("back_to_p");
            b.seq(vec![set, next, call])
        });
    });

    assert!(unit.source.contains("struct SN_local {\n    struct SN_env z;\n    int i_p;\n};\n"));
    assert!(unit.source.contains("((SN_local *)z)->i_p = z->c;"));
    assert!(unit.source.contains("((SN_local *)z)->i_p = 0;"));
}

#[test]
fn analysis_errors_stop_before_generation() {
    let program = build(|b| {
        b.declare(NameKind::Routine, "missing");
        b.declare(NameKind::External, "stem");
        b.define("stem", |b| b.name("missing"));
    });

    let err = compile(program, &Config::new("test")).unwrap_err();
    let Error::Analyze(diagnostics) = &err else {
        panic!("expected an analysis error, got {err:?}");
    };
    assert!(diagnostics.of_kind(DiagnosticKind::UsedButNotDefined).next().is_some());
}
