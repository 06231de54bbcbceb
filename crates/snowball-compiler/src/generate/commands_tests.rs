use snowball_core::{
    AmongItem, Encoding, GroupingOp, GroupingSource, NameKind, NodeId, ProgramBuilder, StringArg,
};

use crate::shot_routine;
use crate::test_utils::{compiled, compiled_with};
use crate::{Config, Target};

fn vowels(b: &mut ProgramBuilder) {
    b.declare(NameKind::Grouping, "v");
    b.define_grouping("v", &[(GroupingOp::Add, GroupingSource::Literal("aeiou"))]);
}

#[test]
fn try_restores_the_cursor_on_failure() {
    let unit = compiled(|b| {
        b.declare(NameKind::External, "stem");
        b.define("stem", |b| {
            let ab = b.literal("ab");
            let attempt = b.try_(ab);
            let c = b.literal("c");
            b.seq(vec![attempt, c])
        });
    });

    shot_routine!(unit, "stem", @r"
    extern int stem(struct SN_env * z) {
        {
            int v_1 = z->c;
            if (!(eq_s(z, 2, s_0))) { z->c = v_1; goto lab0; }
        lab0:
            ;
        }
        if (z->c == z->l || z->p[z->c] != 'c') return 0;
        z->c++;
        return 1;
    }
    ");
}

#[test]
fn or_tries_branches_in_turn() {
    let unit = compiled(|b| {
        b.declare(NameKind::External, "stem");
        b.define("stem", |b| {
            let ab = b.literal("ab");
            let cd = b.literal("cd");
            b.or(vec![ab, cd])
        });
    });

    shot_routine!(unit, "stem", @r"
    extern int stem(struct SN_env * z) {
        do {
            int v_1 = z->c;
            if (!(eq_s(z, 2, s_0))) goto lab0;
            break;
        lab0:
            z->c = v_1;
            if (!(eq_s(z, 2, s_1))) return 0;
        } while (0);
        return 1;
    }
    ");
}

#[test]
fn not_fails_when_its_operand_succeeds() {
    let unit = compiled(|b| {
        b.declare(NameKind::External, "stem");
        b.define("stem", |b| {
            let ab = b.literal("ab");
            let not = b.not(ab);
            let next = b.next();
            b.seq(vec![not, next])
        });
    });

    shot_routine!(unit, "stem", @r"
    extern int stem(struct SN_env * z) {
        {
            int v_1 = z->c;
            if (!(eq_s(z, 2, s_0))) goto lab0;
            return 0;
        lab0:
            z->c = v_1;
        }
        if (z->c >= z->l) return 0;
        z->c++;
        return 1;
    }
    ");
}

#[test]
fn repeat_without_restore_for_a_single_step() {
    let unit = compiled(|b| {
        b.declare(NameKind::External, "stem");
        b.define("stem", |b| {
            let a = b.literal("a");
            b.repeat(a)
        });
    });

    shot_routine!(unit, "stem", @r"
    extern int stem(struct SN_env * z) {
        while (1) {
            if (z->c == z->l || z->p[z->c] != 'a') goto lab0;
            z->c++;
            continue;
        lab0:
            break;
        }
        return 1;
    }
    ");
}

#[test]
fn gopast_grouping_uses_the_scan_helper() {
    let unit = compiled(|b| {
        vowels(b);
        b.declare(NameKind::External, "stem");
        b.define("stem", |b| {
            let v = b.name("v");
            b.gopast(v)
        });
    });

    shot_routine!(unit, "stem", @r"
    extern int stem(struct SN_env * z) {
        {
            int ret = out_grouping(z, g_v, 97, 117, 1);
            if (ret < 0) return 0;
            z->c += ret;
        }
        return 1;
    }
    ");
}

/// `try ('a' <- 'x')`
fn try_edit(b: &mut ProgramBuilder) -> NodeId {
    let a = b.literal("a");
    let edit = b.slice_from(StringArg::Literal("x"));
    let body = b.seq(vec![a, edit]);
    b.try_(body)
}

/// `('a' <- 'x') or 'b'`
fn or_edit(b: &mut ProgramBuilder) -> NodeId {
    let a = b.literal("a");
    let edit = b.slice_from(StringArg::Literal("x"));
    let first = b.seq(vec![a, edit]);
    let second = b.literal("b");
    b.or(vec![first, second])
}

/// The body of `stem` in a C++ unit.
fn cpp_stem(source: &str) -> &str {
    let start = source
        .find("int Snowball::Test::stem(struct SN_env * z) {")
        .expect("stem definition");
    let len = source[start..].find("\n}\n").expect("end of stem");
    &source[start..start + len]
}

#[test]
fn edit_errors_inside_try_return_directly() {
    let unit = compiled(|b| {
        b.declare(NameKind::External, "stem");
        b.define("stem", try_edit);
    });

    shot_routine!(unit, "stem", @r"
    extern int stem(struct SN_env * z) {
        {
            int v_1 = z->c;
            if (z->c == z->l || z->p[z->c] != 'a') { z->c = v_1; goto lab0; }
            z->c++;
            {
                int ret = slice_from_s(z, 1, s_0);
                if (ret < 0) return ret;
            }
        lab0:
            ;
        }
        return 1;
    }
    ");
}

#[test]
fn edit_errors_inside_or_return_directly() {
    let unit = compiled(|b| {
        b.declare(NameKind::External, "stem");
        b.define("stem", or_edit);
    });

    shot_routine!(unit, "stem", @r"
    extern int stem(struct SN_env * z) {
        do {
            int v_1 = z->c;
            if (z->c == z->l || z->p[z->c] != 'a') goto lab0;
            z->c++;
            {
                int ret = slice_from_s(z, 1, s_0);
                if (ret < 0) return ret;
            }
            break;
        lab0:
            z->c = v_1;
            if (z->c == z->l || z->p[z->c] != 'b') return 0;
            z->c++;
        } while (0);
        return 1;
    }
    ");
}

#[test]
fn cpp_edits_inside_try_and_or_leave_errors_to_the_runtime() {
    let config = Config::new("test").target(Target::Cpp);
    for build in [try_edit, or_edit] {
        let unit = compiled_with(&config, |b| {
            b.declare(NameKind::External, "stem");
            b.define("stem", build);
        });

        let stem = cpp_stem(&unit.source);
        assert!(stem.contains("\n        slice_from_s(z, 1, s_0);\n"));
        assert!(!stem.contains("int ret"));
        assert!(stem.contains("goto lab0;"));
    }
}

#[test]
fn setlimit_tomark_needs_no_cursor_save() {
    let unit = compiled(|b| {
        b.declare(NameKind::External, "stem");
        b.define("stem", |b| {
            let two = b.number(2);
            let mark = b.tomark(two);
            let a = b.literal("a");
            b.setlimit(mark, a)
        });
    });

    shot_routine!(unit, "stem", @r"
    extern int stem(struct SN_env * z) {
        {
            int v_1;
            if (z->c > 2) return 0;
            v_1 = z->l - 2; z->l = 2;
            if (z->c == z->l || z->p[z->c] != 'a') { z->l += v_1; return 0; }
            z->c++;
            z->l += v_1;
        }
        return 1;
    }
    ");
}

#[test]
fn backward_among_with_one_action() {
    let unit = compiled(|b| {
        b.declare(NameKind::External, "stem");
        b.backward_mode(|b| {
            b.define("stem", |b| {
                let ket = b.left_slice();
                let sub = b.substring();
                let among = b.among(vec![
                    AmongItem::case("ing"),
                    AmongItem::case("ed"),
                    AmongItem::action(|b| vec![b.right_slice(), b.delete()]),
                ]);
                b.seq(vec![ket, sub, among])
            });
        });
    });

    shot_routine!(unit, "stem", @r"
    extern int stem(struct SN_env * z) {
        z->ket = z->c;
        if (z->c - 1 <= z->lb || (z->p[z->c - 1] != 100 && z->p[z->c - 1] != 103)) return 0;
        if (!find_among_b(z, a_0, 2, 0)) return 0;
        z->bra = z->c;
        {
            int ret = slice_del(z);
            if (ret < 0) return ret;
        }
        return 1;
    }
    ");
    assert!(unit.source.contains(
        "static const struct among a_0[2] = {\n{ 2, s_0, 0, 1, 0},\n{ 3, s_1, 0, 1, 0}\n};\n"
    ));
    assert!(unit.source.contains("static const symbol s_0[] = { 'e', 'd' };\n"));
}

#[test]
fn utf8_next_skips_a_whole_character() {
    let config = Config::new("test").encoding(Encoding::Utf8);
    let unit = compiled_with(&config, |b| {
        b.declare(NameKind::External, "stem");
        b.define("stem", |b| b.next());
    });

    shot_routine!(unit, "stem", @r"
    extern int stem(struct SN_env * z) {
        {
            int ret = skip_utf8(z->p, z->c, z->l, 1);
            if (ret < 0) return 0;
            z->c = ret;
        }
        return 1;
    }
    ");
}

#[test]
fn comments_mode_names_each_command() {
    let config = Config::new("test").comments(true);
    let unit = compiled_with(&config, |b| {
        b.declare(NameKind::External, "stem");
        b.at(4);
        b.define("stem", |b| b.literal("ab"));
    });

    assert!(unit.source.contains("/* forwardmode define stem, line 4 */\nextern int stem"));
    shot_routine!(unit, "stem", @r"
    extern int stem(struct SN_env * z) {
        /* 'ab', line 4 */
        return eq_s(z, 2, s_0);
    }
    ");
}
