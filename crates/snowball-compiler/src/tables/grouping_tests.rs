use snowball_core::{GroupingOp, GroupingSource, NameKind, ProgramBuilder};

use super::grouping::build_groupings;
use crate::diagnostics::Diagnostics;

#[test]
fn vowels_bitmap() {
    let mut b = ProgramBuilder::default();
    b.declare(NameKind::Grouping, "v");
    b.define_grouping("v", &[(GroupingOp::Add, GroupingSource::Literal("aeiouy"))]);
    let program = b.finish().unwrap();
    let mut diagnostics = Diagnostics::new();

    let groupings = build_groupings(&program, &mut diagnostics);

    assert!(diagnostics.is_empty());
    assert_eq!(groupings.len(), 1);
    let v = &groupings[0];
    assert_eq!((v.min, v.max), (u16::from(b'a'), u16::from(b'y')));
    assert_eq!(v.bitmap(), vec![17, 65, 16, 1]);
    assert!(v.contains(u16::from(b'o')));
    assert!(!v.contains(u16::from(b'b')));
}

#[test]
fn terms_apply_left_to_right() {
    let mut b = ProgramBuilder::default();
    b.declare_all(NameKind::Grouping, &["v", "v_wxy"]);
    b.define_grouping("v", &[(GroupingOp::Add, GroupingSource::Literal("aeiouy"))]);
    b.define_grouping(
        "v_wxy",
        &[
            (GroupingOp::Add, GroupingSource::Name("v")),
            (GroupingOp::Add, GroupingSource::Literal("wxY")),
            (GroupingOp::Remove, GroupingSource::Literal("y")),
        ],
    );
    let program = b.finish().unwrap();
    let mut diagnostics = Diagnostics::new();

    let groupings = build_groupings(&program, &mut diagnostics);

    assert!(diagnostics.is_empty());
    let chars = String::from_utf16_lossy(&groupings[1].chars);
    assert_eq!(chars, "Yaeiouwx");
    assert_eq!(groupings[1].min, u16::from(b'Y'));
}

#[test]
fn duplicate_chars_collapse() {
    let mut b = ProgramBuilder::default();
    b.declare(NameKind::Grouping, "g");
    b.define_grouping(
        "g",
        &[
            (GroupingOp::Add, GroupingSource::Literal("bab")),
            (GroupingOp::Add, GroupingSource::Literal("a")),
        ],
    );
    let program = b.finish().unwrap();

    let groupings = build_groupings(&program, &mut Diagnostics::new());

    assert_eq!(groupings[0].chars, vec![u16::from(b'a'), u16::from(b'b')]);
    assert_eq!(groupings[0].bitmap(), vec![3]);
}

#[test]
fn self_reference_and_forward_reference_are_errors() {
    let mut b = ProgramBuilder::default();
    b.declare_all(NameKind::Grouping, &["a", "b"]);
    b.at(2).define_grouping(
        "a",
        &[
            (GroupingOp::Add, GroupingSource::Literal("x")),
            (GroupingOp::Add, GroupingSource::Name("a")),
            (GroupingOp::Add, GroupingSource::Name("b")),
        ],
    );
    b.at(3).define_grouping("b", &[(GroupingOp::Add, GroupingSource::Literal("y"))]);
    let program = b.finish().unwrap();
    let mut diagnostics = Diagnostics::new();

    build_groupings(&program, &mut diagnostics);

    insta::assert_snapshot!(diagnostics.render_plain(), @r"
    2: error: a defined in terms of itself
    2: error: b undefined
    ");
}

#[test]
fn empty_grouping_is_an_error() {
    let mut b = ProgramBuilder::default();
    b.declare(NameKind::Grouping, "g");
    b.at(4).define_grouping(
        "g",
        &[
            (GroupingOp::Add, GroupingSource::Literal("ab")),
            (GroupingOp::Remove, GroupingSource::Literal("ba")),
        ],
    );
    let program = b.finish().unwrap();
    let mut diagnostics = Diagnostics::new();

    let groupings = build_groupings(&program, &mut diagnostics);

    insta::assert_snapshot!(diagnostics.render_plain(), @"4: error: empty grouping");
    assert_eq!(groupings[0].bitmap(), vec![0]);
}
