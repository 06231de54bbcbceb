use indoc::indoc;

use super::writer::Writer;

#[test]
fn lines_follow_the_margin() {
    let mut w = Writer::new();
    w.open("while (1) {");
    w.line("z->c++;");
    w.block_end();

    assert_eq!(
        w.finish(),
        indoc! {"
            while (1) {
                z->c++;
            }
        "}
    );
}

#[test]
fn newline_drops_trailing_blanks() {
    let mut w = Writer::new();
    w.write("int x; \t ");
    w.newline();
    w.newline();

    assert_eq!(w.as_str(), "int x;\n\n");
}

#[test]
fn label_sits_one_level_out() {
    let mut w = Writer::new();
    w.block_start();
    w.line("if (z->c >= z->l) goto lab0;");
    w.label(0);
    w.line("z->c = v_1;");
    w.block_end();

    assert_eq!(
        w.finish(),
        indoc! {"
            {
                if (z->c >= z->l) goto lab0;
            lab0:
                z->c = v_1;
            }
        "}
    );
}

#[test]
fn label_before_closing_brace_gets_empty_statement() {
    let mut w = Writer::new();
    w.block_start();
    w.line("goto lab3;");
    w.label(3);
    w.block_end();

    assert_eq!(
        w.finish(),
        indoc! {"
            {
                goto lab3;
            lab3:
                ;
            }
        "}
    );
}

#[test]
fn pop_newline_reopens_the_last_line() {
    let mut w = Writer::new();
    w.open("do {");
    w.line("break;");
    w.block_end();
    w.pop_newline();
    w.write(" while (0);");
    w.newline();

    assert_eq!(
        w.finish(),
        indoc! {"
            do {
                break;
            } while (0);
        "}
    );
}

#[test]
fn dedent_stops_at_zero() {
    let mut w = Writer::new();
    w.dedent();
    w.line("x;");

    assert_eq!(w.as_str(), "x;\n");
}
