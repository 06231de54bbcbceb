//! Source-level descriptions of commands for comments mode.

use std::fmt::Write;

use snowball_core::{NodeId, NodeKind, Program};

/// `<command>, line N`, safe to place inside a C comment.
pub(super) fn describe(program: &Program, id: NodeId) -> String {
    let node = program.node(id);
    let name = node.name.map(|n| program.name(n).text.as_str());
    let mut out = String::new();

    match node.kind {
        kind if kind.is_integer_assign() => {
            out.push('$');
            out.push_str(name.unwrap_or_default());
            let _ = write!(out, " {} ", kind.token());
            expression(program, node.ae, &mut out);
        }
        kind if kind.is_relational() => {
            out.push_str("$(");
            expression(program, node.left, &mut out);
            let _ = write!(out, " {} ", kind.token());
            expression(program, node.ae, &mut out);
            out.push(')');
        }
        NodeKind::Define => {
            let mode = if node.mode.is_forward() { "forwardmode" } else { "backwardmode" };
            let _ = write!(out, "{mode} define {}", name.unwrap_or_default());
        }
        NodeKind::Call | NodeKind::Grouping | NodeKind::NamedString => {
            out.push_str(name.unwrap_or_default());
        }
        NodeKind::LiteralString => {
            literal(node.literal.as_deref().unwrap_or_default(), &mut out);
        }
        kind => {
            out.push_str(kind.token());
            if let Some(name) = name {
                out.push(' ');
                out.push_str(name);
            } else if let Some(text) = &node.literal {
                out.push(' ');
                literal(text, &mut out);
            }
        }
    }

    let _ = write!(out, ", line {}", node.line);
    out
}

/// A literal as written in Snowball source, with `{...}` escapes.
fn literal(text: &[u16], out: &mut String) {
    let mut quoted = String::from("'");
    for &ch in text {
        match ch {
            0x27 => quoted.push_str("{'}"),
            0x7b => quoted.push_str("{{}"),
            0..32 | 127 => {
                let _ = write!(quoted, "{{U+{ch:X}}}");
            }
            _ => quoted.push(char::from_u32(u32::from(ch)).unwrap_or(char::REPLACEMENT_CHARACTER)),
        }
    }
    quoted.push('\'');
    if quoted.contains("*/") {
        out.push_str("<literal string>");
    } else {
        out.push_str(&quoted);
    }
}

fn expression(program: &Program, id: Option<NodeId>, out: &mut String) {
    let Some(id) = id else {
        return;
    };
    let node = program.node(id);
    let name = node.name.map_or("", |n| program.name(n).text.as_str());
    match node.kind {
        NodeKind::Number => {
            let _ = write!(out, "{}", node.number);
        }
        NodeKind::Variable => out.push_str(name),
        NodeKind::LenOf | NodeKind::SizeOf if !name.is_empty() => {
            let _ = write!(out, "{} {name}", node.kind.token());
        }
        NodeKind::Neg => {
            out.push('-');
            expression(program, node.left, out);
        }
        NodeKind::Plus | NodeKind::Minus | NodeKind::Multiply | NodeKind::Divide => {
            out.push('(');
            expression(program, node.left, out);
            let _ = write!(out, " {} ", node.kind.token());
            expression(program, node.right, out);
            out.push(')');
        }
        kind => out.push_str(kind.token()),
    }
}
