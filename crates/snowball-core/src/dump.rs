//! Indented tree rendering of a program.

use std::fmt::Write;

use crate::encoding::Encoding;
use crate::node::{NodeId, NodeKind};
use crate::program::Program;

pub struct ProgramPrinter<'p> {
    program: &'p Program,
    signals: bool,
    lines: bool,
}

impl<'p> ProgramPrinter<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            signals: false,
            lines: false,
        }
    }

    /// Append each node's signal (`t`, `f` or `?`).
    pub fn with_signals(mut self, value: bool) -> Self {
        self.signals = value;
        self
    }

    pub fn with_lines(mut self, value: bool) -> Self {
        self.lines = value;
        self
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        for &define in &self.program.routines {
            self.format_node(w, define, 0, "")?;
        }
        Ok(())
    }

    fn format_node(&self, w: &mut impl Write, id: NodeId, depth: usize, prefix: &str) -> std::fmt::Result {
        let mut next = Some(id);
        while let Some(id) = next {
            let node = self.program.node(id);
            write!(w, "{:indent$}{prefix}{}", "", node.kind.token(), indent = depth * 2)?;
            if let Some(name) = node.name {
                write!(w, " {}", self.program.name(name).text)?;
            }
            if let Some(literal) = &node.literal {
                write!(w, " '{}'", render_literal(self.program.encoding, literal))?;
            } else if node.kind == NodeKind::Number {
                write!(w, " {}", node.number)?;
            }
            if self.signals {
                write!(w, " [{}]", node.signal.as_char())?;
            }
            if self.lines {
                write!(w, " @{}", node.line)?;
            }
            writeln!(w)?;

            if let Some(ae) = node.ae {
                self.format_node(w, ae, depth + 1, "# ")?;
            }
            if let Some(left) = node.left {
                self.format_node(w, left, depth + 1, "")?;
            }
            // An unbuilt among's `aux` points back at its substring.
            if let Some(aux) = node.aux.filter(|_| node.kind != NodeKind::Among) {
                self.format_node(w, aux, depth + 1, "@ ")?;
            }
            next = node.right;
        }
        Ok(())
    }
}

pub fn render_literal(encoding: Encoding, symbols: &[u16]) -> String {
    match encoding {
        Encoding::SingleByte => symbols
            .iter()
            .map(|&s| char::from_u32(u32::from(s)).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect(),
        Encoding::Utf8 => {
            let bytes: Vec<u8> = symbols.iter().map(|&s| s as u8).collect();
            String::from_utf8_lossy(&bytes).into_owned()
        }
        Encoding::WideChars => String::from_utf16_lossy(symbols),
    }
}

impl Program {
    pub fn printer(&self) -> ProgramPrinter<'_> {
        ProgramPrinter::new(self)
    }

    pub fn dump(&self) -> String {
        self.printer().dump()
    }
}
