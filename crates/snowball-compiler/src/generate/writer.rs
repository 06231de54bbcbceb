//! Indented text output.

const INDENT: &str = "    ";

/// An output buffer that tracks indentation and labels.
#[derive(Debug, Default)]
pub(super) struct Writer {
    out: String,
    margin: usize,
    line_count: usize,
    /// `line_count` right after the most recent label.
    line_labelled: Option<usize>,
}

impl Writer {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn finish(self) -> String {
        self.out
    }

    pub(super) fn as_str(&self) -> &str {
        &self.out
    }

    pub(super) fn write(&mut self, s: &str) {
        self.out.push_str(s);
    }

    pub(super) fn margin(&mut self) {
        for _ in 0..self.margin {
            self.out.push_str(INDENT);
        }
    }

    /// Ends the line, dropping trailing whitespace.
    pub(super) fn newline(&mut self) {
        let trimmed = self.out.trim_end_matches([' ', '\t']).len();
        self.out.truncate(trimmed);
        self.out.push('\n');
        self.line_count += 1;
    }

    /// One indented line.
    pub(super) fn line(&mut self, s: impl AsRef<str>) {
        self.margin();
        self.write(s.as_ref());
        self.newline();
    }

    /// An indented line opening a nested level, such as `while (1) {`.
    pub(super) fn open(&mut self, s: impl AsRef<str>) {
        self.line(s);
        self.indent();
    }

    pub(super) fn indent(&mut self) {
        self.margin += 1;
    }

    pub(super) fn dedent(&mut self) {
        self.margin = self.margin.saturating_sub(1);
    }

    pub(super) fn block_start(&mut self) {
        self.open("{");
    }

    pub(super) fn block_end(&mut self) {
        // A label must be followed by a statement.
        if self.line_labelled == Some(self.line_count) {
            self.line(";");
        }
        self.dedent();
        self.line("}");
    }

    /// `labN:`, outdented one level.
    pub(super) fn label(&mut self, label: u32) {
        self.dedent();
        self.line(format!("lab{label}:"));
        self.line_labelled = Some(self.line_count);
        self.indent();
    }

    /// Reopens the last line, for `} while (0);`.
    pub(super) fn pop_newline(&mut self) {
        if self.out.ends_with('\n') {
            self.out.pop();
        }
    }
}
