//! Among dispatch and the tables behind it.

use snowball_core::NodeId;

use super::Result;
use super::comment;
use super::emitter::{Emitter, direction_suffix};
use crate::tables::{Among, PreCheckTest};

impl Emitter<'_> {
    /// Matches one of the among's cases at the cursor, setting `among_var`
    /// when an action has to be selected afterwards.
    pub(super) fn substring(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id);
        self.comment(id);
        let (among_id, among) = self.among_of(id)?;
        let forward = node.mode.is_forward();
        let s0 = direction_suffix(node.mode);
        let call = format!(
            "find_among{s0}(z, a_{}, {}, {})",
            among.number,
            among.cases.len(),
            self.among_function(among)
        );

        let precheck = among.precheck();
        if let Some(precheck) = &precheck {
            let k = precheck.offset;
            let (mut condition, probe) = match (forward, k) {
                (true, 0) => ("z->c >= z->l".to_owned(), "z->p[z->c + 0]".to_owned()),
                (true, k) => (format!("z->c + {k} >= z->l"), format!("z->p[z->c + {k}]")),
                (false, 0) => ("z->c <= z->lb".to_owned(), "z->p[z->c - 1]".to_owned()),
                (false, k) => (format!("z->c - {k} <= z->lb"), "z->p[z->c - 1]".to_owned()),
            };
            match precheck.test {
                // among('')
                PreCheckTest::LengthOnly => {}
                PreCheckTest::One(a) => condition.push_str(&format!(" || {probe} != {a}")),
                PreCheckTest::Two(a, b) => {
                    condition.push_str(&format!(" || ({probe} != {a} && {probe} != {b})"));
                }
                PreCheckTest::Block { block, bitmap } => condition.push_str(&format!(
                    " || {probe} >> 5 != {block} || !(({bitmap} >> ({probe} & 0x1f)) & 1)"
                )),
            }
            match precheck.empty_case {
                // With the empty string among the cases a rejected probe
                // matches it instead of failing.
                Some(empty) => {
                    let result = among.cases[empty].result();
                    self.out.line(format!("if ({condition}) among_var = {result}; else"));
                }
                None => {
                    let f = self.fail();
                    self.out.line(format!("if ({condition}) {f}"));
                }
            }
        }

        if among.amongvar_needed {
            self.out.line(format!("among_var = {call};"));
            if !among.always_matches {
                let f = self.fail();
                self.out.line(format!("if (!among_var) {f}"));
            }
            return Ok(());
        }

        if precheck.is_some()
            && among.function_count() == 0
            && among.longest == 1
            && !among.always_matches
        {
            // Every case is one symbol the probe already checked.
            let step = if forward { "z->c++;" } else { "z->c--;" };
            self.out.line(step);
            self.inlined.insert(among_id);
            return Ok(());
        }

        if among.always_matches {
            self.out.line(format!("{call};"));
        } else if among.actions.is_empty() && self.tailcallable(id) {
            self.out.line(format!("return {call} != 0;"));
            self.mark_returned(among.node);
        } else {
            let f = self.fail();
            self.out.line(format!("if (!{call}) {f}"));
        }
        Ok(())
    }

    pub(super) fn among(&mut self, id: NodeId) -> Result<()> {
        let (_, among) = self.among_of(id)?;
        if among.substring.is_none() {
            self.substring(id)?;
            if self.has_returned(id) {
                return Ok(());
            }
        } else {
            self.comment(id);
        }

        match among.actions.as_slice() {
            [] => {}
            [only] if among.no_action_count == 0 => self.generate(*only)?,
            actions => {
                self.out.open("switch (among_var) {");
                for (i, &action) in actions.iter().enumerate() {
                    self.out.open(format!("case {}:", i + 1));
                    self.generate(action)?;
                    self.out.line("break;");
                    self.out.dedent();
                }
                self.out.block_end();
            }
        }
        Ok(())
    }

    /// Last argument of `find_among`: the gate to call for a gated case.
    fn among_function(&self, among: &Among) -> String {
        match among.gates.as_slice() {
            [] => "0".to_owned(),
            [gate] => self.varref(*gate),
            _ => format!("af_{}", among.number),
        }
    }

    /// `a_N`, its case strings and the gate dispatcher `af_N`.
    pub(super) fn among_table(&mut self, among: &Among) {
        let comments = self.config.comments;
        // Rows first: interning writes the case strings to the declarations.
        let rows: Vec<String> = among
            .cases
            .iter()
            .enumerate()
            .map(|(i, case)| {
                let prefix = if comments { format!("/*{i:>3} */ ") } else { String::new() };
                let symbols = self.literal_ref(&case.text);
                format!(
                    "{prefix}{{ {}, {symbols}, {}, {}, {}}}",
                    case.text.len(),
                    case.fallback_offset(i),
                    case.result(),
                    case.function_index
                )
            })
            .collect();

        self.declarations.newline();
        if comments {
            let text = comment::describe(self.program, among.node);
            self.declarations.line(format!("/* {text} */"));
        }
        self.declarations.write(&format!(
            "static const struct among a_{}[{}] = {{",
            among.number,
            among.cases.len()
        ));
        self.declarations.newline();
        self.declarations.write(&rows.join(",\n"));
        self.declarations.newline();
        self.declarations.line("};");

        if among.function_count() <= 1 {
            return;
        }
        self.declarations.newline();
        self.declarations
            .open(format!("static int af_{}(struct SN_env * z) {{", among.number));
        self.declarations.open("switch (z->af) {");
        for (n, &gate) in among.gates.iter().enumerate() {
            let routine = self.varref(gate);
            self.declarations.line(format!("case {}: return {routine}(z);", n + 1));
        }
        self.declarations.dedent();
        self.declarations.line("}");
        self.declarations.line("return -1;");
        self.declarations.dedent();
        self.declarations.line("}");
    }
}
