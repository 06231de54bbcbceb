//! One emission method per command.

use snowball_core::{NodeId, NodeKind, Signal};

use super::cost::{k_needed, repeat_restore};
use super::emitter::{Emitter, direction_suffix};
use super::{GenerateError, Result};

impl Emitter<'_> {
    /// Generates one command. The failure continuation in force before the
    /// call is back in force afterwards.
    pub(super) fn generate(&mut self, id: NodeId) -> Result<()> {
        let saved = self.routine.failure.clone();
        let result = self.dispatch(id);
        self.routine.failure = saved;
        result
    }

    fn dispatch(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id);
        match node.kind {
            NodeKind::Bra => self.bra(id),
            NodeKind::And => self.and(id),
            NodeKind::Or => self.or(id),
            NodeKind::Backwards => self.backwards(id),
            NodeKind::Not => self.not(id),
            NodeKind::Try => self.try_(id),
            NodeKind::Set | NodeKind::Unset => self.set(id),
            NodeKind::Fail => self.fail_command(id),
            NodeKind::Test | NodeKind::Reverse => self.test(id),
            NodeKind::Do => self.do_(id),
            NodeKind::Next => self.next(id),
            NodeKind::Goto | NodeKind::GoPast => self.go(id),
            NodeKind::GotoGrouping
            | NodeKind::GoPastGrouping
            | NodeKind::GotoNon
            | NodeKind::GoPastNon => self.go_grouping(id),
            NodeKind::Repeat => {
                self.comment(id);
                self.repeat_body(id, None)
            }
            NodeKind::Loop => self.loop_(id),
            NodeKind::AtLeast => self.atleast(id),
            NodeKind::SetMark => {
                self.comment(id);
                let var = self.node_varref(id)?;
                self.out.line(format!("{var} = z->c;"));
                Ok(())
            }
            NodeKind::ToMark => self.tomark(id),
            NodeKind::AtMark => {
                self.comment(id);
                let mark = self.ae(node.ae, id)?;
                let f = self.fail();
                self.out.line(format!("if (z->c != {mark}) {f}"));
                Ok(())
            }
            NodeKind::Hop => self.hop(id),
            NodeKind::Delete => {
                self.comment(id);
                self.propagating("slice_del(z)", false);
                Ok(())
            }
            NodeKind::ToLimit => {
                self.comment(id);
                let b = if node.mode.is_forward() { "" } else { "b" };
                self.out.line(format!("z->c = z->l{b};"));
                Ok(())
            }
            NodeKind::AtLimit => {
                self.comment(id);
                let (op, b) = if node.mode.is_forward() { ("<", "") } else { (">", "b") };
                let f = self.fail();
                self.out.line(format!("if (z->c {op} z->l{b}) {f}"));
                Ok(())
            }
            NodeKind::LeftSlice | NodeKind::RightSlice => {
                self.comment(id);
                let left = node.kind == NodeKind::LeftSlice;
                let end = if left == node.mode.is_forward() { "bra" } else { "ket" };
                self.out.line(format!("z->{end} = z->c;"));
                Ok(())
            }
            NodeKind::AssignTo | NodeKind::SliceTo => {
                self.comment(id);
                let helper = if node.kind == NodeKind::AssignTo { "assign_to" } else { "slice_to" };
                let var = self.node_varref(id)?;
                self.propagating(&format!("{helper}(z, &{var})"), false);
                Ok(())
            }
            NodeKind::Insert | NodeKind::Attach => {
                self.comment(id);
                let keep_c = (node.kind == NodeKind::Attach) == node.mode.is_forward();
                let (kind, data) = self.edit_data(id)?;
                self.propagating(&format!("insert_{kind}(z, z->c, z->c, {data})"), keep_c);
                Ok(())
            }
            NodeKind::Assign => {
                self.comment(id);
                let (kind, data) = self.edit_data(id)?;
                if node.mode.is_forward() {
                    self.propagating(&format!("insert_{kind}(z, z->c, z->l, {data})"), true);
                } else {
                    self.propagating(&format!("insert_{kind}(z, z->lb, z->c, {data})"), false);
                }
                Ok(())
            }
            NodeKind::SliceFrom => {
                self.comment(id);
                let (kind, data) = self.edit_data(id)?;
                self.propagating(&format!("slice_from_{kind}(z, {data})"), false);
                Ok(())
            }
            NodeKind::SetLimit => self.setlimit(id),
            NodeKind::Dollar => self.dollar(id),
            kind if kind.is_integer_assign() => {
                self.comment(id);
                let var = self.node_varref(id)?;
                let value = self.ae(node.ae, id)?;
                let op = match kind {
                    NodeKind::MathAssign => "=",
                    other => other.token(),
                };
                self.out.line(format!("{var} {op} {value};"));
                Ok(())
            }
            kind if kind.is_relational() => self.integer_test(id),
            NodeKind::Call => self.call(id),
            NodeKind::Grouping | NodeKind::Non => self.grouping_test(id),
            NodeKind::NamedString => {
                self.comment(id);
                let s0 = direction_suffix(node.mode);
                let var = self.node_varref(id)?;
                self.test_or_return(id, format!("eq_v{s0}(z, {var})"));
                Ok(())
            }
            NodeKind::LiteralString => self.literal_string(id),
            NodeKind::Among => self.among(id),
            NodeKind::Substring => self.substring(id),
            NodeKind::BoolTest | NodeKind::NotBoolTest => {
                self.comment(id);
                let var = self.node_varref(id)?;
                let inverted = node.kind == NodeKind::NotBoolTest;
                if self.tailcallable(id) {
                    let not = if inverted { "!" } else { "" };
                    self.out.line(format!("return {not}{var};"));
                    self.mark_returned(id);
                } else {
                    let not = if inverted { "" } else { "!" };
                    let f = self.fail();
                    self.out.line(format!("if ({not}{var}) {f}"));
                }
                Ok(())
            }
            NodeKind::True => Ok(()),
            NodeKind::False => {
                self.comment(id);
                let f = self.fail();
                self.out.line(f);
                Ok(())
            }
            NodeKind::Debug => {
                self.comment(id);
                let count = self.debug_count;
                self.debug_count += 1;
                self.out.line(format!("debug(z, {count}, {});", node.line));
                Ok(())
            }
            NodeKind::FunctionEnd => {
                self.out.line("return 1;");
                Ok(())
            }
            kind => Err(GenerateError::MisplacedNode {
                token: kind.token(),
                line: node.line,
            }),
        }
    }

    /// Generates a sequence, stopping after a command that returned.
    pub(super) fn sequence(&mut self, first: Option<NodeId>) -> Result<()> {
        let program = self.program;
        for id in program.chain(first) {
            self.generate(id)?;
            if self.has_returned(id) {
                break;
            }
        }
        Ok(())
    }

    fn bra(&mut self, id: NodeId) -> Result<()> {
        self.sequence(self.node(id).left)
    }

    fn and(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id);
        let savevar = k_needed(self.program, node.left).then(|| self.new_var());
        self.comment(id);
        if let Some(v) = &savevar {
            self.out.block_start();
            self.save_cursor(node.mode, v);
        }
        let program = self.program;
        for item in program.chain(node.left) {
            self.generate(item)?;
            if let Some(v) = &savevar
                && self.node(item).right.is_some()
            {
                self.restore_cursor(node.mode, v);
            }
        }
        if savevar.is_some() {
            self.out.block_end();
        }
        Ok(())
    }

    fn or(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id);
        let savevar = k_needed(self.program, node.left).then(|| self.new_var());
        let outer = self.routine.failure.clone();

        self.comment(id);
        self.out.open("do {");
        if let Some(v) = &savevar {
            self.save_cursor(node.mode, v);
        }

        let branches = self.program.chain_ids(node.left);
        let Some((&last, rest)) = branches.split_last() else {
            return Err(GenerateError::MissingOperand {
                token: node.kind.token(),
                line: node.line,
            });
        };
        for &branch in rest {
            let label = self.install_label();
            self.generate(branch)?;
            self.out.line("break;");
            self.set_label(label);
            if let Some(v) = &savevar {
                self.restore_cursor(node.mode, v);
            }
        }

        self.routine.failure = outer;
        self.generate(last)?;

        self.out.block_end();
        self.out.pop_newline();
        self.out.write(" while (0);");
        self.out.newline();
        Ok(())
    }

    fn backwards(&mut self, id: NodeId) -> Result<()> {
        self.comment(id);
        self.out.line("z->lb = z->c; z->c = z->l;");
        self.generate(self.operand(id)?)?;
        self.out.line("z->c = z->lb;");
        Ok(())
    }

    fn not(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id);
        let operand = self.operand(id)?;
        let savevar = k_needed(self.program, node.left).then(|| self.new_var());
        let outer = self.routine.failure.clone();

        self.comment(id);
        if let Some(v) = &savevar {
            self.out.block_start();
            self.save_cursor(node.mode, v);
        }

        let label = self.install_label();
        self.generate(operand)?;

        self.routine.failure = outer;
        let f = self.fail();
        self.out.line(f);
        self.set_label(label);

        if let Some(v) = &savevar {
            self.restore_cursor(node.mode, v);
            self.out.block_end();
        }
        Ok(())
    }

    fn try_(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id);
        let operand = self.operand(id)?;
        let savevar = k_needed(self.program, node.left).then(|| self.new_var());

        self.comment(id);
        if let Some(v) = &savevar {
            self.out.block_start();
            self.save_cursor(node.mode, v);
        }

        let label = self.install_label();
        if let Some(v) = &savevar {
            self.routine.failure.undo = Self::restore_string(node.mode, v);
        }
        self.generate(operand)?;
        self.set_label(label);

        if savevar.is_some() {
            self.out.block_end();
        }
        Ok(())
    }

    fn set(&mut self, id: NodeId) -> Result<()> {
        self.comment(id);
        let var = self.node_varref(id)?;
        let on = self.node(id).kind == NodeKind::Set;
        let value = match (self.is_cpp(), on) {
            (true, true) => "true",
            (true, false) => "false",
            (false, true) => "1",
            (false, false) => "0",
        };
        self.out.line(format!("{var} = {value};"));
        Ok(())
    }

    fn fail_command(&mut self, id: NodeId) -> Result<()> {
        self.comment(id);
        self.generate(self.operand(id)?)?;
        let f = self.fail();
        self.out.line(f);
        Ok(())
    }

    /// `test` and `reverse`: the cursor is put back once the operand
    /// succeeds.
    fn test(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id);
        let operand = self.operand(id)?;
        let savevar = k_needed(self.program, node.left).then(|| self.new_var());

        self.comment(id);
        if let Some(v) = &savevar {
            self.out.block_start();
            self.save_cursor(node.mode, v);
        }
        self.generate(operand)?;
        if let Some(v) = &savevar {
            self.restore_cursor(node.mode, v);
            self.out.block_end();
        }
        Ok(())
    }

    fn do_(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id);
        let operand = self.operand(id)?;
        let savevar = k_needed(self.program, node.left).then(|| self.new_var());

        if let Some(v) = &savevar {
            self.out.block_start();
            self.save_cursor(node.mode, v);
        }

        if self.node(operand).kind == NodeKind::Call {
            self.comment(operand);
            let routine = self.node_varref(operand)?;
            self.propagating(&format!("{routine}(z)"), false);
        } else {
            let label = self.install_label();
            self.generate(operand)?;
            self.set_label(label);
        }

        if let Some(v) = &savevar {
            self.restore_cursor(node.mode, v);
            self.out.block_end();
        }
        Ok(())
    }

    /// Moves the cursor one character, failing at the limit.
    fn next(&mut self, id: NodeId) -> Result<()> {
        let mode = self.node(id).mode;
        self.comment(id);
        let f = self.fail();
        if self.is_utf8() {
            self.out.block_start();
            if mode.is_forward() {
                self.out.line("int ret = skip_utf8(z->p, z->c, z->l, 1);");
            } else {
                self.out.line("int ret = skip_b_utf8(z->p, z->c, z->lb, 1);");
            }
            self.out.line(format!("if (ret < 0) {f}"));
            self.out.line("z->c = ret;");
            self.out.block_end();
        } else if mode.is_forward() {
            self.out.line(format!("if (z->c >= z->l) {f}"));
            self.out.line("z->c++;");
        } else {
            self.out.line(format!("if (z->c <= z->lb) {f}"));
            self.out.line("z->c--;");
        }
        Ok(())
    }

    fn go_grouping(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id);
        self.comment(id);

        let grouping = self.grouping_of(id)?;
        let complement = matches!(node.kind, NodeKind::GotoNon | NodeKind::GoPastNon);
        let is_goto = matches!(node.kind, NodeKind::GotoGrouping | NodeKind::GotoNon);
        let s0 = direction_suffix(node.mode);
        let s1 = if complement { "in" } else { "out" };
        let s2 = if self.is_utf8() { "_U" } else { "" };
        let table = self.node_varref(id)?;
        let call = format!(
            "{s1}_grouping{s0}{s2}(z, {table}, {}, {}, 1)",
            grouping.min, grouping.max
        );

        let f = self.fail();
        if is_goto {
            self.out.line(format!("if ({call} < 0) {f}"));
        } else {
            self.out.block_start();
            self.out.line(format!("int ret = {call};"));
            self.out.line(format!("if (ret < 0) {f}"));
            let op = if node.mode.is_forward() { "+=" } else { "-=" };
            self.out.line(format!("z->c {op} ret;"));
            self.out.block_end();
        }
        Ok(())
    }

    /// `goto C` and `gopast C`: retry `C` one character further on until it
    /// succeeds.
    fn go(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id);
        let operand = self.operand(id)?;
        let is_goto = node.kind == NodeKind::Goto;
        self.comment(id);

        let outer = self.routine.failure.clone();
        self.out.open("while (1) {");

        let savevar = (is_goto || repeat_restore(self.program, node.left)).then(|| self.new_var());
        if let Some(v) = &savevar {
            self.save_cursor(node.mode, v);
        }

        let label = self.install_label();
        self.generate(operand)?;
        if is_goto && let Some(v) = &savevar {
            self.restore_cursor(node.mode, v);
        }
        self.out.line("break;");
        self.set_label(label);
        if let Some(v) = &savevar {
            self.restore_cursor(node.mode, v);
        }

        self.routine.failure = outer;
        self.next(id)?;
        self.out.block_end();
        Ok(())
    }

    fn loop_(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id);
        let operand = self.operand(id)?;
        self.comment(id);
        self.out.block_start();
        let count = self.ae(node.ae, id)?;
        self.out.open(format!("int i; for (i = {count}; i > 0; i--) {{"));
        self.generate(operand)?;
        self.out.block_end();
        self.out.block_end();
        Ok(())
    }

    /// The loop shared by `repeat` and `atleast`, which also counts down
    /// `counter` after each success.
    fn repeat_body(&mut self, id: NodeId, counter: Option<&str>) -> Result<()> {
        let node = self.node(id);
        let operand = self.operand(id)?;
        self.out.open("while (1) {");

        let savevar = repeat_restore(self.program, node.left).then(|| self.new_var());
        if let Some(v) = &savevar {
            self.save_cursor(node.mode, v);
        }

        let label = self.install_label();
        self.generate(operand)?;
        if let Some(counter) = counter {
            self.out.line(format!("{counter}--;"));
        }
        self.out.line("continue;");
        self.set_label(label);
        if let Some(v) = &savevar {
            self.restore_cursor(node.mode, v);
        }
        self.out.line("break;");
        self.out.block_end();
        Ok(())
    }

    fn atleast(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id);
        let counter = self.new_var();
        self.comment(id);
        self.out.block_start();
        let count = self.ae(node.ae, id)?;
        self.out.line(format!("int {counter} = {count};"));

        let outer = self.routine.failure.clone();
        self.repeat_body(id, Some(&counter))?;
        self.routine.failure = outer;

        let f = self.fail();
        self.out.line(format!("if ({counter} > 0) {f}"));
        self.out.block_end();
        Ok(())
    }

    fn tomark(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id);
        self.comment(id);
        let mark = self.ae(node.ae, id)?;
        let op = if node.mode.is_forward() { ">" } else { "<" };
        let f = self.fail();
        self.out.line(format!("if (z->c {op} {mark}) {f}"));
        self.out.line(format!("z->c = {mark};"));
        Ok(())
    }

    fn hop(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id);
        let forward = node.mode.is_forward();
        self.comment(id);
        let distance = self.ae(node.ae, id)?;
        let f = self.fail();

        if self.is_utf8() {
            let (s0, limit) = if forward { ("", "z->l") } else { ("_b", "z->lb") };
            self.out.block_start();
            self.out.line(format!("int ret = skip{s0}_utf8(z->p, z->c, {limit}, {distance});"));
            self.out.line(format!("if (ret < 0) {f}"));
            self.out.line("z->c = ret;");
            self.out.block_end();
            return Ok(());
        }

        let sign = if forward { "+" } else { "-" };
        let constant = node
            .ae
            .map(|ae| self.node(ae))
            .filter(|ae| ae.kind == NodeKind::Number);
        if let Some(n) = constant.map(|ae| ae.number) {
            // Negative constants were turned into `false` during analysis.
            if forward {
                self.out.line(format!("if (z->c + {n} > z->l) {f}"));
            } else {
                self.out.line(format!("if (z->c - {n} < z->lb) {f}"));
            }
            self.out.line(format!("z->c {sign}= {n};"));
        } else {
            self.out.block_start();
            self.out.line(format!("int ret = z->c {sign} {distance};"));
            if forward {
                self.out.line(format!("if (ret > z->l || ret < z->c) {f}"));
            } else {
                self.out.line(format!("if (ret < z->lb || ret > z->c) {f}"));
            }
            self.out.line("z->c = ret;");
            self.out.block_end();
        }
        Ok(())
    }

    /// `s` and the literal, or `v` and the string variable, for the runtime's
    /// editing helpers.
    fn edit_data(&mut self, id: NodeId) -> Result<(char, String)> {
        let kind = if self.node(id).literal.is_some() { 's' } else { 'v' };
        Ok((kind, self.data_address(id)?))
    }

    fn setlimit(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id);
        let forward = node.mode.is_forward();
        let limit = self.operand(id)?;
        let body = node.aux.ok_or(GenerateError::MissingOperand {
            token: node.kind.token(),
            line: node.line,
        })?;
        let var = self.new_var();
        self.comment(id);

        let mark = self.node(limit);
        let extra_block = if mark.kind == NodeKind::ToMark && mark.right.is_none() {
            self.comment(limit);
            self.out.block_start();
            self.out.line(format!("int {var};"));
            let at = self.ae(mark.ae, limit)?;
            let op = if mark.mode.is_forward() { ">" } else { "<" };
            let f = self.fail();
            self.out.line(format!("if (z->c {op} {at}) {f}"));
            if forward {
                // Distance from the new limit to the end, so edits in the
                // body carry over to the restored limit.
                self.out.line(format!("{var} = z->l - {at}; z->l = {at};"));
            } else {
                self.out.line(format!("{var} = z->lb; z->lb = {at};"));
            }
            false
        } else {
            self.out.block_start();
            let savevar = self.new_var();
            self.save_cursor(node.mode, &savevar);
            self.sequence(Some(limit))?;
            self.out.block_start();
            if forward {
                self.out.line(format!("int {var} = z->l - z->c; z->l = z->c;"));
            } else {
                self.out.line(format!("int {var} = z->lb; z->lb = z->c;"));
            }
            self.restore_cursor(node.mode, &savevar);
            true
        };

        let restore_limit = if forward {
            format!("z->l += {var};")
        } else {
            format!("z->lb = {var};")
        };
        // A failing body unwinds this limit and then whatever encloses it.
        let outer = self.routine.failure.clone();
        self.routine.failure.undo = if outer.undo.is_empty() {
            restore_limit.clone()
        } else {
            format!("{restore_limit} {}", outer.undo)
        };
        self.generate(body)?;
        self.routine.failure = outer;

        self.out.line(restore_limit);
        self.out.block_end();
        if extra_block {
            self.out.block_end();
        }
        Ok(())
    }

    /// `$s C`: runs `C` on the string variable `s` as the current string.
    fn dollar(&mut self, id: NodeId) -> Result<()> {
        let body = self.operand(id)?;
        let body_signal = self.node(body).signal;
        self.comment(id);

        let outer = self.routine.failure.clone();
        let label = self.install_label();
        let var = self.new_var();
        let target = self.node_varref(id)?;

        self.out.block_start();
        self.out.line(format!("struct SN_env en{var} = *z;"));
        if body_signal == Signal::Unknown {
            self.out.line(format!("int {var}_f = 1;"));
        }
        self.out.line(format!("z->p = {target};"));
        self.out.line("z->lb = z->c = 0;");
        self.out.line("z->l = SIZE(z->p);");
        self.generate(body)?;
        if body_signal == Signal::Unknown {
            self.out.line(format!("{var}_f = 0;"));
        }
        self.set_label(label);
        self.routine.failure = outer;

        self.out.line(format!("{target} = z->p;"));
        self.out.line(format!("*z = en{var};"));
        match body_signal {
            Signal::Fails => {
                let f = self.fail();
                self.out.line(f);
            }
            Signal::Unknown => {
                let f = self.fail();
                self.out.line(format!("if ({var}_f) {f}"));
            }
            Signal::Succeeds => {}
        }
        self.out.block_end();
        Ok(())
    }

    fn integer_test(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id);
        self.comment(id);
        let lhs = self.ae(node.left, id)?;
        let rhs = self.ae(node.ae, id)?;
        if self.tailcallable(id) {
            self.out.line(format!("return {lhs} {} {rhs};", node.kind.token()));
            self.mark_returned(id);
        } else {
            // The C test is the negation of the Snowball one.
            let negated = node.kind.negated_relation().unwrap_or(node.kind);
            let f = self.fail();
            self.out.line(format!("if ({lhs} {} {rhs}) {f}", negated.token()));
        }
        Ok(())
    }

    fn call(&mut self, id: NodeId) -> Result<()> {
        let name = self.name_of(id)?;
        let signal = self
            .program
            .name(name)
            .definition
            .map_or(Signal::Unknown, |d| self.node(d).signal);
        let routine = self.varref(name);
        self.comment(id);

        if self.tailcallable(id) {
            self.out.line(format!("return {routine}(z);"));
            self.mark_returned(id);
            return Ok(());
        }
        if self.just_return_on_fail() {
            if signal == Signal::Fails {
                self.out.line(format!("return {routine}(z);"));
                return Ok(());
            }
            self.out.block_start();
            self.out.line(format!("int ret = {routine}(z);"));
            // C propagates failures and runtime errors with one test.
            let test = if self.is_cpp() { "==" } else { "<=" };
            self.out.line(format!("if (ret {test} 0) return ret;"));
            self.out.block_end();
            return Ok(());
        }

        match signal {
            Signal::Succeeds => self.propagating(&format!("{routine}(z)"), false),
            Signal::Fails => {
                self.propagating(&format!("{routine}(z)"), false);
                let f = self.fail();
                self.out.line(f);
            }
            Signal::Unknown if self.is_cpp() => {
                let f = self.fail();
                self.out.line(format!("if (!{routine}(z)) {f}"));
            }
            Signal::Unknown => {
                self.out.block_start();
                self.out.line(format!("int ret = {routine}(z);"));
                let f = self.fail();
                self.out.line(format!("if (ret == 0) {f}"));
                self.out.line("if (ret < 0) return ret;");
                self.out.block_end();
            }
        }
        Ok(())
    }

    fn grouping_test(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id);
        self.comment(id);
        let grouping = self.grouping_of(id)?;
        let s0 = direction_suffix(node.mode);
        let s1 = if node.kind == NodeKind::Non { "out" } else { "in" };
        let s2 = if self.is_utf8() { "_U" } else { "" };
        let table = self.node_varref(id)?;
        let call = format!(
            "{s1}_grouping{s0}{s2}(z, {table}, {}, {}, 0)",
            grouping.min, grouping.max
        );
        if self.tailcallable(id) {
            self.out.line(format!("return !{call};"));
            self.mark_returned(id);
        } else {
            let f = self.fail();
            self.out.line(format!("if ({call}) {f}"));
        }
        Ok(())
    }

    fn literal_string(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id);
        self.comment(id);
        let text = node.literal.as_deref().unwrap_or_default();

        // Single symbols are compared inline. In UTF-8 only ASCII is one
        // symbol wide.
        if let [ch] = text
            && (*ch < 0x80 || !self.is_utf8())
        {
            let ch = super::emitter::char_literal(*ch);
            let f = self.fail();
            if node.mode.is_forward() {
                self.out.line(format!("if (z->c == z->l || z->p[z->c] != {ch}) {f}"));
                self.out.line("z->c++;");
            } else {
                self.out.line(format!("if (z->c <= z->lb || z->p[z->c - 1] != {ch}) {f}"));
                self.out.line("z->c--;");
            }
            return Ok(());
        }

        let s0 = direction_suffix(node.mode);
        let at = self.literal_ref(text);
        self.test_or_return(id, format!("eq_s{s0}(z, {}, {at})", text.len()));
        Ok(())
    }

    /// `return TEST;` in tail position, otherwise `if (!(TEST)) f`.
    fn test_or_return(&mut self, id: NodeId, test: String) {
        if self.tailcallable(id) {
            self.out.line(format!("return {test};"));
            self.mark_returned(id);
        } else {
            let f = self.fail();
            self.out.line(format!("if (!({test})) {f}"));
        }
    }

    /// An arithmetic expression as a C expression.
    pub(super) fn ae(&self, id: Option<NodeId>, owner: NodeId) -> Result<String> {
        let Some(id) = id else {
            let node = self.node(owner);
            return Err(GenerateError::MissingOperand {
                token: node.kind.token(),
                line: node.line,
            });
        };
        let node = self.node(id);
        Ok(match node.kind {
            NodeKind::Variable => self.node_varref(id)?,
            NodeKind::Number => node.number.to_string(),
            NodeKind::MaxInt => "INT_MAX".to_owned(),
            NodeKind::MinInt => "INT_MIN".to_owned(),
            NodeKind::Neg => format!("-{}", self.ae(node.left, id)?),
            NodeKind::Plus | NodeKind::Minus | NodeKind::Multiply | NodeKind::Divide => format!(
                "({} {} {})",
                self.ae(node.left, id)?,
                node.kind.token(),
                self.ae(node.right, id)?
            ),
            NodeKind::Cursor => "z->c".to_owned(),
            NodeKind::Limit if node.mode.is_forward() => "z->l".to_owned(),
            NodeKind::Limit => "z->lb".to_owned(),
            NodeKind::Len if self.is_utf8() => "len_utf8(z->p)".to_owned(),
            NodeKind::Len | NodeKind::Size => "SIZE(z->p)".to_owned(),
            NodeKind::LenOf if self.is_utf8() => format!("len_utf8({})", self.node_varref(id)?),
            NodeKind::LenOf | NodeKind::SizeOf => format!("SIZE({})", self.node_varref(id)?),
            kind => {
                return Err(GenerateError::MisplacedNode {
                    token: kind.token(),
                    line: node.line,
                });
            }
        })
    }
}
