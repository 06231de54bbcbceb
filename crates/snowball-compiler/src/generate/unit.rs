//! The source and interface files around the routines.

use snowball_core::{AmongId, NameId, NameKind, NodeId, NodeKind, Signal};

use super::emitter::Emitter;
use super::writer::Writer;
use super::{GenerateError, GeneratedUnit, Result};
use crate::analyze::AnalyzedProgram;
use crate::config::{Config, Target};

/// Generates the source and interface files for an analysed program.
///
/// The source holds, in order: the banner and includes, the per-instance
/// state, routine declarations, literal and among tables, groupings, the
/// routines, and for C the lifecycle functions.
pub fn generate(analyzed: &AnalyzedProgram, config: &Config) -> Result<GeneratedUnit> {
    if analyzed.program.encoding != config.encoding {
        return Err(GenerateError::EncodingMismatch {
            program: analyzed.program.encoding,
            config: config.encoding,
        });
    }

    let mut emitter = Emitter::new(analyzed, config);
    emitter.banner_to_declarations();
    emitter.head();
    emitter.routine_declarations();

    for &define in &analyzed.program.routines {
        emitter.define(define)?;
    }

    for (index, among) in analyzed.amongs.iter().enumerate() {
        if among.used && !emitter.inlined.contains(&AmongId::new(index)) {
            emitter.among_table(among);
        }
    }
    emitter.grouping_tables();

    if config.target == Target::C {
        emitter.create_env();
        emitter.close_env();
    }

    let header = emitter.header();
    let Emitter {
        declarations, out, ..
    } = emitter;
    let mut source = declarations.finish();
    source.push_str(&out.finish());
    Ok(GeneratedUnit { source, header })
}

/// `#include` line for a configured header, adding `<>` unless quoted.
fn include(header: &str) -> String {
    if header.starts_with('<') || header.starts_with('"') {
        format!("#include {header}")
    } else {
        format!("#include <{header}>")
    }
}

impl Emitter<'_> {
    fn banner(&self) -> String {
        let source = match &self.config.source_name {
            Some(path) => path.rsplit(['/', '\\']).next().unwrap_or(path).to_owned(),
            None => format!("{}.sbl", self.config.output_leaf),
        };
        format!(
            "/* Generated from {source} by Snowball {} - https://snowballstem.org/ */",
            env!("CARGO_PKG_VERSION")
        )
    }

    fn banner_to_declarations(&mut self) {
        let banner = self.banner();
        self.declarations.line(banner);
        self.declarations.newline();
    }

    fn runtime_include(&self) -> String {
        let mut path = self.config.runtime_path.clone().unwrap_or_default();
        if !path.is_empty() && !path.ends_with('/') {
            path.push('/');
        }
        format!("#include \"{path}snowball_runtime.h\"")
    }

    /// Live variables of one kind kept in the per-instance state.
    fn shared(&self, kind: NameKind) -> Vec<NameId> {
        self.program
            .live_names()
            .filter(|(_, n)| n.kind == kind && n.is_shared())
            .map(|(id, _)| id)
            .collect()
    }

    fn bool_type(&self) -> &'static str {
        if self.is_cpp() { "bool" } else { "int" }
    }

    /// Externals with a definition, in declaration order.
    fn externals(&self) -> Vec<NameId> {
        self.program
            .live_names()
            .filter(|(_, n)| n.kind == NameKind::External && n.definition.is_some())
            .map(|(id, _)| id)
            .collect()
    }

    fn head(&mut self) {
        let config = self.config;
        let program = self.program;
        let d = &mut self.declarations;

        if let Some(header) = &config.cheader {
            d.line(include(header));
            d.newline();
        }
        if config.is_cpp() {
            d.line("#define SNOWBALL_RUNTIME_THROW_EXCEPTIONS");
        }
        if program.debug_used {
            d.line("#define SNOWBALL_DEBUG_COMMAND_USED");
        }
        d.line(format!("#include \"{}.h\"", config.output_leaf));
        d.newline();
        if program.int_limits_used {
            d.line("#include <limits.h>");
        }
        d.line("#include <stddef.h>");
        d.newline();

        if config.is_cpp() {
            d.line(format!(
                "typedef {}::{}::SN_local SN_local;",
                config.package,
                config.class_name()
            ));
            d.newline();
            return;
        }

        let runtime = self.runtime_include();
        self.declarations.line(runtime);
        self.declarations.newline();

        if self.analyzed.variable_count > 0 {
            let members = self.state_members();
            self.declarations.open("struct SN_local {");
            self.declarations.line("struct SN_env z;");
            for member in members {
                self.declarations.line(member);
            }
            self.declarations.dedent();
            self.declarations.line("};");
            self.declarations.newline();
            self.declarations.line("typedef struct SN_local SN_local;");
            self.declarations.newline();
        }

        if let Some(prefix) = &config.variables_prefix {
            for id in self.program.live_names().map(|(id, _)| id).collect::<Vec<_>>() {
                self.accessor_definition(prefix, id);
            }
        }
    }

    /// Members of `SN_local` after the embedded `SN_env`, grouped by type
    /// for packing.
    fn state_members(&self) -> Vec<String> {
        let boolean = if self.is_cpp() { "bool" } else { "unsigned char" };
        let mut members = Vec::new();
        for id in self.shared(NameKind::Integer) {
            members.push(format!("int {};", self.varname(id)));
        }
        for id in self.shared(NameKind::Boolean) {
            members.push(format!("{boolean} {};", self.varname(id)));
        }
        for id in self.shared(NameKind::String) {
            members.push(format!("symbol * {};", self.varname(id)));
        }
        members
    }

    fn accessor_definition(&mut self, prefix: &str, id: NameId) {
        let name = self.program.name(id);
        if !name.kind.is_variable() || !name.is_shared() {
            return;
        }
        let var = self.varref(id);
        let d = &mut self.declarations;
        match name.kind {
            NameKind::String => {
                d.open(format!(
                    "extern const symbol * {prefix}{}(struct SN_env * z) {{",
                    name.text
                ));
                d.line(format!("symbol * p = {var};"));
                d.line("p[SIZE(p)] = 0;");
                d.line("return p;");
            }
            _ => {
                d.open(format!("extern int {prefix}{}(struct SN_env * z) {{", name.text));
                d.line(format!("return {var};"));
            }
        }
        d.dedent();
        d.line("}");
        d.newline();
    }

    fn routine_declarations(&mut self) {
        if !self.is_cpp() {
            let externals: Vec<String> = self
                .externals()
                .into_iter()
                .map(|id| format!("extern int {}(struct SN_env * z);", self.varname(id)))
                .collect();
            let d = &mut self.declarations;
            d.line("#ifdef __cplusplus");
            d.line("extern \"C\" {");
            d.line("#endif");
            for external in externals {
                d.line(external);
            }
            d.line("#ifdef __cplusplus");
            d.line("}");
            d.line("#endif");
            d.newline();
        }

        let routines: Vec<String> = self
            .program
            .live_names()
            .filter(|(_, n)| n.kind == NameKind::Routine)
            .map(|(id, _)| format!("static int {}(struct SN_env * z);", self.varname(id)))
            .collect();
        if !routines.is_empty() {
            for routine in routines {
                self.declarations.line(routine);
            }
            self.declarations.newline();
        }
    }

    fn define(&mut self, define: NodeId) -> Result<()> {
        let program = self.program;
        let node = self.node(define);
        let name_id = self.name_of(define)?;
        let name = program.name(name_id);

        self.out.newline();
        self.comment(define);
        self.begin_routine();

        let prefix = match (name.kind, self.config.target) {
            (NameKind::Routine, _) => "static ",
            (_, Target::C) => "extern ",
            (_, Target::Cpp) => "",
        };
        let routine = self.varref(name_id);
        self.out.open(format!("{prefix}int {routine}(struct SN_env * z) {{"));
        if name.amongvar_needed {
            self.out.line("int among_var;");
        }

        let locals: Vec<String> = program
            .live_names()
            .filter(|(_, n)| n.local_to == Some(name_id))
            .filter_map(|(id, n)| match n.kind {
                NameKind::Boolean => Some(format!("{} {};", self.bool_type(), self.varname(id))),
                NameKind::Integer => Some(format!("int {};", self.varname(id))),
                _ => None,
            })
            .collect();
        for local in locals {
            self.out.line(local);
        }

        if let Some(body) = node.left {
            self.generate(body)?;
            let body_node = self.node(body);
            if let Some(end) = body_node.right
                && !self.has_returned(body)
                && self.node(end).kind == NodeKind::FunctionEnd
                && body_node.signal != Signal::Fails
            {
                self.generate(end)?;
            }
        }
        self.out.block_end();
        Ok(())
    }

    fn grouping_tables(&mut self) {
        let analyzed = self.analyzed;
        for grouping in &analyzed.groupings {
            let bytes: Vec<String> = grouping.bitmap().iter().map(u8::to_string).collect();
            let table = self.varname(grouping.name);
            self.declarations.newline();
            self.declarations.line(format!(
                "static const unsigned char {table}[] = {{ {} }};",
                bytes.join(", ")
            ));
        }
    }

    fn create_env(&mut self) {
        let prefix = &self.config.externals_prefix;
        let strings = self.shared(NameKind::String);
        let mut initial = Vec::new();
        for (id, name) in self.program.live_names() {
            if !name.is_shared() {
                continue;
            }
            let value = match name.kind {
                NameKind::String => "NULL",
                NameKind::Boolean | NameKind::Integer => "0",
                _ => continue,
            };
            initial.push(format!("{} = {value};", self.varref(id)));
        }
        let allocations: Vec<String> = strings.iter().map(|&id| self.varref(id)).collect();

        let o = &mut self.out;
        o.newline();
        o.open(format!("extern struct SN_env * {prefix}create_env(void) {{"));
        if self.analyzed.variable_count == 0 {
            o.line("return SN_new_env(sizeof(struct SN_env));");
        } else {
            o.line("struct SN_env * z = SN_new_env(sizeof(SN_local));");
            o.open("if (z) {");
            for line in initial {
                o.line(line);
            }
            if !allocations.is_empty() {
                // Everything is NULL before the first allocation, so a
                // failure can release whatever was allocated so far.
                o.newline();
                for var in allocations {
                    o.open(format!("if (({var} = create_s()) == NULL) {{"));
                    o.line(format!("{prefix}close_env(z);"));
                    o.line("return NULL;");
                    o.dedent();
                    o.line("}");
                }
            }
            o.dedent();
            o.line("}");
            o.line("return z;");
        }
        o.dedent();
        o.line("}");
    }

    fn close_env(&mut self) {
        let prefix = &self.config.externals_prefix;
        let strings: Vec<String> = self
            .shared(NameKind::String)
            .into_iter()
            .map(|id| format!("lose_s({});", self.varref(id)))
            .collect();

        let o = &mut self.out;
        o.newline();
        o.open(format!("extern void {prefix}close_env(struct SN_env * z) {{"));
        if !strings.is_empty() {
            o.open("if (z) {");
            for line in strings {
                o.line(line);
            }
            o.dedent();
            o.line("}");
        }
        o.line("SN_delete_env(z);");
        o.dedent();
        o.line("}");
        o.newline();
    }

    fn header(&self) -> String {
        let mut h = Writer::new();
        h.line(self.banner());
        h.newline();
        if let Some(header) = &self.config.hheader {
            h.line(include(header));
            h.newline();
        }
        match self.config.target {
            Target::C => self.c_header(&mut h),
            Target::Cpp => self.cpp_header(&mut h),
        }
        h.finish()
    }

    fn c_header(&self, h: &mut Writer) {
        let prefix = &self.config.externals_prefix;
        h.line("#ifdef __cplusplus");
        h.line("extern \"C\" {");
        h.line("#endif");
        h.newline();
        h.line(format!("extern struct SN_env * {prefix}create_env(void);"));
        h.line(format!("extern void {prefix}close_env(struct SN_env * z);"));
        h.newline();

        if let Some(vp) = &self.config.variables_prefix {
            for (_, name) in self.program.live_names() {
                if !name.is_shared() {
                    continue;
                }
                match name.kind {
                    NameKind::String => h.line(format!(
                        "extern const symbol * {vp}{}(struct SN_env * z);",
                        name.text
                    )),
                    NameKind::Integer | NameKind::Boolean => {
                        h.line(format!("extern int {vp}{}(struct SN_env * z);", name.text));
                    }
                    _ => {}
                }
            }
        }

        for id in self.externals() {
            h.line(format!("extern int {}(struct SN_env * z);", self.varname(id)));
        }
        h.newline();
        h.line("#ifdef __cplusplus");
        h.line("}");
        h.line("#endif");
    }

    fn cpp_header(&self, h: &mut Writer) {
        let config = self.config;
        let class = config.class_name();

        h.line("#define SNOWBALL_RUNTIME_THROW_EXCEPTIONS");
        h.line(self.runtime_include());
        h.newline();
        h.line(format!("namespace {} {{", config.package));
        h.newline();
        h.line(format!("class {class} : public {} {{", config.parent_class));
        h.line("  public:");
        h.indent();

        if let Some(vp) = &config.variables_prefix {
            for (id, name) in self.program.live_names() {
                if !name.is_shared() || !name.kind.is_variable() {
                    continue;
                }
                let var = self.varref(id);
                let signature = match name.kind {
                    NameKind::String => format!("const symbol * {vp}{}() {{", name.text),
                    NameKind::Integer => format!("int {vp}{}() {{", name.text),
                    _ => format!("bool {vp}{}() {{", name.text),
                };
                h.open(signature);
                h.line("struct SN_env * z = &(zlocal.z);");
                if name.kind == NameKind::String {
                    h.line(format!("symbol * p = {var};"));
                    h.line("p[SIZE(p)] = 0;");
                    h.line("return p;");
                } else {
                    h.line(format!("return {var};"));
                }
                h.dedent();
                h.line("}");
                h.newline();
            }
        }

        h.open("struct SN_local {");
        h.line("struct SN_env z;");
        for member in self.state_members() {
            h.line(member);
        }
        h.dedent();
        h.line("};");
        h.newline();

        let strings: Vec<String> = self
            .shared(NameKind::String)
            .into_iter()
            .map(|id| self.varref(id))
            .collect();

        h.dedent();
        h.line("  private:");
        h.indent();
        h.line("SN_local zlocal = {};");
        h.newline();
        h.open("void close_env() {");
        h.line("struct SN_env * z = &(zlocal.z);");
        for var in &strings {
            h.line(format!("lose_s({var});"));
        }
        h.line("lose_s(z->p);");
        h.dedent();
        h.line("}");
        h.newline();

        for id in self.externals() {
            h.line(format!("static int {}(struct SN_env * z);", self.program.name(id).text));
            h.newline();
        }

        h.dedent();
        h.line("  public:");
        h.indent();
        h.open(format!("{class}() {{"));
        h.line("struct SN_env * z = &(zlocal.z);");
        h.line("z->p = create_s();");
        if !strings.is_empty() {
            h.open("try {");
            for var in &strings {
                h.line(format!("{var} = create_s();"));
            }
            h.dedent();
            h.open("} catch (...) {");
            h.line("close_env();");
            h.line("throw;");
            h.dedent();
            h.line("}");
        }
        h.dedent();
        h.line("}");
        h.newline();

        h.open(format!("~{class}() {{"));
        h.line("close_env();");
        h.dedent();
        h.line("}");
        h.newline();

        h.open("std::string operator()(const std::string& word) override {");
        h.line("struct SN_env* z = &(zlocal.z);");
        h.line("const symbol* s = reinterpret_cast<const symbol*>(word.data());");
        h.line("replace_s(z, 0, z->l, word.size(), s);");
        h.line("z->c = 0;");
        h.line(format!("{}::{class}::stem(z);", config.package));
        h.line("return std::string(reinterpret_cast<const char*>(z->p), SIZE(z->p));");
        h.dedent();
        h.line("}");
        h.newline();

        let description: String = config
            .output_leaf
            .chars()
            .flat_map(|c| match c {
                '"' | '\\' => vec!['\\', c],
                c => vec![c],
            })
            .collect();
        h.open("std::string get_description() const override {");
        h.line(format!("return \"{description}\";"));
        h.dedent();
        h.line("}");
        h.dedent();
        h.line("};");
        h.newline();
        h.line("}");
    }
}
