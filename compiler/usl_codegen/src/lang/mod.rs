//! Round-trip backend: prints a tree back as USL source.
//!
//! Parsing the output yields the same tree up to spans, for any tree the
//! parser can produce.

use usl_ir::{
    BuiltinFunction, InterfaceSlot, InterfaceVariable, Span, Statement, StatementKind, Type,
};

use crate::emitter::{emit_lines, Emitter};
use crate::syntax::{Dialect, SourceWriter};
use crate::{Backend, CodegenError};

#[derive(Copy, Clone, Debug, Default)]
pub struct LangWriter;

impl LangWriter {
    pub fn new() -> Self {
        LangWriter
    }

    /// `ast` as source text, one blank line between file-level items.
    pub fn render(&self, ast: &Statement) -> Result<String, CodegenError> {
        let mut w = SourceWriter::new(self);
        for item in ast.as_statements() {
            w.blank_line();
            w.statement(item)?;
        }
        Ok(w.finish())
    }
}

impl Backend for LangWriter {
    #[tracing::instrument(level = "debug", skip_all)]
    fn generate(&self, ast: &Statement, out: &mut dyn Emitter) -> Result<(), CodegenError> {
        let text = self.render(ast)?;
        emit_lines(out, &text);
        Ok(())
    }
}

impl Dialect for LangWriter {
    fn builtin_function(
        &self,
        builtin: BuiltinFunction,
        _span: Span,
    ) -> Result<&'static str, CodegenError> {
        Ok(builtin.name())
    }

    fn declarator(&self, ty: &Type, name: &str) -> String {
        format!("{ty} {name}")
    }

    fn write_item(&self, w: &mut SourceWriter<'_>, stmt: &Statement) -> Result<(), CodegenError> {
        match &stmt.kind {
            StatementKind::DeclareStruct(decl) => {
                w.line(&format!("struct {} {{", decl.name));
                w.indent();
                for field in &decl.fields {
                    w.line(&format!("{}: {};", field.name, field.ty));
                }
                w.dedent();
                w.push("}");
            }
            StatementKind::DeclareInputs(vars) => interface_block(w, "input", vars),
            StatementKind::DeclareOutputs(vars) => interface_block(w, "output", vars),
            StatementKind::DeclareExternals(vars) => {
                w.line("external {");
                w.indent();
                for var in vars {
                    let storage = if var.storage { ", storage" } else { "" };
                    w.line(&format!(
                        "[set({}), binding({}){storage}] {} {};",
                        var.set, var.binding, var.ty, var.name
                    ));
                }
                w.dedent();
                w.push("}");
            }
            StatementKind::DeclareOptions(options) => {
                w.line("option {");
                w.indent();
                for option in options {
                    w.push(&format!("{} {}", option.ty, option.name));
                    if let Some(default) = &option.default {
                        w.push(" = ");
                        w.expression(default)?;
                    }
                    w.line(";");
                }
                w.dedent();
                w.push("}");
            }
            StatementKind::DeclareConsts(consts) => {
                w.line("const {");
                w.indent();
                for constant in consts {
                    w.push(&format!("{} {} = ", constant.ty, constant.name));
                    w.expression(&constant.value)?;
                    w.line(";");
                }
                w.dedent();
                w.push("}");
            }
            StatementKind::DeclareFunction(func) => {
                if let Some(entry) = func.entry {
                    match entry.workgroup {
                        Some([x, y, z]) => w.line(&format!(
                            "[entry({}), workgroup({x}, {y}, {z})]",
                            entry.stage
                        )),
                        None => w.line(&format!("[entry({})]", entry.stage)),
                    }
                }
                let params: Vec<String> = func
                    .parameters
                    .iter()
                    .map(|p| format!("{} {}", p.ty, p.name))
                    .collect();
                w.push(&format!(
                    "{} {}({}) ",
                    func.return_type,
                    func.name,
                    params.join(", ")
                ));
                w.block(&func.body)?;
            }
            StatementKind::Optional {
                condition,
                body,
                else_body,
            } => {
                w.follow("optional (");
                w.expression(condition)?;
                w.push(")");
                w.body(body)?;
                if let Some(else_body) = else_body {
                    w.follow("else");
                    if let StatementKind::Optional { .. } = else_body.kind {
                        self.write_item(w, else_body)?;
                    } else {
                        w.body(else_body)?;
                    }
                }
            }
            StatementKind::Include(path) => w.push(&format!("include {};", path.dotted())),
            _ => w.statement(stmt)?,
        }
        Ok(())
    }
}

fn interface_block(w: &mut SourceWriter<'_>, keyword: &str, vars: &[InterfaceVariable]) {
    w.line(&format!("{keyword} {{"));
    w.indent();
    for var in vars {
        let slot = match var.slot {
            InterfaceSlot::Location(location) => format!("location({location})"),
            InterfaceSlot::Builtin(builtin) => format!("builtin({builtin})"),
        };
        w.line(&format!("[{slot}] {} {};", var.ty, var.name));
    }
    w.dedent();
    w.push("}");
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
