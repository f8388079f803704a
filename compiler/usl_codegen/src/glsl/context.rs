//! One GLSL generation: entry selection, file-scope declarations and
//! function bodies.

use rustc_hash::FxHashMap;
use usl_ir::{
    ArraySize, BuiltinFunction, BuiltinVariable, ExternalVariable, FunctionDeclaration,
    InterfaceSlot, InterfaceVariable, Name, PrimitiveType, ShaderStage, Span, Statement,
    StatementKind, StructDeclaration, Type, Visitor,
};

use super::order::{dependency_order, References};
use super::GlslSettings;
use crate::syntax::{Dialect, SourceWriter};
use crate::CodegenError;

/// How an external is exposed.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Resource {
    Sampler,
    UniformBlock,
    StorageBlock,
    Value,
}

impl Resource {
    fn of(var: &ExternalVariable) -> Self {
        if var.ty.is_sampler() {
            Resource::Sampler
        } else if var.ty.struct_name().is_some() {
            if var.storage {
                Resource::StorageBlock
            } else {
                Resource::UniformBlock
            }
        } else {
            Resource::Value
        }
    }
}

pub(super) fn render(settings: &GlslSettings, ast: &Statement) -> Result<String, CodegenError> {
    let items = ast.as_statements();
    check_items(settings, items)?;
    let (entry, span) = select_entry(settings, items)?;
    let context = Context::new(settings, entry, items);
    context.check_entry(span)?;
    context.render(items)
}

/// Reject file-scope constructs GLSL has no form for.
fn check_items(settings: &GlslSettings, items: &[Statement]) -> Result<(), CodegenError> {
    for item in items {
        let construct = match &item.kind {
            StatementKind::Optional { .. } => "`optional` block",
            StatementKind::DeclareOptions(_) => "`option` declaration",
            StatementKind::Include(_) => "`include` directive",
            StatementKind::Branch { .. }
            | StatementKind::For { .. }
            | StatementKind::While { .. }
            | StatementKind::DoWhile { .. }
            | StatementKind::Expression(_)
            | StatementKind::Break
            | StatementKind::Continue
            | StatementKind::Return(_)
            | StatementKind::Discard
            | StatementKind::Sequence(_) => "statement at file scope",
            StatementKind::DeclareVariable(_)
            | StatementKind::DeclareStruct(_)
            | StatementKind::DeclareInputs(_)
            | StatementKind::DeclareOutputs(_)
            | StatementKind::DeclareExternals(_)
            | StatementKind::DeclareConsts(_)
            | StatementKind::DeclareFunction(_) => continue,
        };
        return Err(settings.unsupported(construct, item.span));
    }
    Ok(())
}

fn select_entry<'a>(
    settings: &GlslSettings,
    items: &'a [Statement],
) -> Result<(&'a FunctionDeclaration, Span), CodegenError> {
    let mut candidates = items.iter().filter_map(|item| match &item.kind {
        StatementKind::DeclareFunction(func) => {
            let entry = func.entry?;
            let wanted = match settings.fixed_stage {
                Some(stage) => stage == entry.stage,
                None => true,
            };
            wanted.then_some((func, item.span))
        }
        _ => None,
    });
    let stage = settings.fixed_stage;
    let (first, span) = candidates
        .next()
        .ok_or(CodegenError::MissingEntryPoint { stage })?;
    if let Some((second, _)) = candidates.next() {
        return Err(CodegenError::AmbiguousEntryPoint {
            stage,
            first: first.name.clone(),
            second: second.name.clone(),
        });
    }
    Ok((first, span))
}

struct Context<'a> {
    settings: &'a GlslSettings,
    entry: &'a FunctionDeclaration,
    stage: ShaderStage,
    structs: FxHashMap<&'a Name, &'a StructDeclaration>,
    /// Builtin interface variables, referenced by their `gl_` names.
    renames: FxHashMap<&'a Name, &'static str>,
}

impl<'a> Context<'a> {
    fn new(
        settings: &'a GlslSettings,
        entry: &'a FunctionDeclaration,
        items: &'a [Statement],
    ) -> Self {
        let stage = entry.entry.map_or(ShaderStage::Vertex, |e| e.stage);
        let mut structs = FxHashMap::default();
        let mut renames = FxHashMap::default();
        for item in items {
            match &item.kind {
                StatementKind::DeclareStruct(decl) => {
                    structs.entry(&decl.name).or_insert(decl);
                }
                StatementKind::DeclareInputs(vars) | StatementKind::DeclareOutputs(vars) => {
                    let output = matches!(item.kind, StatementKind::DeclareOutputs(_));
                    for var in vars {
                        if let InterfaceSlot::Builtin(builtin) = var.slot {
                            let name = builtin_name(builtin, stage, output, settings.vulkan);
                            renames.insert(&var.name, name);
                        }
                    }
                }
                _ => {}
            }
        }
        Context {
            settings,
            entry,
            stage,
            structs,
            renames,
        }
    }

    fn check_entry(&self, span: Span) -> Result<(), CodegenError> {
        if !self.entry.parameters.is_empty() {
            return Err(self.settings.unsupported("entry function parameters", span));
        }
        if self.entry.return_type != Type::Void {
            return Err(self.settings.unsupported("non-void entry function", span));
        }
        if self.stage == ShaderStage::Compute {
            self.settings.require("compute shader", 430, 310, span)?;
        }
        Ok(())
    }

    /// Entry functions of other stages are left out.
    fn is_emitted(&self, func: &FunctionDeclaration) -> bool {
        func.entry.is_none() || std::ptr::eq(func, self.entry)
    }

    fn render(&self, items: &'a [Statement]) -> Result<String, CodegenError> {
        let mut w = SourceWriter::new(self);
        self.header(&mut w);

        for decl in self.value_structs(items) {
            w.blank_line();
            self.struct_declaration(&mut w, decl);
        }

        let externals: Vec<&ExternalVariable> = items
            .iter()
            .filter_map(|item| match &item.kind {
                StatementKind::DeclareExternals(vars) => Some(vars),
                _ => None,
            })
            .flatten()
            .collect();
        if !externals.is_empty() {
            w.blank_line();
            self.externals(&mut w, &externals)?;
        }

        let mut first_interface = true;
        for item in items {
            let (vars, output) = match &item.kind {
                StatementKind::DeclareInputs(vars) => (vars, false),
                StatementKind::DeclareOutputs(vars) => (vars, true),
                _ => continue,
            };
            for var in vars {
                if let InterfaceSlot::Location(location) = var.slot {
                    if first_interface {
                        self.settings
                            .require("`in`/`out` variables", 130, 300, var.span)?;
                        w.blank_line();
                        first_interface = false;
                    }
                    w.line(&self.interface_variable(var, location, output));
                }
            }
        }

        let mut first_global = true;
        for item in items {
            match &item.kind {
                StatementKind::DeclareConsts(consts) => {
                    for constant in consts {
                        if std::mem::take(&mut first_global) {
                            w.blank_line();
                        }
                        let declarator = self.declarator(&constant.ty, &constant.name);
                        w.push(&format!("const {declarator} = "));
                        w.expression(&constant.value)?;
                        w.line(";");
                    }
                }
                StatementKind::DeclareVariable(_) => {
                    if std::mem::take(&mut first_global) {
                        w.blank_line();
                    }
                    w.statement(item)?;
                }
                _ => {}
            }
        }

        for func in self.ordered_functions(items) {
            w.blank_line();
            self.function(&mut w, func)?;
        }
        Ok(w.finish())
    }

    fn header(&self, w: &mut SourceWriter<'_>) {
        let number = self.settings.version.number();
        if self.settings.es && number >= 300 {
            w.line(&format!("#version {number} es"));
        } else {
            w.line(&format!("#version {number}"));
        }
        if self.settings.es && self.stage == ShaderStage::Fragment {
            w.line("precision highp float;");
            w.line("precision highp int;");
        }
        if self.stage == ShaderStage::Compute {
            let [x, y, z] = self
                .entry
                .entry
                .and_then(|e| e.workgroup)
                .unwrap_or([1, 1, 1]);
            w.blank_line();
            w.line(&format!(
                "layout(local_size_x = {x}, local_size_y = {y}, local_size_z = {z}) in;"
            ));
        }
    }

    /// Structs used as plain values, dependencies first. Structs that only
    /// describe a buffer body are written inside the block instead.
    fn value_structs(&self, items: &'a [Statement]) -> Vec<&'a StructDeclaration> {
        let mut refs = References::default();
        for item in items {
            match &item.kind {
                StatementKind::DeclareStruct(_) => {}
                StatementKind::DeclareExternals(vars) => {
                    for var in vars {
                        let body = var.ty.struct_name().and_then(|n| self.structs.get(n));
                        match body {
                            Some(&decl) => refs.visit_struct(decl),
                            None => refs.visit_type(&var.ty),
                        }
                    }
                }
                StatementKind::DeclareFunction(func) if !self.is_emitted(func) => {}
                _ => refs.visit_statement(item),
            }
        }

        let mut used = refs.structs;
        let mut i = 0;
        while let Some(&name) = used.get(i) {
            if let Some(&decl) = self.structs.get(name) {
                for field in &decl.fields {
                    if let Some(inner) = field.ty.struct_name() {
                        if !used.contains(&inner) {
                            used.push(inner);
                        }
                    }
                }
            }
            i += 1;
        }

        let mut decls: Vec<&StructDeclaration> = Vec::new();
        for item in items {
            if let StatementKind::DeclareStruct(decl) = &item.kind {
                if used.contains(&&decl.name) && !decls.iter().any(|d| d.name == decl.name) {
                    decls.push(decl);
                }
            }
        }
        let order = dependency_order(decls.len(), |i| {
            decls[i]
                .fields
                .iter()
                .filter_map(|f| f.ty.struct_name())
                .filter_map(|n| decls.iter().position(|d| &d.name == n))
                .collect()
        });
        order.into_iter().map(|i| decls[i]).collect()
    }

    fn ordered_functions(&self, items: &'a [Statement]) -> Vec<&'a FunctionDeclaration> {
        let functions: Vec<&FunctionDeclaration> = items
            .iter()
            .filter_map(|item| match &item.kind {
                StatementKind::DeclareFunction(func) if self.is_emitted(func) => Some(func),
                _ => None,
            })
            .collect();
        let calls: Vec<Vec<usize>> = functions
            .iter()
            .map(|func| {
                let mut refs = References::default();
                refs.visit_function(func);
                refs.calls
                    .iter()
                    .flat_map(|callee| {
                        functions
                            .iter()
                            .enumerate()
                            .filter(move |(_, f)| &&f.name == callee)
                            .map(|(i, _)| i)
                    })
                    .collect()
            })
            .collect();
        dependency_order(functions.len(), |i| calls[i].clone())
            .into_iter()
            .map(|i| functions[i])
            .collect()
    }

    fn struct_declaration(&self, w: &mut SourceWriter<'_>, decl: &StructDeclaration) {
        w.line(&format!("struct {} {{", decl.name));
        w.indent();
        for field in &decl.fields {
            w.line(&format!("{};", self.declarator(&field.ty, &field.name)));
        }
        w.dedent();
        w.line("};");
    }

    fn externals(
        &self,
        w: &mut SourceWriter<'_>,
        externals: &[&'a ExternalVariable],
    ) -> Result<(), CodegenError> {
        let mut taken: FxHashMap<(u32, u32), &ExternalVariable> = FxHashMap::default();
        for var in externals {
            let resource = Resource::of(var);
            let wrapped_value = resource == Resource::Value && self.settings.uses_descriptor_sets();
            let binding = if resource == Resource::Value && !wrapped_value {
                None
            } else {
                self.binding(var, &mut taken)?
            };

            match resource {
                Resource::Sampler => {
                    let layout = layout(&[binding.as_deref()]);
                    w.line(&format!(
                        "{layout}uniform {};",
                        self.declarator(&var.ty, &var.name)
                    ));
                }
                Resource::UniformBlock | Resource::StorageBlock => {
                    let (packing, keyword) = if resource == Resource::StorageBlock {
                        self.settings.require("storage buffer", 430, 310, var.span)?;
                        ("std430", "buffer")
                    } else {
                        self.settings.require("uniform block", 140, 300, var.span)?;
                        ("std140", "uniform")
                    };
                    let body = var
                        .ty
                        .struct_name()
                        .and_then(|name| self.structs.get(name))
                        .ok_or_else(|| {
                            self.settings.unsupported("buffer of undeclared struct", var.span)
                        })?;
                    let layout = layout(&[Some(packing), binding.as_deref()]);
                    w.line(&format!("{layout}{keyword} _uslBlock_{} {{", var.name));
                    w.indent();
                    for field in &body.fields {
                        w.line(&format!("{};", self.declarator(&field.ty, &field.name)));
                    }
                    w.dedent();
                    w.line(&format!("}} {}{};", var.name, array_suffix(&var.ty)));
                }
                Resource::Value if wrapped_value => {
                    self.settings.require("uniform block", 140, 300, var.span)?;
                    let layout = layout(&[Some("std140"), binding.as_deref()]);
                    w.line(&format!("{layout}uniform _uslBlock_{} {{", var.name));
                    w.indent();
                    w.line(&format!("{};", self.declarator(&var.ty, &var.name)));
                    w.dedent();
                    w.line("};");
                }
                Resource::Value => {
                    w.line(&format!("uniform {};", self.declarator(&var.ty, &var.name)));
                }
            }
        }
        Ok(())
    }

    /// Binding qualifier of `var`, checking it against those already used.
    fn binding(
        &self,
        var: &'a ExternalVariable,
        taken: &mut FxHashMap<(u32, u32), &'a ExternalVariable>,
    ) -> Result<Option<String>, CodegenError> {
        if !self.settings.has_binding_qualifier() {
            return Ok(None);
        }
        let (key, text) = if self.settings.uses_descriptor_sets() {
            (
                (var.set, var.binding),
                format!("set = {}, binding = {}", var.set, var.binding),
            )
        } else {
            let flat = var
                .set
                .saturating_mul(self.settings.bindings_per_set)
                .saturating_add(var.binding);
            ((0, flat), format!("binding = {flat}"))
        };
        if let Some(first) = taken.insert(key, var) {
            return Err(CodegenError::BindingConflict {
                first: first.name.clone(),
                second: var.name.clone(),
                binding: key.1,
                span: var.span,
                first_span: first.span,
            });
        }
        Ok(Some(text))
    }

    fn interface_variable(&self, var: &InterfaceVariable, location: u32, output: bool) -> String {
        let mut line = String::new();
        if self.settings.supports(330, 300) {
            line.push_str(&format!("layout(location = {location}) "));
        }
        let varying = match self.stage {
            ShaderStage::Vertex => output,
            ShaderStage::Fragment => !output,
            ShaderStage::Compute => false,
        };
        if varying && var.ty.component().is_some_and(PrimitiveType::is_integer) {
            line.push_str("flat ");
        }
        line.push_str(if output { "out " } else { "in " });
        line.push_str(&self.declarator(&var.ty, &var.name));
        line.push(';');
        line
    }

    fn function(
        &self,
        w: &mut SourceWriter<'_>,
        func: &FunctionDeclaration,
    ) -> Result<(), CodegenError> {
        if std::ptr::eq(func, self.entry) {
            w.push("void main() ");
        } else {
            let params: Vec<String> = func
                .parameters
                .iter()
                .map(|p| self.declarator(&p.ty, &p.name))
                .collect();
            w.push(&format!(
                "{} {}({}) ",
                func.return_type,
                func.name,
                params.join(", ")
            ));
        }
        w.block(&func.body)?;
        w.close();
        Ok(())
    }
}

impl Dialect for Context<'_> {
    fn builtin_function(
        &self,
        builtin: BuiltinFunction,
        span: Span,
    ) -> Result<&'static str, CodegenError> {
        let name = builtin.glsl_name();
        self.settings.require(
            &format!("built-in `{name}`"),
            builtin.min_glsl_version(),
            builtin.min_glsl_es_version(),
            span,
        )?;
        Ok(name)
    }

    fn variable<'n>(&'n self, name: &'n Name) -> &'n str {
        self.renames.get(name).copied().unwrap_or(&**name)
    }

    fn declarator(&self, ty: &Type, name: &str) -> String {
        format!("{} {name}{}", ty.base_name(), array_suffix(ty))
    }

    fn write_item(&self, _w: &mut SourceWriter<'_>, stmt: &Statement) -> Result<(), CodegenError> {
        let construct = match &stmt.kind {
            StatementKind::Optional { .. } => "`optional` block",
            StatementKind::Include(_) => "`include` directive",
            StatementKind::DeclareFunction(_) => "nested function",
            _ => "declaration block inside a function",
        };
        Err(self.settings.unsupported(construct, stmt.span))
    }
}

/// C-style array suffix: `[4][2]`, `[]`.
fn array_suffix(ty: &Type) -> String {
    ty.array_dims()
        .into_iter()
        .map(|dim| match dim {
            ArraySize::Fixed(n) => format!("[{n}]"),
            ArraySize::Implicit => "[]".to_owned(),
        })
        .collect()
}

fn layout(parts: &[Option<&str>]) -> String {
    let parts: Vec<&str> = parts.iter().flatten().copied().collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!("layout({}) ", parts.join(", "))
    }
}

fn builtin_name(
    builtin: BuiltinVariable,
    stage: ShaderStage,
    output: bool,
    vulkan: bool,
) -> &'static str {
    match builtin {
        BuiltinVariable::Position if stage == ShaderStage::Fragment && !output => "gl_FragCoord",
        BuiltinVariable::Position => "gl_Position",
        BuiltinVariable::FragDepth => "gl_FragDepth",
        BuiltinVariable::VertexIndex if vulkan => "gl_VertexIndex",
        BuiltinVariable::VertexIndex => "gl_VertexID",
        BuiltinVariable::InstanceIndex if vulkan => "gl_InstanceIndex",
        BuiltinVariable::InstanceIndex => "gl_InstanceID",
        BuiltinVariable::GlobalInvocationId => "gl_GlobalInvocationID",
        BuiltinVariable::LocalInvocationId => "gl_LocalInvocationID",
        BuiltinVariable::WorkgroupId => "gl_WorkGroupID",
    }
}
