//! Declaration arena.
//!
//! One vector per declaration kind, addressed by [`DeclarationKey`].
//! Block declarations (`input { }`, `external { }`, ...) are indexed per
//! entry so that unused entries can be dropped individually.

use rustc_hash::{FxHashMap, FxHashSet};
use usl_ir::{EntryPoint, Name, Span, Statement, StatementKind, Visitor};

use crate::dependency::{DependencyCollector, DependencyData};
use crate::ReflectError;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum DeclarationKey {
    Function(usize),
    Struct(usize),
    Global(usize),
    Input(usize),
    Output(usize),
    External(usize),
    Const(usize),
    Option(usize),
}

/// One indexed declaration.
#[derive(Clone, Debug)]
pub struct Declaration {
    pub name: Name,
    /// Position of the owning top-level statement.
    pub item: usize,
    /// Position inside a block declaration.
    pub entry: Option<usize>,
    pub span: Span,
    pub deps: DependencyData,
}

#[derive(Clone, Debug, Default)]
pub struct DeclarationIndex {
    pub functions: Vec<Declaration>,
    pub structs: Vec<Declaration>,
    pub globals: Vec<Declaration>,
    pub inputs: Vec<Declaration>,
    pub outputs: Vec<Declaration>,
    pub externals: Vec<Declaration>,
    pub consts: Vec<Declaration>,
    pub options: Vec<Declaration>,
    /// `(function, entry point)` for every entry function.
    pub entry_points: Vec<(usize, EntryPoint)>,
    /// Items kept in every stage (unresolved includes).
    pub passthrough: Vec<usize>,
    functions_by_name: FxHashMap<Name, Vec<usize>>,
    structs_by_name: FxHashMap<Name, Vec<usize>>,
    values_by_name: FxHashMap<Name, Vec<DeclarationKey>>,
}

impl DeclarationIndex {
    /// Index the flattened top-level `items`.
    pub fn build(items: &[Statement]) -> Result<Self, ReflectError> {
        let mut index = DeclarationIndex::default();
        for (item, stmt) in items.iter().enumerate() {
            index.register(item, stmt)?;
        }

        let external_names: FxHashSet<Name> =
            index.externals.iter().map(|d| d.name.clone()).collect();
        for key in index.keys().collect::<Vec<_>>() {
            let deps = collect(&items[index.get(key).item], index.get(key).entry, &external_names);
            index.get_mut(key).deps = deps;
        }

        tracing::debug!(
            functions = index.functions.len(),
            structs = index.structs.len(),
            externals = index.externals.len(),
            "indexed declarations"
        );
        Ok(index)
    }

    fn register(&mut self, item: usize, stmt: &Statement) -> Result<(), ReflectError> {
        let decl = |name: &Name, entry: Option<usize>, span: Span| Declaration {
            name: name.clone(),
            item,
            entry,
            span,
            deps: DependencyData::default(),
        };

        match &stmt.kind {
            StatementKind::DeclareFunction(func) => {
                let id = self.functions.len();
                if let Some(entry) = func.entry {
                    self.entry_points.push((id, entry));
                }
                self.functions_by_name.entry(func.name.clone()).or_default().push(id);
                self.functions.push(decl(&func.name, None, stmt.span));
            }
            StatementKind::DeclareStruct(decl_struct) => {
                let id = self.structs.len();
                self.structs_by_name.entry(decl_struct.name.clone()).or_default().push(id);
                self.structs.push(decl(&decl_struct.name, None, stmt.span));
            }
            StatementKind::DeclareVariable(var) => {
                let key = DeclarationKey::Global(self.globals.len());
                self.add_value(&var.name, key);
                self.globals.push(decl(&var.name, None, stmt.span));
            }
            StatementKind::DeclareInputs(vars) => {
                for (i, var) in vars.iter().enumerate() {
                    let key = DeclarationKey::Input(self.inputs.len());
                    self.add_value(&var.name, key);
                    self.inputs.push(decl(&var.name, Some(i), var.span));
                }
            }
            StatementKind::DeclareOutputs(vars) => {
                for (i, var) in vars.iter().enumerate() {
                    let key = DeclarationKey::Output(self.outputs.len());
                    self.add_value(&var.name, key);
                    self.outputs.push(decl(&var.name, Some(i), var.span));
                }
            }
            StatementKind::DeclareExternals(vars) => {
                for (i, var) in vars.iter().enumerate() {
                    let key = DeclarationKey::External(self.externals.len());
                    self.add_value(&var.name, key);
                    self.externals.push(decl(&var.name, Some(i), var.span));
                }
            }
            StatementKind::DeclareConsts(consts) => {
                for (i, constant) in consts.iter().enumerate() {
                    let key = DeclarationKey::Const(self.consts.len());
                    self.add_value(&constant.name, key);
                    self.consts.push(decl(&constant.name, Some(i), constant.span));
                }
            }
            StatementKind::DeclareOptions(options) => {
                for (i, option) in options.iter().enumerate() {
                    let key = DeclarationKey::Option(self.options.len());
                    self.add_value(&option.name, key);
                    self.options.push(decl(&option.name, Some(i), option.span));
                }
            }
            StatementKind::Include(_) => self.passthrough.push(item),
            StatementKind::Optional { .. } => {
                return Err(ReflectError::UnspecializedOptional { span: stmt.span });
            }
            // the parser produces nothing else at file level
            StatementKind::Branch { .. }
            | StatementKind::For { .. }
            | StatementKind::While { .. }
            | StatementKind::DoWhile { .. }
            | StatementKind::Expression(_)
            | StatementKind::Break
            | StatementKind::Continue
            | StatementKind::Return(_)
            | StatementKind::Discard
            | StatementKind::Sequence(_) => {
                tracing::debug!(tag = ?stmt.tag(), "ignoring statement at file level");
            }
        }
        Ok(())
    }

    fn add_value(&mut self, name: &Name, key: DeclarationKey) {
        self.values_by_name.entry(name.clone()).or_default().push(key);
    }

    /// Every key, in kind order then declaration order.
    pub fn keys(&self) -> impl Iterator<Item = DeclarationKey> + '_ {
        let kind = |len: usize, make: fn(usize) -> DeclarationKey| (0..len).map(make);
        kind(self.functions.len(), DeclarationKey::Function)
            .chain(kind(self.structs.len(), DeclarationKey::Struct))
            .chain(kind(self.globals.len(), DeclarationKey::Global))
            .chain(kind(self.inputs.len(), DeclarationKey::Input))
            .chain(kind(self.outputs.len(), DeclarationKey::Output))
            .chain(kind(self.externals.len(), DeclarationKey::External))
            .chain(kind(self.consts.len(), DeclarationKey::Const))
            .chain(kind(self.options.len(), DeclarationKey::Option))
    }

    fn table(&self, key: DeclarationKey) -> (&[Declaration], usize) {
        match key {
            DeclarationKey::Function(i) => (&self.functions, i),
            DeclarationKey::Struct(i) => (&self.structs, i),
            DeclarationKey::Global(i) => (&self.globals, i),
            DeclarationKey::Input(i) => (&self.inputs, i),
            DeclarationKey::Output(i) => (&self.outputs, i),
            DeclarationKey::External(i) => (&self.externals, i),
            DeclarationKey::Const(i) => (&self.consts, i),
            DeclarationKey::Option(i) => (&self.options, i),
        }
    }

    /// # Panics
    /// Keys only come from this index, so they are always in range.
    pub fn get(&self, key: DeclarationKey) -> &Declaration {
        let (table, i) = self.table(key);
        &table[i]
    }

    fn get_mut(&mut self, key: DeclarationKey) -> &mut Declaration {
        let (table, i) = match key {
            DeclarationKey::Function(i) => (&mut self.functions, i),
            DeclarationKey::Struct(i) => (&mut self.structs, i),
            DeclarationKey::Global(i) => (&mut self.globals, i),
            DeclarationKey::Input(i) => (&mut self.inputs, i),
            DeclarationKey::Output(i) => (&mut self.outputs, i),
            DeclarationKey::External(i) => (&mut self.externals, i),
            DeclarationKey::Const(i) => (&mut self.consts, i),
            DeclarationKey::Option(i) => (&mut self.options, i),
        };
        &mut table[i]
    }

    pub fn functions_named(&self, name: &str) -> &[usize] {
        self.functions_by_name.get(name).map_or(&[], Vec::as_slice)
    }

    pub fn structs_named(&self, name: &str) -> &[usize] {
        self.structs_by_name.get(name).map_or(&[], Vec::as_slice)
    }

    pub fn values_named(&self, name: &str) -> &[DeclarationKey] {
        self.values_by_name.get(name).map_or(&[], Vec::as_slice)
    }
}

/// Dependencies of one declaration (one entry for blocks).
fn collect(stmt: &Statement, entry: Option<usize>, externals: &FxHashSet<Name>) -> DependencyData {
    let mut collector = DependencyCollector::new(externals);
    match (&stmt.kind, entry) {
        (StatementKind::DeclareInputs(vars) | StatementKind::DeclareOutputs(vars), Some(i)) => {
            if let Some(var) = vars.get(i) {
                collector.collect_type(&var.ty, var.span);
            }
        }
        (StatementKind::DeclareExternals(vars), Some(i)) => {
            if let Some(var) = vars.get(i) {
                collector.collect_type(&var.ty, var.span);
            }
        }
        (StatementKind::DeclareConsts(consts), Some(i)) => {
            if let Some(constant) = consts.get(i) {
                collector.collect_type(&constant.ty, constant.span);
                collector.collect_expression(&constant.value);
            }
        }
        (StatementKind::DeclareOptions(options), Some(i)) => {
            if let Some(option) = options.get(i) {
                collector.collect_type(&option.ty, option.span);
                if let Some(default) = &option.default {
                    collector.collect_expression(default);
                }
            }
        }
        _ => collector.visit_statement(stmt),
    }
    collector.finish()
}
