//! Per-stage extraction.
//!
//! Loading indexes every top-level declaration of a specialized tree.
//! Extracting a stage walks the dependency graph from that stage's entry
//! function, drops every declaration the walk never reaches, and fills an
//! [`AstReflection`] with what survives.

use rustc_hash::{FxHashMap, FxHashSet};
use usl_ir::visitor::deep_copy;
use usl_ir::{Name, ShaderStage, Span, Statement, StatementKind};

use crate::index::{DeclarationIndex, DeclarationKey};
use crate::{AstReflection, ReflectError};

/// Result of [`StageExtractor::extract`]. Owns its tree; the loaded
/// source may be dropped afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractedStage {
    pub stage: ShaderStage,
    pub ast: Statement,
    pub reflection: AstReflection,
}

#[derive(Debug, Default)]
pub struct StageExtractor {
    items: Vec<Statement>,
    index: DeclarationIndex,
    span: Span,
}

impl StageExtractor {
    pub fn new() -> Self {
        StageExtractor::default()
    }

    /// Index `ast` for extraction, replacing anything loaded before.
    pub fn load(&mut self, ast: Statement) -> Result<(), ReflectError> {
        self.clear();
        self.span = ast.span;
        flatten(ast, &mut self.items);
        self.index = DeclarationIndex::build(&self.items)?;
        Ok(())
    }

    /// Stages that have an entry function, in pipeline order.
    pub fn stages(&self) -> Vec<ShaderStage> {
        let mut stages: Vec<_> = self
            .index
            .entry_points
            .iter()
            .map(|(_, entry)| entry.stage)
            .collect();
        stages.sort_unstable();
        stages.dedup();
        stages
    }

    pub fn index(&self) -> &DeclarationIndex {
        &self.index
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index = DeclarationIndex::default();
        self.span = Span::DUMMY;
    }

    #[tracing::instrument(level = "debug", skip(self), fields(stage = %stage))]
    pub fn extract(&self, stage: ShaderStage) -> Result<ExtractedStage, ReflectError> {
        let entry = self.entry_function(stage)?;
        let included = self.closure(entry)?;
        tracing::debug!(declarations = included.len(), "closure complete");

        let mut reflection = AstReflection::new();
        let mut by_item: FxHashMap<usize, FxHashSet<usize>> = FxHashMap::default();
        for &key in &included {
            let decl = self.index.get(key);
            let entries = by_item.entry(decl.item).or_default();
            if let Some(entry) = decl.entry {
                entries.insert(entry);
            }
        }

        let mut output = Vec::new();
        for (i, item) in self.items.iter().enumerate() {
            if self.index.passthrough.contains(&i) {
                output.push(deep_copy(item));
                continue;
            }
            let Some(entries) = by_item.get(&i) else {
                continue;
            };
            if let Some(stmt) = self.emit(item, entries, &mut reflection)? {
                output.push(stmt);
            }
        }

        let func = &self.index.functions[entry];
        if let Some((_, point)) = self.index.entry_points.iter().find(|(id, _)| *id == entry) {
            reflection.set_entry_point(&func.name, *point);
        }

        Ok(ExtractedStage {
            stage,
            ast: Statement::sequence(output, self.span),
            reflection,
        })
    }

    fn entry_function(&self, stage: ShaderStage) -> Result<usize, ReflectError> {
        let mut candidates = self
            .index
            .entry_points
            .iter()
            .filter(|(_, entry)| entry.stage == stage)
            .map(|&(id, _)| id);
        let first = candidates.next().ok_or(ReflectError::StageNotFound { stage })?;
        if let Some(second) = candidates.next() {
            let first = &self.index.functions[first];
            let second = &self.index.functions[second];
            return Err(ReflectError::DuplicateEntryPoint {
                stage,
                first: first.name.clone(),
                second: second.name.clone(),
                span: second.span,
                first_span: first.span,
            });
        }
        Ok(first)
    }

    /// Every declaration reachable from function `entry`.
    fn closure(&self, entry: usize) -> Result<FxHashSet<DeclarationKey>, ReflectError> {
        let mut included = FxHashSet::default();
        let mut worklist = vec![DeclarationKey::Function(entry)];
        included.insert(DeclarationKey::Function(entry));

        while let Some(key) = worklist.pop() {
            let deps = &self.index.get(key).deps;
            let mut found = Vec::new();

            for (name, span) in in_source_order(&deps.functions) {
                let ids = self.index.functions_named(name);
                if ids.is_empty() {
                    return Err(ReflectError::UndefinedFunction {
                        name: name.clone(),
                        span,
                    });
                }
                found.extend(ids.iter().map(|&id| DeclarationKey::Function(id)));
            }
            for (name, span) in in_source_order(&deps.structs) {
                let ids = self.index.structs_named(name);
                if ids.is_empty() {
                    return Err(undefined(name, span));
                }
                found.extend(ids.iter().map(|&id| DeclarationKey::Struct(id)));
            }
            let values = in_source_order(&deps.variables)
                .into_iter()
                .chain(in_source_order(&deps.externals));
            for (name, span) in values {
                let keys = self.index.values_named(name);
                if keys.is_empty() {
                    return Err(undefined(name, span));
                }
                found.extend_from_slice(keys);
            }

            for key in found {
                if included.insert(key) {
                    tracing::trace!(name = %self.index.get(key).name, "reached");
                    worklist.push(key);
                }
            }
        }
        Ok(included)
    }

    /// Copy of `item` restricted to its reachable entries, registering
    /// everything copied in `reflection`.
    fn emit(
        &self,
        item: &Statement,
        entries: &FxHashSet<usize>,
        reflection: &mut AstReflection,
    ) -> Result<Option<Statement>, ReflectError> {
        let kind = match &item.kind {
            StatementKind::DeclareStruct(decl) => {
                if !reflection.add_struct(&decl.name, &decl.fields) {
                    let registered = reflection.struct_named(&decl.name);
                    if registered.is_some_and(|s| s.fields != decl.fields) {
                        return Err(ReflectError::StructRedefinition {
                            name: decl.name.clone(),
                            span: item.span,
                        });
                    }
                    return Ok(None);
                }
                return Ok(Some(deep_copy(item)));
            }
            StatementKind::DeclareInputs(vars) => {
                let vars = keep(vars, entries);
                for var in &vars {
                    reflection.add_input(var)?;
                }
                StatementKind::DeclareInputs(vars)
            }
            StatementKind::DeclareOutputs(vars) => {
                let vars = keep(vars, entries);
                for var in &vars {
                    reflection.add_output(var)?;
                }
                StatementKind::DeclareOutputs(vars)
            }
            StatementKind::DeclareExternals(vars) => {
                let vars = keep(vars, entries);
                for var in &vars {
                    reflection.add_external(var)?;
                }
                StatementKind::DeclareExternals(vars)
            }
            StatementKind::DeclareConsts(consts) => {
                StatementKind::DeclareConsts(keep(consts, entries))
            }
            StatementKind::DeclareOptions(options) => {
                StatementKind::DeclareOptions(keep(options, entries))
            }
            _ => return Ok(Some(deep_copy(item))),
        };
        // block entries hold only names, types and constant expressions,
        // so a structural clone is a full deep copy
        Ok(Some(Statement::new(kind, item.span)))
    }
}

/// Extract one stage from a specialized tree without keeping an extractor.
pub fn extract_stage(ast: &Statement, stage: ShaderStage) -> Result<ExtractedStage, ReflectError> {
    let mut extractor = StageExtractor::new();
    extractor.load(deep_copy(ast))?;
    extractor.extract(stage)
}

fn flatten(stmt: Statement, items: &mut Vec<Statement>) {
    match stmt.kind {
        StatementKind::Sequence(children) => {
            for child in children {
                flatten(child, items);
            }
        }
        _ => items.push(stmt),
    }
}

fn keep<T: Clone>(entries: &[T], included: &FxHashSet<usize>) -> Vec<T> {
    entries
        .iter()
        .enumerate()
        .filter(|(i, _)| included.contains(i))
        .map(|(_, entry)| entry.clone())
        .collect()
}

fn in_source_order(names: &FxHashMap<Name, Span>) -> Vec<(&Name, Span)> {
    let mut names: Vec<_> = names.iter().map(|(name, &span)| (name, span)).collect();
    names.sort_by_key(|&(name, span)| (span.start, name.clone()));
    names
}

fn undefined(name: &Name, span: Span) -> ReflectError {
    ReflectError::UndefinedIdentifier {
        name: name.clone(),
        span,
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
