//! What a declaration refers to.

use rustc_hash::{FxHashMap, FxHashSet};
use usl_ir::visitor::{walk_expression, walk_statement};
use usl_ir::{
    Expression, ExpressionKind, FunctionDeclaration, Name, Span, Statement, StatementKind, Type,
    VariableDeclaration, Visitor,
};

/// Names one declaration references directly, with the span of the first
/// use of each.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DependencyData {
    pub functions: FxHashMap<Name, Span>,
    pub structs: FxHashMap<Name, Span>,
    /// Globals, inputs, outputs, consts and options.
    pub variables: FxHashMap<Name, Span>,
    pub externals: FxHashMap<Name, Span>,
}

impl DependencyData {
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
            && self.structs.is_empty()
            && self.variables.is_empty()
            && self.externals.is_empty()
    }

    /// Every referenced name regardless of category.
    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.functions
            .keys()
            .chain(self.structs.keys())
            .chain(self.variables.keys())
            .chain(self.externals.keys())
    }
}

/// Collects `DependencyData` while tracking local scopes, so parameters
/// and locals never count as references to globals.
pub struct DependencyCollector<'a> {
    data: DependencyData,
    scopes: Vec<FxHashSet<Name>>,
    externals: &'a FxHashSet<Name>,
    /// Span used for type references, which carry none of their own.
    type_span: Span,
}

impl<'a> DependencyCollector<'a> {
    /// `externals` are the names declared in `external { }` blocks.
    pub fn new(externals: &'a FxHashSet<Name>) -> Self {
        DependencyCollector {
            data: DependencyData::default(),
            scopes: Vec::new(),
            externals,
            type_span: Span::DUMMY,
        }
    }

    pub fn finish(self) -> DependencyData {
        self.data
    }

    /// References of a type written at `span`.
    pub fn collect_type(&mut self, ty: &Type, span: Span) {
        self.type_span = span;
        self.visit_type(ty);
    }

    pub fn collect_expression(&mut self, expr: &Expression) {
        self.visit_expression(expr);
    }

    fn is_local(&self, name: &Name) -> bool {
        self.scopes.iter().any(|scope| scope.contains(name))
    }

    fn declare_local(&mut self, name: &Name) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.clone());
        }
    }

    fn scoped(&mut self, names: FxHashSet<Name>, f: impl FnOnce(&mut Self)) {
        self.scopes.push(names);
        f(self);
        self.scopes.pop();
    }
}

impl<'ast> Visitor<'ast> for DependencyCollector<'_> {
    fn visit_statement(&mut self, stmt: &'ast Statement) {
        self.type_span = stmt.span;
        match &stmt.kind {
            StatementKind::Sequence(_) | StatementKind::For { .. } if !self.scopes.is_empty() => {
                self.scoped(FxHashSet::default(), |this| walk_statement(this, stmt));
            }
            _ => walk_statement(self, stmt),
        }
    }

    fn visit_function(&mut self, func: &'ast FunctionDeclaration) {
        for param in &func.parameters {
            self.collect_type(&param.ty, param.span);
        }
        self.visit_type(&func.return_type);
        let params = func.parameters.iter().map(|p| p.name.clone()).collect();
        self.scoped(params, |this| {
            for stmt in &func.body {
                this.visit_statement(stmt);
            }
        });
    }

    fn visit_variable_declaration(&mut self, decl: &'ast VariableDeclaration) {
        self.visit_type(&decl.ty);
        if let Some(init) = &decl.initializer {
            self.visit_expression(init);
        }
        self.declare_local(&decl.name);
    }

    fn visit_expression(&mut self, expr: &'ast Expression) {
        match &expr.kind {
            ExpressionKind::Variable(name) if !self.is_local(name) => {
                let category = if self.externals.contains(name) {
                    &mut self.data.externals
                } else {
                    &mut self.data.variables
                };
                category.entry(name.clone()).or_insert(expr.span);
            }
            ExpressionKind::CallFunction { name, .. } => {
                self.data.functions.entry(name.clone()).or_insert(expr.span);
            }
            ExpressionKind::Cast { .. } => self.type_span = expr.span,
            _ => {}
        }
        walk_expression(self, expr);
    }

    fn visit_type(&mut self, ty: &'ast Type) {
        if let Some(name) = ty.struct_name() {
            self.data
                .structs
                .entry(name.clone())
                .or_insert(self.type_span);
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
