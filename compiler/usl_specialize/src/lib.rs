//! Option specialization: uber-shader to concrete permutation.
//!
//! A [`Specializer`] holds option bindings. [`Specializer::process`] builds
//! a new tree from a parsed one where
//!
//! - every `optional (cond) { ... }` block is replaced by the statements of
//!   the taken branch, spliced into the enclosing list, or removed;
//! - every reference to a bound option in an ordinary expression becomes
//!   the bound literal;
//! - `option { }` declarations are dropped (see [`SpecializationConfig`]).
//!
//! The input tree is never modified. A condition that names an unbound
//! option is an error: every permutation is fully described by its option
//! set, declared defaults are only consulted when explicitly enabled.

mod error;
mod eval;

use rustc_hash::{FxHashMap, FxHashSet};
use usl_ir::visitor::{rebuild_expression, rebuild_statement, walk_statement};
use usl_ir::{
    AstCloner, ConstantValue, Expression, ExpressionKind, Name, OptionDeclaration,
    PrimitiveType, Span, Statement, StatementKind, Type, Visitor,
};

pub use error::SpecializeError;
/// Value bound to an option.
pub use usl_ir::ConstantValue as OptionValue;

use eval::OptionLookup;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecializationConfig {
    /// Fall back to `option { T name = default; }` values for unbound
    /// options.
    pub use_declared_defaults: bool,
    /// Keep `option { }` blocks in the output.
    pub keep_option_declarations: bool,
}

/// Option bindings for one permutation.
#[derive(Clone, Debug, Default)]
pub struct Specializer {
    options: FxHashMap<Name, OptionValue>,
    config: SpecializationConfig,
}

impl Specializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SpecializationConfig) -> Self {
        Specializer {
            options: FxHashMap::default(),
            config,
        }
    }

    pub fn config(&self) -> SpecializationConfig {
        self.config
    }

    /// Bind `name` to `value`, replacing an earlier binding.
    pub fn set_option(&mut self, name: impl Into<Name>, value: impl Into<OptionValue>) {
        let name = name.into();
        let value = value.into();
        tracing::trace!(option = %name, ?value, "bind option");
        self.options.insert(name, value);
    }

    pub fn option(&self, name: &str) -> Option<OptionValue> {
        self.options.get(name).copied()
    }

    /// Drop every binding.
    pub fn clear(&mut self) {
        self.options.clear();
    }

    /// Build the specialized tree for the current bindings.
    #[tracing::instrument(level = "debug", skip_all, fields(options = self.options.len()))]
    pub fn process(&self, ast: &Statement) -> Result<Statement, SpecializeError> {
        let mut collector = OptionCollector::default();
        collector.visit_statement(ast);
        let declared = collector.options;

        let mut bindings = FxHashMap::default();
        for (name, value) in &self.options {
            let value = match declared.get(name) {
                Some(decl) => coerce(decl, *value)?,
                None => *value,
            };
            bindings.insert(name.clone(), value);
        }

        let mut instance = Instance {
            bindings,
            declared,
            config: self.config,
            scopes: Vec::new(),
        };
        instance.clone_statement(ast)
    }
}

/// Convert `value` to the declared option type. An integer may bind a
/// float option.
#[expect(clippy::cast_precision_loss, reason = "GLSL converts int to float the same way")]
fn coerce(decl: &OptionDeclaration, value: OptionValue) -> Result<OptionValue, SpecializeError> {
    match (&decl.ty, value) {
        (Type::Primitive(ty), value) if *ty == value.primitive() => Ok(value),
        (Type::Primitive(PrimitiveType::Float), ConstantValue::Int(v)) => {
            Ok(ConstantValue::Float(v as f32))
        }
        _ => Err(SpecializeError::OptionTypeMismatch {
            name: decl.name.clone(),
            declared: decl.ty.clone(),
            bound: value.primitive(),
            span: decl.span,
        }),
    }
}

/// Every `option { }` entry in the tree, first declaration wins.
#[derive(Default)]
struct OptionCollector<'ast> {
    options: FxHashMap<Name, &'ast OptionDeclaration>,
}

impl<'ast> Visitor<'ast> for OptionCollector<'ast> {
    fn visit_statement(&mut self, stmt: &'ast Statement) {
        if let StatementKind::DeclareOptions(options) = &stmt.kind {
            for option in options {
                self.options.entry(option.name.clone()).or_insert(option);
            }
        }
        walk_statement(self, stmt);
    }
}

/// Cloner state for one `process` call.
struct Instance<'ast> {
    bindings: FxHashMap<Name, OptionValue>,
    declared: FxHashMap<Name, &'ast OptionDeclaration>,
    config: SpecializationConfig,
    /// Local names of the function being rebuilt, innermost last.
    scopes: Vec<FxHashSet<Name>>,
}

impl Instance<'_> {
    /// Value an option takes in this permutation, if any.
    fn value_of(&self, name: &Name) -> Result<Option<OptionValue>, SpecializeError> {
        if let Some(value) = self.bindings.get(name) {
            return Ok(Some(*value));
        }
        if !self.config.use_declared_defaults {
            return Ok(None);
        }
        let Some(decl) = self.declared.get(name) else {
            return Ok(None);
        };
        let Some(default) = &decl.default else {
            return Ok(None);
        };
        let value = eval::evaluate(default, &NoOptions)?;
        coerce(decl, value).map(Some)
    }

    fn is_local(&self, name: &Name) -> bool {
        self.scopes.iter().any(|scope| scope.contains(name))
    }

    fn declare_local(&mut self, name: &Name) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.clone());
        }
    }

    /// Rebuild `stmt` inside a fresh local scope.
    fn scoped(
        &mut self,
        names: FxHashSet<Name>,
        stmt: &Statement,
    ) -> Result<Statement, SpecializeError> {
        self.scopes.push(names);
        let result = rebuild_statement(self, stmt);
        self.scopes.pop();
        result
    }

    /// Statements of the taken branch of an `optional` block.
    fn resolve_optional(
        &mut self,
        condition: &Expression,
        body: &Statement,
        else_body: Option<&Statement>,
    ) -> Result<Vec<Statement>, SpecializeError> {
        let taken = eval::evaluate_condition(condition, &*self)?;
        tracing::debug!(taken, "resolved optional block");
        match (taken, else_body) {
            (true, _) => self.clone_statements(body.as_statements()),
            (false, Some(else_body)) => self.clone_statements(else_body.as_statements()),
            (false, None) => Ok(Vec::new()),
        }
    }
}

impl OptionLookup for Instance<'_> {
    fn lookup(&self, name: &Name, span: Span) -> Result<ConstantValue, SpecializeError> {
        self.value_of(name)?
            .ok_or_else(|| SpecializeError::UnresolvedOption {
                name: name.clone(),
                span,
            })
    }
}

/// Lookup for option defaults, which must be literal.
struct NoOptions;

impl OptionLookup for NoOptions {
    fn lookup(&self, name: &Name, span: Span) -> Result<ConstantValue, SpecializeError> {
        Err(SpecializeError::UnresolvedOption {
            name: name.clone(),
            span,
        })
    }
}

impl AstCloner for Instance<'_> {
    type Error = SpecializeError;

    fn clone_statement(&mut self, stmt: &Statement) -> Result<Statement, SpecializeError> {
        match &stmt.kind {
            // an optional in a single-statement position becomes a block
            StatementKind::Optional { .. } => {
                let statements = self.clone_statements(std::slice::from_ref(stmt))?;
                Ok(Statement::sequence(statements, stmt.span))
            }
            StatementKind::DeclareFunction(func) => {
                let params = func.parameters.iter().map(|p| p.name.clone()).collect();
                self.scoped(params, stmt)
            }
            StatementKind::Sequence(_) | StatementKind::For { .. } if !self.scopes.is_empty() => {
                self.scoped(FxHashSet::default(), stmt)
            }
            StatementKind::DeclareVariable(decl) => {
                let rebuilt = rebuild_statement(self, stmt)?;
                self.declare_local(&decl.name);
                Ok(rebuilt)
            }
            _ => rebuild_statement(self, stmt),
        }
    }

    fn clone_statements(&mut self, stmts: &[Statement]) -> Result<Vec<Statement>, SpecializeError> {
        let mut out = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            match &stmt.kind {
                StatementKind::Optional {
                    condition,
                    body,
                    else_body,
                } => out.extend(self.resolve_optional(condition, body, else_body.as_deref())?),
                StatementKind::DeclareOptions(_) if !self.config.keep_option_declarations => {}
                _ => out.push(self.clone_statement(stmt)?),
            }
        }
        Ok(out)
    }

    fn clone_expression(&mut self, expr: &Expression) -> Result<Expression, SpecializeError> {
        if let ExpressionKind::Variable(name) = &expr.kind {
            if !self.is_local(name) {
                if let Some(value) = self.value_of(name)? {
                    return Ok(Expression::constant(value, expr.span));
                }
            }
        }
        rebuild_expression(self, expr)
    }
}
