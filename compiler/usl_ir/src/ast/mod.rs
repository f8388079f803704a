//! Abstract syntax tree.
//!
//! Two closed node families, `Expression` and `Statement`, each a struct
//! holding a `kind` enum and a `Span`. Declarations are statements: the
//! root of a parsed file is a `StatementKind::Sequence`.
//!
//! Structural equality (`PartialEq`) compares spans too; tests that need
//! position-insensitive comparison erase spans first with
//! [`crate::visitor::erase_spans`].

mod constant;
mod operators;
mod swizzle;

pub use constant::ConstantValue;
pub use operators::{AssignOp, BinaryOp, Precedence, UnaryOp};
pub use swizzle::{Swizzle, SwizzleSet};

use crate::{BuiltinFunction, BuiltinVariable, Name, ShaderStage, Span, Type};

// Expressions

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
}

impl Expression {
    pub fn new(kind: ExpressionKind, span: Span) -> Self {
        Expression { kind, span }
    }

    /// Expression without a source location.
    pub fn synthetic(kind: ExpressionKind) -> Self {
        Expression {
            kind,
            span: Span::DUMMY,
        }
    }

    pub fn constant(value: impl Into<ConstantValue>, span: Span) -> Self {
        Expression::new(ExpressionKind::Constant(value.into()), span)
    }

    pub fn variable(name: impl Into<Name>, span: Span) -> Self {
        Expression::new(ExpressionKind::Variable(name.into()), span)
    }

    pub fn tag(&self) -> ExpressionTag {
        self.kind.tag()
    }

    /// Binding strength of this expression's outermost form.
    pub fn precedence(&self) -> Precedence {
        match &self.kind {
            ExpressionKind::Assign { .. } => Precedence::Assign,
            ExpressionKind::Ternary { .. } => Precedence::Ternary,
            ExpressionKind::Binary { op, .. } => op.precedence(),
            ExpressionKind::Unary { .. } => Precedence::Unary,
            ExpressionKind::Constant(value) if value.is_negative() => Precedence::Unary,
            ExpressionKind::AccessIndex { .. }
            | ExpressionKind::AccessField { .. }
            | ExpressionKind::Swizzle { .. }
            | ExpressionKind::CallFunction { .. }
            | ExpressionKind::CallBuiltin { .. }
            | ExpressionKind::Cast { .. } => Precedence::Postfix,
            ExpressionKind::Constant(_) | ExpressionKind::Variable(_) => Precedence::Primary,
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ExpressionKind {
    Constant(ConstantValue),
    /// Reference to a local, parameter, global, input, output, external,
    /// const or option.
    Variable(Name),
    /// `base[index]`
    AccessIndex {
        base: Box<Expression>,
        index: Box<Expression>,
    },
    /// `base.field`
    AccessField {
        base: Box<Expression>,
        field: Name,
    },
    Assign {
        op: AssignOp,
        target: Box<Expression>,
        value: Box<Expression>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// Call of a user function, resolved during dependency analysis.
    CallFunction {
        name: Name,
        args: Vec<Expression>,
    },
    CallBuiltin {
        builtin: BuiltinFunction,
        args: Vec<Expression>,
    },
    /// `Type(args...)`: conversion or constructor.
    Cast {
        target: Type,
        args: Vec<Expression>,
    },
    /// `base.xyz`
    Swizzle {
        base: Box<Expression>,
        swizzle: Swizzle,
    },
    /// `condition ? then_expr : else_expr`
    Ternary {
        condition: Box<Expression>,
        then_expr: Box<Expression>,
        else_expr: Box<Expression>,
    },
}

/// Payload-free expression kind.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExpressionTag {
    Constant,
    Variable,
    AccessIndex,
    AccessField,
    Assign,
    Unary,
    Binary,
    CallFunction,
    CallBuiltin,
    Cast,
    Swizzle,
    Ternary,
}

impl ExpressionKind {
    pub fn tag(&self) -> ExpressionTag {
        match self {
            ExpressionKind::Constant(_) => ExpressionTag::Constant,
            ExpressionKind::Variable(_) => ExpressionTag::Variable,
            ExpressionKind::AccessIndex { .. } => ExpressionTag::AccessIndex,
            ExpressionKind::AccessField { .. } => ExpressionTag::AccessField,
            ExpressionKind::Assign { .. } => ExpressionTag::Assign,
            ExpressionKind::Unary { .. } => ExpressionTag::Unary,
            ExpressionKind::Binary { .. } => ExpressionTag::Binary,
            ExpressionKind::CallFunction { .. } => ExpressionTag::CallFunction,
            ExpressionKind::CallBuiltin { .. } => ExpressionTag::CallBuiltin,
            ExpressionKind::Cast { .. } => ExpressionTag::Cast,
            ExpressionKind::Swizzle { .. } => ExpressionTag::Swizzle,
            ExpressionKind::Ternary { .. } => ExpressionTag::Ternary,
        }
    }
}

// Declarations

/// `Type name = value;` inside a function body or at file scope.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableDeclaration {
    pub name: Name,
    pub ty: Type,
    pub is_const: bool,
    pub initializer: Option<Expression>,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct StructField {
    pub name: Name,
    pub ty: Type,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct StructDeclaration {
    pub name: Name,
    pub fields: Vec<StructField>,
}

/// Where an `input`/`output` variable is bound.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum InterfaceSlot {
    Location(u32),
    Builtin(BuiltinVariable),
}

impl InterfaceSlot {
    pub fn location(self) -> Option<u32> {
        match self {
            InterfaceSlot::Location(location) => Some(location),
            InterfaceSlot::Builtin(_) => None,
        }
    }
}

/// One entry of an `input { }` or `output { }` block.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct InterfaceVariable {
    pub name: Name,
    pub ty: Type,
    pub slot: InterfaceSlot,
    pub span: Span,
}

/// One entry of an `external { }` block.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ExternalVariable {
    pub name: Name,
    pub ty: Type,
    pub set: u32,
    pub binding: u32,
    /// Struct-typed external backed by a storage buffer instead of a
    /// uniform buffer.
    pub storage: bool,
    pub span: Span,
}

/// One entry of an `option { }` block.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionDeclaration {
    pub name: Name,
    pub ty: Type,
    pub default: Option<Expression>,
    pub span: Span,
}

/// One entry of a `const { }` block.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstDeclaration {
    pub name: Name,
    pub ty: Type,
    pub value: Expression,
    pub span: Span,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Parameter {
    pub name: Name,
    pub ty: Type,
    pub span: Span,
}

/// Marks a function as the root of a shader stage.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct EntryPoint {
    pub stage: ShaderStage,
    /// Compute workgroup size from `[workgroup(x, y, z)]`.
    pub workgroup: Option<[u32; 3]>,
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionDeclaration {
    pub name: Name,
    pub parameters: Vec<Parameter>,
    pub return_type: Type,
    pub body: Vec<Statement>,
    pub entry: Option<EntryPoint>,
}

impl FunctionDeclaration {
    pub fn is_entry_for(&self, stage: ShaderStage) -> bool {
        self.entry.is_some_and(|entry| entry.stage == stage)
    }
}

/// Dotted library name of an `include` directive.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct IncludePath {
    pub segments: Vec<Name>,
}

impl IncludePath {
    /// `Engine.Lighting` style spelling.
    pub fn dotted(&self) -> String {
        let parts: Vec<&str> = self.segments.iter().map(Name::as_str).collect();
        parts.join(".")
    }
}

// Statements

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
}

/// One `if`/`else if` arm.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionalBranch {
    pub condition: Expression,
    pub body: Statement,
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum StatementKind {
    /// `if (a) ... else if (b) ... else ...`; never has zero branches.
    Branch {
        branches: Vec<ConditionalBranch>,
        else_body: Option<Box<Statement>>,
    },
    For {
        init: Option<Box<Statement>>,
        condition: Option<Expression>,
        step: Option<Expression>,
        body: Box<Statement>,
    },
    While {
        condition: Expression,
        body: Box<Statement>,
    },
    DoWhile {
        body: Box<Statement>,
        condition: Expression,
    },
    DeclareVariable(VariableDeclaration),
    DeclareStruct(StructDeclaration),
    DeclareInputs(Vec<InterfaceVariable>),
    DeclareOutputs(Vec<InterfaceVariable>),
    DeclareExternals(Vec<ExternalVariable>),
    DeclareOptions(Vec<OptionDeclaration>),
    DeclareConsts(Vec<ConstDeclaration>),
    /// Plain or entry function, see `FunctionDeclaration::entry`.
    DeclareFunction(FunctionDeclaration),
    Expression(Expression),
    Break,
    Continue,
    Return(Option<Expression>),
    Discard,
    /// Ordered statements. A `{ }` block inside a function, or the file root.
    Sequence(Vec<Statement>),
    /// Block kept or dropped by the specializer.
    Optional {
        condition: Expression,
        body: Box<Statement>,
        else_body: Option<Box<Statement>>,
    },
    /// Library inclusion that was not resolved at parse time.
    Include(IncludePath),
}

/// Payload-free statement kind.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum StatementTag {
    Branch,
    For,
    While,
    DoWhile,
    VariableDeclaration,
    StructDeclaration,
    InputDeclaration,
    OutputDeclaration,
    ExternalDeclaration,
    OptionDeclaration,
    ConstDeclaration,
    FunctionDeclaration,
    EntryFunctionDeclaration,
    Expression,
    Break,
    Continue,
    Return,
    Discard,
    Sequence,
    Optional,
    Include,
}

impl Statement {
    pub fn new(kind: StatementKind, span: Span) -> Self {
        Statement { kind, span }
    }

    pub fn synthetic(kind: StatementKind) -> Self {
        Statement {
            kind,
            span: Span::DUMMY,
        }
    }

    pub fn sequence(statements: Vec<Statement>, span: Span) -> Self {
        Statement::new(StatementKind::Sequence(statements), span)
    }

    pub fn tag(&self) -> StatementTag {
        match &self.kind {
            StatementKind::Branch { .. } => StatementTag::Branch,
            StatementKind::For { .. } => StatementTag::For,
            StatementKind::While { .. } => StatementTag::While,
            StatementKind::DoWhile { .. } => StatementTag::DoWhile,
            StatementKind::DeclareVariable(_) => StatementTag::VariableDeclaration,
            StatementKind::DeclareStruct(_) => StatementTag::StructDeclaration,
            StatementKind::DeclareInputs(_) => StatementTag::InputDeclaration,
            StatementKind::DeclareOutputs(_) => StatementTag::OutputDeclaration,
            StatementKind::DeclareExternals(_) => StatementTag::ExternalDeclaration,
            StatementKind::DeclareOptions(_) => StatementTag::OptionDeclaration,
            StatementKind::DeclareConsts(_) => StatementTag::ConstDeclaration,
            StatementKind::DeclareFunction(func) if func.entry.is_some() => {
                StatementTag::EntryFunctionDeclaration
            }
            StatementKind::DeclareFunction(_) => StatementTag::FunctionDeclaration,
            StatementKind::Expression(_) => StatementTag::Expression,
            StatementKind::Break => StatementTag::Break,
            StatementKind::Continue => StatementTag::Continue,
            StatementKind::Return(_) => StatementTag::Return,
            StatementKind::Discard => StatementTag::Discard,
            StatementKind::Sequence(_) => StatementTag::Sequence,
            StatementKind::Optional { .. } => StatementTag::Optional,
            StatementKind::Include(_) => StatementTag::Include,
        }
    }

    /// Children of a sequence, or the statement itself as a one-element
    /// slice.
    pub fn as_statements(&self) -> &[Statement] {
        match &self.kind {
            StatementKind::Sequence(statements) => statements,
            _ => std::slice::from_ref(self),
        }
    }

    /// Entry functions declared at the top level of this sequence.
    pub fn entry_functions(&self) -> impl Iterator<Item = &FunctionDeclaration> {
        self.as_statements().iter().filter_map(|stmt| match &stmt.kind {
            StatementKind::DeclareFunction(func) if func.entry.is_some() => Some(func),
            _ => None,
        })
    }
}
