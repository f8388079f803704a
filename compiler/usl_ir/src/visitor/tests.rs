use pretty_assertions::assert_eq;

use super::*;
use crate::ast::{BinaryOp, ConstantValue, EntryPoint, Statement, StatementKind};
use crate::{Name, ShaderStage, Span};

fn var(name: &str, at: u32) -> Expression {
    Expression::variable(name, Span::new(at, at + 1))
}

fn binary(op: BinaryOp, left: Expression, right: Expression) -> Expression {
    let span = left.span.merge(right.span);
    Expression::new(
        ExpressionKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}

/// `void main() { if (a < b) discard; x = a; }`
fn sample_tree() -> Statement {
    let branch = Statement::new(
        StatementKind::Branch {
            branches: vec![crate::ast::ConditionalBranch {
                condition: binary(BinaryOp::Lt, var("a", 10), var("b", 14)),
                body: Statement::new(StatementKind::Discard, Span::new(17, 25)),
            }],
            else_body: None,
        },
        Span::new(6, 25),
    );
    let assign = Statement::new(
        StatementKind::Expression(Expression::new(
            ExpressionKind::Assign {
                op: crate::ast::AssignOp::Assign,
                target: Box::new(var("x", 26)),
                value: Box::new(var("a", 30)),
            },
            Span::new(26, 31),
        )),
        Span::new(26, 32),
    );
    let func = FunctionDeclaration {
        name: Name::from("main"),
        parameters: Vec::new(),
        return_type: Type::Void,
        body: vec![branch, assign],
        entry: Some(EntryPoint {
            stage: ShaderStage::Fragment,
            workgroup: None,
        }),
    };
    Statement::sequence(
        vec![Statement::new(
            StatementKind::DeclareFunction(func),
            Span::new(0, 40),
        )],
        Span::new(0, 40),
    )
}

#[derive(Default)]
struct CollectNames {
    variables: Vec<String>,
    discards: usize,
    types: usize,
}

impl<'ast> Visitor<'ast> for CollectNames {
    fn visit_statement(&mut self, stmt: &'ast Statement) {
        if let StatementKind::Discard = stmt.kind {
            self.discards += 1;
        }
        walk_statement(self, stmt);
    }

    fn visit_expression(&mut self, expr: &'ast Expression) {
        if let ExpressionKind::Variable(name) = &expr.kind {
            self.variables.push(name.to_string());
        }
        walk_expression(self, expr);
    }

    fn visit_type(&mut self, _ty: &'ast Type) {
        self.types += 1;
    }
}

#[test]
fn visitor_reaches_every_node() {
    let tree = sample_tree();
    let mut collect = CollectNames::default();
    collect.visit_statement(&tree);

    assert_eq!(collect.variables, vec!["a", "b", "x", "a"]);
    assert_eq!(collect.discards, 1);
    // return type only
    assert_eq!(collect.types, 1);
}

#[test]
fn erase_spans_resets_every_span() {
    struct SpanCheck(bool);
    impl VisitorMut for SpanCheck {
        fn visit_span(&mut self, span: &mut Span) {
            self.0 &= *span == Span::DUMMY;
        }
    }

    let mut tree = sample_tree();
    erase_spans(&mut tree);

    let mut check = SpanCheck(true);
    check.visit_statement_mut(&mut tree);
    assert!(check.0);
}

#[test]
fn deep_copy_is_structurally_equal() {
    let tree = sample_tree();
    let copy = deep_copy(&tree);
    assert_eq!(copy, tree);
}

#[test]
fn cloner_hooks_substitute_expressions() {
    struct ReplaceA;
    impl AstCloner for ReplaceA {
        type Error = String;

        fn clone_expression(&mut self, expr: &Expression) -> Result<Expression, String> {
            match &expr.kind {
                ExpressionKind::Variable(name) if name == "a" => Ok(Expression::new(
                    ExpressionKind::Constant(ConstantValue::Float(2.0)),
                    expr.span,
                )),
                ExpressionKind::Variable(name) if name == "missing" => {
                    Err(format!("{name} is not bound"))
                }
                _ => rebuild_expression(self, expr),
            }
        }
    }

    let tree = sample_tree();
    let replaced = ReplaceA.clone_statement(&tree).unwrap();

    let mut collect = CollectNames::default();
    collect.visit_statement(&replaced);
    assert_eq!(collect.variables, vec!["b", "x"]);

    let failing = Statement::synthetic(StatementKind::Expression(var("missing", 0)));
    assert_eq!(
        ReplaceA.clone_statement(&failing),
        Err("missing is not bound".to_string())
    );
}

#[test]
fn cloner_can_drop_statements_from_lists() {
    struct DropDiscards;
    impl AstCloner for DropDiscards {
        type Error = std::convert::Infallible;

        fn clone_statements(&mut self, stmts: &[Statement]) -> Result<Vec<Statement>, Self::Error> {
            let kept: Vec<Statement> = stmts
                .iter()
                .filter(|s| !matches!(s.kind, StatementKind::Discard))
                .cloned()
                .collect();
            rebuild_statements(self, &kept)
        }
    }

    let tree = Statement::sequence(
        vec![
            Statement::synthetic(StatementKind::Discard),
            Statement::synthetic(StatementKind::Break),
        ],
        Span::DUMMY,
    );
    let result = DropDiscards.clone_statement(&tree).unwrap();
    assert_eq!(
        result.kind,
        StatementKind::Sequence(vec![Statement::synthetic(StatementKind::Break)])
    );
}
