use pretty_assertions::assert_eq;
use usl_ir::visitor::erase_spans;
use usl_ir::{BinaryOp, BuiltinRegistry, Expression, ExpressionKind, Statement, UnaryOp};
use usl_parse::parse_source;

use super::LangWriter;
use crate::{Backend, StringEmitter};

fn parse(source: &str) -> Statement {
    parse_source(source, &BuiltinRegistry::new()).unwrap()
}

fn render(ast: &Statement) -> String {
    LangWriter::new().render(ast).unwrap()
}

fn assert_round_trip(source: &str) {
    let mut first = parse(source);
    let text = render(&first);
    let mut second = parse(&text);
    erase_spans(&mut first);
    erase_spans(&mut second);
    assert_eq!(first, second, "rendered:\n{text}");
}

fn expr_text(expr: Expression) -> String {
    let stmt = Statement::synthetic(usl_ir::StatementKind::Expression(expr));
    render(&stmt).trim_end().trim_end_matches(';').to_owned()
}

fn var(name: &str) -> Box<Expression> {
    Box::new(Expression::synthetic(ExpressionKind::Variable(name.into())))
}

fn binary(op: BinaryOp, left: Box<Expression>, right: Box<Expression>) -> Box<Expression> {
    Box::new(Expression::synthetic(ExpressionKind::Binary { op, left, right }))
}

#[test]
fn layout() {
    let source = "
        struct Light { dir: vec3; color: vec3; }
        input { [location(0)] vec3 normal; }
        external { [binding(2)] sampler2D Tex; }
        [entry(fragment)] void main() {
            if (normal.x > 0.0) discard; else { return; }
            for (int i = 0; i < 4; i += 1) normal = normal * 2.0;
        }";
    let expected = "\
struct Light {
    dir: vec3;
    color: vec3;
}

input {
    [location(0)] vec3 normal;
}

external {
    [set(0), binding(2)] sampler2D Tex;
}

[entry(fragment)]
void main() {
    if (normal.x > 0.0)
        discard;
    else {
        return;
    }
    for (int i = 0; i < 4; i += 1)
        normal = normal * 2.0;
}
";
    assert_eq!(render(&parse(source)), expected);
}

#[test]
fn round_trip_declarations() {
    assert_round_trip(
        "
        struct Inner { v: vec4; }
        struct Outer { inner: Inner; items: float[4]; grid: int[2][3]; }
        input { [location(0)] vec2 uv; [builtin(vertex_index)] int vid; }
        output { [builtin(position)] vec4 pos; [location(1)] vec3 color; }
        external {
            [set(1), binding(0)] Inner Params;
            [binding(3), storage] Outer Data;
            [binding(4)] samplerCube Env;
        }
        option { bool UseFog = false; int Quality; }
        const { float Pi = 3.14159; uint Mask = 255u; }
        const float Half = 0.5;
        float scratch;
        include Engine.Lighting;
        [entry(compute), workgroup(8, 4)] void cs() { }",
    );
}

#[test]
fn round_trip_statements() {
    assert_round_trip(
        "
        float helper(vec3 a, float b) {
            float x;
            const float y = b * 2.0;
            if (a.x > y) { x = 1.0; } else if (a.y > y) x = 2.0; else x = 3.0;
            while (x < 10.0) x += 1.0;
            do { x -= 0.5; } while (x > 5.0);
            for (;;) { break; }
            for (x = 0.0; x < 1.0;) { continue; }
            { float inner = x; }
            optional (UseFog) { x = 0.0; } else optional (Cheap) { x = 1.0; } else { x = 2.0; }
            return x > 0.0 ? x : -x;
        }",
    );
}

#[test]
fn round_trip_expressions() {
    assert_round_trip(
        "
        void f() {
            float a = (1.0 + 2.0) * 3.0 - (4.0 - 5.0);
            float b = -(-a) + !(!true ? 1.0 : 2.0);
            int c = ~1 << 2 & 3 | 4 ^ 5 % 6;
            vec4 v = vec4(a, b, float(c), 1.0).zyxw;
            vec3 col = v.rgb;
            float d = a = b = 2.0;
            bool e = a < b && (b < 1.0 || a >= 2.0) == false;
            float g = dot(col, normalize(vec3(1.0)));
            float h = (a > b ? a : b) > 1.0 ? max(a, b) : sample(Tex, vec2(0.5)).x;
            float[2] arr = float[2](1.0, 2.0);
            float k = arr[0] + arr[c - 1];
            int lowest = -2147483648 - -2147483647;
        }",
    );
}

#[test]
fn parentheses_follow_associativity() {
    let left = binary(BinaryOp::Sub, binary(BinaryOp::Sub, var("a"), var("b")), var("c"));
    assert_eq!(expr_text(*left), "a - b - c");

    let right = binary(BinaryOp::Sub, var("a"), binary(BinaryOp::Sub, var("b"), var("c")));
    assert_eq!(expr_text(*right), "a - (b - c)");

    let mixed = binary(BinaryOp::Mul, binary(BinaryOp::Add, var("a"), var("b")), var("c"));
    assert_eq!(expr_text(*mixed), "(a + b) * c");
}

#[test]
fn negative_constants_are_parenthesized() {
    let neg = Expression::constant(-1.5f32, usl_ir::Span::DUMMY);
    let sum = binary(BinaryOp::Add, var("a"), Box::new(neg.clone()));
    assert_eq!(expr_text(*sum), "a + (-1.5)");

    let double = Expression::synthetic(ExpressionKind::Unary {
        op: UnaryOp::Neg,
        operand: Box::new(neg),
    });
    assert_eq!(expr_text(double), "-(-1.5)");

    let nested = Expression::synthetic(ExpressionKind::Unary {
        op: UnaryOp::Neg,
        operand: Box::new(Expression::synthetic(ExpressionKind::Unary {
            op: UnaryOp::Neg,
            operand: var("x"),
        })),
    });
    assert_eq!(expr_text(nested), "-(-x)");
}

#[test]
fn generate_writes_to_emitter() {
    let ast = parse("[entry(vertex)] void main() { }");
    let mut out = StringEmitter::new();
    LangWriter::new().generate(&ast, &mut out).unwrap();
    assert_eq!(out.output(), "[entry(vertex)]\nvoid main() {\n}\n");
}
