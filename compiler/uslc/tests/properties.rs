// Test code uses unwrap for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Pipeline-wide properties: round trip, determinism, closure,
//! reflection completeness and option totality.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use usl_codegen::LangWriter;
use usl_ir::visitor::erase_spans;
use usl_ir::{
    BinaryOp, BuiltinFunction, ConstantValue, Expression, ExpressionKind, FunctionDeclaration,
    Name, Span, Statement, StatementKind, Type, UnaryOp,
};
use usl_parse::parse_source;
use uslc::{GlslSettings, OptionValue, ShaderCompiler, ShaderStage};

fn leaf() -> impl Strategy<Value = Expression> {
    prop_oneof![
        prop::sample::select(vec!["a", "b", "c"]).prop_map(|n| Expression::variable(n, Span::DUMMY)),
        (0i32..1000).prop_map(|v| Expression::constant(ConstantValue::Int(v), Span::DUMMY)),
        (0u32..1000).prop_map(|v| Expression::constant(ConstantValue::UInt(v), Span::DUMMY)),
        prop::sample::select(vec![0.5f32, 1.0, 2.25, 1.0e-3, 100.0])
            .prop_map(|v| Expression::constant(ConstantValue::Float(v), Span::DUMMY)),
        any::<bool>().prop_map(|v| Expression::constant(ConstantValue::Bool(v), Span::DUMMY)),
    ]
}

const BINARY_OPS: [BinaryOp; 18] = [
    BinaryOp::Add,
    BinaryOp::Sub,
    BinaryOp::Mul,
    BinaryOp::Div,
    BinaryOp::Rem,
    BinaryOp::Eq,
    BinaryOp::NotEq,
    BinaryOp::Lt,
    BinaryOp::LtEq,
    BinaryOp::Gt,
    BinaryOp::GtEq,
    BinaryOp::And,
    BinaryOp::Or,
    BinaryOp::BitAnd,
    BinaryOp::BitOr,
    BinaryOp::BitXor,
    BinaryOp::Shl,
    BinaryOp::Shr,
];

fn expression() -> impl Strategy<Value = Expression> {
    leaf().prop_recursive(4, 32, 3, |inner| {
        prop_oneof![
            (prop::sample::select(BINARY_OPS.to_vec()), inner.clone(), inner.clone()).prop_map(
                |(op, left, right)| Expression::synthetic(ExpressionKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            ),
            (
                prop::sample::select(vec![UnaryOp::Neg, UnaryOp::Not, UnaryOp::BitNot]),
                inner.clone()
            )
                .prop_map(|(op, operand)| Expression::synthetic(ExpressionKind::Unary {
                    op,
                    operand: Box::new(operand),
                })),
            (inner.clone(), inner.clone(), inner.clone()).prop_map(|(c, t, e)| {
                Expression::synthetic(ExpressionKind::Ternary {
                    condition: Box::new(c),
                    then_expr: Box::new(t),
                    else_expr: Box::new(e),
                })
            }),
            (inner.clone(), inner.clone()).prop_map(|(base, index)| {
                Expression::synthetic(ExpressionKind::AccessIndex {
                    base: Box::new(base),
                    index: Box::new(index),
                })
            }),
            (inner.clone(), inner).prop_map(|(x, y)| {
                Expression::synthetic(ExpressionKind::CallBuiltin {
                    builtin: BuiltinFunction::Max,
                    args: vec![x, y],
                })
            }),
        ]
    })
}

/// `void f() { x = <expr>; }` as a file.
fn wrap(expr: Expression) -> Statement {
    let assign = Expression::synthetic(ExpressionKind::Assign {
        op: usl_ir::AssignOp::Assign,
        target: Box::new(Expression::variable("x", Span::DUMMY)),
        value: Box::new(expr),
    });
    let function = FunctionDeclaration {
        name: Name::from("f"),
        parameters: Vec::new(),
        return_type: Type::Void,
        body: vec![Statement::synthetic(StatementKind::Expression(assign))],
        entry: None,
    };
    Statement::sequence(
        vec![Statement::synthetic(StatementKind::DeclareFunction(function))],
        Span::DUMMY,
    )
}

proptest! {
    #[test]
    fn expressions_round_trip(expr in expression()) {
        let mut ast = wrap(expr);
        let text = LangWriter::new().render(&ast).unwrap();
        let mut reparsed = parse_source(&text, &usl_ir::BuiltinRegistry::new()).unwrap();
        erase_spans(&mut ast);
        erase_spans(&mut reparsed);
        prop_assert_eq!(ast, reparsed, "rendered:\n{}", text);
    }
}

const MATERIAL: &str = "
    option { bool Shadows = false; int Taps = 4; bool Wobble = false; }
    struct Light { dir: vec3; color: vec3; }
    struct Unused { v: vec4; }
    input { [location(0)] vec3 normal; [location(1)] vec2 uv; }
    output { [location(0)] vec4 color; [builtin(position)] vec4 pos; }
    external {
        [set(0), binding(0)] sampler2D Albedo;
        [set(0), binding(1)] sampler2D ShadowMap;
        [set(1), binding(0)] Light light;
        [set(2), binding(0)] sampler2D Never;
    }
    float shade(vec3 n, Light l) { return max(dot(n, l.dir), 0.0); }
    float shadow() {
        float sum = 0.0;
        for (int i = 0; i < Taps; i += 1) { sum += sample(ShadowMap, uv).r; }
        return sum / float(Taps);
    }
    [entry(vertex)] void vs() {
        pos = vec4(normal, 1.0);
        optional (Wobble) { pos.x = pos.x + 0.1; }
    }
    [entry(fragment)] void fs() {
        vec4 base = sample(Albedo, uv);
        float lit = shade(normal, light);
        optional (Shadows) { lit = lit * shadow(); }
        color = base * lit;
    }";

fn material_options(shadows: bool, wobble: bool) -> [(&'static str, OptionValue); 3] {
    [
        ("Shadows", OptionValue::Bool(shadows)),
        ("Taps", OptionValue::Int(8)),
        ("Wobble", OptionValue::Bool(wobble)),
    ]
}

#[test]
fn generation_is_deterministic() {
    let compile = || {
        let mut instance = ShaderCompiler::default()
            .parse(MATERIAL)
            .unwrap()
            .create_instance(material_options(true, false))
            .unwrap();
        (
            instance.generate_lang().unwrap(),
            instance
                .generate_glsl(ShaderStage::Fragment, &GlslSettings::vulkan())
                .unwrap(),
            instance
                .generate_glsl(ShaderStage::Vertex, &GlslSettings::default())
                .unwrap(),
        )
    };
    assert_eq!(compile(), compile());
}

#[test]
fn extraction_is_closed() {
    let uber = ShaderCompiler::default().parse(MATERIAL).unwrap();
    for (shadows, wobble) in [(false, false), (true, false), (false, true), (true, true)] {
        let mut instance = uber
            .create_instance(material_options(shadows, wobble))
            .unwrap();
        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            let mut once = instance.extract_stage(stage).unwrap();
            // A closed slice resolves on its own and extracts to itself.
            let mut twice = usl_reflect::extract_stage(&once, stage).unwrap().ast;
            erase_spans(&mut once);
            erase_spans(&mut twice);
            assert_eq!(once, twice);
        }
    }
}

#[test]
fn dead_declarations_are_dropped() {
    let mut instance = ShaderCompiler::default()
        .parse(MATERIAL)
        .unwrap()
        .create_instance(material_options(false, false))
        .unwrap();
    let text = uslc_lang(&instance.extract_stage(ShaderStage::Fragment).unwrap());
    assert!(!text.contains("Unused"));
    assert!(!text.contains("Never"));
    assert!(!text.contains("shadow()"));
    assert!(!text.contains("ShadowMap"));

    let text = uslc_lang(&instance.extract_stage(ShaderStage::Vertex).unwrap());
    assert!(!text.contains("Albedo"));
    assert!(!text.contains("struct Light"));
}

fn uslc_lang(ast: &Statement) -> String {
    LangWriter::new().render(ast).unwrap()
}

#[test]
fn reflection_matches_surviving_declarations() {
    let uber = ShaderCompiler::default().parse(MATERIAL).unwrap();
    let mut instance = uber.create_instance(material_options(true, true)).unwrap();
    for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
        let ast = instance.extract_stage(stage).unwrap();
        let (mut inputs, mut outputs, mut externals) = (Vec::new(), Vec::new(), Vec::new());
        for item in ast.as_statements() {
            match &item.kind {
                StatementKind::DeclareInputs(vars) => {
                    inputs.extend(vars.iter().map(|v| v.name.to_string()));
                }
                StatementKind::DeclareOutputs(vars) => {
                    outputs.extend(vars.iter().map(|v| v.name.to_string()));
                }
                StatementKind::DeclareExternals(vars) => {
                    externals.extend(vars.iter().map(|v| v.name.to_string()));
                }
                _ => {}
            }
        }
        let reflection = instance.reflection(stage).unwrap();
        let names = |infos: Vec<String>| {
            let mut infos = infos;
            infos.sort();
            infos
        };
        assert_eq!(
            names(reflection.inputs().iter().map(|i| i.name.to_string()).collect()),
            names(inputs)
        );
        assert_eq!(
            names(reflection.outputs().iter().map(|o| o.name.to_string()).collect()),
            names(outputs)
        );
        assert_eq!(
            names(reflection.externals().iter().map(|e| e.name.to_string()).collect()),
            names(externals)
        );
    }
}

#[test]
fn options_outside_a_stage_do_not_change_it() {
    let uber = ShaderCompiler::default().parse(MATERIAL).unwrap();
    // `Wobble` only guards vertex code.
    let mut a = uber.create_instance(material_options(true, false)).unwrap();
    let mut b = uber.create_instance(material_options(true, true)).unwrap();
    let mut fa = a.extract_stage(ShaderStage::Fragment).unwrap();
    let mut fb = b.extract_stage(ShaderStage::Fragment).unwrap();
    erase_spans(&mut fa);
    erase_spans(&mut fb);
    assert_eq!(fa, fb);

    let mut va = a.extract_stage(ShaderStage::Vertex).unwrap();
    let mut vb = b.extract_stage(ShaderStage::Vertex).unwrap();
    erase_spans(&mut va);
    erase_spans(&mut vb);
    assert_ne!(va, vb);
}
