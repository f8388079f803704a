use pretty_assertions::assert_eq;
use usl_ir::visitor::{erase_spans, walk_statement};
use usl_ir::{
    BuiltinRegistry, ExternalVariable, ShaderStage, Statement, StatementKind, StatementTag,
    Visitor,
};
use usl_parse::parse_source;
use usl_specialize::Specializer;

use super::{extract_stage, ExtractedStage, StageExtractor};
use crate::{ExternalKind, ReflectError};

fn parse(source: &str) -> Statement {
    parse_source(source, &BuiltinRegistry::new()).unwrap()
}

fn extract(source: &str, stage: ShaderStage) -> Result<ExtractedStage, ReflectError> {
    extract_stage(&parse(source), stage)
}

/// Names of the top-level declarations, block entries expanded.
fn declared(ast: &Statement) -> Vec<String> {
    let mut names = Vec::new();
    for stmt in ast.as_statements() {
        match &stmt.kind {
            StatementKind::DeclareFunction(f) => names.push(f.name.to_string()),
            StatementKind::DeclareStruct(s) => names.push(s.name.to_string()),
            StatementKind::DeclareVariable(v) => names.push(v.name.to_string()),
            StatementKind::DeclareInputs(vars) | StatementKind::DeclareOutputs(vars) => {
                names.extend(vars.iter().map(|v| v.name.to_string()));
            }
            StatementKind::DeclareExternals(vars) => {
                names.extend(vars.iter().map(|v: &ExternalVariable| v.name.to_string()));
            }
            StatementKind::DeclareConsts(consts) => {
                names.extend(consts.iter().map(|c| c.name.to_string()));
            }
            StatementKind::DeclareOptions(options) => {
                names.extend(options.iter().map(|o| o.name.to_string()));
            }
            _ => {}
        }
    }
    names
}

const TEXTURED: &str = "
    external { [set(0), binding(0)] sampler2D Tex; }
    input { [location(0)] vec2 uv; }
    output { [location(0)] vec4 color; }
    [entry(vertex)] void vs() {
        color = vec4(uv, 0.0, 1.0);
    }
    [entry(fragment)] void fs() {
        color = sample(Tex, uv);
    }";

#[test]
fn sampler_only_in_the_stage_that_uses_it() {
    let fragment = extract(TEXTURED, ShaderStage::Fragment).unwrap();
    let names: Vec<_> = fragment
        .reflection
        .externals()
        .iter()
        .map(|e| e.name.to_string())
        .collect();
    assert_eq!(names, vec!["Tex"]);
    assert_eq!(
        fragment.reflection.external_at(0, 0).map(|e| e.kind),
        Some(ExternalKind::Sampler)
    );

    let vertex = extract(TEXTURED, ShaderStage::Vertex).unwrap();
    assert!(vertex.reflection.externals().is_empty());
    assert_eq!(declared(&vertex.ast), vec!["uv", "color", "vs"]);
}

#[test]
fn output_keeps_source_order() {
    let fragment = extract(TEXTURED, ShaderStage::Fragment).unwrap();
    assert_eq!(declared(&fragment.ast), vec!["Tex", "uv", "color", "fs"]);
    let entry = fragment.reflection.entry_point().unwrap();
    assert_eq!(entry.function, "fs");
    assert_eq!(entry.stage, ShaderStage::Fragment);
}

#[test]
fn transitive_functions_and_structs() {
    let source = "
        struct Material { albedo: vec3; }
        struct Unused { x: float; }
        float luminance(vec3 c) { return dot(c, vec3(0.3, 0.6, 0.1)); }
        vec3 tint(Material m) { return m.albedo * luminance(m.albedo); }
        void dead() { }
        output { [location(0)] vec4 color; }
        [entry(fragment)] void main() {
            color = vec4(tint(Material(vec3(1.0))), 1.0);
        }";
    let stage = extract(source, ShaderStage::Fragment).unwrap();
    assert_eq!(
        declared(&stage.ast),
        vec!["Material", "luminance", "tint", "color", "main"]
    );
    assert_eq!(stage.reflection.structs().len(), 1);
    assert!(stage.reflection.struct_named("Material").is_some());
}

#[test]
fn struct_used_only_inside_a_callee_is_kept() {
    let source = "
        struct Ray { origin: vec3; dir: vec3; }
        float measure() { Ray r; return r.origin.x; }
        [entry(compute), workgroup(8, 8)] void main() {
            float x = measure();
        }";
    let stage = extract(source, ShaderStage::Compute).unwrap();
    assert_eq!(declared(&stage.ast), vec!["Ray", "measure", "main"]);
    assert_eq!(
        stage.reflection.entry_point().and_then(|e| e.workgroup),
        Some([8, 8, 1])
    );
}

#[test]
fn reachable_duplicate_binding_fails() {
    let source = "
        external {
            [binding(1)] sampler2D A;
            [binding(1)] sampler2D B;
        }
        output { [location(0)] vec4 color; }
        [entry(fragment)] void main() { color = sample(A, vec2(0.0)) + sample(B, vec2(0.0)); }";
    let err = extract(source, ShaderStage::Fragment).unwrap_err();
    assert!(matches!(
        err,
        ReflectError::DuplicateBinding { ref name, ref other, set: 0, binding: 1, .. }
            if name == "B" && other == "A"
    ));
}

#[test]
fn unreachable_duplicate_binding_is_fine() {
    let source = "
        external {
            [binding(1)] sampler2D A;
            [binding(1)] sampler2D B;
        }
        output { [location(0)] vec4 color; }
        [entry(fragment)] void main() { color = sample(A, vec2(0.0)); }";
    let stage = extract(source, ShaderStage::Fragment).unwrap();
    assert_eq!(stage.reflection.externals().len(), 1);
    assert_eq!(declared(&stage.ast), vec!["A", "color", "main"]);
}

#[test]
fn duplicate_location_fails() {
    let source = "
        input { [location(2)] vec3 a; [location(2)] vec3 b; }
        [entry(vertex)] void main() { vec3 c = a + b; }";
    let err = extract(source, ShaderStage::Vertex).unwrap_err();
    assert_eq!(err.code().as_str(), "E3002");
}

#[test]
fn identical_struct_redeclaration_is_merged() {
    let source = "
        struct S { v: vec4; }
        struct S { v: vec4; }
        [entry(vertex)] void main() { S s = S(vec4(1.0)); }";
    let stage = extract(source, ShaderStage::Vertex).unwrap();
    assert_eq!(declared(&stage.ast), vec!["S", "main"]);
}

#[test]
fn differing_struct_redeclaration_fails() {
    let source = "
        struct S { v: vec4; }
        struct S { v: vec3; }
        [entry(vertex)] void main() { S s = S(vec4(1.0)); }";
    let err = extract(source, ShaderStage::Vertex).unwrap_err();
    assert!(matches!(err, ReflectError::StructRedefinition { ref name, .. } if name == "S"));
}

#[test]
fn undefined_names() {
    let err = extract(
        "[entry(vertex)] void main() { float x = missing; }",
        ShaderStage::Vertex,
    )
    .unwrap_err();
    assert!(matches!(err, ReflectError::UndefinedIdentifier { ref name, .. } if name == "missing"));

    let err = extract("[entry(vertex)] void main() { helper(); }", ShaderStage::Vertex).unwrap_err();
    assert!(matches!(err, ReflectError::UndefinedFunction { ref name, .. } if name == "helper"));
    assert_eq!(err.code().as_str(), "E3006");
}

#[test]
fn undefined_names_in_unreachable_code_are_ignored() {
    let source = "
        void broken() { helper(); }
        [entry(vertex)] void main() { }";
    assert!(extract(source, ShaderStage::Vertex).is_ok());
}

#[test]
fn locals_shadow_globals() {
    let source = "
        const { float scale = 2.0; }
        float apply(float scale) { return scale; }
        [entry(vertex)] void main() {
            float scale = 1.0;
            float y = apply(scale);
        }";
    let stage = extract(source, ShaderStage::Vertex).unwrap();
    assert_eq!(declared(&stage.ast), vec!["apply", "main"]);
}

#[test]
fn consts_follow_their_users() {
    let source = "
        const { float Pi = 3.14159; float Tau = Pi * 2.0; float Unused = 0.0; }
        [entry(vertex)] void main() { float t = Tau; }";
    let stage = extract(source, ShaderStage::Vertex).unwrap();
    assert_eq!(declared(&stage.ast), vec!["Pi", "Tau", "main"]);
}

#[test]
fn missing_and_duplicate_stages() {
    let err = extract(TEXTURED, ShaderStage::Compute).unwrap_err();
    assert_eq!(err, ReflectError::StageNotFound { stage: ShaderStage::Compute });

    let source = "
        [entry(vertex)] void a() { }
        [stage(vertex)] void b() { }";
    let err = extract(source, ShaderStage::Vertex).unwrap_err();
    assert!(matches!(
        err,
        ReflectError::DuplicateEntryPoint { ref first, ref second, .. } if first == "a" && second == "b"
    ));

    let diag = err.to_diagnostic();
    let labels: Vec<_> = diag.labels.iter().map(|l| (l.is_primary, l.message.as_str())).collect();
    assert_eq!(
        labels,
        vec![(true, "second entry function"), (false, "first entry function")]
    );
    assert!(diag.labels[1].span.start < diag.labels[0].span.start);
}

#[test]
fn optional_must_be_specialized_first() {
    let source = "
        option { bool Fancy = false; }
        optional (Fancy) { void extra() { } }
        [entry(vertex)] void main() { }";
    let mut extractor = StageExtractor::new();
    let err = extractor.load(parse(source)).unwrap_err();
    assert_eq!(err.code().as_str(), "E3008");
}

#[test]
fn alpha_test_follows_the_option() {
    let source = "
        option { bool UseAlpha = false; }
        input { [location(0)] float a; }
        [entry(fragment)] void main() {
            float b = 0.5;
            optional (UseAlpha) { if (a < b) discard; }
        }";
    let ast = parse(source);

    struct HasDiscard(bool);
    impl<'ast> Visitor<'ast> for HasDiscard {
        fn visit_statement(&mut self, stmt: &'ast Statement) {
            self.0 |= stmt.tag() == StatementTag::Discard;
            walk_statement(self, stmt);
        }
    }

    for enabled in [false, true] {
        let mut specializer = Specializer::new();
        specializer.set_option("UseAlpha", enabled);
        let specialized = specializer.process(&ast).unwrap();
        let stage = extract_stage(&specialized, ShaderStage::Fragment).unwrap();
        let mut found = HasDiscard(false);
        found.visit_statement(&stage.ast);
        assert_eq!(found.0, enabled);
    }
}

#[test]
fn extractor_is_reusable() {
    let mut extractor = StageExtractor::new();
    extractor.load(parse(TEXTURED)).unwrap();
    assert_eq!(extractor.stages(), vec![ShaderStage::Vertex, ShaderStage::Fragment]);

    let mut first = extractor.extract(ShaderStage::Fragment).unwrap();
    let mut second = extractor.extract(ShaderStage::Fragment).unwrap();
    erase_spans(&mut first.ast);
    erase_spans(&mut second.ast);
    assert_eq!(first, second);

    extractor.clear();
    assert!(extractor.stages().is_empty());
    assert!(extractor.extract(ShaderStage::Fragment).is_err());
}

#[test]
fn includes_pass_through() {
    let source = "
        include Engine.Lighting;
        [entry(vertex)] void main() { }";
    let stage = extract(source, ShaderStage::Vertex).unwrap();
    let tags: Vec<_> = stage.ast.as_statements().iter().map(Statement::tag).collect();
    assert_eq!(
        tags,
        vec![StatementTag::Include, StatementTag::EntryFunctionDeclaration]
    );
}
