use pretty_assertions::assert_eq;
use usl_ir::{BuiltinRegistry, ShaderStage, Statement};
use usl_parse::parse_source;
use usl_reflect::extract_stage;

use super::{GlslSettings, GlslVersion, GlslWriter};
use crate::{Backend, CodegenError, StringEmitter};

fn parse(source: &str) -> Statement {
    parse_source(source, &BuiltinRegistry::new()).unwrap()
}

fn glsl(source: &str, settings: GlslSettings) -> Result<String, CodegenError> {
    GlslWriter::new(settings).render(&parse(source))
}

fn version(major: u32, minor: u32) -> GlslSettings {
    GlslSettings {
        version: GlslVersion::new(major, minor),
        ..GlslSettings::default()
    }
}

const TEXTURED: &str = "
    input { [location(0)] vec2 uv; }
    output { [location(0)] vec4 color; }
    external { [binding(0)] sampler2D Tex; }
    [entry(fragment)] void main() { color = sample(Tex, uv); }";

#[test]
fn textured_fragment() {
    let expected = "\
#version 450

layout(binding = 0) uniform sampler2D Tex;

layout(location = 0) in vec2 uv;
layout(location = 0) out vec4 color;

void main() {
    color = texture(Tex, uv);
}
";
    assert_eq!(glsl(TEXTURED, GlslSettings::default()).unwrap(), expected);
}

#[test]
fn generate_matches_render() {
    let ast = parse(TEXTURED);
    let writer = GlslWriter::default();
    let mut out = StringEmitter::new();
    writer.generate(&ast, &mut out).unwrap();
    assert_eq!(out.as_str(), writer.render(&ast).unwrap());
}

#[test]
fn output_is_deterministic() {
    let ast = parse(TEXTURED);
    let writer = GlslWriter::new(GlslSettings::vulkan());
    assert_eq!(writer.render(&ast).unwrap(), writer.render(&ast).unwrap());
}

#[test]
fn vulkan_keeps_descriptor_sets() {
    let source = "
        external { [set(1), binding(2)] sampler2D Tex; }
        [entry(fragment)] void main() { }";
    let text = glsl(source, GlslSettings::vulkan()).unwrap();
    assert!(text.contains("layout(set = 1, binding = 2) uniform sampler2D Tex;"));

    let text = glsl(source, GlslSettings::default()).unwrap();
    assert!(text.contains("layout(binding = 18) uniform sampler2D Tex;"));
}

#[test]
fn bindings_per_set_controls_flattening() {
    let source = "
        external { [set(2), binding(1)] sampler2D Tex; }
        [entry(fragment)] void main() { }";
    let settings = GlslSettings {
        bindings_per_set: 4,
        ..GlslSettings::default()
    };
    assert!(glsl(source, settings)
        .unwrap()
        .contains("layout(binding = 9) uniform sampler2D Tex;"));
}

#[test]
fn flattened_bindings_collide() {
    let source = "
        external {
            [set(0), binding(16)] sampler2D A;
            [set(1), binding(0)] sampler2D B;
        }
        [entry(fragment)] void main() { }";
    let err = glsl(source, GlslSettings::default()).unwrap_err();
    match &err {
        CodegenError::BindingConflict {
            first,
            second,
            binding,
            ..
        } => {
            assert_eq!(first, "A");
            assert_eq!(second, "B");
            assert_eq!(*binding, 16);
        }
        other => panic!("expected a binding conflict, got {other:?}"),
    }
    assert_eq!(err.code(), usl_diagnostic::ErrorCode::E4002);
    let diag = err.to_diagnostic();
    assert_eq!(diag.labels.len(), 2);
    assert!(!diag.labels[1].is_primary);
    assert_eq!(
        &source[diag.labels[1].span.to_range()],
        "[set(0), binding(16)] sampler2D A;"
    );

    // Distinct sets do not collide when they are kept.
    assert!(glsl(source, GlslSettings::vulkan()).is_ok());
}

#[test]
fn old_versions_drop_qualifiers() {
    let text = glsl(TEXTURED, version(3, 30)).unwrap();
    assert!(text.starts_with("#version 330\n"));
    assert!(text.contains("\nuniform sampler2D Tex;\n"));
    assert!(text.contains("layout(location = 0) in vec2 uv;"));

    let text = glsl(TEXTURED, version(1, 50)).unwrap();
    assert!(text.contains("\nin vec2 uv;\n"));
    assert!(text.contains("\nout vec4 color;\n"));
}

#[test]
fn varyings_need_glsl_130() {
    let err = glsl(TEXTURED, version(1, 20)).unwrap_err();
    assert!(matches!(
        err,
        CodegenError::UnsupportedConstruct {
            required: Some(v),
            ..
        } if v == GlslVersion::new(1, 30)
    ));
}

#[test]
fn builtin_functions_are_version_gated() {
    let source = "
        external { [binding(0)] sampler2D Tex; }
        [entry(fragment)] void main() { vec4 c = sample(Tex, vec2(0.0)); }";
    let err = glsl(source, version(1, 20)).unwrap_err();
    match err {
        CodegenError::UnsupportedConstruct {
            construct,
            required,
            configured,
            ..
        } => {
            assert_eq!(construct, "built-in `texture`");
            assert_eq!(required, Some(GlslVersion::new(1, 30)));
            assert_eq!(configured, GlslVersion::new(1, 20));
        }
        other => panic!("expected an unsupported construct, got {other:?}"),
    }
}

#[test]
fn es_header_and_precision() {
    let settings = GlslSettings::es(GlslVersion::new(3, 0));
    let text = glsl(TEXTURED, settings).unwrap();
    assert!(text.starts_with(
        "#version 300 es\nprecision highp float;\nprecision highp int;\n"
    ));
    // No binding qualifiers before 3.10 ES.
    assert!(text.contains("\nuniform sampler2D Tex;\n"));

    let vertex = "
        output { [builtin(position)] vec4 pos; }
        [entry(vertex)] void main() { pos = vec4(0.0); }";
    let text = glsl(vertex, GlslSettings::es(GlslVersion::new(3, 10))).unwrap();
    assert!(text.starts_with("#version 310 es\n\nvoid main()"));
}

#[test]
fn compute_layout_and_storage_buffer() {
    let source = "
        struct Particles { data: vec4[]; }
        input { [builtin(global_invocation_id)] uvec3 gid; }
        external { [binding(0), storage] Particles particles; }
        [entry(compute), workgroup(8, 8)] void main() {
            particles.data[gid.x] = vec4(1.0);
        }";
    let expected = "\
#version 450

layout(local_size_x = 8, local_size_y = 8, local_size_z = 1) in;

layout(std430, binding = 0) buffer _uslBlock_particles {
    vec4 data[];
} particles;

void main() {
    particles.data[gl_GlobalInvocationID.x] = vec4(1.0);
}
";
    assert_eq!(glsl(source, GlslSettings::default()).unwrap(), expected);

    let err = glsl(source, version(4, 0)).unwrap_err();
    assert!(matches!(
        err,
        CodegenError::UnsupportedConstruct { required: Some(v), .. } if v == GlslVersion::new(4, 30)
    ));
}

#[test]
fn uniform_blocks_and_loose_values() {
    let source = "
        struct Camera { view: mat4; proj: mat4; }
        input { [location(0)] vec4 p; }
        output { [builtin(position)] vec4 pos; }
        external {
            [binding(1)] Camera camera;
            [binding(3)] float time;
        }
        [entry(vertex)] void main() { pos = camera.proj * camera.view * p * time; }";

    let text = glsl(source, GlslSettings::vulkan()).unwrap();
    assert!(text.contains(
        "layout(std140, set = 0, binding = 1) uniform _uslBlock_camera {
    mat4 view;
    mat4 proj;
} camera;
layout(std140, set = 0, binding = 3) uniform _uslBlock_time {
    float time;
};
"
    ));
    assert!(!text.contains("struct Camera"));

    let text = glsl(source, GlslSettings::default()).unwrap();
    assert!(text.contains("layout(std140, binding = 1) uniform _uslBlock_camera {"));
    assert!(text.contains("\nuniform float time;\n"));
}

#[test]
fn builtin_variables_are_renamed() {
    let source = "
        input {
            [builtin(vertex_index)] int vid;
            [builtin(instance_index)] int iid;
        }
        output { [builtin(position)] vec4 pos; }
        [entry(vertex)] void main() { pos = vec4(float(vid), float(iid), 0.0, 1.0); }";
    let text = glsl(source, GlslSettings::default()).unwrap();
    assert!(text.contains("gl_Position = vec4(float(gl_VertexID), float(gl_InstanceID), 0.0, 1.0);"));
    assert!(!text.contains(" in int"));

    let text = glsl(source, GlslSettings::vulkan()).unwrap();
    assert!(text.contains("float(gl_VertexIndex), float(gl_InstanceIndex)"));

    let fragment = "
        input { [builtin(position)] vec4 coord; }
        output { [builtin(frag_depth)] float depth; }
        [entry(fragment)] void main() { depth = coord.z; }";
    let text = glsl(fragment, GlslSettings::default()).unwrap();
    assert!(text.contains("gl_FragDepth = gl_FragCoord.z;"));
}

#[test]
fn integer_varyings_are_flat() {
    let vertex = "
        input { [location(0)] int id; }
        output { [location(1)] int passed; }
        [entry(vertex)] void main() { passed = id; }";
    let text = glsl(vertex, GlslSettings::default()).unwrap();
    assert!(text.contains("layout(location = 0) in int id;"));
    assert!(text.contains("layout(location = 1) flat out int passed;"));

    let fragment = "
        input { [location(1)] int passed; }
        output { [location(0)] vec4 color; }
        [entry(fragment)] void main() { color = vec4(float(passed)); }";
    let text = glsl(fragment, GlslSettings::default()).unwrap();
    assert!(text.contains("layout(location = 1) flat in int passed;"));
}

#[test]
fn value_structs_come_before_use() {
    let source = "
        struct Outer { inner: Inner; scale: float; }
        struct Inner { v: vec3; }
        const { float HALF = 0.5; }
        float weight(Outer o) { return o.scale * HALF; }
        [entry(fragment)] void main() {
            Outer o;
            float w = weight(o);
        }";
    let expected = "\
#version 450

struct Inner {
    vec3 v;
};

struct Outer {
    Inner inner;
    float scale;
};

const float HALF = 0.5;

float weight(Outer o) {
    return o.scale * HALF;
}

void main() {
    Outer o;
    float w = weight(o);
}
";
    assert_eq!(glsl(source, GlslSettings::default()).unwrap(), expected);
}

#[test]
fn callees_come_before_callers() {
    let source = "
        [entry(fragment)] void main() { float x = outer(); }
        float outer() { return inner() * 2.0; }
        float inner() { return 1.0; }";
    let text = glsl(source, GlslSettings::default()).unwrap();
    let inner = text.find("float inner()").unwrap();
    let outer = text.find("float outer()").unwrap();
    let main = text.find("void main()").unwrap();
    assert!(inner < outer && outer < main);
}

#[test]
fn file_scope_constructs_without_glsl_form() {
    let option = "
        option { bool Fancy = false; }
        [entry(fragment)] void main() { }";
    let include = "
        include Engine.Lighting;
        [entry(fragment)] void main() { }";
    let optional = "
        option { bool Fancy = false; }
        [entry(fragment)] void main() { optional (Fancy) { discard; } }";

    for (source, construct) in [
        (option, "`option` declaration"),
        (include, "`include` directive"),
    ] {
        match glsl(source, GlslSettings::default()).unwrap_err() {
            CodegenError::UnsupportedConstruct {
                construct: found,
                required: None,
                ..
            } => assert_eq!(found, construct),
            other => panic!("expected an unsupported construct, got {other:?}"),
        }
    }

    // Specialization removes the option block; the nested optional remains.
    let ast = parse(optional);
    let stripped: Vec<Statement> = ast
        .as_statements()
        .iter()
        .filter(|s| s.tag() != usl_ir::StatementTag::OptionDeclaration)
        .cloned()
        .collect();
    let err = GlslWriter::default()
        .render(&Statement::sequence(stripped, usl_ir::Span::DUMMY))
        .unwrap_err();
    assert!(matches!(
        err,
        CodegenError::UnsupportedConstruct { ref construct, .. } if construct == "`optional` block"
    ));
    assert_eq!(err.code(), usl_diagnostic::ErrorCode::E4001);
}

#[test]
fn entry_point_selection() {
    let two = "
        output { [builtin(position)] vec4 pos; }
        [entry(vertex)] void vs() { pos = vec4(0.0); }
        [entry(fragment)] void fs() { discard; }";

    match glsl(two, GlslSettings::default()).unwrap_err() {
        CodegenError::AmbiguousEntryPoint {
            stage,
            first,
            second,
        } => {
            assert_eq!(stage, None);
            assert_eq!(first, "vs");
            assert_eq!(second, "fs");
        }
        other => panic!("expected an ambiguous entry, got {other:?}"),
    }

    let text = glsl(two, GlslSettings::default().with_stage(ShaderStage::Fragment)).unwrap();
    assert!(text.contains("void main() {\n    discard;\n}\n"));
    assert!(!text.contains("gl_Position"));

    let err = glsl(two, GlslSettings::default().with_stage(ShaderStage::Compute)).unwrap_err();
    assert_eq!(
        err,
        CodegenError::MissingEntryPoint {
            stage: Some(ShaderStage::Compute)
        }
    );

    let none = "float helper() { return 1.0; }";
    assert_eq!(
        glsl(none, GlslSettings::default()).unwrap_err(),
        CodegenError::MissingEntryPoint { stage: None }
    );
}

#[test]
fn entry_with_parameters_is_rejected() {
    let source = "[entry(fragment)] void main(float x) { }";
    assert!(matches!(
        glsl(source, GlslSettings::default()).unwrap_err(),
        CodegenError::UnsupportedConstruct { required: None, .. }
    ));
}

#[test]
fn extracted_stage_generates() {
    let source = "
        struct Light { dir: vec3; }
        input { [location(0)] vec3 normal; }
        output { [location(0)] vec4 color; [builtin(position)] vec4 pos; }
        external { [binding(0)] sampler2D Tex; [binding(1)] sampler2D Unused; }
        float lambert(Light l) { return max(dot(normal, l.dir), 0.0); }
        [entry(vertex)] void vs() { pos = vec4(normal, 1.0); }
        [entry(fragment)] void fs() {
            Light l;
            color = sample(Tex, normal.xy) * lambert(l);
        }";
    let stage = extract_stage(&parse(source), ShaderStage::Fragment).unwrap();
    let text = GlslWriter::default().render(&stage.ast).unwrap();
    assert!(text.contains("struct Light {"));
    assert!(text.contains("layout(binding = 0) uniform sampler2D Tex;"));
    assert!(!text.contains("Unused"));
    assert!(!text.contains("gl_Position"));
    assert!(text.contains("float lambert(Light l) {"));
}
