use pretty_assertions::assert_eq;
use rustc_hash::FxHashSet;
use usl_ir::{BuiltinRegistry, Name, Visitor};
use usl_parse::parse_source;

use super::{DependencyCollector, DependencyData};

fn deps_of(source: &str, item: usize, externals: &[&str]) -> DependencyData {
    let ast = parse_source(source, &BuiltinRegistry::new()).unwrap();
    let externals: FxHashSet<Name> = externals.iter().map(|&e| Name::from(e)).collect();
    let mut collector = DependencyCollector::new(&externals);
    collector.visit_statement(&ast.as_statements()[item]);
    collector.finish()
}

fn sorted(names: impl Iterator<Item = impl AsRef<str>>) -> Vec<String> {
    let mut names: Vec<String> = names.map(|n| n.as_ref().to_owned()).collect();
    names.sort();
    names
}

const SOURCE: &str = "
    struct Light { dir: vec3; color: vec3; }
    external { [binding(0)] sampler2D Tex; }
    input { [location(0)] vec2 uv; }
    float shade(Light l, vec3 n) { return max(dot(l.dir, n), 0.0); }
    [entry(fragment)] void main() {
        Light light = Light(vec3(0.0), vec3(1.0));
        vec4 c = sample(Tex, uv);
        float k = shade(light, c.xyz);
        for (int i = 0; i < 4; i += 1) { k += float(i); }
        Color = c * k;
    }";

#[test]
fn function_references_by_category() {
    let deps = deps_of(SOURCE, 4, &["Tex"]);
    assert_eq!(sorted(deps.functions.keys()), vec!["shade"]);
    assert_eq!(sorted(deps.structs.keys()), vec!["Light"]);
    assert_eq!(sorted(deps.externals.keys()), vec!["Tex"]);
    assert_eq!(sorted(deps.variables.keys()), vec!["Color", "uv"]);
}

#[test]
fn parameters_are_not_references() {
    let deps = deps_of(SOURCE, 3, &["Tex"]);
    assert!(deps.variables.is_empty());
    assert!(deps.functions.is_empty());
    assert_eq!(sorted(deps.structs.keys()), vec!["Light"]);
}

#[test]
fn struct_fields_reference_structs() {
    let source = "
        struct Inner { v: vec4; }
        struct Outer { inner: Inner; items: Inner[4]; }";
    let deps = deps_of(source, 1, &[]);
    assert_eq!(sorted(deps.names()), vec!["Inner"]);
}

#[test]
fn local_scope_ends_with_its_block() {
    let source = "
        void f() {
            { float t = 1.0; }
            t = 2.0;
        }";
    let deps = deps_of(source, 0, &[]);
    assert_eq!(sorted(deps.variables.keys()), vec!["t"]);
}

#[test]
fn initializer_sees_outer_name() {
    let source = "void f() { float x = x; }";
    let deps = deps_of(source, 0, &[]);
    assert_eq!(sorted(deps.variables.keys()), vec!["x"]);
}

#[test]
fn span_of_first_use_is_kept() {
    let source = "void f() { g(); g(); }";
    let deps = deps_of(source, 0, &[]);
    let span = deps.functions["g"];
    assert_eq!(span.start as usize, source.find("g()").unwrap());
    assert!(!deps.is_empty());
}
