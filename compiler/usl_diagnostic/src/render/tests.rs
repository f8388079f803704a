use usl_ir::Span;

use super::*;
use crate::ErrorCode;

const SOURCE: &str = "external {\n    [set(0), binding(0)] sampler2D Tex;\n}\n";

#[test]
fn report_contains_code_message_and_label() {
    let diag = Diagnostic::error(ErrorCode::E3003)
        .with_message("duplicate binding")
        .with_label(Span::new(15, 35), "declared here")
        .with_note("bindings must be unique per set");

    let text = render(&diag, "lit.usl", SOURCE, false);
    assert!(text.contains("E3003"), "{text}");
    assert!(text.contains("duplicate binding"), "{text}");
    assert!(text.contains("declared here"), "{text}");
    assert!(text.contains("lit.usl"), "{text}");
    assert!(text.contains("bindings must be unique per set"), "{text}");
}

#[test]
fn out_of_range_labels_are_clamped() {
    let diag = Diagnostic::error(ErrorCode::E1001)
        .with_message("unexpected end of file")
        .with_label(Span::new(500, 510), "here");

    let text = render(&diag, "short.usl", SOURCE, false);
    assert!(text.contains("unexpected end of file"), "{text}");
}

#[test]
fn diagnostics_without_labels_still_render() {
    let diag = Diagnostic::error(ErrorCode::E3001).with_message("no fragment entry point");
    let text = render(&diag, "empty.usl", "", false);
    assert!(text.contains("no fragment entry point"), "{text}");
}

#[test]
fn secondary_labels_are_rendered() {
    let diag = Diagnostic::error(ErrorCode::E3007)
        .with_message("two entry functions")
        .with_label(Span::new(15, 35), "second entry function")
        .with_secondary_label(Span::new(0, 8), "first entry function");
    let text = render(&diag, "two.usl", SOURCE, false);
    assert!(text.contains("second entry function"), "{text}");
    assert!(text.contains("first entry function"), "{text}");
}
