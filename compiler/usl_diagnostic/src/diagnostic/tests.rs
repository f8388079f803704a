use pretty_assertions::assert_eq;

use super::*;

#[test]
fn builder_collects_labels_and_notes() {
    let diag = Diagnostic::error(ErrorCode::E3003)
        .with_message("binding (0, 1) is used twice")
        .with_label(Span::new(40, 44), "second use")
        .with_secondary_label(Span::new(10, 14), "first use")
        .with_note("each external needs its own set/binding pair");

    assert_eq!(diag.labels.len(), 2);
    assert_eq!(diag.primary_span(), Some(Span::new(40, 44)));
    assert_eq!(diag.notes.len(), 1);
    assert!(!diag.labels[1].is_primary);
}

#[test]
fn dummy_spans_are_not_labeled() {
    let diag = Diagnostic::error(ErrorCode::E3001).with_label(Span::DUMMY, "nowhere");
    assert!(diag.labels.is_empty());
    assert_eq!(diag.primary_span(), None);
}

#[test]
fn display_includes_code() {
    let diag = Diagnostic::error(ErrorCode::E1001).with_message("odd token");
    assert_eq!(diag.to_string(), "error[E1001]: odd token");
}
