use pretty_assertions::assert_eq;
use usl_ir::{Name, SourcePos, Span, TokenKind};
use usl_lexer::tokenize;

use super::{splice_includes, LibraryResolver, SourceLibraries};
use crate::ParseError;

fn kinds(tokens: &[usl_ir::Token]) -> Vec<TokenKind> {
    tokens.iter().map(|t| t.kind.clone()).collect()
}

#[test]
fn splices_library_tokens_in_place() {
    let libs = SourceLibraries::new().with("util.math", "float half;");
    let tokens = tokenize("include util.math; int x;").unwrap();
    let spliced = splice_includes(tokens.as_slice(), &libs).unwrap();
    assert_eq!(
        kinds(&spliced),
        kinds(tokenize("float half; int x;").unwrap().as_slice())
    );
}

#[test]
fn nested_includes_expand_recursively() {
    let libs = SourceLibraries::new()
        .with("a", "include b; int a;")
        .with("b", "int b;");
    let tokens = tokenize("include a;").unwrap();
    let spliced = splice_includes(tokens.as_slice(), &libs).unwrap();
    assert_eq!(
        kinds(&spliced),
        kinds(tokenize("int b; int a;").unwrap().as_slice())
    );
}

#[test]
fn repeated_include_is_skipped() {
    let libs = SourceLibraries::new()
        .with("a", "include common; int a;")
        .with("common", "int c;");
    let tokens = tokenize("include common; include a;").unwrap();
    let spliced = splice_includes(tokens.as_slice(), &libs).unwrap();
    assert_eq!(
        kinds(&spliced),
        kinds(tokenize("int c; int a;").unwrap().as_slice())
    );
}

#[test]
fn unknown_library_is_reported() {
    let tokens = tokenize("include missing.lib;").unwrap();
    let err = splice_includes(tokens.as_slice(), &SourceLibraries::new()).unwrap_err();
    assert!(matches!(err, ParseError::UnresolvedLibrary { ref name, .. } if name == "missing.lib"));
}

#[test]
fn cycles_are_reported() {
    let libs = SourceLibraries::new()
        .with("a", "include b;")
        .with("b", "include a;");
    let tokens = tokenize("include a;").unwrap();
    let err = splice_includes(tokens.as_slice(), &libs).unwrap_err();
    assert!(matches!(err, ParseError::IncludeCycle { ref name, .. } if name == "a"));
}

#[test]
fn library_lex_errors_propagate() {
    let libs = SourceLibraries::new().with("bad", "int $;");
    let tokens = tokenize("include bad;").unwrap();
    let err = splice_includes(tokens.as_slice(), &libs).unwrap_err();
    assert!(matches!(err, ParseError::Lex(_)));
}

#[test]
fn malformed_directive_is_a_parse_error() {
    let tokens = tokenize("include a.;").unwrap();
    let err = splice_includes(tokens.as_slice(), &SourceLibraries::new()).unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedToken { .. }));
}

#[test]
fn custom_resolvers_plug_in() {
    struct One;
    impl LibraryResolver for One {
        fn resolve(&self, name: &str) -> Result<Option<usl_ir::TokenList>, usl_lexer::LexError> {
            Ok((name == "one").then(|| tokenize("one").unwrap()))
        }
    }
    let tokens = tokenize("include one;").unwrap();
    let spliced = splice_includes(tokens.as_slice(), &One).unwrap();
    assert_eq!(
        kinds(&spliced),
        vec![TokenKind::Ident(Name::new("one")), TokenKind::Eof]
    );
}

#[test]
fn spliced_tokens_point_at_the_directive() {
    let libs = SourceLibraries::new()
        .with("a", "include b;\n\n\nint a;")
        .with("b", "\n\n   int b;");
    let tokens = tokenize("int x;\ninclude a;").unwrap();
    let spliced = splice_includes(tokens.as_slice(), &libs).unwrap();
    let directive = Span::new(7, 17);
    let at = SourcePos::new(2, 1);
    // `int x ;` keeps its own location
    assert_eq!(spliced[0].span, Span::new(0, 3));
    for token in &spliced[3..spliced.len() - 1] {
        assert_eq!((token.span, token.pos), (directive, at));
    }
    assert_eq!(spliced.last().map(|t| t.kind.clone()), Some(TokenKind::Eof));
}

#[test]
fn errors_inside_libraries_point_at_the_directive() {
    let libs = SourceLibraries::new()
        .with("outer", "\n\nint y;\ninclude inner;")
        .with("inner", "\n\n\n   int $;");
    let tokens = tokenize("int x;\n  include outer;").unwrap();
    let err = splice_includes(tokens.as_slice(), &libs).unwrap_err();
    assert!(matches!(err, ParseError::Lex(_)));
    assert_eq!(err.span(), Span::new(9, 23));
    assert_eq!(err.pos(), SourcePos::new(2, 3));

    let libs = SourceLibraries::new().with("outer", "\n\ninclude missing;");
    let err = splice_includes(tokens.as_slice(), &libs).unwrap_err();
    assert!(matches!(err, ParseError::UnresolvedLibrary { ref name, .. } if name == "missing"));
    assert_eq!(err.span(), Span::new(9, 23));
}
