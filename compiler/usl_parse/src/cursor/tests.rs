use pretty_assertions::assert_eq;
use usl_ir::{Name, Span, TokenKind};
use usl_lexer::tokenize;

use super::Cursor;
use crate::ParseError;

#[test]
fn advance_stops_at_eof() {
    let tokens = tokenize("a b").unwrap();
    let mut cursor = Cursor::new(tokens.as_slice());
    cursor.advance();
    cursor.advance();
    assert!(cursor.is_at_end());
    cursor.advance();
    assert!(cursor.is_at_end());
}

#[test]
fn empty_slice_reads_as_eof() {
    let cursor = Cursor::new(&[]);
    assert!(cursor.is_at_end());
    assert_eq!(cursor.peek_next_kind(), &TokenKind::Eof);
}

#[test]
fn check_ignores_payload() {
    let tokens = tokenize("42").unwrap();
    let cursor = Cursor::new(tokens.as_slice());
    assert!(cursor.check(&TokenKind::Int(0)));
    assert!(!cursor.check(&TokenKind::UInt(42)));
}

#[test]
fn peek_looks_ahead_without_consuming() {
    let tokens = tokenize("vec3 v ;").unwrap();
    let cursor = Cursor::new(tokens.as_slice());
    assert_eq!(cursor.peek_next_kind(), &TokenKind::Ident(Name::new("v")));
    assert_eq!(cursor.peek_kind_at(2), &TokenKind::Semicolon);
    assert_eq!(cursor.peek_kind_at(10), &TokenKind::Eof);
    assert!(cursor.check_ident_named("vec3"));
}

#[test]
fn previous_span_tracks_consumed_token() {
    let tokens = tokenize("ab cd").unwrap();
    let mut cursor = Cursor::new(tokens.as_slice());
    cursor.advance();
    assert_eq!(cursor.previous_span(), Span::new(0, 2));
    assert_eq!(cursor.current_span(), Span::new(3, 5));
}

#[test]
fn expect_reports_found_token() {
    let tokens = tokenize("x").unwrap();
    let mut cursor = Cursor::new(tokens.as_slice());
    let err = cursor.expect(&TokenKind::Semicolon).unwrap_err();
    match err {
        ParseError::UnexpectedToken {
            expected, found, ..
        } => {
            assert_eq!(expected, "`;`");
            assert_eq!(found, "identifier `x`");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn expect_ident_returns_name_and_span() {
    let tokens = tokenize("  light").unwrap();
    let mut cursor = Cursor::new(tokens.as_slice());
    let (name, span) = cursor.expect_ident().unwrap();
    assert_eq!(name, "light");
    assert_eq!(span, Span::new(2, 7));
}
