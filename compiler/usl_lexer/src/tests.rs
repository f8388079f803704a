use pretty_assertions::assert_eq;
use proptest::prelude::*;
use usl_ir::{Name, SourcePos, TokenKind};

use super::*;

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source).unwrap().kinds()
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Ident(Name::from(name))
}

#[test]
fn empty_source_is_just_eof() {
    assert_eq!(kinds(""), vec![TokenKind::Eof]);
    assert_eq!(kinds("  \n\t // nothing\n /* here */ "), vec![TokenKind::Eof]);
}

#[test]
fn keywords_and_identifiers() {
    assert_eq!(
        kinds("struct optional option structure vec3"),
        vec![
            TokenKind::Struct,
            TokenKind::Optional,
            TokenKind::Option,
            ident("structure"),
            ident("vec3"),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn external_block_tokens() {
    assert_eq!(
        kinds("external { [set(0), binding(1)] sampler2D Tex; }"),
        vec![
            TokenKind::External,
            TokenKind::LBrace,
            TokenKind::LBracket,
            ident("set"),
            TokenKind::LParen,
            TokenKind::Int(0),
            TokenKind::RParen,
            TokenKind::Comma,
            ident("binding"),
            TokenKind::LParen,
            TokenKind::Int(1),
            TokenKind::RParen,
            TokenKind::RBracket,
            ident("sampler2D"),
            ident("Tex"),
            TokenKind::Semicolon,
            TokenKind::RBrace,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn operators_take_longest_match() {
    assert_eq!(
        kinds("a <= b << c && d += e != f"),
        vec![
            ident("a"),
            TokenKind::LtEq,
            ident("b"),
            TokenKind::Shl,
            ident("c"),
            TokenKind::AmpAmp,
            ident("d"),
            TokenKind::PlusEq,
            ident("e"),
            TokenKind::NotEq,
            ident("f"),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn numeric_literals() {
    assert_eq!(
        kinds("42 0x1F 7u 0xFFu 1.0 .5 2.5e-3 1e4 3.0f"),
        vec![
            TokenKind::Int(42),
            TokenKind::Int(31),
            TokenKind::UInt(7),
            TokenKind::UInt(255),
            TokenKind::float(1.0),
            TokenKind::float(0.5),
            TokenKind::float(2.5e-3),
            TokenKind::float(1e4),
            TokenKind::float(3.0),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn swizzle_after_identifier_is_dot_ident() {
    assert_eq!(
        kinds("color.rgb"),
        vec![ident("color"), TokenKind::Dot, ident("rgb"), TokenKind::Eof]
    );
}

#[test]
fn positions_are_one_based_lines_and_columns() {
    let tokens = tokenize("input {\n    [location(0)] vec3 pos;\n}").unwrap();
    let positions: Vec<SourcePos> = tokens.iter().map(|t| t.pos).collect();
    assert_eq!(positions[0], SourcePos::new(1, 1));
    assert_eq!(positions[1], SourcePos::new(1, 7));
    // `[`
    assert_eq!(positions[2], SourcePos::new(2, 5));
    // `vec3`
    assert_eq!(positions[8], SourcePos::new(2, 19));
    // `}`
    assert_eq!(positions[11], SourcePos::new(3, 1));
}

#[test]
fn invalid_character_fails_with_position() {
    let err = tokenize("float x = 1;\nx = @;").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::InvalidCharacter);
    assert_eq!(err.pos, SourcePos::new(2, 5));
    assert_eq!(err.text, "@");
    assert_eq!(err.code(), usl_diagnostic::ErrorCode::E0001);
}

#[test]
fn malformed_numbers() {
    for source in ["12abc", "1.0.5", "0x", "99999999999", "2147483649", "0x80000001", "1e", "3u2"] {
        let err = tokenize(source).unwrap_err();
        assert_eq!(err.kind, LexErrorKind::MalformedNumber, "{source}");
    }
}

#[test]
fn unterminated_block_comment() {
    let err = tokenize("float x;\n/* never closed").unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnterminatedComment);
    assert_eq!(err.pos, SourcePos::new(2, 1));
    let diag = err.to_diagnostic();
    assert_eq!(diag.code, usl_diagnostic::ErrorCode::E0003);
}

#[test]
fn eof_span_sits_at_end_of_source() {
    let source = "discard;";
    let tokens = tokenize(source).unwrap();
    let eof = tokens.as_slice().last().unwrap();
    assert_eq!(eof.kind, TokenKind::Eof);
    assert_eq!(eof.span.start as usize, source.len());
}

proptest! {
    #[test]
    fn lexing_never_panics(source in "\\PC{0,64}") {
        if let Ok(tokens) = tokenize(&source) {
            prop_assert_eq!(tokens.as_slice().last().map(|t| &t.kind), Some(&TokenKind::Eof));
        }
    }

    #[test]
    fn identifiers_lex_to_one_token(name in "[a-zA-Z_][a-zA-Z0-9_]{0,12}") {
        let tokens = tokenize(&name).unwrap();
        prop_assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn integers_round_trip(value in 0i64..=(1i64 << 31)) {
        let tokens = tokenize(&value.to_string()).unwrap();
        prop_assert_eq!(&tokens.kinds()[0], &TokenKind::Int(value));
    }

    #[test]
    fn printed_floats_lex_back_to_same_bits(value in 0.0f32..1.0e12) {
        let text = usl_ir::ConstantValue::Float(value).to_string();
        let tokens = tokenize(&text).unwrap();
        prop_assert_eq!(&tokens.kinds()[0], &TokenKind::float(value));
    }
}

#[test]
fn int_magnitude_admits_the_negated_minimum() {
    let tokens = tokenize("-2147483648 0x80000000").unwrap();
    assert_eq!(
        tokens.kinds()[..3].to_vec(),
        vec![TokenKind::Minus, TokenKind::Int(2_147_483_648), TokenKind::Int(2_147_483_648)]
    );
}
