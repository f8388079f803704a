//! Logos token definitions.

use logos::{FilterResult, Lexer, Logos};
use usl_ir::{Name, TokenKind};

use crate::LexErrorKind;

/// Raw token from logos, converted to `TokenKind` by the caller.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\r\n\f]+")]
pub(crate) enum RawToken {
    // === Comments ===
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,
    #[token("/*", block_comment)]
    BlockComment,

    // === Keywords ===
    #[token("struct")]
    Struct,
    #[token("input")]
    Input,
    #[token("output")]
    Output,
    #[token("external")]
    External,
    #[token("option")]
    Option,
    #[token("optional")]
    Optional,
    #[token("const")]
    Const,
    #[token("include")]
    Include,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("return")]
    Return,
    #[token("discard")]
    Discard,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("?")]
    Question,

    // === Operators ===
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,

    // === Literals ===
    #[regex(r"0[xX][0-9a-fA-F]+", lex_hex_int)]
    #[regex(r"[0-9]+", lex_int)]
    Int(i64),

    #[regex(r"0[xX][0-9a-fA-F]+[uU]", lex_hex_uint)]
    #[regex(r"[0-9]+[uU]", lex_uint)]
    UInt(u32),

    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?[fF]?", lex_float)]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?[fF]?", lex_float)]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+[fF]?", lex_float)]
    Float(f32),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

impl RawToken {
    pub(crate) fn into_kind(self, slice: &str) -> TokenKind {
        match self {
            // filtered out by their callbacks
            RawToken::LineComment | RawToken::BlockComment => TokenKind::Eof,
            RawToken::Struct => TokenKind::Struct,
            RawToken::Input => TokenKind::Input,
            RawToken::Output => TokenKind::Output,
            RawToken::External => TokenKind::External,
            RawToken::Option => TokenKind::Option,
            RawToken::Optional => TokenKind::Optional,
            RawToken::Const => TokenKind::Const,
            RawToken::Include => TokenKind::Include,
            RawToken::If => TokenKind::If,
            RawToken::Else => TokenKind::Else,
            RawToken::For => TokenKind::For,
            RawToken::While => TokenKind::While,
            RawToken::Do => TokenKind::Do,
            RawToken::Break => TokenKind::Break,
            RawToken::Continue => TokenKind::Continue,
            RawToken::Return => TokenKind::Return,
            RawToken::Discard => TokenKind::Discard,
            RawToken::True => TokenKind::True,
            RawToken::False => TokenKind::False,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Semicolon => TokenKind::Semicolon,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Question => TokenKind::Question,
            RawToken::Eq => TokenKind::Eq,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::NotEq => TokenKind::NotEq,
            RawToken::Lt => TokenKind::Lt,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::Gt => TokenKind::Gt,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::Bang => TokenKind::Bang,
            RawToken::Tilde => TokenKind::Tilde,
            RawToken::Amp => TokenKind::Amp,
            RawToken::Pipe => TokenKind::Pipe,
            RawToken::Caret => TokenKind::Caret,
            RawToken::AmpAmp => TokenKind::AmpAmp,
            RawToken::PipePipe => TokenKind::PipePipe,
            RawToken::Shl => TokenKind::Shl,
            RawToken::Shr => TokenKind::Shr,
            RawToken::PlusEq => TokenKind::PlusEq,
            RawToken::MinusEq => TokenKind::MinusEq,
            RawToken::StarEq => TokenKind::StarEq,
            RawToken::SlashEq => TokenKind::SlashEq,
            RawToken::Int(v) => TokenKind::Int(v),
            RawToken::UInt(v) => TokenKind::UInt(v),
            RawToken::Float(v) => TokenKind::float(v),
            RawToken::Ident => TokenKind::Ident(Name::new(slice)),
        }
    }
}

/// Skip a `/* ... */` comment; comments do not nest.
fn block_comment(lex: &mut Lexer<RawToken>) -> FilterResult<(), LexErrorKind> {
    if let Some(end) = lex.remainder().find("*/") {
        lex.bump(end + 2);
        FilterResult::Skip
    } else {
        lex.bump(lex.remainder().len());
        FilterResult::Error(LexErrorKind::UnterminatedComment)
    }
}

/// A literal running straight into letters or digits (`12abc`, `1.0x`) is
/// one malformed token, not a literal followed by an identifier.
fn reject_suffix(lex: &mut Lexer<RawToken>) -> Result<(), LexErrorKind> {
    let trailing = lex
        .remainder()
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_' || *b == b'.')
        .count();
    if trailing == 0 {
        Ok(())
    } else {
        lex.bump(trailing);
        Err(LexErrorKind::MalformedNumber)
    }
}

/// Largest literal magnitude: `i32::MAX`, or `2^31` under a unary minus.
const INT_MAGNITUDE_LIMIT: i64 = 1 << 31;

fn int_magnitude(value: Result<i64, std::num::ParseIntError>) -> Result<i64, LexErrorKind> {
    value
        .ok()
        .filter(|v| *v <= INT_MAGNITUDE_LIMIT)
        .ok_or(LexErrorKind::MalformedNumber)
}

fn lex_int(lex: &mut Lexer<RawToken>) -> Result<i64, LexErrorKind> {
    reject_suffix(lex)?;
    int_magnitude(lex.slice().parse::<i64>())
}

fn lex_hex_int(lex: &mut Lexer<RawToken>) -> Result<i64, LexErrorKind> {
    reject_suffix(lex)?;
    int_magnitude(i64::from_str_radix(&lex.slice()[2..], 16))
}

fn lex_uint(lex: &mut Lexer<RawToken>) -> Result<u32, LexErrorKind> {
    reject_suffix(lex)?;
    let slice = lex.slice();
    slice[..slice.len() - 1]
        .parse::<u32>()
        .map_err(|_| LexErrorKind::MalformedNumber)
}

fn lex_hex_uint(lex: &mut Lexer<RawToken>) -> Result<u32, LexErrorKind> {
    reject_suffix(lex)?;
    let slice = lex.slice();
    u32::from_str_radix(&slice[2..slice.len() - 1], 16).map_err(|_| LexErrorKind::MalformedNumber)
}

fn lex_float(lex: &mut Lexer<RawToken>) -> Result<f32, LexErrorKind> {
    reject_suffix(lex)?;
    let digits = lex.slice().trim_end_matches(['f', 'F']);
    match digits.parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(LexErrorKind::MalformedNumber),
    }
}
