//! Token types produced by the lexer.

use std::fmt;

use super::{Name, SourcePos, Span};

/// A token with its byte span and its line/column in the source.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub pos: SourcePos,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, span: Span, pos: SourcePos) -> Self {
        Token { kind, span, pos }
    }

    /// Create a token without a source location.
    pub fn dummy(kind: TokenKind) -> Self {
        Token {
            kind,
            span: Span::DUMMY,
            pos: SourcePos::default(),
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {}", self.kind, self.pos)
    }
}

/// Token kinds.
///
/// Type names (`float`, `vec3`, `sampler2D`, ...) are plain identifiers:
/// the parser resolves them through the `BuiltinRegistry` it is given.
///
/// Float literals store their bits so tokens stay `Eq + Hash`.
#[derive(Clone, Eq, PartialEq, Hash)]
pub enum TokenKind {
    /// Signed integer literal: `42`, `0x1F`. Literals carry no sign, so
    /// the lexer admits magnitudes up to `2^31` for `-2147483648`; the
    /// parser range-checks the value once the sign is known.
    Int(i64),
    /// Unsigned integer literal: `42u`
    UInt(u32),
    /// Float literal: `1.0`, `2.5e-3`, `1.0f` (stored as `f32` bits)
    Float(u32),
    /// Identifier
    Ident(Name),

    // Keywords
    Struct,
    Input,
    Output,
    External,
    Option,
    Optional,
    Const,
    Include,
    If,
    Else,
    For,
    While,
    Do,
    Break,
    Continue,
    Return,
    Discard,
    True,
    False,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    Dot,
    Question,

    // Operators
    Eq,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Tilde,
    Amp,
    Pipe,
    Caret,
    AmpAmp,
    PipePipe,
    Shl,
    Shr,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,

    /// End of input. Always the last token of a `TokenList`.
    Eof,
}

impl TokenKind {
    /// Float literal value.
    #[inline]
    pub fn float(value: f32) -> Self {
        TokenKind::Float(value.to_bits())
    }

    /// Get a human-readable name for this token kind, used in diagnostics.
    pub fn display_name(&self) -> &'static str {
        match self {
            TokenKind::Int(_) => "integer",
            TokenKind::UInt(_) => "unsigned integer",
            TokenKind::Float(_) => "float",
            TokenKind::Ident(_) => "identifier",
            TokenKind::Struct => "`struct`",
            TokenKind::Input => "`input`",
            TokenKind::Output => "`output`",
            TokenKind::External => "`external`",
            TokenKind::Option => "`option`",
            TokenKind::Optional => "`optional`",
            TokenKind::Const => "`const`",
            TokenKind::Include => "`include`",
            TokenKind::If => "`if`",
            TokenKind::Else => "`else`",
            TokenKind::For => "`for`",
            TokenKind::While => "`while`",
            TokenKind::Do => "`do`",
            TokenKind::Break => "`break`",
            TokenKind::Continue => "`continue`",
            TokenKind::Return => "`return`",
            TokenKind::Discard => "`discard`",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Comma => "`,`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Colon => "`:`",
            TokenKind::Dot => "`.`",
            TokenKind::Question => "`?`",
            TokenKind::Eq => "`=`",
            TokenKind::EqEq => "`==`",
            TokenKind::NotEq => "`!=`",
            TokenKind::Lt => "`<`",
            TokenKind::LtEq => "`<=`",
            TokenKind::Gt => "`>`",
            TokenKind::GtEq => "`>=`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
            TokenKind::Bang => "`!`",
            TokenKind::Tilde => "`~`",
            TokenKind::Amp => "`&`",
            TokenKind::Pipe => "`|`",
            TokenKind::Caret => "`^`",
            TokenKind::AmpAmp => "`&&`",
            TokenKind::PipePipe => "`||`",
            TokenKind::Shl => "`<<`",
            TokenKind::Shr => "`>>`",
            TokenKind::PlusEq => "`+=`",
            TokenKind::MinusEq => "`-=`",
            TokenKind::StarEq => "`*=`",
            TokenKind::SlashEq => "`/=`",
            TokenKind::Eof => "end of file",
        }
    }

    /// Check if two token kinds are the same variant, ignoring payloads.
    #[inline]
    pub fn same_kind(&self, other: &TokenKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Debug for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Int(v) => write!(f, "Int({v})"),
            TokenKind::UInt(v) => write!(f, "UInt({v})"),
            TokenKind::Float(bits) => write!(f, "Float({:?})", f32::from_bits(*bits)),
            TokenKind::Ident(name) => write!(f, "Ident({name})"),
            other => f.write_str(other.display_name()),
        }
    }
}

/// The output of one lexer pass.
///
/// A `TokenList` produced by the lexer always ends with exactly one
/// `TokenKind::Eof` token.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    pub fn new() -> Self {
        TokenList { tokens: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        TokenList {
            tokens: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    #[inline]
    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Token kinds without positions, handy in tests.
    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(|t| t.kind.clone()).collect()
    }

    /// Tokens without the trailing `Eof`.
    pub fn without_eof(&self) -> &[Token] {
        match self.tokens.last() {
            Some(last) if last.kind == TokenKind::Eof => &self.tokens[..self.tokens.len() - 1],
            _ => &self.tokens,
        }
    }

    pub fn into_vec(self) -> Vec<Token> {
        self.tokens
    }
}

impl From<Vec<Token>> for TokenList {
    fn from(tokens: Vec<Token>) -> Self {
        TokenList { tokens }
    }
}

impl<'a> IntoIterator for &'a TokenList {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
