//! A list of Tokens is the result of scanning, just chunked program data
//! with no regard for syntax. Unlike a lot of lexers the lexeme is kept
//! verbatim (strings keep their quotes), because codegen pastes string
//! lexemes straight into the generated program.

use crate::span::Span;

/// The lexical class of a token. There are exactly six of them
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum TokenKind {
    Keyword,
    Literal,
    Number,
    Operator,
    Separator,
    String,
}
impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use TokenKind::*;
        let s = match self {
            Keyword => "keyword",
            Literal => "literal",
            Number => "number",
            Operator => "operator",
            Separator => "separator",
            String => "string",
        };
        write!(f, "{}", s)
    }
}

/// All tokens have a location ([Token::span]), a class ([Token::kind]) and
/// the exact source text they were made from ([Token::lexeme])
#[derive(PartialEq, Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}
impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Token { kind, lexeme: lexeme.into(), span }
    }
    /// the (kind, lexeme) pair, which is all that matters for equality
    /// between token streams
    pub fn pair(&self) -> (TokenKind, &str) {
        (self.kind, &self.lexeme)
    }
    pub fn is(&self, kind: TokenKind, lexeme: &str) -> bool {
        self.kind == kind && self.lexeme == lexeme
    }
}
impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "< {}, {} >", self.kind, self.lexeme)
    }
}
