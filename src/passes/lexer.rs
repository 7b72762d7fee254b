// Hello, welcome to my scanner. It never gives up: every problem becomes a
// LexError and we keep going

use crate::{span::Span, Token, TokenKind};

static KEYWORDS: &[&str] = &[
    "LOAD", "CREATE", "ADD", "REMOVE", "DELETE", "DISPLAY", "STORE", "MERGE", "AVERAGE", "SUM",
    "MAX", "MIN", "COUNT", "PRINT", "save", "num", "sort", "filter", "tag", "path", "header",
];
static LITERALS: &[&str] = &["true", "false"];
static OPERATORS: &str = "+-*/%=&|<>";
static SEPARATORS: &str = "(),;";

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum LexErrorKind {
    /// a run of letters that's neither a keyword nor a literal
    InvalidWord(String),
    LeadingZero(String),
    /// holds everything from the opening quote to the end of input
    UnclosedString(String),
    Unrecognized(char),
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}
impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use LexErrorKind::*;
        match &self.kind {
            InvalidWord(word) => write!(f, "Invalid keyword or literal: {}", word),
            LeadingZero(number) => write!(f, "Invalid number with leading zero(s): {}", number),
            UnclosedString(partial) => write!(f, "Unclosed string: {}", partial),
            Unrecognized(c) => write!(f, "Unrecognized character: {}", c),
        }
    }
}
impl std::error::Error for LexError {}

enum NextSymbolType {
    None,
    Space,
    Letter(char),
    Digit(char),
    Operator(char),
    Separator(char),
    Quote,
    Unknown(char),
}

#[derive(Debug)]
struct Lexer {
    tokens: Vec<Token>,
    errors: Vec<LexError>,
    rchars: Vec<char>,
    line: usize,
    col: usize,
}

impl Lexer {
    fn new(source: &str) -> Lexer {
        Lexer {
            tokens: Vec::new(),
            errors: Vec::new(),
            rchars: source.chars().rev().collect(),
            line: 1,
            col: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.rchars.last().copied()
    }

    /// pops the next char, keeping line/col up to date
    fn bump(&mut self) -> Option<char> {
        let c = self.rchars.pop()?;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn next_symbol_type(&mut self) -> NextSymbolType {
        use NextSymbolType::*;

        let c = match self.bump() {
            Some(c) => c,
            // EOF
            _ => return None,
        };

        if c.is_whitespace() {
            Space
        } else if c.is_alphabetic() {
            Letter(c)
        } else if c.is_ascii_digit() {
            Digit(c)
        } else if OPERATORS.contains(c) {
            Operator(c)
        } else if SEPARATORS.contains(c) {
            Separator(c)
        } else if c == '"' {
            Quote
        } else {
            Unknown(c)
        }
    }

    /// keeps popping while `pred` holds, starting from an already popped char
    fn take_while(&mut self, first: char, pred: impl Fn(char) -> bool) -> String {
        let mut text = first.to_string();
        while let Some(x) = self.peek() {
            if !pred(x) {
                break;
            }
            text.push(x);
            self.bump();
        }
        text
    }

    fn span_from(&self, start: (usize, usize)) -> Span {
        Span { lo: start, hi: (self.line, self.col) }
    }

    fn push(&mut self, kind: TokenKind, lexeme: String, start: (usize, usize)) {
        let span = self.span_from(start);
        self.tokens.push(Token { kind, lexeme, span });
    }

    fn error(&mut self, kind: LexErrorKind, start: (usize, usize)) {
        let span = self.span_from(start);
        trace!("lexical error at {}: {:?}", span, kind);
        self.errors.push(LexError { kind, span });
    }

    fn scan_string(&mut self, start: (usize, usize)) {
        let mut text = String::from("\"");
        loop {
            match self.bump() {
                Some('"') => {
                    text.push('"');
                    break self.push(TokenKind::String, text, start);
                }
                // escaped char is kept raw, the target language reads it the same way
                Some('\\') => {
                    text.push('\\');
                    if let Some(x) = self.bump() {
                        text.push(x);
                    }
                }
                Some(x) => text.push(x),
                None => break self.error(LexErrorKind::UnclosedString(text), start),
            }
        }
    }
}

/// Turns source text into tokens plus every lexical error found on the way.
/// Never fails, scanning always runs to the end of input
pub fn scan(text: &str) -> (Vec<Token>, Vec<LexError>) {
    let mut lexer = Lexer::new(text);
    loop {
        let start = (lexer.line, lexer.col);
        match lexer.next_symbol_type() {
            NextSymbolType::None => {
                // This is the end of the file, which is OK, as we are not in the middle
                // of matching a token
                break;
            }
            NextSymbolType::Space => continue,
            NextSymbolType::Letter(c) => {
                let word = lexer.take_while(c, char::is_alphabetic);
                if KEYWORDS.contains(&word.as_str()) {
                    lexer.push(TokenKind::Keyword, word, start);
                } else if LITERALS.contains(&word.as_str()) {
                    lexer.push(TokenKind::Literal, word, start);
                } else {
                    lexer.error(LexErrorKind::InvalidWord(word), start);
                }
            }
            NextSymbolType::Digit(c) => {
                let number = lexer.take_while(c, |x| x.is_ascii_digit());
                if number.len() > 1 && number.starts_with('0') {
                    lexer.error(LexErrorKind::LeadingZero(number), start);
                } else {
                    lexer.push(TokenKind::Number, number, start);
                }
            }
            NextSymbolType::Operator(c) => {
                let mut op = c.to_string();
                match (c, lexer.peek()) {
                    ('<', Some('>')) | ('<', Some('=')) | ('>', Some('=')) => {
                        if let Some(x) = lexer.bump() {
                            op.push(x);
                        }
                    }
                    _ => (),
                }
                lexer.push(TokenKind::Operator, op, start);
            }
            NextSymbolType::Separator(c) => {
                lexer.push(TokenKind::Separator, c.to_string(), start);
            }
            NextSymbolType::Quote => lexer.scan_string(start),
            NextSymbolType::Unknown(c) => {
                lexer.error(LexErrorKind::Unrecognized(c), start);
            }
        }
    }
    debug!("scanned {} tokens, {} errors", lexer.tokens.len(), lexer.errors.len());
    (lexer.tokens, lexer.errors)
}
