//! Lexer for BUILD files.
//!
//! Produces the token stream the parser consumes: identifiers and numbers
//! (both delivered as [`TokenKind::Ident`]), decoded string literals,
//! keywords, operators, logical newlines, statement-level comment tokens,
//! and opaque Python blocks. Newlines inside brackets are not tokens, and
//! comments that the grammar cannot see (suffix comments and comments
//! inside brackets) are collected into side lists on the [`TokenStream`]
//! for the post-parse assignment pass.

pub mod quote;


use crate::nodes::{Comment, Position};
use crate::options::ParseOptions;
use thiserror::Error;

// ============================================================================
// Tokens
// ============================================================================

/// The closed set of token kinds the grammar knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or numeric literal.
    Ident,
    /// String literal.
    Str,
    /// Full-line comment at statement level.
    Comment,
    /// Opaque top-level Python block.
    Python,
    /// Logical newline (only at bracket depth zero).
    Newline,
    Eof,
    // Keywords.
    And,
    Or,
    Not,
    In,
    Is,
    If,
    Else,
    For,
    Lambda,
    // Compound operators.
    EqEq,
    Ne,
    Le,
    Ge,
    PlusEq,
    // Single-character tokens.
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Lt,
    Gt,
    Dot,
    Comma,
    Colon,
    Semi,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
}

impl TokenKind {
    /// A short human-readable name, used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Ident => "identifier",
            TokenKind::Str => "string literal",
            TokenKind::Comment => "comment",
            TokenKind::Python => "python block",
            TokenKind::Newline => "newline",
            TokenKind::Eof => "end of file",
            TokenKind::And => "'and'",
            TokenKind::Or => "'or'",
            TokenKind::Not => "'not'",
            TokenKind::In => "'in'",
            TokenKind::Is => "'is'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::For => "'for'",
            TokenKind::Lambda => "'lambda'",
            TokenKind::EqEq => "'=='",
            TokenKind::Ne => "'!='",
            TokenKind::Le => "'<='",
            TokenKind::Ge => "'>='",
            TokenKind::PlusEq => "'+='",
            TokenKind::Assign => "'='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::Dot => "'.'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Semi => "';'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
        }
    }
}

/// One lexed token. `text` is the raw source slice; string literals also
/// carry their decoded `value` and the triple-quote flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub value: Option<String>,
    pub triple_quote: bool,
    pub start: Position,
    pub end: Position,
}

/// The lexer's complete output: the token vector plus the two comment side
/// lists the parser attaches after the tree is built.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenStream<'a> {
    pub tokens: Vec<Token<'a>>,
    /// Full-line comments inside brackets, in source order.
    pub line_comments: Vec<Comment>,
    /// Comments that follow a token on the same line, in source order.
    pub suffix_comments: Vec<Comment>,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated string literal starting at {0}")]
    UnterminatedString(Position),
    #[error("newline in string literal at {0}")]
    NewlineInString(Position),
    #[error("invalid escape sequence in string literal starting at {0}")]
    InvalidEscape(Position),
    #[error("embedded python block at {0} (strict mode)")]
    PythonBlock(Position),
    #[error("unexpected character {ch:?} at {pos}")]
    UnexpectedChar { ch: char, pos: Position },
}

impl LexError {
    /// The source position the error points at.
    pub fn position(&self) -> Position {
        match self {
            LexError::UnterminatedString(p)
            | LexError::NewlineInString(p)
            | LexError::InvalidEscape(p)
            | LexError::PythonBlock(p) => *p,
            LexError::UnexpectedChar { pos, .. } => *pos,
        }
    }
}

// ============================================================================
// Lexer
// ============================================================================

/// Identifiers that, at column one of a top-level line, begin an opaque
/// Python block rather than an expression statement.
const PYTHON_BLOCK_KEYWORDS: &[&str] = &[
    "assert", "break", "class", "continue", "def", "del", "elif", "else", "except", "finally",
    "for", "from", "global", "if", "import", "pass", "raise", "return", "try", "while", "with",
    "yield",
];

fn is_python_block_keyword(word: &str) -> bool {
    PYTHON_BLOCK_KEYWORDS.contains(&word)
}

fn keyword_kind(word: &str) -> Option<TokenKind> {
    Some(match word {
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "in" => TokenKind::In,
        "is" => TokenKind::Is,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "for" => TokenKind::For,
        "lambda" => TokenKind::Lambda,
        _ => return None,
    })
}

/// Tokenizes `text` with default options.
pub fn tokenize(text: &str) -> Result<TokenStream<'_>, LexError> {
    tokenize_with_options(text, &ParseOptions::default())
}

/// Tokenizes `text`, honoring [`ParseOptions`].
pub fn tokenize_with_options<'a>(
    text: &'a str,
    options: &ParseOptions,
) -> Result<TokenStream<'a>, LexError> {
    Lexer {
        src: text,
        pos: Position::start(),
        depth: 0,
        line_start: true,
        allow_python: options.allow_python_blocks,
        line_comments: Vec::new(),
        suffix_comments: Vec::new(),
    }
    .run()
}

struct Lexer<'a> {
    src: &'a str,
    pos: Position,
    /// Bracket nesting depth; newlines are tokens only at depth zero.
    depth: usize,
    /// True while no non-comment token has been produced on this line.
    line_start: bool,
    allow_python: bool,
    line_comments: Vec<Comment>,
    suffix_comments: Vec<Comment>,
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos.byte..].chars().next()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.src[self.pos.byte..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        if c == '\n' {
            self.pos.line += 1;
            self.pos.line_rune = 1;
        } else {
            self.pos.line_rune += 1;
        }
        self.pos.byte += c.len_utf8();
        Some(c)
    }

    fn run(mut self) -> Result<TokenStream<'a>, LexError> {
        let mut tokens: Vec<Token<'a>> = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                '\\' if self.peek_ahead(1) == Some('\n')
                    || (self.peek_ahead(1) == Some('\r') && self.peek_ahead(2) == Some('\n')) =>
                {
                    // Line continuation: plain whitespace.
                    self.bump();
                    while self.peek() != Some('\n') {
                        self.bump();
                    }
                    self.bump();
                }
                '\n' => {
                    let start = self.pos;
                    self.bump();
                    if self.depth == 0 {
                        tokens.push(Token {
                            kind: TokenKind::Newline,
                            text: "\n",
                            value: None,
                            triple_quote: false,
                            start,
                            end: self.pos,
                        });
                    }
                    self.line_start = true;
                }
                '#' => self.scan_comment(&mut tokens),
                '\'' | '"' => {
                    let tok = self.scan_string(self.pos)?;
                    tokens.push(tok);
                    self.line_start = false;
                }
                c if c.is_ascii_digit() => {
                    let tok = self.scan_number();
                    tokens.push(tok);
                    self.line_start = false;
                }
                c if c == '_' || c.is_alphabetic() => {
                    let tok = self.scan_word()?;
                    tokens.push(tok);
                    self.line_start = false;
                }
                _ => {
                    let tok = self.scan_operator()?;
                    tokens.push(tok);
                    self.line_start = false;
                }
            }
        }

        // Make sure the last statement sees a terminating newline.
        if tokens.last().is_some_and(|t| t.kind != TokenKind::Newline) {
            tokens.push(Token {
                kind: TokenKind::Newline,
                text: "",
                value: None,
                triple_quote: false,
                start: self.pos,
                end: self.pos,
            });
        }
        tokens.push(Token {
            kind: TokenKind::Eof,
            text: "",
            value: None,
            triple_quote: false,
            start: self.pos,
            end: self.pos,
        });

        Ok(TokenStream {
            tokens,
            line_comments: self.line_comments,
            suffix_comments: self.suffix_comments,
        })
    }

    fn scan_comment(&mut self, tokens: &mut Vec<Token<'a>>) {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
        let end = self.pos;
        let text = self.src[start.byte..end.byte].trim_end_matches('\r');

        if !self.line_start {
            self.suffix_comments.push(Comment {
                start,
                token: text.to_string(),
            });
        } else if self.depth == 0 {
            // Statement-level comment: a token of its own. The newline
            // that terminates it belongs to the comment, not the grammar.
            if self.peek() == Some('\n') {
                self.bump();
            }
            tokens.push(Token {
                kind: TokenKind::Comment,
                text,
                value: None,
                triple_quote: false,
                start,
                end,
            });
        } else {
            self.line_comments.push(Comment {
                start,
                token: text.to_string(),
            });
        }
    }

    /// Scans a string literal. `start` is the token start, which may point
    /// at an `r` prefix already consumed by the caller; the cursor is at
    /// the opening quote.
    fn scan_string(&mut self, start: Position) -> Result<Token<'a>, LexError> {
        let q = self.peek().expect("caller checked quote");
        self.bump();
        let mut triple = false;
        if self.peek() == Some(q) && self.peek_ahead(1) == Some(q) {
            triple = true;
            self.bump();
            self.bump();
        }
        loop {
            let Some(c) = self.peek() else {
                return Err(LexError::UnterminatedString(start));
            };
            if c == '\\' {
                self.bump();
                if self.bump().is_none() {
                    return Err(LexError::UnterminatedString(start));
                }
                continue;
            }
            if c == '\n' && !triple {
                return Err(LexError::NewlineInString(self.pos));
            }
            if c == q {
                if !triple {
                    self.bump();
                    break;
                }
                if self.peek_ahead(1) == Some(q) && self.peek_ahead(2) == Some(q) {
                    self.bump();
                    self.bump();
                    self.bump();
                    break;
                }
            }
            self.bump();
        }

        let text = &self.src[start.byte..self.pos.byte];
        let unquoted =
            quote::unquote(text).map_err(|_| LexError::InvalidEscape(start))?;
        Ok(Token {
            kind: TokenKind::Str,
            text,
            value: Some(unquoted.value),
            triple_quote: unquoted.triple,
            start,
            end: self.pos,
        })
    }

    fn scan_number(&mut self) -> Token<'a> {
        let start = self.pos;
        if self.peek() == Some('0')
            && matches!(
                self.peek_ahead(1),
                Some('x' | 'X' | 'o' | 'O' | 'b' | 'B')
            )
        {
            self.bump();
            self.bump();
            while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                self.bump();
            }
        } else {
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.bump();
            }
            if self.peek() == Some('.')
                && matches!(self.peek_ahead(1), Some(c) if c.is_ascii_digit())
            {
                self.bump();
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.bump();
                }
            }
            if matches!(self.peek(), Some('e' | 'E')) {
                let digit_after = matches!(self.peek_ahead(1), Some(c) if c.is_ascii_digit());
                let signed_digit = matches!(self.peek_ahead(1), Some('+' | '-'))
                    && matches!(self.peek_ahead(2), Some(c) if c.is_ascii_digit());
                if digit_after || signed_digit {
                    self.bump();
                    if matches!(self.peek(), Some('+' | '-')) {
                        self.bump();
                    }
                    while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                        self.bump();
                    }
                }
            }
        }
        Token {
            kind: TokenKind::Ident,
            text: &self.src[start.byte..self.pos.byte],
            value: None,
            triple_quote: false,
            start,
            end: self.pos,
        }
    }

    fn scan_word(&mut self) -> Result<Token<'a>, LexError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c == '_' || c.is_alphanumeric()) {
            self.bump();
        }
        let word = &self.src[start.byte..self.pos.byte];

        if (word == "r" || word == "R") && matches!(self.peek(), Some('\'' | '"')) {
            return self.scan_string(start);
        }

        if self.depth == 0 && start.line_rune == 1 && is_python_block_keyword(word) {
            if !self.allow_python {
                return Err(LexError::PythonBlock(start));
            }
            return Ok(self.scan_python_block(start));
        }

        Ok(Token {
            kind: keyword_kind(word).unwrap_or(TokenKind::Ident),
            text: word,
            value: None,
            triple_quote: false,
            start,
            end: self.pos,
        })
    }

    fn scan_operator(&mut self) -> Result<Token<'a>, LexError> {
        let start = self.pos;
        let c = self.peek().expect("caller checked");
        let two = match (c, self.peek_ahead(1)) {
            ('=', Some('=')) => Some(TokenKind::EqEq),
            ('!', Some('=')) => Some(TokenKind::Ne),
            ('<', Some('=')) => Some(TokenKind::Le),
            ('>', Some('=')) => Some(TokenKind::Ge),
            ('+', Some('=')) => Some(TokenKind::PlusEq),
            _ => None,
        };
        let kind = if let Some(kind) = two {
            self.bump();
            self.bump();
            kind
        } else {
            let kind = match c {
                '=' => TokenKind::Assign,
                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '*' => TokenKind::Star,
                '/' => TokenKind::Slash,
                '%' => TokenKind::Percent,
                '<' => TokenKind::Lt,
                '>' => TokenKind::Gt,
                '.' => TokenKind::Dot,
                ',' => TokenKind::Comma,
                ':' => TokenKind::Colon,
                ';' => TokenKind::Semi,
                '(' => {
                    self.depth += 1;
                    TokenKind::LParen
                }
                ')' => {
                    self.depth = self.depth.saturating_sub(1);
                    TokenKind::RParen
                }
                '[' => {
                    self.depth += 1;
                    TokenKind::LBracket
                }
                ']' => {
                    self.depth = self.depth.saturating_sub(1);
                    TokenKind::RBracket
                }
                '{' => {
                    self.depth += 1;
                    TokenKind::LBrace
                }
                '}' => {
                    self.depth = self.depth.saturating_sub(1);
                    TokenKind::RBrace
                }
                _ => return Err(LexError::UnexpectedChar { ch: c, pos: start }),
            };
            self.bump();
            kind
        };
        Ok(Token {
            kind,
            text: &self.src[start.byte..self.pos.byte],
            value: None,
            triple_quote: false,
            start,
            end: self.pos,
        })
    }

    /// Consumes an opaque Python block: the keyword's line plus every
    /// following line that is blank or indented, tracking brackets, strings
    /// and comments so that multi-line constructs do not end the block
    /// early. A run of blank lines is included only when an indented line
    /// follows it.
    fn scan_python_block(&mut self, start: Position) -> Token<'a> {
        let end = python_block_end(self.src, start.byte);
        while self.pos.byte < end {
            self.bump();
        }
        Token {
            kind: TokenKind::Python,
            text: &self.src[start.byte..end],
            value: None,
            triple_quote: false,
            start,
            end: self.pos,
        }
    }
}

/// Returns the byte offset one past the last character of the Python block
/// beginning at `start` (exclusive of the newline that terminates it).
fn python_block_end(src: &str, start: usize) -> usize {
    #[derive(Clone, Copy)]
    enum State {
        Normal,
        Comment,
        Str { q: u8, triple: bool },
    }

    let bytes = src.as_bytes();
    let mut i = start;
    let mut depth = 0usize;
    let mut state = State::Normal;
    while i < bytes.len() {
        let b = bytes[i];
        match state {
            State::Normal => match b {
                b'#' => {
                    state = State::Comment;
                    i += 1;
                }
                b'(' | b'[' | b'{' => {
                    depth += 1;
                    i += 1;
                }
                b')' | b']' | b'}' => {
                    depth = depth.saturating_sub(1);
                    i += 1;
                }
                b'\'' | b'"' => {
                    if i + 2 < bytes.len() && bytes[i + 1] == b && bytes[i + 2] == b {
                        state = State::Str { q: b, triple: true };
                        i += 3;
                    } else {
                        state = State::Str { q: b, triple: false };
                        i += 1;
                    }
                }
                b'\\' => i += 2,
                b'\n' if depth == 0 => {
                    if python_block_continues(bytes, i + 1) {
                        i += 1;
                    } else {
                        return i;
                    }
                }
                _ => i += 1,
            },
            State::Comment => {
                if b == b'\n' {
                    state = State::Normal;
                } else {
                    i += 1;
                }
            }
            State::Str { q, triple } => match b {
                b'\\' => i += 2,
                b'\n' if !triple => state = State::Normal,
                b if b == q => {
                    if !triple {
                        state = State::Normal;
                        i += 1;
                    } else if i + 2 < bytes.len() && bytes[i + 1] == q && bytes[i + 2] == q {
                        state = State::Normal;
                        i += 3;
                    } else {
                        i += 1;
                    }
                }
                _ => i += 1,
            },
        }
    }
    bytes.len()
}

fn python_block_continues(bytes: &[u8], start: usize) -> bool {
    let mut i = start;
    loop {
        let line_start = i;
        let mut j = i;
        while j < bytes.len() && matches!(bytes[j], b' ' | b'\t' | b'\r') {
            j += 1;
        }
        if j >= bytes.len() {
            // Nothing but trailing whitespace: leave it outside the block.
            return false;
        }
        if bytes[j] == b'\n' {
            i = j + 1;
            continue;
        }
        return j > line_start;
    }
}
