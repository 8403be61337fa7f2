use crate::nodes::Position;
use crate::tokenizer::LexError;
use thiserror::Error;

pub type Result<'a, T> = std::result::Result<T, ParserError<'a>>;

/// A failed parse. The parser reports the first error and stops; there is
/// no recovery and no partial tree. The original module text is carried
/// along for diagnostic rendering.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParserError<'a> {
    #[error("lexical error: {0}")]
    Lex(LexError, &'a str),
    #[error("syntax error at {pos}: unexpected {found}, expected {expected}")]
    Syntax {
        pos: Position,
        /// Description of the offending token.
        found: String,
        /// What the grammar was looking for.
        expected: &'static str,
        module_text: &'a str,
    },
}

impl<'a> ParserError<'a> {
    /// The position the error points at.
    pub fn position(&self) -> Position {
        match self {
            ParserError::Lex(err, _) => err.position(),
            ParserError::Syntax { pos, .. } => *pos,
        }
    }

    /// The source text the error occurred in.
    pub fn module_text(&self) -> &'a str {
        match self {
            ParserError::Lex(_, text) => text,
            ParserError::Syntax { module_text, .. } => module_text,
        }
    }
}
