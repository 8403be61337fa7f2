//! A parser and formatter library for BUILD files.
//!
//! BUILD files are a restricted, declarative Python dialect. This crate
//! parses them into a syntax tree that preserves every source position and
//! every comment, so that formatting is a faithful round trip: parsing the
//! printed output yields the same tree, and printing it again yields the
//! same bytes.
//!
//! # Overview
//!
//! - **Parsing**: [`parse_file`] turns source text into a [`File`] tree;
//!   [`parse_file_with_options`] accepts [`ParseOptions`] (e.g. the strict
//!   dialect without embedded Python blocks); [`parse_expression`] parses a
//!   single expression.
//! - **Formatting**: [`format_file`] / [`format_expr`] print a tree in the
//!   canonical style, guided by the layout hints recorded during parsing.
//! - **Diagnostics**: [`prettify_error`] renders a parse error with the
//!   offending source line and a caret.
//!
//! # Quick Start
//!
//! ```
//! use buildfile_cst::{parse_file, format_file};
//!
//! let source = "cc_library(name = \"lib\", srcs = [\"a.cc\"])\n";
//! let file = parse_file(source).expect("parse error");
//! let formatted = format_file(&file);
//! assert!(formatted.contains("name = \"lib\""));
//! ```

use std::cmp::{max, min};

// ============================================================================
// Public modules and re-exports
// ============================================================================

/// The tree node model: positions, comments, expression variants.
pub mod nodes;
pub use nodes::*;

/// Parse configuration.
pub mod options;
pub use options::ParseOptions;

/// Lexer for BUILD files.
pub mod tokenizer;
pub use tokenizer::{LexError, Token, TokenKind, TokenStream};

/// The grammar driver and comment attachment.
pub mod parser;
pub use parser::{Parser, ParserError, Result};

/// Canonical formatting of parsed trees.
pub mod printer;
pub use printer::{format_expr, format_file};

// ============================================================================
// Parsing functions
// ============================================================================

/// Strips a UTF-8 byte order mark, if present.
fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// Tokenizes BUILD source text.
///
/// This is a low-level entry point; most users want [`parse_file`].
pub fn tokenize(text: &str) -> Result<'_, TokenStream<'_>> {
    let text = strip_bom(text);
    tokenizer::tokenize(text).map_err(|err| ParserError::Lex(err, text))
}

/// Parses a BUILD file with the given options.
pub fn parse_file_with_options<'a>(
    text: &'a str,
    options: ParseOptions,
) -> Result<'a, File> {
    let text = strip_bom(text);
    let stream = tokenizer::tokenize_with_options(text, &options)
        .map_err(|err| ParserError::Lex(err, text))?;
    Parser::new(text, stream).into_file()
}

/// Parses a BUILD file with default options.
pub fn parse_file(text: &str) -> Result<'_, File> {
    parse_file_with_options(text, ParseOptions::default())
}

/// Parses a single expression. Trailing newlines are tolerated.
pub fn parse_expression(text: &str) -> Result<'_, Expr> {
    let text = strip_bom(text);
    let stream = tokenize(text)?;
    Parser::new(text, stream).into_expression()
}

// ============================================================================
// Error formatting
// ============================================================================

/// Returns the byte offset of the beginning of line `n` (1-indexed).
fn bol_offset(source: &str, n: i32) -> usize {
    if n <= 1 {
        return 0;
    }
    source
        .match_indices('\n')
        .nth((n - 2) as usize)
        .map(|(index, _)| index + 1)
        .unwrap_or_else(|| source.len())
}

/// Renders a parse error as a human-readable diagnostic with the relevant
/// source line and the error location highlighted.
///
/// # Example
///
/// ```
/// use buildfile_cst::{parse_file, prettify_error};
///
/// if let Err(e) = parse_file("f(1, ]\n") {
///     let formatted = prettify_error(e, "BUILD");
///     assert!(formatted.contains("BUILD"));
/// }
/// ```
pub fn prettify_error(err: ParserError<'_>, label: &str) -> String {
    use annotate_snippets::{Level, Renderer, Snippet};

    let pos = err.position();
    let text = err.module_text();
    let message = err.to_string();

    let line = max(1, pos.line) as i32;
    let context = 1;
    let line_start = max(1, line - context) as usize;
    let start_offset = bol_offset(text, line - context);
    let end_offset = bol_offset(text, line + context + 1);
    let source = &text[start_offset..end_offset];

    let start = min(pos.byte.saturating_sub(start_offset), source.len());
    let end = min(start + 1, source.len());
    let end = max(end, start);

    let renderer = Renderer::styled();
    let rendered = renderer.render(
        Level::Error.title(label).snippet(
            Snippet::source(source)
                .line_start(line_start)
                .fold(false)
                .annotations(vec![Level::Error.span(start..end).label(&message)]),
        ),
    );
    rendered.to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lex_error_surfaces() {
        let err = parse_file("x = \"unterminated\n").unwrap_err();
        assert!(matches!(
            err,
            ParserError::Lex(LexError::NewlineInString(_), _)
        ));
    }

    #[test]
    fn test_syntax_error_position() {
        let err = parse_file("f(,)\n").unwrap_err();
        match err {
            ParserError::Syntax { pos, .. } => {
                assert_eq!((pos.line, pos.line_rune), (1, 3));
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_mode_refuses_python() {
        let text = "def f():\n    pass\n";
        assert!(parse_file(text).is_ok());
        let err = parse_file_with_options(text, ParseOptions::strict()).unwrap_err();
        assert!(matches!(err, ParserError::Lex(LexError::PythonBlock(_), _)));
    }

    #[test]
    fn test_bom_is_stripped() {
        let file = parse_file("\u{feff}x = 1\n").expect("parse error");
        assert_eq!(file.stmts.len(), 1);
    }

    #[test]
    fn test_empty_file() {
        let file = parse_file("").expect("parse error");
        assert!(file.stmts.is_empty());
        assert_eq!(format_file(&file), "");
    }

    #[test]
    fn test_simple_round_trip() {
        let source = "x = 1\n";
        let file = parse_file(source).expect("parse error");
        assert_eq!(format_file(&file), source);
    }

    #[test]
    fn bol_offset_first_line() {
        assert_eq!(0, bol_offset("hello", 1));
        assert_eq!(0, bol_offset("hello", 0));
        assert_eq!(0, bol_offset("hello\nhello", 1));
    }

    #[test]
    fn bol_offset_second_line() {
        assert_eq!(5, bol_offset("hello", 2));
        assert_eq!(6, bol_offset("hello\nhello", 2));
        assert_eq!(6, bol_offset("hello\nhello\nhello", 2));
    }

    #[test]
    fn bol_offset_last_line() {
        assert_eq!(5, bol_offset("hello", 3));
        assert_eq!(11, bol_offset("hello\nhello", 3));
        assert_eq!(12, bol_offset("hello\nhello\nhello", 3));
    }

    #[test]
    fn test_prettify_error_mentions_label() {
        let err = parse_file("f(1, ]\n").unwrap_err();
        let rendered = prettify_error(err, "pkg/BUILD");
        assert!(rendered.contains("pkg/BUILD"));
    }
}
