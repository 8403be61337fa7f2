//! String literal encoding and decoding.
//!
//! [`unquote`] turns raw source text (prefix, quotes and escapes included)
//! into the decoded value; [`quote`] re-encodes a value in the printer's
//! canonical style (double quotes). Unrecognized escape sequences are kept
//! verbatim so that decoding and re-encoding never loses information.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QuoteError {
    #[error("invalid \\x escape")]
    InvalidHexEscape,
    #[error("string literal is not quoted")]
    NotQuoted,
}

/// The result of decoding a string literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unquoted {
    pub value: String,
    pub triple: bool,
}

/// Decodes a raw string literal as it appears in the source.
///
/// Accepts an optional `r`/`R` prefix (raw mode: backslashes are kept
/// verbatim), single or triple quotes of either kind, and the usual escape
/// set: `\a \b \f \n \r \t \v \\ \' \"`, octal escapes of up to three
/// digits, and `\xHH`. Any other backslash sequence is preserved as-is.
pub fn unquote(raw: &str) -> Result<Unquoted, QuoteError> {
    let mut s = raw;
    let mut raw_mode = false;
    if let Some(rest) = s.strip_prefix(['r', 'R']) {
        raw_mode = true;
        s = rest;
    }

    let quote = match s.as_bytes().first() {
        Some(b'"') => '"',
        Some(b'\'') => '\'',
        _ => return Err(QuoteError::NotQuoted),
    };
    let triple_open = [quote, quote, quote].iter().collect::<String>();
    let triple = s.len() >= 6 && s.starts_with(&triple_open) && s.ends_with(&triple_open);
    let inner = if triple {
        &s[3..s.len() - 3]
    } else {
        if s.len() < 2 {
            return Err(QuoteError::NotQuoted);
        }
        &s[1..s.len() - 1]
    };

    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        let Some(&esc) = chars.peek() else {
            value.push('\\');
            break;
        };
        if raw_mode {
            // Raw strings keep the backslash and whatever follows it.
            value.push('\\');
            value.push(esc);
            chars.next();
            continue;
        }
        match esc {
            'a' => value.push('\x07'),
            'b' => value.push('\x08'),
            'f' => value.push('\x0c'),
            'n' => value.push('\n'),
            'r' => value.push('\r'),
            't' => value.push('\t'),
            'v' => value.push('\x0b'),
            '\\' => value.push('\\'),
            '\'' => value.push('\''),
            '"' => value.push('"'),
            '0'..='7' => {
                let mut n = 0u32;
                let mut digits = 0;
                while digits < 3 {
                    match chars.peek() {
                        Some(&d @ '0'..='7') => {
                            n = n * 8 + d.to_digit(8).unwrap();
                            chars.next();
                            digits += 1;
                        }
                        _ => break,
                    }
                }
                value.push(char::from_u32(n).unwrap_or('\u{fffd}'));
                continue;
            }
            'x' => {
                chars.next();
                let hi = chars.next().and_then(|d| d.to_digit(16));
                let lo = chars.next().and_then(|d| d.to_digit(16));
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        value.push(char::from_u32(hi * 16 + lo).unwrap_or('\u{fffd}'))
                    }
                    _ => return Err(QuoteError::InvalidHexEscape),
                }
                continue;
            }
            _ => {
                // Unknown escape: keep it so the value round-trips.
                value.push('\\');
                value.push(esc);
            }
        }
        chars.next();
    }

    Ok(Unquoted { value, triple })
}

/// Re-encodes a decoded value as a double-quoted literal.
///
/// Triple-quoted output keeps newlines and tabs literal and only escapes
/// what would terminate the literal early.
pub fn quote(value: &str, triple: bool) -> String {
    let mut content = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        match c {
            '\\' => content.push_str("\\\\"),
            '"' if !triple => content.push_str("\\\""),
            '\n' if !triple => content.push_str("\\n"),
            '\r' if !triple => content.push_str("\\r"),
            '\t' if !triple => content.push_str("\\t"),
            c if (c as u32) < 0x20 && c != '\n' && c != '\r' && c != '\t' => {
                content.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => content.push(c),
        }
    }
    if triple {
        // A run of three quotes, or a quote butting against the closing
        // delimiter, would end the literal early.
        content = content.replace("\"\"\"", "\\\"\\\"\\\"");
        if content.ends_with('"') {
            content.pop();
            content.push_str("\\\"");
        }
        format!("\"\"\"{}\"\"\"", content)
    } else {
        format!("\"{}\"", content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unquote_plain() {
        assert_eq!(
            unquote(r#""hello""#).unwrap(),
            Unquoted {
                value: "hello".to_string(),
                triple: false
            }
        );
        assert_eq!(unquote("'hi'").unwrap().value, "hi");
    }

    #[test]
    fn unquote_escapes() {
        assert_eq!(unquote(r#""a\nb""#).unwrap().value, "a\nb");
        assert_eq!(unquote(r#""a\tb""#).unwrap().value, "a\tb");
        assert_eq!(unquote(r#""\"quoted\"""#).unwrap().value, "\"quoted\"");
        assert_eq!(unquote(r#""\\""#).unwrap().value, "\\");
        assert_eq!(unquote(r#""\101""#).unwrap().value, "A");
        assert_eq!(unquote(r#""\x41""#).unwrap().value, "A");
    }

    #[test]
    fn unquote_unknown_escape_is_preserved() {
        assert_eq!(unquote(r#""a\db""#).unwrap().value, "a\\db");
    }

    #[test]
    fn unquote_raw() {
        assert_eq!(unquote(r#"r"a\nb""#).unwrap().value, "a\\nb");
    }

    #[test]
    fn unquote_triple() {
        let u = unquote("\"\"\"a\nb\"\"\"").unwrap();
        assert!(u.triple);
        assert_eq!(u.value, "a\nb");
    }

    #[test]
    fn unquote_bad_hex() {
        assert_eq!(unquote(r#""\xzz""#), Err(QuoteError::InvalidHexEscape));
    }

    #[test]
    fn quote_round_trips() {
        for value in ["hello", "a\nb", "say \"hi\"", "back\\slash", "tab\there"] {
            let quoted = quote(value, false);
            assert_eq!(unquote(&quoted).unwrap().value, value, "for {:?}", value);
        }
    }

    #[test]
    fn quote_triple_round_trips() {
        for value in ["a\nb\nc", "ends with quote\"", "has \"\"\" inside"] {
            let quoted = quote(value, true);
            let u = unquote(&quoted).unwrap();
            assert!(u.triple);
            assert_eq!(u.value, value, "for {:?}", value);
        }
    }
}
