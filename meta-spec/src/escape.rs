//! # String Escaping
//!
//! Canonical escapes for control characters, backslash and a caller-chosen
//! delimiter (`"` for strings, `'` for characters).
//!
//! | Char      | Escape  |
//! |-----------|---------|
//! | BEL       | `\a`    |
//! | BS        | `\b`    |
//! | FF        | `\f`    |
//! | LF        | `\n`    |
//! | CR        | `\r`    |
//! | TAB       | `\t`    |
//! | VT        | `\v`    |
//! | NUL       | `\0`    |
//! | `\`       | `\\`    |
//! | delimiter | `\` + delimiter |
//! | other control | `\xHH` |

use std::fmt::Write;
use std::str::Chars;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscapeError {
    #[error("Unterminated escape sequence")]
    Unterminated,

    #[error("Unknown escape sequence: \\{0}")]
    UnknownEscape(char),

    #[error("Invalid hex escape: \\x{0}")]
    InvalidHex(String),

    #[error("Unexpected end of input")]
    Empty,
}

fn named_escape(c: char) -> Option<char> {
    match c {
        '\x07' => Some('a'),
        '\x08' => Some('b'),
        '\x0C' => Some('f'),
        '\n' => Some('n'),
        '\r' => Some('r'),
        '\t' => Some('t'),
        '\x0B' => Some('v'),
        '\0' => Some('0'),
        _ => None,
    }
}

/// Write the escaped form of `c` into `out`
pub fn write_escaped_char<W: Write>(out: &mut W, c: char, delimiter: char) -> std::fmt::Result {
    if let Some(e) = named_escape(c) {
        out.write_char('\\')?;
        out.write_char(e)
    } else if c == '\\' || c == delimiter {
        out.write_char('\\')?;
        out.write_char(c)
    } else if c.is_control() {
        write!(out, "\\x{:02x}", c as u32)
    } else {
        out.write_char(c)
    }
}

/// Number of bytes the escaped form of `c` occupies
fn escaped_char_len(c: char, delimiter: char) -> usize {
    if named_escape(c).is_some() || c == '\\' {
        2
    } else if c == delimiter {
        1 + c.len_utf8()
    } else if c.is_control() {
        4
    } else {
        c.len_utf8()
    }
}

/// Escape a single character
pub fn escape_char(c: char, delimiter: char) -> String {
    let mut out = String::with_capacity(escaped_char_len(c, delimiter));
    // Writing to a String cannot fail
    let _ = write_escaped_char(&mut out, c, delimiter);
    out
}

/// Size-only pass: bytes required for the escaped form of `text`
pub fn escaped_len(text: &str, delimiter: char) -> usize {
    text.chars().map(|c| escaped_char_len(c, delimiter)).sum()
}

/// Escape every character of `text`
pub fn escape_string(text: &str, delimiter: char) -> String {
    let mut out = String::with_capacity(escaped_len(text, delimiter));
    for c in text.chars() {
        let _ = write_escaped_char(&mut out, c, delimiter);
    }
    out
}

/// Decode one source character, consuming a full escape sequence if present
pub fn unescape_char(input: &mut Chars<'_>) -> Result<char, EscapeError> {
    let c = input.next().ok_or(EscapeError::Empty)?;
    if c != '\\' {
        return Ok(c);
    }

    let e = input.next().ok_or(EscapeError::Unterminated)?;
    match e {
        'a' => Ok('\x07'),
        'b' => Ok('\x08'),
        'f' => Ok('\x0C'),
        'n' => Ok('\n'),
        'r' => Ok('\r'),
        't' => Ok('\t'),
        'v' => Ok('\x0B'),
        '0' => Ok('\0'),
        'x' => {
            let digits: String = input.by_ref().take(2).collect();
            if digits.len() != 2 || !digits.chars().all(|d| d.is_ascii_hexdigit()) {
                return Err(EscapeError::InvalidHex(digits));
            }
            u8::from_str_radix(&digits, 16)
                .map(char::from)
                .map_err(|_| EscapeError::InvalidHex(digits))
        }
        c if c.is_alphanumeric() => Err(EscapeError::UnknownEscape(c)),
        c => Ok(c),
    }
}

/// Decode a whole escaped string
pub fn unescape_string(text: &str) -> Result<String, EscapeError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while !chars.as_str().is_empty() {
        out.push(unescape_char(&mut chars)?);
    }
    Ok(out)
}
