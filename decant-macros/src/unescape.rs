//! Resolves the escapes of a string literal's source text.

use core::fmt;
use core::iter::Peekable;
use core::str::CharIndices;

/// An escape sequence that is not valid Rust.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum UnescapeError {
    /// `\` followed by a character that starts no escape.
    IllegalEscape { index: usize, found: char },
    /// The literal ended right after a `\`.
    TrailingBackslash { index: usize },
    /// `\x` not followed by two hex digits, or above `\x7f`.
    InvalidHex { index: usize },
    /// `\u` not followed by `{1-6 hex digits}` naming a scalar value.
    InvalidUnicode { index: usize },
}

impl fmt::Display for UnescapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnescapeError::IllegalEscape { index, found } => {
                write!(f, "unknown escape `\\{found}` at index {index}")
            }
            UnescapeError::TrailingBackslash { index } => {
                write!(f, "trailing backslash at index {index}")
            }
            UnescapeError::InvalidHex { index } => write!(f, "invalid `\\x` escape at index {index}"),
            UnescapeError::InvalidUnicode { index } => {
                write!(f, "invalid `\\u` escape at index {index}")
            }
        }
    }
}

type Chars<'a> = Peekable<CharIndices<'a>>;

fn hex_escape(chars: &mut Chars<'_>, index: usize) -> Result<char, UnescapeError> {
    let mut value = 0u32;
    for _ in 0..2 {
        match chars.next().and_then(|(_, c)| c.to_digit(16)) {
            Some(digit) => value = value * 16 + digit,
            None => return Err(UnescapeError::InvalidHex { index }),
        }
    }
    if value > 0x7f {
        return Err(UnescapeError::InvalidHex { index });
    }
    char::from_u32(value).ok_or(UnescapeError::InvalidHex { index })
}

fn unicode_escape(chars: &mut Chars<'_>, index: usize) -> Result<char, UnescapeError> {
    let invalid = UnescapeError::InvalidUnicode { index };
    if !matches!(chars.next(), Some((_, '{'))) {
        return Err(invalid);
    }

    let mut value = 0u32;
    let mut digits = 0;
    loop {
        match chars.next() {
            Some((_, '}')) => break,
            Some((_, '_')) if digits > 0 => {}
            Some((_, c)) => {
                let digit = c.to_digit(16).ok_or(UnescapeError::InvalidUnicode { index })?;
                digits += 1;
                if digits > 6 {
                    return Err(invalid);
                }
                value = value * 16 + digit;
            }
            None => return Err(invalid),
        }
    }

    if digits == 0 {
        return Err(invalid);
    }
    char::from_u32(value).ok_or(invalid)
}

/// Unescapes the inside of a `"..."` literal as the Rust lexer would.
///
/// Handles `\\ \" \' \n \r \t \0`, `\xNN`, `\u{N..}` and line continuations
/// (`\` before a newline skips the newline and the following whitespace).
pub(crate) fn unescape(s: &str) -> Result<String, UnescapeError> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some((_, '\\')) => out.push('\\'),
            Some((_, '"')) => out.push('"'),
            Some((_, '\'')) => out.push('\''),
            Some((_, 'n')) => out.push('\n'),
            Some((_, 'r')) => out.push('\r'),
            Some((_, 't')) => out.push('\t'),
            Some((_, '0')) => out.push('\0'),
            Some((_, 'x')) => out.push(hex_escape(&mut chars, index)?),
            Some((_, 'u')) => out.push(unicode_escape(&mut chars, index)?),
            Some((_, '\n')) => {
                while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
            }
            Some((_, found)) => return Err(UnescapeError::IllegalEscape { index, found }),
            None => return Err(UnescapeError::TrailingBackslash { index }),
        }
    }
    Ok(out)
}
