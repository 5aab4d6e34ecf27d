//! Backslash escape decoding for string literals.

use std::iter::Peekable;
use std::str::Chars;

/// Result of decoding one literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub value: String,
    /// At least one backslash sequence was not a known escape and was kept as written.
    pub invalid: bool,
}

/// Decode the escapes of a string body (quotes already stripped).
///
/// Known escapes: `\\ \' \" \a \b \f \n \r \t \v`, backslash-newline,
/// `\xhh`, `\uXXXX`, `\UXXXXXXXX` and up to three octal digits. Anything else,
/// including a truncated hex escape, is copied verbatim and flags the
/// result as invalid.
pub fn decode_escapes(raw: &str) -> Decoded {
    let mut value = String::with_capacity(raw.len());
    let mut invalid = false;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            value.push('\\');
            invalid = true;
            break;
        };
        match next {
            '\n' => {}
            '\\' => value.push('\\'),
            '\'' => value.push('\''),
            '"' => value.push('"'),
            'a' => value.push('\x07'),
            'b' => value.push('\x08'),
            'f' => value.push('\x0c'),
            'n' => value.push('\n'),
            'r' => value.push('\r'),
            't' => value.push('\t'),
            'v' => value.push('\x0b'),
            '0'..='7' => {
                let mut code = next.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                match char::from_u32(code) {
                    Some(decoded) => value.push(decoded),
                    None => invalid = true,
                }
            }
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                match take_hex(&mut chars, width) {
                    Ok(decoded) => value.push(decoded),
                    Err(consumed) => {
                        value.push('\\');
                        value.push(next);
                        value.push_str(&consumed);
                        invalid = true;
                    }
                }
            }
            other => {
                value.push('\\');
                value.push(other);
                invalid = true;
            }
        }
    }

    Decoded { value, invalid }
}

/// Read exactly `width` hex digits; on failure return what was consumed.
fn take_hex(chars: &mut Peekable<Chars<'_>>, width: usize) -> Result<char, String> {
    let mut digits = String::with_capacity(width);
    while digits.len() < width {
        match chars.peek() {
            Some(c) if c.is_ascii_hexdigit() => {
                digits.push(*c);
                chars.next();
            }
            _ => return Err(digits),
        }
    }
    u32::from_str_radix(&digits, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or(digits)
}
