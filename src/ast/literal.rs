//! Integer and string literal decoding.

use serde::Serialize;

/// A decoded integer constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntegerLiteral {
    pub value: i64,
    /// Written with an `l`/`L` suffix.
    pub long_suffix: bool,
}

impl IntegerLiteral {
    /// True when the constant needs `long`: suffixed, or too wide for `int`.
    pub fn is_long(&self) -> bool {
        self.long_suffix || i32::try_from(self.value).is_err()
    }
}

/// Parse decimal, octal or hexadecimal integer text with an optional `l`/`L`
/// suffix. Returns `None` for malformed digits or values beyond `i64`.
pub fn parse_integer_literal(text: &str) -> Option<IntegerLiteral> {
    let (digits, long_suffix) = match text.strip_suffix(['l', 'L']) {
        Some(stripped) => (stripped, true),
        None => (text, false),
    };

    let (digits, radix) = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        (hex, 16)
    } else if digits.len() > 1
        && let Some(octal) = digits.strip_prefix('0')
    {
        (octal, 8)
    } else {
        (digits, 10)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let value = i64::from_str_radix(digits, radix).ok()?;
    Some(IntegerLiteral { value, long_suffix })
}

/// Number of bytes a string literal occupies, excluding the terminator.
/// `text` includes the surrounding quotes; each escape sequence counts once.
pub fn decoded_string_length(text: &str) -> u64 {
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);

    let mut length = 0;
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        length += if c == '\\' {
            match chars.next() {
                Some('x') => {
                    while chars.next_if(|c| c.is_ascii_hexdigit()).is_some() {}
                    1
                }
                Some(d) if d.is_digit(8) => {
                    for _ in 0..2 {
                        if chars.next_if(|c| c.is_digit(8)).is_none() {
                            break;
                        }
                    }
                    1
                }
                Some(_) => 1,
                None => 0,
            }
        } else {
            c.len_utf8() as u64
        };
    }
    length
}
