//! Typed argument readers.
//!
//! Every reader takes a [`Line`] and a start position and returns the parsed
//! value together with the position after it. Errors point at the start of
//! the offending token.

use crate::descriptor::{ArgKind, Width};
use crate::error::{ParseErrorKind, ParseResult};
use crate::scanner::{read, read_token, skip_spaces, Line};
use crate::statement::{Argument, FixedBytes, NumberArray, Register};

const MAX_LABEL: u64 = 0xFFFF;
const MAX_REGISTER: u64 = 0xFF;
const DWORD_WRAP: u64 = 0xFFFF_FFFF;

/// Reads one argument of the given kind.
///
/// # Errors
///
/// Returns the error of the reader selected by `kind`.
pub fn read_argument(kind: ArgKind, line: &Line<'_>, pos: usize) -> ParseResult<(Argument, usize)> {
    match kind {
        ArgKind::Label => read_label(line, pos).map(|(v, p)| (Argument::Label(v), p)),
        ArgKind::Register => read_register(line, pos).map(|(v, p)| (Argument::Register(v), p)),
        ArgKind::Bytes(width) => {
            read_bytes(line, pos, width, false).map(|(v, p)| (Argument::Bytes(v), p))
        }
        ArgKind::Float => read_float(line, pos).map(|(v, p)| (Argument::Float(v), p)),
        ArgKind::String => read_string(line, pos).map(|(v, p)| (Argument::String(v), p)),
        ArgKind::Data => read_data(line, pos).map(|(v, p)| (Argument::Data(v), p)),
        ArgKind::Array => read_array(line, pos).map(|(v, p)| (Argument::Array(v), p)),
        ArgKind::LabelArray => {
            read_label_array(line, pos).map(|(v, p)| (Argument::LabelArray(v), p))
        }
        ArgKind::RegisterArray => {
            read_register_array(line, pos).map(|(v, p)| (Argument::RegisterArray(v), p))
        }
    }
}

/// Reads a decimal label `0..=65535`.
///
/// # Errors
///
/// `LabelFormat` if no digit is found, `LabelRange` if the value is too big.
pub fn read_label(line: &Line<'_>, pos: usize) -> ParseResult<(u16, usize)> {
    let (digits, next) = read(line.text, pos, |c| c.is_ascii_digit());
    if digits.is_empty() {
        return Err(line.error(pos, ParseErrorKind::LabelFormat));
    }

    let label = parse_bounded(digits, MAX_LABEL)
        .and_then(|value| u16::try_from(value).ok())
        .ok_or_else(|| {
            line.error(
                pos,
                ParseErrorKind::LabelRange {
                    value: digits.to_string(),
                },
            )
        })?;

    Ok((label, next))
}

/// Reads a register `R0`..`R255`, case-insensitive.
///
/// # Errors
///
/// `RegisterFormat` if the token is not `R` followed by a number without
/// leading zeros, `RegisterRange` if the number is above 255.
pub fn read_register(line: &Line<'_>, pos: usize) -> ParseResult<(Register, usize)> {
    let (token, next) = read_token(line.text, pos);
    let format_error = || {
        line.error(
            pos,
            ParseErrorKind::RegisterFormat {
                token: token.to_string(),
            },
        )
    };

    let digits = token
        .strip_prefix(|c: char| c.eq_ignore_ascii_case(&'R'))
        .filter(|digits| is_register_number(digits))
        .ok_or_else(format_error)?;

    let number = parse_bounded(digits, MAX_REGISTER)
        .and_then(|value| u8::try_from(value).ok())
        .ok_or_else(|| {
            line.error(
                pos,
                ParseErrorKind::RegisterRange {
                    value: digits.to_string(),
                },
            )
        })?;

    Ok((
        Register {
            number,
            text: token.to_string(),
        },
        next,
    ))
}

/// `0` or one to three digits without a leading zero.
fn is_register_number(digits: &str) -> bool {
    digits == "0"
        || (!digits.is_empty()
            && digits.len() <= 3
            && !digits.starts_with('0')
            && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Reads a fixed-width value and converts it to canonical hex.
///
/// The token is hex if it starts with `0x` or `0`, contains a hex letter, or
/// `hex_input` is set; otherwise it is decimal. A leading `-` marks a signed
/// decimal, stored as its 32-bit two's complement and then cut to `width`.
///
/// # Errors
///
/// `ByteFormat` if the digits are not hex or exceed the width's digit count.
pub fn read_bytes(
    line: &Line<'_>,
    pos: usize,
    width: Width,
    hex_input: bool,
) -> ParseResult<(FixedBytes, usize)> {
    let (token, next) = read_token(line.text, pos);
    let format_error = || line.error(pos, ParseErrorKind::ByteFormat { width });

    let mut digits = token;
    let mut is_hex = hex_input;
    if let Some(rest) = digits.strip_prefix("0x") {
        is_hex = true;
        digits = rest;
    } else if digits.starts_with('0') || digits.contains(is_hex_letter) {
        is_hex = true;
    }

    let (negative, digits) = digits
        .strip_prefix('-')
        .map_or((false, digits), |rest| (true, rest));

    if digits.is_empty()
        || digits.len() > width.hex_digits()
        || !digits.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return Err(format_error());
    }

    if is_hex {
        let bytes = FixedBytes::new(width, digits).ok_or_else(format_error)?;
        return Ok((bytes, next));
    }

    let magnitude: u64 = digits.parse().map_err(|_| format_error())?;
    let value = if negative {
        DWORD_WRAP - magnitude + 1
    } else {
        magnitude
    };

    let bytes = FixedBytes::new(width, &format!("{value:X}")).ok_or_else(format_error)?;
    Ok((bytes, next))
}

/// Reads a float literal matching `-?[0-9.]+`, kept verbatim.
///
/// # Errors
///
/// `FloatFormat` if the token does not match.
pub fn read_float(line: &Line<'_>, pos: usize) -> ParseResult<(String, usize)> {
    let (token, next) = read_token(line.text, pos);
    let body = token.strip_prefix('-').unwrap_or(token);

    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return Err(line.error(pos, ParseErrorKind::FloatFormat));
    }

    Ok((token.to_string(), next))
}

/// Reads a `'...'` or `"..."` string.
///
/// A backslash before the delimiter inserts the delimiter itself; every
/// other character is copied as is.
///
/// # Errors
///
/// `StringExpected` if no quote starts the string, `StringUnterminated` if
/// the line ends before the closing quote.
pub fn read_string(line: &Line<'_>, pos: usize) -> ParseResult<(String, usize)> {
    let Some(delimiter) = line.peek(pos).filter(|&c| matches!(c, '\'' | '"')) else {
        return Err(line.error(pos, ParseErrorKind::StringExpected));
    };

    let start = pos + delimiter.len_utf8();
    let mut chars = line.text[start..]
        .char_indices()
        .map(|(i, c)| (start + i, c))
        .peekable();
    let mut content = String::new();

    while let Some((i, c)) = chars.next() {
        if c == delimiter {
            return Ok((content, i + c.len_utf8()));
        }
        if c == '\\' && chars.peek().is_some_and(|&(_, n)| n == delimiter) {
            chars.next();
            content.push(delimiter);
        } else {
            content.push(c);
        }
    }

    Err(line.error(line.text.len(), ParseErrorKind::StringUnterminated))
}

/// Reads space separated hex bytes, `AA BB CC ...`.
///
/// # Errors
///
/// `DataExpected` if no byte is found, `ByteFormat` for a malformed byte.
pub fn read_data(line: &Line<'_>, pos: usize) -> ParseResult<(Vec<String>, usize)> {
    let mut bytes = Vec::new();
    let mut pos = pos;

    while line.peek(pos).is_some_and(|c| c.is_ascii_hexdigit()) {
        let (byte, next) = read_bytes(line, pos, Width::Byte, true)?;
        bytes.push(byte.hex().to_string());
        pos = skip_spaces(line.text, next);
    }

    if bytes.is_empty() {
        return Err(line.error(pos, ParseErrorKind::DataExpected));
    }

    Ok((bytes, pos))
}

/// Reads a `count:e1:e2:...` number array.
///
/// # Errors
///
/// `ArrayFormat` if the token does not match `[1-9][0-9]*(:[0-9]+)+`,
/// `ArrayCountMismatch` if the count differs from the number of elements.
pub fn read_array(line: &Line<'_>, pos: usize) -> ParseResult<(NumberArray, usize)> {
    let (token, next) = read_token(line.text, pos);
    let format_error = || {
        line.error(
            pos,
            ParseErrorKind::ArrayFormat {
                token: token.to_string(),
            },
        )
    };

    let mut parts = token.split(':');
    let count = parts.next().unwrap_or_default();
    if count.is_empty() || count.starts_with('0') || !is_decimal(count) {
        return Err(format_error());
    }

    let elements: Vec<String> = parts.map(str::to_string).collect();
    if elements.is_empty() || !elements.iter().all(|e| is_decimal(e)) {
        return Err(format_error());
    }

    if count.parse::<usize>().ok() != Some(elements.len()) {
        return Err(line.error(
            pos,
            ParseErrorKind::ArrayCountMismatch {
                count: count.to_string(),
            },
        ));
    }

    Ok((NumberArray::new(elements), next))
}

/// Reads a number array whose elements are labels.
///
/// # Errors
///
/// As [`read_array`], plus `LabelRange` for an element above 65535.
pub fn read_label_array(line: &Line<'_>, pos: usize) -> ParseResult<(NumberArray, usize)> {
    let (array, next) = read_array(line, pos)?;
    if let Some(element) = first_above(&array, MAX_LABEL) {
        return Err(line.error(pos, ParseErrorKind::LabelRange { value: element }));
    }
    Ok((array, next))
}

/// Reads a number array whose elements are register numbers.
///
/// # Errors
///
/// As [`read_array`], plus `RegisterRange` for an element above 255.
pub fn read_register_array(line: &Line<'_>, pos: usize) -> ParseResult<(NumberArray, usize)> {
    let (array, next) = read_array(line, pos)?;
    if let Some(element) = first_above(&array, MAX_REGISTER) {
        return Err(line.error(pos, ParseErrorKind::RegisterRange { value: element }));
    }
    Ok((array, next))
}

/// Consumes the `,` between two arguments.
///
/// # Errors
///
/// `SeparatorExpected` if the character at `pos` is not `,`.
pub fn read_separator(line: &Line<'_>, pos: usize) -> ParseResult<usize> {
    if line.peek(pos) == Some(',') {
        Ok(pos + 1)
    } else {
        Err(line.error(pos, ParseErrorKind::SeparatorExpected))
    }
}

const fn is_hex_letter(c: char) -> bool {
    c.is_ascii_hexdigit() && !c.is_ascii_digit()
}

fn is_decimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parses decimal digits, `None` if the value is above `max`.
fn parse_bounded(digits: &str, max: u64) -> Option<u64> {
    digits.parse::<u64>().ok().filter(|&value| value <= max)
}

fn first_above(array: &NumberArray, max: u64) -> Option<String> {
    array
        .elements()
        .iter()
        .find(|element| parse_bounded(element, max).is_none())
        .cloned()
}
