//! Source file decoding and output encoding.
//!
//! Quest scripts are stored as UTF-16 text. A byte-order mark selects the
//! byte order; files without one are read as little-endian. Output is always
//! written as UTF-16LE with a byte-order mark so the editor picks it up
//! unchanged. A UTF-8 mode is available for tooling that works on plain
//! text.

use std::fmt;

const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Text encoding of input and output files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-16, byte order taken from the BOM; written as UTF-16LE with BOM.
    #[default]
    Utf16,
    /// UTF-8, optional BOM stripped on input; written without BOM.
    Utf8,
}

impl Encoding {
    /// Looks an encoding up by its command-line name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "utf16" | "utf-16" => Some(Self::Utf16),
            "utf8" | "utf-8" => Some(Self::Utf8),
            _ => None,
        }
    }

    /// Command-line name of the encoding.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Utf16 => "utf16",
            Self::Utf8 => "utf8",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure to decode a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// UTF-16 input with an odd number of bytes.
    OddLength {
        /// Length of the input in bytes.
        len: usize,
    },
    /// Unpaired surrogate in UTF-16 input.
    InvalidUtf16 {
        /// Byte offset of the offending code unit.
        offset: usize,
    },
    /// Malformed UTF-8 input.
    InvalidUtf8 {
        /// Byte offset of the first invalid sequence.
        offset: usize,
    },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OddLength { len } => {
                write!(f, "UTF-16 input has an odd length of {len} bytes")
            }
            Self::InvalidUtf16 { offset } => {
                write!(f, "unpaired UTF-16 surrogate at byte {offset}")
            }
            Self::InvalidUtf8 { offset } => write!(f, "invalid UTF-8 at byte {offset}"),
        }
    }
}

impl std::error::Error for SourceError {}

/// Decodes raw file contents.
///
/// # Errors
///
/// Returns a [`SourceError`] if the bytes are not valid text in `encoding`.
pub fn decode(bytes: &[u8], encoding: Encoding) -> Result<String, SourceError> {
    match encoding {
        Encoding::Utf16 => decode_utf16(bytes),
        Encoding::Utf8 => decode_utf8(bytes),
    }
}

/// Encodes text for writing.
#[must_use]
pub fn encode(text: &str, encoding: Encoding) -> Vec<u8> {
    match encoding {
        Encoding::Utf16 => {
            let mut bytes = Vec::with_capacity(2 + text.len() * 2);
            bytes.extend_from_slice(&UTF16_LE_BOM);
            for unit in text.encode_utf16() {
                bytes.extend_from_slice(&unit.to_le_bytes());
            }
            bytes
        }
        Encoding::Utf8 => text.as_bytes().to_vec(),
    }
}

fn decode_utf16(bytes: &[u8]) -> Result<String, SourceError> {
    let (body, big_endian, skipped) = if let Some(rest) = bytes.strip_prefix(&UTF16_BE_BOM) {
        (rest, true, UTF16_BE_BOM.len())
    } else if let Some(rest) = bytes.strip_prefix(&UTF16_LE_BOM) {
        (rest, false, UTF16_LE_BOM.len())
    } else {
        (bytes, false, 0)
    };

    if body.len() % 2 == 1 {
        return Err(SourceError::OddLength { len: bytes.len() });
    }

    let units = body.chunks_exact(2).map(|pair| {
        let pair = [pair[0], pair[1]];
        if big_endian {
            u16::from_be_bytes(pair)
        } else {
            u16::from_le_bytes(pair)
        }
    });

    let mut text = String::with_capacity(body.len() / 2);
    let mut offset = skipped;
    for decoded in char::decode_utf16(units) {
        let c = decoded.map_err(|_| SourceError::InvalidUtf16 { offset })?;
        offset += c.len_utf16() * 2;
        text.push(c);
    }

    Ok(text)
}

fn decode_utf8(bytes: &[u8]) -> Result<String, SourceError> {
    let body = bytes.strip_prefix(&UTF8_BOM).unwrap_or(bytes);
    std::str::from_utf8(body)
        .map(str::to_string)
        .map_err(|e| SourceError::InvalidUtf8 {
            offset: bytes.len() - body.len() + e.valid_up_to(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    #[test]
    fn encoding_names() {
        assert_eq!(Encoding::from_name("UTF-16"), Some(Encoding::Utf16));
        assert_eq!(Encoding::from_name("utf8"), Some(Encoding::Utf8));
        assert_eq!(Encoding::from_name("latin1"), None);
        assert_eq!(Encoding::default().to_string(), "utf16");
    }

    #[test]
    fn utf16_without_bom_is_little_endian() {
        assert_eq!(decode(&utf16le("ret\n"), Encoding::Utf16).unwrap(), "ret\n");
    }

    #[test]
    fn utf16_boms_select_byte_order() {
        let mut le = UTF16_LE_BOM.to_vec();
        le.extend(utf16le("nop"));
        assert_eq!(decode(&le, Encoding::Utf16).unwrap(), "nop");

        let mut be = UTF16_BE_BOM.to_vec();
        be.extend("nop".encode_utf16().flat_map(u16::to_be_bytes));
        assert_eq!(decode(&be, Encoding::Utf16).unwrap(), "nop");
    }

    #[test]
    fn utf16_rejects_odd_length() {
        assert_eq!(
            decode(&[0x72, 0x00, 0x65], Encoding::Utf16),
            Err(SourceError::OddLength { len: 3 })
        );
    }

    #[test]
    fn utf16_rejects_unpaired_surrogate() {
        let mut bytes = utf16le("a");
        bytes.extend_from_slice(&0xD800u16.to_le_bytes());
        bytes.extend(utf16le("b"));
        assert_eq!(
            decode(&bytes, Encoding::Utf16),
            Err(SourceError::InvalidUtf16 { offset: 2 })
        );
    }

    #[test]
    fn utf16_keeps_surrogate_pairs() {
        let bytes = utf16le("'\u{1F600}'");
        assert_eq!(decode(&bytes, Encoding::Utf16).unwrap(), "'\u{1F600}'");
    }

    #[test]
    fn utf8_strips_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"ret");
        assert_eq!(decode(&bytes, Encoding::Utf8).unwrap(), "ret");
        assert_eq!(
            decode(&[b'a', 0xFF], Encoding::Utf8),
            Err(SourceError::InvalidUtf8 { offset: 1 })
        );
    }

    #[test]
    fn utf16_output_has_bom() {
        let bytes = encode("ret \n", Encoding::Utf16);
        assert_eq!(&bytes[..2], &UTF16_LE_BOM);
        assert_eq!(decode(&bytes, Encoding::Utf16).unwrap(), "ret \n");
        assert_eq!(encode("ret", Encoding::Utf8), b"ret");
    }
}
