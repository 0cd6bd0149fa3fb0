//! End-to-end conversion pipeline.
//!
//! 1. **Load**: decode the source file and pick the instruction tables.
//! 2. **Parse**: run every line through the core parser, stopping at the
//!    first error.
//! 3. **Check**: validate label jumps, appending stubs in fix mode.
//! 4. **Write**: render the canonical listing and encode it.
//!
//! Nothing is written when any step before the last one fails.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use pasm_core::{
    parse_source, AliasTable, InstructionDescriptor, LabelWarning, ParseError, ParseOptions,
    Program,
};

use crate::source::{decode, encode, Encoding, SourceError};
use crate::tables::{
    default_aliases, default_descriptor, parse_aliases, parse_descriptor, TableError,
};

/// Prefix of the default output file name.
pub const OUTPUT_PREFIX: &str = "qe_";

/// Conversion error with the file it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertError {
    /// Kind of error.
    pub kind: ConvertErrorKind,
    /// File being read or written, if any.
    pub path: Option<PathBuf>,
}

/// Classification of conversion errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertErrorKind {
    /// Source file could not be decoded.
    Source(SourceError),
    /// Table file is malformed.
    Table(TableError),
    /// Source text failed to parse.
    Parse(ParseError),
    /// I/O error reading or writing a file.
    Io(String),
}

impl ConvertError {
    fn new(kind: ConvertErrorKind, path: &Path) -> Self {
        Self {
            kind,
            path: Some(path.to_path_buf()),
        }
    }

    /// The parse error, if parsing was the step that failed.
    #[must_use]
    pub const fn parse_error(&self) -> Option<&ParseError> {
        match &self.kind {
            ConvertErrorKind::Parse(error) => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for ConvertErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(e) => write!(f, "decode error: {e}"),
            Self::Table(e) => write!(f, "table error: {e}"),
            Self::Parse(e) => write!(f, "{}", e.kind),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.path, &self.kind) {
            (Some(path), ConvertErrorKind::Parse(e)) => {
                write!(f, "{}:{}:{}: {}", path.display(), e.line, e.column, self.kind)
            }
            (Some(path), kind) => write!(f, "{}: {kind}", path.display()),
            (None, kind) => write!(f, "{kind}"),
        }
    }
}

impl std::error::Error for ConvertError {}

impl From<ParseError> for ConvertError {
    fn from(e: ParseError) -> Self {
        Self {
            kind: ConvertErrorKind::Parse(e),
            path: None,
        }
    }
}

/// Instruction tables used for a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
    /// Opcode grammars.
    pub descriptor: InstructionDescriptor,
    /// Legacy opcode spellings.
    pub aliases: AliasTable,
}

impl Tables {
    /// The built-in tables.
    ///
    /// # Errors
    ///
    /// Returns an error if an embedded table is malformed.
    pub fn builtin() -> Result<Self, ConvertError> {
        let table_error = |e| ConvertError {
            kind: ConvertErrorKind::Table(e),
            path: None,
        };
        Ok(Self {
            descriptor: default_descriptor().map_err(table_error)?,
            aliases: default_aliases().map_err(table_error)?,
        })
    }

    /// Loads tables, replacing a built-in one wherever a file is given.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or is malformed.
    pub fn load(opcodes: Option<&Path>, aliases: Option<&Path>) -> Result<Self, ConvertError> {
        let mut tables = Self::builtin()?;
        if let Some(path) = opcodes {
            tables.descriptor = parse_descriptor(&read_table(path)?)
                .map_err(|e| ConvertError::new(ConvertErrorKind::Table(e), path))?;
        }
        if let Some(path) = aliases {
            tables.aliases = parse_aliases(&read_table(path)?)
                .map_err(|e| ConvertError::new(ConvertErrorKind::Table(e), path))?;
        }
        Ok(tables)
    }
}

fn read_table(path: &Path) -> Result<String, ConvertError> {
    fs::read_to_string(path)
        .map_err(|e| ConvertError::new(ConvertErrorKind::Io(e.to_string()), path))
}

/// Result of a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Parsed program including synthesized stubs.
    pub program: Program,
    /// Unresolved label references.
    pub warnings: Vec<LabelWarning>,
    /// Canonical listing, one `\n` terminated line per statement.
    pub text: String,
}

/// Converts source text into its canonical listing.
///
/// # Errors
///
/// Returns the first parse error.
pub fn convert(
    text: &str,
    tables: &Tables,
    options: &ParseOptions,
) -> Result<Conversion, ParseError> {
    let output = parse_source(text, &tables.descriptor, &tables.aliases, options)?;
    let text = output.program.render();

    Ok(Conversion {
        program: output.program,
        warnings: output.warnings,
        text,
    })
}

/// Converts `input` and writes the listing to `output`.
///
/// # Errors
///
/// Returns an error if the input cannot be read or decoded, fails to parse,
/// or the output cannot be written. The output file is left untouched on
/// error.
pub fn convert_file(
    input: &Path,
    output: &Path,
    tables: &Tables,
    options: &ParseOptions,
    encoding: Encoding,
) -> Result<Conversion, ConvertError> {
    let bytes =
        fs::read(input).map_err(|e| ConvertError::new(ConvertErrorKind::Io(e.to_string()), input))?;
    let text = decode(&bytes, encoding)
        .map_err(|e| ConvertError::new(ConvertErrorKind::Source(e), input))?;

    let conversion = convert(&text, tables, options)
        .map_err(|e| ConvertError::new(ConvertErrorKind::Parse(e), input))?;

    fs::write(output, encode(&conversion.text, encoding))
        .map_err(|e| ConvertError::new(ConvertErrorKind::Io(e.to_string()), output))?;

    Ok(conversion)
}

/// Output path next to `input`, named `qe_<file name>`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map_or_else(|| "out.pasm".into(), |n| n.to_string_lossy());
    let parent = input.parent().unwrap_or_else(|| Path::new(""));

    parent.join(format!("{OUTPUT_PREFIX}{name}"))
}
