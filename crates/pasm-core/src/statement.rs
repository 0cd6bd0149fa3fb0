//! Statement model and canonical rendering.
//!
//! A [`Statement`] renders as one line of canonical PASM: the label padded
//! into an 8 character column, the opcode, a space, and the arguments joined
//! with `", "`. Parsing a rendered line yields the same statement again.

use std::fmt;

use crate::descriptor::Width;

/// A register operand, keeping the token as written.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Register {
    /// Register number, `0..=255`.
    pub number: u8,
    /// Token as written, e.g. `r12`.
    pub text: String,
}

/// A fixed-width value in canonical hex form.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct FixedBytes {
    width: Width,
    hex: String,
}

impl FixedBytes {
    /// Canonicalizes `digits` to upper-case hex of exactly `width` digits.
    ///
    /// Shorter input is left-padded with zeros. Longer input keeps its
    /// low-order digits. Returns `None` unless `digits` is non-empty hex.
    #[must_use]
    pub fn new(width: Width, digits: &str) -> Option<Self> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let upper = digits.to_ascii_uppercase();
        let wanted = width.hex_digits();
        let hex = if upper.len() >= wanted {
            upper[upper.len() - wanted..].to_string()
        } else {
            format!("{upper:0>wanted$}")
        };
        Some(Self { width, hex })
    }

    /// Width of the value.
    #[must_use]
    pub const fn width(&self) -> Width {
        self.width
    }

    /// Canonical hex digits.
    #[must_use]
    pub fn hex(&self) -> &str {
        &self.hex
    }
}

/// A `count:e1:e2:...` array. The count always equals the element count.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct NumberArray {
    elements: Vec<String>,
}

impl NumberArray {
    /// Creates an array from decimal element strings.
    #[must_use]
    pub const fn new(elements: Vec<String>) -> Self {
        Self { elements }
    }

    /// Declared element count.
    #[must_use]
    pub fn count(&self) -> usize {
        self.elements.len()
    }

    /// Element strings as written.
    #[must_use]
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// Numeric element values. Elements that do not fit are skipped.
    pub fn values<T: std::str::FromStr>(&self) -> impl Iterator<Item = T> + '_ {
        self.elements.iter().filter_map(|e| e.parse().ok())
    }
}

/// A parsed argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Argument {
    /// Label reference.
    Label(u16),
    /// Register.
    Register(Register),
    /// Fixed-width hex value.
    Bytes(FixedBytes),
    /// Float literal as written.
    Float(String),
    /// String content without delimiters or escapes.
    String(String),
    /// Hex data bytes, two digits each.
    Data(Vec<String>),
    /// Plain number array.
    Array(NumberArray),
    /// Array of label references.
    LabelArray(NumberArray),
    /// Array of register numbers.
    RegisterArray(NumberArray),
}

impl Argument {
    /// Labels this argument jumps to.
    #[must_use]
    pub fn label_references(&self) -> Vec<u16> {
        match self {
            Self::Label(label) => vec![*label],
            Self::LabelArray(array) => array.values().collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(label) => write!(f, "{label}"),
            Self::Register(register) => f.write_str(&register.text),
            Self::Bytes(bytes) => f.write_str(bytes.hex()),
            Self::Float(float) => f.write_str(float),
            Self::String(content) => write!(f, "'{}'", content.replace('\'', "\\'")),
            Self::Data(bytes) => f.write_str(&bytes.join(" ")),
            Self::Array(array) | Self::LabelArray(array) | Self::RegisterArray(array) => {
                write!(f, "{}", array.count())?;
                for element in array.elements() {
                    write!(f, ":{element}")?;
                }
                Ok(())
            }
        }
    }
}

/// One parsed or synthesized PASM statement.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Statement {
    label: Option<u16>,
    opcode: String,
    arguments: Vec<Argument>,
}

impl Statement {
    /// Creates a statement.
    #[must_use]
    pub fn new(label: Option<u16>, opcode: impl Into<String>, arguments: Vec<Argument>) -> Self {
        Self {
            label,
            opcode: opcode.into(),
            arguments,
        }
    }

    /// Label defined by this statement.
    #[must_use]
    pub const fn label(&self) -> Option<u16> {
        self.label
    }

    /// Canonical opcode.
    #[must_use]
    pub fn opcode(&self) -> &str {
        &self.opcode
    }

    /// Arguments in grammar order.
    #[must_use]
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.label.map(|l| format!("{l}:")).unwrap_or_default();
        write!(f, "{label:<8}{} ", self.opcode)?;
        for (i, argument) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{argument}")?;
        }
        Ok(())
    }
}

/// Ordered, append-only list of statements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Program {
    statements: Vec<Statement>,
}

impl Program {
    /// Creates an empty program.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a statement.
    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    /// Statements in source order, followed by synthesized ones.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Iterates over the statements.
    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }

    /// Number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns true if the program has no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Renders every statement on its own `\n`-terminated line.
    #[must_use]
    pub fn render(&self) -> String {
        self.statements
            .iter()
            .map(|statement| format!("{statement}\n"))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}
