//! Instruction descriptor and alias table.
//!
//! Both tables are supplied by the caller and only read by the parser. The
//! descriptor maps a canonical opcode name to the ordered list of argument
//! kinds it takes; the alias table maps legacy spellings to canonical names
//! and is consulted before the descriptor.

use std::collections::HashMap;
use std::fmt;

/// Width of a fixed-size hex value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Width {
    /// One byte, two hex digits.
    Byte,
    /// Two bytes, four hex digits.
    Word,
    /// Four bytes, eight hex digits.
    Dword,
}

impl Width {
    /// Number of bytes covered by this width.
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::Byte => 1,
            Self::Word => 2,
            Self::Dword => 4,
        }
    }

    /// Number of hex digits in the canonical form.
    #[must_use]
    pub const fn hex_digits(self) -> usize {
        self.bytes() * 2
    }

    /// Upper-case name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Byte => "BYTE",
            Self::Word => "WORD",
            Self::Dword => "DWORD",
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Argument grammar entry: which reader parses an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ArgKind {
    /// Label reference (`0..=65535`).
    Label,
    /// Register `R0`..`R255`.
    Register,
    /// Fixed-width value rendered as hex.
    Bytes(Width),
    /// Float literal, kept verbatim.
    Float,
    /// Quoted string.
    String,
    /// Space separated hex bytes.
    Data,
    /// `count:n1:n2:...` number array.
    Array,
    /// Number array whose elements are label references.
    LabelArray,
    /// Number array whose elements are register numbers.
    RegisterArray,
}

impl ArgKind {
    /// All kinds in table order.
    pub const ALL: [Self; 11] = [
        Self::Label,
        Self::Register,
        Self::Bytes(Width::Byte),
        Self::Bytes(Width::Word),
        Self::Bytes(Width::Dword),
        Self::Float,
        Self::String,
        Self::Data,
        Self::Array,
        Self::LabelArray,
        Self::RegisterArray,
    ];

    /// Name used in descriptor table files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Label => "label",
            Self::Register => "register",
            Self::Bytes(Width::Byte) => "byte",
            Self::Bytes(Width::Word) => "word",
            Self::Bytes(Width::Dword) => "dword",
            Self::Float => "float",
            Self::String => "string",
            Self::Data => "data",
            Self::Array => "array",
            Self::LabelArray => "label_array",
            Self::RegisterArray => "register_array",
        }
    }

    /// Looks a kind up by its table name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Returns true if values of this kind are jump targets.
    #[must_use]
    pub const fn references_labels(self) -> bool {
        matches!(self, Self::Label | Self::LabelArray)
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opcode name to argument grammar mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructionDescriptor {
    grammars: HashMap<String, Vec<ArgKind>>,
}

impl InstructionDescriptor {
    /// Creates an empty descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the grammar of `opcode`, returning the previous one.
    pub fn insert(&mut self, opcode: impl Into<String>, kinds: Vec<ArgKind>) -> Option<Vec<ArgKind>> {
        self.grammars.insert(opcode.into(), kinds)
    }

    /// Returns the argument grammar of `opcode`.
    #[must_use]
    pub fn grammar(&self, opcode: &str) -> Option<&[ArgKind]> {
        self.grammars.get(opcode).map(Vec::as_slice)
    }

    /// Returns true if `opcode` is described.
    #[must_use]
    pub fn contains(&self, opcode: &str) -> bool {
        self.grammars.contains_key(opcode)
    }

    /// Number of described opcodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    /// Returns true if no opcode is described.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }

    /// Iterates over described opcode names in no particular order.
    pub fn opcodes(&self) -> impl Iterator<Item = &str> {
        self.grammars.keys().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<ArgKind>)> for InstructionDescriptor {
    fn from_iter<T: IntoIterator<Item = (S, Vec<ArgKind>)>>(iter: T) -> Self {
        Self {
            grammars: iter
                .into_iter()
                .map(|(name, kinds)| (name.into(), kinds))
                .collect(),
        }
    }
}

/// Legacy opcode spelling to canonical spelling mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl AliasTable {
    /// Creates an empty alias table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an alias, returning the previous target.
    pub fn insert(
        &mut self,
        alias: impl Into<String>,
        canonical: impl Into<String>,
    ) -> Option<String> {
        self.aliases.insert(alias.into(), canonical.into())
    }

    /// Returns the canonical spelling of `opcode`, or `opcode` itself.
    #[must_use]
    pub fn resolve<'a>(&'a self, opcode: &'a str) -> &'a str {
        self.aliases.get(opcode).map_or(opcode, String::as_str)
    }

    /// Number of aliases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Returns true if there are no aliases.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl<A: Into<String>, C: Into<String>> FromIterator<(A, C)> for AliasTable {
    fn from_iter<T: IntoIterator<Item = (A, C)>>(iter: T) -> Self {
        Self {
            aliases: iter
                .into_iter()
                .map(|(alias, canonical)| (alias.into(), canonical.into()))
                .collect(),
        }
    }
}
