//! Label consistency checking.
//!
//! Label definitions and references are collected while lines are parsed.
//! Once the last line is in, [`LabelTracker::check`] consumes the tracker and
//! compares both sets: every reference without a definition becomes a
//! [`LabelWarning`], and in fix mode a stub statement defining the missing
//! label is appended to the program.

use std::collections::BTreeSet;
use std::fmt;

use crate::statement::{Program, Statement};

/// Label definitions and references seen so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTracker {
    definitions: BTreeSet<u16>,
    references: BTreeSet<u16>,
}

impl LabelTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a definition. Returns false if the label was already defined.
    pub fn define(&mut self, label: u16) -> bool {
        self.definitions.insert(label)
    }

    /// Records a reference to `label`.
    pub fn reference(&mut self, label: u16) {
        self.references.insert(label);
    }

    /// Returns true if `label` has been defined.
    #[must_use]
    pub fn is_defined(&self, label: u16) -> bool {
        self.definitions.contains(&label)
    }

    /// Referenced labels without a definition, in ascending order.
    pub fn missing(&self) -> impl Iterator<Item = u16> + '_ {
        self.references.difference(&self.definitions).copied()
    }

    /// Finishes collection and checks every reference against the definitions.
    ///
    /// With `stub_opcode` set, a `<label>: <stub_opcode>` statement is
    /// appended for every missing label. Existing statements are never
    /// touched.
    pub fn check(self, program: &mut Program, stub_opcode: Option<&str>) -> Vec<LabelWarning> {
        self.missing()
            .map(|label| {
                if let Some(opcode) = stub_opcode {
                    program.push(Statement::new(Some(label), opcode, Vec::new()));
                }
                LabelWarning {
                    label,
                    stub_added: stub_opcode.is_some(),
                }
            })
            .collect()
    }
}

/// A label reference with no matching definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct LabelWarning {
    /// The missing jump target.
    pub label: u16,
    /// Whether a stub definition was appended.
    pub stub_added: bool,
}

impl fmt::Display for LabelWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label jump to '{}' has no target.", self.label)
    }
}
