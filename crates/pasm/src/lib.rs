//! PASM script checker and qedit export tool.

/// End-to-end conversion pipeline from source file to canonical listing.
pub mod converter;
/// Source decoding (UTF-16 / UTF-8) and output encoding.
pub mod source;
/// Instruction descriptor and alias table files, plus the built-in tables.
pub mod tables;
