//! # dbc
//!
//! `dbc` decodes Vector DBC files into the [`Network`] model.
//!
//! The decoder is best-effort: records that cannot be understood are reported to a
//! [`DiagnosticSink`] and skipped, the rest of the file is still decoded.

pub(crate) mod core;
pub mod parse;
pub mod types;

pub use parse::DbcReader;
pub use types::{
    attributes::{AttributeDefinition, AttributeKind, AttributeTarget, AttributeValue},
    diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, TracingSink, WriteSink},
    errors::{DbcParseError, MessageLayoutError, RecordError},
    options::ParseOptions,
};

use crate::kcd::types::network::Network;

/// Parses a DBC file with default options and returns its network.
///
/// # Errors
/// See [`DbcReader::parse_file`].
///
/// # Example
/// ```no_run
/// use dbc2kcd::dbc;
///
/// let mut diagnostics: Vec<dbc::Diagnostic> = Vec::new();
/// let network = dbc::from_file("vehicle.dbc", &mut diagnostics).expect("Failed to parse DBC file");
/// println!("Parsed {} messages", network.bus.message_count());
/// ```
pub fn from_file(path: &str, sink: &mut dyn DiagnosticSink) -> Result<Network, DbcParseError> {
    let mut reader: DbcReader = DbcReader::new();
    reader.parse_file(path, sink)?;
    Ok(reader.into_network().unwrap_or_default())
}

/// Parses DBC text already held in memory. `name` becomes the document name.
pub fn from_str(name: &str, text: &str, sink: &mut dyn DiagnosticSink) -> Result<Network, DbcParseError> {
    let mut reader: DbcReader = DbcReader::new();
    reader.parse_reader(name, text.as_bytes(), sink)?;
    Ok(reader.into_network().unwrap_or_default())
}
