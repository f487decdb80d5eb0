use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use crate::dbc::core::{
    attributes::{ba_, ba_def_, ba_def_def_},
    bo_, bu_,
    comments::{cm_bo_, cm_sg_},
    lines::{LogicalLines, LogicalRecord},
    record::{RecordKind, classify},
    resolve, sig_valtype_, val_, version,
};
use crate::dbc::types::{
    attributes::AttributeDefinition,
    diagnostics::{DiagnosticKind, DiagnosticSink},
    errors::{DbcParseError, RecordError},
    options::ParseOptions,
    state::ParseState,
};
use crate::kcd::types::network::Network;

/// Stateful DBC decoder.
///
/// One reader parses one file at a time; the finished model and the node list
/// stay available until the next parse. Use one reader per thread.
#[derive(Debug, Default)]
pub struct DbcReader {
    options: ParseOptions,
    nodes: Vec<String>,
    definitions: BTreeMap<String, AttributeDefinition>,
    network: Option<Network>,
    readable: bool,
}

impl DbcReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        DbcReader {
            options,
            ..Default::default()
        }
    }

    /// Parses a DBC file into a network model.
    ///
    /// The file is decoded as Windows-1252. Malformed, unknown or dangling records are
    /// reported to `sink` and skipped; they never fail the parse.
    ///
    /// # Errors
    /// Returns an `Err(DbcParseError)` if:
    /// - The file cannot be opened.
    /// - There are I/O errors while reading.
    /// - The parse was cancelled through [`ParseOptions::cancel`].
    ///
    /// No partial model is kept after an error.
    pub fn parse_file(
        &mut self,
        path: &str,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), DbcParseError> {
        self.reset();
        let file: File = File::open(path).map_err(|source| DbcParseError::OpenFile {
            path: path.to_string(),
            source,
        })?;
        let name: &str = Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(path);
        self.parse_records(name, path, BufReader::new(file), sink)
    }

    /// Parses DBC text from any buffered reader. `name` becomes the document name.
    pub fn parse_reader<R: BufRead>(
        &mut self,
        name: &str,
        reader: R,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), DbcParseError> {
        self.reset();
        self.parse_records(name, name, reader, sink)
    }

    /// Node names of the last successful parse, in declaration order.
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn network(&self) -> Option<&Network> {
        self.network.as_ref()
    }

    pub fn into_network(self) -> Option<Network> {
        self.network
    }

    /// Attribute definitions of the last successful parse, by name.
    pub fn attribute_definitions(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.definitions.values()
    }

    /// Whether the last parse read its input to the end.
    pub fn is_readable(&self) -> bool {
        self.readable
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.definitions.clear();
        self.network = None;
        self.readable = false;
    }

    fn parse_records<R: BufRead>(
        &mut self,
        name: &str,
        path: &str,
        reader: R,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), DbcParseError> {
        let mut state: ParseState = ParseState::new(name, self.options.clone());
        let mut records: usize = 0;

        for record in LogicalLines::new(reader) {
            if state.options.is_cancelled() {
                info!(path, "parse cancelled");
                return Err(DbcParseError::Cancelled {
                    path: path.to_string(),
                });
            }
            let LogicalRecord { line, text } = record.map_err(|source| DbcParseError::Read {
                path: path.to_string(),
                source,
            })?;
            if text.trim().is_empty() {
                continue;
            }
            state.line = line;
            records += 1;
            dispatch(&mut state, &text);
            for diagnostic in state.diagnostics.drain(..) {
                sink.report(diagnostic);
            }
        }

        resolve::finalize(&mut state);
        for diagnostic in state.diagnostics.drain(..) {
            sink.report(diagnostic);
        }

        info!(
            path,
            records,
            nodes = state.nodes.len(),
            messages = state.network.bus.message_count(),
            "DBC parsed"
        );
        self.nodes = state.nodes;
        self.definitions = state.definitions;
        self.network = Some(state.network);
        self.readable = true;
        Ok(())
    }
}

/// Classifies one logical record and hands it to its decoder.
/// Failures become diagnostics; the record is skipped.
fn dispatch(state: &mut ParseState, text: &str) {
    let Some(kind) = classify(text) else {
        state.warn(DiagnosticKind::UnmatchedRecord, first_line(text));
        return;
    };
    debug!(line = state.line, ?kind, "record");

    let result: Result<(), RecordError> = match kind {
        RecordKind::MessageDefinition => bo_::decode(state, text),
        RecordKind::ValueDescription => val_::decode(state, text),
        RecordKind::AttributeDefinition => ba_def_::decode(state, text),
        RecordKind::AttributeDefault => ba_def_def_::decode(state, text),
        RecordKind::AttributeInstance => ba_::decode(state, text),
        RecordKind::SignalComment => cm_sg_::decode(state, text),
        RecordKind::MessageComment => cm_bo_::decode(state, text),
        RecordKind::NodeDeclaration => bu_::decode(state, text),
        RecordKind::Version => version::decode(state, text),
        RecordKind::SignalValueType => sig_valtype_::decode(state, text),
        RecordKind::ValueTable
        | RecordKind::Comment
        | RecordKind::MessageTransmitter
        | RecordKind::NewSymbols
        | RecordKind::BitTiming
        | RecordKind::EnvironmentVariable
        | RecordKind::EnvironmentVariableDescription
        | RecordKind::Unsupported => Ok(()),
    };

    if let Err(e) = result {
        let kind: DiagnosticKind = match e {
            RecordError::UndefinedAttribute { .. } => DiagnosticKind::MissingAttributeDefinition,
            _ => DiagnosticKind::MalformedRecord,
        };
        state.warn(kind, format!("{}: {}", first_line(text), e));
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("").trim()
}
