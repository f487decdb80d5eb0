use std::collections::BTreeMap;

use crate::dbc::types::{
    attributes::AttributeDefinition,
    diagnostics::{Diagnostic, DiagnosticKind},
    options::ParseOptions,
    pending::PendingPool,
};
use crate::kcd::types::{document::Document, network::Network};

/// Mutable state of one parse. Every decoder works on it.
#[derive(Debug)]
pub(crate) struct ParseState {
    pub network: Network,
    /// Node names from `BU_`, in declaration order.
    pub nodes: Vec<String>,
    pub definitions: BTreeMap<String, AttributeDefinition>,
    pub pending: PendingPool,
    pub options: ParseOptions,
    /// First physical line of the record being decoded.
    pub line: usize,
    /// Findings not yet handed to the caller's sink.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseState {
    pub fn new(name: &str, options: ParseOptions) -> Self {
        let mut network: Network = Network {
            document: Document::converted(name),
            ..Default::default()
        };
        network.bus.name = options.bus_name.clone();
        ParseState {
            network,
            nodes: Vec::new(),
            definitions: BTreeMap::new(),
            pending: PendingPool::default(),
            options,
            line: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Records a finding at the current line.
    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::new(kind, self.line, message));
    }

    pub fn warn_at(&mut self, kind: DiagnosticKind, line: usize, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(kind, line, message));
    }
}
