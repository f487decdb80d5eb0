use serde::Serialize;
use std::fmt;
use std::io::Write;

/// Category of a non-fatal condition met while decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// Record with no recognized keyword.
    UnmatchedRecord,
    /// Recognized record that could not be decoded; it was skipped.
    MalformedRecord,
    /// Attribute instance or default whose definition is missing.
    MissingAttributeDefinition,
    /// Label, comment, value type or attribute pointing at nothing.
    UnresolvedReference,
    /// Mux groups dropped because the message has zero or several multiplexors.
    DiscardedMultiplex,
    /// Signal bits outside the declared payload.
    SignalOutOfBounds,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticKind::UnmatchedRecord => "unmatched record",
            DiagnosticKind::MalformedRecord => "malformed record",
            DiagnosticKind::MissingAttributeDefinition => "missing attribute definition",
            DiagnosticKind::UnresolvedReference => "unresolved reference",
            DiagnosticKind::DiscardedMultiplex => "discarded multiplex",
            DiagnosticKind::SignalOutOfBounds => "signal out of bounds",
        };
        f.write_str(s)
    }
}

/// One non-fatal finding.
///
/// `line` is the 1-based physical line where the offending record starts.
/// 0 means no line applies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, line: usize, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "line {}: {}: {}", self.line, self.kind, self.message)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

/// Caller-supplied destination of diagnostics.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Forwards every diagnostic to `tracing` at WARN level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(
            kind = %diagnostic.kind,
            line = diagnostic.line,
            "{}",
            diagnostic.message
        );
    }
}

/// Writes one line per diagnostic to any `io::Write`.
///
/// A failed write never interrupts the parse: it is logged with `tracing::warn!`
/// and counted in [`WriteSink::failed_writes`].
#[derive(Debug)]
pub struct WriteSink<W: Write> {
    inner: W,
    failed: usize,
}

impl<W: Write> WriteSink<W> {
    pub fn new(inner: W) -> Self {
        WriteSink { inner, failed: 0 }
    }

    /// Number of diagnostics that could not be written.
    pub fn failed_writes(&self) -> usize {
        self.failed
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> DiagnosticSink for WriteSink<W> {
    fn report(&mut self, diagnostic: Diagnostic) {
        if let Err(e) = writeln!(self.inner, "{diagnostic}") {
            self.failed += 1;
            tracing::warn!(error = %e, %diagnostic, "failed to write diagnostic");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_sink_formats_lines() {
        let mut sink = WriteSink::new(Vec::new());
        sink.report(Diagnostic::new(
            DiagnosticKind::UnmatchedRecord,
            12,
            "FOO_ bar",
        ));
        sink.report(Diagnostic::new(
            DiagnosticKind::UnresolvedReference,
            0,
            "label for message 5",
        ));
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            text,
            "line 12: unmatched record: FOO_ bar\nunresolved reference: label for message 5\n"
        );
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_sink_counts_failed_writes() {
        let mut sink = WriteSink::new(BrokenPipe);
        sink.report(Diagnostic::new(DiagnosticKind::MalformedRecord, 3, "BO_ x"));
        sink.report(Diagnostic::new(DiagnosticKind::MalformedRecord, 4, "BO_ y"));
        assert_eq!(sink.failed_writes(), 2);
    }
}
