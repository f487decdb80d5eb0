use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::kcd::types::network::DEFAULT_BUS_NAME;

/// Decoder configuration.
#[derive(Clone, Debug)]
pub struct ParseOptions {
    /// Bus name used unless a `DBName` attribute provides one.
    pub bus_name: String,
    /// Check every signal against its message length and report overruns.
    pub check_layout: bool,
    /// Set from another thread to abandon the parse between two records.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            bus_name: DEFAULT_BUS_NAME.to_string(),
            check_layout: true,
            cancel: None,
        }
    }
}

impl ParseOptions {
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}
