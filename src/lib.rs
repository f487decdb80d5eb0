//! # dbc2kcd
//!
//! Converts **automotive CAN** network descriptions from Vector DBC to the KCD
//! (Kayak) XML format.
//!
//! ## Highlights
//! - **DBC decoder**: best-effort, line-numbered diagnostics, Windows-1252 input.
//! - **Network model**: a SlotMap-backed [`Bus`] keeps declaration order and O(1) id lookups.
//! - **Multiplexing**: `M`/`mN` signals are folded into [`Multiplex`] groups.
//! - **CAN FD**: `VFrameFormat` and `CANFD_BRS` attributes resolve to per-message flags.
//! - **KCD writer** (feature `xml`): pretty or compact XML, optionally gzip-compressed.
//!
//! ## Example
//! ```no_run
//! use dbc2kcd::{dbc, kcd};
//!
//! let mut sink = dbc::TracingSink;
//! let network = dbc::from_file("vehicle.dbc", &mut sink).expect("Failed to parse DBC file");
//! kcd::to_file(&network, "vehicle.kcd", &kcd::KcdOptions::default()).expect("Failed to write KCD");
//! ```

pub mod dbc;
pub mod kcd;

#[doc(inline)]
pub use crate::dbc::{Diagnostic, DiagnosticKind, DiagnosticSink, DbcReader, ParseOptions};
#[doc(inline)]
pub use crate::kcd::types::{
    document::Document,
    message::{IdFormat, Message},
    network::{Bus, MessageKey, Network},
    node::Node,
    signal::{Endianness, Label, LabelSet, Multiplex, MuxGroup, Signal, Value, ValueType},
};
