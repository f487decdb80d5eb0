//! # kcd
//!
//! The CAN network model produced by the DBC decoder, and (feature `xml`) the
//! writer that serializes it as a KCD document.

pub mod types;
#[cfg(feature = "xml")]
pub mod write;

#[cfg(feature = "xml")]
pub use types::errors::KcdWriteError;
#[cfg(feature = "xml")]
pub use write::{KcdOptions, to_file, to_string};
