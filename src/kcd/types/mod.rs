pub mod document;
#[cfg(feature = "xml")]
pub mod errors;
pub mod message;
pub mod network;
pub mod node;
pub mod signal;
