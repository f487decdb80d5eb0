pub mod attributes;
pub mod diagnostics;
pub mod errors;
pub mod options;
pub mod pending;
pub(crate) mod state;
