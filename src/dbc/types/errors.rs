use std::io;
use thiserror::Error;

/// Errors that abort the parse of a `.dbc` file.
#[derive(Debug, Error)]
pub enum DbcParseError {
    #[error("Failed to open '{path}'. \nError: {source}")]
    OpenFile {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while reading '{path}'. \nError: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Parse of '{path}' was cancelled")]
    Cancelled { path: String },
}

/// Reasons a single logical record is skipped. Never fatal for the file.
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("missing field '{field}'")]
    MissingField { field: &'static str },
    #[error("invalid {field} '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("unknown attribute type '{kind}'")]
    UnknownAttributeType { kind: String },
    #[error("unknown attribute target '{target}'")]
    UnknownAttributeTarget { target: String },
    #[error("attribute '{name}' has no definition")]
    UndefinedAttribute { name: String },
    #[error("value '{value}' is not a member of enum attribute '{name}'")]
    InvalidEnumValue { name: String, value: String },
    #[error("attribute '{name}' is defined for {expected} objects")]
    TargetMismatch { name: String, expected: &'static str },
    #[error("message {id} ({format}) is already defined")]
    DuplicateMessage { id: u32, format: &'static str },
    #[error("relation attribute '{name}' has no KCD counterpart")]
    RelationAttribute { name: String },
    #[error(transparent)]
    Layout(#[from] MessageLayoutError),
}

/// Errors produced while verifying that a signal fits a CAN frame layout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageLayoutError {
    #[error("Signal Bit Length cannot be zero")]
    ZeroBitLength,
    #[error("Signal Bit Length {length} exceeds 64 bits")]
    TooLong { length: u16 },
    #[error("Out of bounds (Intel)! Signal end bit = {end}, message total bits = {total_bits}")]
    IntelOutOfBounds { end: usize, total_bits: usize },
    #[error(
        "Out of bounds (Motorola)! Signal linearized end = {end}, message total bits = {total_bits}"
    )]
    MotorolaOutOfBounds { end: usize, total_bits: usize },
}
