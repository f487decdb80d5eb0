use std::io;
use thiserror::Error;

/// Errors produced while writing a network into a `.kcd` file.
#[derive(Debug, Error)]
pub enum KcdWriteError {
    #[error("Failed to create '{path}'. \nError: {source}")]
    CreateFile {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to create directories for '{path}'. \nError: {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while writing '{path}'. \nError: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to emit KCD markup: {message}")]
    Xml { message: String },
}
