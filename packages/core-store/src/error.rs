//! Error types shared by the configuration crates.

use std::io;
use std::path::PathBuf;

use crate::path::PathError;

/// Errors produced by configuration stores.
///
/// Reads never produce these: a missing or mistyped node coerces to a
/// default instead. They surface from path construction, the document codec
/// and explicit saves.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("path error: {0}")]
    Path(#[from] PathError),

    /// The document text is not a usable configuration document.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// A value could not be serialized.
    #[error("encode error: {message}")]
    Encode { message: String },

    /// The store was built from a bare stream and has nowhere to save to.
    #[error("no backing file to save the configuration to")]
    NoBackingFile,

    /// The backing file could not be written.
    #[error("failed to write configuration to {}: {error}", .path.display())]
    Write { path: PathBuf, error: io::Error },
}

impl Error {
    pub fn decode(message: impl Into<String>) -> Self {
        Error::Decode {
            message: message.into(),
        }
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Error::Encode {
            message: message.into(),
        }
    }
}
