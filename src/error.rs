//! Error types shared by the engine and the binary.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The embedded word list could not be loaded
    #[error("corpus error: {0}")]
    Corpus(String),

    /// A generator, timer or session setting is unusable
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
