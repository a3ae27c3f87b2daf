#![forbid(unsafe_code)]

/// Errors produced by the PSKC library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid PSKC document: {0}")]
    Document(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown namespace prefix: {0}")]
    UnknownPrefix(String),

    #[error("unqualified element name in path: {0}")]
    UnqualifiedName(String),

    #[error("invalid integer for {path}: {text:?}")]
    InvalidInt { path: String, text: String },

    #[error("invalid date/time for {path}: {text:?}")]
    InvalidDateTime { path: String, text: String },

    #[error("base64 decode error: {0}")]
    Base64(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("cryptographic error: {0}")]
    Crypto(String),

    #[error("decryption error: {0}")]
    Decryption(String),

    #[error("MAC verification failed: {0}")]
    MacInvalid(String),

    #[error("no key available: {0}")]
    MissingKey(String),

    #[error("missing required element: {0}")]
    MissingElement(String),
}

pub type Result<T> = std::result::Result<T, Error>;
