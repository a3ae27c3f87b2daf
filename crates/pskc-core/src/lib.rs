#![forbid(unsafe_code)]

//! Shared foundation for the PSKC library: the error type, the XML
//! namespace registry, and algorithm URI constants.

pub mod algorithm;
mod error;
pub mod ns;

pub use error::{Error, Result};
