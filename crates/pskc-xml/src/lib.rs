#![forbid(unsafe_code)]

//! XML helpers for PSKC parsing: roxmltree parsing options and the
//! namespace-qualified typed element accessors every parser in the
//! library is built on.

pub mod accessor;

pub use accessor::{child, children, find, find_all, find_int, find_text, find_time};

/// Return roxmltree parsing options that allow DTD.
///
/// DTD is allowed because roxmltree does not expand external entities or
/// perform entity substitution beyond the five predefined XML entities.
/// Some provisioning tools emit PSKC files with a DOCTYPE header.
pub fn parsing_options() -> roxmltree::ParsingOptions {
    roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    }
}
