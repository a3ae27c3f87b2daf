#![forbid(unsafe_code)]

//! Portable Symmetric Key Container (PSKC, RFC 6030) parsing.
//!
//! A PSKC document transports symmetric keys together with metadata:
//! how the key material was encrypted, how its integrity is protected,
//! and per-device attributes.  [`Pskc::parse`] maps a document onto a
//! typed object graph; key material stays encrypted until a caller
//! supplies the encryption context and asks for it:
//!
//! ```no_run
//! use pskc::Pskc;
//!
//! let mut container = Pskc::from_file("tokens.pskcxml")?;
//! container.encryption.derive_key("qwerty")?;
//! for key in &container.keys {
//!     if let Some(secret) = key.secret(&container.encryption, Some(&container.mac))? {
//!         println!("{}: {} secret bytes", key.serial.as_deref().unwrap_or("?"), secret.len());
//!     }
//! }
//! # Ok::<(), pskc::Error>(())
//! ```

pub mod container;
pub mod encryption;
pub mod key;
pub mod mac;
mod value;

pub use container::Pskc;
pub use encryption::Encryption;
pub use key::Key;
pub use mac::Mac;
pub use pskc_core::{Error, Result};
