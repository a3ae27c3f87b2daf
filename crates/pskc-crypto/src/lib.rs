#![forbid(unsafe_code)]

//! Cryptographic primitives used when unlocking PSKC key material:
//! block ciphers, key wrap, PBKDF2 key derivation, and HMAC.
//!
//! Nothing here touches XML; callers hand in raw bytes and an algorithm
//! URI and get raw bytes back.

pub mod cipher;
pub mod kdf;
pub mod keywrap;
pub mod mac;
