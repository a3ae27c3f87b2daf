#![forbid(unsafe_code)]

//! HMAC computation and constant-time verification.

use hmac::{Hmac, Mac};
use pskc_core::{algorithm, Error};

/// Compute an HMAC over `data` with the given algorithm URI.
pub fn compute(uri: &str, key: &[u8], data: &[u8]) -> Result<Vec<u8>, Error> {
    macro_rules! hmac_compute {
        ($hasher:ty) => {{
            let mut mac = <Hmac<$hasher>>::new_from_slice(key)
                .map_err(|e| Error::Crypto(format!("HMAC key: {e}")))?;
            mac.update(data);
            Ok(mac.finalize().into_bytes().to_vec())
        }};
    }
    match canonical(uri)? {
        algorithm::HMAC_SHA1 => hmac_compute!(sha1::Sha1),
        algorithm::HMAC_SHA224 => hmac_compute!(sha2::Sha224),
        algorithm::HMAC_SHA256 => hmac_compute!(sha2::Sha256),
        algorithm::HMAC_SHA384 => hmac_compute!(sha2::Sha384),
        algorithm::HMAC_SHA512 => hmac_compute!(sha2::Sha512),
        other => Err(Error::UnsupportedAlgorithm(format!("MAC: {other}"))),
    }
}

/// Verify an HMAC in constant time.
pub fn verify(uri: &str, key: &[u8], data: &[u8], expected: &[u8]) -> Result<(), Error> {
    macro_rules! hmac_verify {
        ($hasher:ty) => {{
            let mut mac = <Hmac<$hasher>>::new_from_slice(key)
                .map_err(|e| Error::Crypto(format!("HMAC key: {e}")))?;
            mac.update(data);
            mac.verify_slice(expected)
                .map_err(|_| Error::MacInvalid(uri.to_owned()))
        }};
    }
    match canonical(uri)? {
        algorithm::HMAC_SHA1 => hmac_verify!(sha1::Sha1),
        algorithm::HMAC_SHA224 => hmac_verify!(sha2::Sha224),
        algorithm::HMAC_SHA256 => hmac_verify!(sha2::Sha256),
        algorithm::HMAC_SHA384 => hmac_verify!(sha2::Sha384),
        algorithm::HMAC_SHA512 => hmac_verify!(sha2::Sha512),
        other => Err(Error::UnsupportedAlgorithm(format!("MAC: {other}"))),
    }
}

fn canonical(uri: &str) -> Result<&'static str, Error> {
    algorithm::normalize(uri).ok_or_else(|| Error::UnsupportedAlgorithm(format!("MAC: {uri}")))
}
