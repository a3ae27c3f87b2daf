#![forbid(unsafe_code)]

//! PBKDF2 key derivation (RFC 8018).

use pskc_core::{algorithm, Error};

/// PBKDF2 parameters from XML.
#[derive(Debug, Clone)]
pub struct Pbkdf2Params {
    /// PRF algorithm URI; HMAC-SHA1 when the element is absent (the
    /// PKCS#5 default).
    pub prf_uri: Option<String>,
    /// Salt bytes
    pub salt: Vec<u8>,
    /// Iteration count
    pub iteration_count: u32,
    /// Desired key length in bytes
    pub key_length: usize,
}

/// Derive a key using PBKDF2.
pub fn pbkdf2_derive(password: &[u8], params: &Pbkdf2Params) -> Result<Vec<u8>, Error> {
    let prf = match params.prf_uri.as_deref() {
        Some(uri) => algorithm::normalize(uri)
            .ok_or_else(|| Error::UnsupportedAlgorithm(format!("PBKDF2 PRF: {uri}")))?,
        None => algorithm::HMAC_SHA1,
    };

    let mut derived = vec![0u8; params.key_length];
    match prf {
        algorithm::HMAC_SHA1 => {
            pbkdf2::pbkdf2_hmac::<sha1::Sha1>(
                password, &params.salt, params.iteration_count, &mut derived,
            );
        }
        algorithm::HMAC_SHA224 => {
            pbkdf2::pbkdf2_hmac::<sha2::Sha224>(
                password, &params.salt, params.iteration_count, &mut derived,
            );
        }
        algorithm::HMAC_SHA256 => {
            pbkdf2::pbkdf2_hmac::<sha2::Sha256>(
                password, &params.salt, params.iteration_count, &mut derived,
            );
        }
        algorithm::HMAC_SHA384 => {
            pbkdf2::pbkdf2_hmac::<sha2::Sha384>(
                password, &params.salt, params.iteration_count, &mut derived,
            );
        }
        algorithm::HMAC_SHA512 => {
            pbkdf2::pbkdf2_hmac::<sha2::Sha512>(
                password, &params.salt, params.iteration_count, &mut derived,
            );
        }
        _ => return Err(Error::UnsupportedAlgorithm(format!("PBKDF2 PRF: {prf}"))),
    }

    Ok(derived)
}
