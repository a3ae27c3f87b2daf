#![forbid(unsafe_code)]

//! Block cipher implementations (AES-CBC, 3DES-CBC).
//!
//! Per RFC 6030 the IV is transported as a prefix of the cipher data:
//! encrypt emits `IV || ciphertext`, decrypt splits it off again.
//! Padding is PKCS#7.

use pskc_core::{algorithm, Error};

/// Trait for cipher algorithms.
pub trait CipherAlgorithm: Send {
    fn uri(&self) -> &'static str;
    fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, Error>;
    fn decrypt(&self, key: &[u8], data: &[u8]) -> Result<Vec<u8>, Error>;
    fn key_size(&self) -> usize;
}

/// Create a cipher algorithm from its URI.
pub fn from_uri(uri: &str) -> Result<Box<dyn CipherAlgorithm>, Error> {
    match uri {
        algorithm::AES128_CBC => Ok(Box::new(AesCbc {
            key_size: 16,
            uri: algorithm::AES128_CBC,
        })),
        algorithm::AES192_CBC => Ok(Box::new(AesCbc {
            key_size: 24,
            uri: algorithm::AES192_CBC,
        })),
        algorithm::AES256_CBC => Ok(Box::new(AesCbc {
            key_size: 32,
            uri: algorithm::AES256_CBC,
        })),
        algorithm::TRIPLEDES_CBC => Ok(Box::new(TripleDesCbc)),
        _ => Err(Error::UnsupportedAlgorithm(format!("cipher: {uri}"))),
    }
}

fn pkcs7_pad(data: &[u8], block: usize) -> Vec<u8> {
    let pad = block - data.len() % block;
    let mut out = Vec::with_capacity(data.len() + pad);
    out.extend_from_slice(data);
    out.extend(std::iter::repeat(pad as u8).take(pad));
    out
}

fn pkcs7_unpad(data: &[u8], block: usize) -> Result<Vec<u8>, Error> {
    let Some(&pad) = data.last() else {
        return Err(Error::Decryption("empty plaintext".into()));
    };
    let pad = pad as usize;
    if pad == 0 || pad > block || pad > data.len() {
        return Err(Error::Decryption("invalid padding".into()));
    }
    if !data[data.len() - pad..].iter().all(|&b| b as usize == pad) {
        return Err(Error::Decryption("invalid padding".into()));
    }
    Ok(data[..data.len() - pad].to_vec())
}

// ── AES-CBC ──────────────────────────────────────────────────────────

struct AesCbc {
    key_size: usize,
    uri: &'static str,
}

impl CipherAlgorithm for AesCbc {
    fn uri(&self) -> &'static str {
        self.uri
    }
    fn key_size(&self) -> usize {
        self.key_size
    }

    fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        use cbc::cipher::{BlockEncryptMut, KeyIvInit};
        use rand::RngCore;

        if key.len() != self.key_size {
            return Err(Error::Crypto(format!(
                "expected {} byte key, got {}",
                self.key_size,
                key.len()
            )));
        }

        let mut iv = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut iv);

        // Already PKCS7-padded, use NoPadding in cipher
        let mut buf = pkcs7_pad(plaintext, 16);
        let buf_len = buf.len();

        macro_rules! do_encrypt {
            ($aes:ty) => {{
                let enc = cbc::Encryptor::<$aes>::new_from_slices(key, &iv)
                    .map_err(|e| Error::Crypto(format!("AES-CBC init: {e}")))?;
                enc.encrypt_padded_mut::<cbc::cipher::block_padding::NoPadding>(&mut buf, buf_len)
                    .map_err(|e| Error::Crypto(format!("AES-CBC encrypt: {e}")))?;
            }};
        }

        match self.key_size {
            16 => do_encrypt!(aes::Aes128),
            24 => do_encrypt!(aes::Aes192),
            32 => do_encrypt!(aes::Aes256),
            _ => return Err(Error::Crypto("unsupported AES key size".into())),
        }

        let mut result = Vec::with_capacity(16 + buf.len());
        result.extend_from_slice(&iv);
        result.extend_from_slice(&buf);
        Ok(result)
    }

    fn decrypt(&self, key: &[u8], data: &[u8]) -> Result<Vec<u8>, Error> {
        use cbc::cipher::{BlockDecryptMut, KeyIvInit};

        if key.len() != self.key_size {
            return Err(Error::Crypto(format!(
                "expected {} byte key, got {}",
                self.key_size,
                key.len()
            )));
        }
        if data.len() < 32 || data.len() % 16 != 0 {
            return Err(Error::Decryption("AES-CBC data invalid length".into()));
        }

        let iv = &data[..16];
        let mut buf = data[16..].to_vec();

        macro_rules! do_decrypt {
            ($aes:ty) => {{
                let dec = cbc::Decryptor::<$aes>::new_from_slices(key, iv)
                    .map_err(|e| Error::Crypto(format!("AES-CBC init: {e}")))?;
                dec.decrypt_padded_mut::<cbc::cipher::block_padding::NoPadding>(&mut buf)
                    .map_err(|e| Error::Decryption(format!("AES-CBC decrypt: {e}")))?;
            }};
        }

        match self.key_size {
            16 => do_decrypt!(aes::Aes128),
            24 => do_decrypt!(aes::Aes192),
            32 => do_decrypt!(aes::Aes256),
            _ => return Err(Error::Crypto("unsupported AES key size".into())),
        }

        pkcs7_unpad(&buf, 16)
    }
}

// ── 3DES-CBC ─────────────────────────────────────────────────────────

struct TripleDesCbc;

impl CipherAlgorithm for TripleDesCbc {
    fn uri(&self) -> &'static str {
        algorithm::TRIPLEDES_CBC
    }
    fn key_size(&self) -> usize {
        24
    }

    fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        use cbc::cipher::{BlockEncryptMut, KeyIvInit};
        use rand::RngCore;

        if key.len() != 24 {
            return Err(Error::Crypto(format!(
                "expected 24 byte 3DES key, got {}",
                key.len()
            )));
        }

        let mut iv = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut iv);

        let mut buf = pkcs7_pad(plaintext, 8);
        let buf_len = buf.len();
        let enc = cbc::Encryptor::<des::TdesEde3>::new_from_slices(key, &iv)
            .map_err(|e| Error::Crypto(format!("3DES-CBC init: {e}")))?;
        enc.encrypt_padded_mut::<cbc::cipher::block_padding::NoPadding>(&mut buf, buf_len)
            .map_err(|e| Error::Crypto(format!("3DES-CBC encrypt: {e}")))?;

        let mut result = Vec::with_capacity(8 + buf.len());
        result.extend_from_slice(&iv);
        result.extend_from_slice(&buf);
        Ok(result)
    }

    fn decrypt(&self, key: &[u8], data: &[u8]) -> Result<Vec<u8>, Error> {
        use cbc::cipher::{BlockDecryptMut, KeyIvInit};

        if key.len() != 24 {
            return Err(Error::Crypto(format!(
                "expected 24 byte 3DES key, got {}",
                key.len()
            )));
        }
        if data.len() < 16 || data.len() % 8 != 0 {
            return Err(Error::Decryption("3DES-CBC data invalid length".into()));
        }

        let iv = &data[..8];
        let mut buf = data[8..].to_vec();
        let dec = cbc::Decryptor::<des::TdesEde3>::new_from_slices(key, iv)
            .map_err(|e| Error::Crypto(format!("3DES-CBC init: {e}")))?;
        dec.decrypt_padded_mut::<cbc::cipher::block_padding::NoPadding>(&mut buf)
            .map_err(|e| Error::Decryption(format!("3DES-CBC decrypt: {e}")))?;

        pkcs7_unpad(&buf, 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aes128_cbc_roundtrip() {
        let cipher = from_uri(pskc_core::algorithm::AES128_CBC).unwrap();
        let key = [0x42u8; 16];
        let plaintext = b"12345678901234567890";
        let data = cipher.encrypt(&key, plaintext).unwrap();
        // IV prefix plus two padded blocks
        assert_eq!(data.len(), 16 + 32);
        assert_eq!(cipher.decrypt(&key, &data).unwrap(), plaintext);
    }

    #[test]
    fn test_tripledes_cbc_roundtrip() {
        let cipher = from_uri(pskc_core::algorithm::TRIPLEDES_CBC).unwrap();
        let key = [0x23u8; 24];
        let plaintext = b"counter";
        let data = cipher.encrypt(&key, plaintext).unwrap();
        assert_eq!(cipher.decrypt(&key, &data).unwrap(), plaintext);
    }

    #[test]
    fn test_wrong_key_size() {
        let cipher = from_uri(pskc_core::algorithm::AES256_CBC).unwrap();
        assert!(cipher.encrypt(&[0u8; 16], b"x").is_err());
        assert!(cipher.decrypt(&[0u8; 16], &[0u8; 48]).is_err());
    }

    #[test]
    fn test_truncated_data() {
        let cipher = from_uri(pskc_core::algorithm::AES128_CBC).unwrap();
        // Shorter than IV plus one block
        assert!(cipher.decrypt(&[0u8; 16], &[0u8; 16]).is_err());
    }

    #[test]
    fn test_unknown_uri() {
        assert!(from_uri("urn:example:rot13").is_err());
    }
}
