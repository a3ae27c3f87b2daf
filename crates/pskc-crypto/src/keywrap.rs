#![forbid(unsafe_code)]

//! Key wrap algorithms (AES-KW per RFC 3394, 3DES-KW per RFC 3217).

use aes_kw::Kek;
use pskc_core::{algorithm, Error};

/// Trait for key wrap algorithms.
pub trait KeyWrapAlgorithm: Send {
    fn uri(&self) -> &'static str;
    fn wrap(&self, kek: &[u8], key_data: &[u8]) -> Result<Vec<u8>, Error>;
    fn unwrap(&self, kek: &[u8], wrapped: &[u8]) -> Result<Vec<u8>, Error>;
    fn kek_size(&self) -> usize;
}

/// Create a key wrap algorithm from its URI.
pub fn from_uri(uri: &str) -> Result<Box<dyn KeyWrapAlgorithm>, Error> {
    match uri {
        algorithm::KW_AES128 => Ok(Box::new(AesKeyWrap {
            kek_size: 16,
            uri: algorithm::KW_AES128,
        })),
        algorithm::KW_AES192 => Ok(Box::new(AesKeyWrap {
            kek_size: 24,
            uri: algorithm::KW_AES192,
        })),
        algorithm::KW_AES256 => Ok(Box::new(AesKeyWrap {
            kek_size: 32,
            uri: algorithm::KW_AES256,
        })),
        algorithm::KW_TRIPLEDES => Ok(Box::new(TripleDesKeyWrap)),
        _ => Err(Error::UnsupportedAlgorithm(format!("key wrap: {uri}"))),
    }
}

struct AesKeyWrap {
    kek_size: usize,
    uri: &'static str,
}

impl KeyWrapAlgorithm for AesKeyWrap {
    fn uri(&self) -> &'static str {
        self.uri
    }
    fn kek_size(&self) -> usize {
        self.kek_size
    }

    fn wrap(&self, kek_bytes: &[u8], key_data: &[u8]) -> Result<Vec<u8>, Error> {
        if kek_bytes.len() != self.kek_size {
            return Err(Error::Crypto(format!(
                "expected {} byte KEK, got {}",
                self.kek_size,
                kek_bytes.len()
            )));
        }
        let mut out = vec![0u8; key_data.len() + 8];
        macro_rules! do_wrap {
            ($aes:ty) => {{
                let kek = Kek::<$aes>::new(kek_bytes.into());
                kek.wrap(key_data, &mut out)
                    .map_err(|e| Error::Crypto(format!("AES-KW wrap: {e}")))?;
            }};
        }
        match self.kek_size {
            16 => do_wrap!(aes::Aes128),
            24 => do_wrap!(aes::Aes192),
            32 => do_wrap!(aes::Aes256),
            _ => return Err(Error::Crypto("unsupported KEK size".into())),
        }
        Ok(out)
    }

    fn unwrap(&self, kek_bytes: &[u8], wrapped: &[u8]) -> Result<Vec<u8>, Error> {
        if kek_bytes.len() != self.kek_size {
            return Err(Error::Crypto(format!(
                "expected {} byte KEK, got {}",
                self.kek_size,
                kek_bytes.len()
            )));
        }
        if wrapped.len() < 16 {
            return Err(Error::Decryption("wrapped key too short".into()));
        }
        let mut out = vec![0u8; wrapped.len() - 8];
        macro_rules! do_unwrap {
            ($aes:ty) => {{
                let kek = Kek::<$aes>::new(kek_bytes.into());
                kek.unwrap(wrapped, &mut out)
                    .map_err(|e| Error::Decryption(format!("AES-KW unwrap: {e}")))?;
            }};
        }
        match self.kek_size {
            16 => do_unwrap!(aes::Aes128),
            24 => do_unwrap!(aes::Aes192),
            32 => do_unwrap!(aes::Aes256),
            _ => return Err(Error::Crypto("unsupported KEK size".into())),
        }
        Ok(out)
    }
}

/// CMS Triple-DES Key Wrap per RFC 3217.
struct TripleDesKeyWrap;

/// Fixed IV for the second 3DES-CBC encryption pass (RFC 3217 section 3.2).
const TDES_KW_IV: [u8; 8] = [0x4a, 0xdd, 0xa2, 0x2c, 0x79, 0xe8, 0x21, 0x05];

impl KeyWrapAlgorithm for TripleDesKeyWrap {
    fn uri(&self) -> &'static str {
        algorithm::KW_TRIPLEDES
    }
    fn kek_size(&self) -> usize {
        24
    }

    fn wrap(&self, kek: &[u8], key_data: &[u8]) -> Result<Vec<u8>, Error> {
        if kek.len() != 24 {
            return Err(Error::Crypto(format!(
                "expected 24 byte 3DES KEK, got {}",
                kek.len()
            )));
        }

        // WKCKS = key data followed by its CMS key checksum
        use sha1::Digest;
        let mut hasher = sha1::Sha1::new();
        hasher.update(key_data);
        let hash = hasher.finalize();

        let mut wkcks = Vec::with_capacity(key_data.len() + 8);
        wkcks.extend_from_slice(key_data);
        wkcks.extend_from_slice(&hash[..8]);

        use rand::RngCore;
        let mut iv = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut iv);

        let temp1 = tdes_cbc_encrypt(kek, &iv, &wkcks)?;

        let mut temp2 = Vec::with_capacity(8 + temp1.len());
        temp2.extend_from_slice(&iv);
        temp2.extend_from_slice(&temp1);
        temp2.reverse();

        tdes_cbc_encrypt(kek, &TDES_KW_IV, &temp2)
    }

    fn unwrap(&self, kek: &[u8], wrapped: &[u8]) -> Result<Vec<u8>, Error> {
        if kek.len() != 24 {
            return Err(Error::Crypto(format!(
                "expected 24 byte 3DES KEK, got {}",
                kek.len()
            )));
        }
        if wrapped.len() < 16 {
            return Err(Error::Decryption("3DES-KW wrapped data too short".into()));
        }

        let mut temp2 = tdes_cbc_decrypt(kek, &TDES_KW_IV, wrapped)?;
        temp2.reverse();

        if temp2.len() < 16 {
            return Err(Error::Decryption("3DES-KW unwrapped data too short".into()));
        }
        let iv: [u8; 8] = temp2[..8]
            .try_into()
            .map_err(|_| Error::Decryption("invalid IV length".into()))?;
        let wkcks = tdes_cbc_decrypt(kek, &iv, &temp2[8..])?;

        if wkcks.len() < 8 {
            return Err(Error::Decryption(
                "3DES-KW: decrypted data too short for checksum".into(),
            ));
        }
        let key_data = &wkcks[..wkcks.len() - 8];
        let checksum = &wkcks[wkcks.len() - 8..];

        use sha1::Digest;
        let mut hasher = sha1::Sha1::new();
        hasher.update(key_data);
        let hash = hasher.finalize();
        if checksum != &hash[..8] {
            return Err(Error::Decryption(
                "3DES-KW: key checksum verification failed".into(),
            ));
        }

        Ok(key_data.to_vec())
    }
}

/// 3DES-CBC encrypt without padding; input must be a multiple of 8 bytes.
fn tdes_cbc_encrypt(key: &[u8], iv: &[u8; 8], data: &[u8]) -> Result<Vec<u8>, Error> {
    use cbc::cipher::{BlockEncryptMut, KeyIvInit};

    if data.len() % 8 != 0 {
        return Err(Error::Crypto("3DES-KW: data not block-aligned".into()));
    }
    let mut buf = data.to_vec();
    let buf_len = buf.len();
    let enc = cbc::Encryptor::<des::TdesEde3>::new_from_slices(key, iv)
        .map_err(|e| Error::Crypto(format!("3DES-KW init: {e}")))?;
    enc.encrypt_padded_mut::<cbc::cipher::block_padding::NoPadding>(&mut buf, buf_len)
        .map_err(|e| Error::Crypto(format!("3DES-KW encrypt: {e}")))?;
    Ok(buf)
}

/// 3DES-CBC decrypt without padding; input must be a multiple of 8 bytes.
fn tdes_cbc_decrypt(key: &[u8], iv: &[u8; 8], data: &[u8]) -> Result<Vec<u8>, Error> {
    use cbc::cipher::{BlockDecryptMut, KeyIvInit};

    if data.len() % 8 != 0 {
        return Err(Error::Decryption("3DES-KW: data not block-aligned".into()));
    }
    let mut buf = data.to_vec();
    let dec = cbc::Decryptor::<des::TdesEde3>::new_from_slices(key, iv)
        .map_err(|e| Error::Crypto(format!("3DES-KW init: {e}")))?;
    dec.decrypt_padded_mut::<cbc::cipher::block_padding::NoPadding>(&mut buf)
        .map_err(|e| Error::Decryption(format!("3DES-KW decrypt: {e}")))?;
    Ok(buf)
}
