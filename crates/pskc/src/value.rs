#![forbid(unsafe_code)]

//! Plain and encrypted data values with deferred decryption.

use crate::encryption::Encryption;
use crate::mac::Mac;
use pskc_core::{Error, Result};
use pskc_xml::{find, find_text};
use roxmltree::Node;

/// Decode base64, tolerating embedded whitespace.
pub(crate) fn decode_b64(b64: &str, context: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    let clean: String = b64.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(&clean)
        .map_err(|e| Error::Base64(format!("{context}: {e}")))
}

/// An `EncryptionMethod` plus base64 `CipherData/CipherValue` pair, as
/// found inside `EncryptedValue` and `MACKey` elements.
#[derive(Debug, Clone)]
pub(crate) struct EncryptedValue {
    pub algorithm: Option<String>,
    pub cipher_value: Vec<u8>,
}

impl EncryptedValue {
    /// Parse from the element holding `EncryptionMethod` and
    /// `CipherData` children; `Ok(None)` when no cipher value exists.
    pub fn parse(node: Node<'_, '_>) -> Result<Option<Self>> {
        let Some(b64) = find_text(node, "xenc:CipherData/xenc:CipherValue")? else {
            return Ok(None);
        };
        let algorithm = find(node, "xenc:EncryptionMethod")?
            .and_then(|m| m.attribute("Algorithm"))
            .map(str::to_owned);
        Ok(Some(Self {
            algorithm,
            cipher_value: decode_b64(&b64, "CipherValue")?,
        }))
    }
}

/// One data field of a key (`Secret`, `Counter`, ...): either a plain
/// value or an encrypted value with an optional integrity MAC.  The
/// ciphertext is held as parsed; decryption only happens when a value
/// accessor is called with an encryption context.
#[derive(Debug, Clone, Default)]
pub(crate) struct DataValue {
    name: &'static str,
    plain: Option<String>,
    encrypted: Option<EncryptedValue>,
    value_mac: Option<Vec<u8>>,
}

impl DataValue {
    pub fn parse(parent: Node<'_, '_>, path: &str, name: &'static str) -> Result<Self> {
        let Some(element) = find(parent, path)? else {
            return Ok(Self {
                name,
                ..Self::default()
            });
        };
        let plain = find_text(element, "pskc:PlainValue")?;
        let encrypted = match find(element, "pskc:EncryptedValue")? {
            Some(ev) => EncryptedValue::parse(ev)?,
            None => None,
        };
        let value_mac = match find_text(element, "pskc:ValueMAC")? {
            Some(b64) => Some(decode_b64(&b64, "ValueMAC")?),
            None => None,
        };
        Ok(Self {
            name,
            plain,
            encrypted,
            value_mac,
        })
    }

    pub fn is_present(&self) -> bool {
        self.plain.is_some() || self.encrypted.is_some()
    }

    /// Decrypt the encrypted value, verifying the ValueMAC over the
    /// ciphertext first when both a MAC descriptor and a stored MAC are
    /// available.
    fn decrypt(&self, encryption: &Encryption, mac: Option<&Mac>) -> Result<Option<Vec<u8>>> {
        let Some(encrypted) = &self.encrypted else {
            return Ok(None);
        };
        if let (Some(mac), Some(expected)) = (mac, &self.value_mac) {
            mac.verify(encryption, &encrypted.cipher_value, expected)?;
        }
        encryption
            .decrypt_value(encrypted.algorithm.as_deref(), &encrypted.cipher_value)
            .map(Some)
    }

    /// The value as bytes: plain values are base64, encrypted values
    /// decrypt to the raw octet string.
    pub fn bytes_value(&self, encryption: &Encryption, mac: Option<&Mac>) -> Result<Option<Vec<u8>>> {
        if let Some(plain) = &self.plain {
            return decode_b64(plain, self.name).map(Some);
        }
        self.decrypt(encryption, mac)
    }

    /// The value as an unsigned integer: plain values are decimal text,
    /// encrypted values decrypt to a big-endian octet string.
    pub fn int_value(&self, encryption: &Encryption, mac: Option<&Mac>) -> Result<Option<u64>> {
        if let Some(plain) = &self.plain {
            return plain
                .parse::<u64>()
                .map(Some)
                .map_err(|_| Error::InvalidInt {
                    path: self.name.to_owned(),
                    text: plain.clone(),
                });
        }
        match self.decrypt(encryption, mac)? {
            Some(bytes) => be_bytes_to_u64(&bytes, self.name).map(Some),
            None => Ok(None),
        }
    }
}

fn be_bytes_to_u64(bytes: &[u8], name: &str) -> Result<u64> {
    if bytes.len() > 8 {
        return Err(Error::Decryption(format!(
            "{name}: integer value of {} bytes exceeds 64 bits",
            bytes.len()
        )));
    }
    Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_b64_with_whitespace() {
        assert_eq!(
            decode_b64("MTIzNDU2Nzg5\nMDEyMzQ1Njc4OTA=", "Secret").unwrap(),
            b"12345678901234567890"
        );
        assert!(matches!(
            decode_b64("not base64!", "Secret"),
            Err(Error::Base64(_))
        ));
    }

    #[test]
    fn test_be_bytes_to_u64() {
        assert_eq!(be_bytes_to_u64(&[], "Counter").unwrap(), 0);
        assert_eq!(be_bytes_to_u64(&[0x01, 0x00], "Counter").unwrap(), 256);
        assert_eq!(
            be_bytes_to_u64(&[0, 0, 0, 0, 0, 0x0f, 0x42, 0x40], "Counter").unwrap(),
            1_000_000
        );
        assert!(be_bytes_to_u64(&[1; 9], "Counter").is_err());
    }
}
