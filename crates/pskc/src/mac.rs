#![forbid(unsafe_code)]

//! The MAC descriptor: the method and key protecting the integrity of
//! encrypted values in the container.

use crate::encryption::Encryption;
use crate::value::EncryptedValue;
use pskc_core::{Error, Result};
use pskc_xml::find;
use roxmltree::Node;

/// Information on the MAC method of a container.  Always present on a
/// parsed [`crate::Pskc`]; unset when the document carries no
/// `MACMethod` element.
#[derive(Debug, Default)]
pub struct Mac {
    /// `Algorithm` attribute of `MACMethod` (an HMAC URI).
    pub algorithm: Option<String>,
    key_value: Option<EncryptedValue>,
}

impl Mac {
    pub(crate) fn parse(element: Option<Node<'_, '_>>) -> Result<Self> {
        let Some(element) = element else {
            return Ok(Self::default());
        };
        let algorithm = element.attribute("Algorithm").map(str::to_owned);
        let key_value = match find(element, "pskc:MACKey")? {
            Some(mac_key) => EncryptedValue::parse(mac_key)?,
            None => None,
        };
        Ok(Self {
            algorithm,
            key_value,
        })
    }

    /// Whether the document configured a MAC method.
    pub fn is_set(&self) -> bool {
        self.algorithm.is_some()
    }

    /// Resolve the MAC key, decrypting the transported `MACKey` on
    /// demand.  Documents from pre-RFC drafts omit `MACKey` and reuse
    /// the encryption key directly.
    fn key(&self, encryption: &Encryption) -> Result<Vec<u8>> {
        match &self.key_value {
            Some(value) => {
                encryption.decrypt_value(value.algorithm.as_deref(), &value.cipher_value)
            }
            None => encryption
                .key()
                .map(<[u8]>::to_vec)
                .ok_or_else(|| Error::MissingKey("no MAC key and no encryption key".into())),
        }
    }

    /// Verify `expected` as the MAC over `data`.
    pub fn verify(&self, encryption: &Encryption, data: &[u8], expected: &[u8]) -> Result<()> {
        let algorithm = self
            .algorithm
            .as_deref()
            .ok_or_else(|| Error::MissingElement("MACMethod Algorithm".into()))?;
        let key = self.key(encryption)?;
        pskc_crypto::mac::verify(algorithm, &key, data, expected)
    }
}
