#![forbid(unsafe_code)]

//! The encryption descriptor: how key material in the container was
//! encrypted, and the key (pre-shared or password-derived) to undo it.

use crate::value::decode_b64;
use pskc_core::{algorithm, Error, Result};
use pskc_crypto::kdf::{self, Pbkdf2Params};
use pskc_crypto::{cipher, keywrap};
use pskc_xml::{find, find_all, find_int, find_text};
use roxmltree::Node;

/// Key derivation parameters read from an `xenc11:DerivedKey` block.
#[derive(Debug, Clone, Default)]
pub struct KeyDerivation {
    /// `KeyDerivationMethod` algorithm URI.
    pub algorithm: Option<String>,
    /// PBKDF2 salt (from `Salt/Specified`).
    pub salt: Option<Vec<u8>>,
    pub iteration_count: Option<u32>,
    /// Desired key length in bytes.
    pub key_length: Option<usize>,
    /// PRF algorithm URI; PKCS#5 defaults this to HMAC-SHA1.
    pub prf: Option<String>,
}

/// Information on the encryption applied to key material in a
/// container.  Always present on a parsed [`crate::Pskc`]; when the
/// document carries no `EncryptionKey` element every field is unset.
#[derive(Debug, Default)]
pub struct Encryption {
    /// `Id` attribute of the `EncryptionKey` element.
    pub id: Option<String>,
    /// Key names announced by the document (`ds:KeyName`, plus the
    /// derived key's `MasterKeyName` when present), document order.
    pub key_names: Vec<String>,
    /// Fallback algorithm URI for encrypted values that carry no
    /// `EncryptionMethod` of their own.  Not set by parsing; callers
    /// may install one.
    pub algorithm: Option<String>,
    /// Key derivation parameters, when the document uses a derived key.
    pub derivation: KeyDerivation,
    key: Option<Vec<u8>>,
}

impl Encryption {
    pub(crate) fn parse(element: Option<Node<'_, '_>>) -> Result<Self> {
        let mut encryption = Self::default();
        let Some(element) = element else {
            return Ok(encryption);
        };

        encryption.id = element.attribute("Id").map(str::to_owned);
        for key_name in find_all(element, "ds:KeyName")? {
            if let Some(text) = key_name.text() {
                encryption.key_names.push(text.trim().to_owned());
            }
        }

        if let Some(derived) = find(element, "xenc11:DerivedKey")? {
            if let Some(master) = find_text(derived, "xenc11:MasterKeyName")? {
                encryption.key_names.push(master);
            }
            if let Some(method) = find(derived, "xenc11:KeyDerivationMethod")? {
                encryption.derivation = parse_key_derivation(method)?;
            }
        }

        Ok(encryption)
    }

    /// First announced key name, if any.
    pub fn key_name(&self) -> Option<&str> {
        self.key_names.first().map(String::as_str)
    }

    /// Install a pre-shared encryption key.
    pub fn set_key(&mut self, key: Vec<u8>) {
        self.key = Some(key);
    }

    /// The configured encryption key, if any.
    pub fn key(&self) -> Option<&[u8]> {
        self.key.as_deref()
    }

    /// Derive the encryption key from a password using the parsed
    /// PBKDF2 parameters.
    pub fn derive_key(&mut self, password: &str) -> Result<()> {
        let uri = self
            .derivation
            .algorithm
            .as_deref()
            .ok_or_else(|| Error::MissingElement("KeyDerivationMethod".into()))?;
        match algorithm::normalize(uri) {
            Some(algorithm::PBKDF2) | Some(algorithm::PBKDF2_ENC11) => {}
            _ => return Err(Error::UnsupportedAlgorithm(format!("key derivation: {uri}"))),
        }
        let params = Pbkdf2Params {
            prf_uri: self.derivation.prf.clone(),
            salt: self
                .derivation
                .salt
                .clone()
                .ok_or_else(|| Error::MissingElement("PBKDF2-params Salt".into()))?,
            iteration_count: self
                .derivation
                .iteration_count
                .ok_or_else(|| Error::MissingElement("PBKDF2-params IterationCount".into()))?,
            key_length: self
                .derivation
                .key_length
                .ok_or_else(|| Error::MissingElement("PBKDF2-params KeyLength".into()))?,
        };
        self.key = Some(kdf::pbkdf2_derive(password.as_bytes(), &params)?);
        Ok(())
    }

    /// Decrypt one encrypted value with the configured key.
    ///
    /// `algorithm` is the value's own `EncryptionMethod` URI; when the
    /// value carries none, the descriptor's fallback [`Self::algorithm`]
    /// is used.
    pub fn decrypt_value(&self, algorithm_uri: Option<&str>, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let key = self
            .key
            .as_deref()
            .ok_or_else(|| Error::MissingKey("no encryption key configured".into()))?;
        let uri = algorithm_uri
            .or(self.algorithm.as_deref())
            .ok_or_else(|| Error::MissingElement("EncryptionMethod Algorithm".into()))?;
        let canonical = algorithm::normalize(uri)
            .ok_or_else(|| Error::UnsupportedAlgorithm(uri.to_owned()))?;
        match canonical {
            algorithm::AES128_CBC
            | algorithm::AES192_CBC
            | algorithm::AES256_CBC
            | algorithm::TRIPLEDES_CBC => cipher::from_uri(canonical)?.decrypt(key, ciphertext),
            algorithm::KW_AES128
            | algorithm::KW_AES192
            | algorithm::KW_AES256
            | algorithm::KW_TRIPLEDES => keywrap::from_uri(canonical)?.unwrap(key, ciphertext),
            other => Err(Error::UnsupportedAlgorithm(other.to_owned())),
        }
    }
}

fn parse_key_derivation(method: Node<'_, '_>) -> Result<KeyDerivation> {
    let mut derivation = KeyDerivation {
        algorithm: method.attribute("Algorithm").map(str::to_owned),
        ..KeyDerivation::default()
    };

    // The parameters appear in the PKCS#5 namespace or, in some
    // documents, the XML Enc 1.1 namespace.
    let params = match find(method, "pkcs5:PBKDF2-params")? {
        Some(node) => Some(node),
        None => find(method, "xenc11:PBKDF2-params")?,
    };
    let Some(params) = params else {
        return Ok(derivation);
    };

    let salt_b64 = match find_text(params, "pkcs5:Salt/pkcs5:Specified")? {
        Some(text) => Some(text),
        None => find_text(params, "xenc11:Salt/xenc11:Specified")?,
    };
    if let Some(b64) = salt_b64 {
        derivation.salt = Some(decode_b64(&b64, "PBKDF2 Salt")?);
    }

    let iterations = match find_int(params, "pkcs5:IterationCount")? {
        Some(n) => Some(n),
        None => find_int(params, "xenc11:IterationCount")?,
    };
    if let Some(n) = iterations {
        derivation.iteration_count =
            Some(u32::try_from(n).map_err(|_| Error::InvalidInt {
                path: "IterationCount".into(),
                text: n.to_string(),
            })?);
    }

    let key_length = match find_int(params, "pkcs5:KeyLength")? {
        Some(n) => Some(n),
        None => find_int(params, "xenc11:KeyLength")?,
    };
    if let Some(n) = key_length {
        derivation.key_length = Some(usize::try_from(n).map_err(|_| Error::InvalidInt {
            path: "KeyLength".into(),
            text: n.to_string(),
        })?);
    }

    let prf = match find(params, "pkcs5:PRF")? {
        Some(node) => Some(node),
        None => find(params, "xenc11:PRF")?,
    };
    derivation.prf = prf
        .and_then(|n| n.attribute("Algorithm"))
        .map(str::to_owned);

    Ok(derivation)
}
