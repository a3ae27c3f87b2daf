#![forbid(unsafe_code)]

//! The top-level key container.

use crate::encryption::Encryption;
use crate::key::Key;
use crate::mac::Mac;
use pskc_core::{Error, Result};
use pskc_xml::{child, children, parsing_options};
use std::path::Path;

/// A parsed `KeyContainer` document.
///
/// The encryption and MAC descriptors are always present; when the
/// document omits the corresponding element they are unset and the
/// accessors on them report so.
#[derive(Debug, Default)]
pub struct Pskc {
    /// `Version` attribute, verbatim.
    pub version: Option<String>,
    /// `Id` attribute, verbatim.
    pub id: Option<String>,
    /// Encryption descriptor (`EncryptionKey`).
    pub encryption: Encryption,
    /// MAC descriptor (`MACMethod`).
    pub mac: Mac,
    /// One [`Key`] per `KeyPackage`, in document order.
    pub keys: Vec<Key>,
}

impl Pskc {
    /// Read and parse a PSKC file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let xml = std::fs::read_to_string(path)?;
        Self::parse(&xml)
    }

    /// Parse a PSKC document from XML text.
    pub fn parse(xml: &str) -> Result<Self> {
        let document = roxmltree::Document::parse_with_options(xml, parsing_options())
            .map_err(|e| Error::Document(e.to_string()))?;
        let root = document.root_element();

        let mut container = Self {
            version: root.attribute("Version").map(str::to_owned),
            id: root.attribute("Id").map(str::to_owned),
            ..Self::default()
        };

        // The descriptors and key packages are direct children of the
        // root; matching elements nested deeper belong to something else.
        container.encryption = Encryption::parse(child(root, "pskc:EncryptionKey")?)?;
        container.mac = Mac::parse(child(root, "pskc:MACMethod")?)?;
        for package in children(root, "pskc:KeyPackage")? {
            container.keys.push(Key::parse(package)?);
        }

        Ok(container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = r#"xmlns="urn:ietf:params:xml:ns:keyprov:pskc""#;

    #[test]
    fn test_empty_container() {
        let xml = format!(r#"<KeyContainer {NS} Version="1.0"/>"#);
        let container = Pskc::parse(&xml).unwrap();
        assert_eq!(container.version.as_deref(), Some("1.0"));
        assert!(container.id.is_none());
        assert!(container.encryption.key_name().is_none());
        assert!(!container.mac.is_set());
        assert!(container.keys.is_empty());
    }

    #[test]
    fn test_version_and_id_verbatim() {
        let xml = format!(r#"<KeyContainer {NS} Version="2.0-draft" Id="c-1"/>"#);
        let container = Pskc::parse(&xml).unwrap();
        assert_eq!(container.version.as_deref(), Some("2.0-draft"));
        assert_eq!(container.id.as_deref(), Some("c-1"));
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            Pskc::parse("<KeyContainer"),
            Err(Error::Document(_))
        ));
    }

    #[test]
    fn test_key_packages_in_document_order() {
        let xml = format!(
            r#"<KeyContainer {NS} Version="1.0">
                 <KeyPackage><DeviceInfo><SerialNo>first</SerialNo></DeviceInfo></KeyPackage>
                 <KeyPackage><DeviceInfo><SerialNo>second</SerialNo></DeviceInfo></KeyPackage>
                 <KeyPackage><DeviceInfo><SerialNo>third</SerialNo></DeviceInfo></KeyPackage>
               </KeyContainer>"#
        );
        let container = Pskc::parse(&xml).unwrap();
        let serials: Vec<_> = container
            .keys
            .iter()
            .map(|k| k.serial.as_deref().unwrap())
            .collect();
        assert_eq!(serials, ["first", "second", "third"]);
    }

    #[test]
    fn test_nested_key_package_is_not_a_key() {
        let xml = format!(
            r#"<KeyContainer {NS} Version="1.0">
                 <KeyPackage>
                   <DeviceInfo>
                     <SerialNo>real</SerialNo>
                     <KeyPackage><DeviceInfo><SerialNo>ghost</SerialNo></DeviceInfo></KeyPackage>
                   </DeviceInfo>
                 </KeyPackage>
               </KeyContainer>"#
        );
        let container = Pskc::parse(&xml).unwrap();
        assert_eq!(container.keys.len(), 1);
        assert_eq!(container.keys[0].serial.as_deref(), Some("real"));
    }

    #[test]
    fn test_unnamespaced_key_package_ignored() {
        let xml = format!(
            r#"<KeyContainer {NS} Version="1.0">
                 <KeyPackage xmlns=""><DeviceInfo><SerialNo>alien</SerialNo></DeviceInfo></KeyPackage>
               </KeyContainer>"#
        );
        let container = Pskc::parse(&xml).unwrap();
        assert!(container.keys.is_empty());
    }

    #[test]
    fn test_first_encryption_key_wins() {
        let xml = format!(
            r#"<KeyContainer {NS} Version="1.0">
                 <EncryptionKey Id="first"/>
                 <EncryptionKey Id="second"/>
               </KeyContainer>"#
        );
        let container = Pskc::parse(&xml).unwrap();
        assert_eq!(container.encryption.id.as_deref(), Some("first"));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let xml = format!(
            r#"<KeyContainer {NS} Version="1.0" Id="c">
                 <KeyPackage><DeviceInfo><SerialNo>987654321</SerialNo></DeviceInfo></KeyPackage>
               </KeyContainer>"#
        );
        let a = Pskc::parse(&xml).unwrap();
        let b = Pskc::parse(&xml).unwrap();
        assert_eq!(a.version, b.version);
        assert_eq!(a.id, b.id);
        assert_eq!(a.keys.len(), b.keys.len());
        assert_eq!(a.keys[0].serial, b.keys[0].serial);
    }

    #[test]
    fn test_plain_secret_and_counter() {
        let xml = format!(
            r#"<KeyContainer {NS} Version="1.0">
                 <KeyPackage>
                   <DeviceInfo>
                     <Manufacturer>Manufacturer</Manufacturer>
                     <SerialNo>987654321</SerialNo>
                   </DeviceInfo>
                   <Key Id="12345678"
                        Algorithm="urn:ietf:params:xml:ns:keyprov:pskc:hotp">
                     <Issuer>Issuer-A</Issuer>
                     <AlgorithmParameters>
                       <ResponseFormat Length="8" Encoding="DECIMAL"/>
                     </AlgorithmParameters>
                     <Data>
                       <Secret><PlainValue>MTIzNDU2Nzg5MDEyMzQ1Njc4OTA=</PlainValue></Secret>
                       <Counter><PlainValue>0</PlainValue></Counter>
                     </Data>
                   </Key>
                 </KeyPackage>
               </KeyContainer>"#
        );
        let container = Pskc::parse(&xml).unwrap();
        assert_eq!(container.keys.len(), 1);
        let key = &container.keys[0];
        assert_eq!(key.id.as_deref(), Some("12345678"));
        assert_eq!(key.issuer.as_deref(), Some("Issuer-A"));
        assert_eq!(key.manufacturer.as_deref(), Some("Manufacturer"));
        assert_eq!(key.serial.as_deref(), Some("987654321"));
        let format = key.response_format.as_ref().unwrap();
        assert_eq!(format.length, Some(8));
        assert_eq!(format.encoding.as_deref(), Some("DECIMAL"));
        assert!(key.has_secret());
        assert_eq!(
            key.secret(&container.encryption, Some(&container.mac))
                .unwrap()
                .unwrap(),
            b"12345678901234567890"
        );
        assert_eq!(
            key.counter(&container.encryption, Some(&container.mac))
                .unwrap(),
            Some(0)
        );
    }

    #[test]
    fn test_junk_counter_is_an_error() {
        let xml = format!(
            r#"<KeyContainer {NS} Version="1.0">
                 <KeyPackage>
                   <Key Id="k">
                     <Data><Counter><PlainValue>abc</PlainValue></Counter></Data>
                   </Key>
                 </KeyPackage>
               </KeyContainer>"#
        );
        let container = Pskc::parse(&xml).unwrap();
        assert!(matches!(
            container.keys[0].counter(&container.encryption, None),
            Err(Error::InvalidInt { .. })
        ));
    }

    #[test]
    fn test_policy_and_unknown_policy_elements() {
        let xml = format!(
            r#"<KeyContainer {NS} Version="1.0">
                 <KeyPackage>
                   <Key Id="k">
                     <Policy>
                       <StartDate>2006-05-01T00:00:00Z</StartDate>
                       <ExpiryDate>2106-05-31T00:00:00Z</ExpiryDate>
                       <KeyUsage>OTP</KeyUsage>
                       <PINPolicy MinLength="4" MaxLength="4"
                                  PINKeyId="123456781" PINEncoding="DECIMAL"
                                  PINUsageMode="Local"/>
                     </Policy>
                   </Key>
                 </KeyPackage>
                 <KeyPackage>
                   <Key Id="k2">
                     <Policy><Mystery/></Policy>
                   </Key>
                 </KeyPackage>
               </KeyContainer>"#
        );
        let container = Pskc::parse(&xml).unwrap();
        let policy = &container.keys[0].policy;
        assert_eq!(policy.key_usage, ["OTP"]);
        assert_eq!(policy.pin_min_length, Some(4));
        assert_eq!(policy.pin_key_id.as_deref(), Some("123456781"));
        assert_eq!(policy.pin_usage_mode.as_deref(), Some("Local"));
        assert!(!policy.unknown_policy_elements);
        assert!(policy.may_use("OTP"));
        assert!(!policy.may_use("Integrity"));

        let unknown = &container.keys[1].policy;
        assert!(unknown.unknown_policy_elements);
        assert!(!unknown.may_use("OTP"));
    }

    #[test]
    fn test_foreign_namespace_policy_element_is_unknown() {
        let xml = format!(
            r#"<KeyContainer {NS} Version="1.0" xmlns:x="urn:example:ext">
                 <KeyPackage>
                   <Key Id="k">
                     <Policy>
                       <KeyUsage>OTP</KeyUsage>
                       <x:StartDate>2006-05-01T00:00:00Z</x:StartDate>
                     </Policy>
                   </Key>
                 </KeyPackage>
               </KeyContainer>"#
        );
        let container = Pskc::parse(&xml).unwrap();
        let policy = &container.keys[0].policy;
        assert!(policy.unknown_policy_elements);
        assert!(!policy.may_use("OTP"));
    }

    // RFC 6030 figure 6 style document: secrets wrapped with AES-KW
    // under a pre-shared KEK, MAC keyed with the encryption key.  The
    // wrapped value is the RFC 3394 section 4.1 vector.
    fn wrapped_container(value_mac: &str) -> String {
        format!(
            r#"<KeyContainer {NS} Version="1.0"
                 xmlns:ds="http://www.w3.org/2000/09/xmldsig#"
                 xmlns:xenc="http://www.w3.org/2001/04/xmlenc#">
                 <EncryptionKey><ds:KeyName>Pre-shared-key</ds:KeyName></EncryptionKey>
                 <MACMethod Algorithm="http://www.w3.org/2000/09/xmldsig#hmac-sha1"/>
                 <KeyPackage>
                   <Key Id="12345678" Algorithm="urn:ietf:params:xml:ns:keyprov:pskc:hotp">
                     <Data>
                       <Secret>
                         <EncryptedValue>
                           <xenc:EncryptionMethod Algorithm="http://www.w3.org/2001/04/xmlenc#kw-aes128"/>
                           <xenc:CipherData>
                             <xenc:CipherValue>H6aLCoEStEeu80vY+1p7gp0+hiNx0s/l</xenc:CipherValue>
                           </xenc:CipherData>
                         </EncryptedValue>
                         <ValueMAC>{value_mac}</ValueMAC>
                       </Secret>
                     </Data>
                   </Key>
                 </KeyPackage>
               </KeyContainer>"#
        )
    }

    #[test]
    fn test_wrapped_secret_with_preshared_key() {
        let xml = wrapped_container("hHftGQ2Z26cjS/7JbrvtOtsl+8U=");
        let mut container = Pskc::parse(&xml).unwrap();
        assert_eq!(container.encryption.key_name(), Some("Pre-shared-key"));
        assert!(container.mac.is_set());

        let key = &container.keys[0];
        assert!(matches!(
            key.secret(&container.encryption, Some(&container.mac)),
            Err(Error::MissingKey(_))
        ));

        container
            .encryption
            .set_key(hex::decode("000102030405060708090a0b0c0d0e0f").unwrap());
        let secret = container.keys[0]
            .secret(&container.encryption, Some(&container.mac))
            .unwrap()
            .unwrap();
        assert_eq!(hex::encode(secret), "00112233445566778899aabbccddeeff");
    }

    #[test]
    fn test_tampered_value_mac_is_rejected() {
        let xml = wrapped_container("iHftGQ2Z26cjS/7JbrvtOtsl+8U=");
        let mut container = Pskc::parse(&xml).unwrap();
        container
            .encryption
            .set_key(hex::decode("000102030405060708090a0b0c0d0e0f").unwrap());
        assert!(matches!(
            container.keys[0].secret(&container.encryption, Some(&container.mac)),
            Err(Error::MacInvalid(_))
        ));
        // Skipping MAC verification recovers the secret.
        assert!(container.keys[0]
            .secret(&container.encryption, None)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_password_derived_key() {
        let xml = format!(
            r#"<KeyContainer {NS} Version="1.0"
                 xmlns:xenc11="http://www.w3.org/2009/xmlenc11#"
                 xmlns:pkcs5="http://www.rsasecurity.com/rsalabs/pkcs/schemas/pkcs-5v2-0#">
                 <EncryptionKey>
                   <xenc11:DerivedKey>
                     <xenc11:KeyDerivationMethod
                       Algorithm="http://www.rsasecurity.com/rsalabs/pkcs/schemas/pkcs-5v2-0#pbkdf2">
                       <pkcs5:PBKDF2-params>
                         <pkcs5:Salt><pkcs5:Specified>c2FsdA==</pkcs5:Specified></pkcs5:Salt>
                         <pkcs5:IterationCount>2</pkcs5:IterationCount>
                         <pkcs5:KeyLength>20</pkcs5:KeyLength>
                       </pkcs5:PBKDF2-params>
                     </xenc11:KeyDerivationMethod>
                     <xenc11:MasterKeyName>My Password 1</xenc11:MasterKeyName>
                   </xenc11:DerivedKey>
                 </EncryptionKey>
               </KeyContainer>"#
        );
        let mut container = Pskc::parse(&xml).unwrap();
        assert_eq!(container.encryption.key_name(), Some("My Password 1"));
        let derivation = &container.encryption.derivation;
        assert_eq!(derivation.salt.as_deref(), Some(&b"salt"[..]));
        assert_eq!(derivation.iteration_count, Some(2));
        assert_eq!(derivation.key_length, Some(20));

        container.encryption.derive_key("password").unwrap();
        assert_eq!(
            hex::encode(container.encryption.key().unwrap()),
            "ea6c014dc72d6f8ccd1ed92ace1d41f0d8de8957"
        );
    }
}
