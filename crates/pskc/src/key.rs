#![forbid(unsafe_code)]

//! One key package: per-device attributes, key metadata, policy, and
//! the (possibly encrypted) data fields of the key itself.

use crate::encryption::Encryption;
use crate::mac::Mac;
use crate::value::DataValue;
use chrono::{DateTime, FixedOffset};
use pskc_core::{ns, Error, Result};
use pskc_xml::{find, find_all, find_text, find_time};
use roxmltree::Node;

/// Format of the challenge in a challenge-response credential.
#[derive(Debug, Clone, Default)]
pub struct ChallengeFormat {
    pub encoding: Option<String>,
    pub min_length: Option<i64>,
    pub max_length: Option<i64>,
    pub check_digits: bool,
}

/// Format of the OTP response.
#[derive(Debug, Clone, Default)]
pub struct ResponseFormat {
    pub encoding: Option<String>,
    pub length: Option<i64>,
    pub check_digits: bool,
}

/// Key usage policy.
///
/// When the document contains policy elements this layer does not
/// understand, `unknown_policy_elements` is set so callers can refuse
/// to honor the key.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    pub start_date: Option<DateTime<FixedOffset>>,
    pub expiry_date: Option<DateTime<FixedOffset>>,
    pub number_of_transactions: Option<i64>,
    pub key_usage: Vec<String>,
    pub pin_key_id: Option<String>,
    pub pin_usage_mode: Option<String>,
    pub pin_max_failed_attempts: Option<i64>,
    pub pin_min_length: Option<i64>,
    pub pin_max_length: Option<i64>,
    pub pin_encoding: Option<String>,
    pub unknown_policy_elements: bool,
}

impl Policy {
    fn parse(element: Node<'_, '_>) -> Result<Self> {
        let mut policy = Self {
            start_date: find_time(element, "pskc:StartDate")?,
            expiry_date: find_time(element, "pskc:ExpiryDate")?,
            number_of_transactions: pskc_xml::find_int(element, "pskc:NumberOfTransactions")?,
            ..Self::default()
        };
        for usage in find_all(element, "pskc:KeyUsage")? {
            if let Some(text) = usage.text() {
                policy.key_usage.push(text.trim().to_owned());
            }
        }
        if let Some(pin) = find(element, "pskc:PINPolicy")? {
            policy.pin_key_id = pin.attribute("PINKeyId").map(str::to_owned);
            policy.pin_usage_mode = pin.attribute("PINUsageMode").map(str::to_owned);
            policy.pin_max_failed_attempts = attr_int(pin, "MaxFailedAttempts")?;
            policy.pin_min_length = attr_int(pin, "MinLength")?;
            policy.pin_max_length = attr_int(pin, "MaxLength")?;
            policy.pin_encoding = pin.attribute("PINEncoding").map(str::to_owned);
        }
        let known = [
            "StartDate",
            "ExpiryDate",
            "NumberOfTransactions",
            "KeyUsage",
            "PINPolicy",
        ];
        // Known means the PSKC namespace; an identically-named element
        // from a foreign namespace is a constraint we cannot honor.
        policy.unknown_policy_elements = element.children().any(|c| {
            c.is_element()
                && !(c.tag_name().namespace() == Some(ns::PSKC)
                    && known.contains(&c.tag_name().name()))
        });
        Ok(policy)
    }

    /// Whether the policy allows the key to be used for `usage` now.
    pub fn may_use(&self, usage: &str) -> bool {
        if self.unknown_policy_elements {
            return false;
        }
        if !self.key_usage.is_empty() && !self.key_usage.iter().any(|u| u == usage) {
            return false;
        }
        let now = chrono::Utc::now().fixed_offset();
        if self.start_date.is_some_and(|start| now < start) {
            return false;
        }
        if self.expiry_date.is_some_and(|expiry| now > expiry) {
            return false;
        }
        true
    }
}

/// One key from a `KeyPackage` element.
///
/// All metadata is parsed eagerly; the data fields (`secret`,
/// `counter`, ...) stay encrypted until their accessor is called with
/// the container's encryption context.
#[derive(Debug, Default)]
pub struct Key {
    /// `Id` attribute of the `Key` element.
    pub id: Option<String>,
    /// Key algorithm URI (`Algorithm` attribute).
    pub algorithm: Option<String>,

    // DeviceInfo
    pub manufacturer: Option<String>,
    pub serial: Option<String>,
    pub model: Option<String>,
    pub issue_no: Option<String>,
    pub device_binding: Option<String>,
    pub device_start_date: Option<DateTime<FixedOffset>>,
    pub device_expiry_date: Option<DateTime<FixedOffset>>,
    pub device_userid: Option<String>,

    /// `CryptoModuleInfo/Id`.
    pub crypto_module: Option<String>,

    // Key element children
    pub issuer: Option<String>,
    pub key_profile: Option<String>,
    pub key_reference: Option<String>,
    pub friendly_name: Option<String>,
    pub key_userid: Option<String>,

    // AlgorithmParameters
    pub algorithm_suite: Option<String>,
    pub challenge_format: Option<ChallengeFormat>,
    pub response_format: Option<ResponseFormat>,

    pub policy: Policy,

    secret: DataValue,
    counter: DataValue,
    time_offset: DataValue,
    time_interval: DataValue,
    time_drift: DataValue,
}

impl Key {
    pub(crate) fn parse(package: Node<'_, '_>) -> Result<Self> {
        let mut key = Self {
            manufacturer: find_text(package, "pskc:DeviceInfo/pskc:Manufacturer")?,
            serial: find_text(package, "pskc:DeviceInfo/pskc:SerialNo")?,
            model: find_text(package, "pskc:DeviceInfo/pskc:Model")?,
            issue_no: find_text(package, "pskc:DeviceInfo/pskc:IssueNo")?,
            device_binding: find_text(package, "pskc:DeviceInfo/pskc:DeviceBinding")?,
            device_start_date: find_time(package, "pskc:DeviceInfo/pskc:StartDate")?,
            device_expiry_date: find_time(package, "pskc:DeviceInfo/pskc:ExpiryDate")?,
            device_userid: find_text(package, "pskc:DeviceInfo/pskc:UserId")?,
            crypto_module: find_text(package, "pskc:CryptoModuleInfo/pskc:Id")?,
            ..Self::default()
        };

        let Some(key_element) = find(package, "pskc:Key")? else {
            return Ok(key);
        };

        key.id = key_element.attribute("Id").map(str::to_owned);
        key.algorithm = key_element.attribute("Algorithm").map(str::to_owned);
        key.issuer = find_text(key_element, "pskc:Issuer")?;
        key.key_profile = find_text(key_element, "pskc:KeyProfileId")?;
        key.key_reference = find_text(key_element, "pskc:KeyReference")?;
        key.friendly_name = find_text(key_element, "pskc:FriendlyName")?;
        key.key_userid = find_text(key_element, "pskc:UserId")?;

        if let Some(params) = find(key_element, "pskc:AlgorithmParameters")? {
            key.algorithm_suite = find_text(params, "pskc:Suite")?;
            if let Some(challenge) = find(params, "pskc:ChallengeFormat")? {
                key.challenge_format = Some(ChallengeFormat {
                    encoding: challenge.attribute("Encoding").map(str::to_owned),
                    min_length: attr_int(challenge, "Min")?,
                    max_length: attr_int(challenge, "Max")?,
                    check_digits: attr_bool(challenge, "CheckDigits"),
                });
            }
            if let Some(response) = find(params, "pskc:ResponseFormat")? {
                key.response_format = Some(ResponseFormat {
                    encoding: response.attribute("Encoding").map(str::to_owned),
                    length: attr_int(response, "Length")?,
                    check_digits: attr_bool(response, "CheckDigits"),
                });
            }
        }

        if let Some(data) = find(key_element, "pskc:Data")? {
            key.secret = DataValue::parse(data, "pskc:Secret", "Secret")?;
            key.counter = DataValue::parse(data, "pskc:Counter", "Counter")?;
            key.time_offset = DataValue::parse(data, "pskc:Time", "Time")?;
            key.time_interval = DataValue::parse(data, "pskc:TimeInterval", "TimeInterval")?;
            key.time_drift = DataValue::parse(data, "pskc:TimeDrift", "TimeDrift")?;
        }

        if let Some(policy) = find(key_element, "pskc:Policy")? {
            key.policy = Policy::parse(policy)?;
        }

        Ok(key)
    }

    /// Whether the key carries a secret (plain or encrypted).
    pub fn has_secret(&self) -> bool {
        self.secret.is_present()
    }

    /// The key secret.  Plain secrets are base64-decoded; encrypted
    /// secrets are decrypted with `encryption` after their `ValueMAC`
    /// is verified through `mac`, when one is configured.
    pub fn secret(&self, encryption: &Encryption, mac: Option<&Mac>) -> Result<Option<Vec<u8>>> {
        self.secret.bytes_value(encryption, mac)
    }

    /// The event counter for HOTP-style credentials.
    pub fn counter(&self, encryption: &Encryption, mac: Option<&Mac>) -> Result<Option<u64>> {
        self.counter.int_value(encryption, mac)
    }

    /// The time offset for time-based credentials.
    pub fn time_offset(&self, encryption: &Encryption, mac: Option<&Mac>) -> Result<Option<u64>> {
        self.time_offset.int_value(encryption, mac)
    }

    /// The time interval in seconds.
    pub fn time_interval(&self, encryption: &Encryption, mac: Option<&Mac>) -> Result<Option<u64>> {
        self.time_interval.int_value(encryption, mac)
    }

    /// The observed clock drift of the device.
    pub fn time_drift(&self, encryption: &Encryption, mac: Option<&Mac>) -> Result<Option<u64>> {
        self.time_drift.int_value(encryption, mac)
    }
}

fn attr_int(node: Node<'_, '_>, name: &str) -> Result<Option<i64>> {
    let Some(text) = node.attribute(name) else {
        return Ok(None);
    };
    text.trim()
        .parse::<i64>()
        .map(Some)
        .map_err(|_| Error::InvalidInt {
            path: name.to_owned(),
            text: text.to_owned(),
        })
}

fn attr_bool(node: Node<'_, '_>, name: &str) -> bool {
    matches!(node.attribute(name), Some("true") | Some("1"))
}
