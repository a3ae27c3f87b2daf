#![forbid(unsafe_code)]

//! XML namespace registry for PSKC 1.0 documents.
//!
//! The registry is fixed: every element lookup in the library qualifies
//! names through [`resolve`], and a prefix outside this table is a hard
//! error.  Unqualified matching is never used, so identically-named
//! elements from unrelated namespaces cannot collide.

use crate::{Error, Result};

/// PSKC 1.0 container namespace (RFC 6030)
pub const PSKC: &str = "urn:ietf:params:xml:ns:keyprov:pskc";

/// XML Digital Signature namespace
pub const DSIG: &str = "http://www.w3.org/2000/09/xmldsig#";

/// XML Encryption namespace
pub const XENC: &str = "http://www.w3.org/2001/04/xmlenc#";

/// XML Encryption 1.1 namespace
pub const XENC11: &str = "http://www.w3.org/2009/xmlenc11#";

/// PKCS #5 namespace
pub const PKCS5: &str = "http://www.rsasecurity.com/rsalabs/pkcs/schemas/pkcs-5v2-0#";

/// Resolve a short prefix to its namespace URI.
///
/// Fails on any prefix outside the fixed table.
pub fn resolve(prefix: &str) -> Result<&'static str> {
    match prefix {
        "pskc" => Ok(PSKC),
        "ds" => Ok(DSIG),
        "xenc" => Ok(XENC),
        "xenc11" => Ok(XENC11),
        "pkcs5" => Ok(PKCS5),
        _ => Err(Error::UnknownPrefix(prefix.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_prefixes() {
        assert_eq!(resolve("pskc").unwrap(), PSKC);
        assert_eq!(resolve("ds").unwrap(), DSIG);
        assert_eq!(resolve("xenc").unwrap(), XENC);
        assert_eq!(resolve("xenc11").unwrap(), XENC11);
        assert_eq!(resolve("pkcs5").unwrap(), PKCS5);
    }

    #[test]
    fn test_resolve_unknown_prefix() {
        assert!(matches!(resolve("soap"), Err(Error::UnknownPrefix(_))));
        assert!(matches!(resolve(""), Err(Error::UnknownPrefix(_))));
    }
}
