//! Principal identities
//!
//! A principal is anything that can initiate an operation: an owner key,
//! a multisig wallet, or a token. It carries no structure beyond equality
//! and ordering; in practice it is an address string.

use crate::crypto::public_key_to_address;
use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque, comparable identity
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Wrap an address string
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Principal owned by a secp256k1 key
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self(public_key_to_address(public_key))
    }

    /// Address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw address bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for Principal {
    fn from(address: String) -> Self {
        Self(address)
    }
}

impl AsRef<str> for Principal {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    #[test]
    fn test_key_derived_principal() {
        let kp = KeyPair::generate();
        let principal = Principal::from_public_key(&kp.public_key);
        assert_eq!(principal.as_str(), kp.address());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let principal = Principal::from("alice");
        assert_eq!(serde_json::to_string(&principal).unwrap(), "\"alice\"");
        let back: Principal = serde_json::from_str("\"alice\"").unwrap();
        assert_eq!(back, principal);
    }
}
