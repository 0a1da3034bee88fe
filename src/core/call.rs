//! Encoded calls and the invoke seam
//!
//! A multisig transaction carries an opaque payload that it never
//! interprets. The payload is a 4-byte method selector followed by the
//! arguments:
//!
//! - selector: first 4 bytes of SHA-256 of the method signature
//! - principal: u16 big-endian length, then the UTF-8 address bytes
//! - amount: u128, 16 bytes big-endian

use crate::core::Principal;
use crate::crypto::sha256;
use crate::token::TokenError;
use thiserror::Error;

/// Signature of the mint method
pub const MINT_SIGNATURE: &str = "mint(address,uint256)";
/// Signature of the controller handover method
pub const CHANGE_CONTROLLER_SIGNATURE: &str = "changeController(address)";

/// Length of a method selector
pub const SELECTOR_LEN: usize = 4;

/// Failure of a downstream call
#[derive(Error, Debug)]
pub enum CallError {
    #[error("Unknown call target: {0}")]
    UnknownTarget(Principal),
    #[error("Unknown method selector: {0}")]
    UnknownSelector(String),
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    #[error("Target does not accept value: got {0}")]
    NonPayable(u128),
    #[error("Insufficient funds to forward value: have {have}, need {need}")]
    InsufficientFunds { have: u128, need: u128 },
    #[error("Call rejected: {0}")]
    Rejected(#[from] TokenError),
}

/// Anything that can execute an encoded call on behalf of a caller
///
/// The implementation must be all-or-nothing: on `Err` no state of the
/// target may have changed.
pub trait Invoker {
    fn invoke(
        &mut self,
        caller: &Principal,
        target: &Principal,
        value: u128,
        payload: &[u8],
    ) -> Result<(), CallError>;
}

/// Compute the selector for a method signature
pub fn selector(signature: &str) -> [u8; SELECTOR_LEN] {
    let hash = sha256(signature.as_bytes());
    let mut out = [0u8; SELECTOR_LEN];
    out.copy_from_slice(&hash[..SELECTOR_LEN]);
    out
}

/// A decoded call on a protected token
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Mint { to: Principal, amount: u128 },
    ChangeController { new_controller: Principal },
}

impl Call {
    /// Encode into a payload
    ///
    /// Fails with `MalformedPayload` if a principal does not fit the u16
    /// length prefix.
    pub fn encode(&self) -> Result<Vec<u8>, CallError> {
        match self {
            Call::Mint { to, amount } => {
                let mut out = selector(MINT_SIGNATURE).to_vec();
                write_principal(&mut out, to)?;
                out.extend_from_slice(&amount.to_be_bytes());
                Ok(out)
            }
            Call::ChangeController { new_controller } => {
                let mut out = selector(CHANGE_CONTROLLER_SIGNATURE).to_vec();
                write_principal(&mut out, new_controller)?;
                Ok(out)
            }
        }
    }

    /// Decode a payload produced by [`Call::encode`]
    pub fn decode(payload: &[u8]) -> Result<Self, CallError> {
        if payload.len() < SELECTOR_LEN {
            return Err(CallError::MalformedPayload(
                "payload shorter than selector".to_string(),
            ));
        }

        let (head, args) = payload.split_at(SELECTOR_LEN);
        let mut reader = Reader::new(args);

        let call = if head == &selector(MINT_SIGNATURE)[..] {
            let to = reader.principal()?;
            let amount = reader.amount()?;
            Call::Mint { to, amount }
        } else if head == &selector(CHANGE_CONTROLLER_SIGNATURE)[..] {
            Call::ChangeController {
                new_controller: reader.principal()?,
            }
        } else {
            return Err(CallError::UnknownSelector(hex::encode(head)));
        };

        reader.finish()?;
        Ok(call)
    }
}

fn write_principal(out: &mut Vec<u8>, principal: &Principal) -> Result<(), CallError> {
    let bytes = principal.as_bytes();
    let len = u16::try_from(bytes.len()).map_err(|_| {
        CallError::MalformedPayload(format!(
            "address of {} bytes exceeds {} byte limit",
            bytes.len(),
            u16::MAX
        ))
    })?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(bytes);
    Ok(())
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CallError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                CallError::MalformedPayload(format!(
                    "expected {} more bytes at offset {}",
                    n, self.pos
                ))
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn principal(&mut self) -> Result<Principal, CallError> {
        let len_bytes = self.take(2)?;
        let len = u16::from_be_bytes([len_bytes[0], len_bytes[1]]) as usize;
        let raw = self.take(len)?;
        let address = std::str::from_utf8(raw)
            .map_err(|_| CallError::MalformedPayload("address is not UTF-8".to_string()))?;
        Ok(Principal::new(address))
    }

    fn amount(&mut self) -> Result<u128, CallError> {
        let raw = self.take(16)?;
        let mut buf = [0u8; 16];
        buf.copy_from_slice(raw);
        Ok(u128::from_be_bytes(buf))
    }

    fn finish(&self) -> Result<(), CallError> {
        if self.pos != self.bytes.len() {
            return Err(CallError::MalformedPayload(format!(
                "{} trailing bytes",
                self.bytes.len() - self.pos
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_payload_layout() {
        let call = Call::Mint {
            to: Principal::from("alice"),
            amount: 50_000_000,
        };
        let payload = call.encode().unwrap();

        assert_eq!(&payload[..4], &selector(MINT_SIGNATURE));
        assert_eq!(&payload[4..6], &[0u8, 5]);
        assert_eq!(&payload[6..11], b"alice");
        assert_eq!(payload.len(), 4 + 2 + 5 + 16);
        assert_eq!(Call::decode(&payload).unwrap(), call);
    }

    #[test]
    fn test_selectors_differ() {
        assert_ne!(
            selector(MINT_SIGNATURE),
            selector(CHANGE_CONTROLLER_SIGNATURE)
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            Call::decode(&[1, 2]),
            Err(CallError::MalformedPayload(_))
        ));
        assert!(matches!(
            Call::decode(&[0xde, 0xad, 0xbe, 0xef]),
            Err(CallError::UnknownSelector(_))
        ));

        // Truncated amount
        let mut payload = Call::Mint {
            to: Principal::from("bob"),
            amount: 1,
        }
        .encode()
        .unwrap();
        payload.pop();
        assert!(matches!(
            Call::decode(&payload),
            Err(CallError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let mut payload = Call::ChangeController {
            new_controller: Principal::from("bob"),
        }
        .encode()
        .unwrap();
        payload.push(0);
        assert!(matches!(
            Call::decode(&payload),
            Err(CallError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_encode_rejects_oversized_principal() {
        let long = Principal::new("x".repeat(u16::MAX as usize + 1));
        assert!(matches!(
            Call::Mint {
                to: long.clone(),
                amount: 5
            }
            .encode(),
            Err(CallError::MalformedPayload(_))
        ));
        assert!(matches!(
            Call::ChangeController {
                new_controller: long
            }
            .encode(),
            Err(CallError::MalformedPayload(_))
        ));

        // The largest principal that fits survives intact
        let widest = Principal::new("y".repeat(u16::MAX as usize));
        let call = Call::Mint {
            to: widest,
            amount: 5,
        };
        let payload = call.encode().unwrap();
        assert_eq!(Call::decode(&payload).unwrap(), call);
    }
}
