//! Multisig transactions awaiting confirmation
//!
//! A transaction is pending until it is executed; the confirmation count
//! alone tells how close it is to quorum. Executed is terminal.

use crate::core::Principal;
use crate::crypto::{public_key_from_hex, sha256, verify_signature, KeyPair};
use crate::multisig::wallet::{MultisigError, MultisigWallet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Where a transaction stands relative to its wallet's threshold
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TxStatus {
    /// Fewer confirmations than the threshold
    AwaitingConfirmations,
    /// Quorum reached, not yet executed
    Ready,
    /// Executed; no further changes allowed
    Executed,
}

/// A proposed call on a target
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    /// Position in the wallet's ledger
    pub index: u64,
    /// Owner who submitted it
    pub submitter: Principal,
    /// Call target
    pub target: Principal,
    /// Native value forwarded with the call
    pub value: u128,
    /// Encoded call, opaque to the wallet
    pub payload: Vec<u8>,
    confirmations: BTreeSet<Principal>,
    executed: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// When confirmations or status last changed
    pub updated_at: DateTime<Utc>,
    /// When the transaction was executed
    pub executed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub(crate) fn new(
        index: u64,
        submitter: Principal,
        target: Principal,
        value: u128,
        payload: Vec<u8>,
    ) -> Self {
        let now = Utc::now();
        Self {
            index,
            submitter,
            target,
            value,
            payload,
            confirmations: BTreeSet::new(),
            executed: false,
            created_at: now,
            updated_at: now,
            executed_at: None,
        }
    }

    /// Owners currently confirming, in address order
    pub fn confirmations(&self) -> impl Iterator<Item = &Principal> {
        self.confirmations.iter()
    }

    /// Number of confirmations collected
    pub fn confirmation_count(&self) -> usize {
        self.confirmations.len()
    }

    /// Whether `owner` has confirmed
    pub fn is_confirmed_by(&self, owner: &Principal) -> bool {
        self.confirmations.contains(owner)
    }

    pub fn is_executed(&self) -> bool {
        self.executed
    }

    /// Status against a quorum threshold
    pub fn status(&self, threshold: u8) -> TxStatus {
        if self.executed {
            TxStatus::Executed
        } else if self.confirmations.len() >= threshold as usize {
            TxStatus::Ready
        } else {
            TxStatus::AwaitingConfirmations
        }
    }

    /// Digest an owner signs to confirm off-line
    ///
    /// SHA-256 over wallet address, index, target, value and payload, so a
    /// signature cannot be replayed against another wallet or transaction.
    pub fn signing_data(&self, wallet_address: &Principal) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(wallet_address.as_bytes());
        data.extend_from_slice(&self.index.to_be_bytes());
        data.extend_from_slice(self.target.as_bytes());
        data.extend_from_slice(&self.value.to_be_bytes());
        data.extend_from_slice(&self.payload);
        sha256(&data)
    }

    pub(crate) fn add_confirmation(&mut self, owner: Principal) -> bool {
        let added = self.confirmations.insert(owner);
        if added {
            self.updated_at = Utc::now();
        }
        added
    }

    pub(crate) fn remove_confirmation(&mut self, owner: &Principal) -> bool {
        let removed = self.confirmations.remove(owner);
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    pub(crate) fn mark_executed(&mut self) {
        let now = Utc::now();
        self.executed = true;
        self.executed_at = Some(now);
        self.updated_at = now;
    }
}

/// A confirmation signed by an owner's key
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedConfirmation {
    /// Public key of the signer (hex, compressed)
    pub signer_pubkey: String,
    /// Compact ECDSA signature over the signing data (hex)
    pub signature: String,
}

impl SignedConfirmation {
    /// Principal derived from the signer's public key
    pub fn signer(&self) -> Result<Principal, MultisigError> {
        let pubkey = public_key_from_hex(&self.signer_pubkey)?;
        Ok(Principal::from_public_key(&pubkey))
    }

    /// Verify this signature against the signing data
    pub fn verify(&self, signing_data: &[u8]) -> Result<bool, MultisigError> {
        let pubkey = public_key_from_hex(&self.signer_pubkey)?;
        let sig_bytes =
            hex::decode(&self.signature).map_err(|_| MultisigError::InvalidSignature)?;
        Ok(verify_signature(&pubkey, signing_data, &sig_bytes)?)
    }
}

/// Sign a confirmation for transaction `index` of `wallet`
pub fn sign_confirmation(
    wallet: &MultisigWallet,
    index: u64,
    key_pair: &KeyPair,
) -> Result<SignedConfirmation, MultisigError> {
    let tx = wallet
        .transaction(index)
        .ok_or(MultisigError::NotFound(index))?;
    let signature = key_pair.sign(&tx.signing_data(wallet.address()))?;

    Ok(SignedConfirmation {
        signer_pubkey: key_pair.public_key_hex(),
        signature: hex::encode(signature),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx() -> Transaction {
        Transaction::new(
            0,
            Principal::from("alice"),
            Principal::from("0xTOKEN"),
            0,
            vec![1, 2, 3],
        )
    }

    #[test]
    fn test_new_transaction_is_pending() {
        let tx = sample_tx();
        assert_eq!(tx.confirmation_count(), 0);
        assert!(!tx.is_executed());
        assert_eq!(tx.status(2), TxStatus::AwaitingConfirmations);
        assert!(tx.executed_at.is_none());
    }

    #[test]
    fn test_status_follows_confirmations() {
        let mut tx = sample_tx();
        let alice = Principal::from("alice");
        let bob = Principal::from("bob");

        assert!(tx.add_confirmation(alice.clone()));
        assert!(!tx.add_confirmation(alice.clone()));
        assert_eq!(tx.status(2), TxStatus::AwaitingConfirmations);

        tx.add_confirmation(bob.clone());
        assert_eq!(tx.status(2), TxStatus::Ready);

        assert!(tx.remove_confirmation(&bob));
        assert!(!tx.remove_confirmation(&bob));
        assert_eq!(tx.status(2), TxStatus::AwaitingConfirmations);

        tx.mark_executed();
        assert_eq!(tx.status(2), TxStatus::Executed);
        assert!(tx.executed_at.is_some());
    }

    #[test]
    fn test_signing_data_binds_wallet_and_index() {
        let tx = sample_tx();
        let mut other = sample_tx();
        other.index = 1;

        let wallet_a = Principal::from("3WalletA");
        let wallet_b = Principal::from("3WalletB");

        assert_eq!(tx.signing_data(&wallet_a).len(), 32);
        assert_ne!(tx.signing_data(&wallet_a), tx.signing_data(&wallet_b));
        assert_ne!(tx.signing_data(&wallet_a), other.signing_data(&wallet_a));
    }

    #[test]
    fn test_signed_confirmation_verifies() {
        let tx = sample_tx();
        let wallet = Principal::from("3Wallet");
        let key = KeyPair::generate();

        let data = tx.signing_data(&wallet);
        let confirmation = SignedConfirmation {
            signer_pubkey: key.public_key_hex(),
            signature: hex::encode(key.sign(&data).unwrap()),
        };

        assert!(confirmation.verify(&data).unwrap());
        assert!(!confirmation
            .verify(&tx.signing_data(&Principal::from("3Other")))
            .unwrap());
        assert_eq!(
            confirmation.signer().unwrap(),
            Principal::from_public_key(&key.public_key)
        );
    }
}
