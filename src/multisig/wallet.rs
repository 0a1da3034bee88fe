//! Multi-signature wallet
//!
//! A fixed set of owners and a threshold M. Owners submit transactions,
//! confirm or revoke independently, and any owner may execute once M
//! confirmations are in. Execution forwards the encoded call through an
//! [`Invoker`] and is marked done only if that call succeeds.

use crate::core::{CallError, Invoker, Principal};
use crate::crypto::{base58check, hash160, KeyError};
use crate::multisig::event::{EventRecord, MultisigEvent};
use crate::multisig::transaction::{SignedConfirmation, Transaction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Version byte for wallet addresses (P2SH-style, leading '3')
pub const WALLET_ADDRESS_VERSION: u8 = 0x05;

/// Errors related to multisig operations
#[derive(Error, Debug)]
pub enum MultisigError {
    #[error("Not an owner: {0}")]
    Unauthorized(Principal),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Transaction not found: {0}")]
    NotFound(u64),
    #[error("Transaction {0} already executed")]
    AlreadyExecuted(u64),
    #[error("Transaction {index} already confirmed by {owner}")]
    AlreadyConfirmed { index: u64, owner: Principal },
    #[error("Transaction {index} not confirmed by {owner}")]
    NotConfirmed { index: u64, owner: Principal },
    #[error("Quorum not met: have {have}, need {need}")]
    QuorumNotMet { have: usize, need: u8 },
    #[error("Call reverted: {0}")]
    CallReverted(#[from] CallError),
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Deposit would overflow wallet balance")]
    DepositOverflow,
    #[error("Crypto error: {0}")]
    CryptoError(#[from] KeyError),
}

/// Configuration for a multisig wallet
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MultisigConfig {
    /// Owner principals, in the order given
    pub owners: Vec<Principal>,
    /// Minimum confirmations required (M in M-of-N)
    pub threshold: u8,
    /// Optional human-readable label
    #[serde(default)]
    pub label: Option<String>,
}

impl MultisigConfig {
    /// Create a new multisig configuration
    ///
    /// # Errors
    /// `InvalidConfig` if owners is empty or has duplicates, or the
    /// threshold is outside `1..=owners.len()`
    pub fn new(
        owners: Vec<Principal>,
        threshold: u8,
        label: Option<String>,
    ) -> Result<Self, MultisigError> {
        let config = Self {
            owners,
            threshold,
            label,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, MultisigError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| MultisigError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the owner and threshold constraints
    pub fn validate(&self) -> Result<(), MultisigError> {
        if self.owners.is_empty() {
            return Err(MultisigError::InvalidConfig(
                "owners must not be empty".to_string(),
            ));
        }

        if self.threshold == 0 {
            return Err(MultisigError::InvalidConfig(
                "threshold must be at least 1".to_string(),
            ));
        }

        if self.threshold as usize > self.owners.len() {
            return Err(MultisigError::InvalidConfig(format!(
                "threshold {} exceeds owner count {}",
                self.threshold,
                self.owners.len()
            )));
        }

        let mut seen = HashSet::with_capacity(self.owners.len());
        for owner in &self.owners {
            if !seen.insert(owner) {
                return Err(MultisigError::InvalidConfig(format!(
                    "duplicate owner {}",
                    owner
                )));
            }
        }

        Ok(())
    }

    /// Get the threshold (M)
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Get the owner count (N)
    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    /// Check if a principal is an owner
    pub fn is_owner(&self, principal: &Principal) -> bool {
        self.owners.iter().any(|o| o == principal)
    }

    /// Get description like "2-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.threshold, self.owners.len())
    }
}

/// A multi-signature wallet and its transaction ledger
#[derive(Clone, Debug, Serialize)]
pub struct MultisigWallet {
    /// Wallet address, the principal it acts as when executing
    address: Principal,
    /// Wallet configuration
    config: MultisigConfig,
    /// Transactions by index
    transactions: Vec<Transaction>,
    /// Native balance available to forward as call value
    balance: u128,
    /// Everything the wallet has recorded
    events: Vec<EventRecord>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl MultisigWallet {
    /// Create a new multisig wallet
    pub fn new(config: MultisigConfig) -> Result<Self, MultisigError> {
        config.validate()?;
        let address = Self::generate_address(&config);

        log::info!(
            "Multisig wallet {} created ({})",
            address,
            config.description()
        );

        Ok(Self {
            address,
            config,
            transactions: Vec::new(),
            balance: 0,
            events: Vec::new(),
            created_at: Utc::now(),
        })
    }

    /// Address = Base58Check(0x05 || RIPEMD160(SHA256(threshold || sorted owners)))
    fn generate_address(config: &MultisigConfig) -> Principal {
        let mut sorted_owners: Vec<&Principal> = config.owners.iter().collect();
        sorted_owners.sort();

        let mut script_data = vec![config.threshold];
        for owner in sorted_owners {
            script_data.extend_from_slice(owner.as_bytes());
        }

        Principal::new(base58check(WALLET_ADDRESS_VERSION, &hash160(&script_data)))
    }

    pub fn address(&self) -> &Principal {
        &self.address
    }

    pub fn config(&self) -> &MultisigConfig {
        &self.config
    }

    /// Owners in configuration order
    pub fn owners(&self) -> &[Principal] {
        &self.config.owners
    }

    pub fn is_owner(&self, principal: &Principal) -> bool {
        self.config.is_owner(principal)
    }

    pub fn threshold(&self) -> u8 {
        self.config.threshold
    }

    pub fn description(&self) -> String {
        self.config.description()
    }

    /// Native balance held by the wallet
    pub fn balance(&self) -> u128 {
        self.balance
    }

    /// Number of transactions ever submitted
    pub fn transaction_count(&self) -> u64 {
        self.transactions.len() as u64
    }

    /// Look up a transaction by index
    pub fn transaction(&self, index: u64) -> Option<&Transaction> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.transactions.get(i))
    }

    /// All transactions, oldest first
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Transactions not yet executed
    pub fn pending_transactions(&self) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|tx| !tx.is_executed())
            .collect()
    }

    /// Whether `owner` currently confirms transaction `index`
    pub fn is_confirmed(&self, index: u64, owner: &Principal) -> bool {
        self.transaction(index)
            .map(|tx| tx.is_confirmed_by(owner))
            .unwrap_or(false)
    }

    /// Number of confirmations on transaction `index`
    pub fn confirmation_count(&self, index: u64) -> Result<usize, MultisigError> {
        self.transaction(index)
            .map(Transaction::confirmation_count)
            .ok_or(MultisigError::NotFound(index))
    }

    /// Recorded events, oldest first
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    fn record(&mut self, event: MultisigEvent) {
        self.events.push(EventRecord::new(event));
    }

    fn ensure_owner(&self, caller: &Principal) -> Result<(), MultisigError> {
        if !self.is_owner(caller) {
            return Err(MultisigError::Unauthorized(caller.clone()));
        }
        Ok(())
    }

    /// Existing, not-yet-executed transaction
    fn pending(&self, index: u64) -> Result<&Transaction, MultisigError> {
        let tx = self
            .transaction(index)
            .ok_or(MultisigError::NotFound(index))?;
        if tx.is_executed() {
            return Err(MultisigError::AlreadyExecuted(index));
        }
        Ok(tx)
    }

    fn pending_mut(&mut self, index: u64) -> Result<&mut Transaction, MultisigError> {
        let tx = usize::try_from(index)
            .ok()
            .and_then(|i| self.transactions.get_mut(i))
            .ok_or(MultisigError::NotFound(index))?;
        if tx.is_executed() {
            return Err(MultisigError::AlreadyExecuted(index));
        }
        Ok(tx)
    }

    /// Accept native value into the wallet
    ///
    /// Anyone may deposit. Returns the new balance.
    pub fn deposit(&mut self, sender: &Principal, amount: u128) -> Result<u128, MultisigError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(MultisigError::DepositOverflow)?;

        self.record(MultisigEvent::Deposit {
            sender: sender.clone(),
            amount,
            balance: self.balance,
        });
        Ok(self.balance)
    }

    /// Propose a call on `target`; returns the new transaction's index
    pub fn submit_transaction(
        &mut self,
        caller: &Principal,
        target: &Principal,
        value: u128,
        payload: Vec<u8>,
    ) -> Result<u64, MultisigError> {
        self.ensure_owner(caller)?;

        let index = self.transactions.len() as u64;
        self.transactions.push(Transaction::new(
            index,
            caller.clone(),
            target.clone(),
            value,
            payload.clone(),
        ));

        self.record(MultisigEvent::Submitted {
            owner: caller.clone(),
            index,
            target: target.clone(),
            value,
            payload,
        });

        log::info!(
            "Wallet {}: transaction {} submitted by {} (target {}, value {})",
            self.address,
            index,
            caller,
            target,
            value
        );
        Ok(index)
    }

    /// Add the caller's confirmation to transaction `index`
    pub fn confirm_transaction(
        &mut self,
        caller: &Principal,
        index: u64,
    ) -> Result<(), MultisigError> {
        self.ensure_owner(caller)?;

        let tx = self.pending_mut(index)?;
        if !tx.add_confirmation(caller.clone()) {
            return Err(MultisigError::AlreadyConfirmed {
                index,
                owner: caller.clone(),
            });
        }
        let count = tx.confirmation_count();

        self.record(MultisigEvent::Confirmed {
            owner: caller.clone(),
            index,
        });

        log::debug!(
            "Wallet {}: transaction {} confirmed by {} ({}/{})",
            self.address,
            index,
            caller,
            count,
            self.threshold()
        );
        Ok(())
    }

    /// Confirm using a signature over the transaction's signing data
    ///
    /// The signer's key-derived principal must be an owner.
    pub fn confirm_signed(
        &mut self,
        index: u64,
        confirmation: &SignedConfirmation,
    ) -> Result<(), MultisigError> {
        let signer = confirmation.signer()?;
        self.ensure_owner(&signer)?;

        let signing_data = self.pending(index)?.signing_data(&self.address);
        if !confirmation.verify(&signing_data)? {
            return Err(MultisigError::InvalidSignature);
        }

        self.confirm_transaction(&signer, index)
    }

    /// Withdraw the caller's confirmation from transaction `index`
    pub fn revoke_confirmation(
        &mut self,
        caller: &Principal,
        index: u64,
    ) -> Result<(), MultisigError> {
        self.ensure_owner(caller)?;

        let tx = self.pending_mut(index)?;
        if !tx.remove_confirmation(caller) {
            return Err(MultisigError::NotConfirmed {
                index,
                owner: caller.clone(),
            });
        }

        self.record(MultisigEvent::Revoked {
            owner: caller.clone(),
            index,
        });

        log::debug!(
            "Wallet {}: transaction {} revoked by {}",
            self.address,
            index,
            caller
        );
        Ok(())
    }

    /// Execute transaction `index` through `invoker`
    ///
    /// Requires threshold confirmations. The call runs with the wallet's
    /// address as caller and forwards `value` from the wallet balance. If
    /// it fails the transaction stays pending with its confirmations and
    /// the balance is untouched, so it can be retried.
    pub fn execute_transaction<I>(
        &mut self,
        caller: &Principal,
        index: u64,
        invoker: &mut I,
    ) -> Result<(), MultisigError>
    where
        I: Invoker + ?Sized,
    {
        self.ensure_owner(caller)?;

        let tx = self.pending(index)?;
        let have = tx.confirmation_count();
        if have < self.threshold() as usize {
            return Err(MultisigError::QuorumNotMet {
                have,
                need: self.threshold(),
            });
        }

        let value = tx.value;
        if value > self.balance {
            return Err(CallError::InsufficientFunds {
                have: self.balance,
                need: value,
            }
            .into());
        }

        if let Err(err) = invoker.invoke(&self.address, &tx.target, value, &tx.payload) {
            log::warn!(
                "Wallet {}: transaction {} reverted: {}",
                self.address,
                index,
                err
            );
            return Err(MultisigError::CallReverted(err));
        }

        // The call has committed; commit our side with it
        self.balance -= value;
        self.pending_mut(index)?.mark_executed();
        self.record(MultisigEvent::Executed {
            owner: caller.clone(),
            index,
        });

        log::info!(
            "Wallet {}: transaction {} executed by {}",
            self.address,
            index,
            caller
        );
        Ok(())
    }
}
