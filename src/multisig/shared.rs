//! Shared, lock-guarded access to a multisig wallet
//!
//! Every operation on one wallet is serialized behind its write lock, so
//! confirm, revoke and execute on the same transaction never interleave.
//! `execute_transaction` also holds the invoker's write lock from the
//! quorum check until the transaction is marked executed.
//!
//! Lock order is always wallet, then invoker. Wallets sharing one invoker
//! only contend on the invoker during execution.

use crate::core::{Invoker, Principal};
use crate::multisig::transaction::SignedConfirmation;
use crate::multisig::wallet::{MultisigError, MultisigWallet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Cloneable handle to one wallet and the invoker it executes through
pub struct SharedWallet<I> {
    wallet: Arc<RwLock<MultisigWallet>>,
    invoker: Arc<RwLock<I>>,
}

impl<I> Clone for SharedWallet<I> {
    fn clone(&self) -> Self {
        Self {
            wallet: Arc::clone(&self.wallet),
            invoker: Arc::clone(&self.invoker),
        }
    }
}

impl<I: Invoker> SharedWallet<I> {
    pub fn new(wallet: MultisigWallet, invoker: Arc<RwLock<I>>) -> Self {
        Self {
            wallet: Arc::new(RwLock::new(wallet)),
            invoker,
        }
    }

    /// The invoker this wallet executes through
    pub fn invoker(&self) -> Arc<RwLock<I>> {
        Arc::clone(&self.invoker)
    }

    /// Point-in-time copy of the wallet state
    pub async fn snapshot(&self) -> MultisigWallet {
        self.wallet.read().await.clone()
    }

    /// Run a read-only query under the read lock
    pub async fn read<R>(&self, f: impl FnOnce(&MultisigWallet) -> R) -> R {
        let wallet = self.wallet.read().await;
        f(&wallet)
    }

    pub async fn address(&self) -> Principal {
        self.wallet.read().await.address().clone()
    }

    pub async fn deposit(&self, sender: &Principal, amount: u128) -> Result<u128, MultisigError> {
        self.wallet.write().await.deposit(sender, amount)
    }

    pub async fn submit_transaction(
        &self,
        caller: &Principal,
        target: &Principal,
        value: u128,
        payload: Vec<u8>,
    ) -> Result<u64, MultisigError> {
        self.wallet
            .write()
            .await
            .submit_transaction(caller, target, value, payload)
    }

    pub async fn confirm_transaction(
        &self,
        caller: &Principal,
        index: u64,
    ) -> Result<(), MultisigError> {
        self.wallet.write().await.confirm_transaction(caller, index)
    }

    pub async fn confirm_signed(
        &self,
        index: u64,
        confirmation: &SignedConfirmation,
    ) -> Result<(), MultisigError> {
        self.wallet.write().await.confirm_signed(index, confirmation)
    }

    pub async fn revoke_confirmation(
        &self,
        caller: &Principal,
        index: u64,
    ) -> Result<(), MultisigError> {
        self.wallet.write().await.revoke_confirmation(caller, index)
    }

    pub async fn execute_transaction(
        &self,
        caller: &Principal,
        index: u64,
    ) -> Result<(), MultisigError> {
        let mut wallet = self.wallet.write().await;
        let mut invoker = self.invoker.write().await;
        wallet.execute_transaction(caller, index, &mut *invoker)
    }
}
