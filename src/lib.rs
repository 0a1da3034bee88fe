//! Wisdom multisig: a threshold-authorized mint gate
//!
//! This crate provides:
//! - A mintable token whose supply is guarded by a single controller
//! - M-of-N multi-signature wallets that can hold that controller slot
//! - Proposal, confirmation, revocation and at-most-once execution of
//!   encoded calls
//! - Off-line confirmations signed with secp256k1 keys
//! - Lock-guarded shared wallets
//!
//! # Example
//!
//! ```rust
//! use wisdom_multisig::core::{Call, Principal};
//! use wisdom_multisig::multisig::{MultisigConfig, MultisigError, MultisigWallet};
//! use wisdom_multisig::token::{TokenError, TokenManager};
//!
//! let owner = Principal::from("owner");
//! let account1 = Principal::from("account1");
//!
//! // The owner deploys the token and controls minting
//! let mut tokens = TokenManager::new();
//! let token = tokens
//!     .create_token("WISDOM".to_string(), "WIS".to_string(), 18, &owner)
//!     .unwrap();
//!
//! // Control moves to a 2-of-2 wallet; the owner alone can no longer mint
//! let config = MultisigConfig::new(vec![owner.clone(), account1.clone()], 2, None).unwrap();
//! let mut wallet = MultisigWallet::new(config).unwrap();
//! tokens.change_controller(&token.address, &owner, wallet.address()).unwrap();
//! assert!(matches!(
//!     tokens.mint(&token.address, &owner, &owner, 1),
//!     Err(TokenError::Unauthorized { .. })
//! ));
//!
//! // Minting now takes both owners
//! let payload = Call::Mint { to: owner.clone(), amount: 50_000_000 }.encode().unwrap();
//! let index = wallet.submit_transaction(&owner, &token.address, 0, payload).unwrap();
//! wallet.confirm_transaction(&account1, index).unwrap();
//! assert!(matches!(
//!     wallet.execute_transaction(&owner, index, &mut tokens),
//!     Err(MultisigError::QuorumNotMet { have: 1, need: 2 })
//! ));
//!
//! wallet.confirm_transaction(&owner, index).unwrap();
//! wallet.execute_transaction(&owner, index, &mut tokens).unwrap();
//! assert_eq!(tokens.balance_of(&token.address, &owner).unwrap(), 50_000_000);
//! ```

pub mod core;
pub mod crypto;
pub mod multisig;
pub mod token;

// Re-export commonly used types
pub use crate::core::{Call, CallError, Invoker, Principal};
pub use crypto::KeyPair;
pub use multisig::{
    MultisigConfig, MultisigError, MultisigEvent, MultisigWallet, SharedWallet,
    SignedConfirmation, Transaction,
};
pub use token::{Token, TokenError, TokenEvent, TokenManager};
