//! Multi-signature wallet and transaction support
//!
//! M-of-N owner wallets: owners propose calls, confirm or revoke
//! independently, and once M confirmations are in any owner may execute.
//! A transaction executes at most once, and only if the downstream call
//! succeeds.
//!
//! # Example
//!
//! ```
//! use wisdom_multisig::core::{Call, Principal};
//! use wisdom_multisig::multisig::{MultisigConfig, MultisigWallet};
//! use wisdom_multisig::token::TokenManager;
//!
//! let alice = Principal::from("alice");
//! let bob = Principal::from("bob");
//!
//! // 2-of-2 wallet in control of a token
//! let config = MultisigConfig::new(vec![alice.clone(), bob.clone()], 2, None).unwrap();
//! let mut wallet = MultisigWallet::new(config).unwrap();
//! let mut tokens = TokenManager::new();
//! let token = tokens
//!     .create_token("WISDOM".to_string(), "WIS".to_string(), 18, wallet.address())
//!     .unwrap();
//!
//! // Propose a mint, collect both confirmations, execute
//! let payload = Call::Mint { to: alice.clone(), amount: 50_000_000 }.encode().unwrap();
//! let index = wallet.submit_transaction(&alice, &token.address, 0, payload).unwrap();
//! wallet.confirm_transaction(&alice, index).unwrap();
//! wallet.confirm_transaction(&bob, index).unwrap();
//! wallet.execute_transaction(&bob, index, &mut tokens).unwrap();
//!
//! assert_eq!(tokens.balance_of(&token.address, &alice).unwrap(), 50_000_000);
//! ```

pub mod event;
pub mod shared;
pub mod transaction;
pub mod wallet;

pub use event::{EventRecord, MultisigEvent};
pub use shared::SharedWallet;
pub use transaction::{sign_confirmation, SignedConfirmation, Transaction, TxStatus};
pub use wallet::{MultisigConfig, MultisigError, MultisigWallet};
