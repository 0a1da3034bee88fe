//! Controller-gated mintable token
//!
//! The protected resource behind the multisig wallet:
//! - One controller principal, the only one allowed to mint
//! - Control handover to any principal, including a multisig wallet
//! - Balance, supply and controller queries
//!
//! # Example
//!
//! ```
//! use wisdom_multisig::core::Principal;
//! use wisdom_multisig::token::TokenManager;
//!
//! let owner = Principal::from("owner");
//! let mut manager = TokenManager::new();
//! let token = manager
//!     .create_token("WISDOM".to_string(), "WIS".to_string(), 18, &owner)
//!     .unwrap();
//!
//! manager.mint(&token.address, &owner, &owner, 50_000_000).unwrap();
//! assert_eq!(manager.balance_of(&token.address, &owner).unwrap(), 50_000_000);
//! ```

pub mod manager;
pub mod token;

pub use manager::TokenManager;
pub use token::{Token, TokenError, TokenEvent, TokenMetadata, MAX_HISTORY};
