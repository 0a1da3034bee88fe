//! Mintable token guarded by a single controller
//!
//! The controller is the only principal allowed to mint or to hand control
//! to someone else. The token has no idea who the controller is; a plain
//! key and a multisig wallet look the same from here.

use crate::core::{Call, CallError, Invoker, Principal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Number of events kept in the token history
pub const MAX_HISTORY: usize = 100;

/// Token-related errors
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Caller {caller} is not the controller")]
    Unauthorized { caller: Principal },
    #[error("Total supply overflow: supply {supply}, mint {amount}")]
    SupplyOverflow { supply: u128, amount: u128 },
    #[error("Token not found: {0}")]
    TokenNotFound(String),
    #[error("Token already exists: {0}")]
    TokenAlreadyExists(String),
    #[error("Invalid symbol: must be 1-10 characters")]
    InvalidSymbol,
    #[error("Invalid name: must be 1-50 characters")]
    InvalidName,
    #[error("Invalid decimals: must be 0-18")]
    InvalidDecimals,
}

/// Token metadata (immutable after creation)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenMetadata {
    /// Token name (e.g., "WISDOM")
    pub name: String,
    /// Token symbol (e.g., "WIS")
    pub symbol: String,
    /// Decimal places (usually 18)
    pub decimals: u8,
    /// Timestamp when created
    pub created_at: DateTime<Utc>,
}

impl TokenMetadata {
    /// Create new token metadata with validation
    pub fn new(name: String, symbol: String, decimals: u8) -> Result<Self, TokenError> {
        if name.is_empty() || name.len() > 50 {
            return Err(TokenError::InvalidName);
        }

        if symbol.is_empty() || symbol.len() > 10 {
            return Err(TokenError::InvalidSymbol);
        }

        if decimals > 18 {
            return Err(TokenError::InvalidDecimals);
        }

        Ok(Self {
            name,
            symbol,
            decimals,
            created_at: Utc::now(),
        })
    }
}

/// Events recorded by a token
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenEvent {
    Minted {
        to: Principal,
        amount: u128,
        timestamp: DateTime<Utc>,
    },
    ControllerChanged {
        old: Principal,
        new: Principal,
        timestamp: DateTime<Utc>,
    },
}

/// A fungible token with a controller-gated supply
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Token {
    /// Unique token address
    pub address: Principal,
    /// Token metadata
    pub metadata: TokenMetadata,
    /// The only principal allowed to mint
    controller: Principal,
    /// Total minted supply
    total_supply: u128,
    /// Balances: address -> amount
    balances: HashMap<Principal, u128>,
    /// Recent events (last `MAX_HISTORY`)
    history: Vec<TokenEvent>,
}

impl Token {
    /// Create a new token with zero supply
    pub fn new(address: Principal, metadata: TokenMetadata, controller: Principal) -> Self {
        Self {
            address,
            metadata,
            controller,
            total_supply: 0,
            balances: HashMap::new(),
            history: Vec::new(),
        }
    }

    /// Get token name
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Get token symbol
    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    /// Get decimal places
    pub fn decimals(&self) -> u8 {
        self.metadata.decimals
    }

    /// Current controller
    pub fn controller(&self) -> &Principal {
        &self.controller
    }

    /// Get total supply
    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Get balance of an address
    pub fn balance_of(&self, holder: &Principal) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Recorded events, oldest first
    pub fn history(&self) -> &[TokenEvent] {
        &self.history
    }

    fn ensure_controller(&self, caller: &Principal) -> Result<(), TokenError> {
        if caller != &self.controller {
            return Err(TokenError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    fn record(&mut self, event: TokenEvent) {
        self.history.push(event);
        if self.history.len() > MAX_HISTORY {
            self.history.remove(0);
        }
    }

    /// Mint new tokens to `to`
    ///
    /// A zero amount is accepted and leaves balances untouched, but is
    /// still recorded.
    pub fn mint(
        &mut self,
        caller: &Principal,
        to: &Principal,
        amount: u128,
    ) -> Result<TokenEvent, TokenError> {
        self.ensure_controller(caller)?;

        // Supply bounds every balance, so this is the only check needed
        let new_supply =
            self.total_supply
                .checked_add(amount)
                .ok_or(TokenError::SupplyOverflow {
                    supply: self.total_supply,
                    amount,
                })?;

        self.total_supply = new_supply;
        *self.balances.entry(to.clone()).or_insert(0) += amount;

        let event = TokenEvent::Minted {
            to: to.clone(),
            amount,
            timestamp: Utc::now(),
        };
        self.record(event.clone());

        log::info!("{} minted {} to {}", self.symbol(), amount, to);
        Ok(event)
    }

    /// Hand control to `new_controller`
    ///
    /// Takes effect immediately. Nothing checks that the new controller
    /// can ever act.
    pub fn change_controller(
        &mut self,
        caller: &Principal,
        new_controller: &Principal,
    ) -> Result<TokenEvent, TokenError> {
        self.ensure_controller(caller)?;

        let old = std::mem::replace(&mut self.controller, new_controller.clone());
        let event = TokenEvent::ControllerChanged {
            old: old.clone(),
            new: new_controller.clone(),
            timestamp: Utc::now(),
        };
        self.record(event.clone());

        log::info!(
            "{} controller changed: {} -> {}",
            self.symbol(),
            old,
            new_controller
        );
        Ok(event)
    }
}

impl Invoker for Token {
    fn invoke(
        &mut self,
        caller: &Principal,
        target: &Principal,
        value: u128,
        payload: &[u8],
    ) -> Result<(), CallError> {
        if target != &self.address {
            return Err(CallError::UnknownTarget(target.clone()));
        }
        if value > 0 {
            return Err(CallError::NonPayable(value));
        }

        match Call::decode(payload)? {
            Call::Mint { to, amount } => self.mint(caller, &to, amount)?,
            Call::ChangeController { new_controller } => {
                self.change_controller(caller, &new_controller)?
            }
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_token() -> Token {
        let metadata = TokenMetadata::new("WISDOM".to_string(), "WIS".to_string(), 18).unwrap();
        Token::new(Principal::from("0xTEST"), metadata, Principal::from("owner"))
    }

    #[test]
    fn test_token_creation() {
        let token = create_test_token();

        assert_eq!(token.name(), "WISDOM");
        assert_eq!(token.symbol(), "WIS");
        assert_eq!(token.decimals(), 18);
        assert_eq!(token.total_supply(), 0);
        assert_eq!(token.controller(), &Principal::from("owner"));
    }

    #[test]
    fn test_metadata_validation() {
        assert!(matches!(
            TokenMetadata::new("".to_string(), "WIS".to_string(), 18),
            Err(TokenError::InvalidName)
        ));
        assert!(matches!(
            TokenMetadata::new("Test".to_string(), "TOOLONGSYMBOL".to_string(), 18),
            Err(TokenError::InvalidSymbol)
        ));
        assert!(matches!(
            TokenMetadata::new("Test".to_string(), "TST".to_string(), 19),
            Err(TokenError::InvalidDecimals)
        ));
    }

    #[test]
    fn test_controller_can_mint() {
        let mut token = create_test_token();
        let owner = Principal::from("owner");

        token.mint(&owner, &owner, 50_000_000).unwrap();

        assert_eq!(token.balance_of(&owner), 50_000_000);
        assert_eq!(token.total_supply(), 50_000_000);
        assert!(matches!(
            token.history().last(),
            Some(TokenEvent::Minted { amount: 50_000_000, .. })
        ));
    }

    #[test]
    fn test_non_controller_cannot_mint() {
        let mut token = create_test_token();
        let owner = Principal::from("owner");
        let stranger = Principal::from("account1");

        let result = token.mint(&stranger, &owner, 50_000_000);
        assert!(matches!(result, Err(TokenError::Unauthorized { .. })));
        assert_eq!(token.balance_of(&owner), 0);
        assert!(token.history().is_empty());
    }

    #[test]
    fn test_zero_mint_is_a_recorded_noop() {
        let mut token = create_test_token();
        let owner = Principal::from("owner");

        token.mint(&owner, &owner, 0).unwrap();
        assert_eq!(token.total_supply(), 0);
        assert_eq!(token.history().len(), 1);
    }

    #[test]
    fn test_supply_overflow_changes_nothing() {
        let mut token = create_test_token();
        let owner = Principal::from("owner");

        token.mint(&owner, &owner, u128::MAX).unwrap();
        let result = token.mint(&owner, &Principal::from("other"), 1);

        assert!(matches!(result, Err(TokenError::SupplyOverflow { .. })));
        assert_eq!(token.total_supply(), u128::MAX);
        assert_eq!(token.balance_of(&Principal::from("other")), 0);
    }

    #[test]
    fn test_change_controller_takes_effect_immediately() {
        let mut token = create_test_token();
        let owner = Principal::from("owner");
        let next = Principal::from("multisig");

        token.change_controller(&owner, &next).unwrap();
        assert_eq!(token.controller(), &next);
        assert!(matches!(
            token.history(),
            [TokenEvent::ControllerChanged { old, new, .. }] if old == &owner && new == &next
        ));

        assert!(matches!(
            token.mint(&owner, &owner, 1),
            Err(TokenError::Unauthorized { .. })
        ));
        assert!(matches!(
            token.change_controller(&owner, &owner),
            Err(TokenError::Unauthorized { .. })
        ));

        // Rejected attempts leave no trace
        assert_eq!(token.history().len(), 1);

        token.mint(&next, &owner, 1).unwrap();
        assert_eq!(token.balance_of(&owner), 1);
    }

    #[test]
    fn test_invoke_dispatches_encoded_calls() {
        let mut token = create_test_token();
        let owner = Principal::from("owner");
        let address = token.address.clone();

        let payload = Call::Mint {
            to: owner.clone(),
            amount: 7,
        }
        .encode()
        .unwrap();
        token.invoke(&owner, &address, 0, &payload).unwrap();
        assert_eq!(token.balance_of(&owner), 7);

        assert!(matches!(
            token.invoke(&owner, &address, 1, &payload),
            Err(CallError::NonPayable(1))
        ));
        assert!(matches!(
            token.invoke(&owner, &Principal::from("0xOTHER"), 0, &payload),
            Err(CallError::UnknownTarget(_))
        ));
        assert!(matches!(
            token.invoke(&Principal::from("stranger"), &address, 0, &payload),
            Err(CallError::Rejected(TokenError::Unauthorized { .. }))
        ));
        assert_eq!(token.balance_of(&owner), 7);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut token = create_test_token();
        let owner = Principal::from("owner");

        for _ in 0..(MAX_HISTORY + 10) {
            token.mint(&owner, &owner, 1).unwrap();
        }
        assert_eq!(token.history().len(), MAX_HISTORY);
    }
}
