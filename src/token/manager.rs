//! Token registry
//!
//! Deploys tokens at derived addresses and routes encoded calls to them.

use crate::core::{CallError, Invoker, Principal};
use crate::crypto::sha256;
use crate::token::token::{Token, TokenError, TokenEvent, TokenMetadata};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Manages all tokens in the system
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenManager {
    /// All tokens by address
    tokens: HashMap<Principal, Token>,
    /// Deployment counter for address generation
    nonce: u64,
}

impl TokenManager {
    /// Create a new token manager
    pub fn new() -> Self {
        Self {
            tokens: HashMap::new(),
            nonce: 0,
        }
    }

    /// Deploy a new token controlled by `controller`
    ///
    /// Supply starts at zero; the controller mints from there.
    pub fn create_token(
        &mut self,
        name: String,
        symbol: String,
        decimals: u8,
        controller: &Principal,
    ) -> Result<Token, TokenError> {
        let metadata = TokenMetadata::new(name, symbol, decimals)?;

        let address = self.generate_address(controller, &metadata.symbol);
        if self.tokens.contains_key(&address) {
            return Err(TokenError::TokenAlreadyExists(address.to_string()));
        }
        self.nonce += 1;

        let token = Token::new(address.clone(), metadata, controller.clone());
        self.tokens.insert(address.clone(), token.clone());

        log::info!(
            "Token created: {} ({}) at {}, controller {}",
            token.name(),
            token.symbol(),
            address,
            controller
        );

        Ok(token)
    }

    /// Generate token address from creator and symbol
    fn generate_address(&self, creator: &Principal, symbol: &str) -> Principal {
        let input = format!("{}:{}:{}", creator, symbol, self.nonce);
        let hash = sha256(input.as_bytes());
        Principal::new(format!("0x{}", &hex::encode(hash)[..40]))
    }

    /// Get a token by address
    pub fn get(&self, address: &Principal) -> Option<&Token> {
        self.tokens.get(address)
    }

    /// List all tokens
    pub fn list(&self) -> Vec<&Token> {
        self.tokens.values().collect()
    }

    /// Get token count
    pub fn count(&self) -> usize {
        self.tokens.len()
    }

    fn token_mut(&mut self, address: &Principal) -> Result<&mut Token, TokenError> {
        self.tokens
            .get_mut(address)
            .ok_or_else(|| TokenError::TokenNotFound(address.to_string()))
    }

    /// Mint new tokens
    pub fn mint(
        &mut self,
        token_address: &Principal,
        caller: &Principal,
        to: &Principal,
        amount: u128,
    ) -> Result<TokenEvent, TokenError> {
        self.token_mut(token_address)?.mint(caller, to, amount)
    }

    /// Hand a token's mint control to another principal
    pub fn change_controller(
        &mut self,
        token_address: &Principal,
        caller: &Principal,
        new_controller: &Principal,
    ) -> Result<TokenEvent, TokenError> {
        self.token_mut(token_address)?
            .change_controller(caller, new_controller)
    }

    /// Get balance for an address on a specific token
    pub fn balance_of(
        &self,
        token_address: &Principal,
        holder: &Principal,
    ) -> Result<u128, TokenError> {
        let token = self
            .tokens
            .get(token_address)
            .ok_or_else(|| TokenError::TokenNotFound(token_address.to_string()))?;

        Ok(token.balance_of(holder))
    }

    /// Current controller of a token
    pub fn controller_of(&self, token_address: &Principal) -> Result<&Principal, TokenError> {
        self.tokens
            .get(token_address)
            .map(Token::controller)
            .ok_or_else(|| TokenError::TokenNotFound(token_address.to_string()))
    }
}

impl Invoker for TokenManager {
    fn invoke(
        &mut self,
        caller: &Principal,
        target: &Principal,
        value: u128,
        payload: &[u8],
    ) -> Result<(), CallError> {
        let token = self
            .tokens
            .get_mut(target)
            .ok_or_else(|| CallError::UnknownTarget(target.clone()))?;

        token.invoke(caller, target, value, payload)
    }
}
