//! Error taxonomy for wallet operations.

use alloy::primitives::{Address, U256};
use thiserror::Error;

/// Errors surfaced by the admin wallet and its components.
#[derive(Debug, Error)]
pub enum WalletError {
    /// Fatal startup failure: bad credentials, bad endpoint, unresolved contract.
    #[error("Initialization failed: {0}")]
    Initialization(String),

    /// Top-up attempted before the daily window elapsed.
    #[error("Rate limit: last top-up for {address} was {elapsed_minutes} minutes ago")]
    RateLimited { address: Address, elapsed_minutes: i64 },

    /// Top-up target is not whitelisted and `force` was not set.
    #[error("Address {0} is not verified")]
    NotVerified(Address),

    /// Computed deficit is below the minimum top-up threshold.
    #[error("No topping needed for {address}: deficit {deficit} wei is below threshold {threshold} wei")]
    NoTopUpNeeded {
        address: Address,
        deficit: U256,
        threshold: U256,
    },

    /// Network, RPC, revert, or decoding failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Caller supplied something that is not a 20-byte hex address.
    #[error("Invalid address {0}")]
    InvalidAddress(String),

    /// Operation called before `initialize` bound the contracts.
    #[error("Wallet not ready: {0}")]
    NotReady(String),
}

impl WalletError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn initialization(err: impl std::fmt::Display) -> Self {
        Self::Initialization(err.to_string())
    }
}

/// Result type for wallet operations.
pub type WalletResult<T> = Result<T, WalletError>;
