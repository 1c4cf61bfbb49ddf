use sol_wire::{Pubkey, RpcError, SolError};
use thiserror::Error;
use token_instruction::{ArgumentError, TokenError};
use token_state::LayoutError;

use crate::config::ConfigError;

/// Everything a client operation can fail with.
///
/// `Layout`, `Argument`, `Address` and `Transaction` are raised locally,
/// before anything is sent. `Remote` carries the ledger's answer untouched.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("invalid argument: {0}")]
    Argument(#[from] ArgumentError),

    #[error("address error: {0}")]
    Address(SolError),

    #[error("transaction error: {0}")]
    Transaction(SolError),

    #[error("remote error: {0}")]
    Remote(#[from] RpcError),

    #[error("account {0} not found")]
    AccountNotFound(Pubkey),

    #[error("account {address} is owned by {owner}, expected {expected}")]
    InvalidAccountOwner {
        address: Pubkey,
        owner: Pubkey,
        expected: Pubkey,
    },

    #[error("account {address} holds {actual} bytes, expected {expected}")]
    InvalidAccountSize {
        address: Pubkey,
        expected: usize,
        actual: usize,
    },

    #[error("account {address} belongs to mint {actual}, expected {expected}")]
    MintMismatch {
        address: Pubkey,
        expected: Pubkey,
        actual: Pubkey,
    },

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl From<SolError> for ClientError {
    fn from(e: SolError) -> Self {
        match e {
            SolError::InvalidPublicKey(_) | SolError::InvalidAddress(_) | SolError::InvalidSeeds(_) => {
                ClientError::Address(e)
            }
            _ => ClientError::Transaction(e),
        }
    }
}

impl ClientError {
    /// The token program error behind a remote failure, if there is one.
    pub fn token_error(&self) -> Option<TokenError> {
        match self {
            ClientError::Remote(e) => e.custom_code().and_then(TokenError::from_code),
            _ => None,
        }
    }
}
