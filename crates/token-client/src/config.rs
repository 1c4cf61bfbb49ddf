//! Client configuration.
//!
//! Program ids always travel in an explicit [`ClientConfig`] value; nothing
//! in the SDK reads process-wide state. Configs are JSON documents with
//! camelCase keys and base58 addresses:
//!
//! ```json
//! {
//!   "tokenProgramId": "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
//!   "associatedTokenProgramId": "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL",
//!   "rpcUrl": "http://127.0.0.1:8899",
//!   "commitment": "confirmed"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sol_wire::{Keypair, Pubkey, SolError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid keypair file: {0}")]
    Keypair(SolError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub token_program_id: Pubkey,
    pub associated_token_program_id: Pubkey,
    /// Endpoint of a JSON-RPC node, for transports that need one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commitment: Option<String>,
}

/// The program ids a client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramIds {
    pub token: Pubkey,
    pub associated_token: Pubkey,
}

impl ClientConfig {
    pub fn new(token_program_id: Pubkey, associated_token_program_id: Pubkey) -> Self {
        Self {
            token_program_id,
            associated_token_program_id,
            rpc_url: None,
            commitment: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn program_ids(&self) -> ProgramIds {
        ProgramIds {
            token: self.token_program_id,
            associated_token: self.associated_token_program_id,
        }
    }
}

/// Load a keypair stored as a JSON array of 64 bytes, secret half first.
pub fn load_keypair(path: impl AsRef<Path>) -> Result<Keypair, ConfigError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let bytes: Vec<u8> = serde_json::from_str(&json)?;
    Keypair::from_bytes(&bytes).map_err(ConfigError::Keypair)
}
