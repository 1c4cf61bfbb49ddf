//! Solana wire primitives for the portfolio token SDK.
//!
//! This crate owns everything that is chain-generic: public keys and
//! keypairs, instructions, the compact binary transaction format, program
//! derived addresses and the two collaborator traits through which the SDK
//! talks to a ledger. Like the rest of the workspace it avoids `solana-sdk`
//! and implements the wire format by hand on top of `ed25519-dalek`,
//! `curve25519-dalek`, `sha2` and `bs58`.

pub mod address;
pub mod error;
pub mod instruction;
pub mod keypair;
pub mod pda;
pub mod rpc;
pub mod system;
pub mod transaction;

// Re-export key public types for ergonomic imports.
pub use address::{address_to_bytes, bytes_to_address, validate_address, Pubkey};
pub use error::SolError;
pub use instruction::{AccountMeta, Instruction};
pub use keypair::{Keypair, Signature};
pub use pda::{create_program_address, find_program_address, is_on_curve};
pub use rpc::{
    AccountFetcher, InstructionError, RemoteAccount, RpcError, TransactionError,
    TransactionSender,
};
pub use system::{SYSTEM_PROGRAM_ID, SYSVAR_RENT_ID};
pub use transaction::{
    decode_compact_u16, encode_compact_u16, CompiledInstruction, Hash, Message, MessageHeader,
    Transaction, PACKET_DATA_SIZE,
};
