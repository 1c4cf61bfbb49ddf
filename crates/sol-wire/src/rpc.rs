//! Ledger collaborators.
//!
//! The SDK never talks to a network directly. Everything that needs the
//! ledger goes through [`TransactionSender`] and [`AccountFetcher`], so the
//! same client code runs against a JSON-RPC node or an in-process bank.

use thiserror::Error;

use crate::address::Pubkey;
use crate::keypair::Signature;
use crate::transaction::Hash;

/// Raw account contents as returned by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAccount {
    pub lamports: u64,
    pub data: Vec<u8>,
    pub owner: Pubkey,
    pub executable: bool,
}

/// Reasons a single instruction can fail inside the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstructionError {
    /// A program-specific error code.
    #[error("custom program error: {0:#x}")]
    Custom(u32),

    #[error("invalid program argument")]
    InvalidArgument,

    #[error("invalid instruction data")]
    InvalidInstructionData,

    #[error("invalid account data for instruction")]
    InvalidAccountData,

    #[error("account data too small for instruction")]
    AccountDataTooSmall,

    #[error("insufficient funds for instruction")]
    InsufficientFunds,

    #[error("incorrect program id for instruction")]
    IncorrectProgramId,

    #[error("missing required signature for instruction")]
    MissingRequiredSignature,

    #[error("instruction requires an uninitialized account")]
    AccountAlreadyInitialized,

    #[error("instruction requires an initialized account")]
    UninitializedAccount,

    #[error("not enough account keys given to the instruction")]
    NotEnoughAccountKeys,

    #[error("instruction modified data of a read-only account")]
    ReadonlyDataModified,

    #[error("instruction modified data of an account it does not own")]
    ExternalAccountDataModified,

    #[error("instruction spent from the balance of an account it does not own")]
    ExternalAccountLamportSpend,

    #[error("an account with the same address already exists")]
    AccountAlreadyInUse,

    #[error("provided seeds do not result in a valid address")]
    InvalidSeeds,

    #[error("instruction is not supported by the program")]
    UnsupportedInstruction,

    #[error("program is not executable or does not exist")]
    UnknownProgram,
}

/// Reasons a whole transaction can be rejected before or after execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("transaction could not be decoded: {0}")]
    SanitizeFailure(String),

    #[error("transaction did not pass signature verification")]
    SignatureFailure,

    #[error("blockhash not found")]
    BlockhashNotFound,

    #[error("this transaction has already been processed")]
    AlreadyProcessed,

    #[error("attempt to debit an account but found no record of a prior credit")]
    AccountNotFound,

    #[error("insufficient funds for fee")]
    InsufficientFundsForFee,
}

/// A failure reported by the ledger. It is returned to the caller unmodified
/// and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    #[error("error processing instruction {index}: {error}")]
    Instruction {
        index: u8,
        error: InstructionError,
    },

    #[error("transaction rejected: {0}")]
    Transaction(TransactionError),

    #[error("transport error: {0}")]
    Transport(String),
}

impl RpcError {
    /// The custom program error code, if the failure carried one.
    pub fn custom_code(&self) -> Option<u32> {
        match self {
            RpcError::Instruction {
                error: InstructionError::Custom(code),
                ..
            } => Some(*code),
            _ => None,
        }
    }
}

impl From<TransactionError> for RpcError {
    fn from(e: TransactionError) -> Self {
        RpcError::Transaction(e)
    }
}

/// Submits signed transactions.
pub trait TransactionSender {
    fn get_latest_blockhash(&self) -> Result<Hash, RpcError>;

    /// Submit wire bytes and block until the transaction is confirmed or
    /// rejected.
    fn send_and_confirm_transaction(&self, wire: &[u8]) -> Result<Signature, RpcError>;
}

/// Reads account state.
pub trait AccountFetcher {
    /// `Ok(None)` when the account does not exist.
    fn get_account(&self, address: &Pubkey) -> Result<Option<RemoteAccount>, RpcError>;

    fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64, RpcError>;
}
