use num_enum::{IntoPrimitive, TryFromPrimitive};
use thiserror::Error;
use token_state::{MAX_SIGNERS, METADATA_URL_LEN};

use crate::instruction::MAX_DECIMALS;

/// A builder argument broke a contract that can be checked without I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("{0} signers given, at most {MAX_SIGNERS} allowed")]
    TooManySigners(usize),

    #[error("multisig needs between 1 and {MAX_SIGNERS} signers, got {0}")]
    InvalidSignerCount(usize),

    #[error("multisig threshold {m} is outside 1..={n}")]
    InvalidThreshold { m: u8, n: usize },

    #[error("decimals {0} out of range, at most {MAX_DECIMALS}")]
    DecimalsOutOfRange(u8),

    #[error("metadata url is {0} bytes, at most {METADATA_URL_LEN}")]
    MetadataUrlTooLong(usize),
}

/// Errors raised by the token program, by custom error code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Error, IntoPrimitive, TryFromPrimitive,
)]
#[repr(u32)]
pub enum TokenError {
    #[error("lamport balance below rent-exempt threshold")]
    NotRentExempt = 0,
    #[error("insufficient funds")]
    InsufficientFunds = 1,
    #[error("invalid mint")]
    InvalidMint = 2,
    #[error("account not associated with this mint")]
    MintMismatch = 3,
    #[error("owner does not match")]
    OwnerMismatch = 4,
    #[error("fixed supply")]
    FixedSupply = 5,
    #[error("already in use")]
    AlreadyInUse = 6,
    #[error("invalid number of provided signers")]
    InvalidNumberOfProvidedSigners = 7,
    #[error("invalid number of required signers")]
    InvalidNumberOfRequiredSigners = 8,
    #[error("state is uninitialized")]
    UninitializedState = 9,
    #[error("instruction does not support native tokens")]
    NativeNotSupported = 10,
    #[error("non-native account can only be closed if its balance is zero")]
    NonNativeHasBalance = 11,
    #[error("invalid instruction")]
    InvalidInstruction = 12,
    #[error("state is invalid for requested operation")]
    InvalidState = 13,
    #[error("operation overflowed")]
    Overflow = 14,
    #[error("account does not support specified authority type")]
    AuthorityTypeNotSupported = 15,
    #[error("this token mint cannot freeze accounts")]
    MintCannotFreeze = 16,
    #[error("account is frozen")]
    AccountFrozen = 17,
    #[error("the provided decimals value different from the mint decimals")]
    MintDecimalsMismatch = 18,
}

impl TokenError {
    /// Map a custom program error code back to its variant.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::try_from(code).ok()
    }

    pub fn code(self) -> u32 {
        self.into()
    }
}
