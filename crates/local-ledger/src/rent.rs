//! Rent exemption.
//!
//! The ledger charges no rent; it only enforces that freshly initialized
//! accounts hold at least two years of rent for their size.

/// Bytes of bookkeeping charged on top of the account data.
pub const ACCOUNT_STORAGE_OVERHEAD: u64 = 128;
pub const LAMPORTS_PER_BYTE_YEAR: u64 = 3480;
pub const EXEMPTION_THRESHOLD_YEARS: u64 = 2;

/// Minimum balance for an account with `data_len` bytes to be rent exempt.
pub fn minimum_balance(data_len: usize) -> u64 {
    (ACCOUNT_STORAGE_OVERHEAD + data_len as u64)
        * LAMPORTS_PER_BYTE_YEAR
        * EXEMPTION_THRESHOLD_YEARS
}

pub fn is_exempt(lamports: u64, data_len: usize) -> bool {
    lamports >= minimum_balance(data_len)
}
