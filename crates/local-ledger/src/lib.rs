//! An in-process ledger for exercising the token SDK end to end.
//!
//! [`LocalLedger`] implements [`sol_wire::TransactionSender`] and
//! [`sol_wire::AccountFetcher`] over an in-memory account map. It hosts the
//! system program, the token program and the associated token account program
//! under program ids chosen by the caller. Transactions are verified, charged
//! and executed atomically; nothing touches a network.

mod associated_program;
mod error;
mod invoke;
pub mod ledger;
pub mod rent;
mod system_program;
mod token_program;

pub use ledger::{LocalLedger, FEE_PER_SIGNATURE, MAX_RECENT_BLOCKHASHES};
pub use system_program::MAX_PERMITTED_DATA_LENGTH;
