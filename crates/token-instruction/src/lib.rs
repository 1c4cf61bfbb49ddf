//! Instruction builders for the portfolio token program.
//!
//! Each builder is a pure function from typed arguments to a
//! [`sol_wire::Instruction`]. The program dispatches on account position,
//! so the account order produced here is part of the wire contract.
//! Program ids are always parameters; nothing here assumes a deployment.

pub mod associated;
pub mod error;
pub mod instruction;
pub mod portfolio;
pub mod token;

pub use associated::{
    create_associated_token_account, derive_associated_token_address,
    find_associated_token_address, ASSOCIATED_TOKEN_PROGRAM_ID,
};
pub use error::{ArgumentError, TokenError};
pub use instruction::{AuthorityType, SlotAllocation, TokenInstruction, MAX_DECIMALS};
pub use portfolio::{find_portfolio_address, DepositAccounts, PORTFOLIO_SEED};
