//! Client SDK for the portfolio token program.
//!
//! A [`Token`] handle wraps one mint and exposes every token operation as a
//! blocking call that builds, signs and confirms a single transaction. A
//! [`PortfolioClient`] does the same for portfolio templates and user
//! positions. Both are generic over the [`TransactionSender`] and
//! [`AccountFetcher`] collaborators, so the same code drives a JSON-RPC
//! transport or the in-process `local-ledger`.
//!
//! [`TransactionSender`]: sol_wire::TransactionSender
//! [`AccountFetcher`]: sol_wire::AccountFetcher

pub mod authority;
pub mod config;
pub mod error;
mod ledger;
pub mod portfolio;
pub mod token;

pub use authority::Authority;
pub use config::{load_keypair, ClientConfig, ConfigError, ProgramIds};
pub use error::ClientError;
pub use portfolio::PortfolioClient;
pub use token::Token;
