//! Fixed-layout account records for the portfolio token program.
//!
//! Every record has a constant byte length and is packed little-endian with
//! no padding. Optional keys use a one-byte presence tag followed by a
//! 32-byte body that is zero-filled when absent. Decoding is a pure
//! reinterpretation of bytes: the only failure is a buffer that is too small.

pub mod error;
pub mod multisig;
pub mod pack;
pub mod portfolio;
pub mod token;

pub use error::LayoutError;
pub use multisig::{Multisig, MAX_SIGNERS, MIN_SIGNERS};
pub use pack::Pack;
pub use portfolio::{AssetSlot, Portfolio, UserPortfolio, METADATA_URL_LEN, PORTFOLIO_SLOTS};
pub use token::{Account, AccountState, Mint};
