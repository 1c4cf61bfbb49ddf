//! Shared setup for the end-to-end tests: an in-process ledger, a config
//! pointing at it and a funded fee payer.

#![allow(dead_code)]

use local_ledger::LocalLedger;
use sol_wire::{AccountFetcher, Keypair, Pubkey};
use token_client::ClientConfig;

pub const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
pub const ASSOCIATED_TOKEN_PROGRAM: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";

pub const PAYER_FUNDS: u64 = 10_000_000_000;

/// Initialize env_logger once for test output.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct TestEnv {
    pub ledger: LocalLedger,
    pub config: ClientConfig,
    pub payer: Keypair,
}

pub fn setup() -> TestEnv {
    init_logging();

    let config = ClientConfig::from_json(&format!(
        r#"{{"tokenProgramId":"{TOKEN_PROGRAM}","associatedTokenProgramId":"{ASSOCIATED_TOKEN_PROGRAM}","commitment":"confirmed"}}"#
    ))
    .unwrap();
    let ledger = LocalLedger::new(config.token_program_id, config.associated_token_program_id);
    let payer = Keypair::new();
    ledger.airdrop(&payer.pubkey(), PAYER_FUNDS).unwrap();

    TestEnv {
        ledger,
        config,
        payer,
    }
}

/// A fresh fee payer holding exactly `lamports`.
pub fn funded_keypair(ledger: &LocalLedger, lamports: u64) -> Keypair {
    let keypair = Keypair::new();
    ledger.airdrop(&keypair.pubkey(), lamports).unwrap();
    keypair
}

pub fn lamports(ledger: &LocalLedger, address: &Pubkey) -> u64 {
    ledger
        .get_account(address)
        .unwrap()
        .map(|account| account.lamports)
        .unwrap_or(0)
}
