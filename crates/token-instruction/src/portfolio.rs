//! Portfolio instruction builders: templates, user positions and the
//! deposit/withdraw flow against the hedged backing.

use sol_wire::{find_program_address, AccountMeta, Instruction, Pubkey, SolError, SYSTEM_PROGRAM_ID};
use token_state::{AssetSlot, METADATA_URL_LEN, PORTFOLIO_SLOTS};

use crate::error::ArgumentError;
use crate::instruction::{SlotAllocation, TokenInstruction};

/// Accounts taking part in a `Deposit` swap, in wire order.
#[derive(Debug, Clone, Copy)]
pub struct DepositAccounts {
    pub swap: Pubkey,
    pub owner: Pubkey,
    pub account: Pubkey,
    pub source: Pubkey,
    pub swap_source: Pubkey,
    pub swap_destination: Pubkey,
    pub destination: Pubkey,
    pub pool_mint: Pubkey,
    pub pool_fee_account: Pubkey,
    pub swap_program: Pubkey,
    pub host_fee_account: Pubkey,
    pub program_authority: Pubkey,
    pub swap_pool: Pubkey,
}

/// Leading seed of every portfolio address.
pub const PORTFOLIO_SEED: &[u8] = b"portfolio";

/// Address and bump of the portfolio `owner` publishes under
/// `metadata_hash`. The program allocates the account at this address, so an
/// owner has at most one portfolio per hash.
pub fn find_portfolio_address(
    token_program_id: &Pubkey,
    owner: &Pubkey,
    metadata_hash: u16,
) -> Result<(Pubkey, u8), SolError> {
    find_program_address(
        &[PORTFOLIO_SEED, owner.as_ref(), &metadata_hash.to_le_bytes()],
        token_program_id,
    )
}

/// Creates an `InitializePortfolio` instruction.
///
/// Accounts: payer (writable, signer), portfolio (writable), owner (signer),
/// system program, then for each slot its asset mint and target asset. The
/// program funds and allocates the portfolio from the payer, so `portfolio`
/// must be the address from [`find_portfolio_address`]. The metadata URL is
/// zero-padded to [`METADATA_URL_LEN`] bytes.
pub fn initialize_portfolio(
    token_program_id: &Pubkey,
    payer: &Pubkey,
    portfolio: &Pubkey,
    owner: &Pubkey,
    metadata_url: &[u8],
    metadata_hash: u16,
    slots: &[AssetSlot; PORTFOLIO_SLOTS],
) -> Result<Instruction, ArgumentError> {
    if metadata_url.len() > METADATA_URL_LEN {
        return Err(ArgumentError::MetadataUrlTooLong(metadata_url.len()));
    }
    let mut url = [0u8; METADATA_URL_LEN];
    url[..metadata_url.len()].copy_from_slice(metadata_url);

    let mut accounts = Vec::with_capacity(4 + 2 * PORTFOLIO_SLOTS);
    accounts.push(AccountMeta::new(*payer, true));
    accounts.push(AccountMeta::new(*portfolio, false));
    accounts.push(AccountMeta::new_readonly(*owner, true));
    accounts.push(AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false));
    for slot in slots {
        accounts.push(AccountMeta::new_readonly(slot.asset_mint, false));
        accounts.push(AccountMeta::new_readonly(slot.target_asset, false));
    }

    let allocations = slots.map(|slot| SlotAllocation {
        amount: slot.amount,
        period: slot.period,
    });

    Ok(Instruction {
        program_id: *token_program_id,
        accounts,
        data: TokenInstruction::InitializePortfolio {
            metadata_url: url,
            metadata_hash,
            allocations,
        }
        .pack(),
    })
}

/// Creates an `InitializeUserPortfolio` instruction.
///
/// `values` records the user's starting amount per slot.
#[allow(clippy::too_many_arguments)]
pub fn initialize_user_portfolio(
    token_program_id: &Pubkey,
    user_portfolio: &Pubkey,
    portfolio: &Pubkey,
    owner: &Pubkey,
    delegate: &Pubkey,
    asset_accounts: &[Pubkey; PORTFOLIO_SLOTS],
    delegated_amount: u64,
    values: [u64; PORTFOLIO_SLOTS],
) -> Result<Instruction, ArgumentError> {
    let mut accounts = Vec::with_capacity(4 + PORTFOLIO_SLOTS);
    accounts.push(AccountMeta::new(*user_portfolio, false));
    accounts.push(AccountMeta::new_readonly(*portfolio, false));
    accounts.push(AccountMeta::new_readonly(*owner, true));
    accounts.push(AccountMeta::new_readonly(*delegate, false));
    for asset in asset_accounts {
        accounts.push(AccountMeta::new_readonly(*asset, false));
    }

    Ok(Instruction {
        program_id: *token_program_id,
        accounts,
        data: TokenInstruction::InitializeUserPortfolio {
            delegated_amount,
            values,
        }
        .pack(),
    })
}

/// Creates a `Deposit` instruction that swaps into the hedged asset.
pub fn deposit(
    token_program_id: &Pubkey,
    accounts: &DepositAccounts,
    amount: u64,
    volatility: u64,
    nonce: u8,
) -> Result<Instruction, ArgumentError> {
    let a = accounts;
    let metas = vec![
        AccountMeta::new(a.swap, false),
        AccountMeta::new(a.owner, true),
        AccountMeta::new(a.account, false),
        AccountMeta::new(a.source, false),
        AccountMeta::new(a.swap_source, false),
        AccountMeta::new(a.swap_destination, false),
        AccountMeta::new(a.destination, false),
        AccountMeta::new(a.pool_mint, false),
        AccountMeta::new(a.pool_fee_account, false),
        AccountMeta::new_readonly(a.swap_program, false),
        AccountMeta::new(a.host_fee_account, false),
        AccountMeta::new_readonly(a.program_authority, false),
        AccountMeta::new_readonly(a.swap_pool, false),
    ];

    Ok(Instruction {
        program_id: *token_program_id,
        accounts: metas,
        data: TokenInstruction::Deposit {
            amount,
            volatility,
            nonce,
        }
        .pack(),
    })
}

/// Creates a `Withdraw` instruction. The burned share of the account's
/// backing is proportional to `amount`.
pub fn withdraw(
    token_program_id: &Pubkey,
    account: &Pubkey,
    owner: &Pubkey,
    signer_pubkeys: &[&Pubkey],
    amount: u64,
) -> Result<Instruction, ArgumentError> {
    if signer_pubkeys.len() > token_state::MAX_SIGNERS {
        return Err(ArgumentError::TooManySigners(signer_pubkeys.len()));
    }

    let mut accounts = Vec::with_capacity(2 + signer_pubkeys.len());
    accounts.push(AccountMeta::new(*account, false));
    accounts.push(AccountMeta::new_readonly(*owner, signer_pubkeys.is_empty()));
    for signer in signer_pubkeys {
        accounts.push(AccountMeta::new_readonly(**signer, true));
    }

    Ok(Instruction {
        program_id: *token_program_id,
        accounts,
        data: TokenInstruction::Withdraw { amount }.pack(),
    })
}
