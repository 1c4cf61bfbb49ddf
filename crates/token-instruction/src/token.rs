//! Token program instruction builders.
//!
//! Builders are pure: they check what can be checked locally and place the
//! arguments in the payload. Whether `decimals` matches the live mint, or
//! whether an authority really owns an account, is for the program to decide.
//!
//! Where an operation takes `signer_pubkeys`, a non-empty list means the
//! authority is a multisig account: the authority is then passed read-only
//! and the co-signers follow as read-only signers.

use sol_wire::{AccountMeta, Instruction, Pubkey, SYSVAR_RENT_ID};
use token_state::{MAX_SIGNERS, MIN_SIGNERS};

use crate::error::ArgumentError;
use crate::instruction::{AuthorityType, TokenInstruction, MAX_DECIMALS};

fn check_signer_count(signer_pubkeys: &[&Pubkey]) -> Result<(), ArgumentError> {
    if signer_pubkeys.len() > MAX_SIGNERS {
        return Err(ArgumentError::TooManySigners(signer_pubkeys.len()));
    }
    Ok(())
}

fn check_decimals(decimals: u8) -> Result<(), ArgumentError> {
    if decimals > MAX_DECIMALS {
        return Err(ArgumentError::DecimalsOutOfRange(decimals));
    }
    Ok(())
}

/// Push the authority followed by its multisig co-signers.
fn push_authority(accounts: &mut Vec<AccountMeta>, authority: &Pubkey, signer_pubkeys: &[&Pubkey]) {
    accounts.push(AccountMeta::new_readonly(*authority, signer_pubkeys.is_empty()));
    for signer in signer_pubkeys {
        accounts.push(AccountMeta::new_readonly(**signer, true));
    }
}

fn build(program_id: &Pubkey, accounts: Vec<AccountMeta>, ix: TokenInstruction) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts,
        data: ix.pack(),
    }
}

/// Creates an `InitializeMint` instruction.
///
/// Accounts: mint (writable), rent sysvar, mint authority.
pub fn initialize_mint(
    token_program_id: &Pubkey,
    mint: &Pubkey,
    mint_authority: &Pubkey,
    freeze_authority: Option<&Pubkey>,
    decimals: u8,
) -> Result<Instruction, ArgumentError> {
    initialize_hedged_mint(
        token_program_id,
        mint,
        mint_authority,
        freeze_authority,
        decimals,
        None,
        None,
    )
}

/// Creates an `InitializeMint` instruction that links the mint to a hedged
/// asset and the pool used to rebalance it.
pub fn initialize_hedged_mint(
    token_program_id: &Pubkey,
    mint: &Pubkey,
    mint_authority: &Pubkey,
    freeze_authority: Option<&Pubkey>,
    decimals: u8,
    hedged_asset_mint: Option<&Pubkey>,
    swap_pool: Option<&Pubkey>,
) -> Result<Instruction, ArgumentError> {
    let accounts = vec![
        AccountMeta::new(*mint, false),
        AccountMeta::new_readonly(SYSVAR_RENT_ID, false),
        AccountMeta::new_readonly(*mint_authority, false),
    ];
    Ok(build(
        token_program_id,
        accounts,
        TokenInstruction::InitializeMint {
            decimals,
            mint_authority: *mint_authority,
            freeze_authority: freeze_authority.copied(),
            hedged_asset_mint: hedged_asset_mint.copied(),
            swap_pool: swap_pool.copied(),
        },
    ))
}

/// Creates an `InitializeAccount` instruction.
pub fn initialize_account(
    token_program_id: &Pubkey,
    account: &Pubkey,
    mint: &Pubkey,
    owner: &Pubkey,
) -> Result<Instruction, ArgumentError> {
    let accounts = vec![
        AccountMeta::new(*account, false),
        AccountMeta::new_readonly(*mint, false),
        AccountMeta::new_readonly(*owner, false),
        AccountMeta::new_readonly(SYSVAR_RENT_ID, false),
    ];
    Ok(build(
        token_program_id,
        accounts,
        TokenInstruction::InitializeAccount,
    ))
}

/// Creates an `InitializeAccount2` instruction, which carries the owner in
/// the payload instead of the account list.
pub fn initialize_account2(
    token_program_id: &Pubkey,
    account: &Pubkey,
    mint: &Pubkey,
    owner: &Pubkey,
) -> Result<Instruction, ArgumentError> {
    let accounts = vec![
        AccountMeta::new(*account, false),
        AccountMeta::new_readonly(*mint, false),
        AccountMeta::new_readonly(SYSVAR_RENT_ID, false),
    ];
    Ok(build(
        token_program_id,
        accounts,
        TokenInstruction::InitializeAccount2 { owner: *owner },
    ))
}

/// Creates an `InitializeMultisig` instruction.
pub fn initialize_multisig(
    token_program_id: &Pubkey,
    multisig: &Pubkey,
    signer_pubkeys: &[&Pubkey],
    m: u8,
) -> Result<Instruction, ArgumentError> {
    let n = signer_pubkeys.len();
    if !(MIN_SIGNERS..=MAX_SIGNERS).contains(&n) {
        return Err(ArgumentError::InvalidSignerCount(n));
    }
    if m == 0 || m as usize > n {
        return Err(ArgumentError::InvalidThreshold { m, n });
    }

    let mut accounts = Vec::with_capacity(2 + n);
    accounts.push(AccountMeta::new(*multisig, false));
    accounts.push(AccountMeta::new_readonly(SYSVAR_RENT_ID, false));
    for signer in signer_pubkeys {
        accounts.push(AccountMeta::new_readonly(**signer, false));
    }
    Ok(build(
        token_program_id,
        accounts,
        TokenInstruction::InitializeMultisig { m },
    ))
}

/// Creates a `Transfer` instruction.
pub fn transfer(
    token_program_id: &Pubkey,
    source: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    signer_pubkeys: &[&Pubkey],
    amount: u64,
) -> Result<Instruction, ArgumentError> {
    check_signer_count(signer_pubkeys)?;

    let mut accounts = Vec::with_capacity(3 + signer_pubkeys.len());
    accounts.push(AccountMeta::new(*source, false));
    accounts.push(AccountMeta::new(*destination, false));
    push_authority(&mut accounts, authority, signer_pubkeys);
    Ok(build(
        token_program_id,
        accounts,
        TokenInstruction::Transfer { amount },
    ))
}

/// Creates an `Approve` instruction.
pub fn approve(
    token_program_id: &Pubkey,
    source: &Pubkey,
    delegate: &Pubkey,
    owner: &Pubkey,
    signer_pubkeys: &[&Pubkey],
    amount: u64,
) -> Result<Instruction, ArgumentError> {
    check_signer_count(signer_pubkeys)?;

    let mut accounts = Vec::with_capacity(3 + signer_pubkeys.len());
    accounts.push(AccountMeta::new(*source, false));
    accounts.push(AccountMeta::new_readonly(*delegate, false));
    push_authority(&mut accounts, owner, signer_pubkeys);
    Ok(build(
        token_program_id,
        accounts,
        TokenInstruction::Approve { amount },
    ))
}

/// Creates a `Revoke` instruction.
pub fn revoke(
    token_program_id: &Pubkey,
    source: &Pubkey,
    owner: &Pubkey,
    signer_pubkeys: &[&Pubkey],
) -> Result<Instruction, ArgumentError> {
    check_signer_count(signer_pubkeys)?;

    let mut accounts = Vec::with_capacity(2 + signer_pubkeys.len());
    accounts.push(AccountMeta::new(*source, false));
    push_authority(&mut accounts, owner, signer_pubkeys);
    Ok(build(token_program_id, accounts, TokenInstruction::Revoke))
}

/// Creates a `SetAuthority` instruction. `None` removes the authority.
pub fn set_authority(
    token_program_id: &Pubkey,
    owned: &Pubkey,
    new_authority: Option<&Pubkey>,
    authority_type: AuthorityType,
    owner: &Pubkey,
    signer_pubkeys: &[&Pubkey],
) -> Result<Instruction, ArgumentError> {
    check_signer_count(signer_pubkeys)?;

    let mut accounts = Vec::with_capacity(2 + signer_pubkeys.len());
    accounts.push(AccountMeta::new(*owned, false));
    push_authority(&mut accounts, owner, signer_pubkeys);
    Ok(build(
        token_program_id,
        accounts,
        TokenInstruction::SetAuthority {
            authority_type,
            new_authority: new_authority.copied(),
        },
    ))
}

/// Creates a `MintTo` instruction.
pub fn mint_to(
    token_program_id: &Pubkey,
    mint: &Pubkey,
    account: &Pubkey,
    mint_authority: &Pubkey,
    signer_pubkeys: &[&Pubkey],
    amount: u64,
) -> Result<Instruction, ArgumentError> {
    check_signer_count(signer_pubkeys)?;

    let mut accounts = Vec::with_capacity(3 + signer_pubkeys.len());
    accounts.push(AccountMeta::new(*mint, false));
    accounts.push(AccountMeta::new(*account, false));
    push_authority(&mut accounts, mint_authority, signer_pubkeys);
    Ok(build(
        token_program_id,
        accounts,
        TokenInstruction::MintTo { amount },
    ))
}

/// Creates a `Burn` instruction.
pub fn burn(
    token_program_id: &Pubkey,
    account: &Pubkey,
    mint: &Pubkey,
    authority: &Pubkey,
    signer_pubkeys: &[&Pubkey],
    amount: u64,
) -> Result<Instruction, ArgumentError> {
    check_signer_count(signer_pubkeys)?;

    let mut accounts = Vec::with_capacity(3 + signer_pubkeys.len());
    accounts.push(AccountMeta::new(*account, false));
    accounts.push(AccountMeta::new(*mint, false));
    push_authority(&mut accounts, authority, signer_pubkeys);
    Ok(build(
        token_program_id,
        accounts,
        TokenInstruction::Burn { amount },
    ))
}

/// Creates a `CloseAccount` instruction.
pub fn close_account(
    token_program_id: &Pubkey,
    account: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    signer_pubkeys: &[&Pubkey],
) -> Result<Instruction, ArgumentError> {
    check_signer_count(signer_pubkeys)?;

    let mut accounts = Vec::with_capacity(3 + signer_pubkeys.len());
    accounts.push(AccountMeta::new(*account, false));
    accounts.push(AccountMeta::new(*destination, false));
    push_authority(&mut accounts, authority, signer_pubkeys);
    Ok(build(
        token_program_id,
        accounts,
        TokenInstruction::CloseAccount,
    ))
}

/// Creates a `FreezeAccount` instruction.
pub fn freeze_account(
    token_program_id: &Pubkey,
    account: &Pubkey,
    mint: &Pubkey,
    freeze_authority: &Pubkey,
    signer_pubkeys: &[&Pubkey],
) -> Result<Instruction, ArgumentError> {
    freeze_or_thaw(
        token_program_id,
        account,
        mint,
        freeze_authority,
        signer_pubkeys,
        TokenInstruction::FreezeAccount,
    )
}

/// Creates a `ThawAccount` instruction.
pub fn thaw_account(
    token_program_id: &Pubkey,
    account: &Pubkey,
    mint: &Pubkey,
    freeze_authority: &Pubkey,
    signer_pubkeys: &[&Pubkey],
) -> Result<Instruction, ArgumentError> {
    freeze_or_thaw(
        token_program_id,
        account,
        mint,
        freeze_authority,
        signer_pubkeys,
        TokenInstruction::ThawAccount,
    )
}

fn freeze_or_thaw(
    token_program_id: &Pubkey,
    account: &Pubkey,
    mint: &Pubkey,
    freeze_authority: &Pubkey,
    signer_pubkeys: &[&Pubkey],
    ix: TokenInstruction,
) -> Result<Instruction, ArgumentError> {
    check_signer_count(signer_pubkeys)?;

    let mut accounts = Vec::with_capacity(3 + signer_pubkeys.len());
    accounts.push(AccountMeta::new(*account, false));
    accounts.push(AccountMeta::new_readonly(*mint, false));
    push_authority(&mut accounts, freeze_authority, signer_pubkeys);
    Ok(build(token_program_id, accounts, ix))
}

/// Creates a `TransferChecked` instruction.
///
/// Accounts: source (writable), mint, destination (writable), authority,
/// then any multisig co-signers.
#[allow(clippy::too_many_arguments)]
pub fn transfer_checked(
    token_program_id: &Pubkey,
    source: &Pubkey,
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    signer_pubkeys: &[&Pubkey],
    amount: u64,
    decimals: u8,
) -> Result<Instruction, ArgumentError> {
    check_signer_count(signer_pubkeys)?;
    check_decimals(decimals)?;

    let mut accounts = Vec::with_capacity(4 + signer_pubkeys.len());
    accounts.push(AccountMeta::new(*source, false));
    accounts.push(AccountMeta::new_readonly(*mint, false));
    accounts.push(AccountMeta::new(*destination, false));
    push_authority(&mut accounts, authority, signer_pubkeys);
    Ok(build(
        token_program_id,
        accounts,
        TokenInstruction::TransferChecked { amount, decimals },
    ))
}

/// Creates an `ApproveChecked` instruction.
#[allow(clippy::too_many_arguments)]
pub fn approve_checked(
    token_program_id: &Pubkey,
    source: &Pubkey,
    mint: &Pubkey,
    delegate: &Pubkey,
    owner: &Pubkey,
    signer_pubkeys: &[&Pubkey],
    amount: u64,
    decimals: u8,
) -> Result<Instruction, ArgumentError> {
    check_signer_count(signer_pubkeys)?;
    check_decimals(decimals)?;

    let mut accounts = Vec::with_capacity(4 + signer_pubkeys.len());
    accounts.push(AccountMeta::new(*source, false));
    accounts.push(AccountMeta::new_readonly(*mint, false));
    accounts.push(AccountMeta::new_readonly(*delegate, false));
    push_authority(&mut accounts, owner, signer_pubkeys);
    Ok(build(
        token_program_id,
        accounts,
        TokenInstruction::ApproveChecked { amount, decimals },
    ))
}

/// Creates a `MintToChecked` instruction.
pub fn mint_to_checked(
    token_program_id: &Pubkey,
    mint: &Pubkey,
    account: &Pubkey,
    mint_authority: &Pubkey,
    signer_pubkeys: &[&Pubkey],
    amount: u64,
    decimals: u8,
) -> Result<Instruction, ArgumentError> {
    check_signer_count(signer_pubkeys)?;
    check_decimals(decimals)?;

    let mut accounts = Vec::with_capacity(3 + signer_pubkeys.len());
    accounts.push(AccountMeta::new(*mint, false));
    accounts.push(AccountMeta::new(*account, false));
    push_authority(&mut accounts, mint_authority, signer_pubkeys);
    Ok(build(
        token_program_id,
        accounts,
        TokenInstruction::MintToChecked { amount, decimals },
    ))
}

/// Creates a `BurnChecked` instruction.
pub fn burn_checked(
    token_program_id: &Pubkey,
    account: &Pubkey,
    mint: &Pubkey,
    authority: &Pubkey,
    signer_pubkeys: &[&Pubkey],
    amount: u64,
    decimals: u8,
) -> Result<Instruction, ArgumentError> {
    check_signer_count(signer_pubkeys)?;
    check_decimals(decimals)?;

    let mut accounts = Vec::with_capacity(3 + signer_pubkeys.len());
    accounts.push(AccountMeta::new(*account, false));
    accounts.push(AccountMeta::new(*mint, false));
    push_authority(&mut accounts, authority, signer_pubkeys);
    Ok(build(
        token_program_id,
        accounts,
        TokenInstruction::BurnChecked { amount, decimals },
    ))
}
