//! The portfolio token program.
//!
//! Accounts are addressed by position exactly as the instruction builders lay
//! them out. Authority checks accept either a signing key or a multisig
//! account followed by enough signing members.

use log::debug;
use sol_wire::{AccountMeta, InstructionError, Pubkey, RemoteAccount, SYSTEM_PROGRAM_ID};
use token_instruction::{
    find_portfolio_address, AuthorityType, SlotAllocation, TokenError, TokenInstruction,
};
use token_state::{
    Account, AccountState, AssetSlot, Mint, Multisig, Pack, Portfolio, UserPortfolio,
    MAX_SIGNERS, METADATA_URL_LEN, MIN_SIGNERS, PORTFOLIO_SLOTS,
};

use crate::error::ProgramResult;
use crate::invoke::InvokeContext;
use crate::rent;

pub(crate) fn process(ctx: &mut InvokeContext<'_>, data: &[u8]) -> ProgramResult {
    let instruction = TokenInstruction::unpack(data)?;
    debug!("token instruction: {}", name(&instruction));

    match instruction {
        TokenInstruction::InitializeMint {
            decimals,
            mint_authority,
            freeze_authority,
            hedged_asset_mint,
            swap_pool,
        } => {
            let mint = Mint {
                mint_authority: Some(mint_authority),
                supply: 0,
                decimals,
                is_initialized: true,
                freeze_authority,
                hedged_asset_mint,
                swap_pool,
            };
            initialize_mint(ctx, mint)
        }
        TokenInstruction::InitializeAccount => initialize_account(ctx, None),
        TokenInstruction::InitializeAccount2 { owner } => initialize_account(ctx, Some(owner)),
        TokenInstruction::InitializeMultisig { m } => initialize_multisig(ctx, m),
        TokenInstruction::Transfer { amount } => transfer(ctx, amount, None),
        TokenInstruction::TransferChecked { amount, decimals } => {
            transfer(ctx, amount, Some(decimals))
        }
        TokenInstruction::Approve { amount } => approve(ctx, amount, None),
        TokenInstruction::ApproveChecked { amount, decimals } => {
            approve(ctx, amount, Some(decimals))
        }
        TokenInstruction::Revoke => revoke(ctx),
        TokenInstruction::SetAuthority {
            authority_type,
            new_authority,
        } => set_authority(ctx, authority_type, new_authority),
        TokenInstruction::MintTo { amount } => mint_to(ctx, amount, None),
        TokenInstruction::MintToChecked { amount, decimals } => {
            mint_to(ctx, amount, Some(decimals))
        }
        TokenInstruction::Burn { amount } => burn(ctx, amount, None),
        TokenInstruction::BurnChecked { amount, decimals } => burn(ctx, amount, Some(decimals)),
        TokenInstruction::CloseAccount => close_account(ctx),
        TokenInstruction::FreezeAccount => toggle_freeze(ctx, true),
        TokenInstruction::ThawAccount => toggle_freeze(ctx, false),
        // The swap leg runs in an external pool program this ledger does not host.
        TokenInstruction::Deposit { .. } => Err(InstructionError::UnsupportedInstruction.into()),
        TokenInstruction::Withdraw { amount } => withdraw(ctx, amount),
        TokenInstruction::InitializePortfolio {
            metadata_url,
            metadata_hash,
            allocations,
        } => initialize_portfolio(ctx, metadata_url, metadata_hash, allocations),
        TokenInstruction::InitializeUserPortfolio {
            delegated_amount, ..
        } => initialize_user_portfolio(ctx, delegated_amount),
    }
}

fn name(instruction: &TokenInstruction) -> &'static str {
    match instruction {
        TokenInstruction::InitializeMint { .. } => "InitializeMint",
        TokenInstruction::InitializeAccount => "InitializeAccount",
        TokenInstruction::InitializeMultisig { .. } => "InitializeMultisig",
        TokenInstruction::Transfer { .. } => "Transfer",
        TokenInstruction::Approve { .. } => "Approve",
        TokenInstruction::Revoke => "Revoke",
        TokenInstruction::SetAuthority { .. } => "SetAuthority",
        TokenInstruction::MintTo { .. } => "MintTo",
        TokenInstruction::Burn { .. } => "Burn",
        TokenInstruction::CloseAccount => "CloseAccount",
        TokenInstruction::FreezeAccount => "FreezeAccount",
        TokenInstruction::ThawAccount => "ThawAccount",
        TokenInstruction::TransferChecked { .. } => "TransferChecked",
        TokenInstruction::ApproveChecked { .. } => "ApproveChecked",
        TokenInstruction::MintToChecked { .. } => "MintToChecked",
        TokenInstruction::BurnChecked { .. } => "BurnChecked",
        TokenInstruction::InitializeAccount2 { .. } => "InitializeAccount2",
        TokenInstruction::Deposit { .. } => "Deposit",
        TokenInstruction::Withdraw { .. } => "Withdraw",
        TokenInstruction::InitializePortfolio { .. } => "InitializePortfolio",
        TokenInstruction::InitializeUserPortfolio { .. } => "InitializeUserPortfolio",
    }
}

/// Check that the account at `authority_index` is `expected` and has
/// authorised the instruction, either by signing or, for a multisig, through
/// at least `m` of its members signing among the accounts that follow.
fn validate_owner(
    ctx: &InvokeContext<'_>,
    expected: &Pubkey,
    authority_index: usize,
) -> ProgramResult {
    let authority = ctx.meta(authority_index)?;
    if authority.pubkey != *expected {
        return Err(TokenError::OwnerMismatch.into());
    }

    if ctx.owner(authority_index)? == *ctx.program_id()
        && ctx.data_len(authority_index)? == Multisig::LEN
    {
        let multisig: Multisig = ctx.unpack(authority_index)?;
        let mut matched = [false; MAX_SIGNERS];
        let mut num_signers = 0u8;
        for signer in ctx.metas_from(authority_index + 1) {
            for (position, key) in multisig.active_signers().iter().enumerate() {
                if *key == signer.pubkey && !matched[position] {
                    if !signer.is_signer {
                        return Err(InstructionError::MissingRequiredSignature.into());
                    }
                    matched[position] = true;
                    num_signers += 1;
                }
            }
        }
        if num_signers < multisig.m {
            return Err(InstructionError::MissingRequiredSignature.into());
        }
        return Ok(());
    }

    if !authority.is_signer {
        return Err(InstructionError::MissingRequiredSignature.into());
    }
    Ok(())
}

/// Compare the caller's expected decimals with the mint at `mint_index`.
fn check_mint(
    ctx: &InvokeContext<'_>,
    mint_index: usize,
    account_mint: &Pubkey,
    expected_decimals: u8,
) -> ProgramResult {
    if ctx.key(mint_index)? != *account_mint {
        return Err(TokenError::MintMismatch.into());
    }
    let mint: Mint = ctx.unpack(mint_index)?;
    if mint.decimals != expected_decimals {
        return Err(TokenError::MintDecimalsMismatch.into());
    }
    Ok(())
}

/// The share of an account's `usdc` and `asset` backing that follows
/// `amount` tokens out of it, in whole percent of the balance.
fn backing_share(account: &Account, amount: u64) -> Result<(u64, u64), TokenError> {
    if account.amount == 0 {
        return Ok((0, 0));
    }
    let percent = amount.checked_mul(100).ok_or(TokenError::Overflow)? / account.amount;
    let usdc = account
        .usdc
        .checked_mul(percent)
        .ok_or(TokenError::Overflow)?
        / 100;
    let asset = account
        .asset
        .checked_mul(percent)
        .ok_or(TokenError::Overflow)?
        / 100;
    Ok((usdc, asset))
}

fn initialize_mint(ctx: &mut InvokeContext<'_>, initialized: Mint) -> ProgramResult {
    let mint: Mint = ctx.unpack(0)?;
    if mint.is_initialized {
        return Err(TokenError::AlreadyInUse.into());
    }
    if !ctx.is_rent_exempt(0)? {
        return Err(TokenError::NotRentExempt.into());
    }
    ctx.pack(0, &initialized)
}

fn initialize_account(
    ctx: &mut InvokeContext<'_>,
    owner: Option<Pubkey>,
) -> ProgramResult {
    let mint_key = ctx.key(1)?;
    let owner = match owner {
        Some(owner) => owner,
        None => ctx.key(2)?,
    };

    let account: Account = ctx.unpack(0)?;
    if account.is_initialized() {
        return Err(TokenError::AlreadyInUse.into());
    }
    if !ctx.is_rent_exempt(0)? {
        return Err(TokenError::NotRentExempt.into());
    }
    let mint = ctx
        .unpack::<Mint>(1)
        .map_err(|_| TokenError::InvalidMint)?;
    if !mint.is_initialized {
        return Err(TokenError::InvalidMint.into());
    }

    let account = Account {
        mint: mint_key,
        owner,
        state: AccountState::Initialized,
        ..Account::default()
    };
    ctx.pack(0, &account)
}

fn initialize_multisig(ctx: &mut InvokeContext<'_>, m: u8) -> ProgramResult {
    let mut multisig: Multisig = ctx.unpack(0)?;
    if multisig.is_initialized {
        return Err(TokenError::AlreadyInUse.into());
    }
    if !ctx.is_rent_exempt(0)? {
        return Err(TokenError::NotRentExempt.into());
    }

    let signers = ctx.metas_from(2);
    let n = signers.len();
    if !(MIN_SIGNERS..=MAX_SIGNERS).contains(&n) {
        return Err(TokenError::InvalidNumberOfProvidedSigners.into());
    }
    if !(MIN_SIGNERS..=n).contains(&(m as usize)) {
        return Err(TokenError::InvalidNumberOfRequiredSigners.into());
    }
    for (slot, signer) in multisig.signers.iter_mut().zip(signers) {
        *slot = signer.pubkey;
    }
    multisig.m = m;
    multisig.n = n as u8;
    multisig.is_initialized = true;
    ctx.pack(0, &multisig)
}

fn transfer(
    ctx: &mut InvokeContext<'_>,
    amount: u64,
    expected_decimals: Option<u8>,
) -> ProgramResult {
    let (dest_index, authority_index) = match expected_decimals {
        Some(_) => (2, 3),
        None => (1, 2),
    };

    let mut source: Account = ctx.unpack(0)?;
    let mut dest: Account = ctx.unpack(dest_index)?;

    if source.is_frozen() || dest.is_frozen() {
        return Err(TokenError::AccountFrozen.into());
    }
    if source.amount < amount {
        return Err(TokenError::InsufficientFunds.into());
    }
    if source.mint != dest.mint {
        return Err(TokenError::MintMismatch.into());
    }
    if let Some(decimals) = expected_decimals {
        check_mint(ctx, 1, &source.mint, decimals)?;
    }

    let self_transfer = ctx.key(0)? == ctx.key(dest_index)?;

    match source.delegate {
        Some(delegate) if ctx.key(authority_index)? == delegate => {
            validate_owner(ctx, &delegate, authority_index)?;
            if source.delegated_amount < amount {
                return Err(TokenError::InsufficientFunds.into());
            }
            if !self_transfer {
                source.delegated_amount -= amount;
                if source.delegated_amount == 0 {
                    source.delegate = None;
                }
            }
        }
        _ => validate_owner(ctx, &source.owner, authority_index)?,
    }

    if self_transfer {
        return Ok(());
    }

    let (usdc, asset) = backing_share(&source, amount)?;
    source.amount -= amount;
    dest.amount = dest
        .amount
        .checked_add(amount)
        .ok_or(TokenError::Overflow)?;
    source.usdc = source.usdc.checked_sub(usdc).ok_or(TokenError::Overflow)?;
    dest.usdc = dest.usdc.checked_add(usdc).ok_or(TokenError::Overflow)?;
    source.asset = source.asset.checked_sub(asset).ok_or(TokenError::Overflow)?;
    dest.asset = dest.asset.checked_add(asset).ok_or(TokenError::Overflow)?;

    if source.is_native() {
        ctx.debit(0, amount)?;
        ctx.credit(dest_index, amount)?;
    }

    ctx.pack(0, &source)?;
    ctx.pack(dest_index, &dest)
}

fn approve(
    ctx: &mut InvokeContext<'_>,
    amount: u64,
    expected_decimals: Option<u8>,
) -> ProgramResult {
    let (delegate_index, owner_index) = match expected_decimals {
        Some(_) => (2, 3),
        None => (1, 2),
    };

    let mut source: Account = ctx.unpack(0)?;
    if source.is_frozen() {
        return Err(TokenError::AccountFrozen.into());
    }
    if let Some(decimals) = expected_decimals {
        check_mint(ctx, 1, &source.mint, decimals)?;
    }
    validate_owner(ctx, &source.owner, owner_index)?;

    source.delegate = Some(ctx.key(delegate_index)?);
    source.delegated_amount = amount;
    ctx.pack(0, &source)
}

fn revoke(ctx: &mut InvokeContext<'_>) -> ProgramResult {
    let mut source: Account = ctx.unpack(0)?;
    if source.is_frozen() {
        return Err(TokenError::AccountFrozen.into());
    }
    validate_owner(ctx, &source.owner, 1)?;

    source.delegate = None;
    source.delegated_amount = 0;
    ctx.pack(0, &source)
}

fn set_authority(
    ctx: &mut InvokeContext<'_>,
    authority_type: AuthorityType,
    new_authority: Option<Pubkey>,
) -> ProgramResult {
    let data_len = ctx.data_len(0)?;

    if data_len == Account::LEN {
        let mut account: Account = ctx.unpack(0)?;
        if account.is_frozen() {
            return Err(TokenError::AccountFrozen.into());
        }
        match authority_type {
            AuthorityType::AccountOwner => {
                validate_owner(ctx, &account.owner, 1)?;
                account.owner = new_authority.ok_or(TokenError::InvalidInstruction)?;
                account.delegate = None;
                account.delegated_amount = 0;
            }
            AuthorityType::CloseAccount => {
                let authority = account.close_authority.unwrap_or(account.owner);
                validate_owner(ctx, &authority, 1)?;
                account.close_authority = new_authority;
            }
            _ => return Err(TokenError::AuthorityTypeNotSupported.into()),
        }
        ctx.pack(0, &account)
    } else if data_len == Mint::LEN {
        let mut mint: Mint = ctx.unpack(0)?;
        match authority_type {
            AuthorityType::MintTokens => {
                let authority = mint.mint_authority.ok_or(TokenError::FixedSupply)?;
                validate_owner(ctx, &authority, 1)?;
                mint.mint_authority = new_authority;
            }
            AuthorityType::FreezeAccount => {
                let authority = mint.freeze_authority.ok_or(TokenError::MintCannotFreeze)?;
                validate_owner(ctx, &authority, 1)?;
                mint.freeze_authority = new_authority;
            }
            _ => return Err(TokenError::AuthorityTypeNotSupported.into()),
        }
        ctx.pack(0, &mint)
    } else {
        Err(InstructionError::InvalidArgument.into())
    }
}

fn mint_to(
    ctx: &mut InvokeContext<'_>,
    amount: u64,
    expected_decimals: Option<u8>,
) -> ProgramResult {
    let mut dest: Account = ctx.unpack(1)?;
    if dest.is_frozen() {
        return Err(TokenError::AccountFrozen.into());
    }
    if dest.is_native() {
        return Err(TokenError::NativeNotSupported.into());
    }
    if ctx.key(0)? != dest.mint {
        return Err(TokenError::MintMismatch.into());
    }

    let mut mint: Mint = ctx.unpack(0)?;
    if let Some(decimals) = expected_decimals {
        if decimals != mint.decimals {
            return Err(TokenError::MintDecimalsMismatch.into());
        }
    }
    match mint.mint_authority {
        Some(authority) => validate_owner(ctx, &authority, 2)?,
        None => return Err(TokenError::FixedSupply.into()),
    }

    dest.amount = dest
        .amount
        .checked_add(amount)
        .ok_or(TokenError::Overflow)?;
    mint.supply = mint
        .supply
        .checked_add(amount)
        .ok_or(TokenError::Overflow)?;

    ctx.pack(1, &dest)?;
    ctx.pack(0, &mint)
}

fn burn(ctx: &mut InvokeContext<'_>, amount: u64, expected_decimals: Option<u8>) -> ProgramResult {
    let mut source: Account = ctx.unpack(0)?;
    let mut mint: Mint = ctx.unpack(1)?;

    if source.is_frozen() {
        return Err(TokenError::AccountFrozen.into());
    }
    if source.is_native() {
        return Err(TokenError::NativeNotSupported.into());
    }
    if source.amount < amount {
        return Err(TokenError::InsufficientFunds.into());
    }
    if ctx.key(1)? != source.mint {
        return Err(TokenError::MintMismatch.into());
    }
    if let Some(decimals) = expected_decimals {
        if decimals != mint.decimals {
            return Err(TokenError::MintDecimalsMismatch.into());
        }
    }

    match source.delegate {
        Some(delegate) if ctx.key(2)? == delegate => {
            validate_owner(ctx, &delegate, 2)?;
            if source.delegated_amount < amount {
                return Err(TokenError::InsufficientFunds.into());
            }
            source.delegated_amount -= amount;
            if source.delegated_amount == 0 {
                source.delegate = None;
            }
        }
        _ => validate_owner(ctx, &source.owner, 2)?,
    }

    source.amount -= amount;
    mint.supply = mint
        .supply
        .checked_sub(amount)
        .ok_or(TokenError::Overflow)?;

    ctx.pack(0, &source)?;
    ctx.pack(1, &mint)
}

fn close_account(ctx: &mut InvokeContext<'_>) -> ProgramResult {
    let mut source: Account = ctx.unpack(0)?;
    if !source.is_native() && source.amount != 0 {
        return Err(TokenError::NonNativeHasBalance.into());
    }
    if ctx.key(0)? == ctx.key(1)? {
        return Err(InstructionError::InvalidAccountData.into());
    }

    let authority = source.close_authority.unwrap_or(source.owner);
    validate_owner(ctx, &authority, 2)?;

    let lamports = ctx.lamports(0)?;
    ctx.debit(0, lamports)?;
    ctx.credit(1, lamports)?;

    source.amount = 0;
    ctx.pack(0, &source)
}

fn toggle_freeze(ctx: &mut InvokeContext<'_>, freeze: bool) -> ProgramResult {
    let mut source: Account = ctx.unpack(0)?;
    if source.is_frozen() == freeze {
        return Err(TokenError::InvalidState.into());
    }
    if source.is_native() {
        return Err(TokenError::NativeNotSupported.into());
    }
    if ctx.key(1)? != source.mint {
        return Err(TokenError::MintMismatch.into());
    }

    let mint: Mint = ctx.unpack(1)?;
    match mint.freeze_authority {
        Some(authority) => validate_owner(ctx, &authority, 2)?,
        None => return Err(TokenError::MintCannotFreeze.into()),
    }

    source.state = if freeze {
        AccountState::Frozen
    } else {
        AccountState::Initialized
    };
    ctx.pack(0, &source)
}

/// Burn `amount` from the account together with the same share of its
/// backing. The mint supply is left alone.
fn withdraw(ctx: &mut InvokeContext<'_>, amount: u64) -> ProgramResult {
    let mut account: Account = ctx.unpack(0)?;
    if account.is_frozen() {
        return Err(TokenError::AccountFrozen.into());
    }
    validate_owner(ctx, &account.owner, 1)?;
    if account.amount < amount {
        return Err(TokenError::InsufficientFunds.into());
    }

    let (usdc, asset) = backing_share(&account, amount)?;
    account.amount -= amount;
    account.usdc = account.usdc.checked_sub(usdc).ok_or(TokenError::Overflow)?;
    account.asset = account.asset.checked_sub(asset).ok_or(TokenError::Overflow)?;
    ctx.pack(0, &account)
}

/// Accounts: payer (w,s), portfolio (w), owner (s), system program, then the
/// slot pairs. The portfolio lives at the owner's address for
/// `metadata_hash` and is funded from the payer in the same instruction.
fn initialize_portfolio(
    ctx: &mut InvokeContext<'_>,
    metadata_url: [u8; METADATA_URL_LEN],
    metadata_hash: u16,
    allocations: [SlotAllocation; PORTFOLIO_SLOTS],
) -> ProgramResult {
    let payer = ctx.key(0)?;
    let address = ctx.key(1)?;
    let owner = ctx.key(2)?;

    if !ctx.is_signer(0)? || !ctx.is_signer(2)? {
        return Err(InstructionError::MissingRequiredSignature.into());
    }
    let (expected, bump) = find_portfolio_address(ctx.program_id(), &owner, metadata_hash)?;
    if expected != address {
        return Err(InstructionError::InvalidSeeds.into());
    }
    if ctx.exists(1)? {
        return Err(TokenError::AlreadyInUse.into());
    }

    let program_id = *ctx.program_id();
    let lamports = rent::minimum_balance(Portfolio::LEN);
    {
        let mut system = ctx.invoke(
            SYSTEM_PROGRAM_ID,
            vec![AccountMeta::new(payer, true), AccountMeta::new(address, false)],
        );
        system.debit(0, lamports)?;
        system.allocate(
            1,
            RemoteAccount {
                lamports,
                data: vec![0; Portfolio::LEN],
                owner: program_id,
                executable: false,
            },
        )?;
    }

    let mut slots = [AssetSlot::default(); PORTFOLIO_SLOTS];
    for (i, (slot, allocation)) in slots.iter_mut().zip(allocations).enumerate() {
        *slot = AssetSlot {
            amount: allocation.amount,
            asset_mint: ctx.key(4 + 2 * i)?,
            period: allocation.period,
            target_asset: ctx.key(5 + 2 * i)?,
        };
    }

    let portfolio = Portfolio {
        portfolio_account: address,
        owner,
        metadata_url,
        metadata_hash,
        is_initialized: true,
        slots,
    };
    ctx.pack(1, &portfolio)?;
    debug!("created portfolio {address} (bump {bump}) for {owner}");
    Ok(())
}

fn initialize_user_portfolio(ctx: &mut InvokeContext<'_>, delegated_amount: u64) -> ProgramResult {
    let user_portfolio: UserPortfolio = ctx.unpack(0)?;
    if user_portfolio.is_initialized() {
        return Err(TokenError::AlreadyInUse.into());
    }
    if !ctx.is_signer(2)? {
        return Err(InstructionError::MissingRequiredSignature.into());
    }
    if !ctx.is_rent_exempt(0)? {
        return Err(TokenError::NotRentExempt.into());
    }
    let portfolio = ctx
        .unpack::<Portfolio>(1)
        .map_err(|_| TokenError::UninitializedState)?;
    if !portfolio.is_initialized {
        return Err(TokenError::UninitializedState.into());
    }

    let mut asset_accounts = [Pubkey::default(); PORTFOLIO_SLOTS];
    for (i, asset) in asset_accounts.iter_mut().enumerate() {
        *asset = ctx.key(4 + i)?;
    }

    let user_portfolio = UserPortfolio {
        user_portfolio_account: ctx.key(0)?,
        portfolio_address: ctx.key(1)?,
        owner: ctx.key(2)?,
        delegate: (delegated_amount > 0)
            .then(|| ctx.key(3))
            .transpose()?,
        delegated_amount,
        asset_accounts,
    };
    ctx.pack(0, &user_portfolio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use sol_wire::Instruction;
    use token_instruction::token;

    use crate::error::ProgramError;
    use crate::invoke::AccountMap;

    const PROGRAM: Pubkey = Pubkey::new_from_array([0xee; 32]);

    fn key(b: u8) -> Pubkey {
        Pubkey::new_from_array([b; 32])
    }

    fn record<T: Pack>(value: &T) -> RemoteAccount {
        RemoteAccount {
            lamports: rent::minimum_balance(T::LEN),
            data: value.pack_to_vec(),
            owner: PROGRAM,
            executable: false,
        }
    }

    fn run(accounts: &mut AccountMap, ix: Instruction) -> ProgramResult {
        let mut ctx = InvokeContext::new(ix.program_id, accounts, ix.accounts);
        process(&mut ctx, &ix.data)
    }

    fn custom(e: ProgramResult) -> Option<u32> {
        match e {
            Err(e) => match InstructionError::from(e) {
                InstructionError::Custom(code) => Some(code),
                _ => None,
            },
            Ok(()) => None,
        }
    }

    /// Mint key(1) with authority key(2) and freeze authority key(3); token
    /// accounts key(10) owned by key(20) with 100 tokens and key(11) owned by
    /// key(21), empty.
    fn setup() -> AccountMap {
        let mut accounts = AccountMap::new();
        accounts.insert(
            key(1),
            record(&Mint {
                mint_authority: Some(key(2)),
                supply: 100,
                decimals: 6,
                is_initialized: true,
                freeze_authority: Some(key(3)),
                ..Mint::default()
            }),
        );
        accounts.insert(
            key(10),
            record(&Account {
                mint: key(1),
                owner: key(20),
                amount: 100,
                state: AccountState::Initialized,
                usdc: 50,
                asset: 20,
                ..Account::default()
            }),
        );
        accounts.insert(
            key(11),
            record(&Account {
                mint: key(1),
                owner: key(21),
                state: AccountState::Initialized,
                ..Account::default()
            }),
        );
        accounts
    }

    fn account(accounts: &AccountMap, k: u8) -> Account {
        Account::unpack(&accounts[&key(k)].data).unwrap()
    }

    fn mint(accounts: &AccountMap) -> Mint {
        Mint::unpack(&accounts[&key(1)].data).unwrap()
    }

    #[test]
    fn initialize_mint_on_fresh_account() {
        let mut accounts = AccountMap::new();
        accounts.insert(key(1), record(&Mint::default()));
        let ix = token::initialize_mint(&PROGRAM, &key(1), &key(2), None, 9).unwrap();
        run(&mut accounts, ix.clone()).unwrap();

        let m = mint(&accounts);
        assert!(m.is_initialized);
        assert_eq!(m.decimals, 9);
        assert_eq!(m.mint_authority, Some(key(2)));

        assert_eq!(custom(run(&mut accounts, ix)), Some(TokenError::AlreadyInUse.code()));
    }

    #[test]
    fn initialize_mint_requires_rent_exemption() {
        let mut accounts = AccountMap::new();
        let mut fresh = record(&Mint::default());
        fresh.lamports -= 1;
        accounts.insert(key(1), fresh);
        let ix = token::initialize_mint(&PROGRAM, &key(1), &key(2), None, 9).unwrap();
        assert_eq!(custom(run(&mut accounts, ix)), Some(TokenError::NotRentExempt.code()));
    }

    #[test]
    fn initialize_account_needs_a_real_mint() {
        let mut accounts = setup();
        accounts.insert(key(12), record(&Account::default()));
        let ix = token::initialize_account(&PROGRAM, &key(12), &key(99), &key(22)).unwrap();
        assert_eq!(custom(run(&mut accounts, ix)), Some(TokenError::InvalidMint.code()));

        let ix = token::initialize_account(&PROGRAM, &key(12), &key(1), &key(22)).unwrap();
        run(&mut accounts, ix).unwrap();
        let created = account(&accounts, 12);
        assert_eq!(created.owner, key(22));
        assert_eq!(created.state, AccountState::Initialized);
    }

    #[test]
    fn transfer_moves_tokens_and_backing() {
        let mut accounts = setup();
        let ix = token::transfer(&PROGRAM, &key(10), &key(11), &key(20), &[], 50).unwrap();
        run(&mut accounts, ix).unwrap();

        let source = account(&accounts, 10);
        let dest = account(&accounts, 11);
        assert_eq!((source.amount, dest.amount), (50, 50));
        assert_eq!((source.usdc, dest.usdc), (25, 25));
        assert_eq!((source.asset, dest.asset), (10, 10));
    }

    #[test]
    fn transfer_checks() {
        let mut accounts = setup();
        let ix = token::transfer(&PROGRAM, &key(10), &key(11), &key(20), &[], 101).unwrap();
        assert_eq!(custom(run(&mut accounts, ix)), Some(TokenError::InsufficientFunds.code()));

        let ix = token::transfer(&PROGRAM, &key(10), &key(11), &key(21), &[], 1).unwrap();
        assert_eq!(custom(run(&mut accounts, ix)), Some(TokenError::OwnerMismatch.code()));

        let mut ix = token::transfer(&PROGRAM, &key(10), &key(11), &key(20), &[], 1).unwrap();
        ix.accounts[2].is_signer = false;
        assert_matches!(
            run(&mut accounts, ix),
            Err(ProgramError::Instruction(InstructionError::MissingRequiredSignature))
        );
    }

    #[test]
    fn transfer_checked_compares_decimals() {
        let mut accounts = setup();
        let ix =
            token::transfer_checked(&PROGRAM, &key(10), &key(1), &key(11), &key(20), &[], 1, 5)
                .unwrap();
        assert_eq!(
            custom(run(&mut accounts, ix)),
            Some(TokenError::MintDecimalsMismatch.code())
        );

        let ix =
            token::transfer_checked(&PROGRAM, &key(10), &key(1), &key(11), &key(20), &[], 1, 6)
                .unwrap();
        run(&mut accounts, ix).unwrap();
        assert_eq!(account(&accounts, 11).amount, 1);
    }

    #[test]
    fn self_transfer_changes_nothing() {
        let mut accounts = setup();
        let ix = token::transfer(&PROGRAM, &key(10), &key(10), &key(20), &[], 40).unwrap();
        run(&mut accounts, ix).unwrap();
        assert_eq!(account(&accounts, 10).amount, 100);
    }

    #[test]
    fn delegate_allowance_runs_out() {
        let mut accounts = setup();
        let ix = token::approve(&PROGRAM, &key(10), &key(30), &key(20), &[], 2).unwrap();
        run(&mut accounts, ix).unwrap();

        for remaining in [1, 0] {
            let ix = token::transfer(&PROGRAM, &key(10), &key(11), &key(30), &[], 1).unwrap();
            run(&mut accounts, ix).unwrap();
            assert_eq!(account(&accounts, 10).delegated_amount, remaining);
        }
        assert_eq!(account(&accounts, 10).delegate, None);

        let ix = token::transfer(&PROGRAM, &key(10), &key(11), &key(30), &[], 1).unwrap();
        assert_eq!(custom(run(&mut accounts, ix)), Some(TokenError::OwnerMismatch.code()));
    }

    #[test]
    fn frozen_account_rejects_transfer_until_thawed() {
        let mut accounts = setup();
        let freeze = token::freeze_account(&PROGRAM, &key(10), &key(1), &key(3), &[]).unwrap();
        run(&mut accounts, freeze.clone()).unwrap();
        assert_eq!(custom(run(&mut accounts, freeze)), Some(TokenError::InvalidState.code()));

        let ix = token::transfer(&PROGRAM, &key(10), &key(11), &key(20), &[], 1).unwrap();
        assert_eq!(
            custom(run(&mut accounts, ix.clone())),
            Some(TokenError::AccountFrozen.code())
        );

        let thaw = token::thaw_account(&PROGRAM, &key(10), &key(1), &key(3), &[]).unwrap();
        run(&mut accounts, thaw).unwrap();
        run(&mut accounts, ix).unwrap();
    }

    #[test]
    fn mint_to_and_burn_track_supply() {
        let mut accounts = setup();
        let ix = token::mint_to(&PROGRAM, &key(1), &key(11), &key(2), &[], 30).unwrap();
        run(&mut accounts, ix).unwrap();
        assert_eq!(mint(&accounts).supply, 130);
        assert_eq!(account(&accounts, 11).amount, 30);

        let ix = token::burn(&PROGRAM, &key(11), &key(1), &key(21), &[], 10).unwrap();
        run(&mut accounts, ix).unwrap();
        assert_eq!(mint(&accounts).supply, 120);
        assert_eq!(account(&accounts, 11).amount, 20);
    }

    #[test]
    fn mint_without_authority_is_fixed_supply() {
        let mut accounts = setup();
        let ix = token::set_authority(
            &PROGRAM,
            &key(1),
            None,
            AuthorityType::MintTokens,
            &key(2),
            &[],
        )
        .unwrap();
        run(&mut accounts, ix).unwrap();

        let ix = token::mint_to(&PROGRAM, &key(1), &key(11), &key(2), &[], 1).unwrap();
        assert_eq!(custom(run(&mut accounts, ix)), Some(TokenError::FixedSupply.code()));
    }

    #[test]
    fn close_requires_empty_balance() {
        let mut accounts = setup();
        let ix = token::close_account(&PROGRAM, &key(10), &key(20), &key(20), &[]).unwrap();
        assert_eq!(
            custom(run(&mut accounts, ix)),
            Some(TokenError::NonNativeHasBalance.code())
        );

        let rent = accounts[&key(11)].lamports;
        let ix = token::close_account(&PROGRAM, &key(11), &key(21), &key(21), &[]).unwrap();
        run(&mut accounts, ix).unwrap();
        assert_eq!(accounts[&key(11)].lamports, 0);
        assert_eq!(accounts[&key(21)].lamports, rent);
    }

    #[test]
    fn multisig_authority_needs_threshold() {
        let mut accounts = setup();
        let mut signers = [Pubkey::default(); MAX_SIGNERS];
        signers[..3].copy_from_slice(&[key(40), key(41), key(42)]);
        accounts.insert(
            key(50),
            record(&Multisig {
                m: 2,
                n: 3,
                is_initialized: true,
                signers,
            }),
        );
        let ix = token::set_authority(
            &PROGRAM,
            &key(10),
            Some(&key(50)),
            AuthorityType::AccountOwner,
            &key(20),
            &[],
        )
        .unwrap();
        run(&mut accounts, ix).unwrap();

        let ix = token::transfer(&PROGRAM, &key(10), &key(11), &key(50), &[&key(40)], 5).unwrap();
        assert_matches!(
            run(&mut accounts, ix),
            Err(ProgramError::Instruction(InstructionError::MissingRequiredSignature))
        );

        let ix = token::transfer(&PROGRAM, &key(10), &key(11), &key(50), &[&key(40), &key(42)], 5)
            .unwrap();
        run(&mut accounts, ix).unwrap();
        assert_eq!(account(&accounts, 11).amount, 5);
    }

    #[test]
    fn initialize_multisig_records_signers() {
        let mut accounts = AccountMap::new();
        accounts.insert(key(50), record(&Multisig::default()));
        let ix = token::initialize_multisig(&PROGRAM, &key(50), &[&key(40), &key(41)], 2).unwrap();
        run(&mut accounts, ix).unwrap();

        let multisig = Multisig::unpack(&accounts[&key(50)].data).unwrap();
        assert_eq!(multisig.active_signers(), &[key(40), key(41)]);
        assert_eq!(multisig.m, 2);
    }

    #[test]
    fn withdraw_burns_backing_share() {
        let mut accounts = setup();
        let ix =
            token_instruction::portfolio::withdraw(&PROGRAM, &key(10), &key(20), &[], 50).unwrap();
        run(&mut accounts, ix).unwrap();

        let a = account(&accounts, 10);
        assert_eq!((a.amount, a.usdc, a.asset), (50, 25, 10));
        assert_eq!(mint(&accounts).supply, 100);
    }

    #[test]
    fn deposit_is_unsupported() {
        let mut accounts = setup();
        let ix = Instruction {
            program_id: PROGRAM,
            accounts: vec![],
            data: TokenInstruction::Deposit {
                amount: 1,
                volatility: 1,
                nonce: 0,
            }
            .pack(),
        };
        assert_matches!(
            run(&mut accounts, ix),
            Err(ProgramError::Instruction(InstructionError::UnsupportedInstruction))
        );
    }

    fn system_account(lamports: u64) -> RemoteAccount {
        RemoteAccount {
            lamports,
            data: Vec::new(),
            owner: SYSTEM_PROGRAM_ID,
            executable: false,
        }
    }

    /// Portfolio of owner key(20) under hash 3, funded by payer key(5).
    fn init_portfolio(portfolio: &Pubkey) -> Instruction {
        let slots: [AssetSlot; PORTFOLIO_SLOTS] = std::array::from_fn(|i| AssetSlot {
            amount: 5,
            asset_mint: key(80 + i as u8),
            period: 7,
            target_asset: key(90 + i as u8),
        });
        token_instruction::portfolio::initialize_portfolio(
            &PROGRAM,
            &key(5),
            portfolio,
            &key(20),
            b"ipfs://x",
            3,
            &slots,
        )
        .unwrap()
    }

    fn portfolio_address() -> Pubkey {
        find_portfolio_address(&PROGRAM, &key(20), 3).unwrap().0
    }

    #[test]
    fn portfolio_is_allocated_from_payer() {
        let mut accounts = AccountMap::new();
        accounts.insert(key(5), system_account(10_000_000));
        let address = portfolio_address();

        run(&mut accounts, init_portfolio(&address)).unwrap();

        let rent = rent::minimum_balance(Portfolio::LEN);
        assert_eq!(accounts[&key(5)].lamports, 10_000_000 - rent);
        let stored = &accounts[&address];
        assert_eq!(stored.lamports, rent);
        assert_eq!(stored.owner, PROGRAM);
        let portfolio = Portfolio::unpack(&stored.data).unwrap();
        assert!(portfolio.is_initialized);
        assert_eq!(portfolio.portfolio_account, address);
        assert_eq!(portfolio.owner, key(20));
        assert_eq!(portfolio.metadata_hash, 3);
        assert_eq!(portfolio.slots[0].asset_mint, key(80));
        assert_eq!(portfolio.slots[8].target_asset, key(98));
    }

    #[test]
    fn portfolio_address_must_match_owner_and_hash() {
        let mut accounts = AccountMap::new();
        accounts.insert(key(5), system_account(10_000_000));
        assert_matches!(
            run(&mut accounts, init_portfolio(&key(60))),
            Err(ProgramError::Instruction(InstructionError::InvalidSeeds))
        );
        assert!(!accounts.contains_key(&key(60)));
    }

    #[test]
    fn portfolio_cannot_be_initialized_twice() {
        let mut accounts = AccountMap::new();
        accounts.insert(key(5), system_account(10_000_000));
        let address = portfolio_address();
        run(&mut accounts, init_portfolio(&address)).unwrap();
        assert_eq!(
            custom(run(&mut accounts, init_portfolio(&address))),
            Some(TokenError::AlreadyInUse.code())
        );
    }

    #[test]
    fn portfolio_needs_funded_payer() {
        let mut accounts = AccountMap::new();
        accounts.insert(key(5), system_account(1_000));
        let address = portfolio_address();
        assert_matches!(
            run(&mut accounts, init_portfolio(&address)),
            Err(ProgramError::Instruction(InstructionError::InsufficientFunds))
        );
        assert!(!accounts.contains_key(&address));
    }

    #[test]
    fn portfolio_needs_owner_signature() {
        let mut accounts = AccountMap::new();
        accounts.insert(key(5), system_account(10_000_000));
        let address = portfolio_address();
        let mut ix = init_portfolio(&address);
        ix.accounts[2].is_signer = false;
        assert_matches!(
            run(&mut accounts, ix),
            Err(ProgramError::Instruction(InstructionError::MissingRequiredSignature))
        );
    }

    #[test]
    fn user_portfolio_requires_initialized_portfolio() {
        let mut accounts = AccountMap::new();
        accounts.insert(key(5), system_account(10_000_000));
        accounts.insert(key(61), record(&UserPortfolio::default()));
        let portfolio = portfolio_address();
        let assets = [key(70); PORTFOLIO_SLOTS];
        let ix = token_instruction::portfolio::initialize_user_portfolio(
            &PROGRAM,
            &key(61),
            &portfolio,
            &key(20),
            &key(30),
            &assets,
            5,
            [0; PORTFOLIO_SLOTS],
        )
        .unwrap();
        assert_eq!(
            custom(run(&mut accounts, ix.clone())),
            Some(TokenError::UninitializedState.code())
        );

        run(&mut accounts, init_portfolio(&portfolio)).unwrap();
        run(&mut accounts, ix.clone()).unwrap();

        let user = UserPortfolio::unpack(&accounts[&key(61)].data).unwrap();
        assert_eq!(user.portfolio_address, portfolio);
        assert_eq!(user.delegate, Some(key(30)));
        assert_eq!(user.asset_accounts, assets);

        assert_eq!(custom(run(&mut accounts, ix)), Some(TokenError::AlreadyInUse.code()));
    }
}
