//! Associated token accounts.
//!
//! The associated token account for a wallet + mint pair is a Program
//! Derived Address with seeds `[wallet, token_program_id, mint]` under the
//! associated token account program. Both program ids are parameters: the
//! same deriver serves any deployment of the token program.

use log::debug;
use sol_wire::{
    find_program_address, AccountMeta, Instruction, Pubkey, SolError, SYSTEM_PROGRAM_ID,
    SYSVAR_RENT_ID,
};

/// Canonical associated token account program:
/// `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e, 0x0d,
    0x83, 0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8, 0xdb, 0xe9,
    0xf8, 0x59,
]);

/// Derive the associated token account address for `owner` and `mint`.
///
/// Deterministic and free of I/O.
pub fn derive_associated_token_address(
    associated_program_id: &Pubkey,
    token_program_id: &Pubkey,
    mint: &Pubkey,
    owner: &Pubkey,
) -> Result<Pubkey, SolError> {
    find_associated_token_address(associated_program_id, token_program_id, mint, owner)
        .map(|(address, _bump)| address)
}

/// Like [`derive_associated_token_address`] but also returns the bump seed.
pub fn find_associated_token_address(
    associated_program_id: &Pubkey,
    token_program_id: &Pubkey,
    mint: &Pubkey,
    owner: &Pubkey,
) -> Result<(Pubkey, u8), SolError> {
    let (address, bump) = find_program_address(
        &[owner.as_ref(), token_program_id.as_ref(), mint.as_ref()],
        associated_program_id,
    )?;
    debug!("associated token account for {owner} / {mint}: {address} (bump {bump})");
    Ok((address, bump))
}

/// Creates an instruction that allocates and initializes the associated
/// token account of `owner` for `mint`, funded by `payer`.
///
/// Accounts: payer (writable, signer), associated account (writable),
/// owner, mint, system program, token program, rent sysvar. The payload is
/// empty. Running it for an address that already exists fails.
pub fn create_associated_token_account(
    associated_program_id: &Pubkey,
    token_program_id: &Pubkey,
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
) -> Result<Instruction, SolError> {
    let address =
        derive_associated_token_address(associated_program_id, token_program_id, mint, owner)?;

    Ok(Instruction {
        program_id: *associated_program_id,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(address, false),
            AccountMeta::new_readonly(*owner, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(*token_program_id, false),
            AccountMeta::new_readonly(SYSVAR_RENT_ID, false),
        ],
        data: Vec::new(),
    })
}
