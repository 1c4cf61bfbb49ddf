//! The associated token account program.
//!
//! Creation is not idempotent: an address that already holds lamports or data
//! is rejected.

use log::debug;
use sol_wire::{AccountMeta, InstructionError, Pubkey, RemoteAccount};
use token_instruction::{find_associated_token_address, TokenInstruction};
use token_state::{Account, Pack};

use crate::error::ProgramResult;
use crate::invoke::InvokeContext;
use crate::{rent, token_program};

/// Accounts: payer (w,s), associated account (w), owner, mint, system
/// program, token program, rent sysvar.
pub(crate) fn process(ctx: &mut InvokeContext<'_>, token_program_id: &Pubkey) -> ProgramResult {
    let payer = ctx.key(0)?;
    let address = ctx.key(1)?;
    let owner = ctx.key(2)?;
    let mint = ctx.key(3)?;
    let requested_token_program = ctx.key(5)?;

    if requested_token_program != *token_program_id {
        return Err(InstructionError::IncorrectProgramId.into());
    }
    if !ctx.is_signer(0)? {
        return Err(InstructionError::MissingRequiredSignature.into());
    }

    let (expected, bump) =
        find_associated_token_address(ctx.program_id(), token_program_id, &mint, &owner)?;
    if expected != address {
        return Err(InstructionError::InvalidSeeds.into());
    }
    if ctx.exists(1)? {
        return Err(InstructionError::AccountAlreadyInUse.into());
    }

    // The payer is a system account, so the system program funds the new one.
    let lamports = rent::minimum_balance(Account::LEN);
    {
        let mut system = ctx.invoke(
            sol_wire::SYSTEM_PROGRAM_ID,
            vec![AccountMeta::new(payer, true), AccountMeta::new(address, false)],
        );
        system.debit(0, lamports)?;
        system.allocate(
            1,
            RemoteAccount {
                lamports,
                data: vec![0; Account::LEN],
                owner: *token_program_id,
                executable: false,
            },
        )?;
    }

    let mut token = ctx.invoke(
        *token_program_id,
        vec![
            AccountMeta::new(address, false),
            AccountMeta::new_readonly(mint, false),
            AccountMeta::new_readonly(owner, false),
            AccountMeta::new_readonly(sol_wire::SYSVAR_RENT_ID, false),
        ],
    );
    token_program::process(&mut token, &TokenInstruction::InitializeAccount.pack())?;

    debug!("created associated token account {address} (bump {bump}) for {owner}");
    Ok(())
}
