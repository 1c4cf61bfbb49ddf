//! The system program: account creation and lamport transfers.

use log::debug;
use sol_wire::system::{CREATE_ACCOUNT_IX_INDEX, TRANSFER_IX_INDEX};
use sol_wire::{InstructionError, Pubkey, RemoteAccount};

use crate::error::ProgramResult;
use crate::invoke::InvokeContext;

/// Largest data allocation a single `CreateAccount` may request.
pub const MAX_PERMITTED_DATA_LENGTH: u64 = 10 * 1024 * 1024;

pub(crate) fn process(ctx: &mut InvokeContext<'_>, data: &[u8]) -> ProgramResult {
    let (index, rest) = data
        .split_first_chunk::<4>()
        .ok_or(InstructionError::InvalidInstructionData)?;

    match u32::from_le_bytes(*index) {
        CREATE_ACCOUNT_IX_INDEX => {
            if rest.len() != 48 {
                return Err(InstructionError::InvalidInstructionData.into());
            }
            let lamports = read_u64(&rest[..8]);
            let space = read_u64(&rest[8..16]);
            let owner = Pubkey::try_from_slice(&rest[16..48])
                .map_err(|_| InstructionError::InvalidInstructionData)?;
            create_account(ctx, lamports, space, owner)
        }
        TRANSFER_IX_INDEX => {
            if rest.len() != 8 {
                return Err(InstructionError::InvalidInstructionData.into());
            }
            transfer(ctx, read_u64(rest))
        }
        _ => Err(InstructionError::UnsupportedInstruction.into()),
    }
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

fn create_account(
    ctx: &mut InvokeContext<'_>,
    lamports: u64,
    space: u64,
    owner: Pubkey,
) -> ProgramResult {
    if !ctx.is_signer(0)? || !ctx.is_signer(1)? {
        return Err(InstructionError::MissingRequiredSignature.into());
    }
    if ctx.exists(1)? {
        return Err(InstructionError::AccountAlreadyInUse.into());
    }
    if space > MAX_PERMITTED_DATA_LENGTH {
        return Err(InstructionError::InvalidArgument.into());
    }

    ctx.debit(0, lamports)?;
    ctx.allocate(
        1,
        RemoteAccount {
            lamports,
            data: vec![0; space as usize],
            owner,
            executable: false,
        },
    )?;
    debug!(
        "created account {} with {space} bytes owned by {owner}",
        ctx.key(1)?
    );
    Ok(())
}

fn transfer(ctx: &mut InvokeContext<'_>, lamports: u64) -> ProgramResult {
    if !ctx.is_signer(0)? {
        return Err(InstructionError::MissingRequiredSignature.into());
    }
    if ctx.data_len(0)? != 0 {
        return Err(InstructionError::InvalidArgument.into());
    }
    ctx.debit(0, lamports)?;
    ctx.credit(1, lamports)
}
