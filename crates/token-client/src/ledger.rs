//! Round trips to the ledger shared by every handle.

use log::{debug, warn};
use sol_wire::{
    AccountFetcher, Hash, Instruction, Keypair, Pubkey, Signature, Transaction, TransactionSender,
};
use token_instruction::ArgumentError;
use token_state::Pack;

use crate::authority::Authority;
use crate::error::ClientError;

/// Compile, sign and submit `instructions` as one transaction.
///
/// The transaction is built and size-checked against a placeholder
/// blockhash first, so local failures never cost a network call.
pub(crate) fn send_transaction<R: TransactionSender>(
    rpc: &R,
    instructions: &[Instruction],
    payer: &Keypair,
    signers: &[&Keypair],
) -> Result<Signature, ClientError> {
    let mut tx =
        Transaction::new_signed(instructions, &payer.pubkey(), signers, Hash::default())?;
    tx.serialize()?;

    tx.message.recent_blockhash = rpc.get_latest_blockhash()?;
    tx.sign(signers)?;
    let wire = tx.serialize()?;
    debug!(
        "sending {} instruction(s), {} bytes, fee payer {}",
        instructions.len(),
        wire.len(),
        payer.pubkey()
    );

    rpc.send_and_confirm_transaction(&wire).map_err(|e| {
        warn!("transaction failed: {e}");
        ClientError::Remote(e)
    })
}

/// Build one instruction for `authority` and submit it, signed by the payer
/// and the authority's keys.
pub(crate) fn send_authorized<R, F>(
    rpc: &R,
    payer: &Keypair,
    authority: &Authority<'_>,
    build: F,
) -> Result<Signature, ClientError>
where
    R: TransactionSender,
    F: FnOnce(&Pubkey, &[&Pubkey]) -> Result<Instruction, ArgumentError>,
{
    let members = authority.member_pubkeys();
    let member_refs: Vec<&Pubkey> = members.iter().collect();
    let ix = build(&authority.pubkey(), &member_refs)?;

    let mut signers = vec![payer];
    signers.extend(authority.keypairs());
    send_transaction(rpc, &[ix], payer, &signers)
}

/// Fetch and decode a record owned by `program_id`. The stored data must be
/// exactly `T::LEN` bytes.
pub(crate) fn fetch_record<T: Pack, R: AccountFetcher>(
    rpc: &R,
    program_id: &Pubkey,
    address: &Pubkey,
) -> Result<T, ClientError> {
    let account = rpc
        .get_account(address)?
        .ok_or(ClientError::AccountNotFound(*address))?;
    if account.owner != *program_id {
        return Err(ClientError::InvalidAccountOwner {
            address: *address,
            owner: account.owner,
            expected: *program_id,
        });
    }
    if account.data.len() != T::LEN {
        return Err(ClientError::InvalidAccountSize {
            address: *address,
            expected: T::LEN,
            actual: account.data.len(),
        });
    }
    Ok(T::unpack(&account.data)?)
}
