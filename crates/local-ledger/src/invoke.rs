//! Account access for one executing instruction.
//!
//! Programs never touch the account map directly. They go through an
//! [`InvokeContext`], which resolves positional accounts and enforces the
//! runtime rules: only writable accounts change, only the owning program
//! rewrites data or spends lamports.

use std::collections::HashMap;

use sol_wire::{AccountMeta, InstructionError, Pubkey, RemoteAccount, SYSTEM_PROGRAM_ID};
use token_instruction::TokenError;
use token_state::Pack;

use crate::error::{ProgramError, ProgramResult};
use crate::rent;

pub(crate) type AccountMap = HashMap<Pubkey, RemoteAccount>;

/// An address nobody has funded yet reads as an empty system account.
fn empty_account() -> RemoteAccount {
    RemoteAccount {
        lamports: 0,
        data: Vec::new(),
        owner: SYSTEM_PROGRAM_ID,
        executable: false,
    }
}

pub(crate) struct InvokeContext<'a> {
    program_id: Pubkey,
    accounts: &'a mut AccountMap,
    metas: Vec<AccountMeta>,
}

impl<'a> InvokeContext<'a> {
    pub fn new(program_id: Pubkey, accounts: &'a mut AccountMap, metas: Vec<AccountMeta>) -> Self {
        Self {
            program_id,
            accounts,
            metas,
        }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn meta(&self, index: usize) -> Result<&AccountMeta, InstructionError> {
        self.metas
            .get(index)
            .ok_or(InstructionError::NotEnoughAccountKeys)
    }

    /// Accounts from `index` to the end; empty when `index` is past it.
    pub fn metas_from(&self, index: usize) -> &[AccountMeta] {
        self.metas.get(index..).unwrap_or(&[])
    }

    pub fn key(&self, index: usize) -> Result<Pubkey, InstructionError> {
        Ok(self.meta(index)?.pubkey)
    }

    pub fn is_signer(&self, index: usize) -> Result<bool, InstructionError> {
        Ok(self.meta(index)?.is_signer)
    }

    fn stored(&self, index: usize) -> Result<Option<&RemoteAccount>, InstructionError> {
        let key = self.key(index)?;
        Ok(self.accounts.get(&key))
    }

    pub fn exists(&self, index: usize) -> Result<bool, InstructionError> {
        Ok(self
            .stored(index)?
            .is_some_and(|a| a.lamports > 0 || !a.data.is_empty()))
    }

    pub fn lamports(&self, index: usize) -> Result<u64, InstructionError> {
        Ok(self.stored(index)?.map_or(0, |a| a.lamports))
    }

    pub fn owner(&self, index: usize) -> Result<Pubkey, InstructionError> {
        Ok(self.stored(index)?.map_or(SYSTEM_PROGRAM_ID, |a| a.owner))
    }

    pub fn data_len(&self, index: usize) -> Result<usize, InstructionError> {
        Ok(self.stored(index)?.map_or(0, |a| a.data.len()))
    }

    pub fn is_rent_exempt(&self, index: usize) -> Result<bool, InstructionError> {
        Ok(rent::is_exempt(self.lamports(index)?, self.data_len(index)?))
    }

    /// Decode a record owned by the executing program. The stored data must
    /// be exactly `T::LEN` bytes.
    pub fn unpack<T: Pack>(&self, index: usize) -> Result<T, ProgramError> {
        let account = self
            .stored(index)?
            .ok_or(InstructionError::IncorrectProgramId)?;
        if account.owner != self.program_id {
            return Err(InstructionError::IncorrectProgramId.into());
        }
        if account.data.len() != T::LEN {
            return Err(InstructionError::InvalidAccountData.into());
        }
        Ok(T::unpack(&account.data)?)
    }

    pub fn pack<T: Pack>(&mut self, index: usize, value: &T) -> ProgramResult {
        let key = self.writable_key(index)?;
        let account = self
            .accounts
            .get_mut(&key)
            .ok_or(InstructionError::ExternalAccountDataModified)?;
        if account.owner != self.program_id {
            return Err(InstructionError::ExternalAccountDataModified.into());
        }
        value.pack(&mut account.data)?;
        Ok(())
    }

    /// Remove lamports from an account owned by the executing program.
    pub fn debit(&mut self, index: usize, lamports: u64) -> ProgramResult {
        let key = self.writable_key(index)?;
        let account = self
            .accounts
            .get_mut(&key)
            .ok_or(InstructionError::InsufficientFunds)?;
        if account.owner != self.program_id {
            return Err(InstructionError::ExternalAccountLamportSpend.into());
        }
        account.lamports = account
            .lamports
            .checked_sub(lamports)
            .ok_or(InstructionError::InsufficientFunds)?;
        Ok(())
    }

    pub fn credit(&mut self, index: usize, lamports: u64) -> ProgramResult {
        let key = self.writable_key(index)?;
        let account = self.accounts.entry(key).or_insert_with(empty_account);
        account.lamports = account
            .lamports
            .checked_add(lamports)
            .ok_or(TokenError::Overflow)?;
        Ok(())
    }

    /// Replace an empty address with a freshly allocated account. The
    /// lamports are expected to have been debited from the funder already.
    pub fn allocate(&mut self, index: usize, account: RemoteAccount) -> ProgramResult {
        if self.exists(index)? {
            return Err(InstructionError::AccountAlreadyInUse.into());
        }
        let key = self.writable_key(index)?;
        self.accounts.insert(key, account);
        Ok(())
    }

    /// A nested context for a cross-program call sharing this account map.
    pub fn invoke(&mut self, program_id: Pubkey, metas: Vec<AccountMeta>) -> InvokeContext<'_> {
        InvokeContext::new(program_id, &mut *self.accounts, metas)
    }

    fn writable_key(&self, index: usize) -> Result<Pubkey, InstructionError> {
        let meta = self.meta(index)?;
        if !meta.is_writable {
            return Err(InstructionError::ReadonlyDataModified);
        }
        Ok(meta.pubkey)
    }
}
