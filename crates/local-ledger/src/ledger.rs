//! The in-memory bank and its collaborator trait implementations.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};

use log::{debug, info, warn};
use sha2::{Digest, Sha256};
use sol_wire::{
    AccountFetcher, AccountMeta, Hash, InstructionError, Message, Pubkey, RemoteAccount,
    RpcError, Signature, Transaction, TransactionError, TransactionSender, SYSTEM_PROGRAM_ID,
};

use crate::invoke::{AccountMap, InvokeContext};
use crate::{associated_program, rent, system_program, token_program};

/// Lamports charged to the fee payer per transaction signature.
pub const FEE_PER_SIGNATURE: u64 = 5_000;
/// How many of the most recent blockhashes a transaction may reference.
pub const MAX_RECENT_BLOCKHASHES: usize = 150;

struct Bank {
    accounts: AccountMap,
    blockhashes: VecDeque<Hash>,
    processed: HashSet<Signature>,
    slot: u64,
}

impl Bank {
    fn latest_blockhash(&self) -> Hash {
        self.blockhashes.back().copied().unwrap_or_default()
    }

    fn advance(&mut self) {
        self.slot += 1;
        let mut hasher = Sha256::new();
        hasher.update(self.latest_blockhash());
        hasher.update(self.slot.to_le_bytes());
        let next: Hash = hasher.finalize().into();

        self.blockhashes.push_back(next);
        if self.blockhashes.len() > MAX_RECENT_BLOCKHASHES {
            self.blockhashes.pop_front();
        }
        debug!("slot {} blockhash {}", self.slot, hex::encode(next));
    }
}

/// A single-node ledger that runs the system, token and associated token
/// account programs in process.
///
/// Transactions execute one at a time under a mutex. Every instruction runs
/// against a working copy of the accounts, which replaces the committed
/// state only when the whole transaction succeeds. The fee is charged either
/// way.
pub struct LocalLedger {
    token_program_id: Pubkey,
    associated_token_program_id: Pubkey,
    bank: Mutex<Bank>,
}

impl LocalLedger {
    pub fn new(token_program_id: Pubkey, associated_token_program_id: Pubkey) -> Self {
        let genesis: Hash = Sha256::digest(b"local-ledger genesis").into();
        Self {
            token_program_id,
            associated_token_program_id,
            bank: Mutex::new(Bank {
                accounts: AccountMap::new(),
                blockhashes: VecDeque::from([genesis]),
                processed: HashSet::new(),
                slot: 0,
            }),
        }
    }

    pub fn token_program_id(&self) -> &Pubkey {
        &self.token_program_id
    }

    pub fn associated_token_program_id(&self) -> &Pubkey {
        &self.associated_token_program_id
    }

    /// Credit `lamports` to a system account, creating it if needed.
    pub fn airdrop(&self, address: &Pubkey, lamports: u64) -> Result<(), RpcError> {
        let mut bank = self.lock()?;
        let account = bank.accounts.entry(*address).or_insert(RemoteAccount {
            lamports: 0,
            data: Vec::new(),
            owner: SYSTEM_PROGRAM_ID,
            executable: false,
        });
        account.lamports = account
            .lamports
            .checked_add(lamports)
            .ok_or_else(|| RpcError::Transport("airdrop overflows balance".into()))?;
        info!("airdropped {lamports} lamports to {address}");
        Ok(())
    }

    /// Overwrite an account directly, bypassing every program.
    pub fn set_account(&self, address: &Pubkey, account: RemoteAccount) -> Result<(), RpcError> {
        self.lock()?.accounts.insert(*address, account);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Bank>, RpcError> {
        self.bank
            .lock()
            .map_err(|_| RpcError::Transport("ledger lock poisoned".into()))
    }

    fn execute(&self, accounts: &mut AccountMap, message: &Message) -> Result<(), RpcError> {
        for (index, ix) in message.instructions.iter().enumerate() {
            let fail = |error: InstructionError| RpcError::Instruction {
                index: index as u8,
                error,
            };

            let program_id = message.account_keys[ix.program_id_index as usize];
            let metas = ix
                .accounts
                .iter()
                .map(|&i| {
                    let i = i as usize;
                    AccountMeta {
                        pubkey: message.account_keys[i],
                        is_signer: message.is_signer(i),
                        is_writable: message.is_writable(i),
                    }
                })
                .collect();

            let mut ctx = InvokeContext::new(program_id, accounts, metas);
            let result = if program_id == SYSTEM_PROGRAM_ID {
                system_program::process(&mut ctx, &ix.data)
            } else if program_id == self.token_program_id {
                token_program::process(&mut ctx, &ix.data)
            } else if program_id == self.associated_token_program_id {
                associated_program::process(&mut ctx, &self.token_program_id)
            } else {
                return Err(fail(InstructionError::UnknownProgram));
            };
            result.map_err(|e| fail(e.into()))?;
        }
        Ok(())
    }
}

impl TransactionSender for LocalLedger {
    fn get_latest_blockhash(&self) -> Result<Hash, RpcError> {
        Ok(self.lock()?.latest_blockhash())
    }

    fn send_and_confirm_transaction(&self, wire: &[u8]) -> Result<Signature, RpcError> {
        let tx = Transaction::deserialize(wire)
            .map_err(|e| TransactionError::SanitizeFailure(e.to_string()))?;
        tx.verify().map_err(|_| TransactionError::SignatureFailure)?;
        let signature = *tx
            .signature()
            .ok_or_else(|| TransactionError::SanitizeFailure("no signatures".into()))?;
        let payer = *tx
            .message
            .fee_payer()
            .ok_or_else(|| TransactionError::SanitizeFailure("no fee payer".into()))?;

        let mut bank = self.lock()?;
        if !bank.blockhashes.contains(&tx.message.recent_blockhash) {
            return Err(TransactionError::BlockhashNotFound.into());
        }
        if bank.processed.contains(&signature) {
            return Err(TransactionError::AlreadyProcessed.into());
        }

        let fee = FEE_PER_SIGNATURE * tx.signatures.len() as u64;
        let payer_account = bank
            .accounts
            .get_mut(&payer)
            .ok_or(TransactionError::AccountNotFound)?;
        payer_account.lamports = payer_account
            .lamports
            .checked_sub(fee)
            .ok_or(TransactionError::InsufficientFundsForFee)?;

        bank.processed.insert(signature);
        bank.advance();

        let mut working = bank.accounts.clone();
        match self.execute(&mut working, &tx.message) {
            Ok(()) => {
                working.retain(|_, account| account.lamports > 0);
                bank.accounts = working;
                info!(
                    "confirmed {signature} ({} instruction(s))",
                    tx.message.instructions.len()
                );
                Ok(signature)
            }
            Err(e) => {
                warn!("transaction {signature} failed: {e}");
                Err(e)
            }
        }
    }
}

impl AccountFetcher for LocalLedger {
    fn get_account(&self, address: &Pubkey) -> Result<Option<RemoteAccount>, RpcError> {
        Ok(self.lock()?.accounts.get(address).cloned())
    }

    fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64, RpcError> {
        Ok(rent::minimum_balance(data_len))
    }
}
