//! Manual Solana transaction wire format and signing.
//!
//! We build Solana transactions entirely by hand, with no `solana-sdk`
//! dependency. The wire format is a compact binary layout:
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        (see below)
//!
//! Instruction:
//!   program_id_index        u8
//!   num_accounts            compact-u16
//!   account_indices         u8 * num_accounts
//!   data_len                compact-u16
//!   data                    u8 * data_len
//! ```

use log::debug;

use crate::address::Pubkey;
use crate::error::SolError;
use crate::instruction::Instruction;
use crate::keypair::{Keypair, Signature};

/// A recent blockhash as handed out by the ledger.
pub type Hash = [u8; 32];

/// Largest serialized transaction the network accepts.
pub const PACKET_DATA_SIZE: usize = 1232;

// ---------------------------------------------------------------------------
// Compact-u16 encoding
// ---------------------------------------------------------------------------

/// Encode a `u16` value in Solana's compact-u16 format.
///
/// - Values 0..0x7f       -> 1 byte
/// - Values 0x80..0x3fff  -> 2 bytes
/// - Values 0x4000..      -> 3 bytes
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut val = value as u32;
    let mut out = Vec::with_capacity(3);

    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }

    out
}

/// Decode a compact-u16 value from a byte slice.
///
/// Returns `(value, bytes_consumed)` or an error if the data is truncated.
pub fn decode_compact_u16(data: &[u8]) -> Result<(u16, usize), SolError> {
    let mut value: u32 = 0;
    let mut shift = 0u32;
    let mut consumed = 0usize;

    loop {
        let byte = *data.get(consumed).ok_or_else(|| {
            SolError::SerializationError(
                "unexpected end of data while decoding compact-u16".into(),
            )
        })?;
        consumed += 1;

        value |= ((byte & 0x7f) as u32) << shift;
        shift += 7;

        if byte & 0x80 == 0 || consumed >= 3 {
            break;
        }
    }

    if value > u16::MAX as u32 {
        return Err(SolError::SerializationError(
            "compact-u16 value overflow".into(),
        ));
    }

    Ok((value as u16, consumed))
}

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageHeader {
    /// Number of required signatures (first N accounts are signers).
    pub num_required_signatures: u8,
    /// How many of the signing accounts are read-only.
    pub num_readonly_signed_accounts: u8,
    /// How many of the non-signing accounts are read-only.
    pub num_readonly_unsigned_accounts: u8,
}

/// A compiled instruction where account references are replaced by u8 indices
/// into the message's `account_keys` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

/// The signed part of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    /// All account keys referenced by this message, in canonical order:
    ///   1. writable signers (fee payer first)
    ///   2. read-only signers
    ///   3. writable non-signers
    ///   4. read-only non-signers
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: Hash,
    pub instructions: Vec<CompiledInstruction>,
}

/// A message together with one signature per required signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub signatures: Vec<Signature>,
    pub message: Message,
}

// ---------------------------------------------------------------------------
// Message compilation
// ---------------------------------------------------------------------------

impl Message {
    /// Compile instructions into a message with a single fee payer.
    ///
    /// The fee payer is always a writable signer at index 0.
    pub fn compile(
        instructions: &[Instruction],
        fee_payer: &Pubkey,
        recent_blockhash: Hash,
    ) -> Result<Self, SolError> {
        struct AccountEntry {
            pubkey: Pubkey,
            is_signer: bool,
            is_writable: bool,
        }

        let mut entries: Vec<AccountEntry> = Vec::new();

        let mut upsert = |pubkey: Pubkey, signer: bool, writable: bool| {
            if let Some(entry) = entries.iter_mut().find(|e| e.pubkey == pubkey) {
                entry.is_signer |= signer;
                entry.is_writable |= writable;
            } else {
                entries.push(AccountEntry {
                    pubkey,
                    is_signer: signer,
                    is_writable: writable,
                });
            }
        };

        upsert(*fee_payer, true, true);

        for ix in instructions {
            for meta in &ix.accounts {
                upsert(meta.pubkey, meta.is_signer, meta.is_writable);
            }
            // Program IDs are non-signer, read-only accounts.
            upsert(ix.program_id, false, false);
        }

        // Stable sort keeps insertion order inside each class, so the fee
        // payer stays at index 0.
        entries.sort_by_key(|e| match (e.is_signer, e.is_writable) {
            (true, true) => 0u8,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        });

        if entries.len() > u8::MAX as usize + 1 {
            return Err(SolError::TransactionBuildError(format!(
                "too many account keys: {}",
                entries.len()
            )));
        }

        let count = |f: fn(&AccountEntry) -> bool| entries.iter().filter(|e| f(e)).count() as u8;
        let header = MessageHeader {
            num_required_signatures: count(|e| e.is_signer),
            num_readonly_signed_accounts: count(|e| e.is_signer && !e.is_writable),
            num_readonly_unsigned_accounts: count(|e| !e.is_signer && !e.is_writable),
        };

        let account_keys: Vec<Pubkey> = entries.iter().map(|e| e.pubkey).collect();
        let index_of = |key: &Pubkey| -> Result<u8, SolError> {
            account_keys
                .iter()
                .position(|k| k == key)
                .map(|i| i as u8)
                .ok_or_else(|| {
                    SolError::TransactionBuildError(format!("{key} not in account keys"))
                })
        };

        let mut compiled = Vec::with_capacity(instructions.len());
        for ix in instructions {
            let accounts = ix
                .accounts
                .iter()
                .map(|meta| index_of(&meta.pubkey))
                .collect::<Result<Vec<_>, _>>()?;
            compiled.push(CompiledInstruction {
                program_id_index: index_of(&ix.program_id)?,
                accounts,
                data: ix.data.clone(),
            });
        }

        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions: compiled,
        })
    }

    pub fn fee_payer(&self) -> Option<&Pubkey> {
        self.account_keys.first()
    }

    pub fn signer_keys(&self) -> &[Pubkey] {
        let n = (self.header.num_required_signatures as usize).min(self.account_keys.len());
        &self.account_keys[..n]
    }

    pub fn is_signer(&self, index: usize) -> bool {
        index < self.header.num_required_signatures as usize
    }

    pub fn is_writable(&self, index: usize) -> bool {
        let num_signed = self.header.num_required_signatures as usize;
        if index >= self.account_keys.len() {
            return false;
        }
        if index < num_signed {
            index < num_signed.saturating_sub(self.header.num_readonly_signed_accounts as usize)
        } else {
            let num_unsigned = self.account_keys.len() - num_signed;
            index - num_signed
                < num_unsigned.saturating_sub(self.header.num_readonly_unsigned_accounts as usize)
        }
    }

    /// Serialize the message (the bytes that get signed).
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(256);

        buf.push(self.header.num_required_signatures);
        buf.push(self.header.num_readonly_signed_accounts);
        buf.push(self.header.num_readonly_unsigned_accounts);

        buf.extend_from_slice(&encode_compact_u16(self.account_keys.len() as u16));
        for key in &self.account_keys {
            buf.extend_from_slice(key.as_ref());
        }

        buf.extend_from_slice(&self.recent_blockhash);

        buf.extend_from_slice(&encode_compact_u16(self.instructions.len() as u16));
        for ix in &self.instructions {
            buf.push(ix.program_id_index);

            buf.extend_from_slice(&encode_compact_u16(ix.accounts.len() as u16));
            buf.extend_from_slice(&ix.accounts);

            buf.extend_from_slice(&encode_compact_u16(ix.data.len() as u16));
            buf.extend_from_slice(&ix.data);
        }

        buf
    }

    /// Parse a serialized message, rejecting trailing bytes and account
    /// indices that point past the key table.
    pub fn deserialize(data: &[u8]) -> Result<Self, SolError> {
        let mut reader = Reader { data, pos: 0 };

        let header = MessageHeader {
            num_required_signatures: reader.u8()?,
            num_readonly_signed_accounts: reader.u8()?,
            num_readonly_unsigned_accounts: reader.u8()?,
        };

        let num_keys = reader.compact_u16()? as usize;
        let mut account_keys = Vec::with_capacity(num_keys);
        for _ in 0..num_keys {
            account_keys.push(Pubkey::try_from_slice(reader.take(32)?)?);
        }

        let mut recent_blockhash = [0u8; 32];
        recent_blockhash.copy_from_slice(reader.take(32)?);

        let num_ixs = reader.compact_u16()? as usize;
        let mut instructions = Vec::with_capacity(num_ixs);
        for _ in 0..num_ixs {
            let program_id_index = reader.u8()?;
            let n = reader.compact_u16()? as usize;
            let accounts = reader.take(n)?.to_vec();
            let len = reader.compact_u16()? as usize;
            let data = reader.take(len)?.to_vec();

            let out_of_range = std::iter::once(&program_id_index)
                .chain(accounts.iter())
                .any(|&i| i as usize >= account_keys.len());
            if out_of_range {
                return Err(SolError::SerializationError(
                    "account index out of range".into(),
                ));
            }

            instructions.push(CompiledInstruction {
                program_id_index,
                accounts,
                data,
            });
        }

        if reader.pos != data.len() {
            return Err(SolError::SerializationError(format!(
                "{} trailing bytes after message",
                data.len() - reader.pos
            )));
        }

        if header.num_required_signatures as usize > account_keys.len() {
            return Err(SolError::SerializationError(
                "more required signatures than account keys".into(),
            ));
        }

        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions,
        })
    }
}

// ---------------------------------------------------------------------------
// Signing
// ---------------------------------------------------------------------------

impl Transaction {
    /// Compile and sign a transaction in one step.
    ///
    /// `signers` must cover every required signer of the compiled message,
    /// and must not contain keypairs the message does not require.
    pub fn new_signed(
        instructions: &[Instruction],
        payer: &Pubkey,
        signers: &[&Keypair],
        recent_blockhash: Hash,
    ) -> Result<Self, SolError> {
        let message = Message::compile(instructions, payer, recent_blockhash)?;
        let mut tx = Self {
            signatures: Vec::new(),
            message,
        };
        tx.sign(signers)?;
        debug!(
            "signed transaction with {} instruction(s), {} signature(s)",
            instructions.len(),
            tx.signatures.len()
        );
        Ok(tx)
    }

    /// Replace all signatures with fresh ones from `signers`.
    pub fn sign(&mut self, signers: &[&Keypair]) -> Result<(), SolError> {
        let required = self.message.signer_keys();

        for kp in signers {
            let pk = kp.pubkey();
            if !required.contains(&pk) {
                return Err(SolError::SigningError(format!(
                    "keypair {pk} is not a required signer"
                )));
            }
        }

        let message_bytes = self.message.serialize();
        let mut signatures = Vec::with_capacity(required.len());
        for key in required {
            let kp = signers
                .iter()
                .find(|kp| kp.pubkey() == *key)
                .ok_or_else(|| SolError::SigningError(format!("missing signer {key}")))?;
            signatures.push(kp.sign_message(&message_bytes));
        }

        self.signatures = signatures;
        Ok(())
    }

    /// The first signature, which identifies the transaction.
    pub fn signature(&self) -> Option<&Signature> {
        self.signatures.first()
    }

    /// Check that every required signer produced a valid signature.
    pub fn verify(&self) -> Result<(), SolError> {
        let required = self.message.signer_keys();
        if self.signatures.len() != required.len() {
            return Err(SolError::SigningError(format!(
                "expected {} signatures, got {}",
                required.len(),
                self.signatures.len()
            )));
        }

        let message_bytes = self.message.serialize();
        for (sig, key) in self.signatures.iter().zip(required) {
            if !sig.verify(key, &message_bytes) {
                return Err(SolError::SigningError(format!(
                    "signature verification failed for {key}"
                )));
            }
        }
        Ok(())
    }

    /// Serialize into wire bytes ready for submission.
    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        let message_bytes = self.message.serialize();

        let mut wire = Vec::with_capacity(3 + 64 * self.signatures.len() + message_bytes.len());
        wire.extend_from_slice(&encode_compact_u16(self.signatures.len() as u16));
        for sig in &self.signatures {
            wire.extend_from_slice(&sig.to_bytes());
        }
        wire.extend_from_slice(&message_bytes);

        if wire.len() > PACKET_DATA_SIZE {
            return Err(SolError::SerializationError(format!(
                "transaction is {} bytes, limit is {PACKET_DATA_SIZE}",
                wire.len()
            )));
        }

        Ok(wire)
    }

    /// Parse wire bytes produced by [`Transaction::serialize`].
    pub fn deserialize(wire: &[u8]) -> Result<Self, SolError> {
        let (num_sigs, compact_len) = decode_compact_u16(wire)?;

        let sigs_end = compact_len + num_sigs as usize * 64;
        if sigs_end > wire.len() {
            return Err(SolError::SerializationError(
                "transaction too short: signature slots exceed length".into(),
            ));
        }

        let signatures = wire[compact_len..sigs_end]
            .chunks_exact(64)
            .map(|chunk| {
                let mut bytes = [0u8; 64];
                bytes.copy_from_slice(chunk);
                Signature::new_from_array(bytes)
            })
            .collect();

        let message = Message::deserialize(&wire[sigs_end..])?;
        Ok(Self {
            signatures,
            message,
        })
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], SolError> {
        let end = self.pos.checked_add(n).filter(|&end| end <= self.data.len());
        let end = end.ok_or_else(|| {
            SolError::SerializationError("unexpected end of message".into())
        })?;
        let out = &self.data[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, SolError> {
        Ok(self.take(1)?[0])
    }

    fn compact_u16(&mut self) -> Result<u16, SolError> {
        let (value, consumed) = decode_compact_u16(&self.data[self.pos..])?;
        self.pos += consumed;
        Ok(value)
    }
}
