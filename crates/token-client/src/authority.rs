use sol_wire::{Keypair, Pubkey};

/// Who authorises a token operation.
#[derive(Clone, Copy)]
pub enum Authority<'a> {
    /// A single key that signs the transaction itself.
    Single(&'a Keypair),
    /// A multisig account; `signers` must hold at least `m` of its members.
    Multisig {
        multisig: Pubkey,
        signers: &'a [&'a Keypair],
    },
}

impl Authority<'_> {
    /// The key placed in the authority position of the instruction.
    pub fn pubkey(&self) -> Pubkey {
        match self {
            Authority::Single(keypair) => keypair.pubkey(),
            Authority::Multisig { multisig, .. } => *multisig,
        }
    }

    /// Multisig members appended after the authority; empty for a single key.
    pub(crate) fn member_pubkeys(&self) -> Vec<Pubkey> {
        match self {
            Authority::Single(_) => Vec::new(),
            Authority::Multisig { signers, .. } => signers.iter().map(|k| k.pubkey()).collect(),
        }
    }

    pub(crate) fn keypairs(&self) -> Vec<&Keypair> {
        match self {
            Authority::Single(keypair) => vec![*keypair],
            Authority::Multisig { signers, .. } => signers.to_vec(),
        }
    }
}

impl<'a> From<&'a Keypair> for Authority<'a> {
    fn from(keypair: &'a Keypair) -> Self {
        Authority::Single(keypair)
    }
}
