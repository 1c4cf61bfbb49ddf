//! Instruction payloads of the token program.
//!
//! Every payload starts with a one-byte tag followed by little-endian
//! arguments. Optional keys are a presence byte plus 32 bytes when present.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use sol_wire::Pubkey;
use token_state::{METADATA_URL_LEN, PORTFOLIO_SLOTS};

use crate::error::TokenError;

/// Largest decimals value the checked instructions accept.
pub const MAX_DECIMALS: u8 = 9;

/// Specifies the authority type for `SetAuthority` instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum AuthorityType {
    /// Authority to mint new tokens
    MintTokens = 0,
    /// Authority to freeze any account associated with the mint
    FreezeAccount = 1,
    /// Owner of a given token account
    AccountOwner = 2,
    /// Authority to close a token account
    CloseAccount = 3,
}

/// Amount and rebalancing period of one portfolio slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotAllocation {
    pub amount: u64,
    pub period: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenInstruction {
    InitializeMint {
        decimals: u8,
        mint_authority: Pubkey,
        freeze_authority: Option<Pubkey>,
        hedged_asset_mint: Option<Pubkey>,
        swap_pool: Option<Pubkey>,
    },
    InitializeAccount,
    InitializeMultisig {
        m: u8,
    },
    Transfer {
        amount: u64,
    },
    Approve {
        amount: u64,
    },
    Revoke,
    SetAuthority {
        authority_type: AuthorityType,
        new_authority: Option<Pubkey>,
    },
    MintTo {
        amount: u64,
    },
    Burn {
        amount: u64,
    },
    CloseAccount,
    FreezeAccount,
    ThawAccount,
    TransferChecked {
        amount: u64,
        decimals: u8,
    },
    ApproveChecked {
        amount: u64,
        decimals: u8,
    },
    MintToChecked {
        amount: u64,
        decimals: u8,
    },
    BurnChecked {
        amount: u64,
        decimals: u8,
    },
    InitializeAccount2 {
        owner: Pubkey,
    },
    /// Swap `amount` into the hedged asset through an external pool.
    Deposit {
        amount: u64,
        volatility: u64,
        nonce: u8,
    },
    /// Burn `amount` together with its share of the backing.
    Withdraw {
        amount: u64,
    },
    InitializePortfolio {
        metadata_url: [u8; METADATA_URL_LEN],
        metadata_hash: u16,
        allocations: [SlotAllocation; PORTFOLIO_SLOTS],
    },
    InitializeUserPortfolio {
        delegated_amount: u64,
        values: [u64; PORTFOLIO_SLOTS],
    },
}

impl TokenInstruction {
    /// Decode a payload. Unknown tags and short payloads are
    /// [`TokenError::InvalidInstruction`].
    pub fn unpack(input: &[u8]) -> Result<Self, TokenError> {
        use TokenError::InvalidInstruction;

        let (&tag, rest) = input.split_first().ok_or(InvalidInstruction)?;
        let mut r = Cursor(rest);

        Ok(match tag {
            0 => {
                let decimals = r.u8()?;
                let mint_authority = r.pubkey()?;
                let freeze_authority = r.option_pubkey()?;
                let hedged_asset_mint = r.option_pubkey()?;
                let swap_pool = r.option_pubkey()?;
                Self::InitializeMint {
                    decimals,
                    mint_authority,
                    freeze_authority,
                    hedged_asset_mint,
                    swap_pool,
                }
            }
            1 => Self::InitializeAccount,
            2 => Self::InitializeMultisig { m: r.u8()? },
            3 => Self::Transfer { amount: r.u64()? },
            4 => Self::Approve { amount: r.u64()? },
            5 => Self::Revoke,
            6 => {
                let authority_type =
                    AuthorityType::try_from(r.u8()?).map_err(|_| InvalidInstruction)?;
                let new_authority = r.option_pubkey()?;
                Self::SetAuthority {
                    authority_type,
                    new_authority,
                }
            }
            7 => Self::MintTo { amount: r.u64()? },
            8 => Self::Burn { amount: r.u64()? },
            9 => Self::CloseAccount,
            10 => Self::FreezeAccount,
            11 => Self::ThawAccount,
            12..=15 => {
                let amount = r.u64()?;
                let decimals = r.u8()?;
                match tag {
                    12 => Self::TransferChecked { amount, decimals },
                    13 => Self::ApproveChecked { amount, decimals },
                    14 => Self::MintToChecked { amount, decimals },
                    _ => Self::BurnChecked { amount, decimals },
                }
            }
            16 => Self::InitializeAccount2 { owner: r.pubkey()? },
            17 => {
                let amount = r.u64()?;
                let volatility = r.u64()?;
                let nonce = r.u8()?;
                Self::Deposit {
                    amount,
                    volatility,
                    nonce,
                }
            }
            18 => Self::Withdraw { amount: r.u64()? },
            19 => {
                let mut metadata_url = [0u8; METADATA_URL_LEN];
                metadata_url.copy_from_slice(r.take(METADATA_URL_LEN)?);
                let metadata_hash = u16::from_le_bytes(r.array()?);
                let mut allocations = [SlotAllocation::default(); PORTFOLIO_SLOTS];
                for slot in allocations.iter_mut() {
                    slot.amount = r.u64()?;
                    slot.period = r.u64()?;
                }
                Self::InitializePortfolio {
                    metadata_url,
                    metadata_hash,
                    allocations,
                }
            }
            20 => {
                let delegated_amount = r.u64()?;
                let mut values = [0u64; PORTFOLIO_SLOTS];
                for value in values.iter_mut() {
                    *value = r.u64()?;
                }
                Self::InitializeUserPortfolio {
                    delegated_amount,
                    values,
                }
            }
            _ => return Err(InvalidInstruction),
        })
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(size_of::<Self>());
        match self {
            Self::InitializeMint {
                decimals,
                mint_authority,
                freeze_authority,
                hedged_asset_mint,
                swap_pool,
            } => {
                buf.push(0);
                buf.push(*decimals);
                buf.extend_from_slice(mint_authority.as_ref());
                pack_option_pubkey(freeze_authority, &mut buf);
                pack_option_pubkey(hedged_asset_mint, &mut buf);
                pack_option_pubkey(swap_pool, &mut buf);
            }
            Self::InitializeAccount => buf.push(1),
            Self::InitializeMultisig { m } => {
                buf.push(2);
                buf.push(*m);
            }
            Self::Transfer { amount } => pack_amount(3, *amount, &mut buf),
            Self::Approve { amount } => pack_amount(4, *amount, &mut buf),
            Self::Revoke => buf.push(5),
            Self::SetAuthority {
                authority_type,
                new_authority,
            } => {
                buf.push(6);
                buf.push((*authority_type).into());
                pack_option_pubkey(new_authority, &mut buf);
            }
            Self::MintTo { amount } => pack_amount(7, *amount, &mut buf),
            Self::Burn { amount } => pack_amount(8, *amount, &mut buf),
            Self::CloseAccount => buf.push(9),
            Self::FreezeAccount => buf.push(10),
            Self::ThawAccount => buf.push(11),
            Self::TransferChecked { amount, decimals } => {
                pack_amount(12, *amount, &mut buf);
                buf.push(*decimals);
            }
            Self::ApproveChecked { amount, decimals } => {
                pack_amount(13, *amount, &mut buf);
                buf.push(*decimals);
            }
            Self::MintToChecked { amount, decimals } => {
                pack_amount(14, *amount, &mut buf);
                buf.push(*decimals);
            }
            Self::BurnChecked { amount, decimals } => {
                pack_amount(15, *amount, &mut buf);
                buf.push(*decimals);
            }
            Self::InitializeAccount2 { owner } => {
                buf.push(16);
                buf.extend_from_slice(owner.as_ref());
            }
            Self::Deposit {
                amount,
                volatility,
                nonce,
            } => {
                pack_amount(17, *amount, &mut buf);
                buf.extend_from_slice(&volatility.to_le_bytes());
                buf.push(*nonce);
            }
            Self::Withdraw { amount } => pack_amount(18, *amount, &mut buf),
            Self::InitializePortfolio {
                metadata_url,
                metadata_hash,
                allocations,
            } => {
                buf.push(19);
                buf.extend_from_slice(metadata_url);
                buf.extend_from_slice(&metadata_hash.to_le_bytes());
                for slot in allocations {
                    buf.extend_from_slice(&slot.amount.to_le_bytes());
                    buf.extend_from_slice(&slot.period.to_le_bytes());
                }
            }
            Self::InitializeUserPortfolio {
                delegated_amount,
                values,
            } => {
                pack_amount(20, *delegated_amount, &mut buf);
                for value in values {
                    buf.extend_from_slice(&value.to_le_bytes());
                }
            }
        }
        buf
    }
}

fn pack_amount(tag: u8, amount: u64, buf: &mut Vec<u8>) {
    buf.push(tag);
    buf.extend_from_slice(&amount.to_le_bytes());
}

fn pack_option_pubkey(key: &Option<Pubkey>, buf: &mut Vec<u8>) {
    match key {
        Some(key) => {
            buf.push(1);
            buf.extend_from_slice(key.as_ref());
        }
        None => buf.push(0),
    }
}

struct Cursor<'a>(&'a [u8]);

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], TokenError> {
        if self.0.len() < n {
            return Err(TokenError::InvalidInstruction);
        }
        let (head, tail) = self.0.split_at(n);
        self.0 = tail;
        Ok(head)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], TokenError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, TokenError> {
        Ok(self.take(1)?[0])
    }

    fn u64(&mut self) -> Result<u64, TokenError> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    fn pubkey(&mut self) -> Result<Pubkey, TokenError> {
        Ok(Pubkey::new_from_array(self.array()?))
    }

    fn option_pubkey(&mut self) -> Result<Option<Pubkey>, TokenError> {
        match self.u8()? {
            0 => Ok(None),
            1 => Ok(Some(self.pubkey()?)),
            _ => Err(TokenError::InvalidInstruction),
        }
    }
}
