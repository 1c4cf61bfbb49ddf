//! Mint and token account records.

use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use sol_wire::Pubkey;
use static_assertions::const_assert_eq;

use crate::pack::{
    pack_option_key, pack_option_u64, unpack_bool, unpack_key, unpack_option_key,
    unpack_option_u64, Pack,
};

/// Token mint.
///
/// `hedged_asset_mint` and `swap_pool` link the mint to the asset it hedges
/// and the pool used to rebalance it. Plain mints leave both empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mint {
    /// Only the mint authority may create new tokens. `None` fixes the supply.
    pub mint_authority: Option<Pubkey>,
    pub supply: u64,
    /// Base-10 digits to the right of the decimal place.
    pub decimals: u8,
    pub is_initialized: bool,
    pub freeze_authority: Option<Pubkey>,
    pub hedged_asset_mint: Option<Pubkey>,
    pub swap_pool: Option<Pubkey>,
}

impl Mint {
    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Pack for Mint {
    const LEN: usize = 142;
    const NAME: &'static str = "Mint";

    fn unpack_from_slice(src: &[u8]) -> Self {
        let src = array_ref![src, 0, 142];
        let (mint_authority, supply, decimals, is_initialized, freeze_authority, hedged, swap) =
            array_refs![src, 33, 8, 1, 1, 33, 33, 33];
        Mint {
            mint_authority: unpack_option_key(mint_authority),
            supply: u64::from_le_bytes(*supply),
            decimals: decimals[0],
            is_initialized: unpack_bool(is_initialized[0]),
            freeze_authority: unpack_option_key(freeze_authority),
            hedged_asset_mint: unpack_option_key(hedged),
            swap_pool: unpack_option_key(swap),
        }
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, 142];
        let (mint_authority, supply, decimals, is_initialized, freeze_authority, hedged, swap) =
            mut_array_refs![dst, 33, 8, 1, 1, 33, 33, 33];
        pack_option_key(&self.mint_authority, mint_authority);
        *supply = self.supply.to_le_bytes();
        decimals[0] = self.decimals;
        is_initialized[0] = self.is_initialized as u8;
        pack_option_key(&self.freeze_authority, freeze_authority);
        pack_option_key(&self.hedged_asset_mint, hedged);
        pack_option_key(&self.swap_pool, swap);
    }
}

/// Account state.
///
/// Bytes outside `0..=2` decode to `Unknown` instead of failing, so a
/// corrupt record can still be inspected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccountState {
    /// Account is not yet initialized.
    #[default]
    Uninitialized,
    /// Account is initialized; the owner and/or delegate may operate on it.
    Initialized,
    /// Only the mint's freeze authority may operate on a frozen account.
    Frozen,
    Unknown(u8),
}

impl From<u8> for AccountState {
    fn from(byte: u8) -> Self {
        match byte {
            0 => AccountState::Uninitialized,
            1 => AccountState::Initialized,
            2 => AccountState::Frozen,
            other => AccountState::Unknown(other),
        }
    }
}

impl From<AccountState> for u8 {
    fn from(state: AccountState) -> Self {
        match state {
            AccountState::Uninitialized => 0,
            AccountState::Initialized => 1,
            AccountState::Frozen => 2,
            AccountState::Unknown(byte) => byte,
        }
    }
}

/// Token account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Account {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    /// Key allowed to spend up to `delegated_amount` on the owner's behalf.
    pub delegate: Option<Pubkey>,
    pub state: AccountState,
    /// `Some(reserve)` for wrapped-SOL accounts; the reserve keeps the
    /// account rent exempt and is not part of `amount`.
    pub is_native: Option<u64>,
    pub delegated_amount: u64,
    pub close_authority: Option<Pubkey>,
    /// Hedged asset backing held against `amount`.
    pub asset: u64,
    /// Stable backing held against `amount`.
    pub usdc: u64,
}

impl Account {
    pub fn is_frozen(&self) -> bool {
        self.state == AccountState::Frozen
    }

    pub fn is_native(&self) -> bool {
        self.is_native.is_some()
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, AccountState::Initialized | AccountState::Frozen)
    }

    /// False when the state byte is outside the known range.
    pub fn is_valid(&self) -> bool {
        !matches!(self.state, AccountState::Unknown(_))
    }
}

impl Pack for Account {
    const LEN: usize = 172;
    const NAME: &'static str = "Account";

    fn unpack_from_slice(src: &[u8]) -> Self {
        let src = array_ref![src, 0, 172];
        let (
            mint,
            owner,
            amount,
            delegate,
            state,
            is_native,
            delegated_amount,
            close_authority,
            asset,
            usdc,
        ) = array_refs![src, 32, 32, 8, 33, 1, 9, 8, 33, 8, 8];
        Account {
            mint: unpack_key(mint),
            owner: unpack_key(owner),
            amount: u64::from_le_bytes(*amount),
            delegate: unpack_option_key(delegate),
            state: AccountState::from(state[0]),
            is_native: unpack_option_u64(is_native),
            delegated_amount: u64::from_le_bytes(*delegated_amount),
            close_authority: unpack_option_key(close_authority),
            asset: u64::from_le_bytes(*asset),
            usdc: u64::from_le_bytes(*usdc),
        }
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, 172];
        let (
            mint,
            owner,
            amount,
            delegate,
            state,
            is_native,
            delegated_amount,
            close_authority,
            asset,
            usdc,
        ) = mut_array_refs![dst, 32, 32, 8, 33, 1, 9, 8, 33, 8, 8];
        mint.copy_from_slice(self.mint.as_ref());
        owner.copy_from_slice(self.owner.as_ref());
        *amount = self.amount.to_le_bytes();
        pack_option_key(&self.delegate, delegate);
        state[0] = self.state.into();
        pack_option_u64(&self.is_native, is_native);
        *delegated_amount = self.delegated_amount.to_le_bytes();
        pack_option_key(&self.close_authority, close_authority);
        *asset = self.asset.to_le_bytes();
        *usdc = self.usdc.to_le_bytes();
    }
}

const_assert_eq!(<Mint as Pack>::LEN, 33 + 8 + 1 + 1 + 33 * 3);
const_assert_eq!(<Account as Pack>::LEN, 32 + 32 + 8 + 33 + 1 + 9 + 8 + 33 + 8 + 8);
