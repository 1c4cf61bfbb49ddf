//! Portfolio templates and per-user portfolio records.

use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use sol_wire::Pubkey;
use static_assertions::const_assert_eq;

use crate::pack::{pack_option_key, unpack_bool, unpack_key, unpack_option_key, Pack};

/// Number of asset slots in every portfolio.
pub const PORTFOLIO_SLOTS: usize = 9;
/// Size of the fixed metadata URL buffer.
pub const METADATA_URL_LEN: usize = 128;

const SLOT_LEN: usize = 80;

/// One allocation inside a portfolio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetSlot {
    /// Share of the portfolio assigned to this asset.
    pub amount: u64,
    pub asset_mint: Pubkey,
    /// Rebalancing period.
    pub period: u64,
    /// Account the asset is swapped into.
    pub target_asset: Pubkey,
}

impl AssetSlot {
    fn unpack(src: &[u8; SLOT_LEN]) -> Self {
        let (amount, asset_mint, period, target_asset) = array_refs![src, 8, 32, 8, 32];
        AssetSlot {
            amount: u64::from_le_bytes(*amount),
            asset_mint: unpack_key(asset_mint),
            period: u64::from_le_bytes(*period),
            target_asset: unpack_key(target_asset),
        }
    }

    fn pack(&self, dst: &mut [u8; SLOT_LEN]) {
        let (amount, asset_mint, period, target_asset) = mut_array_refs![dst, 8, 32, 8, 32];
        *amount = self.amount.to_le_bytes();
        asset_mint.copy_from_slice(self.asset_mint.as_ref());
        *period = self.period.to_le_bytes();
        target_asset.copy_from_slice(self.target_asset.as_ref());
    }
}

/// A portfolio template: up to nine assets with their allocation and period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Portfolio {
    /// Address of the portfolio account itself.
    pub portfolio_account: Pubkey,
    pub owner: Pubkey,
    /// Zero-padded metadata URL.
    pub metadata_url: [u8; METADATA_URL_LEN],
    /// Short hash of the metadata document, pinned at creation.
    pub metadata_hash: u16,
    pub is_initialized: bool,
    pub slots: [AssetSlot; PORTFOLIO_SLOTS],
}

impl Default for Portfolio {
    fn default() -> Self {
        Portfolio {
            portfolio_account: Pubkey::default(),
            owner: Pubkey::default(),
            metadata_url: [0; METADATA_URL_LEN],
            metadata_hash: 0,
            is_initialized: false,
            slots: [AssetSlot::default(); PORTFOLIO_SLOTS],
        }
    }
}

impl Portfolio {
    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    /// The metadata URL without its zero padding.
    ///
    /// Returns `None` if the stored bytes are not UTF-8.
    pub fn metadata_url_str(&self) -> Option<&str> {
        let end = self
            .metadata_url
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(METADATA_URL_LEN);
        std::str::from_utf8(&self.metadata_url[..end]).ok()
    }
}

impl Pack for Portfolio {
    const LEN: usize = 915;
    const NAME: &'static str = "Portfolio";

    fn unpack_from_slice(src: &[u8]) -> Self {
        let src = array_ref![src, 0, 915];
        let (portfolio_account, owner, metadata_url, metadata_hash, is_initialized, slots_src) =
            array_refs![src, 32, 32, METADATA_URL_LEN, 2, 1, SLOT_LEN * PORTFOLIO_SLOTS];

        let mut slots = [AssetSlot::default(); PORTFOLIO_SLOTS];
        for (slot, chunk) in slots.iter_mut().zip(slots_src.chunks_exact(SLOT_LEN)) {
            *slot = AssetSlot::unpack(array_ref![chunk, 0, SLOT_LEN]);
        }

        Portfolio {
            portfolio_account: unpack_key(portfolio_account),
            owner: unpack_key(owner),
            metadata_url: *metadata_url,
            metadata_hash: u16::from_le_bytes(*metadata_hash),
            is_initialized: unpack_bool(is_initialized[0]),
            slots,
        }
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, 915];
        let (portfolio_account, owner, metadata_url, metadata_hash, is_initialized, slots_dst) =
            mut_array_refs![dst, 32, 32, METADATA_URL_LEN, 2, 1, SLOT_LEN * PORTFOLIO_SLOTS];

        portfolio_account.copy_from_slice(self.portfolio_account.as_ref());
        owner.copy_from_slice(self.owner.as_ref());
        *metadata_url = self.metadata_url;
        *metadata_hash = self.metadata_hash.to_le_bytes();
        is_initialized[0] = self.is_initialized as u8;
        for (chunk, slot) in slots_dst.chunks_exact_mut(SLOT_LEN).zip(self.slots.iter()) {
            slot.pack(array_mut_ref![chunk, 0, SLOT_LEN]);
        }
    }
}

/// A user's holding in a portfolio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserPortfolio {
    /// Address of this record; zero until initialized.
    pub user_portfolio_account: Pubkey,
    /// The portfolio template this record follows.
    pub portfolio_address: Pubkey,
    pub owner: Pubkey,
    pub delegate: Option<Pubkey>,
    pub delegated_amount: u64,
    /// The user's token account for each portfolio slot.
    pub asset_accounts: [Pubkey; PORTFOLIO_SLOTS],
}

impl UserPortfolio {
    pub fn is_initialized(&self) -> bool {
        self.user_portfolio_account != Pubkey::default()
    }
}

impl Pack for UserPortfolio {
    const LEN: usize = 425;
    const NAME: &'static str = "UserPortfolio";

    fn unpack_from_slice(src: &[u8]) -> Self {
        let src = array_ref![src, 0, 425];
        let (account, portfolio_address, owner, delegate, delegated_amount, assets) =
            array_refs![src, 32, 32, 32, 33, 8, 32 * PORTFOLIO_SLOTS];

        let mut asset_accounts = [Pubkey::default(); PORTFOLIO_SLOTS];
        for (key, chunk) in asset_accounts.iter_mut().zip(assets.chunks_exact(32)) {
            *key = unpack_key(array_ref![chunk, 0, 32]);
        }

        UserPortfolio {
            user_portfolio_account: unpack_key(account),
            portfolio_address: unpack_key(portfolio_address),
            owner: unpack_key(owner),
            delegate: unpack_option_key(delegate),
            delegated_amount: u64::from_le_bytes(*delegated_amount),
            asset_accounts,
        }
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, 425];
        let (account, portfolio_address, owner, delegate, delegated_amount, assets) =
            mut_array_refs![dst, 32, 32, 32, 33, 8, 32 * PORTFOLIO_SLOTS];

        account.copy_from_slice(self.user_portfolio_account.as_ref());
        portfolio_address.copy_from_slice(self.portfolio_address.as_ref());
        owner.copy_from_slice(self.owner.as_ref());
        pack_option_key(&self.delegate, delegate);
        *delegated_amount = self.delegated_amount.to_le_bytes();
        for (chunk, key) in assets.chunks_exact_mut(32).zip(self.asset_accounts.iter()) {
            chunk.copy_from_slice(key.as_ref());
        }
    }
}

const_assert_eq!(SLOT_LEN, 8 + 32 + 8 + 32);
const_assert_eq!(
    <Portfolio as Pack>::LEN,
    32 + 32 + METADATA_URL_LEN + 2 + 1 + SLOT_LEN * PORTFOLIO_SLOTS
);
const_assert_eq!(
    <UserPortfolio as Pack>::LEN,
    32 * 3 + 33 + 8 + 32 * PORTFOLIO_SLOTS
);
