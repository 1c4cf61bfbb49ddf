//! Portfolio templates and user positions.

use log::info;
use sol_wire::{system, AccountFetcher, Keypair, Pubkey, Signature, TransactionSender};
use token_instruction::{portfolio, DepositAccounts};
use token_state::{AssetSlot, Pack, Portfolio, UserPortfolio, PORTFOLIO_SLOTS};

use crate::authority::Authority;
use crate::config::{ClientConfig, ProgramIds};
use crate::error::ClientError;
use crate::ledger::{fetch_record, send_authorized, send_transaction};

pub struct PortfolioClient<'a, R> {
    rpc: &'a R,
    program_ids: ProgramIds,
    payer: &'a Keypair,
}

impl<'a, R> PortfolioClient<'a, R>
where
    R: TransactionSender + AccountFetcher,
{
    pub fn new(rpc: &'a R, config: &ClientConfig, payer: &'a Keypair) -> Self {
        Self {
            rpc,
            program_ids: config.program_ids(),
            payer,
        }
    }

    /// Address of the portfolio `owner` publishes under `metadata_hash`.
    pub fn portfolio_address(&self, owner: &Pubkey, metadata_hash: u16) -> Result<Pubkey, ClientError> {
        let (address, _bump) =
            portfolio::find_portfolio_address(&self.program_ids.token, owner, metadata_hash)?;
        Ok(address)
    }

    /// Publish a portfolio template owned by `owner`.
    ///
    /// The program allocates the account from the payer and initializes it
    /// in the same instruction, so a failed call leaves nothing behind. An
    /// owner has one portfolio per metadata hash.
    pub fn create_portfolio(
        &self,
        owner: &Keypair,
        metadata_url: &[u8],
        metadata_hash: u16,
        slots: &[AssetSlot; PORTFOLIO_SLOTS],
    ) -> Result<Pubkey, ClientError> {
        let address = self.portfolio_address(&owner.pubkey(), metadata_hash)?;
        let initialize = portfolio::initialize_portfolio(
            &self.program_ids.token,
            &self.payer.pubkey(),
            &address,
            &owner.pubkey(),
            metadata_url,
            metadata_hash,
            slots,
        )?;
        send_transaction(self.rpc, &[initialize], self.payer, &[self.payer, owner])?;

        info!("created portfolio {address} for {}", owner.pubkey());
        Ok(address)
    }

    /// Open a user position against `portfolio`. The delegate is recorded
    /// only when `delegated_amount` is non-zero.
    #[allow(clippy::too_many_arguments)]
    pub fn create_user_portfolio(
        &self,
        owner: &Keypair,
        portfolio: &Pubkey,
        delegate: &Pubkey,
        asset_accounts: &[Pubkey; PORTFOLIO_SLOTS],
        delegated_amount: u64,
        values: [u64; PORTFOLIO_SLOTS],
    ) -> Result<Pubkey, ClientError> {
        let account = Keypair::new();
        let initialize = portfolio::initialize_user_portfolio(
            &self.program_ids.token,
            &account.pubkey(),
            portfolio,
            &owner.pubkey(),
            delegate,
            asset_accounts,
            delegated_amount,
            values,
        )?;

        let lamports = self
            .rpc
            .get_minimum_balance_for_rent_exemption(UserPortfolio::LEN)?;
        let create = system::create_account(
            &self.payer.pubkey(),
            &account.pubkey(),
            lamports,
            UserPortfolio::LEN as u64,
            &self.program_ids.token,
        );
        send_transaction(
            self.rpc,
            &[create, initialize],
            self.payer,
            &[self.payer, &account, owner],
        )?;

        info!(
            "created user portfolio {} on {portfolio} for {}",
            account.pubkey(),
            owner.pubkey()
        );
        Ok(account.pubkey())
    }

    pub fn get_portfolio_info(&self, address: &Pubkey) -> Result<Portfolio, ClientError> {
        fetch_record(self.rpc, &self.program_ids.token, address)
    }

    pub fn get_user_portfolio_info(&self, address: &Pubkey) -> Result<UserPortfolio, ClientError> {
        fetch_record(self.rpc, &self.program_ids.token, address)
    }

    /// Swap `amount` into the hedged asset through the configured pool.
    pub fn deposit(
        &self,
        owner: &Keypair,
        accounts: &DepositAccounts,
        amount: u64,
        volatility: u64,
        nonce: u8,
    ) -> Result<Signature, ClientError> {
        let ix = portfolio::deposit(&self.program_ids.token, accounts, amount, volatility, nonce)?;
        send_transaction(self.rpc, &[ix], self.payer, &[self.payer, owner])
    }

    /// Burn `amount` tokens from `account` together with their share of
    /// its backing.
    pub fn withdraw(
        &self,
        account: &Pubkey,
        owner: &Authority<'_>,
        amount: u64,
    ) -> Result<Signature, ClientError> {
        let program = self.program_ids.token;
        send_authorized(self.rpc, self.payer, owner, |owner, signers| {
            portfolio::withdraw(&program, account, owner, signers, amount)
        })
    }
}
