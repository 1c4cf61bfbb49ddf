//! A handle on one mint.
//!
//! Every write is a single transaction paid for by the handle's payer and
//! confirmed before the call returns. Failures from the ledger come back as
//! [`ClientError::Remote`] and are never retried.

use log::{info, warn};
use sol_wire::{
    system, AccountFetcher, Instruction, Keypair, Pubkey, Signature, TransactionSender,
};
use token_instruction::{
    create_associated_token_account, derive_associated_token_address, token, ArgumentError,
    AuthorityType,
};
use token_state::{Account, Mint, Multisig, Pack};

use crate::authority::Authority;
use crate::config::{ClientConfig, ProgramIds};
use crate::error::ClientError;
use crate::ledger::{fetch_record, send_authorized, send_transaction};

pub struct Token<'a, R> {
    rpc: &'a R,
    program_ids: ProgramIds,
    mint: Pubkey,
    payer: &'a Keypair,
}

impl<'a, R> Token<'a, R>
where
    R: TransactionSender + AccountFetcher,
{
    /// Wrap an existing mint.
    pub fn new(rpc: &'a R, config: &ClientConfig, mint: Pubkey, payer: &'a Keypair) -> Self {
        Self {
            rpc,
            program_ids: config.program_ids(),
            mint,
            payer,
        }
    }

    /// Create and initialize a new mint in one transaction.
    pub fn create_mint(
        rpc: &'a R,
        config: &ClientConfig,
        payer: &'a Keypair,
        mint_authority: &Pubkey,
        freeze_authority: Option<&Pubkey>,
        decimals: u8,
    ) -> Result<Self, ClientError> {
        Self::create_hedged_mint(
            rpc,
            config,
            payer,
            mint_authority,
            freeze_authority,
            decimals,
            None,
            None,
        )
    }

    /// Like [`Token::create_mint`], linking the mint to a hedged asset and
    /// the pool that rebalances it.
    #[allow(clippy::too_many_arguments)]
    pub fn create_hedged_mint(
        rpc: &'a R,
        config: &ClientConfig,
        payer: &'a Keypair,
        mint_authority: &Pubkey,
        freeze_authority: Option<&Pubkey>,
        decimals: u8,
        hedged_asset_mint: Option<&Pubkey>,
        swap_pool: Option<&Pubkey>,
    ) -> Result<Self, ClientError> {
        let program_ids = config.program_ids();
        let mint = Keypair::new();

        let initialize = token::initialize_hedged_mint(
            &program_ids.token,
            &mint.pubkey(),
            mint_authority,
            freeze_authority,
            decimals,
            hedged_asset_mint,
            swap_pool,
        )?;
        let lamports = rpc.get_minimum_balance_for_rent_exemption(Mint::LEN)?;
        let create = system::create_account(
            &payer.pubkey(),
            &mint.pubkey(),
            lamports,
            Mint::LEN as u64,
            &program_ids.token,
        );

        send_transaction(rpc, &[create, initialize], payer, &[payer, &mint])?;
        info!("created mint {} with {decimals} decimals", mint.pubkey());

        Ok(Self {
            rpc,
            program_ids,
            mint: mint.pubkey(),
            payer,
        })
    }

    pub fn mint(&self) -> &Pubkey {
        &self.mint
    }

    pub fn program_ids(&self) -> &ProgramIds {
        &self.program_ids
    }

    // -----------------------------------------------------------------------
    // Accounts
    // -----------------------------------------------------------------------

    /// Create a token account for `owner` at a fresh address.
    pub fn create_account(&self, owner: &Pubkey) -> Result<Pubkey, ClientError> {
        let account = Keypair::new();
        let initialize =
            token::initialize_account(&self.program_ids.token, &account.pubkey(), &self.mint, owner)?;
        let lamports = self
            .rpc
            .get_minimum_balance_for_rent_exemption(Account::LEN)?;
        let create = system::create_account(
            &self.payer.pubkey(),
            &account.pubkey(),
            lamports,
            Account::LEN as u64,
            &self.program_ids.token,
        );

        send_transaction(
            self.rpc,
            &[create, initialize],
            self.payer,
            &[self.payer, &account],
        )?;
        info!("created token account {} for {owner}", account.pubkey());
        Ok(account.pubkey())
    }

    /// The associated token account address of `owner` for this mint.
    pub fn associated_token_address(&self, owner: &Pubkey) -> Result<Pubkey, ClientError> {
        Ok(derive_associated_token_address(
            &self.program_ids.associated_token,
            &self.program_ids.token,
            &self.mint,
            owner,
        )?)
    }

    /// Create the associated token account of `owner`. Fails if it exists.
    pub fn create_associated_token_account(&self, owner: &Pubkey) -> Result<Pubkey, ClientError> {
        let address = self.associated_token_address(owner)?;
        let ix = create_associated_token_account(
            &self.program_ids.associated_token,
            &self.program_ids.token,
            &self.payer.pubkey(),
            owner,
            &self.mint,
        )?;
        send_transaction(self.rpc, &[ix], self.payer, &[self.payer])?;
        info!("created associated token account {address} for {owner}");
        Ok(address)
    }

    /// Read the associated token account of `owner`, creating it first if
    /// it does not exist yet. When creation fails and the account is still
    /// missing, the creation error is returned.
    pub fn get_or_create_associated_account_info(
        &self,
        owner: &Pubkey,
    ) -> Result<Account, ClientError> {
        let address = self.associated_token_address(owner)?;
        match self.get_account_info(&address) {
            Err(ClientError::AccountNotFound(_)) => {}
            found => return found,
        }

        if let Err(create_err) = self.create_associated_token_account(owner) {
            // Another client may have created it in the meantime.
            return match self.get_account_info(&address) {
                Err(ClientError::AccountNotFound(_)) => Err(create_err),
                found => {
                    warn!("creating associated token account {address} failed: {create_err}");
                    found
                }
            };
        }
        self.get_account_info(&address)
    }

    /// Create an m-of-n multisig account.
    pub fn create_multisig(&self, m: u8, signers: &[&Pubkey]) -> Result<Pubkey, ClientError> {
        let multisig = Keypair::new();
        let initialize =
            token::initialize_multisig(&self.program_ids.token, &multisig.pubkey(), signers, m)?;
        let lamports = self
            .rpc
            .get_minimum_balance_for_rent_exemption(Multisig::LEN)?;
        let create = system::create_account(
            &self.payer.pubkey(),
            &multisig.pubkey(),
            lamports,
            Multisig::LEN as u64,
            &self.program_ids.token,
        );

        send_transaction(
            self.rpc,
            &[create, initialize],
            self.payer,
            &[self.payer, &multisig],
        )?;
        info!(
            "created {m}-of-{} multisig {}",
            signers.len(),
            multisig.pubkey()
        );
        Ok(multisig.pubkey())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn get_mint_info(&self) -> Result<Mint, ClientError> {
        fetch_record(self.rpc, &self.program_ids.token, &self.mint)
    }

    /// Read a token account; it must belong to this handle's mint.
    pub fn get_account_info(&self, address: &Pubkey) -> Result<Account, ClientError> {
        let account: Account = fetch_record(self.rpc, &self.program_ids.token, address)?;
        if account.mint != self.mint {
            return Err(ClientError::MintMismatch {
                address: *address,
                expected: self.mint,
                actual: account.mint,
            });
        }
        Ok(account)
    }

    pub fn get_multisig_info(&self, address: &Pubkey) -> Result<Multisig, ClientError> {
        fetch_record(self.rpc, &self.program_ids.token, address)
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    fn authorized<F>(&self, authority: &Authority<'_>, build: F) -> Result<Signature, ClientError>
    where
        F: FnOnce(&Pubkey, &[&Pubkey]) -> Result<Instruction, ArgumentError>,
    {
        send_authorized(self.rpc, self.payer, authority, build)
    }

    pub fn transfer(
        &self,
        source: &Pubkey,
        destination: &Pubkey,
        authority: &Authority<'_>,
        amount: u64,
    ) -> Result<Signature, ClientError> {
        let program = self.program_ids.token;
        self.authorized(authority, |owner, signers| {
            token::transfer(&program, source, destination, owner, signers, amount)
        })
    }

    pub fn transfer_checked(
        &self,
        source: &Pubkey,
        destination: &Pubkey,
        authority: &Authority<'_>,
        amount: u64,
        decimals: u8,
    ) -> Result<Signature, ClientError> {
        let program = self.program_ids.token;
        let mint = self.mint;
        self.authorized(authority, |owner, signers| {
            token::transfer_checked(
                &program,
                source,
                &mint,
                destination,
                owner,
                signers,
                amount,
                decimals,
            )
        })
    }

    /// Let `delegate` move up to `amount` tokens out of `account`.
    pub fn approve(
        &self,
        account: &Pubkey,
        delegate: &Pubkey,
        owner: &Authority<'_>,
        amount: u64,
    ) -> Result<Signature, ClientError> {
        let program = self.program_ids.token;
        self.authorized(owner, |owner, signers| {
            token::approve(&program, account, delegate, owner, signers, amount)
        })
    }

    pub fn approve_checked(
        &self,
        account: &Pubkey,
        delegate: &Pubkey,
        owner: &Authority<'_>,
        amount: u64,
        decimals: u8,
    ) -> Result<Signature, ClientError> {
        let program = self.program_ids.token;
        let mint = self.mint;
        self.authorized(owner, |owner, signers| {
            token::approve_checked(
                &program, account, &mint, delegate, owner, signers, amount, decimals,
            )
        })
    }

    pub fn revoke(&self, account: &Pubkey, owner: &Authority<'_>) -> Result<Signature, ClientError> {
        let program = self.program_ids.token;
        self.authorized(owner, |owner, signers| {
            token::revoke(&program, account, owner, signers)
        })
    }

    /// Replace one authority of `account`, which is either this mint or one
    /// of its token accounts. `None` removes the authority for good.
    pub fn set_authority(
        &self,
        account: &Pubkey,
        new_authority: Option<&Pubkey>,
        authority_type: AuthorityType,
        current: &Authority<'_>,
    ) -> Result<Signature, ClientError> {
        let program = self.program_ids.token;
        self.authorized(current, |owner, signers| {
            token::set_authority(&program, account, new_authority, authority_type, owner, signers)
        })
    }

    pub fn mint_to(
        &self,
        destination: &Pubkey,
        authority: &Authority<'_>,
        amount: u64,
    ) -> Result<Signature, ClientError> {
        let program = self.program_ids.token;
        let mint = self.mint;
        self.authorized(authority, |owner, signers| {
            token::mint_to(&program, &mint, destination, owner, signers, amount)
        })
    }

    pub fn mint_to_checked(
        &self,
        destination: &Pubkey,
        authority: &Authority<'_>,
        amount: u64,
        decimals: u8,
    ) -> Result<Signature, ClientError> {
        let program = self.program_ids.token;
        let mint = self.mint;
        self.authorized(authority, |owner, signers| {
            token::mint_to_checked(&program, &mint, destination, owner, signers, amount, decimals)
        })
    }

    pub fn burn(
        &self,
        account: &Pubkey,
        owner: &Authority<'_>,
        amount: u64,
    ) -> Result<Signature, ClientError> {
        let program = self.program_ids.token;
        let mint = self.mint;
        self.authorized(owner, |owner, signers| {
            token::burn(&program, account, &mint, owner, signers, amount)
        })
    }

    pub fn burn_checked(
        &self,
        account: &Pubkey,
        owner: &Authority<'_>,
        amount: u64,
        decimals: u8,
    ) -> Result<Signature, ClientError> {
        let program = self.program_ids.token;
        let mint = self.mint;
        self.authorized(owner, |owner, signers| {
            token::burn_checked(&program, account, &mint, owner, signers, amount, decimals)
        })
    }

    /// Close an empty account and send its lamports to `destination`.
    pub fn close_account(
        &self,
        account: &Pubkey,
        destination: &Pubkey,
        authority: &Authority<'_>,
    ) -> Result<Signature, ClientError> {
        let program = self.program_ids.token;
        self.authorized(authority, |owner, signers| {
            token::close_account(&program, account, destination, owner, signers)
        })
    }

    pub fn freeze_account(
        &self,
        account: &Pubkey,
        authority: &Authority<'_>,
    ) -> Result<Signature, ClientError> {
        let program = self.program_ids.token;
        let mint = self.mint;
        self.authorized(authority, |owner, signers| {
            token::freeze_account(&program, account, &mint, owner, signers)
        })
    }

    pub fn thaw_account(
        &self,
        account: &Pubkey,
        authority: &Authority<'_>,
    ) -> Result<Signature, ClientError> {
        let program = self.program_ids.token;
        let mint = self.mint;
        self.authorized(authority, |owner, signers| {
            token::thaw_account(&program, account, &mint, owner, signers)
        })
    }
}
