//! End-to-end token flows: every call builds, signs and confirms a real
//! transaction against the in-process ledger.

mod common;

use assert_matches::assert_matches;
use common::{funded_keypair, lamports, setup};
use sol_wire::{InstructionError, Keypair, Pubkey, RpcError};
use token_client::{Authority, ClientError, Token};
use token_instruction::{AuthorityType, TokenError};
use token_state::{Account, AccountState, Pack};

// ─── Mint and transfer ─────────────────────────────────────────────

#[test]
fn mint_then_transfer() {
    let env = setup();
    let authority = Keypair::new();
    let alice = Keypair::new();
    let bob = Keypair::new();

    let token = Token::create_mint(
        &env.ledger,
        &env.config,
        &env.payer,
        &authority.pubkey(),
        None,
        9,
    )
    .unwrap();

    let mint = token.get_mint_info().unwrap();
    assert!(mint.is_initialized);
    assert_eq!(mint.decimals, 9);
    assert_eq!(mint.supply, 0);
    assert_eq!(mint.mint_authority, Some(authority.pubkey()));

    let alice_account = token.create_account(&alice.pubkey()).unwrap();
    let bob_account = token.create_account(&bob.pubkey()).unwrap();

    token
        .mint_to(&alice_account, &Authority::from(&authority), 1000)
        .unwrap();
    token
        .transfer(&alice_account, &bob_account, &Authority::from(&alice), 100)
        .unwrap();

    assert_eq!(token.get_account_info(&alice_account).unwrap().amount, 900);
    let bob_info = token.get_account_info(&bob_account).unwrap();
    assert_eq!(bob_info.amount, 100);
    assert_eq!(bob_info.owner, bob.pubkey());
    assert_eq!(bob_info.state, AccountState::Initialized);
    assert_eq!(token.get_mint_info().unwrap().supply, 1000);
}

#[test]
fn transfer_requires_owner_signature() {
    let env = setup();
    let authority = Keypair::new();
    let alice = Keypair::new();
    let mallory = Keypair::new();

    let token = Token::create_mint(
        &env.ledger,
        &env.config,
        &env.payer,
        &authority.pubkey(),
        None,
        0,
    )
    .unwrap();
    let source = token.create_account(&alice.pubkey()).unwrap();
    let dest = token.create_account(&mallory.pubkey()).unwrap();
    token.mint_to(&source, &Authority::from(&authority), 10).unwrap();

    let err = token
        .transfer(&source, &dest, &Authority::from(&mallory), 5)
        .unwrap_err();
    assert_eq!(err.token_error(), Some(TokenError::OwnerMismatch));
    assert_eq!(token.get_account_info(&source).unwrap().amount, 10);
}

#[test]
fn checked_transfer_rejects_wrong_decimals() {
    let env = setup();
    let authority = Keypair::new();
    let alice = Keypair::new();

    let token = Token::create_mint(
        &env.ledger,
        &env.config,
        &env.payer,
        &authority.pubkey(),
        None,
        6,
    )
    .unwrap();
    let source = token.create_account(&alice.pubkey()).unwrap();
    let dest = token.create_account(&alice.pubkey()).unwrap();
    token
        .mint_to_checked(&source, &Authority::from(&authority), 50, 6)
        .unwrap();

    let err = token
        .transfer_checked(&source, &dest, &Authority::from(&alice), 10, 9)
        .unwrap_err();
    assert_eq!(err.token_error(), Some(TokenError::MintDecimalsMismatch));

    token
        .transfer_checked(&source, &dest, &Authority::from(&alice), 10, 6)
        .unwrap();
    assert_eq!(token.get_account_info(&dest).unwrap().amount, 10);
}

#[test]
fn burn_reduces_supply() {
    let env = setup();
    let authority = Keypair::new();
    let alice = Keypair::new();

    let token = Token::create_mint(
        &env.ledger,
        &env.config,
        &env.payer,
        &authority.pubkey(),
        None,
        2,
    )
    .unwrap();
    let account = token.create_account(&alice.pubkey()).unwrap();
    token.mint_to(&account, &Authority::from(&authority), 500).unwrap();

    token.burn(&account, &Authority::from(&alice), 200).unwrap();
    token
        .burn_checked(&account, &Authority::from(&alice), 50, 2)
        .unwrap();

    assert_eq!(token.get_account_info(&account).unwrap().amount, 250);
    assert_eq!(token.get_mint_info().unwrap().supply, 250);
}

// ─── Delegation ────────────────────────────────────────────────────

#[test]
fn delegate_allowance_runs_out() {
    let env = setup();
    let authority = Keypair::new();
    let alice = Keypair::new();
    let delegate = Keypair::new();

    let token = Token::create_mint(
        &env.ledger,
        &env.config,
        &env.payer,
        &authority.pubkey(),
        None,
        0,
    )
    .unwrap();
    let source = token.create_account(&alice.pubkey()).unwrap();
    let dest = token.create_account(&delegate.pubkey()).unwrap();
    token.mint_to(&source, &Authority::from(&authority), 10).unwrap();

    token
        .approve(&source, &delegate.pubkey(), &Authority::from(&alice), 2)
        .unwrap();
    let info = token.get_account_info(&source).unwrap();
    assert_eq!(info.delegate, Some(delegate.pubkey()));
    assert_eq!(info.delegated_amount, 2);

    token
        .transfer(&source, &dest, &Authority::from(&delegate), 1)
        .unwrap();
    assert_eq!(token.get_account_info(&source).unwrap().delegated_amount, 1);

    token
        .transfer(&source, &dest, &Authority::from(&delegate), 1)
        .unwrap();
    let info = token.get_account_info(&source).unwrap();
    assert_eq!(info.delegate, None);
    assert_eq!(info.delegated_amount, 0);

    let err = token
        .transfer(&source, &dest, &Authority::from(&delegate), 1)
        .unwrap_err();
    assert_eq!(err.token_error(), Some(TokenError::OwnerMismatch));
    assert_eq!(token.get_account_info(&source).unwrap().amount, 8);
}

#[test]
fn revoke_clears_delegate() {
    let env = setup();
    let authority = Keypair::new();
    let alice = Keypair::new();
    let delegate = Keypair::new();

    let token = Token::create_mint(
        &env.ledger,
        &env.config,
        &env.payer,
        &authority.pubkey(),
        None,
        3,
    )
    .unwrap();
    let account = token.create_account(&alice.pubkey()).unwrap();
    token
        .approve_checked(&account, &delegate.pubkey(), &Authority::from(&alice), 5, 3)
        .unwrap();
    token.revoke(&account, &Authority::from(&alice)).unwrap();

    let info = token.get_account_info(&account).unwrap();
    assert_eq!(info.delegate, None);
    assert_eq!(info.delegated_amount, 0);
}

// ─── Freeze and authorities ────────────────────────────────────────

#[test]
fn frozen_account_cannot_move_tokens() {
    let env = setup();
    let authority = Keypair::new();
    let freezer = Keypair::new();
    let alice = Keypair::new();

    let token = Token::create_mint(
        &env.ledger,
        &env.config,
        &env.payer,
        &authority.pubkey(),
        Some(&freezer.pubkey()),
        0,
    )
    .unwrap();
    let source = token.create_account(&alice.pubkey()).unwrap();
    let dest = token.create_account(&alice.pubkey()).unwrap();
    token.mint_to(&source, &Authority::from(&authority), 10).unwrap();

    token.freeze_account(&source, &Authority::from(&freezer)).unwrap();
    assert_eq!(
        token.get_account_info(&source).unwrap().state,
        AccountState::Frozen
    );

    let err = token
        .transfer(&source, &dest, &Authority::from(&alice), 1)
        .unwrap_err();
    assert_eq!(err.token_error(), Some(TokenError::AccountFrozen));

    let err = token
        .freeze_account(&source, &Authority::from(&freezer))
        .unwrap_err();
    assert_eq!(err.token_error(), Some(TokenError::InvalidState));

    token.thaw_account(&source, &Authority::from(&freezer)).unwrap();
    token
        .transfer(&source, &dest, &Authority::from(&alice), 1)
        .unwrap();
    assert_eq!(token.get_account_info(&dest).unwrap().amount, 1);
}

#[test]
fn freeze_without_freeze_authority_fails() {
    let env = setup();
    let authority = Keypair::new();
    let alice = Keypair::new();

    let token = Token::create_mint(
        &env.ledger,
        &env.config,
        &env.payer,
        &authority.pubkey(),
        None,
        0,
    )
    .unwrap();
    let account = token.create_account(&alice.pubkey()).unwrap();

    let err = token
        .freeze_account(&account, &Authority::from(&authority))
        .unwrap_err();
    assert_eq!(err.token_error(), Some(TokenError::MintCannotFreeze));
}

#[test]
fn removed_mint_authority_fixes_supply() {
    let env = setup();
    let authority = Keypair::new();
    let alice = Keypair::new();

    let token = Token::create_mint(
        &env.ledger,
        &env.config,
        &env.payer,
        &authority.pubkey(),
        None,
        0,
    )
    .unwrap();
    let account = token.create_account(&alice.pubkey()).unwrap();
    let mint = *token.mint();

    token
        .set_authority(
            &mint,
            None,
            AuthorityType::MintTokens,
            &Authority::from(&authority),
        )
        .unwrap();
    assert_eq!(token.get_mint_info().unwrap().mint_authority, None);

    let err = token
        .mint_to(&account, &Authority::from(&authority), 1)
        .unwrap_err();
    assert_eq!(err.token_error(), Some(TokenError::FixedSupply));
}

#[test]
fn account_owner_can_be_reassigned() {
    let env = setup();
    let authority = Keypair::new();
    let alice = Keypair::new();
    let bob = Keypair::new();

    let token = Token::create_mint(
        &env.ledger,
        &env.config,
        &env.payer,
        &authority.pubkey(),
        None,
        0,
    )
    .unwrap();
    let account = token.create_account(&alice.pubkey()).unwrap();

    token
        .set_authority(
            &account,
            Some(&bob.pubkey()),
            AuthorityType::AccountOwner,
            &Authority::from(&alice),
        )
        .unwrap();
    assert_eq!(token.get_account_info(&account).unwrap().owner, bob.pubkey());
}

// ─── Multisig ──────────────────────────────────────────────────────

#[test]
fn multisig_owner_transfers_with_quorum() {
    let env = setup();
    let authority = Keypair::new();
    let (a, b, c) = (Keypair::new(), Keypair::new(), Keypair::new());
    let bob = Keypair::new();

    let token = Token::create_mint(
        &env.ledger,
        &env.config,
        &env.payer,
        &authority.pubkey(),
        None,
        0,
    )
    .unwrap();
    let multisig = token
        .create_multisig(2, &[&a.pubkey(), &b.pubkey(), &c.pubkey()])
        .unwrap();

    let info = token.get_multisig_info(&multisig).unwrap();
    assert!(info.is_initialized);
    assert_eq!((info.m, info.n), (2, 3));
    assert_eq!(info.signers[..3], [a.pubkey(), b.pubkey(), c.pubkey()]);

    let source = token.create_account(&multisig).unwrap();
    let dest = token.create_account(&bob.pubkey()).unwrap();
    token.mint_to(&source, &Authority::from(&authority), 20).unwrap();

    let one = [&a];
    let err = token
        .transfer(
            &source,
            &dest,
            &Authority::Multisig {
                multisig,
                signers: &one,
            },
            5,
        )
        .unwrap_err();
    assert_matches!(
        err,
        ClientError::Remote(RpcError::Instruction {
            error: InstructionError::MissingRequiredSignature,
            ..
        })
    );

    let quorum = [&a, &c];
    token
        .transfer(
            &source,
            &dest,
            &Authority::Multisig {
                multisig,
                signers: &quorum,
            },
            5,
        )
        .unwrap();
    assert_eq!(token.get_account_info(&dest).unwrap().amount, 5);
}

// ─── Associated accounts ───────────────────────────────────────────

#[test]
fn associated_account_is_created_once() {
    let env = setup();
    let authority = Keypair::new();
    let alice = Keypair::new();

    let token = Token::create_mint(
        &env.ledger,
        &env.config,
        &env.payer,
        &authority.pubkey(),
        None,
        0,
    )
    .unwrap();

    let address = token.create_associated_token_account(&alice.pubkey()).unwrap();
    assert_eq!(address, token.associated_token_address(&alice.pubkey()).unwrap());
    let info = token.get_account_info(&address).unwrap();
    assert_eq!(info.owner, alice.pubkey());
    assert_eq!(info.mint, *token.mint());

    let err = token
        .create_associated_token_account(&alice.pubkey())
        .unwrap_err();
    assert_matches!(
        err,
        ClientError::Remote(RpcError::Instruction {
            index: 0,
            error: InstructionError::AccountAlreadyInUse,
        })
    );
}

#[test]
fn get_or_create_associated_account() {
    let env = setup();
    let authority = Keypair::new();
    let alice = Keypair::new();

    let token = Token::create_mint(
        &env.ledger,
        &env.config,
        &env.payer,
        &authority.pubkey(),
        None,
        0,
    )
    .unwrap();

    let created = token
        .get_or_create_associated_account_info(&alice.pubkey())
        .unwrap();
    assert_eq!(created.owner, alice.pubkey());

    let address = token.associated_token_address(&alice.pubkey()).unwrap();
    token.mint_to(&address, &Authority::from(&authority), 7).unwrap();

    let existing = token
        .get_or_create_associated_account_info(&alice.pubkey())
        .unwrap();
    assert_eq!(existing.amount, 7);
}

#[test]
fn get_or_create_reports_the_failed_creation() {
    let env = setup();
    let authority = Keypair::new();
    let alice = Keypair::new();

    let funded = Token::create_mint(
        &env.ledger,
        &env.config,
        &env.payer,
        &authority.pubkey(),
        None,
        0,
    )
    .unwrap();
    // Enough for the fee, not for the account's rent.
    let poor_payer = funded_keypair(&env.ledger, 10_000);
    let token = Token::new(&env.ledger, &env.config, *funded.mint(), &poor_payer);

    let err = token
        .get_or_create_associated_account_info(&alice.pubkey())
        .unwrap_err();
    assert_matches!(
        err,
        ClientError::Remote(RpcError::Instruction {
            index: 0,
            error: InstructionError::InsufficientFunds,
        })
    );

    let address = token.associated_token_address(&alice.pubkey()).unwrap();
    assert_eq!(lamports(&env.ledger, &address), 0);
}

// ─── Closing ───────────────────────────────────────────────────────

#[test]
fn close_returns_rent_to_destination() {
    let env = setup();
    let authority = Keypair::new();
    let alice = Keypair::new();
    let refund = Pubkey::new_unique();

    let token = Token::create_mint(
        &env.ledger,
        &env.config,
        &env.payer,
        &authority.pubkey(),
        None,
        0,
    )
    .unwrap();
    let account = token.create_account(&alice.pubkey()).unwrap();
    let rent = lamports(&env.ledger, &account);
    assert!(rent > 0);

    token.mint_to(&account, &Authority::from(&authority), 1).unwrap();
    let err = token
        .close_account(&account, &refund, &Authority::from(&alice))
        .unwrap_err();
    assert_eq!(err.token_error(), Some(TokenError::NonNativeHasBalance));

    token.burn(&account, &Authority::from(&alice), 1).unwrap();
    token
        .close_account(&account, &refund, &Authority::from(&alice))
        .unwrap();

    assert_eq!(lamports(&env.ledger, &refund), rent);
    assert_matches!(
        token.get_account_info(&account),
        Err(ClientError::AccountNotFound(_))
    );
}

// ─── Reads ─────────────────────────────────────────────────────────

#[test]
fn account_reads_are_validated() {
    let env = setup();
    let authority = Keypair::new();
    let alice = Keypair::new();

    let token = Token::create_mint(
        &env.ledger,
        &env.config,
        &env.payer,
        &authority.pubkey(),
        None,
        0,
    )
    .unwrap();
    let other = Token::create_mint(
        &env.ledger,
        &env.config,
        &env.payer,
        &authority.pubkey(),
        None,
        0,
    )
    .unwrap();
    let foreign = other.create_account(&alice.pubkey()).unwrap();

    assert_matches!(
        token.get_account_info(&Pubkey::new_unique()),
        Err(ClientError::AccountNotFound(_))
    );
    assert_matches!(
        token.get_account_info(&env.payer.pubkey()),
        Err(ClientError::InvalidAccountOwner { .. })
    );
    assert_matches!(
        token.get_account_info(token.mint()),
        Err(ClientError::InvalidAccountSize { expected, .. }) if expected == Account::LEN
    );
    assert_matches!(
        token.get_account_info(&foreign),
        Err(ClientError::MintMismatch { actual, .. }) if actual == *other.mint()
    );
}

#[test]
fn hedged_mint_records_links() {
    let env = setup();
    let authority = Keypair::new();
    let hedged = Pubkey::new_unique();
    let pool = Pubkey::new_unique();

    let token = Token::create_hedged_mint(
        &env.ledger,
        &env.config,
        &env.payer,
        &authority.pubkey(),
        None,
        6,
        Some(&hedged),
        Some(&pool),
    )
    .unwrap();

    let mint = token.get_mint_info().unwrap();
    assert_eq!(mint.hedged_asset_mint, Some(hedged));
    assert_eq!(mint.swap_pool, Some(pool));
}

#[test]
fn too_many_signers_fail_before_sending() {
    let env = setup();
    let authority = Keypair::new();

    let token = Token::create_mint(
        &env.ledger,
        &env.config,
        &env.payer,
        &authority.pubkey(),
        None,
        0,
    )
    .unwrap();
    let keys: Vec<Pubkey> = (0..12).map(|_| Pubkey::new_unique()).collect();
    let refs: Vec<&Pubkey> = keys.iter().collect();

    assert_matches!(
        token.create_multisig(2, &refs),
        Err(ClientError::Argument(_))
    );
}
