#![allow(clippy::result_large_err)]
#![warn(missing_docs)]
//! Tandem matching fund program.
//!
//! LPs pool tokens into a fund vault; whitelisted donors have their donations
//! to whitelisted recipients matched 1:1 from that pool; on closure the
//! remaining balance is refunded to LPs pro-rata to what they contributed.

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};
use tandem_common::authority::{SingleOwner, WhitelistKind};
use tandem_common::events::{
    DonationMatched, FundClosed, FundInitialized, FundsAdded, RefundIssued, WhitelistUpdated,
};
#[cfg(not(target_arch = "bpf"))]
use solana_security_txt::security_txt;

pub mod closure;
pub mod contributions;
pub mod matching;
pub mod spl_ledger;
pub mod state;
pub mod whitelist;

use crate::spl_ledger::SplLedger;
use crate::state::{MatchingFund, MAX_WHITELIST};

#[cfg(not(target_arch = "bpf"))]
security_txt! {
    name: "Tandem Matching Fund",
    project_url: "https://github.com/tandem-fund/tandem",
    contacts: "email:security@tandem.fund",
    policy: "https://github.com/tandem-fund/tandem/security/policy",
    preferred_languages: "en",
    source_code: "https://github.com/tandem-fund/tandem"
}

declare_id!("88Ko2pX24D4eAL4EBAMG8iFJAb9j1Yh75TgozpEXHqsZ");

/// Seed prefix of the fund account.
pub const FUND_SEED: &[u8] = b"fund";
/// Seed prefix of the vault authority PDA.
pub const VAULT_SEED: &[u8] = b"vault";
/// Seed prefix of the vault token account.
pub const VAULT_TOKENS_SEED: &[u8] = b"vault_tokens";

/// Program instructions.
#[program]
pub mod tandem_matching_fund {
    use super::*;

    /// Creates a fund, its vault and the initial whitelists.
    pub fn init_fund(ctx: Context<InitFund>, args: InitFundArgs) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let mut fund = MatchingFund::try_from_args(
            &ctx.accounts.authority.key(),
            &ctx.accounts.mint.key(),
            &ctx.accounts.vault.key(),
            &ctx.accounts.vault_authority.key(),
            &args,
            now,
        )?;
        fund.bump = ctx.bumps.fund;
        fund.vault_bump = ctx.bumps.vault_authority;
        let config_hash = fund.config_hash();
        ctx.accounts.fund.set_inner(fund);

        msg!(
            "fund opened: min={} window={} donors={} recipients={}",
            args.minimum_contribution,
            args.matching_window,
            ctx.accounts.fund.donors.len(),
            ctx.accounts.fund.recipients.len()
        );
        emit!(FundInitialized {
            fund: ctx.accounts.fund.key(),
            authority: ctx.accounts.authority.key(),
            mint: ctx.accounts.mint.key(),
            config_hash,
        });
        Ok(())
    }

    /// Contributes `amount` to the pool on behalf of the signing LP.
    pub fn add_funds(ctx: Context<AddFunds>, amount: u64) -> Result<()> {
        let mut ledger = ctx.accounts.ledger()?;
        let lp = ctx.accounts.lp.key();
        let fund = &mut ctx.accounts.fund;
        let contributed = fund.add_funds(&lp, amount, &mut ledger)?;

        msg!("contribution recorded: lp={} amount={}", lp, amount);
        emit!(FundsAdded {
            fund: fund.key(),
            lp,
            amount,
            contributed,
            total_contributed: fund.total_contributed,
        });
        Ok(())
    }

    /// Donates `amount` to the owner of `recipient_token` and matches it from the pool.
    pub fn donate(ctx: Context<Donate>, amount: u64) -> Result<()> {
        let now = Clock::get()?.unix_timestamp;
        let fund_key = ctx.accounts.fund.key();
        let vault_bump = [ctx.accounts.fund.vault_bump];
        let seeds: &[&[u8]] = &[VAULT_SEED, fund_key.as_ref(), &vault_bump];
        let signer = [seeds];
        let mut ledger = ctx.accounts.ledger(&signer)?;

        let donor = ctx.accounts.donor.key();
        let recipient = ctx.accounts.recipient_token.owner;
        let fund = &mut ctx.accounts.fund;
        let receipt = fund.donate(&donor, &recipient, amount, now, &mut ledger)?;

        msg!(
            "donation matched: donor={} recipient={} amount={} pool_after={}",
            donor,
            recipient,
            amount,
            receipt.pool_after
        );
        emit!(DonationMatched {
            fund: fund_key,
            donor: receipt.donor,
            recipient: receipt.recipient,
            donated: receipt.donated,
            matched: receipt.matched,
            pool_after: receipt.pool_after,
        });
        Ok(())
    }

    /// Allows `address` to request matches.
    pub fn add_donor(ctx: Context<UpdateWhitelist>, address: Pubkey) -> Result<()> {
        ctx.accounts.apply(WhitelistKind::Donor, address, true)
    }

    /// Revokes `address` as a donor.
    pub fn remove_donor(ctx: Context<UpdateWhitelist>, address: Pubkey) -> Result<()> {
        ctx.accounts.apply(WhitelistKind::Donor, address, false)
    }

    /// Allows `address` to receive matched donations.
    pub fn add_recipient(ctx: Context<UpdateWhitelist>, address: Pubkey) -> Result<()> {
        ctx.accounts.apply(WhitelistKind::Recipient, address, true)
    }

    /// Revokes `address` as a recipient.
    pub fn remove_recipient(ctx: Context<UpdateWhitelist>, address: Pubkey) -> Result<()> {
        ctx.accounts.apply(WhitelistKind::Recipient, address, false)
    }

    /// Closes the fund and refunds the pool to LPs pro-rata, one page of
    /// contributors per call.
    ///
    /// Remaining accounts: one token account per contributor, in the order
    /// contributors first joined, starting at the first unpaid refund. A page
    /// may stop short of the last contributor; the fund then stays `Closing`
    /// until a later call pays the rest. A fund without LPs takes the owner's
    /// token account instead, which receives any stray balance.
    pub fn close_fund<'info>(ctx: Context<'_, '_, '_, 'info, CloseFund<'info>>) -> Result<()> {
        let fund_key = ctx.accounts.fund.key();
        let vault_bump = [ctx.accounts.fund.vault_bump];
        let seeds: &[&[u8]] = &[VAULT_SEED, fund_key.as_ref(), &vault_bump];
        let signer = [seeds];

        let fund = &ctx.accounts.fund;
        require!(!fund.is_closed(), FundError::FundClosed);
        let page = ctx.remaining_accounts;
        let mut ledger = SplLedger::new(
            ctx.accounts.token_program.to_account_info(),
            ctx.accounts.vault.to_account_info(),
            ctx.accounts.vault_authority.to_account_info(),
            fund.mint,
        )
        .with_signer(&signer);
        if fund.contributors.is_empty() {
            require!(page.len() <= 1, FundError::ContributorAccountMismatch);
            for account in page.iter() {
                let owner = spl_ledger::token_owner(account)?;
                require_keys_eq!(owner, fund.authority, FundError::ContributorAccountMismatch);
                ledger = ledger.with_holder(account.clone(), None)?;
            }
        } else {
            let unpaid = fund.unpaid_contributors();
            require!(
                !page.is_empty() && page.len() <= unpaid.len(),
                FundError::ContributorAccountMismatch
            );
            for (entry, account) in unpaid.iter().zip(page.iter()) {
                let owner = spl_ledger::token_owner(account)?;
                require_keys_eq!(owner, entry.lp, FundError::ContributorAccountMismatch);
                ledger = ledger.with_holder(account.clone(), None)?;
            }
        }

        let caller = ctx.accounts.authority.key();
        let fund = &mut ctx.accounts.fund;
        let authorizer = SingleOwner::of(&**fund);
        let report = fund.close_page(&caller, &authorizer, &mut ledger, page.len())?;

        for refund in report.refunds.iter() {
            emit!(RefundIssued {
                fund: fund_key,
                lp: refund.lp,
                contributed: refund.contributed,
                amount: refund.amount,
            });
        }
        if report.outstanding > 0 {
            msg!(
                "refund page paid: paid={} outstanding={} cursor={}",
                report.refunds.len(),
                report.outstanding,
                fund.refund_cursor
            );
            return Ok(());
        }
        msg!(
            "fund closed: balance={} refunded={} swept={} contributors={}",
            report.closing_balance,
            fund.total_refunded,
            report.swept,
            fund.contributors.len()
        );
        emit!(FundClosed {
            fund: fund_key,
            closing_balance: report.closing_balance,
            total_refunded: fund.total_refunded,
            contributors: fund.contributors.len() as u32,
        });
        Ok(())
    }
}

/// Fund configuration supplied at initialization.
#[derive(
    AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq, serde::Serialize,
    serde::Deserialize,
)]
pub struct InitFundArgs {
    /// Amount a first contribution must reach to become an LP.
    pub minimum_contribution: u64,
    /// Matching window in seconds from initialization (0 = unbounded).
    pub matching_window: i64,
    /// Initial donor whitelist.
    pub donors: Vec<Pubkey>,
    /// Initial recipient whitelist.
    pub recipients: Vec<Pubkey>,
}

impl InitFundArgs {
    /// Checks bounds that do not depend on chain state.
    pub fn validate(&self) -> Result<()> {
        require!(
            self.matching_window >= 0,
            tandem_common::errors::CommonError::TimestampInvalid
        );
        require!(
            self.donors.len() <= MAX_WHITELIST && self.recipients.len() <= MAX_WHITELIST,
            FundError::WhitelistCapacityExceeded
        );
        Ok(())
    }
}

/// Accounts for [`tandem_matching_fund::init_fund`].
#[derive(Accounts)]
pub struct InitFund<'info> {
    /// Fund owner and rent payer.
    #[account(mut)]
    pub authority: Signer<'info>,
    /// The single asset tracked by the fund.
    pub mint: Account<'info, Mint>,
    /// Fund state.
    #[account(
        init,
        payer = authority,
        space = MatchingFund::SPACE,
        seeds = [FUND_SEED, authority.key().as_ref(), mint.key().as_ref()],
        bump
    )]
    pub fund: Account<'info, MatchingFund>,
    /// CHECK: PDA signer for the vault.
    #[account(seeds = [VAULT_SEED, fund.key().as_ref()], bump)]
    pub vault_authority: UncheckedAccount<'info>,
    /// Pool token account.
    #[account(
        init,
        payer = authority,
        seeds = [VAULT_TOKENS_SEED, fund.key().as_ref()],
        bump,
        token::mint = mint,
        token::authority = vault_authority
    )]
    pub vault: Account<'info, TokenAccount>,
    /// SPL token program.
    pub token_program: Program<'info, Token>,
    /// System program.
    pub system_program: Program<'info, System>,
    /// Rent sysvar.
    pub rent: Sysvar<'info, Rent>,
}

/// Accounts for [`tandem_matching_fund::add_funds`].
#[derive(Accounts)]
pub struct AddFunds<'info> {
    /// Contributing LP.
    pub lp: Signer<'info>,
    /// Fund state.
    #[account(mut, has_one = vault, has_one = vault_authority)]
    pub fund: Account<'info, MatchingFund>,
    /// LP token account debited.
    #[account(mut, token::mint = fund.mint, token::authority = lp)]
    pub lp_token: Account<'info, TokenAccount>,
    /// Pool token account.
    #[account(mut)]
    pub vault: Account<'info, TokenAccount>,
    /// CHECK: PDA signer for the vault.
    #[account(seeds = [VAULT_SEED, fund.key().as_ref()], bump = fund.vault_bump)]
    pub vault_authority: UncheckedAccount<'info>,
    /// SPL token program.
    pub token_program: Program<'info, Token>,
}

impl<'info> AddFunds<'info> {
    fn ledger(&self) -> Result<SplLedger<'static, 'info>> {
        SplLedger::new(
            self.token_program.to_account_info(),
            self.vault.to_account_info(),
            self.vault_authority.to_account_info(),
            self.fund.mint,
        )
        .with_holder(
            self.lp_token.to_account_info(),
            Some(self.lp.to_account_info()),
        )
    }
}

/// Accounts for [`tandem_matching_fund::donate`].
#[derive(Accounts)]
pub struct Donate<'info> {
    /// Whitelisted donor.
    pub donor: Signer<'info>,
    /// Fund state.
    #[account(mut, has_one = vault, has_one = vault_authority)]
    pub fund: Account<'info, MatchingFund>,
    /// Donor token account debited.
    #[account(mut, token::mint = fund.mint, token::authority = donor)]
    pub donor_token: Account<'info, TokenAccount>,
    /// Recipient token account; its owner is the recipient checked against the whitelist.
    #[account(mut, token::mint = fund.mint)]
    pub recipient_token: Account<'info, TokenAccount>,
    /// Pool token account.
    #[account(mut)]
    pub vault: Account<'info, TokenAccount>,
    /// CHECK: PDA signer for the vault.
    #[account(seeds = [VAULT_SEED, fund.key().as_ref()], bump = fund.vault_bump)]
    pub vault_authority: UncheckedAccount<'info>,
    /// SPL token program.
    pub token_program: Program<'info, Token>,
}

impl<'info> Donate<'info> {
    fn ledger<'a>(&self, signer: &'a [&'a [&'a [u8]]]) -> Result<SplLedger<'a, 'info>> {
        SplLedger::new(
            self.token_program.to_account_info(),
            self.vault.to_account_info(),
            self.vault_authority.to_account_info(),
            self.fund.mint,
        )
        .with_signer(signer)
        .with_holder(
            self.donor_token.to_account_info(),
            Some(self.donor.to_account_info()),
        )?
        .with_holder(self.recipient_token.to_account_info(), None)
    }
}

/// Accounts for the whitelist instructions.
#[derive(Accounts)]
pub struct UpdateWhitelist<'info> {
    /// Caller; must be admitted by the fund's authorizer.
    pub authority: Signer<'info>,
    /// Fund state.
    #[account(mut)]
    pub fund: Account<'info, MatchingFund>,
}

impl<'info> UpdateWhitelist<'info> {
    fn apply(&mut self, list: WhitelistKind, address: Pubkey, allowed: bool) -> Result<()> {
        let caller = self.authority.key();
        let fund = &mut self.fund;
        let authorizer = SingleOwner::of(&**fund);
        let changed = match (list, allowed) {
            (WhitelistKind::Donor, true) => fund.add_donor(&caller, &authorizer, address)?,
            (WhitelistKind::Donor, false) => fund.remove_donor(&caller, &authorizer, address)?,
            (WhitelistKind::Recipient, true) => {
                fund.add_recipient(&caller, &authorizer, address)?
            }
            (WhitelistKind::Recipient, false) => {
                fund.remove_recipient(&caller, &authorizer, address)?
            }
        };

        msg!(
            "whitelist {}: {} allowed={} changed={}",
            list,
            address,
            allowed,
            changed
        );
        emit!(WhitelistUpdated {
            fund: fund.key(),
            list,
            address,
            allowed,
            changed,
        });
        Ok(())
    }
}

/// Accounts for [`tandem_matching_fund::close_fund`].
#[derive(Accounts)]
pub struct CloseFund<'info> {
    /// Caller; must be admitted by the fund's authorizer.
    pub authority: Signer<'info>,
    /// Fund state.
    #[account(mut, has_one = vault, has_one = vault_authority)]
    pub fund: Account<'info, MatchingFund>,
    /// Pool token account.
    #[account(mut)]
    pub vault: Account<'info, TokenAccount>,
    /// CHECK: PDA signer for the vault.
    #[account(seeds = [VAULT_SEED, fund.key().as_ref()], bump = fund.vault_bump)]
    pub vault_authority: UncheckedAccount<'info>,
    /// SPL token program.
    pub token_program: Program<'info, Token>,
}

/// Matching fund errors.
#[error_code]
pub enum FundError {
    /// Caller is not admitted by the fund's authorizer.
    #[msg("Caller is not the fund owner")]
    NotOwner,
    /// Fund is closing or closed.
    #[msg("Fund is closed")]
    FundClosed,
    /// First contribution is under the LP threshold.
    #[msg("Donation must be higher to become an LP")]
    BelowMinimumContribution,
    /// Caller is not a whitelisted donor.
    #[msg("You are not allowed to use this matching fund")]
    DonorNotAllowed,
    /// Recipient is not whitelisted.
    #[msg("You are not allowed to donate to this address with this matching fund")]
    RecipientNotAllowed,
    /// Pool cannot cover the full match.
    #[msg("Insufficient funds to match this donation")]
    InsufficientMatchingFunds,
    /// Amount must be positive.
    #[msg("Amount must be greater than zero")]
    InvalidAmount,
    /// Donation arrived after the matching window.
    #[msg("Matching window has elapsed")]
    MatchingWindowElapsed,
    /// Whitelist is full.
    #[msg("Whitelist capacity exceeded")]
    WhitelistCapacityExceeded,
    /// Contributor table is full.
    #[msg("Contributor capacity exceeded")]
    ContributorCapacityExceeded,
    /// Remaining accounts do not line up with the contributor table.
    #[msg("Refund accounts do not match contributors")]
    ContributorAccountMismatch,
    /// Token account has the wrong mint or is not an SPL token account.
    #[msg("Token account does not belong to this fund's mint")]
    TokenAccountMismatch,
    /// The fund's own ledger address cannot be whitelisted.
    #[msg("The fund's own address cannot be whitelisted")]
    FundAddressNotAllowed,
}
