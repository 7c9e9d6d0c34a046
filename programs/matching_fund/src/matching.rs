//! Matched donations.

use crate::state::MatchingFund;
use crate::FundError;
use anchor_lang::prelude::*;
use tandem_common::errors::CommonError;
use tandem_common::ledger::TokenLedger;
use tandem_common::time::has_elapsed;

/// Outcome of a matched donation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DonationReceipt {
    /// Donating wallet.
    pub donor: Pubkey,
    /// Receiving wallet.
    pub recipient: Pubkey,
    /// Amount moved from the donor.
    pub donated: u64,
    /// Amount moved from the pool.
    pub matched: u64,
    /// Pool balance after the match.
    pub pool_after: u64,
}

impl MatchingFund {
    /// Moves `amount` from `donor` to `recipient` and matches it 1:1 from the pool.
    ///
    /// Matching is all-or-nothing: if the pool holds less than `amount` the
    /// donation is refused. Every check runs before any token moves.
    pub fn donate<L: TokenLedger + ?Sized>(
        &mut self,
        donor: &Pubkey,
        recipient: &Pubkey,
        amount: u64,
        now: i64,
        ledger: &mut L,
    ) -> Result<DonationReceipt> {
        self.ensure_open()?;
        require!(amount > 0, FundError::InvalidAmount);
        require!(self.is_donor_allowed(donor), FundError::DonorNotAllowed);
        require!(
            self.is_recipient_allowed(recipient),
            FundError::RecipientNotAllowed
        );
        // A match paid back into the pool would count as matched while the
        // pool grows.
        require_keys_neq!(*donor, self.vault_authority, FundError::DonorNotAllowed);
        require_keys_neq!(
            *recipient,
            self.vault_authority,
            FundError::RecipientNotAllowed
        );
        require!(
            !has_elapsed(now, self.matching_deadline()?),
            FundError::MatchingWindowElapsed
        );

        let pool = self.pool_balance(ledger)?;
        require_gte!(pool, amount, FundError::InsufficientMatchingFunds);
        let pool_after = pool
            .checked_sub(amount)
            .ok_or(CommonError::ArithmeticOverflow)?;
        let total_matched = self
            .total_matched
            .checked_add(amount)
            .ok_or(CommonError::ArithmeticOverflow)?;

        let fund = self.vault_authority;
        ledger.transfer_from(&fund, donor, recipient, amount)?;
        ledger.transfer(&fund, recipient, amount)?;
        self.total_matched = total_matched;

        Ok(DonationReceipt {
            donor: *donor,
            recipient: *recipient,
            donated: amount,
            matched: amount,
            pool_after,
        })
    }
}
