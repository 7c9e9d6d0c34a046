//! LP contributions.

use crate::state::{Contribution, MatchingFund, MAX_CONTRIBUTORS};
use crate::FundError;
use anchor_lang::prelude::*;
use tandem_common::errors::CommonError;
use tandem_common::ledger::TokenLedger;

impl MatchingFund {
    /// Pulls `amount` from `lp` into the pool and credits it to the LP.
    ///
    /// The minimum applies only to a first contribution; later top-ups of any
    /// positive size are accepted. Returns the LP's cumulative contribution.
    pub fn add_funds<L: TokenLedger + ?Sized>(
        &mut self,
        lp: &Pubkey,
        amount: u64,
        ledger: &mut L,
    ) -> Result<u64> {
        self.ensure_open()?;
        require!(amount > 0, FundError::InvalidAmount);

        let existing = self.find_contributor(lp).map(|(idx, entry)| (idx, entry.amount));
        let contributed = match existing {
            Some((_, prior)) => prior
                .checked_add(amount)
                .ok_or(CommonError::ArithmeticOverflow)?,
            None => {
                require_gte!(
                    amount,
                    self.minimum_contribution,
                    FundError::BelowMinimumContribution
                );
                require!(
                    self.contributors.len() < MAX_CONTRIBUTORS,
                    FundError::ContributorCapacityExceeded
                );
                amount
            }
        };
        let total_contributed = self
            .total_contributed
            .checked_add(amount)
            .ok_or(CommonError::ArithmeticOverflow)?;

        let fund = self.vault_authority;
        ledger.transfer_from(&fund, lp, &fund, amount)?;

        match existing {
            Some((idx, _)) => self.contributors[idx].amount = contributed,
            None => self.contributors.push(Contribution {
                lp: *lp,
                amount,
                refund: 0,
            }),
        }
        self.total_contributed = total_contributed;
        Ok(contributed)
    }
}
