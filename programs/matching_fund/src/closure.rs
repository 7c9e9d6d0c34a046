//! Fund closure and pro-rata settlement.
//!
//! Closure runs in two phases. Staging captures the pool balance and stores
//! every LP's refund, moving the fund to `Closing`. Payment then transfers
//! refunds in contributor order, one page at a time, advancing the refund
//! cursor after each transfer. The fund stays `Closing` between pages and
//! after a failed transfer; a later call pays only what is outstanding. Once
//! the cursor passes the last LP the fund is `Closed`.
//!
//! A fund with no LPs has nobody to refund. Any balance that reached its
//! vault anyway is swept to the owner.

use crate::state::{FundStatus, MatchingFund};
use crate::FundError;
use anchor_lang::prelude::*;
use tandem_common::authority::Authorizer;
use tandem_common::errors::CommonError;
use tandem_common::ledger::TokenLedger;
use tandem_common::settlement::pro_rata;

/// One refund paid during closure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Refund {
    /// LP wallet.
    pub lp: Pubkey,
    /// LP's cumulative contribution.
    pub contributed: u64,
    /// Amount returned.
    pub amount: u64,
}

/// Result of one closure call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClosureReport {
    /// Pool balance captured when refunds were staged.
    pub closing_balance: u64,
    /// Refunds paid by this call, in contributor order.
    pub refunds: Vec<Refund>,
    /// Balance sent to the owner because the fund had no LPs.
    pub swept: u64,
    /// Refunds still unpaid after this call.
    pub outstanding: usize,
}

impl MatchingFund {
    /// Closes the fund and refunds the pool to LPs in proportion to their
    /// contributions.
    pub fn close<L: TokenLedger + ?Sized>(
        &mut self,
        caller: &Pubkey,
        authorizer: &dyn Authorizer,
        ledger: &mut L,
    ) -> Result<ClosureReport> {
        self.close_page(caller, authorizer, ledger, usize::MAX)
    }

    /// Like [`MatchingFund::close`] but pays at most `page_size` refunds.
    /// The fund is `Closed` only when the last refund has been paid.
    pub fn close_page<L: TokenLedger + ?Sized>(
        &mut self,
        caller: &Pubkey,
        authorizer: &dyn Authorizer,
        ledger: &mut L,
        page_size: usize,
    ) -> Result<ClosureReport> {
        require!(!self.is_closed(), FundError::FundClosed);
        require!(authorizer.is_admin(caller), FundError::NotOwner);

        if self.status == FundStatus::Open {
            self.stage_refunds(ledger)?;
        }

        let fund = self.vault_authority;
        let mut swept = 0;
        if self.contributors.is_empty() && self.closing_balance > 0 {
            ledger.transfer(&fund, &self.authority, self.closing_balance)?;
            swept = self.closing_balance;
        }

        let mut refunds = Vec::new();
        for _ in 0..page_size {
            let Some(entry) = self.unpaid_contributors().first().copied() else {
                break;
            };
            ledger.transfer(&fund, &entry.lp, entry.refund)?;
            self.refund_cursor = self
                .refund_cursor
                .checked_add(1)
                .ok_or(CommonError::ArithmeticOverflow)?;
            self.total_refunded = self
                .total_refunded
                .checked_add(entry.refund)
                .ok_or(CommonError::ArithmeticOverflow)?;
            refunds.push(Refund {
                lp: entry.lp,
                contributed: entry.amount,
                amount: entry.refund,
            });
        }

        let outstanding = self.unpaid_contributors().len();
        if outstanding == 0 {
            self.status = FundStatus::Closed;
        }
        Ok(ClosureReport {
            closing_balance: self.closing_balance,
            refunds,
            swept,
            outstanding,
        })
    }

    fn stage_refunds<L: TokenLedger + ?Sized>(&mut self, ledger: &L) -> Result<()> {
        let remaining = self.pool_balance(ledger)?;
        if !self.contributors.is_empty() {
            let weights: Vec<u64> = self.contributors.iter().map(|c| c.amount).collect();
            let shares = pro_rata(&weights, remaining)?;
            for (entry, share) in self.contributors.iter_mut().zip(shares) {
                entry.refund = share;
            }
        }
        self.refund_cursor = 0;
        self.closing_balance = remaining;
        self.status = FundStatus::Closing;
        Ok(())
    }
}

#[cfg(all(test, not(target_arch = "bpf")))]
mod tests {
    use super::*;
    use crate::state::{AddressSet, MAX_WHITELIST};
    use tandem_common::authority::SingleOwner;
    use tandem_common::ledger::{LedgerError, MemoryLedger};
    use tandem_common::testing::error_name;

    /// Fails the n-th outgoing `transfer`, once.
    struct FlakyLedger {
        inner: MemoryLedger,
        fail_on: Option<usize>,
        calls: usize,
    }

    impl TokenLedger for FlakyLedger {
        fn balance_of(&self, owner: &Pubkey) -> Result<u64> {
            self.inner.balance_of(owner)
        }

        fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> Result<()> {
            let call = self.calls;
            self.calls += 1;
            if self.fail_on == Some(call) {
                self.fail_on = None;
                return err!(LedgerError::InsufficientBalance);
            }
            self.inner.transfer(from, to, amount)
        }

        fn transfer_from(
            &mut self,
            spender: &Pubkey,
            from: &Pubkey,
            to: &Pubkey,
            amount: u64,
        ) -> Result<()> {
            self.inner.transfer_from(spender, from, to, amount)
        }
    }

    struct Fixture {
        fund: MatchingFund,
        ledger: MemoryLedger,
        owner: Pubkey,
        lps: Vec<Pubkey>,
    }

    /// Four LPs contribute 400/100/200/300, then `used` units are matched out.
    fn funded(used: u64) -> Fixture {
        let owner = Pubkey::new_unique();
        let donor = Pubkey::new_unique();
        let recipient = Pubkey::new_unique();
        let mut fund = MatchingFund {
            authority: owner,
            vault_authority: Pubkey::new_unique(),
            minimum_contribution: 1,
            donors: AddressSet::from_slice(&[donor], MAX_WHITELIST).unwrap(),
            recipients: AddressSet::from_slice(&[recipient], MAX_WHITELIST).unwrap(),
            ..MatchingFund::default()
        };
        let mut ledger = MemoryLedger::new();
        let mut lps = Vec::new();
        for amount in [400u64, 100, 200, 300] {
            let lp = Pubkey::new_unique();
            ledger.mint(&lp, 1_000);
            ledger.approve(&lp, &fund.vault_authority, amount);
            fund.add_funds(&lp, amount, &mut ledger).unwrap();
            lps.push(lp);
        }
        if used > 0 {
            ledger.mint(&donor, used);
            ledger.approve(&donor, &fund.vault_authority, used);
            fund.donate(&donor, &recipient, used, 0, &mut ledger).unwrap();
        }
        Fixture {
            fund,
            ledger,
            owner,
            lps,
        }
    }

    #[test]
    fn refunds_scale_with_utilisation() {
        let Fixture {
            mut fund,
            mut ledger,
            owner,
            lps,
        } = funded(100);
        let auth = SingleOwner::of(&fund);
        let report = fund.close(&owner, &auth, &mut ledger).unwrap();

        assert_eq!(report.closing_balance, 900);
        let paid: Vec<u64> = report.refunds.iter().map(|r| r.amount).collect();
        assert_eq!(paid, vec![360, 90, 180, 270]);
        let balances: Vec<u64> = lps
            .iter()
            .map(|lp| ledger.balance_of(lp).unwrap())
            .collect();
        assert_eq!(balances, vec![960, 990, 980, 970]);
        assert_eq!(fund.pool_balance(&ledger).unwrap(), 0);
        assert_eq!(fund.total_refunded, 900);
        assert_eq!(fund.tracked_pool_balance().unwrap(), 0);
        assert!(fund.is_closed());
    }

    #[test]
    fn untouched_pool_returns_every_contribution() {
        let Fixture {
            mut fund,
            mut ledger,
            owner,
            lps,
        } = funded(0);
        let auth = SingleOwner::of(&fund);
        fund.close(&owner, &auth, &mut ledger).unwrap();
        for lp in &lps {
            assert_eq!(ledger.balance_of(lp).unwrap(), 1_000);
        }
    }

    #[test]
    fn uneven_split_leaves_no_dust() {
        let Fixture {
            mut fund,
            mut ledger,
            owner,
            ..
        } = funded(1);
        let auth = SingleOwner::of(&fund);
        let report = fund.close(&owner, &auth, &mut ledger).unwrap();
        // 999 over {400,100,200,300}: floors 399/99/199/299, remainders
        // .6/.9/.8/.7, so the three leftover units skip the first LP.
        let paid: Vec<u64> = report.refunds.iter().map(|r| r.amount).collect();
        assert_eq!(paid.iter().sum::<u64>(), 999);
        assert_eq!(paid, vec![399, 100, 200, 300]);
        assert_eq!(fund.pool_balance(&ledger).unwrap(), 0);
    }

    #[test]
    fn only_owner_may_close() {
        let Fixture {
            mut fund,
            mut ledger,
            ..
        } = funded(0);
        let auth = SingleOwner::of(&fund);
        let err = fund
            .close(&Pubkey::new_unique(), &auth, &mut ledger)
            .unwrap_err();
        assert_eq!(error_name(&err), "NotOwner");
        assert!(fund.is_open());
        assert_eq!(fund.pool_balance(&ledger).unwrap(), 1_000);
    }

    #[test]
    fn second_close_fails_for_every_caller() {
        let Fixture {
            mut fund,
            mut ledger,
            owner,
            ..
        } = funded(0);
        let auth = SingleOwner::of(&fund);
        fund.close(&owner, &auth, &mut ledger).unwrap();
        for caller in [owner, Pubkey::new_unique()] {
            let err = fund.close(&caller, &auth, &mut ledger).unwrap_err();
            assert_eq!(error_name(&err), "FundClosed");
        }
    }

    #[test]
    fn failed_refund_resumes_on_retry() {
        let Fixture {
            mut fund,
            ledger,
            owner,
            lps,
        } = funded(100);
        let auth = SingleOwner::of(&fund);
        let mut flaky = FlakyLedger {
            inner: ledger,
            fail_on: Some(2),
            calls: 0,
        };

        let err = fund.close(&owner, &auth, &mut flaky).unwrap_err();
        assert_eq!(error_name(&err), "InsufficientBalance");
        assert_eq!(fund.status, FundStatus::Closing);
        assert_eq!(fund.total_refunded, 450);
        assert_eq!(fund.refund_cursor, 2);
        assert_eq!(fund.unpaid_contributors().len(), 2);

        // Closing rejects new activity.
        let err = fund.add_funds(&lps[0], 10, &mut flaky).unwrap_err();
        assert_eq!(error_name(&err), "FundClosed");

        let report = fund.close(&owner, &auth, &mut flaky).unwrap();
        assert_eq!(report.closing_balance, 900);
        let resumed: Vec<Pubkey> = report.refunds.iter().map(|r| r.lp).collect();
        assert_eq!(resumed, vec![lps[2], lps[3]]);
        assert_eq!(fund.total_refunded, 900);
        assert!(fund.is_closed());
        assert_eq!(flaky.inner.balance_of(&fund.vault_authority).unwrap(), 0);
    }

    #[test]
    fn empty_fund_closes_cleanly() {
        let owner = Pubkey::new_unique();
        let mut fund = MatchingFund {
            authority: owner,
            vault_authority: Pubkey::new_unique(),
            ..MatchingFund::default()
        };
        let mut ledger = MemoryLedger::new();
        let auth = SingleOwner::of(&fund);
        let report = fund.close(&owner, &auth, &mut ledger).unwrap();
        assert!(report.refunds.is_empty());
        assert!(fund.is_closed());
    }

    #[test]
    fn stray_balance_without_lps_goes_to_owner() {
        let owner = Pubkey::new_unique();
        let mut fund = MatchingFund {
            authority: owner,
            vault_authority: Pubkey::new_unique(),
            ..MatchingFund::default()
        };
        let mut ledger = MemoryLedger::new();
        ledger.mint(&fund.vault_authority, 5);
        let auth = SingleOwner::of(&fund);
        let report = fund.close(&owner, &auth, &mut ledger).unwrap();
        assert_eq!(report.swept, 5);
        assert_eq!(report.closing_balance, 5);
        assert!(report.refunds.is_empty());
        assert_eq!(ledger.balance_of(&owner).unwrap(), 5);
        assert_eq!(fund.pool_balance(&ledger).unwrap(), 0);
        assert_eq!(fund.total_refunded, 0);
        assert!(fund.is_closed());
    }

    #[test]
    fn refunds_are_paid_page_by_page() {
        let Fixture {
            mut fund,
            mut ledger,
            owner,
            lps,
        } = funded(100);
        let auth = SingleOwner::of(&fund);

        let first = fund.close_page(&owner, &auth, &mut ledger, 3).unwrap();
        let paid: Vec<Pubkey> = first.refunds.iter().map(|r| r.lp).collect();
        assert_eq!(paid, lps[..3].to_vec());
        assert_eq!(first.outstanding, 1);
        assert_eq!(fund.status, FundStatus::Closing);
        assert_eq!(fund.pool_balance(&ledger).unwrap(), 270);

        // Staged shares are not recomputed from the smaller pool.
        let second = fund.close_page(&owner, &auth, &mut ledger, 3).unwrap();
        assert_eq!(second.closing_balance, 900);
        assert_eq!(second.refunds.len(), 1);
        assert_eq!(second.refunds[0].amount, 270);
        assert_eq!(second.outstanding, 0);
        assert!(fund.is_closed());
        assert_eq!(ledger.balance_of(&lps[3]).unwrap(), 970);
    }

    #[test]
    fn empty_page_only_stages() {
        let Fixture {
            mut fund,
            mut ledger,
            owner,
            ..
        } = funded(0);
        let auth = SingleOwner::of(&fund);
        let report = fund.close_page(&owner, &auth, &mut ledger, 0).unwrap();
        assert!(report.refunds.is_empty());
        assert_eq!(report.outstanding, 4);
        assert_eq!(fund.status, FundStatus::Closing);
        assert_eq!(fund.contributors[0].refund, 400);
    }
}
