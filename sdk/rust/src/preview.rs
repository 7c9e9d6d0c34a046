//! Off-chain preview of closure refunds.
//!
//! Runs the same settlement the program runs at closure so clients can show
//! LPs what they will receive before the owner closes the fund.

use crate::SdkError;
use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use tandem_common::settlement::pro_rata;
use tandem_matching_fund::state::MatchingFund;

/// Expected refund for one LP.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundPreview {
    /// LP wallet.
    pub lp: Pubkey,
    /// Cumulative contribution.
    pub contributed: u64,
    /// Refund if the fund closed now.
    pub refund: u64,
}

/// Expected outcome of closing a fund.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosurePreview {
    /// Pool balance that would be distributed.
    pub pool_balance: u64,
    /// One entry per unpaid LP, in contributor order.
    pub refunds: Vec<RefundPreview>,
    /// Balance that would go to the owner because the fund has no LPs.
    pub swept: u64,
}

/// Refunds per `close_fund` call that fit comfortably in a legacy transaction
/// and the default compute budget.
pub const DEFAULT_REFUND_PAGE: usize = 8;

/// Splits `pool_balance` across `(lp, contributed)` pairs.
pub fn preview_closure(
    contributions: &[(Pubkey, u64)],
    pool_balance: u64,
) -> Result<ClosurePreview, SdkError> {
    if contributions.is_empty() {
        return Ok(ClosurePreview {
            pool_balance,
            refunds: Vec::new(),
            swept: pool_balance,
        });
    }
    let weights: Vec<u64> = contributions.iter().map(|(_, amount)| *amount).collect();
    let shares =
        pro_rata(&weights, pool_balance).map_err(|err| SdkError::Settlement(err.to_string()))?;
    Ok(ClosurePreview {
        pool_balance,
        refunds: contributions
            .iter()
            .zip(shares)
            .map(|((lp, contributed), refund)| RefundPreview {
                lp: *lp,
                contributed: *contributed,
                refund,
            })
            .collect(),
        swept: 0,
    })
}

/// Previews closure of a fetched fund account given the vault's current
/// balance. A fund already closing reports its staged, unpaid refunds.
pub fn preview_fund(fund: &MatchingFund, pool_balance: u64) -> Result<ClosurePreview, SdkError> {
    if !fund.is_open() {
        return Ok(ClosurePreview {
            pool_balance,
            refunds: fund
                .unpaid_contributors()
                .iter()
                .map(|entry| RefundPreview {
                    lp: entry.lp,
                    contributed: entry.amount,
                    refund: entry.refund,
                })
                .collect(),
            swept: 0,
        });
    }
    let contributions: Vec<(Pubkey, u64)> = fund
        .contributors
        .iter()
        .map(|entry| (entry.lp, entry.amount))
        .collect();
    preview_closure(&contributions, pool_balance)
}

/// LP wallets still owed a refund, grouped into `close_fund` pages.
pub fn refund_pages(fund: &MatchingFund, page_size: usize) -> Vec<Vec<Pubkey>> {
    fund.unpaid_contributors()
        .chunks(page_size.max(1))
        .map(|page| page.iter().map(|entry| entry.lp).collect())
        .collect()
}

/// Checks that `token_accounts` fits the next `close_fund` page before the
/// instruction is built.
pub fn check_refund_page(fund: &MatchingFund, token_accounts: &[Pubkey]) -> Result<(), SdkError> {
    let unpaid = fund.unpaid_contributors().len();
    let fits = if fund.contributors.is_empty() {
        token_accounts.len() <= 1
    } else {
        !token_accounts.is_empty() && token_accounts.len() <= unpaid
    };
    if !fits {
        return Err(SdkError::RefundPageSize {
            unpaid,
            actual: token_accounts.len(),
        });
    }
    Ok(())
}
