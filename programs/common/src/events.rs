//! Events emitted by the matching fund program.
//!
//! `#[event]` expands to helper items without docs, hence the module-level allow.

#![allow(missing_docs)]

use crate::authority::WhitelistKind;
use anchor_lang::prelude::*;

/// Emitted once when a fund is created.
#[event]
pub struct FundInitialized {
    /// Fund account public key.
    pub fund: Pubkey,
    /// Owner allowed to edit whitelists and close the fund.
    pub authority: Pubkey,
    /// Mint of the single asset the fund tracks.
    pub mint: Pubkey,
    /// Keccak-256 hash of the effective config values.
    pub config_hash: [u8; 32],
}

/// Emitted when a liquidity provider adds capital.
#[event]
pub struct FundsAdded {
    /// Fund account public key.
    pub fund: Pubkey,
    /// Contributing LP wallet.
    pub lp: Pubkey,
    /// Amount added by this call.
    pub amount: u64,
    /// LP's cumulative contribution after this call.
    pub contributed: u64,
    /// Fund-wide cumulative contributions after this call.
    pub total_contributed: u64,
}

/// Emitted when a donation is matched from the pool.
#[event]
pub struct DonationMatched {
    /// Fund account public key.
    pub fund: Pubkey,
    /// Whitelisted donor wallet.
    pub donor: Pubkey,
    /// Whitelisted recipient wallet.
    pub recipient: Pubkey,
    /// Amount paid by the donor.
    pub donated: u64,
    /// Amount paid by the fund.
    pub matched: u64,
    /// Pool balance left after the match.
    pub pool_after: u64,
}

/// Emitted for every whitelist edit, including no-op edits.
#[event]
pub struct WhitelistUpdated {
    /// Fund account public key.
    pub fund: Pubkey,
    /// Which list was edited.
    pub list: WhitelistKind,
    /// Address added or removed.
    pub address: Pubkey,
    /// Membership after the edit.
    pub allowed: bool,
    /// `false` when the edit did not change membership.
    pub changed: bool,
}

/// Emitted for each refund paid during closure.
#[event]
pub struct RefundIssued {
    /// Fund account public key.
    pub fund: Pubkey,
    /// LP wallet receiving the refund.
    pub lp: Pubkey,
    /// LP's cumulative contribution (share weight).
    pub contributed: u64,
    /// Amount refunded.
    pub amount: u64,
}

/// Emitted when closure completes.
#[event]
pub struct FundClosed {
    /// Fund account public key.
    pub fund: Pubkey,
    /// Pool balance at the moment closure was staged.
    pub closing_balance: u64,
    /// Sum of all refunds paid.
    pub total_refunded: u64,
    /// Number of LPs refunded.
    pub contributors: u32,
}
