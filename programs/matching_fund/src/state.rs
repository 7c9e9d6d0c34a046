//! State definitions for the matching fund program.

use super::{FundError, InitFundArgs};
use anchor_lang::prelude::*;
use anchor_lang::solana_program::keccak;
use tandem_common::authority::HasAuthority;
use tandem_common::errors::CommonError;
use tandem_common::ledger::TokenLedger;

/// Maximum number of addresses per whitelist.
pub const MAX_WHITELIST: usize = 32;
/// Maximum number of distinct LPs a fund tracks.
pub const MAX_CONTRIBUTORS: usize = 32;

/// Fund lifecycle. Transitions only move forward.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum FundStatus {
    /// Accepting contributions and matching donations.
    #[default]
    Open,
    /// Refunds staged; some transfers may still be outstanding.
    Closing,
    /// All refunds paid. Terminal.
    Closed,
}

/// Sorted, duplicate-free set of addresses.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct AddressSet {
    members: Vec<Pubkey>,
}

impl AddressSet {
    /// Serialized size of a set holding at most `capacity` addresses.
    pub const fn space(capacity: usize) -> usize {
        4 + 32 * capacity
    }

    /// Builds a set from arbitrary input, dropping duplicates.
    pub fn from_slice(addresses: &[Pubkey], capacity: usize) -> Result<Self> {
        let mut members = addresses.to_vec();
        members.sort_unstable();
        members.dedup();
        require!(
            members.len() <= capacity,
            FundError::WhitelistCapacityExceeded
        );
        Ok(Self { members })
    }

    /// Membership test.
    pub fn contains(&self, address: &Pubkey) -> bool {
        self.members.binary_search(address).is_ok()
    }

    /// Adds `address`; returns `false` if it was already present.
    pub fn insert(&mut self, address: Pubkey, capacity: usize) -> Result<bool> {
        match self.members.binary_search(&address) {
            Ok(_) => Ok(false),
            Err(pos) => {
                require!(
                    self.members.len() < capacity,
                    FundError::WhitelistCapacityExceeded
                );
                self.members.insert(pos, address);
                Ok(true)
            }
        }
    }

    /// Removes `address`; returns `false` if it was absent.
    pub fn remove(&mut self, address: &Pubkey) -> bool {
        match self.members.binary_search(address) {
            Ok(pos) => {
                self.members.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when the set has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = &Pubkey> {
        self.members.iter()
    }
}

/// One LP's position in the fund.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Contribution {
    /// LP wallet.
    pub lp: Pubkey,
    /// Cumulative amount contributed. Never decreases.
    pub amount: u64,
    /// Refund staged at closure (0 while open).
    pub refund: u64,
}

impl Contribution {
    /// Serialized size of one entry.
    pub const LEN: usize = 32 + 8 + 8;
}

/// The fund aggregate. Every operation reads and writes only this account
/// plus the token ledger.
#[account]
#[derive(Debug, Default)]
pub struct MatchingFund {
    /// Owner consulted for whitelist edits and closure.
    pub authority: Pubkey,
    /// Mint of the single tracked asset.
    pub mint: Pubkey,
    /// Fund token account holding the pool.
    pub vault: Pubkey,
    /// PDA owning `vault`; the fund's address on the token ledger.
    pub vault_authority: Pubkey,
    /// Threshold a first contribution must meet to become an LP.
    pub minimum_contribution: u64,
    /// Seconds after `opened_at` during which donations are matched (0 = no limit).
    pub matching_window: i64,
    /// Unix timestamp of initialization.
    pub opened_at: i64,
    /// Lifecycle state.
    pub status: FundStatus,
    /// Sum of all LP contributions.
    pub total_contributed: u64,
    /// Sum of all amounts paid out as matches.
    pub total_matched: u64,
    /// Sum of all refunds paid at closure.
    pub total_refunded: u64,
    /// Pool balance captured when closure was staged.
    pub closing_balance: u64,
    /// Donors allowed to request matches.
    pub donors: AddressSet,
    /// Recipients allowed to receive matched donations.
    pub recipients: AddressSet,
    /// LPs in first-contribution order.
    pub contributors: Vec<Contribution>,
    /// Index of the first contributor whose refund is unpaid. Entries before
    /// it are settled.
    pub refund_cursor: u32,
    /// Fund PDA bump.
    pub bump: u8,
    /// Vault authority PDA bump.
    pub vault_bump: u8,
}

impl MatchingFund {
    /// Account space including discriminator.
    pub const SPACE: usize = 8
        + 32 * 4
        + 8
        + 8
        + 8
        + 1
        + 8 * 4
        + AddressSet::space(MAX_WHITELIST) * 2
        + 4
        + Contribution::LEN * MAX_CONTRIBUTORS
        + 4
        + 1
        + 1;

    /// Creates a fund from init arguments.
    pub fn try_from_args(
        authority: &Pubkey,
        mint: &Pubkey,
        vault: &Pubkey,
        vault_authority: &Pubkey,
        args: &InitFundArgs,
        now: i64,
    ) -> Result<Self> {
        args.validate()?;
        // Reject windows whose deadline would not fit.
        tandem_common::time::deadline(now, args.matching_window)?;
        require!(
            !args.donors.contains(vault_authority) && !args.recipients.contains(vault_authority),
            FundError::FundAddressNotAllowed
        );
        Ok(Self {
            authority: *authority,
            mint: *mint,
            vault: *vault,
            vault_authority: *vault_authority,
            minimum_contribution: args.minimum_contribution,
            matching_window: args.matching_window,
            opened_at: now,
            status: FundStatus::Open,
            total_contributed: 0,
            total_matched: 0,
            total_refunded: 0,
            closing_balance: 0,
            donors: AddressSet::from_slice(&args.donors, MAX_WHITELIST)?,
            recipients: AddressSet::from_slice(&args.recipients, MAX_WHITELIST)?,
            contributors: Vec::new(),
            refund_cursor: 0,
            bump: 0,
            vault_bump: 0,
        })
    }

    /// True while contributions and donations are accepted.
    pub fn is_open(&self) -> bool {
        self.status == FundStatus::Open
    }

    /// True once every refund has been paid.
    pub fn is_closed(&self) -> bool {
        self.status == FundStatus::Closed
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        require!(self.is_open(), FundError::FundClosed);
        Ok(())
    }

    /// Number of LPs.
    pub fn contributor_count(&self) -> usize {
        self.contributors.len()
    }

    /// Cumulative contribution of `lp` (0 if it never contributed).
    pub fn contribution_of(&self, lp: &Pubkey) -> u64 {
        self.find_contributor(lp)
            .map(|(_, entry)| entry.amount)
            .unwrap_or(0)
    }

    pub(crate) fn find_contributor(&self, lp: &Pubkey) -> Option<(usize, &Contribution)> {
        self.contributors
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.lp == *lp)
    }

    /// Contributors still owed a refund, starting at the refund cursor. While
    /// the fund is open this is every contributor.
    pub fn unpaid_contributors(&self) -> &[Contribution] {
        self.contributors
            .get(self.refund_cursor as usize..)
            .unwrap_or(&[])
    }

    /// Pool balance as reported by the token ledger.
    pub fn pool_balance<L: TokenLedger + ?Sized>(&self, ledger: &L) -> Result<u64> {
        ledger.balance_of(&self.vault_authority)
    }

    /// Pool balance implied by the fund's own accounting.
    pub fn tracked_pool_balance(&self) -> Result<u64> {
        self.total_contributed
            .checked_sub(self.total_matched)
            .and_then(|v| v.checked_sub(self.total_refunded))
            .ok_or_else(|| CommonError::ArithmeticOverflow.into())
    }

    /// Last timestamp at which donations are matched, if bounded.
    pub fn matching_deadline(&self) -> Result<Option<i64>> {
        tandem_common::time::deadline(self.opened_at, self.matching_window)
    }

    /// Computes configuration hash for audit logging.
    pub fn config_hash(&self) -> [u8; 32] {
        let mut data = Vec::with_capacity(128 + 32 * (self.donors.len() + self.recipients.len()));
        data.extend_from_slice(self.authority.as_ref());
        data.extend_from_slice(self.mint.as_ref());
        data.extend_from_slice(self.vault.as_ref());
        data.extend_from_slice(&self.minimum_contribution.to_le_bytes());
        data.extend_from_slice(&self.matching_window.to_le_bytes());
        data.extend_from_slice(&self.opened_at.to_le_bytes());
        for donor in self.donors.iter() {
            data.extend_from_slice(donor.as_ref());
        }
        for recipient in self.recipients.iter() {
            data.extend_from_slice(recipient.as_ref());
        }
        keccak::hash(&data).to_bytes()
    }
}

impl HasAuthority for MatchingFund {
    fn authority(&self) -> &Pubkey {
        &self.authority
    }
}
