//! Authority and access-list helpers for Tandem programs.
//!
//! Mutating admin paths never compare keys directly; they ask an
//! [`Authorizer`]. The fund program uses [`SingleOwner`] bound to the fund's
//! stored authority, and [`MultisigOwners`] is available for funds governed
//! by a signer set.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::pubkey::Pubkey;
use strum::{Display, EnumString};

/// The two independent access lists a matching fund keeps.
#[derive(
    AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, EnumString, Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum WhitelistKind {
    /// Addresses allowed to make matched donations.
    Donor,
    /// Addresses allowed to receive matched donations.
    Recipient,
}

/// Trait for Anchor accounts to declare canonical authority fields.
pub trait HasAuthority {
    /// Returns the authority responsible for admin actions.
    fn authority(&self) -> &Pubkey;
}

/// Capability check consulted before any admin-only state change.
pub trait Authorizer {
    /// Returns true when `caller` may perform admin actions.
    fn is_admin(&self, caller: &Pubkey) -> bool;
}

/// A single designated owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SingleOwner {
    owner: Pubkey,
}

impl SingleOwner {
    /// Creates an authorizer that admits exactly `owner`.
    pub const fn new(owner: Pubkey) -> Self {
        Self { owner }
    }

    /// Binds to the authority declared by an account.
    pub fn of<T: HasAuthority + ?Sized>(account: &T) -> Self {
        Self::new(*account.authority())
    }
}

impl Authorizer for SingleOwner {
    fn is_admin(&self, caller: &Pubkey) -> bool {
        self.owner == *caller
    }
}

/// m-of-n signer set. The caller must be a member and at least `threshold`
/// members must have approved the transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultisigOwners {
    members: Vec<Pubkey>,
    threshold: u8,
    approvals: Vec<Pubkey>,
}

impl MultisigOwners {
    /// Creates a signer set. `approvals` are the members that signed.
    pub fn new(members: Vec<Pubkey>, threshold: u8, approvals: &[Pubkey]) -> Result<Self> {
        require!(
            threshold > 0 && threshold as usize <= members.len(),
            ErrorCode::InvalidMultisigThreshold
        );
        let mut approved: Vec<Pubkey> = approvals
            .iter()
            .filter(|key| members.contains(*key))
            .copied()
            .collect();
        approved.sort_unstable();
        approved.dedup();
        Ok(Self {
            members,
            threshold,
            approvals: approved,
        })
    }

    /// Builds the approval list from the signers among `remaining_accounts`.
    pub fn from_signers(
        members: Vec<Pubkey>,
        threshold: u8,
        remaining_accounts: &[AccountInfo],
    ) -> Result<Self> {
        let signers: Vec<Pubkey> = remaining_accounts
            .iter()
            .filter(|acc| acc.is_signer)
            .map(|acc| *acc.key)
            .collect();
        Self::new(members, threshold, &signers)
    }

    /// Number of distinct member approvals.
    pub fn approval_count(&self) -> usize {
        self.approvals.len()
    }
}

impl Authorizer for MultisigOwners {
    fn is_admin(&self, caller: &Pubkey) -> bool {
        self.members.contains(caller) && self.approvals.len() >= self.threshold as usize
    }
}

/// Error codes emitted by authority helper.
#[error_code]
pub enum ErrorCode {
    /// Threshold is zero or larger than the signer set.
    #[msg("Multisig threshold must be between 1 and the number of members")]
    InvalidMultisigThreshold,
}
