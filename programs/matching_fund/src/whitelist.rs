//! Donor and recipient access lists.
//!
//! Edits are idempotent: adding a member or removing a non-member succeeds
//! and reports `false`. A closed (or closing) fund rejects edits before the
//! caller is checked, so every caller sees `FundClosed`. The fund's own
//! ledger address can never be listed.

use crate::state::{AddressSet, MatchingFund, MAX_WHITELIST};
use crate::FundError;
use anchor_lang::prelude::*;
use tandem_common::authority::{Authorizer, WhitelistKind};

impl MatchingFund {
    /// True when `address` may request matches.
    pub fn is_donor_allowed(&self, address: &Pubkey) -> bool {
        self.donors.contains(address)
    }

    /// True when `address` may receive matched donations.
    pub fn is_recipient_allowed(&self, address: &Pubkey) -> bool {
        self.recipients.contains(address)
    }

    /// Adds a donor. Returns whether membership changed.
    pub fn add_donor(
        &mut self,
        caller: &Pubkey,
        authorizer: &dyn Authorizer,
        address: Pubkey,
    ) -> Result<bool> {
        self.edit_whitelist(caller, authorizer, WhitelistKind::Donor, address, true)
    }

    /// Removes a donor. Returns whether membership changed.
    pub fn remove_donor(
        &mut self,
        caller: &Pubkey,
        authorizer: &dyn Authorizer,
        address: Pubkey,
    ) -> Result<bool> {
        self.edit_whitelist(caller, authorizer, WhitelistKind::Donor, address, false)
    }

    /// Adds a recipient. Returns whether membership changed.
    pub fn add_recipient(
        &mut self,
        caller: &Pubkey,
        authorizer: &dyn Authorizer,
        address: Pubkey,
    ) -> Result<bool> {
        self.edit_whitelist(caller, authorizer, WhitelistKind::Recipient, address, true)
    }

    /// Removes a recipient. Returns whether membership changed.
    pub fn remove_recipient(
        &mut self,
        caller: &Pubkey,
        authorizer: &dyn Authorizer,
        address: Pubkey,
    ) -> Result<bool> {
        self.edit_whitelist(caller, authorizer, WhitelistKind::Recipient, address, false)
    }

    fn whitelist_mut(&mut self, list: WhitelistKind) -> &mut AddressSet {
        match list {
            WhitelistKind::Donor => &mut self.donors,
            WhitelistKind::Recipient => &mut self.recipients,
        }
    }

    fn edit_whitelist(
        &mut self,
        caller: &Pubkey,
        authorizer: &dyn Authorizer,
        list: WhitelistKind,
        address: Pubkey,
        allowed: bool,
    ) -> Result<bool> {
        self.ensure_open()?;
        require!(authorizer.is_admin(caller), FundError::NotOwner);
        if allowed {
            require_keys_neq!(
                address,
                self.vault_authority,
                FundError::FundAddressNotAllowed
            );
        }
        let set = self.whitelist_mut(list);
        if allowed {
            set.insert(address, MAX_WHITELIST)
        } else {
            Ok(set.remove(&address))
        }
    }
}
