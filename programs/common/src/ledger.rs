//! Token ledger seam.
//!
//! Fund engines never move tokens themselves; they instruct a [`TokenLedger`]
//! with standard debit/credit semantics. On-chain the ledger is backed by SPL
//! token CPIs; host tests use [`MemoryLedger`], which follows ERC-20
//! allowance rules.

use anchor_lang::prelude::*;

/// Fungible-token ledger addressed by wallet/owner keys.
pub trait TokenLedger {
    /// Current balance held by `owner`.
    fn balance_of(&self, owner: &Pubkey) -> Result<u64>;

    /// Moves `amount` out of `from`'s own balance. `from` is the calling party.
    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> Result<()>;

    /// Moves `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance granted by `from` to `spender`.
    fn transfer_from(
        &mut self,
        spender: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> Result<()>;
}

/// Errors raised by the ledger itself. Engines surface them unchanged.
#[error_code]
pub enum LedgerError {
    /// Debited party does not hold enough tokens.
    #[msg("Transfer amount exceeds balance")]
    InsufficientBalance,
    /// Spender was not approved for enough tokens.
    #[msg("Transfer amount exceeds allowance")]
    InsufficientAllowance,
    /// No token account is known for the given owner.
    #[msg("Unknown token account owner")]
    UnknownAccount,
}

#[cfg(not(target_arch = "bpf"))]
pub use memory::MemoryLedger;

#[cfg(not(target_arch = "bpf"))]
mod memory {
    use super::{LedgerError, TokenLedger};
    use anchor_lang::prelude::*;
    use std::collections::BTreeMap;

    /// In-memory reference ledger with ERC-20 balance and allowance rules.
    #[derive(Clone, Debug, Default)]
    pub struct MemoryLedger {
        balances: BTreeMap<Pubkey, u64>,
        allowances: BTreeMap<(Pubkey, Pubkey), u64>,
    }

    impl MemoryLedger {
        /// Creates an empty ledger.
        pub fn new() -> Self {
            Self::default()
        }

        /// Credits freshly minted tokens to `to`.
        pub fn mint(&mut self, to: &Pubkey, amount: u64) {
            let balance = self.balances.entry(*to).or_default();
            *balance = balance.saturating_add(amount);
        }

        /// Sets the allowance `owner` grants to `spender`, replacing any previous value.
        pub fn approve(&mut self, owner: &Pubkey, spender: &Pubkey, amount: u64) {
            self.allowances.insert((*owner, *spender), amount);
        }

        /// Remaining allowance `owner` grants to `spender`.
        pub fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> u64 {
            self.allowances
                .get(&(*owner, *spender))
                .copied()
                .unwrap_or(0)
        }

        /// Sum of all balances.
        pub fn total_supply(&self) -> u128 {
            self.balances.values().map(|b| *b as u128).sum()
        }

        fn balance(&self, owner: &Pubkey) -> u64 {
            self.balances.get(owner).copied().unwrap_or(0)
        }

        fn move_tokens(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> Result<()> {
            let from_balance = self.balance(from);
            require_gte!(from_balance, amount, LedgerError::InsufficientBalance);
            if from == to {
                return Ok(());
            }
            let to_balance = self
                .balance(to)
                .checked_add(amount)
                .ok_or(crate::errors::CommonError::ArithmeticOverflow)?;
            self.balances.insert(*from, from_balance - amount);
            self.balances.insert(*to, to_balance);
            Ok(())
        }
    }

    impl TokenLedger for MemoryLedger {
        fn balance_of(&self, owner: &Pubkey) -> Result<u64> {
            Ok(self.balance(owner))
        }

        fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> Result<()> {
            self.move_tokens(from, to, amount)
        }

        fn transfer_from(
            &mut self,
            spender: &Pubkey,
            from: &Pubkey,
            to: &Pubkey,
            amount: u64,
        ) -> Result<()> {
            let allowance = self.allowance(from, spender);
            require_gte!(allowance, amount, LedgerError::InsufficientAllowance);
            self.move_tokens(from, to, amount)?;
            self.allowances.insert((*from, *spender), allowance - amount);
            Ok(())
        }
    }
}
