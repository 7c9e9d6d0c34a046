//! [`TokenLedger`] backed by SPL token CPIs.
//!
//! Ledger addresses are wallet keys. The fund's address is its vault
//! authority PDA; every other party is registered as a holder with the token
//! account that represents it. A holder that signed the transaction may be
//! debited by `transfer_from`, which is how an SPL transfer expresses the
//! allowance the fund spends.

use crate::FundError;
use anchor_lang::error::ErrorCode;
use anchor_lang::prelude::*;
use anchor_spl::token::{self, TokenAccount, Transfer};
use tandem_common::ledger::{LedgerError, TokenLedger};

struct Holder<'info> {
    owner: Pubkey,
    token_account: AccountInfo<'info>,
    signer: Option<AccountInfo<'info>>,
}

/// CPI ledger for one fund vault.
pub struct SplLedger<'a, 'info> {
    token_program: AccountInfo<'info>,
    vault: AccountInfo<'info>,
    vault_authority: AccountInfo<'info>,
    mint: Pubkey,
    vault_signer: &'a [&'a [&'a [u8]]],
    holders: Vec<Holder<'info>>,
}

/// Reads an SPL token account, rejecting anything the token program does not own.
pub fn unpack_token_account(account: &AccountInfo) -> Result<TokenAccount> {
    require_keys_eq!(*account.owner, token::ID, FundError::TokenAccountMismatch);
    let data = account.try_borrow_data()?;
    TokenAccount::try_deserialize(&mut &data[..])
}

/// Wallet that owns an SPL token account.
pub fn token_owner(account: &AccountInfo) -> Result<Pubkey> {
    Ok(unpack_token_account(account)?.owner)
}

impl<'a, 'info> SplLedger<'a, 'info> {
    /// Ledger over `vault`, addressed as `vault_authority`.
    pub fn new(
        token_program: AccountInfo<'info>,
        vault: AccountInfo<'info>,
        vault_authority: AccountInfo<'info>,
        mint: Pubkey,
    ) -> Self {
        Self {
            token_program,
            vault,
            vault_authority,
            mint,
            vault_signer: &[],
            holders: Vec::new(),
        }
    }

    /// PDA seeds for debiting the vault.
    pub fn with_signer(mut self, vault_signer: &'a [&'a [&'a [u8]]]) -> Self {
        self.vault_signer = vault_signer;
        self
    }

    /// Registers a token account under its owner's address. `signer` is the
    /// owner's account info when the owner signed and may be debited.
    pub fn with_holder(
        mut self,
        token_account: AccountInfo<'info>,
        signer: Option<AccountInfo<'info>>,
    ) -> Result<Self> {
        let state = unpack_token_account(&token_account)?;
        require_keys_eq!(state.mint, self.mint, FundError::TokenAccountMismatch);
        if let Some(signer) = signer.as_ref() {
            require!(signer.is_signer, ErrorCode::AccountNotSigner);
            require_keys_eq!(*signer.key, state.owner, FundError::TokenAccountMismatch);
        }
        self.holders.push(Holder {
            owner: state.owner,
            token_account,
            signer,
        });
        Ok(self)
    }

    fn holder(&self, owner: &Pubkey) -> Result<&Holder<'info>> {
        self.holders
            .iter()
            .find(|h| h.owner == *owner)
            .ok_or_else(|| LedgerError::UnknownAccount.into())
    }

    fn token_account_of(&self, owner: &Pubkey) -> Result<AccountInfo<'info>> {
        if *owner == self.vault_authority.key() {
            return Ok(self.vault.clone());
        }
        Ok(self.holder(owner)?.token_account.clone())
    }

    fn cpi_transfer(
        &self,
        from: AccountInfo<'info>,
        to: AccountInfo<'info>,
        authority: AccountInfo<'info>,
        amount: u64,
        signed: bool,
    ) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let accounts = Transfer {
            from,
            to,
            authority,
        };
        let cpi_ctx = if signed {
            CpiContext::new_with_signer(self.token_program.clone(), accounts, self.vault_signer)
        } else {
            CpiContext::new(self.token_program.clone(), accounts)
        };
        token::transfer(cpi_ctx, amount)
    }
}

impl<'a, 'info> TokenLedger for SplLedger<'a, 'info> {
    fn balance_of(&self, owner: &Pubkey) -> Result<u64> {
        let account = self.token_account_of(owner)?;
        Ok(unpack_token_account(&account)?.amount)
    }

    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> Result<()> {
        // Only the vault can be debited without a holder signature.
        require_keys_eq!(*from, self.vault_authority.key(), LedgerError::InsufficientAllowance);
        require!(!self.vault_signer.is_empty(), ErrorCode::AccountNotSigner);
        require_gte!(
            self.balance_of(from)?,
            amount,
            LedgerError::InsufficientBalance
        );
        let destination = self.token_account_of(to)?;
        self.cpi_transfer(
            self.vault.clone(),
            destination,
            self.vault_authority.clone(),
            amount,
            true,
        )
    }

    fn transfer_from(
        &mut self,
        _spender: &Pubkey,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> Result<()> {
        let holder = self.holder(from)?;
        let authority = holder
            .signer
            .clone()
            .ok_or(LedgerError::InsufficientAllowance)?;
        let source = holder.token_account.clone();
        require_gte!(
            unpack_token_account(&source)?.amount,
            amount,
            LedgerError::InsufficientBalance
        );
        let destination = self.token_account_of(to)?;
        self.cpi_transfer(source, destination, authority, amount, false)
    }
}
