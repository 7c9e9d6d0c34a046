//! Program-derived addresses of a fund.

use solana_program::pubkey::Pubkey;
use tandem_matching_fund::{FUND_SEED, VAULT_SEED, VAULT_TOKENS_SEED};

/// Fund account for `(authority, mint)`.
pub fn fund_address(program_id: &Pubkey, authority: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[FUND_SEED, authority.as_ref(), mint.as_ref()], program_id)
}

/// Vault authority PDA; the fund's address on the token ledger.
pub fn vault_authority_address(program_id: &Pubkey, fund: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_SEED, fund.as_ref()], program_id)
}

/// Token account holding the pool.
pub fn vault_address(program_id: &Pubkey, fund: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_TOKENS_SEED, fund.as_ref()], program_id)
}

/// All addresses of one fund.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FundAddresses {
    /// Fund state account.
    pub fund: Pubkey,
    /// Vault authority PDA.
    pub vault_authority: Pubkey,
    /// Vault token account.
    pub vault: Pubkey,
}

impl FundAddresses {
    /// Derives every address for `(authority, mint)`.
    pub fn derive(program_id: &Pubkey, authority: &Pubkey, mint: &Pubkey) -> Self {
        let (fund, _) = fund_address(program_id, authority, mint);
        Self {
            fund,
            vault_authority: vault_authority_address(program_id, &fund).0,
            vault: vault_address(program_id, &fund).0,
        }
    }
}
