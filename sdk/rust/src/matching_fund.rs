//! Matching fund instruction builders.

use std::str::FromStr;

use crate::SdkError;
use anchor_lang::{InstructionData, ToAccountMetas};
use solana_program::instruction::{AccountMeta, Instruction};
use solana_program::pubkey::Pubkey;
use tandem_common::authority::WhitelistKind;
use tandem_matching_fund::{accounts, instruction, InitFundArgs};

/// Builds `init_fund`.
pub fn init_fund(
    program_id: Pubkey,
    accounts: accounts::InitFund,
    args: InitFundArgs,
) -> Instruction {
    Instruction {
        program_id,
        accounts: accounts.to_account_metas(None),
        data: instruction::InitFund { args }.data(),
    }
}

/// Builds `add_funds`.
pub fn add_funds(program_id: Pubkey, accounts: accounts::AddFunds, amount: u64) -> Instruction {
    Instruction {
        program_id,
        accounts: accounts.to_account_metas(None),
        data: instruction::AddFunds { amount }.data(),
    }
}

/// Builds `donate`. The recipient is the owner of `accounts.recipient_token`.
pub fn donate(program_id: Pubkey, accounts: accounts::Donate, amount: u64) -> Instruction {
    Instruction {
        program_id,
        accounts: accounts.to_account_metas(None),
        data: instruction::Donate { amount }.data(),
    }
}

/// Parses a whitelist name (`donor` or `recipient`).
pub fn parse_whitelist(name: &str) -> Result<WhitelistKind, SdkError> {
    WhitelistKind::from_str(name)
        .map_err(|_: strum::ParseError| SdkError::UnknownWhitelist(name.to_string()))
}

/// Builds the add/remove instruction for one whitelist entry.
pub fn update_whitelist(
    program_id: Pubkey,
    accounts: accounts::UpdateWhitelist,
    list: WhitelistKind,
    address: Pubkey,
    allowed: bool,
) -> Instruction {
    let data = match (list, allowed) {
        (WhitelistKind::Donor, true) => instruction::AddDonor { address }.data(),
        (WhitelistKind::Donor, false) => instruction::RemoveDonor { address }.data(),
        (WhitelistKind::Recipient, true) => instruction::AddRecipient { address }.data(),
        (WhitelistKind::Recipient, false) => instruction::RemoveRecipient { address }.data(),
    };
    Instruction {
        program_id,
        accounts: accounts.to_account_metas(None),
        data,
    }
}

/// Builds one `close_fund` page. `contributor_tokens` lists one token account
/// per contributor, in the fund's contributor order, starting at the first
/// unpaid refund (see [`crate::preview::refund_pages`]).
pub fn close_fund(
    program_id: Pubkey,
    accounts: accounts::CloseFund,
    contributor_tokens: &[Pubkey],
) -> Instruction {
    let mut metas = accounts.to_account_metas(None);
    metas.extend(
        contributor_tokens
            .iter()
            .map(|token| AccountMeta::new(*token, false)),
    );
    Instruction {
        program_id,
        accounts: metas,
        data: instruction::CloseFund {}.data(),
    }
}
