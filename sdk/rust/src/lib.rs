#![deny(missing_docs)]
//! Rust client SDK for the Tandem matching fund program.

pub mod matching_fund;
pub mod pda;
pub mod preview;

pub use anchor_client::Program;
pub use solana_program::instruction::Instruction;
pub use tandem_common::authority::WhitelistKind;

/// Errors raised by client-side helpers.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// Whitelist name was neither `donor` nor `recipient`.
    #[error("unknown whitelist `{0}`")]
    UnknownWhitelist(String),
    /// A refund page is empty or longer than the unpaid contributor list.
    #[error("refund page of {actual} accounts does not fit {unpaid} unpaid contributors")]
    RefundPageSize {
        /// Contributors still owed a refund.
        unpaid: usize,
        /// Accounts supplied.
        actual: usize,
    },
    /// Settlement math rejected the inputs.
    #[error("settlement failed: {0}")]
    Settlement(String),
}
