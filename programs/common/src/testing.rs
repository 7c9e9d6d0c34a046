//! Host-side helpers for asserting on Anchor errors.
//!
//! Every `#[error_code]` enum numbers its variants from the same offset, so
//! tests compare error names rather than codes.

use anchor_lang::error::Error;

/// Name of the error variant (`"FundClosed"`), or the `Debug` form of a raw
/// program error.
pub fn error_name(err: &Error) -> String {
    match err {
        Error::AnchorError(anchor) => anchor.error_name.clone(),
        Error::ProgramError(program) => format!("{:?}", program.program_error),
    }
}
