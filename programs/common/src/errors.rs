//! Shared error codes across Tandem programs.

use anchor_lang::prelude::*;

/// Common error namespace reused across programs.
#[error_code]
pub enum CommonError {
    /// Inputs violate a precondition of a shared helper.
    #[msg("Constraint violation")]
    ConstraintViolation,
    /// Timestamp outside permissible bounds.
    #[msg("Timestamp outside expected bounds")]
    TimestampInvalid,
    /// Overflow in math operations.
    #[msg("Arithmetic overflow")]
    ArithmeticOverflow,
}
