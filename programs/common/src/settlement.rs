//! Pro-rata settlement of a remaining balance across weighted claims.
//!
//! Each claim receives `floor(remaining * weight / total_weight)`. The units
//! lost to flooring (always fewer than the number of claims) go one each to
//! the claims with the largest fractional remainders; equal remainders are
//! resolved in favour of the earlier claim. The result always sums to
//! `remaining` exactly and is fully determined by the input order.

use crate::errors::CommonError;
use anchor_lang::prelude::*;

/// Splits `remaining` across `weights` in proportion, summing exactly to `remaining`.
///
/// Fails with `ConstraintViolation` when there is a balance to split but no
/// positive weight to split it by.
pub fn pro_rata(weights: &[u64], remaining: u64) -> Result<Vec<u64>> {
    let total_weight = weights.iter().try_fold(0u128, |acc, w| {
        acc.checked_add(*w as u128)
            .ok_or(CommonError::ArithmeticOverflow)
    })?;
    if remaining == 0 {
        return Ok(vec![0; weights.len()]);
    }
    require!(total_weight > 0, CommonError::ConstraintViolation);

    let mut shares = Vec::with_capacity(weights.len());
    let mut remainders = Vec::with_capacity(weights.len());
    let mut allocated: u128 = 0;
    for (idx, weight) in weights.iter().enumerate() {
        let product = (remaining as u128)
            .checked_mul(*weight as u128)
            .ok_or(CommonError::ArithmeticOverflow)?;
        let share = product / total_weight;
        allocated = allocated
            .checked_add(share)
            .ok_or(CommonError::ArithmeticOverflow)?;
        shares.push(u64::try_from(share).map_err(|_| CommonError::ArithmeticOverflow)?);
        remainders.push((product % total_weight, idx));
    }

    let leftover = (remaining as u128)
        .checked_sub(allocated)
        .ok_or(CommonError::ArithmeticOverflow)? as usize;
    // Unstable sort keeps BPF stack usage low; the index makes the order total.
    remainders.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for (_, idx) in remainders.into_iter().take(leftover) {
        shares[idx] = shares[idx]
            .checked_add(1)
            .ok_or(CommonError::ArithmeticOverflow)?;
    }
    Ok(shares)
}
