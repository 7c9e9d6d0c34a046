//! Matching-window arithmetic.

use anchor_lang::prelude::*;

/// Returns `start + duration`, or `None` when `duration` is 0 (no deadline).
pub fn deadline(start: i64, duration: i64) -> Result<Option<i64>> {
    require!(duration >= 0, crate::errors::CommonError::TimestampInvalid);
    if duration == 0 {
        return Ok(None);
    }
    start
        .checked_add(duration)
        .map(Some)
        .ok_or_else(|| crate::errors::CommonError::ArithmeticOverflow.into())
}

/// True once `now` is strictly past an optional inclusive deadline.
pub fn has_elapsed(now: i64, deadline: Option<i64>) -> bool {
    matches!(deadline, Some(end) if now > end)
}

#[cfg(all(test, not(target_arch = "bpf")))]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_has_no_deadline() {
        assert_eq!(deadline(1_000, 0).unwrap(), None);
        assert!(!has_elapsed(i64::MAX, None));
    }

    #[test]
    fn deadline_is_inclusive() {
        let end = deadline(1_000, 3_600).unwrap();
        assert_eq!(end, Some(4_600));
        assert!(!has_elapsed(4_600, end));
        assert!(has_elapsed(4_601, end));
    }

    #[test]
    fn rejects_negative_and_overflowing_windows() {
        assert!(deadline(0, -1).is_err());
        assert!(deadline(i64::MAX, 1).is_err());
    }
}
