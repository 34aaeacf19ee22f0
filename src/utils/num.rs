//! Numeric utilities: safe and centralized integer conversions.
//!
//! Paging arithmetic takes caller-controlled `i32` values, so every
//! conversion here either fails with `None` or saturates; none panics.

#[inline]
#[must_use]
pub fn i32_to_usize(v: i32) -> Option<usize> {
    usize::try_from(v).ok()
}

#[inline]
#[must_use]
pub fn usize_checked_mul(a: usize, b: usize) -> Option<usize> {
    a.checked_mul(b)
}

#[inline]
#[must_use]
pub fn usize_to_u64(v: usize) -> u64 {
    u64::try_from(v).unwrap_or(u64::MAX)
}

#[inline]
#[must_use]
pub fn u128_to_u64_saturating(v: u128) -> u64 {
    u64::try_from(v).unwrap_or(u64::MAX)
}
