//! Overflow-free fixed-point helpers.

/// `floor(a × b / c)` without intermediate overflow, for `b <= c`.
///
/// Splits `a` into quotient and remainder by `c`: `(a / c) × b` never exceeds
/// `a`, and `(a % c) × b < c²` fits in u128 for 64-bit `b` and `c`.
/// Returns `None` when `c == 0`.
pub fn mul_div_floor(a: u128, b: u64, c: u64) -> Option<u128> {
    if c == 0 {
        return None;
    }
    let (b, c) = (b as u128, c as u128);
    let whole = (a / c).checked_mul(b)?;
    let part = (a % c).checked_mul(b)? / c;
    whole.checked_add(part)
}
