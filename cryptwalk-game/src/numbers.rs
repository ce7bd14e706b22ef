//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Floor a f64 and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn floor_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).floor();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Scale an integer delta by a multiplier and floor the product.
#[must_use]
pub fn scale_floor(delta: i32, multiplier: f64) -> i32 {
    floor_f64_to_i32(f64::from(delta) * multiplier)
}

/// Map a unit roll in `[0, 1)` onto an index in `0..len`.
///
/// Out-of-range rolls are clamped so the result is always a valid index
/// for non-empty collections. Returns 0 when `len` is 0.
#[must_use]
pub fn index_from_roll(roll: f64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let width = cast::<usize, f64>(len).unwrap_or(1.0);
    let scaled = floor_f64_to_i32(roll.clamp(0.0, 1.0) * width);
    let idx = usize::try_from(scaled).unwrap_or(0);
    idx.min(len - 1)
}
