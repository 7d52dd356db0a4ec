use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// Ship motion is integrated in this type so a given tick sequence lands on
/// exactly the same interpolation fraction on every platform.
pub type Fixed64 = I32F32;

/// Fraction of an edge as `f64`, for position interpolation only.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Distance covered in one tick: `speed` units per second for `tick_ms`
/// milliseconds.
///
/// Saturates once `speed * tick_ms` leaves the range of [`Fixed64`]; a
/// validated [`RunConfig`](crate::config::RunConfig) stays below that.
#[inline]
pub fn tick_distance(speed: u32, tick_ms: u32) -> Fixed64 {
    Fixed64::saturating_from_num(u64::from(speed) * u64::from(tick_ms)) / Fixed64::from_num(1000)
}

/// Round a non-negative fixed-point value to the nearest integer, halves up.
#[inline]
pub fn round_half_up(v: Fixed64) -> u32 {
    (v + Fixed64::from_num(0.5)).to_num::<u32>()
}
