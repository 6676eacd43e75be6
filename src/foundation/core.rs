pub use kurbo::{Point, Rect, Size, Vec2};

/// Lengths are points (1/72 in) stored as `f64`.
pub type Length = f64;

/// Tolerance used when comparing accumulated lengths.
pub const LENGTH_EPSILON: Length = 1e-6;

/// `a <= b` within [`LENGTH_EPSILON`].
pub fn fits_within(needed: Length, available: Length) -> bool {
    needed <= available + LENGTH_EPSILON
}

/// Clamp negative/NaN lengths to zero.
pub fn non_negative(v: Length) -> Length {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
