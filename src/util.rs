//! Private utility module.
//!
//! Every conversion from a continuous coordinate to a discrete index
//! (slice, texel or lattice corner) goes through [`floor_index`], so that the
//! whole addressing scheme shares one rounding bias.

pub use byteordered::Endianness;

/// Bias added to a continuous coordinate before it is floored into an index.
///
/// Accumulated floating point error can turn an exact integer coordinate
/// into something like `7.9999994`; adding this bias before flooring keeps
/// such values on the intended index. Coordinates are expected to be in
/// index units (voxels or texels), so the bias is far below one unit.
pub const ADDRESSING_EPSILON: f64 = 1e-4;

/// Floor a coordinate expressed in index units into an integer index,
/// after adding [`ADDRESSING_EPSILON`].
#[inline]
pub fn floor_index(value: f64) -> i64 {
    (value + ADDRESSING_EPSILON).floor() as i64
}

/// Round a coordinate expressed in index units to the nearest integer.
#[inline]
pub fn round_index(value: f64) -> i64 {
    value.round() as i64
}

/// The fractional position of `value` above `base`, snapped to zero when it
/// lies within [`ADDRESSING_EPSILON`] of the base and clamped to `[0, 1]`.
#[inline]
pub fn lattice_fraction(value: f64, base: i64) -> f64 {
    let frac = value - base as f64;
    if frac.abs() < ADDRESSING_EPSILON {
        0.
    } else {
        frac.max(0.).min(1.)
    }
}
