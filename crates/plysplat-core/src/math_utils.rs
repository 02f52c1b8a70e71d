//! Numeric helpers shared by the splat decoder.
//!
//! The activation functions here define the exact conversion from stored
//! training values to renderer-ready values, so their arithmetic is kept in
//! `f64` and only narrowed at the end.

use num_traits::{clamp, Float};

/// Zeroth-order spherical harmonics basis constant, `1 / (2 * sqrt(pi))`.
pub const SH_C0: f64 = 0.28209479177387814;

/// Highest spherical harmonics degree carried by canonical splats.
pub const MAX_SH_DEGREE: u8 = 2;

/// Returns the number of spherical harmonics coefficients (over all three
/// color channels, excluding the DC term) stored for `degree`.
///
/// Degrees above [`MAX_SH_DEGREE`] are clamped.
///
/// # Examples
/// ```
/// use plysplat_core::math_utils::sh_component_count_for_degree;
/// assert_eq!(sh_component_count_for_degree(0), 0);
/// assert_eq!(sh_component_count_for_degree(1), 9);
/// assert_eq!(sh_component_count_for_degree(2), 24);
/// assert_eq!(sh_component_count_for_degree(7), 24);
/// ```
pub fn sh_component_count_for_degree(degree: u8) -> usize {
    match degree.min(MAX_SH_DEGREE) {
        0 => 0,
        1 => 9,
        _ => 24,
    }
}

/// Logistic function `1 / (1 + exp(-v))`.
pub fn sigmoid<T: Float>(v: T) -> T {
    T::one() / (T::one() + (-v).exp())
}

/// Floors `v` and clamps it into the `u8` range.
///
/// NaN maps to 0.
///
/// # Examples
/// ```
/// use plysplat_core::math_utils::floor_to_u8;
/// assert_eq!(floor_to_u8(127.9), 127);
/// assert_eq!(floor_to_u8(-3.0), 0);
/// assert_eq!(floor_to_u8(300.0), 255);
/// ```
pub fn floor_to_u8(v: f64) -> u8 {
    clamp(v.floor(), 0.0, 255.0) as u8
}

/// Converts a DC spherical harmonics coefficient to an 8-bit color channel.
pub fn sh_dc_to_u8(dc: f32) -> u8 {
    floor_to_u8((0.5 + SH_C0 * dc as f64) * 255.0)
}

/// Converts a normalized `[0, 1]` color channel to 8 bits.
pub fn unit_to_u8(v: f32) -> u8 {
    floor_to_u8(v as f64 * 255.0)
}

/// Converts a stored opacity logit to an 8-bit alpha.
pub fn opacity_logit_to_u8(logit: f32) -> u8 {
    floor_to_u8(sigmoid(logit as f64) * 255.0)
}

/// Converts a stored log-scale to a linear scale.
pub fn log_scale_to_linear(v: f32) -> f32 {
    (v as f64).exp() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_inputs_hit_the_midpoint() {
        assert_eq!(sh_dc_to_u8(0.0), 127);
        assert_eq!(opacity_logit_to_u8(0.0), 127);
        assert_eq!(log_scale_to_linear(0.0), 1.0);
        assert_eq!(unit_to_u8(1.0), 255);
        assert_eq!(unit_to_u8(0.5), 127);
    }

    #[test]
    fn test_extremes_saturate() {
        assert_eq!(sh_dc_to_u8(100.0), 255);
        assert_eq!(sh_dc_to_u8(-100.0), 0);
        assert_eq!(opacity_logit_to_u8(50.0), 255);
        assert_eq!(opacity_logit_to_u8(-50.0), 0);
        assert_eq!(floor_to_u8(f64::NAN), 0);
    }

    #[test]
    fn test_sigmoid_is_symmetric() {
        let a = sigmoid(2.0f64);
        let b = sigmoid(-2.0f64);
        assert!((a + b - 1.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_log_scale_is_positive(v in -20.0f32..20.0) {
            prop_assert!(log_scale_to_linear(v) > 0.0);
        }

        #[test]
        fn prop_opacity_is_monotonic(a in -10.0f32..10.0, b in -10.0f32..10.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(opacity_logit_to_u8(lo) <= opacity_logit_to_u8(hi));
        }
    }
}
