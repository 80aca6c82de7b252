//! Scalar helpers: angle conversion, degree-based trig and float comparison

/// Tolerance used for "is this effectively zero" checks.
pub const EPSILON: f32 = 1e-6;

/// Tolerance used when comparing matrices built through different paths.
pub const DEFAULT_TOLERANCE: f32 = 1e-4;

const DEGREES_TO_RADIANS: f32 = std::f32::consts::PI / 180.0;
const RADIANS_TO_DEGREES: f32 = 180.0 / std::f32::consts::PI;

/// Convert degrees to radians
#[inline]
pub fn to_radians(degrees: f32) -> f32 {
    degrees * DEGREES_TO_RADIANS
}

/// Convert radians to degrees
#[inline]
pub fn to_degrees(radians: f32) -> f32 {
    radians * RADIANS_TO_DEGREES
}

#[inline]
pub fn sin_deg(degrees: f32) -> f32 {
    to_radians(degrees).sin()
}

#[inline]
pub fn cos_deg(degrees: f32) -> f32 {
    to_radians(degrees).cos()
}

#[inline]
pub fn tan_deg(degrees: f32) -> f32 {
    to_radians(degrees).tan()
}

/// Sine and cosine of an angle given in degrees.
///
/// Exact quarter turns are snapped so that `rotation_y(180.0)` yields
/// `cos = -1, sin = 0` instead of `sin = -8.7e-8`.
pub fn sin_cos_deg(degrees: f32) -> (f32, f32) {
    let turns = degrees / 90.0;
    if turns == turns.trunc() && turns.is_finite() {
        match (turns as i64).rem_euclid(4) {
            0 => return (0.0, 1.0),
            1 => return (1.0, 0.0),
            2 => return (0.0, -1.0),
            _ => return (-1.0, 0.0),
        }
    }
    to_radians(degrees).sin_cos()
}

/// Arc cosine in degrees, clamping the input into `[-1, 1]` first
pub fn acos_deg(value: f32) -> f32 {
    to_degrees(value.clamp(-1.0, 1.0).acos())
}

/// Compare two floats with an absolute tolerance
#[inline]
pub fn approx_eq(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() <= epsilon
}

/// Compare two floats with a tolerance relative to their magnitude.
///
/// Falls back to an absolute comparison near zero.
pub fn relative_eq(a: f32, b: f32, epsilon: f32) -> bool {
    let diff = (a - b).abs();
    if diff <= epsilon {
        return true;
    }
    let largest = a.abs().max(b.abs());
    diff <= largest * epsilon
}

#[inline]
pub fn is_zero(value: f32) -> bool {
    value.abs() <= EPSILON
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degree_radian_conversion() {
        assert!((to_radians(180.0) - std::f32::consts::PI).abs() < 1e-6);
        assert!((to_degrees(std::f32::consts::FRAC_PI_2) - 90.0).abs() < 1e-4);
        assert!((to_degrees(to_radians(37.5)) - 37.5).abs() < 1e-4);
    }

    #[test]
    fn test_quarter_turns_are_exact() {
        assert_eq!(sin_cos_deg(0.0), (0.0, 1.0));
        assert_eq!(sin_cos_deg(90.0), (1.0, 0.0));
        assert_eq!(sin_cos_deg(180.0), (0.0, -1.0));
        assert_eq!(sin_cos_deg(-90.0), (-1.0, 0.0));
        assert_eq!(sin_cos_deg(450.0), (1.0, 0.0));
    }

    #[test]
    fn test_sin_cos_deg_matches_trig() {
        let (s, c) = sin_cos_deg(30.0);
        assert!((s - 0.5).abs() < 1e-6);
        assert!((c - 3f32.sqrt() / 2.0).abs() < 1e-6);
        assert!((sin_deg(30.0) - s).abs() < 1e-6);
        assert!((cos_deg(30.0) - c).abs() < 1e-6);
        assert!((tan_deg(45.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_acos_clamps() {
        assert_eq!(acos_deg(1.0000001), 0.0);
        assert!((acos_deg(-1.5) - 180.0).abs() < 1e-4);
    }

    #[test]
    fn test_comparisons() {
        assert!(approx_eq(1.0, 1.0 + 1e-7, EPSILON));
        assert!(!approx_eq(1.0, 1.1, EPSILON));
        assert!(relative_eq(10000.0, 10000.5, 1e-4));
        assert!(!relative_eq(1.0, 1.5, 1e-4));
        assert!(is_zero(1e-7));
        assert!(!is_zero(1e-3));
        assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
    }
}
