//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Linearly interpolate between `a` and `b`, where `t = 0` gives `a` and
/// `t = 1` gives `b`.
///
/// `t` is not clamped, values outside `[0, 1]` extrapolate.
pub fn lerp<T>(a: T, b: T, t: T) -> T
where
    T: Float
{
    a + t * (b - a)
}

/// Apply polynomial coefficients to a value
///
/// The coefficients are ordered highest power first, i.e. `[a, b, c]` is
/// `a*x^2 + b*x + c`.
pub fn poly_val<T>(value: &T, coeffs: &[T]) -> T
where
    T: Float
{
    coeffs.iter().fold(T::zero(), |acc, c| acc * *value + *c)
}

/// Get the signed angular distance from `a` to `b`, in the range [-pi, pi).
///
/// This function will return the shortest signed distance between the two
/// angles accounting for wrapping, so a positive value means `b` is
/// anticlockwise of `a`.
pub fn get_ang_dist<T>(a: T, b: T) -> T
where
    T: Float
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap_or_else(T::zero);
    let tau_t: T = pi_t + pi_t;

    rem_euclid(b - a + pi_t, tau_t) - pi_t
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Return the sign of `value` as `-1`, `0` or `1`.
///
/// Unlike `Float::signum` zero maps to zero, which matters when a quantity
/// being zero means there is no direction at all.
pub fn sign<T>(value: T) -> T
where
    T: Float
{
    if value > T::zero() {
        T::one()
    }
    else if value < T::zero() {
        -T::one()
    }
    else {
        T::zero()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_ang_dist() {
        const TAU: f64 = std::f64::consts::TAU;
        const PI: f64 = std::f64::consts::PI;

        assert!((get_ang_dist(1f64, 2f64) - 1f64).abs() < 1e-12);
        assert!((get_ang_dist(2f64, 1f64) + 1f64).abs() < 1e-12);
        assert!(get_ang_dist(0f64, TAU).abs() < 1e-12);
        assert!(get_ang_dist(TAU, 0f64).abs() < 1e-12);

        // Crossing the +/- pi boundary is a small change
        assert!((get_ang_dist(PI - 0.1, -PI + 0.1) - 0.2).abs() < 1e-12);
        assert!((get_ang_dist(-PI + 0.1, PI - 0.1) + 0.2).abs() < 1e-12);

        // A reversal is a full half turn
        assert!((get_ang_dist(0f64, PI).abs() - PI).abs() < 1e-12);
    }

    #[test]
    fn test_poly_val() {
        assert_eq!(poly_val(&2f64, &[1.0, 0.0, -3.0]), 1.0);
        assert_eq!(poly_val(&0.5f64, &[4.0, 2.0]), 4.0);
        assert_eq!(poly_val(&3f64, &[]), 0.0);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(2f64, 4f64, 0.0), 2.0);
        assert_eq!(lerp(2f64, 4f64, 1.0), 4.0);
        assert_eq!(lerp(2f64, 4f64, 0.25), 2.5);
        assert_eq!(lerp(2f64, 4f64, 1.5), 5.0);
    }

    #[test]
    fn test_sign() {
        assert_eq!(sign(-3f64), -1.0);
        assert_eq!(sign(0f64), 0.0);
        assert_eq!(sign(0.5f64), 1.0);
    }
}
