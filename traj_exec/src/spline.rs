//! # Quintic Hermite spline evaluation
//!
//! A segment of the path is the quintic Hermite spline joining two controls,
//! each of which fixes the position, first derivative and second derivative
//! of the curve at its end of the segment. The curve is the weighted sum of
//! the six control vectors, the weights being the quintic Hermite basis
//! functions of the segment parameter `t` in [0, 1].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::vec2::Vec2;
use util::maths::poly_val;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Basis polynomial coefficients, highest power first.
///
/// In order the weights apply to: initial position, initial derivative,
/// initial second derivative, final second derivative, final derivative and
/// final position.
const BASIS: [[f64; 6]; 6] = [
    [-6.0, 15.0, -10.0, 0.0, 0.0, 1.0],
    [-3.0, 8.0, -6.0, 0.0, 1.0, 0.0],
    [-0.5, 1.5, -1.5, 0.5, 0.0, 0.0],
    [0.5, -1.0, 0.5, 0.0, 0.0, 0.0],
    [-3.0, 7.0, -4.0, 0.0, 0.0, 0.0],
    [6.0, -15.0, 10.0, 0.0, 0.0, 0.0],
];

/// First derivative of [`BASIS`].
const BASIS_PRIME: [[f64; 5]; 6] = [
    [-30.0, 60.0, -30.0, 0.0, 0.0],
    [-15.0, 32.0, -18.0, 0.0, 1.0],
    [-2.5, 6.0, -4.5, 1.0, 0.0],
    [2.5, -4.0, 1.5, 0.0, 0.0],
    [-15.0, 28.0, -12.0, 0.0, 0.0],
    [30.0, -60.0, 30.0, 0.0, 0.0],
];

/// Second derivative of [`BASIS`].
const BASIS_DOUBLE_PRIME: [[f64; 4]; 6] = [
    [-120.0, 180.0, -60.0, 0.0],
    [-60.0, 96.0, -36.0, 0.0],
    [-10.0, 18.0, -9.0, 1.0],
    [10.0, -12.0, 3.0, 0.0],
    [-60.0, 84.0, -24.0, 0.0],
    [120.0, -180.0, 60.0, 0.0],
];

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Anything which can act as the control point at one end of a spline
/// segment.
pub trait SplineControl {
    fn position(&self) -> Vec2;
    fn derivative(&self) -> Vec2;
    fn derivative_2(&self) -> Vec2;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The state of a spline segment at one value of its parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplineSample {
    pub position: Vec2,
    pub derivative: Vec2,
    pub derivative_2: Vec2,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SplineSample {
    /// Signed curvature of the curve, positive when turning anticlockwise.
    ///
    /// Returns `None` if the first derivative is zero, where the curvature is
    /// undefined.
    pub fn curvature(&self) -> Option<f64> {
        let speed = self.derivative.norm();

        if speed <= std::f64::EPSILON {
            return None;
        }

        let cross = self.derivative.x * self.derivative_2.y
            - self.derivative_2.x * self.derivative.y;

        Some(cross / (speed * speed * speed))
    }

    /// Heading of the curve's tangent from the +ve x axis.
    pub fn heading(&self) -> f64 {
        self.derivative.y.atan2(self.derivative.x)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Position on the segment between `initial` and `final_` at `t`.
pub fn lerp_hermite<C: SplineControl>(t: f64, initial: &C, final_: &C) -> Vec2 {
    blend(&weights(&BASIS, t), initial, final_)
}

/// First derivative of the segment between `initial` and `final_` at `t`.
pub fn lerp_hermite_prime<C: SplineControl>(t: f64, initial: &C, final_: &C) -> Vec2 {
    blend(&weights(&BASIS_PRIME, t), initial, final_)
}

/// Second derivative of the segment between `initial` and `final_` at `t`.
pub fn lerp_hermite_double_prime<C: SplineControl>(t: f64, initial: &C, final_: &C) -> Vec2 {
    blend(&weights(&BASIS_DOUBLE_PRIME, t), initial, final_)
}

/// Evaluate position and both derivatives of the segment at `t`.
pub fn sample<C: SplineControl>(t: f64, initial: &C, final_: &C) -> SplineSample {
    SplineSample {
        position: lerp_hermite(t, initial, final_),
        derivative: lerp_hermite_prime(t, initial, final_),
        derivative_2: lerp_hermite_double_prime(t, initial, final_),
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn weights<const D: usize>(basis: &[[f64; D]; 6], t: f64) -> [f64; 6] {
    let mut w = [0f64; 6];
    for (w, coeffs) in w.iter_mut().zip(basis.iter()) {
        *w = poly_val(&t, coeffs);
    }
    w
}

fn blend<C: SplineControl>(w: &[f64; 6], initial: &C, final_: &C) -> Vec2 {
    initial.position() * w[0]
        + initial.derivative() * w[1]
        + initial.derivative_2() * w[2]
        + final_.derivative_2() * w[3]
        + final_.derivative() * w[4]
        + final_.position() * w[5]
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    struct Ctrl(Vec2, Vec2, Vec2);

    impl SplineControl for Ctrl {
        fn position(&self) -> Vec2 { self.0 }
        fn derivative(&self) -> Vec2 { self.1 }
        fn derivative_2(&self) -> Vec2 { self.2 }
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).norm() < 1e-9
    }

    #[test]
    fn test_basis_boundaries() {
        let at = |d: usize, t: f64| weights(&BASIS, t)[d];
        let at_p = |d: usize, t: f64| weights(&BASIS_PRIME, t)[d];
        let at_pp = |d: usize, t: f64| weights(&BASIS_DOUBLE_PRIME, t)[d];

        assert_eq!(at(0, 0.0), 1.0);
        assert_eq!(at(0, 1.0), 0.0);
        assert_eq!(at(5, 0.0), 0.0);
        assert_eq!(at(5, 1.0), 1.0);
        assert_eq!(at(1, 0.0), 0.0);
        assert_eq!(at(4, 1.0), 0.0);

        assert_eq!(at_p(1, 0.0), 1.0);
        assert_eq!(at_p(4, 1.0), 1.0);
        assert_eq!(at_p(2, 0.0), 0.0);
        assert_eq!(at_p(3, 1.0), 0.0);

        assert_eq!(at_pp(2, 0.0), 1.0);
        assert_eq!(at_pp(3, 1.0), 1.0);

        // At either end only one basis of each order is active
        for t in [0.0, 1.0].iter() {
            let sum: f64 = weights(&BASIS, *t).iter().map(|w| w.abs()).sum();
            assert!((sum - 1.0).abs() < 1e-12);
            let sum: f64 = weights(&BASIS_PRIME, *t).iter().map(|w| w.abs()).sum();
            assert!((sum - 1.0).abs() < 1e-12);
            let sum: f64 = weights(&BASIS_DOUBLE_PRIME, *t).iter().map(|w| w.abs()).sum();
            assert!((sum - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reproduces_controls() {
        let a = Ctrl(Vec2::new(1.0, 2.0), Vec2::new(30.0, -4.0), Vec2::new(5.0, 6.0));
        let b = Ctrl(Vec2::new(40.0, 12.0), Vec2::new(-7.0, 25.0), Vec2::new(-2.0, 3.0));

        let s0 = sample(0.0, &a, &b);
        assert!(close(s0.position, a.0));
        assert!(close(s0.derivative, a.1));
        assert!(close(s0.derivative_2, a.2));

        let s1 = sample(1.0, &a, &b);
        assert!(close(s1.position, b.0));
        assert!(close(s1.derivative, b.1));
        assert!(close(s1.derivative_2, b.2));
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let a = Ctrl(Vec2::new(0.0, 0.0), Vec2::new(48.0, 0.0), Vec2::new(0.0, 20.0));
        let b = Ctrl(Vec2::new(30.0, 30.0), Vec2::new(0.0, 48.0), Vec2::new(-10.0, 0.0));

        let h = 1e-6;
        for i in 1..10 {
            let t = i as f64 / 10.0;
            let fd = (lerp_hermite(t + h, &a, &b) - lerp_hermite(t - h, &a, &b)) / (2.0 * h);
            assert!((fd - lerp_hermite_prime(t, &a, &b)).norm() < 1e-4);

            let fd2 = (lerp_hermite_prime(t + h, &a, &b) - lerp_hermite_prime(t - h, &a, &b))
                / (2.0 * h);
            assert!((fd2 - lerp_hermite_double_prime(t, &a, &b)).norm() < 1e-3);
        }
    }

    #[test]
    fn test_curvature() {
        // Quarter turn to the left has positive curvature
        let a = Ctrl(Vec2::new(0.0, 0.0), Vec2::new(20.0, 0.0), Vec2::new(0.0, 0.0));
        let b = Ctrl(Vec2::new(20.0, 20.0), Vec2::new(0.0, 20.0), Vec2::new(0.0, 0.0));
        let k = sample(0.5, &a, &b).curvature().unwrap();
        assert!(k > 0.0);

        // Straight line has none
        let a = Ctrl(Vec2::new(0.0, 0.0), Vec2::new(24.0, 0.0), Vec2::new(0.0, 0.0));
        let b = Ctrl(Vec2::new(24.0, 0.0), Vec2::new(24.0, 0.0), Vec2::new(0.0, 0.0));
        assert!(sample(0.3, &a, &b).curvature().unwrap().abs() < 1e-12);

        // Stationary point has no defined curvature
        let still = SplineSample {
            position: Vec2::zeros(),
            derivative: Vec2::zeros(),
            derivative_2: Vec2::new(1.0, 0.0),
        };
        assert_eq!(still.curvature(), None);
    }
}
