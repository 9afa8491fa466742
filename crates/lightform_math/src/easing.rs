//! Named cubic-bezier easing curves
//!
//! Curves are CSS-style `cubic-bezier(x1, y1, x2, y2)` with fixed end points
//! `(0, 0)` and `(1, 1)`. Evaluating one solves `x(t) = input` for the curve
//! parameter and returns `y(t)`.

use serde::{Deserialize, Serialize};

/// Newton iterations before falling back to bisection
const NEWTON_ITERATIONS: usize = 8;
/// Bisection iteration cap
const BISECTION_ITERATIONS: usize = 64;
/// Solver tolerance on x
const SOLVE_EPSILON: f64 = 1e-7;

/// Easing preset
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Ease,
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    InOutSine,
    InOutQuadratic,
    InOutCubic,
    FastOutSlowIn,
    InOutBack,
}

impl Easing {
    /// All presets in display order
    pub const ALL: [Easing; 10] = [
        Self::Ease,
        Self::Linear,
        Self::EaseIn,
        Self::EaseOut,
        Self::EaseInOut,
        Self::InOutSine,
        Self::InOutQuadratic,
        Self::InOutCubic,
        Self::FastOutSlowIn,
        Self::InOutBack,
    ];

    /// Bezier control points `(x1, y1, x2, y2)`
    pub fn control_points(self) -> [f64; 4] {
        match self {
            Self::Ease => [0.25, 0.1, 0.25, 1.0],
            Self::Linear => [0.0, 0.0, 1.0, 1.0],
            Self::EaseIn => [0.42, 0.0, 1.0, 1.0],
            Self::EaseOut => [0.0, 0.0, 0.58, 1.0],
            Self::EaseInOut => [0.42, 0.0, 0.58, 1.0],
            Self::InOutSine => [0.45, 0.05, 0.55, 0.95],
            Self::InOutQuadratic => [0.46, 0.03, 0.52, 0.96],
            Self::InOutCubic => [0.65, 0.05, 0.36, 1.0],
            Self::FastOutSlowIn => [0.4, 0.0, 0.2, 1.0],
            Self::InOutBack => [0.68, -0.55, 0.27, 1.55],
        }
    }

    /// Name as written in saved state
    pub fn name(self) -> &'static str {
        match self {
            Self::Ease => "ease",
            Self::Linear => "linear",
            Self::EaseIn => "ease-in",
            Self::EaseOut => "ease-out",
            Self::EaseInOut => "ease-in-out",
            Self::InOutSine => "in-out-sine",
            Self::InOutQuadratic => "in-out-quadratic",
            Self::InOutCubic => "in-out-cubic",
            Self::FastOutSlowIn => "fast-out-slow-in",
            Self::InOutBack => "in-out-back",
        }
    }

    /// Evaluate the curve at `x` (clamped to `[0, 1]`)
    pub fn ease(self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);
        let [x1, y1, x2, y2] = self.control_points();
        if x1 == y1 && x2 == y2 {
            return x;
        }
        let t = solve_curve_x(x, x1, x2);
        bezier(t, y1, y2)
    }
}

/// One bezier coordinate with end points 0 and 1
#[inline]
fn bezier(t: f64, p1: f64, p2: f64) -> f64 {
    let u = 1.0 - t;
    3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t
}

/// d/dt of [`bezier`]
#[inline]
fn bezier_derivative(t: f64, p1: f64, p2: f64) -> f64 {
    let u = 1.0 - t;
    3.0 * u * u * p1 + 6.0 * u * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}

fn solve_curve_x(x: f64, x1: f64, x2: f64) -> f64 {
    let mut t = x;
    for _ in 0..NEWTON_ITERATIONS {
        let error = bezier(t, x1, x2) - x;
        if error.abs() < SOLVE_EPSILON {
            return t;
        }
        let slope = bezier_derivative(t, x1, x2);
        if slope.abs() < 1e-6 {
            break;
        }
        t -= error / slope;
    }

    let (mut lo, mut hi) = (0.0, 1.0);
    t = x;
    for _ in 0..BISECTION_ITERATIONS {
        let error = bezier(t, x1, x2) - x;
        if error.abs() < SOLVE_EPSILON {
            break;
        }
        if error > 0.0 { hi = t } else { lo = t }
        t = (lo + hi) * 0.5;
    }
    t
}
