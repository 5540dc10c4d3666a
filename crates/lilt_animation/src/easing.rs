//! Easing curves
//!
//! An easing maps linear progress in `[0, 1]` to shaped progress. Every curve
//! here fixes both ends: `apply(0) == 0` and `apply(1) == 1`, so a tween that
//! is snapped at either end lands exactly on its origin or target.

use std::f32::consts::PI;

/// Easing function applied to animation progress
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    /// `t^exponent`. Exponents below 1 start fast, above 1 start slow.
    Power(f32),
    /// Half-cosine ramp, slow at both ends
    SineInOut,
    /// `2t - SineInOut(t)`: fast at both ends, slow through the middle
    InverseSine,
    /// `sqrt(sin(t * PI / 2))`, steep start
    CircularIn,
    /// `1 - sqrt(cos(t * PI / 2))`, steep finish
    CircularOut,
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::EaseIn | Easing::EaseInCubic => t * t * t,
            Easing::EaseOut | Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOut | Easing::EaseInOutCubic => in_out(t, 3, 4.0),
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => in_out(t, 2, 2.0),
            Easing::EaseInQuart => t * t * t * t,
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::EaseInOutQuart => in_out(t, 4, 8.0),
            Easing::Power(exponent) => {
                if t <= 0.0 {
                    0.0
                } else {
                    t.powf(*exponent)
                }
            }
            Easing::SineInOut => sine_in_out(t),
            Easing::InverseSine => 2.0 * t - sine_in_out(t),
            Easing::CircularIn => (t * PI / 2.0).sin().max(0.0).sqrt(),
            Easing::CircularOut => 1.0 - (t * PI / 2.0).cos().max(0.0).sqrt(),
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier_ease(t, *x1, *y1, *x2, *y2),
        }
    }
}

/// Symmetric polynomial in-out: `k * t^n` on the first half, mirrored after
#[inline]
fn in_out(t: f32, n: i32, k: f32) -> f32 {
    if t < 0.5 {
        k * t.powi(n)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(n) / 2.0
    }
}

#[inline]
fn sine_in_out(t: f32) -> f32 {
    0.5 + 0.5 * ((1.0 - t) * PI).cos()
}

/// Cubic bezier easing (CSS `cubic-bezier()` semantics).
///
/// Newton-Raphson with a bisection fallback, computed in f64.
fn cubic_bezier_ease(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let x = t as f64;
    let (x1, y1, x2, y2) = (x1 as f64, y1 as f64, x2 as f64, y2 as f64);

    let mut p = x;
    for _ in 0..8 {
        let err = bezier_sample(p, x1, x2) - x;
        if err.abs() < 1e-7 {
            return bezier_sample(p, y1, y2) as f32;
        }
        let slope = bezier_slope(p, x1, x2);
        if slope.abs() < 1e-7 {
            break;
        }
        p -= err / slope;
    }

    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    p = x;
    for _ in 0..20 {
        let val = bezier_sample(p, x1, x2);
        if (val - x).abs() < 1e-7 {
            break;
        }
        if val < x {
            lo = p;
        } else {
            hi = p;
        }
        p = (lo + hi) * 0.5;
    }

    bezier_sample(p, y1, y2) as f32
}

/// B(t) = 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³, in Horner form
#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}
