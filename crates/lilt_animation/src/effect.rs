//! Additive effect curves
//!
//! An effect is a scalar curve over progress that vanishes at both ends
//! (`sample(0) == sample(1) == 0`). A tween turns it into a 2D offset by
//! multiplying with a direction vector chosen at configuration time, then
//! adds that offset on top of its base interpolation.

use lilt_core::Vec2;
use std::f32::consts::PI;

/// Default peak amplitude for effects
pub const DEFAULT_MAX: f32 = 0.2;

/// Default number of half-oscillations for oscillating effects
pub const DEFAULT_BOUNCE: u32 = 2;

/// Scalar effect curve
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum EffectCurve {
    #[default]
    None,
    /// Oscillation whose frequency rises and amplitude decays with progress
    Spring { max: f32, bounce: u32 },
    /// Constant-amplitude sine oscillation
    Wave { max: f32, bounce: u32 },
    /// Single swell that peaks early and settles back
    Explosion { max: f32 },
}

impl EffectCurve {
    pub fn spring(max: f32, bounce: u32) -> Self {
        EffectCurve::Spring { max, bounce }
    }

    pub fn wave(max: f32, bounce: u32) -> Self {
        EffectCurve::Wave { max, bounce }
    }

    pub fn explosion(max: f32) -> Self {
        EffectCurve::Explosion { max }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, EffectCurve::None)
    }

    /// Evaluate the curve at progress `t`
    pub fn sample(&self, t: f32) -> f32 {
        match *self {
            EffectCurve::None => 0.0,
            EffectCurve::Spring { max, bounce } => {
                let t2 = t * t;
                max * (1.0 - t2) * (PI * bounce as f32 * t2).sin()
            }
            EffectCurve::Wave { max, bounce } => max * (PI * bounce as f32 * t).sin(),
            // sin can dip just below zero next to t = 1 in f32
            EffectCurve::Explosion { max } => {
                max * (t.max(0.0).powf(0.75) * PI).sin().max(0.0).sqrt()
            }
        }
    }
}

/// Effect family, used to build per-member curves for groups
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Spring,
    Wave,
    Explosion,
}

impl EffectKind {
    /// Build a curve of this family from an amplitude and bounce count.
    ///
    /// Explosion has no oscillation and ignores `bounce`.
    pub fn curve(self, max: f32, bounce: u32) -> EffectCurve {
        match self {
            EffectKind::Spring => EffectCurve::spring(max, bounce),
            EffectKind::Wave => EffectCurve::wave(max, bounce),
            EffectKind::Explosion => EffectCurve::explosion(max),
        }
    }
}

/// An effect curve bound to a direction
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Perturbation {
    pub curve: EffectCurve,
    pub direction: Vec2,
}

impl Perturbation {
    pub fn new(curve: EffectCurve, direction: Vec2) -> Self {
        Self { curve, direction }
    }

    pub fn offset(&self, t: f32) -> Vec2 {
        if self.curve.is_none() {
            return Vec2::ZERO;
        }
        self.direction * self.curve.sample(t)
    }
}

/// Bezier path through local-space control points
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BezierPath {
    Quadratic { p0: Vec2, p1: Vec2, p2: Vec2 },
    Cubic { p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2 },
}

impl BezierPath {
    pub fn point_at(&self, t: f32) -> Vec2 {
        let u = 1.0 - t;
        match *self {
            BezierPath::Quadratic { p0, p1, p2 } => p0 * (u * u) + p1 * (2.0 * u * t) + p2 * (t * t),
            BezierPath::Cubic { p0, p1, p2, p3 } => {
                p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
            }
        }
    }

    pub fn start(&self) -> Vec2 {
        match *self {
            BezierPath::Quadratic { p0, .. } | BezierPath::Cubic { p0, .. } => p0,
        }
    }

    pub fn end(&self) -> Vec2 {
        match *self {
            BezierPath::Quadratic { p2, .. } => p2,
            BezierPath::Cubic { p3, .. } => p3,
        }
    }

    /// Same curve traversed from the other end
    pub fn reversed(&self) -> Self {
        match *self {
            BezierPath::Quadratic { p0, p1, p2 } => BezierPath::Quadratic {
                p0: p2,
                p1,
                p2: p0,
            },
            BezierPath::Cubic { p0, p1, p2, p3 } => BezierPath::Cubic {
                p0: p3,
                p1: p2,
                p2: p1,
                p3: p0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effects_vanish_at_both_ends() {
        for curve in [
            EffectCurve::spring(0.2, 2),
            EffectCurve::spring(1.0, 3),
            EffectCurve::wave(0.2, 2),
            EffectCurve::wave(0.5, 5),
            EffectCurve::explosion(0.2),
        ] {
            assert!(curve.sample(0.0).abs() < 1e-6, "{curve:?} at 0");
            assert!(curve.sample(1.0).abs() < 1e-3, "{curve:?} at 1");
        }
    }

    #[test]
    fn test_explosion_never_nan_near_end() {
        let curve = EffectCurve::explosion(0.2);
        for i in 0..=1000 {
            let t = 0.999 + i as f32 * 1e-6;
            assert!(curve.sample(t).is_finite());
        }
    }

    #[test]
    fn test_wave_peaks_at_max() {
        let curve = EffectCurve::wave(0.3, 1);
        assert!((curve.sample(0.5) - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_kind_builds_matching_curve() {
        assert_eq!(EffectKind::Wave.curve(0.1, 4), EffectCurve::wave(0.1, 4));
        assert_eq!(EffectKind::Explosion.curve(0.1, 4), EffectCurve::explosion(0.1));
    }

    #[test]
    fn test_perturbation_scales_direction() {
        let p = Perturbation::new(EffectCurve::wave(0.5, 1), Vec2::new(0.0, 100.0));
        let offset = p.offset(0.5);
        assert!(offset.x.abs() < 1e-6);
        assert!((offset.y - 50.0).abs() < 1e-3);
        assert_eq!(Perturbation::default().offset(0.5), Vec2::ZERO);
    }

    #[test]
    fn test_bezier_endpoints_and_reverse() {
        let cubic = BezierPath::Cubic {
            p0: Vec2::new(0.0, 0.0),
            p1: Vec2::new(0.0, 10.0),
            p2: Vec2::new(10.0, 10.0),
            p3: Vec2::new(10.0, 0.0),
        };
        assert_eq!(cubic.point_at(0.0), cubic.start());
        assert_eq!(cubic.point_at(1.0), cubic.end());

        let mid = cubic.point_at(0.5);
        assert!((mid.x - 5.0).abs() < 1e-5);
        assert!((mid.y - 7.5).abs() < 1e-5);

        let back = cubic.reversed();
        assert_eq!(back.reversed(), cubic);
        assert_eq!(back.point_at(0.25), cubic.point_at(0.75));
    }
}
