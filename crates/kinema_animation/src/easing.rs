//! Easing curves
//!
//! Map linear local progress in `0.0..=1.0` onto eased progress. Every curve
//! hits 0 at 0 and 1 at 1; `BackOut` overshoots in between.

/// Which end of the curve is eased
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EaseMode {
    In,
    #[default]
    Out,
    InOut,
}

/// Polynomial and trigonometric curve families
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CurveFamily {
    Quad,
    Cubic,
    Quart,
    Sine,
}

impl CurveFamily {
    /// The "in" form; other modes are derived from it
    fn ease_in(self, t: f32) -> f32 {
        match self {
            CurveFamily::Quad => t * t,
            CurveFamily::Cubic => t * t * t,
            CurveFamily::Quart => t * t * t * t,
            CurveFamily::Sine => 1.0 - (t * std::f32::consts::FRAC_PI_2).cos(),
        }
    }
}

/// Easing function
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    #[default]
    Linear,
    /// CSS `ease`
    Ease,
    /// `cubic-bezier(0.42, 0, 1, 1)`
    EaseIn,
    /// `cubic-bezier(0, 0, 0.58, 1)`
    EaseOut,
    /// `cubic-bezier(0.42, 0, 0.58, 1)`
    EaseInOut,
    Curve(CurveFamily, EaseMode),
    /// Overshoots slightly before settling on 1
    BackOut,
    /// Jump in `n` equal steps, holding each until its end
    Steps(u32),
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    pub const fn quad(mode: EaseMode) -> Self {
        Easing::Curve(CurveFamily::Quad, mode)
    }

    pub const fn cubic(mode: EaseMode) -> Self {
        Easing::Curve(CurveFamily::Cubic, mode)
    }

    pub const fn quart(mode: EaseMode) -> Self {
        Easing::Curve(CurveFamily::Quart, mode)
    }

    pub const fn sine(mode: EaseMode) -> Self {
        Easing::Curve(CurveFamily::Sine, mode)
    }

    /// Eased progress for `t`, clamped to `0.0..=1.0` first (NaN reads as 0)
    pub fn apply(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        match *self {
            Easing::Linear => t,
            Easing::Ease => bezier(t, 0.25, 0.1, 0.25, 1.0),
            Easing::EaseIn => bezier(t, 0.42, 0.0, 1.0, 1.0),
            Easing::EaseOut => bezier(t, 0.0, 0.0, 0.58, 1.0),
            Easing::EaseInOut => bezier(t, 0.42, 0.0, 0.58, 1.0),
            Easing::Curve(family, mode) => match mode {
                EaseMode::In => family.ease_in(t),
                EaseMode::Out => 1.0 - family.ease_in(1.0 - t),
                EaseMode::InOut if t < 0.5 => family.ease_in(2.0 * t) / 2.0,
                EaseMode::InOut => 1.0 - family.ease_in(2.0 - 2.0 * t) / 2.0,
            },
            Easing::BackOut => {
                const C1: f32 = 1.701_58;
                const C3: f32 = C1 + 1.0;
                let u = t - 1.0;
                1.0 + C3 * u * u * u + C1 * u * u
            }
            Easing::Steps(0) => t,
            Easing::Steps(n) => {
                let n = n as f32;
                ((t * n).floor() / n).min(1.0)
            }
            Easing::CubicBezier(x1, y1, x2, y2) => bezier(t, x1, y1, x2, y2),
        }
    }
}

/// CSS-style cubic bezier with control points `(x1, y1)` and `(x2, y2)`.
///
/// Finds the curve parameter whose x equals `t` (Newton steps, bisection when
/// the slope flattens), then returns the y at that parameter. Runs in f64 so
/// consecutive frames stay monotone.
fn bezier(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let x_curve = BezierAxis::new(x1 as f64, x2 as f64);
    let y_curve = BezierAxis::new(y1 as f64, y2 as f64);
    let target = t as f64;

    let mut s = target;
    for _ in 0..8 {
        let err = x_curve.at(s) - target;
        if err.abs() < 1e-7 {
            return y_curve.at(s) as f32;
        }
        let slope = x_curve.slope(s);
        if slope.abs() < 1e-6 {
            break;
        }
        s = (s - err / slope).clamp(0.0, 1.0);
    }

    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    s = target;
    for _ in 0..32 {
        let x = x_curve.at(s);
        if (x - target).abs() < 1e-7 {
            break;
        }
        if x < target {
            lo = s;
        } else {
            hi = s;
        }
        s = 0.5 * (lo + hi);
    }

    y_curve.at(s) as f32
}

/// One coordinate of a bezier from 0 to 1, in polynomial form
struct BezierAxis {
    a: f64,
    b: f64,
    c: f64,
}

impl BezierAxis {
    fn new(p1: f64, p2: f64) -> Self {
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        let a = 1.0 - c - b;
        Self { a, b, c }
    }

    fn at(&self, s: f64) -> f64 {
        ((self.a * s + self.b) * s + self.c) * s
    }

    fn slope(&self, s: f64) -> f64 {
        (3.0 * self.a * s + 2.0 * self.b) * s + self.c
    }
}
