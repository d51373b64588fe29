//! Animatable value types
//!
//! A motion value holds either a number or a color. [`Value`] is the
//! type-erased form stored in the graph; [`Animatable`] is implemented by the
//! concrete types that typed handles expose.

use crate::color::Color;
use smallvec::SmallVec;

/// Discriminant of a [`Value`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueKind {
    Number,
    Color,
}

/// A number or color, the unit stored by every motion value
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Number(f32),
    Color(Color),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::Color(_) => ValueKind::Color,
        }
    }

    pub fn as_number(&self) -> Option<f32> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Color(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Value::Color(c) => Some(*c),
            Value::Number(_) => None,
        }
    }

    /// Interpolate towards `other`.
    ///
    /// Mismatched kinds cannot blend; the result jumps to `other` once `t`
    /// reaches 1 and stays at `self` before that.
    pub fn lerp(&self, other: &Value, t: f32) -> Value {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a * (1.0 - t) + b * t),
            (Value::Color(a), Value::Color(b)) => Value::Color(a.lerp(b, t)),
            _ if t >= 1.0 => *other,
            _ => *self,
        }
    }

    /// Flat channel view: one channel for numbers, RGBA for colors
    pub fn channels(&self) -> SmallVec<[f32; 4]> {
        match self {
            Value::Number(n) => SmallVec::from_slice(&[*n]),
            Value::Color(c) => SmallVec::from_slice(&c.to_array()),
        }
    }

    /// Rebuild a value of the same kind from channels produced by
    /// [`Value::channels`]. Missing channels keep their current value.
    pub fn with_channels(&self, channels: &[f32]) -> Value {
        match self {
            Value::Number(n) => Value::Number(channels.first().copied().unwrap_or(*n)),
            Value::Color(c) => {
                let mut rgba = c.to_array();
                for (slot, v) in rgba.iter_mut().zip(channels) {
                    *slot = *v;
                }
                Value::Color(Color::from_array(rgba))
            }
        }
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(n)
    }
}

/// Lets untyped float literals build values
impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n as f32)
    }
}

impl From<Color> for Value {
    fn from(c: Color) -> Self {
        Value::Color(c)
    }
}

/// Trait for values that can live in a motion value and be interpolated
pub trait Animatable: Copy + 'static {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    fn into_value(self) -> Value;

    /// `None` when `value` holds a different kind
    fn from_value(value: Value) -> Option<Self>;
}

impl Animatable for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self * (1.0 - t) + other * t
    }

    fn into_value(self) -> Value {
        Value::Number(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_number()
    }
}

impl Animatable for Color {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Color::lerp(self, other, t)
    }

    fn into_value(self) -> Value {
        Value::Color(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_color()
    }
}

impl Animatable for Value {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Value::lerp(self, other, t)
    }

    fn into_value(self) -> Value {
        self
    }

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_interpolation() {
        assert!((0.0_f32.lerp(&1.0, 0.5) - 0.5).abs() < 1e-6);
        assert!((10.0_f32.lerp(&20.0, 0.25) - 12.5).abs() < 1e-6);
    }

    #[test]
    fn test_mismatched_kinds_step_at_end() {
        let a = Value::Number(1.0);
        let b = Value::Color(Color::WHITE);
        assert_eq!(a.lerp(&b, 0.99), a);
        assert_eq!(a.lerp(&b, 1.0), b);
    }

    #[test]
    fn test_channels_roundtrip_keeps_kind() {
        let c = Value::Color(Color::rgba(0.1, 0.2, 0.3, 0.4));
        let channels = c.channels();
        assert_eq!(channels.len(), 4);
        assert_eq!(c.with_channels(&channels), c);

        let n = Value::Number(3.0);
        assert_eq!(n.with_channels(&[7.0]), Value::Number(7.0));
        assert_eq!(n.with_channels(&[]), n);
    }

    #[test]
    fn test_typed_extraction() {
        assert_eq!(f32::from_value(Value::Number(2.0)), Some(2.0));
        assert_eq!(f32::from_value(Value::Color(Color::BLACK)), None);
        assert_eq!(Color::from_value(Value::Color(Color::BLACK)), Some(Color::BLACK));
    }
}
