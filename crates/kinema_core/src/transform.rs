//! Breakpoint transform chains
//!
//! A [`TransformChain`] maps a number onto an animatable output through
//! ordered breakpoints, like `[-100, 0, 100] -> [0.5, 1.0, 1.5]`. Inputs
//! between two breakpoints interpolate linearly; inputs outside the range
//! clamp to the nearest endpoint.

use crate::error::{MotionError, Result};
use crate::value::Animatable;

/// One `(input, output)` pair
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Breakpoint<T> {
    pub input: f32,
    pub output: T,
}

/// A validated, strictly increasing list of at least two breakpoints
#[derive(Clone, Debug, PartialEq)]
pub struct TransformChain<T: Animatable> {
    breakpoints: Vec<Breakpoint<T>>,
}

impl<T: Animatable> TransformChain<T> {
    /// Build from `(input, output)` pairs
    pub fn new(points: impl IntoIterator<Item = (f32, T)>) -> Result<Self> {
        let breakpoints: Vec<Breakpoint<T>> = points
            .into_iter()
            .map(|(input, output)| Breakpoint { input, output })
            .collect();

        if breakpoints.len() < 2 {
            return Err(MotionError::InvalidBreakpoints("need at least two breakpoints"));
        }
        if breakpoints.iter().any(|b| !b.input.is_finite()) {
            return Err(MotionError::InvalidBreakpoints("breakpoint inputs must be finite"));
        }
        if breakpoints.windows(2).any(|w| w[1].input <= w[0].input) {
            return Err(MotionError::InvalidBreakpoints(
                "breakpoint inputs must be strictly increasing",
            ));
        }

        Ok(Self { breakpoints })
    }

    /// Build from parallel input and output slices
    pub fn from_ranges(inputs: &[f32], outputs: &[T]) -> Result<Self> {
        if inputs.len() != outputs.len() {
            return Err(MotionError::InvalidBreakpoints(
                "input and output ranges differ in length",
            ));
        }
        Self::new(inputs.iter().copied().zip(outputs.iter().copied()))
    }

    pub fn breakpoints(&self) -> &[Breakpoint<T>] {
        &self.breakpoints
    }

    /// Input domain covered by the chain
    pub fn domain(&self) -> (f32, f32) {
        let first = self.breakpoints[0].input;
        let last = self.breakpoints[self.breakpoints.len() - 1].input;
        (first, last)
    }

    /// Map `input` to its output value
    pub fn sample(&self, input: f32) -> T {
        let first = &self.breakpoints[0];
        let last = &self.breakpoints[self.breakpoints.len() - 1];

        if input.is_nan() || input <= first.input {
            return first.output;
        }
        if input >= last.input {
            return last.output;
        }

        // First breakpoint strictly above `input`; guaranteed in 1..len
        let upper = self.breakpoints.partition_point(|b| b.input <= input);
        let lo = &self.breakpoints[upper - 1];
        let hi = &self.breakpoints[upper];
        let t = (input - lo.input) / (hi.input - lo.input);
        lo.output.lerp(&hi.output, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn test_linear_between_bracketing_breakpoints() {
        let chain = TransformChain::new([(-100.0, 0.5), (0.0, 1.0), (100.0, 1.5)]).unwrap();

        assert_eq!(chain.sample(0.0), 1.0);
        assert!((chain.sample(50.0) - 1.25).abs() < 1e-6);
        assert!((chain.sample(-50.0) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_clamps_outside_range() {
        let chain = TransformChain::new([(-100.0, 30.0), (100.0, -30.0)]).unwrap();

        assert_eq!(chain.sample(-1_000.0), 30.0);
        assert_eq!(chain.sample(1_000.0), -30.0);
        assert_eq!(chain.sample(f32::NAN), 30.0);
        assert_eq!(chain.domain(), (-100.0, 100.0));
    }

    #[test]
    fn test_exact_breakpoint_hits_its_output() {
        let chain = TransformChain::from_ranges(&[0.0, 0.5, 1.0], &[0.0, 1.0, 1.0]).unwrap();
        assert_eq!(chain.sample(0.5), 1.0);
        assert_eq!(chain.sample(0.75), 1.0);
    }

    #[test]
    fn test_color_breakpoints_interpolate_channel_wise() {
        let chain = TransformChain::new([
            (-100.0, Color::rgb(1.0, 0.0, 0.0)),
            (100.0, Color::rgb(0.0, 0.0, 1.0)),
        ])
        .unwrap();

        let mid = chain.sample(0.0);
        assert!((mid.r - 0.5).abs() < 1e-6);
        assert!((mid.b - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_invalid_breakpoints() {
        assert!(TransformChain::new([(0.0, 1.0)]).is_err());
        assert!(TransformChain::new([(0.0, 1.0), (0.0, 2.0)]).is_err());
        assert!(TransformChain::new([(1.0, 1.0), (0.0, 2.0)]).is_err());
        assert!(TransformChain::from_ranges(&[0.0, 1.0], &[1.0]).is_err());
    }
}
