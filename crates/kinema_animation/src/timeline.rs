//! Phase timelines
//!
//! A [`PhaseTimeline`] maps one normalized progress value onto a whole
//! [`PropertyBag`]. Progress `0..=1` is partitioned into contiguous phases,
//! each with its own formula over local progress.
//!
//! Phases are half-open `[start, end)` except the last, which is closed.
//! Progress exactly on a boundary belongs to the later phase at local
//! progress 0.
//!
//! # Example
//!
//! ```rust
//! use kinema_animation::{PhaseTimeline, PropertyBag};
//!
//! let timeline = PhaseTimeline::builder()
//!     .phase(0.0, 0.5, |t| PropertyBag::new().with("x", 100.0 * t))
//!     .phase(0.5, 1.0, |t| PropertyBag::new().with("x", 100.0 - 100.0 * t))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(timeline.evaluate(0.25).number("x"), Some(50.0));
//! assert_eq!(timeline.evaluate(1.0).number("x"), Some(0.0));
//! ```

use crate::bag::PropertyBag;
use crate::easing::Easing;
use kinema_core::{PhaseLayoutIssue, Result};
use std::fmt;

/// Slack allowed when comparing phase boundaries
pub const BOUNDARY_TOLERANCE: f32 = 1e-6;

/// Local progress values at which a phase's key set must match the first phase
const KEY_SAMPLES: [f32; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// Clamp progress into `0..=1`; NaN reads as 0
pub fn clamp_progress(progress: f32) -> f32 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

type Interpolate = Box<dyn Fn(f32) -> PropertyBag>;

/// One contiguous sub-range of progress
pub struct Phase {
    start: f32,
    end: f32,
    interpolate: Interpolate,
}

impl Phase {
    pub fn new<F>(start: f32, end: f32, interpolate: F) -> Self
    where
        F: Fn(f32) -> PropertyBag + 'static,
    {
        Self {
            start,
            end,
            interpolate: Box::new(interpolate),
        }
    }

    pub fn start(&self) -> f32 {
        self.start
    }

    pub fn end(&self) -> f32 {
        self.end
    }

    /// `(progress - start) / (end - start)`, clamped to `0..=1`
    pub fn local_progress(&self, progress: f32) -> f32 {
        clamp_progress((progress - self.start) / (self.end - self.start))
    }

    /// Evaluate at local progress
    pub fn evaluate(&self, local: f32) -> PropertyBag {
        (self.interpolate)(clamp_progress(local))
    }
}

impl fmt::Debug for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Phase")
            .field("start", &self.start)
            .field("end", &self.end)
            .finish_non_exhaustive()
    }
}

/// Ordered phases partitioning `0..=1`
#[derive(Debug)]
pub struct PhaseTimeline {
    phases: Vec<Phase>,
}

impl PhaseTimeline {
    pub fn builder() -> PhaseTimelineBuilder {
        PhaseTimelineBuilder::default()
    }

    /// Validate and build.
    ///
    /// Rejects empty lists, empty or inverted ranges, out-of-order phases,
    /// gaps, overlaps, ranges not covering `0..=1`, and phases producing a
    /// different property set than the first.
    pub fn new(phases: Vec<Phase>) -> Result<Self> {
        validate_layout(&phases)?;
        Ok(Self { phases })
    }

    /// One linear phase per pair of consecutive keyframes, eased with
    /// `easing`. Offsets must run from 0 to 1.
    pub fn from_keyframes(keyframes: Vec<(f32, PropertyBag)>, easing: Easing) -> Result<Self> {
        let Some((_, first)) = keyframes.first() else {
            return Err(PhaseLayoutIssue::Empty.into());
        };
        if let Some(index) = keyframes.iter().position(|(_, bag)| !bag.same_keys(first)) {
            return Err(PhaseLayoutIssue::KeyMismatch { index }.into());
        }
        if keyframes.len() < 2 {
            return Err(PhaseLayoutIssue::NotCovering {
                start: keyframes[0].0,
                end: keyframes[0].0,
            }
            .into());
        }

        let phases = keyframes
            .windows(2)
            .map(|pair| {
                let (start, from) = pair[0].clone();
                let (end, to) = pair[1].clone();
                Phase::new(start, end, move |t| from.lerp(&to, easing.apply(t)))
            })
            .collect();
        Self::new(phases)
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Index of the phase owning `progress` (after clamping)
    pub fn phase_at(&self, progress: f32) -> usize {
        let p = clamp_progress(progress);
        self.phases
            .partition_point(|phase| phase.start <= p)
            .saturating_sub(1)
    }

    /// Property values at `progress`. Pure; out-of-range progress and NaN
    /// evaluate as clamped.
    pub fn evaluate(&self, progress: f32) -> PropertyBag {
        let p = clamp_progress(progress);
        let phase = &self.phases[self.phase_at(p)];
        phase.evaluate(phase.local_progress(p))
    }
}

fn validate_layout(phases: &[Phase]) -> std::result::Result<(), PhaseLayoutIssue> {
    let (Some(first), Some(last)) = (phases.first(), phases.last()) else {
        return Err(PhaseLayoutIssue::Empty);
    };

    for (index, phase) in phases.iter().enumerate() {
        let finite = phase.start.is_finite() && phase.end.is_finite();
        if !finite || phase.end - phase.start <= BOUNDARY_TOLERANCE {
            return Err(PhaseLayoutIssue::EmptyRange {
                index,
                start: phase.start,
                end: phase.end,
            });
        }
    }

    for (offset, pair) in phases.windows(2).enumerate() {
        let (prev, next) = (&pair[0], &pair[1]);
        let index = offset + 1;

        if next.start < prev.start {
            return Err(PhaseLayoutIssue::OutOfOrder {
                index,
                start: next.start,
            });
        }
        let seam = next.start - prev.end;
        if seam > BOUNDARY_TOLERANCE {
            return Err(PhaseLayoutIssue::Gap {
                index,
                end: prev.end,
                next_start: next.start,
            });
        }
        if seam < -BOUNDARY_TOLERANCE {
            return Err(PhaseLayoutIssue::Overlap {
                index,
                end: prev.end,
                next_start: next.start,
            });
        }
    }

    if first.start.abs() > BOUNDARY_TOLERANCE || (last.end - 1.0).abs() > BOUNDARY_TOLERANCE {
        return Err(PhaseLayoutIssue::NotCovering {
            start: first.start,
            end: last.end,
        });
    }

    // Phases are opaque, so key sets are checked at a few local points
    let reference = first.evaluate(0.0);
    for (index, phase) in phases.iter().enumerate() {
        if KEY_SAMPLES.iter().any(|t| !phase.evaluate(*t).same_keys(&reference)) {
            return Err(PhaseLayoutIssue::KeyMismatch { index });
        }
    }

    Ok(())
}

/// Builder for [`PhaseTimeline`]
#[derive(Default)]
pub struct PhaseTimelineBuilder {
    phases: Vec<Phase>,
}

impl PhaseTimelineBuilder {
    /// Append a phase covering `start..end`
    pub fn phase<F>(mut self, start: f32, end: f32, interpolate: F) -> Self
    where
        F: Fn(f32) -> PropertyBag + 'static,
    {
        self.phases.push(Phase::new(start, end, interpolate));
        self
    }

    pub fn build(self) -> Result<PhaseTimeline> {
        PhaseTimeline::new(self.phases)
    }
}
