//! Motion engine error types

use crate::motion::ValueId;
use crate::value::ValueKind;
use thiserror::Error;

/// Why a phase list was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhaseLayoutIssue {
    #[error("timeline has no phases")]
    Empty,

    #[error("phase {index} has an empty or inverted range {start}..{end}")]
    EmptyRange { index: usize, start: f32, end: f32 },

    #[error("phase {index} starts at {start}, before the previous phase")]
    OutOfOrder { index: usize, start: f32 },

    #[error("gap between {end} and {next_start} before phase {index}")]
    Gap {
        index: usize,
        end: f32,
        next_start: f32,
    },

    #[error("phase {index} starts at {next_start}, overlapping the previous phase ending at {end}")]
    Overlap {
        index: usize,
        end: f32,
        next_start: f32,
    },

    #[error("phases cover {start}..{end} instead of 0..1")]
    NotCovering { start: f32, end: f32 },

    #[error("phase {index} produces a different property set than phase 0")]
    KeyMismatch { index: usize },
}

/// Errors raised synchronously at the point of misuse
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    /// Linking `output` to `input` would close a loop in the value graph
    #[error("Cyclic dependency: {output:?} already feeds {input:?}")]
    CyclicDependency { input: ValueId, output: ValueId },

    #[error("Invalid phase layout: {0}")]
    InvalidPhaseLayout(PhaseLayoutIssue),

    /// Value is already claimed by another driver
    #[error("Gesture conflict: {value:?} is already bound to another driver")]
    GestureConflict { value: ValueId },

    #[error("Seek to {requested} is outside 0..=1")]
    OutOfRangeSeek { requested: f32 },

    #[error("Invalid breakpoints: {0}")]
    InvalidBreakpoints(&'static str),

    #[error("Invalid spring config: {0}")]
    InvalidSpringConfig(&'static str),

    /// Durations must be finite and positive
    #[error("Invalid duration: {0} ms")]
    InvalidDuration(f64),

    /// Handle refers to a removed value
    #[error("Unknown motion value")]
    UnknownValue,

    /// Derived values are written by their transform chain only
    #[error("Motion value {0:?} is derived and cannot be set directly")]
    ReadOnly(ValueId),

    #[error("Value kind mismatch: expected {expected:?}, found {found:?}")]
    KindMismatch { expected: ValueKind, found: ValueKind },

    #[error("Property `{0}` is bound but never produced")]
    UnboundProperty(String),
}

impl From<PhaseLayoutIssue> for MotionError {
    fn from(issue: PhaseLayoutIssue) -> Self {
        MotionError::InvalidPhaseLayout(issue)
    }
}

/// Result type for motion engine operations
pub type Result<T> = std::result::Result<T, MotionError>;
