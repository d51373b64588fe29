//! Pointer input events
//!
//! The engine is agnostic to the input device; platform layers translate
//! mouse, touch or pen input into these events.

use crate::geometry::Point;

/// Phase of a pointer interaction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// A pointer sample in device coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub position: Point,
    pub pointer_id: u64,
    /// Milliseconds on the same time base as the animation clock
    pub timestamp_ms: f64,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, x: f32, y: f32, timestamp_ms: f64) -> Self {
        Self {
            phase,
            position: Point::new(x, y),
            pointer_id: 0,
            timestamp_ms,
        }
    }

    pub fn down(x: f32, y: f32, timestamp_ms: f64) -> Self {
        Self::new(PointerPhase::Down, x, y, timestamp_ms)
    }

    pub fn moved(x: f32, y: f32, timestamp_ms: f64) -> Self {
        Self::new(PointerPhase::Move, x, y, timestamp_ms)
    }

    pub fn up(x: f32, y: f32, timestamp_ms: f64) -> Self {
        Self::new(PointerPhase::Up, x, y, timestamp_ms)
    }

    /// Pointer lost (window blur, touch cancelled)
    pub fn cancel(x: f32, y: f32, timestamp_ms: f64) -> Self {
        Self::new(PointerPhase::Cancel, x, y, timestamp_ms)
    }

    pub fn with_pointer_id(mut self, pointer_id: u64) -> Self {
        self.pointer_id = pointer_id;
        self
    }
}
