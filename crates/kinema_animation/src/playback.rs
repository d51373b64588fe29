//! Timeline playback
//!
//! [`PlaybackController`] drives the progress of a [`PhaseTimeline`] from the
//! clock (play/pause) or directly (seek/skip), and writes every evaluated
//! bag to its bound motion values in one batch.
//!
//! While playing, progress is `(now - virtual_start) / duration`, where the
//! virtual start is chosen so that resuming or seeking continues from the
//! current progress without a jump.

use crate::bag::PropertyBindings;
use crate::frame::{FrameContext, FrameSlot, TickToken};
use crate::timeline::{clamp_progress, PhaseTimeline};
use kinema_core::{MotionError, MotionGraph, Result, StateMachine};
use std::rc::Rc;

/// Progress this close to 1 on a clock-driven frame snaps to exactly 1
const COMPLETION_SNAP: f32 = 1e-6;

/// Playback lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackStatus {
    Idle,
    Playing,
    Paused,
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackEvent {
    Play,
    Pause,
    /// Progress reached 1
    Finish,
    /// Progress set below 1 while not playing
    Scrub,
    Reset,
}

/// How out-of-range seeks are handled
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SeekPolicy {
    #[default]
    Clamp,
    Reject,
}

/// Playback configuration
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaybackConfig {
    /// Wall-clock time for progress 0 to 1
    pub duration_ms: f64,
    pub seek_policy: SeekPolicy,
}

impl PlaybackConfig {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            duration_ms,
            ..Self::default()
        }
    }

    pub fn with_seek_policy(mut self, policy: SeekPolicy) -> Self {
        self.seek_policy = policy;
        self
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            duration_ms: 5000.0,
            seek_policy: SeekPolicy::Clamp,
        }
    }
}

fn playback_fsm() -> StateMachine<PlaybackStatus, PlaybackEvent> {
    use PlaybackEvent as E;
    use PlaybackStatus as S;

    StateMachine::builder(S::Idle)
        .on_any(&[S::Idle, S::Paused], E::Play, S::Playing)
        .on(S::Playing, E::Pause, S::Paused)
        .on_any(&[S::Idle, S::Playing, S::Paused], E::Finish, S::Completed)
        .on_any(&[S::Idle, S::Completed], E::Scrub, S::Paused)
        .on_any(&[S::Playing, S::Paused, S::Completed], E::Reset, S::Idle)
        .build()
}

/// Plays a timeline into a set of bound motion values
pub struct PlaybackController {
    timeline: Rc<PhaseTimeline>,
    bindings: PropertyBindings,
    config: PlaybackConfig,
    fsm: StateMachine<PlaybackStatus, PlaybackEvent>,
    progress: f32,
    virtual_start_ms: f64,
    frame: FrameSlot,
    ctx: FrameContext,
}

impl PlaybackController {
    /// Bind `timeline` to motion values and apply progress 0.
    ///
    /// Every bound property must be produced by the timeline with the kind
    /// of its motion value.
    pub fn new(
        graph: &mut MotionGraph,
        timeline: Rc<PhaseTimeline>,
        bindings: PropertyBindings,
        config: PlaybackConfig,
        ctx: FrameContext,
    ) -> Result<Self> {
        if !(config.duration_ms.is_finite() && config.duration_ms > 0.0) {
            return Err(MotionError::InvalidDuration(config.duration_ms));
        }
        bindings.validate(graph, &timeline.evaluate(0.0))?;

        let controller = Self {
            timeline,
            bindings,
            config,
            fsm: playback_fsm(),
            progress: 0.0,
            virtual_start_ms: 0.0,
            frame: FrameSlot::default(),
            ctx,
        };
        controller.apply(graph)?;
        Ok(controller)
    }

    pub fn status(&self) -> PlaybackStatus {
        self.fsm.current_state()
    }

    pub fn is_playing(&self) -> bool {
        self.fsm.is_in(PlaybackStatus::Playing)
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn config(&self) -> PlaybackConfig {
        self.config
    }

    pub fn timeline(&self) -> &Rc<PhaseTimeline> {
        &self.timeline
    }

    pub fn bindings(&self) -> &PropertyBindings {
        &self.bindings
    }

    pub fn pending_tick(&self) -> Option<TickToken> {
        self.frame.pending()
    }

    /// Start or resume from the current progress. No-op while playing or
    /// once completed.
    pub fn play(&mut self) {
        if self.fsm.send(PlaybackEvent::Play).is_none() {
            return;
        }
        self.virtual_start_ms = self.start_for(self.progress);
        self.frame.arm(&self.ctx);
        tracing::debug!(progress = self.progress, "playback started");
    }

    /// Freeze progress. Redundant pauses are no-ops.
    pub fn pause(&mut self) {
        if self.fsm.send(PlaybackEvent::Pause).is_none() {
            return;
        }
        self.frame.cancel(&self.ctx);
        tracing::debug!(progress = self.progress, "playback paused");
    }

    /// Jump to `progress` and apply it immediately. Legal in any state.
    ///
    /// Out-of-range values clamp or fail with `OutOfRangeSeek` depending on
    /// the seek policy. Seeking to 1 completes; seeking below 1 after
    /// completion pauses there.
    pub fn seek(&mut self, graph: &mut MotionGraph, progress: f32) -> Result<()> {
        let in_range = (0.0..=1.0).contains(&progress);
        if self.config.seek_policy == SeekPolicy::Reject && !in_range {
            return Err(MotionError::OutOfRangeSeek { requested: progress });
        }
        self.move_to(graph, clamp_progress(progress))
    }

    /// Seek by `delta`, always clamping at the ends
    pub fn skip(&mut self, graph: &mut MotionGraph, delta: f32) -> Result<()> {
        self.move_to(graph, clamp_progress(self.progress + delta))
    }

    /// Cancel playback, return to progress 0 and apply it
    pub fn reset(&mut self, graph: &mut MotionGraph) -> Result<()> {
        self.frame.cancel(&self.ctx);
        self.fsm.send(PlaybackEvent::Reset);
        self.progress = 0.0;
        tracing::debug!("playback reset");
        self.apply(graph)
    }

    /// Stop requesting frames without changing state or progress
    pub fn cancel_frame(&mut self) {
        self.frame.cancel(&self.ctx);
    }

    /// Writes `progress` first; state and progress only change once the
    /// write has landed.
    fn move_to(&mut self, graph: &mut MotionGraph, progress: f32) -> Result<()> {
        self.apply_at(graph, progress)?;
        self.progress = progress;

        if progress >= 1.0 {
            if self.fsm.send(PlaybackEvent::Finish).is_some() {
                self.frame.cancel(&self.ctx);
                tracing::debug!("playback completed by seek");
            }
        } else if self.is_playing() {
            self.virtual_start_ms = self.start_for(progress);
        } else {
            self.fsm.send(PlaybackEvent::Scrub);
        }
        Ok(())
    }

    fn start_for(&self, progress: f32) -> f64 {
        self.ctx.now() - progress as f64 * self.config.duration_ms
    }

    fn apply(&self, graph: &mut MotionGraph) -> Result<()> {
        self.apply_at(graph, self.progress)
    }

    fn apply_at(&self, graph: &mut MotionGraph, progress: f32) -> Result<()> {
        let bag = self.timeline.evaluate(progress);
        self.bindings.apply(graph, &bag)
    }

    /// Advance from the clock. Returns `true` on the frame playback
    /// completes; stale tokens and frames outside `Playing` are ignored.
    pub fn on_frame(&mut self, token: TickToken, graph: &mut MotionGraph) -> Result<bool> {
        if !self.frame.accept(token) || !self.is_playing() {
            return Ok(false);
        }

        let elapsed = self.ctx.now() - self.virtual_start_ms;
        let mut progress = clamp_progress((elapsed / self.config.duration_ms) as f32);
        if 1.0 - progress <= COMPLETION_SNAP {
            progress = 1.0;
        }
        if let Err(err) = self.apply_at(graph, progress) {
            // The frame was consumed; pause so `play` can re-arm
            self.fsm.send(PlaybackEvent::Pause);
            tracing::warn!(error = %err, "playback paused on failed frame");
            return Err(err);
        }
        self.progress = progress;

        if progress >= 1.0 {
            self.fsm.send(PlaybackEvent::Finish);
            tracing::debug!("playback completed");
            return Ok(true);
        }

        tracing::trace!(progress, "playback frame");
        self.frame.arm(&self.ctx);
        Ok(false)
    }
}
