//! Animation scheduler
//!
//! Owns the motion graph and every active animation component, and routes
//! frame tokens from the bundled [`FrameQueue`] back to whichever component
//! requested them. Hosts call [`AnimationScheduler::tick`] once per display
//! frame.

use crate::bag::PropertyBindings;
use crate::choreography::{Choreographer, Choreography, RunToken};
use crate::clock::{Clock, MonotonicClock};
use crate::frame::{FrameContext, FrameQueue, TickToken};
use crate::gesture::{GestureBinding, GestureConfig, GestureRelease};
use crate::playback::{PlaybackConfig, PlaybackController};
use crate::spring::{SpringConfig, SpringSmoother, DEFAULT_MAX_FRAME_DELTA_MS};
use crate::timeline::PhaseTimeline;
use kinema_core::{Animatable, MotionGraph, MotionValue, PointerEvent, Result};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use std::rc::Rc;

new_key_type! {
    pub struct SpringId;
    pub struct PlaybackId;
    pub struct ChoreographerId;
    pub struct GestureId;
}

/// Scheduler settings
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchedulerConfig {
    /// Frame rate hosts should drive `tick` at
    pub target_fps: u32,
    /// Longest frame springs created through the scheduler will integrate
    pub max_frame_delta_ms: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            target_fps: 120,
            max_frame_delta_ms: DEFAULT_MAX_FRAME_DELTA_MS,
        }
    }
}

/// Something that finished during a tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerEvent {
    SpringSettled(SpringId),
    PlaybackCompleted(PlaybackId),
    ChoreographyFinished(ChoreographerId, RunToken),
    GestureSettled(GestureId),
}

#[derive(Clone, Copy)]
enum Owner {
    Spring(SpringId),
    Playback(PlaybackId),
    Choreographer(ChoreographerId),
    Gesture(GestureId),
}

/// The animation scheduler that ticks all active animations
pub struct AnimationScheduler {
    graph: MotionGraph,
    queue: Rc<FrameQueue>,
    ctx: FrameContext,
    config: SchedulerConfig,
    springs: SlotMap<SpringId, SpringSmoother>,
    playbacks: SlotMap<PlaybackId, PlaybackController>,
    choreographers: SlotMap<ChoreographerId, Choreographer>,
    gestures: SlotMap<GestureId, GestureBinding>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::with_clock(Rc::new(MonotonicClock::new()))
    }

    /// Use an explicit clock, e.g. a `ManualClock` in tests
    pub fn with_clock(clock: Rc<dyn Clock>) -> Self {
        Self::with_config(SchedulerConfig::default(), clock)
    }

    pub fn with_config(config: SchedulerConfig, clock: Rc<dyn Clock>) -> Self {
        let queue = Rc::new(FrameQueue::new());
        let ctx = FrameContext::new(clock, queue.clone());
        Self {
            graph: MotionGraph::new(),
            queue,
            ctx,
            config,
            springs: SlotMap::with_key(),
            playbacks: SlotMap::with_key(),
            choreographers: SlotMap::with_key(),
            gestures: SlotMap::with_key(),
        }
    }

    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    pub fn set_target_fps(&mut self, fps: u32) {
        self.config.target_fps = fps.max(1);
    }

    /// Milliseconds between frames at the target rate
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / f64::from(self.config.target_fps.max(1))
    }

    pub fn graph(&self) -> &MotionGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut MotionGraph {
        &mut self.graph
    }

    /// Frame context for components built outside the scheduler
    pub fn context(&self) -> FrameContext {
        self.ctx.clone()
    }

    /// Called when a frame is requested while none were pending, so an idle
    /// host knows to start its frame loop again
    pub fn set_wake_callback<F: Fn() + 'static>(&self, wake: F) {
        self.queue.set_wake_callback(wake);
    }

    // ------------------------------------------------------------------
    // Springs
    // ------------------------------------------------------------------

    /// Spring-smoothed copy of `source`; read it through
    /// [`SpringSmoother::output`]
    pub fn create_spring<T: Animatable>(&mut self, source: MotionValue<T>, config: SpringConfig) -> Result<SpringId> {
        let spring = SpringSmoother::new(&mut self.graph, source, config, self.ctx.clone())?
            .with_max_frame_delta(self.config.max_frame_delta_ms);
        Ok(self.springs.insert(spring))
    }

    pub fn add_spring(&mut self, spring: SpringSmoother) -> SpringId {
        self.springs.insert(spring)
    }

    pub fn spring(&self, id: SpringId) -> Option<&SpringSmoother> {
        self.springs.get(id)
    }

    /// Detach the spring; its output keeps its last value
    pub fn remove_spring(&mut self, id: SpringId) -> bool {
        match self.springs.remove(id) {
            Some(spring) => {
                spring.detach(&mut self.graph);
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------

    pub fn add_playback(
        &mut self,
        timeline: Rc<PhaseTimeline>,
        bindings: PropertyBindings,
        config: PlaybackConfig,
    ) -> Result<PlaybackId> {
        let controller = PlaybackController::new(&mut self.graph, timeline, bindings, config, self.ctx.clone())?;
        Ok(self.playbacks.insert(controller))
    }

    pub fn playback(&self, id: PlaybackId) -> Option<&PlaybackController> {
        self.playbacks.get(id)
    }

    pub fn play(&mut self, id: PlaybackId) {
        if let Some(playback) = self.playbacks.get_mut(id) {
            playback.play();
        }
    }

    pub fn pause(&mut self, id: PlaybackId) {
        if let Some(playback) = self.playbacks.get_mut(id) {
            playback.pause();
        }
    }

    pub fn seek(&mut self, id: PlaybackId, progress: f32) -> Result<()> {
        match self.playbacks.get_mut(id) {
            Some(playback) => playback.seek(&mut self.graph, progress),
            None => Ok(()),
        }
    }

    pub fn skip(&mut self, id: PlaybackId, delta: f32) -> Result<()> {
        match self.playbacks.get_mut(id) {
            Some(playback) => playback.skip(&mut self.graph, delta),
            None => Ok(()),
        }
    }

    pub fn reset(&mut self, id: PlaybackId) -> Result<()> {
        match self.playbacks.get_mut(id) {
            Some(playback) => playback.reset(&mut self.graph),
            None => Ok(()),
        }
    }

    pub fn remove_playback(&mut self, id: PlaybackId) -> bool {
        match self.playbacks.remove(id) {
            Some(mut playback) => {
                playback.cancel_frame();
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Choreography
    // ------------------------------------------------------------------

    pub fn add_choreographer(&mut self, targets: Vec<PropertyBindings>) -> ChoreographerId {
        self.choreographers
            .insert(Choreographer::new(targets, self.ctx.clone()))
    }

    pub fn choreographer(&self, id: ChoreographerId) -> Option<&Choreographer> {
        self.choreographers.get(id)
    }

    /// Start `script` on the choreographer, replacing any run in progress.
    /// Returns `None` for an unknown id.
    pub fn run(&mut self, id: ChoreographerId, script: impl Into<Rc<Choreography>>) -> Result<Option<RunToken>> {
        match self.choreographers.get_mut(id) {
            Some(choreographer) => choreographer.run(&mut self.graph, script).map(Some),
            None => Ok(None),
        }
    }

    pub fn cancel_run(&mut self, id: ChoreographerId) {
        if let Some(choreographer) = self.choreographers.get_mut(id) {
            choreographer.cancel();
        }
    }

    pub fn remove_choreographer(&mut self, id: ChoreographerId) -> bool {
        match self.choreographers.remove(id) {
            Some(mut choreographer) => {
                choreographer.cancel();
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Gestures
    // ------------------------------------------------------------------

    pub fn bind_gesture(
        &mut self,
        x: MotionValue<f32>,
        y: MotionValue<f32>,
        config: GestureConfig,
    ) -> Result<GestureId> {
        let binding = GestureBinding::new(&mut self.graph, x, y, config, self.ctx.clone())?;
        Ok(self.gestures.insert(binding))
    }

    pub fn gesture(&self, id: GestureId) -> Option<&GestureBinding> {
        self.gestures.get(id)
    }

    pub fn gesture_mut(&mut self, id: GestureId) -> Option<&mut GestureBinding> {
        self.gestures.get_mut(id)
    }

    /// Feed a pointer event to a gesture. Returns the release outcome on
    /// pointer up.
    pub fn handle_pointer(&mut self, id: GestureId, event: PointerEvent) -> Result<Option<GestureRelease>> {
        match self.gestures.get_mut(id) {
            Some(gesture) => gesture.handle_pointer(&mut self.graph, event),
            None => Ok(None),
        }
    }

    /// Release the gesture's claims on its values
    pub fn unbind_gesture(&mut self, id: GestureId) -> bool {
        match self.gestures.remove(id) {
            Some(gesture) => {
                gesture.unbind(&mut self.graph);
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Frames
    // ------------------------------------------------------------------

    /// Run every frame callback that is due and report what finished
    pub fn tick(&mut self) -> Vec<SchedulerEvent> {
        let due = self.queue.take_due();
        if due.is_empty() {
            return Vec::new();
        }

        let owners = self.owners();
        let mut events = Vec::new();
        for token in due {
            let Some(owner) = owners.get(&token).copied() else {
                tracing::trace!(token = token.raw(), "dropping orphaned frame");
                continue;
            };
            match self.dispatch(owner, token) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(err) => tracing::warn!(token = token.raw(), error = %err, "animation frame failed"),
            }
        }
        events
    }

    /// Whether any component is waiting for a frame
    pub fn has_active_animations(&self) -> bool {
        self.queue.has_pending()
    }

    pub fn spring_count(&self) -> usize {
        self.springs.len()
    }

    pub fn playback_count(&self) -> usize {
        self.playbacks.len()
    }

    pub fn choreographer_count(&self) -> usize {
        self.choreographers.len()
    }

    pub fn gesture_count(&self) -> usize {
        self.gestures.len()
    }

    fn owners(&self) -> FxHashMap<TickToken, Owner> {
        let mut owners = FxHashMap::default();
        for (id, spring) in &self.springs {
            if let Some(token) = spring.pending_tick() {
                owners.insert(token, Owner::Spring(id));
            }
        }
        for (id, playback) in &self.playbacks {
            if let Some(token) = playback.pending_tick() {
                owners.insert(token, Owner::Playback(id));
            }
        }
        for (id, choreographer) in &self.choreographers {
            if let Some(token) = choreographer.pending_tick() {
                owners.insert(token, Owner::Choreographer(id));
            }
        }
        for (id, gesture) in &self.gestures {
            for token in gesture.pending_ticks() {
                owners.insert(token, Owner::Gesture(id));
            }
        }
        owners
    }

    fn dispatch(&mut self, owner: Owner, token: TickToken) -> Result<Option<SchedulerEvent>> {
        let graph = &mut self.graph;
        let event = match owner {
            Owner::Spring(id) => match self.springs.get_mut(id) {
                Some(spring) => spring
                    .on_frame(token, graph)?
                    .then_some(SchedulerEvent::SpringSettled(id)),
                None => None,
            },
            Owner::Playback(id) => match self.playbacks.get_mut(id) {
                Some(playback) => playback
                    .on_frame(token, graph)?
                    .then_some(SchedulerEvent::PlaybackCompleted(id)),
                None => None,
            },
            Owner::Choreographer(id) => match self.choreographers.get_mut(id) {
                Some(choreographer) => choreographer
                    .on_frame(token, graph)?
                    .map(|run| SchedulerEvent::ChoreographyFinished(id, run)),
                None => None,
            },
            Owner::Gesture(id) => match self.gestures.get_mut(id) {
                Some(gesture) => gesture
                    .on_frame(token, graph)?
                    .then_some(SchedulerEvent::GestureSettled(id)),
                None => None,
            },
        };
        Ok(event)
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}
