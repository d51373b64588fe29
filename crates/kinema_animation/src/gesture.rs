//! Drag gesture bindings
//!
//! [`GestureBinding`] couples pointer movement to an `(x, y)` pair of motion
//! values:
//!
//! - Displacement past a constraint is reduced elastically:
//!   `limit + elasticity * (raw - limit)` (0 = hard stop, 1 = free)
//! - On release, a commit rule decides between commit (values stay, caller
//!   is notified) and snap-back (springs animate the pair back to rest)
//! - Both values are claimed exclusively while the binding lives
//!
//! Lifecycle: `Idle -> Dragging -> Idle` on commit, or
//! `Dragging -> Settling -> Idle` on snap-back. Grabbing during snap-back
//! interrupts the springs.

use crate::frame::{FrameContext, TickToken};
use crate::spring::{SpringConfig, SpringSmoother};
use kinema_core::{
    DragConstraints, DriverId, MotionError, MotionGraph, MotionValue, Point, PointerEvent, PointerPhase, Result,
    StateMachine, Value,
};
use smallvec::SmallVec;
use std::fmt;
use std::rc::Rc;

/// Pointer samples older than this are ignored for release velocity
const VELOCITY_WINDOW_MS: f64 = 100.0;

/// Which axes follow the pointer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DragAxis {
    #[default]
    Both,
    X,
    Y,
}

impl DragAxis {
    fn mask(self, p: Point) -> Point {
        match self {
            DragAxis::Both => p,
            DragAxis::X => Point::new(p.x, 0.0),
            DragAxis::Y => Point::new(0.0, p.y),
        }
    }
}

/// Decides commit vs snap-back from the pointer offset and release velocity
#[derive(Clone, Default)]
pub enum CommitRule {
    #[default]
    Never,
    /// `|offset.x| > threshold`
    OffsetX(f32),
    /// `|offset.y| > threshold`
    OffsetY(f32),
    /// Offset length greater than the threshold
    Distance(f32),
    Custom(Rc<dyn Fn(Point, Point) -> bool>),
}

impl CommitRule {
    pub fn custom<F: Fn(Point, Point) -> bool + 'static>(rule: F) -> Self {
        CommitRule::Custom(Rc::new(rule))
    }

    pub fn should_commit(&self, offset: Point, velocity: Point) -> bool {
        match self {
            CommitRule::Never => false,
            CommitRule::OffsetX(threshold) => offset.x.abs() > *threshold,
            CommitRule::OffsetY(threshold) => offset.y.abs() > *threshold,
            CommitRule::Distance(threshold) => offset.length() > *threshold,
            CommitRule::Custom(rule) => rule(offset, velocity),
        }
    }
}

impl fmt::Debug for CommitRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitRule::Never => f.write_str("Never"),
            CommitRule::OffsetX(t) => f.debug_tuple("OffsetX").field(t).finish(),
            CommitRule::OffsetY(t) => f.debug_tuple("OffsetY").field(t).finish(),
            CommitRule::Distance(t) => f.debug_tuple("Distance").field(t).finish(),
            CommitRule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Drag behavior
#[derive(Clone, Debug)]
pub struct GestureConfig {
    pub constraints: DragConstraints,
    /// 0 = hard stop at the constraint, 1 = no resistance
    pub elasticity: f32,
    pub axis: DragAxis,
    pub commit: CommitRule,
    /// Spring used to return to rest
    pub snap_spring: SpringConfig,
}

impl GestureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_constraints(mut self, constraints: DragConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_elasticity(mut self, elasticity: f32) -> Self {
        self.elasticity = elasticity;
        self
    }

    pub fn with_axis(mut self, axis: DragAxis) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_commit(mut self, commit: CommitRule) -> Self {
        self.commit = commit;
        self
    }

    pub fn with_snap_spring(mut self, spring: SpringConfig) -> Self {
        self.snap_spring = spring;
        self
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            constraints: DragConstraints::UNBOUNDED,
            elasticity: 0.5,
            axis: DragAxis::Both,
            commit: CommitRule::Never,
            snap_spring: SpringConfig::new(500.0, 25.0, 1.0),
        }
    }
}

/// Soft clamp of one axis
pub fn elastic(raw: f32, min: f32, max: f32, elasticity: f32) -> f32 {
    if raw < min {
        min + elasticity * (raw - min)
    } else if raw > max {
        max + elasticity * (raw - max)
    } else {
        raw
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureStatus {
    Idle,
    Dragging,
    Settling,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureEvent {
    Grab,
    Commit,
    SnapBack,
    Settle,
}

fn gesture_fsm() -> StateMachine<GestureStatus, GestureEvent> {
    use GestureEvent as E;
    use GestureStatus as S;

    StateMachine::builder(S::Idle)
        .on_any(&[S::Idle, S::Settling], E::Grab, S::Dragging)
        .on(S::Dragging, E::Commit, S::Idle)
        .on(S::Dragging, E::SnapBack, S::Settling)
        .on(S::Settling, E::Settle, S::Idle)
        .build()
}

/// What happened when the pointer was released
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureRelease {
    /// Pointer offset from the grab point (after axis locking)
    pub offset: Point,
    /// Pointer velocity in units per second
    pub velocity: Point,
    pub committed: bool,
}

/// Binds pointer drags to a pair of motion values
pub struct GestureBinding {
    x: MotionValue<f32>,
    y: MotionValue<f32>,
    driver: DriverId,
    config: GestureConfig,
    fsm: StateMachine<GestureStatus, GestureEvent>,
    pointer_id: Option<u64>,
    grab_pointer: Point,
    grab_value: Point,
    samples: SmallVec<[(f64, Point); 8]>,
    rest_x: MotionValue<f32>,
    rest_y: MotionValue<f32>,
    spring_x: SpringSmoother,
    spring_y: SpringSmoother,
    on_commit: Option<Box<dyn FnMut(&GestureRelease)>>,
}

impl GestureBinding {
    /// Claim `x` and `y` for this binding. Fails with `GestureConflict` if
    /// either is already bound.
    pub fn new(
        graph: &mut MotionGraph,
        x: MotionValue<f32>,
        y: MotionValue<f32>,
        config: GestureConfig,
        ctx: FrameContext,
    ) -> Result<Self> {
        let driver = graph.allocate_driver();
        graph.claim(x.id(), driver)?;
        if let Err(err) = graph.claim(y.id(), driver) {
            graph.release(x.id(), driver);
            return Err(err);
        }

        match Self::with_claims(graph, x, y, driver, config, ctx) {
            Ok(binding) => Ok(binding),
            Err(err) => {
                graph.release(x.id(), driver);
                graph.release(y.id(), driver);
                Err(err)
            }
        }
    }

    fn with_claims(
        graph: &mut MotionGraph,
        x: MotionValue<f32>,
        y: MotionValue<f32>,
        driver: DriverId,
        mut config: GestureConfig,
        ctx: FrameContext,
    ) -> Result<Self> {
        let start = Point::new(
            graph.get(x).ok_or(MotionError::UnknownValue)?,
            graph.get(y).ok_or(MotionError::UnknownValue)?,
        );
        config.elasticity = config.elasticity.clamp(0.0, 1.0);

        let rest_x = graph.create(start.x);
        let rest_y = graph.create(start.y);
        let spring_x = match SpringSmoother::driving(graph, rest_x, x, config.snap_spring, ctx.clone()) {
            Ok(spring) => spring,
            Err(err) => {
                remove_rest_values(graph, rest_x, rest_y);
                return Err(err);
            }
        };
        let spring_y = match SpringSmoother::driving(graph, rest_y, y, config.snap_spring, ctx) {
            Ok(spring) => spring,
            Err(err) => {
                spring_x.detach(graph);
                remove_rest_values(graph, rest_x, rest_y);
                return Err(err);
            }
        };

        Ok(Self {
            x,
            y,
            driver,
            config,
            fsm: gesture_fsm(),
            pointer_id: None,
            grab_pointer: Point::ZERO,
            grab_value: start,
            samples: SmallVec::new(),
            rest_x,
            rest_y,
            spring_x,
            spring_y,
            on_commit: None,
        })
    }

    /// Called with the release details whenever a drag commits
    pub fn on_commit<F: FnMut(&GestureRelease) + 'static>(&mut self, callback: F) {
        self.on_commit = Some(Box::new(callback));
    }

    pub fn status(&self) -> GestureStatus {
        self.fsm.current_state()
    }

    pub fn is_dragging(&self) -> bool {
        self.fsm.is_in(GestureStatus::Dragging)
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn x(&self) -> MotionValue<f32> {
        self.x
    }

    pub fn y(&self) -> MotionValue<f32> {
        self.y
    }

    pub fn set_constraints(&mut self, constraints: DragConstraints) {
        self.config.constraints = constraints;
    }

    /// Frames currently requested by the snap-back springs
    pub fn pending_ticks(&self) -> SmallVec<[TickToken; 2]> {
        [self.spring_x.pending_tick(), self.spring_y.pending_tick()]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Route a pointer event to the matching handler
    pub fn handle_pointer(&mut self, graph: &mut MotionGraph, event: PointerEvent) -> Result<Option<GestureRelease>> {
        match event.phase {
            PointerPhase::Down => self.on_start(graph, event).map(|_| None),
            PointerPhase::Move => self.on_move(graph, event).map(|_| None),
            PointerPhase::Up | PointerPhase::Cancel => self.on_end(graph, event),
        }
    }

    /// Grab: remember where the pointer and the values are. Interrupts a
    /// running snap-back.
    pub fn on_start(&mut self, graph: &mut MotionGraph, event: PointerEvent) -> Result<()> {
        if self.fsm.send(GestureEvent::Grab).is_none() {
            return Ok(());
        }

        self.spring_x.halt();
        self.spring_y.halt();
        self.pointer_id = Some(event.pointer_id);
        self.grab_pointer = event.position;
        self.grab_value = Point::new(
            graph.get(self.x).ok_or(MotionError::UnknownValue)?,
            graph.get(self.y).ok_or(MotionError::UnknownValue)?,
        );
        self.samples.clear();
        self.samples.push((event.timestamp_ms, event.position));
        tracing::trace!(x = self.grab_value.x, y = self.grab_value.y, "drag started");
        Ok(())
    }

    /// Follow the pointer, writing both values in one batch
    pub fn on_move(&mut self, graph: &mut MotionGraph, event: PointerEvent) -> Result<()> {
        if !self.is_dragging() || self.pointer_id != Some(event.pointer_id) {
            return Ok(());
        }

        self.record(event);
        let target = self.displaced(self.offset_to(event.position));
        graph.set_many([
            (self.x.id(), Value::Number(target.x)),
            (self.y.id(), Value::Number(target.y)),
        ])
    }

    /// Release: commit or snap back
    pub fn on_end(&mut self, graph: &mut MotionGraph, event: PointerEvent) -> Result<Option<GestureRelease>> {
        if !self.is_dragging() || self.pointer_id != Some(event.pointer_id) {
            return Ok(None);
        }
        self.on_move(graph, event)?;

        let release = GestureRelease {
            offset: self.offset_to(event.position),
            velocity: self.config.axis.mask(self.release_velocity()),
            committed: false,
        };
        self.pointer_id = None;

        if self.config.commit.should_commit(release.offset, release.velocity) {
            let release = GestureRelease {
                committed: true,
                ..release
            };
            self.fsm.send(GestureEvent::Commit);
            tracing::debug!(offset_x = release.offset.x, offset_y = release.offset.y, "gesture committed");
            if let Some(callback) = self.on_commit.as_mut() {
                callback(&release);
            }
            return Ok(Some(release));
        }

        self.fsm.send(GestureEvent::SnapBack);
        let rest = self.config.constraints.clamp(self.grab_value);
        let here = Point::new(
            graph.get(self.x).ok_or(MotionError::UnknownValue)?,
            graph.get(self.y).ok_or(MotionError::UnknownValue)?,
        );
        graph.set(self.rest_x, rest.x)?;
        graph.set(self.rest_y, rest.y)?;
        self.spring_x
            .retarget_from(graph, Value::Number(here.x), &[release.velocity.x])?;
        self.spring_y
            .retarget_from(graph, Value::Number(here.y), &[release.velocity.y])?;
        tracing::debug!(rest_x = rest.x, rest_y = rest.y, "gesture snapping back");

        if self.spring_x.is_settled() && self.spring_y.is_settled() {
            self.fsm.send(GestureEvent::Settle);
        }
        Ok(Some(release))
    }

    /// Advance the snap-back springs. Returns `true` on the frame the pair
    /// comes to rest.
    pub fn on_frame(&mut self, token: TickToken, graph: &mut MotionGraph) -> Result<bool> {
        if self.spring_x.pending_tick() == Some(token) {
            self.spring_x.on_frame(token, graph)?;
        } else if self.spring_y.pending_tick() == Some(token) {
            self.spring_y.on_frame(token, graph)?;
        } else {
            return Ok(false);
        }

        let settled = self.spring_x.is_settled() && self.spring_y.is_settled();
        if settled && self.fsm.send(GestureEvent::Settle).is_some() {
            tracing::debug!("gesture settled");
            return Ok(true);
        }
        Ok(false)
    }

    /// Stop the springs, drop helper values and release both claims
    pub fn unbind(self, graph: &mut MotionGraph) {
        self.spring_x.detach(graph);
        self.spring_y.detach(graph);
        remove_rest_values(graph, self.rest_x, self.rest_y);
        graph.release(self.x.id(), self.driver);
        graph.release(self.y.id(), self.driver);
    }

    fn offset_to(&self, pointer: Point) -> Point {
        self.config.axis.mask(pointer - self.grab_pointer)
    }

    fn displaced(&self, offset: Point) -> Point {
        let raw = self.grab_value + offset;
        let c = &self.config.constraints;
        let e = self.config.elasticity;
        let x = match self.config.axis {
            DragAxis::Y => self.grab_value.x,
            _ => elastic(raw.x, c.min_x, c.max_x, e),
        };
        let y = match self.config.axis {
            DragAxis::X => self.grab_value.y,
            _ => elastic(raw.y, c.min_y, c.max_y, e),
        };
        Point::new(x, y)
    }

    fn record(&mut self, event: PointerEvent) {
        self.samples.push((event.timestamp_ms, event.position));
        let cutoff = event.timestamp_ms - VELOCITY_WINDOW_MS;
        // Always keep two samples so a slow release still has a baseline
        while self.samples.len() > 2 && self.samples[0].0 < cutoff {
            self.samples.remove(0);
        }
    }

    fn release_velocity(&self) -> Point {
        let (Some(&(t0, p0)), Some(&(t1, p1))) = (self.samples.first(), self.samples.last()) else {
            return Point::ZERO;
        };
        let dt = ((t1 - t0) / 1000.0) as f32;
        if dt <= 0.0 {
            return Point::ZERO;
        }
        (p1 - p0).scale(1.0 / dt)
    }
}

fn remove_rest_values(graph: &mut MotionGraph, rest_x: MotionValue<f32>, rest_y: MotionValue<f32>) {
    for rest in [rest_x, rest_y] {
        if let Err(err) = graph.remove(rest.id()) {
            tracing::warn!(value = ?rest.id(), error = %err, "failed to remove gesture rest value");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::frame::FrameQueue;
    use std::cell::RefCell;

    struct Rig {
        graph: MotionGraph,
        clock: Rc<ManualClock>,
        queue: Rc<FrameQueue>,
        ctx: FrameContext,
        x: MotionValue<f32>,
        y: MotionValue<f32>,
    }

    fn rig() -> Rig {
        let clock = Rc::new(ManualClock::new(0.0));
        let queue = Rc::new(FrameQueue::new());
        let ctx = FrameContext::new(clock.clone(), queue.clone());
        let mut graph = MotionGraph::new();
        let x = graph.create(0.0_f32);
        let y = graph.create(0.0_f32);
        Rig {
            graph,
            clock,
            queue,
            ctx,
            x,
            y,
        }
    }

    fn settle(rig: &mut Rig, binding: &mut GestureBinding) -> bool {
        let mut settled = false;
        for _ in 0..1000 {
            let due = rig.queue.take_due();
            if due.is_empty() {
                break;
            }
            rig.clock.advance(16.0);
            for token in due {
                settled |= binding.on_frame(token, &mut rig.graph).unwrap();
            }
        }
        settled
    }

    fn card_config() -> GestureConfig {
        GestureConfig::new()
            .with_constraints(DragConstraints::symmetric(50.0, 50.0))
            .with_elasticity(0.5)
            .with_commit(CommitRule::OffsetX(100.0))
    }

    #[test]
    fn test_elastic_formula() {
        assert_eq!(elastic(200.0, -50.0, 50.0, 0.5), 125.0);
        assert_eq!(elastic(-200.0, -50.0, 50.0, 0.5), -125.0);
        assert_eq!(elastic(20.0, -50.0, 50.0, 0.5), 20.0);
        assert_eq!(elastic(200.0, -50.0, 50.0, 0.0), 50.0);
        assert_eq!(elastic(200.0, -50.0, 50.0, 1.0), 200.0);
    }

    #[test]
    fn test_drag_past_constraint_is_elastic_and_monotone() {
        let mut rig = rig();
        let mut binding = GestureBinding::new(&mut rig.graph, rig.x, rig.y, card_config(), rig.ctx.clone()).unwrap();

        binding.on_start(&mut rig.graph, PointerEvent::down(0.0, 0.0, 0.0)).unwrap();
        let mut last = f32::MIN;
        for step in 0..=30 {
            let raw = step as f32 * 10.0;
            binding
                .on_move(&mut rig.graph, PointerEvent::moved(raw, 0.0, step as f64 * 16.0))
                .unwrap();
            let x = rig.graph.get(rig.x).unwrap();
            assert!(x >= last);
            last = x;
        }

        binding.on_move(&mut rig.graph, PointerEvent::moved(200.0, 0.0, 600.0)).unwrap();
        assert_eq!(rig.graph.get(rig.x), Some(125.0));
    }

    #[test]
    fn test_release_below_threshold_snaps_back() {
        let mut rig = rig();
        let mut binding = GestureBinding::new(&mut rig.graph, rig.x, rig.y, card_config(), rig.ctx.clone()).unwrap();

        binding.on_start(&mut rig.graph, PointerEvent::down(0.0, 0.0, 0.0)).unwrap();
        binding.on_move(&mut rig.graph, PointerEvent::moved(200.0, 0.0, 100.0)).unwrap();
        binding.on_move(&mut rig.graph, PointerEvent::moved(80.0, 0.0, 200.0)).unwrap();
        assert_eq!(rig.graph.get(rig.x), Some(65.0));

        let release = binding
            .on_end(&mut rig.graph, PointerEvent::up(80.0, 0.0, 216.0))
            .unwrap()
            .unwrap();
        assert!(!release.committed);
        assert_eq!(binding.status(), GestureStatus::Settling);

        assert!(settle(&mut rig, &mut binding));
        assert_eq!(rig.graph.get(rig.x), Some(0.0));
        assert_eq!(binding.status(), GestureStatus::Idle);
    }

    #[test]
    fn test_cancel_releases_like_pointer_up() {
        let mut rig = rig();
        let mut binding = GestureBinding::new(&mut rig.graph, rig.x, rig.y, card_config(), rig.ctx.clone()).unwrap();

        binding.handle_pointer(&mut rig.graph, PointerEvent::down(0.0, 0.0, 0.0)).unwrap();
        binding.handle_pointer(&mut rig.graph, PointerEvent::moved(40.0, 0.0, 16.0)).unwrap();
        let release = binding
            .handle_pointer(&mut rig.graph, PointerEvent::cancel(40.0, 0.0, 32.0))
            .unwrap()
            .unwrap();
        assert!(!release.committed);

        assert!(settle(&mut rig, &mut binding));
        assert_eq!(rig.graph.get(rig.x), Some(0.0));
    }

    #[test]
    fn test_release_past_threshold_commits() {
        let mut rig = rig();
        let mut binding = GestureBinding::new(&mut rig.graph, rig.x, rig.y, card_config(), rig.ctx.clone()).unwrap();
        let committed = Rc::new(RefCell::new(None));
        let sink = committed.clone();
        binding.on_commit(move |release| *sink.borrow_mut() = Some(release.offset));

        binding.on_start(&mut rig.graph, PointerEvent::down(10.0, 10.0, 0.0)).unwrap();
        binding
            .handle_pointer(&mut rig.graph, PointerEvent::moved(-140.0, 10.0, 50.0))
            .unwrap();
        let release = binding
            .handle_pointer(&mut rig.graph, PointerEvent::up(-140.0, 10.0, 60.0))
            .unwrap()
            .unwrap();

        assert!(release.committed);
        assert_eq!(*committed.borrow(), Some(Point::new(-150.0, 0.0)));
        assert_eq!(rig.graph.get(rig.x), Some(-100.0));
        assert_eq!(binding.status(), GestureStatus::Idle);
        assert!(!rig.queue.has_pending());
    }

    #[test]
    fn test_axis_lock_leaves_other_axis_alone() {
        let mut rig = rig();
        let config = GestureConfig::new().with_axis(DragAxis::X);
        let mut binding = GestureBinding::new(&mut rig.graph, rig.x, rig.y, config, rig.ctx.clone()).unwrap();

        binding.on_start(&mut rig.graph, PointerEvent::down(0.0, 0.0, 0.0)).unwrap();
        binding.on_move(&mut rig.graph, PointerEvent::moved(30.0, 40.0, 16.0)).unwrap();

        assert_eq!(rig.graph.get(rig.x), Some(30.0));
        assert_eq!(rig.graph.get(rig.y), Some(0.0));
    }

    #[test]
    fn test_values_are_claimed_exclusively() {
        let mut rig = rig();
        let first = GestureBinding::new(&mut rig.graph, rig.x, rig.y, GestureConfig::new(), rig.ctx.clone()).unwrap();

        let other_y = rig.graph.create(0.0_f32);
        let conflict = GestureBinding::new(&mut rig.graph, rig.x, other_y, GestureConfig::new(), rig.ctx.clone());
        assert!(matches!(conflict, Err(MotionError::GestureConflict { value }) if value == rig.x.id()));

        // A failed bind leaves no claim behind
        let other_x = rig.graph.create(0.0_f32);
        let conflict = GestureBinding::new(&mut rig.graph, other_x, rig.y, GestureConfig::new(), rig.ctx.clone());
        assert!(conflict.is_err());
        assert_eq!(rig.graph.driver_of(other_x.id()), None);

        first.unbind(&mut rig.graph);
        assert!(GestureBinding::new(&mut rig.graph, rig.x, rig.y, GestureConfig::new(), rig.ctx.clone()).is_ok());
    }

    #[test]
    fn test_failed_bind_and_unbind_leave_no_helpers() {
        let mut rig = rig();
        let before = rig.graph.len();

        let broken = GestureConfig::new().with_snap_spring(SpringConfig::new(0.0, 10.0, 1.0));
        let result = GestureBinding::new(&mut rig.graph, rig.x, rig.y, broken, rig.ctx.clone());
        assert!(matches!(result, Err(MotionError::InvalidSpringConfig(_))));
        assert_eq!(rig.graph.len(), before);
        assert_eq!(rig.graph.driver_of(rig.x.id()), None);
        assert_eq!(rig.graph.driver_of(rig.y.id()), None);

        let binding = GestureBinding::new(&mut rig.graph, rig.x, rig.y, GestureConfig::new(), rig.ctx.clone()).unwrap();
        assert_eq!(rig.graph.len(), before + 2);
        binding.unbind(&mut rig.graph);
        assert_eq!(rig.graph.len(), before);
    }

    #[test]
    fn test_grab_during_snap_back_interrupts_spring() {
        let mut rig = rig();
        let mut binding = GestureBinding::new(&mut rig.graph, rig.x, rig.y, card_config(), rig.ctx.clone()).unwrap();

        binding.on_start(&mut rig.graph, PointerEvent::down(0.0, 0.0, 0.0)).unwrap();
        binding.on_move(&mut rig.graph, PointerEvent::moved(40.0, 0.0, 16.0)).unwrap();
        binding.on_end(&mut rig.graph, PointerEvent::up(40.0, 0.0, 32.0)).unwrap();
        assert!(!binding.pending_ticks().is_empty());

        binding.on_start(&mut rig.graph, PointerEvent::down(0.0, 0.0, 48.0)).unwrap();
        assert!(binding.is_dragging());
        assert!(binding.pending_ticks().is_empty());
        assert!(!rig.queue.has_pending());
    }

    #[test]
    fn test_release_velocity_uses_recent_samples() {
        let mut rig = rig();
        let config = GestureConfig::new().with_commit(CommitRule::custom(|_, velocity| velocity.x > 1000.0));
        let mut binding = GestureBinding::new(&mut rig.graph, rig.x, rig.y, config, rig.ctx.clone()).unwrap();

        binding.on_start(&mut rig.graph, PointerEvent::down(0.0, 0.0, 0.0)).unwrap();
        binding.on_move(&mut rig.graph, PointerEvent::moved(5.0, 0.0, 500.0)).unwrap();
        binding.on_move(&mut rig.graph, PointerEvent::moved(25.0, 0.0, 510.0)).unwrap();
        let release = binding
            .on_end(&mut rig.graph, PointerEvent::up(45.0, 0.0, 520.0))
            .unwrap()
            .unwrap();

        assert!((release.velocity.x - 2000.0).abs() < 1.0);
        assert!(release.committed);
    }
}
