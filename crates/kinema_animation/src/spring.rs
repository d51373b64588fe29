//! Spring physics animation
//!
//! RK4-integrated damped harmonic oscillator, plus [`SpringSmoother`] which
//! makes one motion value chase another through a spring.

use crate::frame::{FrameContext, FrameSlot, TickToken};
use kinema_core::{Animatable, MotionError, MotionGraph, MotionValue, Result, SubscriptionId, Value, ValueId};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::Rc;

/// Displacement below which a spring counts as at rest
pub const REST_DISPLACEMENT: f32 = 0.001;
/// Velocity (units per second) below which a spring counts as at rest
pub const REST_VELOCITY: f32 = 0.01;

/// Largest integration step in seconds; longer frames are sub-stepped
const MAX_SUBSTEP: f32 = 1.0 / 120.0;

/// Configuration for a spring animation
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

impl SpringConfig {
    pub fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
        }
    }

    /// A gentle, slow spring (good for page transitions)
    pub fn gentle() -> Self {
        Self::new(120.0, 14.0, 1.0)
    }

    /// A wobbly spring with overshoot
    pub fn wobbly() -> Self {
        Self::new(180.0, 12.0, 1.0)
    }

    pub fn stiff() -> Self {
        Self::new(400.0, 30.0, 1.0)
    }

    pub fn snappy() -> Self {
        Self::new(600.0, 40.0, 1.0)
    }

    /// Slow and overdamped, no overshoot
    pub fn molasses() -> Self {
        Self::new(100.0, 20.0, 1.0)
    }

    /// Smoothing for scroll-linked progress bars
    pub fn scroll_follow() -> Self {
        Self::new(200.0, 30.0, 1.0)
    }

    /// Tight follow for values tracking the pointer
    pub fn drag_follow() -> Self {
        Self::new(300.0, 20.0, 1.0)
    }

    pub fn with_stiffness(mut self, stiffness: f32) -> Self {
        self.stiffness = stiffness;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Reject non-finite values, non-positive stiffness or mass, and
    /// negative damping
    pub fn validate(&self) -> Result<()> {
        if !(self.stiffness.is_finite() && self.stiffness > 0.0) {
            return Err(MotionError::InvalidSpringConfig("stiffness must be positive"));
        }
        if !(self.damping.is_finite() && self.damping >= 0.0) {
            return Err(MotionError::InvalidSpringConfig("damping must not be negative"));
        }
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(MotionError::InvalidSpringConfig("mass must be positive"));
        }
        Ok(())
    }

    /// Damping at which the spring stops oscillating
    pub fn critical_damping(&self) -> f32 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    pub fn is_underdamped(&self) -> bool {
        self.damping < self.critical_damping()
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::stiff()
    }
}

/// A single-channel spring
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    config: SpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
}

impl Spring {
    pub fn new(config: SpringConfig, initial: f32) -> Self {
        Self {
            config,
            value: initial,
            velocity: 0.0,
            target: initial,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    /// Move the target; position and velocity carry over
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Swap physics parameters; position and velocity carry over
    pub fn set_config(&mut self, config: SpringConfig) {
        self.config = config;
    }

    /// Re-seed position and velocity
    pub fn set_state(&mut self, value: f32, velocity: f32) {
        self.value = value;
        self.velocity = velocity;
    }

    pub fn is_settled(&self) -> bool {
        (self.value - self.target).abs() < REST_DISPLACEMENT && self.velocity.abs() < REST_VELOCITY
    }

    /// Advance by `dt` seconds, sub-stepping long frames. Snaps onto the
    /// target once at rest.
    pub fn step(&mut self, dt: f32) {
        if dt.is_nan() || dt <= 0.0 {
            return;
        }

        let steps = (dt / MAX_SUBSTEP).ceil().max(1.0) as u32;
        let h = dt / steps as f32;
        for _ in 0..steps {
            if self.is_settled() {
                break;
            }
            self.rk4(h);
        }

        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
        }
    }

    fn rk4(&mut self, h: f32) {
        let (x, v) = (self.value, self.velocity);

        let k1_x = v;
        let k1_v = self.acceleration(x, v);

        let k2_x = v + k1_v * h * 0.5;
        let k2_v = self.acceleration(x + k1_x * h * 0.5, k2_x);

        let k3_x = v + k2_v * h * 0.5;
        let k3_v = self.acceleration(x + k2_x * h * 0.5, k3_x);

        let k4_x = v + k3_v * h;
        let k4_v = self.acceleration(x + k3_x * h, k4_x);

        self.value += (k1_x + 2.0 * k2_x + 2.0 * k3_x + k4_x) * h / 6.0;
        self.velocity += (k1_v + 2.0 * k2_v + 2.0 * k3_v + k4_v) * h / 6.0;
    }

    fn acceleration(&self, x: f32, v: f32) -> f32 {
        let spring_force = -self.config.stiffness * (x - self.target);
        let damping_force = -self.config.damping * v;
        (spring_force + damping_force) / self.config.mass
    }
}

/// Source value and pending frame, shared with the source subscription
struct Chase {
    target: Value,
    frame: FrameSlot,
    /// Time of the previous integration step while moving
    last_ms: Option<f64>,
}

/// Drives an output motion value toward a source motion value through a
/// spring per channel (one for numbers, four for colors).
///
/// Requests frames only while moving. Any change of the source re-arms it,
/// keeping the current velocity.
pub struct SpringSmoother {
    source: ValueId,
    output: ValueId,
    springs: SmallVec<[Spring; 4]>,
    config: SpringConfig,
    chase: Rc<RefCell<Chase>>,
    subscription: SubscriptionId,
    ctx: FrameContext,
    max_frame_delta_ms: f64,
}

/// Frames longer than this are integrated as if they were this long
pub const DEFAULT_MAX_FRAME_DELTA_MS: f64 = 64.0;

impl SpringSmoother {
    /// Create a new output value starting at the source's current value
    pub fn new<T: Animatable>(
        graph: &mut MotionGraph,
        source: MotionValue<T>,
        config: SpringConfig,
        ctx: FrameContext,
    ) -> Result<Self> {
        let initial = graph.value(source.id()).ok_or(MotionError::UnknownValue)?;
        let output = graph.create(initial);
        Self::attach(graph, source.id(), output.id(), config, ctx)
    }

    /// Drive an existing writable value from its current position
    pub fn driving<T: Animatable>(
        graph: &mut MotionGraph,
        source: MotionValue<T>,
        output: MotionValue<T>,
        config: SpringConfig,
        ctx: FrameContext,
    ) -> Result<Self> {
        Self::attach(graph, source.id(), output.id(), config, ctx)
    }

    fn attach(
        graph: &mut MotionGraph,
        source: ValueId,
        output: ValueId,
        config: SpringConfig,
        ctx: FrameContext,
    ) -> Result<Self> {
        config.validate()?;

        let target = graph.value(source).ok_or(MotionError::UnknownValue)?;
        let position = graph.value(output).ok_or(MotionError::UnknownValue)?;
        if target.kind() != position.kind() {
            return Err(MotionError::KindMismatch {
                expected: position.kind(),
                found: target.kind(),
            });
        }
        if graph.is_derived(output) {
            return Err(MotionError::ReadOnly(output));
        }

        let springs = position
            .channels()
            .iter()
            .zip(target.channels())
            .map(|(from, to)| {
                let mut spring = Spring::new(config, *from);
                spring.set_target(to);
                spring
            })
            .collect();

        let chase = Rc::new(RefCell::new(Chase {
            target,
            frame: FrameSlot::default(),
            last_ms: None,
        }));

        let subscription = {
            let chase = chase.clone();
            let ctx = ctx.clone();
            graph.subscribe(MotionValue::<Value>::from_id(source), move |value: Value| {
                let mut chase = chase.borrow_mut();
                chase.target = value;
                if chase.frame.pending().is_none() {
                    if chase.last_ms.is_none() {
                        chase.last_ms = Some(ctx.now());
                    }
                    chase.frame.arm(&ctx);
                }
            })?
        };

        let smoother = Self {
            source,
            output,
            springs,
            config,
            chase,
            subscription,
            ctx,
            max_frame_delta_ms: DEFAULT_MAX_FRAME_DELTA_MS,
        };

        if !smoother.is_settled() {
            smoother.arm();
        }
        Ok(smoother)
    }

    pub fn with_max_frame_delta(mut self, max_ms: f64) -> Self {
        self.max_frame_delta_ms = max_ms.max(0.0);
        self
    }

    pub fn source(&self) -> ValueId {
        self.source
    }

    pub fn output_id(&self) -> ValueId {
        self.output
    }

    /// Typed handle to the output
    pub fn output<T: Animatable>(&self) -> MotionValue<T> {
        MotionValue::from_id(self.output)
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    /// Per-channel velocity in units per second
    pub fn velocity(&self) -> SmallVec<[f32; 4]> {
        self.springs.iter().map(Spring::velocity).collect()
    }

    pub fn is_settled(&self) -> bool {
        self.springs.iter().all(Spring::is_settled)
    }

    pub fn pending_tick(&self) -> Option<TickToken> {
        self.chase.borrow().frame.pending()
    }

    /// Replace the physics parameters mid-flight without a jump
    pub fn set_config(&mut self, config: SpringConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        for spring in &mut self.springs {
            spring.set_config(config);
        }
        Ok(())
    }

    /// Re-seed position and velocity, write the position to the output and
    /// start chasing the source from there
    pub fn retarget_from(&mut self, graph: &mut MotionGraph, position: Value, velocity: &[f32]) -> Result<()> {
        let template = graph.value(self.output).ok_or(MotionError::UnknownValue)?;
        if template.kind() != position.kind() {
            return Err(MotionError::KindMismatch {
                expected: template.kind(),
                found: position.kind(),
            });
        }

        for (i, (spring, value)) in self.springs.iter_mut().zip(position.channels()).enumerate() {
            spring.set_state(value, velocity.get(i).copied().unwrap_or(0.0));
        }
        graph.set_value(self.output, position)?;

        if !self.is_settled() {
            self.arm();
        }
        Ok(())
    }

    /// Stop requesting frames; the output stays where it is
    pub fn halt(&mut self) {
        let mut chase = self.chase.borrow_mut();
        chase.frame.cancel(&self.ctx);
        chase.last_ms = None;
    }

    /// Stop following the source and release the frame
    pub fn detach(mut self, graph: &mut MotionGraph) {
        self.halt();
        graph.unsubscribe(self.subscription);
    }

    fn arm(&self) {
        let mut chase = self.chase.borrow_mut();
        if chase.frame.pending().is_none() {
            if chase.last_ms.is_none() {
                chase.last_ms = Some(self.ctx.now());
            }
            chase.frame.arm(&self.ctx);
        }
    }

    /// Advance one frame. Returns `true` on the frame the spring comes to
    /// rest; stale tokens are ignored.
    pub fn on_frame(&mut self, token: TickToken, graph: &mut MotionGraph) -> Result<bool> {
        let (target, dt_ms) = {
            let mut chase = self.chase.borrow_mut();
            if !chase.frame.accept(token) {
                return Ok(false);
            }
            let now = self.ctx.now();
            let last = chase.last_ms.unwrap_or(now);
            chase.last_ms = Some(now);
            (chase.target, (now - last).clamp(0.0, self.max_frame_delta_ms))
        };

        let dt = (dt_ms / 1000.0) as f32;
        for (spring, goal) in self.springs.iter_mut().zip(target.channels()) {
            spring.set_target(goal);
            spring.step(dt);
        }

        let positions: SmallVec<[f32; 4]> = self.springs.iter().map(Spring::value).collect();
        let template = graph.value(self.output).ok_or(MotionError::UnknownValue)?;
        graph.set_value(self.output, template.with_channels(&positions))?;

        if self.is_settled() {
            self.chase.borrow_mut().last_ms = None;
            tracing::debug!(output = ?self.output, "spring settled");
            return Ok(true);
        }

        tracing::trace!(output = ?self.output, dt_ms, "spring step");
        self.arm();
        Ok(false)
    }
}
