//! Multi-target choreography
//!
//! A [`Choreography`] is an ordered list of steps applied across N targets,
//! each target being a set of [`PropertyBindings`]. Every step asks a
//! per-index function for the motion of each target:
//!
//! - `Parallel` steps start every target together (per-target delays give the
//!   stagger) and finish with the slowest one
//! - `Sequential` steps start a target only once the previous target's
//!   transition has finished
//!
//! Steps run strictly in order. Starting a new run cancels the current one;
//! the cancelled run never applies another value and never reports
//! completion.
//!
//! Time inside a run is deterministic: a step starts exactly when the
//! previous one ended, not on the frame that noticed it.

use crate::bag::{PropertyBag, PropertyBindings, PropertyName};
use crate::easing::Easing;
use crate::frame::{FrameContext, FrameSlot, TickToken};
use crate::timeline::{clamp_progress, PhaseTimeline};
use kinema_core::{MotionGraph, Result, TransformChain, Value};
use std::rc::Rc;

/// Id of one choreography run, increasing with every `run`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunToken(u64);

impl RunToken {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Timing of one target's motion
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transition {
    pub delay_ms: f64,
    pub duration_ms: f64,
    pub easing: Easing,
}

impl Transition {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            delay_ms: 0.0,
            duration_ms,
            easing: Easing::EaseInOut,
        }
    }

    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms.max(0.0);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::new(300.0)
    }
}

/// Where a stagger starts counting from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StaggerFrom {
    #[default]
    First,
    Last,
    Center,
    Index(usize),
}

/// Delay of target `index` out of `count` when consecutive targets start
/// `each_ms` apart
pub fn stagger(index: usize, count: usize, each_ms: f64, from: StaggerFrom) -> f64 {
    let origin = match from {
        StaggerFrom::First => 0.0,
        StaggerFrom::Last => count.saturating_sub(1) as f64,
        StaggerFrom::Center => count.saturating_sub(1) as f64 / 2.0,
        StaggerFrom::Index(i) => i as f64,
    };
    (index as f64 - origin).abs() * each_ms
}

/// What a target animates towards
#[derive(Clone, Debug)]
pub enum Motion {
    /// Tween from the target's values at transition start
    To(PropertyBag),
    /// Tween between explicit values
    FromTo(PropertyBag, PropertyBag),
    /// Per-property breakpoints sampled on eased local progress
    Keyframes(Vec<(PropertyName, TransformChain<Value>)>),
    /// Play a whole phase timeline over the transition
    Timeline(Rc<PhaseTimeline>),
}

/// Motion plus timing for one target in one step
#[derive(Clone, Debug)]
pub struct TargetMotion {
    pub motion: Motion,
    pub transition: Transition,
}

impl TargetMotion {
    pub fn new(motion: Motion, transition: Transition) -> Self {
        Self { motion, transition }
    }

    pub fn to(bag: PropertyBag, transition: Transition) -> Self {
        Self::new(Motion::To(bag), transition)
    }

    pub fn from_to(from: PropertyBag, to: PropertyBag, transition: Transition) -> Self {
        Self::new(Motion::FromTo(from, to), transition)
    }

    pub fn keyframes(tracks: Vec<(PropertyName, TransformChain<Value>)>, transition: Transition) -> Self {
        Self::new(Motion::Keyframes(tracks), transition)
    }

    pub fn timeline(timeline: Rc<PhaseTimeline>, transition: Transition) -> Self {
        Self::new(Motion::Timeline(timeline), transition)
    }

    /// Leave the target alone for `duration_ms`
    pub fn hold(duration_ms: f64) -> Self {
        Self::to(PropertyBag::new(), Transition::new(duration_ms))
    }

    fn sample(&self, from: &PropertyBag, eased: f32) -> PropertyBag {
        match &self.motion {
            Motion::To(to) => from.lerp(to, eased),
            Motion::FromTo(start, to) => start.lerp(to, eased),
            Motion::Keyframes(tracks) => tracks
                .iter()
                .map(|(name, chain)| (name.clone(), chain.sample(eased)))
                .collect(),
            Motion::Timeline(timeline) => timeline.evaluate(eased),
        }
    }
}

/// Passed to per-index functions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepContext {
    pub target_count: usize,
    pub step_index: usize,
    /// Zero-based repetition of the whole script
    pub iteration: u32,
}

impl StepContext {
    pub fn stagger(&self, index: usize, each_ms: f64, from: StaggerFrom) -> f64 {
        stagger(index, self.target_count, each_ms, from)
    }
}

/// How targets within a step are started
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StepPolicy {
    Sequential,
    #[default]
    Parallel,
}

type Animate = Rc<dyn Fn(usize, &StepContext) -> TargetMotion>;

/// One unit of a script
#[derive(Clone)]
pub struct ChoreographyStep {
    animate: Animate,
    policy: StepPolicy,
}

impl ChoreographyStep {
    pub fn new<F>(policy: StepPolicy, animate: F) -> Self
    where
        F: Fn(usize, &StepContext) -> TargetMotion + 'static,
    {
        Self {
            animate: Rc::new(animate),
            policy,
        }
    }

    pub fn parallel<F>(animate: F) -> Self
    where
        F: Fn(usize, &StepContext) -> TargetMotion + 'static,
    {
        Self::new(StepPolicy::Parallel, animate)
    }

    pub fn sequential<F>(animate: F) -> Self
    where
        F: Fn(usize, &StepContext) -> TargetMotion + 'static,
    {
        Self::new(StepPolicy::Sequential, animate)
    }

    pub fn policy(&self) -> StepPolicy {
        self.policy
    }
}

/// How many times a script plays
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repeat {
    /// Total number of iterations (0 behaves like 1)
    Times(u32),
    Forever,
}

impl Repeat {
    fn allows(self, iteration: u32) -> bool {
        match self {
            Repeat::Times(n) => iteration < n.max(1),
            Repeat::Forever => true,
        }
    }
}

impl Default for Repeat {
    fn default() -> Self {
        Repeat::Times(1)
    }
}

/// An ordered list of steps
#[derive(Clone, Default)]
pub struct Choreography {
    steps: Vec<ChoreographyStep>,
    repeat: Repeat,
}

impl Choreography {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(mut self, step: ChoreographyStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn parallel<F>(self, animate: F) -> Self
    where
        F: Fn(usize, &StepContext) -> TargetMotion + 'static,
    {
        self.step(ChoreographyStep::parallel(animate))
    }

    pub fn sequential<F>(self, animate: F) -> Self
    where
        F: Fn(usize, &StepContext) -> TargetMotion + 'static,
    {
        self.step(ChoreographyStep::sequential(animate))
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn steps(&self) -> &[ChoreographyStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// One target's motion inside the running step
struct Tween {
    target: usize,
    motion: TargetMotion,
    spawned_ms: f64,
    /// Values at transition start, captured for `Motion::To`
    from: Option<PropertyBag>,
    done: bool,
}

impl Tween {
    fn begin_ms(&self) -> f64 {
        self.spawned_ms + self.motion.transition.delay_ms
    }

    fn end_ms(&self) -> f64 {
        self.begin_ms() + self.motion.transition.duration_ms.max(0.0)
    }

    fn update(&mut self, now: f64, graph: &mut MotionGraph, bindings: &PropertyBindings) -> Result<()> {
        if now < self.begin_ms() {
            return Ok(());
        }

        let from = match self.from.take() {
            Some(from) => from,
            None => capture_start(&self.motion.motion, bindings, graph),
        };

        let duration = self.motion.transition.duration_ms;
        let local = if duration > 0.0 {
            clamp_progress(((now - self.begin_ms()) / duration) as f32)
        } else {
            1.0
        };
        let eased = if local >= 1.0 {
            1.0
        } else {
            self.motion.transition.easing.apply(local)
        };

        let bag = self.motion.sample(&from, eased);
        self.from = Some(from);
        bindings.apply(graph, &bag)?;
        self.done = local >= 1.0;
        Ok(())
    }
}

/// Current values of the properties a `To` motion touches
fn capture_start(motion: &Motion, bindings: &PropertyBindings, graph: &MotionGraph) -> PropertyBag {
    let Motion::To(to) = motion else {
        return PropertyBag::new();
    };
    to.iter()
        .map(|(name, target)| {
            let current = bindings
                .get(name)
                .and_then(|id| graph.value(id))
                .unwrap_or(target);
            (PropertyName::Owned(name.to_owned()), current)
        })
        .collect()
}

struct Run {
    token: RunToken,
    script: Rc<Choreography>,
    step_index: usize,
    iteration: u32,
    step_start_ms: f64,
    iteration_start_ms: f64,
    tweens: Vec<Tween>,
    next_target: usize,
}

/// Runs choreographies over a fixed list of targets
pub struct Choreographer {
    targets: Vec<PropertyBindings>,
    run: Option<Run>,
    last_token: u64,
    frame: FrameSlot,
    ctx: FrameContext,
}

impl Choreographer {
    pub fn new(targets: Vec<PropertyBindings>, ctx: FrameContext) -> Self {
        Self {
            targets,
            run: None,
            last_token: 0,
            frame: FrameSlot::default(),
            ctx,
        }
    }

    pub fn targets(&self) -> &[PropertyBindings] {
        &self.targets
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    pub fn current_run(&self) -> Option<RunToken> {
        self.run.as_ref().map(|run| run.token)
    }

    /// `(step index, iteration)` of the running step
    pub fn position(&self) -> Option<(usize, u32)> {
        self.run.as_ref().map(|run| (run.step_index, run.iteration))
    }

    pub fn pending_tick(&self) -> Option<TickToken> {
        self.frame.pending()
    }

    /// Start `script`, cancelling any run in progress. Values due at time
    /// zero are applied before returning.
    pub fn run(&mut self, graph: &mut MotionGraph, script: impl Into<Rc<Choreography>>) -> Result<RunToken> {
        self.cancel();

        self.last_token += 1;
        let token = RunToken(self.last_token);
        let script = script.into();
        let now = self.ctx.now();
        tracing::debug!(run = token.0, steps = script.len(), targets = self.targets.len(), "choreography started");

        if script.is_empty() {
            return Ok(token);
        }

        self.run = Some(Run {
            token,
            script,
            step_index: 0,
            iteration: 0,
            step_start_ms: now,
            iteration_start_ms: now,
            tweens: Vec::new(),
            next_target: 0,
        });

        match self.advance(graph, now) {
            Ok(true) => {}
            Ok(false) => self.frame.arm(&self.ctx),
            Err(err) => {
                self.cancel();
                return Err(err);
            }
        }
        Ok(token)
    }

    /// Stop the current run where it is; it never reports completion
    pub fn cancel(&mut self) {
        self.frame.cancel(&self.ctx);
        if let Some(run) = self.run.take() {
            tracing::debug!(run = run.token.0, step = run.step_index, "choreography cancelled");
        }
    }

    /// Advance the run. Returns the token of a run that finished on this
    /// frame; stale tokens are ignored.
    pub fn on_frame(&mut self, token: TickToken, graph: &mut MotionGraph) -> Result<Option<RunToken>> {
        if !self.frame.accept(token) {
            return Ok(None);
        }
        let Some(run_token) = self.current_run() else {
            return Ok(None);
        };

        let now = self.ctx.now();
        match self.advance(graph, now) {
            Ok(true) => {
                tracing::debug!(run = run_token.0, "choreography finished");
                Ok(Some(run_token))
            }
            Ok(false) => {
                self.frame.arm(&self.ctx);
                Ok(None)
            }
            Err(err) => {
                self.cancel();
                Err(err)
            }
        }
    }

    /// Apply everything due at `now`, moving through as many steps as have
    /// completed. Returns `true` once the script is done.
    fn advance(&mut self, graph: &mut MotionGraph, now: f64) -> Result<bool> {
        let targets = &self.targets;
        let count = targets.len();

        loop {
            let Some(run) = self.run.as_mut() else {
                return Ok(false);
            };
            let script = run.script.clone();
            let step = &script.steps[run.step_index];
            let context = StepContext {
                target_count: count,
                step_index: run.step_index,
                iteration: run.iteration,
            };

            if step.policy == StepPolicy::Parallel && run.next_target == 0 {
                for index in 0..count {
                    run.tweens.push(Tween {
                        target: index,
                        motion: (step.animate)(index, &context),
                        spawned_ms: run.step_start_ms,
                        from: None,
                        done: false,
                    });
                }
                run.next_target = count;
            }

            loop {
                for tween in run.tweens.iter_mut().filter(|t| !t.done) {
                    tween.update(now, graph, &targets[tween.target])?;
                }

                let previous_done = run.tweens.last().map_or(true, |t| t.done);
                if step.policy == StepPolicy::Sequential && run.next_target < count && previous_done {
                    let at = run.tweens.last().map_or(run.step_start_ms, Tween::end_ms);
                    let index = run.next_target;
                    run.tweens.push(Tween {
                        target: index,
                        motion: (step.animate)(index, &context),
                        spawned_ms: at,
                        from: None,
                        done: false,
                    });
                    run.next_target += 1;
                    continue;
                }
                break;
            }

            if run.next_target < count || run.tweens.iter().any(|t| !t.done) {
                return Ok(false);
            }

            let step_end = run
                .tweens
                .iter()
                .map(Tween::end_ms)
                .fold(run.step_start_ms, f64::max);
            run.tweens.clear();
            run.next_target = 0;
            run.step_index += 1;
            tracing::trace!(run = run.token.0, step = run.step_index, "choreography step done");

            if run.step_index == script.steps.len() {
                run.iteration += 1;
                if !script.repeat.allows(run.iteration) {
                    self.run = None;
                    return Ok(true);
                }
                run.step_index = 0;
                if step_end <= run.iteration_start_ms {
                    // Zero-length iteration: resume on the next frame
                    run.step_start_ms = now;
                    run.iteration_start_ms = now;
                    return Ok(false);
                }
                run.iteration_start_ms = step_end;
            }
            run.step_start_ms = step_end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::frame::FrameQueue;
    use kinema_core::{MotionError, MotionValue};
    use std::cell::RefCell;

    struct Rig {
        graph: MotionGraph,
        clock: Rc<ManualClock>,
        queue: Rc<FrameQueue>,
        xs: Vec<MotionValue<f32>>,
        markers: Vec<MotionValue<f32>>,
        choreographer: Choreographer,
    }

    fn rig(count: usize) -> Rig {
        let clock = Rc::new(ManualClock::new(0.0));
        let queue = Rc::new(FrameQueue::new());
        let ctx = FrameContext::new(clock.clone(), queue.clone());
        let mut graph = MotionGraph::new();
        let mut xs = Vec::new();
        let mut markers = Vec::new();
        let mut targets = Vec::new();
        for _ in 0..count {
            let x = graph.create(0.0_f32);
            let marker = graph.create(0.0_f32);
            targets.push(PropertyBindings::new().bind("x", x).bind("marker", marker));
            xs.push(x);
            markers.push(marker);
        }
        Rig {
            graph,
            clock,
            queue,
            xs,
            markers,
            choreographer: Choreographer::new(targets, ctx),
        }
    }

    impl Rig {
        fn frame(&mut self, dt: f64) -> Option<RunToken> {
            self.clock.advance(dt);
            let mut finished = None;
            for token in self.queue.take_due() {
                if let Some(run) = self.choreographer.on_frame(token, &mut self.graph).unwrap() {
                    finished = Some(run);
                }
            }
            finished
        }

        fn x(&self, i: usize) -> f32 {
            self.graph.get(self.xs[i]).unwrap()
        }
    }

    fn linear(duration_ms: f64) -> Transition {
        Transition::new(duration_ms).with_easing(Easing::Linear)
    }

    #[test]
    fn test_stagger_origins() {
        assert_eq!(stagger(2, 6, 100.0, StaggerFrom::First), 200.0);
        assert_eq!(stagger(5, 6, 100.0, StaggerFrom::Last), 0.0);
        assert_eq!(stagger(0, 5, 100.0, StaggerFrom::Center), 200.0);
        assert_eq!(stagger(1, 5, 100.0, StaggerFrom::Index(3)), 200.0);
    }

    #[test]
    fn test_parallel_step_staggers_and_finishes_with_slowest() {
        let mut rig = rig(3);
        let script = Choreography::new().parallel(|i, ctx| {
            TargetMotion::to(
                PropertyBag::new().with("x", 100.0),
                linear(100.0).with_delay(ctx.stagger(i, 50.0, StaggerFrom::First)),
            )
        });
        let run = rig.choreographer.run(&mut rig.graph, script).unwrap();

        assert_eq!(rig.frame(50.0), None);
        assert_eq!(rig.x(0), 50.0);
        assert_eq!(rig.x(1), 0.0);
        assert_eq!(rig.x(2), 0.0);

        assert_eq!(rig.frame(100.0), None);
        assert_eq!(rig.x(0), 100.0);
        assert_eq!(rig.x(1), 100.0);
        assert_eq!(rig.x(2), 50.0);

        assert_eq!(rig.frame(50.0), Some(run));
        assert_eq!(rig.x(2), 100.0);
        assert!(!rig.choreographer.is_running());
        assert!(!rig.queue.has_pending());
    }

    #[test]
    fn test_sequential_step_invokes_next_target_after_previous_finishes() {
        let mut rig = rig(3);
        let calls = Rc::new(RefCell::new(Vec::new()));
        let log = calls.clone();
        let script = Choreography::new().sequential(move |i, _| {
            log.borrow_mut().push(i);
            TargetMotion::to(PropertyBag::new().with("x", 10.0), linear(100.0))
        });
        rig.choreographer.run(&mut rig.graph, script).unwrap();
        assert_eq!(*calls.borrow(), vec![0]);

        rig.frame(50.0);
        assert_eq!(*calls.borrow(), vec![0]);

        // Target 0 ends at 100; target 1 starts exactly then
        rig.frame(100.0);
        assert_eq!(*calls.borrow(), vec![0, 1]);
        assert_eq!(rig.x(0), 10.0);
        assert_eq!(rig.x(1), 5.0);
        assert_eq!(rig.x(2), 0.0);
    }

    #[test]
    fn test_steps_run_in_order_with_exact_boundaries() {
        let mut rig = rig(1);
        let script = Choreography::new()
            .parallel(|_, _| TargetMotion::to(PropertyBag::new().with("x", 100.0), linear(100.0)))
            .parallel(|_, _| TargetMotion::to(PropertyBag::new().with("x", 0.0), linear(100.0)));
        rig.choreographer.run(&mut rig.graph, script).unwrap();

        // Frame lands 50ms into step 2
        rig.frame(150.0);
        assert_eq!(rig.x(0), 50.0);
        assert_eq!(rig.choreographer.position(), Some((1, 0)));
    }

    #[test]
    fn test_to_captures_start_after_delay() {
        let mut rig = rig(1);
        let script = Choreography::new()
            .parallel(|_, _| TargetMotion::to(PropertyBag::new().with("x", 100.0), linear(100.0).with_delay(50.0)));
        rig.choreographer.run(&mut rig.graph, script).unwrap();

        rig.graph.set(rig.xs[0], 60.0).unwrap();
        rig.frame(50.0);
        assert_eq!(rig.x(0), 60.0);
        rig.frame(50.0);
        assert_eq!(rig.x(0), 80.0);
    }

    #[test]
    fn test_restart_mid_first_step_drops_stale_run() {
        let mut rig = rig(2);
        let first = Choreography::new()
            .parallel(|_, _| TargetMotion::to(PropertyBag::new().with("x", 100.0), linear(200.0)))
            .parallel(|_, _| TargetMotion::to(PropertyBag::new().with("marker", 99.0), linear(0.0)));
        let stale = rig.choreographer.run(&mut rig.graph, first).unwrap();
        let stale_tick = rig.choreographer.pending_tick().unwrap();
        rig.frame(100.0);
        assert_eq!(rig.x(0), 50.0);

        let second = Choreography::new()
            .parallel(|_, _| TargetMotion::to(PropertyBag::new().with("x", -100.0), linear(100.0)));
        let fresh = rig.choreographer.run(&mut rig.graph, second).unwrap();
        assert!(fresh > stale);
        assert_eq!(rig.choreographer.on_frame(stale_tick, &mut rig.graph), Ok(None));

        let mut finished = Vec::new();
        for _ in 0..30 {
            if let Some(run) = rig.frame(16.0) {
                finished.push(run);
            }
        }

        assert_eq!(finished, vec![fresh]);
        assert_eq!(rig.x(0), -100.0);
        for marker in &rig.markers {
            assert_eq!(rig.graph.get(*marker), Some(0.0));
        }
    }

    #[test]
    fn test_repeat_passes_iteration_to_step_functions() {
        let mut rig = rig(1);
        let script = Choreography::new()
            .parallel(|_, ctx| {
                TargetMotion::to(
                    PropertyBag::new().with("marker", ctx.iteration as f32),
                    linear(100.0),
                )
            })
            .repeat(Repeat::Times(3));
        let run = rig.choreographer.run(&mut rig.graph, script).unwrap();

        rig.frame(100.0);
        assert_eq!(rig.choreographer.position(), Some((0, 1)));
        rig.frame(100.0);
        assert_eq!(rig.graph.get(rig.markers[0]), Some(1.0));
        assert_eq!(rig.frame(100.0), Some(run));
        assert_eq!(rig.graph.get(rig.markers[0]), Some(2.0));
    }

    #[test]
    fn test_keyframes_and_explicit_ranges() {
        let mut rig = rig(1);
        let scale = TransformChain::new([
            (0.0, Value::Number(1.0)),
            (0.5, Value::Number(1.5)),
            (1.0, Value::Number(1.0)),
        ])
        .unwrap();
        let script = Choreography::new()
            .parallel(move |_, _| TargetMotion::keyframes(vec![("x".into(), scale.clone())], linear(100.0)))
            .parallel(|_, _| {
                TargetMotion::from_to(
                    PropertyBag::new().with("marker", 60.0),
                    PropertyBag::new().with("marker", 420.0),
                    linear(100.0),
                )
            });
        rig.choreographer.run(&mut rig.graph, script).unwrap();

        rig.frame(50.0);
        assert_eq!(rig.x(0), 1.5);
        rig.frame(100.0);
        assert_eq!(rig.x(0), 1.0);
        assert_eq!(rig.graph.get(rig.markers[0]), Some(240.0));
    }

    #[test]
    fn test_cancel_never_reports_completion() {
        let mut rig = rig(1);
        let script = Choreography::new()
            .parallel(|_, _| TargetMotion::to(PropertyBag::new().with("x", 100.0), linear(100.0)));
        rig.choreographer.run(&mut rig.graph, script).unwrap();
        rig.frame(50.0);

        rig.choreographer.cancel();
        assert!(!rig.queue.has_pending());
        assert_eq!(rig.frame(100.0), None);
        assert_eq!(rig.x(0), 50.0);
    }

    #[test]
    fn test_failed_start_leaves_nothing_running() {
        let mut rig = rig(1);
        let source = rig.graph.create(0.0_f32);
        let chain = TransformChain::new([(0.0, 0.0_f32), (1.0, 1.0)]).unwrap();
        rig.graph.link(&[source], rig.xs[0], chain).unwrap();

        let script = Choreography::new()
            .parallel(|_, _| TargetMotion::to(PropertyBag::new().with("x", 100.0), linear(100.0)));
        assert!(matches!(
            rig.choreographer.run(&mut rig.graph, script.clone()),
            Err(MotionError::ReadOnly(_))
        ));
        assert!(!rig.choreographer.is_running());
        assert_eq!(rig.choreographer.pending_tick(), None);
        assert!(!rig.queue.has_pending());

        rig.graph.unlink(rig.xs[0].id()).unwrap();
        let run = rig.choreographer.run(&mut rig.graph, script).unwrap();
        assert_eq!(rig.frame(100.0), Some(run));
        assert_eq!(rig.x(0), 100.0);
    }

    #[test]
    fn test_zero_duration_script_finishes_immediately() {
        let mut rig = rig(2);
        let script = Choreography::new()
            .parallel(|_, _| TargetMotion::to(PropertyBag::new().with("x", 7.0), linear(0.0)));
        rig.choreographer.run(&mut rig.graph, script).unwrap();

        assert!(!rig.choreographer.is_running());
        assert_eq!(rig.x(1), 7.0);
    }
}
