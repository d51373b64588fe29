//! Kinema Animation System
//!
//! Time-driven behavior on top of the `kinema_core` motion graph.
//!
//! # Features
//!
//! - **Spring Smoothing**: RK4-integrated springs that chase a source value
//!   and keep their velocity when the target moves
//! - **Phase Timelines**: Piecewise property functions of one progress value
//! - **Playback**: Play, pause, seek and skip a timeline against a clock
//! - **Choreography**: Multi-step scripts over many targets with stagger
//! - **Gestures**: Elastic drag with commit or snap-back on release
//!
//! Nothing here owns a loop. Components request frames through a
//! [`FrameDriver`] and advance when the host hands the token back;
//! [`AnimationScheduler`] bundles a driver, a clock and the graph for hosts
//! that want one object to tick.
//!
//! # Example
//!
//! ```rust
//! use kinema_animation::{AnimationScheduler, ManualClock, PlaybackConfig, PhaseTimeline, PropertyBag, PropertyBindings};
//! use std::rc::Rc;
//!
//! let clock = Rc::new(ManualClock::new(0.0));
//! let mut scheduler = AnimationScheduler::with_clock(clock.clone());
//! let x = scheduler.graph_mut().create(0.0_f32);
//!
//! let timeline = PhaseTimeline::builder()
//!     .phase(0.0, 1.0, |t| PropertyBag::new().with("x", 200.0 * t))
//!     .build()
//!     .unwrap();
//! let playback = scheduler
//!     .add_playback(Rc::new(timeline), PropertyBindings::new().bind("x", x), PlaybackConfig::new(1000.0))
//!     .unwrap();
//!
//! scheduler.play(playback);
//! while scheduler.has_active_animations() {
//!     clock.advance(16.0);
//!     scheduler.tick();
//! }
//! assert_eq!(scheduler.graph().get(x), Some(200.0));
//! ```

pub mod bag;
pub mod choreography;
pub mod clock;
pub mod easing;
pub mod frame;
pub mod gesture;
pub mod playback;
pub mod presets;
pub mod scheduler;
pub mod spring;
pub mod timeline;

pub use bag::{PropertyBag, PropertyBindings, PropertyName};
pub use choreography::{
    stagger, Choreographer, Choreography, ChoreographyStep, Motion, Repeat, RunToken, StaggerFrom, StepContext,
    StepPolicy, TargetMotion, Transition,
};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use easing::{CurveFamily, EaseMode, Easing};
pub use frame::{FrameContext, FrameDriver, FrameQueue, TickToken};
pub use gesture::{elastic, CommitRule, DragAxis, GestureBinding, GestureConfig, GestureRelease, GestureStatus};
pub use playback::{PlaybackConfig, PlaybackController, PlaybackStatus, SeekPolicy};
pub use presets::MotionPreset;
pub use scheduler::{
    AnimationScheduler, ChoreographerId, GestureId, PlaybackId, SchedulerConfig, SchedulerEvent, SpringId,
};
pub use spring::{Spring, SpringConfig, SpringSmoother};
pub use timeline::{Phase, PhaseTimeline, PhaseTimelineBuilder};
