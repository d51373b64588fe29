//! Ready-made timelines, scripts and gesture configs
//!
//! Entry/exit timelines work with any bindings that cover their
//! properties. The scripted demos expect targets bound to `opacity`, `x`,
//! `y`, `rotate` and `scale`; [`MotionPreset::stage`] creates such targets.

use crate::bag::{PropertyBag, PropertyBindings, PropertyName};
use crate::choreography::{Choreography, ChoreographyStep, StaggerFrom, TargetMotion, Transition};
use crate::easing::{EaseMode, Easing};
use crate::gesture::{CommitRule, DragAxis, GestureConfig};
use crate::spring::SpringConfig;
use crate::timeline::PhaseTimeline;
use kinema_core::{Color, DragConstraints, MotionGraph, MotionValue, Result, TransformChain, Value};
use std::f32::consts::TAU;

/// Start and end color of the interactive timeline
pub const TIMELINE_BLUE: u32 = 0x3b82f6;
/// Middle color of the interactive timeline
pub const TIMELINE_PURPLE: u32 = 0x8b5cf6;

/// Pre-built animation presets for common patterns
pub struct MotionPreset;

impl MotionPreset {
    // ========================================================================
    // Entry / exit
    // ========================================================================

    /// Fade in from transparent to opaque
    pub fn fade_in() -> Result<PhaseTimeline> {
        PhaseTimeline::from_keyframes(
            vec![
                (0.0, PropertyBag::new().with("opacity", 0.0)),
                (1.0, PropertyBag::new().with("opacity", 1.0)),
            ],
            Easing::EaseOut,
        )
    }

    /// Fade out from opaque to transparent
    pub fn fade_out() -> Result<PhaseTimeline> {
        PhaseTimeline::from_keyframes(
            vec![
                (0.0, PropertyBag::new().with("opacity", 1.0)),
                (1.0, PropertyBag::new().with("opacity", 0.0)),
            ],
            Easing::EaseIn,
        )
    }

    /// Grow from nothing while fading in
    pub fn scale_in() -> Result<PhaseTimeline> {
        PhaseTimeline::from_keyframes(
            vec![
                (0.0, PropertyBag::new().with("scale", 0.0).with("opacity", 0.0)),
                (1.0, PropertyBag::new().with("scale", 1.0).with("opacity", 1.0)),
            ],
            Easing::cubic(EaseMode::Out),
        )
    }

    /// Slide in from `(dx, dy)` away while fading in
    pub fn slide_in(dx: f32, dy: f32) -> Result<PhaseTimeline> {
        PhaseTimeline::from_keyframes(
            vec![
                (0.0, PropertyBag::new().with("x", dx).with("y", dy).with("opacity", 0.0)),
                (1.0, PropertyBag::new().with("x", 0.0).with("y", 0.0).with("opacity", 1.0)),
            ],
            Easing::EaseOut,
        )
    }

    /// Pop in with a slight overshoot
    pub fn pop_in() -> Result<PhaseTimeline> {
        PhaseTimeline::from_keyframes(
            vec![
                (0.0, PropertyBag::new().with("scale", 0.0).with("opacity", 0.0)),
                (0.6, PropertyBag::new().with("scale", 1.1).with("opacity", 1.0)),
                (1.0, PropertyBag::new().with("scale", 1.0).with("opacity", 1.0)),
            ],
            Easing::EaseOut,
        )
    }

    // ========================================================================
    // Scrubbable timeline
    // ========================================================================

    /// Five equal phases over `x`, `y`, `rotate`, `scale` and `background`:
    ///
    /// 1. move right and spin half a turn
    /// 2. grow and shift from blue to purple
    /// 3. drop to `y = 100` while finishing the turn
    /// 4. pulse
    /// 5. return to the start
    pub fn interactive_timeline() -> Result<PhaseTimeline> {
        let blue = Color::from_hex(TIMELINE_BLUE);
        let purple = Color::from_hex(TIMELINE_PURPLE);
        let frame = |x: f32, y: f32, rotate: f32, scale: f32, background: Color| {
            PropertyBag::new()
                .with("x", x)
                .with("y", y)
                .with("rotate", rotate)
                .with("scale", scale)
                .with("background", background)
        };

        PhaseTimeline::builder()
            .phase(0.0, 0.2, move |t| frame(150.0 * t, 0.0, 180.0 * t, 1.0, blue))
            .phase(0.2, 0.4, move |t| {
                frame(150.0, 0.0, 180.0, 1.0 + 0.5 * t, blue.lerp(&purple, t))
            })
            .phase(0.4, 0.6, move |t| {
                frame(150.0 - 150.0 * t, 100.0 * t, 180.0 + 180.0 * t, 1.5, purple)
            })
            .phase(0.6, 0.8, move |t| {
                frame(0.0, 100.0, 360.0, (t * TAU).sin() * 0.25 + 1.25, purple)
            })
            .phase(0.8, 1.0, move |t| {
                frame(0.0, 100.0 - 100.0 * t, 360.0 - 360.0 * t, 1.5 - 0.5 * t, purple.lerp(&blue, t))
            })
            .build()
    }

    /// Per-property keyframe tracks: a slide out and back, a color cycle,
    /// a grow-hold-shrink and a spin held at both ends
    pub fn keyframe_showcase() -> Result<Vec<(PropertyName, TransformChain<Value>)>> {
        let colors = [0xff0088, 0x00ff00, 0x0000ff, 0xff0088].map(|hex| Value::Color(Color::from_hex(hex)));
        Ok(vec![
            ("x".into(), track(&[0.0, 0.5, 1.0], &[0.0, 100.0, 0.0])?),
            (
                "background".into(),
                TransformChain::from_ranges(&[0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0], &colors)?,
            ),
            ("scale".into(), track(&[0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0], &[1.0, 2.0, 2.0, 1.0])?),
            (
                "rotate".into(),
                track(&[0.0, 0.25, 0.5, 0.85, 1.0], &[0.0, 0.0, 270.0, 270.0, 0.0])?,
            ),
        ])
    }

    // ========================================================================
    // Scripts
    // ========================================================================

    /// Create `count` targets with the properties the scripts animate,
    /// starting hidden and slightly lowered
    pub fn stage(graph: &mut MotionGraph, count: usize) -> Vec<PropertyBindings> {
        (0..count)
            .map(|_| {
                PropertyBindings::new()
                    .bind("opacity", graph.create(0.0_f32))
                    .bind("x", graph.create(0.0_f32))
                    .bind("y", graph.create(20.0_f32))
                    .bind("rotate", graph.create(0.0_f32))
                    .bind("scale", graph.create(1.0_f32))
            })
            .collect()
    }

    /// Fade each target up into place, one after another
    pub fn basic_sequence() -> Choreography {
        Choreography::new().sequential(|_, _| {
            TargetMotion::from_to(
                PropertyBag::new().with("opacity", 0.0).with("y", 20.0),
                PropertyBag::new().with("opacity", 1.0).with("y", 0.0),
                Transition::new(300.0).with_easing(Easing::EaseOut),
            )
        })
    }

    /// Values the basic timeline box starts from and returns to
    pub fn timeline_box_rest() -> PropertyBag {
        PropertyBag::new()
            .with("x", 0.0)
            .with("y", 0.0)
            .with("rotate", 0.0)
            .with("scale", 1.0)
            .with("background", Color::from_hex(TIMELINE_BLUE))
    }

    /// One target bound to the properties of [`MotionPreset::basic_timeline`],
    /// at rest
    pub fn timeline_box(graph: &mut MotionGraph) -> PropertyBindings {
        PropertyBindings::new()
            .bind("x", graph.create(0.0_f32))
            .bind("y", graph.create(0.0_f32))
            .bind("rotate", graph.create(0.0_f32))
            .bind("scale", graph.create(1.0_f32))
            .bind("background", graph.create(Color::from_hex(TIMELINE_BLUE)))
    }

    /// Five one-property steps on a single box: right, down, half turn,
    /// grow to purple, then a slower return to
    /// [`MotionPreset::timeline_box_rest`]
    pub fn basic_timeline() -> Choreography {
        let step = |bag: PropertyBag, duration_ms: f64| {
            ChoreographyStep::parallel(move |_, _| TargetMotion::to(bag.clone(), Transition::new(duration_ms)))
        };

        Choreography::new()
            .step(step(PropertyBag::new().with("x", 100.0), 1000.0))
            .step(step(PropertyBag::new().with("y", 100.0), 1000.0))
            .step(step(PropertyBag::new().with("rotate", 180.0), 1000.0))
            .step(step(
                PropertyBag::new()
                    .with("scale", 1.5)
                    .with("background", Color::from_hex(TIMELINE_PURPLE)),
                1000.0,
            ))
            .step(step(Self::timeline_box_rest(), 1500.0))
    }

    /// Six steps: staggered appear, circle formation, a full spin, a
    /// staggered pulse, regroup, fade away. Ends with an instant reset so
    /// the script can run again.
    pub fn orchestration() -> Result<Choreography> {
        let pulse = track(&[0.0, 0.5, 1.0], &[1.0, 1.5, 1.0])?;

        Ok(Choreography::new()
            .parallel(|i, ctx| {
                TargetMotion::to(
                    PropertyBag::new().with("opacity", 1.0).with("y", 0.0),
                    Transition::new(500.0)
                        .with_delay(ctx.stagger(i, 200.0, StaggerFrom::First))
                        .with_easing(Easing::EaseOut),
                )
            })
            .parallel(|i, ctx| {
                let turn = i as f32 / ctx.target_count.max(1) as f32;
                let angle = turn * TAU;
                TargetMotion::to(
                    PropertyBag::new()
                        .with("x", 80.0 * angle.cos())
                        .with("y", 80.0 * angle.sin())
                        .with("rotate", turn * 360.0),
                    Transition::new(800.0).with_easing(Easing::BackOut),
                )
            })
            .parallel(|i, ctx| {
                let start = i as f32 / ctx.target_count.max(1) as f32 * 360.0;
                TargetMotion::from_to(
                    PropertyBag::new().with("rotate", start),
                    PropertyBag::new().with("rotate", start + 360.0),
                    Transition::new(2000.0).with_easing(Easing::Linear),
                )
            })
            .parallel(move |i, ctx| {
                TargetMotion::keyframes(
                    vec![("scale".into(), pulse.clone())],
                    Transition::new(500.0).with_delay(ctx.stagger(i, 100.0, StaggerFrom::First)),
                )
            })
            .parallel(|i, ctx| {
                TargetMotion::to(
                    PropertyBag::new().with("x", 0.0).with("y", 0.0).with("rotate", 0.0),
                    Transition::new(800.0).with_delay(ctx.stagger(i, 100.0, StaggerFrom::First)),
                )
            })
            .parallel(|_, _| {
                TargetMotion::to(
                    PropertyBag::new().with("opacity", 0.0).with("y", 20.0),
                    Transition::new(500.0),
                )
            })
            .parallel(|_, _| {
                TargetMotion::to(
                    PropertyBag::new()
                        .with("opacity", 0.0)
                        .with("y", 20.0)
                        .with("x", 0.0)
                        .with("rotate", 0.0)
                        .with("scale", 1.0),
                    Transition::new(0.0),
                )
            }))
    }

    /// Appear, split the first `left` targets left and the rest right,
    /// merge back with a bump, form a circle, spin, then burst outward
    pub fn split_and_merge(left: usize) -> Result<Choreography> {
        let merge_left = merge_tracks(-120.0, -15.0)?;
        let merge_right = merge_tracks(120.0, 15.0)?;

        Ok(Choreography::new()
            .parallel(|i, ctx| {
                TargetMotion::to(
                    PropertyBag::new().with("opacity", 1.0).with("scale", 1.0),
                    Transition::new(300.0)
                        .with_delay(ctx.stagger(i, 100.0, StaggerFrom::First))
                        .with_easing(Easing::EaseOut),
                )
            })
            .parallel(move |i, _| {
                let side = if i < left { -1.0 } else { 1.0 };
                TargetMotion::to(
                    PropertyBag::new().with("x", 120.0 * side).with("rotate", 15.0 * side),
                    Transition::new(500.0),
                )
            })
            .parallel(move |i, ctx| {
                let tracks = if i < left { &merge_left } else { &merge_right };
                TargetMotion::keyframes(
                    tracks.clone(),
                    Transition::new(700.0)
                        .with_delay(ctx.stagger(i, 50.0, StaggerFrom::First))
                        .with_easing(Easing::BackOut),
                )
            })
            .parallel(|i, ctx| {
                let angle = i as f32 / ctx.target_count.max(1) as f32 * TAU;
                TargetMotion::to(
                    PropertyBag::new()
                        .with("x", 100.0 * angle.cos())
                        .with("y", 100.0 * angle.sin()),
                    Transition::new(500.0),
                )
            })
            .parallel(|_, _| {
                TargetMotion::to(
                    PropertyBag::new().with("rotate", 360.0),
                    Transition::new(2000.0).with_easing(Easing::Linear),
                )
            })
            .parallel(|i, ctx| {
                let angle = i as f32 / ctx.target_count.max(1) as f32 * TAU;
                TargetMotion::to(
                    PropertyBag::new()
                        .with("x", 200.0 * angle.cos())
                        .with("y", 200.0 * angle.sin())
                        .with("opacity", 0.0)
                        .with("scale", 0.0),
                    Transition::new(800.0).with_easing(Easing::CubicBezier(0.25, 1.0, 0.5, 1.0)),
                )
            }))
    }

    // ========================================================================
    // Derived values
    // ========================================================================

    /// 3D tilt from a pointer offset in `-100..=100`: returns
    /// `(rotate_x, rotate_y)` in degrees, at most 30 either way
    pub fn tilt(
        graph: &mut MotionGraph,
        pointer_x: MotionValue<f32>,
        pointer_y: MotionValue<f32>,
    ) -> Result<(MotionValue<f32>, MotionValue<f32>)> {
        let rotate_x = graph.derive(pointer_y, TransformChain::from_ranges(&[-100.0, 100.0], &[30.0, -30.0])?)?;
        let rotate_y = graph.derive(pointer_x, TransformChain::from_ranges(&[-100.0, 100.0], &[-30.0, 30.0])?)?;
        Ok((rotate_x, rotate_y))
    }

    /// Opacity that fades out as a card is dragged `distance` either way
    pub fn drag_fade(graph: &mut MotionGraph, x: MotionValue<f32>, distance: f32) -> Result<MotionValue<f32>> {
        let chain = TransformChain::from_ranges(&[-distance, 0.0, distance], &[0.0, 1.0, 0.0])?;
        graph.derive(x, chain)
    }

    // ========================================================================
    // Gestures
    // ========================================================================

    /// Box that drags 50 units each way with moderate give
    pub fn drag_box() -> GestureConfig {
        GestureConfig::new().with_constraints(DragConstraints::symmetric(50.0, 50.0))
    }

    /// Box that drags 100 units each way and feels stiff past the edge
    pub fn elastic_box() -> GestureConfig {
        GestureConfig::new()
            .with_constraints(DragConstraints::symmetric(100.0, 100.0))
            .with_elasticity(0.2)
    }

    /// Horizontal track of `-half_width..=half_width`
    pub fn slider(half_width: f32) -> GestureConfig {
        GestureConfig::new()
            .with_axis(DragAxis::X)
            .with_constraints(DragConstraints::horizontal(-half_width, half_width))
            .with_elasticity(0.2)
    }

    /// Card that commits once dragged more than 100 units sideways and
    /// otherwise springs back to the middle
    pub fn swipe_to_dismiss() -> GestureConfig {
        GestureConfig::new()
            .with_axis(DragAxis::X)
            .with_constraints(DragConstraints::horizontal(0.0, 0.0))
            .with_elasticity(0.5)
            .with_commit(CommitRule::OffsetX(100.0))
            .with_snap_spring(SpringConfig::snappy())
    }
}

fn track(inputs: &[f32], outputs: &[f32]) -> Result<TransformChain<Value>> {
    let outputs: Vec<Value> = outputs.iter().copied().map(Value::Number).collect();
    TransformChain::from_ranges(inputs, &outputs)
}

/// Tracks that bring a split target home with a scale bump at 60%
fn merge_tracks(x: f32, rotate: f32) -> Result<Vec<(PropertyName, TransformChain<Value>)>> {
    Ok(vec![
        ("x".into(), track(&[0.0, 1.0], &[x, 0.0])?),
        ("rotate".into(), track(&[0.0, 1.0], &[rotate, 0.0])?),
        ("scale".into(), track(&[0.0, 0.6, 1.0], &[1.0, 1.2, 1.0])?),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choreography::Choreographer;
    use crate::clock::ManualClock;
    use crate::frame::{FrameContext, FrameQueue};
    use crate::gesture::elastic;
    use std::rc::Rc;

    fn close(a: Option<f32>, b: f32) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-3)
    }

    #[test]
    fn test_entry_presets_build() {
        for timeline in [
            MotionPreset::fade_in(),
            MotionPreset::fade_out(),
            MotionPreset::scale_in(),
            MotionPreset::slide_in(-40.0, 0.0),
            MotionPreset::pop_in(),
        ] {
            let timeline = timeline.unwrap();
            assert!(!timeline.is_empty());
        }

        let fade = MotionPreset::fade_in().unwrap();
        assert_eq!(fade.evaluate(0.0).number("opacity"), Some(0.0));
        assert_eq!(fade.evaluate(1.0).number("opacity"), Some(1.0));
    }

    #[test]
    fn test_interactive_timeline_phases() {
        let timeline = MotionPreset::interactive_timeline().unwrap();
        assert_eq!(timeline.len(), 5);

        let quarter = timeline.evaluate(0.1);
        assert!(close(quarter.number("x"), 75.0));
        assert!(close(quarter.number("rotate"), 90.0));

        let pulse = timeline.evaluate(0.7);
        assert!(close(pulse.number("scale"), 1.25));
        assert!(close(pulse.number("y"), 100.0));

        let start = timeline.evaluate(0.0);
        let end = timeline.evaluate(1.0);
        assert_eq!(start.color("background"), Some(Color::from_hex(TIMELINE_BLUE)));
        assert_eq!(end.color("background"), Some(Color::from_hex(TIMELINE_BLUE)));
        assert!(close(end.number("scale"), 1.0));
        assert!(close(end.number("rotate"), 0.0));
    }

    #[test]
    fn test_keyframe_showcase_tracks() {
        let tracks = MotionPreset::keyframe_showcase().unwrap();
        let rotate = &tracks.iter().find(|(name, _)| name == "rotate").unwrap().1;

        assert_eq!(rotate.sample(0.25).as_number(), Some(0.0));
        assert_eq!(rotate.sample(0.5).as_number(), Some(270.0));
        assert_eq!(rotate.sample(0.85).as_number(), Some(270.0));
    }

    #[test]
    fn test_orchestration_runs_to_rest() {
        let clock = Rc::new(ManualClock::new(0.0));
        let queue = Rc::new(FrameQueue::new());
        let ctx = FrameContext::new(clock.clone(), queue.clone());
        let mut graph = MotionGraph::new();
        let targets = MotionPreset::stage(&mut graph, 6);
        let mut choreographer = Choreographer::new(targets.clone(), ctx);

        let run = choreographer
            .run(&mut graph, MotionPreset::orchestration().unwrap())
            .unwrap();

        let mut finished = None;
        for _ in 0..1000 {
            let due = queue.take_due();
            if due.is_empty() {
                break;
            }
            clock.advance(16.0);
            for token in due {
                if let Some(done) = choreographer.on_frame(token, &mut graph).unwrap() {
                    finished = Some(done);
                }
            }
        }

        assert_eq!(finished, Some(run));
        for target in &targets {
            let end = target.snapshot(&graph).unwrap();
            assert_eq!(end.number("opacity"), Some(0.0));
            assert_eq!(end.number("y"), Some(20.0));
            assert_eq!(end.number("x"), Some(0.0));
            assert_eq!(end.number("rotate"), Some(0.0));
            assert_eq!(end.number("scale"), Some(1.0));
        }
        assert_eq!(MotionPreset::orchestration().unwrap().len(), 7);
    }

    #[test]
    fn test_basic_timeline_step_boundaries() {
        let clock = Rc::new(ManualClock::new(0.0));
        let queue = Rc::new(FrameQueue::new());
        let ctx = FrameContext::new(clock.clone(), queue.clone());
        let mut graph = MotionGraph::new();
        let target = MotionPreset::timeline_box(&mut graph);
        assert_eq!(target.snapshot(&graph).unwrap(), MotionPreset::timeline_box_rest());

        let mut choreographer = Choreographer::new(vec![target.clone()], ctx);
        let script = MotionPreset::basic_timeline();
        assert_eq!(script.len(), 5);
        let run = choreographer.run(&mut graph, script).unwrap();

        let mut frame = |dt: f64, graph: &mut MotionGraph| {
            clock.advance(dt);
            let mut finished = None;
            for token in queue.take_due() {
                finished = finished.or(choreographer.on_frame(token, graph).unwrap());
            }
            (finished, target.snapshot(graph).unwrap())
        };

        let (_, at) = frame(1000.0, &mut graph);
        assert_eq!(at.number("x"), Some(100.0));
        assert!(close(at.number("y"), 0.0));

        let (_, at) = frame(1000.0, &mut graph);
        assert_eq!(at.number("y"), Some(100.0));
        assert!(close(at.number("rotate"), 0.0));

        let (_, at) = frame(1000.0, &mut graph);
        assert_eq!(at.number("rotate"), Some(180.0));
        assert!(close(at.number("scale"), 1.0));

        let (_, at) = frame(1000.0, &mut graph);
        assert_eq!(at.number("scale"), Some(1.5));
        assert_eq!(at.color("background"), Some(Color::from_hex(TIMELINE_PURPLE)));
        assert_eq!(at.number("x"), Some(100.0));

        let (finished, at) = frame(750.0, &mut graph);
        assert_eq!(finished, None);
        assert!(at.number("x").unwrap() < 100.0);

        let (finished, at) = frame(750.0, &mut graph);
        assert_eq!(finished, Some(run));
        assert_eq!(at, MotionPreset::timeline_box_rest());
    }

    #[test]
    fn test_basic_timeline_reset_mid_run() {
        let clock = Rc::new(ManualClock::new(0.0));
        let queue = Rc::new(FrameQueue::new());
        let ctx = FrameContext::new(clock.clone(), queue.clone());
        let mut graph = MotionGraph::new();
        let target = MotionPreset::timeline_box(&mut graph);
        let mut choreographer = Choreographer::new(vec![target.clone()], ctx);

        choreographer.run(&mut graph, MotionPreset::basic_timeline()).unwrap();
        clock.advance(1500.0);
        for token in queue.take_due() {
            choreographer.on_frame(token, &mut graph).unwrap();
        }
        assert!(graph.value(target.get("y").unwrap()).unwrap().as_number().unwrap() > 0.0);

        choreographer.cancel();
        target.apply(&mut graph, &MotionPreset::timeline_box_rest()).unwrap();
        assert!(!queue.has_pending());
        assert_eq!(target.snapshot(&graph).unwrap(), MotionPreset::timeline_box_rest());
    }

    #[test]
    fn test_split_and_merge_builds() {
        let script = MotionPreset::split_and_merge(3).unwrap();
        assert_eq!(script.len(), 6);
        assert_eq!(MotionPreset::basic_sequence().len(), 1);
    }

    #[test]
    fn test_tilt_maps_pointer_to_degrees() {
        let mut graph = MotionGraph::new();
        let px = graph.create(0.0_f32);
        let py = graph.create(0.0_f32);
        let (rotate_x, rotate_y) = MotionPreset::tilt(&mut graph, px, py).unwrap();

        graph.set(py, 100.0).unwrap();
        graph.set(px, -50.0).unwrap();
        assert_eq!(graph.get(rotate_x), Some(-30.0));
        assert_eq!(graph.get(rotate_y), Some(-15.0));

        graph.set(py, 500.0).unwrap();
        assert_eq!(graph.get(rotate_x), Some(-30.0));
    }

    #[test]
    fn test_gesture_presets() {
        let swipe = MotionPreset::swipe_to_dismiss();
        assert_eq!(swipe.axis, DragAxis::X);
        assert_eq!(elastic(200.0, swipe.constraints.min_x, swipe.constraints.max_x, swipe.elasticity), 100.0);
        assert!(swipe.commit.should_commit(kinema_core::Point::new(-101.0, 0.0), kinema_core::Point::ZERO));

        let stiff = MotionPreset::elastic_box();
        assert_eq!(elastic(150.0, -100.0, 100.0, stiff.elasticity), 110.0);
        assert_eq!(MotionPreset::drag_box().constraints, DragConstraints::symmetric(50.0, 50.0));
        assert_eq!(MotionPreset::slider(120.0).constraints.max_x, 120.0);
    }
}
