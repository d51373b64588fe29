//! Kinema Core
//!
//! Foundational primitives for the Kinema motion engine:
//!
//! - **Motion Values**: Observable number and color cells with derived values
//!   recomputed through breakpoint transform chains
//! - **State Machines**: Table-driven lifecycles for playback and gestures
//! - **Pointer Events**: Device-agnostic input for drag gestures
//!
//! # Example
//!
//! ```rust
//! use kinema_core::{Color, MotionGraph, TransformChain};
//!
//! let mut graph = MotionGraph::new();
//!
//! // A writable value driven by a drag gesture
//! let x = graph.create(0.0_f32);
//!
//! // A background color that follows it
//! let background = graph
//!     .derive(
//!         x,
//!         TransformChain::new([
//!             (-100.0, Color::from_hex(0xff008c)),
//!             (0.0, Color::from_hex(0x7700ff)),
//!             (100.0, Color::from_hex(0x00c3ff)),
//!         ])
//!         .unwrap(),
//!     )
//!     .unwrap();
//!
//! graph.subscribe(background, |c: Color| println!("background is now {:?}", c)).unwrap();
//!
//! graph.set(x, 100.0).unwrap();
//! assert_eq!(graph.get(background).unwrap().to_rgb8(), [0x00, 0xc3, 0xff]);
//! ```

pub mod color;
pub mod error;
pub mod events;
pub mod fsm;
pub mod geometry;
pub mod motion;
pub mod transform;
pub mod value;

pub use color::Color;
pub use error::{MotionError, PhaseLayoutIssue, Result};
pub use events::{PointerEvent, PointerPhase};
pub use fsm::{StateMachine, StateMachineBuilder, Transition};
pub use geometry::{DragConstraints, Point};
pub use motion::{DriverId, MotionGraph, MotionValue, SubscriptionId, ValueId};
pub use transform::{Breakpoint, TransformChain};
pub use value::{Animatable, Value, ValueKind};
