//! Layerfade - Synchronized Music Layers with Crossfades
//!
//! A fixed set of looping tracks ("layers") start together at scene start
//! and stay phase-aligned for the lifetime of the scene. Discrete triggers
//! fade individual layers in or out, giving dynamic musical intensity
//! without a full middleware audio engine.
//!
//! # Architecture
//!
//! - [`fade`]: volume curves, transition records and the controller that
//!   advances them once per tick
//! - [`layers`]: per-layer state and the bus that starts all layers in
//!   lockstep
//! - [`dispatch`]: trigger handling with the busy guard
//! - [`engine`]: the seam to the audio subsystem (outputs, resolvers,
//!   playback clocks)
//! - [`scene`]: the facade an embedding drives frame by frame
//!
//! # Example
//!
//! ```
//! use layerfade::{FaderConfig, LayeredMusic, TriggerOutcome, VirtualResolver};
//!
//! let config = FaderConfig::default().with_durations(2.0, 2.0);
//! let mut scene = LayeredMusic::start(config, &mut VirtualResolver::any(8.0)).unwrap();
//!
//! assert_eq!(scene.trigger(1), TriggerOutcome::FadeIn);
//!
//! // The first tick samples progress 0, the second 0.25
//! scene.tick(0.5);
//! assert_eq!(scene.gain(1), Some(0.0));
//! scene.tick(0.5);
//! assert_eq!(scene.gain(1), Some(0.25));
//! ```

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod fade;
pub mod layers;
pub mod scene;

pub use config::{FaderConfig, GuardScope, LayerConfig};
pub use dispatch::{KeyBindings, TransitionDispatcher, TriggerOutcome};
pub use engine::{AudioOutput, OutputResolver, VirtualOutput, VirtualResolver, WavResolver};
pub use error::{LayerFadeError, Result};
pub use fade::{CurveLaw, Direction, FadeController, TickOrder, Transition};
pub use layers::{Layer, LayerBus, TransitionState};
pub use scene::{LayerSnapshot, LayeredMusic, SceneSnapshot};
