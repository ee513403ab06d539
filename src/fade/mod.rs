//! Fade Engine
//!
//! Per-layer fade transitions driven by an external tick:
//! - Volume curve laws
//! - Transition records (one resumable fade each)
//! - The controller that owns and advances them

mod controller;
mod curve;
mod transition;

pub use controller::FadeController;
pub use curve::{interpolate, CurveLaw};
pub use transition::{Direction, TickOrder, Transition};
