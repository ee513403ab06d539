//! Layer Model Module
//!
//! - Per-layer gain and transition state
//! - The bus that owns all layers and starts them in lockstep

mod bus;
mod layer;

pub use bus::LayerBus;
pub use layer::{Layer, TransitionState};
