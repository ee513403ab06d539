//! Layer state
//!
//! One looping track: its gain, whether a fade is running on it, and the
//! output handle the gain is forwarded to.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::AudioOutput;
use crate::fade::Direction;

/// Whether a layer is currently being faded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionState {
    #[default]
    Idle,
    FadingIn,
    FadingOut,
}

impl From<Direction> for TransitionState {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::In => TransitionState::FadingIn,
            Direction::Out => TransitionState::FadingOut,
        }
    }
}

impl fmt::Display for TransitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionState::Idle => write!(f, "Idle"),
            TransitionState::FadingIn => write!(f, "FadingIn"),
            TransitionState::FadingOut => write!(f, "FadingOut"),
        }
    }
}

/// One audio layer
///
/// `gain` is the single source of truth for audible volume. Every write
/// goes through [`Layer::set_gain`], which clamps it to `[0, 1]` and
/// forwards it to the output handle.
#[derive(Debug)]
pub struct Layer {
    /// 1-based, stable for the lifetime of the scene
    id: usize,
    name: String,
    gain: f32,
    state: TransitionState,
    output: Box<dyn AudioOutput>,
}

impl Layer {
    pub(crate) fn new(id: usize, name: impl Into<String>, output: Box<dyn AudioOutput>) -> Self {
        Self {
            id,
            name: name.into(),
            gain: 0.0,
            state: TransitionState::Idle,
            output,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == TransitionState::Idle
    }

    /// The output handle this layer drives
    pub fn output(&self) -> &dyn AudioOutput {
        self.output.as_ref()
    }

    /// Write a new gain and forward it to the output
    pub(crate) fn set_gain(&mut self, gain: f32) {
        let gain = if gain.is_nan() { 0.0 } else { gain.clamp(0.0, 1.0) };
        self.gain = gain;
        self.output.set_gain(gain);
    }

    pub(crate) fn set_state(&mut self, state: TransitionState) {
        self.state = state;
    }

    pub(crate) fn output_mut(&mut self) -> &mut dyn AudioOutput {
        self.output.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::VirtualOutput;

    fn layer() -> Layer {
        Layer::new(1, "MX_Layer_1", Box::new(VirtualOutput::with_length("MX_Layer_1", 4.0)))
    }

    #[test]
    fn test_new_layer_is_silent_and_idle() {
        let layer = layer();
        assert_eq!(layer.id(), 1);
        assert_eq!(layer.name(), "MX_Layer_1");
        assert_eq!(layer.gain(), 0.0);
        assert!(layer.is_idle());
    }

    #[test]
    fn test_set_gain_clamps() {
        let mut layer = layer();
        layer.set_gain(1.7);
        assert_eq!(layer.gain(), 1.0);
        layer.set_gain(-0.2);
        assert_eq!(layer.gain(), 0.0);
        layer.set_gain(f32::NAN);
        assert_eq!(layer.gain(), 0.0);
    }

    #[test]
    fn test_state_from_direction() {
        assert_eq!(TransitionState::from(Direction::In), TransitionState::FadingIn);
        assert_eq!(TransitionState::from(Direction::Out), TransitionState::FadingOut);
        assert_eq!(format!("{}", TransitionState::FadingOut), "FadingOut");
    }
}
