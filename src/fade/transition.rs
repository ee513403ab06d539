//! Transition records
//!
//! A transition is an explicit, resumable fade: it holds how far it has
//! run and is advanced by one step each tick until it completes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fade::curve::CurveLaw;

/// Where in a tick the fade progress is sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickOrder {
    /// Interpolate with the progress reached before this tick, then advance
    ///
    /// The first tick of a fade leaves the gain where it was, and the
    /// transition completes before sampling progress 1.0, so a re-seeded
    /// fade-in settles just short of full gain.
    #[default]
    SampleThenAdvance,
    /// Advance first, then interpolate; the last tick runs at progress 1.0
    AdvanceThenSample,
}

/// Direction of a fade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// Gain the fade is heading for
    pub fn target_gain(self) -> f32 {
        match self {
            Direction::In => 1.0,
            Direction::Out => 0.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "fade-in"),
            Direction::Out => write!(f, "fade-out"),
        }
    }
}

/// One active fade on one layer
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Layer this transition writes to (1-based)
    layer_id: usize,
    direction: Direction,
    /// Seconds advanced so far
    elapsed: f32,
    /// Total length in seconds
    duration: f32,
    /// Gain when the transition began
    start_gain: f32,
    target_gain: f32,
}

impl Transition {
    /// Create a transition starting from `start_gain`
    ///
    /// A non-positive or non-finite duration produces a transition that
    /// completes on its first tick.
    pub fn new(layer_id: usize, direction: Direction, duration: f32, start_gain: f32) -> Self {
        let duration = if duration.is_finite() {
            duration.max(0.0)
        } else {
            0.0
        };
        Self {
            layer_id,
            direction,
            elapsed: 0.0,
            duration,
            start_gain,
            target_gain: direction.target_gain(),
        }
    }

    pub fn layer_id(&self) -> usize {
        self.layer_id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn start_gain(&self) -> f32 {
        self.start_gain
    }

    pub fn target_gain(&self) -> f32 {
        self.target_gain
    }

    /// `elapsed / duration`, clamped to `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Whether the transition has run its full duration
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Advance by `dt` seconds and return the next gain
    ///
    /// Completion is checked after `elapsed` has moved, whatever the
    /// order. Once complete, a fade-out returns exactly 0.0 so the next
    /// trigger sees a silent layer.
    pub fn step(&mut self, current_gain: f32, dt: f32, law: CurveLaw, order: TickOrder) -> f32 {
        let progress = match order {
            TickOrder::SampleThenAdvance => {
                let progress = self.progress();
                self.elapsed += dt;
                progress
            }
            TickOrder::AdvanceThenSample => {
                self.elapsed += dt;
                self.progress()
            }
        };
        let gain = law.apply(current_gain, self.start_gain, self.target_gain, progress);

        if self.is_complete() && self.direction == Direction::Out {
            0.0
        } else {
            gain
        }
    }
}
