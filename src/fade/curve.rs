//! Volume Curves
//!
//! Maps fade progress to a gain value.
//!
//! The default law re-seeds a linear interpolation from the *current*
//! gain on every tick:
//!
//! ```text
//! gain[t + dt] = gain[t] + (target - gain[t]) * progress
//! ```
//!
//! With a fixed tick size this bends into an exponential-looking approach
//! rather than a straight ramp, which is the sound the layered music was
//! tuned against. [`CurveLaw::Linear`] is the textbook ramp from the gain
//! the fade started at.

use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Clamp to the normalized `[0, 1]` range. NaN collapses to 0.
#[inline]
fn unit<T: Float>(value: T) -> T {
    value.max(T::zero()).min(T::one())
}

/// Move `current` toward `target` by `progress` of the remaining distance
///
/// # Arguments
/// * `current` - Gain before this step
/// * `target` - Gain the fade is heading for
/// * `progress` - `elapsed / duration`, clamped to `[0, 1]`
///
/// # Returns
/// The next gain, clamped to `[0, 1]`
///
/// # Example
/// ```
/// use layerfade::fade::interpolate;
/// let g1 = interpolate(0.0_f32, 1.0, 0.25);
/// let g2 = interpolate(g1, 1.0, 0.5);
/// assert_eq!(g1, 0.25);
/// assert_eq!(g2, 0.625);
/// ```
#[inline]
pub fn interpolate<T: Float>(current: T, target: T, progress: T) -> T {
    let progress = unit(progress);
    unit(current + (target - current) * progress)
}

/// Interpolation law used while a transition runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveLaw {
    /// Lerp from the current gain each tick, re-seeded every step
    #[default]
    Reseeded,
    /// Lerp from the gain captured when the transition began
    Linear,
}

impl CurveLaw {
    /// Compute the gain for one tick
    ///
    /// `start` is only consulted by [`CurveLaw::Linear`].
    pub fn apply<T: Float>(self, current: T, start: T, target: T, progress: T) -> T {
        match self {
            CurveLaw::Reseeded => interpolate(current, target, progress),
            CurveLaw::Linear => interpolate(start, target, progress),
        }
    }
}
