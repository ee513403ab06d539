//! Audio output seam
//!
//! The fader never touches an audio device directly. Each layer holds a
//! handle implementing [`AudioOutput`], handed over by the surrounding
//! audio subsystem at startup.

use std::fmt;

use crate::engine::transport::PlaybackTransport;

/// Outbound interface to one audio-emitting resource
pub trait AudioOutput: Send {
    /// Name the output was resolved under
    fn name(&self) -> &str;

    /// Set the output volume, `0.0..=1.0`
    fn set_gain(&mut self, gain: f32);

    /// Start playback from the top of the track
    fn play(&mut self, looping: bool);

    /// Stop playback
    fn stop(&mut self);

    /// Advance the playback clock by `dt` seconds
    ///
    /// Device-backed outputs keep their own clock and ignore this.
    fn advance(&mut self, _dt: f64) {}

    /// Current playback position in seconds, if the output exposes one
    fn playback_position(&self) -> Option<f64> {
        None
    }
}

impl fmt::Debug for dyn AudioOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioOutput")
            .field("name", &self.name())
            .finish()
    }
}

// ============================================================================
// Virtual Output
// ============================================================================

/// An output that keeps gain and playback position in memory
///
/// Used for simulation and for assets whose playback is owned elsewhere:
/// it records what the device would have been told.
#[derive(Debug, Clone)]
pub struct VirtualOutput {
    name: String,
    gain: f32,
    transport: PlaybackTransport,
}

impl VirtualOutput {
    /// Create an output with an explicit transport
    pub fn new(name: impl Into<String>, transport: PlaybackTransport) -> Self {
        Self {
            name: name.into(),
            gain: 1.0,
            transport,
        }
    }

    /// Create an output for a looping track of `track_secs`
    pub fn with_length(name: impl Into<String>, track_secs: f64) -> Self {
        Self::new(name, PlaybackTransport::new(Some(track_secs)))
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn transport(&self) -> &PlaybackTransport {
        &self.transport
    }
}

impl AudioOutput for VirtualOutput {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    fn play(&mut self, looping: bool) {
        self.transport.play(looping);
    }

    fn stop(&mut self) {
        self.transport.stop();
    }

    fn advance(&mut self, dt: f64) {
        self.transport.advance(dt);
    }

    fn playback_position(&self) -> Option<f64> {
        Some(self.transport.playhead_position())
    }
}
