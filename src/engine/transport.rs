//! Playback transport for a single looping layer
//!
//! Tracks whether a voice is playing and where its playhead is. Layers
//! only stay in phase if every transport starts at the same instant and
//! is advanced by the same amounts, so the transport never moves on its
//! own: it is stepped by the scene tick.

use tracing::debug;

/// Transport states of one voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum TransportState {
    /// Not started, or stopped at shutdown (default state)
    #[default]
    Stopped,
    /// Audio is actively playing
    Playing,
}

/// Playhead and play state of one looping voice
#[derive(Debug, Clone, Default)]
pub struct PlaybackTransport {
    state: TransportState,

    /// Current playhead position in seconds, always within the track
    playhead_position: f64,

    /// Track length in seconds; `None` for an unbounded stream
    track_length: Option<f64>,

    /// Whether the playhead wraps to zero at the end of the track
    looping: bool,
}

impl PlaybackTransport {
    /// Create a stopped transport
    ///
    /// # Arguments
    /// * `track_length` - Track length in seconds, if known
    ///
    /// # Example
    /// ```
    /// use layerfade::engine::PlaybackTransport;
    /// let transport = PlaybackTransport::new(Some(8.0));
    /// assert!(transport.is_stopped());
    /// ```
    pub fn new(track_length: Option<f64>) -> Self {
        let track_length = track_length.filter(|len| len.is_finite() && *len > 0.0);
        Self {
            state: TransportState::Stopped,
            playhead_position: 0.0,
            track_length,
            looping: false,
        }
    }

    // ========================================================================
    // Transport Controls
    // ========================================================================

    /// Start playback from the top of the track
    ///
    /// State transitions:
    /// - Stopped -> Playing (playhead reset to 0)
    /// - Playing -> Playing (no-op)
    pub fn play(&mut self, looping: bool) {
        self.looping = looping;
        if self.state == TransportState::Stopped {
            self.playhead_position = 0.0;
            self.state = TransportState::Playing;
            debug!(looping, "transport started");
        }
    }

    /// Stop playback and reset the playhead
    pub fn stop(&mut self) {
        self.state = TransportState::Stopped;
        self.playhead_position = 0.0;
    }

    /// Advance the playhead by `dt` seconds while playing
    ///
    /// A looping track wraps at its length; a one-shot track stops at its
    /// end. Negative or non-finite steps are ignored.
    pub fn advance(&mut self, dt: f64) {
        if self.state != TransportState::Playing || !dt.is_finite() || dt <= 0.0 {
            return;
        }

        let position = self.playhead_position + dt;

        self.playhead_position = match self.track_length {
            Some(length) if position >= length => {
                if self.looping {
                    position % length
                } else {
                    self.state = TransportState::Stopped;
                    length
                }
            }
            _ => position,
        };
    }

    // ========================================================================
    // State Queries
    // ========================================================================

    /// Current playhead position in seconds
    pub fn playhead_position(&self) -> f64 {
        self.playhead_position
    }

    pub fn track_length(&self) -> Option<f64> {
        self.track_length
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    pub fn is_stopped(&self) -> bool {
        self.state == TransportState::Stopped
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_state_is_stopped() {
        let transport = PlaybackTransport::default();
        assert!(transport.is_stopped());
        assert!(!transport.is_playing());
        assert_eq!(transport.playhead_position(), 0.0);
    }

    #[test]
    fn test_advance_while_stopped_does_nothing() {
        let mut transport = PlaybackTransport::new(Some(4.0));
        transport.advance(1.0);
        assert_eq!(transport.playhead_position(), 0.0);
    }

    #[test]
    fn test_looping_wraps_playhead() {
        let mut transport = PlaybackTransport::new(Some(4.0));
        transport.play(true);
        transport.advance(3.0);
        transport.advance(2.5);
        assert!(transport.is_playing());
        assert_relative_eq!(transport.playhead_position(), 1.5);
    }

    #[test]
    fn test_one_shot_stops_at_end() {
        let mut transport = PlaybackTransport::new(Some(2.0));
        transport.play(false);
        transport.advance(3.0);
        assert!(transport.is_stopped());
        assert_eq!(transport.playhead_position(), 2.0);
    }

    #[test]
    fn test_unbounded_stream_never_wraps() {
        let mut transport = PlaybackTransport::new(None);
        transport.play(true);
        transport.advance(100.0);
        assert_relative_eq!(transport.playhead_position(), 100.0);
    }

    #[test]
    fn test_replay_while_playing_keeps_position() {
        let mut transport = PlaybackTransport::new(Some(10.0));
        transport.play(true);
        transport.advance(1.0);
        transport.play(true);
        assert_relative_eq!(transport.playhead_position(), 1.0);

        transport.stop();
        transport.play(true);
        assert_eq!(transport.playhead_position(), 0.0);
    }

    #[test]
    fn test_invalid_steps_ignored() {
        let mut transport = PlaybackTransport::new(Some(10.0));
        transport.play(true);
        transport.advance(-1.0);
        transport.advance(f64::NAN);
        assert_eq!(transport.playhead_position(), 0.0);
    }

    #[test]
    fn test_zero_length_track_treated_as_unbounded() {
        let transport = PlaybackTransport::new(Some(0.0));
        assert_eq!(transport.track_length(), None);
    }
}
