//! Audio Engine Module
//!
//! The boundary to the audio subsystem:
//! - Output handles and their trait
//! - Per-voice playback transport
//! - Name-based output resolution at startup

pub mod output;
pub mod resolver;
pub mod transport;

pub use output::{AudioOutput, VirtualOutput};
pub use resolver::{OutputResolver, VirtualResolver, WavResolver};
pub use transport::PlaybackTransport;
