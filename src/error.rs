//! Error handling for Layerfade
//!
//! Startup errors are fatal: a scene whose layers cannot all be started
//! together would play out of sync, so there is no degraded mode.
//! Runtime trigger problems never surface here; they are absorbed by the
//! dispatcher.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Layerfade operations
pub type Result<T> = std::result::Result<T, LayerFadeError>;

/// Main error type for Layerfade operations
#[derive(Error, Debug)]
pub enum LayerFadeError {
    // Startup Errors
    #[error(
        "Layer {layer}: output '{name}' is either missing or does not provide an audio output"
    )]
    MissingOutput { layer: usize, name: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Invalid audio asset {}: {reason}", .path.display())]
    InvalidAudio {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<hound::Error>,
    },

    // Input Errors
    #[error("Invalid trigger '{input}': expected <layer>@<seconds>")]
    InvalidTrigger { input: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LayerFadeError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            LayerFadeError::MissingOutput { .. } => "MISSING_OUTPUT",
            LayerFadeError::InvalidConfig { .. } => "INVALID_CONFIG",
            LayerFadeError::InvalidAudio { .. } => "INVALID_AUDIO",
            LayerFadeError::InvalidTrigger { .. } => "INVALID_TRIGGER",
            LayerFadeError::Io(_) => "IO_ERROR",
            LayerFadeError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error must terminate the process
    ///
    /// Fatal errors abort scene startup. Callers must not try to continue
    /// with a partially initialized set of layers.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            LayerFadeError::MissingOutput { .. }
                | LayerFadeError::InvalidConfig { .. }
                | LayerFadeError::InvalidAudio { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            LayerFadeError::MissingOutput { .. } => vec![
                "Check the layer name in the configuration matches the asset name",
                "Make sure a <name>.wav file exists below the asset directory",
            ],
            LayerFadeError::InvalidConfig { .. } => vec![
                "Fade durations must be between 0.1 and 10.0 seconds",
                "Run 'layerfade-cli init-config <path>' to generate a valid file",
            ],
            LayerFadeError::InvalidAudio { .. } => vec![
                "Try re-exporting the layer as a PCM WAV file",
                "All layers should share one sample rate to stay in sync",
            ],
            LayerFadeError::InvalidTrigger { .. } => {
                vec!["Write triggers as <layer>@<seconds>, for example 2@1.5"]
            }
            _ => vec![],
        }
    }
}
