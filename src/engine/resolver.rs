//! Output resolution
//!
//! Looks up the audio output behind each configured layer name at
//! startup. A resolver answers `Ok(None)` when a name is simply absent;
//! the layer bus turns that into a fatal startup error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use hound::WavReader;
use tracing::debug;
use walkdir::WalkDir;

use crate::engine::output::{AudioOutput, VirtualOutput};
use crate::engine::transport::PlaybackTransport;
use crate::error::{LayerFadeError, Result};

/// Finds the audio output for a configured name
pub trait OutputResolver {
    /// Resolve `name` to an output handle
    ///
    /// # Returns
    /// * `Ok(Some(_))` - The output exists and is ready to play
    /// * `Ok(None)` - Nothing is registered under `name`
    /// * `Err(_)` - Something exists under `name` but cannot be used
    fn resolve(&mut self, name: &str) -> Result<Option<Box<dyn AudioOutput>>>;
}

// ============================================================================
// Virtual Resolver
// ============================================================================

/// Resolves names to in-memory [`VirtualOutput`]s
#[derive(Debug, Clone, Default)]
pub struct VirtualResolver {
    tracks: HashMap<String, f64>,
    fallback_secs: Option<f64>,
}

impl VirtualResolver {
    /// A resolver that knows no names
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolver that accepts every name, all tracks `track_secs` long
    pub fn any(track_secs: f64) -> Self {
        Self {
            tracks: HashMap::new(),
            fallback_secs: Some(track_secs),
        }
    }

    /// Register one named track
    pub fn with_track(mut self, name: impl Into<String>, track_secs: f64) -> Self {
        self.tracks.insert(name.into(), track_secs);
        self
    }
}

impl OutputResolver for VirtualResolver {
    fn resolve(&mut self, name: &str) -> Result<Option<Box<dyn AudioOutput>>> {
        let secs = self.tracks.get(name).copied().or(self.fallback_secs);
        Ok(secs.map(|secs| Box::new(VirtualOutput::with_length(name, secs)) as Box<dyn AudioOutput>))
    }
}

// ============================================================================
// WAV Resolver
// ============================================================================

/// Resolves names to `<name>.wav` files anywhere below an asset directory
///
/// Only the WAV header is read: track length and sample rate feed the
/// output's playback clock. Decoding and device output belong to the
/// audio subsystem.
#[derive(Debug, Clone)]
pub struct WavResolver {
    root: PathBuf,
}

impl WavResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the first `<name>.wav` below the root, in file name order
    pub fn find_asset(&self, name: &str) -> Option<PathBuf> {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .find(|path| {
                let stem_matches = path.file_stem().and_then(|s| s.to_str()) == Some(name);
                let is_wav = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.eq_ignore_ascii_case("wav"))
                    .unwrap_or(false);
                stem_matches && is_wav
            })
    }

    fn open_transport(path: &Path) -> Result<PlaybackTransport> {
        let reader = WavReader::open(path).map_err(|e| LayerFadeError::InvalidAudio {
            path: path.to_path_buf(),
            reason: "failed to open WAV file".to_string(),
            source: Some(e),
        })?;

        let spec = reader.spec();
        let frames = reader.duration();
        if frames == 0 {
            return Err(LayerFadeError::InvalidAudio {
                path: path.to_path_buf(),
                reason: "file contains no samples".to_string(),
                source: None,
            });
        }

        let length_secs = frames as f64 / spec.sample_rate as f64;
        Ok(PlaybackTransport::new(Some(length_secs)))
    }
}

impl OutputResolver for WavResolver {
    fn resolve(&mut self, name: &str) -> Result<Option<Box<dyn AudioOutput>>> {
        let Some(path) = self.find_asset(name) else {
            return Ok(None);
        };

        let transport = Self::open_transport(&path)?;
        debug!(
            name,
            path = %path.display(),
            length_secs = ?transport.track_length(),
            "resolved layer asset"
        );
        Ok(Some(Box::new(VirtualOutput::new(name, transport))))
    }
}
