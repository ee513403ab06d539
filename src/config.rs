//! Scene configuration
//!
//! Configuration is loaded once at startup and never changes while the
//! scene runs. It is stored as JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LayerFadeError, Result};
use crate::fade::{CurveLaw, TickOrder};

// ============================================================================
// Constants
// ============================================================================

/// Shortest allowed fade duration in seconds
pub const MIN_FADE_SECS: f32 = 0.1;

/// Longest allowed fade duration in seconds
pub const MAX_FADE_SECS: f32 = 10.0;

/// Default fade duration for both directions
pub const DEFAULT_FADE_SECS: f32 = 5.0;

/// Number of layers in the default scene
pub const DEFAULT_LAYER_COUNT: usize = 3;

// ============================================================================
// Guard Scope
// ============================================================================

/// Scope of the busy guard that prevents overlapping transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardScope {
    /// While any layer is fading, no layer may start a new fade
    #[default]
    Global,
    /// Only the fading layer itself is blocked
    PerLayer,
}

// ============================================================================
// Layer Configuration
// ============================================================================

/// One configured layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerConfig {
    /// Name of the audio output resource backing this layer
    pub name: String,
}

impl LayerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// ============================================================================
// Fader Configuration
// ============================================================================

/// Complete configuration for a layered music scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FaderConfig {
    /// Layers in id order; layer ids are 1-based positions in this list
    pub layers: Vec<LayerConfig>,

    /// Fade-in duration in seconds, shared by all layers
    #[serde(default = "default_fade_secs")]
    pub fade_in_secs: f32,

    /// Fade-out duration in seconds, shared by all layers
    #[serde(default = "default_fade_secs")]
    pub fade_out_secs: f32,

    #[serde(default)]
    pub guard_scope: GuardScope,

    #[serde(default)]
    pub curve: CurveLaw,

    #[serde(default)]
    pub tick_order: TickOrder,

    /// Input key to layer id; digit keys map to their layer when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_bindings: Option<BTreeMap<String, usize>>,
}

fn default_fade_secs() -> f32 {
    DEFAULT_FADE_SECS
}

impl Default for FaderConfig {
    fn default() -> Self {
        Self {
            layers: (1..=DEFAULT_LAYER_COUNT)
                .map(|i| LayerConfig::new(format!("MX_Layer_{}", i)))
                .collect(),
            fade_in_secs: DEFAULT_FADE_SECS,
            fade_out_secs: DEFAULT_FADE_SECS,
            guard_scope: GuardScope::default(),
            curve: CurveLaw::default(),
            tick_order: TickOrder::default(),
            key_bindings: None,
        }
    }
}

impl FaderConfig {
    /// Create a configuration with the given layer names and default fades
    pub fn with_layers<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            layers: names.into_iter().map(LayerConfig::new).collect(),
            ..Self::default()
        }
    }

    /// Builder-style setter for both fade durations
    pub fn with_durations(mut self, fade_in_secs: f32, fade_out_secs: f32) -> Self {
        self.fade_in_secs = fade_in_secs;
        self.fade_out_secs = fade_out_secs;
        self
    }

    /// Builder-style setter for the busy guard scope
    pub fn with_guard_scope(mut self, scope: GuardScope) -> Self {
        self.guard_scope = scope;
        self
    }

    /// Builder-style setter for the interpolation law
    pub fn with_curve(mut self, curve: CurveLaw) -> Self {
        self.curve = curve;
        self
    }

    /// Builder-style setter for where each tick samples fade progress
    pub fn with_tick_order(mut self, order: TickOrder) -> Self {
        self.tick_order = order;
        self
    }

    /// Number of configured layers
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: FaderConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write this configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check durations, layer names and key bindings
    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(LayerFadeError::InvalidConfig {
                reason: "at least one layer is required".to_string(),
            });
        }

        for (label, secs) in [
            ("fade_in_secs", self.fade_in_secs),
            ("fade_out_secs", self.fade_out_secs),
        ] {
            if !(MIN_FADE_SECS..=MAX_FADE_SECS).contains(&secs) {
                return Err(LayerFadeError::InvalidConfig {
                    reason: format!(
                        "{} = {} is outside {}..={}",
                        label, secs, MIN_FADE_SECS, MAX_FADE_SECS
                    ),
                });
            }
        }

        for (index, layer) in self.layers.iter().enumerate() {
            if layer.name.trim().is_empty() {
                return Err(LayerFadeError::InvalidConfig {
                    reason: format!("layer {} has an empty name", index + 1),
                });
            }
            if self.layers[..index].iter().any(|l| l.name == layer.name) {
                return Err(LayerFadeError::InvalidConfig {
                    reason: format!("layer name '{}' is used twice", layer.name),
                });
            }
        }

        if let Some(bindings) = &self.key_bindings {
            for (key, &layer_id) in bindings {
                if layer_id == 0 || layer_id > self.layers.len() {
                    return Err(LayerFadeError::InvalidConfig {
                        reason: format!(
                            "key '{}' is bound to layer {}, but only layers 1..={} exist",
                            key,
                            layer_id,
                            self.layers.len()
                        ),
                    });
                }
            }
        }

        Ok(())
    }
}
