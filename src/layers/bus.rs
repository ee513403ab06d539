//! Layer Bus
//!
//! Owns the fixed set of layers and their startup/shutdown lifecycle.
//! Every output is resolved before any of them is started; playback then
//! begins for all layers in one pass so their clocks share time zero.

use tracing::{error, info};

use crate::config::FaderConfig;
use crate::engine::OutputResolver;
use crate::error::{LayerFadeError, Result};
use crate::layers::layer::Layer;

/// Registry of the scene's layers
#[derive(Debug)]
pub struct LayerBus {
    layers: Vec<Layer>,
}

impl LayerBus {
    /// Resolve every configured layer and start them together
    ///
    /// # Errors
    /// * `MissingOutput` - A configured name could not be resolved. Fatal:
    ///   no layer is started.
    /// * `InvalidAudio` - A resolved asset is unusable
    pub fn initialize(config: &FaderConfig, resolver: &mut dyn OutputResolver) -> Result<Self> {
        let mut layers = Vec::with_capacity(config.layer_count());

        for (index, layer_config) in config.layers.iter().enumerate() {
            let id = index + 1;
            let output = match resolver.resolve(&layer_config.name)? {
                Some(output) => output,
                None => {
                    error!(
                        layer = id,
                        name = %layer_config.name,
                        "output is either missing or does not provide an audio source"
                    );
                    return Err(LayerFadeError::MissingOutput {
                        layer: id,
                        name: layer_config.name.clone(),
                    });
                }
            };
            layers.push(Layer::new(id, layer_config.name.clone(), output));
        }

        for layer in &mut layers {
            layer.set_gain(0.0);
            layer.output_mut().play(true);
        }

        info!(layers = layers.len(), "all layers playing in sync");
        Ok(Self { layers })
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Whether `id` names a layer on this bus
    pub fn contains(&self, id: usize) -> bool {
        id >= 1 && id <= self.layers.len()
    }

    /// Look up a layer by 1-based id
    pub fn layer(&self, id: usize) -> Option<&Layer> {
        id.checked_sub(1).and_then(|i| self.layers.get(i))
    }

    pub(crate) fn layer_mut(&mut self, id: usize) -> Option<&mut Layer> {
        let index = id.checked_sub(1)?;
        self.layers.get_mut(index)
    }

    /// All layers in id order
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    /// Current gain of every layer, in id order
    pub fn gains(&self) -> Vec<f32> {
        self.layers.iter().map(Layer::gain).collect()
    }

    /// Advance every output's playback clock by the same `dt`
    pub fn advance_playback(&mut self, dt: f64) {
        for layer in &mut self.layers {
            layer.output_mut().advance(dt);
        }
    }

    /// Stop every output
    pub fn shutdown(&mut self) {
        for layer in &mut self.layers {
            layer.output_mut().stop();
        }
        info!(layers = self.layers.len(), "layers stopped");
    }
}
