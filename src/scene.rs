//! Layered music scene
//!
//! The top-level object an embedding drives: start it once, feed it
//! triggers, and call [`LayeredMusic::tick`] once per frame.

use serde::Serialize;
use tracing::info;

use crate::config::FaderConfig;
use crate::dispatch::{TransitionDispatcher, TriggerOutcome};
use crate::engine::OutputResolver;
use crate::error::Result;
use crate::fade::FadeController;
use crate::layers::{LayerBus, TransitionState};

/// Point-in-time view of one layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSnapshot {
    pub id: usize,
    pub name: String,
    pub gain: f32,
    pub state: TransitionState,
    /// Playback position in seconds, when the output reports one
    pub position_secs: Option<f64>,
}

/// Point-in-time view of the whole scene
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSnapshot {
    /// Seconds of ticks since start
    pub time_secs: f64,
    pub layers: Vec<LayerSnapshot>,
}

/// A running layered music scene
#[derive(Debug)]
pub struct LayeredMusic {
    config: FaderConfig,
    bus: LayerBus,
    controller: FadeController,
    dispatcher: TransitionDispatcher,
    time_secs: f64,
}

impl LayeredMusic {
    /// Validate the configuration, resolve every layer and start playback
    ///
    /// # Errors
    /// Any error returned here is fatal: the scene must not run with a
    /// partial set of layers.
    pub fn start(config: FaderConfig, resolver: &mut dyn OutputResolver) -> Result<Self> {
        config.validate()?;

        let bus = LayerBus::initialize(&config, resolver)?;
        let controller =
            FadeController::new(bus.len(), config.curve).with_tick_order(config.tick_order);
        let dispatcher = TransitionDispatcher::from_config(&config);

        info!(
            layers = bus.len(),
            fade_in_secs = config.fade_in_secs,
            fade_out_secs = config.fade_out_secs,
            guard = ?config.guard_scope,
            curve = ?config.curve,
            tick_order = ?config.tick_order,
            "layered music started"
        );

        Ok(Self {
            config,
            bus,
            controller,
            dispatcher,
            time_secs: 0.0,
        })
    }

    /// Toggle layer `id` (1-based)
    pub fn trigger(&mut self, id: usize) -> TriggerOutcome {
        self.dispatcher
            .on_trigger(id, &mut self.bus, &mut self.controller)
    }

    /// Toggle the layer bound to `key`; `None` if the key is unbound
    pub fn press_key(&mut self, key: &str) -> Option<TriggerOutcome> {
        self.dispatcher
            .on_key(key, &mut self.bus, &mut self.controller)
    }

    /// Advance the scene by one frame of `dt` seconds
    ///
    /// Every active transition sees the same `dt`, and every layer's
    /// playback clock is advanced by it.
    ///
    /// # Returns
    /// Number of transitions that completed on this tick
    pub fn tick(&mut self, dt: f32) -> usize {
        let completed = self.controller.tick_all(&mut self.bus, dt);
        if dt.is_finite() && dt > 0.0 {
            self.bus.advance_playback(dt as f64);
            self.time_secs += dt as f64;
        }
        completed
    }

    /// Gain of layer `id`
    pub fn gain(&self, id: usize) -> Option<f32> {
        self.bus.layer(id).map(|l| l.gain())
    }

    /// Transition state of layer `id`
    pub fn state(&self, id: usize) -> Option<TransitionState> {
        self.bus.layer(id).map(|l| l.state())
    }

    /// Whether any transition is running
    pub fn is_fading(&self) -> bool {
        self.controller.any_active()
    }

    pub fn time_secs(&self) -> f64 {
        self.time_secs
    }

    pub fn config(&self) -> &FaderConfig {
        &self.config
    }

    pub fn bus(&self) -> &LayerBus {
        &self.bus
    }

    pub fn controller(&self) -> &FadeController {
        &self.controller
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            time_secs: self.time_secs,
            layers: self
                .bus
                .layers()
                .iter()
                .map(|layer| LayerSnapshot {
                    id: layer.id(),
                    name: layer.name().to_string(),
                    gain: layer.gain(),
                    state: layer.state(),
                    position_secs: layer.output().playback_position(),
                })
                .collect(),
        }
    }

    /// Stop every layer
    pub fn shutdown(mut self) {
        self.bus.shutdown();
        info!(time_secs = self.time_secs, "layered music stopped");
    }
}
