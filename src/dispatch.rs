//! Transition Dispatcher
//!
//! Turns discrete trigger events into fade requests. The decision is a
//! toggle keyed on the layer's current gain: exactly 0.0 fades in,
//! anything else fades out. Triggers that hit the busy guard are dropped,
//! never queued.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{FaderConfig, GuardScope};
use crate::fade::FadeController;
use crate::layers::LayerBus;

/// What happened to a trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerOutcome {
    /// A fade-in was started
    FadeIn,
    /// A fade-out was started
    FadeOut,
    /// Dropped by the busy guard
    Busy,
    /// No layer with that id
    UnknownLayer,
}

impl TriggerOutcome {
    /// Whether the trigger started a transition
    pub fn started(self) -> bool {
        matches!(self, TriggerOutcome::FadeIn | TriggerOutcome::FadeOut)
    }
}

impl fmt::Display for TriggerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerOutcome::FadeIn => write!(f, "fade-in"),
            TriggerOutcome::FadeOut => write!(f, "fade-out"),
            TriggerOutcome::Busy => write!(f, "busy"),
            TriggerOutcome::UnknownLayer => write!(f, "unknown layer"),
        }
    }
}

// ============================================================================
// Key Bindings
// ============================================================================

/// Maps input keys to layer ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    keys: BTreeMap<String, usize>,
}

impl KeyBindings {
    /// Digit keys `"1"`..`"9"` bound to the layer with the same id
    pub fn digits(layer_count: usize) -> Self {
        let keys = (1..=layer_count.min(9))
            .map(|id| (id.to_string(), id))
            .collect();
        Self { keys }
    }

    pub fn from_map(keys: BTreeMap<String, usize>) -> Self {
        Self { keys }
    }

    /// Bindings from configuration, digits when none are given
    pub fn from_config(config: &FaderConfig) -> Self {
        match &config.key_bindings {
            Some(keys) => Self::from_map(keys.clone()),
            None => Self::digits(config.layer_count()),
        }
    }

    /// Layer bound to `key`
    pub fn layer_for(&self, key: &str) -> Option<usize> {
        self.keys.get(key).copied()
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Routes triggers to the fade controller under the busy guard
#[derive(Debug, Clone)]
pub struct TransitionDispatcher {
    scope: GuardScope,
    fade_in_secs: f32,
    fade_out_secs: f32,
    bindings: KeyBindings,
}

impl TransitionDispatcher {
    /// Dispatcher for `layer_count` layers with digit key bindings
    pub fn new(
        scope: GuardScope,
        layer_count: usize,
        fade_in_secs: f32,
        fade_out_secs: f32,
    ) -> Self {
        Self {
            scope,
            fade_in_secs,
            fade_out_secs,
            bindings: KeyBindings::digits(layer_count),
        }
    }

    pub fn from_config(config: &FaderConfig) -> Self {
        Self {
            scope: config.guard_scope,
            fade_in_secs: config.fade_in_secs,
            fade_out_secs: config.fade_out_secs,
            bindings: KeyBindings::from_config(config),
        }
    }

    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn scope(&self) -> GuardScope {
        self.scope
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Whether the guard currently blocks layer `id`
    pub fn is_blocked(&self, id: usize, controller: &FadeController) -> bool {
        match self.scope {
            GuardScope::Global => controller.any_active(),
            GuardScope::PerLayer => controller.is_active(id),
        }
    }

    /// Handle a trigger for layer `id` (1-based)
    pub fn on_trigger(
        &self,
        id: usize,
        bus: &mut LayerBus,
        controller: &mut FadeController,
    ) -> TriggerOutcome {
        if self.is_blocked(id, controller) && bus.contains(id) {
            debug!(layer = id, scope = ?self.scope, "trigger dropped, transition running");
            return TriggerOutcome::Busy;
        }

        let Some(layer) = bus.layer_mut(id) else {
            warn!(layer = id, layers = bus.len(), "trigger for unknown layer ignored");
            return TriggerOutcome::UnknownLayer;
        };

        // Exact comparison: a finished fade-out always snaps to 0.0
        let (started, outcome) = if layer.gain() == 0.0 {
            (
                controller.begin_fade_in(layer, self.fade_in_secs),
                TriggerOutcome::FadeIn,
            )
        } else {
            (
                controller.begin_fade_out(layer, self.fade_out_secs),
                TriggerOutcome::FadeOut,
            )
        };

        if started {
            outcome
        } else {
            TriggerOutcome::Busy
        }
    }

    /// Handle an input key through the bindings
    ///
    /// Returns `None` for unbound keys.
    pub fn on_key(
        &self,
        key: &str,
        bus: &mut LayerBus,
        controller: &mut FadeController,
    ) -> Option<TriggerOutcome> {
        let id = self.bindings.layer_for(key)?;
        Some(self.on_trigger(id, bus, controller))
    }
}
