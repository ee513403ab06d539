//! Fade Controller
//!
//! Owns at most one active [`Transition`] per layer and advances them on
//! every tick. Gain for a layer is only ever written by that layer's own
//! transition.

use tracing::debug;

use crate::fade::curve::CurveLaw;
use crate::fade::transition::{Direction, TickOrder, Transition};
use crate::layers::{Layer, LayerBus, TransitionState};

/// Sanitize an externally supplied time step
#[inline]
fn step_secs(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        0.0
    }
}

/// Drives all active transitions
#[derive(Debug, Clone)]
pub struct FadeController {
    law: CurveLaw,
    order: TickOrder,
    /// Slot `i` belongs to layer `i + 1`
    transitions: Vec<Option<Transition>>,
}

impl FadeController {
    /// Create a controller for `layer_count` layers
    pub fn new(layer_count: usize, law: CurveLaw) -> Self {
        Self {
            law,
            order: TickOrder::default(),
            transitions: vec![None; layer_count],
        }
    }

    /// Builder-style setter for where each tick samples progress
    pub fn with_tick_order(mut self, order: TickOrder) -> Self {
        self.order = order;
        self
    }

    pub fn law(&self) -> CurveLaw {
        self.law
    }

    pub fn tick_order(&self) -> TickOrder {
        self.order
    }

    // ========================================================================
    // Starting Transitions
    // ========================================================================

    /// Start fading `layer` toward 1.0
    ///
    /// Returns `false` without changing anything if the layer already has
    /// an active transition.
    pub fn begin_fade_in(&mut self, layer: &mut Layer, duration: f32) -> bool {
        self.begin(layer, Direction::In, duration)
    }

    /// Start fading `layer` toward 0.0
    ///
    /// Returns `false` without changing anything if the layer already has
    /// an active transition.
    pub fn begin_fade_out(&mut self, layer: &mut Layer, duration: f32) -> bool {
        self.begin(layer, Direction::Out, duration)
    }

    fn slot_mut(&mut self, id: usize) -> Option<&mut Option<Transition>> {
        let index = id.checked_sub(1)?;
        self.transitions.get_mut(index)
    }

    fn begin(&mut self, layer: &mut Layer, direction: Direction, duration: f32) -> bool {
        let id = layer.id();
        let Some(slot) = self.slot_mut(id) else {
            debug!(layer = id, "no transition slot for layer");
            return false;
        };

        if slot.is_some() {
            debug!(layer = id, %direction, "transition already running, ignored");
            return false;
        }

        *slot = Some(Transition::new(id, direction, duration, layer.gain()));
        layer.set_state(direction.into());
        debug!(layer = id, %direction, duration, start_gain = layer.gain(), "transition started");
        true
    }

    // ========================================================================
    // Advancing Transitions
    // ========================================================================

    /// Advance the transition on `layer` by `dt` seconds
    ///
    /// Writes the new gain to the layer, which forwards it to its output.
    /// When the transition has run its duration the layer returns to Idle.
    ///
    /// # Returns
    /// `true` if a transition completed on this tick
    pub fn tick(&mut self, layer: &mut Layer, dt: f32) -> bool {
        let id = layer.id();
        let (law, order) = (self.law, self.order);
        let Some(slot) = self.slot_mut(id) else {
            return false;
        };
        let Some(transition) = slot.as_mut() else {
            return false;
        };

        let gain = transition.step(layer.gain(), step_secs(dt), law, order);
        layer.set_gain(gain);

        if !transition.is_complete() {
            return false;
        }

        debug!(
            layer = id,
            direction = %transition.direction(),
            gain = layer.gain(),
            "transition complete"
        );
        *slot = None;
        layer.set_state(TransitionState::Idle);
        true
    }

    /// Advance every active transition with the same `dt`
    ///
    /// # Returns
    /// Number of transitions that completed on this tick
    pub fn tick_all(&mut self, bus: &mut LayerBus, dt: f32) -> usize {
        let dt = step_secs(dt);
        let mut completed = 0;
        for layer in bus.layers_mut() {
            if self.tick(layer, dt) {
                completed += 1;
            }
        }
        completed
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Whether layer `id` has an active transition
    pub fn is_active(&self, id: usize) -> bool {
        self.transition(id).is_some()
    }

    /// Whether any layer has an active transition
    pub fn any_active(&self) -> bool {
        self.transitions.iter().any(Option::is_some)
    }

    /// Number of active transitions
    pub fn active_count(&self) -> usize {
        self.transitions.iter().filter(|t| t.is_some()).count()
    }

    /// The active transition on layer `id`, if any
    pub fn transition(&self, id: usize) -> Option<&Transition> {
        id.checked_sub(1)
            .and_then(|i| self.transitions.get(i))
            .and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FaderConfig;
    use crate::engine::VirtualResolver;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn bus() -> LayerBus {
        LayerBus::initialize(&FaderConfig::default(), &mut VirtualResolver::any(8.0)).unwrap()
    }

    #[test]
    fn test_begin_fade_in_sets_state() {
        let mut bus = bus();
        let mut controller = FadeController::new(bus.len(), CurveLaw::Reseeded);

        let layer = bus.layer_mut(1).unwrap();
        assert!(controller.begin_fade_in(layer, 2.0));
        assert_eq!(layer.state(), TransitionState::FadingIn);
        assert!(controller.is_active(1));
        assert!(!controller.is_active(2));
        assert_eq!(controller.active_count(), 1);

        let transition = controller.transition(1).unwrap();
        assert_eq!(transition.direction(), Direction::In);
        assert_eq!(transition.target_gain(), 1.0);
        assert_eq!(transition.elapsed(), 0.0);
    }

    #[test]
    fn test_second_begin_on_same_layer_rejected() {
        let mut bus = bus();
        let mut controller = FadeController::new(bus.len(), CurveLaw::Reseeded);

        let layer = bus.layer_mut(1).unwrap();
        assert!(controller.begin_fade_in(layer, 2.0));
        assert!(!controller.begin_fade_out(layer, 2.0));
        assert!(!controller.begin_fade_in(layer, 2.0));
        assert_eq!(layer.state(), TransitionState::FadingIn);
        assert_eq!(controller.transition(1).unwrap().direction(), Direction::In);
    }

    #[test]
    fn test_reseeded_fade_in_sequence() {
        let mut bus = bus();
        let mut controller = FadeController::new(bus.len(), CurveLaw::Reseeded);
        assert_eq!(controller.tick_order(), TickOrder::SampleThenAdvance);
        controller.begin_fade_in(bus.layer_mut(1).unwrap(), 2.0);

        for want in [0.0, 0.25, 0.625] {
            assert_eq!(controller.tick_all(&mut bus, 0.5), 0);
            assert_relative_eq!(bus.layer(1).unwrap().gain(), want);
        }

        // Completes with the sample taken at progress 0.75
        assert_eq!(controller.tick_all(&mut bus, 0.5), 1);
        let layer = bus.layer(1).unwrap();
        assert_relative_eq!(layer.gain(), 0.90625);
        assert!(layer.is_idle());
        assert!(!controller.any_active());
    }

    #[test]
    fn test_advance_first_fade_in_lands_on_full_gain() {
        let mut bus = bus();
        let mut controller = FadeController::new(bus.len(), CurveLaw::Reseeded)
            .with_tick_order(TickOrder::AdvanceThenSample);
        controller.begin_fade_in(bus.layer_mut(1).unwrap(), 2.0);

        for want in [0.25, 0.625, 0.90625] {
            assert_eq!(controller.tick_all(&mut bus, 0.5), 0);
            assert_relative_eq!(bus.layer(1).unwrap().gain(), want);
        }

        assert_eq!(controller.tick_all(&mut bus, 0.5), 1);
        assert_relative_eq!(bus.layer(1).unwrap().gain(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_linear_fade_out_sequence() {
        let mut bus = bus();
        let mut controller = FadeController::new(bus.len(), CurveLaw::Linear);
        bus.layer_mut(2).unwrap().set_gain(1.0);
        controller.begin_fade_out(bus.layer_mut(2).unwrap(), 2.0);

        for want in [1.0, 0.75, 0.5] {
            controller.tick_all(&mut bus, 0.5);
            assert_relative_eq!(bus.layer(2).unwrap().gain(), want);
        }
        controller.tick_all(&mut bus, 0.5);
        assert_eq!(bus.layer(2).unwrap().gain(), 0.0);
    }

    #[test]
    fn test_fade_out_ends_exactly_zero() {
        let mut bus = bus();
        let mut controller = FadeController::new(bus.len(), CurveLaw::Reseeded);
        bus.layer_mut(1).unwrap().set_gain(0.8);
        controller.begin_fade_out(bus.layer_mut(1).unwrap(), 1.0);

        // Irregular frame times that do not divide the duration evenly
        for dt in [0.016, 0.033, 0.4, 0.017, 0.3, 0.25] {
            controller.tick_all(&mut bus, dt);
        }

        let layer = bus.layer(1).unwrap();
        assert!(layer.is_idle());
        assert_eq!(layer.gain(), 0.0);
    }

    #[test]
    fn test_only_fading_layer_written() {
        let mut bus = bus();
        let mut controller = FadeController::new(bus.len(), CurveLaw::Reseeded);
        controller.begin_fade_in(bus.layer_mut(3).unwrap(), 1.0);

        controller.tick_all(&mut bus, 0.1);
        controller.tick_all(&mut bus, 0.1);
        let layer = bus.layer(3).unwrap();
        assert_relative_eq!(layer.gain(), 0.1);

        // Idle layers are not written
        let untouched = bus.layer(1).unwrap();
        assert_eq!(untouched.gain(), 0.0);
    }

    #[test]
    fn test_tick_without_transition_is_noop() {
        let mut bus = bus();
        let mut controller = FadeController::new(bus.len(), CurveLaw::Reseeded);
        assert!(!controller.tick(bus.layer_mut(1).unwrap(), 0.5));
        assert_eq!(bus.layer(1).unwrap().gain(), 0.0);
    }

    #[test]
    fn test_invalid_dt_does_not_advance() {
        let mut bus = bus();
        let mut controller = FadeController::new(bus.len(), CurveLaw::Reseeded);
        controller.begin_fade_in(bus.layer_mut(1).unwrap(), 1.0);

        controller.tick_all(&mut bus, -1.0);
        controller.tick_all(&mut bus, f32::NAN);
        controller.tick_all(&mut bus, f32::INFINITY);

        assert_eq!(controller.transition(1).unwrap().elapsed(), 0.0);
        assert_eq!(bus.layer(1).unwrap().gain(), 0.0);
    }

    #[test]
    fn test_out_of_range_layer_has_no_slot() {
        let mut bus = bus();
        let mut controller = FadeController::new(2, CurveLaw::Reseeded);
        assert!(!controller.begin_fade_in(bus.layer_mut(3).unwrap(), 1.0));
        assert!(!controller.any_active());
    }

    fn any_law() -> impl Strategy<Value = CurveLaw> {
        prop_oneof![Just(CurveLaw::Reseeded), Just(CurveLaw::Linear)]
    }

    fn any_order() -> impl Strategy<Value = TickOrder> {
        prop_oneof![
            Just(TickOrder::SampleThenAdvance),
            Just(TickOrder::AdvanceThenSample)
        ]
    }

    proptest! {
        /// Property: gain never moves against the fade direction
        ///
        /// A fade-in only rises and a fade-out only falls, for any frame
        /// time, duration, curve law and tick order. A finished fade-out
        /// is exactly silent.
        #[test]
        fn gain_is_monotonic_during_fades(
            law in any_law(),
            order in any_order(),
            duration in 0.1f32..3.0,
            dt in 0.005f32..0.5,
        ) {
            let mut bus = bus();
            let mut controller = FadeController::new(bus.len(), law).with_tick_order(order);
            controller.begin_fade_in(bus.layer_mut(1).unwrap(), duration);

            let mut last = 0.0;
            while controller.is_active(1) {
                controller.tick_all(&mut bus, dt);
                let gain = bus.layer(1).unwrap().gain();
                prop_assert!(gain >= last, "fade-in fell from {} to {}", last, gain);
                prop_assert!((0.0..=1.0).contains(&gain));
                last = gain;
            }

            controller.begin_fade_out(bus.layer_mut(1).unwrap(), duration);
            while controller.is_active(1) {
                controller.tick_all(&mut bus, dt);
                let gain = bus.layer(1).unwrap().gain();
                prop_assert!(gain <= last, "fade-out rose from {} to {}", last, gain);
                prop_assert!((0.0..=1.0).contains(&gain));
                last = gain;
            }
            prop_assert_eq!(last, 0.0);
        }
    }
}
