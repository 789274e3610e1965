//! Input mode switching.
//!
//! The input mode follows the active layers (see [`LayerConfig::resolve`]). Scroll and
//! precision are toggles on the sensor side, so every mode change is turned into the sequence
//! of toggles which leaves the old mode and enters the new one.

use core::cell::RefCell;

use rmk_trackball_types::input_mode::InputMode;

use crate::action::{ActionSink, ModeAction};
use crate::config::LayerConfig;
use crate::event::{EventSubscriber, LayerStateEvent, SubscribableEvent};
use crate::layer::LayerState;

/// Actions which switch the device from mode `from` to mode `to`, in order
pub const fn transition_actions(from: InputMode, to: InputMode) -> &'static [ModeAction] {
    use InputMode::*;
    use ModeAction::*;

    match (from, to) {
        (Move, Scroll) | (Scroll, Move) => &[ToggleScroll],
        (Move, Snipe) | (Snipe, Move) => &[CyclePrecision],
        // Leave scroll before entering snipe, and the other way round
        (Scroll, Snipe) => &[ToggleScroll, CyclePrecision],
        (Snipe, Scroll) => &[CyclePrecision, ToggleScroll],
        (Move, Move) | (Scroll, Scroll) | (Snipe, Snipe) => &[],
    }
}

/// Controller which keeps the pointing device mode in line with the active layers
pub struct ModeController<'a, L: LayerState, S: ActionSink> {
    layers: &'a RefCell<L>,
    config: LayerConfig,
    current: InputMode,
    sink: S,
}

impl<'a, L: LayerState, S: ActionSink> ModeController<'a, L, S> {
    pub fn new(config: LayerConfig, layers: &'a RefCell<L>, sink: S) -> Self {
        Self {
            layers,
            config,
            current: InputMode::Move,
            sink,
        }
    }

    pub fn current_mode(&self) -> InputMode {
        self.current
    }

    /// Re-resolve the input mode after a layer change and switch to it.
    ///
    /// Returns the mode after the switch.
    pub fn on_layer_state_changed(&mut self) -> InputMode {
        let mode = self.config.resolve(&*self.layers.borrow());
        self.switch_to(mode);
        self.current
    }

    /// Emit the actions leading from the current mode to `mode`, then make it current.
    ///
    /// The mode advances even if the behavior queue drops an action: the device and the
    /// controller are out of sync until the next change in that case.
    pub fn switch_to(&mut self, mode: InputMode) {
        if mode == self.current {
            return;
        }
        info!("Input mode changed: {} -> {}", self.current, mode);

        for &action in transition_actions(self.current, mode) {
            match self.sink.enqueue(action, true) {
                Ok(()) => info!("Queued {:?}", action),
                Err(e) => warn!("Dropped {:?}: {:?}", action, e),
            }
        }
        self.current = mode;
    }

    /// Run the controller, switching mode on every [`LayerStateEvent`]
    pub async fn run(&mut self) {
        let mut sub = LayerStateEvent::subscriber();
        loop {
            let event = sub.next_event().await;
            trace!("Layer {} active: {}", event.layer, event.active);
            self.on_layer_state_changed();
        }
    }
}
