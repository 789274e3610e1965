//! Layer state as seen by the trackball interface.
//!
//! The trackball interface never owns the keymap: it queries layer state through [`LayerState`]
//! and switches the automouse layer with it. [`LayerStack`] is a standalone implementation for
//! boards which keep the layer state apart from the keymap, and for tests.

use crate::event::{LayerStateEvent, publish_event};

/// Read and switch the active layers of the keymap
pub trait LayerState {
    /// Whether the layer is currently active
    fn is_layer_active(&self, layer_num: u8) -> bool;

    /// Activate given layer
    fn activate_layer(&mut self, layer_num: u8);

    /// Deactivate given layer
    fn deactivate_layer(&mut self, layer_num: u8);
}

/// The active/inactive state of every layer.
///
/// Any change of state is published as a [`LayerStateEvent`].
pub struct LayerStack<const NUM_LAYER: usize> {
    layer_state: [bool; NUM_LAYER],
}

impl<const NUM_LAYER: usize> Default for LayerStack<NUM_LAYER> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const NUM_LAYER: usize> LayerStack<NUM_LAYER> {
    pub const fn new() -> Self {
        Self {
            layer_state: [false; NUM_LAYER],
        }
    }

    pub const fn layer_count(&self) -> usize {
        NUM_LAYER
    }

    fn set_layer(&mut self, layer_num: u8, active: bool) {
        if layer_num as usize >= NUM_LAYER {
            warn!(
                "Not a valid layer {}, keyboard supports only {} layers",
                layer_num, NUM_LAYER
            );
            return;
        }
        if self.layer_state[layer_num as usize] != active {
            self.layer_state[layer_num as usize] = active;
            publish_event(LayerStateEvent {
                layer: layer_num,
                active,
            });
        }
    }
}

impl<const NUM_LAYER: usize> LayerState for LayerStack<NUM_LAYER> {
    fn is_layer_active(&self, layer_num: u8) -> bool {
        self.layer_state.get(layer_num as usize).copied().unwrap_or(false)
    }

    fn activate_layer(&mut self, layer_num: u8) {
        self.set_layer(layer_num, true);
    }

    fn deactivate_layer(&mut self, layer_num: u8) {
        self.set_layer(layer_num, false);
    }
}
