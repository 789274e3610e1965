//! Keyboard state events, published by the keymap, the HID host and the power subsystem

use rmk_trackball_types::led_indicator::LedIndicator;

use super::pubsub_event;

/// A layer was activated or deactivated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerStateEvent {
    pub layer: u8,
    pub active: bool,
}

pubsub_event!(LayerStateEvent, LAYER_STATE_EVENT_CHANNEL, cap = 4, subs = 4, pubs = 1);

/// LED indicator state changed event, carrying the full indicator bitmask from the host
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedIndicatorEvent {
    pub indicator: LedIndicator,
}

pubsub_event!(LedIndicatorEvent, LED_INDICATOR_EVENT_CHANNEL, cap = 2, subs = 4, pubs = 1);

/// Sleep state changed event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SleepStateEvent {
    pub sleeping: bool,
}

pubsub_event!(SleepStateEvent, SLEEP_STATE_EVENT_CHANNEL, cap = 1, subs = 2, pubs = 1);
