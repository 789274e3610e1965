//! Indicator normalization.
//!
//! The host's indicator state reaches the firmware twice: as the LED output report on the
//! keyboard interface, published as [`LedIndicatorEvent`], and as the vendor feature report
//! (see `feature_report`). Both are reduced here to one [`IndicatorChanged`] message, the only
//! input of the automouse controller. Only the latest message is kept: when the host flaps the
//! indicator faster than the controller runs, the controller still ends up on the final state.

use rmk_trackball_types::led_indicator::LedIndicator;

use crate::event::{EventSubscriber, LedIndicatorEvent, SubscribableEvent, publish_event, watch_event};

/// Whether any of the automouse trigger bits is set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IndicatorChanged(pub bool);

watch_event!(IndicatorChanged, INDICATOR_CHANGED_EVENT_CHANNEL, receivers = 2);

impl IndicatorChanged {
    pub fn from_indicators(indicators: LedIndicator, mask: LedIndicator) -> Self {
        Self(indicators.intersects(mask))
    }

    pub fn is_set(&self) -> bool {
        self.0
    }
}

/// Forward [`LedIndicatorEvent`]s to the automouse controller
pub async fn run_indicator_bridge(mask: LedIndicator) {
    let mut sub = LedIndicatorEvent::subscriber();
    loop {
        let event = sub.next_event().await;
        let changed = IndicatorChanged::from_indicators(event.indicator, mask);
        debug!("LED indicator {:?} -> {:?}", event.indicator, changed);
        publish_event(changed);
    }
}
