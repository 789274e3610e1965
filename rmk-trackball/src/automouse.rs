//! Automouse: activate a pointer layer while a host indicator is on.
//!
//! The host turns an indicator bit (ScrollLock by default) on while it wants the pointer layer.
//! When the bit goes off the layer stays active for [`AutomouseConfig::timeout`], and turning
//! the bit back on within that window keeps it active. If the device is idle when the bit goes
//! on, it is woken first and the layer is activated [`AutomouseConfig::wake_delay`] later, once
//! the wake-up has been processed. If the bit went off in the meantime, the deactivation timeout
//! starts as soon as the layer is activated.

use core::cell::RefCell;

use embassy_futures::select::{Either3, select3};
use embassy_time::Instant;

use crate::activity::{ActivityState, DeviceActivity};
use crate::config::AutomouseConfig;
use crate::delayed_work::DelayedWork;
use crate::event::{EventSubscriber, SubscribableEvent};
use crate::indicator::IndicatorChanged;
use crate::layer::LayerState;

/// State of the automouse layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AutomouseState {
    Inactive,
    /// The device is waking up, the layer will be activated afterwards
    Activating,
    Active,
    /// The indicator went off, the layer will be deactivated on timeout
    Deactivating,
}

pub struct AutomouseController<'a, L: LayerState, A: DeviceActivity> {
    config: AutomouseConfig,
    layers: &'a RefCell<L>,
    activity: A,
    /// The layer has been activated by this controller
    enabled: bool,
    /// Latest indicator state, checked when a delayed activation fires
    indicator_on: bool,
    activate_work: DelayedWork,
    deactivate_work: DelayedWork,
}

impl<'a, L: LayerState, A: DeviceActivity> AutomouseController<'a, L, A> {
    pub fn new(config: AutomouseConfig, layers: &'a RefCell<L>, activity: A) -> Self {
        Self {
            config,
            layers,
            activity,
            enabled: false,
            indicator_on: false,
            activate_work: DelayedWork::new(),
            deactivate_work: DelayedWork::new(),
        }
    }

    pub fn state(&self) -> AutomouseState {
        if self.activate_work.is_pending() {
            AutomouseState::Activating
        } else if self.deactivate_work.is_pending() {
            AutomouseState::Deactivating
        } else if self.enabled {
            AutomouseState::Active
        } else {
            AutomouseState::Inactive
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Pending activation after an idle wake-up
    pub fn activate_work(&self) -> &DelayedWork {
        &self.activate_work
    }

    /// Pending deactivation after the indicator went off
    pub fn deactivate_work(&self) -> &DelayedWork {
        &self.deactivate_work
    }

    fn layer_active(&self) -> bool {
        self.layers.borrow().is_layer_active(self.config.layer)
    }

    /// Handle an indicator change received at `now`
    pub fn on_indicator_changed(&mut self, event: IndicatorChanged, now: Instant) {
        self.indicator_on = event.is_set();
        if event.is_set() {
            if !self.enabled && !self.layer_active() {
                self.activate(now);
            } else if self.deactivate_work.cancel() {
                info!("Automouse deactivation cancelled");
            }
        } else if self.enabled {
            self.deactivate_work.reschedule(now, self.config.timeout);
            debug!("Automouse deactivation scheduled in {}ms", self.config.timeout.as_millis());
        } else if self.activate_work.is_pending() {
            debug!("Indicator off while waking, deactivation follows the activation");
        }
    }

    fn activate(&mut self, now: Instant) {
        if self.activate_work.is_pending() {
            debug!("Automouse activation already pending");
            return;
        }
        self.deactivate_work.cancel();

        match self.activity.state() {
            ActivityState::Active => {
                self.layers.borrow_mut().activate_layer(self.config.layer);
                self.enabled = true;
                info!("Automouse layer {} activated", self.config.layer);
            }
            ActivityState::Idle => {
                // The device drops input while idle, so wake it up and activate once it's awake
                self.activity.wake();
                self.activate_work.schedule(now, self.config.wake_delay);
                info!("Waking from idle, delaying automouse activation");
            }
        }
    }

    fn on_activate_timeout(&mut self, now: Instant) {
        self.layers.borrow_mut().activate_layer(self.config.layer);
        self.enabled = true;
        info!("Automouse layer {} activated (after idle wake)", self.config.layer);

        // The indicator went off during the wake-up, its deactivation starts now
        if !self.indicator_on {
            self.deactivate_work.reschedule(now, self.config.timeout);
            debug!("Automouse deactivation scheduled in {}ms", self.config.timeout.as_millis());
        }
    }

    fn on_deactivate_timeout(&mut self) {
        if self.layer_active() {
            self.layers.borrow_mut().deactivate_layer(self.config.layer);
            info!("Automouse layer {} deactivated", self.config.layer);
        }
        self.enabled = false;
    }

    /// Run the work whose deadline has passed at `now`
    pub fn poll_timers(&mut self, now: Instant) {
        if self.activate_work.take_expired(now) {
            self.on_activate_timeout(now);
        }
        if self.deactivate_work.take_expired(now) {
            self.on_deactivate_timeout();
        }
    }

    /// Run the controller on [`IndicatorChanged`] messages and its own timers
    pub async fn run(&mut self) {
        let mut sub = IndicatorChanged::subscriber();
        loop {
            let next = select3(sub.next_event(), self.activate_work.wait(), self.deactivate_work.wait()).await;
            match next {
                Either3::First(event) => self.on_indicator_changed(event, Instant::now()),
                Either3::Second(_) | Either3::Third(_) => self.poll_timers(Instant::now()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use embassy_time::Duration;

    use super::*;
    use crate::layer::LayerStack;

    const LAYER: u8 = 9;

    struct FakeActivity {
        state: ActivityState,
        wakes: usize,
    }

    impl DeviceActivity for &mut FakeActivity {
        fn state(&self) -> ActivityState {
            self.state
        }

        fn wake(&mut self) {
            self.wakes += 1;
            self.state = ActivityState::Active;
        }
    }

    fn ms(t: u64) -> Instant {
        Instant::from_millis(t)
    }

    fn config() -> AutomouseConfig {
        AutomouseConfig::new(LAYER, Duration::from_millis(1000))
    }

    #[test]
    fn test_activate_when_active() {
        let layers = RefCell::new(LayerStack::<16>::new());
        let mut activity = FakeActivity {
            state: ActivityState::Active,
            wakes: 0,
        };
        let mut controller = AutomouseController::new(config(), &layers, &mut activity);

        controller.on_indicator_changed(IndicatorChanged(true), ms(0));
        assert!(controller.is_enabled());
        assert_eq!(controller.state(), AutomouseState::Active);
        assert!(layers.borrow().is_layer_active(LAYER));
        drop(controller);
        assert_eq!(activity.wakes, 0);
    }

    #[test]
    fn test_reassert_cancels_pending_deactivation() {
        let layers = RefCell::new(LayerStack::<16>::new());
        let mut activity = FakeActivity {
            state: ActivityState::Active,
            wakes: 0,
        };
        let mut controller = AutomouseController::new(config(), &layers, &mut activity);

        controller.on_indicator_changed(IndicatorChanged(true), ms(0));
        controller.on_indicator_changed(IndicatorChanged(false), ms(0));
        assert_eq!(controller.deactivate_work().deadline(), Some(ms(1000)));
        assert_eq!(controller.state(), AutomouseState::Deactivating);

        controller.on_indicator_changed(IndicatorChanged(true), ms(500));
        assert!(!controller.deactivate_work().is_pending());
        assert_eq!(controller.state(), AutomouseState::Active);

        controller.poll_timers(ms(1500));
        assert!(layers.borrow().is_layer_active(LAYER));
        assert!(controller.is_enabled());
    }

    #[test]
    fn test_duplicate_set_is_idempotent() {
        let layers = RefCell::new(LayerStack::<16>::new());
        let mut activity = FakeActivity {
            state: ActivityState::Idle,
            wakes: 0,
        };
        let mut controller = AutomouseController::new(config(), &layers, &mut activity);

        controller.on_indicator_changed(IndicatorChanged(true), ms(0));
        controller.on_indicator_changed(IndicatorChanged(true), ms(10));
        assert_eq!(controller.activate_work().deadline(), Some(ms(50)));
        controller.poll_timers(ms(50));
        assert!(controller.is_enabled());

        // Already enabled: no new activation and no new wake signal
        layers.borrow_mut().deactivate_layer(LAYER);
        controller.on_indicator_changed(IndicatorChanged(true), ms(100));
        assert!(!layers.borrow().is_layer_active(LAYER));
        drop(controller);
        assert_eq!(activity.wakes, 1);
    }

    #[test]
    fn test_idle_wake_delays_activation() {
        let layers = RefCell::new(LayerStack::<16>::new());
        let mut activity = FakeActivity {
            state: ActivityState::Idle,
            wakes: 0,
        };
        let mut controller = AutomouseController::new(config(), &layers, &mut activity);

        controller.on_indicator_changed(IndicatorChanged(true), ms(0));
        assert_eq!(controller.state(), AutomouseState::Activating);
        assert!(!layers.borrow().is_layer_active(LAYER));
        assert!(!controller.is_enabled());

        controller.poll_timers(ms(49));
        assert!(!layers.borrow().is_layer_active(LAYER));

        controller.poll_timers(ms(50));
        assert!(layers.borrow().is_layer_active(LAYER));
        assert_eq!(controller.state(), AutomouseState::Active);
        drop(controller);
        assert_eq!(activity.wakes, 1);
    }

    #[test]
    fn test_indicator_off_while_waking_deactivates_after_activation() {
        let layers = RefCell::new(LayerStack::<16>::new());
        let mut activity = FakeActivity {
            state: ActivityState::Idle,
            wakes: 0,
        };
        let mut controller = AutomouseController::new(config(), &layers, &mut activity);

        controller.on_indicator_changed(IndicatorChanged(true), ms(0));
        controller.on_indicator_changed(IndicatorChanged(false), ms(20));
        assert_eq!(controller.state(), AutomouseState::Activating);
        assert!(!controller.deactivate_work().is_pending());

        // The activation still happens once the device is awake
        controller.poll_timers(ms(60));
        assert!(layers.borrow().is_layer_active(LAYER));
        assert!(controller.is_enabled());
        assert_eq!(controller.state(), AutomouseState::Deactivating);
        assert_eq!(controller.deactivate_work().deadline(), Some(ms(1060)));

        controller.poll_timers(ms(1060));
        assert!(!layers.borrow().is_layer_active(LAYER));
        assert!(!controller.is_enabled());
        assert_eq!(controller.state(), AutomouseState::Inactive);
    }

    #[test]
    fn test_indicator_flap_while_waking_keeps_layer() {
        let layers = RefCell::new(LayerStack::<16>::new());
        let mut activity = FakeActivity {
            state: ActivityState::Idle,
            wakes: 0,
        };
        let mut controller = AutomouseController::new(config(), &layers, &mut activity);

        controller.on_indicator_changed(IndicatorChanged(true), ms(0));
        controller.on_indicator_changed(IndicatorChanged(false), ms(10));
        controller.on_indicator_changed(IndicatorChanged(true), ms(20));
        controller.poll_timers(ms(50));
        assert!(layers.borrow().is_layer_active(LAYER));
        assert_eq!(controller.state(), AutomouseState::Active);
        drop(controller);
        assert_eq!(activity.wakes, 1);
    }

    #[test]
    fn test_deactivation_coalesces_to_last_off() {
        let layers = RefCell::new(LayerStack::<16>::new());
        let mut activity = FakeActivity {
            state: ActivityState::Active,
            wakes: 0,
        };
        let mut controller = AutomouseController::new(config(), &layers, &mut activity);

        controller.on_indicator_changed(IndicatorChanged(true), ms(0));
        controller.on_indicator_changed(IndicatorChanged(false), ms(100));
        controller.on_indicator_changed(IndicatorChanged(false), ms(400));
        assert_eq!(controller.deactivate_work().deadline(), Some(ms(1400)));

        controller.poll_timers(ms(1100));
        assert!(layers.borrow().is_layer_active(LAYER));

        controller.poll_timers(ms(1400));
        assert!(!layers.borrow().is_layer_active(LAYER));
        assert!(!controller.is_enabled());
        assert_eq!(controller.state(), AutomouseState::Inactive);
    }

    #[test]
    fn test_layer_already_active_is_left_alone() {
        let layers = RefCell::new(LayerStack::<16>::new());
        layers.borrow_mut().activate_layer(LAYER);
        let mut activity = FakeActivity {
            state: ActivityState::Active,
            wakes: 0,
        };
        let mut controller = AutomouseController::new(config(), &layers, &mut activity);

        controller.on_indicator_changed(IndicatorChanged(true), ms(0));
        assert!(!controller.is_enabled());
        // Not enabled by automouse, so the indicator going off doesn't touch the layer
        controller.on_indicator_changed(IndicatorChanged(false), ms(10));
        assert!(!controller.deactivate_work().is_pending());
        controller.poll_timers(ms(5000));
        assert!(layers.borrow().is_layer_active(LAYER));
    }

    #[test]
    fn test_deactivation_clears_enabled_when_layer_already_gone() {
        let layers = RefCell::new(LayerStack::<16>::new());
        let mut activity = FakeActivity {
            state: ActivityState::Active,
            wakes: 0,
        };
        let mut controller = AutomouseController::new(config(), &layers, &mut activity);

        controller.on_indicator_changed(IndicatorChanged(true), ms(0));
        controller.on_indicator_changed(IndicatorChanged(false), ms(0));
        layers.borrow_mut().deactivate_layer(LAYER);
        controller.poll_timers(ms(1000));
        assert!(!controller.is_enabled());

        // A fresh indicator activates again
        controller.on_indicator_changed(IndicatorChanged(true), ms(1200));
        assert!(layers.borrow().is_layer_active(LAYER));
    }

    #[test]
    fn test_off_without_enabled_is_noop() {
        let layers = RefCell::new(LayerStack::<16>::new());
        let mut activity = FakeActivity {
            state: ActivityState::Active,
            wakes: 0,
        };
        let mut controller = AutomouseController::new(config(), &layers, &mut activity);
        controller.on_indicator_changed(IndicatorChanged(false), ms(0));
        controller.on_indicator_changed(IndicatorChanged(false), ms(10));
        assert_eq!(controller.state(), AutomouseState::Inactive);
        assert!(!controller.deactivate_work().is_pending());
    }
}
