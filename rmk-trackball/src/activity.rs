//! Device activity, as reported by the power subsystem

use core::sync::atomic::{AtomicBool, Ordering};

use crate::event::{EventSubscriber, SleepStateEvent, SubscribableEvent, mpsc_event, publish_event};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActivityState {
    Active,
    /// Idle or sleeping, input isn't processed until the device wakes up
    Idle,
}

/// Query and rouse the device's activity state
pub trait DeviceActivity {
    fn state(&self) -> ActivityState;

    /// Inject a minimal synthetic input which wakes an idle device
    fn wake(&mut self);
}

/// Synthetic input which wakes the device up, carrying a one-count relative motion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WakeRequestEvent {
    pub delta: i8,
}

mpsc_event!(WakeRequestEvent, WAKE_REQUEST_EVENT_CHANNEL, cap = 2);

static DEVICE_SLEEPING: AtomicBool = AtomicBool::new(false);

/// Activity state tracked from [`SleepStateEvent`]s.
///
/// [`run_sleep_state_tracker`] must be running for the state to follow the power subsystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct SleepStateActivity;

impl DeviceActivity for SleepStateActivity {
    fn state(&self) -> ActivityState {
        if DEVICE_SLEEPING.load(Ordering::Acquire) {
            ActivityState::Idle
        } else {
            ActivityState::Active
        }
    }

    fn wake(&mut self) {
        publish_event(WakeRequestEvent { delta: 1 });
    }
}

/// Keep [`SleepStateActivity`] in sync with the power subsystem
pub async fn run_sleep_state_tracker() {
    let mut sub = SleepStateEvent::subscriber();
    loop {
        let event = sub.next_event().await;
        debug!("Sleep state changed: {}", event.sleeping);
        DEVICE_SLEEPING.store(event.sleeping, Ordering::Release);
    }
}
