//! Event system of the trackball interface
//!
//! This module provides:
//! - Publish/subscribe traits over embassy-sync channels
//! - `pubsub_event!`/`mpsc_event!`/`watch_event!`, which give an event type its own static channel
//! - Events shared with the rest of the firmware (layer state, LED indicators, sleep state)
//!
//! Each event type has its own dedicated channel and can be subscribed to independently.
//! Events used only inside this crate are declared next to their consumer:
//! [`crate::indicator::IndicatorChanged`], [`crate::action::ModeActionEvent`] and
//! [`crate::activity::WakeRequestEvent`].

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::pubsub::{ImmediatePublisher, Subscriber};
use embassy_sync::{channel, watch};

mod keyboard_state;

pub use keyboard_state::{LayerStateEvent, LedIndicatorEvent, SleepStateEvent};

/// Trait for event publishers
pub trait EventPublisher<T> {
    fn publish(&self, message: T);
}

/// Trait for event subscribers
pub trait EventSubscriber<T> {
    async fn next_event(&mut self) -> T;
}

/// An event which can be published without blocking
pub trait PublishableEvent: Clone + Send {
    type Publisher: EventPublisher<Self>;

    fn publisher() -> Self::Publisher;
}

/// An event which can be subscribed
pub trait SubscribableEvent: Clone + Send {
    type Subscriber: EventSubscriber<Self>;

    fn subscriber() -> Self::Subscriber;
}

/// Publish an event (non-blocking, may drop if buffer full)
///
/// Example: `publish_event(LayerStateEvent { layer: 3, active: true })`
pub fn publish_event<E: PublishableEvent>(e: E) {
    E::publisher().publish(e);
}

// Implementations for embassy-sync PubSubChannel
impl<'a, M: RawMutex, T: Clone, const CAP: usize, const SUBS: usize, const PUBS: usize> EventPublisher<T>
    for ImmediatePublisher<'a, M, T, CAP, SUBS, PUBS>
{
    fn publish(&self, message: T) {
        self.publish_immediate(message);
    }
}

impl<'a, M: RawMutex, T: Clone, const CAP: usize, const SUBS: usize, const PUBS: usize> EventSubscriber<T>
    for Subscriber<'a, M, T, CAP, SUBS, PUBS>
{
    async fn next_event(&mut self) -> T {
        self.next_message_pure().await
    }
}

// Implementation for embassy-sync Channel
impl<'a, M: RawMutex, T: Clone, const N: usize> EventPublisher<T> for channel::Sender<'a, M, T, N> {
    fn publish(&self, message: T) {
        if self.try_send(message).is_err() {
            error!("Send event to Channel error, channel is full");
        }
    }
}

impl<'a, M: RawMutex, T: Clone, const N: usize> EventSubscriber<T> for channel::Receiver<'a, M, T, N> {
    async fn next_event(&mut self) -> T {
        self.receive().await
    }
}

// Implementations for embassy-sync Watch
impl<'a, M: RawMutex, T: Clone, const N: usize> EventPublisher<T> for watch::Sender<'a, M, T, N> {
    fn publish(&self, message: T) {
        self.send(message);
    }
}

impl<'a, M: RawMutex, T: Clone, const N: usize> EventSubscriber<T> for watch::Receiver<'a, M, T, N> {
    // A new receiver returns the current value right away, so keep one receiver per consumer
    // instead of calling `subscriber()` in a loop.
    async fn next_event(&mut self) -> T {
        self.changed().await
    }
}

/// Give `$event` a static broadcast channel.
///
/// Every subscriber sees every message; a subscriber that falls behind by more than `cap`
/// messages skips the oldest ones.
macro_rules! pubsub_event {
    ($event:ty, $channel:ident, cap = $cap:expr, subs = $subs:expr, pubs = $pubs:expr) => {
        #[doc(hidden)]
        static $channel: ::embassy_sync::pubsub::PubSubChannel<$crate::RawMutex, $event, { $cap }, { $subs }, { $pubs }> =
            ::embassy_sync::pubsub::PubSubChannel::new();

        impl $crate::event::PublishableEvent for $event {
            type Publisher =
                ::embassy_sync::pubsub::ImmediatePublisher<'static, $crate::RawMutex, $event, { $cap }, { $subs }, { $pubs }>;

            fn publisher() -> Self::Publisher {
                $channel.immediate_publisher()
            }
        }

        impl $crate::event::SubscribableEvent for $event {
            type Subscriber =
                ::embassy_sync::pubsub::Subscriber<'static, $crate::RawMutex, $event, { $cap }, { $subs }, { $pubs }>;

            fn subscriber() -> Self::Subscriber {
                $channel.subscriber().expect(concat!(
                    "Failed to create subscriber for ",
                    stringify!($event),
                    ". The 'subs' limit has been exceeded."
                ))
            }
        }
    };
}

/// Give `$event` a static single-consumer channel.
macro_rules! mpsc_event {
    ($event:ty, $channel:ident, cap = $cap:expr) => {
        #[doc(hidden)]
        static $channel: ::embassy_sync::channel::Channel<$crate::RawMutex, $event, { $cap }> =
            ::embassy_sync::channel::Channel::new();

        impl $crate::event::PublishableEvent for $event {
            type Publisher = ::embassy_sync::channel::Sender<'static, $crate::RawMutex, $event, { $cap }>;

            fn publisher() -> Self::Publisher {
                $channel.sender()
            }
        }

        impl $crate::event::SubscribableEvent for $event {
            type Subscriber = ::embassy_sync::channel::Receiver<'static, $crate::RawMutex, $event, { $cap }>;

            fn subscriber() -> Self::Subscriber {
                $channel.receiver()
            }
        }
    };
}

/// Give `$event` a static channel which only keeps the latest value.
///
/// Publishing never fails and never blocks: a new value replaces one that hasn't been received
/// yet, so a slow receiver always ends up with the most recent state.
macro_rules! watch_event {
    ($event:ty, $channel:ident, receivers = $receivers:expr) => {
        #[doc(hidden)]
        static $channel: ::embassy_sync::watch::Watch<$crate::RawMutex, $event, { $receivers }> =
            ::embassy_sync::watch::Watch::new();

        impl $crate::event::PublishableEvent for $event {
            type Publisher = ::embassy_sync::watch::Sender<'static, $crate::RawMutex, $event, { $receivers }>;

            fn publisher() -> Self::Publisher {
                $channel.sender()
            }
        }

        impl $crate::event::SubscribableEvent for $event {
            type Subscriber = ::embassy_sync::watch::Receiver<'static, $crate::RawMutex, $event, { $receivers }>;

            fn subscriber() -> Self::Subscriber {
                $channel.receiver().expect(concat!(
                    "Failed to create receiver for ",
                    stringify!($event),
                    ". The 'receivers' limit has been exceeded."
                ))
            }
        }
    };
}

pub(crate) use {mpsc_event, pubsub_event, watch_event};
