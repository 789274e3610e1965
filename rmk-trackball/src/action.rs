//! Actions emitted on input mode changes, and the queue they are handed to.

use serde::{Deserialize, Serialize};

use crate::event::{PublishableEvent, mpsc_event};

/// A behavior invocation which switches the pointing device between modes.
///
/// Both behaviors are toggles on the sensor side, so leaving a mode means invoking the same
/// behavior again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeAction {
    /// Toggle between moving and scrolling
    ToggleScroll,
    /// Step to the next precision (CPI) setting
    CyclePrecision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnqueueError {
    /// The behavior queue has no room left, the action is dropped
    QueueFull,
}

impl core::fmt::Display for EnqueueError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EnqueueError::QueueFull => f.write_str("behavior queue is full"),
        }
    }
}

/// The behavior queue which executes mode actions.
///
/// Enqueueing is fire-and-forget: the caller doesn't wait for the action to run.
pub trait ActionSink {
    fn enqueue(&mut self, action: ModeAction, immediate: bool) -> Result<(), EnqueueError>;
}

impl<S: ActionSink + ?Sized> ActionSink for &mut S {
    fn enqueue(&mut self, action: ModeAction, immediate: bool) -> Result<(), EnqueueError> {
        (**self).enqueue(action, immediate)
    }
}

/// An action waiting in the behavior queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeActionEvent {
    pub action: ModeAction,
    /// Run before any queued key behavior
    pub immediate: bool,
}

mpsc_event!(ModeActionEvent, MODE_ACTION_EVENT_CHANNEL, cap = 4);

/// Queue actions on the [`ModeActionEvent`] channel, which the pointing device processor consumes
#[derive(Debug, Default, Clone, Copy)]
pub struct BehaviorQueueSink;

impl ActionSink for BehaviorQueueSink {
    fn enqueue(&mut self, action: ModeAction, immediate: bool) -> Result<(), EnqueueError> {
        ModeActionEvent::publisher()
            .try_send(ModeActionEvent { action, immediate })
            .map_err(|_| EnqueueError::QueueFull)
    }
}
