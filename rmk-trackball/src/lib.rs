//! # RMK Trackball
//!
//! Input mode and automouse control for pointing devices running RMK.
//!
//! Two controllers run side by side on the same executor:
//!
//! - [`mode::ModeController`] follows the active layers and toggles the pointing device between
//!   move, scroll and snipe mode through the behavior queue.
//! - [`automouse::AutomouseController`] activates a pointer layer while a host indicator bit is
//!   on, waking an idle device first and keeping the layer for a timeout after the bit goes off.
//!
//! The keymap, the behavior queue and the power subsystem are reached through the
//! [`layer::LayerState`], [`action::ActionSink`] and [`activity::DeviceActivity`] traits.
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod action;
pub mod activity;
pub mod automouse;
pub mod config;
pub mod delayed_work;
pub mod event;
#[cfg(feature = "feature_channel")]
pub mod feature_report;
pub mod indicator;
pub mod layer;
pub mod mode;

use core::cell::RefCell;

pub use embassy_futures;
use embassy_futures::join::join3;
pub use rmk_trackball_types as types;

use crate::action::ActionSink;
use crate::activity::DeviceActivity;
use crate::automouse::AutomouseController;
use crate::config::TrackballConfig;
use crate::indicator::run_indicator_bridge;
use crate::layer::LayerState;
use crate::mode::ModeController;

pub type RawMutex = embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

/// Run the trackball interface.
///
/// `layers` is shared with the keymap; it's only borrowed inside synchronous handlers, so it must
/// not be held borrowed across an await point elsewhere.
///
/// The power subsystem isn't run here. When `activity` is [`activity::SleepStateActivity`],
/// [`activity::run_sleep_state_tracker`] must run alongside, otherwise the device always looks
/// active and is never woken before the automouse layer is activated:
///
/// ```ignore
/// join(
///     run_trackball_interface(&config, &layers, BehaviorQueueSink, SleepStateActivity),
///     run_sleep_state_tracker(),
/// )
/// .await;
/// ```
///
/// # Arguments
///
/// * `config` - layer lists, automouse layer and trigger indicator, see [`TrackballConfig::validate`]
/// * `layers` - the keymap's layer state
/// * `sink` - the behavior queue which executes mode actions
/// * `activity` - the device activity state
pub async fn run_trackball_interface<L: LayerState, S: ActionSink, A: DeviceActivity>(
    config: &TrackballConfig,
    layers: &RefCell<L>,
    sink: S,
    activity: A,
) {
    let mut mode_controller = ModeController::new(config.layers.clone(), layers, sink);
    let mut automouse_controller = AutomouseController::new(config.automouse, layers, activity);

    info!("Trackball interface started, automouse layer: {}", config.automouse.layer);
    join3(
        mode_controller.run(),
        automouse_controller.run(),
        run_indicator_bridge(config.indicator),
    )
    .await;
}
