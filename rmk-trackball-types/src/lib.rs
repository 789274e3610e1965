//! # RMK Trackball Types
//!
//! Plain value types shared between the trackball interface and the board crates
//! that drive it.
//!
//! - [`led_indicator`] - HID LED indicator bits, the trigger of the automouse layer
//! - [`input_mode`] - Logical input mode of the pointing device

#![cfg_attr(not(test), no_std)]

pub mod input_mode;
pub mod led_indicator;
