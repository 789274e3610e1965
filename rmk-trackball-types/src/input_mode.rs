use serde::{Deserialize, Serialize};

/// Logical input mode of the pointing device.
///
/// Exactly one mode is current at any time. `Move` is the power-on mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputMode {
    /// Plain cursor movement
    #[default]
    Move,
    /// Motion is turned into scroll wheel events
    Scroll,
    /// Reduced sensitivity for precise aiming
    Snipe,
}

impl InputMode {
    pub const ALL: [InputMode; 3] = [InputMode::Move, InputMode::Scroll, InputMode::Snipe];
}

impl core::fmt::Display for InputMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InputMode::Move => f.write_str("move"),
            InputMode::Scroll => f.write_str("scroll"),
            InputMode::Snipe => f.write_str("snipe"),
        }
    }
}
