use embassy_time::Duration;
use heapless::Vec;
use rmk_trackball_types::input_mode::InputMode;
use rmk_trackball_types::led_indicator::LedIndicator;

use crate::layer::LayerState;

/// Max number of layers in each of the scroll and snipe layer lists
pub const MAX_MODE_LAYERS: usize = 8;

/// Delay between waking an idle device and activating the automouse layer
pub const AUTOMOUSE_WAKE_DELAY: Duration = Duration::from_millis(50);

/// Default delay between the indicator going off and the automouse layer being deactivated
pub const AUTOMOUSE_DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Fatal configuration errors, reported once at initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A layer list holds more than [`MAX_MODE_LAYERS`] entries
    TooManyLayers,
    /// The layer appears twice, either in one list or in both
    DuplicateLayer(u8),
    /// The layer doesn't exist in the keymap
    LayerOutOfRange(u8),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::TooManyLayers => write!(f, "at most {} scroll or snipe layers are supported", MAX_MODE_LAYERS),
            ConfigError::DuplicateLayer(layer) => write!(f, "layer {} is listed more than once", layer),
            ConfigError::LayerOutOfRange(layer) => write!(f, "layer {} is not a valid layer", layer),
        }
    }
}

/// The config struct for the trackball interface.
#[derive(Clone, Debug)]
pub struct TrackballConfig {
    /// Layers which switch the input mode
    pub layers: LayerConfig,
    /// Automatic activation of the pointer layer
    pub automouse: AutomouseConfig,
    /// Indicator bits which request the automouse layer, ScrollLock by default
    pub indicator: LedIndicator,
}

impl Default for TrackballConfig {
    fn default() -> Self {
        Self {
            layers: LayerConfig::default(),
            automouse: AutomouseConfig::default(),
            indicator: LedIndicator::SCROLL_LOCK,
        }
    }
}

impl TrackballConfig {
    pub fn new(layers: LayerConfig, automouse: AutomouseConfig) -> Self {
        Self {
            layers,
            automouse,
            ..Default::default()
        }
    }

    pub fn with_indicator(mut self, indicator: LedIndicator) -> Self {
        self.indicator = indicator;
        self
    }

    /// Check that every configured layer exists in a keymap with `num_layers` layers
    pub fn validate(&self, num_layers: usize) -> Result<(), ConfigError> {
        let layers = self.layers.scroll_layers.iter().chain(self.layers.snipe_layers.iter());
        for &layer in layers.chain(core::iter::once(&self.automouse.layer)) {
            if layer as usize >= num_layers {
                return Err(ConfigError::LayerOutOfRange(layer));
            }
        }
        Ok(())
    }
}

/// Layers which switch the pointing device into scroll or snipe mode.
///
/// Scroll layers take precedence over snipe layers; when none of them is active the mode is `Move`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerConfig {
    pub(crate) scroll_layers: Vec<u8, MAX_MODE_LAYERS>,
    pub(crate) snipe_layers: Vec<u8, MAX_MODE_LAYERS>,
}

impl LayerConfig {
    pub fn new(scroll_layers: &[u8], snipe_layers: &[u8]) -> Result<Self, ConfigError> {
        let scroll_layers = Vec::from_slice(scroll_layers).map_err(|_| ConfigError::TooManyLayers)?;
        let snipe_layers = Vec::from_slice(snipe_layers).map_err(|_| ConfigError::TooManyLayers)?;

        let all: Vec<u8, { 2 * MAX_MODE_LAYERS }> = scroll_layers.iter().chain(snipe_layers.iter()).copied().collect();
        for (i, layer) in all.iter().enumerate() {
            if all[i + 1..].contains(layer) {
                return Err(ConfigError::DuplicateLayer(*layer));
            }
        }

        Ok(Self {
            scroll_layers,
            snipe_layers,
        })
    }

    pub fn scroll_layers(&self) -> &[u8] {
        &self.scroll_layers
    }

    pub fn snipe_layers(&self) -> &[u8] {
        &self.snipe_layers
    }

    /// Derive the input mode from the currently active layers
    pub fn resolve<L: LayerState + ?Sized>(&self, layers: &L) -> InputMode {
        if self.scroll_layers.iter().any(|&l| layers.is_layer_active(l)) {
            InputMode::Scroll
        } else if self.snipe_layers.iter().any(|&l| layers.is_layer_active(l)) {
            InputMode::Snipe
        } else {
            InputMode::Move
        }
    }
}

/// Config for the automouse layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AutomouseConfig {
    /// Layer activated while the indicator is on
    pub layer: u8,
    /// How long the layer stays active after the indicator goes off
    pub timeout: Duration,
    /// How long to let an idle device wake up before activating the layer
    pub wake_delay: Duration,
}

impl AutomouseConfig {
    pub fn new(layer: u8, timeout: Duration) -> Self {
        Self {
            layer,
            timeout,
            wake_delay: AUTOMOUSE_WAKE_DELAY,
        }
    }
}

impl Default for AutomouseConfig {
    fn default() -> Self {
        Self::new(0, AUTOMOUSE_DEFAULT_TIMEOUT)
    }
}
